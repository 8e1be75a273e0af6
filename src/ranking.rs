// Top-N product selection with deterministic, stable tie-breaking.
use crate::types::ProductRecord;
use std::cmp::Ordering;

/// Top `n` products by current-year value, excluding products with no
/// current-year value. Descending; equal values keep input order.
pub fn top_by_value(products: &[ProductRecord], n: usize) -> Vec<ProductRecord> {
    let mut kept: Vec<ProductRecord> = products
        .iter()
        .filter(|p| p.value_2025 > 0.0)
        .cloned()
        .collect();
    kept.sort_by(|a, b| desc(a.value_2025, b.value_2025));
    kept.truncate(n);
    kept
}

/// Top `n` products by YoY growth, excluding flat growth and products with no
/// current-year value. Descending; equal growth keeps input order.
pub fn top_by_growth(products: &[ProductRecord], n: usize) -> Vec<ProductRecord> {
    let mut kept: Vec<ProductRecord> = products
        .iter()
        .filter(|p| p.value_2025 > 0.0 && p.value_growth_pct != 0.0)
        .cloned()
        .collect();
    kept.sort_by(|a, b| desc(a.value_growth_pct, b.value_growth_pct));
    kept.truncate(n);
    kept
}

// `Vec::sort_by` is stable, so Equal preserves the original relative order.
fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Axis-label truncation. The threshold and ellipsis are per-view
/// presentation parameters; different charts deliberately use different
/// values (see `views`).
pub fn truncate_name(name: &str, max_chars: usize, ellipsis: &str) -> String {
    if name.chars().count() > max_chars {
        let prefix: String = name.chars().take(max_chars).collect();
        format!("{}{}", prefix, ellipsis)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, value_2025: f64, growth: f64) -> ProductRecord {
        ProductRecord {
            product_id: id,
            product_name: name.to_string(),
            product_category: None,
            value_2024: 100.0,
            value_2025,
            volume_2024: 0.0,
            volume_2025: 0.0,
            value_growth_pct: growth,
        }
    }

    #[test]
    fn top_by_value_contract() {
        let products = vec![
            product(1, "A", 50.0, 10.0),
            product(2, "B", 0.0, 10.0),
            product(3, "C", 120.0, 10.0),
            product(4, "D", -5.0, 10.0),
            product(5, "E", 80.0, 10.0),
        ];
        let top = top_by_value(&products, 2);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|p| p.value_2025 > 0.0));
        assert!(top[0].value_2025 >= top[1].value_2025);
        assert_eq!(top[0].product_id, 3);
        assert_eq!(top[1].product_id, 5);
        // subset of the input
        assert!(top.iter().all(|p| products.iter().any(|q| q.product_id == p.product_id)));
    }

    #[test]
    fn top_by_value_returns_at_most_n() {
        let products = vec![product(1, "A", 10.0, 0.0)];
        assert_eq!(top_by_value(&products, 10).len(), 1);
    }

    #[test]
    fn ties_keep_input_order() {
        let products = vec![
            product(1, "A", 100.0, 0.0),
            product(2, "B", 100.0, 0.0),
            product(3, "C", 100.0, 0.0),
        ];
        let top = top_by_value(&products, 3);
        let ids: Vec<i64> = top.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn top_by_growth_excludes_flat_and_inactive() {
        let products = vec![
            product(1, "A", 100.0, 25.0),
            product(2, "B", 100.0, 0.0),
            product(3, "C", 0.0, 80.0),
            product(4, "D", 100.0, -10.0),
        ];
        let top = top_by_growth(&products, 15);
        let ids: Vec<i64> = top.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn truncation_thresholds_are_parameters() {
        assert_eq!(truncate_name("Hybrid Maize Gold 555", 12, "..."), "Hybrid Maize...");
        assert_eq!(truncate_name("Hybrid Maize Gold 555", 10, ".."), "Hybrid Mai..");
        assert_eq!(truncate_name("Short", 18, "..."), "Short");
    }
}
