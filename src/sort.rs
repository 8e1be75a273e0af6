// Generic stable table sort plus the search filter the report tables apply
// before sorting.
use crate::types::{CollectionRecord, SalesRecord};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Column-header sort state. Toggling the same key flips asc -> desc -> asc;
/// a new key always resets to ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct SortState<K: Copy + PartialEq> {
    pub key: Option<K>,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> Default for SortState<K> {
    fn default() -> Self {
        SortState {
            key: None,
            direction: SortDirection::Asc,
        }
    }
}

impl<K: Copy + PartialEq> SortState<K> {
    pub fn toggle(&mut self, key: K) {
        if self.key == Some(key) && self.direction == SortDirection::Asc {
            self.direction = SortDirection::Desc;
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Asc;
        }
    }
}

/// A sortable cell value. Numeric cells compare numerically, text cells
/// lexicographically (byte order, non-locale-aware).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    fn cmp_cell(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            // Mixed cells should not occur for a well-typed key; order
            // numbers before text deterministically.
            (CellValue::Number(_), CellValue::Text(_)) => Ordering::Less,
            (CellValue::Text(_), CellValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// Stable in-place sort by the given key extractor. Equal keys preserve the
/// incoming row order.
pub fn sort_rows<T, F>(rows: &mut [T], direction: SortDirection, key_of: F)
where
    F: Fn(&T) -> CellValue,
{
    rows.sort_by(|a, b| {
        let ord = key_of(a).cmp_cell(&key_of(b));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Case-insensitive substring search. Rows match when any provided text field
/// contains the term; a blank term keeps everything. Composes (AND) with the
/// region filter applied upstream.
pub fn search_rows<T, F>(rows: &[T], term: &str, text_of: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> Vec<&str>,
{
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| text_of(row).iter().any(|field| field.to_lowercase().contains(&needle)))
        .cloned()
        .collect()
}

/// Sortable columns of the sales report table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesSortKey {
    AreaName,
    Division,
    SalesTarget,
    GrossSales,
    SalesReturn,
    NetSales,
    AchPct,
}

pub fn sales_cell(record: &SalesRecord, key: SalesSortKey) -> CellValue {
    match key {
        SalesSortKey::AreaName => CellValue::Text(record.area_name.clone()),
        SalesSortKey::Division => CellValue::Text(record.division.clone()),
        SalesSortKey::SalesTarget => CellValue::Number(record.sales_target),
        SalesSortKey::GrossSales => CellValue::Number(record.gross_sales),
        SalesSortKey::SalesReturn => CellValue::Number(record.sales_return),
        SalesSortKey::NetSales => CellValue::Number(record.net_sales),
        SalesSortKey::AchPct => CellValue::Number(record.sales_ach_pct),
    }
}

/// Sortable columns of the collection report table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionSortKey {
    AreaName,
    CollTarget,
    TotalColl,
    AchPct,
    Cash,
    Credit,
    Seed,
}

pub fn collection_cell(record: &CollectionRecord, key: CollectionSortKey) -> CellValue {
    match key {
        CollectionSortKey::AreaName => CellValue::Text(record.area_name.clone()),
        CollectionSortKey::CollTarget => CellValue::Number(record.coll_target),
        CollectionSortKey::TotalColl => CellValue::Number(record.total_coll),
        CollectionSortKey::AchPct => CellValue::Number(record.coll_ach_pct),
        CollectionSortKey::Cash => CellValue::Number(record.cash_coll),
        CollectionSortKey::Credit => CellValue::Number(record.credit_coll),
        CollectionSortKey::Seed => CellValue::Number(record.seed_coll),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(area: &str, division: &str, net: f64) -> SalesRecord {
        SalesRecord {
            region_id: 0,
            month: 11,
            year: 2025,
            area_name: area.to_string(),
            division: division.to_string(),
            sales_target: 0.0,
            gross_sales: 0.0,
            sales_return: 0.0,
            net_sales: net,
            sales_ach_pct: 0.0,
        }
    }

    #[test]
    fn toggle_cycles_asc_desc_asc_on_same_key() {
        let mut state: SortState<SalesSortKey> = SortState::default();
        state.toggle(SalesSortKey::NetSales);
        assert_eq!(state.direction, SortDirection::Asc);
        state.toggle(SalesSortKey::NetSales);
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle(SalesSortKey::NetSales);
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn new_key_resets_to_ascending() {
        let mut state: SortState<SalesSortKey> = SortState::default();
        state.toggle(SalesSortKey::NetSales);
        state.toggle(SalesSortKey::NetSales);
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle(SalesSortKey::AreaName);
        assert_eq!(state.key, Some(SalesSortKey::AreaName));
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn toggling_twice_preserves_the_row_set() {
        let rows = vec![sale("Dhaka", "Dhaka", 30.0), sale("Bogura", "Rajshahi", 10.0), sale("Sylhet", "Sylhet", 20.0)];
        let mut asc = rows.clone();
        sort_rows(&mut asc, SortDirection::Asc, |r| sales_cell(r, SalesSortKey::NetSales));
        let mut desc = asc.clone();
        sort_rows(&mut desc, SortDirection::Desc, |r| sales_cell(r, SalesSortKey::NetSales));
        assert_eq!(rows.len(), desc.len());
        let mut names: Vec<&str> = desc.iter().map(|r| r.area_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Bogura", "Dhaka", "Sylhet"]);
        assert_eq!(desc[0].net_sales, 30.0);
        assert_eq!(asc[0].net_sales, 10.0);
    }

    #[test]
    fn stable_for_equal_keys() {
        let rows_in = vec![sale("A", "x", 10.0), sale("B", "x", 10.0), sale("C", "x", 5.0)];
        let mut rows = rows_in.clone();
        sort_rows(&mut rows, SortDirection::Asc, |r| sales_cell(r, SalesSortKey::NetSales));
        let names: Vec<&str> = rows.iter().map(|r| r.area_name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn text_keys_sort_lexicographically() {
        let mut rows = vec![sale("Sylhet", "s", 0.0), sale("Bogura", "b", 0.0), sale("Dhaka", "d", 0.0)];
        sort_rows(&mut rows, SortDirection::Asc, |r| sales_cell(r, SalesSortKey::AreaName));
        let names: Vec<&str> = rows.iter().map(|r| r.area_name.as_str()).collect();
        assert_eq!(names, vec!["Bogura", "Dhaka", "Sylhet"]);
    }

    #[test]
    fn search_matches_name_or_division_case_insensitively() {
        let rows = vec![sale("Dhaka North", "Dhaka", 0.0), sale("Bogura", "Rajshahi", 0.0)];
        let hits = search_rows(&rows, "rajsh", |r| vec![r.area_name.as_str(), r.division.as_str()]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].area_name, "Bogura");
        let blank = search_rows(&rows, "   ", |r| vec![r.area_name.as_str()]);
        assert_eq!(blank.len(), 2);
    }
}
