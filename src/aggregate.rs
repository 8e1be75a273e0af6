// Join and aggregation engine over filtered sales/collection slices.
//
// Everything here is a total pure function: zero targets, unmatched joins and
// missing numeric fields resolve to 0 / "no data" at the derivation site.
// Percentages are rounded only at display time.
use crate::types::{CollectionRecord, ProductRecord, RegionIndex, SalesRecord, Zone};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// actual / target * 100 with a zero-target guard; never NaN or infinite.
pub fn achievement_pct(actual: f64, target: f64) -> f64 {
    if target > 0.0 {
        actual / target * 100.0
    } else {
        0.0
    }
}

/// (current - previous) / previous * 100 with a zero-previous guard.
pub fn growth_pct(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// KPI totals over a filtered sales/collection scope. Pure derivation,
/// recomputed on every filter change, never cached or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub total_sales: f64,
    pub total_target: f64,
    pub total_collection: f64,
    pub total_coll_target: f64,
    pub total_outstanding: f64,
    pub sales_ach_pct: f64,
    pub coll_ach_pct: f64,
}

pub fn aggregate_metrics(sales: &[SalesRecord], collections: &[CollectionRecord]) -> AggregatedMetrics {
    let total_sales: f64 = sales.iter().map(|r| r.net_sales).sum();
    let total_target: f64 = sales.iter().map(|r| r.sales_target).sum();
    let total_collection: f64 = collections.iter().map(|r| r.total_coll).sum();
    let total_coll_target: f64 = collections.iter().map(|r| r.coll_target).sum();
    let total_outstanding: f64 = collections.iter().map(|r| r.outstanding).sum();
    AggregatedMetrics {
        total_sales,
        total_target,
        total_collection,
        total_coll_target,
        total_outstanding,
        sales_ach_pct: achievement_pct(total_sales, total_target),
        coll_ach_pct: achievement_pct(total_collection, total_coll_target),
    }
}

/// One row of the per-region left join of sales onto collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionJoinRow {
    pub region_id: i64,
    pub area_name: String,
    pub zone: Option<Zone>,
    pub sales_target: f64,
    pub net_sales: f64,
    pub sales_ach_pct: f64,
    pub total_coll: f64,
    pub coll_ach_pct: f64,
    /// net_sales - total_coll; negative when collection ran ahead of sales.
    pub outstanding: f64,
}

/// Left join sales rows onto collection rows on region_id. At most one match
/// is expected; duplicate matches take the first in input order and are
/// logged as a data-quality condition, not treated as an error. An unmatched
/// join contributes zero collection figures.
pub fn join_regions(
    sales: &[SalesRecord],
    collections: &[CollectionRecord],
    regions: &RegionIndex,
) -> Vec<RegionJoinRow> {
    sales
        .iter()
        .map(|sale| {
            let mut matches = collections.iter().filter(|c| c.region_id == sale.region_id);
            let coll = matches.next();
            if matches.next().is_some() {
                warn!(
                    region_id = sale.region_id,
                    month = sale.month,
                    year = sale.year,
                    "duplicate collection rows for region; using first in input order"
                );
            }
            let total_coll = coll.map_or(0.0, |c| c.total_coll);
            let coll_target = coll.map_or(0.0, |c| c.coll_target);
            RegionJoinRow {
                region_id: sale.region_id,
                area_name: sale.area_name.clone(),
                zone: regions.zone_of(sale.region_id),
                sales_target: sale.sales_target,
                net_sales: sale.net_sales,
                sales_ach_pct: achievement_pct(sale.net_sales, sale.sales_target),
                total_coll,
                coll_ach_pct: achievement_pct(total_coll, coll_target),
                outstanding: sale.net_sales - total_coll,
            }
        })
        .collect()
}

/// Per-zone totals. Unresolved region_ids land in the "Unknown" bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRollup {
    pub zone: String,
    pub sales: f64,
    pub collection: f64,
    pub target: f64,
}

/// Group the filtered scope by zone, summing net sales and sales target from
/// the sales rows and total collection from the collection rows. Output is in
/// fixed zone order (North, South, Central, East, Unknown), empty zones
/// omitted.
pub fn zone_rollups(
    sales: &[SalesRecord],
    collections: &[CollectionRecord],
    regions: &RegionIndex,
) -> Vec<ZoneRollup> {
    let bucket_of = |region_id: i64| -> &'static str {
        match regions.zone_of(region_id) {
            Some(zone) => zone.as_str(),
            None => {
                warn!(region_id, "region not in reference data; rolling into Unknown zone");
                "Unknown"
            }
        }
    };
    let sales_buckets: Vec<&'static str> = sales.iter().map(|s| bucket_of(s.region_id)).collect();
    let coll_buckets: Vec<&'static str> =
        collections.iter().map(|c| bucket_of(c.region_id)).collect();

    Zone::ALL
        .iter()
        .map(|z| z.as_str())
        .chain(std::iter::once("Unknown"))
        .filter_map(|name| {
            let mut rollup = ZoneRollup {
                zone: name.to_string(),
                sales: 0.0,
                collection: 0.0,
                target: 0.0,
            };
            let mut seen = false;
            for (s, bucket) in sales.iter().zip(&sales_buckets) {
                if *bucket == name {
                    rollup.sales += s.net_sales;
                    rollup.target += s.sales_target;
                    seen = true;
                }
            }
            for (c, bucket) in collections.iter().zip(&coll_buckets) {
                if *bucket == name {
                    rollup.collection += c.total_coll;
                    seen = true;
                }
            }
            seen.then_some(rollup)
        })
        .collect()
}

/// Cash/credit/seed split of the filtered collection scope.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollectionBreakdown {
    pub cash: f64,
    pub credit: f64,
    pub seed: f64,
}

pub fn collection_breakdown(collections: &[CollectionRecord]) -> CollectionBreakdown {
    collections.iter().fold(CollectionBreakdown::default(), |mut acc, c| {
        acc.cash += c.cash_coll;
        acc.credit += c.credit_coll;
        acc.seed += c.seed_coll;
        acc
    })
}

/// Sales side of the dashboard summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_regions: usize,
    pub total_sales_target: f64,
    pub total_gross_sales: f64,
    pub total_net_sales: f64,
    pub overall_achievement_pct: f64,
}

pub fn sales_summary(sales: &[SalesRecord]) -> SalesSummary {
    let total_sales_target: f64 = sales.iter().map(|r| r.sales_target).sum();
    let total_gross_sales: f64 = sales.iter().map(|r| r.gross_sales).sum();
    let total_net_sales: f64 = sales.iter().map(|r| r.net_sales).sum();
    SalesSummary {
        total_regions: sales.len(),
        total_sales_target,
        total_gross_sales,
        total_net_sales,
        overall_achievement_pct: achievement_pct(total_net_sales, total_sales_target),
    }
}

/// Collection side of the dashboard summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub total_coll_target: f64,
    pub total_collection: f64,
    pub overall_coll_ach_pct: f64,
    pub cash_collection: f64,
    pub credit_collection: f64,
    pub seed_collection: f64,
}

pub fn collection_summary(collections: &[CollectionRecord]) -> CollectionSummary {
    let total_coll_target: f64 = collections.iter().map(|r| r.coll_target).sum();
    let total_collection: f64 = collections.iter().map(|r| r.total_coll).sum();
    let split = collection_breakdown(collections);
    CollectionSummary {
        total_coll_target,
        total_collection,
        overall_coll_ach_pct: achievement_pct(total_collection, total_coll_target),
        cash_collection: split.cash,
        credit_collection: split.credit,
        seed_collection: split.seed,
    }
}

/// Product side of the dashboard summary endpoint (fixed YoY set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub total_products: usize,
    pub total_value_current: f64,
    pub total_value_previous: f64,
    pub overall_growth_pct: f64,
}

pub fn product_summary(products: &[ProductRecord]) -> ProductSummary {
    let total_value_current: f64 = products.iter().map(|p| p.value_2025).sum();
    let total_value_previous: f64 = products.iter().map(|p| p.value_2024).sum();
    ProductSummary {
        total_products: products.len(),
        total_value_current,
        total_value_previous,
        overall_growth_pct: growth_pct(total_value_current, total_value_previous),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Region;

    fn regions() -> RegionIndex {
        RegionIndex::new(&[
            Region {
                region_id: 1,
                area_name: "Dhaka".into(),
                division: "Dhaka".into(),
                zone: Zone::Central,
            },
            Region {
                region_id: 2,
                area_name: "Bogura".into(),
                division: "Rajshahi".into(),
                zone: Zone::North,
            },
        ])
    }

    fn sale(region_id: i64, target: f64, net: f64) -> SalesRecord {
        SalesRecord {
            region_id,
            month: 11,
            year: 2025,
            area_name: format!("Region {}", region_id),
            division: String::new(),
            sales_target: target,
            gross_sales: net,
            sales_return: 0.0,
            net_sales: net,
            sales_ach_pct: 0.0,
        }
    }

    fn coll(region_id: i64, target: f64, total: f64) -> CollectionRecord {
        CollectionRecord {
            region_id,
            month: 11,
            year: 2025,
            area_name: format!("Region {}", region_id),
            coll_target: target,
            total_coll: total,
            cash_coll: total / 2.0,
            credit_coll: total / 4.0,
            seed_coll: total / 4.0,
            coll_ach_pct: 0.0,
            outstanding: 0.0,
        }
    }

    #[test]
    fn zero_targets_never_produce_nan() {
        let sales = vec![sale(1, 0.0, 500.0), sale(2, 0.0, 0.0)];
        let metrics = aggregate_metrics(&sales, &[]);
        assert_eq!(metrics.sales_ach_pct, 0.0);
        assert_eq!(metrics.coll_ach_pct, 0.0);
        assert!(metrics.sales_ach_pct.is_finite());
    }

    #[test]
    fn join_scenario_from_region_one() {
        let sales = vec![sale(1, 100_000.0, 120_000.0)];
        let colls = vec![coll(1, 100_000.0, 90_000.0)];
        let rows = join_regions(&sales, &colls, &regions());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sales_ach_pct, 120.0);
        assert_eq!(rows[0].outstanding, 30_000.0);
    }

    #[test]
    fn unmatched_join_contributes_zero_collection() {
        let sales = vec![sale(1, 100.0, 80.0)];
        let rows = join_regions(&sales, &[], &regions());
        assert_eq!(rows[0].total_coll, 0.0);
        assert_eq!(rows[0].coll_ach_pct, 0.0);
        assert_eq!(rows[0].outstanding, 80.0);
    }

    #[test]
    fn duplicate_collection_takes_first_in_input_order() {
        let sales = vec![sale(1, 100.0, 100.0)];
        let colls = vec![coll(1, 100.0, 60.0), coll(1, 100.0, 99.0)];
        let rows = join_regions(&sales, &colls, &regions());
        assert_eq!(rows[0].total_coll, 60.0);
    }

    #[test]
    fn zone_rollups_bucket_unresolved_regions_as_unknown() {
        let sales = vec![sale(1, 100.0, 90.0), sale(2, 200.0, 150.0), sale(77, 50.0, 40.0)];
        let colls = vec![coll(1, 100.0, 70.0), coll(77, 50.0, 10.0)];
        let rollups = zone_rollups(&sales, &colls, &regions());
        let names: Vec<&str> = rollups.iter().map(|r| r.zone.as_str()).collect();
        assert_eq!(names, vec!["North", "Central", "Unknown"]);
        let central = rollups.iter().find(|r| r.zone == "Central").unwrap();
        assert_eq!(central.sales, 90.0);
        assert_eq!(central.collection, 70.0);
        assert_eq!(central.target, 100.0);
        let unknown = rollups.iter().find(|r| r.zone == "Unknown").unwrap();
        assert_eq!(unknown.sales, 40.0);
        assert_eq!(unknown.collection, 10.0);
    }

    #[test]
    fn breakdown_sums_modes() {
        let colls = vec![coll(1, 100.0, 80.0), coll(2, 100.0, 40.0)];
        let split = collection_breakdown(&colls);
        assert_eq!(split.cash, 60.0);
        assert_eq!(split.credit, 30.0);
        assert_eq!(split.seed, 30.0);
    }

    #[test]
    fn growth_pct_guards_zero_previous() {
        assert_eq!(growth_pct(120.0, 100.0), 20.0);
        assert_eq!(growth_pct(120.0, 0.0), 0.0);
        assert_eq!(growth_pct(80.0, 100.0), -20.0);
    }

    #[test]
    fn summaries_recompute_overall_percentages_from_totals() {
        let sales = vec![sale(1, 100.0, 90.0), sale(2, 100.0, 130.0)];
        let s = sales_summary(&sales);
        assert_eq!(s.total_regions, 2);
        assert_eq!(s.overall_achievement_pct, 110.0);

        let products = vec![ProductRecord {
            product_id: 1,
            product_name: "Maize".into(),
            product_category: None,
            value_2024: 100.0,
            value_2025: 150.0,
            volume_2024: 0.0,
            volume_2025: 0.0,
            value_growth_pct: 50.0,
        }];
        let p = product_summary(&products);
        assert_eq!(p.overall_growth_pct, 50.0);
    }
}
