// Client-side filter pipeline over the fetched month/year slice.
//
// All filters are conjunctive and pure; applying them in any order gives the
// same result, and re-filtering an already-filtered set is a no-op.
use crate::types::{quarter_months, CollectionRecord, Filter, ProductRecord, RegionIndex, SalesRecord};

/// Narrow a sales slice by zone, region and quarter.
pub fn filter_sales(records: &[SalesRecord], regions: &RegionIndex, filter: &Filter) -> Vec<SalesRecord> {
    let quarter = quarter_scope(filter, records.first().map(|r| r.month));
    records
        .iter()
        .filter(|r| zone_keeps(regions, r.region_id, filter))
        .filter(|r| region_keeps(r.region_id, filter))
        .filter(|r| quarter.map_or(true, |months| months.contains(&r.month)))
        .cloned()
        .collect()
}

/// Narrow a collection slice by zone, region and quarter.
pub fn filter_collections(
    records: &[CollectionRecord],
    regions: &RegionIndex,
    filter: &Filter,
) -> Vec<CollectionRecord> {
    let quarter = quarter_scope(filter, records.first().map(|r| r.month));
    records
        .iter()
        .filter(|r| zone_keeps(regions, r.region_id, filter))
        .filter(|r| region_keeps(r.region_id, filter))
        .filter(|r| quarter.map_or(true, |months| months.contains(&r.month)))
        .cloned()
        .collect()
}

/// Narrow the product comparison set by category. Products carry no month,
/// so the period filters never apply here.
pub fn filter_products(records: &[ProductRecord], filter: &Filter) -> Vec<ProductRecord> {
    match filter.category.as_deref() {
        None | Some("all") => records.to_vec(),
        Some(cat) => records
            .iter()
            .filter(|p| p.product_category.as_deref() == Some(cat))
            .cloned()
            .collect(),
    }
}

// Zone filter: resolve the row's zone through the region index and compare.
// Rows whose region_id does not resolve never match an active zone filter.
fn zone_keeps(regions: &RegionIndex, region_id: i64, filter: &Filter) -> bool {
    match filter.zone_active() {
        None => true,
        Some(want) => regions
            .zone_of(region_id)
            .is_some_and(|z| z.as_str() == want),
    }
}

fn region_keeps(region_id: i64, filter: &Filter) -> bool {
    match filter.region {
        None => true,
        Some(id) => region_id == id,
    }
}

// The quarter filter only engages when the fetched slice actually carries a
// populated month; an all-month aggregate slice (month == 0) passes through
// unchanged instead of being emptied.
fn quarter_scope(filter: &Filter, first_month: Option<u32>) -> Option<&'static [u32]> {
    let quarter = filter.quarter?;
    match first_month {
        Some(m) if m != 0 => Some(quarter_months(quarter)),
        _ => None,
    }
}
