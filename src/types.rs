use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default reporting period used when no filter has been chosen yet.
pub const DEFAULT_MONTH: u32 = 11;
pub const DEFAULT_YEAR: i32 = 2025;

pub const YEARS: [i32; 4] = [2023, 2024, 2025, 2026];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full month name for `1..=12`; `0` means the "all months" slice.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "All Months",
    }
}

/// Months belonging to a quarter. Q1={1,2,3} .. Q4={10,11,12}; every month
/// belongs to exactly one quarter.
pub fn quarter_months(quarter: u8) -> &'static [u32] {
    match quarter {
        1 => &[1, 2, 3],
        2 => &[4, 5, 6],
        3 => &[7, 8, 9],
        4 => &[10, 11, 12],
        _ => &[],
    }
}

/// Quarter containing the given month, if the month is valid.
pub fn quarter_of(month: u32) -> Option<u8> {
    match month {
        1..=3 => Some(1),
        4..=6 => Some(2),
        7..=9 => Some(3),
        10..=12 => Some(4),
        _ => None,
    }
}

/// Geographic grouping of regions used for rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    North,
    South,
    Central,
    East,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::North, Zone::South, Zone::Central, Zone::East];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::North => "North",
            Zone::South => "South",
            Zone::Central => "Central",
            Zone::East => "East",
        }
    }

    pub fn parse(s: &str) -> Option<Zone> {
        match s {
            "North" => Some(Zone::North),
            "South" => Some(Zone::South),
            "Central" => Some(Zone::Central),
            "East" => Some(Zone::East),
            _ => None,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable reference data describing a sales region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub region_id: i64,
    pub area_name: String,
    #[serde(default)]
    pub division: String,
    pub zone: Zone,
}

/// Lookup index over the region reference set. Joins against an id that does
/// not resolve here yield "no data", never a failure.
#[derive(Debug, Default)]
pub struct RegionIndex {
    by_id: HashMap<i64, Region>,
}

impl RegionIndex {
    pub fn new(regions: &[Region]) -> Self {
        let by_id = regions.iter().map(|r| (r.region_id, r.clone())).collect();
        RegionIndex { by_id }
    }

    pub fn get(&self, region_id: i64) -> Option<&Region> {
        self.by_id.get(&region_id)
    }

    pub fn zone_of(&self, region_id: i64) -> Option<Zone> {
        self.by_id.get(&region_id).map(|r| r.zone)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// One sales fact row per (region_id, month, year). Numeric fields missing
/// from the payload deserialize as 0 and are treated as 0 in sums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRecord {
    pub region_id: i64,
    /// 1..=12, or 0 when the row describes an unscoped (all-month) slice.
    #[serde(default)]
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub area_name: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub sales_target: f64,
    #[serde(default)]
    pub gross_sales: f64,
    #[serde(default)]
    pub sales_return: f64,
    #[serde(default)]
    pub net_sales: f64,
    #[serde(default)]
    pub sales_ach_pct: f64,
}

/// One collection fact row per (region_id, month, year).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub region_id: i64,
    #[serde(default)]
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub area_name: String,
    #[serde(default)]
    pub coll_target: f64,
    #[serde(default)]
    pub total_coll: f64,
    #[serde(default)]
    pub cash_coll: f64,
    #[serde(default)]
    pub credit_coll: f64,
    #[serde(default)]
    pub seed_coll: f64,
    #[serde(default)]
    pub coll_ach_pct: f64,
    #[serde(default)]
    pub outstanding: f64,
}

/// Year-over-year product comparison row. This set is fixed; the period
/// filters never apply to it, only the category filter does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: i64,
    pub product_name: String,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub value_2024: f64,
    #[serde(default)]
    pub value_2025: f64,
    #[serde(default)]
    pub volume_2024: f64,
    #[serde(default)]
    pub volume_2025: f64,
    #[serde(default)]
    pub value_growth_pct: f64,
}

/// Transient session filter. An explicit immutable value passed into every
/// derivation; there is no global filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// 0 = all months, else 1..=12.
    pub month: u32,
    pub year: i32,
    pub region: Option<i64>,
    pub zone: Option<String>,
    pub quarter: Option<u8>,
    pub category: Option<String>,
}

impl Default for Filter {
    fn default() -> Self {
        Filter {
            month: DEFAULT_MONTH,
            year: DEFAULT_YEAR,
            region: None,
            zone: None,
            quarter: None,
            category: None,
        }
    }
}

impl Filter {
    /// Restore the default period and clear every narrowing filter.
    pub fn reset(&mut self) {
        *self = Filter::default();
    }

    /// Month parameter as sent to the Data Service; `None` means all months.
    pub fn api_month(&self) -> Option<u32> {
        if self.month == 0 {
            None
        } else {
            Some(self.month)
        }
    }

    /// The zone filter value when it is actually narrowing, i.e. set and not
    /// the "All Zones" placeholder.
    pub fn zone_active(&self) -> Option<&str> {
        match self.zone.as_deref() {
            Some("All Zones") | None => None,
            Some(z) => Some(z),
        }
    }

    /// Short human summary of the active period, e.g. `November - Q4 - 2025`.
    pub fn period_label(&self) -> String {
        let mut parts = vec![month_name(self.month).to_string()];
        if let Some(q) = self.quarter {
            parts.push(format!("Q{}", q));
        }
        if let Some(z) = self.zone_active() {
            parts.push(z.to_string());
        }
        parts.push(self.year.to_string());
        parts.join(" - ")
    }
}
