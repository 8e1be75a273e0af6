// View-model builders: one declarative struct per chart or table, assembled
// from the filtered scope. The chart library is a sink; nothing here renders
// pixels. `compute_view_state` is the single pure pipeline invoked on every
// filter change.
use crate::aggregate::{
    achievement_pct, aggregate_metrics, collection_breakdown, growth_pct, join_regions,
    zone_rollups, AggregatedMetrics, RegionJoinRow, ZoneRollup,
};
use crate::filter::{filter_collections, filter_products, filter_sales};
use crate::format::{format_currency, format_number, format_percent};
use crate::ranking::{top_by_growth, top_by_value, truncate_name};
use crate::types::{CollectionRecord, Filter, ProductRecord, Region, RegionIndex, SalesRecord};
use serde::Serialize;
use tabled::Tabled;

// Per-view axis-label truncation thresholds, reproduced exactly; they are
// presentation parameters of each chart, not a shared constant.
const YOY_CHART_NAME_CHARS: usize = 18;
const VALUE_CHART_NAME_CHARS: usize = 12;
const GROWTH_CHART_NAME_CHARS: usize = 10;

/// Everything fetched for the current month/year slice.
#[derive(Debug, Clone, Default)]
pub struct RawSets {
    pub regions: Vec<Region>,
    pub sales: Vec<SalesRecord>,
    pub collections: Vec<CollectionRecord>,
    pub products: Vec<ProductRecord>,
}

/// One KPI card: title plus pre-formatted value/subtitle and an optional
/// trend in percentage points relative to target.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
    pub subtitle: String,
    pub trend_pct: Option<f64>,
}

/// Sales vs target bars per region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesTargetChart {
    pub regions: Vec<String>,
    pub target: Vec<f64>,
    pub actual: Vec<f64>,
}

/// Cash/credit/seed pie.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub name: &'static str,
    pub value: f64,
}

/// Sales% and collection% series per region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AchievementChart {
    pub regions: Vec<String>,
    pub sales_pct: Vec<f64>,
    pub collection_pct: Vec<f64>,
}

/// Year-over-year bars for the top products by current value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductYoYChart {
    pub names: Vec<String>,
    pub value_2024: Vec<f64>,
    pub value_2025: Vec<f64>,
}

/// Growth bars for the top products by YoY growth.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductGrowthChart {
    pub names: Vec<String>,
    pub growth_pct: Vec<f64>,
}

/// Outstanding per region, largest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutstandingChart {
    pub regions: Vec<String>,
    pub outstanding: Vec<f64>,
}

/// Net sales vs collection series per region.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendChart {
    pub regions: Vec<String>,
    pub sales: Vec<f64>,
    pub collection: Vec<f64>,
}

/// Radar over the first regions of the scope; values capped so one runaway
/// region does not flatten the rest of the shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadarChart {
    pub regions: Vec<String>,
    pub sales_ach: Vec<f64>,
    pub collection_ach: Vec<f64>,
}

const RADAR_REGION_LIMIT: usize = 6;
const RADAR_CAP: f64 = 150.0;

/// Regional performance summary table row, display-formatted.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionSummaryRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Zone")]
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "NetSales")]
    #[tabled(rename = "Net Sales")]
    pub net_sales: String,
    #[serde(rename = "SalesAchPct")]
    #[tabled(rename = "Sales Ach%")]
    pub sales_ach_pct: String,
    #[serde(rename = "Collection")]
    #[tabled(rename = "Collection")]
    pub collection: String,
    #[serde(rename = "Outstanding")]
    #[tabled(rename = "Outstanding")]
    pub outstanding: String,
}

/// Totals footer of the sales report table. The achievement figure is
/// recomputed from the summed totals, never averaged across rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesTotals {
    pub sales_target: f64,
    pub gross_sales: f64,
    pub sales_return: f64,
    pub net_sales: f64,
    pub ach_pct: f64,
}

pub fn sales_totals(rows: &[SalesRecord]) -> SalesTotals {
    let mut t = SalesTotals::default();
    for r in rows {
        t.sales_target += r.sales_target;
        t.gross_sales += r.gross_sales;
        t.sales_return += r.sales_return;
        t.net_sales += r.net_sales;
    }
    t.ach_pct = achievement_pct(t.net_sales, t.sales_target);
    t
}

/// Totals footer of the collection report table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionTotals {
    pub coll_target: f64,
    pub total_coll: f64,
    pub cash_coll: f64,
    pub credit_coll: f64,
    pub seed_coll: f64,
    pub ach_pct: f64,
}

pub fn collection_totals(rows: &[CollectionRecord]) -> CollectionTotals {
    let mut t = CollectionTotals::default();
    for r in rows {
        t.coll_target += r.coll_target;
        t.total_coll += r.total_coll;
        t.cash_coll += r.cash_coll;
        t.credit_coll += r.credit_coll;
        t.seed_coll += r.seed_coll;
    }
    t.ach_pct = achievement_pct(t.total_coll, t.coll_target);
    t
}

/// The complete derived state for one (raw sets, filter) pair.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub metrics: AggregatedMetrics,
    pub kpis: Vec<KpiCard>,
    pub sales_target_chart: SalesTargetChart,
    pub collection_pie: Vec<PieSlice>,
    pub achievement_chart: AchievementChart,
    pub zone_chart: Vec<ZoneRollup>,
    pub product_yoy_chart: ProductYoYChart,
    pub product_value_chart: ProductYoYChart,
    pub product_growth_chart: ProductGrowthChart,
    pub outstanding_chart: OutstandingChart,
    pub trend_chart: TrendChart,
    pub radar_chart: RadarChart,
    pub summary_rows: Vec<RegionSummaryRow>,
    /// The filtered fact slices the report tables and CSV export operate on.
    pub filtered_sales: Vec<SalesRecord>,
    pub filtered_collections: Vec<CollectionRecord>,
    pub filtered_products: Vec<ProductRecord>,
    pub active_product_count: usize,
    pub overall_product_growth_pct: f64,
}

/// Pure pipeline: filter -> aggregate -> build every view model. Recomputed
/// in full on each relevant input change; nothing is cached across filter
/// configurations.
pub fn compute_view_state(raw: &RawSets, filter: &Filter) -> ViewState {
    let index = RegionIndex::new(&raw.regions);
    let sales = filter_sales(&raw.sales, &index, filter);
    let collections = filter_collections(&raw.collections, &index, filter);
    let products = filter_products(&raw.products, filter);

    let metrics = aggregate_metrics(&sales, &collections);
    let joined = join_regions(&sales, &collections, &index);
    let zone_chart = zone_rollups(&sales, &collections, &index);
    let active_product_count = products.iter().filter(|p| p.value_2025 > 0.0).count();
    let overall_product_growth_pct = {
        let current: f64 = products.iter().map(|p| p.value_2025).sum();
        let previous: f64 = products.iter().map(|p| p.value_2024).sum();
        growth_pct(current, previous)
    };

    ViewState {
        kpis: build_kpis(&metrics, active_product_count, products.len()),
        sales_target_chart: build_sales_target_chart(&sales),
        collection_pie: build_collection_pie(&collections),
        achievement_chart: build_achievement_chart(&joined),
        product_yoy_chart: build_product_yoy_chart(&products, YOY_CHART_NAME_CHARS, "..."),
        product_value_chart: build_product_yoy_chart(&products, VALUE_CHART_NAME_CHARS, "..."),
        product_growth_chart: build_product_growth_chart(&products),
        outstanding_chart: build_outstanding_chart(&joined),
        trend_chart: build_trend_chart(&joined),
        radar_chart: build_radar_chart(&joined),
        summary_rows: build_summary_rows(&joined),
        zone_chart,
        metrics,
        filtered_sales: sales,
        filtered_collections: collections,
        filtered_products: products,
        active_product_count,
        overall_product_growth_pct,
    }
}

fn build_kpis(metrics: &AggregatedMetrics, active_products: usize, total_products: usize) -> Vec<KpiCard> {
    vec![
        KpiCard {
            title: "Total Net Sales",
            value: format_currency(metrics.total_sales),
            subtitle: format!("Target: {}", format_currency(metrics.total_target)),
            trend_pct: Some(metrics.sales_ach_pct - 100.0),
        },
        KpiCard {
            title: "Total Collection",
            value: format_currency(metrics.total_collection),
            subtitle: format!("Target: {}", format_currency(metrics.total_coll_target)),
            trend_pct: Some(metrics.coll_ach_pct - 100.0),
        },
        KpiCard {
            title: "Outstanding",
            value: format_currency(metrics.total_outstanding),
            subtitle: "Sales - Collection".to_string(),
            trend_pct: None,
        },
        KpiCard {
            title: "Active Products",
            value: format_number(active_products as f64),
            subtitle: format!("Total: {} products", total_products),
            trend_pct: None,
        },
    ]
}

fn build_sales_target_chart(sales: &[SalesRecord]) -> SalesTargetChart {
    let mut chart = SalesTargetChart::default();
    for r in sales {
        chart.regions.push(r.area_name.clone());
        chart.target.push(r.sales_target);
        chart.actual.push(r.net_sales);
    }
    chart
}

fn build_collection_pie(collections: &[CollectionRecord]) -> Vec<PieSlice> {
    let split = collection_breakdown(collections);
    vec![
        PieSlice { name: "Cash", value: split.cash },
        PieSlice { name: "Credit", value: split.credit },
        PieSlice { name: "Seed", value: split.seed },
    ]
}

fn build_achievement_chart(joined: &[RegionJoinRow]) -> AchievementChart {
    let mut chart = AchievementChart::default();
    for row in joined {
        chart.regions.push(row.area_name.clone());
        chart.sales_pct.push(row.sales_ach_pct);
        chart.collection_pct.push(row.coll_ach_pct);
    }
    chart
}

fn build_product_yoy_chart(products: &[ProductRecord], name_chars: usize, ellipsis: &str) -> ProductYoYChart {
    let mut chart = ProductYoYChart::default();
    for p in top_by_value(products, 10) {
        chart.names.push(truncate_name(&p.product_name, name_chars, ellipsis));
        chart.value_2024.push(p.value_2024);
        chart.value_2025.push(p.value_2025);
    }
    chart
}

fn build_product_growth_chart(products: &[ProductRecord]) -> ProductGrowthChart {
    let mut chart = ProductGrowthChart::default();
    for p in top_by_growth(products, 15) {
        chart
            .names
            .push(truncate_name(&p.product_name, GROWTH_CHART_NAME_CHARS, ".."));
        chart.growth_pct.push(p.value_growth_pct);
    }
    chart
}

fn build_outstanding_chart(joined: &[RegionJoinRow]) -> OutstandingChart {
    let mut rows: Vec<(&str, f64)> = joined
        .iter()
        .map(|r| (r.area_name.as_str(), r.outstanding))
        .collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut chart = OutstandingChart::default();
    for (name, outstanding) in rows {
        chart.regions.push(name.to_string());
        chart.outstanding.push(outstanding);
    }
    chart
}

fn build_trend_chart(joined: &[RegionJoinRow]) -> TrendChart {
    let mut chart = TrendChart::default();
    for row in joined {
        chart.regions.push(row.area_name.clone());
        chart.sales.push(row.net_sales);
        chart.collection.push(row.total_coll);
    }
    chart
}

fn build_radar_chart(joined: &[RegionJoinRow]) -> RadarChart {
    let mut chart = RadarChart::default();
    for row in joined.iter().take(RADAR_REGION_LIMIT) {
        chart.regions.push(row.area_name.clone());
        chart.sales_ach.push(row.sales_ach_pct.min(RADAR_CAP));
        chart.collection_ach.push(row.coll_ach_pct.min(RADAR_CAP));
    }
    chart
}

fn build_summary_rows(joined: &[RegionJoinRow]) -> Vec<RegionSummaryRow> {
    joined
        .iter()
        .map(|row| RegionSummaryRow {
            region: row.area_name.clone(),
            zone: row.zone.map_or_else(|| "-".to_string(), |z| z.to_string()),
            target: format_currency(row.sales_target),
            net_sales: format_currency(row.net_sales),
            sales_ach_pct: format_percent(row.sales_ach_pct),
            collection: format_currency(row.total_coll),
            outstanding: format_currency(row.outstanding),
        })
        .collect()
}
