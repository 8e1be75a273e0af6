// Interactive terminal driver for the dashboard core.
//
// The menu mirrors the dashboard pages: load the data slice for the current
// period, preview the dashboard views, browse the tabular reports with
// search/sort, export them as CSV, and adjust the filters.
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use salesdash::export::{export_collection_csv, export_sales_csv, save_export};
use salesdash::format::{format_currency, format_currency_full, format_percent};
use salesdash::service::{fetch_all, DataService, FetchSession, JsonDataService};
use salesdash::sort::{
    collection_cell, sales_cell, search_rows, sort_rows, CollectionSortKey, SalesSortKey,
    SortState,
};
use salesdash::types::{month_name, Filter, Zone, YEARS};
use salesdash::views::{collection_totals, compute_view_state, sales_totals, ViewState};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        session: FetchSession::new(),
        filter: Filter::default(),
        loaded_at: None,
        search: String::new(),
        sales_sort: SortState::default(),
        coll_sort: SortState::default(),
    })
});

struct AppState {
    session: FetchSession,
    filter: Filter,
    loaded_at: Option<DateTime<Local>>,
    search: String,
    sales_sort: SortState<SalesSortKey>,
    coll_sort: SortState<CollectionSortKey>,
}

#[derive(Tabled)]
struct SalesPreviewRow {
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Division")]
    division: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Gross Sales")]
    gross: String,
    #[tabled(rename = "Return")]
    sales_return: String,
    #[tabled(rename = "Net Sales")]
    net: String,
    #[tabled(rename = "Ach. %")]
    ach: String,
}

#[derive(Tabled)]
struct CollectionPreviewRow {
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Total Coll.")]
    total: String,
    #[tabled(rename = "Coll. %")]
    ach: String,
    #[tabled(rename = "Cash")]
    cash: String,
    #[tabled(rename = "Credit")]
    credit: String,
    #[tabled(rename = "Seed")]
    seed: String,
}

#[derive(Tabled)]
struct ZonePreviewRow {
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Sales")]
    sales: String,
    #[tabled(rename = "Collection")]
    collection: String,
    #[tabled(rename = "Target")]
    target: String,
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", Table::new(rows).with(Style::markdown()));
}

/// Fetch the slice for the current filter period through the supersession
/// guard. On failure the prior slice (if any) stays displayed.
fn handle_load(service: &dyn DataService) {
    let mut state = APP_STATE.lock().unwrap();
    let generation = state.session.begin_fetch();
    let filter = state.filter.clone();
    drop(state);

    let result = fetch_all(service, &filter);
    let mut state = APP_STATE.lock().unwrap();
    match result {
        Ok(sets) => {
            println!(
                "Loaded {} regions, {} sales rows, {} collection rows, {} products for {}.\n",
                sets.regions.len(),
                sets.sales.len(),
                sets.collections.len(),
                sets.products.len(),
                filter.period_label()
            );
            if state.session.complete_fetch(generation, sets) {
                state.loaded_at = Some(Local::now());
            }
        }
        Err(e) => {
            state.session.fail_fetch(generation, &e);
            eprintln!("Section unavailable: {}\n", e);
        }
    }
}

fn with_view_state(f: impl FnOnce(&AppState, &ViewState)) {
    let state = APP_STATE.lock().unwrap();
    let Some(raw) = state.session.data() else {
        println!("Error: No data loaded. Please load the data first (option 1).\n");
        return;
    };
    let view = compute_view_state(raw, &state.filter);
    f(&state, &view);
}

fn handle_dashboard() {
    with_view_state(|state, view| {
        print!("Dashboard - {}", state.filter.period_label());
        match state.loaded_at {
            Some(t) => println!("  (loaded {})\n", t.format("%Y-%m-%d %H:%M:%S")),
            None => println!("\n"),
        }
        for kpi in &view.kpis {
            match kpi.trend_pct {
                Some(trend) => println!(
                    "  {:<18} {:<14} ({})  {:+.1}% vs target",
                    kpi.title, kpi.value, kpi.subtitle, trend
                ),
                None => println!("  {:<18} {:<14} ({})", kpi.title, kpi.value, kpi.subtitle),
            }
        }
        println!(
            "\n  Sales Achievement: {}   Collection Achievement: {}   Regions: {}   Product Growth: {}",
            format_percent(view.metrics.sales_ach_pct),
            format_percent(view.metrics.coll_ach_pct),
            view.filtered_sales.len(),
            format_percent(view.overall_product_growth_pct)
        );
        println!(
            "  Exact: net sales {}, collection {}\n",
            format_currency_full(view.metrics.total_sales),
            format_currency_full(view.metrics.total_collection)
        );

        println!("Zone-wise Performance");
        let zone_rows: Vec<ZonePreviewRow> = view
            .zone_chart
            .iter()
            .map(|z| ZonePreviewRow {
                zone: z.zone.clone(),
                sales: format_currency(z.sales),
                collection: format_currency(z.collection),
                target: format_currency(z.target),
            })
            .collect();
        print_table(zone_rows);

        println!("Regional Performance Summary");
        print_table(view.summary_rows.clone());

        println!("Top Products (YoY)");
        for (i, name) in view.product_yoy_chart.names.iter().enumerate() {
            println!(
                "  {:>2}. {:<22} 2024: {:<12} 2025: {}",
                i + 1,
                name,
                format_currency(view.product_yoy_chart.value_2024[i]),
                format_currency(view.product_yoy_chart.value_2025[i])
            );
        }
        println!();
    });
}

fn handle_reports() {
    let tab = read_line("Report tab ([1] Sales / [2] Collection): ");
    let term = read_line("Search region (blank for all): ");
    {
        let mut state = APP_STATE.lock().unwrap();
        state.search = term;
    }
    match tab.as_str() {
        "1" => sales_report(),
        "2" => collection_report(),
        _ => println!("Invalid choice. Please enter 1 or 2.\n"),
    }
}

fn sales_report() {
    let sort_choice = read_line(
        "Sort by ([1] Region [2] Division [3] Target [4] Gross [5] Return [6] Net [7] Ach%, blank to keep): ",
    );
    let key = match sort_choice.as_str() {
        "1" => Some(SalesSortKey::AreaName),
        "2" => Some(SalesSortKey::Division),
        "3" => Some(SalesSortKey::SalesTarget),
        "4" => Some(SalesSortKey::GrossSales),
        "5" => Some(SalesSortKey::SalesReturn),
        "6" => Some(SalesSortKey::NetSales),
        "7" => Some(SalesSortKey::AchPct),
        _ => None,
    };
    if let Some(key) = key {
        APP_STATE.lock().unwrap().sales_sort.toggle(key);
    }

    with_view_state(|state, view| {
        let mut rows = search_rows(&view.filtered_sales, &state.search, |r| {
            vec![r.area_name.as_str(), r.division.as_str()]
        });
        if let Some(key) = state.sales_sort.key {
            sort_rows(&mut rows, state.sales_sort.direction, |r| sales_cell(r, key));
        }

        println!(
            "\nSales Report - {} {}",
            month_name(state.filter.month),
            state.filter.year
        );
        let totals = sales_totals(&rows);
        let mut preview: Vec<SalesPreviewRow> = rows
            .iter()
            .map(|r| SalesPreviewRow {
                region: r.area_name.clone(),
                division: r.division.clone(),
                target: format_currency(r.sales_target),
                gross: format_currency(r.gross_sales),
                sales_return: format_currency(r.sales_return),
                net: format_currency(r.net_sales),
                ach: format_percent(r.sales_ach_pct),
            })
            .collect();
        preview.push(SalesPreviewRow {
            region: "Total".to_string(),
            division: String::new(),
            target: format_currency(totals.sales_target),
            gross: format_currency(totals.gross_sales),
            sales_return: format_currency(totals.sales_return),
            net: format_currency(totals.net_sales),
            ach: format_percent(totals.ach_pct),
        });
        print_table(preview);
        println!("Showing {} of {} records\n", rows.len(), view.filtered_sales.len());

        maybe_export(|| export_sales_csv(&rows, state.filter.month, state.filter.year));
    });
}

fn collection_report() {
    let sort_choice = read_line(
        "Sort by ([1] Region [2] Target [3] Total [4] Ach% [5] Cash [6] Credit [7] Seed, blank to keep): ",
    );
    let key = match sort_choice.as_str() {
        "1" => Some(CollectionSortKey::AreaName),
        "2" => Some(CollectionSortKey::CollTarget),
        "3" => Some(CollectionSortKey::TotalColl),
        "4" => Some(CollectionSortKey::AchPct),
        "5" => Some(CollectionSortKey::Cash),
        "6" => Some(CollectionSortKey::Credit),
        "7" => Some(CollectionSortKey::Seed),
        _ => None,
    };
    if let Some(key) = key {
        APP_STATE.lock().unwrap().coll_sort.toggle(key);
    }

    with_view_state(|state, view| {
        let mut rows = search_rows(&view.filtered_collections, &state.search, |r| {
            vec![r.area_name.as_str()]
        });
        if let Some(key) = state.coll_sort.key {
            sort_rows(&mut rows, state.coll_sort.direction, |r| collection_cell(r, key));
        }

        println!(
            "\nCollection Report - {} {}",
            month_name(state.filter.month),
            state.filter.year
        );
        let totals = collection_totals(&rows);
        let mut preview: Vec<CollectionPreviewRow> = rows
            .iter()
            .map(|r| CollectionPreviewRow {
                region: r.area_name.clone(),
                target: format_currency(r.coll_target),
                total: format_currency(r.total_coll),
                ach: format_percent(r.coll_ach_pct),
                cash: format_currency(r.cash_coll),
                credit: format_currency(r.credit_coll),
                seed: format_currency(r.seed_coll),
            })
            .collect();
        preview.push(CollectionPreviewRow {
            region: "Total".to_string(),
            target: format_currency(totals.coll_target),
            total: format_currency(totals.total_coll),
            ach: format_percent(totals.ach_pct),
            cash: format_currency(totals.cash_coll),
            credit: format_currency(totals.credit_coll),
            seed: format_currency(totals.seed_coll),
        });
        print_table(preview);
        println!(
            "Showing {} of {} records\n",
            rows.len(),
            view.filtered_collections.len()
        );

        maybe_export(|| export_collection_csv(&rows, state.filter.month, state.filter.year));
    });
}

fn maybe_export<F, E>(make: F)
where
    F: FnOnce() -> Result<Option<salesdash::export::CsvExport>, E>,
    E: std::fmt::Display,
{
    if read_line("Export CSV (Y/N): ").to_uppercase() != "Y" {
        return;
    }
    match make() {
        Ok(Some(export)) => match save_export(Path::new("."), &export) {
            Ok(path) => println!("Exported to {}\n", path.display()),
            Err(e) => eprintln!("Export failed: {}\n", e),
        },
        Ok(None) => println!("Nothing to export for the current view.\n"),
        Err(e) => eprintln!("Export failed: {}\n", e),
    }
}

/// Adjust the filter. A month/year change invalidates the fetched slice, so
/// the caller is asked to reload; the client-side filters apply immediately.
fn handle_filters(service: &dyn DataService) {
    println!("Current filter: {}", APP_STATE.lock().unwrap().filter.period_label());
    println!("[1] Month  [2] Year  [3] Quarter  [4] Zone  [5] Region  [6] Category  [7] Reset");
    let mut period_changed = false;
    match read_line("Enter choice: ").as_str() {
        "1" => {
            let m = read_line("Month (1-12, 0 = all): ").parse::<u32>().unwrap_or(0);
            if m <= 12 {
                APP_STATE.lock().unwrap().filter.month = m;
                period_changed = true;
            } else {
                println!("Invalid month.\n");
            }
        }
        "2" => {
            if let Ok(y) = read_line("Year: ").parse::<i32>() {
                if YEARS.contains(&y) {
                    APP_STATE.lock().unwrap().filter.year = y;
                    period_changed = true;
                } else {
                    println!("Year out of range {:?}.\n", YEARS);
                }
            }
        }
        "3" => {
            let q = read_line("Quarter (1-4, blank = all): ");
            APP_STATE.lock().unwrap().filter.quarter = match q.parse::<u8>() {
                Ok(q) if (1..=4).contains(&q) => Some(q),
                _ => None,
            };
        }
        "4" => {
            let z = read_line("Zone (North/South/Central/East, blank = all): ");
            APP_STATE.lock().unwrap().filter.zone = if z.is_empty() {
                None
            } else if Zone::parse(&z).is_some() {
                Some(z)
            } else {
                println!("Unknown zone.\n");
                None
            };
        }
        "5" => {
            let r = read_line("Region id (blank = all): ");
            APP_STATE.lock().unwrap().filter.region = r.parse::<i64>().ok();
        }
        "6" => {
            let c = read_line("Product category (blank = all): ");
            APP_STATE.lock().unwrap().filter.category = if c.is_empty() { None } else { Some(c) };
        }
        "7" => {
            let mut state = APP_STATE.lock().unwrap();
            state.filter.reset();
            state.search.clear();
            period_changed = true;
        }
        _ => println!("Invalid choice.\n"),
    }
    if period_changed {
        handle_load(service);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let service = JsonDataService::new(&data_dir);

    loop {
        println!("SUROVI AGRO Business Intelligence");
        println!("[1] Load data");
        println!("[2] Dashboard");
        println!("[3] Reports");
        println!("[4] Filters");
        println!("[5] Exit\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_load(&service),
            "2" => handle_dashboard(),
            "3" => handle_reports(),
            "4" => handle_filters(&service),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
}
