// Data Service boundary.
//
// Each endpoint has a typed serde schema; malformed payloads surface as a
// `ServiceError` at this boundary instead of crashing inside a view-model
// builder. The bundled implementation reads per-endpoint JSON fixture files
// and applies the month/year slice itself, the way the real service does.
use crate::aggregate::{
    collection_summary, product_summary, sales_summary, CollectionSummary, ProductSummary,
    SalesSummary,
};
use crate::types::{CollectionRecord, Filter, ProductRecord, Region, SalesRecord};
use crate::views::RawSets;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info};

/// The only boundary-visible failure class: the data source itself. All
/// derivation downstream of a successful fetch is total.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed {endpoint} payload: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Combined dashboard summary returned by the summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub sales: SalesSummary,
    pub collection: CollectionSummary,
    pub products: ProductSummary,
}

/// Ingestion Service response, passed through verbatim to the user; the core
/// performs no retries and no interpretation beyond display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_type: String,
    pub records_processed: u64,
    #[serde(default)]
    pub details: Option<UploadDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadDetails {
    pub month_name: String,
    pub year: i32,
    #[serde(default)]
    pub deleted_records: u64,
}

/// Read side of the dashboard's data boundary. An omitted month means all
/// months of the given year.
pub trait DataService {
    fn dashboard_summary(&self, month: u32, year: i32) -> Result<DashboardSummary, ServiceError>;
    fn sales(&self, month: Option<u32>, year: Option<i32>) -> Result<Vec<SalesRecord>, ServiceError>;
    fn collections(
        &self,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<CollectionRecord>, ServiceError>;
    fn regions(&self) -> Result<Vec<Region>, ServiceError>;
    fn products(&self) -> Result<Vec<ProductRecord>, ServiceError>;
    fn product_comparison(&self) -> Result<Vec<ProductRecord>, ServiceError>;
}

/// Fetch every set the dashboard needs for one filter period. Derivation
/// starts only after all requisite fetches have resolved.
pub fn fetch_all(service: &dyn DataService, filter: &Filter) -> Result<RawSets, ServiceError> {
    let month = filter.api_month();
    let year = Some(filter.year);
    let regions = service.regions()?;
    let sales = service.sales(month, year)?;
    let collections = service.collections(month, year)?;
    let products = service.product_comparison()?;
    info!(
        regions = regions.len(),
        sales = sales.len(),
        collections = collections.len(),
        products = products.len(),
        "fetched dashboard slice"
    );
    Ok(RawSets {
        regions,
        sales,
        collections,
        products,
    })
}

/// JSON-fixture implementation of the Data Service: one file per endpoint in
/// a data directory.
pub struct JsonDataService {
    data_dir: PathBuf,
}

impl JsonDataService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        JsonDataService {
            data_dir: data_dir.into(),
        }
    }

    fn load<T: DeserializeOwned>(&self, file: &str, endpoint: &'static str) -> Result<T, ServiceError> {
        let path = self.data_dir.join(file);
        let text = fs::read_to_string(&path).map_err(|source| ServiceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ServiceError::Decode { endpoint, source })
    }
}

impl DataService for JsonDataService {
    fn dashboard_summary(&self, month: u32, year: i32) -> Result<DashboardSummary, ServiceError> {
        let sales = self.sales(Some(month), Some(year))?;
        let collections = self.collections(Some(month), Some(year))?;
        let products = self.product_comparison()?;
        Ok(DashboardSummary {
            sales: sales_summary(&sales),
            collection: collection_summary(&collections),
            products: product_summary(&products),
        })
    }

    fn sales(&self, month: Option<u32>, year: Option<i32>) -> Result<Vec<SalesRecord>, ServiceError> {
        let mut rows: Vec<SalesRecord> = self.load("sales.json", "sales")?;
        rows.retain(|r| month.map_or(true, |m| r.month == m) && year.map_or(true, |y| r.year == y));
        Ok(rows)
    }

    fn collections(
        &self,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<CollectionRecord>, ServiceError> {
        let mut rows: Vec<CollectionRecord> = self.load("collections.json", "collections")?;
        rows.retain(|r| month.map_or(true, |m| r.month == m) && year.map_or(true, |y| r.year == y));
        Ok(rows)
    }

    fn regions(&self) -> Result<Vec<Region>, ServiceError> {
        self.load("regions.json", "regions")
    }

    fn products(&self) -> Result<Vec<ProductRecord>, ServiceError> {
        self.load("products.json", "products")
    }

    fn product_comparison(&self) -> Result<Vec<ProductRecord>, ServiceError> {
        self.load("product_comparison.json", "product-comparison")
    }
}

/// Supersession guard around the fetch cycle. Each filter change begins a new
/// generation; only a completion carrying the newest generation may install
/// data, so a slow superseded fetch can never overwrite a newer one. On
/// failure the previously loaded data stays displayed.
#[derive(Debug, Default)]
pub struct FetchSession {
    generation: u64,
    loading: bool,
    data: Option<RawSets>,
    last_error: Option<String>,
}

impl FetchSession {
    pub fn new() -> Self {
        FetchSession::default()
    }

    /// Start a new fetch cycle, superseding any outstanding one.
    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Install the fetched sets if `generation` is still current. Returns
    /// whether the data was accepted.
    pub fn complete_fetch(&mut self, generation: u64, sets: RawSets) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding superseded fetch");
            return false;
        }
        self.data = Some(sets);
        self.last_error = None;
        self.loading = false;
        true
    }

    /// Record a failed fetch. Prior data (if any) remains displayed; the
    /// error is kept for the per-section "unavailable" state.
    pub fn fail_fetch(&mut self, generation: u64, error: &ServiceError) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "ignoring superseded fetch failure");
            return;
        }
        error!(%error, "fetch failed; keeping previously loaded data");
        self.last_error = Some(error.to_string());
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn data(&self) -> Option<&RawSets> {
        self.data.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(tag: i64) -> RawSets {
        RawSets {
            regions: vec![],
            sales: vec![SalesRecord {
                region_id: tag,
                month: 11,
                year: 2025,
                area_name: String::new(),
                division: String::new(),
                sales_target: 0.0,
                gross_sales: 0.0,
                sales_return: 0.0,
                net_sales: 0.0,
                sales_ach_pct: 0.0,
            }],
            collections: vec![],
            products: vec![],
        }
    }

    #[test]
    fn newer_fetch_wins_over_superseded_one() {
        let mut session = FetchSession::new();
        let first = session.begin_fetch();
        let second = session.begin_fetch();
        assert!(session.complete_fetch(second, sets(2)));
        // the older response arrives late and must be discarded
        assert!(!session.complete_fetch(first, sets(1)));
        assert_eq!(session.data().unwrap().sales[0].region_id, 2);
        assert!(!session.is_loading());
    }

    #[test]
    fn failure_keeps_prior_data_displayed() {
        let mut session = FetchSession::new();
        let gen1 = session.begin_fetch();
        assert!(session.complete_fetch(gen1, sets(7)));
        let gen2 = session.begin_fetch();
        assert!(session.is_loading());
        session.fail_fetch(gen2, &ServiceError::Unavailable("boom".into()));
        assert!(!session.is_loading());
        assert_eq!(session.data().unwrap().sales[0].region_id, 7);
        assert_eq!(session.last_error(), Some("data source unavailable: boom"));
    }

    #[test]
    fn stale_failure_does_not_clear_loading() {
        let mut session = FetchSession::new();
        let old = session.begin_fetch();
        let _new = session.begin_fetch();
        session.fail_fetch(old, &ServiceError::Unavailable("slow".into()));
        assert!(session.is_loading());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn upload_response_decodes_with_optional_details() {
        let payload = r#"{
            "message": "Processed sales_collection file",
            "file_type": "sales_collection",
            "records_processed": 42,
            "details": {"month_name": "November", "year": 2025, "deleted_records": 12}
        }"#;
        let resp: UploadResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(resp.records_processed, 42);
        assert_eq!(resp.details.unwrap().month_name, "November");

        let bare = r#"{"message": "ok", "file_type": "product_comparison", "records_processed": 5}"#;
        let resp: UploadResponse = serde_json::from_str(bare).unwrap();
        assert!(resp.details.is_none());
    }

    #[test]
    fn json_service_applies_month_year_slice() {
        let dir = std::env::temp_dir().join(format!("salesdash-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let sales = r#"[
            {"region_id": 1, "month": 10, "year": 2025, "net_sales": 10.0},
            {"region_id": 1, "month": 11, "year": 2025, "net_sales": 20.0},
            {"region_id": 1, "month": 11, "year": 2024, "net_sales": 30.0}
        ]"#;
        std::fs::write(dir.join("sales.json"), sales).unwrap();
        let service = JsonDataService::new(&dir);

        let nov = service.sales(Some(11), Some(2025)).unwrap();
        assert_eq!(nov.len(), 1);
        assert_eq!(nov[0].net_sales, 20.0);

        // omitted month = all months of the year
        let year = service.sales(None, Some(2025)).unwrap();
        assert_eq!(year.len(), 2);

        // the category reference set is never period-sliced
        let products = r#"[
            {"product_id": 1, "product_name": "Maize", "product_category": "Seed"},
            {"product_id": 2, "product_name": "Urea", "product_category": "Fertilizer"}
        ]"#;
        std::fs::write(dir.join("products.json"), products).unwrap();
        let catalog = service.products().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[1].product_category.as_deref(), Some("Fertilizer"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let dir = std::env::temp_dir().join(format!("salesdash-decode-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("regions.json"), "{not json").unwrap();
        let service = JsonDataService::new(&dir);
        match service.regions() {
            Err(ServiceError::Decode { endpoint, .. }) => assert_eq!(endpoint, "regions"),
            other => panic!("expected decode error, got {:?}", other.map(|v| v.len())),
        }
        std::fs::remove_dir_all(&dir).ok();
    }
}
