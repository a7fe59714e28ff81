use crate::api::{
    dataset::{CsvUpload, DatasetSummary},
    error::GatewayError,
    metrics::MetricsSnapshot,
    score::ScoreRow,
    train::{TrainRequest, TrainResult},
};

/// The four-operation contract against the modeling service.
///
/// One outbound request per call, no retries, no state. Implementations
/// must be shareable across threads so stages can be in flight
/// concurrently.
pub trait Gateway: Send + Sync {
    fn upload_dataset(&self, file: &CsvUpload) -> Result<DatasetSummary, GatewayError>;
    fn train(&self, request: &TrainRequest) -> Result<TrainResult, GatewayError>;
    fn fetch_metrics(&self) -> Result<MetricsSnapshot, GatewayError>;
    fn score_all(&self) -> Result<Vec<ScoreRow>, GatewayError>;
}
