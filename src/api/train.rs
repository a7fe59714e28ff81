use serde::{Deserialize, Serialize};

pub const DEFAULT_ID_COLUMN: &str = "customer_id";

/// Parameters for a training run, built fresh per invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainRequest {
    pub target: String,
    pub id_column: String,
}

impl TrainRequest {
    pub fn new(target: impl Into<String>) -> Self {
        TrainRequest {
            target: target.into(),
            id_column: DEFAULT_ID_COLUMN.to_owned(),
        }
    }

    pub fn with_id_column(mut self, id_column: impl Into<String>) -> Self {
        self.id_column = id_column.into();
        self
    }
}

/// Outcome of a training run.
///
/// `auc` is null when the service could not compute a score for the fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainResult {
    #[serde(default)]
    pub auc: Option<f64>,
    #[serde(default)]
    pub n_rows: Option<u64>,
    #[serde(default)]
    pub n_features: Option<u64>,
}
