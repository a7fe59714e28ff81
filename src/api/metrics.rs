use serde::{Deserialize, Serialize};

/// Aggregate model and churn metrics.
///
/// `top_features` keeps the service's ranking order; consumers must not
/// resort it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub churn_rate: f64,
    #[serde(default)]
    pub top_features: Vec<FeatureWeight>,
    #[serde(default)]
    pub auc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub name: String,
    pub weight: f64,
}
