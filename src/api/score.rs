use crate::api::id::CustomerId;
use serde::{Deserialize, Serialize};

/// One scored entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub index: Option<u64>,
    pub prob: f64,
    pub recommendation: String,
}

impl ScoreRow {
    /// Display identifier: the explicit customer id verbatim when present,
    /// otherwise the wire index, otherwise the row's position in the set.
    pub fn identifier(&self, position: usize) -> String {
        if let Some(id) = &self.customer_id {
            return id.as_ref().to_owned();
        }
        match self.index {
            Some(index) => index.to_string(),
            None => position.to_string(),
        }
    }
}
