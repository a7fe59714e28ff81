use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<String> for CustomerId {
    fn from(id: String) -> Self {
        CustomerId(id)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        CustomerId(id.to_owned())
    }
}
