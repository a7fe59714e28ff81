pub mod api;
pub mod backend;
pub mod pipeline;
pub mod view;

pub use api::client::Gateway;
pub use api::dataset::CsvUpload;
pub use api::error::{GatewayError, ProtocolError, TransportError};
pub use backend::rest::Server;
pub use pipeline::{Pipeline, Stage, StageStatus, StageStore};
