pub mod client;
pub mod dataset;
pub mod error;
pub mod id;
pub mod metrics;
pub mod score;
pub mod train;
