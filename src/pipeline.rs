pub mod orchestrator;
pub mod stage;
pub mod store;

pub use orchestrator::Pipeline;
pub use stage::{Stage, StageStatus};
pub use store::{StageStore, StageView, Ticket};
