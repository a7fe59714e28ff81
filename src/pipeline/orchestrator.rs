use crate::api::{
    client::Gateway,
    dataset::CsvUpload,
    error::GatewayError,
    train::TrainRequest,
};
use crate::backend::rest::Server;
use crate::pipeline::stage::Stage;
use crate::pipeline::store::{StageStore, Ticket};
use log::{debug, warn};
use std::sync::Arc;

/// Drives the four pipeline stages against a gateway.
///
/// Every operation is begin → one gateway call → settle. Errors are
/// absorbed into the owning stage's `Failed` status and never propagate
/// to callers. No stage triggers another and no ordering is enforced
/// between them; see [`Stage::prerequisite`] for the advisory chain.
pub struct Pipeline {
    gateway: Arc<dyn Gateway>,
    store: Arc<StageStore>,
}

impl Pipeline {
    pub fn new(gateway: Arc<dyn Gateway>, store: Arc<StageStore>) -> Self {
        Pipeline { gateway, store }
    }

    /// Pipeline against a service at `url`, with a fresh store.
    pub fn for_server(url: &str) -> Self {
        Pipeline::new(Arc::new(Server::new(url)), Arc::new(StageStore::new()))
    }

    /// Pipeline against the environment-configured service address.
    pub fn from_env() -> Self {
        Pipeline::new(Arc::new(Server::from_env()), Arc::new(StageStore::new()))
    }

    pub fn store(&self) -> &Arc<StageStore> {
        &self.store
    }

    /// Upload a dataset. `None` means no file was selected, which is a
    /// no-op rather than an error.
    pub fn ingest(&self, file: Option<CsvUpload>) {
        let file = match file {
            Some(file) => file,
            None => return,
        };
        debug!("ingesting {} ({} bytes)", file.file_name, file.bytes.len());
        let ticket = self.store.begin(Stage::Dataset);
        match self.gateway.upload_dataset(&file) {
            Ok(summary) => self.store.put_dataset(&ticket, summary),
            Err(err) => self.fail(&ticket, err),
        }
    }

    /// Train on the current dataset. The column names are passed through
    /// unchecked; the service decides whether they exist.
    pub fn train_model(&self, target: &str, id_column: &str) {
        let request = TrainRequest::new(target).with_id_column(id_column);
        debug!("training with target {:?}", request.target);
        let ticket = self.store.begin(Stage::Train);
        match self.gateway.train(&request) {
            Ok(result) => self.store.put_train(&ticket, result),
            Err(err) => self.fail(&ticket, err),
        }
    }

    pub fn fetch_metrics(&self) {
        let ticket = self.store.begin(Stage::Metrics);
        match self.gateway.fetch_metrics() {
            Ok(snapshot) => self.store.put_metrics(&ticket, snapshot),
            Err(err) => self.fail(&ticket, err),
        }
    }

    pub fn score_all(&self) {
        let ticket = self.store.begin(Stage::Score);
        match self.gateway.score_all() {
            Ok(scores) => self.store.put_scores(&ticket, scores),
            Err(err) => self.fail(&ticket, err),
        }
    }

    fn fail(&self, ticket: &Ticket, err: GatewayError) {
        warn!("{} request failed: {}", ticket.stage(), err);
        self.store.fail(ticket, err.to_string());
    }
}
