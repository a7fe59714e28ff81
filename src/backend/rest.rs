use crate::api::{
    client::Gateway,
    dataset::{CsvUpload, DatasetSummary},
    error::{GatewayError, ProtocolError, TransportError},
    metrics::MetricsSnapshot,
    score::ScoreRow,
    train::{TrainRequest, TrainResult},
};
use anyhow::{Context, Error};
use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Environment override for the service base address.
pub const API_URL_ENV: &str = "CHURN_INSIGHT_API";

const UPLOAD_BOUNDARY: &str = "---------------------------churn-insight";

/// REST backend for the churn insight service.
///
/// Holds nothing but the base address; every call is one request.
pub struct Server {
    api_url: String,
}

impl Server {
    /// The `url` should be something like `http://127.0.0.1:8000`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Server {
            api_url: api_url.into(),
        }
    }

    /// Base address from the `CHURN_INSIGHT_API` variable, falling back to
    /// the local loopback default.
    pub fn from_env() -> Self {
        let url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        Server::new(url)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Probe `GET /` and return the service's hello message.
    pub fn ping(&self) -> Result<String, GatewayError> {
        let health = self.execute(Health)?;
        Ok(health.message)
    }

    fn execute<Ep, Val>(&self, request: Ep) -> Result<Val, GatewayError>
    where
        Ep: Endpoint<Value = Val> + EndpointExt,
    {
        let url = format!("{}{}", self.api_url, Ep::PATH);
        debug!("{:?} {}", Ep::METHOD, url);
        let http_response = match Ep::METHOD {
            Method::Get => ureq::get(&url).call(),
            Method::Post => {
                let body = Ep::write_request_string(&request)
                    .context("serializing request failed")
                    .map_err(|source| ProtocolError {
                        url: url.clone(),
                        source,
                    })?;
                ureq::post(&url)
                    .set("Content-Type", "application/json")
                    .send_string(&body)
            }
        };
        let text = read_success(&url, http_response)?;
        let response = Ep::read_response_string(&text)
            .with_context(|| format!("deserializing response failed:\n{}", &text))
            .map_err(|source| ProtocolError { url, source })?;
        Ok(Ep::extract(response))
    }
}

impl Gateway for Server {
    fn upload_dataset(&self, file: &CsvUpload) -> Result<DatasetSummary, GatewayError> {
        let url = format!("{}/upload", self.api_url);
        debug!("Post {} ({} bytes)", url, file.bytes.len());
        let body = multipart_csv(file);
        let content_type = format!("multipart/form-data; boundary={}", UPLOAD_BOUNDARY);
        let http_response = ureq::post(&url)
            .set("Content-Type", &content_type)
            .send_bytes(&body);
        let text = read_success(&url, http_response)?;
        serde_json::from_str::<DatasetSummary>(&text)
            .with_context(|| format!("deserializing response failed:\n{}", &text))
            .map_err(|source| ProtocolError { url, source }.into())
    }

    fn train(&self, request: &TrainRequest) -> Result<TrainResult, GatewayError> {
        self.execute(Train {
            target: &request.target,
            id_column: &request.id_column,
        })
    }

    fn fetch_metrics(&self) -> Result<MetricsSnapshot, GatewayError> {
        self.execute(FetchMetrics)
    }

    fn score_all(&self) -> Result<Vec<ScoreRow>, GatewayError> {
        self.execute(ScoreAll {})
    }
}

/// Multipart body with a single `file` field carrying the CSV bytes, the
/// shape the service's upload route expects.
fn multipart_csv(file: &CsvUpload) -> Vec<u8> {
    let mut body = Vec::with_capacity(file.bytes.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", UPLOAD_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
             Content-Type: text/csv\r\n\r\n",
            file.file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(&file.bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", UPLOAD_BOUNDARY).as_bytes());
    body
}

/// Error bodies are `{"detail": "..."}`; fall back to the raw body when
/// they are not.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

fn status_message(body: String) -> String {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.detail,
        Err(_) => body,
    }
}

fn read_success(url: &str, response: ureq::Response) -> Result<String, GatewayError> {
    if let Some(err) = response.synthetic_error() {
        return Err(TransportError::Network {
            url: url.to_owned(),
            message: err.to_string(),
        }
        .into());
    }
    if response.error() {
        let status = response.status();
        let body = response
            .into_string()
            .unwrap_or_else(|_| "could not read error body".to_owned());
        return Err(TransportError::Status {
            url: url.to_owned(),
            status,
            message: status_message(body),
        }
        .into());
    }
    response.into_string().map_err(|err| {
        TransportError::Network {
            url: url.to_owned(),
            message: err.to_string(),
        }
        .into()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

trait Endpoint {
    const PATH: &'static str;
    const METHOD: Method;

    type Response;
    type Value;

    fn extract(response: Self::Response) -> Self::Value;
}

trait EndpointExt: Endpoint {
    fn write_request_string(request: &Self) -> Result<String, Error>;
    fn read_response_string(response: &str) -> Result<Self::Response, Error>;
}

impl<P, R, V> EndpointExt for P
where
    P: Serialize,
    R: DeserializeOwned,
    P: Endpoint<Response = R, Value = V>,
{
    fn write_request_string(request: &Self) -> Result<String, Error> {
        Ok(serde_json::to_string(request)?)
    }

    fn read_response_string(response: &str) -> Result<Self::Response, Error> {
        let response = serde_json::from_str::<'_, R>(response)?;
        Ok(response)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct Train<'a> {
    pub target: &'a str,
    pub id_column: &'a str,
}
impl Endpoint for Train<'_> {
    const PATH: &'static str = "/train";
    const METHOD: Method = Method::Post;
    type Response = TrainResult;
    type Value = TrainResult;

    fn extract(response: Self::Response) -> Self::Value {
        response
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct FetchMetrics;
impl Endpoint for FetchMetrics {
    const PATH: &'static str = "/metrics";
    const METHOD: Method = Method::Get;
    type Response = MetricsSnapshot;
    type Value = MetricsSnapshot;

    fn extract(response: Self::Response) -> Self::Value {
        response
    }
}

// The score route takes an empty JSON object for now.
#[derive(Debug, Clone, Copy, Serialize)]
struct ScoreAll {}
#[derive(Deserialize)]
struct ScoreAllResponse {
    #[serde(default)]
    scores: Vec<ScoreRow>,
}
impl Endpoint for ScoreAll {
    const PATH: &'static str = "/score";
    const METHOD: Method = Method::Post;
    type Response = ScoreAllResponse;
    type Value = Vec<ScoreRow>;

    fn extract(response: Self::Response) -> Self::Value {
        response.scores
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct Health;
#[derive(Deserialize)]
struct HealthResponse {
    #[serde(default)]
    message: String,
}
impl Endpoint for Health {
    const PATH: &'static str = "/";
    const METHOD: Method = Method::Get;
    type Response = HealthResponse;
    type Value = HealthResponse;

    fn extract(response: Self::Response) -> Self::Value {
        response
    }
}
