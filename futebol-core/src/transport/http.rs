//! Live backend over HTTP (blocking reqwest client).

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::blocking::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{checked, endpoints, ApiError, Backend, Validate, UPLOAD_FIELD};
use crate::api::{
    BacktestFold, BacktestRequest, EvaluateRequest, EvaluateResponse, FetchRequest, FetchResponse,
    HealthResponse, PredictRequest, PredictionRow, TrainRequest, TrainResponse,
};

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("futebol-1x2/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Validate,
    {
        let started = Instant::now();
        tracing::debug!(path, "GET");
        finish(path, started, self.client.get(self.url(path)).send())
    }

    fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Validate,
    {
        let started = Instant::now();
        tracing::debug!(path, "POST");
        finish(path, started, self.client.post(self.url(path)).json(body).send())
    }
}

/// Non-2xx becomes [`ApiError::Status`] with the body text; 2xx bodies are
/// decoded and validated.
fn decode<T>(resp: Response) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let status = resp.status();
    let text = resp.text()?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    checked(serde_json::from_str(&text)?)
}

/// Decode a sent request and log the outcome, transport failures included.
fn finish<T>(
    path: &str,
    started: Instant,
    sent: reqwest::Result<Response>,
) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let out = sent.map_err(ApiError::from).and_then(decode);
    log_outcome(path, started, &out);
    out
}

fn log_outcome<T>(path: &str, started: Instant, out: &Result<T, ApiError>) {
    let ms = started.elapsed().as_millis() as u64;
    match out {
        Ok(_) => tracing::info!(path, ms, "request ok"),
        Err(e) => tracing::warn!(path, ms, error = %e, "request failed"),
    }
}

impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "live"
    }

    fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get(endpoints::HEALTH)
    }

    fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse, ApiError> {
        self.post(endpoints::FETCH, req)
    }

    fn train(&self, req: &TrainRequest) -> Result<TrainResponse, ApiError> {
        self.post(endpoints::TRAIN, req)
    }

    fn evaluate(&self, req: &EvaluateRequest) -> Result<EvaluateResponse, ApiError> {
        self.post(endpoints::EVALUATE, req)
    }

    fn backtest(&self, req: &BacktestRequest) -> Result<Vec<BacktestFold>, ApiError> {
        self.post(endpoints::BACKTEST, req)
    }

    fn predict(&self, req: &PredictRequest) -> Result<Vec<PredictionRow>, ApiError> {
        self.post(endpoints::PREDICT, req)
    }

    fn upload_csv(&self, path: &Path) -> Result<serde_json::Value, ApiError> {
        let started = Instant::now();
        // The client sets the multipart content type and boundary itself.
        let form = match multipart::Form::new().file(UPLOAD_FIELD, path) {
            Ok(form) => form,
            Err(source) => {
                let err = ApiError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                tracing::warn!(path = endpoints::UPLOAD_CSV, error = %err, "request failed");
                return Err(err);
            }
        };
        let sent = self
            .client
            .post(self.url(endpoints::UPLOAD_CSV))
            .multipart(form)
            .send();
        finish(endpoints::UPLOAD_CSV, started, sent)
    }
}
