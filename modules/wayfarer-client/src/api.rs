use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use wayfarer_common::{EditRequest, ErrorBody, GenerateRequest, Trip};

/// Generation waits on the model, which the server allows up to two minutes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-2xx answer from the API, with the server's `{error, kind}` body.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        kind: String,
    },

    #[error("Could not reach the planner API: {0}")]
    Network(#[from] reqwest::Error),
}

impl ClientError {
    pub fn kind(&self) -> &str {
        match self {
            Self::Api { kind, .. } => kind,
            Self::Network(_) => "network",
        }
    }
}

/// The two planner endpoints, as the views consume them.
#[async_trait]
pub trait TripApi: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Trip, ClientError>;
    async fn edit_trip(&self, request: &EditRequest) -> Result<Trip, ClientError>;
}

pub struct HttpTripApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTripApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Trip, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Trip>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        Err(api_error(status, &text))
    }
}

fn api_error(status: StatusCode, text: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => ClientError::Api {
            status: status.as_u16(),
            message: body.error,
            kind: body.kind,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            message: format!("Planner API returned {status}"),
            kind: String::new(),
        },
    }
}

#[async_trait]
impl TripApi for HttpTripApi {
    async fn generate(&self, request: &GenerateRequest) -> Result<Trip, ClientError> {
        self.post("/api/generate", request).await
    }

    async fn edit_trip(&self, request: &EditRequest) -> Result<Trip, ClientError> {
        self.post("/api/edit-trip", request).await
    }
}
