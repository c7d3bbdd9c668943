use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument};

use super::{RegistryClient, RegistryError};
use crate::patient::domain::PatientProfile;

/// Registry reached over HTTP at `GET {base}/patient/search/{id}`.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    client: Client,
    base_url: Url,
}

impl HttpRegistryClient {
    /// Build a client with a request timeout applied to every call.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// `identifier` is appended as a single, percent-encoded path segment.
    fn search_url(&self, identifier: &str) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RegistryError::Transport(format!("base url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["patient", "search", identifier]);
        Ok(url)
    }
}

fn map_transport_error(err: reqwest::Error) -> RegistryError {
    if err.is_timeout() {
        RegistryError::Timeout
    } else {
        RegistryError::Transport(err.to_string())
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    #[instrument(skip_all)]
    async fn search_patient(&self, identifier: &str) -> Result<PatientProfile, RegistryError> {
        let url = self.search_url(identifier)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        debug!(host = self.base_url.host_str().unwrap_or_default(), status = status.as_u16(), "registry responded");
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound);
        }
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice(&body).map_err(|e| RegistryError::Decode(e.to_string()))
    }
}
