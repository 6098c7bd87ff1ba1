use crate::adapters::{join_url, run_log::RunLog};
use crate::config::{Settings, LOGFILE, SWECRIS_API_KEY, SWECRIS_URL};
use crate::domain::model::GrantRecord;
use crate::domain::ports::GrantRegistry;
use crate::utils::error::{DmpError, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};

const SERVICE: &str = "SweCRIS";

/// Read-only client for the SweCRIS projects endpoint.
pub struct SwecrisClient {
    client: Client,
    base_url: String,
    api_key: String,
    run_log: Option<RunLog>,
}

impl SwecrisClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            run_log: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Self::new(settings.require(SWECRIS_URL)?, settings.require(SWECRIS_API_KEY)?);
        Ok(match &settings.logfile {
            Some(path) => client.with_run_log(RunLog::new(path)),
            None => client,
        })
    }

    pub fn with_run_log(mut self, run_log: RunLog) -> Self {
        self.run_log = Some(run_log);
        self
    }

    fn record_missing(&self, registry_key: &str) {
        let line = format!(
            "No data for id: {} was found in {}! Skipping.",
            registry_key, SERVICE
        );
        let Some(run_log) = &self.run_log else {
            tracing::warn!("{} is not set, run log line dropped: {}", LOGFILE, line);
            return;
        };
        if let Err(e) = run_log.append(&line) {
            tracing::warn!("Could not append to run log: {}", e);
        }
    }
}

#[async_trait]
impl GrantRegistry for SwecrisClient {
    async fn fetch_grant(&self, registry_key: &str) -> Result<GrantRecord> {
        let url = join_url(&self.base_url, registry_key);
        tracing::debug!("📡 Requesting {} project: {}", SERVICE, url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let status = response.status();
        tracing::debug!("📡 {} response status: {}", SERVICE, status);

        // SweCRIS answers unknown project ids with a 500.
        if status == StatusCode::NOT_FOUND || status.is_server_error() {
            self.record_missing(registry_key);
            return Err(DmpError::NotFound {
                service: SERVICE.to_string(),
                id: registry_key.to_string(),
            });
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(DmpError::Request {
                service: SERVICE.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| DmpError::Request {
            service: SERVICE.to_string(),
            message: format!("unexpected project payload: {}", e),
        })
    }
}
