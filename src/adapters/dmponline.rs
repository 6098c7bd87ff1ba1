use crate::adapters::join_url;
use crate::config::{
    Settings, DMPONLINE_API_URL, DMPONLINE_API_URL_V0, DMPONLINE_AUTH_CODE, DMPONLINE_USER,
};
use crate::domain::madmp::PlanEnvelope;
use crate::domain::model::{AuthToken, PlanRecord};
use crate::domain::ports::DmpPlatform;
use crate::utils::error::{DmpError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

const SERVICE: &str = "DMPonline";

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    grant_type: &'a str,
    email: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
}

/// DMPonline API client. v1 calls exchange the stored authorization code
/// for a bearer token first; v0 sends the code itself.
pub struct DmpOnlineClient {
    client: Client,
    api_url: String,
    api_url_v0: Option<String>,
    user: String,
    auth_code: String,
}

impl DmpOnlineClient {
    pub fn new(
        api_url: impl Into<String>,
        user: impl Into<String>,
        auth_code: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            api_url_v0: None,
            user: user.into(),
            auth_code: auth_code.into(),
        }
    }

    pub fn with_v0_url(mut self, api_url_v0: impl Into<String>) -> Self {
        self.api_url_v0 = Some(api_url_v0.into());
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Self::new(
            settings.require(DMPONLINE_API_URL)?,
            settings.require(DMPONLINE_USER)?,
            settings.require(DMPONLINE_AUTH_CODE)?,
        );
        Ok(match &settings.dmponline_api_url_v0 {
            Some(url) => client.with_v0_url(url),
            None => client,
        })
    }

    /// Client for API v0 downloads only, which need neither the v1 base URL
    /// nor a user.
    pub fn v0_from_settings(settings: &Settings) -> Result<Self> {
        let api_url_v0 = settings.require(DMPONLINE_API_URL_V0)?;
        Ok(Self::new(api_url_v0, "", settings.require(DMPONLINE_AUTH_CODE)?).with_v0_url(api_url_v0))
    }

    fn endpoint(&self, path: &str) -> String {
        join_url(&self.api_url, path)
    }
}

/// Non-2xx or non-JSON answers are request failures; the body is kept in
/// the error so the operator can read what the server said.
async fn read_record(response: Response) -> Result<PlanRecord> {
    let status = response.status();
    let raw = response.text().await?;
    tracing::debug!("📡 {} response status: {}", SERVICE, status);

    if !status.is_success() {
        return Err(DmpError::Request {
            service: SERVICE.to_string(),
            message: format!("HTTP {}: {}", status, raw),
        });
    }
    PlanRecord::parse(SERVICE, raw)
}

#[async_trait]
impl DmpPlatform for DmpOnlineClient {
    async fn authenticate(&self) -> Result<AuthToken> {
        let url = self.endpoint("authenticate");
        tracing::debug!("🔐 Authenticating {} against {}", self.user, url);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&AuthRequest {
                grant_type: "authorization_code",
                email: &self.user,
                code: &self.auth_code,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DmpError::Auth {
                service: SERVICE.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let parsed: AuthResponse = serde_json::from_str(&body).map_err(|e| DmpError::Auth {
            service: SERVICE.to_string(),
            message: format!("response is not JSON ({}): {}", e, body),
        })?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                tracing::info!("🔐 Authorized against {}", SERVICE);
                Ok(AuthToken::new(token))
            }
            _ => Err(DmpError::Auth {
                service: SERVICE.to_string(),
                message: "response carries no access_token".to_string(),
            }),
        }
    }

    async fn fetch_plan(&self, token: AuthToken, plan_id: &str) -> Result<PlanRecord> {
        let url = self.endpoint(&format!("plans/{}", plan_id));
        tracing::info!("📡 Fetching plan from {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, token.bearer())
            .send()
            .await?;
        read_record(response).await
    }

    async fn fetch_plan_v0(&self, plan_id: &str) -> Result<PlanRecord> {
        let base = self
            .api_url_v0
            .as_deref()
            .ok_or_else(|| DmpError::MissingConfig {
                field: DMPONLINE_API_URL_V0.to_string(),
            })?;
        let url = join_url(base, "plans");
        tracing::info!("📡 Fetching plan {} from {} (API v0)", plan_id, url);

        let response = self
            .client
            .get(&url)
            .query(&[("plan", plan_id)])
            .header(AUTHORIZATION, format!("Token token={}", self.auth_code))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        read_record(response).await
    }

    async fn list_templates(&self, token: AuthToken) -> Result<PlanRecord> {
        let url = self.endpoint("templates");
        tracing::info!("📡 Fetching templates from {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, token.bearer())
            .send()
            .await?;
        read_record(response).await
    }

    async fn create_plan(&self, token: AuthToken, plan: &PlanEnvelope) -> Result<PlanRecord> {
        let url = self.endpoint("plans");
        tracing::info!("📡 Creating plan at {}", url);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, token.bearer())
            .json(plan)
            .send()
            .await?;
        read_record(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    async fn auth_mock(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/authenticate")
                    .json_body(serde_json::json!({
                        "grant_type": "authorization_code",
                        "email": "dmp@example.com",
                        "code": "stored-code"
                    }));
                then.status(200).json_body(serde_json::json!({
                    "access_token": "token-123",
                    "token_type": "Bearer",
                    "expires_in": 7200
                }));
            })
            .await
    }

    fn client(server: &MockServer) -> DmpOnlineClient {
        DmpOnlineClient::new(server.url("/api/v1/"), "dmp@example.com", "stored-code")
            .with_v0_url(server.url("/api/v0/"))
    }

    #[tokio::test]
    async fn test_authenticate_then_fetch_plan() {
        let server = MockServer::start_async().await;
        let auth = auth_mock(&server).await;
        let plan = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/plans/135516")
                    .header("authorization", "Bearer token-123");
                then.status(200)
                    .json_body(serde_json::json!({"items": [{"dmp": {"title": "Plan"}}]}));
            })
            .await;

        let client = client(&server);
        let token = client.authenticate().await.unwrap();
        let record = client.fetch_plan(token, "135516").await.unwrap();

        auth.assert_async().await;
        plan.assert_async().await;
        assert_eq!(record.items().unwrap()[0]["dmp"]["title"], "Plan");
    }

    #[tokio::test]
    async fn test_internal_server_error_fails_authentication() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/authenticate");
                then.status(500).body("Internal server error");
            })
            .await;

        let result = client(&server).authenticate().await;
        assert!(matches!(result, Err(DmpError::Auth { .. })));
    }

    #[tokio::test]
    async fn test_missing_access_token_fails_authentication() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/authenticate");
                then.status(200).json_body(serde_json::json!({"error": "invalid code"}));
            })
            .await;

        let result = client(&server).authenticate().await;
        assert!(matches!(result, Err(DmpError::Auth { .. })));
    }

    #[tokio::test]
    async fn test_v0_uses_token_header_and_query() {
        let server = MockServer::start_async().await;
        let plan = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v0/plans")
                    .query_param("plan", "135516")
                    .header("authorization", "Token token=stored-code");
                then.status(200).json_body(serde_json::json!([{"id": 135516}]));
            })
            .await;

        let record = client(&server).fetch_plan_v0("135516").await.unwrap();
        plan.assert_async().await;
        assert_eq!(record.body[0]["id"], 135516);
    }

    #[test]
    fn test_v0_client_needs_only_v0_settings() {
        let settings = Settings::from_lookup(|key| match key {
            "DMPONLINE_API_URL_V0" => Some("https://dmponline.example/api/v0/".to_string()),
            "DMPONLINE_AUTH_CODE" => Some("code".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(DmpOnlineClient::v0_from_settings(&settings).is_ok());
        assert!(matches!(
            DmpOnlineClient::from_settings(&settings),
            Err(DmpError::MissingConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_plan_error_is_request_error() {
        let server = MockServer::start_async().await;
        auth_mock(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/plans");
                then.status(400)
                    .json_body(serde_json::json!({"errors": ["template not found"]}));
            })
            .await;

        let client = client(&server);
        let token = client.authenticate().await.unwrap();
        let envelope = PlanEnvelope {
            total_items: 0,
            items: vec![],
        };
        let err = client.create_plan(token, &envelope).await.unwrap_err();
        assert!(matches!(err, DmpError::Request { ref message, .. } if message.contains("template not found")));
    }

    #[tokio::test]
    async fn test_non_json_plan_is_request_error() {
        let server = MockServer::start_async().await;
        auth_mock(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/templates");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let client = client(&server);
        let token = client.authenticate().await.unwrap();
        assert!(matches!(
            client.list_templates(token).await,
            Err(DmpError::Request { .. })
        ));
    }
}
