use crate::domain::madmp::PlanEnvelope;
use crate::domain::model::{AuthToken, GrantRecord, PlanRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Read side of the grants registry.
#[async_trait]
pub trait GrantRegistry: Send + Sync {
    async fn fetch_grant(&self, registry_key: &str) -> Result<GrantRecord>;
}

/// DMPonline REST surface. Calls that need a bearer token take it by value.
#[async_trait]
pub trait DmpPlatform: Send + Sync {
    async fn authenticate(&self) -> Result<AuthToken>;
    async fn fetch_plan(&self, token: AuthToken, plan_id: &str) -> Result<PlanRecord>;
    /// API v0: authorised with the stored code directly, no token exchange.
    async fn fetch_plan_v0(&self, plan_id: &str) -> Result<PlanRecord>;
    async fn list_templates(&self, token: AuthToken) -> Result<PlanRecord>;
    async fn create_plan(&self, token: AuthToken, plan: &PlanEnvelope) -> Result<PlanRecord>;
}
