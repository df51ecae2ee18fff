//! `HttpPlanApi` — subscription plan lookup on the internal HTTP API.
//!
//! `GET {server}/api/users/getUserSubscriptionPlan?userId=<id>`; the JSON body
//! is returned unchanged.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::PlanApi;
use crate::error::Result;

const PLAN_ENDPOINT: &str = "/api/users/getUserSubscriptionPlan";

#[derive(Debug, Clone)]
pub struct HttpPlanApi {
    client: reqwest::Client,
    server_host: String,
}

impl HttpPlanApi {
    pub fn new(server_host: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), server_host)
    }

    pub fn with_client(client: reqwest::Client, server_host: impl Into<String>) -> Self {
        let server_host = server_host.into().trim_end_matches('/').to_string();
        Self {
            client,
            server_host,
        }
    }

    pub fn plan_url(&self) -> String {
        format!("{}{}", self.server_host, PLAN_ENDPOINT)
    }
}

#[async_trait]
impl PlanApi for HttpPlanApi {
    async fn user_subscription_plan(&self, user_id: &str) -> Result<Value> {
        let url = self.plan_url();
        debug!(%url, %user_id, "requesting subscription plan");
        let plan = self
            .client
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(plan)
    }
}
