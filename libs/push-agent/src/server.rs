//! Client for the notification server's subscription endpoints.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use tavola_common::PushSubscriptionInfo;

use crate::error::AgentError;

/// Subscription endpoints of the notification server.
#[async_trait(?Send)]
pub trait NotifyServer {
    /// `GET /notifications/config`. [`AgentError::NotConfigured`] when the
    /// server has no VAPID key.
    async fn vapid_public_key(&self) -> Result<String, AgentError>;

    async fn subscribe(&self, subscription: &PushSubscriptionInfo) -> Result<(), AgentError>;

    async fn unsubscribe(&self, endpoint: &str) -> Result<(), AgentError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    vapid_public_key: String,
}

/// [`NotifyServer`] over HTTP (`fetch` on wasm targets).
pub struct HttpNotifyServer {
    http: reqwest::Client,
    base_url: String,
    admin_id: Option<String>,
}

impl HttpNotifyServer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_id: None,
        }
    }

    /// Send `x-admin-id` directly, for deployments without an auth gateway.
    pub fn with_admin_id(mut self, admin_id: impl Into<String>) -> Self {
        self.admin_id = Some(admin_id.into());
        self
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.http.post(format!("{}{path}", self.base_url));
        match &self.admin_id {
            Some(id) => request.header("x-admin-id", id),
            None => request,
        }
    }
}

fn server_error(err: reqwest::Error) -> AgentError {
    AgentError::Server(err.to_string())
}

#[async_trait(?Send)]
impl NotifyServer for HttpNotifyServer {
    async fn vapid_public_key(&self) -> Result<String, AgentError> {
        let response = self
            .http
            .get(format!("{}/notifications/config", self.base_url))
            .send()
            .await
            .map_err(server_error)?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Err(AgentError::NotConfigured);
        }
        let config: ConfigResponse = response
            .error_for_status()
            .map_err(server_error)?
            .json()
            .await
            .map_err(server_error)?;
        Ok(config.vapid_public_key)
    }

    async fn subscribe(&self, subscription: &PushSubscriptionInfo) -> Result<(), AgentError> {
        let response = self
            .post("/notifications/subscribe")
            .json(&serde_json::json!({ "subscription": subscription }))
            .send()
            .await
            .map_err(server_error)?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Err(AgentError::NotConfigured);
        }
        response.error_for_status().map_err(server_error)?;
        Ok(())
    }

    async fn unsubscribe(&self, endpoint: &str) -> Result<(), AgentError> {
        self.post("/notifications/unsubscribe")
            .json(&serde_json::json!({ "endpoint": endpoint }))
            .send()
            .await
            .map_err(server_error)?
            .error_for_status()
            .map_err(server_error)?;
        Ok(())
    }
}
