//! Foreground permission and subscription lifecycle.

use crate::error::AgentError;
use crate::key::url_base64_to_bytes;
use crate::platform::{NotificationPermissions, Permission, PushManager};
use crate::server::NotifyServer;

/// Where the page is in the push subscription lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentState {
    Unregistered,
    PermissionRequested,
    Subscribed { endpoint: String },
    Unsubscribed,
    /// The user blocked notifications. Only the browser settings can undo it.
    PermissionDenied,
}

pub struct PushAgent<P, M, S> {
    permissions: P,
    push: M,
    server: S,
    state: AgentState,
}

impl<P, M, S> PushAgent<P, M, S>
where
    P: NotificationPermissions,
    M: PushManager,
    S: NotifyServer,
{
    pub fn new(permissions: P, push: M, server: S) -> Self {
        Self {
            permissions,
            push,
            server,
            state: AgentState::Unregistered,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Make sure this browser has a push subscription registered with the
    /// server. Safe to call on every page load.
    pub async fn ensure_subscribed(&mut self, enabled: bool) -> Result<&AgentState, AgentError> {
        if !enabled {
            return Ok(&self.state);
        }
        if matches!(
            self.state,
            AgentState::Subscribed { .. } | AgentState::PermissionDenied
        ) {
            return Ok(&self.state);
        }

        if let Some(existing) = self.push.get_subscription().await? {
            tracing::debug!(endpoint = %existing.endpoint, "reusing existing push subscription");
            self.server.subscribe(&existing).await?;
            self.state = AgentState::Subscribed {
                endpoint: existing.endpoint,
            };
            return Ok(&self.state);
        }

        match self.permissions.permission() {
            Permission::Denied => {
                self.state = AgentState::PermissionDenied;
                return Ok(&self.state);
            }
            Permission::Granted => {}
            Permission::Default => {
                self.state = AgentState::PermissionRequested;
                match self.permissions.request_permission().await {
                    Permission::Granted => {}
                    Permission::Denied => {
                        tracing::info!("notification permission denied");
                        self.state = AgentState::PermissionDenied;
                        return Ok(&self.state);
                    }
                    // Prompt dismissed; ask again next time.
                    Permission::Default => {
                        self.state = AgentState::Unregistered;
                        return Ok(&self.state);
                    }
                }
            }
        }

        match self.subscribe_fresh().await {
            Ok(endpoint) => {
                self.state = AgentState::Subscribed { endpoint };
                Ok(&self.state)
            }
            Err(err) => {
                self.state = AgentState::Unregistered;
                Err(err)
            }
        }
    }

    async fn subscribe_fresh(&self) -> Result<String, AgentError> {
        let public_key = self.server.vapid_public_key().await?;
        let application_server_key = url_base64_to_bytes(&public_key)?;
        let subscription = self.push.subscribe(&application_server_key).await?;
        self.server.subscribe(&subscription).await?;
        tracing::info!(endpoint = %subscription.endpoint, "push subscription registered");
        Ok(subscription.endpoint)
    }

    /// Drop the browser subscription and tell the server to forget it.
    pub async fn unsubscribe(&mut self) -> Result<&AgentState, AgentError> {
        if let Some(subscription) = self.push.get_subscription().await? {
            self.push.unsubscribe().await?;
            self.server.unsubscribe(&subscription.endpoint).await?;
        }
        self.state = AgentState::Unsubscribed;
        Ok(&self.state)
    }
}
