//! Remote snapshot store
//!
//! HTTP client for the sync server: login/register yield a bearer token
//! plus the stored history snapshot, and data sync overwrites the whole
//! snapshot server-side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::history::HistoryStore;

use super::{Credential, HistoryBackend, SyncError, SyncResult};

/// Authenticated account identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

/// Result of a login or registration: the token and the initial snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
    #[serde(default)]
    pub history: HistoryStore,
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct DataResponse {
    #[serde(default)]
    history: HistoryStore,
}

#[derive(Serialize)]
struct SyncRequest<'a> {
    history: &'a HistoryStore,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the remote sync API
#[derive(Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into a typed error carrying the server message
    async fn check(response: reqwest::Response) -> SyncResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| "request failed".to_string());
        Err(SyncError::Rejected { status, message })
    }

    /// Exchange credentials for a token and the stored history
    pub async fn login(&self, username: &str, password: &str) -> SyncResult<AuthSession> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&AuthRequest { username, password })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Create an account; the returned history is empty
    pub async fn register(&self, username: &str, password: &str) -> SyncResult<AuthSession> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&AuthRequest { username, password })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn fetch(&self, token: &str) -> SyncResult<HistoryStore> {
        let response = self
            .http
            .get(self.url("/data"))
            .bearer_auth(token)
            .send()
            .await?;
        let body: DataResponse = Self::check(response).await?.json().await?;
        Ok(body.history)
    }

    async fn push(&self, token: &str, history: &HistoryStore) -> SyncResult<()> {
        let response = self
            .http
            .post(self.url("/data/sync"))
            .bearer_auth(token)
            .json(&SyncRequest { history })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn token<'a>(credential: &'a Credential) -> SyncResult<&'a str> {
        match credential {
            Credential::Token(token) => Ok(token),
            Credential::Offline => Err(SyncError::MissingCredential),
        }
    }
}

#[async_trait]
impl HistoryBackend for RemoteStore {
    async fn load(&self, credential: &Credential) -> SyncResult<HistoryStore> {
        self.fetch(Self::token(credential)?).await
    }

    async fn save(&self, credential: &Credential, history: &HistoryStore) -> SyncResult<()> {
        self.push(Self::token(credential)?, history).await
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let store = RemoteStore::new("http://127.0.0.1:5000/api/");
        assert_eq!(store.url("/data/sync"), "http://127.0.0.1:5000/api/data/sync");
    }

    #[tokio::test]
    async fn test_offline_credential_is_rejected() {
        let store = RemoteStore::new("http://127.0.0.1:5000/api");
        let err = store
            .save(&Credential::Offline, &HistoryStore::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingCredential));
    }

    #[test]
    fn test_auth_session_decodes_wire_shape() {
        let wire = r#"{
            "token": "jwt-abc",
            "user": {"id": "65f0", "username": "player-one"},
            "history": {"2025-03-01": {"completedIds": [], "habits": {}, "extraProtein": 0, "extraKcal": 0, "waterIntake": 0, "readiness": 8}}
        }"#;
        let session: AuthSession = serde_json::from_str(wire).unwrap();
        assert_eq!(session.user.username, "player-one");
        assert_eq!(session.history.days_tracked(), 1);
    }
}
