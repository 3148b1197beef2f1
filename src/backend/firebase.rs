//! Firebase REST adapter
//!
//! One HTTP client implementing all three backend traits:
//! - Identity Toolkit (`accounts:*`) and Secure Token for sign-in state
//! - Firestore `documents` for listings and profiles
//! - Cloud Storage for Firebase (`v0/b/{bucket}/o`) for images
//!
//! The signed-in user's id token is attached to Firestore and Storage calls.
//! Tokens are refreshed before use once they are about to expire.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::firestore;
use super::{
    AuthErrorCode, BackendError, BackendResult, Document, DocumentStore, Fields, IdentityProvider,
    ObjectStore, Query,
};
use crate::api::{AccountProfile, AuthUser};
use crate::config::{Config, Endpoints};

/// Refresh this long before the provider's expiry
const TOKEN_SLACK_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct Credentials {
    user: AuthUser,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

impl AccountResponse {
    fn user(&self) -> AuthUser {
        AuthUser {
            uid: self.local_id.clone(),
            email: self.email.clone().filter(|s| !s.is_empty()),
            display_name: self.display_name.clone().filter(|s| !s.is_empty()),
            photo_url: self.photo_url.clone().filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn expiry(expires_in: Option<&str>) -> DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(3600);
    Utc::now() + Duration::seconds(secs)
}

/// Object path encoded inside a download URL (`.../o/<encoded>?alt=media...`)
pub fn object_path_from_url(url: &str) -> Option<String> {
    let start = url.find("/o/")? + 3;
    let rest = &url[start..];
    let encoded = rest.split('?').next().unwrap_or(rest);
    if encoded.is_empty() {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}

pub struct FirebaseClient {
    http: Client,
    endpoints: Endpoints,
    api_key: String,
    project_id: String,
    bucket: String,
    session: Mutex<Option<Credentials>>,
    auth_tx: watch::Sender<Option<AuthUser>>,
}

impl FirebaseClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("servicefinder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let (auth_tx, _) = watch::channel(None);

        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
            api_key: config.api_key.clone(),
            project_id: config.project_id.clone(),
            bucket: config.bucket(),
            session: Mutex::new(None),
            auth_tx,
        })
    }

    fn session(&self) -> MutexGuard<'_, Option<Credentials>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_session(&self, credentials: Option<Credentials>) {
        let user = credentials.as_ref().map(|c| c.user.clone());
        *self.session() = credentials;
        self.auth_tx.send_replace(user);
    }

    fn identity_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.endpoints.identity, method, self.api_key
        )
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.endpoints.firestore, self.project_id
        )
    }

    fn objects_url(&self) -> String {
        format!("{}/b/{}/o", self.endpoints.storage, self.bucket)
    }

    /// Read the provider error envelope of a failed identity call
    async fn identity_error(response: Response) -> BackendError {
        let status = response.status();
        let envelope: ErrorEnvelope = response.json().await.unwrap_or_default();
        let code = AuthErrorCode::from_provider_message(&envelope.error.message);
        debug!(
            "identity toolkit error status={} message={}",
            status, envelope.error.message
        );
        if code == AuthErrorCode::Unknown && status.is_server_error() {
            return BackendError::Http {
                status: status.as_u16(),
                message: envelope.error.message,
            };
        }
        BackendError::Auth(code)
    }

    /// Map a failed Firestore/Storage response to a backend error
    async fn resource_error(response: Response) -> BackendError {
        let status = response.status();
        let envelope: ErrorEnvelope = response.json().await.unwrap_or_default();
        let message = if envelope.error.message.is_empty() {
            envelope.error.status
        } else {
            envelope.error.message
        };

        match status {
            StatusCode::NOT_FOUND => BackendError::NotFound(message),
            StatusCode::FORBIDDEN => BackendError::PermissionDenied(message),
            StatusCode::UNAUTHORIZED => BackendError::Unauthenticated,
            _ => BackendError::Http {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn account_call(&self, method: &str, body: Value) -> BackendResult<AccountResponse> {
        debug!("identity call accounts:{}", method);
        let response = self
            .http
            .post(self.identity_url(method))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::identity_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Replace the session from an account response that carries tokens
    fn store_account(&self, account: &AccountResponse) -> BackendResult<AuthUser> {
        let user = account.user();
        let id_token = account
            .id_token
            .clone()
            .ok_or_else(|| BackendError::Decode("account response without idToken".into()))?;
        let refresh_token = account.refresh_token.clone().unwrap_or_default();

        self.set_session(Some(Credentials {
            user: user.clone(),
            id_token,
            refresh_token,
            expires_at: expiry(account.expires_in.as_deref()),
        }));
        Ok(user)
    }

    async fn refresh(&self, refresh_token: &str) -> BackendResult<TokenResponse> {
        debug!("refreshing id token");
        let url = format!("{}/token?key={}", self.endpoints.token, self.api_key);
        let response = self
            .http
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::identity_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Current id token, refreshed first when it is about to expire
    async fn id_token(&self) -> BackendResult<Option<String>> {
        let current = self.session().clone();
        let Some(credentials) = current else {
            return Ok(None);
        };

        if credentials.expires_at > Utc::now() + Duration::seconds(TOKEN_SLACK_SECS) {
            return Ok(Some(credentials.id_token));
        }

        match self.refresh(&credentials.refresh_token).await {
            Ok(token) => {
                let mut session = self.session();
                if let Some(c) = session.as_mut() {
                    if c.user.uid == credentials.user.uid {
                        c.id_token = token.id_token.clone();
                        c.refresh_token = token.refresh_token;
                        c.expires_at = expiry(Some(&token.expires_in));
                    }
                }
                Ok(Some(token.id_token))
            }
            Err(e) => {
                warn!("token refresh failed, signing out: {}", e);
                self.set_session(None);
                Err(BackendError::Unauthenticated)
            }
        }
    }

    async fn require_token(&self) -> BackendResult<String> {
        self.id_token().await?.ok_or(BackendError::Unauthenticated)
    }

    async fn with_bearer(&self, request: RequestBuilder) -> BackendResult<RequestBuilder> {
        Ok(match self.id_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn with_firebase_auth(&self, request: RequestBuilder) -> BackendResult<RequestBuilder> {
        Ok(match self.id_token().await? {
            Some(token) => request.header("Authorization", format!("Firebase {}", token)),
            None => request,
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let account = self
            .account_call(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        self.store_account(&account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let account = self
            .account_call(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        self.store_account(&account)
    }

    async fn sign_out(&self) -> BackendResult<()> {
        // Tokens are bearer credentials; dropping them is the sign-out
        self.set_session(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> BackendResult<()> {
        self.account_call(
            "sendOobCode",
            json!({ "requestType": "PASSWORD_RESET", "email": email }),
        )
        .await?;
        Ok(())
    }

    async fn update_profile(&self, profile: &AccountProfile) -> BackendResult<AuthUser> {
        let token = self.require_token().await?;
        let mut body = json!({ "idToken": token, "returnSecureToken": false });
        if let Some(name) = &profile.display_name {
            body["displayName"] = json!(name);
        }
        if let Some(photo) = &profile.photo_url {
            body["photoUrl"] = json!(photo);
        }

        let account = self.account_call("update", body).await?;

        let mut updated = None;
        {
            let mut session = self.session();
            if let Some(c) = session.as_mut() {
                if let Some(name) = &profile.display_name {
                    c.user.display_name = Some(name.clone()).filter(|s| !s.is_empty());
                }
                if let Some(photo) = &profile.photo_url {
                    c.user.photo_url = Some(photo.clone()).filter(|s| !s.is_empty());
                }
                updated = Some(c.user.clone());
            }
        }

        let user = updated.unwrap_or_else(|| account.user());
        self.auth_tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn update_email(&self, email: &str) -> BackendResult<()> {
        let token = self.require_token().await?;
        let account = self
            .account_call(
                "update",
                json!({ "idToken": token, "email": email, "returnSecureToken": true }),
            )
            .await?;
        if account.id_token.is_some() {
            self.store_account(&account)?;
        }
        Ok(())
    }

    async fn update_password(&self, password: &str) -> BackendResult<()> {
        let token = self.require_token().await?;
        let account = self
            .account_call(
                "update",
                json!({ "idToken": token, "password": password, "returnSecureToken": true }),
            )
            .await?;
        if account.id_token.is_some() {
            self.store_account(&account)?;
        }
        Ok(())
    }

    async fn reauthenticate(&self, password: &str) -> BackendResult<()> {
        let current = self.current_user().ok_or(BackendError::Unauthenticated)?;
        let email = current.email.clone().ok_or(BackendError::Unauthenticated)?;

        let account = self
            .account_call(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        if account.local_id != current.uid {
            return Err(BackendError::Auth(AuthErrorCode::UserNotFound));
        }
        self.store_account(&account)?;
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session().as_ref().map(|c| c.user.clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.auth_tx.subscribe()
    }
}

#[async_trait]
impl DocumentStore for FirebaseClient {
    async fn create(&self, collection: &str, fields: Fields) -> BackendResult<String> {
        let url = format!("{}/{}", self.documents_url(), collection);
        let body = json!({ "fields": firestore::encode_fields(&fields) });
        let response = self
            .with_bearer(self.http.post(url).json(&body))
            .await?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::resource_error(response).await);
        }
        let doc: Value = response.json().await?;
        Ok(firestore::decode_document(&doc)?.id)
    }

    async fn get(&self, collection: &str, id: &str) -> BackendResult<Option<Document>> {
        let url = format!("{}/{}/{}", self.documents_url(), collection, id);
        let response = self.with_bearer(self.http.get(url)).await?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::resource_error(response).await);
        }
        let doc: Value = response.json().await?;
        Ok(Some(firestore::decode_document(&doc)?))
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> BackendResult<()> {
        let mut params: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let url = format!("{}/{}/{}", self.documents_url(), collection, id);
        let body = json!({ "fields": firestore::encode_fields(&fields) });
        let response = self
            .with_bearer(self.http.patch(url).query(&params).json(&body))
            .await?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::resource_error(response).await);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> BackendResult<()> {
        let url = format!("{}/{}/{}", self.documents_url(), collection, id);
        let response = self.with_bearer(self.http.delete(url)).await?.send().await?;

        if !response.status().is_success() {
            return Err(Self::resource_error(response).await);
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> BackendResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url());
        let body = firestore::structured_query(query);
        let response = self
            .with_bearer(self.http.post(url).json(&body))
            .await?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::resource_error(response).await);
        }
        let entries: Value = response.json().await?;
        firestore::decode_query_response(&entries)
    }
}

#[async_trait]
impl ObjectStore for FirebaseClient {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> BackendResult<String> {
        let url = self.objects_url();
        let request = self
            .http
            .post(&url)
            .query(&[("uploadType", "media"), ("name", path)])
            .header("Content-Type", content_type)
            .body(bytes);
        let response = self.with_firebase_auth(request).await?.send().await?;

        if !response.status().is_success() {
            return Err(Self::resource_error(response).await);
        }
        let uploaded: UploadResponse = response.json().await?;

        let mut download = format!(
            "{}/{}?alt=media",
            url,
            urlencoding::encode(&uploaded.name)
        );
        if let Some(token) = uploaded
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').next())
        {
            download.push_str("&token=");
            download.push_str(token);
        }
        Ok(download)
    }

    async fn delete(&self, url: &str) -> BackendResult<()> {
        let path = object_path_from_url(url)
            .ok_or_else(|| BackendError::NotFound(format!("not a storage url: {}", url)))?;

        let target = format!("{}/{}", self.objects_url(), urlencoding::encode(&path));
        let response = self
            .with_firebase_auth(self.http.delete(target))
            .await?
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::resource_error(response).await);
        }
        Ok(())
    }
}
