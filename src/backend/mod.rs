//! Backend Access
//!
//! The application talks to three hosted collaborators, each behind a trait:
//!
//! - **IdentityProvider**: accounts, sign-in state, profile fields
//! - **DocumentStore**: collections of field maps with simple queries
//! - **ObjectStore**: uploaded binary objects addressed by download URL
//!
//! `firebase` implements all three over the Firebase REST APIs; `memory`
//! implements them in-process for tests and `--demo`.

pub mod errors;
pub mod firebase;
pub mod firestore;
pub mod memory;
pub mod value;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::api::{AccountProfile, AuthUser};
use crate::config::Config;

pub use errors::{AuthErrorCode, BackendError};
pub use value::{Document, FieldValue, Fields};

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A collection query: equality filters, one ordering field and a limit
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, FieldValue)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Account management and sign-in state
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser>;
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser>;
    async fn sign_out(&self) -> BackendResult<()>;
    async fn send_password_reset(&self, email: &str) -> BackendResult<()>;
    async fn update_profile(&self, profile: &AccountProfile) -> BackendResult<AuthUser>;
    async fn update_email(&self, email: &str) -> BackendResult<()>;
    async fn update_password(&self, password: &str) -> BackendResult<()>;
    /// Confirm the signed-in user's password before a sensitive change
    async fn reauthenticate(&self, password: &str) -> BackendResult<()>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Receiver that observes every sign-in state change
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a generated id and return that id
    async fn create(&self, collection: &str, fields: Fields) -> BackendResult<String>;
    async fn get(&self, collection: &str, id: &str) -> BackendResult<Option<Document>>;
    /// Merge `fields` into an existing document; `NotFound` if it is missing
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> BackendResult<()>;
    async fn delete(&self, collection: &str, id: &str) -> BackendResult<()>;
    async fn query(&self, query: &Query) -> BackendResult<Vec<Document>>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes at `path` and return a download URL
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> BackendResult<String>;
    /// Delete the object behind a download URL; `NotFound` if it does not exist
    async fn delete(&self, url: &str) -> BackendResult<()>;
}

/// The three collaborators bundled for the service layer
#[derive(Clone)]
pub struct Backend {
    pub identity: Arc<dyn IdentityProvider>,
    pub documents: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl Backend {
    pub fn firebase(config: &Config) -> anyhow::Result<Self> {
        let client = Arc::new(firebase::FirebaseClient::new(config)?);
        Ok(Self {
            identity: client.clone(),
            documents: client.clone(),
            objects: client,
        })
    }

    pub fn in_memory(memory: memory::MemoryBackend) -> Self {
        let memory = Arc::new(memory);
        Self {
            identity: memory.clone(),
            documents: memory.clone(),
            objects: memory,
        }
    }
}
