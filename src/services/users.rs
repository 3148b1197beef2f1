use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::{ServiceError, ServiceResult};
use crate::api::{ProfileUpdate, SignUpDetails, UserProfile};
use crate::backend::{Document, DocumentStore, Fields, Query};

/// Profile documents, looked up by the identity provider's uid
#[derive(Clone)]
pub struct UserService {
    documents: Arc<dyn DocumentStore>,
    collection: String,
}

fn decode_profile(doc: &Document) -> Result<UserProfile, crate::backend::BackendError> {
    let mut profile: UserProfile = doc.decode()?;
    profile.id = doc.id.clone();
    Ok(profile)
}

impl UserService {
    pub fn new(documents: Arc<dyn DocumentStore>, collection: &str) -> Self {
        Self {
            documents,
            collection: collection.to_string(),
        }
    }

    async fn find(&self, uid: &str) -> Result<Option<Document>, crate::backend::BackendError> {
        let query = Query::new(&self.collection).where_eq("uid", uid).limit(1);
        Ok(self.documents.query(&query).await?.into_iter().next())
    }

    /// First profile whose `uid` matches, or none
    pub async fn get_profile(&self, uid: &str) -> ServiceResult<Option<UserProfile>> {
        if uid.is_empty() {
            return Err(ServiceError::Rejected("User ID is required"));
        }

        let found = self
            .find(uid)
            .await
            .map_err(ServiceError::backend("Failed to fetch user profile"))?;

        found
            .as_ref()
            .map(decode_profile)
            .transpose()
            .map_err(ServiceError::backend("Failed to fetch user profile"))
    }

    /// Create the profile document for a new account and return its id
    pub async fn create_profile(
        &self,
        uid: &str,
        email: &str,
        details: &SignUpDetails,
    ) -> ServiceResult<String> {
        if uid.is_empty() {
            return Err(ServiceError::Rejected("User ID is required"));
        }

        let now = Utc::now();
        let mut fields = Fields::new();
        fields.insert("uid".into(), uid.into());
        fields.insert("email".into(), email.into());
        fields.insert("displayName".into(), details.display_name.as_str().into());
        fields.insert("photoURL".into(), details.photo_url.as_str().into());
        fields.insert("phone".into(), details.phone.as_str().into());
        fields.insert("createdAt".into(), now.into());
        fields.insert("updatedAt".into(), now.into());

        debug!("creating profile for {}", uid);
        self.documents
            .create(&self.collection, fields)
            .await
            .map_err(ServiceError::backend("Failed to create user profile"))
    }

    /// Apply a partial update; `uid` and `createdAt` are never touched
    pub async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> ServiceResult<()> {
        if uid.is_empty() {
            return Err(ServiceError::Rejected("User ID is required"));
        }

        let doc = self
            .find(uid)
            .await
            .map_err(ServiceError::backend("Failed to update profile"))?
            .ok_or(ServiceError::Rejected("User profile not found"))?;

        let mut fields = Fields::new();
        if let Some(name) = &update.display_name {
            fields.insert("displayName".into(), name.as_str().into());
        }
        if let Some(email) = &update.email {
            fields.insert("email".into(), email.as_str().into());
        }
        if let Some(phone) = &update.phone {
            fields.insert("phone".into(), phone.as_str().into());
        }
        if let Some(photo) = &update.photo_url {
            fields.insert("photoURL".into(), photo.as_str().into());
        }
        fields.insert("updatedAt".into(), Utc::now().into());

        self.documents
            .update(&self.collection, &doc.id, fields)
            .await
            .map_err(ServiceError::backend("Failed to update profile"))
    }

    /// Delete the profile document; nothing happens when there is none
    pub async fn delete_profile(&self, uid: &str) -> ServiceResult<()> {
        if uid.is_empty() {
            return Err(ServiceError::Rejected("User ID is required"));
        }

        let Some(doc) = self
            .find(uid)
            .await
            .map_err(ServiceError::backend("Failed to delete profile"))?
        else {
            return Ok(());
        };

        self.documents
            .delete(&self.collection, &doc.id)
            .await
            .map_err(ServiceError::backend("Failed to delete profile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;

    fn service() -> (Arc<MemoryBackend>, UserService) {
        let memory = Arc::new(MemoryBackend::new());
        let users = UserService::new(memory.clone(), "users");
        (memory, users)
    }

    #[tokio::test]
    async fn test_create_then_get_profile() {
        let (_, users) = service();
        let details = SignUpDetails {
            display_name: "Ann".into(),
            phone: "0821234567".into(),
            photo_url: String::new(),
        };
        let id = users.create_profile("u1", "ann@example.com", &details).await.unwrap();

        let profile = users.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.id, id);
        assert_eq!(profile.display_name, "Ann");
        assert!(profile.created_at.is_some());
        assert!(users.get_profile("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_profile() {
        let (_, users) = service();
        let err = users
            .update_profile("ghost", &ProfileUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User profile not found");
    }

    #[tokio::test]
    async fn test_delete_missing_profile_is_noop() {
        let (memory, users) = service();
        users.delete_profile("ghost").await.unwrap();
        assert_eq!(memory.document_count("users"), 0);
    }

    #[tokio::test]
    async fn test_empty_uid_rejected() {
        let (_, users) = service();
        let err = users.get_profile("").await.unwrap_err();
        assert_eq!(err.to_string(), "User ID is required");
    }
}
