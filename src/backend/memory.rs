//! In-memory backend
//!
//! Implements identity, documents and objects inside the process. Used by the
//! test suite and by `--demo`. Queries follow the hosted store's rules: equality
//! filters, documents missing the order-by field are left out, then the limit.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use uuid::Uuid;

use super::{
    AuthErrorCode, BackendError, BackendResult, Direction, Document, DocumentStore, FieldValue,
    Fields, IdentityProvider, ObjectStore, Query,
};
use crate::api::{AccountProfile, AuthUser};

const URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password: String,
    display_name: Option<String>,
    photo_url: Option<String>,
}

impl Account {
    fn user(&self) -> AuthUser {
        AuthUser {
            uid: self.uid.clone(),
            email: Some(self.email.clone()),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    /// Keyed by lower-cased email
    accounts: HashMap<String, Account>,
    current: Option<String>,
    collections: HashMap<String, BTreeMap<String, Fields>>,
    objects: HashMap<String, (String, Vec<u8>)>,
    reset_requests: Vec<String>,
}

impl State {
    fn current_account(&self) -> Option<&Account> {
        let uid = self.current.as_ref()?;
        self.accounts.values().find(|a| &a.uid == uid)
    }

    fn current_account_mut(&mut self) -> Option<&mut Account> {
        let uid = self.current.clone()?;
        self.accounts.values_mut().find(|a| a.uid == uid)
    }
}

pub struct MemoryBackend {
    state: Mutex<State>,
    auth_tx: watch::Sender<Option<AuthUser>>,
    simulate_write_error: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        let (auth_tx, _) = watch::channel(None);
        Self {
            state: Mutex::new(State::default()),
            auth_tx,
            simulate_write_error: AtomicBool::new(false),
        }
    }
}

fn valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    matches!((parts.next(), parts.next()), (Some(local), Some(domain))
        if !local.is_empty() && domain.contains('.'))
}

fn matches_filter(fields: &Fields, field: &str, expected: &FieldValue) -> bool {
    fields
        .get(field)
        .map(|actual| actual.compare(expected) == std::cmp::Ordering::Equal)
        .unwrap_or(false)
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every document and object write fail with a 503
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::Relaxed);
    }

    fn check_writable(&self) -> BackendResult<()> {
        if self.simulate_write_error.load(Ordering::Relaxed) {
            return Err(BackendError::Http {
                status: 503,
                message: "Simulated write error".to_string(),
            });
        }
        Ok(())
    }

    /// Register an account without signing in
    pub fn add_account(&self, email: &str, password: &str, display_name: Option<&str>) -> String {
        let uid = Uuid::new_v4().simple().to_string();
        self.state().accounts.insert(
            email.to_lowercase(),
            Account {
                uid: uid.clone(),
                email: email.to_string(),
                password: password.to_string(),
                display_name: display_name.map(str::to_string),
                photo_url: None,
            },
        );
        uid
    }

    /// Insert a document directly, bypassing the write switch
    pub fn insert(&self, collection: &str, fields: Fields) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.state()
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        id
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.state()
            .collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn object_count(&self) -> usize {
        self.state().objects.len()
    }

    pub fn has_object(&self, url: &str) -> bool {
        url.strip_prefix(URL_SCHEME)
            .map(|path| self.state().objects.contains_key(path))
            .unwrap_or(false)
    }

    /// Emails that asked for a password reset, oldest first
    pub fn reset_requests(&self) -> Vec<String> {
        self.state().reset_requests.clone()
    }

    /// Backend seeded with sample listings for offline use
    pub fn demo(collection: &str) -> Self {
        let backend = Self::new();
        let owner = backend.add_account("demo@servicefinder.app", "demo1234", Some("Demo User"));

        let samples: [(&str, &str, &str, &str, f64, &[(f64, &str)]); 12] = [
            ("Joe's Plumbing", "plumbing", "Durban", "Burst pipes, geysers and blocked drains fixed fast.", 4.8, &[(5.0, "Ann"), (4.0, "Sipho")]),
            ("Bright Spark Electrical", "electrical", "Cape Town", "Certified electricians for compliance certificates and rewiring.", 4.6, &[(5.0, "Lindiwe")]),
            ("Oak & Pine Carpentry", "carpentry", "Johannesburg", "Custom cupboards, doors and decking built to last.", 4.2, &[]),
            ("Fresh Coat Painters", "painting", "Pretoria", "Interior and exterior painting with a two year guarantee.", 3.9, &[(4.0, "Mark"), (3.0, "Zanele")]),
            ("Sparkle Cleaning Co", "cleaning", "Durban", "Home, office and move-out cleaning on short notice.", 4.9, &[(5.0, "Priya"), (5.0, "Tom"), (4.0, "Jo")]),
            ("Green Thumb Gardens", "gardening", "Cape Town", "Weekly garden care, hedge trimming and refuse removal.", 4.0, &[]),
            ("Terra Landscaping", "landscaping", "Stellenbosch", "Water-wise landscape design and irrigation installs.", 4.4, &[(4.0, "Ruan")]),
            ("TopCover Roofing", "roofing", "Johannesburg", "Leak detection, waterproofing and full roof replacements.", 3.5, &[(3.0, "Nomsa")]),
            ("CoolAir HVAC", "hvac", "Pretoria", "Air conditioner installation, gas refills and servicing.", 4.7, &[(5.0, "Kabelo"), (4.0, "Anele")]),
            ("Handy Andy", "handyman", "Port Elizabeth", "Odd jobs, shelving, tiling repairs and furniture assembly.", 4.1, &[]),
            ("Drain Masters", "plumbing", "Cape Town", "Drain camera inspections and high pressure jetting.", 4.5, &[(5.0, "Claire"), (4.0, "Pieter")]),
            ("Volt Electrical Services", "electrical", "Durban", "Solar backup installs and prepaid meter repairs.", 3.8, &[]),
        ];

        let now = Utc::now();
        for (i, (name, category, city, description, rating, reviews)) in samples.iter().enumerate() {
            let created = now - Duration::days(i as i64 * 3);
            let reviews: Vec<FieldValue> = reviews
                .iter()
                .map(|(stars, who)| {
                    let mut review = Fields::new();
                    review.insert("rating".into(), (*stars).into());
                    review.insert("comment".into(), "Great service".into());
                    review.insert("userName".into(), (*who).into());
                    FieldValue::Map(review)
                })
                .collect();

            let mut fields = Fields::new();
            fields.insert("name".into(), (*name).into());
            fields.insert("category".into(), (*category).into());
            fields.insert("city".into(), (*city).into());
            fields.insert("description".into(), (*description).into());
            fields.insert("phone".into(), format!("08{:08}", 12345678 + i).into());
            fields.insert(
                "email".into(),
                format!("info@{}.co.za", name.to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), "")).into(),
            );
            fields.insert("image".into(), "".into());
            fields.insert("rating".into(), (*rating).into());
            fields.insert("reviews".into(), FieldValue::Array(reviews));
            fields.insert("userId".into(), owner.clone().into());
            fields.insert("createdAt".into(), created.into());
            fields.insert("updatedAt".into(), created.into());
            backend.insert(collection, fields);
        }

        backend
    }

    fn publish(&self, user: Option<AuthUser>) {
        self.auth_tx.send_replace(user);
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        if !valid_email(email) {
            return Err(BackendError::Auth(AuthErrorCode::InvalidEmail));
        }
        if password.chars().count() < 6 {
            return Err(BackendError::Auth(AuthErrorCode::WeakPassword));
        }

        let user = {
            let mut state = self.state();
            let key = email.to_lowercase();
            if state.accounts.contains_key(&key) {
                return Err(BackendError::Auth(AuthErrorCode::EmailAlreadyInUse));
            }
            let account = Account {
                uid: Uuid::new_v4().simple().to_string(),
                email: email.to_string(),
                password: password.to_string(),
                display_name: None,
                photo_url: None,
            };
            state.current = Some(account.uid.clone());
            let user = account.user();
            state.accounts.insert(key, account);
            user
        };

        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        let user = {
            let mut state = self.state();
            let account = state
                .accounts
                .get(&email.to_lowercase())
                .cloned()
                .ok_or(BackendError::Auth(AuthErrorCode::UserNotFound))?;
            if account.password != password {
                return Err(BackendError::Auth(AuthErrorCode::WrongPassword));
            }
            state.current = Some(account.uid.clone());
            account.user()
        };

        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> BackendResult<()> {
        self.state().current = None;
        self.publish(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> BackendResult<()> {
        let mut state = self.state();
        if !state.accounts.contains_key(&email.to_lowercase()) {
            return Err(BackendError::Auth(AuthErrorCode::UserNotFound));
        }
        state.reset_requests.push(email.to_string());
        Ok(())
    }

    async fn update_profile(&self, profile: &AccountProfile) -> BackendResult<AuthUser> {
        let user = {
            let mut state = self.state();
            let account = state
                .current_account_mut()
                .ok_or(BackendError::Unauthenticated)?;
            if let Some(name) = &profile.display_name {
                account.display_name = Some(name.clone()).filter(|s| !s.is_empty());
            }
            if let Some(photo) = &profile.photo_url {
                account.photo_url = Some(photo.clone()).filter(|s| !s.is_empty());
            }
            account.user()
        };

        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn update_email(&self, email: &str) -> BackendResult<()> {
        if !valid_email(email) {
            return Err(BackendError::Auth(AuthErrorCode::InvalidEmail));
        }

        let user = {
            let mut state = self.state();
            let mut account = state
                .current_account()
                .cloned()
                .ok_or(BackendError::Unauthenticated)?;
            let new_key = email.to_lowercase();
            if new_key != account.email.to_lowercase() && state.accounts.contains_key(&new_key) {
                return Err(BackendError::Auth(AuthErrorCode::EmailAlreadyInUse));
            }
            state.accounts.remove(&account.email.to_lowercase());
            account.email = email.to_string();
            let user = account.user();
            state.accounts.insert(new_key, account);
            user
        };

        self.publish(Some(user));
        Ok(())
    }

    async fn update_password(&self, password: &str) -> BackendResult<()> {
        if password.chars().count() < 6 {
            return Err(BackendError::Auth(AuthErrorCode::WeakPassword));
        }
        let mut state = self.state();
        let account = state
            .current_account_mut()
            .ok_or(BackendError::Unauthenticated)?;
        account.password = password.to_string();
        Ok(())
    }

    async fn reauthenticate(&self, password: &str) -> BackendResult<()> {
        let state = self.state();
        let account = state
            .current_account()
            .ok_or(BackendError::Unauthenticated)?;
        if account.password != password {
            return Err(BackendError::Auth(AuthErrorCode::WrongPassword));
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state().current_account().map(Account::user)
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.auth_tx.subscribe()
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create(&self, collection: &str, fields: Fields) -> BackendResult<String> {
        self.check_writable()?;
        Ok(self.insert(collection, fields))
    }

    async fn get(&self, collection: &str, id: &str) -> BackendResult<Option<Document>> {
        let state = self.state();
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> BackendResult<()> {
        self.check_writable()?;
        let mut state = self.state();
        let existing = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| BackendError::NotFound(format!("{}/{}", collection, id)))?;
        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> BackendResult<()> {
        self.check_writable()?;
        // Deleting a missing document succeeds, as it does remotely
        if let Some(docs) = self.state().collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> BackendResult<Vec<Document>> {
        let state = self.state();
        let Some(docs) = state.collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<Document> = docs
            .iter()
            .filter(|(_, fields)| {
                query
                    .filters
                    .iter()
                    .all(|(field, value)| matches_filter(fields, field, value))
            })
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect();

        if let Some((field, direction)) = &query.order_by {
            hits.retain(|doc| doc.fields.contains_key(field));
            hits.sort_by(|a, b| {
                let (Some(x), Some(y)) = (a.get(field), b.get(field)) else {
                    return std::cmp::Ordering::Equal;
                };
                match direction {
                    Direction::Ascending => x.compare(y),
                    Direction::Descending => y.compare(x),
                }
            });
        }

        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }

        Ok(hits)
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> BackendResult<String> {
        self.check_writable()?;
        self.state()
            .objects
            .insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(format!("{}{}", URL_SCHEME, path))
    }

    async fn delete(&self, url: &str) -> BackendResult<()> {
        self.check_writable()?;
        let path = url
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| BackendError::NotFound(url.to_string()))?;
        match self.state().objects.remove(path) {
            Some(_) => Ok(()),
            None => Err(BackendError::NotFound(path.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_query_filters_orders_and_limits() {
        let backend = MemoryBackend::new();
        backend.insert("services", fields(&[("category", "plumbing".into()), ("rating", 3.0.into())]));
        backend.insert("services", fields(&[("category", "plumbing".into()), ("rating", 5.0.into())]));
        backend.insert("services", fields(&[("category", "painting".into()), ("rating", 4.0.into())]));
        backend.insert("services", fields(&[("category", "plumbing".into())]));

        let query = Query::new("services")
            .where_eq("category", "plumbing")
            .order_by("rating", Direction::Descending)
            .limit(5);
        let hits = backend.query(&query).await.unwrap();

        let ratings: Vec<_> = hits.iter().map(|d| d.get("rating").cloned()).collect();
        assert_eq!(
            ratings,
            vec![Some(FieldValue::Double(5.0)), Some(FieldValue::Double(3.0))]
        );
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend
            .update("services", "nope", Fields::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_simulated_write_error() {
        let backend = MemoryBackend::new();
        backend.set_simulate_write_error(true);
        assert!(backend.create("services", Fields::new()).await.is_err());
        assert_eq!(backend.document_count("services"), 0);
    }

    #[tokio::test]
    async fn test_sign_in_publishes_user() {
        let backend = MemoryBackend::new();
        backend.add_account("ann@example.com", "secret1", Some("Ann"));
        let mut rx = backend.subscribe();

        let user = backend.sign_in("Ann@Example.com", "secret1").await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref(), Some(&user));

        let err = backend.sign_in("ann@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.auth_code(), Some(AuthErrorCode::WrongPassword));
    }

    #[tokio::test]
    async fn test_object_round_trip() {
        let backend = MemoryBackend::new();
        let url = backend
            .upload("services/a.png", "image/png", vec![1, 2])
            .await
            .unwrap();
        assert!(backend.has_object(&url));
        ObjectStore::delete(&backend, &url).await.unwrap();
        assert!(ObjectStore::delete(&backend, &url).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_demo_is_seeded() {
        let backend = MemoryBackend::demo("services");
        assert_eq!(backend.document_count("services"), 12);
    }
}
