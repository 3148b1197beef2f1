use anyhow::Context;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, warn};

use super::storage::DEFAULT_FOLDER;
use super::{ServiceError, Services};
use crate::api::{AccountProfile, AuthUser, ImageFile, Listing, NewListing, ProfileUpdate, SignUpDetails, UserProfile};
use crate::logic::errors::{classify_error, format_error_message, ErrorType};
use crate::logic::validators::MAX_IMAGE_BYTES;

/// Priority level for API requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High, // User-initiated writes and sign-in
    Low,  // Fetches that only refresh what is on screen
}

/// API request types
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// Load the whole listing collection, newest first
    FetchListings,

    SignIn {
        email: String,
        password: String,
    },

    SignUp {
        email: String,
        password: String,
        details: SignUpDetails,
    },

    SignOut,

    SendPasswordReset {
        email: String,
    },

    /// Upload the optional image, then create the listing
    AddListing {
        draft: NewListing,
        image_path: Option<PathBuf>,
        user_id: String,
    },

    RateListing {
        listing_id: String,
        rating: f64,
    },

    /// Delete the listing document, then its image
    DeleteListing {
        listing_id: String,
        image: Option<String>,
    },

    FetchProfile {
        uid: String,
    },

    UpdateProfile {
        uid: String,
        update: ProfileUpdate,
    },
}

impl ApiRequest {
    pub fn priority(&self) -> Priority {
        match self {
            ApiRequest::FetchListings | ApiRequest::FetchProfile { .. } => Priority::Low,
            _ => Priority::High,
        }
    }
}

/// A failed request as the UI sees it
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub message: String,
    pub kind: ErrorType,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self {
            kind: classify_error(&err),
            message: err.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// API response types
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Listings(ApiResult<Vec<Listing>>),
    SignedIn(ApiResult<AuthUser>),
    SignedUp(ApiResult<AuthUser>),
    SignedOut(ApiResult<()>),
    PasswordResetSent(ApiResult<()>),
    ListingAdded(ApiResult<String>),
    ListingRated(ApiResult<()>),
    ListingDeleted(ApiResult<()>),
    Profile(ApiResult<Option<UserProfile>>),
    ProfileUpdated(ApiResult<()>),
}

/// Read an image for upload, refusing oversized files before loading them
async fn read_image(path: &Path) -> ApiResult<ImageFile> {
    let unreadable = |e: anyhow::Error| ApiError {
        message: format!("Could not read image: {}", format_error_message(&e)),
        kind: ErrorType::Rejected,
    };

    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
        .map_err(unreadable)?
        .len();
    if size > MAX_IMAGE_BYTES {
        return Err(ServiceError::Rejected("File size exceeds 5MB limit").into());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
        .map_err(unreadable)?;
    Ok(ImageFile::from_bytes(path, bytes))
}

async fn add_listing(
    services: &Services,
    mut draft: NewListing,
    image_path: Option<PathBuf>,
    user_id: &str,
) -> ApiResult<String> {
    let uploaded = match image_path {
        Some(path) => {
            let file = read_image(&path).await?;
            Some(services.storage.upload_image(&file, DEFAULT_FOLDER).await?)
        }
        None => None,
    };
    draft.image = uploaded.clone();

    match services.listings.add(&draft, user_id).await {
        Ok(id) => Ok(id),
        Err(e) => {
            if let Some(url) = uploaded {
                match services.storage.delete_image(&url).await {
                    Ok(()) => debug!("removed orphaned image {}", url),
                    Err(cleanup) => warn!("orphaned image {} left behind: {}", url, cleanup),
                }
            }
            Err(e.into())
        }
    }
}

async fn delete_listing(services: &Services, listing_id: &str, image: Option<String>) -> ApiResult<()> {
    services.listings.delete(listing_id).await?;
    if let Some(url) = image {
        if let Err(e) = services.storage.delete_image(&url).await {
            warn!("listing {} deleted but its image was not: {}", listing_id, e);
        }
    }
    Ok(())
}

async fn update_profile(services: &Services, uid: &str, update: &ProfileUpdate) -> ApiResult<()> {
    services.users.update_profile(uid, update).await?;

    if update.display_name.is_some() || update.photo_url.is_some() {
        let account = AccountProfile {
            display_name: update.display_name.clone(),
            photo_url: update.photo_url.clone(),
        };
        if let Err(e) = services.auth.update_user_profile(&account).await {
            warn!("profile saved but account name not updated: {}", e);
        }
    }
    Ok(())
}

/// Run one request to completion
pub async fn execute_request(services: &Services, request: ApiRequest) -> ApiResponse {
    match request {
        ApiRequest::FetchListings => {
            ApiResponse::Listings(services.listings.get_all().await.map_err(ApiError::from))
        }

        ApiRequest::SignIn { email, password } => ApiResponse::SignedIn(
            services.auth.sign_in(&email, &password).await.map_err(ApiError::from),
        ),

        ApiRequest::SignUp {
            email,
            password,
            details,
        } => ApiResponse::SignedUp(
            services
                .auth
                .sign_up(&email, &password, &details)
                .await
                .map_err(ApiError::from),
        ),

        ApiRequest::SignOut => {
            ApiResponse::SignedOut(services.auth.logout().await.map_err(ApiError::from))
        }

        ApiRequest::SendPasswordReset { email } => ApiResponse::PasswordResetSent(
            services.auth.send_password_reset(&email).await.map_err(ApiError::from),
        ),

        ApiRequest::AddListing {
            draft,
            image_path,
            user_id,
        } => ApiResponse::ListingAdded(add_listing(services, draft, image_path, &user_id).await),

        ApiRequest::RateListing { listing_id, rating } => ApiResponse::ListingRated(
            services
                .listings
                .update_rating(&listing_id, rating)
                .await
                .map_err(ApiError::from),
        ),

        ApiRequest::DeleteListing { listing_id, image } => {
            ApiResponse::ListingDeleted(delete_listing(services, &listing_id, image).await)
        }

        ApiRequest::FetchProfile { uid } => {
            ApiResponse::Profile(services.users.get_profile(&uid).await.map_err(ApiError::from))
        }

        ApiRequest::UpdateProfile { uid, update } => {
            ApiResponse::ProfileUpdated(update_profile(services, &uid, &update).await)
        }
    }
}

/// API service worker: a priority queue drained into concurrent tasks
pub struct ApiService {
    services: Services,
    request_queue: VecDeque<(ApiRequest, Priority)>,
    in_flight: usize,
    response_tx: mpsc::UnboundedSender<ApiResponse>,
    completion_tx: mpsc::UnboundedSender<()>,
    max_concurrent: usize,
}

impl ApiService {
    pub fn new(
        services: Services,
        response_tx: mpsc::UnboundedSender<ApiResponse>,
        completion_tx: mpsc::UnboundedSender<()>,
    ) -> Self {
        Self {
            services,
            request_queue: VecDeque::new(),
            in_flight: 0,
            response_tx,
            completion_tx,
            max_concurrent: 8,
        }
    }

    /// Add a request to the queue, ahead of anything less urgent
    fn enqueue(&mut self, request: ApiRequest) {
        let priority = request.priority();
        let insert_pos = self
            .request_queue
            .iter()
            .position(|(_, p)| *p > priority)
            .unwrap_or(self.request_queue.len());

        self.request_queue.insert(insert_pos, (request, priority));
    }

    fn process_next(&mut self) {
        if self.in_flight >= self.max_concurrent {
            return;
        }

        let Some((request, _)) = self.request_queue.pop_front() else {
            return;
        };
        self.in_flight += 1;

        let services = self.services.clone();
        let response_tx = self.response_tx.clone();
        let completion_tx = self.completion_tx.clone();

        tokio::spawn(async move {
            debug!("api request: {:?}", request.priority());
            let response = execute_request(&services, request).await;
            // The receiver is gone once the UI loop has exited
            let _ = response_tx.send(response);
            let _ = completion_tx.send(());
        });
    }
}

/// Spawn the API service worker
pub fn spawn_api_service(
    services: Services,
) -> (
    mpsc::UnboundedSender<ApiRequest>,
    mpsc::UnboundedReceiver<ApiResponse>,
) {
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ApiRequest>();
    let (response_tx, response_rx) = mpsc::unbounded_channel::<ApiResponse>();
    let (completion_tx, mut completion_rx) = mpsc::unbounded_channel::<()>();

    tokio::spawn(async move {
        let mut service = ApiService::new(services, response_tx, completion_tx);
        let mut tick = interval(Duration::from_millis(10));

        loop {
            tokio::select! {
                request = request_rx.recv() => match request {
                    Some(request) => service.enqueue(request),
                    None => break,
                },

                Some(()) = completion_rx.recv() => {
                    service.in_flight = service.in_flight.saturating_sub(1);
                }

                _ = tick.tick() => {
                    while !service.request_queue.is_empty() && service.in_flight < service.max_concurrent {
                        service.process_next();
                    }
                }
            }
        }
        debug!("api worker stopped");
    });

    (request_tx, response_rx)
}
