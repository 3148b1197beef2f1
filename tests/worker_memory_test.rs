//! Background worker against the in-memory backend
//!
//! Covers the multi-step requests the worker runs on the UI's behalf: image
//! upload followed by listing creation (with cleanup when the second step
//! fails), listing deletion with its image, and the spawned worker's channel
//! round trip.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use servicefinder::api::{Category, NewListing, SignUpDetails};
use servicefinder::backend::memory::MemoryBackend;
use servicefinder::backend::Backend;
use servicefinder::config::Config;
use servicefinder::logic::errors::ErrorType;
use servicefinder::services::api::{execute_request, spawn_api_service, ApiRequest, ApiResponse};
use servicefinder::services::Services;

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn services_over(documents: Arc<MemoryBackend>, objects: Arc<MemoryBackend>) -> Services {
    let backend = Backend {
        identity: documents.clone(),
        documents,
        objects,
    };
    Services::new(backend, &Config::demo())
}

fn draft() -> NewListing {
    NewListing {
        name: "Joe's Plumbing".into(),
        category: Category::Plumbing,
        description: "Burst pipes and geysers fixed fast".into(),
        phone: "0821234567".into(),
        email: "joe@example.com".into(),
        city: "Durban".into(),
        image: None,
        rating: None,
    }
}

fn png_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(&PNG_HEADER).unwrap();
    file.write_all(&[0u8; 32]).unwrap();
    file
}

/// Test: the uploaded image URL is stored on the new listing
#[tokio::test]
async fn test_add_listing_with_image() {
    let memory = Arc::new(MemoryBackend::new());
    let services = services_over(memory.clone(), memory.clone());
    let image = png_file();

    let response = execute_request(
        &services,
        ApiRequest::AddListing {
            draft: draft(),
            image_path: Some(image.path().to_path_buf()),
            user_id: "u1".into(),
        },
    )
    .await;

    let id = match response {
        ApiResponse::ListingAdded(Ok(id)) => id,
        other => panic!("unexpected response: {:?}", other),
    };

    let listing = services.listings.get(&id).await.unwrap();
    let url = listing.image.clone().expect("image url stored");
    assert!(memory.has_object(&url));
    assert_eq!(listing.rating, 5.0, "new listings start at the default rating");
    assert!(listing.is_owned_by("u1"));
}

/// Test: when the listing write fails after the upload, the uploaded image
/// is removed again
#[tokio::test]
async fn test_failed_create_removes_uploaded_image() {
    let documents = Arc::new(MemoryBackend::new());
    let objects = Arc::new(MemoryBackend::new());
    documents.set_simulate_write_error(true);
    let services = services_over(documents.clone(), objects.clone());
    let image = png_file();

    let response = execute_request(
        &services,
        ApiRequest::AddListing {
            draft: draft(),
            image_path: Some(image.path().to_path_buf()),
            user_id: "u1".into(),
        },
    )
    .await;

    match response {
        ApiResponse::ListingAdded(Err(e)) => {
            assert_eq!(e.message, "Failed to add service");
            assert_eq!(e.kind, ErrorType::ServerError);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(objects.object_count(), 0, "orphaned image cleaned up");
    assert_eq!(documents.document_count("services"), 0);
}

/// Test: an unreadable image path stops the request before anything is written
#[tokio::test]
async fn test_missing_image_file_is_rejected() {
    let memory = Arc::new(MemoryBackend::new());
    let services = services_over(memory.clone(), memory.clone());

    let response = execute_request(
        &services,
        ApiRequest::AddListing {
            draft: draft(),
            image_path: Some("/definitely/not/here.png".into()),
            user_id: "u1".into(),
        },
    )
    .await;

    match response {
        ApiResponse::ListingAdded(Err(e)) => {
            assert!(e.message.starts_with("Could not read image:"), "got: {}", e.message);
            assert_eq!(e.kind, ErrorType::Rejected);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(memory.document_count("services"), 0);
    assert_eq!(memory.object_count(), 0);
}

/// Test: an oversized image is refused by its size on disk
#[tokio::test]
async fn test_oversized_image_is_rejected() {
    let memory = Arc::new(MemoryBackend::new());
    let services = services_over(memory.clone(), memory.clone());
    let image = png_file();
    image.as_file().set_len(6 * 1024 * 1024).unwrap();

    let response = execute_request(
        &services,
        ApiRequest::AddListing {
            draft: draft(),
            image_path: Some(image.path().to_path_buf()),
            user_id: "u1".into(),
        },
    )
    .await;

    match response {
        ApiResponse::ListingAdded(Err(e)) => {
            assert_eq!(e.message, "File size exceeds 5MB limit");
            assert_eq!(e.kind, ErrorType::Rejected);
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(memory.object_count(), 0);
    assert_eq!(memory.document_count("services"), 0);
}

/// Test: a file that is not an image is refused by type
#[tokio::test]
async fn test_non_image_file_is_rejected() {
    let memory = Arc::new(MemoryBackend::new());
    let services = services_over(memory.clone(), memory.clone());
    let mut text = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    text.write_all(b"not an image").unwrap();

    let response = execute_request(
        &services,
        ApiRequest::AddListing {
            draft: draft(),
            image_path: Some(text.path().to_path_buf()),
            user_id: "u1".into(),
        },
    )
    .await;

    match response {
        ApiResponse::ListingAdded(Err(e)) => {
            assert_eq!(e.message, "Invalid file type. Please upload JPG, PNG, WEBP, or GIF");
            assert_eq!(e.kind, ErrorType::Rejected);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

/// Test: deleting a listing also deletes its image
#[tokio::test]
async fn test_delete_listing_removes_image() {
    let memory = Arc::new(MemoryBackend::new());
    let services = services_over(memory.clone(), memory.clone());
    let image = png_file();

    let ApiResponse::ListingAdded(Ok(id)) = execute_request(
        &services,
        ApiRequest::AddListing {
            draft: draft(),
            image_path: Some(image.path().to_path_buf()),
            user_id: "u1".into(),
        },
    )
    .await
    else {
        panic!("add failed");
    };
    let url = services.listings.get(&id).await.unwrap().image;
    assert_eq!(memory.object_count(), 1);

    let response = execute_request(
        &services,
        ApiRequest::DeleteListing {
            listing_id: id.clone(),
            image: url,
        },
    )
    .await;

    assert_eq!(response, ApiResponse::ListingDeleted(Ok(())));
    assert_eq!(memory.document_count("services"), 0);
    assert_eq!(memory.object_count(), 0);
}

/// Test: out-of-range ratings never reach the store
#[tokio::test]
async fn test_rating_out_of_range() {
    let memory = Arc::new(MemoryBackend::new());
    let services = services_over(memory.clone(), memory.clone());

    match execute_request(
        &services,
        ApiRequest::RateListing {
            listing_id: "abc".into(),
            rating: 6.0,
        },
    )
    .await
    {
        ApiResponse::ListingRated(Err(e)) => {
            assert_eq!(e.message, "Rating must be between 1 and 5");
            assert_eq!(e.kind, ErrorType::Rejected);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

/// Test: sign-up creates the profile document the session later fetches
#[tokio::test]
async fn test_sign_up_then_fetch_profile() {
    let memory = Arc::new(MemoryBackend::new());
    let services = services_over(memory.clone(), memory.clone());

    let user = match execute_request(
        &services,
        ApiRequest::SignUp {
            email: "ann@example.com".into(),
            password: "secret1".into(),
            details: SignUpDetails {
                display_name: "Ann".into(),
                phone: "0821234567".into(),
                photo_url: String::new(),
            },
        },
    )
    .await
    {
        ApiResponse::SignedUp(Ok(user)) => user,
        other => panic!("unexpected response: {:?}", other),
    };
    assert_eq!(user.display_name.as_deref(), Some("Ann"));

    match execute_request(&services, ApiRequest::FetchProfile { uid: user.uid.clone() }).await {
        ApiResponse::Profile(Ok(Some(profile))) => {
            assert_eq!(profile.display_name, "Ann");
            assert_eq!(profile.email, "ann@example.com");
        }
        other => panic!("unexpected response: {:?}", other),
    }

    match execute_request(
        &services,
        ApiRequest::SignUp {
            email: "ANN@example.com".into(),
            password: "secret1".into(),
            details: SignUpDetails::default(),
        },
    )
    .await
    {
        ApiResponse::SignedUp(Err(e)) => {
            assert_eq!(e.message, "This email is already registered");
            assert_eq!(e.kind, ErrorType::Credentials);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

/// Test: the spawned worker answers over its channel
#[tokio::test]
async fn test_spawned_worker_round_trip() {
    let services = Services::new(
        Backend::in_memory(MemoryBackend::demo("services")),
        &Config::demo(),
    );
    let (tx, mut rx) = spawn_api_service(services);

    tx.send(ApiRequest::FetchListings).unwrap();
    let response = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("worker answered in time")
        .expect("channel open");

    match response {
        ApiResponse::Listings(Ok(listings)) => {
            assert_eq!(listings.len(), 12);
            let newest_first = listings
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at);
            assert!(newest_first);
        }
        other => panic!("unexpected response: {:?}", other),
    }

    drop(tx);
}
