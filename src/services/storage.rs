use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::api::ImageFile;
use crate::backend::ObjectStore;
use crate::logic::validators::{is_allowed_image_type, MAX_IMAGE_BYTES};

pub const DEFAULT_FOLDER: &str = "services";

/// Image uploads for listings and profiles
#[derive(Clone)]
pub struct StorageService {
    objects: Arc<dyn ObjectStore>,
}

/// `<folder>/<millis>_<random>_<file name>`
pub fn object_path(folder: &str, file_name: &str) -> String {
    let random: String = Uuid::new_v4().simple().to_string().chars().take(11).collect();
    format!(
        "{}/{}_{}_{}",
        folder,
        Utc::now().timestamp_millis(),
        random,
        file_name
    )
}

impl StorageService {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }

    /// Validate and upload one image, returning its download URL
    pub async fn upload_image(&self, file: &ImageFile, folder: &str) -> ServiceResult<String> {
        if !is_allowed_image_type(&file.content_type) {
            return Err(ServiceError::Rejected(
                "Invalid file type. Please upload JPG, PNG, WEBP, or GIF",
            ));
        }
        if file.size() > MAX_IMAGE_BYTES {
            return Err(ServiceError::Rejected("File size exceeds 5MB limit"));
        }

        let path = object_path(folder, &file.file_name);
        debug!("uploading {} ({} bytes)", path, file.size());
        self.objects
            .upload(&path, &file.content_type, file.bytes.clone())
            .await
            .map_err(ServiceError::backend("Failed to upload image"))
    }

    /// Delete by download URL. Empty URLs and already-missing objects are fine.
    pub async fn delete_image(&self, url: &str) -> ServiceResult<()> {
        if url.is_empty() {
            return Ok(());
        }

        match self.objects.delete(url).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("image already gone: {}", url);
                Ok(())
            }
            Err(e) => Err(ServiceError::backend("Failed to delete image")(e)),
        }
    }

    /// Upload several images concurrently; URLs come back in input order
    pub async fn upload_multiple_images(
        &self,
        files: &[ImageFile],
        folder: &str,
    ) -> ServiceResult<Vec<String>> {
        let mut tasks = JoinSet::new();
        for (index, file) in files.iter().cloned().enumerate() {
            let service = self.clone();
            let folder = folder.to_string();
            tasks.spawn(async move { (index, service.upload_image(&file, &folder).await) });
        }

        let mut urls = vec![String::new(); files.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(url))) => urls[index] = url,
                Ok((_, Err(e))) => {
                    warn!("batch upload failed: {}", e);
                    return Err(ServiceError::Rejected("Failed to upload one or more images"));
                }
                Err(e) => {
                    warn!("upload task panicked: {}", e);
                    return Err(ServiceError::Rejected("Failed to upload one or more images"));
                }
            }
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;

    fn png(name: &str, size: usize) -> ImageFile {
        ImageFile {
            file_name: name.into(),
            content_type: "image/png".into(),
            bytes: vec![0; size],
        }
    }

    fn service() -> (Arc<MemoryBackend>, StorageService) {
        let memory = Arc::new(MemoryBackend::new());
        let storage = StorageService::new(memory.clone());
        (memory, storage)
    }

    #[test]
    fn test_object_path_shape() {
        let path = object_path("services", "logo.png");
        let parts: Vec<&str> = path.splitn(2, '/').collect();
        assert_eq!(parts[0], "services");
        let name_parts: Vec<&str> = parts[1].splitn(3, '_').collect();
        assert!(name_parts[0].parse::<i64>().is_ok());
        assert_eq!(name_parts[1].len(), 11);
        assert_eq!(name_parts[2], "logo.png");
    }

    #[tokio::test]
    async fn test_upload_rejects_wrong_type() {
        let (memory, storage) = service();
        let file = ImageFile {
            file_name: "notes.txt".into(),
            content_type: "text/plain".into(),
            bytes: vec![1],
        };
        let err = storage.upload_image(&file, DEFAULT_FOLDER).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file type. Please upload JPG, PNG, WEBP, or GIF"
        );
        assert_eq!(memory.object_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized() {
        let (_, storage) = service();
        let file = png("big.png", 5 * 1024 * 1024 + 1);
        let err = storage.upload_image(&file, DEFAULT_FOLDER).await.unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds 5MB limit");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (memory, storage) = service();
        let url = storage.upload_image(&png("a.png", 10), DEFAULT_FOLDER).await.unwrap();
        assert!(memory.has_object(&url));

        storage.delete_image(&url).await.unwrap();
        storage.delete_image(&url).await.unwrap();
        storage.delete_image("").await.unwrap();
        assert_eq!(memory.object_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_multiple_keeps_order() {
        let (memory, storage) = service();
        let files = vec![png("one.png", 1), png("two.png", 1), png("three.png", 1)];
        let urls = storage.upload_multiple_images(&files, "gallery").await.unwrap();
        assert_eq!(urls.len(), 3);
        assert!(urls[0].ends_with("_one.png"));
        assert!(urls[2].ends_with("_three.png"));
        assert_eq!(memory.object_count(), 3);
    }

    #[tokio::test]
    async fn test_upload_multiple_fails_as_a_whole() {
        let (_, storage) = service();
        let mut bad = png("bad.gif", 1);
        bad.content_type = "image/tiff".into();
        let err = storage
            .upload_multiple_images(&[png("ok.png", 1), bad], "gallery")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload one or more images");
    }
}
