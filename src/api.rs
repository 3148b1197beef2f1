use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Fixed set of service categories a listing can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Plumbing,
    Electrical,
    Carpentry,
    Painting,
    Cleaning,
    Gardening,
    Landscaping,
    Roofing,
    Hvac,
    Handyman,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Plumbing,
        Category::Electrical,
        Category::Carpentry,
        Category::Painting,
        Category::Cleaning,
        Category::Gardening,
        Category::Landscaping,
        Category::Roofing,
        Category::Hvac,
        Category::Handyman,
    ];

    /// Stored (lower-case) form
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plumbing => "plumbing",
            Category::Electrical => "electrical",
            Category::Carpentry => "carpentry",
            Category::Painting => "painting",
            Category::Cleaning => "cleaning",
            Category::Gardening => "gardening",
            Category::Landscaping => "landscaping",
            Category::Roofing => "roofing",
            Category::Hvac => "hvac",
            Category::Handyman => "handyman",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Plumbing => "Plumbing",
            Category::Electrical => "Electrical",
            Category::Carpentry => "Carpentry",
            Category::Painting => "Painting",
            Category::Cleaning => "Cleaning",
            Category::Gardening => "Gardening",
            Category::Landscaping => "Landscaping",
            Category::Roofing => "Roofing",
            Category::Hvac => "HVAC",
            Category::Handyman => "Handyman",
        }
    }

    /// Case-insensitive parse of a stored or user-entered category
    pub fn parse(value: &str) -> Option<Category> {
        let lower = value.trim().to_lowercase();
        Category::ALL.iter().copied().find(|c| c.as_str() == lower)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Treat "" the same as a missing value (the web client stores empty image URLs)
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// A single review record attached to a listing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A service-provider record shown in the directory
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Document id; not part of the stored fields
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: String,
}

impl Listing {
    pub fn category(&self) -> Option<Category> {
        Category::parse(&self.category)
    }

    pub fn is_owned_by(&self, uid: &str) -> bool {
        !self.user_id.is_empty() && self.user_id == uid
    }
}

/// Data entered in the add-listing form, before it is stamped and stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub name: String,
    pub category: Category,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub image: Option<String>,
    pub rating: Option<f64>,
}

/// Partial listing update. Owner, id and creation time are not updatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub image: Option<String>,
    pub rating: Option<f64>,
}

/// Profile document kept alongside the identity-provider account
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial profile update. `uid` and `createdAt` are not updatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
}

/// Extra details collected at sign-up and copied into the profile document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpDetails {
    pub display_name: String,
    pub phone: String,
    pub photo_url: String,
}

/// The signed-in account as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Account-level profile fields held by the identity provider itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountProfile {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// An image picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Build from raw bytes, sniffing the content type from the data first and
    /// the file extension second.
    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let content_type = image::guess_format(&bytes)
            .ok()
            .or_else(|| image::ImageFormat::from_path(path).ok())
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
