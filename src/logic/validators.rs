//! Field and form validation
//!
//! Invalid input is never an error here: checks return a boolean or a
//! `Validation` carrying the message to show beside the field. Form-level
//! checks collect those messages into a field → message map.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::api::{Category, ImageFile};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static CITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s\-']+$").expect("city pattern"));

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Outcome of a single-field check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: &'static str,
}

impl Validation {
    fn ok(message: &'static str) -> Self {
        Self {
            valid: true,
            message,
        }
    }

    fn fail(message: &'static str) -> Self {
        Self {
            valid: false,
            message,
        }
    }
}

/// Field name → message for every failing field
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Outcome of a whole-form check; valid iff `errors` is empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidation {
    pub errors: FieldErrors,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn digit_count(value: &str) -> usize {
    value.chars().filter(|c| c.is_ascii_digit()).count()
}

/// # Examples
/// ```
/// use servicefinder::logic::validators::validate_email;
///
/// assert!(validate_email("  joe@plumbing.co.za "));
/// assert!(!validate_email("joe@plumbing"));
/// assert!(!validate_email("joe smith@plumbing.com"));
/// ```
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_RE.is_match(email.trim())
}

/// 10 to 15 digits once punctuation and spaces are stripped
///
/// # Examples
/// ```
/// use servicefinder::logic::validators::validate_phone;
///
/// assert!(validate_phone("082 123 4567"));
/// assert!(validate_phone("+27 (82) 123-4567"));
/// assert!(!validate_phone("123-4567"));
/// ```
pub fn validate_phone(phone: &str) -> bool {
    let digits = digit_count(phone);
    (10..=15).contains(&digits)
}

pub fn validate_password(password: &str) -> Validation {
    let len = password.chars().count();
    if len == 0 {
        Validation::fail("Password is required")
    } else if len < 6 {
        Validation::fail("Password must be at least 6 characters")
    } else if len > 128 {
        Validation::fail("Password is too long")
    } else {
        Validation::ok("Password is valid")
    }
}

pub fn validate_service_name(name: &str) -> Validation {
    if name.is_empty() {
        return Validation::fail("Service name is required");
    }
    let len = name.trim().chars().count();
    if len < 3 {
        Validation::fail("Service name must be at least 3 characters")
    } else if len > 100 {
        Validation::fail("Service name is too long (max 100 characters)")
    } else {
        Validation::ok("Service name is valid")
    }
}

pub fn validate_description(description: &str) -> Validation {
    if description.is_empty() {
        return Validation::fail("Description is required");
    }
    let len = description.trim().chars().count();
    if len < 10 {
        Validation::fail("Description must be at least 10 characters")
    } else if len > 1000 {
        Validation::fail("Description is too long (max 1000 characters)")
    } else {
        Validation::ok("Description is valid")
    }
}

pub fn validate_category(category: &str) -> bool {
    Category::ALL
        .iter()
        .any(|c| c.as_str() == category.to_lowercase())
}

pub fn validate_city(city: &str) -> Validation {
    if city.is_empty() {
        return Validation::fail("City is required");
    }
    let trimmed = city.trim();
    let len = trimmed.chars().count();
    if len < 2 {
        Validation::fail("City name must be at least 2 characters")
    } else if len > 50 {
        Validation::fail("City name is too long")
    } else if !CITY_RE.is_match(trimmed) {
        Validation::fail("City name contains invalid characters")
    } else {
        Validation::ok("City name is valid")
    }
}

pub fn validate_rating(rating: f64) -> bool {
    (1.0..=5.0).contains(&rating)
}

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

pub fn validate_image_file(file: Option<&ImageFile>) -> Validation {
    let Some(file) = file else {
        return Validation::fail("No file selected");
    };
    if file.size() > MAX_IMAGE_BYTES {
        Validation::fail("Image size must be less than 5MB")
    } else if !is_allowed_image_type(&file.content_type) {
        Validation::fail("Invalid file type. Please upload JPG, PNG, WEBP, or GIF")
    } else {
        Validation::ok("Image is valid")
    }
}

/// Raw add-listing form values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceForm {
    pub name: String,
    pub category: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub city: String,
}

pub fn validate_service_form(form: &ServiceForm) -> FormValidation {
    let mut errors = FieldErrors::new();

    let name = validate_service_name(&form.name);
    if !name.valid {
        errors.insert("name", name.message);
    }

    if !validate_category(&form.category) {
        errors.insert("category", "Please select a valid category");
    }

    let description = validate_description(&form.description);
    if !description.valid {
        errors.insert("description", description.message);
    }

    // Phone is optional
    if !form.phone.is_empty() && !validate_phone(&form.phone) {
        errors.insert("phone", "Please enter a valid phone number");
    }

    if !validate_email(&form.email) {
        errors.insert("email", "Please enter a valid email address");
    }

    let city = validate_city(&form.city);
    if !city.valid {
        errors.insert("city", city.message);
    }

    FormValidation { errors }
}

pub fn validate_sign_in_form(email: &str, password: &str) -> FormValidation {
    let mut errors = FieldErrors::new();

    if email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !validate_email(email) {
        errors.insert("email", "Please enter a valid email address");
    }

    if password.is_empty() {
        errors.insert("password", "Password is required");
    } else if password.chars().count() < 6 {
        errors.insert("password", "Password must be at least 6 characters");
    }

    FormValidation { errors }
}

/// Raw sign-up form values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

pub fn validate_sign_up_form(form: &SignUpForm) -> FormValidation {
    let mut errors = FieldErrors::new();

    let name_len = form.display_name.trim().chars().count();
    if name_len == 0 {
        errors.insert("displayName", "Name is required");
    } else if name_len < 2 {
        errors.insert("displayName", "Name must be at least 2 characters");
    }

    if form.email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !validate_email(&form.email) {
        errors.insert("email", "Please enter a valid email address");
    }

    if !form.phone.is_empty() && !validate_phone(&form.phone) {
        errors.insert("phone", "Please enter a valid phone number");
    }

    let password = validate_password(&form.password);
    if !password.valid {
        errors.insert("password", password.message);
    }

    if form.confirm_password.is_empty() {
        errors.insert("confirmPassword", "Please confirm your password");
    } else if form.password != form.confirm_password {
        errors.insert("confirmPassword", "Passwords do not match");
    }

    FormValidation { errors }
}

/// Score 0..=5: one point each for length ≥ 6, length ≥ 10, mixed case,
/// a digit, and a symbol.
///
/// # Examples
/// ```
/// use servicefinder::logic::validators::password_strength;
///
/// assert_eq!(password_strength(""), 0);
/// assert_eq!(password_strength("abcdef"), 1);
/// assert_eq!(password_strength("Abcdef12!xyz"), 5);
/// ```
pub fn password_strength(password: &str) -> u8 {
    let len = password.chars().count();
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

    [
        len >= 6,
        len >= 10,
        has_lower && has_upper,
        has_digit,
        has_symbol,
    ]
    .iter()
    .filter(|hit| **hit)
    .count() as u8
}

pub fn password_strength_label(score: u8) -> &'static str {
    match score {
        0 => "Very Weak",
        1 => "Weak",
        2 => "Fair",
        3 => "Good",
        _ => "Strong",
    }
}
