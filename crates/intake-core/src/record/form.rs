//! Intake form validation.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const SERIAL_MAX: usize = 100;
const CLIENT_NAME_MAX: usize = 150;
const EMAIL_MAX: usize = 254;
const PHONE_MAX: usize = 50;

/// Image extensions accepted for photo uploads.
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "heic"];

/// `local@domain.tld`: no whitespace or `@` in the local part, and at least two
/// domain labels that do not start or end with a hyphen.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$")
        .unwrap()
});

/// Raw intake form fields, as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordForm {
    pub vci_serial: String,
    pub tablet_serial: String,
    pub prog_serial: String,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub request_text: String,
}

/// Validated record fields, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub vci_serial: String,
    pub tablet_serial: String,
    pub prog_serial: String,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub request_text: String,
}

/// Per-field validation messages, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Merge another set of errors into this one.
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }
}

impl RecordForm {
    /// Assign a named text field. Returns `false` for names the form does not know.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "vci_serial" => &mut self.vci_serial,
            "tablet_serial" => &mut self.tablet_serial,
            "prog_serial" => &mut self.prog_serial,
            "client_name" => &mut self.client_name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "request_text" => &mut self.request_text,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Trim and check every field.
    pub fn validate(&self) -> Result<NewRecord, FieldErrors> {
        let mut errors = FieldErrors::new();

        let record = NewRecord {
            vci_serial: self.vci_serial.trim().to_string(),
            tablet_serial: self.tablet_serial.trim().to_string(),
            prog_serial: self.prog_serial.trim().to_string(),
            client_name: self.client_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            request_text: self.request_text.trim().to_string(),
        };

        check_length(&mut errors, "vci_serial", &record.vci_serial, SERIAL_MAX);
        check_length(&mut errors, "tablet_serial", &record.tablet_serial, SERIAL_MAX);
        check_length(&mut errors, "prog_serial", &record.prog_serial, SERIAL_MAX);

        if record.client_name.is_empty() {
            errors.add("client_name", "This field is required.");
        } else {
            check_length(&mut errors, "client_name", &record.client_name, CLIENT_NAME_MAX);
        }

        if !record.email.is_empty() {
            if !is_valid_email(&record.email) {
                errors.add("email", "Enter a valid email address.");
            }
            check_length(&mut errors, "email", &record.email, EMAIL_MAX);
        }

        check_length(&mut errors, "phone", &record.phone, PHONE_MAX);

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Check an uploaded photo. Returns the lowercase extension to store it under.
pub fn validate_photo(filename: Option<&str>, size: usize) -> Result<String, String> {
    if size == 0 {
        return Err("The submitted file is empty.".to_string());
    }
    let extension = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| PHOTO_EXTENSIONS.contains(&ext.as_str()));

    extension.ok_or_else(|| {
        "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
            .to_string()
    })
}
