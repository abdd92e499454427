//! Local input validation. Runs before any store mutation or network call.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::agent::{AccountStatus, FieldKind, Gender, ProfileField};
use crate::form::EditForm;

/// Closed set of reasons an application may be rejected with.
pub const REJECTION_REASONS: [&str; 9] = [
    "Incomplete documentation",
    "Invalid identification documents",
    "Insufficient experience/qualifications",
    "Failed background check",
    "Duplicate application",
    "Does not meet minimum requirements",
    "Invalid contact information",
    "Missing required certifications",
    "Application submitted incorrectly",
];

/// Default ceiling for agreement uploads.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("please select a rejection reason")]
    MissingRejectionReason,
    #[error("unknown rejection reason: {0}")]
    UnknownRejectionReason(String),
    #[error("{field} is required")]
    RequiredField { field: &'static str },
    #[error("please enter a valid {field}")]
    InvalidEmail { field: String },
    #[error("gender must be male or female, got {0:?}")]
    InvalidGender(String),
    #[error("a reason is required to change account status")]
    MissingStatusReason,
    #[error("account is already {0}")]
    StatusUnchanged(AccountStatus),
    #[error("no agreement document selected")]
    MissingDocument,
    #[error("agreement must be a PDF, got {filename}")]
    NotPdf { filename: String },
    #[error("agreement document is empty")]
    EmptyDocument,
    #[error("agreement is {size} bytes, limit is {limit} bytes")]
    DocumentTooLarge { size: u64, limit: u64 },
    #[error("unknown sales support member: {0}")]
    UnknownSupportMember(String),
    #[error("invalid filter {key}: {reason}")]
    InvalidFilter { key: String, reason: String },
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Reject needs one of [`REJECTION_REASONS`]; notes are free text.
pub fn validate_rejection(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        return Err(ValidationError::MissingRejectionReason);
    }
    if REJECTION_REASONS.contains(&reason) {
        Ok(())
    } else {
        Err(ValidationError::UnknownRejectionReason(reason.to_string()))
    }
}

/// Required fields must be non-blank, email-typed fields must look like an
/// address when filled, and gender must be one of the fixed options. The
/// first failing field, in form order, is reported.
pub fn validate_edit_form(form: &EditForm) -> Result<(), ValidationError> {
    for field in ProfileField::ALL {
        let value = form.get(field);
        if field.required() && value.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: field.label(),
            });
        }
        if value.trim().is_empty() {
            continue;
        }
        match field.kind() {
            FieldKind::Email if !is_valid_email(value) => {
                return Err(ValidationError::InvalidEmail {
                    field: field.label().to_lowercase(),
                });
            }
            FieldKind::Gender if value.parse::<Gender>().is_err() => {
                return Err(ValidationError::InvalidGender(value.to_string()));
            }
            _ => {}
        }
    }
    Ok(())
}

pub fn validate_status_change(
    current: Option<AccountStatus>,
    target: AccountStatus,
    reason: &str,
) -> Result<(), ValidationError> {
    if current == Some(target) {
        return Err(ValidationError::StatusUnchanged(target));
    }
    if reason.trim().is_empty() {
        return Err(ValidationError::MissingStatusReason);
    }
    Ok(())
}

/// PDF by extension or declared content type, non-empty, within `limit`.
pub fn validate_document(
    filename: &str,
    content_type: Option<&str>,
    size: u64,
    limit: u64,
) -> Result<(), ValidationError> {
    let pdf_name = filename.to_ascii_lowercase().ends_with(".pdf");
    let pdf_type = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE));
    if !pdf_name && !pdf_type {
        return Err(ValidationError::NotPdf {
            filename: filename.to_string(),
        });
    }
    if size == 0 {
        return Err(ValidationError::EmptyDocument);
    }
    if size > limit {
        return Err(ValidationError::DocumentTooLarge { size, limit });
    }
    Ok(())
}
