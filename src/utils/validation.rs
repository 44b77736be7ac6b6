use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::error::AppError;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .expect("valid email regex");
    static ref AADHAR_RE: Regex = Regex::new(r"^\d{12}$").expect("valid aadhar regex");
    static ref PINCODE_RE: Regex = Regex::new(r"^\d{6}$").expect("valid pincode regex");
    static ref PHONE_RE: Regex = Regex::new(r"^\d{10}$").expect("valid phone regex");
    static ref WEBSITE_RE: Regex = Regex::new(r"^https?://.+").expect("valid website regex");
}

/// Collects every violated rule of a document before failing.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) {
        if !ok {
            self.push(message);
        }
    }

    /// Records `message` when the field is absent or blank.
    pub fn require(&mut self, value: Option<&str>, message: impl Into<String>) {
        self.check(value.map_or(false, |v| !v.trim().is_empty()), message);
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.0))
        }
    }
}

pub fn is_email(value: &str) -> bool {
    value.len() <= 254 && EMAIL_RE.is_match(value)
}

pub fn is_aadhar(value: &str) -> bool {
    AADHAR_RE.is_match(value)
}

pub fn is_pincode(value: &str) -> bool {
    PINCODE_RE.is_match(value)
}

pub fn is_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

pub fn is_github_url(value: &str) -> bool {
    value.is_empty() || value.starts_with("https://github.com/")
}

pub fn is_behance_url(value: &str) -> bool {
    value.is_empty() || value.starts_with("https://www.behance.net/")
}

pub fn is_website_url(value: &str) -> bool {
    value.is_empty() || WEBSITE_RE.is_match(value)
}

/// Trims and drops blank strings; `""` from a form means "not provided".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
