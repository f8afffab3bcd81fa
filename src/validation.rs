//! Field validation.
//!
//! Every rule is a pure function returning a [`ValidationResult`]. An
//! [`Level::Error`] blocks script generation; a [`Level::Warning`] is shown
//! to the moderator but doesn't block anything.

use crate::catalog::HubLists;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Valid,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub level: Level,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            level: Level::Valid,
            message: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.level == Level::Valid
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.level, &self.message) {
            (Level::Valid, _) => f.write_str("valid"),
            (Level::Warning, Some(m)) => write!(f, "warning: {m}"),
            (Level::Error, Some(m)) => write!(f, "error: {m}"),
            (Level::Warning, None) => f.write_str("warning"),
            (Level::Error, None) => f.write_str("error"),
        }
    }
}

pub fn validate_user_name(user_name: &str) -> ValidationResult {
    if user_name.is_empty() {
        return ValidationResult::error("Required value");
    }
    if user_name.starts_with('@') {
        return ValidationResult::error("Don't include the '@' in user names");
    }
    if user_name.contains('\n') || user_name.contains('\r') {
        return ValidationResult::error("Newline characters are not allowed in user names");
    }
    if user_name.chars().any(char::is_whitespace) {
        return ValidationResult::error("Spaces are not allowed in user names");
    }
    if user_name.chars().count() <= 1 {
        return ValidationResult::error("User name should be more than 1 character long");
    }
    ValidationResult::valid()
}

/// User name rules plus the hub's disallow and caution lists.
pub fn validate_user(
    hub: &str,
    user_name: &str,
    disallow: &HubLists,
    caution: &HubLists,
) -> ValidationResult {
    let result = validate_user_name(user_name);
    if !result.is_valid() {
        return result;
    }
    if disallow.contains(hub, user_name) {
        return ValidationResult::error("User is on the disallow list");
    }
    if caution.contains(hub, user_name) {
        return ValidationResult::warning("User is on the caution list");
    }
    ValidationResult::valid()
}

pub fn validate_value_not_empty(value: &str) -> ValidationResult {
    if value.is_empty() {
        ValidationResult::error("Required value")
    } else {
        ValidationResult::valid()
    }
}

pub fn validate_values_not_empty(values: &[&str]) -> ValidationResult {
    if values.iter().any(|v| v.is_empty()) {
        ValidationResult::error("Required value")
    } else {
        ValidationResult::valid()
    }
}

/// Error when `value` is empty or equals `sentinel`, ignoring case.
pub fn validate_value_not_default(value: &str, sentinel: &str) -> ValidationResult {
    if value.is_empty() || value.to_lowercase() == sentinel.to_lowercase() {
        ValidationResult::error("Required value")
    } else {
        ValidationResult::valid()
    }
}

pub fn validate_user_profile_url(url: &str, prefix: &str) -> ValidationResult {
    if url.is_empty() {
        return ValidationResult::error("Required value");
    }
    if !url.starts_with(prefix) {
        return ValidationResult::error(format!("User profile URL should start with {prefix}"));
    }
    ValidationResult::valid()
}

/// The fields gating the feature, comment, and original-post scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedField {
    User,
    Membership,
    YourName,
    YourFirstName,
    Page,
}

impl GatedField {
    pub const ALL: [GatedField; 5] = [
        Self::User,
        Self::Membership,
        Self::YourName,
        Self::YourFirstName,
        Self::Page,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Membership => "Level",
            Self::YourName => "You",
            Self::YourFirstName => "Your first name",
            Self::Page => "Page",
        }
    }
}

/// Validation results for every gated field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValidation {
    pub user: ValidationResult,
    pub membership: ValidationResult,
    pub your_name: ValidationResult,
    pub your_first_name: ValidationResult,
    pub page: ValidationResult,
    pub new_membership: ValidationResult,
}

impl FieldValidation {
    pub fn get(&self, field: GatedField) -> &ValidationResult {
        match field {
            GatedField::User => &self.user,
            GatedField::Membership => &self.membership,
            GatedField::YourName => &self.your_name,
            GatedField::YourFirstName => &self.your_first_name,
            GatedField::Page => &self.page,
        }
    }

    pub fn can_copy_scripts(&self) -> bool {
        GatedField::ALL.iter().all(|&f| !self.get(f).is_error())
    }

    pub fn can_copy_new_membership_script(&self) -> bool {
        !self.new_membership.is_error() && !self.user.is_error()
    }

    /// Fields currently in the error state, in display order.
    pub fn failures(&self) -> impl Iterator<Item = (GatedField, &ValidationResult)> {
        GatedField::ALL
            .into_iter()
            .map(|f| (f, self.get(f)))
            .filter(|(_, r)| r.is_error())
    }

    /// One `"Field: message"` line per failing field.
    pub fn diagnostic(&self) -> String {
        let mut out = String::new();
        for (field, result) in self.failures() {
            out.push_str(field.label());
            out.push_str(": ");
            out.push_str(result.message());
            out.push('\n');
        }
        out
    }
}
