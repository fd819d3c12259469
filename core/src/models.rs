use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Display price, kept as formatted text.
    pub price: String,
    pub image: String,
    pub category: String,
}

impl MenuItem {
    /// Category as used for filtering: lower-cased.
    #[must_use]
    pub fn category_key(&self) -> String {
        self.category.to_lowercase()
    }
}

// --- Session / profile ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct NotificationPrefs {
    pub order_statuses: bool,
    pub password_changes: bool,
    pub special_offers: bool,
    pub newsletter: bool,
}

/// Signed-in user state.
///
/// Optional fields are `None` until the user provides them; a stored empty
/// string is never produced. Updates consume the session and return a new
/// one, so screens hold a value rather than a shared mutable reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub notifications: NotificationPrefs,
    pub onboarding_completed: bool,
}

impl Session {
    #[must_use]
    pub fn with_first_name(self, first_name: impl Into<String>) -> Self {
        Self {
            first_name: non_empty(first_name.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_email(self, email: impl Into<String>) -> Self {
        Self {
            email: non_empty(email.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_phone(self, phone: Option<String>) -> Self {
        Self {
            phone: phone.and_then(non_empty),
            ..self
        }
    }

    #[must_use]
    pub fn with_profile_image(self, uri: Option<String>) -> Self {
        Self {
            profile_image: uri.and_then(non_empty),
            ..self
        }
    }

    #[must_use]
    pub fn with_notifications(self, notifications: NotificationPrefs) -> Self {
        Self {
            notifications,
            ..self
        }
    }

    #[must_use]
    pub fn completed_onboarding(self) -> Self {
        Self {
            onboarding_completed: true,
            ..self
        }
    }

    /// Initials for an avatar placeholder when no profile image is set.
    #[must_use]
    pub fn initials(&self) -> String {
        self.first_name
            .as_deref()
            .and_then(|n| n.chars().next())
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// Apply a partial update. Only fields present in `update` change.
    #[must_use]
    pub fn apply(self, update: &ProfileUpdate) -> Self {
        let mut next = self;
        if let Some(name) = &update.first_name {
            next = next.with_first_name(name.clone());
        }
        if let Some(email) = &update.email {
            next = next.with_email(email.clone());
        }
        if let Some(phone) = &update.phone {
            next = next.with_phone(Some(phone.clone()));
        }
        if let Some(image) = &update.profile_image {
            next = next.with_profile_image(Some(image.clone()));
        }
        if let Some(prefs) = update.notifications {
            next = next.with_notifications(prefs);
        }
        next
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub notifications: Option<NotificationPrefs>,
}

// --- Validation ---

static FIRST_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("valid first name regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email regex"));

/// Field-level validation failures, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect();
        write!(f, "invalid input: {}", parts.join("; "))
    }
}

pub fn validate_first_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("First name is required".to_string());
    }
    if !FIRST_NAME_RE.is_match(name) {
        return Err("First name must contain only letters".to_string());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err("Please enter a valid email address".to_string())
    }
}

/// Accepts 10-digit numbers written with optional spaces, dashes, dots or
/// parentheses, e.g. `(312) 555-0147`.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    if digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Phone number must have 10 digits".to_string())
    }
}

/// Validate the onboarding form, collecting every failing field.
pub fn validate_onboarding(first_name: &str, email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Err(msg) = validate_first_name(first_name) {
        errors.push("first_name", msg);
    }
    if let Err(msg) = validate_email(email) {
        errors.push("email", msg);
    }
    errors.into_result()
}

/// Validate only the fields a profile update touches.
pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if let Some(name) = &update.first_name {
        if let Err(msg) = validate_first_name(name) {
            errors.push("first_name", msg);
        }
    }
    if let Some(email) = &update.email {
        if let Err(msg) = validate_email(email) {
            errors.push("email", msg);
        }
    }
    if let Some(phone) = update.phone.as_deref().filter(|p| !p.is_empty()) {
        if let Err(msg) = validate_phone(phone) {
            errors.push("phone", msg);
        }
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name_rules() {
        assert!(validate_first_name("Tilly").is_ok());
        assert_eq!(
            validate_first_name("").unwrap_err(),
            "First name is required"
        );
        assert_eq!(
            validate_first_name("Tilly2").unwrap_err(),
            "First name must contain only letters"
        );
        assert!(validate_first_name("Mary Ann").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("tilly@example.com").is_ok());
        assert!(validate_email("tilly@example").is_err());
        assert!(validate_email("").is_err());
        assert!(validate_email("no at sign.com").is_err());
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("3125550147").is_ok());
        assert!(validate_phone("(312) 555-0147").is_ok());
        assert!(validate_phone("312.555.0147").is_ok());
        assert!(validate_phone("555-0147").is_err());
        assert!(validate_phone("31255501xx").is_err());
    }

    #[test]
    fn test_validate_onboarding_collects_all_fields() {
        let errors = validate_onboarding("", "bad").unwrap_err();
        assert_eq!(errors.get("first_name"), Some("First name is required"));
        assert_eq!(
            errors.get("email"),
            Some("Please enter a valid email address")
        );
        assert_eq!(errors.iter().count(), 2);
        assert!(errors.to_string().contains("first_name"));

        assert!(validate_onboarding("Tilly", "tilly@example.com").is_ok());
    }

    #[test]
    fn test_validate_profile_update_only_checks_present_fields() {
        let update = ProfileUpdate {
            phone: Some("12".to_string()),
            ..Default::default()
        };
        let errors = validate_profile_update(&update).unwrap_err();
        assert!(errors.get("phone").is_some());
        assert!(errors.get("first_name").is_none());

        // Empty phone clears the field and is not an error
        let update = ProfileUpdate {
            phone: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_profile_update(&update).is_ok());
    }

    #[test]
    fn test_session_updates_return_new_value() {
        let base = Session::default();
        let next = base
            .clone()
            .with_first_name("Tilly")
            .with_email("tilly@example.com")
            .completed_onboarding();

        assert!(base.first_name.is_none());
        assert!(!base.onboarding_completed);
        assert_eq!(next.first_name.as_deref(), Some("Tilly"));
        assert!(next.onboarding_completed);
        assert_eq!(next.initials(), "T");
    }

    #[test]
    fn test_session_blank_strings_become_none() {
        let s = Session::default()
            .with_first_name("  ")
            .with_profile_image(Some(String::new()));
        assert!(s.first_name.is_none());
        assert!(s.profile_image.is_none());
        assert_eq!(s.initials(), "");
    }

    #[test]
    fn test_session_apply_partial_update() {
        let s = Session::default().with_first_name("Tilly");
        let update = ProfileUpdate {
            phone: Some("3125550147".to_string()),
            notifications: Some(NotificationPrefs {
                newsletter: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        let s = s.apply(&update);
        assert_eq!(s.first_name.as_deref(), Some("Tilly"));
        assert_eq!(s.phone.as_deref(), Some("3125550147"));
        assert!(s.notifications.newsletter);
        assert!(!s.notifications.special_offers);
    }

    #[test]
    fn test_category_key_lowercases() {
        let item = MenuItem {
            id: 1,
            title: "Greek Salad".to_string(),
            description: String::new(),
            price: "12.99".to_string(),
            image: String::new(),
            category: "Starters".to_string(),
        };
        assert_eq!(item.category_key(), "starters");
    }
}
