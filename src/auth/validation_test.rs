use super::*;

fn valid_form() -> Registration {
    Registration {
        full_name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        password: "secret123".into(),
        confirm_password: "secret123".into(),
        education: "BSc Mathematics".into(),
        preferred_track: "Backend".into(),
        ..Registration::default()
    }
}

// =============================================================================
// registration
// =============================================================================

#[test]
fn valid_registration_passes() {
    assert!(validate_registration(&valid_form()).is_ok());
}

#[test]
fn empty_registration_reports_every_field() {
    let errors = validate_registration(&Registration::default()).unwrap_err();
    for field in ["full_name", "email", "password", "confirm_password", "education", "preferred_track"] {
        assert!(errors.get(field).is_some(), "missing error for {field}");
    }
    assert_eq!(errors.len(), 6);
    assert_eq!(errors.get("confirm_password"), Some("Please confirm your password"));
}

#[test]
fn short_password_rejected() {
    let form = Registration { password: "short".into(), confirm_password: "short".into(), ..valid_form() };
    let errors = validate_registration(&form).unwrap_err();
    assert_eq!(errors.get("password"), Some("Password must be at least 8 characters"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn password_length_counts_characters_not_bytes() {
    let form = Registration { password: "pässwörd".into(), confirm_password: "pässwörd".into(), ..valid_form() };
    assert!(validate_registration(&form).is_ok());
}

#[test]
fn mismatched_confirmation_rejected() {
    let form = Registration { confirm_password: "secret124".into(), ..valid_form() };
    let errors = validate_registration(&form).unwrap_err();
    assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));
}

#[test]
fn malformed_email_rejected() {
    let form = Registration { email: "ada.example.com".into(), ..valid_form() };
    let errors = validate_registration(&form).unwrap_err();
    assert_eq!(errors.get("email"), Some("Email is invalid"));
}

#[test]
fn whitespace_only_fields_count_as_missing() {
    let form = Registration { full_name: "   ".into(), education: "\t".into(), ..valid_form() };
    let errors = validate_registration(&form).unwrap_err();
    assert_eq!(errors.get("full_name"), Some("Full name is required"));
    assert_eq!(errors.get("education"), Some("Education is required"));
}

#[test]
fn confirm_password_is_not_serialized() {
    let json = serde_json::to_value(valid_form()).unwrap();
    assert!(json.get("confirm_password").is_none());
    assert_eq!(json["experience_level"], "Fresher");
}

// =============================================================================
// login + email
// =============================================================================

#[test]
fn login_requires_both_fields() {
    let errors = validate_login(&Credentials::new("", "")).unwrap_err();
    assert_eq!(errors.get("email"), Some("Email is required"));
    assert_eq!(errors.get("password"), Some("Password is required"));
    assert!(validate_login(&Credentials::new("a@b.com", "x")).is_ok());
}

#[test]
fn email_shape() {
    assert!(looks_like_email("a@b.com"));
    assert!(looks_like_email("first.last@mail.example.org"));
    assert!(!looks_like_email("a@b"));
    assert!(!looks_like_email("@b.com"));
    assert!(!looks_like_email("a@.com"));
    assert!(!looks_like_email("a@b."));
    assert!(!looks_like_email("a @b.com"));
    assert!(validate_email("nobody").is_err());
}

#[test]
fn display_lists_fields_in_order() {
    let mut errors = ValidationErrors::new();
    errors.add("password", "too short");
    errors.add("email", "missing");
    errors.add("email", "ignored");
    assert_eq!(errors.to_string(), "email: missing; password: too short");
}

#[test]
fn new_password_uses_registration_rules() {
    let errors = validate_new_password("abc").unwrap_err();
    assert_eq!(errors.get("new_password"), Some("Password must be at least 8 characters"));
    assert!(validate_new_password("longenough").is_ok());
}
