use crate::models::GuestDetails;
use validator::ValidateEmail;

pub const FIRST_NAME_REQUIRED: &str = "First name is required";
pub const LAST_NAME_REQUIRED: &str = "Last name is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";

/// Check the guest form. An empty list means the details can be submitted.
///
/// Phone and special requests are free-form and never checked.
pub fn validate_guest_details(details: &GuestDetails) -> Vec<String> {
    let mut errors = Vec::new();

    if details.first_name.trim().is_empty() {
        errors.push(FIRST_NAME_REQUIRED.to_string());
    }

    if details.last_name.trim().is_empty() {
        errors.push(LAST_NAME_REQUIRED.to_string());
    }

    let email = details.email.trim();
    if email.is_empty() {
        errors.push(EMAIL_REQUIRED.to_string());
    } else if !looks_like_email(email) {
        errors.push(EMAIL_INVALID.to_string());
    }

    errors
}

/// RFC-style address check, plus a dot in the domain: `a@b` is not accepted.
pub fn looks_like_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }

    match email.rsplit_once('@') {
        Some((_, domain)) => domain
            .rfind('.')
            .is_some_and(|dot| dot > 0 && dot + 2 <= domain.len()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(first: &str, last: &str, email: &str) -> GuestDetails {
        GuestDetails {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_details_have_no_errors() {
        assert!(validate_guest_details(&guest("Ana", "Doe", "ana@example.com")).is_empty());
    }

    #[test]
    fn missing_first_name_is_the_only_error() {
        let errors = validate_guest_details(&guest("", "Doe", "a@b.com"));
        assert_eq!(errors, vec![FIRST_NAME_REQUIRED.to_string()]);
    }

    #[test]
    fn malformed_email_gives_one_format_error() {
        let errors = validate_guest_details(&guest("A", "B", "not-an-email"));
        assert_eq!(errors, vec![EMAIL_INVALID.to_string()]);
    }

    #[test]
    fn whitespace_only_fields_count_as_missing() {
        let errors = validate_guest_details(&guest("  ", "\t", "   "));
        assert_eq!(
            errors,
            vec![
                FIRST_NAME_REQUIRED.to_string(),
                LAST_NAME_REQUIRED.to_string(),
                EMAIL_REQUIRED.to_string(),
            ]
        );
    }

    #[test]
    fn optional_fields_are_not_checked() {
        let mut details = guest("A", "B", "a@b.co");
        details.phone = Some("not a phone".into());
        details.special_requests = Some(String::new());
        assert!(validate_guest_details(&details).is_empty());
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("first.last+tag@mail.example.org"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.com"));
        assert!(!looks_like_email("a@.com"));
        assert!(!looks_like_email("a@b."));
        assert!(!looks_like_email("a b@c.com"));
        assert!(!looks_like_email("a@b@c.com"));
    }
}
