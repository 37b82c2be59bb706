//! Shared pieces of form-handling actions.

use serde::Serialize;

/// Where login sends users when no `redirectTo` was given
pub const DEFAULT_REDIRECT: &str = "/jokes";

/// Body of a 400 response from a form action
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionData<E, F> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<E>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<F>,
}

impl<E, F> ActionData<E, F> {
    /// The form itself was malformed
    pub fn form_error(message: impl Into<String>) -> Self {
        Self {
            form_error: Some(message.into()),
            field_errors: None,
            fields: None,
        }
    }

    /// One or more fields failed validation
    pub fn invalid(field_errors: E, fields: F) -> Self {
        Self {
            form_error: None,
            field_errors: Some(field_errors),
            fields: Some(fields),
        }
    }

    /// Fields were valid but the action was refused
    pub fn rejected(fields: F, message: impl Into<String>) -> Self {
        Self {
            form_error: Some(message.into()),
            field_errors: None,
            fields: Some(fields),
        }
    }
}

/// Treat missing and empty form values alike
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Accept only same-site absolute paths as a post-login destination
pub fn safe_redirect(to: Option<&str>, default: &str) -> String {
    match to {
        Some(to)
            if to.starts_with('/')
                && !to.starts_with("//")
                && !to.starts_with("/\\")
                && to.is_ascii()
                && !to.chars().any(|c| c.is_ascii_control()) =>
        {
            to.to_string()
        }
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/jokes/new"), DEFAULT_REDIRECT), "/jokes/new");
        assert_eq!(safe_redirect(None, DEFAULT_REDIRECT), "/jokes");
        assert_eq!(safe_redirect(Some(""), DEFAULT_REDIRECT), "/jokes");
        assert_eq!(safe_redirect(Some("https://evil.example"), DEFAULT_REDIRECT), "/jokes");
        assert_eq!(safe_redirect(Some("//evil.example"), DEFAULT_REDIRECT), "/jokes");
        assert_eq!(safe_redirect(Some("/\\evil.example"), DEFAULT_REDIRECT), "/jokes");
        assert_eq!(safe_redirect(Some("/a\r\nb"), DEFAULT_REDIRECT), "/jokes");
    }

    #[test]
    fn test_action_data_skips_empty_parts() {
        let data = ActionData::<(), ()>::form_error("Form not submitted properly.");
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json, serde_json::json!({ "formError": "Form not submitted properly." }));
    }
}
