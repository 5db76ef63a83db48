//! Practitioner settings.

use serde::{Deserialize, Serialize};

/// Settings key under which the letterhead is stored.
pub const LETTERHEAD_KEY: &str = "letterheadDetails";

pub const DEFAULT_NUTRITIONIST_NAME: &str = "Your Nutritionist Name";
pub const DEFAULT_EMAIL: &str = "your.email@example.com";
pub const DEFAULT_PHONE: &str = "(123) 456-7890";

/// Letterhead details printed at the top of exported diet charts.
///
/// Fields are stored as entered. Blank or missing values fall back to
/// placeholders when the document is rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LetterheadSettings {
    #[serde(default)]
    pub nutritionist_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl LetterheadSettings {
    pub fn display_name(&self) -> &str {
        non_blank(&self.nutritionist_name).unwrap_or(DEFAULT_NUTRITIONIST_NAME)
    }

    pub fn display_email(&self) -> &str {
        non_blank(&self.email).unwrap_or(DEFAULT_EMAIL)
    }

    pub fn display_phone(&self) -> &str {
        non_blank(&self.phone).unwrap_or(DEFAULT_PHONE)
    }

    /// Overlay the fields present in `update`, keeping the rest.
    pub fn merge(&mut self, update: LetterheadSettings) {
        if update.nutritionist_name.is_some() {
            self.nutritionist_name = update.nutritionist_name;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_and_blank() {
        let settings = LetterheadSettings {
            nutritionist_name: None,
            email: Some("   ".into()),
            phone: Some("555-0100".into()),
        };
        assert_eq!(settings.display_name(), DEFAULT_NUTRITIONIST_NAME);
        assert_eq!(settings.display_email(), DEFAULT_EMAIL);
        assert_eq!(settings.display_phone(), "555-0100");
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut settings = LetterheadSettings {
            nutritionist_name: Some("Dr. Rao".into()),
            email: Some("rao@example.com".into()),
            phone: None,
        };
        settings.merge(LetterheadSettings {
            phone: Some("555-0100".into()),
            ..Default::default()
        });
        assert_eq!(settings.nutritionist_name.as_deref(), Some("Dr. Rao"));
        assert_eq!(settings.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&LetterheadSettings {
            nutritionist_name: Some("A".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(json.contains("nutritionistName"));
    }
}
