use crate::domain::deserialize_option_text;
use serde_aux::field_attributes::deserialize_option_number_from_string;
use std::fmt::{Display, Formatter};

/// A registration form as submitted. Every field is optional and stored
/// exactly as received; absent fields are left out of the stored document.
/// Numbers and booleans sent for a text field are stored as their text.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RegistrationRecord {
    #[serde(
        default,
        deserialize_with = "deserialize_option_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub username: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_number_from_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,
}

/// Renders an optional field for the notification body.
struct FieldDisplay<'a, T>(pub &'a Option<T>);

impl<T: Display> Display for FieldDisplay<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "(not provided)"),
        }
    }
}

impl RegistrationRecord {
    pub fn notification_body(&self) -> String {
        format!(
            "A new form submission has been received:\n\
             - Name: {}\n\
             - Age: {}\n\
             - Gender: {}\n\
             - Email: {}\n\
             - Location: {}",
            FieldDisplay(&self.username),
            FieldDisplay(&self.age),
            FieldDisplay(&self.gender),
            FieldDisplay(&self.email),
            FieldDisplay(&self.location),
        )
    }
}
