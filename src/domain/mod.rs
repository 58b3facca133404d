mod loose_value;
mod new_review;
mod registration_record;

pub use loose_value::{deserialize_option_text, interpolate, truthy_text};
pub use new_review::{NewReview, ReviewAuthor, ReviewText, ReviewValidationError};
pub use registration_record::RegistrationRecord;
