use crate::domain::truthy_text;
use serde_json::Value;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Review text and author are required")]
pub struct ReviewValidationError;

#[derive(Debug)]
pub struct ReviewText(String);

impl ReviewText {
    /// Rejects absent and falsy values. Whitespace counts as content and
    /// other scalars are kept as their text.
    pub fn parse(value: Option<Value>) -> Result<ReviewText, ReviewValidationError> {
        truthy_text(value).map(Self).ok_or(ReviewValidationError)
    }
}

impl AsRef<str> for ReviewText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
pub struct ReviewAuthor(String);

impl ReviewAuthor {
    pub fn parse(value: Option<Value>) -> Result<ReviewAuthor, ReviewValidationError> {
        truthy_text(value).map(Self).ok_or(ReviewValidationError)
    }
}

impl AsRef<str> for ReviewAuthor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A review that is forwarded to the notification channel and never stored.
#[derive(Debug)]
pub struct NewReview {
    pub text: ReviewText,
    pub author: ReviewAuthor,
}

impl NewReview {
    pub fn notification_body(&self) -> String {
        format!(
            "A new review has been submitted:\n- Review: \"{}\"\n- Author: {}",
            self.text.as_ref(),
            self.author.as_ref()
        )
    }
}
