use crate::domain::{NewReview, ReviewAuthor, ReviewText, ReviewValidationError};
use crate::email_client::{EmailClient, Receipt, SendError};
use crate::routes::{error_chain_fmt, parse_json_body};
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use anyhow::Context;
use std::fmt::Formatter;

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewForm {
    pub review_text: Option<serde_json::Value>,
    pub review_author: Option<serde_json::Value>,
}

impl TryFrom<ReviewForm> for NewReview {
    type Error = ReviewValidationError;
    fn try_from(form: ReviewForm) -> Result<Self, Self::Error> {
        let text = ReviewText::parse(form.review_text)?;
        let author = ReviewAuthor::parse(form.review_author)?;
        Ok(NewReview { text, author })
    }
}

#[derive(thiserror::Error)]
pub enum ReviewError {
    #[error(transparent)]
    ValidationError(#[from] ReviewValidationError),
    #[error("Error sending email: {0}")]
    SendError(#[from] SendError),
    #[error("Error handling review submission")]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ReviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ReviewError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ReviewError::SendError(_) | ReviewError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }
}

#[tracing::instrument(
    name = "Forwarding a new review",
    skip(request, body, email_client)
)]
pub async fn submit_review(
    request: HttpRequest,
    body: web::Bytes,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, ReviewError> {
    let form: ReviewForm =
        parse_json_body(&request, &body)
            .context("Failed to parse the review submission")?;
    tracing::info!(
        review_text = ?form.review_text,
        review_author = ?form.review_author,
        "Received review"
    );

    let review: NewReview = form.try_into()?;
    send_review_notification(&email_client, &review).await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Review submitted and email sent successfully!"))
}

#[tracing::instrument(name = "Notify about a new review", skip(email_client, review))]
pub async fn send_review_notification(
    email_client: &EmailClient,
    review: &NewReview,
) -> Result<Receipt, SendError> {
    email_client
        .send_notification("New Review Submitted", &review.notification_body())
        .await
}
