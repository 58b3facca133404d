use crate::domain::RegistrationRecord;
use crate::email_client::{EmailClient, Receipt, SendError};
use crate::routes::{error_chain_fmt, parse_json_body};
use crate::store::{PersistenceError, RegistrationStore};
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use anyhow::Context;
use std::fmt::Formatter;

//region SubmitError & Implementations
#[derive(thiserror::Error)]
pub enum SubmitError {
    #[error("Error saving data")]
    PersistenceError(#[from] PersistenceError),
    #[error("Error sending email: {0}")]
    SendError(#[from] SendError),
    #[error("Error saving data")]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }
}
//endregion

//region HTTP handlers
#[tracing::instrument(
    name = "Saving a new registration",
    skip(request, body, store, email_client),
    fields(username = tracing::field::Empty)
)]
pub async fn submit(
    request: HttpRequest,
    body: web::Bytes,
    store: web::Data<dyn RegistrationStore>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, SubmitError> {
    let record: RegistrationRecord =
        parse_json_body(&request, &body)
            .context("Failed to parse the registration form")?;
    tracing::Span::current().record("username", &tracing::field::debug(&record.username));

    store.save(&record).await?;
    send_registration_notification(&email_client, &record).await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Data saved successfully and email sent!"))
}
//endregion

//region Helper functions
#[tracing::instrument(
    name = "Notify about a new registration",
    skip(email_client, record)
)]
pub async fn send_registration_notification(
    email_client: &EmailClient,
    record: &RegistrationRecord,
) -> Result<Receipt, SendError> {
    email_client
        .send_notification("New Form Submission", &record.notification_body())
        .await
}
//endregion
