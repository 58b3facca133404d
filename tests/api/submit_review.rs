use crate::helpers::{spawn_app, spawn_app_with_unreachable_relay};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn a_valid_review_sends_exactly_one_email() {
    let app = spawn_app().await;
    let review_text: String = Sentence(3..10).fake();
    let review_author: String = Name().fake();

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_review(&serde_json::json!({
            "reviewText": &review_text,
            "reviewAuthor": &review_author
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        "Review submitted and email sent successfully!"
    );

    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0]["Subject"], "New Review Submitted");
    let body = emails[0]["TextBody"].as_str().unwrap();
    assert!(body.contains(&review_text));
    assert!(body.contains(&review_author));
    assert!(app.store.records().is_empty());
}

#[tokio::test]
async fn review_returns_400_when_fields_are_missing() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (serde_json::json!({}), "empty object"),
        (
            serde_json::json!({ "reviewAuthor": "Ann" }),
            "missing review text",
        ),
        (
            serde_json::json!({ "reviewText": "Great sage!" }),
            "missing author",
        ),
        (
            serde_json::json!({ "reviewText": "", "reviewAuthor": "Ann" }),
            "empty review text",
        ),
        (
            serde_json::json!({ "reviewText": "Great sage!", "reviewAuthor": null }),
            "null author",
        ),
        (
            serde_json::json!({ "reviewText": false, "reviewAuthor": "Ann" }),
            "false review text",
        ),
        (
            serde_json::json!({ "reviewText": "Great sage!", "reviewAuthor": 0 }),
            "zero author",
        ),
    ];

    for (invalid_body, description) in test_cases {
        let response = app.post_review(&invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 when the payload was {}.",
            description
        );
        assert_eq!(
            response.text().await.unwrap(),
            "Review text and author are required"
        );
    }
    assert!(app.store.records().is_empty());
}

#[tokio::test]
async fn review_returns_500_when_the_mail_relay_is_unreachable() {
    let app = spawn_app_with_unreachable_relay().await;

    let response = app
        .post_review(&serde_json::json!({
            "reviewText": "Great sage!",
            "reviewAuthor": "Ann"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert!(response
        .text()
        .await
        .unwrap()
        .starts_with("Error sending email: "));
    assert!(app.store.records().is_empty());
}

#[tokio::test]
async fn review_returns_500_when_the_relay_rejects_the_credentials() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_review(&serde_json::json!({
            "reviewText": "Great sage!",
            "reviewAuthor": "Ann"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert!(response
        .text()
        .await
        .unwrap()
        .starts_with("Error sending email: Invalid login"));
}

#[tokio::test]
async fn review_returns_500_for_malformed_json() {
    let app = spawn_app().await;

    let response = app.post_raw("/submit-review", "{\"reviewText\"".into()).await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response.text().await.unwrap(),
        "Error handling review submission"
    );
}

#[tokio::test]
async fn a_review_with_non_string_values_is_forwarded_as_text() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_review(&serde_json::json!({
            "reviewText": 5,
            "reviewAuthor": "Ann"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let emails = app.sent_emails().await;
    let body = emails[0]["TextBody"].as_str().unwrap();
    assert!(body.contains("- Review: \"5\""));
    assert!(body.contains("- Author: Ann"));
}

#[tokio::test]
async fn a_review_not_sent_as_json_is_missing_its_fields() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_with_content_type(
            "/submit-review",
            "text/plain",
            r#"{"reviewText": "Great sage!", "reviewAuthor": "Ann"}"#.into(),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
}
