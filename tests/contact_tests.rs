mod test_utils;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use mockall::predicate::function;
use portfolio_content::{
    entities::contact::{ContactForm, OutgoingEmail},
    errors::{AppError, EmailError},
    limiter::rate_limiter::RateLimiterStore,
    use_cases::contact::{ContactHandler, CONTACT_SUCCESS_MESSAGE},
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

fn valid_message() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "subject": "Project enquiry",
        "message": "I would like to talk about a new website."
    })
}

fn valid_form() -> ContactForm {
    serde_json::from_value(valid_message()).unwrap()
}

async fn post_contact(app: &TestApp, body: &Value) -> reqwest::Response {
    app.client
        .post(app.url("/api/contact"))
        .json(body)
        .send()
        .await
        .expect("Failed to send contact message")
}

#[actix_rt::test]
async fn short_name_is_rejected_with_field_error() {
    let app = TestApp::spawn_with_sender(Arc::new(accepting_sender())).await;

    let mut body = valid_message();
    body["name"] = json!("Jo");
    let response = post_contact(&app, &body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name"]);
}

#[actix_rt::test]
async fn missing_fields_are_all_reported() {
    let app = TestApp::spawn_with_sender(Arc::new(accepting_sender())).await;

    let response = post_contact(&app, &json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);
}

#[actix_rt::test]
async fn wrongly_typed_field_keeps_the_contact_response_shape() {
    let app = TestApp::spawn_with_sender(Arc::new(accepting_sender())).await;

    let mut body = valid_message();
    body["name"] = json!(123);
    let response = post_contact(&app, &body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(body.get("error").is_none());
}

#[actix_rt::test]
async fn valid_message_is_delivered() {
    let mut sender = MockSender::new();
    sender.expect_recipient().returning(|| Some("owner@example.com".to_string()));
    sender
        .expect_send()
        .with(function(|email: &OutgoingEmail| {
            email.to == "owner@example.com"
                && email.reply_to == "jane@example.com"
                && email.subject.contains("Project enquiry")
                && email.html.contains("Jane")
        }))
        .times(1)
        .returning(|_| Ok(()));
    let app = TestApp::spawn_with_sender(Arc::new(sender)).await;

    let response = post_contact(&app, &valid_message()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], CONTACT_SUCCESS_MESSAGE);
}

#[actix_rt::test]
async fn provider_failure_answers_500() {
    let mut sender = MockSender::new();
    sender.expect_recipient().returning(|| Some("owner@example.com".to_string()));
    sender
        .expect_send()
        .returning(|_| Err(EmailError::Rejected { status: 422, body: "bad from".into() }));
    let app = TestApp::spawn_with_sender(Arc::new(sender)).await;

    let response = post_contact(&app, &valid_message()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().contains("bad from"));
}

#[actix_rt::test]
async fn unconfigured_mail_answers_500() {
    let app = TestApp::spawn().await;

    let response = post_contact(&app, &valid_message()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_rt::test]
async fn repeated_messages_are_rate_limited() {
    let app = TestApp::spawn_with_sender(Arc::new(accepting_sender())).await;

    for _ in 0..app.config.contact_limit_per_hour {
        let response = post_contact(&app, &valid_message()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = post_contact(&app, &valid_message()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn invalid_messages_do_not_use_up_the_limit() {
    let handler = ContactHandler::new(Arc::new(accepting_sender()), RateLimiterStore::per_hour(1));

    let mut invalid = valid_form();
    invalid.name = "Jo".into();
    assert!(matches!(handler.submit(invalid, "10.0.0.1").await, Err(AppError::ValidationError(_))));

    assert!(handler.submit(valid_form(), "10.0.0.1").await.is_ok());
}

#[actix_rt::test]
async fn limit_applies_per_sender_address_across_ips() {
    let handler = ContactHandler::new(Arc::new(accepting_sender()), RateLimiterStore::per_hour(1));

    assert!(handler.submit(valid_form(), "10.0.0.1").await.is_ok());

    let mut same_sender = valid_form();
    same_sender.email = "JANE@example.com".into();
    let result = handler.submit(same_sender, "10.0.0.2").await;
    assert!(matches!(result, Err(AppError::RateLimited(_))));
}

#[actix_rt::test]
async fn rejection_on_sender_address_leaves_the_ip_budget_alone() {
    let handler = ContactHandler::new(Arc::new(accepting_sender()), RateLimiterStore::per_hour(1));

    assert!(handler.submit(valid_form(), "10.0.0.1").await.is_ok());
    let result = handler.submit(valid_form(), "10.0.0.2").await;
    assert!(matches!(result, Err(AppError::RateLimited(_))));

    let mut other_sender = valid_form();
    other_sender.email = "sam@example.com".into();
    assert!(handler.submit(other_sender, "10.0.0.2").await.is_ok());
}

#[actix_rt::test]
async fn failed_delivery_does_not_use_up_the_limit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut sender = MockSender::new();
    sender.expect_recipient().returning(|| Some("owner@example.com".to_string()));
    let seen = calls.clone();
    sender.expect_send().times(2).returning(move |_| {
        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(EmailError::Rejected { status: 503, body: "try later".into() })
        } else {
            Ok(())
        }
    });
    let handler = ContactHandler::new(Arc::new(sender), RateLimiterStore::per_hour(1));

    assert!(matches!(handler.submit(valid_form(), "10.0.0.1").await, Err(AppError::InternalError(_))));
    assert!(handler.submit(valid_form(), "10.0.0.1").await.is_ok());
    assert!(matches!(handler.submit(valid_form(), "10.0.0.1").await, Err(AppError::RateLimited(_))));
}
