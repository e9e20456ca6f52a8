mod common;

use actix_web::{cookie::Cookie, test};
use serde_json::json;

use common::{TestApp, LLM_ANSWER};
use travel_agent_api::middleware::session::SESSION_COOKIE;

#[actix_rt::test]
async fn test_destination_extracted_from_message() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/destination")
        .set_json(&json!({"message": "tell me about Lisbon", "usePdf": false}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp
        .response()
        .cookies()
        .any(|cookie| cookie.name() == SESSION_COOKIE));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["destination"], "Lisbon");
    assert_eq!(body["response"], LLM_ANSWER);

    let prompts = test_app.gateway.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Provide insights about Lisbon"));
    assert!(prompts[0].contains("No local info available"));
    assert!(prompts[0].contains("No recent history"));
}

#[actix_rt::test]
async fn test_interest_message_greets_without_destination() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/destination")
        .set_json(&json!({"message": "I love good food"}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["destination"].is_null());
    assert_eq!(body["response"], LLM_ANSWER);

    let prompts = test_app.gateway.prompts();
    assert!(prompts[0].contains("food/culinary/eating"));
}

#[actix_rt::test]
async fn test_session_history_persists_with_cookie() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let first = test::TestRequest::post()
        .uri("/api/destination")
        .set_json(&json!({"message": "tell me about Lisbon"}))
        .to_request();
    let resp = test::call_service(&app, first).await;
    assert!(resp.status().is_success());

    let cookie: Cookie<'static> = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned())
        .expect("session cookie");

    let second = test::TestRequest::post()
        .uri("/api/destination")
        .cookie(cookie)
        .set_json(&json!({"message": "What about Porto"}))
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["destination"], "Porto");

    let prompts = test_app.gateway.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("tell me about Lisbon"));
    assert_eq!(test_app.sessions.session_count(), 1);
}

#[actix_rt::test]
async fn test_requests_without_cookie_start_new_sessions() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for message in ["tell me about Rome", "tell me about Paris"] {
        let req = test::TestRequest::post()
            .uri("/api/destination")
            .set_json(&json!({"message": message}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    assert_eq!(test_app.sessions.session_count(), 2);
    assert!(test_app.gateway.prompts()[1].contains("No recent history"));
}

#[actix_rt::test]
async fn test_pdf_lookup_without_matching_file() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/destination")
        .set_json(&json!({"message": "information on Oslo", "usePdf": true}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let prompts = test_app.gateway.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("No local info available"));
}

#[actix_rt::test]
async fn test_blank_message_is_rejected() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/destination")
        .set_json(&json!({"message": "   "}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
    assert!(test_app.gateway.prompts().is_empty());
}

#[actix_rt::test]
async fn test_malformed_body_returns_json_error() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/destination")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"message\": ")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_rt::test]
async fn test_history_keeps_message_as_sent() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let first = test::TestRequest::post()
        .uri("/api/destination")
        .set_json(&json!({"message": "  tell me about Lisbon  "}))
        .to_request();
    let resp = test::call_service(&app, first).await;
    let cookie: Cookie<'static> = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned())
        .expect("session cookie");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["destination"], "Lisbon");

    let second = test::TestRequest::post()
        .uri("/api/destination")
        .cookie(cookie)
        .set_json(&json!({"message": "Porto"}))
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert!(resp.status().is_success());

    let prompts = test_app.gateway.prompts();
    assert!(prompts[1].contains("\"user\":\"  tell me about Lisbon  \""));
}
