mod common;

use actix_web::{http::StatusCode, test, App};
use serde_json::json;
use vulnapi::app::configure;
use vulnapi::mode::Mode;

use common::{bearer, seeded_state, BOTH_MODES, NAME2_BOOK};

#[actix_web::test]
async fn test_public_listing_hides_passwords() {
    let state = seeded_state(Mode::Vulnerable).await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::get().uri("/users/v1").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let users = body["users"].as_array().unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["username"], "admin");
    assert_eq!(users[0]["admin"], true);
    assert!(users.iter().all(|u| u.get("password").is_none()));
}

#[actix_web::test]
async fn test_debug_listing_exposes_passwords_in_both_modes() {
    for mode in BOTH_MODES {
        let state = seeded_state(mode).await;
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

        let req = test::TestRequest::get().uri("/users/v1/_debug").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let name2 = body["users"]
            .as_array()
            .unwrap()
            .iter()
            .find(|u| u["username"] == "name2")
            .cloned()
            .unwrap();
        assert_eq!(name2["password"], "pass2");
    }
}

#[actix_web::test]
async fn test_get_user_by_name() {
    let state = seeded_state(Mode::Secure).await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::get().uri("/users/v1/name1").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"username": "name1", "email": "mail1@mail.com"}));

    let req = test::TestRequest::get().uri("/users/v1/ghost").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_get_user_injection_depends_on_mode() {
    // nobody' OR username = 'name2
    let uri = "/users/v1/nobody%27%20OR%20username%20%3D%20%27name2";

    let state = seeded_state(Mode::Vulnerable).await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "name2");

    let state = seeded_state(Mode::Secure).await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_requires_admin() {
    for mode in BOTH_MODES {
        let state = seeded_state(mode).await;
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

        let req = test::TestRequest::delete()
            .uri("/users/v1/name2")
            .insert_header(bearer("name1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Only Admins may delete users!");

        let req = test::TestRequest::delete()
            .uri("/users/v1/name2")
            .insert_header(bearer("admin"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "User deleted.");

        let req = test::TestRequest::get().uri("/users/v1/name2").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::get()
            .uri(&format!("/books/v1/{NAME2_BOOK}"))
            .insert_header(bearer("admin"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }
}

#[actix_web::test]
async fn test_delete_unknown_user_is_not_found() {
    let state = seeded_state(Mode::Secure).await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::delete()
        .uri("/users/v1/ghost")
        .insert_header(bearer("admin"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_email_update_is_self_only() {
    for mode in BOTH_MODES {
        let state = seeded_state(mode).await;
        let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

        let req = test::TestRequest::put()
            .uri("/users/v1/name2/email")
            .insert_header(bearer("name1"))
            .set_json(json!({"email": "stolen@mail.com"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = test::TestRequest::put()
            .uri("/users/v1/name1/email")
            .insert_header(bearer("name1"))
            .set_json(json!({"email": "not an email"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Please Provide a valid email address.");

        let req = test::TestRequest::put()
            .uri("/users/v1/name1/email")
            .insert_header(bearer("name1"))
            .set_json(json!({"email": "fresh@mail.com"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NO_CONTENT
        );

        let req = test::TestRequest::get().uri("/users/v1/name1").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["email"], "fresh@mail.com");
    }
}

#[actix_web::test]
async fn test_password_takeover_only_when_vulnerable() {
    let state = seeded_state(Mode::Vulnerable).await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::put()
        .uri("/users/v1/name2/password")
        .insert_header(bearer("name1"))
        .set_json(json!({"password": "taken"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::post()
        .uri("/users/v1/login")
        .set_json(json!({"username": "name2", "password": "taken"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let state = seeded_state(Mode::Secure).await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::put()
        .uri("/users/v1/name2/password")
        .insert_header(bearer("name1"))
        .set_json(json!({"password": "taken"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::put()
        .uri("/users/v1/name1/password")
        .insert_header(bearer("name1"))
        .set_json(json!({"password": "rotated"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );
}

#[actix_web::test]
async fn test_long_valid_email_is_accepted_when_vulnerable() {
    let email = format!("a@{}com", "ab.".repeat(100_000));

    let state = seeded_state(Mode::Vulnerable).await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, &state))).await;

    let req = test::TestRequest::post()
        .uri("/users/v1/register")
        .set_json(json!({"username": "x", "password": "p", "email": email}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri("/users/v1/name1/email")
        .insert_header(bearer("name1"))
        .set_json(json!({"email": email}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get().uri("/users/v1/name1").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], email);
}
