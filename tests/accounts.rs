mod common;

use common::{location, TestApp, ADMIN_EMAIL, PASSWORD, READER_EMAIL};

#[tokio::test]
async fn fresh_registration_is_logged_in_immediately() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.register(&client, ADMIN_EMAIL, "Admin").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");

    let (status, page) = app.page(&client, "/").await;
    assert_eq!(status, 200);
    assert_eq!(page["template"], "index.html");
    assert_eq!(page["logged_in"], true);
    assert_eq!(page["user"]["email"], ADMIN_EMAIL);
    assert_eq!(page["user"]["name"], "Admin");
}

#[tokio::test]
async fn only_the_first_account_is_admin() {
    let app = TestApp::spawn().await;
    let (admin, reader) = app.admin_and_reader().await;

    let (_, page) = app.page(&admin, "/").await;
    assert_eq!(page["is_admin"], true);
    let (_, page) = app.page(&reader, "/").await;
    assert_eq!(page["is_admin"], false);
    assert_eq!(page["logged_in"], true);
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_a_second_user() {
    let app = TestApp::spawn().await;
    app.register(&app.client(), READER_EMAIL, "First").await;
    assert_eq!(app.count("SELECT COUNT(*) FROM users").await, 1);

    let client = app.client();
    let response = app.register(&client, READER_EMAIL, "Second").await;
    assert_eq!(response.status(), 422);
    let page: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page["template"], "register.html");
    assert_eq!(page["errors"][0]["field"], "email");
    assert_eq!(page["form"]["name"], "Second");
    assert!(page["form"].get("password").is_none());

    assert_eq!(app.count("SELECT COUNT(*) FROM users").await, 1);
    let (_, page) = app.page(&client, "/").await;
    assert_eq!(page["logged_in"], false);
}

#[tokio::test]
async fn registration_requires_every_field() {
    let app = TestApp::spawn().await;
    let response = app
        .client()
        .post(app.url("/register"))
        .form(&[("email", "someone@example.com"), ("password", ""), ("name", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let page: serde_json::Value = response.json().await.unwrap();
    let fields: Vec<_> = page["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(fields, ["password", "name"]);
    assert_eq!(app.count("SELECT COUNT(*) FROM users").await, 0);
}

#[tokio::test]
async fn unknown_email_reports_not_found() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let response = app.login(&client, "ghost@example.com", PASSWORD).await;
    assert_eq!(response.status(), 401);
    assert!(response.headers().get("set-cookie").is_none());
    let page: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page["flashes"][0], "Email Not found please register");

    let (_, page) = app.page(&client, "/").await;
    assert_eq!(page["logged_in"], false);
}

#[tokio::test]
async fn wrong_password_reports_invalid_password() {
    let app = TestApp::spawn().await;
    app.register(&app.client(), READER_EMAIL, "Reader").await;

    let client = app.client();
    let response = app.login(&client, READER_EMAIL, "not it").await;
    assert_eq!(response.status(), 401);
    assert!(response.headers().get("set-cookie").is_none());
    let page: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page["flashes"][0], "Please Check your Password");
    assert_eq!(page["form"]["email"], READER_EMAIL);

    let (_, page) = app.page(&client, "/").await;
    assert_eq!(page["logged_in"], false);
}

#[tokio::test]
async fn login_and_logout() {
    let app = TestApp::spawn().await;
    app.register(&app.client(), READER_EMAIL, "Reader").await;

    let client = app.client();
    let response = app.login(&client, READER_EMAIL, PASSWORD).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
    let (_, page) = app.page(&client, "/about").await;
    assert_eq!(page["template"], "about.html");
    assert_eq!(page["logged_in"], true);

    let response = client.get(app.url("/logout")).send().await.unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
    let (_, page) = app.page(&client, "/contact").await;
    assert_eq!(page["template"], "contact.html");
    assert_eq!(page["logged_in"], false);
    assert!(page["user"].is_null());
}

#[tokio::test]
async fn forged_session_cookie_is_anonymous() {
    let app = TestApp::spawn().await;
    app.register(&app.client(), ADMIN_EMAIL, "Admin").await;

    let response = reqwest::Client::new()
        .get(app.url("/"))
        .header("cookie", "session=not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let page: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page["logged_in"], false);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = TestApp::spawn().await;
    let (status, page) = app.page(&app.client(), "/nowhere").await;
    assert_eq!(status, 404);
    assert_eq!(page["template"], "404.html");
}

#[tokio::test]
async fn database_file_is_removed_with_the_app() {
    let app = TestApp::spawn().await;
    let path = app.db_path();
    assert!(path.exists());
    drop(app);
    assert!(!path.exists());
}
