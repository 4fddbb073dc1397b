#![allow(dead_code)]

use std::time::Duration;

use blog::{get_random_free_port, make_router, run_app, Config};
use reqwest::{redirect::Policy, Client, Response};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const READER_EMAIL: &str = "reader@example.com";
pub const PASSWORD: &str = "correct horse";

pub struct TestApp {
    pub base: String,
    pub pool: SqlitePool,
    /// Holds the database file; removed with the directory on drop.
    dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        let (port, _) = get_random_free_port().unwrap();
        let dir = tempfile::Builder::new().prefix("blog-test").tempdir().unwrap();
        let path = dir.path().join("blog.db");
        let db_url = format!("sqlite://{}", path.display());

        let mut config = Config::new(&db_url, "test-secret");
        config.port = port;
        tokio::spawn(run_app(make_router(), config));

        let base = format!("http://127.0.0.1:{}", port);
        let health = Client::new();
        let mut ready = false;
        for _ in 0..100 {
            if let Ok(response) = health.get(format!("{}/check_health", base)).send().await {
                if response.status().is_success() {
                    ready = true;
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(ready, "server did not come up on port {}", port);

        let pool = SqlitePool::connect(&db_url).await.unwrap();
        TestApp { base, pool, dir }
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        self.dir.path().join("blog.db")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// A browser-like client that keeps cookies but does not follow redirects.
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .unwrap()
    }

    pub async fn register(&self, client: &Client, email: &str, name: &str) -> Response {
        client
            .post(self.url("/register"))
            .form(&[("email", email), ("password", PASSWORD), ("name", name)])
            .send()
            .await
            .unwrap()
    }

    pub async fn login(&self, client: &Client, email: &str, password: &str) -> Response {
        client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .unwrap()
    }

    /// Registers the admin (first account) and a reader, each with its own
    /// logged-in client.
    pub async fn admin_and_reader(&self) -> (Client, Client) {
        let admin = self.client();
        assert_eq!(self.register(&admin, ADMIN_EMAIL, "Admin").await.status(), 303);
        let reader = self.client();
        assert_eq!(
            self.register(&reader, READER_EMAIL, "Reader").await.status(),
            303
        );
        (admin, reader)
    }

    pub async fn create_post(&self, client: &Client, title: &str) -> Response {
        client
            .post(self.url("/Create-post"))
            .form(&[
                ("title", title),
                ("subtitle", "S1"),
                ("body", "B1"),
                ("img_url", "https://example.com/i.png"),
            ])
            .send()
            .await
            .unwrap()
    }

    pub async fn page(&self, client: &Client, path: &str) -> (u16, Value) {
        let response = client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    pub async fn count(&self, sql: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(sql).fetch_one(&self.pool).await.unwrap();
        count
    }

    pub async fn post_id(&self, title: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as("SELECT id FROM blog_posts WHERE title = $1")
            .bind(title)
            .fetch_one(&self.pool)
            .await
            .unwrap();
        id
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
