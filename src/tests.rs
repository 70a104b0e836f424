//! Integration tests for the REST gateway.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::db::{init_database, TeamRepository};
use crate::service::TeamService;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path, 2).await.expect("Failed to init DB");
        let repo = Arc::new(TeamRepository::new(pool));

        let state = AppState {
            service: Arc::new(TeamService::new(repo, 5)),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_team(&self, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/v1/teams"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }

    async fn get_team(&self, id: &str) -> Value {
        let resp = self
            .client
            .get(self.url(&format!("/v1/teams/{}?api=v1", id)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }
}

fn kappa() -> Value {
    json!({
        "api": "v1",
        "team": {
            "leader": "a@x.com",
            "name": "kappa",
            "size": 3,
            "openRoles": 3,
            "members": [{ "id": 1, "email": "b@x.com", "role": "backend" }],
            "skills": ["frontend"]
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_create_and_get_team() {
    let fixture = TestFixture::new().await;

    let body = fixture.create_team(kappa()).await;
    assert_eq!(body["api"], "v1");
    assert_eq!(body["status"], "success");
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(id.parse::<i64>().is_ok());

    let body = fixture.get_team(&id).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["name"], "kappa");
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["members"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["skills"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_name() {
    let fixture = TestFixture::new().await;

    fixture.create_team(kappa()).await;
    let body = fixture.create_team(kappa()).await;
    assert_eq!(body["status"], "error:duplicatename");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_api_version_mismatch() {
    let fixture = TestFixture::new().await;

    let mut request = kappa();
    request["api"] = json!("v2");
    let resp = fixture
        .client
        .post(fixture.url("/v1/teams"))
        .json(&request)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 501);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNIMPLEMENTED");

    let resp = fixture
        .client
        .get(fixture.url("/v1/teams/1?api=v9"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 501);
}

#[tokio::test]
async fn test_protocol_errors() {
    let fixture = TestFixture::new().await;

    // Malformed path id
    let resp = fixture
        .client
        .get(fixture.url("/v1/teams/not-a-number"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // Malformed body
    let resp = fixture
        .client
        .post(fixture.url("/v1/teams"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_member_lifecycle() {
    let fixture = TestFixture::new().await;

    let body = fixture.create_team(kappa()).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let resp = fixture
        .client
        .post(fixture.url(&format!("/v1/teams/{}/members", id)))
        .json(&json!({
            "api": "v1",
            "userId": "a@x.com",
            "memberId": 3,
            "memberEmail": "c@x.com",
            "role": "frontend"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    let member_number = body["data"]["id"].as_str().unwrap().to_string();

    let team = fixture.get_team(&id).await;
    assert_eq!(team["data"]["members"].as_array().unwrap().len(), 2);
    assert_eq!(team["data"]["openRoles"], 2);

    // Only the leader may remove
    let resp = fixture
        .client
        .delete(fixture.url(&format!(
            "/v1/teams/{}/members/{}?api=v1&user_id=b@x.com",
            id, member_number
        )))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error:notowner");

    let resp = fixture
        .client
        .delete(fixture.url(&format!(
            "/v1/teams/{}/members/{}?api=v1&user_id=a@x.com",
            id, member_number
        )))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["removed"], 1);

    let team = fixture.get_team(&id).await;
    assert_eq!(team["data"]["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_member_to_full_team() {
    let fixture = TestFixture::new().await;

    let mut request = kappa();
    request["team"]["openRoles"] = json!(0);
    let body = fixture.create_team(request).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let resp = fixture
        .client
        .post(fixture.url(&format!("/v1/teams/{}/members", id)))
        .json(&json!({
            "api": "v1",
            "userId": "a@x.com",
            "memberId": 3,
            "memberEmail": "c@x.com",
            "role": "frontend"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error:maxmembercount");

    let team = fixture.get_team(&id).await;
    assert_eq!(team["data"]["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_project_upsert_and_delete_team() {
    let fixture = TestFixture::new().await;

    let body = fixture.create_team(kappa()).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    for (name, languages) in [("alpha", json!(["rust", "go"])), ("beta", json!(["zig"]))] {
        let resp = fixture
            .client
            .post(fixture.url(&format!("/v1/teams/{}/project", id)))
            .json(&json!({
                "api": "v1",
                "project": {
                    "name": name,
                    "description": "build things",
                    "githubLink": "https://github.com/x/y",
                    "complexity": 2,
                    "duration": 6,
                    "languages": languages
                }
            }))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "success");
    }

    let team = fixture.get_team(&id).await;
    assert_eq!(team["data"]["project"]["name"], "beta");
    assert_eq!(team["data"]["project"]["languages"], json!(["zig"]));

    // Non-owner delete is refused and the team survives
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/v1/teams/{}?api=v1&user_id=b@x.com", id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error:notowner");
    assert_eq!(fixture.get_team(&id).await["status"], "success");

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/v1/teams/{}?api=v1&user_id=a@x.com", id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["teams"], 1);
    assert_eq!(body["data"]["members"], 1);
    assert_eq!(body["data"]["skills"], 1);
    assert_eq!(body["data"]["projects"], 1);
    assert_eq!(body["data"]["languages"], 1);

    let team = fixture.get_team(&id).await;
    assert_eq!(team["status"], "empty");
}

#[tokio::test]
async fn test_list_teams() {
    let fixture = TestFixture::new().await;

    for i in 0..3 {
        let mut request = kappa();
        request["team"]["name"] = json!(format!("team-{}", i));
        request["team"]["leader"] = json!(format!("leader{}@x.com", i));
        fixture.create_team(request).await;
    }

    let resp = fixture
        .client
        .get(fixture.url("/v1/teams?page=0&limit=10"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let teams = body["data"].as_array().unwrap();
    assert_eq!(teams.len(), 3);
    let ids: Vec<i64> = teams
        .iter()
        .map(|t| t["id"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let resp = fixture
        .client
        .get(fixture.url("/v1/teams?page=2&limit=2"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .client
        .get(fixture.url("/v1/teams/users/1?api=v1"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let resp = fixture
        .client
        .get(fixture.url("/v1/teams/users/99"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "empty");

    let resp = fixture
        .client
        .get(fixture.url("/v1/teams?skill=backend"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_teams_page_bounds() {
    let fixture = TestFixture::new().await;
    fixture.create_team(kappa()).await;

    // Empty values fall back to the defaults
    let resp = fixture
        .client
        .get(fixture.url("/v1/teams?page=&limit="))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // A page far past the end is empty, not an error
    let resp = fixture
        .client
        .get(fixture.url("/v1/teams?page=9223372036854775807&limit=100"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "empty");
    assert!(body["data"].as_array().unwrap().is_empty());

    let resp = fixture
        .client
        .get(fixture.url("/v1/teams?page=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_create_team_with_more_open_roles_than_seats() {
    let fixture = TestFixture::new().await;

    let mut request = kappa();
    request["team"]["openRoles"] = json!(10);
    let resp = fixture
        .client
        .post(fixture.url("/v1/teams"))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
