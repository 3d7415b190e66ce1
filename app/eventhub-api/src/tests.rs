//! HTTP tests against the full router with in-memory repositories

use crate::repository::Repositories;
use crate::{create_router, AppState, EventHubServices};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use eventhub_auth::{AuthConfig, AuthService, Role, UserChanges};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn auth_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "a".repeat(32),
        refresh_token_secret: "r".repeat(32),
        access_token_expiration: 900,
        refresh_token_expiration: 604800,
        jwt_issuer: "test".to_string(),
        jwt_audience: "test".to_string(),
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        min_password_length: 8,
        secure_cookies: false,
    }
}

struct TestApp {
    router: Router,
    repos: Repositories,
}

struct Account {
    id: Uuid,
    token: String,
}

impl TestApp {
    fn new() -> Self {
        let repos = Repositories::in_memory();
        let auth = Arc::new(AuthService::new(repos.users.clone(), auth_config()).unwrap());
        let state = AppState::new(EventHubServices::new(repos.clone(), auth));

        Self {
            router: create_router(state, &["http://localhost:3000".to_string()]),
            repos,
        }
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, token, None).await
    }

    async fn sign_up(&self, name: &str) -> Account {
        let email = format!("{}@example.com", name.to_lowercase());
        let (status, _) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "name": name, "email": email, "password": "Password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": "Password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        Account {
            id: body["data"]["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["data"]["accessToken"].as_str().unwrap().to_string(),
        }
    }

    async fn grant(&self, account: &Account, roles: Vec<Role>) {
        let changes = UserChanges {
            roles: Some(roles),
            ..Default::default()
        };
        self.repos.users.update(account.id, changes).await.unwrap().unwrap();
    }

    async fn organizer(&self, name: &str) -> Account {
        let account = self.sign_up(name).await;
        self.grant(&account, vec![Role::Attendee, Role::Organizer]).await;
        account
    }

    async fn create_event(&self, organizer: &Account, extra: Value) -> String {
        let mut body = json!({
            "title": "Rust Meetup",
            "description": "Talks and pizza",
            "startAt": Utc::now() + Duration::days(7),
            "endAt": Utc::now() + Duration::days(7) + Duration::hours(3),
            "location": "Community Hall",
            "capacity": 50,
            "tags": ["rust", "meetup"]
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            body.extend(extra.clone());
        }

        let (status, body) = self.post("/api/events", Some(&organizer.token), body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn rsvp(&self, account: &Account, event_id: &str, status: &str) -> StatusCode {
        self.post(
            &format!("/api/events/{event_id}/rsvp"),
            Some(&account.token),
            json!({ "status": status }),
        )
        .await
        .0
    }

    async fn event(&self, event_id: &str, token: Option<&str>) -> Value {
        let (status, body) = self.get(&format!("/api/events/{event_id}"), token).await;
        assert_eq!(status, StatusCode::OK);
        body["data"].clone()
    }
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "OK");

    for uri in ["/nope", "/api/nope"] {
        let (status, body) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Invalid route");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_register_twice_is_conflict() {
    let app = TestApp::new();
    app.sign_up("Ada").await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Other", "email": "ADA@example.com", "password": "Password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_attendee_promotion_and_full_event() {
    let app = TestApp::new();
    let alice = app.sign_up("Alice").await;
    let bob = app.sign_up("Bob").await;
    let carol = app.sign_up("Carol").await;

    let event = json!({
        "title": "Tiny",
        "description": "One seat",
        "startAt": Utc::now() + Duration::days(1),
        "endAt": Utc::now() + Duration::days(2),
        "location": "Kitchen",
        "capacity": 1
    });

    let (status, _) = app.post("/api/events", Some(&alice.token), event.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.grant(&alice, vec![Role::Attendee, Role::Organizer]).await;
    let (status, body) = app.post("/api/events", Some(&alice.token), event).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "upcoming");
    let event_id = body["data"]["id"].as_str().unwrap().to_string();

    assert_eq!(app.rsvp(&carol, &event_id, "attending").await, StatusCode::CREATED);
    assert!(app.event(&event_id, None).await["isFull"].as_bool().unwrap());

    assert_eq!(app.rsvp(&bob, &event_id, "attending").await, StatusCode::CONFLICT);
    assert_eq!(app.rsvp(&bob, &event_id, "maybe").await, StatusCode::CREATED);

    // Re-confirming an existing seat is not blocked by capacity
    assert_eq!(app.rsvp(&carol, &event_id, "attending").await, StatusCode::OK);
}

#[tokio::test]
async fn test_event_rejects_end_before_start() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;

    let (status, body) = app
        .post(
            "/api/events",
            Some(&org.token),
            json!({
                "title": "Backwards",
                "description": "Time travel",
                "startAt": Utc::now() + Duration::days(2),
                "endAt": Utc::now() + Duration::days(1),
                "location": "Lab",
                "capacity": 5
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "End date must be after start date");
}

#[tokio::test]
async fn test_only_owner_or_admin_may_modify_event() {
    let app = TestApp::new();
    let owner = app.organizer("Owner").await;
    let other = app.organizer("Other").await;
    let admin = app.sign_up("Admin").await;
    app.grant(&admin, vec![Role::Admin]).await;

    let event_id = app.create_event(&owner, json!({})).await;
    let uri = format!("/api/events/{event_id}");

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&other.token), Some(json!({ "title": "Mine now" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, Some(&other.token)).await.0, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&admin.token), Some(json!({ "title": "Renamed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Renamed");
    assert_eq!(body["data"]["location"], "Community Hall");

    assert_eq!(app.delete(&uri, Some(&owner.token)).await.0, StatusCode::OK);
    assert_eq!(app.get(&uri, None).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rsvp_twice_updates_single_row() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    let guest = app.sign_up("Guest").await;
    let event_id = app.create_event(&org, json!({})).await;

    assert_eq!(app.rsvp(&guest, &event_id, "attending").await, StatusCode::CREATED);
    assert_eq!(app.rsvp(&guest, &event_id, "maybe").await, StatusCode::OK);

    let (status, body) = app
        .get(&format!("/api/events/{event_id}/rsvps"), Some(&org.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let rsvps = body["data"]["rsvps"].as_array().unwrap();
    assert_eq!(rsvps.len(), 1);
    assert_eq!(rsvps[0]["status"], "maybe");
    assert_eq!(rsvps[0]["user"]["name"], "Guest");
    assert_eq!(body["data"]["counts"]["maybe"], 1);

    let (status, _) = app
        .get(&format!("/api/events/{event_id}/rsvps"), Some(&guest.token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(app.rsvp(&guest, &event_id, "going").await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_counts_follow_rsvp_changes() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    let a = app.sign_up("A").await;
    let b = app.sign_up("B").await;
    let c = app.sign_up("C").await;
    let event_id = app.create_event(&org, json!({})).await;

    app.rsvp(&a, &event_id, "attending").await;
    app.rsvp(&b, &event_id, "attending").await;
    app.rsvp(&c, &event_id, "maybe").await;
    let event = app.event(&event_id, None).await;
    assert_eq!((event["attendeesCount"].as_i64(), event["maybesCount"].as_i64()), (Some(2), Some(1)));

    app.rsvp(&b, &event_id, "cancelled").await;
    app.rsvp(&c, &event_id, "attending").await;
    let (status, _) = app
        .delete(&format!("/api/events/{event_id}/rsvp"), Some(&a.token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let event = app.event(&event_id, None).await;
    assert_eq!((event["attendeesCount"].as_i64(), event["maybesCount"].as_i64()), (Some(1), Some(0)));

    // Another user's RSVP can only be removed by its owner or an admin
    let (_, body) = app
        .get(&format!("/api/events/{event_id}/rsvps"), Some(&org.token))
        .await;
    let c_rsvp = body["data"]["rsvps"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["userId"] == c.id.to_string())
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let uri = format!("/api/events/{event_id}/rsvps/{c_rsvp}");
    assert_eq!(app.delete(&uri, Some(&b.token)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, Some(&c.token)).await.0, StatusCode::OK);

    let event = app.event(&event_id, None).await;
    assert_eq!(event["attendeesCount"], 0);
}

#[tokio::test]
async fn test_like_toggles() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    let fan = app.sign_up("Fan").await;
    let event_id = app.create_event(&org, json!({})).await;

    let (status, body) = app
        .post(
            &format!("/api/events/{event_id}/comments"),
            Some(&org.token),
            json!({ "content": "Welcome!" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();
    let like = format!("/api/events/{event_id}/comments/{comment_id}/like");

    let (status, body) = app.post(&like, Some(&fan.token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment liked");
    assert_eq!(body["data"]["likes"], 1);

    let (status, body) = app.post(&like, Some(&fan.token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment unliked");
    assert_eq!(body["data"]["likes"], 0);
}

#[tokio::test]
async fn test_comment_threads() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    let guest = app.sign_up("Guest").await;
    let event_id = app.create_event(&org, json!({})).await;
    let comments = format!("/api/events/{event_id}/comments");

    let (_, body) = app
        .post(&comments, Some(&guest.token), json!({ "content": "Is there parking?" }))
        .await;
    let question = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &comments,
            Some(&org.token),
            json!({ "content": "Yes, behind the hall", "parentId": question }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let answer = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            &comments,
            Some(&guest.token),
            json!({ "content": "Thanks", "parentComment": answer }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get(&comments, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["hasMore"], false);
    let thread = &body["data"]["comments"][0];
    assert_eq!(thread["content"], "Is there parking?");
    assert_eq!(thread["user"]["name"], "Guest");
    assert_eq!(thread["replies"][0]["content"], "Yes, behind the hall");

    // Deleting the question takes its reply along
    let (status, _) = app
        .delete(&format!("{comments}/{question}"), Some(&org.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&comments, None).await;
    assert_eq!(body["data"]["total"], 0);
    let (status, _) = app
        .delete(&format!("{comments}/{answer}"), Some(&org.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_private_event_visibility() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    let stranger = app.sign_up("Stranger").await;
    let private_id = app.create_event(&org, json!({ "isPrivate": true })).await;
    app.create_event(&org, json!({ "title": "Open Day" })).await;

    let uri = format!("/api/events/{private_id}");
    assert_eq!(app.get(&uri, None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(app.get(&uri, Some(&stranger.token)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.get(&uri, Some(&org.token)).await.0, StatusCode::OK);
    assert_eq!(app.rsvp(&stranger, &private_id, "attending").await, StatusCode::FORBIDDEN);

    let (_, body) = app.get("/api/events", None).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["events"][0]["title"], "Open Day");

    let (_, body) = app.get("/api/events", Some(&org.token)).await;
    assert_eq!(body["data"]["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_event_search_filters() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    app.create_event(&org, json!({ "title": "Rust Workshop", "tags": ["rust"] })).await;
    app.create_event(&org, json!({ "title": "Go Night", "tags": ["go"] })).await;

    let (status, body) = app.get("/api/events?tags=go,python", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["events"][0]["title"], "Go Night");

    let (_, body) = app.get("/api/events?q=workshop", None).await;
    assert_eq!(body["data"]["events"][0]["title"], "Rust Workshop");

    let (_, body) = app.get("/api/events?sort=title&limit=1", None).await;
    assert_eq!(body["data"]["events"][0]["title"], "Go Night");
    assert_eq!(body["data"]["pagination"]["pages"], 2);

    let (status, _) = app.get("/api/events?page=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notifications_flow() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    let guest = app.sign_up("Guest").await;
    let event_id = app.create_event(&org, json!({})).await;

    assert_eq!(app.get("/api/notifications", None).await.0, StatusCode::UNAUTHORIZED);

    app.rsvp(&guest, &event_id, "attending").await;
    app.post(
        &format!("/api/events/{event_id}/comments"),
        Some(&guest.token),
        json!({ "content": "Can't wait" }),
    )
    .await;

    let (status, body) = app.get("/api/notifications", Some(&org.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["unreadCount"], 2);
    let ids: Vec<Value> = body["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].clone())
        .collect();

    // Marking someone else's notifications does nothing
    let (_, body) = app
        .post("/api/notifications/read", Some(&guest.token), json!({ "ids": ids }))
        .await;
    assert_eq!(body["data"]["updated"], 0);

    let (_, body) = app
        .post("/api/notifications/read", Some(&org.token), json!({ "ids": ids }))
        .await;
    assert_eq!(body["data"]["updated"], 2);
    let (_, body) = app.get("/api/notifications", Some(&org.token)).await;
    assert_eq!(body["data"]["unreadCount"], 0);

    // Participants hear about updates, the editor does not
    app.call(
        Method::PUT,
        &format!("/api/events/{event_id}"),
        Some(&org.token),
        Some(json!({ "location": "New Hall" })),
    )
    .await;
    let (_, body) = app.get("/api/notifications", Some(&guest.token)).await;
    assert_eq!(body["data"]["notifications"][0]["type"], "event_updated");

    let id = body["data"]["notifications"][0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/notifications/{id}");
    assert_eq!(app.delete(&uri, Some(&org.token)).await.0, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&uri, Some(&guest.token)).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_user_profiles_and_management() {
    let app = TestApp::new();
    let ada = app.sign_up("Ada").await;
    let bob = app.sign_up("Bob").await;
    let admin = app.sign_up("Admin").await;
    app.grant(&admin, vec![Role::Admin]).await;

    let uri = format!("/api/users/{}", ada.id);
    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("roles").is_none());
    assert!(body["data"].get("createdAt").is_none());

    let (_, body) = app.get(&uri, Some(&ada.token)).await;
    assert_eq!(body["data"]["roles"], json!(["attendee"]));
    let (_, body) = app.get(&uri, Some(&admin.token)).await;
    assert!(body["data"]["createdAt"].is_string());

    assert_eq!(app.get("/api/users", Some(&ada.token)).await.0, StatusCode::FORBIDDEN);
    let (status, body) = app.get("/api/users?sort=email&limit=2", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 3);
    assert_eq!(body["data"]["users"][0]["email"], "ada@example.com");

    // Self-service role changes are ignored
    let (status, body) = app
        .call(Method::PUT, &uri, Some(&ada.token), Some(json!({ "bio": "Hi", "roles": ["admin"] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "Hi");
    assert_eq!(body["data"]["roles"], json!(["attendee"]));

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&bob.token), Some(json!({ "name": "Hacked" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&ada.token), Some(json!({ "email": "bob@example.com" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&admin.token), Some(json!({ "roles": ["organizer"] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"], json!(["organizer"]));

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&admin.token), Some(json!({ "roles": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.get("/api/users/not-a-uuid", None).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_delete_cascades() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    let guest = app.sign_up("Guest").await;
    let event_id = app.create_event(&org, json!({})).await;
    app.rsvp(&guest, &event_id, "attending").await;
    assert_eq!(app.event(&event_id, None).await["attendeesCount"], 1);

    let (status, _) = app
        .delete(&format!("/api/users/{}", guest.id), Some(&guest.token))
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.event(&event_id, None).await["attendeesCount"], 0);
    // The deleted user's token no longer authenticates
    assert_eq!(app.rsvp(&guest, &event_id, "maybe").await, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .delete(&format!("/api/users/{}", org.id), Some(&org.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        app.get(&format!("/api/events/{event_id}"), None).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_huge_page_numbers_are_clamped() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    let admin = app.sign_up("Admin").await;
    app.grant(&admin, vec![Role::Admin]).await;
    let event_id = app.create_event(&org, json!({})).await;

    let (status, body) = app.get("/api/events?page=9223372036854775807", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["events"], json!([]));
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let uri = format!("/api/events/{event_id}/comments?page=4611686018427387904");
    assert_eq!(app.get(&uri, None).await.0, StatusCode::OK);

    let uri = "/api/notifications?page=9223372036854775807&limit=100";
    assert_eq!(app.get(uri, Some(&org.token)).await.0, StatusCode::OK);

    let uri = "/api/users?page=9223372036854775807";
    assert_eq!(app.get(uri, Some(&admin.token)).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_blank_required_fields_are_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "   ", "email": "blank@example.com", "password": "Password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "name");

    let org = app.organizer("Org").await;
    let (status, body) = app
        .post(
            "/api/events",
            Some(&org.token),
            json!({
                "title": "   ",
                "description": "Talks",
                "startAt": Utc::now() + Duration::days(1),
                "endAt": Utc::now() + Duration::days(2),
                "location": "  ",
                "capacity": 5
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let event_id = app.create_event(&org, json!({})).await;
    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/events/{event_id}"),
            Some(&org.token),
            Some(json!({ "title": " \t " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.event(&event_id, None).await["title"], "Rust Meetup");

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/users/{}", org.id),
            Some(&org.token),
            Some(json!({ "name": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_range_accepts_plain_dates() {
    let app = TestApp::new();
    let org = app.organizer("Org").await;
    app.create_event(&org, json!({})).await;

    let (status, body) = app.get("/api/events?from=2000-01-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let (_, body) = app.get("/api/events?to=2000-01-01", None).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);

    let (status, _) = app.get("/api/events?from=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
