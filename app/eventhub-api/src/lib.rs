//! EventHub API
//!
//! REST backend for community events: organizers publish events, users RSVP
//! and discuss them in threaded comments, and notifications keep everyone
//! informed. Authentication lives in the `eventhub-auth` crate.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;

#[cfg(test)]
mod tests;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use eventhub_auth::AuthService;
use repository::Repositories;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

/// Aggregated services container
pub struct EventHubServices {
    pub events: services::EventService,
    pub rsvps: services::RsvpService,
    pub comments: services::CommentService,
    pub notifications: services::NotificationService,
    pub users: services::UserService,
    pub auth: Arc<AuthService>,
}

impl EventHubServices {
    pub fn new(repos: Repositories, auth: Arc<AuthService>) -> Self {
        let notifications = services::NotificationService::new(repos.clone());

        Self {
            events: services::EventService::new(repos.clone(), notifications.clone()),
            rsvps: services::RsvpService::new(repos.clone(), notifications.clone()),
            comments: services::CommentService::new(repos.clone(), notifications.clone()),
            users: services::UserService::new(repos),
            notifications,
            auth,
        }
    }
}

/// Router state
#[derive(Clone)]
pub struct AppState(pub Arc<EventHubServices>);

impl AppState {
    pub fn new(services: EventHubServices) -> Self {
        Self(Arc::new(services))
    }
}

impl std::ops::Deref for AppState {
    type Target = EventHubServices;

    fn deref(&self) -> &EventHubServices {
        &self.0
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the full `/api` router
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let auth_routes = eventhub_auth::create_routes(state.auth.clone());

    let events = Router::new()
        .route(
            "/events",
            get(handlers::events::list_events).post(handlers::events::create_event),
        )
        .route(
            "/events/:id",
            get(handlers::events::get_event)
                .put(handlers::events::update_event)
                .delete(handlers::events::delete_event),
        )
        .route(
            "/events/:id/rsvp",
            post(handlers::rsvps::respond).delete(handlers::rsvps::withdraw),
        )
        .route("/events/:id/rsvps", get(handlers::rsvps::list_rsvps))
        .route("/events/:id/rsvps/:rsvp_id", delete(handlers::rsvps::delete_rsvp))
        .route(
            "/events/:id/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        .route(
            "/events/:id/comments/:comment_id",
            delete(handlers::comments::delete_comment),
        )
        .route(
            "/events/:id/comments/:comment_id/like",
            post(handlers::comments::toggle_like),
        );

    let users = Router::new()
        .route("/users", get(handlers::users::list_users))
        .route(
            "/users/:id",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        );

    // Every notification route needs a user
    let notifications = Router::new()
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/read", post(handlers::notifications::mark_read))
        .route(
            "/notifications/:id",
            delete(handlers::notifications::delete_notification),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            eventhub_auth::middleware::require_auth,
        ));

    let api = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/auth", auth_routes)
        .merge(events)
        .merge(users)
        .merge(notifications);

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(cors_layer(cors_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}
