pub mod auth;
pub mod clock;
pub mod error;
pub mod gate;
pub mod health;
pub mod messages;
pub mod rate_limit;
pub mod state;
pub mod trees;

use axum::{
    Router, middleware,
    routing::{MethodRouter, get, post},
};

use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Per-IP request budgets for the mutating routes, per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub signup: u32,
    pub login: u32,
    pub trees: u32,
    pub messages: u32,
    /// Key callers by proxy headers rather than the socket peer. Off unless
    /// the server sits behind a proxy that rewrites `X-Forwarded-For`.
    pub trust_proxy_headers: bool,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            signup: 5,
            login: 10,
            trees: 5,
            messages: 10,
            trust_proxy_headers: false,
        }
    }
}

fn limited(
    route: MethodRouter<AppState>,
    per_minute: u32,
    trust_proxy_headers: bool,
) -> MethodRouter<AppState> {
    let limiter = RateLimiter::new(RateLimitConfig::per_minute(per_minute))
        .trusting_proxy_headers(trust_proxy_headers);
    route.layer(middleware::from_fn_with_state(limiter, rate_limit::enforce))
}

/// All HTTP routes. CORS and tracing layers are added by the binary.
pub fn router(state: AppState, limits: RateLimits) -> Router {
    let trust = limits.trust_proxy_headers;
    Router::new()
        .route("/", get(health::health))
        .route("/signup", limited(post(auth::signup), limits.signup, trust))
        .route("/login", limited(post(auth::login), limits.login, trust))
        .route("/trees", limited(post(trees::create_tree), limits.trees, trust))
        .route("/trees/{tree_id}", get(trees::get_tree))
        .route("/user-trees/{user_id}", get(trees::get_user_trees))
        .route("/messages", limited(post(messages::create_message), limits.messages, trust))
        .route(
            "/messages/{id}",
            get(messages::get_messages).delete(messages::delete_message),
        )
        .with_state(state)
}
