use axum::{middleware, routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{auth_handlers, joke_handlers, middleware as auth_middleware, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/", get(|| async { "Jokes API running" }))
        .route("/login", post(auth_handlers::login))
        .route(
            "/logout",
            get(auth_handlers::logout_page).post(auth_handlers::logout),
        );

    // Joke routes; handlers decide per action whether a session is needed
    let joke_routes = Router::new()
        .route("/jokes", get(joke_handlers::list_jokes))
        .route("/jokes/random", get(joke_handlers::random_joke))
        .route(
            "/jokes/new",
            get(joke_handlers::new_joke_page)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware::require_session,
                ))
                .post(joke_handlers::create_joke),
        )
        .route(
            "/jokes/{joke_id}",
            get(joke_handlers::get_joke).post(joke_handlers::joke_action),
        );

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(joke_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
