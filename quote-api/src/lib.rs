use axum::{http::Method, middleware::from_fn_with_state, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod cart;
pub mod error;
pub mod middleware;
pub mod products;
pub mod quote;
pub mod session;
pub mod settings;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    // Everything below the passphrase gate
    let gated = Router::new()
        .merge(settings::routes())
        .merge(products::routes())
        .merge(cart::routes())
        .merge(quote::routes())
        .nest_service("/images", ServeDir::new(state.images.dir()))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_session));

    Router::new()
        .merge(session::routes())
        .merge(gated)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
