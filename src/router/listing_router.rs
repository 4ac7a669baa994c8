use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::listing_handler::{
    create_listing_handler, get_listing_handler, list_listings_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::listing_service::ListingService;

pub fn listing_router(service: Arc<dyn ListingService>, auth_state: Arc<AuthState>) -> Router {
    // Public read routes
    let public = Router::new()
        .route("/listings", get(list_listings_handler))
        .route("/listings/{id}", get(get_listing_handler));

    // Submission requires an authenticated owner
    let authenticated = Router::new()
        .route("/listings", post(create_listing_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(authenticated).with_state(service)
}
