//! Directory API routes.
//!
//! Static segments (`/places/search`, `/places/popular`, ...) are
//! registered alongside the parameterized `/places/:id` routes; the
//! router prefers static matches, so the search family never collides
//! with id lookups.

use crate::api::handlers::{admin, keywords, places, search};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Discovery
        .route(
            "/places/search",
            get(search::search_places).post(search::search_places_body),
        )
        .route("/places/search/count", get(search::count_places))
        .route("/places/popular", get(search::popular_places))
        .route("/places/recent", get(search::recent_places))
        // Registration and entity CRUD
        .route("/places", post(places::register_place))
        .route(
            "/places/:id",
            get(places::get_place)
                .put(places::update_place)
                .delete(places::delete_place),
        )
        .route("/places/:id/activate", post(places::activate_place))
        // Moderation
        .route("/admin/places/:id/approval", post(admin::set_approval))
        .route(
            "/admin/places/:id/registration",
            post(admin::set_registration),
        )
        // Master data
        .route("/keywords", get(keywords::list_keywords))
}
