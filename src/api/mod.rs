pub mod auth;
pub mod books;
pub mod categories;
pub mod error;
pub mod extract;
pub mod health;
pub mod key_value;
pub mod orders;
pub mod profile;
pub mod setup;
pub mod upload;
pub mod wishlist;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::infrastructure::AppState;
use crate::services::image_service::MAX_UPLOAD_BYTES;

// Room for the multipart envelope around a maximum-size image
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/setup", post(setup::setup))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", get(books::get_book).post(books::update_book))
        .route("/books/:id/delete", post(books::delete_book))
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            get(categories::get_category).post(categories::update_category),
        )
        .route("/categories/:id/delete", post(categories::delete_category))
        // Orders
        .route("/orders", get(orders::my_orders).post(orders::create_order))
        .route("/admin/orders", get(orders::list_all_orders))
        .route(
            "/admin/orders/:id/status",
            post(orders::update_order_status),
        )
        // Wishlist
        .route(
            "/wishlist",
            get(wishlist::list_wishlist).post(wishlist::add_to_wishlist),
        )
        .route(
            "/wishlist/:book_id/delete",
            post(wishlist::remove_from_wishlist),
        )
        // Profile
        .route(
            "/profile",
            get(profile::get_profile).post(profile::update_profile),
        )
        // Content & settings
        .route(
            "/content/:key",
            get(key_value::get_content).post(key_value::set_content),
        )
        .route(
            "/settings/:key",
            get(key_value::get_setting).post(key_value::set_setting),
        )
        // Images
        .route(
            "/upload-image",
            post(upload::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/analyze-image",
            post(upload::analyze_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .with_state(state)
}
