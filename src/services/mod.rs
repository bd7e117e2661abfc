//! Services Layer
//!
//! Business logic extracted from HTTP handlers: checkout, image storage,
//! email, vision lookups, wishlist and profile.

pub mod image_service;
pub mod mail_service;
pub mod order_service;
pub mod profile_service;
pub mod vision_service;
pub mod wishlist_service;
