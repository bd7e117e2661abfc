pub mod book;
pub mod book_category;
pub mod category;
pub mod content;
pub mod order;
pub mod order_item;
pub mod session;
pub mod setting;
pub mod user;
pub mod wishlist;

pub use book::{Book, BookInput};
pub use user::UserDto;

/// Current time in the format stored in every `*_at` column.
///
/// Fixed-width UTC with millisecond precision, so string order is time order.
pub fn timestamp() -> String {
    format_timestamp(chrono::Utc::now())
}

pub fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
