//! Repository implementations using SeaORM

pub mod book_repository;
pub mod category_repository;
pub mod key_value_repository;
pub mod order_repository;
pub mod session_repository;

pub use book_repository::SeaOrmBookRepository;
pub use category_repository::SeaOrmCategoryRepository;
pub use key_value_repository::{SeaOrmContentRepository, SeaOrmSettingsRepository};
pub use order_repository::SeaOrmOrderRepository;
pub use session_repository::SeaOrmSessionRepository;
