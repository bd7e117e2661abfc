//! Catalog querying: shopper filters compiled to SQL, and join rows folded
//! back into books with their category names.

pub mod aggregate;
pub mod filter;

pub use aggregate::aggregate_categories;
pub use filter::{CatalogFilter, CatalogQuery, Promotion};
