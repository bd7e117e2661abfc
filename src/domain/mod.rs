//! Domain layer - Pure business abstractions
//!
//! Repository traits, order pricing rules and the domain error type.
//! Implementations live in the infrastructure layer.

pub mod errors;
pub mod orders;
pub mod repositories;

pub use errors::DomainError;
pub use orders::*;
pub use repositories::*;
