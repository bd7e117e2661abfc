//! Profile Service - the signed-in shopper's own contact details

use sea_orm::*;
use serde::Deserialize;

use crate::domain::DomainError;
use crate::models::{UserDto, timestamp, user};

/// Fields a shopper may change. Absent fields are left as they are; an
/// empty string clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

pub async fn get_profile(db: &DatabaseConnection, user_id: i32) -> Result<UserDto, DomainError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(UserDto::from)
        .ok_or_else(|| DomainError::not_found("User"))
}

pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i32,
    update: ProfileUpdate,
) -> Result<UserDto, DomainError> {
    let existing = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))?;

    fn apply(field: Option<String>) -> Option<Option<String>> {
        field.map(|v| {
            let v = v.trim().to_string();
            (!v.is_empty()).then_some(v)
        })
    }

    let mut profile: user::ActiveModel = existing.into();
    if let Some(name) = apply(update.name) {
        profile.name = Set(name);
    }
    if let Some(phone) = apply(update.phone) {
        profile.phone = Set(phone);
    }
    if let Some(address) = apply(update.address) {
        profile.address = Set(address);
    }
    if let Some(city) = apply(update.city) {
        profile.city = Set(city);
    }
    profile.updated_at = Set(timestamp());

    Ok(UserDto::from(profile.update(db).await?))
}
