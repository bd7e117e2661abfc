use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub price: f64,
    #[sea_orm(column_type = "Text")]
    pub images: String, // JSON array, first entry is the primary image
    pub is_available: bool,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub binding: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<String>,
    pub stock: i32,
    pub is_new_arrival: bool,
    pub is_new_in_market: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_category::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub images: Vec<String>,
    /// Primary image, kept for clients that only show one.
    pub image_url: Option<String>,
    pub is_available: bool,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub binding: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<String>,
    pub stock: i32,
    pub is_new_arrival: bool,
    pub is_new_in_market: bool,
    pub categories: Vec<String>,
    pub category_ids: Vec<i32>,
    /// First entry of `categories`, for legacy consumers.
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        let images: Vec<String> = serde_json::from_str(&model.images).unwrap_or_default();

        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            description: model.description,
            price: model.price,
            image_url: images.first().cloned(),
            images,
            is_available: model.is_available,
            isbn: model.isbn,
            publisher: model.publisher,
            publication_year: model.publication_year,
            pages: model.pages,
            language: model.language,
            binding: model.binding,
            dimensions: model.dimensions,
            weight: model.weight,
            stock: model.stock,
            is_new_arrival: model.is_new_arrival,
            is_new_in_market: model.is_new_in_market,
            categories: Vec::new(),
            category_ids: Vec::new(),
            category: None,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Payload accepted by the admin create/update endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookInput {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub images: Vec<String>,
    /// Single-image form used by older admin screens.
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<i32>,
    pub language: Option<String>,
    pub binding: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<String>,
    pub stock: Option<i32>,
    pub is_new_arrival: bool,
    pub is_new_in_market: bool,
    pub category_ids: Vec<i32>,
}

impl BookInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::Validation(
                "Price must be a non-negative number".to_string(),
            ));
        }
        if self.stock.is_some_and(|stock| stock < 0) {
            return Err(DomainError::Validation(
                "Stock cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Image list with the legacy single `image_url` folded in.
    pub fn image_list(&self) -> Vec<String> {
        let mut images: Vec<String> = self
            .images
            .iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        if images.is_empty()
            && let Some(url) = &self.image_url
            && !url.trim().is_empty()
        {
            images.push(url.trim().to_string());
        }

        images
    }

    pub fn images_json(&self) -> String {
        serde_json::to_string(&self.image_list()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Category ids without duplicates, first occurrence wins.
    pub fn unique_category_ids(&self) -> Vec<i32> {
        let mut ids = Vec::with_capacity(self.category_ids.len());
        for id in &self.category_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}
