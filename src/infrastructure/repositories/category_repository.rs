//! SeaORM implementation of CategoryRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};

use crate::domain::{CategoryRepository, DomainError};
use crate::models::category::{ActiveModel, CategoryInput, Column, Entity as CategoryEntity, Model};
use crate::models::{book_category, timestamp};

pub struct SeaOrmCategoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn validate(&self, id: Option<i32>, input: &CategoryInput) -> Result<(), DomainError> {
        if input.name.trim().is_empty() {
            return Err(DomainError::Validation("Name is required".to_string()));
        }

        if let Some(parent_id) = input.parent_id {
            if Some(parent_id) == id {
                return Err(DomainError::Validation(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            if CategoryEntity::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .is_none()
            {
                return Err(DomainError::Validation(
                    "Parent category does not exist".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_all(&self) -> Result<Vec<Model>, DomainError> {
        Ok(CategoryEntity::find()
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Model>, DomainError> {
        Ok(CategoryEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, input: CategoryInput) -> Result<Model, DomainError> {
        self.validate(None, &input).await?;
        let now = timestamp();

        let category = ActiveModel {
            name: Set(input.name.trim().to_string()),
            parent_id: Set(input.parent_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(category.insert(&self.db).await?)
    }

    async fn update(&self, id: i32, input: CategoryInput) -> Result<Model, DomainError> {
        let existing = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Category"))?;
        self.validate(Some(id), &input).await?;

        let mut category: ActiveModel = existing.into();
        category.name = Set(input.name.trim().to_string());
        category.parent_id = Set(input.parent_id);
        category.updated_at = Set(timestamp());
        Ok(category.update(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        CategoryEntity::update_many()
            .col_expr(Column::ParentId, Expr::value(Option::<i32>::None))
            .filter(Column::ParentId.eq(id))
            .exec(&txn)
            .await?;
        book_category::Entity::delete_many()
            .filter(book_category::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        let result = CategoryEntity::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DomainError::not_found("Category"));
        }

        txn.commit().await?;
        tracing::info!("Deleted category {}", id);
        Ok(())
    }
}
