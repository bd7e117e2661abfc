//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::catalog::{CatalogFilter, aggregate_categories};
use crate::domain::{BookRepository, DomainError};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};
use crate::models::{Book, BookInput, book_category, category, timestamp, wishlist};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Rejects ids that do not name an existing category.
async fn ensure_categories_exist<C>(conn: &C, ids: &[i32]) -> Result<(), DomainError>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(());
    }

    let found = category::Entity::find()
        .filter(category::Column::Id.is_in(ids.to_vec()))
        .count(conn)
        .await?;

    if found as usize != ids.len() {
        return Err(DomainError::Validation(
            "One or more categories do not exist".to_string(),
        ));
    }
    Ok(())
}

/// Replaces the category links of a book with `ids`.
async fn replace_categories<C>(conn: &C, book_id: i32, ids: &[i32]) -> Result<(), DomainError>
where
    C: ConnectionTrait,
{
    book_category::Entity::delete_many()
        .filter(book_category::Column::BookId.eq(book_id))
        .exec(conn)
        .await?;

    if ids.is_empty() {
        return Ok(());
    }

    let links = ids.iter().map(|category_id| book_category::ActiveModel {
        book_id: Set(book_id),
        category_id: Set(*category_id),
    });
    book_category::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: CatalogFilter) -> Result<Vec<Book>, DomainError> {
        let rows = filter
            .select(self.db.get_database_backend())
            .find_also_related(category::Entity)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;

        Ok(aggregate_categories(rows))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let rows = BookEntity::find_by_id(id)
            .find_also_related(category::Entity)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;

        Ok(aggregate_categories(rows).into_iter().next())
    }

    async fn find_many(&self, ids: &[i32]) -> Result<Vec<Book>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = BookEntity::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .find_also_related(category::Entity)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;

        let mut books = aggregate_categories(rows);
        books.sort_by_key(|book| ids.iter().position(|id| *id == book.id));
        Ok(books)
    }

    async fn create(&self, input: BookInput) -> Result<Book, DomainError> {
        input.validate()?;
        let category_ids = input.unique_category_ids();
        let now = timestamp();

        let txn = self.db.begin().await?;
        ensure_categories_exist(&txn, &category_ids).await?;

        let new_book = ActiveModel {
            title: Set(input.title.trim().to_string()),
            author: Set(input.author.clone()),
            description: Set(input.description.clone()),
            price: Set(input.price),
            images: Set(input.images_json()),
            is_available: Set(input.is_available.unwrap_or(true)),
            isbn: Set(input.isbn.clone()),
            publisher: Set(input.publisher.clone()),
            publication_year: Set(input.publication_year),
            pages: Set(input.pages),
            language: Set(input.language.clone()),
            binding: Set(input.binding.clone()),
            dimensions: Set(input.dimensions.clone()),
            weight: Set(input.weight.clone()),
            stock: Set(input.stock.unwrap_or(0)),
            is_new_arrival: Set(input.is_new_arrival),
            is_new_in_market: Set(input.is_new_in_market),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        let saved = new_book.insert(&txn).await?;
        replace_categories(&txn, saved.id, &category_ids).await?;
        txn.commit().await?;

        tracing::info!("Created book {} ({})", saved.id, saved.title);
        self.find_by_id(saved.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Book"))
    }

    async fn update(&self, id: i32, input: BookInput) -> Result<Book, DomainError> {
        input.validate()?;
        let category_ids = input.unique_category_ids();

        let txn = self.db.begin().await?;
        let existing = BookEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("Book"))?;
        ensure_categories_exist(&txn, &category_ids).await?;

        let mut book: ActiveModel = existing.into();
        book.title = Set(input.title.trim().to_string());
        book.author = Set(input.author.clone());
        book.description = Set(input.description.clone());
        book.price = Set(input.price);
        book.images = Set(input.images_json());
        if let Some(available) = input.is_available {
            book.is_available = Set(available);
        }
        book.isbn = Set(input.isbn.clone());
        book.publisher = Set(input.publisher.clone());
        book.publication_year = Set(input.publication_year);
        book.pages = Set(input.pages);
        book.language = Set(input.language.clone());
        book.binding = Set(input.binding.clone());
        book.dimensions = Set(input.dimensions.clone());
        book.weight = Set(input.weight.clone());
        if let Some(stock) = input.stock {
            book.stock = Set(stock);
        }
        book.is_new_arrival = Set(input.is_new_arrival);
        book.is_new_in_market = Set(input.is_new_in_market);
        book.updated_at = Set(timestamp());

        book.update(&txn).await?;
        replace_categories(&txn, id, &category_ids).await?;
        txn.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Book"))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        book_category::Entity::delete_many()
            .filter(book_category::Column::BookId.eq(id))
            .exec(&txn)
            .await?;
        wishlist::Entity::delete_many()
            .filter(wishlist::Column::BookId.eq(id))
            .exec(&txn)
            .await?;
        let result = BookEntity::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(DomainError::not_found("Book"));
        }

        txn.commit().await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
