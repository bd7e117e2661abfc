//! Wishlist Service - books a shopper saved for later

use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::domain::{BookRepository, DomainError};
use crate::models::{Book, book, timestamp, wishlist};

/// Saved books, most recently added first.
pub async fn list(
    db: &DatabaseConnection,
    books: &dyn BookRepository,
    user_id: i32,
) -> Result<Vec<Book>, DomainError> {
    let ids: Vec<i32> = wishlist::Entity::find()
        .filter(wishlist::Column::UserId.eq(user_id))
        .order_by_desc(wishlist::Column::CreatedAt)
        .order_by_desc(wishlist::Column::BookId)
        .all(db)
        .await?
        .into_iter()
        .map(|entry| entry.book_id)
        .collect();

    books.find_many(&ids).await
}

/// Adds a book; adding it twice is not an error.
pub async fn add(db: &DatabaseConnection, user_id: i32, book_id: i32) -> Result<(), DomainError> {
    if book::Entity::find_by_id(book_id).one(db).await?.is_none() {
        return Err(DomainError::not_found("Book"));
    }

    wishlist::Entity::insert(wishlist::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        created_at: Set(timestamp()),
    })
    .on_conflict(
        OnConflict::columns([wishlist::Column::UserId, wishlist::Column::BookId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(())
}

/// Removes a book; removing one that is not saved is not an error.
pub async fn remove(db: &DatabaseConnection, user_id: i32, book_id: i32) -> Result<(), DomainError> {
    wishlist::Entity::delete_many()
        .filter(wishlist::Column::UserId.eq(user_id))
        .filter(wishlist::Column::BookId.eq(book_id))
        .exec(db)
        .await?;
    Ok(())
}
