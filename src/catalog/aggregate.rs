//! Folds the books ⟕ categories join back into one record per book.

use std::collections::HashMap;

use crate::models::{Book, book, category};

/// Groups join rows by book id.
///
/// Books keep the order of their first row (the query's ordering), category
/// names are deduplicated by category id, and a book without categories gets
/// empty lists rather than a `[null]` entry.
pub fn aggregate_categories(rows: Vec<(book::Model, Option<category::Model>)>) -> Vec<Book> {
    let mut books: Vec<Book> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();

    for (model, category) in rows {
        let position = match index.get(&model.id) {
            Some(&position) => position,
            None => {
                index.insert(model.id, books.len());
                books.push(Book::from(model));
                books.len() - 1
            }
        };

        if let Some(category) = category {
            let book = &mut books[position];
            if !book.category_ids.contains(&category.id) {
                book.category_ids.push(category.id);
                book.categories.push(category.name);
            }
        }
    }

    for book in &mut books {
        book.category = book.categories.first().cloned();
    }

    books
}
