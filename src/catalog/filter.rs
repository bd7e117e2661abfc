//! Catalog filter compiler
//!
//! Turns the storefront query string (`search`, `filter`, `categories`,
//! `minPrice`, `maxPrice`) into one conjunctive condition over `books`.
//! Conditions are added in a fixed order (search, promotion flag, category
//! membership, lower price bound, upper price bound) and rendered by the
//! query builder, which numbers placeholders and collects values together.

use sea_orm::sea_query::{Alias, Expr, Func, LikeExpr, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DbBackend, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select,
    Statement,
};
use serde::Deserialize;

use crate::models::{book, book_category, category};

/// Raw query parameters of `GET /api/books`.
///
/// Everything is kept as text so that a malformed number drops that one
/// predicate instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub filter: Option<String>,
    pub categories: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Promotional shelves surfaced as homepage carousels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    NewArrivals,
    NewInMarket,
}

impl Promotion {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "newArrivals" => Some(Promotion::NewArrivals),
            "newInMarket" => Some(Promotion::NewInMarket),
            _ => None,
        }
    }

    fn column(self) -> book::Column {
        match self {
            Promotion::NewArrivals => book::Column::IsNewArrival,
            Promotion::NewInMarket => book::Column::IsNewInMarket,
        }
    }
}

/// Parsed, typed catalog filter. Absent fields contribute no predicate.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CatalogFilter {
    pub search: Option<String>,
    pub promotion: Option<Promotion>,
    pub category_ids: Vec<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl From<CatalogQuery> for CatalogFilter {
    fn from(query: CatalogQuery) -> Self {
        Self {
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            promotion: query.filter.as_deref().and_then(Promotion::parse),
            category_ids: parse_ids(query.categories.as_deref()),
            min_price: parse_price(query.min_price.as_deref()),
            max_price: parse_price(query.max_price.as_deref()),
        }
    }
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        *self == CatalogFilter::default()
    }

    /// Conjunction of every present predicate, in compile order.
    pub fn condition(&self, backend: DbBackend) -> Condition {
        let mut condition = Condition::all();

        if let Some(term) = &self.search {
            let pattern = format!("%{}%", escape_like(&fold_case(term, backend)));
            condition = condition.add(
                Condition::any()
                    .add(contains_ci(book::Column::Title, &pattern))
                    .add(contains_ci(book::Column::Author, &pattern))
                    .add(contains_ci(book::Column::Description, &pattern))
                    .add(contains_ci(book::Column::Isbn, &pattern)),
            );
        }

        if let Some(promotion) = self.promotion {
            condition = condition.add(promotion.column().eq(true));
        }

        // An empty id list would render as an always-false IN (); skip it.
        if !self.category_ids.is_empty() {
            condition = condition.add(in_any_category(&self.category_ids));
        }

        if let Some(min) = self.min_price {
            condition = condition.add(book::Column::Price.gte(min));
        }

        if let Some(max) = self.max_price {
            condition = condition.add(book::Column::Price.lte(max));
        }

        condition
    }

    /// Filtered books, newest first.
    pub fn select(&self, backend: DbBackend) -> Select<book::Entity> {
        book::Entity::find()
            .filter(self.condition(backend))
            .order_by_desc(book::Column::CreatedAt)
            .order_by_desc(book::Column::Id)
    }

    /// The full catalog statement (books left-joined to categories) rendered
    /// for `backend`, with its bound values.
    pub fn statement(&self, backend: DbBackend) -> Statement {
        self.select(backend)
            .find_also_related(category::Entity)
            .build(backend)
    }
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_ids(raw: Option<&str>) -> Vec<i32> {
    let mut ids = Vec::new();
    for id in raw
        .unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<i32>().ok())
    {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Lowercases the search term the way the backend's `LOWER()` folds the
/// columns. SQLite only folds ASCII letters, so other letters keep their case.
fn fold_case(term: &str, backend: DbBackend) -> String {
    match backend {
        DbBackend::Sqlite => term.to_ascii_lowercase(),
        _ => term.to_lowercase(),
    }
}

/// Escapes LIKE wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_ci(column: book::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((book::Entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// EXISTS (SELECT 1 FROM book_categories bc
///         WHERE bc.book_id = books.id AND bc.category_id IN (...))
fn in_any_category(ids: &[i32]) -> SimpleExpr {
    let bc = Alias::new("bc");
    let subquery = Query::select()
        .expr(Expr::cust("1"))
        .from_as(book_category::Entity, bc.clone())
        .and_where(
            Expr::col((bc.clone(), book_category::Column::BookId))
                .equals((book::Entity, book::Column::Id)),
        )
        .and_where(Expr::col((bc, book_category::Column::CategoryId)).is_in(ids.iter().copied()))
        .to_owned();

    Expr::exists(subquery)
}
