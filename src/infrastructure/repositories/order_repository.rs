//! SeaORM implementation of OrderRepository
//!
//! An order header and its items are written in one transaction. Unit
//! prices and titles are read from `books` inside that transaction and
//! copied onto the items.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select, Set,
    TransactionTrait, sea_query::Expr,
};

use crate::domain::{
    DomainError, Order, OrderDraft, OrderLine, OrderRepository, OrderStatus, order_total,
};
use crate::models::{book, order, order_item, timestamp};

pub struct SeaOrmOrderRepository {
    db: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads orders with their items, newest first.
    async fn load(&self, query: Select<order::Entity>) -> Result<Vec<Order>, DomainError> {
        let rows = query
            .find_with_related(order_item::Entity)
            .all(&self.db)
            .await?;

        let mut orders = rows
            .into_iter()
            .map(|(header, items)| Order::from_parts(header, items))
            .collect::<Result<Vec<_>, _>>()?;

        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn create(&self, draft: OrderDraft) -> Result<Order, DomainError> {
        if draft.items.is_empty() {
            return Err(DomainError::Validation("Cart is empty".to_string()));
        }

        let txn = self.db.begin().await?;

        let ids: Vec<i32> = draft.items.iter().map(|item| item.book_id).collect();
        let books: HashMap<i32, book::Model> = book::Entity::find()
            .filter(book::Column::Id.is_in(ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let mut lines = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            let book = books.get(&item.book_id).ok_or_else(|| {
                DomainError::Validation(format!("Book {} does not exist", item.book_id))
            })?;
            if !book.is_available {
                return Err(DomainError::Validation(format!(
                    "'{}' is not available",
                    book.title
                )));
            }
            lines.push(OrderLine {
                book_id: book.id,
                title: book.title.clone(),
                quantity: item.quantity,
                price: book.price,
            });
        }

        let now = timestamp();
        let contact = draft.contact;
        let header = order::ActiveModel {
            user_id: Set(draft.user_id),
            customer_name: Set(contact.customer_name),
            email: Set(contact.email),
            phone: Set(contact.phone),
            address: Set(contact.address),
            city: Set(contact.city),
            notes: Set(contact.notes),
            shipping_price: Set(draft.shipping_price),
            total: Set(order_total(&lines, draft.shipping_price)),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let items = lines.iter().map(|line| order_item::ActiveModel {
            order_id: Set(header.id),
            book_id: Set(line.book_id),
            title: Set(line.title.clone()),
            quantity: Set(line.quantity),
            price: Set(line.price),
            ..Default::default()
        });
        order_item::Entity::insert_many(items)
            .exec_without_returning(&txn)
            .await?;

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(header.id))
            .all(&txn)
            .await?;
        txn.commit().await?;

        tracing::info!(
            "Order {} placed: {} items, total {:.2}",
            header.id,
            items.len(),
            header.total
        );
        Order::from_parts(header, items)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, DomainError> {
        let orders = self
            .load(order::Entity::find().filter(order::Column::Id.eq(id)))
            .await?;
        Ok(orders.into_iter().next())
    }

    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Order>, DomainError> {
        self.load(order::Entity::find().filter(order::Column::UserId.eq(user_id)))
            .await
    }

    async fn find_all(&self) -> Result<Vec<Order>, DomainError> {
        self.load(order::Entity::find()).await
    }

    async fn update_status(&self, id: i32, status: OrderStatus) -> Result<Order, DomainError> {
        let existing = order::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Order"))?;

        let current = existing.status.parse::<OrderStatus>()?;
        if !current.can_transition_to(status) {
            return Err(DomainError::Validation(format!(
                "Cannot change order status from {} to {}",
                current, status
            )));
        }

        // Only applies while the status is still the one checked above
        let result = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(status.as_str()))
            .col_expr(order::Column::UpdatedAt, Expr::value(timestamp()))
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::Status.eq(existing.status))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::Validation(format!(
                "Order {} changed status in the meantime",
                id
            )));
        }

        tracing::info!("Order {} is now {}", id, status);
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order"))
    }
}
