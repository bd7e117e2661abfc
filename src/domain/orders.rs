//! Order types and pricing rules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;
use crate::models::{order, order_item};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Only a pending order moves, and only to a final state.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::Validation(format!(
                "Unknown order status '{}'",
                other
            ))),
        }
    }
}

/// Cart entry as requested by the shopper; prices are resolved on write.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub book_id: i32,
    pub quantity: i32,
}

/// Contact details captured with the order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderContact {
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub notes: Option<String>,
}

/// Validated order, ready to be persisted atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub user_id: Option<i32>,
    pub contact: OrderContact,
    pub items: Vec<DraftItem>,
    pub shipping_price: f64,
}

/// Cart entry with its price snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub book_id: i32,
    pub title: String,
    pub quantity: i32,
    pub price: f64,
}

impl OrderLine {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Σ(price × quantity) + shipping.
pub fn order_total(lines: &[OrderLine], shipping_price: f64) -> f64 {
    lines.iter().map(OrderLine::subtotal).sum::<f64>() + shipping_price
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub id: i32,
    pub book_id: i32,
    pub title: String,
    pub quantity: i32,
    pub price: f64,
}

impl From<order_item::Model> for OrderItem {
    fn from(model: order_item::Model) -> Self {
        Self {
            id: model.id,
            book_id: model.book_id,
            title: model.title,
            quantity: model.quantity,
            price: model.price,
        }
    }
}

/// Order with its items, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i32,
    pub user_id: Option<i32>,
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub notes: Option<String>,
    pub shipping_price: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: String,
    pub updated_at: String,
}

impl Order {
    pub fn from_parts(
        model: order::Model,
        items: Vec<order_item::Model>,
    ) -> Result<Self, DomainError> {
        let status = model.status.parse::<OrderStatus>()?;
        let mut items: Vec<OrderItem> = items.into_iter().map(OrderItem::from).collect();
        items.sort_by_key(|item| item.id);

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            customer_name: model.customer_name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            city: model.city,
            notes: model.notes,
            shipping_price: model.shipping_price,
            total: model.total,
            status,
            items,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    pub fn items_subtotal(&self) -> f64 {
        self.total - self.shipping_price
    }
}
