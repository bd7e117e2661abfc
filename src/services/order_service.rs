//! Order Service - checkout for guests and signed-in shoppers

use sea_orm::EntityTrait;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{DomainError, DraftItem, Order, OrderContact, OrderDraft};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AuthUser;
use crate::infrastructure::seed::SHIPPING_PRICE_KEY;
use crate::models::user;
use crate::services::mail_service::order_confirmation;

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRequest {
    pub book_id: i32,
    pub quantity: i32,
    /// Price shown in the cart. Accepted for compatibility, never trusted.
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartItemRequest>,
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub notes: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Shipping price setting as a number; numeric strings are accepted, anything
/// else counts as free shipping.
pub fn shipping_price_from(value: Option<&Value>) -> f64 {
    let price = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    price.filter(|p| p.is_finite() && *p >= 0.0).unwrap_or(0.0)
}

/// Checks the cart and builds the contact block. A signed-in shopper's
/// profile fills any contact field left blank.
pub fn build_draft(
    request: PlaceOrderRequest,
    profile: Option<&user::Model>,
    shipping_price: f64,
) -> Result<OrderDraft, DomainError> {
    if request.items.is_empty() {
        return Err(DomainError::Validation("Cart is empty".to_string()));
    }
    if request.items.iter().any(|item| item.quantity < 1) {
        return Err(DomainError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let mut contact = OrderContact {
        customer_name: clean(request.customer_name),
        email: clean(request.email),
        phone: clean(request.phone),
        address: clean(request.address),
        city: clean(request.city),
        notes: clean(request.notes),
    };

    match profile {
        Some(profile) => {
            contact.customer_name = contact.customer_name.or_else(|| profile.name.clone());
            contact.email = contact.email.or_else(|| Some(profile.email.clone()));
            contact.phone = contact.phone.or_else(|| profile.phone.clone());
            contact.address = contact.address.or_else(|| profile.address.clone());
            contact.city = contact.city.or_else(|| profile.city.clone());
        }
        None => {
            if contact.email.is_none() || contact.phone.is_none() {
                return Err(DomainError::Validation(
                    "Guest orders need an email address and a phone number".to_string(),
                ));
            }
        }
    }

    Ok(OrderDraft {
        user_id: profile.map(|p| p.id),
        contact,
        items: request
            .items
            .into_iter()
            .map(|item| DraftItem {
                book_id: item.book_id,
                quantity: item.quantity,
            })
            .collect(),
        shipping_price,
    })
}

/// Places an order and sends the confirmation email. Email failures are
/// logged and do not affect the placed order.
pub async fn place_order(
    state: &AppState,
    user: Option<&AuthUser>,
    request: PlaceOrderRequest,
) -> Result<Order, DomainError> {
    let profile = match user {
        Some(user) => Some(
            user::Entity::find_by_id(user.user_id)
                .one(state.db())
                .await?
                .ok_or_else(|| DomainError::Unauthorized("Account no longer exists".to_string()))?,
        ),
        None => None,
    };

    let shipping = state.settings_repo.get(SHIPPING_PRICE_KEY).await?;
    let draft = build_draft(request, profile.as_ref(), shipping_price_from(shipping.as_ref()))?;

    let order = state.order_repo.create(draft).await?;
    send_confirmations(state, &order).await;
    Ok(order)
}

async fn send_confirmations(state: &AppState, order: &Order) {
    let recipients = order
        .email
        .iter()
        .chain(state.config.order_notify_email.iter());

    for to in recipients {
        if let Err(e) = state.mailer.send(order_confirmation(order, to)).await {
            tracing::warn!("Confirmation for order {} to {} failed: {}", order.id, to, e);
        }
    }
}
