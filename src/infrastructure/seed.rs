use sea_orm::*;
use serde_json::json;

use crate::domain::{DomainError, KeyValueRepository};
use crate::infrastructure::auth::hash_password;
use crate::infrastructure::config::AdminCredentials;
use crate::models::{book, book_category, category, session, timestamp, user};

pub const SHIPPING_PRICE_KEY: &str = "shipping_price";

/// Settings and accounts every install needs: a `shipping_price` setting and,
/// when credentials are configured, an admin account.
pub async fn ensure_defaults(
    db: &DatabaseConnection,
    settings: &dyn KeyValueRepository,
    admin: Option<&AdminCredentials>,
) -> Result<(), DomainError> {
    if settings.get(SHIPPING_PRICE_KEY).await?.is_none() {
        settings.set(SHIPPING_PRICE_KEY, json!(0)).await?;
    }

    if let Some(admin) = admin {
        ensure_admin(db, admin).await?;
    }
    Ok(())
}

/// Creates the admin account, or promotes an existing account with that email.
async fn ensure_admin(db: &DatabaseConnection, admin: &AdminCredentials) -> Result<(), DomainError> {
    let email = admin.email.trim().to_lowercase();
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(db)
        .await?;

    match existing {
        Some(found) if found.role == user::ROLE_ADMIN => {}
        Some(found) => {
            // The configured password replaces the registrant's and their sessions end
            let password_hash = hash_password(&admin.password)?;
            let txn = db.begin().await?;
            session::Entity::delete_many()
                .filter(session::Column::UserId.eq(found.id))
                .exec(&txn)
                .await?;

            let mut promoted: user::ActiveModel = found.into();
            promoted.role = Set(user::ROLE_ADMIN.to_owned());
            promoted.password_hash = Set(password_hash);
            promoted.updated_at = Set(timestamp());
            promoted.update(&txn).await?;
            txn.commit().await?;
            tracing::warn!("Promoted existing account {} to admin and reset its password", email);
        }
        None => {
            let now = timestamp();
            user::ActiveModel {
                email: Set(email.clone()),
                password_hash: Set(hash_password(&admin.password)?),
                name: Set(Some("מנהל".to_owned())),
                role: Set(user::ROLE_ADMIN.to_owned()),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
            tracing::info!("Created admin account {}", email);
        }
    }
    Ok(())
}

struct DemoBook {
    title: &'static str,
    author: &'static str,
    price: f64,
    language: &'static str,
    new_arrival: bool,
    new_in_market: bool,
    categories: &'static [usize],
}

const DEMO_CATEGORIES: [&str; 4] = ["תנ\"ך", "תלמוד", "הלכה", "Prayer Books"];

const DEMO_BOOKS: [DemoBook; 5] = [
    DemoBook {
        title: "חומש מקראות גדולות",
        author: "",
        price: 120.0,
        language: "he",
        new_arrival: true,
        new_in_market: false,
        categories: &[0],
    },
    DemoBook {
        title: "משנה ברורה",
        author: "ישראל מאיר הכהן",
        price: 85.0,
        language: "he",
        new_arrival: false,
        new_in_market: true,
        categories: &[2],
    },
    DemoBook {
        title: "תלמוד בבלי - מסכת ברכות",
        author: "",
        price: 65.0,
        language: "he",
        new_arrival: true,
        new_in_market: false,
        categories: &[1],
    },
    DemoBook {
        title: "Siddur Tehillat Hashem",
        author: "",
        price: 50.0,
        language: "en",
        new_arrival: false,
        new_in_market: false,
        categories: &[3, 2],
    },
    DemoBook {
        title: "קיצור שולחן ערוך",
        author: "שלמה גאנצפריד",
        price: 40.0,
        language: "he",
        new_arrival: false,
        new_in_market: false,
        categories: &[],
    },
];

/// Inserts a small bilingual catalog. Does nothing when books already exist.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if book::Entity::find().count(db).await? > 0 {
        tracing::info!("Catalog is not empty, skipping demo seed");
        return Ok(());
    }

    let txn = db.begin().await?;
    let now = timestamp();

    let mut category_ids = Vec::with_capacity(DEMO_CATEGORIES.len());
    for name in DEMO_CATEGORIES {
        let saved = category::ActiveModel {
            name: Set(name.to_owned()),
            parent_id: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        category_ids.push(saved.id);
    }

    for demo in &DEMO_BOOKS {
        let saved = book::ActiveModel {
            title: Set(demo.title.to_owned()),
            author: Set((!demo.author.is_empty()).then(|| demo.author.to_owned())),
            price: Set(demo.price),
            images: Set("[]".to_owned()),
            is_available: Set(true),
            language: Set(Some(demo.language.to_owned())),
            stock: Set(10),
            is_new_arrival: Set(demo.new_arrival),
            is_new_in_market: Set(demo.new_in_market),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let links: Vec<book_category::ActiveModel> = demo
            .categories
            .iter()
            .filter_map(|index| category_ids.get(*index))
            .map(|category_id| book_category::ActiveModel {
                book_id: Set(saved.id),
                category_id: Set(*category_id),
            })
            .collect();
        if !links.is_empty() {
            book_category::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }
    }

    txn.commit().await?;
    tracing::info!(
        "Seeded {} categories and {} books",
        DEMO_CATEGORIES.len(),
        DEMO_BOOKS.len()
    );
    Ok(())
}
