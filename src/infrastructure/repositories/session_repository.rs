//! SeaORM implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::{DomainError, Session, SessionRepository};
use crate::models::{format_timestamp, session, timestamp};

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn create(&self, user_id: i32, ttl: chrono::Duration) -> Result<Session, DomainError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            DomainError::Internal(format!("Session lifetime {} is out of range", ttl))
        })?;
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            expires_at,
        };

        session::Entity::insert(session::ActiveModel {
            id: Set(session.id.clone()),
            user_id: Set(user_id),
            expires_at: Set(format_timestamp(session.expires_at)),
            created_at: Set(format_timestamp(now)),
        })
        .exec_without_returning(&self.db)
        .await?;

        Ok(session)
    }

    async fn find_active(&self, id: &str) -> Result<Option<Session>, DomainError> {
        let Some(row) = session::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        match parse_expiry(&row.expires_at) {
            Some(expires_at) if expires_at > Utc::now() => Ok(Some(Session {
                id: row.id,
                user_id: row.user_id,
                expires_at,
            })),
            _ => Ok(None),
        }
    }

    async fn revoke(&self, id: &str) -> Result<(), DomainError> {
        session::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        let result = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lt(timestamp()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
