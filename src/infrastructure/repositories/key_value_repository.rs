//! SeaORM implementation of KeyValueRepository, shared by the `settings`
//! and `content` tables. Values are stored as JSON text.

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PrimaryKeyTrait, Set,
    sea_query::OnConflict,
};
use serde_json::Value;

use crate::domain::{DomainError, KeyValueRepository};
use crate::models::{content, setting, timestamp};

/// Stored text back to JSON; legacy rows holding bare text come back as strings.
fn decode(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

fn encode(value: &Value) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| DomainError::Internal(e.to_string()))
}

fn validate_key(key: &str) -> Result<(), DomainError> {
    if key.trim().is_empty() {
        return Err(DomainError::Validation("Key is required".to_string()));
    }
    Ok(())
}

/// A `key`/`value`/`updated_at` table that can back a [`KeyValueRepository`].
pub trait KeyValueTable: EntityTrait {
    /// Name used in log lines.
    const LABEL: &'static str;

    type ActiveModel: ActiveModelTrait<Entity = Self> + Send;

    fn key_column() -> Self::Column;
    fn value_columns() -> [Self::Column; 2];
    fn value_of(model: Self::Model) -> String;
    fn row(key: String, value: String, updated_at: String) -> Self::ActiveModel;
}

impl KeyValueTable for setting::Entity {
    type ActiveModel = setting::ActiveModel;
    const LABEL: &'static str = "Setting";

    fn key_column() -> Self::Column {
        setting::Column::Key
    }

    fn value_columns() -> [Self::Column; 2] {
        [setting::Column::Value, setting::Column::UpdatedAt]
    }

    fn value_of(model: setting::Model) -> String {
        model.value
    }

    fn row(key: String, value: String, updated_at: String) -> setting::ActiveModel {
        setting::ActiveModel {
            key: Set(key),
            value: Set(value),
            updated_at: Set(updated_at),
        }
    }
}

impl KeyValueTable for content::Entity {
    type ActiveModel = content::ActiveModel;
    const LABEL: &'static str = "Content";

    fn key_column() -> Self::Column {
        content::Column::Key
    }

    fn value_columns() -> [Self::Column; 2] {
        [content::Column::Value, content::Column::UpdatedAt]
    }

    fn value_of(model: content::Model) -> String {
        model.value
    }

    fn row(key: String, value: String, updated_at: String) -> content::ActiveModel {
        content::ActiveModel {
            key: Set(key),
            value: Set(value),
            updated_at: Set(updated_at),
        }
    }
}

pub struct SeaOrmKeyValueRepository<E> {
    db: DatabaseConnection,
    table: PhantomData<E>,
}

impl<E: KeyValueTable> SeaOrmKeyValueRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            table: PhantomData,
        }
    }
}

pub type SeaOrmSettingsRepository = SeaOrmKeyValueRepository<setting::Entity>;
pub type SeaOrmContentRepository = SeaOrmKeyValueRepository<content::Entity>;

#[async_trait]
impl<E> KeyValueRepository for SeaOrmKeyValueRepository<E>
where
    E: KeyValueTable,
    String: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    E::Model: IntoActiveModel<<E as KeyValueTable>::ActiveModel>,
{
    async fn get(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let row = E::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(row.map(|row| decode(E::value_of(row))))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), DomainError> {
        validate_key(key)?;
        E::insert(E::row(key.to_string(), encode(&value)?, timestamp()))
            .on_conflict(
                OnConflict::column(E::key_column())
                    .update_columns(E::value_columns())
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        tracing::info!("{} '{}' updated", E::LABEL, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_json_and_falls_back_to_text() {
        assert_eq!(decode("35".to_string()), serde_json::json!(35));
        assert_eq!(decode("{\"a\":1}".to_string()), serde_json::json!({"a": 1}));
        assert_eq!(decode("שלום".to_string()), serde_json::json!("שלום"));
    }
}
