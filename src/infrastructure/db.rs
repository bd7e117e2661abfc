use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::models::{
    book, book_category, category, content, order, order_item, session, setting, user, wishlist,
};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    run_migrations(&db).await?;

    Ok(db)
}

/// Creates every table that does not exist yet. Safe to run on each start
/// and from `POST /api/setup`.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Referenced tables first
    create_table(db, user::Entity).await?;
    create_table(db, session::Entity).await?;
    create_table(db, category::Entity).await?;
    create_table(db, book::Entity).await?;
    create_table(db, book_category::Entity).await?;
    create_table(db, order::Entity).await?;
    create_table(db, order_item::Entity).await?;
    create_table(db, wishlist::Entity).await?;
    create_table(db, setting::Entity).await?;
    create_table(db, content::Entity).await?;

    tracing::debug!("Schema is up to date");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    Ok(())
}
