use crate::storage::entity::{
    geographic_record, language_record, onomatopoeia_type, speaker, village,
};
use log::info;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    Statement,
};
use std::time::Duration;

pub async fn establish_connection(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());
    if db_url.contains(":memory:") {
        // each pooled connection would get its own private database
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(10)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(8))
            .max_lifetime(Duration::from_secs(8));
    }
    opt.sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info);

    let db = Database::connect(opt).await?;

    if !db_url.contains(":memory:") {
        execute_sql(&db, "PRAGMA journal_mode=WAL;").await?;
    }
    execute_sql(&db, "PRAGMA foreign_keys=ON;").await?;

    // parents before children so the foreign keys resolve
    create_table(&db, village::Entity).await?;
    create_table(&db, speaker::Entity).await?;
    create_table(&db, onomatopoeia_type::Entity).await?;
    create_table(&db, language_record::Entity).await?;
    create_table(&db, geographic_record::Entity).await?;

    // unique indexes back the speaker_id / type_code uniqueness even on
    // databases created before the columns were marked unique
    execute_sql(
        &db,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_speakers_speaker_id ON speakers(speaker_id);",
    )
    .await?;
    execute_sql(
        &db,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_onomatopoeia_types_type_code ON onomatopoeia_types(type_code);",
    )
    .await?;
    execute_sql(
        &db,
        "CREATE INDEX IF NOT EXISTS idx_language_records_recorded_date ON language_records(recorded_date);",
    )
    .await?;
    execute_sql(
        &db,
        "CREATE INDEX IF NOT EXISTS idx_geographic_records_captured_date ON geographic_records(captured_date);",
    )
    .await?;

    info!("Database connection established and archive tables initialized.");

    Ok(db)
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let stmt = builder.build(schema.create_table_from_entity(entity).if_not_exists());
    db.execute(stmt).await?;
    Ok(())
}

async fn execute_sql(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await?;
    Ok(())
}
