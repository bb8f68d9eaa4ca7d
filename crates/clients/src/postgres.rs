use gacha_common::define_module_client;
use gacha_database::init_databases;
use sqlx::PgPool;

// creation order matters: user_rate_ups references gacha_items
init_databases!(
    default: [
        gacha_runtime::DrawableItem,
        gacha_runtime::UserRateUp,
    ]
);

/// Connects the shared pool, optionally rebuilding the schema first.
pub async fn connect_gacha_database(drop_tables: bool, create_tables: bool) -> &'static PgPool {
    connect(drop_tables, create_tables).await
}

define_module_client! {
    (struct PostgresClient, "postgres")
    client_type: &'static PgPool,
    env: ["DATABASE_URL"],
    setup: async {
        Ok(connect(false, false).await)
    }
}
