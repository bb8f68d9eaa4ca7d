/// Declares the process-wide Postgres pool for the listed table types.
///
/// # Generated Functions
/// - `async fn connect(drop_tables: bool, create_tables: bool) -> &'static PgPool`
///
/// # Example
/// ```rust,ignore
/// init_databases!(
///     default: [GachaItem, UserRateUp]
/// );
///
/// #[tokio::main]
/// async fn main() {
///     let pool = connect(false, true).await;
/// }
/// ```
#[macro_export]
macro_rules! init_databases {
    (
        default: [$($default_type:ty),* $(,)?]
    ) => {
        static POOL: tokio::sync::OnceCell<sqlx::PgPool> = tokio::sync::OnceCell::const_new();

        #[allow(dead_code)]
        async fn connect(drop_tables: bool, create_tables: bool) -> &'static sqlx::PgPool {
            POOL.get_or_init(|| async {
                let database_url = std::env::var("DATABASE_URL")
                    .expect("DATABASE_URL environment variable not set");

                let pool = sqlx::PgPool::connect(&database_url).await
                    .expect("Failed to connect to default database");

                if drop_tables {
                    $(
                        let drop_table_sql_str = <$default_type as $crate::SqlxSchema>::drop_table_sql();
                        if let Err(e) = sqlx::query(&drop_table_sql_str).execute(&pool).await {
                            tracing::warn!("[init_databases] Failed to drop table for '{}'. Error: {:?}", stringify!($default_type), e);
                        }
                    )*
                }

                if create_tables {
                    $(
                        let create_table_sql_str = <$default_type as $crate::SqlxSchema>::create_table_sql();
                        sqlx::query(&create_table_sql_str).execute(&pool).await
                            .unwrap_or_else(|e| panic!("Failed to create table for '{}'. Error: {:?}", stringify!($default_type), e));

                        for index_sql in <$default_type as $crate::SqlxSchema>::INDEXES_SQL {
                            sqlx::query(index_sql).execute(&pool).await
                                .unwrap_or_else(|e| panic!("Failed to create index for '{}'. SQL: {}. Error: {:?}", stringify!($default_type), index_sql, e));
                        }
                    )*
                }

                pool
            }).await
        }
    };
}
