use sqlx::{FromRow, Postgres, Error as SqlxError, postgres::PgArguments, Executor};

/// Trait to define the schema of a database object for PostgreSQL.
pub trait SqlxSchema: Send + Sync + Unpin + Clone + std::fmt::Debug {
    /// The type of the primary key for this database object.
    type Id: Send + Sync + for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Clone;

    /// The intermediate type that implements FromRow, used for fetching from the database.
    type Row: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin;

    const TABLE_NAME: &'static str;
    const ID_COLUMN_NAME: &'static str;
    const COLUMNS: &'static [&'static str];
    const INDEXES_SQL: &'static [&'static str];

    /// Retrieves the value of the primary key for an instance of the object.
    fn get_id_value(&self) -> Self::Id;

    /// Converts the intermediate Row type to the Self type.
    fn from_row(row: Self::Row) -> Self;

    fn create_table_sql() -> String;

    fn drop_table_sql() -> String {
        format!("DROP TABLE IF EXISTS \"{}\" CASCADE;", Self::TABLE_NAME)
    }

    /// `INSERT INTO t (c1, c2, ..) VALUES ($1, $2, ..) RETURNING c1, c2, ..`
    fn insert_sql() -> String {
        let columns = Self::COLUMNS.iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=Self::COLUMNS.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {}",
            Self::TABLE_NAME, columns, placeholders, columns
        )
    }

    fn delete_by_id_sql() -> String {
        format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", Self::TABLE_NAME, Self::ID_COLUMN_NAME)
    }
}

/// Trait for CRUD (Create, Read, Update, Delete) operations for PostgreSQL.
#[async_trait::async_trait]
pub trait SqlxCrud: SqlxSchema + SqlxFilterQuery + Sized {
    /// Binds the struct fields to an insert query, in `COLUMNS` order.
    fn bind_insert<'q>(&self, query: sqlx::query::QueryAs<'q, Postgres, Self::Row, PgArguments>)
        -> sqlx::query::QueryAs<'q, Postgres, Self::Row, PgArguments>;

    /// Creates a new record in the database.
    async fn create<'e, E>(self, executor: E) -> Result<Self, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send,
    {
        let sql = Self::insert_sql();
        let query = self.bind_insert(sqlx::query_as(&sql));
        query.fetch_one(executor).await.map(Self::from_row)
    }

    /// Deletes a record from the database by its primary key.
    async fn delete<'e, E>(self, executor: E) -> Result<u64, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send,
    {
        let sql = Self::delete_by_id_sql();
        sqlx::query(&sql)
            .bind(self.get_id_value())
            .execute(executor)
            .await
            .map(|result| result.rows_affected())
    }
}

/// Specifies the direction for ordering query results.
#[derive(Debug, Clone, Copy)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

// --- Filtering Structures and Trait ---

/// A trait to allow for boxing of different types that can be encoded as sqlx arguments.
pub trait AsSqlxArg: Send + Sync {
    fn add_to_args(&self, args: &mut PgArguments) -> Result<(), SqlxError>;
}

impl<T> AsSqlxArg for T
where
    T: for<'a> sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
{
    fn add_to_args(&self, args: &mut PgArguments) -> Result<(), SqlxError> {
        use sqlx::Arguments;
        args.add(self.clone()).map_err(SqlxError::Encode)
    }
}

/// Represents a single filter condition for a database query.
pub struct FilterCondition {
    pub column: &'static str,
    pub operator: &'static str,
    /// Holds the value for the condition's placeholder, if any.
    pub value: Option<Box<dyn AsSqlxArg>>,
}

/// Represents the complete criteria for a filtered database query.
#[derive(Default)]
pub struct QueryCriteria {
    pub conditions: Vec<FilterCondition>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Vec<(&'static str, OrderDirection)>,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter condition that may or may not have a value.
    pub fn add_filter<V>(mut self, column: &'static str, operator: &'static str, value: Option<V>) -> Self
    where
        V: for<'a> ::sqlx::Encode<'a, Postgres> + ::sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.conditions.push(FilterCondition {
            column,
            operator,
            value: value.map(|v| Box::new(v) as Box<dyn AsSqlxArg>),
        });
        self
    }

    pub fn add_valued_filter<V>(self, column: &'static str, operator: &'static str, value: V) -> Self
    where
        V: for<'a> ::sqlx::Encode<'a, Postgres> + ::sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.add_filter(column, operator, Some(value))
    }

    pub fn limit(mut self, limit_val: i64) -> Self {
        self.limit = Some(limit_val);
        self
    }

    pub fn offset(mut self, offset_val: i64) -> Self {
        self.offset = Some(offset_val);
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: OrderDirection) -> Self {
        self.order_by.push((column, direction));
        self
    }

    /// Renders the parameterised SELECT statement for `table` together with
    /// its bound arguments. Placeholders are numbered in the order conditions
    /// were added, followed by LIMIT and OFFSET.
    pub fn build_select(&self, table: &str, columns: &[&str]) -> Result<(String, PgArguments), SqlxError> {
        use sqlx::Arguments;

        let mut sql_query_parts: Vec<String> = Vec::new();
        let mut arguments = PgArguments::default();
        let mut placeholder_idx = 1;

        let select_columns = columns.iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        sql_query_parts.push(format!("SELECT {} FROM \"{}\"", select_columns, table));

        let mut where_clauses: Vec<String> = Vec::new();
        for condition in &self.conditions {
            let mut current_condition_sql = format!("\"{}\" {}", condition.column, condition.operator);
            if let Some(value) = &condition.value {
                value.add_to_args(&mut arguments)?;
                if !condition.operator.contains('$') {
                    current_condition_sql.push_str(&format!(" ${}", placeholder_idx));
                }
                placeholder_idx += 1;
            }
            where_clauses.push(current_condition_sql);
        }

        if !where_clauses.is_empty() {
            sql_query_parts.push(format!("WHERE {}", where_clauses.join(" AND ")));
        }

        if !self.order_by.is_empty() {
            let order_clauses: Vec<String> = self.order_by.iter()
                .map(|&(col, dir)| format!("\"{}\" {}", col, dir.as_sql()))
                .collect();
            sql_query_parts.push(format!("ORDER BY {}", order_clauses.join(", ")));
        }

        if let Some(limit_val) = self.limit {
            arguments.add(limit_val).map_err(SqlxError::Encode)?;
            sql_query_parts.push(format!("LIMIT ${}", placeholder_idx));
            placeholder_idx += 1;
        }

        if let Some(offset_val) = self.offset {
            arguments.add(offset_val).map_err(SqlxError::Encode)?;
            sql_query_parts.push(format!("OFFSET ${}", placeholder_idx));
        }

        Ok((sql_query_parts.join(" "), arguments))
    }
}

/// Trait for finding records based on dynamic filter criteria.
#[async_trait::async_trait]
pub trait SqlxFilterQuery: SqlxSchema + Sized {
    async fn find_by_criteria<'e, E>(
        criteria: QueryCriteria,
        executor: E,
    ) -> Result<Vec<Self>, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send,
    {
        let (sql, arguments) = criteria.build_select(Self::TABLE_NAME, Self::COLUMNS)?;
        let rows = sqlx::query_as_with::<_, Self::Row, _>(&sql, arguments)
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().map(Self::from_row).collect())
    }

    /// Takes the first record matching `criteria`, adding `LIMIT 1` when the
    /// criteria carry no limit of their own.
    async fn find_one_by_criteria<'e, E>(
        mut criteria: QueryCriteria,
        executor: E,
    ) -> Result<Option<Self>, SqlxError>
    where
        E: Executor<'e, Database = Postgres> + Send,
        Self: Send,
    {
        if criteria.limit.is_none() {
            criteria = criteria.limit(1);
        };
        let mut results = Self::find_by_criteria(criteria, executor).await?;
        Ok(results.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Arguments;

    #[test]
    fn test_build_select_numbers_placeholders() -> Result<(), SqlxError> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("kind", "=", 1i16)
            .add_valued_filter("rarity", ">=", 2i16)
            .add_filter::<i16>("character_en", "IS NOT NULL", None)
            .order_by("name_en", OrderDirection::Asc)
            .limit(10)
            .offset(20);

        let (sql, args) = criteria.build_select("gacha_items", &["id", "name_en"])?;
        assert_eq!(
            sql,
            "SELECT \"id\", \"name_en\" FROM \"gacha_items\" \
             WHERE \"kind\" = $1 AND \"rarity\" >= $2 AND \"character_en\" IS NOT NULL \
             ORDER BY \"name_en\" ASC LIMIT $3 OFFSET $4"
        );
        assert_eq!(args.len(), 4);
        Ok(())
    }

    #[test]
    fn test_build_select_without_conditions() -> Result<(), SqlxError> {
        let (sql, args) = QueryCriteria::new().build_select("user_rate_ups", &["id"])?;
        assert_eq!(sql, "SELECT \"id\" FROM \"user_rate_ups\"");
        assert_eq!(args.len(), 0);
        Ok(())
    }

    #[test]
    fn test_operator_with_inline_placeholder() -> Result<(), SqlxError> {
        let (sql, _) = QueryCriteria::new()
            .add_valued_filter("user_id", "= lower($1)", "abc".to_string())
            .build_select("user_rate_ups", &["id"])?;
        assert_eq!(sql, "SELECT \"id\" FROM \"user_rate_ups\" WHERE \"user_id\" = lower($1)");
        Ok(())
    }
}
