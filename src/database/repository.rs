use sqlx::{self, postgres::PgRow, FromRow, PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, Page, Paginated};

/// Table-level reads shared by every resource in the PostgreSQL store.
/// Table and column names are compile-time constants, never request input.
pub struct Repository<T> {
    table_name: &'static str,
    key_column: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, key_column: &'static str, pool: PgPool) -> Self {
        Self {
            table_name,
            key_column,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_page(&self, filter: &Filter, page: Page) -> Result<Paginated<T>, DatabaseError> {
        let where_sql = filter.to_where_sql(1);
        let next = where_sql.params.len() + 1;
        let sql = format!(
            "SELECT * FROM \"{}\" {} ORDER BY created_at DESC, \"{}\" DESC LIMIT ${} OFFSET ${}",
            self.table_name,
            where_sql.query,
            self.key_column,
            next,
            next + 1
        );

        let mut q = sqlx::query_as::<_, T>(&sql);
        for p in where_sql.params.iter() {
            q = q.bind(p);
        }
        let items = q
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset()))
            .fetch_all(&self.pool)
            .await?;

        let total = self.count(filter).await?;
        Ok(Paginated { items, total })
    }

    pub async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        let where_sql = filter.to_where_sql(1);
        let sql = format!("SELECT COUNT(*) AS count FROM \"{}\" {}", self.table_name, where_sql.query);

        let mut q = sqlx::query(&sql);
        for p in where_sql.params.iter() {
            q = q.bind(p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    pub async fn select_by_key(&self, key: &str) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"{}\" = $1", self.table_name, self.key_column);
        let row = sqlx::query_as::<_, T>(&sql).bind(key).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn select_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"{}\" = $1", self.table_name, self.key_column);
        let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn select_by_column(&self, column: &'static str, value: &str) -> Result<Option<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM \"{}\" WHERE LOWER(\"{}\") = LOWER($1)",
            self.table_name, column
        );
        let row = sqlx::query_as::<_, T>(&sql).bind(value).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn select_latest(&self, limit: u32) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM \"{}\" ORDER BY created_at DESC, \"{}\" DESC LIMIT $1",
            self.table_name, self.key_column
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn delete_by_key(&self, key: &str) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", self.table_name, self.key_column);
        let result = sqlx::query(&sql).bind(key).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"{}\" = $1", self.table_name, self.key_column);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
