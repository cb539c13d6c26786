//! Single lookup seam shared by every call site.
//!
//! `QueryLayer::find` is mode-agnostic; the SQL text it runs comes from the
//! [`QueryStrategy`] chosen at startup. `RawInterpolated` copies caller values
//! straight into the statement, `ParameterBound` sends them as bind
//! parameters. This is the whole injection surface of the service.

use std::fmt;
use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use crate::error::Result;

/// A row type that can be looked up through the query layer.
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    /// Table or join expression placed after `FROM`.
    const SOURCE: &'static str;
    /// Projection placed after `SELECT`.
    const COLUMNS: &'static str;
}

/// Conjunction of `column = value` clauses.
///
/// Columns are static identifiers owned by the code; only values carry caller
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<(&'static str, String)>,
}

impl Predicate {
    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            clauses: vec![(column, value.into())],
        }
    }

    pub fn and(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.clauses.push((column, value.into()));
        self
    }

    pub fn clauses(&self) -> &[(&'static str, String)] {
        &self.clauses
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub binds: Vec<String>,
}

pub trait QueryStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn build_select(&self, source: &str, columns: &str, predicate: &Predicate) -> BuiltQuery;
}

/// Builds the predicate by pasting values between single quotes. No escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawInterpolated;

impl QueryStrategy for RawInterpolated {
    fn name(&self) -> &'static str {
        "raw-interpolated"
    }

    fn build_select(&self, source: &str, columns: &str, predicate: &Predicate) -> BuiltQuery {
        let filter = predicate
            .clauses()
            .iter()
            .map(|(column, value)| format!("{column} = '{value}'"))
            .collect::<Vec<_>>()
            .join(" AND ");

        BuiltQuery {
            sql: format!("SELECT {columns} FROM {source} WHERE {filter}"),
            binds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterBound;

impl QueryStrategy for ParameterBound {
    fn name(&self) -> &'static str {
        "parameter-bound"
    }

    fn build_select(&self, source: &str, columns: &str, predicate: &Predicate) -> BuiltQuery {
        let filter = predicate
            .clauses()
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(" AND ");

        BuiltQuery {
            sql: format!("SELECT {columns} FROM {source} WHERE {filter}"),
            binds: predicate
                .clauses()
                .iter()
                .map(|(_, value)| value.clone())
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct QueryLayer {
    pool: SqlitePool,
    strategy: Arc<dyn QueryStrategy>,
}

impl QueryLayer {
    pub fn new(pool: SqlitePool, strategy: Arc<dyn QueryStrategy>) -> Self {
        Self { pool, strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// First row matching `predicate`, if any.
    pub async fn find<T: Record>(&self, predicate: &Predicate) -> Result<Option<T>> {
        let built = self.strategy.build_select(T::SOURCE, T::COLUMNS, predicate);
        log::debug!("[{}] {}", self.strategy.name(), built.sql);

        let mut query = sqlx::query_as::<_, T>(&built.sql);
        for value in &built.binds {
            query = query.bind(value.as_str());
        }

        Ok(query.fetch_optional(&self.pool).await?)
    }
}
