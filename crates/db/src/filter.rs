//! Dynamic `WHERE` clause assembly for filtered list queries.
//!
//! Conditions are appended with positional `$n` parameters; the collected
//! [`BindValue`]s are bound in the same order by [`Filter::bind`]. List
//! queries then append `LIMIT ${next_index}`.

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;
use tnc_core::search::like_pattern;
use tnc_core::types::{Date, DbId, Timestamp};

/// A value bound to a positional parameter.
#[derive(Debug, Clone)]
pub enum BindValue {
    BigInt(i64),
    Int(i32),
    Text(String),
    Bool(bool),
    Date(Date),
    Timestamp(Timestamp),
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Date> for BindValue {
    fn from(v: Date) -> Self {
        Self::Date(v)
    }
}

impl From<Timestamp> for BindValue {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v)
    }
}

/// Accumulated conditions and their bind values.
#[derive(Debug, Default)]
pub struct Filter {
    conditions: Vec<String>,
    values: Vec<BindValue>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next positional parameter.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    fn push(&mut self, condition: String, value: BindValue) -> &mut Self {
        self.conditions.push(condition);
        self.values.push(value);
        self
    }

    /// `column = $n` when `value` is present.
    pub fn eq<V: Into<BindValue>>(&mut self, column: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            let idx = self.next_index();
            self.push(format!("{column} = ${idx}"), v.into());
        }
        self
    }

    /// `column >= $n` when `value` is present.
    pub fn gte<V: Into<BindValue>>(&mut self, column: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            let idx = self.next_index();
            self.push(format!("{column} >= ${idx}"), v.into());
        }
        self
    }

    /// `column <= $n` when `value` is present.
    pub fn lte<V: Into<BindValue>>(&mut self, column: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            let idx = self.next_index();
            self.push(format!("{column} <= ${idx}"), v.into());
        }
        self
    }

    /// `$n = ANY(column)` on a `TEXT[]` column when `value` is non-blank.
    pub fn array_contains(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            let idx = self.next_index();
            self.push(format!("${idx} = ANY({column})"), v.into());
        }
        self
    }

    /// Case-insensitive substring match over any of `columns`.
    pub fn text_search(&mut self, columns: &[&str], text: Option<&str>) -> &mut Self {
        if let Some(pattern) = text.and_then(like_pattern) {
            let idx = self.next_index();
            let ors: Vec<String> = columns
                .iter()
                .map(|c| format!("{c} ILIKE ${idx} ESCAPE '\\'"))
                .collect();
            self.push(format!("({})", ors.join(" OR ")), BindValue::Text(pattern));
        }
        self
    }

    /// Keyset cursor: rows strictly older than the last id of the previous page.
    pub fn before_id(&mut self, cursor: Option<DbId>) -> &mut Self {
        self.lt("id", cursor)
    }

    fn lt<V: Into<BindValue>>(&mut self, column: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            let idx = self.next_index();
            self.push(format!("{column} < ${idx}"), v.into());
        }
        self
    }

    /// `WHERE a AND b ...`, or an empty string with no conditions.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Bind the collected values to a `query_as`.
    pub fn bind<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for val in &self.values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Int(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Bool(v) => q.bind(*v),
                BindValue::Date(v) => q.bind(*v),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q
    }
}
