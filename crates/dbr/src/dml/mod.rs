//! Statement builders.
//!
//! # Usage
//!
//! ```ignore
//! use dbr::prelude::*;
//!
//! // SELECT a, b FROM c WHERE (a = ?) AND (b=c)
//! let (sql, args) = select(["a", "b"])
//!     .from("c")
//!     .filter(col("a").int(111))
//!     .filter(expr("b=c"))
//!     .to_sql()?;
//!
//! // INSERT INTO users (name,email) VALUES (?,?)
//! let (sql, args) = insert_into("users")
//!     .columns(["name", "email"])
//!     .values(["ann", "ann@example.com"])
//!     .to_sql()?;
//!
//! // UPDATE users SET email=? WHERE (id = ?), email taken from each record
//! let stmt = update("users").set_deferred("email").filter(col("id").int(1));
//! let (sql, args) = stmt.to_sql_record(&record)?;
//! ```

mod delete;
mod insert;
mod select;
mod traits;
mod union;
mod update;
mod with;

pub use delete::Delete;
pub use insert::{Insert, InsertVerb};
pub use select::{Join, JoinKind, LockMode, Select};
pub use traits::Statement;
pub use union::Union;
pub use update::Update;
pub use with::{Cte, Query, With};

use crate::build::SqlWriter;
use crate::error::DbrResult;
use std::fmt;

/// Kind of a statement, reported in errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Union,
    With,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Union => "UNION",
            StatementKind::With => "WITH",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderBy {
    pub column: String,
    pub desc: bool,
}

/// Write ` ORDER BY a, b DESC`.
pub(crate) fn write_order_by(order_by: &[OrderBy], w: &mut SqlWriter) {
    if order_by.is_empty() {
        return;
    }
    w.push(" ORDER BY ");
    for (i, item) in order_by.iter().enumerate() {
        if i > 0 {
            w.push(", ");
        }
        w.push_column(&item.column);
        if item.desc {
            w.push(" DESC");
        }
    }
}

/// Write ` LIMIT n` and ` OFFSET m` as literals.
pub(crate) fn write_limit_offset(limit: Option<u64>, offset: Option<u64>, w: &mut SqlWriter) {
    if let Some(limit) = limit {
        w.push(" LIMIT ");
        w.push(&limit.to_string());
    }
    if let Some(offset) = offset {
        w.push(" OFFSET ");
        w.push(&offset.to_string());
    }
}

/// Fail with a configuration error naming the statement kind.
pub(crate) fn require(ok: bool, kind: StatementKind, what: &str) -> DbrResult<()> {
    if ok {
        Ok(())
    } else {
        Err(crate::error::DbrError::configuration(format!("{kind}: {what}")))
    }
}

/// Start a SELECT of `columns`.
pub fn select<I, S>(columns: I) -> Select
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Select::new().columns(columns)
}

/// Start an INSERT into `table`.
pub fn insert_into(table: impl Into<String>) -> Insert {
    Insert::new(table)
}

/// Start a REPLACE into `table`.
pub fn replace_into(table: impl Into<String>) -> Insert {
    Insert::new(table).replace()
}

/// Start an UPDATE of `table`.
pub fn update(table: impl Into<String>) -> Update {
    Update::new(table)
}

/// Start a DELETE from `table`.
pub fn delete_from(table: impl Into<String>) -> Delete {
    Delete::new(table)
}

/// Combine selects with UNION.
pub fn union(selects: impl IntoIterator<Item = Select>) -> Union {
    Union::new(selects)
}

/// Start a WITH statement with its first CTE.
pub fn with(name: impl Into<String>, body: impl Into<Query>) -> With {
    With::new().cte(name, body)
}
