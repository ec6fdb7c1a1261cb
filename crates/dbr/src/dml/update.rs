//! UPDATE statement builder.

use super::traits::Statement;
use super::{OrderBy, StatementKind, require, write_limit_offset, write_order_by};
use crate::build::{BuildOptions, SqlWriter};
use crate::clause::Conditions;
use crate::condition::{Condition, col, expr};
use crate::error::DbrResult;
use crate::listener::{Listener, ListenerFn};
use crate::value::Value;
use serde::Serialize;

/// UPDATE statement builder.
#[derive(Debug, Clone)]
pub struct Update {
    options: BuildOptions,
    table: String,
    /// SET assignments
    sets: Conditions,
    /// WHERE fragments
    wheres: Conditions,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
}

impl Update {
    /// Create an UPDATE of `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            options: BuildOptions::default(),
            table: table.into(),
            sets: Conditions::new(),
            wheres: Conditions::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub(crate) fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    // ==================== SET ====================

    /// SET column=? bound to `value`.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sets.push(col(column).value(value));
        self
    }

    /// SET column=? with `value` serialized as JSON.
    pub fn set_json<T: Serialize + ?Sized>(
        self,
        column: impl Into<String>,
        value: &T,
    ) -> DbrResult<Self> {
        Ok(self.set(column, serde_json::to_value(value)?))
    }

    /// SET column=<raw SQL>, e.g. `set_raw("hits", "hits + 1")`.
    pub fn set_raw(mut self, column: impl Into<String>, sql: impl Into<String>) -> Self {
        self.sets.push(col(column).raw(sql));
        self
    }

    /// SET column=<raw SQL with placeholders>.
    pub fn set_raw_args<T: Into<Value>>(
        mut self,
        column: impl Into<String>,
        sql: impl Into<String>,
        args: impl IntoIterator<Item = T>,
    ) -> Self {
        self.sets.push(col(column).raw_args(sql, args));
        self
    }

    /// SET a whole raw assignment, e.g. `set_expr("n = n + ?", [1])`.
    pub fn set_expr<T: Into<Value>>(
        mut self,
        sql: impl Into<String>,
        args: impl IntoIterator<Item = T>,
    ) -> Self {
        self.sets.push(expr(sql).values(args));
        self
    }

    /// SET column=? with the value taken from the record at build time.
    pub fn set_deferred(mut self, column: impl Into<String>) -> Self {
        self.sets.push(col(column).deferred());
        self
    }

    /// SET each of `columns` from the record.
    pub fn set_deferred_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sets
            .extend(columns.into_iter().map(|c| col(c).deferred()));
        self
    }

    /// Add any assignment fragment.
    pub fn assign(mut self, assignment: Condition) -> Self {
        self.sets.push(assignment);
        self
    }

    // ==================== WHERE / ORDER BY / LIMIT ====================

    /// Add a WHERE fragment.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.wheres.push(condition);
        self
    }

    /// Add several WHERE fragments.
    pub fn filters(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.wheres.extend(conditions);
        self
    }

    /// WHERE fragments, for listeners that adjust a statement in place.
    pub fn wheres_mut(&mut self) -> &mut Conditions {
        &mut self.wheres
    }

    /// SET assignments, for listeners that adjust a statement in place.
    pub fn sets_mut(&mut self) -> &mut Conditions {
        &mut self.sets
    }

    /// Add ORDER BY column ASC.
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            desc: false,
        });
        self
    }

    /// Add ORDER BY column DESC.
    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            desc: true,
        });
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }
}

impl Statement for Update {
    const KIND: StatementKind = StatementKind::Update;

    fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    fn pick_listener(listener: &Listener) -> Option<&ListenerFn<Self>> {
        match listener {
            Listener::Update(f) => Some(f),
            _ => None,
        }
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbrResult<()> {
        require(!self.table.is_empty(), Self::KIND, "no table specified")?;
        require(!self.sets.is_empty(), Self::KIND, "no SET clause specified")?;

        w.push("UPDATE ");
        w.push_column(&self.table);
        w.push(" SET ");
        self.sets.write_set(w)?;
        self.wheres.write_predicates(" WHERE ", w)?;
        write_order_by(&self.order_by, w);
        write_limit_offset(self.limit, None, w);
        Ok(())
    }
}
