//! DELETE statement builder.

use super::traits::Statement;
use super::{OrderBy, StatementKind, require, write_limit_offset, write_order_by};
use crate::build::{BuildOptions, SqlWriter};
use crate::clause::Conditions;
use crate::condition::Condition;
use crate::error::DbrResult;
use crate::listener::{Listener, ListenerFn};

/// DELETE statement builder.
///
/// A DELETE without WHERE fragments fails to build unless
/// [`Delete::allow_delete_all`] was called.
#[derive(Debug, Clone)]
pub struct Delete {
    options: BuildOptions,
    table: String,
    /// WHERE fragments
    wheres: Conditions,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    /// Whether to allow DELETE without WHERE (dangerous!)
    allow_delete_all: bool,
}

impl Delete {
    /// Create a DELETE from `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            options: BuildOptions::default(),
            table: table.into(),
            wheres: Conditions::new(),
            order_by: Vec::new(),
            limit: None,
            allow_delete_all: false,
        }
    }

    pub(crate) fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Call this with `true` to allow deleting all rows.
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
        self
    }

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

impl Statement for Delete {
    const KIND: StatementKind = StatementKind::Delete;

    fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    fn pick_listener(listener: &Listener) -> Option<&ListenerFn<Self>> {
        match listener {
            Listener::Delete(f) => Some(f),
            _ => None,
        }
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbrResult<()> {
        require(!self.table.is_empty(), Self::KIND, "no table specified")?;
        require(
            !self.wheres.is_empty() || self.allow_delete_all,
            Self::KIND,
            "no WHERE clause; call allow_delete_all(true) to delete every row",
        )?;

        w.push("DELETE FROM ");
        w.push_column(&self.table);
        self.wheres.write_predicates(" WHERE ", w)?;
        write_order_by(&self.order_by, w);
        write_limit_offset(self.limit, None, w);
        Ok(())
    }
}
