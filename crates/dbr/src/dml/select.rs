//! SELECT statement builder.

use super::traits::Statement;
use super::{OrderBy, StatementKind, require, write_limit_offset, write_order_by};
use crate::build::{BuildOptions, SqlWriter};
use crate::clause::Conditions;
use crate::condition::Condition;
use crate::error::DbrResult;
use crate::listener::{Listener, ListenerFn};

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => " INNER JOIN ",
            JoinKind::Left => " LEFT JOIN ",
            JoinKind::Right => " RIGHT JOIN ",
            JoinKind::Cross => " CROSS JOIN ",
        }
    }
}

/// One JOIN clause.
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    /// Table, optionally with ` AS alias`
    table: String,
    /// ON fragments, or a single USING fragment
    on: Conditions,
}

/// Row locking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    ForUpdate,
    ShareMode,
}

#[derive(Debug, Clone)]
enum Source {
    Table(String),
    Sub(Box<Select>, String),
}

/// SELECT statement builder.
#[derive(Debug, Clone, Default)]
pub struct Select {
    options: BuildOptions,
    /// SELECT DISTINCT
    distinct: bool,
    /// Column list (names, `expr AS alias`, `*`)
    columns: Vec<String>,
    /// FROM table or sub-select
    from: Option<Source>,
    /// JOIN clauses
    joins: Vec<Join>,
    /// WHERE fragments
    wheres: Conditions,
    /// GROUP BY columns
    group_by: Vec<String>,
    /// HAVING fragments
    havings: Conditions,
    /// ORDER BY items
    order_by: Vec<OrderBy>,
    /// LIMIT, written as a literal
    limit: Option<u64>,
    /// OFFSET, written as a literal
    offset: Option<u64>,
    lock: Option<LockMode>,
}

impl Select {
    /// Create an empty SELECT.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    // ==================== Columns ====================

    /// Append columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append one column.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Select `*`.
    pub fn star(self) -> Self {
        self.column("*")
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== FROM / JOIN ====================

    /// Set the FROM table, optionally written as `table AS alias`.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(Source::Table(table.into()));
        self
    }

    /// Set the FROM table with an alias.
    pub fn from_as(self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.from(format!("{} AS {}", table.into(), alias.into()))
    }

    /// Select from a sub-select: `FROM (SELECT ...) AS alias`.
    pub fn from_sub(mut self, sub: Select, alias: impl Into<String>) -> Self {
        self.from = Some(Source::Sub(Box::new(sub), alias.into()));
        self
    }

    /// Add a join of any kind.
    pub fn join(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        on: impl IntoIterator<Item = Condition>,
    ) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: on.into_iter().collect(),
        });
        self
    }

    /// Add INNER JOIN.
    pub fn inner_join(
        self,
        table: impl Into<String>,
        on: impl IntoIterator<Item = Condition>,
    ) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Add LEFT JOIN.
    pub fn left_join(
        self,
        table: impl Into<String>,
        on: impl IntoIterator<Item = Condition>,
    ) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    /// Add RIGHT JOIN.
    pub fn right_join(
        self,
        table: impl Into<String>,
        on: impl IntoIterator<Item = Condition>,
    ) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    /// Add CROSS JOIN.
    pub fn cross_join(self, table: impl Into<String>) -> Self {
        self.join(JoinKind::Cross, table, Vec::<Condition>::new())
    }

    // ==================== WHERE / GROUP BY / HAVING ====================

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

    /// Add GROUP BY columns.
    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Add a HAVING fragment.
    pub fn having(mut self, condition: Condition) -> Self {
        self.havings.push(condition);
        self
    }

    // ==================== ORDER BY / LIMIT ====================

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

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1. The offset saturates at `u64::MAX`.
    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        let p = page.max(1);
        let size = per_page.max(1);
        self.limit = Some(size);
        self.offset = Some((p - 1).saturating_mul(size));
        self
    }

    /// Append `FOR UPDATE`.
    pub fn for_update(mut self) -> Self {
        self.lock = Some(LockMode::ForUpdate);
        self
    }

    /// Append `LOCK IN SHARE MODE`.
    pub fn lock_in_share_mode(mut self) -> Self {
        self.lock = Some(LockMode::ShareMode);
        self
    }

    fn write_join(join: &Join, w: &mut SqlWriter) -> DbrResult<()> {
        w.push(join.kind.keyword());
        w.push_column(&join.table);
        if let Some(columns) = join.on.using_columns() {
            require(
                !columns.is_empty(),
                Self::KIND,
                "USING needs at least one column",
            )?;
            w.push(" USING (");
            w.push_ident_list(columns, ",");
            w.push(")");
            return Ok(());
        }
        join.on.write_predicates(" ON ", w)
    }
}

impl Statement for Select {
    const KIND: StatementKind = StatementKind::Select;

    fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    fn pick_listener(listener: &Listener) -> Option<&ListenerFn<Self>> {
        match listener {
            Listener::Select(f) => Some(f),
            _ => None,
        }
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbrResult<()> {
        require(!self.columns.is_empty(), Self::KIND, "no columns specified")?;
        let Some(from) = &self.from else {
            return Err(crate::error::DbrError::configuration(format!(
                "{}: no table specified",
                Self::KIND
            )));
        };

        w.push("SELECT ");
        if self.distinct {
            w.push("DISTINCT ");
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_column(column);
        }

        w.push(" FROM ");
        match from {
            Source::Table(table) => w.push_column(table),
            Source::Sub(sub, alias) => {
                w.push("(");
                sub.write_sql(w)?;
                w.push(") AS ");
                w.push_ident(alias);
            }
        }

        for join in &self.joins {
            Self::write_join(join, w)?;
        }

        self.wheres.write_predicates(" WHERE ", w)?;

        if !self.group_by.is_empty() {
            w.push(" GROUP BY ");
            for (i, column) in self.group_by.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                w.push_column(column);
            }
        }

        self.havings.write_predicates(" HAVING ", w)?;
        write_order_by(&self.order_by, w);
        write_limit_offset(self.limit, self.offset, w);

        match self.lock {
            Some(LockMode::ForUpdate) => w.push(" FOR UPDATE"),
            Some(LockMode::ShareMode) => w.push(" LOCK IN SHARE MODE"),
            None => {}
        }
        Ok(())
    }
}
