//! UNION statement builder.

use super::select::Select;
use super::traits::Statement;
use super::{OrderBy, StatementKind, require, write_limit_offset, write_order_by};
use crate::build::{BuildOptions, SqlWriter};
use crate::error::DbrResult;

/// `(SELECT ...) UNION [ALL] (SELECT ...)` with optional ordering and paging.
#[derive(Debug, Clone, Default)]
pub struct Union {
    options: BuildOptions,
    selects: Vec<Select>,
    /// UNION ALL instead of UNION
    all: bool,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Union {
    /// Combine `selects`.
    pub fn new(selects: impl IntoIterator<Item = Select>) -> Self {
        Self {
            selects: selects.into_iter().collect(),
            ..Self::default()
        }
    }

    pub(crate) fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Append another select.
    pub fn select(mut self, select: Select) -> Self {
        self.selects.push(select);
        self
    }

    /// Keep duplicates (UNION ALL).
    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }

    /// Add ORDER BY column ASC over the combined result.
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            desc: false,
        });
        self
    }

    /// Add ORDER BY column DESC over the combined result.
    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            desc: true,
        });
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }
}

impl Statement for Union {
    const KIND: StatementKind = StatementKind::Union;

    fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbrResult<()> {
        require(
            self.selects.len() >= 2,
            Self::KIND,
            "at least two selects are required",
        )?;

        let separator = if self.all { " UNION ALL " } else { " UNION " };
        for (i, select) in self.selects.iter().enumerate() {
            if i > 0 {
                w.push(separator);
            }
            w.push("(");
            select.write_sql(w)?;
            w.push(")");
        }
        write_order_by(&self.order_by, w);
        write_limit_offset(self.limit, self.offset, w);
        Ok(())
    }
}
