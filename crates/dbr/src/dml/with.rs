//! WITH (common table expression) statement builder.

use super::select::Select;
use super::traits::Statement;
use super::union::Union;
use super::{StatementKind, require};
use crate::build::{BuildOptions, SqlWriter};
use crate::error::DbrResult;

/// Body of a CTE or the final query of a WITH statement.
#[derive(Debug, Clone)]
pub enum Query {
    Select(Box<Select>),
    Union(Box<Union>),
}

impl Query {
    fn write_sql(&self, w: &mut SqlWriter) -> DbrResult<()> {
        match self {
            Query::Select(select) => select.write_sql(w),
            Query::Union(union) => union.write_sql(w),
        }
    }
}

impl From<Select> for Query {
    fn from(select: Select) -> Self {
        Query::Select(Box::new(select))
    }
}

impl From<Union> for Query {
    fn from(union: Union) -> Self {
        Query::Union(Box::new(union))
    }
}

/// One named CTE.
#[derive(Debug, Clone)]
pub struct Cte {
    name: String,
    /// Optional column list
    columns: Vec<String>,
    body: Query,
}

/// `WITH [RECURSIVE] name (cols) AS (...), ... <query>`
#[derive(Debug, Clone, Default)]
pub struct With {
    options: BuildOptions,
    recursive: bool,
    ctes: Vec<Cte>,
    query: Option<Query>,
}

impl With {
    /// Create an empty WITH statement.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// WITH RECURSIVE
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Add a CTE.
    pub fn cte(mut self, name: impl Into<String>, body: impl Into<Query>) -> Self {
        self.ctes.push(Cte {
            name: name.into(),
            columns: Vec::new(),
            body: body.into(),
        });
        self
    }

    /// Add a CTE with an explicit column list.
    pub fn cte_columns<I, S>(mut self, name: impl Into<String>, columns: I, body: impl Into<Query>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ctes.push(Cte {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            body: body.into(),
        });
        self
    }

    /// Set the final query.
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }
}

impl Statement for With {
    const KIND: StatementKind = StatementKind::With;

    fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbrResult<()> {
        require(!self.ctes.is_empty(), Self::KIND, "no common table expressions")?;
        let Some(query) = &self.query else {
            return Err(crate::error::DbrError::configuration(format!(
                "{}: no final query",
                Self::KIND
            )));
        };

        w.push(if self.recursive { "WITH RECURSIVE " } else { "WITH " });
        for (i, cte) in self.ctes.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_ident(&cte.name);
            if !cte.columns.is_empty() {
                w.push(" (");
                w.push_ident_list(&cte.columns, ",");
                w.push(")");
            }
            w.push(" AS (");
            cte.body.write_sql(w)?;
            w.push(")");
        }
        w.push(" ");
        query.write_sql(w)
    }
}
