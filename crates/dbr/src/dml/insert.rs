//! INSERT / REPLACE statement builder.

use super::select::Select;
use super::traits::Statement;
use super::{StatementKind, require};
use crate::build::{Assembler, BuildOptions, SqlWriter};
use crate::clause::{Conditions, write_row};
use crate::condition::{Condition, col};
use crate::error::{DbrError, DbrResult};
use crate::listener::{Listener, ListenerFn};
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Leading verb of an insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertVerb {
    #[default]
    Insert,
    InsertIgnore,
    Replace,
}

impl InsertVerb {
    fn keyword(self) -> &'static str {
        match self {
            InsertVerb::Insert => "INSERT INTO ",
            InsertVerb::InsertIgnore => "INSERT IGNORE INTO ",
            InsertVerb::Replace => "REPLACE INTO ",
        }
    }
}

#[derive(Clone, Default)]
struct Records(Vec<Arc<dyn Assembler>>);

impl fmt::Debug for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Records({})", self.0.len())
    }
}

/// INSERT statement builder.
///
/// Rows come from explicit values, from records (one row per record, values
/// taken from the record by column name), or from a sub-select. With none of
/// these, a single row of deferred placeholders is written so the text can be
/// prepared once and executed per record with
/// [`Statement::to_sql_record`].
#[derive(Debug, Clone)]
pub struct Insert {
    options: BuildOptions,
    verb: InsertVerb,
    table: String,
    columns: Vec<String>,
    /// Explicit value rows
    rows: Vec<Vec<Value>>,
    /// Records assembled into rows at build time
    records: Records,
    /// INSERT ... SELECT
    select: Option<Box<Select>>,
    /// ON DUPLICATE KEY UPDATE assignments
    on_duplicate: Conditions,
}

impl Insert {
    /// Create an INSERT into `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            options: BuildOptions::default(),
            verb: InsertVerb::Insert,
            table: table.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            records: Records::default(),
            select: None,
            on_duplicate: Conditions::new(),
        }
    }

    pub(crate) fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// INSERT IGNORE
    pub fn ignore(mut self) -> Self {
        self.verb = InsertVerb::InsertIgnore;
        self
    }

    /// REPLACE INTO
    pub fn replace(mut self) -> Self {
        self.verb = InsertVerb::Replace;
        self
    }

    /// Append columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append a row of values, in column order.
    pub fn values<T: Into<Value>>(mut self, row: impl IntoIterator<Item = T>) -> Self {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Add a column together with its value in the first row.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push(column.into());
        match self.rows.first_mut() {
            Some(row) => row.push(value.into()),
            None => self.rows.push(vec![value.into()]),
        }
        self
    }

    /// Add a column whose value is `value` serialized as JSON.
    pub fn set_json<T: Serialize + ?Sized>(
        self,
        column: impl Into<String>,
        value: &T,
    ) -> DbrResult<Self> {
        Ok(self.set(column, serde_json::to_value(value)?))
    }

    /// Append one row assembled from `record`.
    pub fn record(mut self, record: impl Assembler + 'static) -> Self {
        self.records.0.push(Arc::new(record));
        self
    }

    /// Append a shared record.
    pub fn record_arc(mut self, record: Arc<dyn Assembler>) -> Self {
        self.records.0.push(record);
        self
    }

    /// INSERT ... SELECT
    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(Box::new(select));
        self
    }

    /// On duplicate key, overwrite `columns` with the inserted values:
    /// `col=VALUES(col)`.
    pub fn on_duplicate_key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on_duplicate.extend(columns.into_iter().map(col));
        self
    }

    /// Add one ON DUPLICATE KEY UPDATE assignment, e.g.
    /// `col("hits").raw("hits + 1")` or `col("name").str("x")`.
    pub fn on_duplicate_key(mut self, assignment: Condition) -> Self {
        self.on_duplicate.push(assignment);
        self
    }

    fn write_rows(&self, w: &mut SqlWriter) -> DbrResult<()> {
        w.push(" VALUES ");
        let mut first = true;
        for row in &self.rows {
            if row.len() != self.columns.len() {
                return Err(DbrError::configuration(format!(
                    "{}: row has {} values for {} columns",
                    Self::KIND,
                    row.len(),
                    self.columns.len()
                )));
            }
            if !first {
                w.push(",");
            }
            write_row(row, w);
            first = false;
        }
        for record in &self.records.0 {
            if !first {
                w.push(",");
            }
            w.push("(");
            w.assemble_row(&self.columns, record.as_ref())?;
            w.push(")");
            first = false;
        }
        if first {
            // Prepared form: one row filled per record at execution time.
            w.push("(");
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    w.push(",");
                }
                w.reserve(column);
            }
            w.push(")");
        }
        Ok(())
    }
}

impl Statement for Insert {
    const KIND: StatementKind = StatementKind::Insert;

    fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut BuildOptions {
        &mut self.options
    }

    fn pick_listener(listener: &Listener) -> Option<&ListenerFn<Self>> {
        match listener {
            Listener::Insert(f) => Some(f),
            _ => None,
        }
    }

    fn write_sql(&self, w: &mut SqlWriter) -> DbrResult<()> {
        require(!self.table.is_empty(), Self::KIND, "no table specified")?;
        require(
            !self.columns.is_empty() || self.select.is_some(),
            Self::KIND,
            "no columns specified",
        )?;

        w.push(self.verb.keyword());
        w.push_ident(&self.table);
        if !self.columns.is_empty() {
            w.push(" (");
            w.push_ident_list(&self.columns, ",");
            w.push(")");
        }

        match &self.select {
            Some(select) => {
                w.push(" ");
                select.write_sql(w)?;
            }
            None => self.write_rows(w)?,
        }

        if !self.on_duplicate.is_empty() {
            w.push(" ON DUPLICATE KEY UPDATE ");
            self.on_duplicate.write_on_duplicate(w)?;
        }
        Ok(())
    }
}
