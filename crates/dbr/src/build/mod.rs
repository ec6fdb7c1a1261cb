//! Statement serialization: SQL text and bound arguments in one traversal.
//!
//! Every builder writes itself into a [`SqlWriter`]. The writer has two sinks,
//! one for the SQL text and one for the argument list, and both are fed by the
//! same call (`bind`, `reserve`, ...), so the i-th `?` in the text always
//! corresponds to the i-th argument. Either sink can be switched off:
//!
//! - the text sink when the text comes from the build cache,
//! - the argument sink when only text is wanted (`to_sql_text`).
//!
//! Deferred fragments reserve a slot in the argument list that is filled later
//! by an [`Assembler`]; see [`assemble`].

pub mod assemble;
mod cache;
mod placeholder;

pub use assemble::{AssembledArgs, Assembler};
pub use cache::BuildCache;
pub use placeholder::{count_placeholders, interpolate};

use crate::dml::{Statement, StatementKind};
use crate::error::{DbrError, DbrResult};
use crate::ident::QuoteMode;
use crate::listener::Listeners;
use crate::log::{BuildEvent, Logger, NoopLogger};
use crate::value::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// What `to_sql()` produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// SQL with `?` placeholders plus the matching argument list.
    #[default]
    TextAndArgs,
    /// SQL with every argument rendered as a literal; the argument list is empty.
    Interpolate,
    /// SQL with placeholders only, for preparing a statement.
    TextOnly,
}

/// Per-statement serialization settings.
#[derive(Clone)]
pub struct BuildOptions {
    pub(crate) mode: BuildMode,
    pub(crate) cache: BuildCache,
    pub(crate) quote: QuoteMode,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) listeners: Listeners,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            mode: BuildMode::TextAndArgs,
            cache: BuildCache::default(),
            quote: QuoteMode::Minimal,
            logger: Arc::new(NoopLogger),
            listeners: Listeners::new(),
        }
    }
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("mode", &self.mode)
            .field("cache", &self.cache)
            .field("quote", &self.quote)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl BuildOptions {
    /// Current serialization mode.
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Identifier quoting mode.
    pub fn quote_mode(&self) -> QuoteMode {
        self.quote
    }

    /// The build cache of this statement.
    pub fn cache(&self) -> &BuildCache {
        &self.cache
    }
}

/// A slot in the argument list reserved for a deferred value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeferredSlot {
    pub index: usize,
    pub column: String,
}

/// Output of one traversal.
pub(crate) struct Written {
    pub sql: Option<String>,
    pub args: Option<Vec<Value>>,
    pub deferred: Vec<DeferredSlot>,
    pub slots: usize,
}

/// Sink for SQL text and bound arguments.
///
/// Builders write through this type only; it keeps placeholders and
/// arguments in lock-step.
pub struct SqlWriter {
    kind: StatementKind,
    quote: QuoteMode,
    sql: Option<String>,
    args: Option<Vec<Value>>,
    deferred: Vec<DeferredSlot>,
    slots: usize,
}

impl SqlWriter {
    pub(crate) fn new(kind: StatementKind, quote: QuoteMode, text: bool, args: bool) -> Self {
        Self {
            kind,
            quote,
            sql: text.then(|| String::with_capacity(128)),
            args: args.then(Vec::new),
            deferred: Vec::new(),
            slots: 0,
        }
    }

    /// Kind of the top-level statement being written.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Number of argument slots emitted so far.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Append raw SQL.
    pub fn push(&mut self, s: &str) {
        if let Some(out) = self.sql.as_mut() {
            out.push_str(s);
        }
    }

    /// Append a (possibly dotted) identifier, quoted per the quote mode.
    pub fn push_ident(&mut self, name: &str) {
        let quote = self.quote;
        if let Some(out) = self.sql.as_mut() {
            quote.write_ident(out, name);
        }
    }

    /// Append a column or table reference (aliases and raw expressions allowed).
    pub fn push_column(&mut self, name: &str) {
        let quote = self.quote;
        if let Some(out) = self.sql.as_mut() {
            quote.write_column(out, name);
        }
    }

    /// Append a comma separated list of identifiers.
    pub(crate) fn push_ident_list(&mut self, names: &[String], sep: &str) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            self.push_ident(name);
        }
    }

    /// Append a `?` placeholder bound to `value`.
    pub fn bind(&mut self, value: &Value) {
        self.push("?");
        if let Some(args) = self.args.as_mut() {
            args.push(value.clone());
        }
        self.slots += 1;
    }

    /// Append `?,?,...` bound to `values`.
    pub fn bind_list(&mut self, values: &[Value]) {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.push(",");
            }
            self.bind(value);
        }
    }

    /// Append raw SQL carrying its own `?` placeholders and bind `values` to them.
    pub fn bind_raw(&mut self, sql: &str, values: &[Value]) -> DbrResult<()> {
        let placeholders = count_placeholders(sql);
        if placeholders != values.len() {
            return Err(DbrError::ArgumentCountMismatch {
                placeholders,
                args: values.len(),
            });
        }
        self.push(sql);
        if let Some(args) = self.args.as_mut() {
            args.extend(values.iter().cloned());
        }
        self.slots += values.len();
        Ok(())
    }

    /// Append a `?` whose value is supplied later for `column`.
    pub(crate) fn reserve(&mut self, column: &str) {
        self.push("?");
        self.reserve_inline(column);
    }

    /// Reserve a slot for a placeholder already present in raw SQL.
    pub(crate) fn reserve_inline(&mut self, column: &str) {
        if let Some(args) = self.args.as_mut() {
            args.push(Value::Null);
        }
        self.deferred.push(DeferredSlot {
            index: self.slots,
            column: column.to_string(),
        });
        self.slots += 1;
    }

    /// Write one `?,?,...` row for `columns` and fill it from `record` right away.
    pub(crate) fn assemble_row(
        &mut self,
        columns: &[String],
        record: &dyn Assembler,
    ) -> DbrResult<()> {
        let start = self.deferred.len();
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.push(",");
            }
            self.reserve(column);
        }
        let row: Vec<DeferredSlot> = self.deferred.drain(start..).collect();
        if let Some(args) = self.args.as_mut() {
            assemble::splice(self.kind, args, &row, record)?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Written {
        Written {
            sql: self.sql,
            args: self.args,
            deferred: self.deferred,
            slots: self.slots,
        }
    }
}

/// Serialize `stmt` in `mode`, splicing deferred values from `record`.
pub(crate) fn render<S: Statement>(
    stmt: &S,
    mode: BuildMode,
    record: Option<&dyn Assembler>,
) -> DbrResult<(String, Vec<Value>)> {
    let opts = stmt.options();
    let working: Cow<'_, S> = if opts.listeners.is_empty() {
        Cow::Borrowed(stmt)
    } else {
        let mut copy = stmt.clone();
        opts.listeners.dispatch(&mut copy)?;
        Cow::Owned(copy)
    };

    let cached = if opts.cache.is_enabled() {
        opts.cache.entry()
    } else {
        None
    };
    let collect_args = mode != BuildMode::TextOnly;
    let mut writer = SqlWriter::new(S::KIND, opts.quote, cached.is_none(), collect_args);
    working.write_sql(&mut writer)?;
    let written = writer.finish();

    let sql = match cached {
        Some((text, slots)) => {
            // The statement changed shape after the text was cached.
            if slots != written.slots {
                return Err(DbrError::ArgumentCountMismatch {
                    placeholders: slots,
                    args: written.slots,
                });
            }
            text.to_string()
        }
        None => {
            let text = written.sql.unwrap_or_default();
            let placeholders = count_placeholders(&text);
            if placeholders != written.slots {
                return Err(DbrError::ArgumentCountMismatch {
                    placeholders,
                    args: written.slots,
                });
            }
            if opts.cache.is_enabled() {
                opts.cache.store(text.clone(), written.slots);
            }
            text
        }
    };

    let mut event = BuildEvent {
        kind: S::KIND,
        sql: &sql,
        arg_count: 0,
        deferred: written.deferred.len(),
        cached: cached.is_some(),
        interpolated: false,
    };

    if mode == BuildMode::TextOnly {
        opts.logger.log(&event);
        return Ok((sql, Vec::new()));
    }

    let mut args = written.args.unwrap_or_default();
    if !written.deferred.is_empty() {
        let record = record.ok_or_else(|| {
            DbrError::configuration(format!(
                "{}: {} deferred argument(s) but no record was supplied",
                S::KIND,
                written.deferred.len()
            ))
        })?;
        assemble::splice(S::KIND, &mut args, &written.deferred, record)?;
    }
    event.arg_count = args.len();

    if mode == BuildMode::Interpolate {
        let literal = interpolate(&sql, &args)?;
        event.sql = &literal;
        event.arg_count = 0;
        event.interpolated = true;
        opts.logger.log(&event);
        return Ok((literal, Vec::new()));
    }

    opts.logger.log(&event);
    Ok((sql, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_args_stay_in_step() {
        let mut w = SqlWriter::new(StatementKind::Select, QuoteMode::Minimal, true, true);
        w.push("a = ");
        w.bind(&Value::Int(1));
        w.push(" AND b IN (");
        w.bind_list(&[Value::Int(2), Value::Int(3)]);
        w.push(")");
        let written = w.finish();
        assert_eq!(written.sql.as_deref(), Some("a = ? AND b IN (?,?)"));
        assert_eq!(
            written.args,
            Some(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(written.slots, 3);
    }

    #[test]
    fn disabled_text_sink_still_collects() {
        let mut w = SqlWriter::new(StatementKind::Select, QuoteMode::Minimal, false, true);
        w.push("ignored ");
        w.bind(&Value::from("x"));
        let written = w.finish();
        assert!(written.sql.is_none());
        assert_eq!(written.args, Some(vec![Value::from("x")]));
    }

    #[test]
    fn reserve_records_index() {
        let mut w = SqlWriter::new(StatementKind::Update, QuoteMode::Minimal, true, true);
        w.bind(&Value::Int(1));
        w.reserve("email");
        w.bind(&Value::Int(2));
        let written = w.finish();
        assert_eq!(written.sql.as_deref(), Some("???"));
        assert_eq!(
            written.deferred,
            vec![DeferredSlot {
                index: 1,
                column: "email".into()
            }]
        );
        assert_eq!(written.args.map(|a| a.len()), Some(3));
    }

    #[test]
    fn bind_raw_checks_placeholder_count() {
        let mut w = SqlWriter::new(StatementKind::Select, QuoteMode::Minimal, true, true);
        let err = w.bind_raw("a = ? OR b = ?", &[Value::Int(1)]).unwrap_err();
        assert!(err.is_argument_count_mismatch());
    }
}
