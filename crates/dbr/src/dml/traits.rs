//! The trait shared by every statement builder.

use super::StatementKind;
use crate::build::{Assembler, BuildMode, BuildOptions, SqlWriter, render};
use crate::error::DbrResult;
use crate::executor::{ExecResult, Executor};
use crate::ident::QuoteMode;
use crate::listener::{Listener, ListenerFn, Listeners};
use crate::log::Logger;
use crate::value::Value;
use std::sync::Arc;

/// A buildable SQL statement.
///
/// Implementors only describe how they are written ([`Statement::write_sql`]);
/// serialization modes, the build cache, listeners and logging are shared.
pub trait Statement: Clone + Send + Sync {
    /// Kind reported in errors and log events.
    const KIND: StatementKind;

    /// Serialization settings of this statement.
    fn options(&self) -> &BuildOptions;

    /// Mutable serialization settings of this statement.
    fn options_mut(&mut self) -> &mut BuildOptions;

    /// Write the statement text and arguments.
    ///
    /// Nested statements (sub-selects, union members, CTE bodies) are written
    /// into the same writer; their own options are ignored.
    fn write_sql(&self, w: &mut SqlWriter) -> DbrResult<()>;

    /// The callback in `listener` that applies to this statement type.
    fn pick_listener(listener: &Listener) -> Option<&ListenerFn<Self>> {
        let _ = listener;
        None
    }

    /// Kind of this statement.
    fn kind(&self) -> StatementKind {
        Self::KIND
    }

    /// Build the SQL text and its arguments in the configured mode.
    ///
    /// Interpolated and text-only builds return an empty argument list.
    fn to_sql(&self) -> DbrResult<(String, Vec<Value>)> {
        render(self, self.options().mode, None)
    }

    /// Like [`Statement::to_sql`], filling deferred values from `record`.
    fn to_sql_record(&self, record: &dyn Assembler) -> DbrResult<(String, Vec<Value>)> {
        render(self, self.options().mode, Some(record))
    }

    /// Build only the SQL text with placeholders, for preparing.
    fn to_sql_text(&self) -> DbrResult<String> {
        render(self, BuildMode::TextOnly, None).map(|(sql, _)| sql)
    }

    // ==================== Toggles ====================

    /// Render arguments as literals instead of placeholders.
    fn interpolate(mut self) -> Self {
        self.options_mut().mode = BuildMode::Interpolate;
        self
    }

    /// Only produce SQL text from `to_sql()`.
    fn text_only(mut self) -> Self {
        self.options_mut().mode = BuildMode::TextOnly;
        self
    }

    /// Enable or disable the build cache.
    fn build_cache(mut self, enabled: bool) -> Self {
        self.options_mut().cache.set_enabled(enabled);
        self
    }

    /// Forget cached text after a structural change.
    fn clear_build_cache(&mut self) {
        self.options_mut().cache.clear();
    }

    /// Report build events to `logger`.
    fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.options_mut().logger = Arc::new(logger);
        self
    }

    /// Replace the listeners run before serialization.
    fn with_listeners(mut self, listeners: Listeners) -> Self {
        self.options_mut().listeners = listeners;
        self
    }

    /// Set the identifier quoting mode.
    fn quote_mode(mut self, mode: QuoteMode) -> Self {
        self.options_mut().quote = mode;
        self.options_mut().cache.clear();
        self
    }

    // ==================== Execution ====================

    /// Build and execute a statement that returns no rows.
    fn exec<E: Executor>(
        &self,
        executor: &E,
    ) -> impl std::future::Future<Output = DbrResult<ExecResult>> + Send {
        async move {
            let (sql, args) = self.to_sql()?;
            executor.exec(&sql, &args).await
        }
    }

    /// Build and execute once for `record`.
    fn exec_record<E: Executor>(
        &self,
        executor: &E,
        record: &dyn Assembler,
    ) -> impl std::future::Future<Output = DbrResult<ExecResult>> + Send {
        async move {
            let (sql, args) = self.to_sql_record(record)?;
            executor.exec(&sql, &args).await
        }
    }

    /// Build and run a query.
    fn query<E: Executor>(
        &self,
        executor: &E,
    ) -> impl std::future::Future<Output = DbrResult<E::Rows>> + Send {
        async move {
            let (sql, args) = self.to_sql()?;
            executor.query(&sql, &args).await
        }
    }

    /// Prepare the placeholder text of this statement.
    fn prepare<E: Executor>(
        &self,
        executor: &E,
    ) -> impl std::future::Future<Output = DbrResult<E::Prepared>> + Send {
        async move {
            let sql = self.to_sql_text()?;
            executor.prepare(&sql).await
        }
    }
}
