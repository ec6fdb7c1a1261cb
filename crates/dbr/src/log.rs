//! Build event logging.
//!
//! Every successful `to_sql*` call reports a [`BuildEvent`] to the statement's
//! [`Logger`]. The default logger discards events; [`TracingLogger`] (feature
//! `tracing`) forwards them to `tracing` under the `dbr.sql` target.

use crate::dml::StatementKind;

/// What a single build produced.
#[derive(Debug, Clone, Copy)]
pub struct BuildEvent<'a> {
    /// Kind of the statement built.
    pub kind: StatementKind,
    /// Final SQL text (interpolated when `interpolated` is set).
    pub sql: &'a str,
    /// Number of arguments returned alongside the text.
    pub arg_count: usize,
    /// Number of values that came from a record.
    pub deferred: usize,
    /// The text came from the build cache.
    pub cached: bool,
    /// Arguments were rendered into the text.
    pub interpolated: bool,
}

/// Receives build events.
pub trait Logger: Send + Sync {
    fn log(&self, event: &BuildEvent<'_>);
}

/// A logger that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _event: &BuildEvent<'_>) {}
}

impl<F> Logger for F
where
    F: Fn(&BuildEvent<'_>) + Send + Sync,
{
    fn log(&self, event: &BuildEvent<'_>) {
        self(event)
    }
}

/// Cut `sql` to at most `max_bytes`, on a char boundary.
#[cfg(any(feature = "tracing", test))]
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(feature = "tracing")]
pub use self::tracing_logger::TracingLogger;

#[cfg(feature = "tracing")]
mod tracing_logger {
    use super::{BuildEvent, Logger, truncate_sql_bytes};
    use std::borrow::Cow;
    use tracing::Level;

    /// Forwards build events to `tracing` on the `dbr.sql` target.
    ///
    /// Defaults: level DEBUG, SQL cut at 200 bytes, cached builds logged.
    #[derive(Debug, Clone)]
    pub struct TracingLogger {
        level: Level,
        max_sql_bytes: Option<usize>,
        skip_cached: bool,
    }

    impl Default for TracingLogger {
        fn default() -> Self {
            Self {
                level: Level::DEBUG,
                max_sql_bytes: Some(200),
                skip_cached: false,
            }
        }
    }

    impl TracingLogger {
        pub fn new() -> Self {
            Self::default()
        }

        /// Emit events at `level`.
        pub fn at(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Cut the logged SQL to `max` bytes; `None` logs it whole.
        pub fn max_sql_bytes(mut self, max: Option<usize>) -> Self {
            self.max_sql_bytes = max;
            self
        }

        /// Stay quiet for builds whose text came from the build cache.
        pub fn skip_cached(mut self, skip: bool) -> Self {
            self.skip_cached = skip;
            self
        }

        fn display_sql<'e>(&self, sql: &'e str) -> Cow<'e, str> {
            match self.max_sql_bytes {
                Some(max) if sql.len() > max => {
                    Cow::Owned(format!("{}...", truncate_sql_bytes(sql, max)))
                }
                _ => Cow::Borrowed(sql),
            }
        }
    }

    impl Logger for TracingLogger {
        fn log(&self, event: &BuildEvent<'_>) {
            if self.skip_cached && event.cached {
                return;
            }
            let sql = self.display_sql(event.sql);
            macro_rules! emit {
                ($mac:ident) => {
                    tracing::$mac!(
                        target: "dbr.sql",
                        kind = event.kind.as_str(),
                        args = event.arg_count,
                        deferred = event.deferred,
                        cached = event.cached,
                        interpolated = event.interpolated,
                        "{sql}"
                    )
                };
            }
            match self.level {
                Level::ERROR => emit!(error),
                Level::WARN => emit!(warn),
                Level::INFO => emit!(info),
                Level::DEBUG => emit!(debug),
                Level::TRACE => emit!(trace),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn long_sql_is_cut() {
            let logger = TracingLogger::new().max_sql_bytes(Some(6));
            assert_eq!(logger.display_sql("SELECT a FROM t"), "SELECT...");
            assert!(matches!(logger.display_sql("SELECT"), Cow::Borrowed(_)));

            let whole = logger.max_sql_bytes(None);
            assert_eq!(whole.display_sql("SELECT a FROM t"), "SELECT a FROM t");
        }

        #[test]
        fn builder_sets_level_and_cached_filter() {
            let logger = TracingLogger::new().at(Level::INFO).skip_cached(true);
            assert_eq!(logger.level, Level::INFO);
            assert!(logger.skip_cached);
            assert!(!TracingLogger::default().skip_cached);
        }
    }
}
