use crate::build::{BuildCache, BuildMode, BuildOptions};
use crate::dml::{Delete, Insert, Query, Select, Union, Update, With};
use crate::ident::QuoteMode;
use crate::listener::{Listener, Listeners};
use crate::log::{Logger, NoopLogger};
use std::fmt;
use std::sync::Arc;

/// Defaults applied to every statement created through it.
///
/// By default statements return placeholders plus arguments, the build cache
/// is off, identifiers are quoted only when needed and nothing is logged.
#[derive(Clone)]
pub struct Config {
    /// Interpolate arguments into the SQL text.
    pub interpolate: bool,
    /// Cache SQL text after the first build.
    pub build_cache: bool,
    /// Identifier quoting mode.
    pub quote: QuoteMode,
    /// Logger receiving build events.
    pub logger: Arc<dyn Logger>,
    /// Listeners run before serialization.
    pub listeners: Listeners,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpolate: false,
            build_cache: false,
            quote: QuoteMode::Minimal,
            logger: Arc::new(NoopLogger),
            listeners: Listeners::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("interpolate", &self.interpolate)
            .field("build_cache", &self.build_cache)
            .field("quote", &self.quote)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render arguments as literals by default.
    pub fn with_interpolation(mut self, enabled: bool) -> Self {
        self.interpolate = enabled;
        self
    }

    /// Turn the build cache on for new statements.
    pub fn with_build_cache(mut self, enabled: bool) -> Self {
        self.build_cache = enabled;
        self
    }

    /// Set the identifier quoting mode.
    pub fn with_quote_mode(mut self, mode: QuoteMode) -> Self {
        self.quote = mode;
        self
    }

    /// Report build events to `logger`.
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Append a named listener.
    pub fn with_listener(mut self, name: impl Into<String>, listener: Listener) -> Self {
        self.listeners = self.listeners.add(name, listener);
        self
    }

    /// Per-statement options derived from this configuration.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            mode: if self.interpolate {
                BuildMode::Interpolate
            } else {
                BuildMode::TextAndArgs
            },
            cache: if self.build_cache {
                BuildCache::enabled()
            } else {
                BuildCache::default()
            },
            quote: self.quote,
            logger: Arc::clone(&self.logger),
            listeners: self.listeners.clone(),
        }
    }

    // ==================== Statements ====================

    /// Start a SELECT of `columns`.
    pub fn select<I, S>(&self, columns: I) -> Select
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Select::new()
            .with_options(self.build_options())
            .columns(columns)
    }

    /// Start an INSERT into `table`.
    pub fn insert_into(&self, table: impl Into<String>) -> Insert {
        Insert::new(table).with_options(self.build_options())
    }

    /// Start an UPDATE of `table`.
    pub fn update(&self, table: impl Into<String>) -> Update {
        Update::new(table).with_options(self.build_options())
    }

    /// Start a DELETE from `table`.
    pub fn delete_from(&self, table: impl Into<String>) -> Delete {
        Delete::new(table).with_options(self.build_options())
    }

    /// Combine selects with UNION.
    pub fn union(&self, selects: impl IntoIterator<Item = Select>) -> Union {
        Union::new(selects).with_options(self.build_options())
    }

    /// Start a WITH statement with its first CTE.
    pub fn with(&self, name: impl Into<String>, body: impl Into<Query>) -> With {
        With::new()
            .with_options(self.build_options())
            .cte(name, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::col;
    use crate::dml::Statement;

    #[test]
    fn defaults_produce_placeholders() {
        let (sql, args) = Config::new()
            .select(["id"])
            .from("users")
            .filter(col("id").int(1))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT id FROM users WHERE (id = ?)");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn interpolation_and_quoting_carry_over() {
        let config = Config::new()
            .with_interpolation(true)
            .with_quote_mode(QuoteMode::Always);
        let (sql, args) = config
            .update("users")
            .set("name", "o'neil")
            .filter(col("id").int(9))
            .to_sql()
            .unwrap();
        assert_eq!(sql, r"UPDATE `users` SET `name`='o\'neil' WHERE (`id` = 9)");
        assert!(args.is_empty());
    }

    #[test]
    fn build_cache_is_enabled_per_statement() {
        let config = Config::new().with_build_cache(true);
        let stmt = config.delete_from("sessions").filter(col("id").int(1));
        assert!(stmt.options().cache().is_enabled());
        stmt.to_sql().unwrap();
        assert_eq!(
            stmt.options().cache().get(),
            Some("DELETE FROM sessions WHERE (id = ?)")
        );
    }
}
