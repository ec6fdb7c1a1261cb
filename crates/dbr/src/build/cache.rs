use std::sync::OnceLock;

/// Remembers the SQL text of a statement after its first build.
///
/// Only the text is cached. Arguments are collected on every build, so a
/// cached statement can be reused with new values as long as its structure
/// does not change. Structural changes after the first build must be
/// followed by [`BuildCache::clear`]; a build whose argument count no longer
/// matches the cached text fails instead of pairing them.
#[derive(Debug, Clone, Default)]
pub struct BuildCache {
    enabled: bool,
    /// SQL text and the number of argument slots it was built with
    sql: OnceLock<(String, usize)>,
}

impl BuildCache {
    pub(crate) fn enabled() -> Self {
        Self {
            enabled: true,
            sql: OnceLock::new(),
        }
    }

    /// Whether caching is turned on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The cached text, if a build has filled it.
    pub fn get(&self) -> Option<&str> {
        self.sql.get().map(|(sql, _)| sql.as_str())
    }

    /// The cached text together with its slot count.
    pub(crate) fn entry(&self) -> Option<(&str, usize)> {
        self.sql.get().map(|(sql, slots)| (sql.as_str(), *slots))
    }

    pub(crate) fn store(&self, sql: String, slots: usize) {
        // A concurrent build may have won; both produced the same text.
        let _ = self.sql.set((sql, slots));
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Drop the cached text so the next build walks the statement again.
    pub fn clear(&mut self) {
        self.sql = OnceLock::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_once() {
        let cache = BuildCache::enabled();
        assert!(cache.get().is_none());
        cache.store("SELECT 1".into(), 0);
        cache.store("SELECT 2".into(), 0);
        assert_eq!(cache.get(), Some("SELECT 1"));
        assert_eq!(cache.entry(), Some(("SELECT 1", 0)));
    }

    #[test]
    fn clear_and_disable() {
        let mut cache = BuildCache::enabled();
        cache.store("SELECT 1".into(), 0);
        cache.clear();
        assert!(cache.get().is_none());

        cache.store("SELECT 1".into(), 0);
        cache.set_enabled(false);
        assert!(!cache.is_enabled());
        assert!(cache.get().is_none());
    }
}
