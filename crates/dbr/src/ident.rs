//! Identifier quoting for the MySQL dialect.
//!
//! Identifiers are written with back-ticks. In [`QuoteMode::Minimal`] (the
//! default) a plain identifier such as `users` or `u.id` is written as-is and
//! only identifiers that need it (reserved words, unusual characters) are
//! quoted. [`QuoteMode::Always`] quotes every identifier part.
//!
//! - Dotted names are split and each part is quoted on its own: `` `a`.`b` ``
//! - `*` and `t.*` are never quoted
//! - `name AS alias` quotes both sides
//! - Anything that looks like an expression (contains `(`, quotes or spaces
//!   other than an `AS` alias) is written verbatim

/// How identifiers are quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuoteMode {
    /// Quote only when required.
    #[default]
    Minimal,
    /// Quote every identifier part.
    Always,
}

const RESERVED: &[&str] = &[
    "add", "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column",
    "create", "cross", "default", "delete", "desc", "distinct", "drop", "else", "exists",
    "from", "group", "having", "in", "index", "inner", "insert", "interval", "into", "is",
    "join", "key", "left", "like", "limit", "not", "null", "on", "or", "order", "outer",
    "primary", "range", "read", "references", "regexp", "right", "select", "set", "table",
    "then", "to", "union", "unique", "update", "using", "values", "when", "where", "with",
    "xor",
];

fn is_plain(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

fn is_reserved(part: &str) -> bool {
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(part))
}

/// Heuristic used for column lists: raw SQL is passed through untouched.
pub(crate) fn is_expression(s: &str) -> bool {
    s.contains(['(', ')', '\'', '"', '`', '+', '-', '/', '=', '<', '>', ','])
}

impl QuoteMode {
    fn write_part(self, out: &mut String, part: &str) {
        let needs_quotes = match self {
            QuoteMode::Always => part != "*",
            QuoteMode::Minimal => part != "*" && (!is_plain(part) || is_reserved(part)),
        };
        if !needs_quotes {
            out.push_str(part);
            return;
        }
        out.push('`');
        for ch in part.chars() {
            if ch == '`' {
                out.push_str("``");
            } else {
                out.push(ch);
            }
        }
        out.push('`');
    }

    /// Write a possibly dotted identifier (`schema.table.column`).
    pub fn write_ident(self, out: &mut String, name: &str) {
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            self.write_part(out, part);
        }
    }

    /// Write a column or table reference, honouring `AS` aliases and passing
    /// raw expressions through.
    pub fn write_column(self, out: &mut String, name: &str) {
        let name = name.trim();
        if let Some((left, alias)) = split_alias(name) {
            self.write_column(out, left);
            out.push_str(" AS ");
            self.write_ident(out, alias);
            return;
        }
        if is_expression(name) || name.contains(' ') {
            out.push_str(name);
        } else {
            self.write_ident(out, name);
        }
    }

    /// Write `name AS alias`, or just `name` when `alias` is empty.
    pub fn write_aliased(self, out: &mut String, name: &str, alias: &str) {
        self.write_column(out, name);
        if !alias.is_empty() {
            out.push_str(" AS ");
            self.write_ident(out, alias);
        }
    }

    /// Quote a single identifier into a new string.
    pub fn quote(self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_ident(&mut out, name);
        out
    }
}

/// Split `expr AS alias` on the last top-level, case-insensitive ` AS `.
fn split_alias(s: &str) -> Option<(&str, &str)> {
    let upper = s.to_ascii_uppercase();
    let pos = upper.rfind(" AS ")?;
    let alias = s[pos + 4..].trim();
    if alias.is_empty() || alias.contains([' ', '(', ')']) {
        return None;
    }
    Some((s[..pos].trim(), alias))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_leaves_plain_names() {
        assert_eq!(QuoteMode::Minimal.quote("users"), "users");
        assert_eq!(QuoteMode::Minimal.quote("u.id"), "u.id");
        assert_eq!(QuoteMode::Minimal.quote("t.*"), "t.*");
    }

    #[test]
    fn minimal_quotes_reserved_and_odd_names() {
        assert_eq!(QuoteMode::Minimal.quote("order"), "`order`");
        assert_eq!(QuoteMode::Minimal.quote("first name"), "`first name`");
        assert_eq!(QuoteMode::Minimal.quote("we`ird"), "`we``ird`");
        assert_eq!(QuoteMode::Minimal.quote("t.key"), "t.`key`");
    }

    #[test]
    fn always_quotes_every_part() {
        assert_eq!(QuoteMode::Always.quote("db.users"), "`db`.`users`");
        assert_eq!(QuoteMode::Always.quote("*"), "*");
    }

    #[test]
    fn column_alias() {
        let mut out = String::new();
        QuoteMode::Always.write_column(&mut out, "t.name as n");
        assert_eq!(out, "`t`.`name` AS `n`");
    }

    #[test]
    fn column_expression_is_verbatim() {
        let mut out = String::new();
        QuoteMode::Always.write_column(&mut out, "COUNT(*) AS total");
        assert_eq!(out, "COUNT(*) AS `total`");

        let mut out = String::new();
        QuoteMode::Always.write_column(&mut out, "a + b");
        assert_eq!(out, "a + b");
    }
}
