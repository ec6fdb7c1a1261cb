//! Ordered fragment lists and their serialization.
//!
//! Insertion order defines both the SQL text order and the argument order.
//! Everything is written through a single [`SqlWriter`] pass, so a fragment
//! that emits `n` placeholders also appends `n` arguments at the same point.

use crate::arg::{Arg, Op};
use crate::build::{SqlWriter, count_placeholders};
use crate::condition::{Condition, Logical, Subject};
use crate::dml::Statement;
use crate::error::{DbrError, DbrResult};
use crate::value::Value;

/// An ordered list of condition fragments forming one clause.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    items: Vec<Condition>,
}

impl Conditions {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment.
    pub fn push(&mut self, condition: Condition) {
        self.items.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.items.iter()
    }

    /// Remove all fragments.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Columns of a `USING (...)` fragment, when this list is one.
    pub(crate) fn using_columns(&self) -> Option<&[String]> {
        match self.items.as_slice() {
            [
                Condition {
                    subject: Subject::Using(columns),
                    ..
                },
            ] => Some(columns),
            _ => None,
        }
    }

    /// Write ` KEYWORD ` followed by the predicates; nothing when empty.
    ///
    /// `keyword` includes its surrounding spaces, e.g. `" WHERE "`.
    pub(crate) fn write_predicates(&self, keyword: &str, w: &mut SqlWriter) -> DbrResult<()> {
        if self.items.is_empty() {
            return Ok(());
        }
        w.push(keyword);

        let mut depth = 0usize;
        let mut first = true;
        let mut just_opened = false;
        for c in &self.items {
            if c.subject == Subject::ParenClose {
                if just_opened {
                    return Err(DbrError::configuration("empty parenthesis group"));
                }
                depth = depth.checked_sub(1).ok_or_else(|| {
                    DbrError::configuration("closing parenthesis without a matching open")
                })?;
                w.push(")");
                first = false;
                continue;
            }
            just_opened = c.subject == Subject::ParenOpen;

            if !first {
                w.push(c.logical.separator());
            } else if c.logical == Logical::Not {
                w.push("NOT ");
            }

            match &c.subject {
                Subject::ParenOpen => {
                    w.push("(");
                    depth += 1;
                    first = true;
                    continue;
                }
                Subject::Using(_) => {
                    return Err(DbrError::configuration(
                        "USING is only valid as the sole fragment of a join",
                    ));
                }
                _ => write_predicate(c, w)?,
            }
            first = false;
        }

        if depth != 0 {
            return Err(DbrError::configuration(format!(
                "{depth} unclosed parenthesis group(s)"
            )));
        }
        Ok(())
    }

    /// Write `a=?, b=?` for UPDATE ... SET.
    pub(crate) fn write_set(&self, w: &mut SqlWriter) -> DbrResult<()> {
        self.write_assignments(w, false)
    }

    /// Write `a=VALUES(a), b=?` for ON DUPLICATE KEY UPDATE.
    pub(crate) fn write_on_duplicate(&self, w: &mut SqlWriter) -> DbrResult<()> {
        self.write_assignments(w, true)
    }

    fn write_assignments(&self, w: &mut SqlWriter, on_duplicate: bool) -> DbrResult<()> {
        for (i, c) in self.items.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            match &c.subject {
                Subject::Column(name) => {
                    w.push_ident(name);
                    w.push("=");
                    match &c.arg {
                        None if on_duplicate => {
                            w.push("VALUES(");
                            w.push_ident(name);
                            w.push(")");
                        }
                        None => {
                            return Err(DbrError::configuration(format!(
                                "SET {name} has no value"
                            )));
                        }
                        Some(arg) => {
                            let before = w.slots();
                            write_assigned(name, arg, w)?;
                            check_arity(arg, Op::Equal, before, w)?;
                        }
                    }
                }
                Subject::Expr(sql) => write_raw(sql, c.arg.as_ref(), w)?,
                _ => {
                    return Err(DbrError::configuration(
                        "assignment lists take column or expression fragments only",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Right-hand side of `name=`.
fn write_assigned(name: &str, arg: &Arg, w: &mut SqlWriter) -> DbrResult<()> {
    match arg {
        Arg::Value(v) => w.bind(v),
        Arg::List(values) => match values.as_slice() {
            [v] => w.bind(v),
            _ => {
                return Err(DbrError::malformed(format!(
                    "SET {name} takes a single value, got {}",
                    values.len()
                )));
            }
        },
        Arg::Expr { sql, args } => w.bind_raw(sql, args)?,
        Arg::Column(other) => w.push_ident(other),
        Arg::Sub(sub) => {
            w.push("(");
            sub.write_sql(w)?;
            w.push(")");
        }
        Arg::Deferred { column } => w.reserve(column),
    }
    Ok(())
}

/// Compare the slots written since `before` with what `arg` declares under `op`.
fn check_arity(arg: &Arg, op: Op, before: usize, w: &SqlWriter) -> DbrResult<()> {
    let written = w.slots() - before;
    match arg.arity(op).slots() {
        Some(expected) if expected != written => Err(DbrError::ArgumentCountMismatch {
            placeholders: written,
            args: expected,
        }),
        _ => Ok(()),
    }
}

impl From<Vec<Condition>> for Conditions {
    fn from(items: Vec<Condition>) -> Self {
        Self { items }
    }
}

impl FromIterator<Condition> for Conditions {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Condition> for Conditions {
    fn extend<I: IntoIterator<Item = Condition>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Conditions {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Raw SQL carrying its own placeholders, bound from `arg`.
fn write_raw(sql: &str, arg: Option<&Arg>, w: &mut SqlWriter) -> DbrResult<()> {
    match arg {
        None => w.bind_raw(sql, &[]),
        Some(Arg::Value(v)) => w.bind_raw(sql, std::slice::from_ref(v)),
        Some(Arg::List(values)) => w.bind_raw(sql, values),
        Some(Arg::Deferred { column }) => {
            let placeholders = count_placeholders(sql);
            if placeholders != 1 {
                return Err(DbrError::ArgumentCountMismatch {
                    placeholders,
                    args: 1,
                });
            }
            w.push(sql);
            w.reserve_inline(column);
            Ok(())
        }
        Some(Arg::Expr { .. } | Arg::Column(_) | Arg::Sub(_)) => Err(DbrError::configuration(
            format!("raw expression '{sql}' needs an operator to compare against another expression"),
        )),
    }
}

/// Write one ordinary predicate, wrapped in parentheses.
fn write_predicate(c: &Condition, w: &mut SqlWriter) -> DbrResult<()> {
    let (left, is_raw) = match &c.subject {
        Subject::Column(name) => (name.as_str(), false),
        Subject::Expr(sql) => (sql.as_str(), true),
        _ => return Ok(()),
    };

    // A raw expression without an operator carries its own placeholders.
    let compares = !is_raw
        || c.op != Op::Default
        || matches!(c.arg, Some(Arg::Column(_) | Arg::Sub(_) | Arg::Expr { .. }));
    if !compares {
        w.push("(");
        write_raw(left, c.arg.as_ref(), w)?;
        w.push(")");
        return Ok(());
    }

    let op = c.op.resolve(c.arg.as_ref());
    if let Some(arg) = &c.arg {
        arg.check_shape(op, left)?;
    }

    w.push("(");
    if matches!(op, Op::Exists | Op::NotExists) {
        let Some(Arg::Sub(sub)) = &c.arg else {
            return Err(DbrError::configuration(format!(
                "{} requires a sub-select",
                op.as_sql()
            )));
        };
        w.push(op.as_sql());
        w.push(" (");
        sub.write_sql(w)?;
        w.push("))");
        return Ok(());
    }

    if is_raw {
        w.bind_raw(left, &[])?;
    } else {
        w.push_column(left);
    }
    w.push(" ");
    w.push(op.as_sql());
    if !matches!(op, Op::Null | Op::NotNull) {
        if let Some(arg) = &c.arg {
            w.push(" ");
            let before = w.slots();
            write_operand(op, arg, w)?;
            check_arity(arg, op, before, w)?;
        }
    }
    w.push(")");
    Ok(())
}

/// Right-hand side of a comparison. Shapes were checked by the caller.
fn write_operand(op: Op, arg: &Arg, w: &mut SqlWriter) -> DbrResult<()> {
    match arg {
        Arg::Value(v) if op.is_list() => {
            w.push("(");
            w.bind(v);
            w.push(")");
        }
        Arg::Value(v) => w.bind(v),
        Arg::List(values) if op.is_list() => {
            w.push("(");
            w.bind_list(values);
            w.push(")");
        }
        Arg::List(values) => match values.as_slice() {
            [from, to] if op.is_range() => {
                w.bind(from);
                w.push(" AND ");
                w.bind(to);
            }
            [v] => w.bind(v),
            _ => {
                return Err(DbrError::malformed(format!(
                    "{} got {} values",
                    op.as_sql(),
                    values.len()
                )));
            }
        },
        Arg::Expr { sql, args } if op.is_list() => {
            w.push("(");
            w.bind_raw(sql, args)?;
            w.push(")");
        }
        Arg::Expr { sql, args } => w.bind_raw(sql, args)?,
        Arg::Column(other) if op.is_list() => {
            w.push("(");
            w.push_column(other);
            w.push(")");
        }
        Arg::Column(other) => w.push_column(other),
        Arg::Sub(sub) => {
            w.push("(");
            sub.write_sql(w)?;
            w.push(")");
        }
        Arg::Deferred { column } if op.is_list() => {
            w.push("(");
            w.reserve(column);
            w.push(")");
        }
        Arg::Deferred { column } => w.reserve(column),
    }
    Ok(())
}

/// Write a comma separated value row `?,?,?`.
pub(crate) fn write_row(values: &[Value], w: &mut SqlWriter) {
    w.push("(");
    w.bind_list(values);
    w.push(")");
}
