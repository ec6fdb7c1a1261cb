//! Condition fragments.
//!
//! A [`Condition`] is one predicate of a WHERE/HAVING/ON clause, one
//! assignment of a SET or ON DUPLICATE KEY UPDATE list, or a grouping marker.
//! Fragments are built fluently:
//!
//! ```ignore
//! use dbr::prelude::*;
//!
//! col("age").greater().int(18);          // (age > ?)
//! col("id").ints([1, 2, 3]);             // (id IN (?,?,?))
//! col("d").between().floats([2.5, 2.7]); // (d BETWEEN ? AND ?)
//! col("deleted_at").null();              // (deleted_at IS NULL)
//! expr("b=c").or();                      // OR (b=c)
//! col("email").deferred();               // value supplied per record
//! ```

use crate::arg::{Arg, Op};
use crate::dml::Select;
use crate::error::DbrResult;
use crate::value::Value;
use chrono::NaiveDateTime;
use serde::Serialize;

/// How a fragment joins the fragment before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Logical {
    #[default]
    And,
    Or,
    Xor,
    /// `AND NOT`, or a bare `NOT` at the start of a group.
    Not,
}

impl Logical {
    pub(crate) fn separator(self) -> &'static str {
        match self {
            Logical::And => " AND ",
            Logical::Or => " OR ",
            Logical::Xor => " XOR ",
            Logical::Not => " AND NOT ",
        }
    }
}

/// Left-hand side of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    /// A column name, quoted per the statement's quote mode
    Column(String),
    /// Raw SQL written verbatim
    Expr(String),
    /// Opens a parenthesised group
    ParenOpen,
    /// Closes a parenthesised group
    ParenClose,
    /// `USING (a, b)` columns of a join
    Using(Vec<String>),
}

/// One fragment of a clause.
#[derive(Debug, Clone)]
pub struct Condition {
    pub(crate) subject: Subject,
    pub(crate) op: Op,
    pub(crate) arg: Option<Arg>,
    pub(crate) logical: Logical,
}

/// Start a fragment on a column.
pub fn col(name: impl Into<String>) -> Condition {
    Condition::new(Subject::Column(name.into()))
}

/// Start a fragment from raw SQL, e.g. `expr("b=c")` or `expr("a > ?").int(1)`.
pub fn expr(sql: impl Into<String>) -> Condition {
    Condition::new(Subject::Expr(sql.into()))
}

/// Open a parenthesised group.
pub fn paren_open() -> Condition {
    Condition::new(Subject::ParenOpen)
}

/// Close the innermost open group.
pub fn paren_close() -> Condition {
    Condition::new(Subject::ParenClose)
}

/// `USING (...)` columns for a join.
pub fn using<I, S>(columns: I) -> Condition
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Condition::new(Subject::Using(columns.into_iter().map(Into::into).collect()))
}

/// `EXISTS (sub-select)`
pub fn exists(sub: Select) -> Condition {
    expr("").exists().sub(sub)
}

/// `NOT EXISTS (sub-select)`
pub fn not_exists(sub: Select) -> Condition {
    expr("").not_exists().sub(sub)
}

impl Condition {
    fn new(subject: Subject) -> Self {
        Self {
            subject,
            op: Op::Default,
            arg: None,
            logical: Logical::And,
        }
    }

    /// The left-hand side.
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// The bound right-hand side, if any.
    pub fn arg(&self) -> Option<&Arg> {
        self.arg.as_ref()
    }

    /// Operator as requested (before NULL/list resolution).
    pub fn op(&self) -> Op {
        self.op
    }

    pub fn logical(&self) -> Logical {
        self.logical
    }

    // ==================== Connectives ====================

    /// Join with AND (the default).
    pub fn and(mut self) -> Self {
        self.logical = Logical::And;
        self
    }

    /// Join with OR.
    pub fn or(mut self) -> Self {
        self.logical = Logical::Or;
        self
    }

    /// Join with XOR.
    pub fn xor(mut self) -> Self {
        self.logical = Logical::Xor;
        self
    }

    /// Negate this fragment.
    pub fn not(mut self) -> Self {
        self.logical = Logical::Not;
        self
    }

    // ==================== Operators ====================

    /// Set the operator explicitly.
    pub fn op_is(mut self, op: Op) -> Self {
        self.op = op;
        self
    }

    pub fn equal(self) -> Self {
        self.op_is(Op::Equal)
    }

    pub fn not_equal(self) -> Self {
        self.op_is(Op::NotEqual)
    }

    pub fn less(self) -> Self {
        self.op_is(Op::Less)
    }

    pub fn less_or_equal(self) -> Self {
        self.op_is(Op::LessOrEqual)
    }

    pub fn greater(self) -> Self {
        self.op_is(Op::Greater)
    }

    pub fn greater_or_equal(self) -> Self {
        self.op_is(Op::GreaterOrEqual)
    }

    /// MySQL `<=>`
    pub fn spaceship(self) -> Self {
        self.op_is(Op::NullSafeEqual)
    }

    pub fn like(self) -> Self {
        self.op_is(Op::Like)
    }

    pub fn not_like(self) -> Self {
        self.op_is(Op::NotLike)
    }

    pub fn regexp(self) -> Self {
        self.op_is(Op::Regexp)
    }

    pub fn not_regexp(self) -> Self {
        self.op_is(Op::NotRegexp)
    }

    pub fn is_in(self) -> Self {
        self.op_is(Op::In)
    }

    pub fn not_in(self) -> Self {
        self.op_is(Op::NotIn)
    }

    /// BETWEEN; the argument must hold exactly two values.
    pub fn between(self) -> Self {
        self.op_is(Op::Between)
    }

    pub fn not_between(self) -> Self {
        self.op_is(Op::NotBetween)
    }

    /// IS NULL
    pub fn null(self) -> Self {
        self.op_is(Op::Null)
    }

    /// IS NOT NULL
    pub fn not_null(self) -> Self {
        self.op_is(Op::NotNull)
    }

    pub fn exists(self) -> Self {
        self.op_is(Op::Exists)
    }

    pub fn not_exists(self) -> Self {
        self.op_is(Op::NotExists)
    }

    // ==================== Values ====================

    fn with_arg(mut self, arg: Arg) -> Self {
        self.arg = Some(arg);
        self
    }

    /// Bind a single value of any supported type.
    pub fn value(self, v: impl Into<Value>) -> Self {
        self.with_arg(Arg::Value(v.into()))
    }

    /// Bind a list of values.
    pub fn values<T: Into<Value>>(self, values: impl IntoIterator<Item = T>) -> Self {
        self.with_arg(Arg::list(values))
    }

    pub fn int(self, v: i64) -> Self {
        self.value(v)
    }

    pub fn ints(self, values: impl IntoIterator<Item = i64>) -> Self {
        self.values(values)
    }

    pub fn uint(self, v: u64) -> Self {
        self.value(v)
    }

    pub fn uints(self, values: impl IntoIterator<Item = u64>) -> Self {
        self.values(values)
    }

    pub fn float(self, v: f64) -> Self {
        self.value(v)
    }

    pub fn floats(self, values: impl IntoIterator<Item = f64>) -> Self {
        self.values(values)
    }

    pub fn str(self, v: impl Into<String>) -> Self {
        self.value(Value::Text(v.into()))
    }

    pub fn strs<S: Into<String>>(self, values: impl IntoIterator<Item = S>) -> Self {
        self.values(values.into_iter().map(Into::<String>::into))
    }

    pub fn bool(self, v: bool) -> Self {
        self.value(v)
    }

    pub fn time(self, v: NaiveDateTime) -> Self {
        self.value(v)
    }

    pub fn times(self, values: impl IntoIterator<Item = NaiveDateTime>) -> Self {
        self.values(values)
    }

    pub fn bytes(self, v: impl Into<Vec<u8>>) -> Self {
        self.value(Value::Bytes(v.into()))
    }

    /// Bind `v` serialized as JSON text.
    pub fn json<T: Serialize + ?Sized>(self, v: &T) -> DbrResult<Self> {
        Ok(self.value(serde_json::to_value(v)?))
    }

    /// Compare against raw SQL, e.g. `col("created_at").less().raw("NOW()")`.
    pub fn raw(self, sql: impl Into<String>) -> Self {
        self.with_arg(Arg::Expr {
            sql: sql.into(),
            args: Vec::new(),
        })
    }

    /// Compare against raw SQL that carries its own placeholders.
    pub fn raw_args<T: Into<Value>>(
        self,
        sql: impl Into<String>,
        args: impl IntoIterator<Item = T>,
    ) -> Self {
        self.with_arg(Arg::Expr {
            sql: sql.into(),
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// Compare against another column, e.g. for join conditions.
    pub fn column(self, other: impl Into<String>) -> Self {
        self.with_arg(Arg::Column(other.into()))
    }

    /// Compare against a sub-select.
    pub fn sub(self, select: Select) -> Self {
        self.with_arg(Arg::Sub(Box::new(select)))
    }

    /// Leave the value to the record assembler, keyed by this fragment's
    /// column (or raw SQL text for expression fragments).
    pub fn deferred(self) -> Self {
        let column = match &self.subject {
            Subject::Column(name) | Subject::Expr(name) => name.clone(),
            _ => String::new(),
        };
        self.deferred_as(column)
    }

    /// Leave the value to the record assembler under an explicit column name.
    pub fn deferred_as(self, column: impl Into<String>) -> Self {
        self.with_arg(Arg::Deferred {
            column: column.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluent_chain_sets_parts() {
        let c = col("age").greater().int(18).or();
        assert_eq!(c.subject(), &Subject::Column("age".into()));
        assert_eq!(c.op(), Op::Greater);
        assert!(matches!(c.arg(), Some(Arg::Value(Value::Int(18)))));
        assert_eq!(c.logical(), Logical::Or);
    }

    #[test]
    fn deferred_uses_column_name() {
        let c = col("email").deferred();
        assert!(matches!(c.arg(), Some(Arg::Deferred { column }) if column == "email"));

        let c = expr("LOWER(email) = ?").deferred_as("email");
        assert!(matches!(c.arg(), Some(Arg::Deferred { column }) if column == "email"));
    }

    #[test]
    fn strs_become_text_list() {
        let c = col("name").strs(["a", "b"]);
        assert!(matches!(
            c.arg(),
            Some(Arg::List(v)) if v == &vec![Value::from("a"), Value::from("b")]
        ));
    }

    #[test]
    fn json_value() {
        let c = col("meta").json(&serde_json::json!({"k": 1})).unwrap();
        assert!(matches!(c.arg(), Some(Arg::Value(Value::Json(_)))));
    }
}
