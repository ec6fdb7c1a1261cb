//! Right-hand sides of condition fragments and comparison operators.
//!
//! An [`Arg`] is immutable once built. It knows which operator it defaults to
//! ([`Op::resolve`]): scalars compare with `=`, lists and sub-selects with `IN`.
//! Under that operator it reports how many placeholders it contributes
//! ([`Arg::arity`]); the writer checks every fragment against it.

use crate::dml::Select;
use crate::error::{DbrError, DbrResult};
use crate::value::Value;

/// Comparison operator of a condition fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Op {
    /// Pick from the argument: `=` for scalars, `IN` for lists and sub-selects.
    #[default]
    Default,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    /// MySQL null-safe equality `<=>`
    NullSafeEqual,
    Like,
    NotLike,
    Regexp,
    NotRegexp,
    In,
    NotIn,
    Between,
    NotBetween,
    /// IS NULL
    Null,
    /// IS NOT NULL
    NotNull,
    Exists,
    NotExists,
}

impl Op {
    /// SQL keyword or symbol for this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Default | Op::Equal => "=",
            Op::NotEqual => "!=",
            Op::Less => "<",
            Op::LessOrEqual => "<=",
            Op::Greater => ">",
            Op::GreaterOrEqual => ">=",
            Op::NullSafeEqual => "<=>",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::Regexp => "REGEXP",
            Op::NotRegexp => "NOT REGEXP",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
            Op::Between => "BETWEEN",
            Op::NotBetween => "NOT BETWEEN",
            Op::Null => "IS NULL",
            Op::NotNull => "IS NOT NULL",
            Op::Exists => "EXISTS",
            Op::NotExists => "NOT EXISTS",
        }
    }

    fn is_negative(self) -> bool {
        matches!(
            self,
            Op::NotEqual
                | Op::NotIn
                | Op::NotLike
                | Op::NotRegexp
                | Op::NotBetween
                | Op::NotNull
                | Op::NotExists
        )
    }

    /// Operators that take a parenthesised list of values.
    pub fn is_list(self) -> bool {
        matches!(self, Op::In | Op::NotIn)
    }

    /// Operators that take exactly two values.
    pub fn is_range(self) -> bool {
        matches!(self, Op::Between | Op::NotBetween)
    }

    /// Resolve the operator actually emitted for `arg`.
    ///
    /// A missing or NULL argument always yields `IS NULL`, or `IS NOT NULL`
    /// when the requested operator is a negative one.
    pub fn resolve(self, arg: Option<&Arg>) -> Op {
        let null_op = if self.is_negative() { Op::NotNull } else { Op::Null };
        match arg {
            None | Some(Arg::Value(Value::Null)) => {
                if matches!(self, Op::Exists | Op::NotExists) {
                    self
                } else {
                    null_op
                }
            }
            Some(arg) if self == Op::Default => match arg {
                Arg::List(_) | Arg::Sub(_) => Op::In,
                _ => Op::Equal,
            },
            Some(_) => self,
        }
    }
}

/// Number of placeholders an argument contributes under an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// This many values are bound directly.
    Values(usize),
    /// One slot whose value is supplied later by an assembler.
    Deferred,
    /// A nested statement; its own fragments account for its slots.
    Nested,
}

impl Arity {
    /// Slots written for the argument, when known up front.
    pub fn slots(self) -> Option<usize> {
        match self {
            Arity::Values(n) => Some(n),
            Arity::Deferred => Some(1),
            Arity::Nested => None,
        }
    }
}

/// Right-hand side of a condition fragment.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A single bound value
    Value(Value),
    /// A homogeneous list of values (IN, BETWEEN)
    List(Vec<Value>),
    /// Raw SQL carrying its own `?` placeholders
    Expr { sql: String, args: Vec<Value> },
    /// Another column, compared without any placeholder
    Column(String),
    /// A nested SELECT
    Sub(Box<Select>),
    /// A value supplied per record by an [`Assembler`](crate::Assembler)
    Deferred { column: String },
}

impl Arg {
    /// Wrap a single value.
    pub fn value(v: impl Into<Value>) -> Self {
        Arg::Value(v.into())
    }

    /// Wrap a list of values.
    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Arg::List(values.into_iter().map(Into::into).collect())
    }

    /// Placeholders this argument contributes when written under the
    /// resolved operator `op`.
    ///
    /// `IS NULL` and `IS NOT NULL` bind nothing. A NULL value under any other
    /// operator, as in `SET a=?`, is bound like every other value.
    pub fn arity(&self, op: Op) -> Arity {
        if matches!(op, Op::Null | Op::NotNull) {
            return Arity::Values(0);
        }
        match self {
            Arg::Value(_) => Arity::Values(1),
            Arg::List(values) => Arity::Values(values.len()),
            Arg::Expr { args, .. } => Arity::Values(args.len()),
            Arg::Column(_) => Arity::Values(0),
            Arg::Sub(_) => Arity::Nested,
            Arg::Deferred { .. } => Arity::Deferred,
        }
    }

    /// Check that the number of values fits the resolved operator.
    pub(crate) fn check_shape(&self, op: Op, subject: &str) -> DbrResult<()> {
        match self {
            Arg::List(values) if op.is_range() && values.len() != 2 => {
                Err(DbrError::malformed(format!(
                    "{subject} {} requires exactly 2 values, got {}",
                    op.as_sql(),
                    values.len()
                )))
            }
            Arg::List(values) if op.is_list() && values.is_empty() => Err(DbrError::malformed(
                format!("{subject} {} requires at least one value", op.as_sql()),
            )),
            Arg::List(values) if !op.is_list() && !op.is_range() && values.len() != 1 => {
                Err(DbrError::malformed(format!(
                    "{subject} {} takes a single value, got {}",
                    op.as_sql(),
                    values.len()
                )))
            }
            Arg::Value(_) | Arg::Deferred { .. } if op.is_range() => Err(DbrError::malformed(
                format!("{subject} {} requires exactly 2 values, got 1", op.as_sql()),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_operator_follows_shape() {
        assert_eq!(Op::Default.resolve(Some(&Arg::value(1))), Op::Equal);
        assert_eq!(
            Op::Default.resolve(Some(&Arg::List(vec![Value::Int(1), Value::Int(2)]))),
            Op::In
        );
        assert_eq!(Op::Like.resolve(Some(&Arg::value("a%"))), Op::Like);
    }

    #[test]
    fn null_forces_is_null() {
        assert_eq!(Op::Greater.resolve(Some(&Arg::Value(Value::Null))), Op::Null);
        assert_eq!(Op::NotEqual.resolve(None), Op::NotNull);
        assert_eq!(Op::NotIn.resolve(Some(&Arg::Value(Value::Null))), Op::NotNull);
        assert_eq!(Op::Default.resolve(None), Op::Null);
    }

    #[test]
    fn arity_follows_operator() {
        assert_eq!(Arg::value(5).arity(Op::Equal), Arity::Values(1));
        assert_eq!(Arg::value(5).arity(Op::Null), Arity::Values(0));
        // SET a=NULL binds the NULL
        assert_eq!(Arg::Value(Value::Null).arity(Op::Equal), Arity::Values(1));
        let null_op = Op::Equal.resolve(Some(&Arg::Value(Value::Null)));
        assert_eq!(Arg::Value(Value::Null).arity(null_op), Arity::Values(0));
        assert_eq!(
            Arg::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]).arity(Op::In),
            Arity::Values(3)
        );
        assert_eq!(
            Arg::Deferred {
                column: "id".into()
            }
            .arity(Op::Equal),
            Arity::Deferred
        );
        let sub = Arg::Sub(Box::new(crate::dml::select(["id"]).from("t")));
        assert_eq!(sub.arity(Op::In), Arity::Nested);
        assert_eq!(Arity::Nested.slots(), None);
        assert_eq!(Arity::Deferred.slots(), Some(1));
    }

    #[test]
    fn between_needs_two_values() {
        let one = Arg::List(vec![Value::Float(2.5)]);
        assert!(one.check_shape(Op::Between, "d").unwrap_err().is_malformed_slice());
        let three = Arg::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert!(three.check_shape(Op::Between, "d").is_err());
        let two = Arg::List(vec![Value::Int(1), Value::Int(2)]);
        assert!(two.check_shape(Op::Between, "d").is_ok());
    }

    #[test]
    fn empty_in_is_rejected() {
        let empty = Arg::List(Vec::new());
        let err = empty.check_shape(Op::In, "a").unwrap_err();
        assert!(err.is_malformed_slice());
    }
}
