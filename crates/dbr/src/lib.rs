//! # dbr
//!
//! A MySQL statement builder that keeps placeholders and arguments in step.
//!
//! ## Features
//!
//! - **Typed fragments**: WHERE/HAVING/ON clauses are lists of [`Condition`]s, never string concatenation
//! - **Aligned arguments**: text and arguments come from one traversal, so the i-th `?` is always the i-th argument
//! - **Interpolation**: render arguments as MySQL literals when placeholders are not wanted
//! - **Deferred values**: leave values to a per-record [`Assembler`] and run one statement text per record
//! - **Build cache**: reuse the SQL text of a statement while its arguments change
//! - **Safe defaults**: DELETE requires WHERE, UPDATE requires SET
//!
//! ## Usage
//!
//! ```ignore
//! use dbr::prelude::*;
//!
//! let (sql, args) = select(["a", "b"])
//!     .from("c")
//!     .filter(col("a").int(111))
//!     .filter(expr("b=c"))
//!     .to_sql()?;
//! assert_eq!(sql, "SELECT a, b FROM c WHERE (a = ?) AND (b=c)");
//! assert_eq!(args, vec![Value::Int(111)]);
//!
//! // Literal SQL instead of placeholders
//! let (sql, _) = select(["a", "b"])
//!     .from("c")
//!     .filter(col("a").ints([111, 222]))
//!     .interpolate()
//!     .to_sql()?;
//! assert_eq!(sql, "SELECT a, b FROM c WHERE (a IN (111,222))");
//!
//! // One UPDATE text, values taken from each record
//! let stmt = update("users")
//!     .set_deferred("email")
//!     .filter(col("id").deferred())
//!     .build_cache(true);
//! for user in &users {
//!     stmt.exec_record(&conn, &JsonRecord::from_serialize(user)?).await?;
//! }
//! ```

pub mod arg;
pub mod build;
pub mod clause;
pub mod condition;
pub mod config;
pub mod dml;
pub mod error;
pub mod executor;
pub mod ident;
pub mod listener;
pub mod log;
pub mod prelude;
pub mod value;

pub use arg::{Arg, Arity, Op};
pub use build::assemble::JsonRecord;
pub use build::{
    AssembledArgs, Assembler, BuildCache, BuildMode, BuildOptions, SqlWriter, count_placeholders,
    interpolate,
};
pub use clause::Conditions;
pub use condition::{
    Condition, Logical, Subject, col, exists, expr, not_exists, paren_close, paren_open, using,
};
pub use config::Config;
pub use dml::{
    Cte, Delete, Insert, InsertVerb, Join, JoinKind, LockMode, Query, Select, Statement,
    StatementKind, Union, Update, With, delete_from, insert_into, replace_into, select, union,
    update, with,
};
pub use error::{DbrError, DbrResult};
pub use executor::{ExecResult, Executor};
pub use ident::QuoteMode;
pub use listener::{ListenAction, Listener, ListenerFn, Listeners};
pub use log::{BuildEvent, Logger, NoopLogger};
pub use value::Value;

#[cfg(feature = "tracing")]
pub use log::TracingLogger;
