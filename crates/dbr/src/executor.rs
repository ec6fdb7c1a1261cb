//! Executor trait for running built statements.
//!
//! dbr never talks to a database itself. Anything that can run SQL text with
//! positional `?` arguments (a MySQL driver connection, a pool, a transaction,
//! a test double) implements [`Executor`], and statements hand their output to
//! it through [`Statement::exec`](crate::Statement::exec) and friends.

use crate::error::DbrResult;
use crate::value::Value;

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// `LAST_INSERT_ID()` after an INSERT, when the driver reports it.
    pub last_insert_id: Option<u64>,
}

/// A connection-like object that runs SQL.
pub trait Executor: Send + Sync {
    /// Row set returned by [`Executor::query`].
    type Rows: Send;
    /// Handle returned by [`Executor::prepare`].
    type Prepared: Send;

    /// Execute a statement that does not return rows.
    fn exec(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = DbrResult<ExecResult>> + Send;

    /// Execute a query and return its rows.
    fn query(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = DbrResult<Self::Rows>> + Send;

    /// Prepare `sql` for repeated execution.
    fn prepare(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = DbrResult<Self::Prepared>> + Send;
}

impl<E: Executor> Executor for &E {
    type Rows = E::Rows;
    type Prepared = E::Prepared;

    fn exec(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = DbrResult<ExecResult>> + Send {
        (**self).exec(sql, args)
    }

    fn query(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = DbrResult<Self::Rows>> + Send {
        (**self).query(sql, args)
    }

    fn prepare(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = DbrResult<Self::Prepared>> + Send {
        (**self).prepare(sql)
    }
}
