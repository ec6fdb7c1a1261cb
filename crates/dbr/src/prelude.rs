//! Convenient imports for typical `dbr` usage.
//!
//! ```ignore
//! use dbr::prelude::*;
//! ```

pub use crate::{
    Assembler, Config, DbrError, DbrResult, Executor, JsonRecord, Op, QuoteMode, Statement, Value,
};
pub use crate::{col, delete_from, exists, expr, insert_into, not_exists, paren_close, paren_open};
pub use crate::{replace_into, select, union, update, using, with};
pub use crate::{ListenAction, Listener, Listeners};
