//! In-memory unit of work with staged writes and explicit flush.
//!
//! Reads issue their SQL immediately; inserts, updates and deletes are
//! buffered until the session is flushed or committed. Every statement is
//! routed through a [`StatementInspector`](stmt_count_core::StatementInspector).

mod change;
mod error;
mod session;
mod transaction_handle;

pub use change::PendingWrite;
pub use error::SessionError;
pub use session::{Row, Session};
pub use transaction_handle::SessionTransaction;
