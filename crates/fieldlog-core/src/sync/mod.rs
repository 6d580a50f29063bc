//! Log synchronization: pull server changes, push local edits.

pub mod classify;
pub mod conflict;
pub mod pull;
pub mod push;
mod session;

pub use classify::{ClassifiedError, ErrorKind};
pub use conflict::{LocalIndex, Status};
pub use pull::{pull, PullReport};
pub use push::{push, to_wire, PushOutcome, PushReport, RecordPush};
pub use session::{SyncReport, Synchronizer};
