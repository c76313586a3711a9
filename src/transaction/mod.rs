//! L4 — transaction objects (spec §3, §4.4): the request a user signs, the
//! header a sending bank builds from it, and the completed, settled
//! transaction that pairs a header with both banks' PVORM update proofs.

pub mod header;
pub mod request;
pub mod transaction;

pub use header::TransactionHeader;
pub use request::TransactionRequest;
pub use transaction::{SettledTransaction, Transaction};
