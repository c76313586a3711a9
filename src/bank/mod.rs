//! L5/L7 — a bank's settlement layer (spec §4.5, §5): the per-transaction
//! state machine in [`state`], the anti-replay nonce table in [`nonce`],
//! the event stream a driver consumes in [`events`], the sender/receiver
//! settlement logic itself in [`handler`], and the read-only,
//! ledger-driven replica in [`observer`] that lets anyone reconstruct a
//! bank's public state without holding its secret key.

pub mod events;
pub mod handler;
pub mod nonce;
pub mod observer;
pub mod state;

pub use events::BankEvent;
pub use handler::Bank;
pub use nonce::NonceTable;
pub use observer::BankObserver;
pub use state::{Role, TxSlot};
