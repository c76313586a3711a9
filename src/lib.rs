pub mod account;
pub mod bank;
pub mod config;
pub mod crypto_serde;
pub mod curve;
pub mod elgamal;
pub mod error;
pub mod ledger;
pub mod proofs;
pub mod pvorm;
pub mod signing;
pub mod transaction;
