//! `Account`: an end-user identity within a bank's PVORM (spec §1, §5).

use serde::{Deserialize, Serialize};

use crate::curve::Point;
use crate::signing::{Signable, TranscriptBuilder};

/// An account's public identity: its own signing key and the public key of
/// the bank holding its balance. The account's ORAM identifier
/// ([`crate::pvorm::account_id::account_id`]) is derived from `pubkey`, and
/// its last-seen nonce lives in [`crate::bank::nonce`], not here — this
/// type carries no mutable state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(with = "crate::crypto_serde::point")]
    pub pubkey: Point,
    #[serde(with = "crate::crypto_serde::point")]
    pub bank_pubkey: Point,
}

impl Account {
    pub fn new(pubkey: Point, bank_pubkey: Point) -> Self {
        Self { pubkey, bank_pubkey }
    }

    pub fn oram_id(&self) -> Point {
        crate::pvorm::account_id::account_id(self.pubkey)
    }
}

impl Signable for Account {
    fn domain_kind(&self) -> &'static str {
        "solidus/account_v1"
    }

    fn write_transcript(&self, builder: &mut TranscriptBuilder) {
        builder.append_point(&self.pubkey);
        builder.append_point(&self.bank_pubkey);
    }
}
