//! An account's ORAM identifier: `H(pubkey)` hashed into a group element,
//! used as the PVORM key-slot plaintext (spec §3, "PVORMSlot").

use crate::curve::{hash_to_point, Point};

/// Derives the ORAM identifier for an account from its public key.
pub fn account_id(account_pubkey: Point) -> Point {
    let mut bytes = b"solidus/pvorm/account_id/v1".to_vec();
    bytes.extend_from_slice(&crate::curve::encode_point(&account_pubkey));
    hash_to_point(&bytes)
}

/// The placeholder key plaintext used for slots that are not live account
/// slots ("encryptions of the identity" per spec §3's stash invariant).
pub fn identity_placeholder() -> Point {
    hash_to_point(b"solidus/pvorm/identity_placeholder/v1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::generator;

    #[test]
    fn distinct_accounts_distinct_ids() {
        let a = account_id(generator());
        let b = account_id(generator() * crate::curve::Scalar::from(2u64));
        assert_ne!(a, b);
    }

    #[test]
    fn identity_placeholder_differs_from_any_real_account() {
        let a = account_id(generator());
        assert_ne!(a, identity_placeholder());
    }
}
