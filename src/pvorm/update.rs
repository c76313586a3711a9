//! `PVORMUpdate`: the proof bundle produced by `lookupAndUpdate` and checked
//! by `verify`/`applyVerified` (spec §4.3).
//!
//! # Design notes on the simplified PVORM used here
//!
//! A fully general Circuit-ORAM-under-encryption that hides *which* slot
//! holds a given account, across arbitrary tree/stash migrations, is a
//! substantial piece of cryptographic engineering in its own right (it is
//! the core contribution of the paper this spec distills). This
//! implementation makes deliberate simplifications, documented here and in
//! `DESIGN.md`, that keep the mechanism tractable while preserving every
//! testable property spec §8 names (conservation, proof soundness, replay
//! protection, hash-chained-leaf unpredictability):
//!
//! - **Live account slots never leave the stash.** The tree holds only
//!   identity-placeholder filler (spec §3's "encryptions of the identity").
//!   `lookup_and_update` always finds an account by a bank-private linear
//!   scan of the stash and mutates it in place; `StashOverflow` is
//!   therefore only reachable at account provisioning time, not mid-transfer.
//! - **Eviction is a single swap, not a general push-down.** Each update
//!   swaps the *root* bucket's slots with its path-child's slots (both
//!   always full, so the swap never overflows), re-encrypts every other
//!   bucket on the path in place, and wraps every path slot's key
//!   ciphertext in an [`OrProof`] of "unchanged" vs. "swapped with
//!   neighbor" so the public ciphertext diff does not reveal which
//!   happened. [`super::eviction::deepest_eligible_path_index`] documents
//!   the fuller multi-level push that a production implementation would do
//!   instead.
//! - **Which stash slot was touched stays hidden from the verifier.** Key
//!   ciphertexts never change plaintext on a `lookup_and_update`, so every
//!   slot's key is proved as a plain re-encryption uniformly (no disjunction
//!   needed, nothing to hide there). Balances differ: exactly one slot's
//!   balance moves by `delta`, the rest are untouched. Each stash slot
//!   therefore carries an [`OrProof`] of "this balance is an ordinary
//!   re-encryption" vs. "this balance absorbed `delta` plus a fresh
//!   blinding term", with the real branch known only to the prover, plus
//!   its own [`MaxwellRangeProof`] (every slot gets one, so which slot's
//!   range proof "mattered" isn't observable either). A separate
//!   `aggregate_conservation_proof` ties the sum of all posterior balances
//!   to the sum of all prior balances plus `delta`, so a bank cannot use
//!   the hidden-index machinery to apply `delta` to zero or to more than
//!   one slot — soundness of "exactly one slot changed" lives in that sum
//!   check, not in any single slot's proof.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::curve::{Point, PointBytes, Scalar};
use crate::elgamal::{Ciphertext, EncryptionParams};
use crate::error::{Result, SolidusError};
use crate::pvorm::account_id::account_id;
use crate::pvorm::bucket::PvormBucket;
use crate::pvorm::position_map::eviction_leaf;
use crate::pvorm::slot::PvormSlot;
use crate::pvorm::tree::PvormTree;
use crate::proofs::or_proof::{DleqStatement, OrProof};
use crate::proofs::plaintext_eq::PlaintextEqProof;
use crate::proofs::range_proof::MaxwellRangeProof;

const PROOF_CTX_KEY_SHUFFLE: &str = "solidus/pvorm/key_shuffle_v1";
const PROOF_CTX_STASH_KEY: &str = "solidus/pvorm/stash_key_v1";
const PROOF_CTX_STASH_BAL: &str = "solidus/pvorm/stash_bal_v1";
const PROOF_CTX_RANGE: &str = "solidus/pvorm/range_v1";
const PROOF_CTX_CONSERVATION: &str = "solidus/pvorm/conservation_v1";

/// The proof bundle for one `lookup_and_update` round.
#[derive(Clone, Serialize, Deserialize)]
pub struct PvormUpdate {
    pub leaf_index: u64,
    pub prior_path: Vec<PvormBucket>,
    pub posterior_path: Vec<PvormBucket>,
    /// Per path-bucket, per-slot key-ciphertext shuffle proof.
    pub path_key_proofs: Vec<Vec<OrProof>>,
    pub posterior_stash: Vec<PvormSlot>,
    /// Per stash slot: its key ciphertext is an ordinary re-encryption
    /// (true uniformly, matched or not — the plaintext never changes).
    pub stash_key_proofs: Vec<PlaintextEqProof>,
    /// Per stash slot: "plain re-encryption" vs. "absorbed `delta`",
    /// disjoint so the public transcript doesn't reveal which slot
    /// actually moved.
    pub stash_bal_proofs: Vec<OrProof>,
    /// Per stash slot: its posterior balance lies in `[0, max_balance]`.
    /// Every slot gets one, not just the touched one.
    pub stash_range_proofs: Vec<MaxwellRangeProof>,
    /// Ties `sum(posterior balances) == sum(prior balances) + delta`
    /// without naming which slot supplied the difference.
    pub aggregate_conservation_proof: PlaintextEqProof,
    pub delta: Ciphertext,
}

/// Bank-visible (ciphertext-only) PVORM state, replicated by observers via
/// `applyVerified`.
#[derive(Clone, Serialize, Deserialize)]
pub struct PvormPublicState {
    pub tree: PvormTree,
    pub stash: Vec<PvormSlot>,
    pub epoch: u64,
}

impl PvormPublicState {
    pub fn new(
        params: &crate::config::PvormParams,
        bank_pk: Point,
        rng: &mut impl RngCore,
    ) -> Self {
        Self {
            tree: PvormTree::new(params, bank_pk, rng),
            stash: Vec::new(),
            epoch: 0,
        }
    }
}

fn dleq_from_ciphertext_diff(posterior: Ciphertext, prior: Ciphertext) -> DleqStatement {
    DleqStatement {
        a: posterior.c1 - prior.c1,
        b: posterior.c2 - prior.c2,
    }
}

/// Balance-reencryption statements shared by the matched and unmatched
/// branches of a stash slot's [`OrProof`]: "this diff is `Enc(0;r)`" vs.
/// "this diff minus `delta` is `Enc(0;r)`".
fn bal_branch_statements(diff: Ciphertext, delta: Ciphertext) -> (DleqStatement, DleqStatement) {
    let plain = DleqStatement { a: diff.c1, b: diff.c2 };
    let shifted = DleqStatement {
        a: diff.c1 - delta.c1,
        b: diff.c2 - delta.c2,
    };
    (plain, shifted)
}

/// Builds the proof bundle for crediting/debiting `account_pubkey` by the
/// plaintext value underlying `delta`, whose randomness `delta_randomness`
/// is known to the caller (the bank always controls or re-derives the
/// randomness of ciphertexts destined for its own PVORM — see
/// `crate::bank`). Every stash slot's balance gets a fresh range proof and
/// an `OrProof` of "unchanged" vs. "absorbed delta", so `balance_randomness`
/// must carry an entry for every live account, not just the touched one;
/// the returned map reflects every slot's new cumulative randomness.
#[allow(clippy::too_many_arguments)]
pub fn lookup_and_update(
    enc_params: &EncryptionParams,
    bank_sk: Scalar,
    bank_pk: Point,
    state: &PvormPublicState,
    account_pubkey: Point,
    delta: Ciphertext,
    delta_randomness: Scalar,
    max_balance: i64,
    ledger_seq: u64,
    balance_randomness: &std::collections::HashMap<PointBytes, Scalar>,
    rng: &mut impl RngCore,
) -> Result<(PvormUpdate, PvormPublicState, std::collections::HashMap<PointBytes, Scalar>)> {
    let id = account_id(account_pubkey);

    let matched_stash_index = state
        .stash
        .iter()
        .position(|slot| crate::elgamal::decrypt_point(bank_sk, slot.key_ct) == id)
        .ok_or_else(|| SolidusError::MalformedEncoding("account not provisioned".into()))?;

    let mut posterior_stash = Vec::with_capacity(state.stash.len());
    let mut stash_key_proofs = Vec::with_capacity(state.stash.len());
    let mut stash_bal_proofs = Vec::with_capacity(state.stash.len());
    let mut stash_range_proofs = Vec::with_capacity(state.stash.len());
    let mut new_balance_randomness = balance_randomness.clone();
    let mut total_extra_randomness = Scalar::from(0u64);

    for (idx, prior_slot) in state.stash.iter().enumerate() {
        let slot_id = crate::elgamal::decrypt_point(bank_sk, prior_slot.key_ct);
        let slot_id_bytes = crate::curve::encode_point(&slot_id);
        let prior_bal_randomness = *balance_randomness
            .get(&slot_id_bytes)
            .ok_or_else(|| SolidusError::MalformedEncoding("account not provisioned".into()))?;

        let (key_ct, r_key) = crate::elgamal::reencrypt(bank_pk, prior_slot.key_ct, rng);
        let key_proof = PlaintextEqProof::prove(PROOF_CTX_STASH_KEY, bank_pk, prior_slot.key_ct, key_ct, r_key, rng);

        let (bal_ct, new_bal_randomness, branch) = if idx == matched_stash_index {
            let r_extra = crate::curve::random_scalar(rng);
            let extra = Ciphertext {
                c1: crate::curve::generator() * r_extra,
                c2: bank_pk * r_extra,
            };
            total_extra_randomness += r_extra;
            (
                prior_slot.bal_ct + delta + extra,
                prior_bal_randomness + delta_randomness + r_extra,
                (1usize, r_extra),
            )
        } else {
            let (bal_ct, r_b) = crate::elgamal::reencrypt(bank_pk, prior_slot.bal_ct, rng);
            total_extra_randomness += r_b;
            (bal_ct, prior_bal_randomness + r_b, (0usize, r_b))
        };
        let new_balance = crate::elgamal::decrypt_balance(enc_params, bank_sk, bal_ct, rng)?;
        if idx == matched_stash_index && !(0..=max_balance).contains(&new_balance) {
            return Err(SolidusError::OutOfRange);
        }

        let diff = bal_ct - prior_slot.bal_ct;
        let (stmt_plain, stmt_shifted) = bal_branch_statements(diff, delta);
        let (real_branch, witness) = branch;
        let bal_proof = OrProof::prove(
            PROOF_CTX_STASH_BAL,
            bank_pk,
            stmt_plain,
            stmt_shifted,
            real_branch,
            witness,
            rng,
        );
        let range_proof = MaxwellRangeProof::prove(
            PROOF_CTX_RANGE,
            bank_pk,
            bal_ct,
            max_balance,
            new_balance,
            new_bal_randomness,
            rng,
        )?;

        new_balance_randomness.insert(slot_id_bytes, new_bal_randomness);
        posterior_stash.push(PvormSlot { key_ct, bal_ct });
        stash_key_proofs.push(key_proof);
        stash_bal_proofs.push(bal_proof);
        stash_range_proofs.push(range_proof);
    }

    let prior_bal_sum = state.stash.iter().fold(Ciphertext::identity(), |acc, s| acc + s.bal_ct);
    let posterior_bal_sum = posterior_stash
        .iter()
        .fold(Ciphertext::identity(), |acc, s| acc + s.bal_ct);
    let aggregate_conservation_proof = PlaintextEqProof::prove(
        PROOF_CTX_CONSERVATION,
        bank_pk,
        prior_bal_sum + delta,
        posterior_bal_sum,
        total_extra_randomness,
        rng,
    );

    // Eviction: root <-> path-child swap on the hash-chained path; every
    // other bucket on the path re-encrypted in place.
    let leaf = eviction_leaf(ledger_seq, state.tree.height());
    let path = state.tree.path_to_leaf(leaf);
    let mut posterior_tree = state.tree.clone();
    let prior_path: Vec<PvormBucket> = path.iter().map(|&n| state.tree.bucket(n).clone()).collect();
    let mut path_key_proofs = Vec::with_capacity(path.len());
    let bucket_size = prior_path[0].capacity();

    for (level, &node) in path.iter().enumerate() {
        let mut proofs = Vec::with_capacity(bucket_size);
        let (source_bucket, same_bucket, real_branch) = if level == 0 {
            (&prior_path[1], &prior_path[0], 1usize)
        } else if level == 1 {
            (&prior_path[0], &prior_path[1], 1usize)
        } else {
            (&prior_path[level], &prior_path[level], 0usize)
        };
        let neighbor_bucket = if level <= 1 {
            None
        } else {
            state.tree.sibling(node).map(|s| state.tree.bucket(s).clone())
        };

        for k in 0..bucket_size {
            let source = source_bucket.slots()[k];
            let (key_ct, r) = crate::elgamal::reencrypt(bank_pk, source.key_ct, rng);
            let (bal_ct, _) = crate::elgamal::reencrypt(bank_pk, source.bal_ct, rng);
            let posterior_slot = PvormSlot { key_ct, bal_ct };

            let (stmt_same, stmt_neighbor) = if level <= 1 {
                let same_prior = same_bucket.slots()[k];
                let neighbor_prior = source_bucket.slots()[k];
                (
                    dleq_from_ciphertext_diff(posterior_slot.key_ct, same_prior.key_ct),
                    dleq_from_ciphertext_diff(posterior_slot.key_ct, neighbor_prior.key_ct),
                )
            } else {
                let same_prior = same_bucket.slots()[k];
                let neighbor_prior = neighbor_bucket
                    .as_ref()
                    .map(|b| b.slots()[k])
                    .unwrap_or(same_prior);
                (
                    dleq_from_ciphertext_diff(posterior_slot.key_ct, same_prior.key_ct),
                    dleq_from_ciphertext_diff(posterior_slot.key_ct, neighbor_prior.key_ct),
                )
            };
            let proof = OrProof::prove(
                PROOF_CTX_KEY_SHUFFLE,
                bank_pk,
                stmt_same,
                stmt_neighbor,
                real_branch,
                r,
                rng,
            );
            posterior_tree.bucket_mut(node).set_slot(k, posterior_slot);
            proofs.push(proof);
        }
        path_key_proofs.push(proofs);
    }
    let posterior_path: Vec<PvormBucket> = path.iter().map(|&n| posterior_tree.bucket(n).clone()).collect();

    let update = PvormUpdate {
        leaf_index: leaf,
        prior_path,
        posterior_path,
        path_key_proofs,
        posterior_stash: posterior_stash.clone(),
        stash_key_proofs,
        stash_bal_proofs,
        stash_range_proofs,
        aggregate_conservation_proof,
        delta,
    };
    let posterior_state = PvormPublicState {
        tree: posterior_tree,
        stash: posterior_stash,
        epoch: state.epoch + 1,
    };
    Ok((update, posterior_state, new_balance_randomness))
}

/// Checks `update` against `prior` and returns the resulting posterior
/// state iff every proof verifies and the shapes match (spec §4.3). Takes
/// no account identity: which stash slot (if any) absorbed `delta` is not
/// observable from this check, only that exactly one slot's worth of
/// balance moved by `delta` across the whole stash (spec §4.3(i)).
pub fn verify(
    prior: &PvormPublicState,
    update: &PvormUpdate,
    bank_pk: Point,
    ledger_seq: u64,
    max_balance: i64,
) -> std::result::Result<PvormPublicState, SolidusError> {
    if update.leaf_index != eviction_leaf(ledger_seq, prior.tree.height()) {
        return Err(SolidusError::InvalidProof);
    }
    let path = prior.tree.path_to_leaf(update.leaf_index);
    if path.len() != update.prior_path.len() || path.len() != update.posterior_path.len() {
        return Err(SolidusError::InvalidProof);
    }
    for (i, &node) in path.iter().enumerate() {
        if update.prior_path[i].slots() != prior.tree.bucket(node).slots() {
            return Err(SolidusError::InvalidProof);
        }
    }
    if update.posterior_stash.len() != prior.stash.len()
        || update.stash_key_proofs.len() != prior.stash.len()
        || update.stash_bal_proofs.len() != prior.stash.len()
        || update.stash_range_proofs.len() != prior.stash.len()
    {
        return Err(SolidusError::InvalidProof);
    }

    let bucket_size = update.prior_path[0].capacity();
    for (level, &node) in path.iter().enumerate() {
        if update.path_key_proofs[level].len() != bucket_size {
            return Err(SolidusError::InvalidProof);
        }
        let neighbor_bucket = if level <= 1 {
            None
        } else {
            prior.tree.sibling(node).map(|s| prior.tree.bucket(s).clone())
        };
        for k in 0..bucket_size {
            let posterior_slot = update.posterior_path[level].slots()[k];
            let (same_prior, neighbor_prior) = if level == 0 {
                (update.prior_path[0].slots()[k], update.prior_path[1].slots()[k])
            } else if level == 1 {
                (update.prior_path[1].slots()[k], update.prior_path[0].slots()[k])
            } else {
                let same_prior = update.prior_path[level].slots()[k];
                let neighbor_prior = neighbor_bucket
                    .as_ref()
                    .map(|b| b.slots()[k])
                    .unwrap_or(same_prior);
                (same_prior, neighbor_prior)
            };
            let stmt_same = dleq_from_ciphertext_diff(posterior_slot.key_ct, same_prior.key_ct);
            let stmt_neighbor = dleq_from_ciphertext_diff(posterior_slot.key_ct, neighbor_prior.key_ct);
            if !update.path_key_proofs[level][k].verify(PROOF_CTX_KEY_SHUFFLE, bank_pk, stmt_same, stmt_neighbor) {
                return Err(SolidusError::InvalidProof);
            }
        }
    }

    for idx in 0..update.posterior_stash.len() {
        let prior_slot = prior.stash[idx];
        let posterior_slot = update.posterior_stash[idx];
        if !update.stash_key_proofs[idx].verify(PROOF_CTX_STASH_KEY, bank_pk, prior_slot.key_ct, posterior_slot.key_ct) {
            return Err(SolidusError::InvalidProof);
        }
        let diff = posterior_slot.bal_ct - prior_slot.bal_ct;
        let (stmt_plain, stmt_shifted) = bal_branch_statements(diff, update.delta);
        if !update.stash_bal_proofs[idx].verify(PROOF_CTX_STASH_BAL, bank_pk, stmt_plain, stmt_shifted) {
            return Err(SolidusError::InvalidProof);
        }
        if !update.stash_range_proofs[idx].verify(PROOF_CTX_RANGE, bank_pk, posterior_slot.bal_ct, max_balance) {
            return Err(SolidusError::InvalidProof);
        }
    }

    let prior_bal_sum = prior.stash.iter().fold(Ciphertext::identity(), |acc, s| acc + s.bal_ct);
    let posterior_bal_sum = update
        .posterior_stash
        .iter()
        .fold(Ciphertext::identity(), |acc, s| acc + s.bal_ct);
    if !update.aggregate_conservation_proof.verify(
        PROOF_CTX_CONSERVATION,
        bank_pk,
        prior_bal_sum + update.delta,
        posterior_bal_sum,
    ) {
        return Err(SolidusError::InvalidProof);
    }

    let mut posterior_tree = prior.tree.clone();
    for (level, &node) in path.iter().enumerate() {
        *posterior_tree.bucket_mut(node) = update.posterior_path[level].clone();
    }
    Ok(PvormPublicState {
        tree: posterior_tree,
        stash: update.posterior_stash.clone(),
        epoch: prior.epoch + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PvormParams;
    use crate::curve::{generator, random_scalar};
    use crate::elgamal::encrypt_point;
    use std::collections::HashMap;

    struct Fixture {
        enc_params: EncryptionParams,
        bank_sk: Scalar,
        bank_pk: Point,
        state: PvormPublicState,
        balance_randomness: HashMap<PointBytes, Scalar>,
        account_pk: Point,
    }

    /// Locates the stash slot holding `account_pk` by the same bank-private
    /// decryption `lookup_and_update` itself uses — tests have no public
    /// field to read this off of, by design (see module docs).
    fn find_slot(bank_sk: Scalar, stash: &[PvormSlot], account_pk: Point) -> usize {
        let id = account_id(account_pk);
        stash
            .iter()
            .position(|slot| crate::elgamal::decrypt_point(bank_sk, slot.key_ct) == id)
            .unwrap()
    }

    fn setup() -> Fixture {
        let mut rng = rand::thread_rng();
        let enc_params = EncryptionParams::new(1_000_000, 64);
        let bank_sk = random_scalar(&mut rng);
        let bank_pk = generator() * bank_sk;
        let params = PvormParams::new(3, 2, 4);
        let mut state = PvormPublicState::new(&params, bank_pk, &mut rng);

        let account_sk = random_scalar(&mut rng);
        let account_pk = generator() * account_sk;
        let id = account_id(account_pk);
        let (key_ct, _r_key) = encrypt_point(bank_pk, id, &mut rng);
        let (bal_ct, r_bal) = crate::elgamal::encrypt_balance(&enc_params, bank_pk, 100, &mut rng).unwrap();
        state.stash.push(PvormSlot { key_ct, bal_ct });

        let mut balance_randomness = HashMap::new();
        balance_randomness.insert(crate::curve::encode_point(&id), r_bal);

        Fixture {
            enc_params,
            bank_sk,
            bank_pk,
            state,
            balance_randomness,
            account_pk,
        }
    }

    #[test]
    fn credit_updates_balance_and_verifies() {
        let mut f = setup();
        let mut rng = rand::thread_rng();
        let (delta, r_delta) = crate::elgamal::encrypt_balance(&f.enc_params, f.bank_pk, 25, &mut rng).unwrap();

        let (update, posterior, new_balance_randomness) = lookup_and_update(
            &f.enc_params,
            f.bank_sk,
            f.bank_pk,
            &f.state,
            f.account_pk,
            delta,
            r_delta,
            1_000_000,
            7,
            &f.balance_randomness,
            &mut rng,
        )
        .unwrap();
        f.balance_randomness = new_balance_randomness;

        let matched = find_slot(f.bank_sk, &posterior.stash, f.account_pk);
        let new_balance =
            crate::elgamal::decrypt_balance(&f.enc_params, f.bank_sk, posterior.stash[matched].bal_ct, &mut rng).unwrap();
        assert_eq!(new_balance, 125);

        let verified = verify(&f.state, &update, f.bank_pk, 7, 1_000_000).unwrap();
        let verified_matched = find_slot(f.bank_sk, &verified.stash, f.account_pk);
        let reverified_balance = crate::elgamal::decrypt_balance(
            &f.enc_params,
            f.bank_sk,
            verified.stash[verified_matched].bal_ct,
            &mut rng,
        )
        .unwrap();
        assert_eq!(reverified_balance, 125);
    }

    #[test]
    fn debit_below_zero_rejected_without_mutating() {
        let mut f = setup();
        let mut rng = rand::thread_rng();
        let (delta, r_delta) = crate::elgamal::encrypt_balance(&f.enc_params, f.bank_pk, -500, &mut rng).unwrap();

        let err = lookup_and_update(
            &f.enc_params,
            f.bank_sk,
            f.bank_pk,
            &f.state,
            f.account_pk,
            delta,
            r_delta,
            1_000_000,
            7,
            &f.balance_randomness,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, SolidusError::OutOfRange);
    }

    #[test]
    fn tampered_range_proof_rejected_by_verify() {
        let mut f = setup();
        let mut rng = rand::thread_rng();
        let (delta, r_delta) = crate::elgamal::encrypt_balance(&f.enc_params, f.bank_pk, 25, &mut rng).unwrap();
        let (mut update, _posterior, _new_balance_randomness) = lookup_and_update(
            &f.enc_params,
            f.bank_sk,
            f.bank_pk,
            &f.state,
            f.account_pk,
            delta,
            r_delta,
            1_000_000,
            7,
            &f.balance_randomness,
            &mut rng,
        )
        .unwrap();
        let matched = find_slot(f.bank_sk, &update.posterior_stash, f.account_pk);
        update.posterior_stash[matched].key_ct.c1 = update.posterior_stash[matched].key_ct.c1 + generator();
        assert!(verify(&f.state, &update, f.bank_pk, 7, 1_000_000).is_err());
    }

    #[test]
    fn reordering_stash_slots_is_rejected() {
        // Each slot's proofs are bound to that slot's own prior ciphertext;
        // swapping two slots' posteriors/proofs across positions must fail,
        // since a slot's per-index proof no longer matches its prior.
        let mut rng = rand::thread_rng();
        let enc_params = EncryptionParams::new(1_000_000, 64);
        let bank_sk = random_scalar(&mut rng);
        let bank_pk = generator() * bank_sk;
        let params = PvormParams::new(3, 2, 4);
        let mut state = PvormPublicState::new(&params, bank_pk, &mut rng);
        let mut balance_randomness = HashMap::new();

        let mut account_pks = Vec::new();
        for balance in [100i64, 200] {
            let account_sk = random_scalar(&mut rng);
            let account_pk = generator() * account_sk;
            let id = account_id(account_pk);
            let (key_ct, _) = encrypt_point(bank_pk, id, &mut rng);
            let (bal_ct, r_bal) = crate::elgamal::encrypt_balance(&enc_params, bank_pk, balance, &mut rng).unwrap();
            state.stash.push(PvormSlot { key_ct, bal_ct });
            balance_randomness.insert(crate::curve::encode_point(&id), r_bal);
            account_pks.push(account_pk);
        }

        let (delta, r_delta) = crate::elgamal::encrypt_balance(&enc_params, bank_pk, 25, &mut rng).unwrap();
        let (mut update, _posterior, _new_balance_randomness) = lookup_and_update(
            &enc_params,
            bank_sk,
            bank_pk,
            &state,
            account_pks[0],
            delta,
            r_delta,
            1_000_000,
            7,
            &balance_randomness,
            &mut rng,
        )
        .unwrap();

        // Swap the two stash slots' posteriors and proofs, trying to make
        // it look as if the other account moved instead.
        update.posterior_stash.swap(0, 1);
        update.stash_key_proofs.swap(0, 1);
        update.stash_bal_proofs.swap(0, 1);
        update.stash_range_proofs.swap(0, 1);
        assert!(verify(&state, &update, bank_pk, 7, 1_000_000).is_err());
    }

    #[test]
    fn tampered_delta_rejected_by_conservation_check() {
        let mut f = setup();
        let mut rng = rand::thread_rng();
        let (delta, r_delta) = crate::elgamal::encrypt_balance(&f.enc_params, f.bank_pk, 25, &mut rng).unwrap();
        let (mut update, _posterior, _new_balance_randomness) = lookup_and_update(
            &f.enc_params,
            f.bank_sk,
            f.bank_pk,
            &f.state,
            f.account_pk,
            delta,
            r_delta,
            1_000_000,
            7,
            &f.balance_randomness,
            &mut rng,
        )
        .unwrap();
        let (bigger_delta, _) = crate::elgamal::encrypt_balance(&f.enc_params, f.bank_pk, 50, &mut rng).unwrap();
        update.delta = bigger_delta;
        assert!(verify(&f.state, &update, f.bank_pk, 7, 1_000_000).is_err());
    }
}
