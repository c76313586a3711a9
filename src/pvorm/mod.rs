//! L3 — the Publicly Verifiable Oblivious RAM Machine (spec §3-§4): an
//! encrypted tree-plus-stash structure holding every account's
//! `(key, balance)` slot, updated through a Sigma-proof-wrapped diff that
//! lets any observer re-derive the posterior state without learning which
//! account changed.

pub mod account_id;
pub mod bucket;
pub mod eviction;
pub mod position_map;
pub mod slot;
pub mod stash;
pub mod tree;
pub mod update;

use std::collections::HashMap;

use rand::RngCore;

use crate::config::PvormParams;
use crate::curve::{Point, PointBytes, Scalar};
use crate::elgamal::{Ciphertext, EncryptionParams};
use crate::error::Result;
use account_id::account_id;
pub use update::{PvormPublicState, PvormUpdate};

/// A bank's view of its own PVORM: the replicated public (ciphertext-only)
/// state plus the private bookkeeping only the owning bank needs —
/// cumulative randomness for each live account's balance ciphertext,
/// tracked so later updates can prove relationships against it without
/// re-deriving a discrete log. Every stash slot's balance randomness moves
/// on every update (every slot is re-encrypted each round, not just the
/// touched one), so this is kept current for every provisioned account.
pub struct Pvorm {
    enc_params: EncryptionParams,
    shape: PvormParams,
    bank_pk: Point,
    public: PvormPublicState,
    balance_randomness: HashMap<PointBytes, Scalar>,
}

impl Pvorm {
    pub fn new(enc_params: EncryptionParams, shape: PvormParams, bank_pk: Point, rng: &mut impl RngCore) -> Self {
        let public = PvormPublicState::new(&shape, bank_pk, rng);
        Self {
            enc_params,
            shape,
            bank_pk,
            public,
            balance_randomness: HashMap::new(),
        }
    }

    /// Builds a replica directly from a snapshot of another instance's
    /// public state — for an observer that has no secret key of its own and
    /// only ever calls [`Pvorm::apply_verified`] (spec §2, §5's
    /// ledger-driven replication; see `crate::bank::observer`).
    pub fn from_snapshot(
        enc_params: EncryptionParams,
        shape: PvormParams,
        bank_pk: Point,
        public: PvormPublicState,
    ) -> Self {
        Self {
            enc_params,
            shape,
            bank_pk,
            public,
            balance_randomness: HashMap::new(),
        }
    }

    pub fn public_state(&self) -> &PvormPublicState {
        &self.public
    }

    pub fn shape(&self) -> PvormParams {
        self.shape
    }

    /// Admin-only bootstrap: directly inserts a new account's slot into the
    /// stash. Account provisioning/removal is out of spec's scope as a
    /// protocol operation (spec §3 Non-goals); this is local setup, not a
    /// `PVORMUpdate`, and produces no proof.
    pub fn provision_account(
        &mut self,
        account_pubkey: Point,
        initial_balance: i64,
        rng: &mut impl RngCore,
    ) -> Result<()> {
        if self.public.stash.len() >= self.shape.stash_capacity {
            return Err(crate::error::SolidusError::StashOverflow);
        }
        let id = account_id(account_pubkey);
        let id_bytes = crate::curve::encode_point(&id);
        let (key_ct, _r_key) = crate::elgamal::encrypt_point(self.bank_pk, id, rng);
        let (bal_ct, r_bal) =
            crate::elgamal::encrypt_balance(&self.enc_params, self.bank_pk, initial_balance, rng)?;
        self.public.stash.push(crate::pvorm::slot::PvormSlot { key_ct, bal_ct });
        self.balance_randomness.insert(id_bytes, r_bal);
        Ok(())
    }

    /// Looks up `account_pubkey`'s slot, applies `delta` (whose randomness
    /// the caller already knows — see `crate::bank`), and returns the
    /// proof bundle. Does not mutate `self` on error.
    #[allow(clippy::too_many_arguments)]
    pub fn lookup_and_update(
        &mut self,
        bank_sk: Scalar,
        account_pubkey: Point,
        delta: Ciphertext,
        delta_randomness: Scalar,
        max_balance: i64,
        ledger_seq: u64,
        rng: &mut impl RngCore,
    ) -> Result<PvormUpdate> {
        let (bundle, posterior, new_balance_randomness) = update::lookup_and_update(
            &self.enc_params,
            bank_sk,
            self.bank_pk,
            &self.public,
            account_pubkey,
            delta,
            delta_randomness,
            max_balance,
            ledger_seq,
            &self.balance_randomness,
            rng,
        )?;
        self.public = posterior;
        self.balance_randomness = new_balance_randomness;
        Ok(bundle)
    }

    /// Computes the proof bundle and posterior state for crediting/debiting
    /// `account_pubkey` at `ledger_seq`, without committing it to `self`.
    /// Paired with [`Pvorm::commit_update`] so a caller can append the
    /// update to the ledger first and only fold it into local state once
    /// the append actually lands at the `ledger_seq` it was built for —
    /// a `LedgerConflict` then costs a retry with a fresh `ledger_seq`, not
    /// a state rollback.
    #[allow(clippy::too_many_arguments)]
    pub fn peek_update(
        &self,
        bank_sk: Scalar,
        account_pubkey: Point,
        delta: Ciphertext,
        delta_randomness: Scalar,
        max_balance: i64,
        ledger_seq: u64,
        rng: &mut impl RngCore,
    ) -> Result<(PvormUpdate, PvormPublicState, HashMap<PointBytes, Scalar>)> {
        update::lookup_and_update(
            &self.enc_params,
            bank_sk,
            self.bank_pk,
            &self.public,
            account_pubkey,
            delta,
            delta_randomness,
            max_balance,
            ledger_seq,
            &self.balance_randomness,
            rng,
        )
    }

    /// Folds a `(update, posterior, ..)` bundle produced by [`Pvorm::peek_update`]
    /// into `self` once its ledger append has succeeded. Every live
    /// account's balance randomness moves on each update (every stash slot
    /// is re-encrypted), so the whole map is replaced, not just one entry.
    pub fn commit_update(&mut self, posterior: PvormPublicState, new_balance_randomness: HashMap<PointBytes, Scalar>) {
        self.balance_randomness = new_balance_randomness;
        self.public = posterior;
    }

    /// Verifies a (possibly foreign, possibly this bank's own) update
    /// against the current replicated state and, on success, advances it.
    /// Takes no account identity — an observer driving its state purely
    /// from ledger entries (spec §2, §5) never learns or needs which
    /// account a given update touched.
    pub fn apply_verified(&mut self, update: &PvormUpdate, ledger_seq: u64, max_balance: i64) -> Result<()> {
        let posterior = update::verify(&self.public, update, self.bank_pk, ledger_seq, max_balance)?;
        self.public = posterior;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{generator, random_scalar};

    #[test]
    fn provision_then_credit_round_trip() {
        let mut rng = rand::thread_rng();
        let bank_sk = random_scalar(&mut rng);
        let bank_pk = generator() * bank_sk;
        let enc_params = EncryptionParams::new(1_000_000, 64);
        let shape = PvormParams::new(3, 2, 4);
        let mut pvorm = Pvorm::new(enc_params.clone(), shape, bank_pk, &mut rng);

        let account_sk = random_scalar(&mut rng);
        let account_pk = generator() * account_sk;
        pvorm.provision_account(account_pk, 50, &mut rng).unwrap();

        let (delta, r_delta) = crate::elgamal::encrypt_balance(&enc_params, bank_pk, 10, &mut rng).unwrap();
        let _update = pvorm
            .lookup_and_update(bank_sk, account_pk, delta, r_delta, 1_000_000, 1, &mut rng)
            .unwrap();

        let id = account_id(account_pk);
        let slot = pvorm
            .public_state()
            .stash
            .iter()
            .find(|slot| crate::elgamal::decrypt_point(bank_sk, slot.key_ct) == id)
            .unwrap();
        let balance = crate::elgamal::decrypt_balance(&enc_params, bank_sk, slot.bal_ct, &mut rng).unwrap();
        assert_eq!(balance, 60);
    }

    #[test]
    fn apply_verified_replicates_a_peers_update() {
        let mut rng = rand::thread_rng();
        let bank_sk = random_scalar(&mut rng);
        let bank_pk = generator() * bank_sk;
        let enc_params = EncryptionParams::new(1_000_000, 64);
        let shape = PvormParams::new(3, 2, 4);
        let mut prover = Pvorm::new(enc_params.clone(), shape, bank_pk, &mut rng);
        let mut observer = Pvorm::new(enc_params.clone(), shape, bank_pk, &mut rng);

        let account_sk = random_scalar(&mut rng);
        let account_pk = generator() * account_sk;
        prover.provision_account(account_pk, 50, &mut rng).unwrap();
        observer.provision_account(account_pk, 50, &mut rng).unwrap();

        let (delta, r_delta) = crate::elgamal::encrypt_balance(&enc_params, bank_pk, 10, &mut rng).unwrap();
        let update = prover
            .lookup_and_update(bank_sk, account_pk, delta, r_delta, 1_000_000, 1, &mut rng)
            .unwrap();

        observer.apply_verified(&update, 1, 1_000_000).unwrap();

        let id = account_id(account_pk);
        let slot = observer
            .public_state()
            .stash
            .iter()
            .find(|slot| crate::elgamal::decrypt_point(bank_sk, slot.key_ct) == id)
            .unwrap();
        let balance = crate::elgamal::decrypt_balance(&enc_params, bank_sk, slot.bal_ct, &mut rng).unwrap();
        assert_eq!(balance, 60);
    }

    #[test]
    fn conservation_holds_over_n_sequential_updates() {
        // Property 6 (spec §8): total decrypted balance across an initially
        // balanced stash equals the initial total plus every applied delta,
        // after a whole sequence of updates touching different accounts.
        let mut rng = rand::thread_rng();
        let bank_sk = random_scalar(&mut rng);
        let bank_pk = generator() * bank_sk;
        let enc_params = EncryptionParams::new(1_000_000, 64);
        let shape = PvormParams::new(3, 2, 4);
        let mut pvorm = Pvorm::new(enc_params.clone(), shape, bank_pk, &mut rng);

        let mut accounts = Vec::new();
        let mut initial_total = 0i64;
        for balance in [100i64, 250, 75] {
            let sk = random_scalar(&mut rng);
            let pk = generator() * sk;
            pvorm.provision_account(pk, balance, &mut rng).unwrap();
            accounts.push(pk);
            initial_total += balance;
        }

        let deltas = [10i64, -30, 45, -5, 20, -60, 15, 8, -12, 33];
        let mut applied_total = 0i64;
        for (seq, &delta) in deltas.iter().enumerate() {
            let account = accounts[seq % accounts.len()];
            let (ct, r) = crate::elgamal::encrypt_balance(&enc_params, bank_pk, delta, &mut rng).unwrap();
            pvorm
                .lookup_and_update(bank_sk, account, ct, r, 1_000_000, seq as u64, &mut rng)
                .unwrap();
            applied_total += delta;
        }

        let total: i64 = pvorm
            .public_state()
            .stash
            .iter()
            .map(|slot| crate::elgamal::decrypt_balance(&enc_params, bank_sk, slot.bal_ct, &mut rng).unwrap())
            .sum();
        assert_eq!(total, initial_total + applied_total);
    }

    #[test]
    fn stash_overflow_on_provisioning_past_capacity() {
        let mut rng = rand::thread_rng();
        let bank_sk = random_scalar(&mut rng);
        let bank_pk = generator() * bank_sk;
        let enc_params = EncryptionParams::new(1_000_000, 64);
        let shape = PvormParams::new(2, 2, 2);
        let mut pvorm = Pvorm::new(enc_params, shape, bank_pk, &mut rng);

        for _ in 0..2 {
            let sk = random_scalar(&mut rng);
            pvorm
                .provision_account(generator() * sk, 0, &mut rng)
                .unwrap();
        }
        let sk = random_scalar(&mut rng);
        let err = pvorm.provision_account(generator() * sk, 0, &mut rng).unwrap_err();
        assert_eq!(err, crate::error::SolidusError::StashOverflow);
    }
}
