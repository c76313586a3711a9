//! A bank's settlement logic (spec §4.5, §5): the sender half (propose a
//! transfer, debit locally, post the header and its own update) and the
//! receiver half (verify an observed header, decrypt its own destination
//! account, credit locally, post the matching update).
//!
//! Grounded in the teacher's worker pattern (`ledger/worker.rs`): one
//! `#[instrument]`-ed entry point per inbound event, `tracing::{info,warn}`
//! at the same granularity, and the same policy of matching on error kind to
//! decide retry-vs-fatal (here driven by [`crate::error::SolidusError`]
//! rather than the teacher's own `WorkerError`).

use rand::RngCore;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, instrument, warn};

use crate::curve::{Point, Scalar};
use crate::elgamal::{decrypt_point, encrypt_balance, EncryptionParams};
use crate::error::{Result, SolidusError};
use crate::ledger::{transaction_id, Ledger, LedgerEntry, TxId};
use crate::pvorm::Pvorm;
use crate::transaction::{TransactionHeader, TransactionRequest};

use super::events::BankEvent;
use super::nonce::NonceTable;
use super::state::TxSlot;

const LOG_TARGET: &str = "solidus::bank::handler";

/// One bank's full runtime state: its PVORM, its anti-replay nonce table,
/// its single in-flight transaction slot, and the ledger it settles
/// through. A bank processes at most one transaction at a time (spec
/// §4.5's single-slot contract), so the heavier fields live behind one
/// `Mutex` rather than per-field locks.
pub struct Bank {
    bank_sk: Scalar,
    bank_pk: Point,
    enc_params: EncryptionParams,
    max_balance: i64,
    ledger: std::sync::Arc<dyn Ledger>,
    inner: Mutex<BankInner>,
    events: mpsc::UnboundedSender<BankEvent>,
}

struct BankInner {
    pvorm: Pvorm,
    nonces: NonceTable,
    slot: TxSlot,
}

impl Bank {
    pub fn new(
        bank_sk: Scalar,
        bank_pk: Point,
        enc_params: EncryptionParams,
        shape: crate::config::PvormParams,
        max_balance: i64,
        ledger: std::sync::Arc<dyn Ledger>,
        rng: &mut impl RngCore,
    ) -> (Self, mpsc::UnboundedReceiver<BankEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let pvorm = Pvorm::new(enc_params.clone(), shape, bank_pk, rng);
        let bank = Self {
            bank_sk,
            bank_pk,
            enc_params,
            max_balance,
            ledger,
            inner: Mutex::new(BankInner {
                pvorm,
                nonces: NonceTable::new(),
                slot: TxSlot::idle(),
            }),
            events,
        };
        (bank, rx)
    }

    pub fn public_key(&self) -> Point {
        self.bank_pk
    }

    /// A snapshot of this bank's current public PVORM state, plus the
    /// ledger sequence number it reflects — the baseline a
    /// [`super::observer::BankObserver`] needs before it can replay forward
    /// from the ledger alone (account provisioning is local setup, never a
    /// ledger entry, so an observer cannot recover it any other way).
    pub async fn state_snapshot(&self) -> (crate::pvorm::PvormPublicState, u64) {
        let inner = self.inner.lock().await;
        (inner.pvorm.public_state().clone(), self.ledger.current_len())
    }

    /// Decrypts `account_pubkey`'s current balance from this bank's own
    /// PVORM stash. A bank-local read, not a protocol operation — no proof
    /// is produced or needed since the caller already holds `bank_sk`.
    pub async fn balance_of(&self, account_pubkey: Point, rng: &mut impl RngCore) -> Result<i64> {
        let inner = self.inner.lock().await;
        let id = crate::pvorm::account_id::account_id(account_pubkey);
        let slot = inner
            .pvorm
            .public_state()
            .stash
            .iter()
            .find(|slot| decrypt_point(self.bank_sk, slot.key_ct) == id)
            .ok_or_else(|| SolidusError::MalformedEncoding("account not provisioned".into()))?;
        crate::elgamal::decrypt_balance(&self.enc_params, self.bank_sk, slot.bal_ct, rng)
    }

    pub async fn provision_account(
        &self,
        account_pubkey: Point,
        initial_balance: i64,
        rng: &mut impl RngCore,
    ) -> Result<()> {
        self.inner
            .lock()
            .await
            .pvorm
            .provision_account(account_pubkey, initial_balance, rng)
    }

    /// Sender-side flow (spec §5): verify and admit `request`, build its
    /// header, debit the source account locally, and post `Header` then
    /// `SenderUpdate` to the ledger. Returns the header's transaction id and
    /// `receiver_value`'s randomizer, which the caller must relay
    /// out-of-band to the destination bank (spec §1 scopes bank-to-bank
    /// networking out; see [`crate::transaction::TransactionHeader::build`]).
    #[instrument(skip(self, request, rng), target = LOG_TARGET, fields(nonce = request.nonce))]
    pub async fn propose_transfer(
        &self,
        request: TransactionRequest,
        value: i64,
        value_randomness: Scalar,
        rng: &mut impl RngCore,
    ) -> Result<(TxId, Scalar)> {
        request.verify_signature()?;
        let tx_id = transaction_id(&request);
        let source_account_pubkey = request.source_account_pubkey;

        let mut inner = self.inner.lock().await;
        inner.nonces.check_and_record(source_account_pubkey, request.nonce)?;
        inner.slot.propose(tx_id)?;

        let (header, r_recv) =
            match TransactionHeader::build(request, value, value_randomness, self.max_balance, rng) {
                Ok(built) => built,
                Err(err) => {
                    warn!(target: LOG_TARGET, %err, "header build failed, resetting slot");
                    inner.slot.reset();
                    return Err(err);
                }
            };

        // The header goes on the ledger first (spec §6's entry ordering);
        // retry its own slot claim the same way `apply_and_post` retries a
        // PVORM update, since both share the same `cas_append` race.
        loop {
            let ledger_seq = self.ledger.current_len();
            match self
                .ledger
                .cas_append(ledger_seq, LedgerEntry::Header { tx_id, header: header.clone() })
                .await
            {
                Ok(_) => break,
                Err(SolidusError::LedgerConflict) => continue,
                Err(err) => {
                    inner.slot.reset();
                    return Err(err);
                }
            }
        }

        inner.slot.begin_crediting(tx_id)?;
        let (delta, r_delta) = match encrypt_balance(&self.enc_params, self.bank_pk, -value, rng) {
            Ok(pair) => pair,
            Err(err) => {
                inner.slot.reset();
                return Err(err);
            }
        };

        let result = self
            .apply_and_post(
                &mut inner,
                tx_id,
                source_account_pubkey,
                delta,
                r_delta,
                rng,
                |tx_id, update| LedgerEntry::SenderUpdate { tx_id, update },
            )
            .await;

        match result {
            Ok(()) => {
                inner.slot.settle(tx_id)?;
                inner.slot.reset();
                drop(inner);
                info!(target: LOG_TARGET, "sender half settled");
                let _ = self.events.send(BankEvent::TransactionSettled { tx_id });
                Ok((tx_id, r_recv))
            }
            Err(err) => {
                inner.slot.reset();
                drop(inner);
                let _ = self.events.send(BankEvent::TransactionFailed {
                    tx_id,
                    error: err.clone(),
                });
                Err(err)
            }
        }
    }

    /// Receiver-side flow (spec §5): verify a header posted by the peer
    /// bank, decrypt the destination account from `dest_account_ciphertext`,
    /// credit it locally, and post `ReceiverUpdate`. `r_recv` is the
    /// randomizer the sending bank generated for `header.receiver_value`,
    /// relayed out-of-band alongside the header.
    #[instrument(skip(self, header, rng), target = LOG_TARGET)]
    pub async fn receive_transfer(
        &self,
        header: &TransactionHeader,
        r_recv: Scalar,
        rng: &mut impl RngCore,
    ) -> Result<TxId> {
        header.verify_proofs(self.max_balance)?;
        if header.request.dest_bank_pubkey != self.bank_pk {
            return Err(SolidusError::MalformedEncoding(
                "header addressed to a different bank".into(),
            ));
        }
        let tx_id = transaction_id(&header.request);
        let dest_account_pubkey = decrypt_point(self.bank_sk, header.request.dest_account_ciphertext);

        let mut inner = self.inner.lock().await;
        inner.slot.observe_header(tx_id)?;
        inner.slot.begin_crediting(tx_id)?;

        let result = self
            .apply_and_post(
                &mut inner,
                tx_id,
                dest_account_pubkey,
                header.receiver_value,
                r_recv,
                rng,
                |tx_id, update| LedgerEntry::ReceiverUpdate { tx_id, update },
            )
            .await;

        match result {
            Ok(()) => {
                inner.slot.settle(tx_id)?;
                inner.slot.reset();
                drop(inner);
                info!(target: LOG_TARGET, "receiver half settled");
                let _ = self.events.send(BankEvent::TransactionSettled { tx_id });
                Ok(tx_id)
            }
            Err(err) => {
                inner.slot.reset();
                drop(inner);
                let _ = self.events.send(BankEvent::TransactionFailed {
                    tx_id,
                    error: err.clone(),
                });
                Err(err)
            }
        }
    }

    /// Computes a PVORM update against the current ledger tip, appends it
    /// with compare-and-append, retries on `LedgerConflict` (spec §4.6, the
    /// only variant this layer retries locally), and commits the posterior
    /// state only once the append actually lands.
    #[allow(clippy::too_many_arguments)]
    async fn apply_and_post(
        &self,
        inner: &mut BankInner,
        tx_id: TxId,
        account_pubkey: Point,
        delta: crate::elgamal::Ciphertext,
        delta_randomness: Scalar,
        rng: &mut impl RngCore,
        wrap: impl Fn(TxId, crate::pvorm::PvormUpdate) -> LedgerEntry,
    ) -> Result<()> {
        const MAX_ATTEMPTS: u32 = 8;
        for attempt in 0..MAX_ATTEMPTS {
            let ledger_seq = self.ledger.current_len();
            let (update, posterior, new_balance_randomness) = inner.pvorm.peek_update(
                self.bank_sk,
                account_pubkey,
                delta,
                delta_randomness,
                self.max_balance,
                ledger_seq,
                rng,
            )?;
            match self.ledger.cas_append(ledger_seq, wrap(tx_id, update)).await {
                Ok(_) => {
                    inner.pvorm.commit_update(posterior, new_balance_randomness);
                    inner.slot.begin_posting(tx_id)?;
                    return Ok(());
                }
                Err(SolidusError::LedgerConflict) => {
                    warn!(target: LOG_TARGET, attempt, "ledger append lost the race, retrying");
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
        Err(SolidusError::LedgerConflict)
    }
}
