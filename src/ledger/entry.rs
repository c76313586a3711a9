//! On-ledger entry variants (spec §6): `{Header, SenderUpdate,
//! ReceiverUpdate}`, each carrying the transaction id `H(TransactionRequest)`.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::pvorm::PvormUpdate;
use crate::signing::Signable;
use crate::transaction::{TransactionHeader, TransactionRequest};

pub type TxId = [u8; 32];

/// Derives a transaction's id from its request: `H(TransactionRequest)`,
/// the value every ledger entry for that transaction carries (spec §6).
pub fn transaction_id(request: &TransactionRequest) -> TxId {
    let mut hasher = Keccak256::new();
    hasher.update(request.to_signing_bytes());
    let digest = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&digest);
    id
}

/// One entry on the append-only ledger.
#[derive(Clone, Serialize, Deserialize)]
pub enum LedgerEntry {
    Header { tx_id: TxId, header: TransactionHeader },
    SenderUpdate { tx_id: TxId, update: PvormUpdate },
    ReceiverUpdate { tx_id: TxId, update: PvormUpdate },
}

impl LedgerEntry {
    pub fn tx_id(&self) -> TxId {
        match self {
            LedgerEntry::Header { tx_id, .. } => *tx_id,
            LedgerEntry::SenderUpdate { tx_id, .. } => *tx_id,
            LedgerEntry::ReceiverUpdate { tx_id, .. } => *tx_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{generator, random_scalar};
    use crate::elgamal::{encrypt_balance, encrypt_point, EncryptionParams};

    #[test]
    fn transaction_id_is_deterministic_and_ignores_signature() {
        let mut rng = rand::thread_rng();
        let sk = random_scalar(&mut rng);
        let pk = generator() * sk;
        let source_bank_pk = generator() * random_scalar(&mut rng);
        let dest_bank_pk = generator() * random_scalar(&mut rng);
        let dest_account_pk = generator() * random_scalar(&mut rng);
        let (dest_ct, _) = encrypt_point(dest_bank_pk, dest_account_pk, &mut rng);
        let params = EncryptionParams::new(1024, 1);
        let (value_ct, _) = encrypt_balance(&params, source_bank_pk, 10, &mut rng).unwrap();

        let request = TransactionRequest::sign(
            sk,
            pk,
            source_bank_pk,
            dest_bank_pk,
            dest_ct,
            value_ct,
            1,
            &mut rng,
        );
        let id_a = transaction_id(&request);

        // Re-signing the same fields (fresh randomness in the signature)
        // must not change the derived transaction id.
        let resigned = TransactionRequest::sign(
            sk,
            pk,
            source_bank_pk,
            dest_bank_pk,
            dest_ct,
            value_ct,
            1,
            &mut rng,
        );
        let id_b = transaction_id(&resigned);
        assert_eq!(id_a, id_b);
    }
}
