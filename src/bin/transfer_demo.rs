//! End-to-end walkthrough of a single confidential transfer between two
//! banks over a shared in-memory ledger (spec §3, §5): provision one
//! account at each bank, sign a `TransactionRequest`, and settle both
//! halves.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::filter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use solidus::bank::Bank;
use solidus::config::PvormParams;
use solidus::curve::{generator, random_scalar};
use solidus::elgamal::{encrypt_balance, encrypt_point, EncryptionParams};
use solidus::ledger::MemoryLedger;
use solidus::transaction::{TransactionHeader, TransactionRequest};

fn setup_tracing() -> tracing::subscriber::DefaultGuard {
    let filter = filter::Targets::new().with_default(tracing::Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .set_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = setup_tracing();
    let mut rng = StdRng::seed_from_u64(7);

    let enc_params = EncryptionParams::new(1_000_000, 64);
    let shape = PvormParams::new(4, 4, 8);
    let ledger: Arc<dyn solidus::ledger::Ledger> = Arc::new(MemoryLedger::new());

    let source_bank_sk = random_scalar(&mut rng);
    let source_bank_pk = generator() * source_bank_sk;
    let (source_bank, mut source_events) = Bank::new(
        source_bank_sk,
        source_bank_pk,
        enc_params.clone(),
        shape,
        1_000_000,
        ledger.clone(),
        &mut rng,
    );

    let dest_bank_sk = random_scalar(&mut rng);
    let dest_bank_pk = generator() * dest_bank_sk;
    let (dest_bank, mut dest_events) = Bank::new(
        dest_bank_sk,
        dest_bank_pk,
        enc_params.clone(),
        shape,
        1_000_000,
        ledger.clone(),
        &mut rng,
    );

    let alice_sk = random_scalar(&mut rng);
    let alice_pk = generator() * alice_sk;
    source_bank.provision_account(alice_pk, 500, &mut rng).await?;

    let bob_sk = random_scalar(&mut rng);
    let bob_pk = generator() * bob_sk;
    dest_bank.provision_account(bob_pk, 0, &mut rng).await?;

    let (dest_account_ciphertext, _) = encrypt_point(dest_bank_pk, bob_pk, &mut rng);
    let (value_ciphertext, value_randomness) = encrypt_balance(&enc_params, source_bank_pk, 125, &mut rng)?;

    let request = TransactionRequest::sign(
        alice_sk,
        alice_pk,
        source_bank_pk,
        dest_bank_pk,
        dest_account_ciphertext,
        value_ciphertext,
        1,
        &mut rng,
    );

    tracing::info!("alice requests a transfer of 125 to bob");
    let (tx_id, r_recv) = source_bank
        .propose_transfer(request.clone(), 125, value_randomness, &mut rng)
        .await?;
    let _ = source_events.recv().await;

    // Rebuilding the header here only replays what the sending bank already
    // posted to the ledger; a real driver would read it back from there.
    let (header, _) = TransactionHeader::build(request, 125, value_randomness, 1_000_000, &mut rng)?;
    dest_bank.receive_transfer(&header, r_recv, &mut rng).await?;
    let _ = dest_events.recv().await;

    tracing::info!(tx_id = hex::encode(tx_id), "transfer settled on both banks");
    Ok(())
}
