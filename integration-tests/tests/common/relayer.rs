use anchor_lang::prelude::AccountMeta;
use anchor_lang::ToAccountMetas;
use eco_std::prover::{Proof, ProofData};
use hyper_prover::hyperlane::{self, HyperlaneMessage, InboxProcess};
use meta_prover::metalayer::{self, MetalayerMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;

use crate::common::{instruction, Context, TransactionResult};

/// One writable proof PDA under `prover` per pair carried by `body`.
fn proof_accounts(body: &[u8], prover: &Pubkey) -> Vec<AccountMeta> {
    ProofData::from_bytes(body)
        .unwrap()
        .intent_hashes_claimants
        .iter()
        .map(|entry| AccountMeta::new(Proof::pda(&entry.intent_hash, prover).0, false))
        .collect()
}

/// Delivers the mailbox message dispatched on `from` with `nonce` to `to`.
pub fn relay_hyperlane(from: &Context, to: &mut Context, nonce: u32) -> TransactionResult {
    let message = from
        .account::<mock_mailbox::DispatchedMessage>(
            &mock_mailbox::DispatchedMessage::pda(nonce).0,
        )
        .expect("message was not dispatched")
        .message;

    deliver_hyperlane(to, message)
}

/// Has the mailbox on `to` hand `message` to its recipient.
pub fn deliver_hyperlane(to: &mut Context, message: HyperlaneMessage) -> TransactionResult {
    let recipient = Pubkey::new_from_array(message.recipient);
    let proofs = proof_accounts(&message.body, &recipient);

    deliver_hyperlane_with(to, message, proofs)
}

/// Like [`deliver_hyperlane`] with the proof accounts given, for bodies
/// that do not decode.
pub fn deliver_hyperlane_with(
    to: &mut Context,
    message: HyperlaneMessage,
    proofs: Vec<AccountMeta>,
) -> TransactionResult {
    let recipient = Pubkey::new_from_array(message.recipient);
    let id: [u8; 32] = message.id().into();
    let process_authority = hyperlane::process_authority_pda(&mock_mailbox::ID, &recipient).0;

    let handle_accounts = hyper_prover::accounts::Handle {
        process_authority,
        config: hyper_prover::state::Config::pda().0,
        pda_payer: hyper_prover::state::pda_payer_pda().0,
        system_program: anchor_lang::system_program::ID,
    }
    .to_account_metas(None)
    .into_iter()
    .skip(1)
    .chain(proofs)
    .collect::<Vec<_>>();

    let instruction = instruction(
        mock_mailbox::ID,
        mock_mailbox::instruction::InboxProcess {
            process: InboxProcess::new(vec![], message),
        },
        mock_mailbox::accounts::Process {
            payer: to.payer.pubkey(),
            outbox: mock_mailbox::Outbox::pda().0,
            processed_message: mock_mailbox::ProcessedMessage::pda(&id).0,
            process_authority,
            recipient,
            system_program: anchor_lang::system_program::ID,
        },
        handle_accounts,
    );

    to.send(&[instruction], &[])
}

/// Delivers the router message dispatched on `from` with `nonce` to `to`.
pub fn relay_metalayer(from: &Context, to: &mut Context, nonce: u64) -> TransactionResult {
    let message = from
        .account::<mock_router::DispatchedMessage>(
            &mock_router::DispatchedMessage::pda(nonce).0,
        )
        .expect("message was not dispatched")
        .message;

    deliver_metalayer(to, message)
}

/// Has the router on `to` hand `message` to its recipient.
pub fn deliver_metalayer(to: &mut Context, message: MetalayerMessage) -> TransactionResult {
    let recipient = message.recipient;
    let process_authority = metalayer::process_authority_pda(&mock_router::ID, &recipient).0;

    let handle_accounts = meta_prover::accounts::Handle {
        process_authority,
        config: meta_prover::state::Config::pda().0,
        pda_payer: meta_prover::state::pda_payer_pda().0,
        system_program: anchor_lang::system_program::ID,
    }
    .to_account_metas(None)
    .into_iter()
    .skip(1)
    .chain(proof_accounts(&message.message, &recipient))
    .collect::<Vec<_>>();

    let instruction = instruction(
        mock_router::ID,
        mock_router::instruction::ProcessMessage {
            message: message.clone(),
        },
        mock_router::accounts::DeliverMessage {
            payer: to.payer.pubkey(),
            router_state: mock_router::RouterState::pda().0,
            processed_message: mock_router::ProcessedMessage::pda(message.origin, message.nonce).0,
            process_authority,
            recipient,
            system_program: anchor_lang::system_program::ID,
        },
        handle_accounts,
    );

    to.send(&[instruction], &[])
}
