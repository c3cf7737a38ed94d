//! Shared core of the provers that carry fulfillment proofs over a
//! cross-chain message bridge.
//!
//! Outbound, the destination-chain inbox invokes a prover's `prove`
//! instruction; [`send_proof`] ABI-encodes the `(intent hash, claimant)`
//! pairs, quotes the bridge, enforces the caller's fee ceiling and
//! dispatches the message to the prover's counterpart on the source chain.
//!
//! Inbound, the bridge endpoint invokes the prover's `handle` instruction;
//! [`receive_proofs`] checks the remote sender against the whitelist and
//! records every pair.
//!
//! Bridges only differ in how they quote and dispatch, which is all
//! [`ProofTransport`] abstracts.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::get_return_data;
use eco_std::account::AccountExt;
use eco_std::prover::{Proof, ProofData, ProofRecord, ProofRecorder, ProveArgs};

pub mod config;
pub mod transport;

pub use config::ProverConfig;
pub use transport::{InboundMessage, OutboundMessage, ProofTransport};

pub const CONFIG_SEED: &[u8] = b"config";
pub const DISPATCHER_SEED: &[u8] = b"dispatcher";
pub const PDA_PAYER_SEED: &[u8] = b"pda_payer";

#[error_code(offset = 6300)]
pub enum MessageBridgeError {
    UnauthorizedInitiateProving,
    UnauthorizedHandle,
    UnauthorizedIncomingProof,
    InsufficientFee,
    InvalidChainId,
    TooManyWhitelistedSenders,
    InvalidConfig,
    InvalidQuote,
    InvalidDispatcher,
    InvalidEndpoint,
    InvalidPdaPayer,
}

pub fn config_pda(prover: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED], prover)
}

/// Signs outbound dispatches on behalf of `prover`.
pub fn dispatcher_pda(prover: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DISPATCHER_SEED], prover)
}

/// Pays rent for proofs recorded while handling inbound messages.
pub fn pda_payer_pda(prover: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PDA_PAYER_SEED], prover)
}

pub fn send_proof<T: ProofTransport>(transport: &T, args: ProveArgs) -> Result<()> {
    let ProveArgs {
        sender,
        source,
        intent_hashes_claimants,
        source_chain_prover,
        data,
        fee,
    } = args;

    let message = OutboundMessage::new(
        chain_to_domain(source)?,
        source_chain_prover,
        ProofData::new(intent_hashes_claimants).to_bytes(),
        data,
    );
    let quote = transport.quote(&message)?;
    require_gte!(fee, quote, MessageBridgeError::InsufficientFee);

    msg!(
        "Dispatching proof to {} on domain {} for {}, fee {}",
        message.recipient,
        message.domain,
        sender,
        quote
    );

    transport.dispatch(message)
}

/// Records the proofs carried by `message`, one account per pair.
pub fn receive_proofs<'info, T>(
    config: &ProverConfig,
    message: &InboundMessage,
    proof_accounts: &[AccountInfo<'info>],
    payer: &AccountInfo<'info>,
    payer_seeds: &[&[u8]],
    system_program: &Program<'info, System>,
) -> Result<Vec<ProofRecord>>
where
    T: AccountExt + From<Proof>,
{
    require!(
        config.is_whitelisted(&message.sender),
        MessageBridgeError::UnauthorizedIncomingProof
    );

    let proof_data = ProofData::from_bytes(&message.body)?;
    let recorder = ProofRecorder {
        payer,
        payer_seeds,
        system_program,
        destination: domain_to_chain(message.origin),
    };

    recorder.record_all::<T>(proof_accounts, &proof_data.intent_hashes_claimants)
}

/// Reads a `u64` a bridge program left as return data.
pub fn quoted_fee(bridge: &Pubkey) -> Result<u64> {
    match get_return_data() {
        Some((program, data)) if program == *bridge => {
            u64::try_from_slice(&data).map_err(|_| MessageBridgeError::InvalidQuote.into())
        }
        _ => Err(MessageBridgeError::InvalidQuote.into()),
    }
}

/// Bridge domains are chain ids that fit in 32 bits.
pub fn chain_to_domain(chain: u64) -> Result<u32> {
    chain
        .try_into()
        .map_err(|_| MessageBridgeError::InvalidChainId.into())
}

pub fn domain_to_chain(domain: u32) -> u64 {
    domain.into()
}
