//! # Hyper-Prover Program
//!
//! Message-bridge prover that carries intent fulfillment proofs between
//! chains over a Hyperlane mailbox.
//!
//! ## Outbound (`prove`)
//! - Only the inbox dispatcher PDA may request a proof
//! - The mailbox quotes the message first; the quote must not exceed the
//!   fee ceiling the solver passed through the inbox
//! - The message is dispatched with the prover's dispatcher PDA as sender
//!   authority and addressed to the source-chain prover
//!
//! ## Inbound (`handle`)
//! - Only the mailbox process authority for this program may deliver
//! - The remote sender must be in the whitelist set at `init`, which always
//!   contains this program's own address
//! - Every `(intent hash, claimant)` pair is recorded once. Pairs that are
//!   already proven emit `IntentAlreadyProven` and are skipped, so a batch
//!   never fails because of a replayed entry
//!
//! Proof accounts are PDAs of this program (see `eco_std::prover::Proof`)
//! and are paid for by the program's `pda_payer`.

use anchor_lang::prelude::*;
use eco_std::prover;

declare_id!("8f6rm1VVhXFtjKXUyfFm8WHMCARw7NPVRsQQwaoyREgB");

pub mod hyperlane;
pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod hyper_prover {
    use super::*;

    /// Stores the mailbox and the whitelisted remote senders.
    ///
    /// # Arguments
    /// * `ctx` - Config PDA, payer and system program
    /// * `args` - Mailbox program and remote senders to trust
    ///
    /// # Security
    /// - The config can be created once; later calls fail
    /// - At most 20 senders, this program included
    pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
        instructions::init(ctx, args)
    }

    /// Sends a batch of proofs to the source chain through the mailbox.
    ///
    /// # Arguments
    /// * `ctx` - Inbox dispatcher, mailbox accounts and the fee payer
    /// * `args` - Source chain, pairs to prove, source-chain prover and fee ceiling
    ///
    /// # Security
    /// - Callable only through the inbox, whose dispatcher PDA must sign
    /// - Chain ids that do not fit a 32-bit domain are rejected
    #[instruction(discriminator = &prover::PROVE_DISCRIMINATOR)]
    pub fn prove(ctx: Context<Prove>, args: prover::ProveArgs) -> Result<()> {
        prove_intent(ctx, args)
    }

    /// Records the proofs carried by a delivered message.
    ///
    /// # Arguments
    /// * `ctx` - Process authority, config and payer; one proof PDA per pair
    ///   follows as remaining accounts
    /// * `origin` - Domain the message was sent from
    /// * `sender` - Remote sender address
    /// * `payload` - ABI-encoded intent hashes and claimants
    ///
    /// # Security
    /// - The mailbox process authority for this program must sign
    /// - The sender must be whitelisted
    #[instruction(discriminator = &hyperlane::HANDLE_DISCRIMINATOR)]
    pub fn handle<'info>(
        ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
        origin: u32,
        sender: [u8; 32],
        payload: Vec<u8>,
    ) -> Result<()> {
        instructions::handle(ctx, origin, sender, payload)
    }

    /// Returns `ProofType::Hyperlane` as return data.
    #[instruction(discriminator = &prover::PROOF_TYPE_DISCRIMINATOR)]
    pub fn proof_type(ctx: Context<GetProofType>) -> Result<()> {
        instructions::proof_type(ctx)
    }
}
