//! Message-bridge prover over a Metalayer router.
//!
//! Follows the same rules as the Hyperlane prover: `prove` is reserved to
//! the inbox dispatcher and bounded by the caller's fee ceiling, `handle`
//! is reserved to the router's process authority and whitelisted senders.
//! Only the transport differs. The router takes raw addresses, a gas limit
//! and a finality requirement, read from the solver's prover data as
//! `MetalayerOptions` (empty data selects the defaults).

use anchor_lang::prelude::*;
use eco_std::prover;

declare_id!("Bpik5rAqxYY7VR1sxkQA8GxJ93Ti14681maYVZXBB2v");

pub mod instructions;
pub mod metalayer;
pub mod state;

use instructions::*;

#[program]
pub mod meta_prover {
    use super::*;

    pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
        instructions::init(ctx, args)
    }

    #[instruction(discriminator = &prover::PROVE_DISCRIMINATOR)]
    pub fn prove(ctx: Context<Prove>, args: prover::ProveArgs) -> Result<()> {
        prove_intent(ctx, args)
    }

    #[instruction(discriminator = &metalayer::HANDLE_DISCRIMINATOR)]
    pub fn handle<'info>(
        ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
        chain_id: u32,
        sender: Pubkey,
        message: Vec<u8>,
        read_results: Vec<Vec<u8>>,
    ) -> Result<()> {
        instructions::handle(ctx, chain_id, sender, message, read_results)
    }

    #[instruction(discriminator = &prover::PROOF_TYPE_DISCRIMINATOR)]
    pub fn proof_type(ctx: Context<GetProofType>) -> Result<()> {
        instructions::proof_type(ctx)
    }
}
