//! # Local-Prover Program
//!
//! Prover for intents whose source and destination are the same chain. The
//! inbox calls `prove` in the fulfillment transaction and the proofs are
//! recorded at once, without any message bridge.
//!
//! ## Security
//! - Only the inbox dispatcher PDA may prove
//! - The intent's source chain must be the chain id in the inbox config
//! - Proofs are written once; repeats emit `IntentAlreadyProven`

use anchor_lang::prelude::*;
use eco_std::prover;

declare_id!("6NS6a3HtVhWa3XVdahzg1BMSvfph8TygtoxycKxYzfn7");

pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod local_prover {
    use super::*;

    /// Records a proof for every `(intent hash, claimant)` pair.
    ///
    /// # Arguments
    /// * `ctx` - Inbox dispatcher, inbox config and payer; one proof PDA per
    ///   pair follows as remaining accounts
    /// * `args` - Source chain and the pairs to prove
    ///
    /// # Errors
    /// - `UnauthorizedInitiateProving`: the inbox dispatcher did not sign
    /// - `InvalidSourceChain`: the intent was not published on this chain
    #[instruction(discriminator = &prover::PROVE_DISCRIMINATOR)]
    pub fn prove<'info>(
        ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
        args: prover::ProveArgs,
    ) -> Result<()> {
        prove_intent(ctx, args)
    }

    /// Returns `ProofType::Local` as return data.
    #[instruction(discriminator = &prover::PROOF_TYPE_DISCRIMINATOR)]
    pub fn proof_type(ctx: Context<GetProofType>) -> Result<()> {
        instructions::proof_type(ctx)
    }
}
