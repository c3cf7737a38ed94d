use anchor_lang::prelude::*;
use eco_std::prover::{ProofRecorder, ProveArgs};
use inbox::state::Config as InboxConfig;

use crate::instructions::LocalProverError;
use crate::state::ProofAccount;

/// Remaining accounts: one proof PDA per `(intent hash, claimant)` pair.
#[derive(Accounts)]
pub struct Prove<'info> {
    #[account(
        address = inbox::state::dispatcher_pda().0 @ LocalProverError::UnauthorizedInitiateProving
    )]
    pub inbox_dispatcher: Signer<'info>,
    #[account(address = InboxConfig::pda().0 @ LocalProverError::InvalidInboxConfig)]
    pub inbox_config: Account<'info, InboxConfig>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

pub fn prove_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
    args: ProveArgs,
) -> Result<()> {
    let chain_id = ctx.accounts.inbox_config.chain_id;
    require_eq!(args.source, chain_id, LocalProverError::InvalidSourceChain);

    ProofRecorder {
        payer: &ctx.accounts.payer,
        payer_seeds: &[],
        system_program: &ctx.accounts.system_program,
        destination: chain_id,
    }
    .record_all::<ProofAccount>(ctx.remaining_accounts, &args.intent_hashes_claimants)
    .map(|_| ())
}
