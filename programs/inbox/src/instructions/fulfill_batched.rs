use anchor_lang::prelude::*;
use anchor_lang::system_program;
use eco_std::account::AccountExt;
use eco_std::{is_prover, Bytes32};

use crate::events::AddToBatch;
use crate::instructions::{
    __client_accounts_fulfill, __cpi_client_accounts_fulfill, fulfill, Fulfill, FulfillArgs,
    FulfillBumps, InboxError,
};
use crate::state::{BatchEntry, BATCH_ENTRY_SEED};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct BatchParams {
    pub local_prover: Pubkey,
    pub source_chain_prover: Bytes32,
    /// Lamports set aside for whoever sends the batch.
    pub reward: u64,
}

#[derive(Accounts)]
pub struct FulfillMessageBridgeBatched<'info> {
    pub fulfill: Fulfill<'info>,
    /// CHECK: address is validated in the handler
    #[account(mut)]
    pub batch_entry: UncheckedAccount<'info>,
}

pub fn fulfill_message_bridge_batched<'info>(
    ctx: Context<'_, '_, '_, 'info, FulfillMessageBridgeBatched<'info>>,
    args: FulfillArgs,
    batch: BatchParams,
) -> Result<()> {
    let accounts = &ctx.accounts.fulfill;
    require!(is_prover(&batch.local_prover), InboxError::InvalidProver);
    require_gte!(
        batch.reward,
        accounts.config.min_batcher_reward,
        InboxError::InsufficientBatcherReward
    );

    let fulfilled = fulfill(accounts, ctx.remaining_accounts, args)?;

    let (batch_entry, bump) = BatchEntry::pda(&fulfilled.intent_hash);
    require_keys_eq!(
        ctx.accounts.batch_entry.key(),
        batch_entry,
        InboxError::InvalidBatchEntry
    );
    BatchEntry::new(batch.local_prover, batch.source_chain_prover, batch.reward).init(
        &ctx.accounts.batch_entry,
        &accounts.payer,
        &accounts.system_program,
        &[&[BATCH_ENTRY_SEED, fulfilled.intent_hash.as_ref(), &[bump]]],
    )?;

    if batch.reward > 0 {
        system_program::transfer(
            CpiContext::new(
                accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: accounts.solver.to_account_info(),
                    to: ctx.accounts.batch_entry.to_account_info(),
                },
            ),
            batch.reward,
        )?;
    }

    emit!(AddToBatch::new(
        fulfilled.intent_hash,
        fulfilled.source,
        fulfilled.claimant,
        batch.local_prover,
        batch.source_chain_prover,
    ));

    Ok(())
}
