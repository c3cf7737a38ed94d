use anchor_lang::prelude::*;
use eco_std::account::AccountExt;
use eco_std::prover::{IntentHashClaimant, ProveArgs};
use eco_std::{is_prover, Bytes32};
use itertools::Itertools;

use crate::events::BatchSent;
use crate::instructions::{request_proof, InboxError};
use crate::state::{dispatcher_pda, BatchEntry, FulfillMarker};

const BATCH_ACCOUNTS_CHUNK_SIZE: usize = 2;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct SendBatchArgs {
    pub source: u64,
    pub intent_hashes: Vec<Bytes32>,
    pub local_prover: Pubkey,
    pub source_chain_prover: Bytes32,
    pub data: Vec<u8>,
    pub fee: u64,
}

/// Remaining accounts: a `(fulfill marker, batch entry)` pair per intent
/// hash, then whatever the prover needs.
#[derive(Accounts)]
#[instruction(args: SendBatchArgs)]
pub struct SendBatch<'info> {
    #[account(mut)]
    pub batcher: Signer<'info>,
    /// CHECK: address is validated
    #[account(
        executable,
        address = args.local_prover @ InboxError::InvalidProver,
        constraint = is_prover(prover.key) @ InboxError::InvalidProver
    )]
    pub prover: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(address = dispatcher_pda().0 @ InboxError::InvalidDispatcher)]
    pub dispatcher: UncheckedAccount<'info>,
}

pub fn send_batch<'info>(
    ctx: Context<'_, '_, '_, 'info, SendBatch<'info>>,
    args: SendBatchArgs,
) -> Result<()> {
    let split_index = args.intent_hashes.len() * BATCH_ACCOUNTS_CHUNK_SIZE;
    require_gte!(
        ctx.remaining_accounts.len(),
        split_index,
        InboxError::InvalidFulfillMarker
    );
    let (batch_accounts, prover_accounts) = ctx.remaining_accounts.split_at(split_index);

    let entries = args
        .intent_hashes
        .iter()
        .zip_eq(batch_accounts.chunks(BATCH_ACCOUNTS_CHUNK_SIZE))
        .map(|(intent_hash, accounts)| {
            settle_batch_entry(&ctx.accounts.batcher, &args, intent_hash, accounts)
        })
        .collect::<Result<Vec<_>>>()?;

    request_proof(
        &ctx.accounts.prover,
        &ctx.accounts.dispatcher,
        prover_accounts,
        &ProveArgs::new(
            ctx.accounts.batcher.key(),
            args.source,
            entries,
            args.source_chain_prover,
            args.data.clone(),
            args.fee,
        ),
    )?;

    emit!(BatchSent::new(
        args.intent_hashes,
        args.source,
        args.local_prover,
        args.source_chain_prover,
    ));

    Ok(())
}

/// Checks the intent was fulfilled for `args.source` and, when it was queued
/// for this prover pair, pays its entry out to the batcher.
fn settle_batch_entry<'info>(
    batcher: &AccountInfo<'info>,
    args: &SendBatchArgs,
    intent_hash: &Bytes32,
    accounts: &[AccountInfo<'info>],
) -> Result<IntentHashClaimant> {
    let [fulfill_marker, batch_entry] = accounts else {
        return Err(InboxError::InvalidFulfillMarker.into());
    };

    require_keys_eq!(
        fulfill_marker.key(),
        FulfillMarker::pda(intent_hash).0,
        InboxError::InvalidFulfillMarker
    );
    require!(
        !fulfill_marker.data_is_empty(),
        InboxError::IntentNotFulfilled
    );
    let marker = FulfillMarker::load(fulfill_marker)?;
    require_eq!(marker.source, args.source, InboxError::WrongSourceChain);

    require_keys_eq!(
        batch_entry.key(),
        BatchEntry::pda(intent_hash).0,
        InboxError::InvalidBatchEntry
    );
    if !batch_entry.data_is_empty() {
        let entry = BatchEntry::load(batch_entry)?;

        if entry.local_prover == args.local_prover
            && entry.source_chain_prover == args.source_chain_prover
        {
            close_batch_entry(batch_entry, batcher)?;
        }
    }

    Ok(IntentHashClaimant::new(*intent_hash, marker.claimant.into()))
}

fn close_batch_entry<'info>(
    entry: &AccountInfo<'info>,
    receiver: &AccountInfo<'info>,
) -> Result<()> {
    let lamports = receiver
        .lamports()
        .checked_add(entry.lamports())
        .ok_or(ProgramError::ArithmeticOverflow)?;
    **receiver.try_borrow_mut_lamports()? = lamports;
    **entry.try_borrow_mut_lamports()? = 0;

    entry.assign(&System::id());
    entry.realloc(0, false).map_err(Into::into)
}
