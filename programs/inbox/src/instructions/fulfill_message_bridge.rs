use std::iter;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke_signed;
use eco_std::is_prover;
use eco_std::prover::{IntentHashClaimant, ProveArgs};
use eco_std::Bytes32;

use crate::events::InstantFulfillment;
use crate::instructions::{
    __client_accounts_fulfill, __cpi_client_accounts_fulfill, fulfill, Fulfill, FulfillArgs,
    FulfillBumps, InboxError,
};
use crate::state::{dispatcher_pda, DISPATCHER_SEED};

/// Which prover carries the proof and how.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct ProveParams {
    pub local_prover: Pubkey,
    pub source_chain_prover: Bytes32,
    /// Bridge options forwarded untouched to the prover.
    pub data: Vec<u8>,
    /// Most the solver pays the bridge.
    pub fee: u64,
}

#[derive(Accounts)]
#[instruction(args: FulfillArgs, prove: ProveParams)]
pub struct FulfillMessageBridge<'info> {
    pub fulfill: Fulfill<'info>,
    /// CHECK: address is validated
    #[account(
        executable,
        address = prove.local_prover @ InboxError::InvalidProver,
        constraint = is_prover(prover.key) @ InboxError::InvalidProver
    )]
    pub prover: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(address = dispatcher_pda().0 @ InboxError::InvalidDispatcher)]
    pub dispatcher: UncheckedAccount<'info>,
}

pub fn fulfill_message_bridge<'info>(
    ctx: Context<'_, '_, '_, 'info, FulfillMessageBridge<'info>>,
    args: FulfillArgs,
    prove: ProveParams,
) -> Result<()> {
    let fulfilled = fulfill(&ctx.accounts.fulfill, ctx.remaining_accounts, args)?;

    emit!(InstantFulfillment::new(
        fulfilled.intent_hash,
        fulfilled.source,
        fulfilled.claimant
    ));

    let ProveParams {
        local_prover: _,
        source_chain_prover,
        data,
        fee,
    } = prove;
    let args = ProveArgs::new(
        ctx.accounts.fulfill.solver.key(),
        fulfilled.source,
        vec![IntentHashClaimant::new(
            fulfilled.intent_hash,
            fulfilled.claimant.into(),
        )],
        source_chain_prover,
        data,
        fee,
    );

    request_proof(
        &ctx.accounts.prover,
        &ctx.accounts.dispatcher,
        fulfilled.remaining_accounts,
        &args,
    )
}

/// Calls `prove` on `prover` with the inbox dispatcher as first, signing
/// account and `prover_accounts` after it.
pub(crate) fn request_proof<'info>(
    prover: &AccountInfo<'info>,
    dispatcher: &AccountInfo<'info>,
    prover_accounts: &[AccountInfo<'info>],
    args: &ProveArgs,
) -> Result<()> {
    let (_, bump) = dispatcher_pda();
    let signer_seeds: &[&[u8]] = &[DISPATCHER_SEED, &[bump]];

    let ix = Instruction::new_with_bytes(
        prover.key(),
        &args.instruction_data()?,
        iter::once(AccountMeta::new_readonly(dispatcher.key(), true))
            .chain(prover_accounts.iter().map(|account| AccountMeta {
                pubkey: account.key(),
                is_signer: account.is_signer,
                is_writable: account.is_writable,
            }))
            .collect(),
    );

    invoke_signed(
        &ix,
        iter::once(dispatcher.to_account_info())
            .chain(prover_accounts.iter().map(ToAccountInfo::to_account_info))
            .collect::<Vec<_>>()
            .as_slice(),
        &[signer_seeds],
    )
    .map_err(Into::into)
}
