use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use eco_std::account::AccountExt;
use eco_std::types::{Intent, IntentHashes};

use crate::events::{IntentCreated, IntentFunded};
use crate::instructions::{
    __client_accounts_fund, __cpi_client_accounts_fund, fund_vault, Fund, FundBumps,
    IntentSourceError,
};
use crate::state::{ClaimState, CLAIM_STATE_SEED};

#[derive(Accounts)]
pub struct Publish<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated in `register_intent`
    #[account(mut)]
    pub claim_state: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

/// Remaining accounts: one `(funder token account, vault ATA, mint)`
/// triple per reward token.
#[derive(Accounts)]
pub struct PublishAndFund<'info> {
    /// CHECK: address is validated in `register_intent`
    #[account(mut)]
    pub claim_state: UncheckedAccount<'info>,
    pub fund: Fund<'info>,
}

pub fn publish_intent(ctx: Context<Publish>, intent: Intent) -> Result<()> {
    let hashes = register_intent(
        &intent,
        &ctx.accounts.claim_state,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
    )?;
    set_return_data(hashes.intent_hash.as_ref());

    Ok(())
}

/// Publishes and funds the full reward from `funder` in one step.
pub fn publish_and_fund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, PublishAndFund<'info>>,
    intent: Intent,
) -> Result<()> {
    let accounts = &ctx.accounts.fund;
    let hashes = register_intent(
        &intent,
        &ctx.accounts.claim_state,
        &accounts.payer,
        &accounts.system_program,
    )?;

    let complete = fund_vault(
        accounts,
        &hashes,
        &intent.reward,
        ctx.remaining_accounts.try_into()?,
        false,
    )?;
    emit!(IntentFunded::new(
        hashes.intent_hash,
        accounts.funder.key(),
        complete
    ));
    set_return_data(hashes.intent_hash.as_ref());

    Ok(())
}

/// Creates the intent's `ClaimState` and announces the intent.
fn register_intent<'info>(
    intent: &Intent,
    claim_state: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
) -> Result<IntentHashes> {
    let hashes = intent.hashes();
    let (address, bump) = ClaimState::pda(&hashes.intent_hash);
    require_keys_eq!(
        claim_state.key(),
        address,
        IntentSourceError::InvalidClaimState
    );

    ClaimState::default()
        .init(
            claim_state,
            payer,
            system_program,
            &[&[CLAIM_STATE_SEED, hashes.intent_hash.as_ref(), &[bump]]],
        )
        .map_err(|_| IntentSourceError::IntentAlreadyExists)?;

    let Intent { route, reward } = intent;
    emit!(IntentCreated::new(
        hashes.intent_hash,
        route.salt,
        route.source,
        route.destination,
        route.inbox,
        route.tokens.clone(),
        route.calls.clone(),
        reward.creator,
        reward.prover,
        reward.deadline,
        reward.native_value,
        reward.tokens.clone(),
    ));

    Ok(hashes)
}
