use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::{associated_token, token, token_2022};
use eco_std::token::{FundTokenContext, TokenTransferAccounts, VecTokenTransferAccounts};
use eco_std::token::TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
use eco_std::types::{Call, IntentHashes, Reward};
use eco_std::{Bytes32, EcoError};

use crate::events::IntentFunded;
use crate::instructions::permit::execute_permit_calls;
use crate::instructions::IntentSourceError;
use crate::state::{funder_pda, FUNDER_SEED};
use crate::vault::Vault;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct FundArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
    /// Run before any funds move, see [`execute_permit_calls`].
    pub permit_calls: Vec<Call>,
    /// Token staged at the intent's funder PDA to hand back to `funder`.
    pub recover_token: Option<Pubkey>,
    pub allow_partial: bool,
}

/// Remaining accounts: the permit calls' accounts, then one
/// `(funder token account, vault ATA, mint)` triple per reward token, then
/// `(funder PDA, funder PDA ATA, funder token account, mint)` when
/// `recover_token` is set.
#[derive(Accounts)]
pub struct Fund<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut)]
    pub funder: Signer<'info>,
    /// CHECK: address is validated in `fund_vault`
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn fund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Fund<'info>>,
    args: FundArgs,
) -> Result<()> {
    let FundArgs {
        route_hash,
        reward,
        permit_calls,
        recover_token,
        allow_partial,
    } = args;
    let hashes = IntentHashes::new(route_hash, reward.hash());

    if let Some(token) = &recover_token {
        require!(
            !reward.is_reward_token(token),
            IntentSourceError::RefundTokenCannotBeRewardToken
        );
    }

    let remaining_accounts = execute_permit_calls(
        &ctx.accounts.funder,
        &ctx.accounts.system_program,
        permit_calls,
        ctx.remaining_accounts,
    )?;
    let split_index = reward.token_amounts()?.len() * TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
    require_gte!(
        remaining_accounts.len(),
        split_index,
        EcoError::InvalidTokenTransferAccounts
    );
    let (token_accounts, recover_accounts) = remaining_accounts.split_at(split_index);

    let complete = fund_vault(
        ctx.accounts,
        &hashes,
        &reward,
        token_accounts.try_into()?,
        allow_partial,
    )?;

    if let Some(token) = recover_token {
        recover(ctx.accounts, &hashes, &token, recover_accounts)?;
    }

    emit!(IntentFunded::new(
        hashes.intent_hash,
        ctx.accounts.funder.key(),
        complete
    ));

    Ok(())
}

/// Tops the vault up towards the reward from `funder`, moving only what is
/// missing. Returns whether the vault now covers the whole reward.
pub(crate) fn fund_vault<'info>(
    accounts: &Fund<'info>,
    hashes: &IntentHashes,
    reward: &Reward,
    token_accounts: VecTokenTransferAccounts<'info>,
    allow_partial: bool,
) -> Result<bool> {
    let vault = Vault::new(&accounts.vault, hashes)?;

    let native_deficit = reward.native_value.saturating_sub(vault.account.lamports());
    let native_available = accounts.funder.lamports();
    require!(
        allow_partial || native_available >= native_deficit,
        IntentSourceError::InsufficientNativeReward
    );
    match native_deficit.min(native_available) {
        0 => (),
        amount => system_program::transfer(
            CpiContext::new(
                accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: accounts.funder.to_account_info(),
                    to: accounts.vault.to_account_info(),
                },
            ),
            amount,
        )?,
    }

    let reward_token_amounts = reward.token_amounts()?;
    token_accounts.require_mints(&reward_token_amounts)?;
    let funded_tokens = FundTokenContext {
        payer: &accounts.payer,
        funder: &accounts.funder,
        fundee: accounts.vault.to_account_info(),
        token_program: &accounts.token_program,
        token_2022_program: &accounts.token_2022_program,
        associated_token_program: &accounts.associated_token_program,
        system_program: &accounts.system_program,
    }
    .fund_tokens(&token_accounts, &reward_token_amounts)?;

    let complete = vault.account.lamports() >= reward.native_value
        && funded_tokens.len() == reward_token_amounts.len();
    require!(
        allow_partial || complete,
        IntentSourceError::InsufficientFunds
    );

    Ok(complete)
}

fn recover<'info>(
    accounts: &Fund<'info>,
    hashes: &IntentHashes,
    token: &Pubkey,
    recover_accounts: &[AccountInfo<'info>],
) -> Result<()> {
    let [intent_funder, from, to, mint] = recover_accounts else {
        return Err(EcoError::InvalidTokenTransferAccounts.into());
    };
    let (address, bump) = funder_pda(&hashes.route_hash, &hashes.reward_hash);
    require_keys_eq!(intent_funder.key(), address, IntentSourceError::InvalidFunder);
    require_keys_eq!(mint.key(), *token, EcoError::InvalidMint);

    let staged = TokenTransferAccounts::try_from(vec![from, to, mint])?;
    staged.require_ata(from, &address)?;
    if staged.from_balance()? == 0 {
        return Ok(());
    }
    require_keys_eq!(
        staged.to_data()?.owner,
        accounts.funder.key(),
        IntentSourceError::InvalidRecipientToken
    );

    let token_program =
        staged.token_program(&accounts.token_program, &accounts.token_2022_program)?;
    staged.transfer_with_signer(
        &token_program,
        intent_funder,
        &[&[
            FUNDER_SEED,
            hashes.route_hash.as_ref(),
            hashes.reward_hash.as_ref(),
            &[bump],
        ]],
        staged.from_balance()?,
    )
}
