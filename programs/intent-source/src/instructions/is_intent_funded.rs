use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::token_interface::TokenAccount;
use eco_std::types::Intent;
use eco_std::EcoError;

use crate::vault::Vault;

/// Remaining accounts: a `(vault ATA, mint)` pair per reward token.
#[derive(Accounts)]
pub struct IsIntentFunded<'info> {
    /// CHECK: address is validated by `Vault::new`
    pub vault: UncheckedAccount<'info>,
}

/// Sets `true` as return data when the vault covers the whole reward.
pub fn is_intent_funded(ctx: Context<IsIntentFunded>, intent: Intent) -> Result<()> {
    let vault = Vault::new(&ctx.accounts.vault, &intent.hashes())?;
    let balances = ctx
        .remaining_accounts
        .chunks(2)
        .map(|pair| vault_token_balance(vault.account.key, pair))
        .collect::<Result<BTreeMap<_, _>>>()?;

    let funded = vault.is_funded(&intent.reward, &balances)?;
    set_return_data(&funded.try_to_vec()?);

    Ok(())
}

fn vault_token_balance(vault: &Pubkey, pair: &[AccountInfo]) -> Result<(Pubkey, u64)> {
    let [ata, mint] = pair else {
        return Err(EcoError::InvalidTokenTransferAccounts.into());
    };
    require_keys_eq!(
        ata.key(),
        get_associated_token_address_with_program_id(vault, mint.key, mint.owner),
        EcoError::InvalidAta
    );

    let balance = match ata.data_is_empty() {
        true => 0,
        false => TokenAccount::try_deserialize(&mut &ata.try_borrow_data()?[..])?.amount,
    };

    Ok((mint.key(), balance))
}
