//! Per-intent reward escrow.
//!
//! A vault is a PDA of this program, so its address is a pure function of the
//! route hash and the reward hash. Anyone can send funds to it at any time.
//! Only this program can move them out, signing with the vault seeds, and it
//! always drains the whole balance to a single recipient.

use std::collections::BTreeMap;
use std::slice;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;
use anchor_spl::{token, token_2022};
use eco_std::token::{TokenTransferAccounts, VecTokenTransferAccounts};
use eco_std::types::{IntentHashes, Reward};
use eco_std::Bytes32;

use crate::instructions::IntentSourceError;
use crate::state::{vault_pda, VAULT_SEED};

pub struct Vault<'a, 'info> {
    pub account: &'a AccountInfo<'info>,
    route_hash: Bytes32,
    reward_hash: Bytes32,
    bump: u8,
}

impl<'a, 'info> Vault<'a, 'info> {
    /// Fails with `InvalidVault` unless `account` is the vault of `hashes`.
    pub fn new(account: &'a AccountInfo<'info>, hashes: &IntentHashes) -> Result<Self> {
        let (address, bump) = vault_pda(&hashes.route_hash, &hashes.reward_hash);
        require_keys_eq!(account.key(), address, IntentSourceError::InvalidVault);

        Ok(Self {
            account,
            route_hash: hashes.route_hash,
            reward_hash: hashes.reward_hash,
            bump,
        })
    }

    fn signer_seeds(&self) -> [&[u8]; 4] {
        [
            VAULT_SEED,
            self.route_hash.as_ref(),
            self.reward_hash.as_ref(),
            slice::from_ref(&self.bump),
        ]
    }

    /// Requires every `(vault ATA, _, mint)` triple to be the vault's own
    /// account for one of `mints`, each mint exactly once.
    pub fn require_token_accounts(
        &self,
        accounts: &VecTokenTransferAccounts<'info>,
        mints: &BTreeMap<Pubkey, u64>,
    ) -> Result<()> {
        accounts.require_mints(mints)?;
        accounts
            .iter()
            .try_for_each(|accounts| accounts.require_ata(&accounts.from, self.account.key))
    }

    /// Whether the native balance and the vault's token `balances` cover
    /// the reward.
    pub fn is_funded(&self, reward: &Reward, balances: &BTreeMap<Pubkey, u64>) -> Result<bool> {
        let tokens_funded = reward
            .token_amounts()?
            .iter()
            .all(|(mint, amount)| balances.get(mint).is_some_and(|balance| balance >= amount));

        Ok(self.account.lamports() >= reward.native_value && tokens_funded)
    }

    /// Fails unless the vault holds the full reward.
    pub fn require_funded(
        &self,
        reward: &Reward,
        accounts: &VecTokenTransferAccounts<'info>,
    ) -> Result<()> {
        require_gte!(
            self.account.lamports(),
            reward.native_value,
            IntentSourceError::InsufficientNativeBalance
        );
        require!(
            self.is_funded(reward, &token_balances(accounts)?)?,
            IntentSourceError::InsufficientTokenBalance
        );

        Ok(())
    }

    /// Moves every token balance and then all lamports to `recipient`.
    /// Emptied vault ATAs are closed and their rent goes to `rent_receiver`.
    pub fn drain(
        &self,
        accounts: VecTokenTransferAccounts<'info>,
        recipient: &AccountInfo<'info>,
        rent_receiver: &AccountInfo<'info>,
        token_program: &Program<'info, token::Token>,
        token_2022_program: &Program<'info, token_2022::Token2022>,
        system_program: &Program<'info, System>,
    ) -> Result<()> {
        let seeds = self.signer_seeds();

        accounts.into_inner().into_iter().try_for_each(|accounts| {
            self.drain_token(
                &accounts,
                recipient,
                rent_receiver,
                token_program,
                token_2022_program,
                &seeds,
            )
        })?;

        match self.account.lamports() {
            0 => Ok(()),
            lamports => invoke_signed(
                &system_instruction::transfer(self.account.key, recipient.key, lamports),
                &[
                    self.account.to_account_info(),
                    recipient.to_account_info(),
                    system_program.to_account_info(),
                ],
                &[&seeds],
            )
            .map_err(|_| IntentSourceError::NativeRewardTransferFailed.into()),
        }
    }

    fn drain_token(
        &self,
        accounts: &TokenTransferAccounts<'info>,
        recipient: &AccountInfo<'info>,
        rent_receiver: &AccountInfo<'info>,
        token_program: &Program<'info, token::Token>,
        token_2022_program: &Program<'info, token_2022::Token2022>,
        seeds: &[&[u8]],
    ) -> Result<()> {
        if accounts.from_balance()? > 0 {
            require_keys_eq!(
                accounts.to_data()?.owner,
                recipient.key(),
                IntentSourceError::InvalidRecipientToken
            );
        }

        let token_program = accounts.token_program(token_program, token_2022_program)?;
        accounts
            .drain_with_signer(&token_program, self.account, rent_receiver, &[seeds])
            .map(|_| ())
    }
}

/// Balance of each `from` account by mint. Missing accounts hold nothing.
pub fn token_balances(accounts: &VecTokenTransferAccounts<'_>) -> Result<BTreeMap<Pubkey, u64>> {
    accounts
        .iter()
        .map(|accounts| Ok((accounts.mint.key(), accounts.from_balance()?)))
        .collect()
}
