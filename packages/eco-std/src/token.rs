use std::collections::{BTreeMap, BTreeSet};

use anchor_lang::prelude::*;
use anchor_spl::associated_token::{self, get_associated_token_address_with_program_id};
use anchor_spl::token::{self, Token};
use anchor_spl::token_2022::{self, Token2022};
use anchor_spl::token_interface::{close_account, transfer_checked, CloseAccount, Mint};
use anchor_spl::token_interface::{TokenAccount, TransferChecked};
use itertools::Itertools;

use crate::EcoError;

pub const TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE: usize = 3;

/// Remaining accounts read as `(from, to, mint)` triples.
pub struct VecTokenTransferAccounts<'info>(Vec<TokenTransferAccounts<'info>>);

impl<'info> TryFrom<&[AccountInfo<'info>]> for VecTokenTransferAccounts<'info> {
    type Error = anchor_lang::error::Error;

    fn try_from(accounts: &[AccountInfo<'info>]) -> Result<Self> {
        accounts
            .iter()
            .chunks(TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE)
            .into_iter()
            .map(|chunk| chunk.collect::<Vec<_>>().try_into())
            .collect::<Result<Vec<TokenTransferAccounts>>>()
            .map(Self)
    }
}

impl<'info> VecTokenTransferAccounts<'info> {
    pub fn into_inner(self) -> Vec<TokenTransferAccounts<'info>> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenTransferAccounts<'info>> {
        self.0.iter()
    }

    /// Fails unless the triples name each mint of `token_amounts` exactly once.
    pub fn require_mints(&self, token_amounts: &BTreeMap<Pubkey, u64>) -> Result<()> {
        let mints = self.0.iter().map(|accounts| accounts.mint.key()).collect::<BTreeSet<_>>();

        require!(
            mints.len() == self.0.len() && mints.iter().eq(token_amounts.keys()),
            EcoError::InvalidMint
        );

        Ok(())
    }
}

pub struct TokenTransferAccounts<'info> {
    pub from: AccountInfo<'info>,
    pub to: AccountInfo<'info>,
    pub mint: AccountInfo<'info>,
}

impl<'info> TryFrom<Vec<&AccountInfo<'info>>> for TokenTransferAccounts<'info> {
    type Error = anchor_lang::error::Error;

    fn try_from(accounts: Vec<&AccountInfo<'info>>) -> Result<Self> {
        let [from, to, mint] = accounts.as_slice() else {
            return Err(EcoError::InvalidTokenTransferAccounts.into());
        };

        // either side may be an ATA that does not exist yet
        let token_program = mint.owner;
        require!(
            from.data_is_empty() || token_program == from.owner,
            EcoError::InvalidTokenTransferAccounts
        );
        require!(
            to.data_is_empty() || token_program == to.owner,
            EcoError::InvalidTokenTransferAccounts
        );

        Ok(Self {
            from: from.to_account_info(),
            to: to.to_account_info(),
            mint: mint.to_account_info(),
        })
    }
}

impl<'info> TokenTransferAccounts<'info> {
    pub fn transfer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        self.transfer_with_signer(token_program, authority, &[], amount)
    }

    pub fn transfer_with_signer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
        amount: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        transfer_checked(
            CpiContext::new_with_signer(
                token_program.to_account_info(),
                TransferChecked {
                    from: self.from.to_account_info(),
                    to: self.to.to_account_info(),
                    mint: self.mint.to_account_info(),
                    authority: authority.to_account_info(),
                },
                signer_seeds,
            ),
            amount,
            self.mint_data()?.decimals,
        )
    }

    /// Moves the whole `from` balance to `to`, then closes `from` and sends
    /// its rent to `rent_receiver`. A missing `from` account is a no-op.
    pub fn drain_with_signer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        rent_receiver: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<u64> {
        if self.from.data_is_empty() {
            return Ok(0);
        }

        let amount = self.from_data()?.amount;
        self.transfer_with_signer(token_program, authority, signer_seeds, amount)?;
        close_account(CpiContext::new_with_signer(
            token_program.to_account_info(),
            CloseAccount {
                account: self.from.to_account_info(),
                destination: rent_receiver.to_account_info(),
                authority: authority.to_account_info(),
            },
            signer_seeds,
        ))?;

        Ok(amount)
    }

    pub fn token_program(
        &self,
        token_program: &Program<'info, Token>,
        token_2022_program: &Program<'info, Token2022>,
    ) -> Result<AccountInfo<'info>> {
        match *self.token_program_id() {
            id if id == token::ID => Ok(token_program.to_account_info()),
            id if id == token_2022::ID => Ok(token_2022_program.to_account_info()),
            _ => Err(EcoError::InvalidTokenProgram.into()),
        }
    }

    pub fn token_program_id(&self) -> &Pubkey {
        self.mint.owner
    }

    /// Requires `account` to be the associated token account of `owner`.
    pub fn require_ata(&self, account: &AccountInfo<'info>, owner: &Pubkey) -> Result<()> {
        let ata = get_associated_token_address_with_program_id(
            owner,
            self.mint.key,
            self.token_program_id(),
        );
        require_keys_eq!(ata, account.key(), EcoError::InvalidAta);

        Ok(())
    }

    pub fn mint_data(&self) -> Result<Mint> {
        Mint::try_deserialize(&mut &self.mint.try_borrow_data()?[..])
    }

    pub fn from_data(&self) -> Result<TokenAccount> {
        TokenAccount::try_deserialize(&mut &self.from.try_borrow_data()?[..])
    }

    pub fn to_data(&self) -> Result<TokenAccount> {
        TokenAccount::try_deserialize(&mut &self.to.try_borrow_data()?[..])
    }

    /// Balance of `from`, where a missing account holds nothing.
    pub fn from_balance(&self) -> Result<u64> {
        match self.from.data_is_empty() {
            true => Ok(0),
            false => Ok(self.from_data()?.amount),
        }
    }
}

/// Moves tokens from a signing `funder` into the associated token accounts
/// of `fundee`, creating them on first use.
pub struct FundTokenContext<'a, 'info> {
    pub payer: &'a AccountInfo<'info>,
    pub funder: &'a AccountInfo<'info>,
    pub fundee: AccountInfo<'info>,
    pub token_program: &'a Program<'info, Token>,
    pub token_2022_program: &'a Program<'info, Token2022>,
    pub associated_token_program: &'a Program<'info, associated_token::AssociatedToken>,
    pub system_program: &'a Program<'info, System>,
}

impl<'info> FundTokenContext<'_, 'info> {
    /// Tops each fundee account up towards its amount, bounded by what the
    /// funder holds. Returns the mints that ended up fully funded.
    pub fn fund_tokens(
        &self,
        accounts: &VecTokenTransferAccounts<'info>,
        token_amounts: &BTreeMap<Pubkey, u64>,
    ) -> Result<BTreeSet<Pubkey>> {
        accounts
            .iter()
            .map(|accounts| self.fund_token(accounts, token_amounts))
            .filter_map(Result::transpose)
            .collect()
    }

    fn fund_token(
        &self,
        accounts: &TokenTransferAccounts<'info>,
        token_amounts: &BTreeMap<Pubkey, u64>,
    ) -> Result<Option<Pubkey>> {
        let token_program = accounts.token_program(self.token_program, self.token_2022_program)?;
        let amount = *token_amounts
            .get(accounts.mint.key)
            .ok_or(EcoError::InvalidMint)?;
        let balance = self.ensure_fundee_ata_initialized(accounts, &token_program)?;
        let available = accounts.from_balance()?;

        amount
            .checked_sub(balance)
            .map(|deficit| deficit.min(available))
            .filter(|transfer| *transfer > 0)
            .map(|transfer| accounts.transfer(&token_program, self.funder, transfer))
            .transpose()?;

        match accounts.to_data()?.amount >= amount {
            true => Ok(Some(accounts.mint.key())),
            false => Ok(None),
        }
    }

    fn ensure_fundee_ata_initialized(
        &self,
        accounts: &TokenTransferAccounts<'info>,
        token_program: &AccountInfo<'info>,
    ) -> Result<u64> {
        accounts.require_ata(&accounts.to, self.fundee.key)?;

        if accounts.to.data_is_empty() {
            associated_token::create(CpiContext::new(
                self.associated_token_program.to_account_info(),
                associated_token::Create {
                    payer: self.payer.to_account_info(),
                    associated_token: accounts.to.to_account_info(),
                    authority: self.fundee.to_account_info(),
                    mint: accounts.mint.to_account_info(),
                    system_program: self.system_program.to_account_info(),
                    token_program: token_program.to_account_info(),
                },
            ))?;
        }

        Ok(accounts.to_data()?.amount)
    }
}
