use anchor_lang::prelude::*;
use anchor_spl::{token, token_2022};
use derive_new::new;
use eco_std::prover::Proof;
use eco_std::token::{VecTokenTransferAccounts, TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE};
use eco_std::types::{IntentHashes, Reward};
use eco_std::Bytes32;
use itertools::Itertools;

use crate::events::Withdrawal;
use crate::instructions::IntentSourceError;
use crate::state::{ClaimState, ClaimStatus};
use crate::vault::Vault;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct WithdrawArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct BatchWithdrawArgs {
    pub route_hashes: Vec<Bytes32>,
    pub rewards: Vec<Reward>,
}

/// Remaining accounts: one `(vault ATA, claimant token account, mint)`
/// triple per reward token.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: must be the claimant recorded in `proof`
    #[account(mut)]
    pub claimant: UncheckedAccount<'info>,
    /// CHECK: address is validated by `Vault::new`
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address and owner are validated against the reward's prover
    pub proof: UncheckedAccount<'info>,
    /// CHECK: address is validated in `withdraw`
    #[account(mut)]
    pub claim_state: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub system_program: Program<'info, System>,
}

/// Remaining accounts, per intent: `claimant, vault, proof, claim_state`
/// followed by that intent's reward token triples.
#[derive(Accounts)]
pub struct BatchWithdraw<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub system_program: Program<'info, System>,
}

struct IntentAccounts<'a, 'info> {
    claimant: &'a AccountInfo<'info>,
    vault: &'a AccountInfo<'info>,
    proof: &'a AccountInfo<'info>,
    claim_state: &'a AccountInfo<'info>,
}

struct Programs<'a, 'info> {
    payer: &'a AccountInfo<'info>,
    token_program: &'a Program<'info, token::Token>,
    token_2022_program: &'a Program<'info, token_2022::Token2022>,
    system_program: &'a Program<'info, System>,
}

pub fn withdraw_rewards<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    args: WithdrawArgs,
) -> Result<()> {
    let accounts = &ctx.accounts;

    withdraw(
        IntentAccounts {
            claimant: &accounts.claimant,
            vault: &accounts.vault,
            proof: &accounts.proof,
            claim_state: &accounts.claim_state,
        },
        &Programs {
            payer: &accounts.payer,
            token_program: &accounts.token_program,
            token_2022_program: &accounts.token_2022_program,
            system_program: &accounts.system_program,
        },
        &args.route_hash,
        &args.reward,
        ctx.remaining_accounts.try_into()?,
    )
}

pub fn batch_withdraw<'info>(
    ctx: Context<'_, '_, '_, 'info, BatchWithdraw<'info>>,
    args: BatchWithdrawArgs,
) -> Result<()> {
    let BatchWithdrawArgs {
        route_hashes,
        rewards,
    } = args;
    require!(
        route_hashes.len() == rewards.len(),
        IntentSourceError::ArrayLengthMismatch
    );

    let programs = Programs {
        payer: &ctx.accounts.payer,
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        system_program: &ctx.accounts.system_program,
    };
    let mut remaining_accounts = ctx.remaining_accounts;

    for (route_hash, reward) in route_hashes.iter().zip_eq(&rewards) {
        let token_account_count =
            reward.token_amounts()?.len() * TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
        let Some(([claimant, vault, proof, claim_state], rest)) = remaining_accounts
            .split_first_chunk::<4>()
            .filter(|(_, rest)| rest.len() >= token_account_count)
        else {
            return Err(IntentSourceError::InvalidWithdrawAccounts.into());
        };
        let (token_accounts, rest) = rest.split_at(token_account_count);
        remaining_accounts = rest;

        withdraw(
            IntentAccounts {
                claimant,
                vault,
                proof,
                claim_state,
            },
            &programs,
            route_hash,
            reward,
            token_accounts.try_into()?,
        )?;
    }

    Ok(())
}

fn withdraw<'info>(
    accounts: IntentAccounts<'_, 'info>,
    programs: &Programs<'_, 'info>,
    route_hash: &Bytes32,
    reward: &Reward,
    token_accounts: VecTokenTransferAccounts<'info>,
) -> Result<()> {
    let hashes = IntentHashes::new(*route_hash, reward.hash());
    let intent_hash = hashes.intent_hash;
    let vault = Vault::new(accounts.vault, &hashes)?;

    let (proof_address, _) = Proof::pda(&intent_hash, &reward.prover);
    require_keys_eq!(
        accounts.proof.key(),
        proof_address,
        IntentSourceError::InvalidProof
    );
    let claimant = Proof::try_from_account_info(accounts.proof, &reward.prover)?
        .map(|proof| proof.claimant)
        .filter(|claimant| *claimant != Pubkey::default())
        .ok_or(IntentSourceError::UnauthorizedWithdrawal)?;
    require_keys_eq!(
        accounts.claimant.key(),
        claimant,
        IntentSourceError::InvalidClaimant
    );

    require_keys_eq!(
        accounts.claim_state.key(),
        ClaimState::pda(&intent_hash).0,
        IntentSourceError::InvalidClaimState
    );
    let claim_state = ClaimState::load_or_default(accounts.claim_state)?;
    require!(
        claim_state.status == ClaimStatus::Initiated,
        IntentSourceError::RewardsAlreadyWithdrawn
    );

    vault.require_token_accounts(&token_accounts, &reward.token_amounts()?)?;
    vault.require_funded(reward, &token_accounts)?;

    // status flips before any funds move
    ClaimState {
        claimant,
        status: ClaimStatus::Claimed,
    }
    .save(
        accounts.claim_state,
        &intent_hash,
        programs.payer,
        programs.system_program,
    )?;

    vault.drain(
        token_accounts,
        accounts.claimant,
        programs.payer,
        programs.token_program,
        programs.token_2022_program,
        programs.system_program,
    )?;
    emit!(Withdrawal::new(intent_hash, claimant));

    Ok(())
}
