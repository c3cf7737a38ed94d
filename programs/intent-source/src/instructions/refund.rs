use anchor_lang::prelude::*;
use anchor_spl::{token, token_2022};
use derive_new::new;
use eco_std::prover::Proof;
use eco_std::token::VecTokenTransferAccounts;
use eco_std::types::{IntentHashes, Reward};
use eco_std::Bytes32;

use crate::events::Refund as RefundEvent;
use crate::instructions::IntentSourceError;
use crate::state::{ClaimState, ClaimStatus};
use crate::vault::{token_balances, Vault};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct RefundArgs {
    pub route_hash: Bytes32,
    pub reward: Reward,
    /// Token sent to the vault by mistake, returned along with the reward.
    pub token: Option<Pubkey>,
}

/// Remaining accounts: one `(vault ATA, creator token account, mint)` triple
/// per reward token, plus one for `token` when set.
#[derive(Accounts)]
#[instruction(args: RefundArgs)]
pub struct Refund<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: must be the reward's creator
    #[account(mut, address = args.reward.creator @ IntentSourceError::InvalidCreator)]
    pub creator: UncheckedAccount<'info>,
    /// CHECK: address is validated by `Vault::new`
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address and owner are validated against the reward's prover
    pub proof: UncheckedAccount<'info>,
    /// CHECK: address is validated in `refund_intent`
    #[account(mut)]
    pub claim_state: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub system_program: Program<'info, System>,
}

pub fn refund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Refund<'info>>,
    args: RefundArgs,
) -> Result<()> {
    let RefundArgs {
        route_hash,
        reward,
        token,
    } = args;
    let hashes = IntentHashes::new(route_hash, reward.hash());
    let intent_hash = hashes.intent_hash;
    let accounts = &ctx.accounts;
    let vault = Vault::new(&accounts.vault, &hashes)?;

    let mut mints = reward.token_amounts()?;
    if let Some(token) = token {
        require!(
            !reward.is_reward_token(&token),
            IntentSourceError::RefundTokenCannotBeRewardToken
        );
        mints.insert(token, 0);
    }
    let token_accounts = VecTokenTransferAccounts::try_from(ctx.remaining_accounts)?;
    vault.require_token_accounts(&token_accounts, &mints)?;

    require_keys_eq!(
        accounts.claim_state.key(),
        ClaimState::pda(&intent_hash).0,
        IntentSourceError::InvalidClaimState
    );
    // terminal intents only have leftovers swept back, their status is final
    if ClaimState::load_or_default(&accounts.claim_state)?.status == ClaimStatus::Initiated {
        require_gte!(
            Clock::get()?.unix_timestamp.max(0) as u64,
            reward.deadline,
            IntentSourceError::IntentNotExpired
        );

        require_keys_eq!(
            accounts.proof.key(),
            Proof::pda(&intent_hash, &reward.prover).0,
            IntentSourceError::InvalidProof
        );
        let proven = Proof::try_from_account_info(&accounts.proof, &reward.prover)?
            .is_some_and(|proof| proof.claimant != Pubkey::default());
        require!(
            !proven || !vault.is_funded(&reward, &token_balances(&token_accounts)?)?,
            IntentSourceError::IntentNotClaimed
        );

        ClaimState {
            claimant: Pubkey::default(),
            status: ClaimStatus::Refunded,
        }
        .save(
            &accounts.claim_state,
            &intent_hash,
            &accounts.payer,
            &accounts.system_program,
        )?;
    }

    vault.drain(
        token_accounts,
        &accounts.creator,
        &accounts.payer,
        &accounts.token_program,
        &accounts.token_2022_program,
        &accounts.system_program,
    )?;
    emit!(RefundEvent::new(intent_hash, reward.creator));

    Ok(())
}
