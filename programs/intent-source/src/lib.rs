//! # Intent Source
//!
//! Source-chain half of the protocol. Intents are published here, their
//! rewards are escrowed in a per-intent vault and the reward is released
//! exactly once: to the claimant the intent's prover recorded, or back to the
//! creator.
//!
//! ## Instructions
//! - `publish` / `publish_and_fund`: registers an intent hash, announces the
//!   intent and optionally funds its vault from a signing funder
//! - `fund`: tops an intent's vault up from a signing funder, optionally
//!   after running permit calls
//! - `is_intent_funded`: whether the vault covers the whole reward
//! - `withdraw` / `batch_withdraw`: pays proven intents to their claimants
//! - `refund`: returns an unclaimed reward to its creator after the deadline
//!
//! ## Accounts
//! - **ClaimState** at `["claim_state", intent_hash]`: claimant and status
//! - **Vault** at `["vault", route_hash, reward_hash]`: holds the reward;
//!   its address is known before anything is deployed there
//! - **Funder** at `["funder", route_hash, reward_hash]`: staging address
//!   whose stray tokens can be recovered while funding

use anchor_lang::prelude::*;
use eco_std::types::Intent;

declare_id!("DrutN4azzxzyzBbwaqQCjNzwqPBirA3eTxua82mGYZh3");

pub mod events;
pub mod instructions;
pub mod state;
pub mod vault;

use instructions::*;

#[program]
pub mod intent_source {
    use super::*;

    /// Registers an intent and announces it. Sets the intent hash as
    /// return data.
    ///
    /// # Errors
    /// - `IntentAlreadyExists`: the intent's claim state already exists
    pub fn publish(ctx: Context<Publish>, intent: Intent) -> Result<()> {
        publish_intent(ctx, intent)
    }

    /// Registers an intent and funds its whole reward from `funder`.
    pub fn publish_and_fund<'info>(
        ctx: Context<'_, '_, '_, 'info, PublishAndFund<'info>>,
        intent: Intent,
    ) -> Result<()> {
        publish_and_fund_intent(ctx, intent)
    }

    /// Tops an intent's vault up from `funder`.
    ///
    /// # Arguments
    /// * `ctx` - Payer, funder and vault; permit call accounts, reward token
    ///   triples and the recover accounts follow as remaining accounts
    /// * `args` - Intent by route hash and reward, permit calls, recover
    ///   token and whether a partial top-up is acceptable
    ///
    /// # Security
    /// - `funder` signs the transaction; nothing is pulled from anyone else
    /// - Permit calls run without any signature of this program
    pub fn fund<'info>(ctx: Context<'_, '_, '_, 'info, Fund<'info>>, args: FundArgs) -> Result<()> {
        fund_intent(ctx, args)
    }

    /// Sets whether the vault covers the whole reward as borsh `bool`
    /// return data.
    pub fn is_intent_funded<'info>(
        ctx: Context<'_, '_, '_, 'info, IsIntentFunded<'info>>,
        intent: Intent,
    ) -> Result<()> {
        instructions::is_intent_funded(ctx, intent)
    }

    /// Pays a proven intent's reward to the claimant its prover recorded.
    ///
    /// # Errors
    /// - `UnauthorizedWithdrawal`: no proof, or a zero claimant
    /// - `RewardsAlreadyWithdrawn`: the intent was claimed or refunded
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        args: WithdrawArgs,
    ) -> Result<()> {
        withdraw_rewards(ctx, args)
    }

    /// `withdraw` for several intents; any failure reverts them all.
    pub fn batch_withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, BatchWithdraw<'info>>,
        args: BatchWithdrawArgs,
    ) -> Result<()> {
        instructions::batch_withdraw(ctx, args)
    }

    /// Returns the vault's balance to the reward's creator.
    ///
    /// While the intent is unsettled this requires the deadline to have
    /// passed and the intent not to be both proven and funded. Settled
    /// intents only have leftovers swept back.
    pub fn refund<'info>(
        ctx: Context<'_, '_, '_, 'info, Refund<'info>>,
        args: RefundArgs,
    ) -> Result<()> {
        refund_intent(ctx, args)
    }
}
