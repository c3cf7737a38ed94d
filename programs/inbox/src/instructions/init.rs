use anchor_lang::prelude::*;
use eco_std::account::AccountExt;

use crate::instructions::InboxError;
use crate::state::{Config, CONFIG_SEED};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct InitArgs {
    pub chain_id: u64,
    pub mailbox: Option<Pubkey>,
    pub solver_whitelist: Vec<Pubkey>,
    pub min_batcher_reward: u64,
}

#[derive(Accounts)]
pub struct Init<'info> {
    /// CHECK: address is validated
    #[account(mut, address = Config::pda().0 @ InboxError::InvalidConfig)]
    pub config: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
    let (_, bump) = Config::pda();
    let InitArgs {
        chain_id,
        mailbox,
        solver_whitelist,
        min_batcher_reward,
    } = args;

    Config::new(chain_id, mailbox, solver_whitelist, min_batcher_reward)?.init(
        &ctx.accounts.config,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
        &[&[CONFIG_SEED, &[bump]]],
    )
}
