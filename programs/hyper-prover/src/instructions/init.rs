use anchor_lang::prelude::*;
use eco_std::account::AccountExt;
use eco_std::Bytes32;
use message_bridge_prover::{MessageBridgeError, ProverConfig, CONFIG_SEED};

use crate::state::Config;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitArgs {
    pub mailbox: Pubkey,
    pub whitelisted_senders: Vec<Bytes32>,
}

#[derive(Accounts)]
pub struct Init<'info> {
    /// CHECK: address is validated
    #[account(mut, address = Config::pda().0 @ MessageBridgeError::InvalidConfig)]
    pub config: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
    let (_, bump) = Config::pda();
    let config = ProverConfig::new(crate::ID, args.mailbox, args.whitelisted_senders)?;

    Config(config).init(
        &ctx.accounts.config,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
        &[&[CONFIG_SEED, &[bump]]],
    )
}
