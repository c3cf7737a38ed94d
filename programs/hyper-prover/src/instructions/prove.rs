use anchor_lang::prelude::*;
use eco_std::prover::ProveArgs;
use message_bridge_prover::MessageBridgeError;

use crate::state::{dispatcher_pda, Config};

#[derive(Accounts)]
pub struct Prove<'info> {
    #[account(
        address = inbox::state::dispatcher_pda().0 @ MessageBridgeError::UnauthorizedInitiateProving
    )]
    pub inbox_dispatcher: Signer<'info>,
    #[account(address = Config::pda().0 @ MessageBridgeError::InvalidConfig)]
    pub config: Account<'info, Config>,
    /// CHECK: address is validated
    #[account(address = dispatcher_pda().0 @ MessageBridgeError::InvalidDispatcher)]
    pub dispatcher: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: checked by the mailbox
    #[account(mut)]
    pub outbox: UncheckedAccount<'info>,
    /// CHECK: checked by the mailbox
    #[account(mut)]
    pub dispatched_message: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(executable, address = config.0.endpoint @ MessageBridgeError::InvalidEndpoint)]
    pub mailbox_program: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

pub fn prove_intent(ctx: Context<Prove>, args: ProveArgs) -> Result<()> {
    message_bridge_prover::send_proof(ctx.accounts, args)
}
