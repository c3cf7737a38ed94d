use anchor_lang::prelude::*;
use message_bridge_prover::{receive_proofs, InboundMessage, MessageBridgeError, PDA_PAYER_SEED};

use crate::hyperlane::process_authority_pda;
use crate::state::{pda_payer_pda, Config, ProofAccount};

#[derive(Accounts)]
pub struct Handle<'info> {
    #[account(
        address = process_authority_pda(&config.0.endpoint, &crate::ID).0
            @ MessageBridgeError::UnauthorizedHandle
    )]
    pub process_authority: Signer<'info>,
    #[account(address = Config::pda().0 @ MessageBridgeError::InvalidConfig)]
    pub config: Account<'info, Config>,
    /// CHECK: address is validated
    #[account(mut, address = pda_payer_pda().0 @ MessageBridgeError::InvalidPdaPayer)]
    pub pda_payer: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

pub fn handle<'info>(
    ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
    origin: u32,
    sender: [u8; 32],
    payload: Vec<u8>,
) -> Result<()> {
    let (_, bump) = pda_payer_pda();
    let message = InboundMessage::new(origin, sender.into(), payload);

    receive_proofs::<ProofAccount>(
        &ctx.accounts.config.0,
        &message,
        ctx.remaining_accounts,
        &ctx.accounts.pda_payer,
        &[PDA_PAYER_SEED, &[bump]],
        &ctx.accounts.system_program,
    )
    .map(|_| ())
}
