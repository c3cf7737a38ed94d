use anchor_lang::prelude::*;
use message_bridge_prover::{receive_proofs, InboundMessage, MessageBridgeError, PDA_PAYER_SEED};

use crate::metalayer::process_authority_pda;
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

/// Read results are part of the router's handle interface but carry
/// nothing a proof needs.
pub fn handle<'info>(
    ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
    chain_id: u32,
    sender: Pubkey,
    message: Vec<u8>,
    _read_results: Vec<Vec<u8>>,
) -> Result<()> {
    let (_, bump) = pda_payer_pda();
    let message = InboundMessage::new(chain_id, sender.into(), message);

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
