//! Metalayer-style router for tests. Same model as the mock mailbox: flat fee,
//! stored dispatches, and unverified one-time delivery keyed by origin and
//! nonce.

use std::iter;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::system_program;
use eco_std::account::AccountExt;
use meta_prover::metalayer::{self, FinalityState, MetalayerHandle, MetalayerMessage};

declare_id!("GzELVg26iF5ohNz29joXwJJ6HfugmzcaBYBv6BgsNFD8");

pub const ROUTER_STATE_SEED: &[u8] = b"router_state";
pub const DISPATCHED_MESSAGE_SEED: &[u8] = b"dispatched_message";
pub const PROCESSED_MESSAGE_SEED: &[u8] = b"processed_message";

#[program]
pub mod mock_router {
    use super::*;

    pub fn init(ctx: Context<Init>, local_domain: u32, fee: u64) -> Result<()> {
        ctx.accounts.router_state.set_inner(RouterState {
            local_domain,
            fee,
            nonce: 0,
        });

        Ok(())
    }

    #[instruction(discriminator = &metalayer::QUOTE_DISCRIMINATOR)]
    pub fn quote_message(ctx: Context<GetQuote>, _quote: metalayer::Quote) -> Result<u64> {
        Ok(ctx.accounts.router_state.fee)
    }

    #[instruction(discriminator = &metalayer::DISPATCH_DISCRIMINATOR)]
    pub fn dispatch_message(
        ctx: Context<SendMessage>,
        dispatch: metalayer::Dispatch,
    ) -> Result<()> {
        let fee = ctx.accounts.router_state.fee;
        if fee > 0 {
            system_program::transfer(
                CpiContext::new(
                    ctx.accounts.system_program.to_account_info(),
                    system_program::Transfer {
                        from: ctx.accounts.payer.to_account_info(),
                        to: ctx.accounts.router_state.to_account_info(),
                    },
                ),
                fee,
            )?;
        }

        let router_state = &mut ctx.accounts.router_state;
        let message = MetalayerMessage::new(
            router_state.nonce,
            router_state.local_domain,
            dispatch.sender,
            dispatch.destination_domain,
            dispatch.recipient,
            dispatch.message,
        );
        router_state.nonce += 1;

        msg!(
            "Dispatched message {} to {} on domain {}",
            message.nonce,
            message.recipient,
            message.destination
        );
        ctx.accounts.dispatched_message.set_inner(DispatchedMessage {
            message,
            finality: dispatch.finality,
            gas_limit: dispatch.gas_limit,
        });

        Ok(())
    }

    /// Delivers a message; the recipient's handle accounts follow as
    /// remaining accounts.
    #[instruction(discriminator = &metalayer::PROCESS_DISCRIMINATOR)]
    pub fn process_message<'info>(
        ctx: Context<'_, '_, '_, 'info, DeliverMessage<'info>>,
        message: metalayer::MetalayerMessage,
    ) -> Result<()> {
        require_eq!(
            message.destination,
            ctx.accounts.router_state.local_domain,
            RouterError::InvalidDestination
        );

        ProcessedMessage {
            origin: message.origin,
            nonce: message.nonce,
        }
        .init(
            &ctx.accounts.processed_message,
            &ctx.accounts.payer,
            &ctx.accounts.system_program,
            &[&[
                PROCESSED_MESSAGE_SEED,
                &message.origin.to_le_bytes(),
                &message.nonce.to_le_bytes(),
                &[ctx.bumps.processed_message],
            ]],
        )
        .map_err(|_| RouterError::MessageAlreadyProcessed)?;

        let process_authority = ctx.accounts.process_authority.to_account_info();
        let handle = MetalayerHandle::new(message.origin, message.sender, message.message, vec![]);
        let instruction = Instruction {
            program_id: message.recipient,
            accounts: iter::once(AccountMeta::new_readonly(process_authority.key(), true))
                .chain(ctx.remaining_accounts.iter().map(|account| AccountMeta {
                    pubkey: account.key(),
                    is_signer: account.is_signer,
                    is_writable: account.is_writable,
                }))
                .collect(),
            data: handle.instruction_data()?,
        };
        let account_infos = iter::once(process_authority)
            .chain(ctx.remaining_accounts.iter().cloned())
            .chain(iter::once(ctx.accounts.recipient.to_account_info()))
            .collect::<Vec<_>>();

        invoke_signed(
            &instruction,
            &account_infos,
            &[&[
                b"router",
                b"-",
                b"process_authority",
                b"-",
                message.recipient.as_ref(),
                &[ctx.bumps.process_authority],
            ]],
        )
        .map_err(Into::into)
    }
}

#[derive(Accounts)]
pub struct Init<'info> {
    #[account(
        init,
        payer = payer,
        space = 8 + RouterState::INIT_SPACE,
        seeds = [ROUTER_STATE_SEED],
        bump
    )]
    pub router_state: Account<'info, RouterState>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct GetQuote<'info> {
    #[account(seeds = [ROUTER_STATE_SEED], bump)]
    pub router_state: Account<'info, RouterState>,
}

#[derive(Accounts)]
#[instruction(dispatch: metalayer::Dispatch)]
pub struct SendMessage<'info> {
    #[account(mut, seeds = [ROUTER_STATE_SEED], bump)]
    pub router_state: Account<'info, RouterState>,
    #[account(
        address = message_bridge_prover::dispatcher_pda(&dispatch.sender).0
            @ RouterError::UnauthorizedDispatcher
    )]
    pub dispatch_authority: Signer<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(
        init,
        payer = payer,
        space = DispatchedMessage::space(dispatch.message.len()),
        seeds = [DISPATCHED_MESSAGE_SEED, router_state.nonce.to_le_bytes().as_ref()],
        bump
    )]
    pub dispatched_message: Account<'info, DispatchedMessage>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(message: metalayer::MetalayerMessage)]
pub struct DeliverMessage<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(seeds = [ROUTER_STATE_SEED], bump)]
    pub router_state: Account<'info, RouterState>,
    /// CHECK: created in `process_message`
    #[account(
        mut,
        seeds = [
            PROCESSED_MESSAGE_SEED,
            message.origin.to_le_bytes().as_ref(),
            message.nonce.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub processed_message: UncheckedAccount<'info>,
    /// CHECK: signs the recipient's handle
    #[account(
        seeds = [
            b"router",
            b"-",
            b"process_authority",
            b"-",
            message.recipient.as_ref()
        ],
        bump
    )]
    pub process_authority: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(executable, address = message.recipient @ RouterError::InvalidRecipient)]
    pub recipient: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

#[account]
#[derive(InitSpace)]
pub struct RouterState {
    pub local_domain: u32,
    pub fee: u64,
    pub nonce: u64,
}

impl RouterState {
    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[ROUTER_STATE_SEED], &ID)
    }
}

#[account]
pub struct DispatchedMessage {
    pub message: MetalayerMessage,
    pub finality: FinalityState,
    pub gas_limit: u64,
}

impl DispatchedMessage {
    const MESSAGE_HEADER_LEN: usize = 8 + 4 + 32 + 4 + 32;

    pub fn pda(nonce: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[DISPATCHED_MESSAGE_SEED, &nonce.to_le_bytes()], &ID)
    }

    pub fn space(message_len: usize) -> usize {
        8 + Self::MESSAGE_HEADER_LEN + 4 + message_len + 1 + 8
    }
}

#[account]
#[derive(InitSpace)]
pub struct ProcessedMessage {
    pub origin: u32,
    pub nonce: u64,
}

impl AccountExt for ProcessedMessage {}

impl ProcessedMessage {
    pub fn pda(origin: u32, nonce: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                PROCESSED_MESSAGE_SEED,
                &origin.to_le_bytes(),
                &nonce.to_le_bytes(),
            ],
            &ID,
        )
    }
}

#[error_code(offset = 6700)]
pub enum RouterError {
    InvalidDestination,
    MessageAlreadyProcessed,
    UnauthorizedDispatcher,
    InvalidRecipient,
}
