//! Hyperlane-style mailbox for tests.
//!
//! Dispatch stores the message under an increasing nonce and charges a flat
//! fee to the payer. Processing accepts any message addressed to the local
//! domain once, as if every message passed its security module, and hands it
//! to the recipient's `handle` signed by the recipient's process authority.

use std::iter;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::system_program;
use eco_std::account::AccountExt;
use hyper_prover::hyperlane::{self, HandleMessage, HyperlaneMessage, MESSAGE_VERSION};
use hyper_prover::hyperlane::PROCESS_AUTHORITY_SEED;

declare_id!("9YAUto9TqADaUK4T9pUUKjdwVCUwHWiYzKkkcjimGRXN");

pub const OUTBOX_SEED: &[u8] = b"outbox";
pub const DISPATCHED_MESSAGE_SEED: &[u8] = b"dispatched_message";
pub const PROCESSED_MESSAGE_SEED: &[u8] = b"processed_message";

#[program]
pub mod mock_mailbox {
    use super::*;

    pub fn init(ctx: Context<Init>, local_domain: u32, fee: u64) -> Result<()> {
        ctx.accounts.outbox.set_inner(Outbox {
            local_domain,
            fee,
            nonce: 0,
        });

        Ok(())
    }

    #[instruction(discriminator = &hyperlane::QUOTE_DISPATCH_DISCRIMINATOR)]
    pub fn quote_dispatch(ctx: Context<Quote>, _quote: hyperlane::QuoteDispatch) -> Result<u64> {
        Ok(ctx.accounts.outbox.fee)
    }

    /// Returns the message id.
    #[instruction(discriminator = &hyperlane::OUTBOX_DISPATCH_DISCRIMINATOR)]
    pub fn outbox_dispatch(
        ctx: Context<Dispatch>,
        dispatch: hyperlane::OutboxDispatch,
    ) -> Result<[u8; 32]> {
        let fee = ctx.accounts.outbox.fee;
        if fee > 0 {
            system_program::transfer(
                CpiContext::new(
                    ctx.accounts.system_program.to_account_info(),
                    system_program::Transfer {
                        from: ctx.accounts.payer.to_account_info(),
                        to: ctx.accounts.outbox.to_account_info(),
                    },
                ),
                fee,
            )?;
        }

        let outbox = &mut ctx.accounts.outbox;
        let message = HyperlaneMessage::new(
            MESSAGE_VERSION,
            outbox.nonce,
            outbox.local_domain,
            dispatch.sender.to_bytes(),
            dispatch.destination_domain,
            dispatch.recipient,
            dispatch.message_body,
        );
        let id = message.id();
        outbox.nonce += 1;

        ctx.accounts
            .dispatched_message
            .set_inner(DispatchedMessage { message });
        msg!("Dispatched message {}", id);

        Ok(id.into())
    }

    /// Delivers a message; the recipient's handle accounts follow as
    /// remaining accounts.
    #[instruction(discriminator = &hyperlane::INBOX_PROCESS_DISCRIMINATOR)]
    pub fn inbox_process<'info>(
        ctx: Context<'_, '_, '_, 'info, Process<'info>>,
        process: hyperlane::InboxProcess,
    ) -> Result<()> {
        let message = process.message;
        require_eq!(
            message.destination,
            ctx.accounts.outbox.local_domain,
            MailboxError::InvalidDestination
        );

        let id = message.id();
        ProcessedMessage { id: id.into() }
            .init(
                &ctx.accounts.processed_message,
                &ctx.accounts.payer,
                &ctx.accounts.system_program,
                &[&[
                    PROCESSED_MESSAGE_SEED,
                    id.as_ref(),
                    &[ctx.bumps.processed_message],
                ]],
            )
            .map_err(|_| MailboxError::MessageAlreadyProcessed)?;

        let recipient = ctx.accounts.recipient.key();
        let process_authority = ctx.accounts.process_authority.to_account_info();
        let handle = HandleMessage::new(message.origin, message.sender, message.body);
        let instruction = Instruction {
            program_id: recipient,
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
                b"hyperlane",
                b"-",
                PROCESS_AUTHORITY_SEED,
                b"-",
                recipient.as_ref(),
                &[ctx.bumps.process_authority],
            ]],
        )?;
        msg!("Processed message {}", id);

        Ok(())
    }
}

#[derive(Accounts)]
pub struct Init<'info> {
    #[account(
        init,
        payer = payer,
        space = 8 + Outbox::INIT_SPACE,
        seeds = [OUTBOX_SEED],
        bump
    )]
    pub outbox: Account<'info, Outbox>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Quote<'info> {
    #[account(seeds = [OUTBOX_SEED], bump)]
    pub outbox: Account<'info, Outbox>,
}

#[derive(Accounts)]
#[instruction(dispatch: hyperlane::OutboxDispatch)]
pub struct Dispatch<'info> {
    #[account(mut, seeds = [OUTBOX_SEED], bump)]
    pub outbox: Account<'info, Outbox>,
    #[account(
        address = message_bridge_prover::dispatcher_pda(&dispatch.sender).0
            @ MailboxError::UnauthorizedDispatcher
    )]
    pub dispatch_authority: Signer<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(
        init,
        payer = payer,
        space = DispatchedMessage::space(dispatch.message_body.len()),
        seeds = [DISPATCHED_MESSAGE_SEED, outbox.nonce.to_le_bytes().as_ref()],
        bump
    )]
    pub dispatched_message: Account<'info, DispatchedMessage>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(process: hyperlane::InboxProcess)]
pub struct Process<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(seeds = [OUTBOX_SEED], bump)]
    pub outbox: Account<'info, Outbox>,
    /// CHECK: created in `inbox_process`
    #[account(
        mut,
        seeds = [PROCESSED_MESSAGE_SEED, process.message.id().as_ref()],
        bump
    )]
    pub processed_message: UncheckedAccount<'info>,
    /// CHECK: signs the recipient's handle
    #[account(
        seeds = [
            b"hyperlane",
            b"-",
            PROCESS_AUTHORITY_SEED,
            b"-",
            process.message.recipient.as_ref()
        ],
        bump
    )]
    pub process_authority: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(
        executable,
        address = Pubkey::new_from_array(process.message.recipient)
            @ MailboxError::InvalidRecipient
    )]
    pub recipient: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
}

#[account]
#[derive(InitSpace)]
pub struct Outbox {
    pub local_domain: u32,
    pub fee: u64,
    pub nonce: u32,
}

impl Outbox {
    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[OUTBOX_SEED], &ID)
    }
}

#[account]
pub struct DispatchedMessage {
    pub message: HyperlaneMessage,
}

impl DispatchedMessage {
    pub fn pda(nonce: u32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[DISPATCHED_MESSAGE_SEED, &nonce.to_le_bytes()], &ID)
    }

    pub fn space(body_len: usize) -> usize {
        8 + HyperlaneMessage::HEADER_LEN + 4 + body_len
    }
}

#[account]
#[derive(InitSpace)]
pub struct ProcessedMessage {
    pub id: [u8; 32],
}

impl AccountExt for ProcessedMessage {}

impl ProcessedMessage {
    pub fn pda(id: &[u8; 32]) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[PROCESSED_MESSAGE_SEED, id], &ID)
    }
}

#[error_code(offset = 6600)]
pub enum MailboxError {
    InvalidDestination,
    MessageAlreadyProcessed,
    UnauthorizedDispatcher,
    InvalidRecipient,
}
