use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::{invoke, invoke_signed};
use derive_new::new;
use eco_std::{keccak256, Bytes32};
use message_bridge_prover::{dispatcher_pda, quoted_fee, OutboundMessage, ProofTransport};
use message_bridge_prover::DISPATCHER_SEED;

use crate::instructions::Prove;

pub const MESSAGE_VERSION: u8 = 3;

pub const HANDLE_DISCRIMINATOR: [u8; 8] = [33, 210, 5, 66, 196, 212, 239, 142];
pub const OUTBOX_DISPATCH_DISCRIMINATOR: [u8; 8] = [119, 175, 32, 236, 111, 212, 91, 43];
pub const QUOTE_DISPATCH_DISCRIMINATOR: [u8; 8] = [30, 79, 243, 107, 50, 204, 234, 127];
pub const INBOX_PROCESS_DISCRIMINATOR: [u8; 8] = [15, 198, 27, 1, 166, 137, 139, 70];

pub const PROCESS_AUTHORITY_SEED: &[u8] = b"process_authority";

/// Authority a mailbox signs with when it delivers a message to `recipient`.
pub fn process_authority_pda(mailbox: &Pubkey, recipient: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[b"hyperlane", b"-", PROCESS_AUTHORITY_SEED, b"-", recipient.as_ref()],
        mailbox,
    )
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct OutboxDispatch {
    /// Program the message is sent on behalf of; its dispatcher PDA signs.
    pub sender: Pubkey,
    pub destination_domain: u32,
    pub recipient: [u8; 32],
    pub message_body: Vec<u8>,
    pub metadata: Vec<u8>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct QuoteDispatch {
    pub destination_domain: u32,
    pub recipient: [u8; 32],
    pub message_body: Vec<u8>,
    pub metadata: Vec<u8>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct InboxProcess {
    pub metadata: Vec<u8>,
    pub message: HyperlaneMessage,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct HyperlaneMessage {
    pub version: u8,
    pub nonce: u32,
    pub origin: u32,
    pub sender: [u8; 32],
    pub destination: u32,
    pub recipient: [u8; 32],
    pub body: Vec<u8>,
}

impl HyperlaneMessage {
    pub const HEADER_LEN: usize = 77;

    /// Packed big-endian encoding, as hashed into the message id.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::HEADER_LEN + self.body.len());
        bytes.push(self.version);
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(&self.origin.to_be_bytes());
        bytes.extend_from_slice(&self.sender);
        bytes.extend_from_slice(&self.destination.to_be_bytes());
        bytes.extend_from_slice(&self.recipient);
        bytes.extend_from_slice(&self.body);

        bytes
    }

    pub fn id(&self) -> Bytes32 {
        keccak256(&[&self.to_bytes()])
    }
}

/// Arguments the mailbox passes to a recipient's `handle`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct HandleMessage {
    pub origin: u32,
    pub sender: [u8; 32],
    pub message: Vec<u8>,
}

impl HandleMessage {
    pub fn instruction_data(&self) -> Result<Vec<u8>> {
        Ok(HANDLE_DISCRIMINATOR
            .into_iter()
            .chain(self.try_to_vec()?)
            .collect())
    }
}

impl ProofTransport for Prove<'_> {
    fn quote(&self, message: &OutboundMessage) -> Result<u64> {
        let quote = QuoteDispatch::new(
            message.domain,
            message.recipient.into(),
            message.body.clone(),
            message.options.clone(),
        );
        let ix = Instruction {
            program_id: self.mailbox_program.key(),
            accounts: vec![AccountMeta::new_readonly(self.outbox.key(), false)],
            data: QUOTE_DISPATCH_DISCRIMINATOR
                .into_iter()
                .chain(quote.try_to_vec()?)
                .collect(),
        };

        invoke(
            &ix,
            &[
                self.outbox.to_account_info(),
                self.mailbox_program.to_account_info(),
            ],
        )?;

        quoted_fee(self.mailbox_program.key)
    }

    fn dispatch(&self, message: OutboundMessage) -> Result<()> {
        let dispatch = OutboxDispatch::new(
            crate::ID,
            message.domain,
            message.recipient.into(),
            message.body,
            message.options,
        );
        let ix = Instruction {
            program_id: self.mailbox_program.key(),
            accounts: vec![
                AccountMeta::new(self.outbox.key(), false),
                AccountMeta::new_readonly(self.dispatcher.key(), true),
                AccountMeta::new(self.payer.key(), true),
                AccountMeta::new(self.dispatched_message.key(), false),
                AccountMeta::new_readonly(self.system_program.key(), false),
            ],
            data: OUTBOX_DISPATCH_DISCRIMINATOR
                .into_iter()
                .chain(dispatch.try_to_vec()?)
                .collect(),
        };
        let (_, bump) = dispatcher_pda(&crate::ID);

        invoke_signed(
            &ix,
            &[
                self.outbox.to_account_info(),
                self.dispatcher.to_account_info(),
                self.payer.to_account_info(),
                self.dispatched_message.to_account_info(),
                self.system_program.to_account_info(),
                self.mailbox_program.to_account_info(),
            ],
            &[&[DISPATCHER_SEED, &[bump]]],
        )
        .map_err(Into::into)
    }
}
