use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::{invoke, invoke_signed};
use derive_new::new;
use message_bridge_prover::{dispatcher_pda, quoted_fee, OutboundMessage, ProofTransport};
use message_bridge_prover::DISPATCHER_SEED;

use crate::instructions::Prove;

pub const HANDLE_DISCRIMINATOR: [u8; 8] = [176, 134, 0, 214, 158, 229, 18, 84];
pub const DISPATCH_DISCRIMINATOR: [u8; 8] = [8, 67, 96, 172, 17, 124, 160, 63];
pub const QUOTE_DISCRIMINATOR: [u8; 8] = [149, 42, 109, 247, 134, 146, 213, 123];
pub const PROCESS_DISCRIMINATOR: [u8; 8] = [147, 104, 175, 139, 110, 254, 236, 21];

pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Authority a router signs with when it delivers a message to `recipient`.
pub fn process_authority_pda(router: &Pubkey, recipient: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[b"router", b"-", b"process_authority", b"-", recipient.as_ref()],
        router,
    )
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalityState {
    Instant,
    Finalized,
}

/// Solver-supplied options carried in the prove call's `data`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, new)]
pub struct MetalayerOptions {
    pub gas_limit: u64,
    pub finality: FinalityState,
}

impl Default for MetalayerOptions {
    fn default() -> Self {
        Self::new(DEFAULT_GAS_LIMIT, FinalityState::Instant)
    }
}

impl MetalayerOptions {
    /// Empty options select the defaults.
    pub fn from_data(data: &[u8]) -> Result<Self> {
        match data {
            [] => Ok(Self::default()),
            data => Self::try_from_slice(data).map_err(Into::into),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct Dispatch {
    pub sender: Pubkey,
    pub destination_domain: u32,
    pub recipient: Pubkey,
    pub message: Vec<u8>,
    pub finality: FinalityState,
    pub gas_limit: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct Quote {
    pub destination_domain: u32,
    pub recipient: Pubkey,
    pub message: Vec<u8>,
    pub finality: FinalityState,
    pub gas_limit: u64,
}

/// Message as a router stores it on dispatch and replays it on delivery.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct MetalayerMessage {
    pub nonce: u64,
    pub origin: u32,
    pub sender: Pubkey,
    pub destination: u32,
    pub recipient: Pubkey,
    pub message: Vec<u8>,
}

/// Arguments the router passes to a recipient's `handle`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct MetalayerHandle {
    pub chain_id: u32,
    pub sender: Pubkey,
    pub message: Vec<u8>,
    pub read_results: Vec<Vec<u8>>,
}

impl MetalayerHandle {
    pub fn instruction_data(&self) -> Result<Vec<u8>> {
        Ok(HANDLE_DISCRIMINATOR
            .into_iter()
            .chain(self.try_to_vec()?)
            .collect())
    }
}

impl ProofTransport for Prove<'_> {
    fn quote(&self, message: &OutboundMessage) -> Result<u64> {
        let options = MetalayerOptions::from_data(&message.options)?;
        let quote = Quote::new(
            message.domain,
            message.recipient.into(),
            message.body.clone(),
            options.finality,
            options.gas_limit,
        );
        let ix = Instruction {
            program_id: self.router_program.key(),
            accounts: vec![AccountMeta::new_readonly(self.router_state.key(), false)],
            data: QUOTE_DISCRIMINATOR
                .into_iter()
                .chain(quote.try_to_vec()?)
                .collect(),
        };

        invoke(
            &ix,
            &[
                self.router_state.to_account_info(),
                self.router_program.to_account_info(),
            ],
        )?;

        quoted_fee(self.router_program.key)
    }

    fn dispatch(&self, message: OutboundMessage) -> Result<()> {
        let options = MetalayerOptions::from_data(&message.options)?;
        let dispatch = Dispatch::new(
            crate::ID,
            message.domain,
            message.recipient.into(),
            message.body,
            options.finality,
            options.gas_limit,
        );
        let ix = Instruction {
            program_id: self.router_program.key(),
            accounts: vec![
                AccountMeta::new(self.router_state.key(), false),
                AccountMeta::new_readonly(self.dispatcher.key(), true),
                AccountMeta::new(self.payer.key(), true),
                AccountMeta::new(self.dispatched_message.key(), false),
                AccountMeta::new_readonly(self.system_program.key(), false),
            ],
            data: DISPATCH_DISCRIMINATOR
                .into_iter()
                .chain(dispatch.try_to_vec()?)
                .collect(),
        };
        let (_, bump) = dispatcher_pda(&crate::ID);

        invoke_signed(
            &ix,
            &[
                self.router_state.to_account_info(),
                self.dispatcher.to_account_info(),
                self.payer.to_account_info(),
                self.dispatched_message.to_account_info(),
                self.system_program.to_account_info(),
                self.router_program.to_account_info(),
            ],
            &[&[DISPATCHER_SEED, &[bump]]],
        )
        .map_err(Into::into)
    }
}
