use anchor_lang::prelude::*;
use derive_new::new;
use eco_std::account::AccountExt;
use eco_std::Bytes32;

use crate::instructions::InboxError;

pub const CONFIG_SEED: &[u8] = b"config";
pub const EXECUTOR_SEED: &[u8] = b"executor";
pub const DISPATCHER_SEED: &[u8] = b"dispatcher";
pub const FULFILL_MARKER_SEED: &[u8] = b"fulfill_marker";
pub const BATCH_ENTRY_SEED: &[u8] = b"batch_entry";
pub const MAX_SOLVER_WHITELIST_LEN: usize = 20;

/// Signs route calls and holds the tokens and value they spend.
pub fn executor_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[EXECUTOR_SEED], &crate::ID)
}

/// Signs `prove` on provers, which only accept requests carrying it.
pub fn dispatcher_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DISPATCHER_SEED], &crate::ID)
}

#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct Config {
    pub chain_id: u64,
    /// Bridge endpoint that route calls may never target.
    pub mailbox: Option<Pubkey>,
    /// Empty means any solver may fulfill.
    #[max_len(MAX_SOLVER_WHITELIST_LEN)]
    pub solver_whitelist: Vec<Pubkey>,
    pub min_batcher_reward: u64,
}

impl AccountExt for Config {}

impl Config {
    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CONFIG_SEED], &crate::ID)
    }

    pub fn new(
        chain_id: u64,
        mailbox: Option<Pubkey>,
        solver_whitelist: Vec<Pubkey>,
        min_batcher_reward: u64,
    ) -> Result<Self> {
        require_gte!(
            MAX_SOLVER_WHITELIST_LEN,
            solver_whitelist.len(),
            InboxError::TooManyWhitelistedSolvers
        );

        Ok(Self {
            chain_id,
            mailbox,
            solver_whitelist,
            min_batcher_reward,
        })
    }

    pub fn is_solver_allowed(&self, solver: &Pubkey) -> bool {
        self.solver_whitelist.is_empty() || self.solver_whitelist.contains(solver)
    }

    pub fn is_mailbox(&self, program: &Pubkey) -> bool {
        self.mailbox.as_ref() == Some(program)
    }
}

/// Written once per fulfilled intent. Together with the slot it is the claim a
/// storage prover verifies against this chain's state.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq, new)]
pub struct FulfillMarker {
    pub claimant: Pubkey,
    pub source: u64,
    pub slot: u64,
}

impl AccountExt for FulfillMarker {}

impl FulfillMarker {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[FULFILL_MARKER_SEED, intent_hash.as_ref()], &crate::ID)
    }
}

/// Batched fulfillment waiting to be proven. Its lamports beyond rent are
/// the reward for whoever sends the batch.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq, new)]
pub struct BatchEntry {
    pub local_prover: Pubkey,
    pub source_chain_prover: Bytes32,
    pub reward: u64,
}

impl AccountExt for BatchEntry {}

impl BatchEntry {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[BATCH_ENTRY_SEED, intent_hash.as_ref()], &crate::ID)
    }
}
