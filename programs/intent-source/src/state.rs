use anchor_lang::prelude::*;
use eco_std::account::AccountExt;
use eco_std::types::Intent;
use eco_std::Bytes32;

pub const CLAIM_STATE_SEED: &[u8] = b"claim_state";
pub const VAULT_SEED: &[u8] = b"vault";
pub const FUNDER_SEED: &[u8] = b"funder";

pub fn vault_pda(route_hash: &Bytes32, reward_hash: &Bytes32) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[VAULT_SEED, route_hash.as_ref(), reward_hash.as_ref()],
        &crate::ID,
    )
}

pub fn funder_pda(route_hash: &Bytes32, reward_hash: &Bytes32) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[FUNDER_SEED, route_hash.as_ref(), reward_hash.as_ref()],
        &crate::ID,
    )
}

pub fn intent_vault_address(intent: &Intent) -> Pubkey {
    let hashes = intent.hashes();

    vault_pda(&hashes.route_hash, &hashes.reward_hash).0
}

pub fn intent_funder_address(intent: &Intent) -> Pubkey {
    let hashes = intent.hashes();

    funder_pda(&hashes.route_hash, &hashes.reward_hash).0
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, Default)]
#[derive(PartialEq, Eq)]
pub enum ClaimStatus {
    #[default]
    Initiated,
    Claimed,
    Refunded,
}

#[account]
#[derive(InitSpace, Copy, Default, Debug, PartialEq, Eq)]
pub struct ClaimState {
    pub claimant: Pubkey,
    pub status: ClaimStatus,
}

impl AccountExt for ClaimState {}

impl ClaimState {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CLAIM_STATE_SEED, intent_hash.as_ref()], &crate::ID)
    }

    /// A missing record reads as a fresh `Initiated` state.
    pub fn load_or_default(account: &AccountInfo<'_>) -> Result<Self> {
        match account.data_is_empty() {
            true => Ok(Self::default()),
            false => Self::load(account),
        }
    }

    /// Writes the state, creating the record if the intent was never published.
    pub fn save<'info>(
        &self,
        account: &AccountInfo<'info>,
        intent_hash: &Bytes32,
        payer: &AccountInfo<'info>,
        system_program: &Program<'info, System>,
    ) -> Result<()> {
        if !account.data_is_empty() {
            return self.store(account);
        }

        let (_, bump) = Self::pda(intent_hash);
        self.init(
            account,
            payer,
            system_program,
            &[&[CLAIM_STATE_SEED, intent_hash.as_ref(), &[bump]]],
        )
    }
}
