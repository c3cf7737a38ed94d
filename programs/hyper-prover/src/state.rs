use anchor_lang::prelude::*;
use eco_std::account::AccountExt;
use eco_std::prover::Proof;
use message_bridge_prover::ProverConfig;

#[account]
#[derive(InitSpace)]
pub struct ProofAccount(pub Proof);

impl AccountExt for ProofAccount {}

impl From<Proof> for ProofAccount {
    fn from(proof: Proof) -> Self {
        Self(proof)
    }
}

#[account]
#[derive(InitSpace)]
pub struct Config(pub ProverConfig);

impl AccountExt for Config {}

impl Config {
    pub fn pda() -> (Pubkey, u8) {
        message_bridge_prover::config_pda(&crate::ID)
    }
}

pub fn dispatcher_pda() -> (Pubkey, u8) {
    message_bridge_prover::dispatcher_pda(&crate::ID)
}

pub fn pda_payer_pda() -> (Pubkey, u8) {
    message_bridge_prover::pda_payer_pda(&crate::ID)
}
