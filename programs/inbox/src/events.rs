use anchor_lang::prelude::*;
use derive_new::new;
use eco_std::Bytes32;

#[event]
#[derive(new)]
pub struct Fulfillment {
    intent_hash: Bytes32,
    source: u64,
    claimant: Pubkey,
}

#[event]
#[derive(new)]
pub struct ToBeProven {
    intent_hash: Bytes32,
    source: u64,
    claimant: Pubkey,
}

#[event]
#[derive(new)]
pub struct InstantFulfillment {
    intent_hash: Bytes32,
    source: u64,
    claimant: Pubkey,
}

#[event]
#[derive(new)]
pub struct AddToBatch {
    intent_hash: Bytes32,
    source: u64,
    claimant: Pubkey,
    local_prover: Pubkey,
    source_chain_prover: Bytes32,
}

#[event]
#[derive(new)]
pub struct BatchSent {
    intent_hashes: Vec<Bytes32>,
    source: u64,
    local_prover: Pubkey,
    source_chain_prover: Bytes32,
}
