use anchor_lang::prelude::*;
use derive_new::new;
use eco_std::types::{Call, TokenAmount};
use eco_std::Bytes32;

#[event]
#[derive(new)]
pub struct IntentCreated {
    intent_hash: Bytes32,
    salt: Bytes32,
    source: u64,
    destination: u64,
    inbox: Pubkey,
    route_tokens: Vec<TokenAmount>,
    calls: Vec<Call>,
    creator: Pubkey,
    prover: Pubkey,
    deadline: u64,
    native_value: u64,
    reward_tokens: Vec<TokenAmount>,
}

#[event]
#[derive(new)]
pub struct IntentFunded {
    intent_hash: Bytes32,
    funder: Pubkey,
    complete: bool,
}

#[event]
#[derive(new)]
pub struct Withdrawal {
    intent_hash: Bytes32,
    recipient: Pubkey,
}

#[event]
#[derive(new)]
pub struct Refund {
    intent_hash: Bytes32,
    recipient: Pubkey,
}
