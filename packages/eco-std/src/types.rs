use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use derive_new::new;

use crate::{keccak256, Bytes32, EcoError, SerializableAccountMeta};

pub fn intent_hash(route_hash: &Bytes32, reward_hash: &Bytes32) -> Bytes32 {
    keccak256(&[route_hash.as_ref(), reward_hash.as_ref()])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntentHashes {
    pub intent_hash: Bytes32,
    pub route_hash: Bytes32,
    pub reward_hash: Bytes32,
}

impl IntentHashes {
    pub fn new(route_hash: Bytes32, reward_hash: Bytes32) -> Self {
        Self {
            intent_hash: intent_hash(&route_hash, &reward_hash),
            route_hash,
            reward_hash,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct Intent {
    pub route: Route,
    pub reward: Reward,
}

impl Intent {
    pub fn hashes(&self) -> IntentHashes {
        IntentHashes::new(self.route.hash(), self.reward.hash())
    }

    pub fn hash(&self) -> Bytes32 {
        self.hashes().intent_hash
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub salt: Bytes32,
    pub source: u64,
    pub destination: u64,
    pub inbox: Pubkey,
    pub tokens: Vec<TokenAmount>,
    pub calls: Vec<Call>,
}

impl Route {
    pub fn hash(&self) -> Bytes32 {
        let mut encoded = Vec::new();
        self.serialize(&mut encoded)
            .expect("Failed to serialize Route");

        keccak256(&[&encoded])
    }

    pub fn token_amounts(&self) -> Result<BTreeMap<Pubkey, u64>> {
        token_amounts(&self.tokens)
    }

    /// Native value the calls forward, which the solver must supply.
    pub fn call_value(&self) -> Result<u64> {
        self.calls.iter().try_fold(0u64, |total, call| {
            total
                .checked_add(call.value)
                .ok_or_else(|| error!(EcoError::CallValueOverflow))
        })
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Reward {
    pub creator: Pubkey,
    pub prover: Pubkey,
    pub deadline: u64,
    pub native_value: u64,
    pub tokens: Vec<TokenAmount>,
}

impl Reward {
    pub fn hash(&self) -> Bytes32 {
        let mut encoded = Vec::new();
        self.serialize(&mut encoded)
            .expect("Failed to serialize Reward");

        keccak256(&[&encoded])
    }

    pub fn token_amounts(&self) -> Result<BTreeMap<Pubkey, u64>> {
        token_amounts(&self.tokens)
    }

    pub fn is_reward_token(&self, token: &Pubkey) -> bool {
        self.tokens.iter().any(|reward_token| reward_token.token == *token)
    }
}

fn token_amounts(tokens: &[TokenAmount]) -> Result<BTreeMap<Pubkey, u64>> {
    tokens
        .iter()
        .try_fold(BTreeMap::<Pubkey, u64>::new(), |mut result, token| {
            let entry = result.entry(token.token).or_default();
            *entry = entry
                .checked_add(token.amount)
                .ok_or(EcoError::TokenAmountOverflow)?;

            Ok(result)
        })
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, new)]
pub struct TokenAmount {
    pub token: Pubkey,
    pub amount: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct Call {
    pub target: Pubkey,
    pub data: Vec<u8>,
    pub value: u64,
}

/// Call payload as the solver submits it on the destination chain. The
/// `account_count` accounts that follow in the transaction complete it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq, new)]
pub struct Calldata {
    pub data: Vec<u8>,
    pub account_count: u8,
}

/// Call payload as it is committed to in the route on the source chain.
///
/// The inbox reassembles it from a [`Calldata`] and the transaction accounts
/// before hashing, so a solver cannot swap the accounts a call runs against.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CalldataWithAccounts {
    pub calldata: Calldata,
    pub accounts: Vec<SerializableAccountMeta>,
}

impl CalldataWithAccounts {
    pub fn new<T>(calldata: Calldata, accounts: Vec<T>) -> Result<Self>
    where
        T: Into<SerializableAccountMeta>,
    {
        require!(
            accounts.len() == calldata.account_count as usize,
            EcoError::InvalidCalldata
        );

        Ok(Self {
            calldata,
            accounts: accounts.into_iter().map(Into::into).collect(),
        })
    }
}
