use anchor_lang::prelude::*;
use eco_std::Bytes32;

use crate::MessageBridgeError;

pub const MAX_WHITELIST_LEN: usize = 20;

/// Settings a message-bridge prover is initialized with. Never updated.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Debug, PartialEq, Eq)]
pub struct ProverConfig {
    /// The bridge program whose process authority may deliver messages.
    pub endpoint: Pubkey,
    #[max_len(MAX_WHITELIST_LEN)]
    pub whitelisted_senders: Vec<Bytes32>,
}

impl ProverConfig {
    /// `prover` is the address the prover is deployed at and is always trusted.
    pub fn new(
        prover: Pubkey,
        endpoint: Pubkey,
        whitelisted_senders: Vec<Bytes32>,
    ) -> Result<Self> {
        let mut senders = vec![Bytes32::from(prover)];
        whitelisted_senders
            .into_iter()
            .for_each(|sender| match senders.contains(&sender) {
                true => (),
                false => senders.push(sender),
            });

        require_gte!(
            MAX_WHITELIST_LEN,
            senders.len(),
            MessageBridgeError::TooManyWhitelistedSenders
        );

        Ok(Self {
            endpoint,
            whitelisted_senders: senders,
        })
    }

    pub fn is_whitelisted(&self, sender: &Bytes32) -> bool {
        self.whitelisted_senders.contains(sender)
    }
}
