use anchor_lang::prelude::*;
use derive_new::new;
use eco_std::Bytes32;

#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct OutboundMessage {
    pub domain: u32,
    pub recipient: Bytes32,
    pub body: Vec<u8>,
    /// Bridge-specific options forwarded untouched from the solver.
    pub options: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct InboundMessage {
    pub origin: u32,
    pub sender: Bytes32,
    pub body: Vec<u8>,
}

/// A cross-chain messaging backend a prover sends proofs through.
///
/// Implemented by each prover's `prove` accounts, so both calls run as
/// CPIs into the bridge program with the prover's dispatcher as signer.
pub trait ProofTransport {
    fn quote(&self, message: &OutboundMessage) -> Result<u64>;

    fn dispatch(&self, message: OutboundMessage) -> Result<()>;
}
