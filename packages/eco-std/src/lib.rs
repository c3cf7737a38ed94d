use std::fmt;

use anchor_lang::prelude::*;
use derive_more::Deref;

pub mod account;
pub mod prover;
pub mod token;
pub mod types;

pub const HYPER_PROVER_ID: Pubkey = pubkey!("8f6rm1VVhXFtjKXUyfFm8WHMCARw7NPVRsQQwaoyREgB");
pub const META_PROVER_ID: Pubkey = pubkey!("Bpik5rAqxYY7VR1sxkQA8GxJ93Ti14681maYVZXBB2v");
pub const LOCAL_PROVER_ID: Pubkey = pubkey!("6NS6a3HtVhWa3XVdahzg1BMSvfph8TygtoxycKxYzfn7");

/// Programs an inbox refuses to call from inside a route.
pub fn is_prover(program: &Pubkey) -> bool {
    [HYPER_PROVER_ID, META_PROVER_ID, LOCAL_PROVER_ID].contains(program)
}

#[error_code(offset = 6200)]
pub enum EcoError {
    TokenAmountOverflow,
    CallValueOverflow,
    ArrayLengthMismatch,
    InvalidProofData,
    InvalidCalldata,
    InvalidTokenTransferAccounts,
    InvalidTokenProgram,
    InvalidMint,
    InvalidAta,
    InvalidProofAccount,
}

#[derive(
    AnchorSerialize,
    AnchorDeserialize,
    InitSpace,
    Deref,
    Clone,
    Copy,
    Default,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
pub struct Bytes32([u8; 32]);

impl Bytes32 {
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Bytes32(bytes)
    }
}

impl From<Bytes32> for [u8; 32] {
    fn from(bytes: Bytes32) -> Self {
        bytes.0
    }
}

impl From<Pubkey> for Bytes32 {
    fn from(pubkey: Pubkey) -> Self {
        Bytes32(pubkey.to_bytes())
    }
}

impl From<Bytes32> for Pubkey {
    fn from(bytes: Bytes32) -> Self {
        Pubkey::new_from_array(bytes.0)
    }
}

impl PartialEq<Pubkey> for Bytes32 {
    fn eq(&self, pubkey: &Pubkey) -> bool {
        self.0 == pubkey.to_bytes()
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

pub fn keccak256(chunks: &[&[u8]]) -> Bytes32 {
    use tiny_keccak::{Hasher, Keccak};

    let mut hasher = Keccak::v256();
    chunks.iter().for_each(|chunk| hasher.update(chunk));

    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    hash.into()
}

/// Account meta as it is committed to inside a route call on the source chain.
///
/// The inbox rebuilds these from the accounts a solver passes in, so the
/// flags must match what the runtime reports for the fulfill transaction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SerializableAccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl From<&AccountInfo<'_>> for SerializableAccountMeta {
    fn from(account: &AccountInfo<'_>) -> Self {
        Self {
            pubkey: account.key(),
            is_signer: account.is_signer,
            is_writable: account.is_writable,
        }
    }
}

impl From<AccountMeta> for SerializableAccountMeta {
    fn from(meta: AccountMeta) -> Self {
        Self {
            pubkey: meta.pubkey,
            is_signer: meta.is_signer,
            is_writable: meta.is_writable,
        }
    }
}
