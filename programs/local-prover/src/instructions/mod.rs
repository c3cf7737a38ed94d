use anchor_lang::prelude::*;

pub mod proof_type;
pub mod prove;

pub use proof_type::*;
pub use prove::*;

#[error_code(offset = 6400)]
pub enum LocalProverError {
    UnauthorizedInitiateProving,
    InvalidSourceChain,
    InvalidInboxConfig,
}
