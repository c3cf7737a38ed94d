pub mod handle;
pub mod init;
pub mod proof_type;
pub mod prove;

pub use handle::*;
pub use init::*;
pub use proof_type::*;
pub use prove::*;
