use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use eco_std::prover::ProofType;

#[derive(Accounts)]
pub struct GetProofType {}

pub fn proof_type(_ctx: Context<GetProofType>) -> Result<()> {
    set_return_data(&ProofType::Hyperlane.try_to_vec()?);

    Ok(())
}
