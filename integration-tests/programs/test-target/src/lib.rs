//! Call target for route tests: a counter only the inbox executor can bump,
//! and an instruction that always fails.

use anchor_lang::prelude::*;

declare_id!("9vZVKvJnu9oPUGqsnFjPncC2prC7gRgDZH1uoiBtWpmR");

pub const COUNTER_SEED: &[u8] = b"counter";

#[program]
pub mod test_target {
    use super::*;

    pub fn init(_ctx: Context<Init>) -> Result<()> {
        Ok(())
    }

    /// Returns the new count.
    pub fn increment(ctx: Context<Increment>) -> Result<u64> {
        let counter = &mut ctx.accounts.counter;
        counter.count += 1;
        counter.last_caller = ctx.accounts.executor.key();

        Ok(counter.count)
    }

    pub fn revert(_ctx: Context<Revert>) -> Result<()> {
        err!(TestTargetError::Reverted)
    }
}

#[derive(Accounts)]
pub struct Init<'info> {
    #[account(
        init,
        payer = payer,
        space = 8 + Counter::INIT_SPACE,
        seeds = [COUNTER_SEED],
        bump
    )]
    pub counter: Account<'info, Counter>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Increment<'info> {
    #[account(mut, seeds = [COUNTER_SEED], bump)]
    pub counter: Account<'info, Counter>,
    #[account(address = inbox::state::executor_pda().0 @ TestTargetError::UnauthorizedCaller)]
    pub executor: Signer<'info>,
}

#[derive(Accounts)]
pub struct Revert {}

#[account]
#[derive(InitSpace, Default, Debug, PartialEq, Eq)]
pub struct Counter {
    pub count: u64,
    pub last_caller: Pubkey,
}

impl Counter {
    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[COUNTER_SEED], &ID)
    }
}

#[error_code(offset = 6800)]
pub enum TestTargetError {
    Reverted,
    UnauthorizedCaller,
}
