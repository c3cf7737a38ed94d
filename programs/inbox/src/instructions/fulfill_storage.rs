use anchor_lang::prelude::*;

use crate::events::ToBeProven;
use crate::instructions::{fulfill, Fulfill, FulfillArgs};

pub fn fulfill_storage<'info>(
    ctx: Context<'_, '_, '_, 'info, Fulfill<'info>>,
    args: FulfillArgs,
) -> Result<()> {
    let fulfilled = fulfill(ctx.accounts, ctx.remaining_accounts, args)?;

    emit!(ToBeProven::new(
        fulfilled.intent_hash,
        fulfilled.source,
        fulfilled.claimant
    ));

    Ok(())
}
