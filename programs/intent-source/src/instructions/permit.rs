use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke;
use anchor_lang::system_program;
use eco_std::types::{Call, Calldata};

use crate::instructions::IntentSourceError;

/// Runs the caller's permit calls and returns the accounts left after theirs.
///
/// Each call's data is a borsh [`Calldata`] whose accounts come next in
/// `remaining_accounts`. Calls carry only the signatures of the transaction
/// itself: they are sent with `invoke`, never `invoke_signed`, so no PDA of
/// this program can be made to authorize anything. Native value moves from
/// `funder` to a target that is not a program.
pub fn execute_permit_calls<'c, 'info>(
    funder: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    calls: Vec<Call>,
    mut remaining_accounts: &'c [AccountInfo<'info>],
) -> Result<&'c [AccountInfo<'info>]> {
    for call in calls {
        let calldata =
            Calldata::try_from_slice(&call.data).map_err(|_| IntentSourceError::InvalidPermitCall)?;
        let account_count = calldata.account_count as usize;
        require_gte!(
            remaining_accounts.len(),
            account_count,
            IntentSourceError::InvalidPermitCall
        );
        let (call_accounts, rest) = remaining_accounts.split_at(account_count);
        remaining_accounts = rest;

        execute_permit_call(funder, system_program, &call, &calldata, call_accounts)?;
    }

    Ok(remaining_accounts)
}

fn execute_permit_call<'info>(
    funder: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    call: &Call,
    calldata: &Calldata,
    accounts: &[AccountInfo<'info>],
) -> Result<()> {
    require_keys_neq!(call.target, crate::ID, IntentSourceError::InvalidPermitCall);
    let target = accounts
        .iter()
        .find(|account| account.key == &call.target)
        .ok_or(IntentSourceError::InvalidPermitCall)?;

    if !target.executable {
        require!(calldata.data.is_empty(), IntentSourceError::InvalidPermitCall);

        return match call.value {
            0 => Ok(()),
            value => system_program::transfer(
                CpiContext::new(
                    system_program.to_account_info(),
                    system_program::Transfer {
                        from: funder.to_account_info(),
                        to: target.to_account_info(),
                    },
                ),
                value,
            ),
        };
    }
    require_eq!(call.value, 0, IntentSourceError::InvalidPermitCall);

    let instruction = Instruction::new_with_bytes(
        call.target,
        &calldata.data,
        accounts
            .iter()
            .map(|account| AccountMeta {
                pubkey: account.key(),
                is_signer: account.is_signer,
                is_writable: account.is_writable,
            })
            .collect(),
    );

    invoke(&instruction, accounts).map_err(Into::into)
}
