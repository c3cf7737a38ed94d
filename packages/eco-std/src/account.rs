use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;

/// Creation and in-place updates for program-owned PDAs that are not
/// declared through `#[account(init)]`, because their address depends on
/// data only known inside the handler.
pub trait AccountExt: AccountSerialize + AccountDeserialize + Owner + Space {
    /// Creates `account` with `8 + INIT_SPACE` bytes owned by this program
    /// and writes `self` into it. Fails with `ConstraintZero` if the account
    /// already holds data.
    fn init<'info>(
        self,
        account: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system_program: &Program<'info, System>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let owner = Self::owner();
        let space = 8 + Self::INIT_SPACE;

        require!(
            account.data_is_empty() && *account.owner != owner,
            anchor_lang::error::ErrorCode::ConstraintZero
        );

        allocate(account, payer, system_program, signer_seeds, space, &owner)?;
        self.try_serialize(&mut &mut account.try_borrow_mut_data()?[..])
    }

    /// Reads an existing account, checking owner and discriminator.
    fn load(account: &AccountInfo<'_>) -> Result<Self> {
        require_keys_eq!(
            *account.owner,
            Self::owner(),
            anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram
        );

        Self::try_deserialize(&mut &account.try_borrow_data()?[..])
    }

    /// Overwrites an account previously created with [`AccountExt::init`].
    fn store(&self, account: &AccountInfo<'_>) -> Result<()> {
        require_keys_eq!(
            *account.owner,
            Self::owner(),
            anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram
        );

        self.try_serialize(&mut &mut account.try_borrow_mut_data()?[..])
    }
}

fn allocate<'info>(
    account: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    signer_seeds: &[&[&[u8]]],
    space: usize,
    owner: &Pubkey,
) -> Result<()> {
    let rent_exempt = Rent::get()?.minimum_balance(space);
    let system_accounts = |accounts: &[&AccountInfo<'info>]| {
        accounts
            .iter()
            .map(|account| account.to_account_info())
            .chain(std::iter::once(system_program.to_account_info()))
            .collect::<Vec<_>>()
    };

    // someone may have sent lamports to the address ahead of creation
    if account.lamports() == 0 {
        invoke_signed(
            &system_instruction::create_account(
                payer.key,
                account.key,
                rent_exempt,
                space as u64,
                owner,
            ),
            &system_accounts(&[payer, account]),
            signer_seeds,
        )?;

        return Ok(());
    }

    if let Some(top_up) = rent_exempt
        .checked_sub(account.lamports())
        .filter(|top_up| *top_up > 0)
    {
        invoke_signed(
            &system_instruction::transfer(payer.key, account.key, top_up),
            &system_accounts(&[payer, account]),
            signer_seeds,
        )?;
    }
    invoke_signed(
        &system_instruction::allocate(account.key, space as u64),
        &system_accounts(&[account]),
        signer_seeds,
    )?;
    invoke_signed(
        &system_instruction::assign(account.key, owner),
        &system_accounts(&[account]),
        signer_seeds,
    )?;

    Ok(())
}
