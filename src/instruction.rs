use arrayref::array_ref;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Initialize the randomness coordinator
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle authority that will deliver fulfillments
    /// 1. `[writable]` The coordinator account, program-owned, uninitialized
    InitializeCoordinator {},

    /// Initialize a new raffle bound to a coordinator
    ///
    /// Accounts expected:
    /// 0. `[signer]` The authority/creator of the raffle
    /// 1. `[writable]` The raffle account, program-owned, uninitialized
    /// 2. `[]` The coordinator account
    InitializeRaffle {
        /// Minimum seconds between rounds before upkeep may trigger
        interval: u64,
    },

    /// Enter the current round; free of charge
    ///
    /// Accounts expected:
    /// 0. `[signer]` The player entering the raffle
    /// 1. `[writable]` The raffle account
    EnterRaffle {},

    /// Add lamports to the pot
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The funder
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    Fund {
        /// Lamports to add; zero is a no-op success
        amount: u64,
    },

    /// Evaluate the upkeep predicate; read-only
    ///
    /// The single-byte verdict is published through transaction return data.
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep {},

    /// Request randomness and move the raffle to Calculating (step 1)
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any caller (permissionless, guarded by the predicate)
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The coordinator account
    PerformUpkeep {},

    /// Deliver random words, pick and pay the winner, reopen (step 2)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The coordinator's oracle authority
    /// 1. `[]` The coordinator account
    /// 2. `[writable]` The raffle account
    /// 3. `[writable]` The drawn player's account, receives the pot
    FulfillRandomWords {
        /// Must match the raffle's outstanding request id
        request_id: u64,
        /// Delivered randomness; the first word selects the winner
        random_words: Vec<u64>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match tag {
            0 => Self::InitializeCoordinator {},
            1 => {
                let (interval, _) = Self::unpack_u64(rest)?;
                Self::InitializeRaffle { interval }
            }
            2 => Self::EnterRaffle {},
            3 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::Fund { amount }
            }
            4 => Self::CheckUpkeep {},
            5 => Self::PerformUpkeep {},
            6 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = Self::unpack_u32(rest)?;
                // count comes off the wire; the words must actually be
                // present before reserving for them
                if (count as usize).saturating_mul(8) > rest.len() {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let mut random_words = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let (word, remaining) = Self::unpack_u64(rest)?;
                    random_words.push(word);
                    rest = remaining;
                }
                Self::FulfillRandomWords {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Self::InitializeCoordinator {} => buf.push(0),
            Self::InitializeRaffle { interval } => {
                buf.push(1);
                buf.extend_from_slice(&interval.to_le_bytes());
            }
            Self::EnterRaffle {} => buf.push(2),
            Self::Fund { amount } => {
                buf.push(3);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep {} => buf.push(4),
            Self::PerformUpkeep {} => buf.push(5),
            Self::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                buf.push(6);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.extend_from_slice(&(random_words.len() as u32).to_le_bytes());
                for word in random_words {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        if input.len() < 8 {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (bytes, rest) = input.split_at(8);
        Ok((u64::from_le_bytes(*array_ref![bytes, 0, 8]), rest))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        if input.len() < 4 {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (bytes, rest) = input.split_at(4);
        Ok((u32::from_le_bytes(*array_ref![bytes, 0, 4]), rest))
    }
}

/// Create initialize_coordinator instruction
pub fn initialize_coordinator(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    coordinator_account: &Pubkey,
) -> Instruction {
    let data = RaffleInstruction::InitializeCoordinator {}.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new(*coordinator_account, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create initialize_raffle instruction
pub fn initialize_raffle(
    program_id: &Pubkey,
    authority: &Pubkey,
    raffle_account: &Pubkey,
    coordinator_account: &Pubkey,
    interval: u64,
) -> Instruction {
    let data = RaffleInstruction::InitializeRaffle { interval }.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*authority, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new_readonly(*coordinator_account, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create enter_raffle instruction
pub fn enter_raffle(program_id: &Pubkey, player: &Pubkey, raffle_account: &Pubkey) -> Instruction {
    let data = RaffleInstruction::EnterRaffle {}.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*player, true),
        AccountMeta::new(*raffle_account, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create fund instruction
pub fn fund(
    program_id: &Pubkey,
    funder: &Pubkey,
    raffle_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let data = RaffleInstruction::Fund { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*funder, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey, raffle_account: &Pubkey) -> Instruction {
    let data = RaffleInstruction::CheckUpkeep {}.pack();

    let accounts = vec![AccountMeta::new_readonly(*raffle_account, false)];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle_account: &Pubkey,
    coordinator_account: &Pubkey,
) -> Instruction {
    let data = RaffleInstruction::PerformUpkeep {}.pack();

    let accounts = vec![
        AccountMeta::new_readonly(*caller, true),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new(*coordinator_account, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    coordinator_account: &Pubkey,
    raffle_account: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_words: Vec<u64>,
) -> Instruction {
    let data = RaffleInstruction::FulfillRandomWords {
        request_id,
        random_words,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new_readonly(*coordinator_account, false),
        AccountMeta::new(*raffle_account, false),
        AccountMeta::new(*winner, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}
