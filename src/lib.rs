//! Raffle engine: entrants join for free, funders build the pot, a
//! keeper-style upkeep call locks the round and requests randomness, and the
//! coordinator's fulfillment picks a winner, pays the pot, and reopens.

pub mod error;
pub mod instruction;
pub mod oracle;
pub mod processor;
pub mod state;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey,
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process_instruction(program_id, accounts, instruction_data)
}
