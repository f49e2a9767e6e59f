use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError,
    program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the Raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum RaffleError {
    /// Raffle is calculating a winner and not accepting entries or funds
    #[error("Raffle is not open")]
    RaffleNotOpen,

    /// The player already entered during this round
    #[error("Player has already entered this round")]
    PlayerHasEntered,

    /// performUpkeep was called while the upkeep predicate is false
    #[error("Upkeep is not needed")]
    UpkeepNotNeeded,

    /// Fulfillment referenced a request id that was never issued or is stale
    #[error("Nonexistent randomness request")]
    NonexistentRequest,

    /// Player lookup past the end of the current round's player list
    #[error("Player index out of bounds")]
    PlayerIndexOutOfBounds,

    /// The current round's player list is at capacity
    #[error("Raffle is full")]
    RaffleFull,

    /// The winner account does not match the player drawn by the random word
    #[error("Winner account does not match the drawn player")]
    WinnerMismatch,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}

impl PrintProgramError for RaffleError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
