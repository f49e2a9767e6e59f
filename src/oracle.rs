//! Randomness coordinator seam.
//!
//! The coordinator account stands in for the external randomness oracle: it
//! hands out monotonically increasing request ids and records which authority
//! is allowed to deliver fulfillments. The engine never waits on it; it only
//! reacts when `FulfillRandomWords` arrives.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    program_error::ProgramError,
    program_pack::{IsInitialized, Sealed},
    pubkey::Pubkey,
};

// Space calculation:
// 1 (is_initialized) + 32 (authority) + 8 (next_request_id) = 41 total bytes
pub const COORDINATOR_ACCOUNT_SIZE: usize = 1 + 32 + 8;

/// Randomness coordinator account data
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct RandomnessCoordinator {
    /// Is the account initialized
    pub is_initialized: bool,
    /// The only signer allowed to fulfill requests
    pub authority: Pubkey,
    /// Next request id to hand out; starts at 1 so issued ids are never 0
    pub next_request_id: u64,
}

impl Sealed for RandomnessCoordinator {}

impl IsInitialized for RandomnessCoordinator {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl RandomnessCoordinator {
    pub fn new(authority: Pubkey) -> Self {
        Self {
            is_initialized: true,
            authority,
            next_request_id: 1,
        }
    }

    /// Issue the next request id and advance the counter
    pub fn issue_request(&mut self) -> Result<u64, ProgramError> {
        let request_id = self.next_request_id;
        self.next_request_id = self
            .next_request_id
            .checked_add(1)
            .ok_or(ProgramError::InvalidAccountData)?;
        Ok(request_id)
    }
}

/// Map a random word onto the player list
pub fn winner_index(random_word: u64, player_count: u64) -> u64 {
    if player_count == 0 {
        return 0;
    }
    random_word % player_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_start_at_one_and_increase() {
        let mut coordinator = RandomnessCoordinator::new(Pubkey::new_unique());
        assert_eq!(coordinator.issue_request().unwrap(), 1);
        assert_eq!(coordinator.issue_request().unwrap(), 2);
        assert_eq!(coordinator.next_request_id, 3);
    }

    #[test]
    fn winner_index_wraps_around_player_count() {
        assert_eq!(winner_index(0, 4), 0);
        assert_eq!(winner_index(7, 4), 3);
        assert_eq!(winner_index(u64::MAX, 3), u64::MAX % 3);
    }
}
