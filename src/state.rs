use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_pack::{IsInitialized, Sealed},
    pubkey::Pubkey,
};

use crate::error::RaffleError;

/// Number of random words requested from the coordinator per round
pub const NUM_WORDS: u32 = 1;
/// Block confirmations the coordinator waits for before fulfilling
pub const REQUEST_CONFIRMATIONS: u32 = 3;
/// Maximum entrants per round; the raffle account is sized for this many
pub const MAX_PLAYERS: usize = 64;

// Space calculation:
// 1 (is_initialized) +
// 32 (authority) +
// 32 (coordinator) +
// 1 (state) +
// 8 (interval) +
// 8 (last_timestamp) +
// 8 (balance) +
// 8 (pending_request) +
// 32 (recent_winner) +
// 8 (winning_money) +
// 4 + 32 * MAX_PLAYERS (players) =
// 2190 total bytes
pub const RAFFLE_ACCOUNT_SIZE: usize = 1 + 32 + 32 + 1 + 8 + 8 + 8 + 8 + 32 + 8 + 4 + 32 * MAX_PLAYERS;

/// Lifecycle of a raffle round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq)]
pub enum RaffleState {
    /// Open for entries and funding
    Open,
    /// Waiting for the randomness coordinator to deliver a word
    Calculating,
}

/// Raffle account data
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Creator of the raffle
    pub authority: Pubkey,
    /// Randomness coordinator this raffle is bound to
    pub coordinator: Pubkey,
    /// Current lifecycle state
    pub state: RaffleState,
    /// Minimum seconds between rounds before upkeep may trigger
    pub interval: u64,
    /// Time of the last round start or reset
    pub last_timestamp: UnixTimestamp,
    /// Pot in lamports, kept on top of the account's rent reserve
    pub balance: u64,
    /// Outstanding randomness request id, 0 when none
    pub pending_request: u64,
    /// Winner of the most recent resolved round
    pub recent_winner: Pubkey,
    /// Prize paid to the most recent winner
    pub winning_money: u64,
    /// Entrants for the current round, in entry order
    pub players: Vec<Pubkey>,
}

impl Sealed for Raffle {}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Raffle {
    /// Create a freshly opened raffle
    pub fn new(
        authority: Pubkey,
        coordinator: Pubkey,
        interval: u64,
        now: UnixTimestamp,
    ) -> Self {
        Self {
            is_initialized: true,
            authority,
            coordinator,
            state: RaffleState::Open,
            interval,
            last_timestamp: now,
            balance: 0,
            pending_request: 0,
            recent_winner: Pubkey::default(),
            winning_money: 0,
            players: Vec::new(),
        }
    }

    /// The upkeep predicate: open, interval elapsed, funded, and has players
    pub fn upkeep_needed(&self, now: UnixTimestamp) -> bool {
        self.state == RaffleState::Open
            && now.saturating_sub(self.last_timestamp) >= self.interval as i64
            && self.balance > 0
            && !self.players.is_empty()
    }

    /// Look up an entrant by position in the current round
    pub fn player(&self, index: usize) -> Result<&Pubkey, RaffleError> {
        self.players
            .get(index)
            .ok_or(RaffleError::PlayerIndexOutOfBounds)
    }

    /// Number of entrants in the current round
    pub fn num_players(&self) -> u64 {
        self.players.len() as u64
    }

    /// Whether an address has already entered the current round
    pub fn has_entered(&self, player: &Pubkey) -> bool {
        self.players.contains(player)
    }

    /// Whether the current round has reached capacity
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub const fn num_words() -> u32 {
        NUM_WORDS
    }

    pub const fn request_confirmations() -> u32 {
        REQUEST_CONFIRMATIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_raffle() -> Raffle {
        let mut raffle = Raffle::new(Pubkey::new_unique(), Pubkey::new_unique(), 30, 1_000);
        raffle.balance = 1;
        raffle.players.push(Pubkey::new_unique());
        raffle
    }

    #[test]
    fn upkeep_needs_all_four_conditions() {
        let raffle = open_raffle();
        assert!(raffle.upkeep_needed(1_030));

        let mut closed = open_raffle();
        closed.state = RaffleState::Calculating;
        assert!(!closed.upkeep_needed(1_030));

        let unfunded = {
            let mut r = open_raffle();
            r.balance = 0;
            r
        };
        assert!(!unfunded.upkeep_needed(1_030));

        let empty = {
            let mut r = open_raffle();
            r.players.clear();
            r
        };
        assert!(!empty.upkeep_needed(1_030));

        // interval not yet elapsed
        assert!(!open_raffle().upkeep_needed(1_029));
    }

    #[test]
    fn round_fills_at_max_players() {
        let mut raffle = Raffle::new(Pubkey::new_unique(), Pubkey::new_unique(), 30, 0);
        for _ in 0..MAX_PLAYERS {
            assert!(!raffle.is_full());
            raffle.players.push(Pubkey::new_unique());
        }
        assert!(raffle.is_full());
    }

    #[test]
    fn player_lookup_fails_on_empty_list() {
        let raffle = Raffle::new(Pubkey::new_unique(), Pubkey::new_unique(), 30, 0);
        assert_eq!(raffle.player(0), Err(RaffleError::PlayerIndexOutOfBounds));
        assert_eq!(raffle.num_players(), 0);
    }

    #[test]
    fn serialized_size_fits_account() {
        let mut raffle = Raffle::new(Pubkey::new_unique(), Pubkey::new_unique(), 30, 0);
        for _ in 0..MAX_PLAYERS {
            raffle.players.push(Pubkey::new_unique());
        }
        let bytes = raffle.try_to_vec().unwrap();
        assert!(bytes.len() <= RAFFLE_ACCOUNT_SIZE);
    }
}
