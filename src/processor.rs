use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    system_instruction,
    sysvar::Sysvar,
};

use crate::{
    error::RaffleError,
    instruction::RaffleInstruction,
    oracle::{self, RandomnessCoordinator},
    state::{Raffle, RaffleState, MAX_PLAYERS, NUM_WORDS, REQUEST_CONFIRMATIONS},
};

pub struct Processor;

impl Processor {
    pub fn process_instruction(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeCoordinator {} => {
                msg!("Instruction: Initialize Coordinator");
                Self::process_initialize_coordinator(accounts, program_id)
            }
            RaffleInstruction::InitializeRaffle { interval } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(accounts, interval, program_id)
            }
            RaffleInstruction::EnterRaffle {} => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(accounts, program_id)
            }
            RaffleInstruction::Fund { amount } => {
                msg!("Instruction: Fund");
                Self::process_fund(accounts, amount, program_id)
            }
            RaffleInstruction::CheckUpkeep {} => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(accounts, program_id)
            }
            RaffleInstruction::PerformUpkeep {} => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(accounts, program_id)
            }
            RaffleInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(accounts, request_id, &random_words, program_id)
            }
        }
    }

    /// Set up the randomness coordinator that issues request ids and gates
    /// fulfillment behind its authority
    fn process_initialize_coordinator(
        accounts: &[AccountInfo],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !authority_info.is_signer {
            msg!("Oracle authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if coordinator_info.owner != program_id {
            msg!("Coordinator account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        if coordinator_info.data_len() < crate::oracle::COORDINATOR_ACCOUNT_SIZE {
            msg!("Coordinator account is too small");
            return Err(ProgramError::AccountDataTooSmall);
        }

        let existing =
            RandomnessCoordinator::deserialize(&mut &coordinator_info.data.borrow()[..])?;
        if existing.is_initialized() {
            msg!("Coordinator account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let coordinator = RandomnessCoordinator::new(*authority_info.key);
        coordinator.serialize(&mut *coordinator_info.data.borrow_mut())?;

        msg!("Coordinator initialized: authority={}", authority_info.key);
        Ok(())
    }

    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        interval: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !authority_info.is_signer {
            msg!("Authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        // Upkeep timing is clock arithmetic, so the interval must fit i64
        if interval == 0 || interval > i64::MAX as u64 {
            msg!("Interval must be between 1 and i64::MAX seconds");
            return Err(ProgramError::InvalidArgument);
        }

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        if raffle_info.data_len() < crate::state::RAFFLE_ACCOUNT_SIZE {
            msg!("Raffle account is too small");
            return Err(ProgramError::AccountDataTooSmall);
        }

        {
            let existing = Raffle::deserialize(&mut &raffle_info.data.borrow()[..])?;
            if existing.is_initialized() {
                msg!("Raffle account is already initialized");
                return Err(ProgramError::AccountAlreadyInitialized);
            }
        }

        if coordinator_info.owner != program_id {
            msg!("Coordinator account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let coordinator =
            RandomnessCoordinator::deserialize(&mut &coordinator_info.data.borrow()[..])?;
        if !coordinator.is_initialized() {
            msg!("Coordinator account must be initialized");
            return Err(ProgramError::UninitializedAccount);
        }

        let clock = Clock::get()?;
        let raffle = Raffle::new(
            *authority_info.key,
            *coordinator_info.key,
            interval,
            clock.unix_timestamp,
        );
        raffle.serialize(&mut *raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: interval={}s, coordinator={}",
            interval,
            coordinator_info.key
        );
        Ok(())
    }

    fn process_enter_raffle(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::deserialize(&mut &raffle_info.data.borrow()[..])?;
        if !raffle.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }

        if raffle.state != RaffleState::Open {
            msg!("Raffle is calculating, entries are closed");
            return Err(RaffleError::RaffleNotOpen.into());
        }

        if raffle.has_entered(player_info.key) {
            msg!("Player {} has already entered this round", player_info.key);
            return Err(RaffleError::PlayerHasEntered.into());
        }

        if raffle.is_full() {
            msg!("Round is full ({} players)", MAX_PLAYERS);
            return Err(RaffleError::RaffleFull.into());
        }

        raffle.players.push(*player_info.key);
        raffle.serialize(&mut *raffle_info.data.borrow_mut())?;

        msg!("RaffleEnter: player={}", player_info.key);
        Ok(())
    }

    fn process_fund(accounts: &[AccountInfo], amount: u64, program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let funder_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !funder_info.is_signer {
            msg!("Funder must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::deserialize(&mut &raffle_info.data.borrow()[..])?;
        if !raffle.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }

        if raffle.state != RaffleState::Open {
            msg!("Raffle is calculating, funding is closed");
            return Err(RaffleError::RaffleNotOpen.into());
        }

        // Zero-amount funding is a no-op success
        if amount == 0 {
            msg!("Fund: amount=0, nothing to do");
            return Ok(());
        }

        invoke(
            &system_instruction::transfer(funder_info.key, raffle_info.key, amount),
            &[
                funder_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.balance = raffle
            .balance
            .checked_add(amount)
            .ok_or(ProgramError::InvalidArgument)?;
        raffle.serialize(&mut *raffle_info.data.borrow_mut())?;

        msg!(
            "Fund: funder={}, amount={} lamports, balance={}",
            funder_info.key,
            amount,
            raffle.balance
        );
        Ok(())
    }

    /// Read-only evaluation of the upkeep predicate; the verdict byte goes
    /// out through transaction return data, perform-data is empty
    fn process_check_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let raffle = Raffle::deserialize(&mut &raffle_info.data.borrow()[..])?;
        if !raffle.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }

        let clock = Clock::get()?;
        let upkeep_needed = raffle.upkeep_needed(clock.unix_timestamp);
        set_return_data(&[upkeep_needed as u8]);

        msg!("checkUpkeep: upkeep_needed={}", upkeep_needed);
        Ok(())
    }

    /// Step 1 of round resolution: request randomness and lock the raffle
    fn process_perform_upkeep(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id || coordinator_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::deserialize(&mut &raffle_info.data.borrow()[..])?;
        if !raffle.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }

        if raffle.coordinator != *coordinator_info.key {
            msg!("Coordinator account does not match the raffle's coordinator");
            return Err(ProgramError::InvalidArgument);
        }

        let mut coordinator =
            RandomnessCoordinator::deserialize(&mut &coordinator_info.data.borrow()[..])?;
        if !coordinator.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }

        let clock = Clock::get()?;
        if !raffle.upkeep_needed(clock.unix_timestamp) {
            msg!(
                "Upkeep not needed: balance={}, players={}, state={:?}",
                raffle.balance,
                raffle.num_players(),
                raffle.state
            );
            return Err(RaffleError::UpkeepNotNeeded.into());
        }

        let request_id = coordinator.issue_request()?;
        raffle.pending_request = request_id;
        raffle.state = RaffleState::Calculating;

        coordinator.serialize(&mut *coordinator_info.data.borrow_mut())?;
        raffle.serialize(&mut *raffle_info.data.borrow_mut())?;

        msg!(
            "UpkeepPerformed: request_id={}, num_words={}, confirmations={}",
            request_id,
            NUM_WORDS,
            REQUEST_CONFIRMATIONS
        );
        Ok(())
    }

    /// Step 2 of round resolution: the oracle delivers randomness, the engine
    /// picks a winner, pays the pot, and reopens for the next round
    fn process_fulfill_random_words(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        if !oracle_authority_info.is_signer {
            msg!("Oracle authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id || coordinator_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let coordinator =
            RandomnessCoordinator::deserialize(&mut &coordinator_info.data.borrow()[..])?;
        if !coordinator.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }
        if coordinator.authority != *oracle_authority_info.key {
            msg!("Signer is not the coordinator's oracle authority");
            return Err(ProgramError::InvalidArgument);
        }

        let mut raffle = Raffle::deserialize(&mut &raffle_info.data.borrow()[..])?;
        if !raffle.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }
        if raffle.coordinator != *coordinator_info.key {
            msg!("Coordinator account does not match the raffle's coordinator");
            return Err(ProgramError::InvalidArgument);
        }

        // Zero means no request outstanding, so both id 0 and any issued-looking
        // id fail before the first performUpkeep
        if raffle.pending_request == 0 || request_id != raffle.pending_request {
            msg!(
                "Nonexistent request: presented={}, pending={}",
                request_id,
                raffle.pending_request
            );
            return Err(RaffleError::NonexistentRequest.into());
        }

        let word = random_words
            .first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        let index = oracle::winner_index(*word, raffle.num_players());
        let winner = *raffle.player(index as usize)?;
        if winner != *winner_info.key {
            msg!("Drawn player is {}, got account {}", winner, winner_info.key);
            return Err(RaffleError::WinnerMismatch.into());
        }

        // Pay the full pot; the raffle account keeps its rent reserve
        let prize = raffle.balance;
        **raffle_info.lamports.borrow_mut() = raffle_info
            .lamports()
            .checked_sub(prize)
            .ok_or(ProgramError::InsufficientFunds)?;
        **winner_info.lamports.borrow_mut() = winner_info
            .lamports()
            .checked_add(prize)
            .ok_or(ProgramError::InvalidArgument)?;

        let clock = Clock::get()?;
        raffle.recent_winner = winner;
        raffle.winning_money = prize;
        raffle.balance = 0;
        raffle.players.clear();
        raffle.pending_request = 0;
        raffle.last_timestamp = clock.unix_timestamp;
        raffle.state = RaffleState::Open;
        raffle.serialize(&mut *raffle_info.data.borrow_mut())?;

        msg!("WinnerPicked: winner={}, prize={} lamports", winner, prize);
        Ok(())
    }
}
