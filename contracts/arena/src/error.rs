use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ArenaError {
    /// Topic or choice does not exist
    InvalidReference = 1,
    /// Deposit is below the arena's minimum vote amount
    BelowMinimum = 2,
    /// Participant does not hold enough of the arena token
    InsufficientBalance = 3,
    /// Participant has not approved the arena for the deposit amount
    InsufficientAllowance = 4,
    /// Participant has no live position on the choice
    NoPosition = 5,
    /// Zero cycle duration, fee basis points above 10000 or non-positive minimum
    InvalidConfig = 6,
    /// Topic start time has not been reached
    NotStarted = 7,
    /// Vote or withdraw invoked while another one is in progress
    Reentrant = 8,
    /// Arithmetic overflow
    Overflow = 9,
    /// Only the arena admin can perform this action
    Unauthorized = 10,
    /// Storage layout is already at the current version
    AlreadyMigrated = 11,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 12,
}
