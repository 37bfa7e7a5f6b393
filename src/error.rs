use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TeamError {
    #[error("teams need 10 or 12 players, got {0}")]
    WrongPlayerCount(usize),
    #[error("player {0} was selected more than once")]
    DuplicatePlayer(i32),
}

#[derive(Error, Debug, PartialEq)]
pub enum ResultsError {
    #[error("results need 10 or 12 players, got {0}")]
    WrongPlayerCount(usize),
    #[error("{0} is not a valid number of points (use 0, 1 or 3)")]
    InvalidPoints(i32),
    #[error("player {0} has more than one result")]
    DuplicatePlayer(i32),
    #[error("unknown player {0}")]
    UnknownPlayer(i32),
    #[error("{players} players must have {} or {} total points (current: {total})", .valid.0, .valid.1)]
    InvalidTotal { players: usize, total: i32, valid: (i32, i32) },
}
