use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("State error - tick out of bounds")]
    TickOutOfBounds,
    #[error("State error - sqrtRatio out of bounds")]
    SqrtRatioOutOfBounds,
    #[error("State error - sqrtRatio does not fit the compact float representation")]
    SqrtRatioContainerOverflow,
    #[error("State error - too much time passed since last execution")]
    TimeElapsedTooLarge,
    #[error("State error - block timestamp is zero")]
    MissingBlockTimestamp,
    #[error("State error - token0 must sort strictly before token1")]
    TokenOrderInvalid,
    #[error("State error - extension {extension} is incompatible with pool type {pool_type}")]
    InvalidPoolTypeConfig {
        extension: &'static str,
        pool_type: &'static str,
    },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    #[error("Swap error - sqrtRatio limit is on the wrong side of the current price")]
    WrongSwapDirection,
    #[error("Swap error - swap yields a zero amount")]
    ZeroAmount,
    #[error("Swap error - token is not part of the pool")]
    TokenNotInPool,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EventError {
    #[error("Event error - payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort { expected: usize, actual: usize },
    #[error("Event error - ABI word does not fit the declared type")]
    ValueOutOfRange,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    MathError(#[from] crate::error::MathError),

    #[error(transparent)]
    StateError(#[from] crate::error::StateError),

    #[error(transparent)]
    SwapError(#[from] crate::error::SwapError),

    #[error(transparent)]
    EventError(#[from] crate::error::EventError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error - failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error - invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
