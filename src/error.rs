use std::error;

use thiserror::Error;

use crate::compensation::DivisionByZero;

/// Errors reported by the driver. `E` is the error type of the bus transport.
#[derive(Debug, Error)]
pub enum Error<E: error::Error + 'static> {
    #[error("bus transaction failed")]
    Bus(#[source] E),
    #[error(transparent)]
    Arithmetic(#[from] DivisionByZero),
    #[error("serialized record does not fit its buffer")]
    RecordOverflow,
}

impl<E: error::Error + 'static> Error<E> {
    pub fn is_bus(&self) -> bool {
        match self {
            Error::Bus(_) => true,
            _ => false,
        }
    }
}
