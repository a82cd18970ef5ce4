//! Wait mode untuk blocking calls

use std::time::{Duration, Instant};

/// Behaviour of a read or write whose condition is not yet met.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Wait {
    /// Suspend until the condition holds or the call is cancelled.
    #[default]
    Blocking,
    /// Return `WouldBlock` immediately.
    NonBlocking,
    /// Like `Blocking`, but give up with `TimedOut` after the duration.
    Timeout(Duration),
}

impl Wait {
    /// Map the device-style `O_NONBLOCK` flag to a wait mode.
    pub const fn from_nonblocking(nonblocking: bool) -> Self {
        if nonblocking {
            Self::NonBlocking
        } else {
            Self::Blocking
        }
    }

    pub const fn is_non_blocking(self) -> bool {
        matches!(self, Self::NonBlocking)
    }

    /// Absolute deadline, dihitung sekali di awal call.
    ///
    /// Timeout yang melampaui jangkauan `Instant` berarti tanpa deadline.
    pub(crate) fn deadline(self) -> Option<Instant> {
        match self {
            Self::Timeout(timeout) => Instant::now().checked_add(timeout),
            Self::Blocking | Self::NonBlocking => None,
        }
    }
}
