//! Error taxonomy untuk pipe operations
//!
//! Partial transfer BUKAN error: read/write mengembalikan jumlah byte
//! yang benar-benar dipindahkan. Error hanya untuk kondisi yang membuat
//! operasi tidak bisa dilanjutkan sama sekali.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PipeError>;

/// Errors surfaced by buffers, channels and the endpoint registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipeError {
    /// Storage allocation failed. The buffer keeps its previous state.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },

    /// Non-blocking call found its condition unmet.
    #[error("operation would block")]
    WouldBlock,

    /// A blocked call was cancelled before it could transfer anything.
    #[error("blocking call interrupted")]
    Interrupted,

    /// A `Wait::Timeout` deadline passed without progress.
    #[error("operation timed out")]
    TimedOut,

    /// Write can never fit, even into an empty buffer.
    #[error("write of {requested} bytes exceeds usable capacity {usable}")]
    SizeExceeded { requested: usize, usable: usize },

    /// Resize would drop bytes that are still buffered.
    #[error("cannot resize to {requested} bytes while {used} bytes are buffered")]
    WouldShrinkBelowUsedData { requested: usize, used: usize },

    /// Capacity must leave room for the sentinel byte.
    #[error("invalid capacity {0}: must be greater than 1")]
    InvalidCapacity(usize),

    /// Endpoint already has the maximum number of readers attached.
    #[error("too many readers (limit {limit})")]
    TooManyReaders { limit: usize },

    /// Endpoint already has its single writer attached.
    #[error("only one writer allowed")]
    WriterBusy,

    /// Endpoint index out of range.
    #[error("no such endpoint: {0}")]
    NoSuchEndpoint(usize),

    /// Channel index out of range.
    #[error("no such channel: {0}")]
    NoSuchChannel(usize),

    /// Handle was not opened for reading.
    #[error("handle not opened for reading")]
    NotReadable,

    /// Handle was not opened for writing.
    #[error("handle not opened for writing")]
    NotWritable,

    /// Reader limit must be at least 1.
    #[error("invalid reader limit {0}")]
    InvalidLimit(usize),

    /// Registry configuration rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

impl PipeError {
    /// `true` untuk error yang bisa di-retry oleh caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::WouldBlock
                | Self::Interrupted
                | Self::TimedOut
                | Self::WouldShrinkBelowUsedData { .. }
                | Self::TooManyReaders { .. }
                | Self::WriterBusy
        )
    }

    /// Errno the character-device surface reports for this error.
    #[cfg(unix)]
    pub fn errno(&self) -> i32 {
        match self {
            Self::OutOfMemory { .. } => libc::ENOMEM,
            Self::WouldBlock => libc::EAGAIN,
            Self::Interrupted => libc::EINTR,
            Self::TimedOut => libc::ETIMEDOUT,
            Self::SizeExceeded { .. } => libc::EMSGSIZE,
            Self::WouldShrinkBelowUsedData { .. }
            | Self::InvalidCapacity(_)
            | Self::InvalidLimit(_)
            | Self::InvalidConfig(_) => libc::EINVAL,
            Self::TooManyReaders { .. } | Self::WriterBusy => libc::EBUSY,
            Self::NoSuchEndpoint(_) | Self::NoSuchChannel(_) => libc::ENODEV,
            Self::NotReadable | Self::NotWritable => libc::EBADF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(PipeError::WouldBlock.is_recoverable());
        assert!(PipeError::Interrupted.is_recoverable());
        assert!(PipeError::WouldShrinkBelowUsedData { requested: 4, used: 8 }.is_recoverable());
        assert!(!PipeError::SizeExceeded { requested: 10, usable: 7 }.is_recoverable());
        assert!(!PipeError::OutOfMemory { requested: 1 }.is_recoverable());
    }

    #[cfg(unix)]
    #[test]
    fn test_errno_mapping() {
        assert_eq!(PipeError::WouldBlock.errno(), libc::EAGAIN);
        assert_eq!(PipeError::Interrupted.errno(), libc::EINTR);
        assert_eq!(
            PipeError::SizeExceeded { requested: 10, usable: 7 }.errno(),
            libc::EMSGSIZE
        );
        assert_eq!(PipeError::WriterBusy.errno(), libc::EBUSY);
    }

    #[test]
    fn test_display() {
        let err = PipeError::SizeExceeded { requested: 10, usable: 7 };
        assert_eq!(err.to_string(), "write of 10 bytes exceeds usable capacity 7");
    }
}
