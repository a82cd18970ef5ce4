//! RingPipe - Bounded Blocking Byte Pipe
//!
//! Arsitektur (leaves first):
//! - `core`: byte ring buffer dengan sentinel slot, storage anonymous mmap
//! - `channel`: monitor Mutex + Condvar, blocking/non-blocking/timeout,
//!   cancellation
//! - `device`: endpoint yang di-cross-wire, registry open/close, control
//!
//! ```
//! use ringpipe::{Access, PipeConfig, PipeRegistry, Wait};
//!
//! let registry = PipeRegistry::new(PipeConfig::default()).unwrap();
//! let writer = registry.open(0, Access::Write).unwrap();
//! let reader = registry.open(1, Access::Read).unwrap();
//!
//! writer.write(b"hello", Wait::Blocking).unwrap();
//! let mut buf = [0u8; 16];
//! let n = reader.read(&mut buf, Wait::Blocking).unwrap();
//! assert_eq!(&buf[..n], b"hello");
//! ```

pub mod channel;
pub mod config;
pub mod core;
pub mod device;
pub mod error;

pub use channel::{CancelToken, ChannelStats, SynchronizedChannel, Wait};
pub use config::{ChannelConfig, PipeConfig, WritePolicy};
pub use crate::core::RingBuffer;
pub use device::{Access, Control, Endpoint, EndpointHandle, PipeRegistry};
pub use error::{PipeError, Result};
