//! Channel layer: blocking read/write di atas RingBuffer
//!
//! - `SynchronizedChannel`: monitor (Mutex + Condvar readable/writable)
//! - `Wait`: blocking, non-blocking, atau timeout per call
//! - `CancelToken`: interrupt call yang sedang tidur

mod cancel;
mod synchronized;
mod wait;

pub use cancel::CancelToken;
pub use synchronized::{ChannelStats, SynchronizedChannel};
pub use wait::Wait;
