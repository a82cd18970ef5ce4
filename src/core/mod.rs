//! Core module: byte ring buffer di atas anonymous mmap storage
//!
//! Prinsip desain:
//! - Offset + length arithmetic, semua modulo eksplisit
//! - Satu sentinel byte: kosong jika `read_pos == write_pos`
//! - Tanpa lock: sinkronisasi ada di layer channel

mod ring_buffer;
mod storage;

pub use ring_buffer::RingBuffer;
pub use storage::Storage;
