//! Endpoint: view berarah atas dua channel
//!
//! Endpoint membaca dari `read_source` dan menulis ke `write_sink`.
//! Tidak ada state sendiri, semua didelegasikan ke channel.

use crate::channel::{CancelToken, SynchronizedChannel, Wait};
use crate::error::Result;

/// Directional pairing of a read-source channel and a write-sink channel.
#[derive(Debug, Clone)]
pub struct Endpoint {
    index: usize,
    read_source: SynchronizedChannel,
    write_sink: SynchronizedChannel,
}

impl Endpoint {
    pub fn new(
        index: usize,
        read_source: SynchronizedChannel,
        write_sink: SynchronizedChannel,
    ) -> Self {
        Self {
            index,
            read_source,
            write_sink,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn read_source(&self) -> &SynchronizedChannel {
        &self.read_source
    }

    #[inline]
    pub fn write_sink(&self) -> &SynchronizedChannel {
        &self.write_sink
    }

    pub fn read(&self, out: &mut [u8], wait: Wait) -> Result<usize> {
        self.read_source.read(out, wait)
    }

    pub fn read_interruptible(
        &self,
        out: &mut [u8],
        wait: Wait,
        cancel: &CancelToken,
    ) -> Result<usize> {
        self.read_source.read_interruptible(out, wait, cancel)
    }

    pub fn write(&self, data: &[u8], wait: Wait) -> Result<usize> {
        self.write_sink.write(data, wait)
    }

    pub fn write_interruptible(
        &self,
        data: &[u8],
        wait: Wait,
        cancel: &CancelToken,
    ) -> Result<usize> {
        self.write_sink.write_interruptible(data, wait, cancel)
    }

    /// Bytes waiting to be read by this endpoint.
    pub fn readable_bytes(&self) -> usize {
        self.read_source.used_space()
    }

    /// Bytes this endpoint can write without blocking.
    pub fn writable_bytes(&self) -> usize {
        self.write_sink.free_space()
    }
}
