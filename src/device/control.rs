//! Control surface (ioctl-style) untuk registry
//!
//! Nomor command mengikuti device asli:
//! - 0: ukuran buffer
//! - 1: resize semua buffer
//! - 2: baca limit reader
//! - 3: set limit reader
//!
//! Ditambah dua query per-channel (free/used space).

use super::PipeRegistry;
use crate::channel::SynchronizedChannel;
use crate::error::Result;

pub const CMD_BUFFER_SIZE: u32 = 0;
pub const CMD_SET_BUFFER_SIZE: u32 = 1;
pub const CMD_MAX_READERS: u32 = 2;
pub const CMD_SET_MAX_READERS: u32 = 3;
pub const CMD_FREE_SPACE: u32 = 4;
pub const CMD_USED_SPACE: u32 = 5;

/// One control request against a [`PipeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Capacity of the channels (they are always resized together).
    BufferSize,
    /// Resize every channel to the given capacity.
    SetBufferSize(usize),
    MaxReaders,
    SetMaxReaders(usize),
    /// Free bytes of channel `n`.
    FreeSpace(usize),
    /// Buffered bytes of channel `n`.
    UsedSpace(usize),
}

impl Control {
    /// Decode a raw `(cmd, arg)` pair. Unknown commands return `None`.
    pub fn from_raw(cmd: u32, arg: usize) -> Option<Self> {
        match cmd {
            CMD_BUFFER_SIZE => Some(Self::BufferSize),
            CMD_SET_BUFFER_SIZE => Some(Self::SetBufferSize(arg)),
            CMD_MAX_READERS => Some(Self::MaxReaders),
            CMD_SET_MAX_READERS => Some(Self::SetMaxReaders(arg)),
            CMD_FREE_SPACE => Some(Self::FreeSpace(arg)),
            CMD_USED_SPACE => Some(Self::UsedSpace(arg)),
            _ => None,
        }
    }
}

impl PipeRegistry {
    /// Execute a control request. Setters return the value now in effect.
    pub fn control(&self, request: Control) -> Result<usize> {
        match request {
            Control::BufferSize => Ok(self.channel(0)?.capacity()),
            Control::SetBufferSize(capacity) => {
                self.resize_all(capacity)?;
                Ok(capacity)
            }
            Control::MaxReaders => Ok(self.max_readers()),
            Control::SetMaxReaders(limit) => {
                self.set_max_readers(limit)?;
                Ok(limit)
            }
            Control::FreeSpace(index) => Ok(self.channel(index)?.free_space()),
            Control::UsedSpace(index) => Ok(self.channel(index)?.used_space()),
        }
    }

    /// Resize every channel to `capacity`.
    ///
    /// Semua channel di-lock bersamaan: jika satu saja menyimpan
    /// `>= capacity` byte, tidak ada yang di-resize, dan `BufferSize`
    /// selalu sama untuk semua channel.
    pub fn resize_all(&self, capacity: usize) -> Result<()> {
        SynchronizedChannel::resize_group(self.channels(), capacity)
    }
}
