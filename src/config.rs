//! Konfigurasi channel dan registry
//!
//! Default mengikuti konstanta device asli: 2 endpoint, 2 buffer,
//! 4000 byte per buffer, maksimal 5 reader per endpoint.

use crate::error::{PipeError, Result};

/// Default allocation size per channel, sentinel byte included.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4000;
/// Default endpoint count.
pub const DEFAULT_ENDPOINTS: usize = 2;
/// Default channel count.
pub const DEFAULT_CHANNELS: usize = 2;
/// Default concurrent reader limit per endpoint.
pub const DEFAULT_MAX_READERS: usize = 5;

/// How a blocking write treats payloads that do not fit right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Tunggu sampai seluruh payload muat, lalu tulis sekaligus.
    /// Payload lebih besar dari usable capacity ditolak (`SizeExceeded`).
    #[default]
    Whole,
    /// Tunggu hanya selama buffer penuh, tulis sebanyak yang muat.
    Partial,
}

/// Per-channel settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    pub capacity: usize,
    pub write_policy: WritePolicy,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            write_policy: WritePolicy::Whole,
        }
    }
}

impl ChannelConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }
}

/// Registry settings: berapa endpoint, berapa channel, ukuran buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeConfig {
    pub endpoints: usize,
    pub channels: usize,
    pub buffer_capacity: usize,
    pub max_readers: usize,
    pub write_policy: WritePolicy,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS,
            channels: DEFAULT_CHANNELS,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_readers: DEFAULT_MAX_READERS,
            write_policy: WritePolicy::Whole,
        }
    }
}

impl PipeConfig {
    pub fn with_endpoints(mut self, endpoints: usize) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_max_readers(mut self, max_readers: usize) -> Self {
        self.max_readers = max_readers;
        self
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Config yang dipakai untuk setiap channel di registry.
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            capacity: self.buffer_capacity,
            write_policy: self.write_policy,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity < 2 {
            return Err(PipeError::InvalidCapacity(self.buffer_capacity));
        }
        if self.endpoints == 0 {
            return Err(PipeError::InvalidConfig("at least one endpoint required"));
        }
        if self.channels == 0 {
            return Err(PipeError::InvalidConfig("at least one channel required"));
        }
        // Endpoint i menulis channel i+1: siklus hanya tertutup jika jumlahnya sama
        if self.channels != self.endpoints {
            return Err(PipeError::InvalidConfig(
                "channel count must equal endpoint count",
            ));
        }
        if self.max_readers == 0 {
            return Err(PipeError::InvalidLimit(0));
        }
        Ok(())
    }
}
