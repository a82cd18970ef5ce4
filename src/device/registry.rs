//! Pipe Registry: kumpulan channel + endpoint yang di-cross-wire
//!
//! Endpoint `i` membaca channel `i % channels` dan menulis channel
//! `(i + 1) % channels`, sehingga write endpoint `i` terlihat oleh read
//! endpoint `i + 1`. Registry juga memegang bookkeeping open/close:
//! maksimal satu writer dan `max_readers` reader per endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::Endpoint;
use crate::channel::{CancelToken, SynchronizedChannel, Wait};
use crate::config::PipeConfig;
use crate::error::{PipeError, Result};

/// Access mode requested when opening an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    #[inline]
    pub fn reads(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    #[inline]
    pub fn writes(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

#[derive(Debug, Default)]
struct OpenCounts {
    readers: usize,
    writers: usize,
}

#[derive(Debug)]
struct EndpointSlot {
    endpoint: Endpoint,
    counts: Mutex<OpenCounts>,
}

/// Fixed set of channels and endpoints, built once and torn down once.
pub struct PipeRegistry {
    channels: Vec<SynchronizedChannel>,
    slots: Vec<Arc<EndpointSlot>>,
    max_readers: AtomicUsize,
}

impl PipeRegistry {
    /// Allocate every channel and wire the endpoints.
    ///
    /// Gagal alokasi di sini fatal untuk registry: tidak ada registry parsial.
    pub fn new(config: PipeConfig) -> Result<Self> {
        config.validate()?;

        let channel_config = config.channel_config();
        let channels = (0..config.channels)
            .map(|id| SynchronizedChannel::with_id(id, channel_config))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                log::error!("pipe registry: channel allocation failed: {}", e);
                e
            })?;

        let slots = (0..config.endpoints)
            .map(|i| {
                let read_source = channels[i % channels.len()].clone();
                let write_sink = channels[(i + 1) % channels.len()].clone();
                log::debug!(
                    "endpoint {}: reads channel {}, writes channel {}",
                    i,
                    read_source.id(),
                    write_sink.id()
                );
                Arc::new(EndpointSlot {
                    endpoint: Endpoint::new(i, read_source, write_sink),
                    counts: Mutex::new(OpenCounts::default()),
                })
            })
            .collect();

        log::info!(
            "pipe registry ready: {} endpoints, {} channels x {} bytes",
            config.endpoints,
            config.channels,
            config.buffer_capacity
        );

        Ok(Self {
            channels,
            slots,
            max_readers: AtomicUsize::new(config.max_readers),
        })
    }

    pub fn endpoint_count(&self) -> usize {
        self.slots.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn endpoint(&self, index: usize) -> Result<&Endpoint> {
        self.slots
            .get(index)
            .map(|slot| &slot.endpoint)
            .ok_or(PipeError::NoSuchEndpoint(index))
    }

    pub fn channel(&self, index: usize) -> Result<&SynchronizedChannel> {
        self.channels
            .get(index)
            .ok_or(PipeError::NoSuchChannel(index))
    }

    pub fn channels(&self) -> &[SynchronizedChannel] {
        &self.channels
    }

    pub fn max_readers(&self) -> usize {
        self.max_readers.load(Ordering::Acquire)
    }

    /// Change the per-endpoint reader limit. Readers already open stay open.
    pub fn set_max_readers(&self, limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(PipeError::InvalidLimit(limit));
        }
        let old = self.max_readers.swap(limit, Ordering::AcqRel);
        log::info!("pipe registry: max readers {} -> {}", old, limit);
        Ok(())
    }

    /// Attach to endpoint `index`.
    ///
    /// Kedua limit dicek sebelum counter dinaikkan, jadi open yang gagal
    /// tidak meninggalkan counter setengah jalan.
    pub fn open(&self, index: usize, access: Access) -> Result<EndpointHandle> {
        let slot = self
            .slots
            .get(index)
            .ok_or(PipeError::NoSuchEndpoint(index))?;
        let limit = self.max_readers();

        let mut counts = slot.counts.lock();
        if access.reads() && counts.readers >= limit {
            log::warn!("endpoint {}: too many readers (limit {})", index, limit);
            return Err(PipeError::TooManyReaders { limit });
        }
        if access.writes() && counts.writers >= 1 {
            log::warn!("endpoint {}: only one writer allowed", index);
            return Err(PipeError::WriterBusy);
        }

        if access.reads() {
            counts.readers += 1;
            slot.endpoint.read_source().attach_reader();
        }
        if access.writes() {
            counts.writers += 1;
            slot.endpoint.write_sink().attach_writer();
        }
        log::debug!(
            "endpoint {}: opened {:?} (readers {}, writers {})",
            index,
            access,
            counts.readers,
            counts.writers
        );
        drop(counts);

        Ok(EndpointHandle {
            slot: Arc::clone(slot),
            access,
        })
    }

    /// Readers and writers currently attached to endpoint `index`.
    pub fn open_counts(&self, index: usize) -> Result<(usize, usize)> {
        let slot = self
            .slots
            .get(index)
            .ok_or(PipeError::NoSuchEndpoint(index))?;
        let counts = slot.counts.lock();
        Ok((counts.readers, counts.writers))
    }

    /// Tear down every channel. Handles still open keep their storage alive
    /// until they are dropped.
    pub fn shutdown(mut self) {
        for channel in std::mem::take(&mut self.channels) {
            channel.destroy();
        }
    }
}

impl Drop for PipeRegistry {
    fn drop(&mut self) {
        log::info!("pipe registry unloaded");
    }
}

impl std::fmt::Debug for PipeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeRegistry")
            .field("endpoints", &self.slots.len())
            .field("channels", &self.channels.len())
            .field("max_readers", &self.max_readers())
            .finish()
    }
}

/// An open attachment to one endpoint. Closing happens on drop.
#[derive(Debug)]
pub struct EndpointHandle {
    slot: Arc<EndpointSlot>,
    access: Access,
}

impl EndpointHandle {
    pub fn access(&self) -> Access {
        self.access
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.slot.endpoint
    }

    pub fn read(&self, out: &mut [u8], wait: Wait) -> Result<usize> {
        self.check_readable()?;
        self.slot.endpoint.read(out, wait)
    }

    pub fn read_interruptible(
        &self,
        out: &mut [u8],
        wait: Wait,
        cancel: &CancelToken,
    ) -> Result<usize> {
        self.check_readable()?;
        self.slot.endpoint.read_interruptible(out, wait, cancel)
    }

    pub fn write(&self, data: &[u8], wait: Wait) -> Result<usize> {
        self.check_writable()?;
        self.slot.endpoint.write(data, wait)
    }

    pub fn write_interruptible(
        &self,
        data: &[u8],
        wait: Wait,
        cancel: &CancelToken,
    ) -> Result<usize> {
        self.check_writable()?;
        self.slot.endpoint.write_interruptible(data, wait, cancel)
    }

    fn check_readable(&self) -> Result<()> {
        if self.access.reads() {
            Ok(())
        } else {
            Err(PipeError::NotReadable)
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.access.writes() {
            Ok(())
        } else {
            Err(PipeError::NotWritable)
        }
    }
}

impl Drop for EndpointHandle {
    fn drop(&mut self) {
        let endpoint = &self.slot.endpoint;
        let mut counts = self.slot.counts.lock();
        if self.access.reads() && counts.readers > 0 {
            counts.readers -= 1;
            endpoint.read_source().detach_reader();
        }
        if self.access.writes() && counts.writers > 0 {
            counts.writers -= 1;
            endpoint.write_sink().detach_writer();
        }
        log::debug!("endpoint {}: closed {:?}", endpoint.index(), self.access);
    }
}
