//! Anonymous-mmap backed byte storage
//!
//! Storage untuk ring buffer di-mmap langsung (anonymous, tanpa file):
//! - Fallible allocation: gagal map = `OutOfMemory`, bukan abort
//! - Zero-initialized oleh kernel
//! - Page-aligned, contiguous
//! - Dilepas otomatis saat drop

use memmap2::{MmapMut, MmapOptions};

use crate::error::{PipeError, Result};

/// Owned contiguous byte allocation.
pub struct Storage {
    map: MmapMut,
}

impl Storage {
    /// Map `len` bytes of zeroed anonymous memory.
    pub fn allocate(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(PipeError::InvalidCapacity(len));
        }

        let map = MmapOptions::new().len(len).map_anon().map_err(|e| {
            log::warn!("anonymous map of {} bytes failed: {}", len, e);
            PipeError::OutOfMemory { requested: len }
        })?;

        Ok(Self { map })
    }

    /// Ukuran alokasi dalam bytes
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.map
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").field("len", &self.len()).finish()
    }
}
