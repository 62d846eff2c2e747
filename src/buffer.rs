//! Reusable transfer buffer for bulk pixel writes.
//!
//! One heap buffer of RGB565 slots is shared by every fill and blit. Slots hold
//! colors already swapped to wire (big-endian) order, so the buffer can be
//! handed to the bus as bytes without another pass.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::IntoStorage;

/// Scan lines covered by a full-size buffer.
pub const SCAN_LINES: usize = 5;
/// Smallest buffer accepted for an explicit size hint, in bytes.
pub const MIN_BUFFER_BYTES: usize = 256;

/// The buffer could not be reserved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AllocationError;

/// Converts a color to the value whose in-memory bytes are the wire bytes.
#[inline]
pub fn wire(color: Rgb565) -> u16 {
    color.into_storage().to_be()
}

#[derive(Debug, Default)]
pub struct TransferBuffer {
    slots: Vec<u16>,
    // Wire value replicated over every slot, if any.
    pattern: Option<u16>,
}

impl TransferBuffer {
    pub const fn new() -> Self {
        Self { slots: Vec::new(), pattern: None }
    }

    /// Buffer size in bytes for a size hint on a display `width` pixels wide.
    ///
    /// A zero hint picks the full size (`width` x [`SCAN_LINES`] pixels);
    /// anything else is clamped to `[MIN_BUFFER_BYTES, full size]`.
    pub fn size_for(hint: u16, width: u16) -> usize {
        let max = width as usize * SCAN_LINES * 2;
        let hint = hint as usize;
        if hint == 0 {
            max
        } else if hint < MIN_BUFFER_BYTES {
            MIN_BUFFER_BYTES
        } else if hint > max {
            max
        } else {
            hint
        }
    }

    /// Releases the current buffer, then allocates a new one sized by
    /// [`TransferBuffer::size_for`]. Returns the new size in bytes.
    ///
    /// On failure the old buffer stays released.
    pub fn allocate(&mut self, hint: u16, width: u16) -> Result<usize, AllocationError> {
        let bytes = Self::size_for(hint, width);
        self.allocate_slots(bytes / 2)?;
        Ok(self.len_bytes())
    }

    fn allocate_slots(&mut self, slots: usize) -> Result<(), AllocationError> {
        self.release();

        let mut fresh = Vec::new();
        fresh.try_reserve_exact(slots).map_err(|_| AllocationError)?;
        fresh.resize(slots, 0);
        self.slots = fresh;
        Ok(())
    }

    /// Drops the buffer. Bulk operations fail until the next allocation.
    pub fn release(&mut self) {
        self.slots = Vec::new();
        self.pattern = None;
    }

    #[inline]
    pub fn is_allocated(&self) -> bool { !self.slots.is_empty() }

    /// Capacity in pixels.
    #[inline]
    pub fn len_pixels(&self) -> usize { self.slots.len() }

    /// Capacity in bytes.
    #[inline]
    pub fn len_bytes(&self) -> usize { self.slots.len() * 2 }

    /// Fills every slot with `color` and returns the whole buffer as wire
    /// bytes. The fill is skipped when the buffer already holds that color.
    pub fn fill(&mut self, color: Rgb565) -> &[u8] {
        let value = wire(color);
        if self.pattern != Some(value) {
            self.slots.fill(value);
            self.pattern = Some(value);
        }
        bytemuck::cast_slice(&self.slots)
    }

    /// Mutable slots for staging arbitrary pixels. Store [`wire`] values.
    pub fn stage(&mut self) -> &mut [u16] {
        self.pattern = None;
        &mut self.slots
    }

    /// The first `pixels` slots as wire bytes.
    pub fn bytes(&self, pixels: usize) -> &[u8] {
        let end = pixels.min(self.slots.len());
        bytemuck::cast_slice(&self.slots[..end])
    }
}
