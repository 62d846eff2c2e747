//! Addressing-window protocol: CASET / RASET / RAMWR.

use crate::bus::Bus;
use crate::calibration::DisplayConfig;
use crate::command::{CASET, RAMWR, RASET};
use crate::transport::Transport;

/// Inclusive rectangle in visible panel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    pub const fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Same rectangle in controller memory coordinates.
    pub fn shifted(self, config: &DisplayConfig) -> Self {
        Self {
            x0: self.x0.wrapping_add(config.x_shift()),
            y0: self.y0.wrapping_add(config.y_shift()),
            x1: self.x1.wrapping_add(config.x_shift()),
            y1: self.y1.wrapping_add(config.y_shift()),
        }
    }

    /// CASET parameters: start and end column, big-endian.
    pub fn column_params(&self) -> [u8; 4] {
        let [s0, s1] = self.x0.to_be_bytes();
        let [e0, e1] = self.x1.to_be_bytes();
        [s0, s1, e0, e1]
    }

    /// RASET parameters: start and end row, big-endian.
    pub fn row_params(&self) -> [u8; 4] {
        let [s0, s1] = self.y0.to_be_bytes();
        let [e0, e1] = self.y1.to_be_bytes();
        [s0, s1, e0, e1]
    }

    pub fn width(&self) -> usize { (self.x1 - self.x0) as usize + 1 }

    pub fn height(&self) -> usize { (self.y1 - self.y0) as usize + 1 }

    pub fn pixel_count(&self) -> usize { self.width() * self.height() }
}

impl<T: Transport> Bus<T> {
    /// Programs the window (shifted by the panel calibration) and issues
    /// RAMWR. The controller then takes a row-major pixel stream.
    ///
    /// The caller holds the bus selected.
    pub fn open_window(&mut self, window: Window, config: &DisplayConfig) -> Result<(), T::Error> {
        let ram = window.shifted(config);
        log::trace!("window {:?} -> ram {:?}", window, ram);

        self.command_with(CASET, &ram.column_params())?;
        self.command_with(RASET, &ram.row_params())?;
        self.command(RAMWR)
    }
}
