#![cfg_attr(not(test), no_std)]

//! Driver for ST7789 TFT controllers on a 4-wire SPI bus.
//!
//! ```ignore
//! let transport = SpiTransport::new(spi, cs, dc);
//! let mut display = St7789::new(transport, Some(rst));
//! display.init(PanelType::Panel240x240, 0, 0, &mut delay)?;
//! display.fill_rect(10, 10, 50, 20, Rgb565::RED)?;
//! ```

extern crate alloc;

pub mod buffer;
pub mod bus;
pub mod calibration;
pub mod colors;
pub mod command;
pub mod driver;
pub mod font;
pub mod graphics;
pub mod raster;
pub mod transport;
pub mod window;

#[cfg(test)]
mod testing;

pub use calibration::{DisplayConfig, PanelType};
pub use driver::{DriverError, Error, NoResetPin, St7789};
pub use font::{text_bounds, GfxFont, GfxGlyph};
pub use transport::{SpiTransport, SpiTransportError, Transport};
