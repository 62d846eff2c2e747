//! ST7789 driver context.
//!
//! [`St7789`] owns the transport, the optional reset pin, the panel
//! configuration and the transfer buffer. Every operation takes `&mut self`,
//! so one display is driven from one place at a time; share it behind a
//! mutex if several contexts need it.
//!
//! Drawing operations live in `raster` and `font`; this module holds the
//! lifecycle (init / rotation / deinit) and the controller-level toggles.

use core::fmt;

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::buffer::TransferBuffer;
use crate::bus::Bus;
use crate::calibration::{self, DisplayConfig, PanelType};
use crate::command::*;
use crate::transport::Transport;

/// Driver error.
///
/// Geometry is never an error: off-screen or degenerate shapes are clipped or
/// skipped silently.
#[derive(Debug)]
pub enum Error<BusE, PinE> {
    /// The transfer buffer could not be allocated. Re-run `init`.
    Allocation,
    /// A bulk operation ran without a transfer buffer (before `init`, after
    /// `deinit`, or after a failed allocation).
    NoBuffer,
    Bus(BusE),
    Pin(PinE),
}

impl<BusE: fmt::Debug, PinE: fmt::Debug> From<BusE> for Error<BusE, PinE> {
    fn from(e: BusE) -> Self { Self::Bus(e) }
}

/// Error type of a driver over transport `T` with reset pin `RST`.
pub type DriverError<T, RST> = Error<<T as Transport>::Error, <RST as ErrorType>::Error>;

/// Stand-in reset pin for boards with RST tied high.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoResetPin;

impl ErrorType for NoResetPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for NoResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
    fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
}

pub struct St7789<T, RST> {
    pub(crate) bus: Bus<T>,
    rst: Option<RST>,
    pub(crate) config: DisplayConfig,
    pub(crate) buffer: TransferBuffer,
}

impl<T, RST> St7789<T, RST>
where
    T: Transport,
    RST: OutputPin,
{
    /// Wraps the transport. Nothing is sent until [`St7789::init`].
    pub fn new(transport: T, rst: Option<RST>) -> Self {
        Self {
            bus: Bus::new(transport),
            rst,
            config: DisplayConfig::default(),
            buffer: TransferBuffer::new(),
        }
    }

    /// Configure for `panel` at `rotation`, allocate the transfer buffer,
    /// reset the controller and run the power-on sequence. Ends with a black
    /// screen.
    ///
    /// * `buffer_size_hint` - transfer buffer size in bytes, 0 for the
    ///   full five scan lines; other values are clamped.
    ///
    /// Safe to call again to re-initialize: the old buffer is dropped before
    /// the new one is allocated. If allocation fails the configuration is
    /// already applied but the display is unusable until `init` succeeds.
    pub fn init(
        &mut self,
        panel: PanelType,
        rotation: u8,
        buffer_size_hint: u16,
        delay: &mut impl DelayNs,
    ) -> Result<(), DriverError<T, RST>> {
        self.config.apply(panel, rotation);
        log::debug!(
            "st7789 init: {:?} rotation {} -> {}x{} shift ({}, {})",
            panel,
            rotation,
            self.config.width(),
            self.config.height(),
            self.config.x_shift(),
            self.config.y_shift(),
        );

        let bytes = self
            .buffer
            .allocate(buffer_size_hint, self.config.width())
            .map_err(|_| {
                log::warn!("st7789: transfer buffer allocation failed");
                Error::Allocation
            })?;
        log::debug!("st7789: transfer buffer {} bytes", bytes);

        // Hard reset
        delay.delay_ms(10);
        if let Some(r) = self.rst.as_mut() {
            r.set_low().map_err(Error::Pin)?;
            delay.delay_ms(10);
            r.set_high().map_err(Error::Pin)?;
        }
        delay.delay_ms(20);

        self.bracket(|this| {
            let bus = &mut this.bus;
            bus.command_with(COLMOD, &[COLOR_MODE_16BIT])?;
            bus.command_with(PORCTRL, &PORCH)?;
            bus.command_with(MADCTL, &[calibration::madctl(this.config.rotation())])?;

            // Internal voltage generator
            bus.command_with(GCTRL, &[GATE])?;
            bus.command_with(VCOMS, &[VCOM])?;
            bus.command_with(LCMCTRL, &[LCM])?;
            bus.command_with(VDVVRHEN, &[VDV_VRH_ENABLE])?;
            bus.command_with(VRHS, &[VRH])?;
            bus.command_with(VDVS, &[VDV])?;
            bus.command_with(FRCTRL2, &[FRAME_RATE_60HZ])?;
            bus.command_with(PWCTRL1, &POWER_1)?;

            bus.command_with(PVGAMCTRL, &GAMMA_POSITIVE)?;
            bus.command_with(NVGAMCTRL, &GAMMA_NEGATIVE)?;

            bus.command(INVON)?;
            bus.command(SLPOUT)?;
            bus.command(NORON)?;
            bus.command(DISPON)?;
            Ok(())
        })?;

        delay.delay_ms(50);
        self.fill_screen(Rgb565::BLACK)
    }

    /// Drop the transfer buffer. Drawing fails with [`Error::NoBuffer`]
    /// until the next `init`.
    pub fn deinit(&mut self) {
        self.buffer.release();
        log::debug!("st7789: deinit");
    }

    /// Give back the transport and reset pin.
    pub fn release(self) -> (T, Option<RST>) {
        (self.bus.into_inner(), self.rst)
    }

    /// Switch rotation. Geometry follows the calibration table; the transfer
    /// buffer is kept as is.
    pub fn set_rotation(&mut self, rotation: u8) -> Result<(), DriverError<T, RST>> {
        self.config.apply(self.config.panel(), rotation);
        log::debug!(
            "st7789 rotation {} -> {}x{}",
            rotation,
            self.config.width(),
            self.config.height()
        );
        self.bracket(|this| {
            this.bus.command_with(MADCTL, &[calibration::madctl(rotation)])?;
            Ok(())
        })
    }

    #[inline]
    pub fn width(&self) -> u16 { self.config.width() }

    #[inline]
    pub fn height(&self) -> u16 { self.config.height() }

    #[inline]
    pub fn rotation(&self) -> u8 { self.config.rotation() }

    #[inline]
    pub fn panel(&self) -> PanelType { self.config.panel() }

    #[inline]
    pub fn x_shift(&self) -> u16 { self.config.x_shift() }

    #[inline]
    pub fn y_shift(&self) -> u16 { self.config.y_shift() }

    pub fn config(&self) -> &DisplayConfig { &self.config }

    /// Transfer buffer size in bytes; 0 when none is allocated.
    pub fn buffer_size(&self) -> usize { self.buffer.len_bytes() }

    /// Payloads of at least `bytes` go through the transport's async path,
    /// if it has one.
    pub fn set_async_threshold(&mut self, bytes: usize) {
        self.bus.set_async_threshold(bytes);
    }

    pub fn transport(&self) -> &T { self.bus.transport() }

    pub fn transport_mut(&mut self) -> &mut T { self.bus.transport_mut() }

    /// Display inversion on/off.
    pub fn invert_colors(&mut self, invert: bool) -> Result<(), DriverError<T, RST>> {
        self.single_command(if invert { INVON } else { INVOFF })
    }

    /// Tearing-effect output line on/off.
    pub fn tear_effect(&mut self, enable: bool) -> Result<(), DriverError<T, RST>> {
        self.single_command(if enable { TEON } else { TEOFF })
    }

    /// Blank or unblank the panel without touching GRAM.
    pub fn set_display_on(&mut self, on: bool) -> Result<(), DriverError<T, RST>> {
        self.single_command(if on { DISPON } else { DISPOFF })
    }

    /// Enter or leave sleep mode, waiting out the 120 ms the controller needs
    /// before it accepts the opposite command.
    pub fn set_sleep(&mut self, sleep: bool, delay: &mut impl DelayNs) -> Result<(), DriverError<T, RST>> {
        self.single_command(if sleep { SLPIN } else { SLPOUT })?;
        delay.delay_ms(120);
        Ok(())
    }

    // ---- Low-level helpers ----

    fn single_command(&mut self, cmd: u8) -> Result<(), DriverError<T, RST>> {
        self.bracket(|this| {
            this.bus.command(cmd)?;
            Ok(())
        })
    }

    /// Runs `f` with the device selected and always deselects afterwards.
    pub(crate) fn bracket<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, DriverError<T, RST>>,
    ) -> Result<R, DriverError<T, RST>> {
        self.bus.select()?;
        let result = f(self);
        let released = self.bus.deselect();
        let value = result?;
        released?;
        Ok(value)
    }

    pub(crate) fn require_buffer(&self) -> Result<(), DriverError<T, RST>> {
        if self.buffer.is_allocated() {
            Ok(())
        } else {
            Err(Error::NoBuffer)
        }
    }

    /// Streams `pixels` copies of `color` into the open window: as many full
    /// buffers as fit, then one remainder sized exactly.
    pub(crate) fn stream_color(&mut self, pixels: usize, color: Rgb565) -> Result<(), DriverError<T, RST>> {
        self.require_buffer()?;
        let total = pixels * 2;
        let chunk = self.buffer.len_bytes();
        let (full, remainder) = (total / chunk, total % chunk);

        let bytes = self.buffer.fill(color);
        for _ in 0..full {
            self.bus.data(bytes)?;
        }
        if remainder > 0 {
            self.bus.data(&bytes[..remainder])?;
        }
        Ok(())
    }
}
