//! Bus transport: the chip-select, data/command line and SPI writes.
//
// The driver only ever talks to the controller through `Transport`, so a
// board can plug in its own DMA path and tests can record traffic.

use core::fmt;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// Byte-level access to the controller.
///
/// `select`/`deselect` bracket a compound operation; `command_mode` and
/// `data_mode` drive the D/C line. `write` must not return before the bytes
/// have been handed to the peripheral.
pub trait Transport {
    type Error: fmt::Debug;

    fn select(&mut self) -> Result<(), Self::Error>;
    fn deselect(&mut self) -> Result<(), Self::Error>;
    fn command_mode(&mut self) -> Result<(), Self::Error>;
    fn data_mode(&mut self) -> Result<(), Self::Error>;
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// True if `write_async` starts a transfer that completes in the
    /// background (DMA). Only then does the bus poll for completion.
    fn supports_async(&self) -> bool { false }

    /// Starts a transfer. `bytes` stays borrowed until `poll_complete`
    /// reports true.
    fn write_async(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.write(bytes)
    }

    /// True once the last `write_async` transfer has finished.
    fn poll_complete(&mut self) -> Result<bool, Self::Error> { Ok(true) }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn select(&mut self) -> Result<(), Self::Error> { (**self).select() }
    fn deselect(&mut self) -> Result<(), Self::Error> { (**self).deselect() }
    fn command_mode(&mut self) -> Result<(), Self::Error> { (**self).command_mode() }
    fn data_mode(&mut self) -> Result<(), Self::Error> { (**self).data_mode() }
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> { (**self).write(bytes) }
    fn supports_async(&self) -> bool { (**self).supports_async() }
    fn write_async(&mut self, bytes: &[u8]) -> Result<(), Self::Error> { (**self).write_async(bytes) }
    fn poll_complete(&mut self) -> Result<bool, Self::Error> { (**self).poll_complete() }
}

/// Error type that wraps SPI and GPIO errors.
#[derive(Debug)]
pub enum SpiTransportError<SpiE, PinE> {
    Spi(SpiE),
    Pin(PinE),
}

/// [`Transport`] over an embedded-hal 1.0 `SpiBus` with manual CS and D/C.
///
/// The bus is owned outright (no `SpiDevice`): CS has to stay low across a
/// whole window + payload sequence, which `SpiDevice` transactions can't span.
pub struct SpiTransport<SPI, CS, DC> {
    spi: SPI,
    cs: CS,
    dc: DC,
}

impl<SPI, CS, DC> SpiTransport<SPI, CS, DC>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    DC: OutputPin<Error = CS::Error>,
{
    pub fn new(spi: SPI, cs: CS, dc: DC) -> Self {
        Self { spi, cs, dc }
    }

    /// Give the bus and pins back.
    pub fn release(self) -> (SPI, CS, DC) {
        (self.spi, self.cs, self.dc)
    }
}

impl<SPI, CS, DC> Transport for SpiTransport<SPI, CS, DC>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    DC: OutputPin<Error = CS::Error>,
{
    type Error = SpiTransportError<SPI::Error, CS::Error>;

    fn select(&mut self) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(SpiTransportError::Pin)
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        // SpiBus::write may return while bytes are still shifting out.
        self.spi.flush().map_err(SpiTransportError::Spi)?;
        self.cs.set_high().map_err(SpiTransportError::Pin)
    }

    fn command_mode(&mut self) -> Result<(), Self::Error> {
        self.spi.flush().map_err(SpiTransportError::Spi)?;
        self.dc.set_low().map_err(SpiTransportError::Pin)
    }

    fn data_mode(&mut self) -> Result<(), Self::Error> {
        self.spi.flush().map_err(SpiTransportError::Spi)?;
        self.dc.set_high().map_err(SpiTransportError::Pin)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(bytes).map_err(SpiTransportError::Spi)
    }
}
