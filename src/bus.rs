//! Command/data framing and chunked payload writes on top of a [`Transport`].

use crate::transport::Transport;

/// Largest single transfer handed to the transport.
pub const MAX_TRANSFER: usize = 65_535;
/// Default payload size at and above which async transfers are used.
pub const DEFAULT_ASYNC_THRESHOLD: usize = 16;

pub struct Bus<T> {
    transport: T,
    async_threshold: usize,
}

impl<T: Transport> Bus<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, async_threshold: DEFAULT_ASYNC_THRESHOLD }
    }

    pub fn set_async_threshold(&mut self, bytes: usize) {
        self.async_threshold = bytes;
    }

    pub fn transport(&self) -> &T { &self.transport }

    pub fn transport_mut(&mut self) -> &mut T { &mut self.transport }

    pub fn into_inner(self) -> T { self.transport }

    #[inline]
    pub fn select(&mut self) -> Result<(), T::Error> { self.transport.select() }

    #[inline]
    pub fn deselect(&mut self) -> Result<(), T::Error> { self.transport.deselect() }

    /// One opcode byte with D/C low.
    pub fn command(&mut self, cmd: u8) -> Result<(), T::Error> {
        self.transport.command_mode()?;
        self.transport.write(&[cmd])
    }

    /// Payload bytes with D/C high, split into transfers of at most
    /// [`MAX_TRANSFER`] bytes.
    pub fn data(&mut self, bytes: &[u8]) -> Result<(), T::Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.transport.data_mode()?;

        let use_async = self.transport.supports_async() && bytes.len() >= self.async_threshold;
        for chunk in bytes.chunks(MAX_TRANSFER) {
            if use_async {
                self.transport.write_async(chunk)?;
                // No scheduler to yield to; spin until the transfer lands.
                while !self.transport.poll_complete()? {
                    core::hint::spin_loop();
                }
            } else {
                self.transport.write(chunk)?;
            }
        }
        Ok(())
    }

    /// Opcode followed by its parameters.
    pub fn command_with(&mut self, cmd: u8, params: &[u8]) -> Result<(), T::Error> {
        self.command(cmd)?;
        self.data(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, RecordingTransport};
    use alloc::vec;

    #[test]
    fn small_payload_is_one_blocking_write() {
        let mut bus = Bus::new(RecordingTransport::new());
        bus.command_with(0x3A, &[0x55]).unwrap();
        assert_eq!(
            bus.transport().events,
            vec![
                Event::CommandMode,
                Event::Write(vec![0x3A]),
                Event::DataMode,
                Event::Write(vec![0x55]),
            ]
        );
    }

    #[test]
    fn large_payload_is_split() {
        let mut bus = Bus::new(RecordingTransport::new());
        let payload = vec![0xA5; MAX_TRANSFER * 2 + 10];
        bus.data(&payload).unwrap();
        let sizes: alloc::vec::Vec<usize> = bus
            .transport()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Write(b) => Some(b.len()),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![MAX_TRANSFER, MAX_TRANSFER, 10]);
    }

    #[test]
    fn async_path_only_above_threshold() {
        let mut bus = Bus::new(RecordingTransport::with_async(3));
        bus.data(&[1, 2, 3]).unwrap();
        bus.data(&[0; 16]).unwrap();

        let t = bus.transport();
        assert_eq!(t.async_writes, 1);
        assert_eq!(t.polls, 4); // three "busy" answers, then done
        assert!(t.events.contains(&Event::Write(vec![1, 2, 3])));
        assert!(t.events.contains(&Event::WriteAsync(vec![0; 16])));
    }

    #[test]
    fn threshold_is_configurable() {
        let mut bus = Bus::new(RecordingTransport::with_async(0));
        bus.set_async_threshold(2);
        bus.data(&[9, 9]).unwrap();
        assert_eq!(bus.transport().async_writes, 1);
    }

    #[test]
    fn empty_payload_writes_nothing() {
        let mut bus = Bus::new(RecordingTransport::new());
        bus.data(&[]).unwrap();
        assert!(bus.transport().events.is_empty());
    }
}
