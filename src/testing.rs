//! Test doubles: a recording transport and a controller model that replays
//! the recorded traffic into a pixel map.

use alloc::collections::BTreeMap;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::cell::Cell;
use std::alloc::{GlobalAlloc, Layout, System};

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::calibration::PanelType;
use crate::command::{CASET, RAMWR, RASET};
use crate::driver::{NoResetPin, St7789};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Select,
    Deselect,
    CommandMode,
    DataMode,
    Write(Vec<u8>),
    WriteAsync(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub events: Vec<Event>,
    pub async_writes: usize,
    pub polls: usize,
    // Some(n): async capable, each transfer reports busy n times.
    busy_polls: Option<usize>,
    pending: usize,
    // Fail every write once this many writes have succeeded.
    fail_after: Option<usize>,
    writes: usize,
}

impl RecordingTransport {
    pub fn new() -> Self { Self::default() }

    pub fn with_async(busy_polls: usize) -> Self {
        Self { busy_polls: Some(busy_polls), ..Self::default() }
    }

    pub fn failing_after(writes: usize) -> Self {
        Self { fail_after: Some(writes), ..Self::default() }
    }

    pub fn clear(&mut self) { self.events.clear(); }

    /// Number of select/deselect brackets opened.
    pub fn bus_transactions(&self) -> usize {
        self.events.iter().filter(|e| matches!(e, Event::Select)).count()
    }

    fn count_write(&mut self) -> Result<(), BusFault> {
        if self.fail_after.is_some_and(|n| self.writes >= n) {
            return Err(BusFault);
        }
        self.writes += 1;
        Ok(())
    }
}

impl Transport for RecordingTransport {
    type Error = BusFault;

    fn select(&mut self) -> Result<(), BusFault> {
        self.events.push(Event::Select);
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), BusFault> {
        self.events.push(Event::Deselect);
        Ok(())
    }

    fn command_mode(&mut self) -> Result<(), BusFault> {
        self.events.push(Event::CommandMode);
        Ok(())
    }

    fn data_mode(&mut self) -> Result<(), BusFault> {
        self.events.push(Event::DataMode);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), BusFault> {
        self.count_write()?;
        self.events.push(Event::Write(bytes.to_vec()));
        Ok(())
    }

    fn supports_async(&self) -> bool { self.busy_polls.is_some() }

    fn write_async(&mut self, bytes: &[u8]) -> Result<(), BusFault> {
        self.count_write()?;
        self.async_writes += 1;
        self.pending = self.busy_polls.unwrap_or(0);
        self.events.push(Event::WriteAsync(bytes.to_vec()));
        Ok(())
    }

    fn poll_complete(&mut self) -> Result<bool, BusFault> {
        self.polls += 1;
        if self.pending > 0 {
            self.pending -= 1;
            Ok(false)
        } else {
            Ok(true)
        }
    }
}

/// System allocator that keeps per-thread totals of live and peak heap bytes.
pub struct CountingAlloc;

#[global_allocator]
static HEAP: CountingAlloc = CountingAlloc;

thread_local! {
    static LIVE: Cell<usize> = const { Cell::new(0) };
    static PEAK: Cell<usize> = const { Cell::new(0) };
}

fn track(grow: usize, shrink: usize) {
    LIVE.try_with(|live| {
        let now = live.get().saturating_sub(shrink) + grow;
        live.set(now);
        PEAK.try_with(|peak| peak.set(peak.get().max(now))).ok();
    })
    .ok();
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            track(layout.size(), 0);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        track(0, layout.size());
    }
}

/// Restarts peak tracking on this thread; returns the bytes live right now.
pub fn reset_heap_peak() -> usize {
    let live = LIVE.with(Cell::get);
    PEAK.with(|peak| peak.set(live));
    live
}

/// Most bytes live on this thread since the last [`reset_heap_peak`].
pub fn heap_peak() -> usize {
    PEAK.with(Cell::get)
}

/// Delay that only adds up what was asked for.
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

/// Output pin that remembers every level it was driven to.
#[derive(Debug, Default)]
pub struct RecordingPin {
    pub levels: Vec<bool>,
}

impl ErrorType for RecordingPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

pub type TestDisplay = St7789<RecordingTransport, NoResetPin>;

/// Initialized display with the init traffic already discarded.
pub fn display(panel: PanelType, rotation: u8) -> TestDisplay {
    display_with_buffer(panel, rotation, 0)
}

pub fn display_with_buffer(panel: PanelType, rotation: u8, hint: u16) -> TestDisplay {
    let mut d: TestDisplay = St7789::new(RecordingTransport::new(), None);
    d.init(panel, rotation, hint, &mut CountingDelay::default()).unwrap();
    d.transport_mut().clear();
    d
}

/// Controller model: replays CASET/RASET/RAMWR traffic into visible pixels.
#[derive(Debug, Default)]
pub struct Panel {
    pixels: BTreeMap<(i32, i32), u16>,
    pub ramwr_bytes: usize,
    pub pixel_writes: usize,
    /// Opcodes seen, in order.
    pub commands: Vec<u8>,
    /// Bytes written while CS was high.
    pub stray_bytes: usize,
}

impl Panel {
    pub fn replay(events: &[Event], x_shift: u16, y_shift: u16) -> Self {
        let mut panel = Panel::default();
        let mut selected = false;
        let mut data_mode = false;
        let mut cmd = None;
        let mut params: Vec<u8> = Vec::new();
        let (mut x0, mut x1, mut y0, mut y1) = (0u16, 0u16, 0u16, 0u16);
        let (mut cx, mut cy) = (0u16, 0u16);
        let mut half: Option<u8> = None;

        for event in events {
            let bytes = match event {
                Event::Select => { selected = true; continue; }
                Event::Deselect => { selected = false; continue; }
                Event::CommandMode => { data_mode = false; continue; }
                Event::DataMode => { data_mode = true; continue; }
                Event::Write(b) | Event::WriteAsync(b) => b,
            };
            if !selected {
                panel.stray_bytes += bytes.len();
            }
            if !data_mode {
                for &b in bytes {
                    cmd = Some(b);
                    params.clear();
                    panel.commands.push(b);
                    if b == RAMWR {
                        cx = x0;
                        cy = y0;
                        half = None;
                    }
                }
                continue;
            }
            match cmd {
                Some(CASET) | Some(RASET) => {
                    params.extend_from_slice(bytes);
                    if params.len() >= 4 {
                        let s = u16::from_be_bytes([params[0], params[1]]);
                        let e = u16::from_be_bytes([params[2], params[3]]);
                        if cmd == Some(CASET) { x0 = s; x1 = e; } else { y0 = s; y1 = e; }
                    }
                }
                Some(RAMWR) => {
                    panel.ramwr_bytes += bytes.len();
                    for &b in bytes {
                        let Some(hi) = half.take() else {
                            half = Some(b);
                            continue;
                        };
                        let key = (cx as i32 - x_shift as i32, cy as i32 - y_shift as i32);
                        panel.pixels.insert(key, u16::from_be_bytes([hi, b]));
                        panel.pixel_writes += 1;
                        if cx >= x1 {
                            cx = x0;
                            cy = cy.wrapping_add(1);
                        } else {
                            cx += 1;
                        }
                    }
                }
                _ => params.extend_from_slice(bytes),
            }
        }
        panel
    }

    /// Replays everything a display's transport has recorded so far.
    pub fn of(display: &TestDisplay) -> Self {
        Self::replay(
            &display.transport().events,
            display.x_shift(),
            display.y_shift(),
        )
    }

    pub fn color_at(&self, x: i32, y: i32) -> Option<Rgb565> {
        self.pixels.get(&(x, y)).map(|&v| Rgb565::from(RawU16::new(v)))
    }

    pub fn drawn(&self) -> BTreeSet<(i32, i32)> {
        self.pixels.keys().copied().collect()
    }

    pub fn is_drawn(&self, x: i32, y: i32) -> bool {
        self.pixels.contains_key(&(x, y))
    }
}
