//! ST7789 demo
//! ========================================
//! source ~/export-esp.sh
//! cargo run --release --features esp32s3 --bin demo
//! ========================================
//!
//! Runs a fill-speed test, then cycles through text, rectangles, circles and
//! triangles, and finally counts frames per second on screen.
//!
//! Wiring (240x240 panel):
//! - SCK  => GPIO10
//! - MOSI => GPIO11
//! - CS   => GPIO9
//! - DC   => GPIO8
//! - RST  => GPIO14
//! - BL   => GPIO2

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![no_std]
#![no_main]

esp_bootloader_esp_idf::esp_app_desc!();

use core::fmt::Write;

use esp_backtrace as _;
use esp_hal::{
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    main,
    spi::{
        master::{Config as SpiConfig, Spi},
        Mode,
    },
    time::{Instant, Rate},
    Config,
};
use esp_println::println;

use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
    text::Text,
};
use embedded_hal::delay::DelayNs;

use st7789_display::{colors, GfxFont, GfxGlyph, PanelType, SpiTransport, St7789};

// 5x7 digits, one glyph per 5 bytes.
const DIGIT_BITMAP: [u8; 50] = [
    0x74, 0x67, 0x5C, 0xC5, 0xC0, // 0
    0x23, 0x08, 0x42, 0x11, 0xC0, // 1
    0x74, 0x42, 0x22, 0x23, 0xE0, // 2
    0xF8, 0x88, 0x20, 0xC5, 0xC0, // 3
    0x11, 0x95, 0x2F, 0x88, 0x40, // 4
    0xFC, 0x3C, 0x10, 0xC5, 0xC0, // 5
    0x32, 0x21, 0xE8, 0xC5, 0xC0, // 6
    0xF8, 0x44, 0x44, 0x21, 0x00, // 7
    0x74, 0x62, 0xE8, 0xC5, 0xC0, // 8
    0x74, 0x62, 0xF0, 0x89, 0x80, // 9
];

const fn digit(i: u16) -> GfxGlyph {
    GfxGlyph { bitmap_offset: i * 5, width: 5, height: 7, x_advance: 7, x_offset: 0, y_offset: -7 }
}

const DIGIT_GLYPHS: [GfxGlyph; 10] = [
    digit(0), digit(1), digit(2), digit(3), digit(4),
    digit(5), digit(6), digit(7), digit(8), digit(9),
];

const DIGITS: GfxFont<'static> = GfxFont {
    bitmap: &DIGIT_BITMAP,
    glyphs: &DIGIT_GLYPHS,
    first: b'0' as u16,
    last: b'9' as u16,
    y_advance: 9,
};

#[main]
fn main() -> ! {
    let p = esp_hal::init(Config::default());
    esp_alloc::heap_allocator!(size: 32 * 1024);
    esp_println::logger::init_logger(log::LevelFilter::Debug);

    // LCD control pins
    let cs = Output::new(p.GPIO9, Level::High, OutputConfig::default());
    let dc = Output::new(p.GPIO8, Level::Low, OutputConfig::default());
    let rst = Output::new(p.GPIO14, Level::High, OutputConfig::default());
    let _bl = Output::new(p.GPIO2, Level::High, OutputConfig::default());

    // SPI @ 40 MHz, Mode 0
    let spi = Spi::new(
        p.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_hz(40_000_000))
            .with_mode(Mode::_0),
    )
    .unwrap()
    .with_sck(p.GPIO10)
    .with_mosi(p.GPIO11);

    let mut delay = Delay::new();
    let mut display = St7789::new(SpiTransport::new(spi, cs, dc), Some(rst));
    display
        .init(PanelType::Panel240x240, 0, 0, &mut delay)
        .expect("ST7789 init failed");
    println!(
        "ST7789 {}x{}, transfer buffer {} bytes",
        display.width(),
        display.height(),
        display.buffer_size()
    );

    let title = MonoTextStyle::new(&FONT_10X20, Rgb565::YELLOW);
    let mut frames: u32 = 0;

    loop {
        // Speed test
        let t0 = Instant::now();
        for color in [
            Rgb565::CYAN,
            Rgb565::RED,
            Rgb565::BLUE,
            Rgb565::GREEN,
            Rgb565::YELLOW,
            colors::BROWN,
            colors::DARKBLUE,
            Rgb565::MAGENTA,
            colors::LIGHTGREEN,
            colors::LGRAY,
            colors::LBBLUE,
            Rgb565::WHITE,
        ] {
            display.fill_screen(color).unwrap();
        }
        println!("12 full-screen fills: {} ms", t0.elapsed().as_millis());

        show(&mut display, "Rect./Line.", title);
        display.draw_rect(30, 40, 71, 61, Rgb565::WHITE).unwrap();
        display.draw_line(30, 40, 100, 100, Rgb565::WHITE).unwrap();
        delay.delay_ms(1000);

        show(&mut display, "Filled Rect.", title);
        display.fill_rect(30, 40, 50, 50, Rgb565::WHITE).unwrap();
        delay.delay_ms(1000);

        show(&mut display, "Circle.", title);
        display.draw_circle(60, 80, 25, Rgb565::WHITE).unwrap();
        delay.delay_ms(1000);

        show(&mut display, "Filled Cir.", title);
        display.fill_circle(60, 80, 25, Rgb565::WHITE).unwrap();
        delay.delay_ms(1000);

        show(&mut display, "Triangle", title);
        display.draw_triangle(30, 50, 30, 90, 60, 60, Rgb565::WHITE).unwrap();
        delay.delay_ms(1000);

        show(&mut display, "Filled Tri", title);
        display.fill_triangle(30, 50, 30, 90, 60, 60, Rgb565::WHITE).unwrap();
        delay.delay_ms(1000);

        // Frame counter with the bitmap font
        display.fill_screen(Rgb565::BLACK).unwrap();
        let t0 = Instant::now();
        while t0.elapsed().as_millis() < 3000 {
            frames = frames.wrapping_add(1);
            let mut text: heapless::String<10> = heapless::String::new();
            write!(text, "{}", frames).ok();
            display
                .draw_string(10, 120, &text, &DIGITS, colors::GBLUE, Rgb565::BLACK)
                .unwrap();
        }
    }
}

/// Clears to red and draws a caption at the top.
fn show<T, RST>(display: &mut St7789<T, RST>, caption: &str, style: MonoTextStyle<'_, Rgb565>)
where
    T: st7789_display::Transport,
    RST: embedded_hal::digital::OutputPin,
{
    display.fill_screen(Rgb565::RED).unwrap();
    Text::new(caption, Point::new(10, 30), style).draw(display).unwrap();
}

