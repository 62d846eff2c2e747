//! Extra named RGB565 colors.
//!
//! The primaries (`BLACK`, `WHITE`, `RED`, `GREEN`, `BLUE`, `CYAN`, `MAGENTA`,
//! `YELLOW`) come from [`embedded_graphics::pixelcolor::RgbColor`].

use embedded_graphics::pixelcolor::Rgb565;

pub const GRAY: Rgb565 = Rgb565::new(16, 33, 16);
pub const LGRAY: Rgb565 = Rgb565::new(24, 48, 24);
pub const BROWN: Rgb565 = Rgb565::new(23, 34, 0);
pub const BRRED: Rgb565 = Rgb565::new(31, 32, 7);

pub const BRED: Rgb565 = Rgb565::new(31, 0, 31);
pub const GRED: Rgb565 = Rgb565::new(31, 63, 0);
pub const GBLUE: Rgb565 = Rgb565::new(0, 63, 31);

pub const DARKBLUE: Rgb565 = Rgb565::new(0, 14, 15);
pub const LIGHTBLUE: Rgb565 = Rgb565::new(15, 43, 28);
pub const GRAYBLUE: Rgb565 = Rgb565::new(10, 34, 24);
pub const LIGHTGREEN: Rgb565 = Rgb565::new(16, 32, 31);
pub const LGRAYBLUE: Rgb565 = Rgb565::new(20, 50, 17);
pub const LBBLUE: Rgb565 = Rgb565::new(5, 24, 18);
