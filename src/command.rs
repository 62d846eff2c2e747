//! The part of the ST7789 instruction set this driver sends.
//
// Every command is one opcode byte sent with D/C low, optionally followed by
// parameter bytes sent with D/C high. Values follow the ST7789V datasheet.

// ---- System function commands ----
pub const SLPIN: u8 = 0x10;
pub const SLPOUT: u8 = 0x11;
pub const NORON: u8 = 0x13;

pub const INVOFF: u8 = 0x20;
pub const INVON: u8 = 0x21;
pub const DISPOFF: u8 = 0x28;
pub const DISPON: u8 = 0x29;

// ---- Addressing ----
pub const CASET: u8 = 0x2A; // column address set
pub const RASET: u8 = 0x2B; // row address set
pub const RAMWR: u8 = 0x2C; // memory write

pub const TEOFF: u8 = 0x34;
pub const TEON: u8 = 0x35;
pub const MADCTL: u8 = 0x36; // memory data access control (rotation)
pub const COLMOD: u8 = 0x3A; // interface pixel format

// ---- Panel tuning ----
pub const PORCTRL: u8 = 0xB2; // porch control
pub const GCTRL: u8 = 0xB7; // gate control
pub const VCOMS: u8 = 0xBB;
pub const LCMCTRL: u8 = 0xC0;
pub const VDVVRHEN: u8 = 0xC2;
pub const VRHS: u8 = 0xC3;
pub const VDVS: u8 = 0xC4;
pub const FRCTRL2: u8 = 0xC6; // frame rate in normal mode
pub const PWCTRL1: u8 = 0xD0;
pub const PVGAMCTRL: u8 = 0xE0; // positive voltage gamma
pub const NVGAMCTRL: u8 = 0xE1; // negative voltage gamma

/// COLMOD parameter for 16 bpp RGB565.
pub const COLOR_MODE_16BIT: u8 = 0x55;

// MADCTL bits used for rotation: MY MX MV, RGB order
pub const MADCTL_MY: u8 = 0x80; // page address order
pub const MADCTL_MX: u8 = 0x40; // column address order
pub const MADCTL_MV: u8 = 0x20; // page/column exchange
pub const MADCTL_RGB: u8 = 0x00;

// Power-on tuning values. Comments give the datasheet meaning.
pub(crate) const PORCH: [u8; 5] = [0x0C, 0x0C, 0x00, 0x33, 0x33];
pub(crate) const GATE: u8 = 0x35; // default
pub(crate) const VCOM: u8 = 0x19; // 0.725 V
pub(crate) const LCM: u8 = 0x2C; // default
pub(crate) const VDV_VRH_ENABLE: u8 = 0x01;
pub(crate) const VRH: u8 = 0x12; // +-4.45 V
pub(crate) const VDV: u8 = 0x20; // default
pub(crate) const FRAME_RATE_60HZ: u8 = 0x0F;
pub(crate) const POWER_1: [u8; 2] = [0xA4, 0xA1];
pub(crate) const GAMMA_POSITIVE: [u8; 14] = [
    0xD0, 0x04, 0x0D, 0x11, 0x13, 0x2B, 0x3F, 0x54, 0x4C, 0x18, 0x0D, 0x0B, 0x1F, 0x23,
];
pub(crate) const GAMMA_NEGATIVE: [u8; 14] = [
    0xD0, 0x04, 0x0C, 0x11, 0x13, 0x2C, 0x3F, 0x44, 0x51, 0x2F, 0x1F, 0x1F, 0x20, 0x23,
];
