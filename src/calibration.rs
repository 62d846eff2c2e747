//! Panel geometry calibration.
//!
//! The ST7789 has 240x320 pixels of GRAM; smaller glass is mounted at an
//! offset inside it. The offset ("shift") and the visible size depend on the
//! panel type and on the scan direction programmed through MADCTL, so every
//! (panel, rotation) pair has its own entry below.

use crate::command::{MADCTL_MV, MADCTL_MX, MADCTL_MY, MADCTL_RGB};

/// Physical panel geometry class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PanelType {
    /// 1.14" 135x240 IPS.
    Panel135x240,
    /// 1.3"/1.54" 240x240 IPS.
    #[default]
    Panel240x240,
    /// 1.9" 170x320 IPS.
    Panel170x320,
}

impl PanelType {
    pub const ALL: [PanelType; 3] = [
        PanelType::Panel135x240,
        PanelType::Panel240x240,
        PanelType::Panel170x320,
    ];

    fn index(self) -> usize {
        match self {
            PanelType::Panel135x240 => 0,
            PanelType::Panel240x240 => 1,
            PanelType::Panel170x320 => 2,
        }
    }
}

/// Visible size and GRAM offset for one (panel, rotation) pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
    pub x_shift: u16,
    pub y_shift: u16,
}

impl Geometry {
    const fn new(width: u16, height: u16, x_shift: u16, y_shift: u16) -> Self {
        Self { width, height, x_shift, y_shift }
    }
}

// Indexed [panel][rotation].
//
// The 240x240 entries for rotation 2 and 3 are identical with zero shift.
// They match what ships on the boards we have; unverified on other glass.
const CALIBRATION: [[Geometry; 4]; 3] = [
    [
        Geometry::new(135, 240, 53, 40),
        Geometry::new(240, 135, 40, 52),
        Geometry::new(135, 240, 52, 40),
        Geometry::new(240, 135, 40, 53),
    ],
    [
        Geometry::new(240, 240, 0, 80),
        Geometry::new(240, 240, 80, 0),
        Geometry::new(240, 240, 0, 0),
        Geometry::new(240, 240, 0, 0),
    ],
    [
        Geometry::new(170, 320, 35, 0),
        Geometry::new(320, 170, 0, 35),
        Geometry::new(170, 320, 35, 0),
        Geometry::new(320, 170, 0, 35),
    ],
];

/// Calibration entry for `panel` at `rotation`.
///
/// Rotations outside 0..=3 resolve to the rotation 0 entry.
pub fn lookup(panel: PanelType, rotation: u8) -> Geometry {
    let row = &CALIBRATION[panel.index()];
    row.get(rotation as usize).copied().unwrap_or(row[0])
}

/// MADCTL parameter for `rotation`; unknown rotations use the rotation 0 value.
pub fn madctl(rotation: u8) -> u8 {
    match rotation {
        1 => MADCTL_MY | MADCTL_MV | MADCTL_RGB,
        2 => MADCTL_RGB,
        3 => MADCTL_MX | MADCTL_MV | MADCTL_RGB,
        _ => MADCTL_MX | MADCTL_MY | MADCTL_RGB,
    }
}

/// Current display configuration, owned by the driver.
///
/// Geometry is always the calibration entry for (`panel`, `rotation`); the
/// only way to change it is [`DisplayConfig::apply`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    geometry: Geometry,
    rotation: u8,
    panel: PanelType,
}

impl DisplayConfig {
    pub fn new(panel: PanelType, rotation: u8) -> Self {
        Self { geometry: lookup(panel, rotation), rotation, panel }
    }

    pub(crate) fn apply(&mut self, panel: PanelType, rotation: u8) {
        *self = Self::new(panel, rotation);
    }

    #[inline]
    pub fn width(&self) -> u16 { self.geometry.width }

    #[inline]
    pub fn height(&self) -> u16 { self.geometry.height }

    #[inline]
    pub fn x_shift(&self) -> u16 { self.geometry.x_shift }

    #[inline]
    pub fn y_shift(&self) -> u16 { self.geometry.y_shift }

    #[inline]
    pub fn rotation(&self) -> u8 { self.rotation }

    #[inline]
    pub fn panel(&self) -> PanelType { self.panel }

    pub fn geometry(&self) -> Geometry { self.geometry }

    /// True if (x, y) is a visible pixel.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i32 && y < self.height() as i32
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new(PanelType::default(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_panel_rotations() {
        let expect = [
            (135, 240, 53, 40),
            (240, 135, 40, 52),
            (135, 240, 52, 40),
            (240, 135, 40, 53),
        ];
        for (rot, &(w, h, xs, ys)) in expect.iter().enumerate() {
            let g = lookup(PanelType::Panel135x240, rot as u8);
            assert_eq!((g.width, g.height, g.x_shift, g.y_shift), (w, h, xs, ys), "rotation {rot}");
        }
    }

    #[test]
    fn unknown_rotation_uses_rotation_zero() {
        for panel in PanelType::ALL {
            assert_eq!(lookup(panel, 99), lookup(panel, 0));
            assert_eq!(lookup(panel, 4), lookup(panel, 0));
        }
        assert_eq!(madctl(99), madctl(0));
    }

    #[test]
    fn square_panel_keeps_observed_entries() {
        let g2 = lookup(PanelType::Panel240x240, 2);
        let g3 = lookup(PanelType::Panel240x240, 3);
        assert_eq!(g2, g3);
        assert_eq!((g2.x_shift, g2.y_shift), (0, 0));
        assert_eq!(lookup(PanelType::Panel240x240, 0).y_shift, 80);
        assert_eq!(lookup(PanelType::Panel240x240, 1).x_shift, 80);
    }

    #[test]
    fn landscape_rotations_swap_dimensions() {
        for panel in PanelType::ALL {
            let portrait = lookup(panel, 0);
            let landscape = lookup(panel, 1);
            assert_eq!(portrait.width, landscape.height);
            assert_eq!(portrait.height, landscape.width);
        }
    }

    #[test]
    fn madctl_values() {
        assert_eq!(madctl(0), 0xC0);
        assert_eq!(madctl(1), 0xA0);
        assert_eq!(madctl(2), 0x00);
        assert_eq!(madctl(3), 0x60);
    }

    #[test]
    fn config_keeps_requested_rotation() {
        let cfg = DisplayConfig::new(PanelType::Panel170x320, 99);
        assert_eq!(cfg.rotation(), 99);
        assert_eq!(cfg.geometry(), lookup(PanelType::Panel170x320, 0));
        assert!(cfg.contains(169, 319));
        assert!(!cfg.contains(170, 0));
        assert!(!cfg.contains(-1, 0));
    }
}
