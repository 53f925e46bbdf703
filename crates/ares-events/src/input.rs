//! Backend-independent key and mouse button codes.
//!
//! Values follow the GLFW numbering so platform layers can convert with a cast.

use std::fmt;

/// A keyboard key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const SPACE: Self = Self(32);
    pub const APOSTROPHE: Self = Self(39);
    pub const COMMA: Self = Self(44);
    pub const MINUS: Self = Self(45);
    pub const PERIOD: Self = Self(46);
    pub const SLASH: Self = Self(47);

    pub const D0: Self = Self(48);
    pub const D1: Self = Self(49);
    pub const D2: Self = Self(50);
    pub const D3: Self = Self(51);
    pub const D4: Self = Self(52);
    pub const D5: Self = Self(53);
    pub const D6: Self = Self(54);
    pub const D7: Self = Self(55);
    pub const D8: Self = Self(56);
    pub const D9: Self = Self(57);

    pub const SEMICOLON: Self = Self(59);
    pub const EQUAL: Self = Self(61);

    pub const A: Self = Self(65);
    pub const B: Self = Self(66);
    pub const C: Self = Self(67);
    pub const D: Self = Self(68);
    pub const E: Self = Self(69);
    pub const F: Self = Self(70);
    pub const G: Self = Self(71);
    pub const H: Self = Self(72);
    pub const I: Self = Self(73);
    pub const J: Self = Self(74);
    pub const K: Self = Self(75);
    pub const L: Self = Self(76);
    pub const M: Self = Self(77);
    pub const N: Self = Self(78);
    pub const O: Self = Self(79);
    pub const P: Self = Self(80);
    pub const Q: Self = Self(81);
    pub const R: Self = Self(82);
    pub const S: Self = Self(83);
    pub const T: Self = Self(84);
    pub const U: Self = Self(85);
    pub const V: Self = Self(86);
    pub const W: Self = Self(87);
    pub const X: Self = Self(88);
    pub const Y: Self = Self(89);
    pub const Z: Self = Self(90);

    pub const LEFT_BRACKET: Self = Self(91);
    pub const BACKSLASH: Self = Self(92);
    pub const RIGHT_BRACKET: Self = Self(93);
    pub const GRAVE_ACCENT: Self = Self(96);

    pub const ESCAPE: Self = Self(256);
    pub const ENTER: Self = Self(257);
    pub const TAB: Self = Self(258);
    pub const BACKSPACE: Self = Self(259);
    pub const INSERT: Self = Self(260);
    pub const DELETE: Self = Self(261);
    pub const RIGHT: Self = Self(262);
    pub const LEFT: Self = Self(263);
    pub const DOWN: Self = Self(264);
    pub const UP: Self = Self(265);
    pub const PAGE_UP: Self = Self(266);
    pub const PAGE_DOWN: Self = Self(267);
    pub const HOME: Self = Self(268);
    pub const END: Self = Self(269);
    pub const CAPS_LOCK: Self = Self(280);
    pub const SCROLL_LOCK: Self = Self(281);
    pub const NUM_LOCK: Self = Self(282);
    pub const PRINT_SCREEN: Self = Self(283);
    pub const PAUSE: Self = Self(284);

    pub const F1: Self = Self(290);
    pub const F2: Self = Self(291);
    pub const F3: Self = Self(292);
    pub const F4: Self = Self(293);
    pub const F5: Self = Self(294);
    pub const F6: Self = Self(295);
    pub const F7: Self = Self(296);
    pub const F8: Self = Self(297);
    pub const F9: Self = Self(298);
    pub const F10: Self = Self(299);
    pub const F11: Self = Self(300);
    pub const F12: Self = Self(301);

    pub const KP0: Self = Self(320);
    pub const KP1: Self = Self(321);
    pub const KP2: Self = Self(322);
    pub const KP3: Self = Self(323);
    pub const KP4: Self = Self(324);
    pub const KP5: Self = Self(325);
    pub const KP6: Self = Self(326);
    pub const KP7: Self = Self(327);
    pub const KP8: Self = Self(328);
    pub const KP9: Self = Self(329);
    pub const KP_DECIMAL: Self = Self(330);
    pub const KP_DIVIDE: Self = Self(331);
    pub const KP_MULTIPLY: Self = Self(332);
    pub const KP_SUBTRACT: Self = Self(333);
    pub const KP_ADD: Self = Self(334);
    pub const KP_ENTER: Self = Self(335);
    pub const KP_EQUAL: Self = Self(336);

    pub const LEFT_SHIFT: Self = Self(340);
    pub const LEFT_CONTROL: Self = Self(341);
    pub const LEFT_ALT: Self = Self(342);
    pub const LEFT_SUPER: Self = Self(343);
    pub const RIGHT_SHIFT: Self = Self(344);
    pub const RIGHT_CONTROL: Self = Self(345);
    pub const RIGHT_ALT: Self = Self(346);
    pub const RIGHT_SUPER: Self = Self(347);
    pub const MENU: Self = Self(348);

    pub const fn code(self) -> u16 {
        self.0
    }

    /// The printable ASCII character for this key, if any.
    pub fn as_char(self) -> Option<char> {
        match self.0 {
            32..=96 => char::from_u32(self.0 as u32),
            _ => None,
        }
    }

    pub const fn is_modifier(self) -> bool {
        matches!(self.0, 340..=347)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MouseButton {
    Button0 = 0,
    Button1 = 1,
    Button2 = 2,
    Button3 = 3,
    Button4 = 4,
    Button5 = 5,
    Button6 = 6,
    Button7 = 7,
}

impl MouseButton {
    pub const LEFT: Self = MouseButton::Button0;
    pub const RIGHT: Self = MouseButton::Button1;
    pub const MIDDLE: Self = MouseButton::Button2;
    pub const LAST: Self = MouseButton::Button7;

    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(MouseButton::Button0),
            1 => Some(MouseButton::Button1),
            2 => Some(MouseButton::Button2),
            3 => Some(MouseButton::Button3),
            4 => Some(MouseButton::Button4),
            5 => Some(MouseButton::Button5),
            6 => Some(MouseButton::Button6),
            7 => Some(MouseButton::Button7),
            _ => None,
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}
