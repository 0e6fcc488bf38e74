//! 128-bit identifiers in the host plugin interface layout.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 128-bit identifier in the `{data1, data2, data3, data4[8]}` layout the
/// host plugin interface uses for interface and effect identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Guid {
    /// First 32 bits.
    pub data1: u32,
    /// Next 16 bits.
    pub data2: u16,
    /// Next 16 bits.
    pub data3: u16,
    /// Final 64 bits.
    pub data4: [u8; 8],
}

impl Guid {
    /// Construct an identifier from its four components.
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }
}

impl fmt::Display for Guid {
    /// Braced uppercase-hex registry format, e.g.
    /// `{13541C20-8E33-11D0-9AD0-00A0C9A06E35}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g, h, i] = self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, a, b, c, d, e, g, h, i
        )
    }
}

/// Standard effect identities defined by the host plugin interface.
///
/// The eleven structured kinds share a common 64-bit tail and consecutive
/// `data1` values.
pub mod effect_guids {
    use super::Guid;

    const TAIL: [u8; 8] = [0x9A, 0xD0, 0x00, 0xA0, 0xC9, 0xA0, 0x6E, 0x35];

    /// Constant force.
    pub const CONSTANT_FORCE: Guid = Guid::new(0x13541C20, 0x8E33, 0x11D0, TAIL);
    /// Ramp force.
    pub const RAMP_FORCE: Guid = Guid::new(0x13541C21, 0x8E33, 0x11D0, TAIL);
    /// Square wave periodic.
    pub const SQUARE: Guid = Guid::new(0x13541C22, 0x8E33, 0x11D0, TAIL);
    /// Sine wave periodic.
    pub const SINE: Guid = Guid::new(0x13541C23, 0x8E33, 0x11D0, TAIL);
    /// Triangle wave periodic.
    pub const TRIANGLE: Guid = Guid::new(0x13541C24, 0x8E33, 0x11D0, TAIL);
    /// Upward sawtooth periodic.
    pub const SAWTOOTH_UP: Guid = Guid::new(0x13541C25, 0x8E33, 0x11D0, TAIL);
    /// Downward sawtooth periodic.
    pub const SAWTOOTH_DOWN: Guid = Guid::new(0x13541C26, 0x8E33, 0x11D0, TAIL);
    /// Spring condition.
    pub const SPRING: Guid = Guid::new(0x13541C27, 0x8E33, 0x11D0, TAIL);
    /// Damper condition.
    pub const DAMPER: Guid = Guid::new(0x13541C28, 0x8E33, 0x11D0, TAIL);
    /// Inertia condition.
    pub const INERTIA: Guid = Guid::new(0x13541C29, 0x8E33, 0x11D0, TAIL);
    /// Friction condition.
    pub const FRICTION: Guid = Guid::new(0x13541C2A, 0x8E33, 0x11D0, TAIL);
    /// Application-defined custom force.
    pub const CUSTOM_FORCE: Guid = Guid::new(0x13541C2B, 0x8E33, 0x11D0, TAIL);
}
