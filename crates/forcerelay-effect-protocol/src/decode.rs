//! Tagged payload decoding with mandatory size guards.
//!
//! All layouts are little-endian and packed. Structured fields decode only
//! when the kind has a known layout, a payload is present, and the declared
//! size covers the layout's minimum; otherwise decoding degrades to the
//! generic envelope. Reads are bounds-checked against the bytes actually
//! supplied, so a declared size larger than the real payload cannot cause an
//! out-of-bounds read either.

use serde::{Deserialize, Serialize};

use crate::descriptor::EffectDescriptor;
use crate::kinds::{EffectKind, PayloadLayout};

/// Wire size of a constant-force payload (magnitude only).
pub const CONSTANT_FORCE_PARAMS_LEN: usize = 4;

/// Wire size of a ramp-force payload (start, end).
pub const RAMP_FORCE_PARAMS_LEN: usize = 8;

/// Wire size of a condition payload (offset, two coefficients, two
/// saturations, dead band).
pub const CONDITION_PARAMS_LEN: usize = 24;

/// Wire size of a periodic payload (magnitude, offset, phase, period).
pub const PERIODIC_PARAMS_LEN: usize = 16;

/// Constant-force parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantForceParams {
    /// Signed magnitude in ten-thousandths of full scale.
    pub magnitude: i32,
}

/// Ramp-force parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RampForceParams {
    /// Magnitude at the start of playback, in ten-thousandths.
    pub start: i32,
    /// Magnitude at the end of playback, in ten-thousandths.
    pub end: i32,
}

/// Condition parameters, shared by spring, damper, friction, and inertia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionParams {
    /// Offset of the condition's neutral point.
    pub offset: i32,
    /// Coefficient on the positive side of the neutral point.
    pub positive_coefficient: i32,
    /// Coefficient on the negative side of the neutral point.
    pub negative_coefficient: i32,
    /// Force saturation on the positive side.
    pub positive_saturation: u32,
    /// Force saturation on the negative side.
    pub negative_saturation: u32,
    /// Region around the neutral point where the condition is inactive.
    pub dead_band: i32,
}

/// Periodic parameters, shared by the wave kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicParams {
    /// Wave magnitude in ten-thousandths.
    pub magnitude: u32,
    /// Baseline offset of the wave.
    pub offset: i32,
    /// Phase of the wave in hundredths of a degree.
    pub phase: u32,
    /// Wave period in microseconds.
    pub period_us: u32,
}

/// Decoded type-specific parameters, tagged by payload layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSpecific {
    /// Constant-force payload.
    Constant(ConstantForceParams),
    /// Ramp-force payload.
    Ramp(RampForceParams),
    /// Condition payload.
    Condition(ConditionParams),
    /// Periodic payload.
    Periodic(PeriodicParams),
}

impl TypeSpecific {
    /// The constant-force magnitude, if this is a constant-force payload.
    pub fn constant_magnitude(&self) -> Option<i32> {
        match self {
            Self::Constant(p) => Some(p.magnitude),
            _ => None,
        }
    }
}

/// The result of decoding one `set_parameters` descriptor: the generic
/// envelope, plus structured fields when the guards passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedEffectParameters {
    /// The effect kind the owning effect object was created with.
    pub kind: EffectKind,
    /// Effect duration in microseconds.
    pub duration_us: u32,
    /// Gain in ten-thousandths.
    pub gain: u32,
    /// Trigger button identifier.
    pub trigger_button: u32,
    /// Start delay in microseconds.
    pub start_delay_us: u32,
    /// Number of axes addressed.
    pub axis_count: u32,
    /// Direction of the first axis, when axes are present.
    pub first_direction: Option<i32>,
    /// The declared payload size, as logged for diagnosis.
    pub declared_payload_len: u32,
    /// Structured fields, absent when decoding degraded to generic-only.
    pub type_specific: Option<TypeSpecific>,
}

impl DecodedEffectParameters {
    /// Decode a descriptor for an effect of the given kind.
    pub fn decode(kind: EffectKind, desc: &EffectDescriptor) -> Self {
        Self {
            kind,
            duration_us: desc.duration_us,
            gain: desc.gain,
            trigger_button: desc.trigger_button,
            start_delay_us: desc.start_delay_us,
            axis_count: desc.axis_count(),
            first_direction: desc.first_direction(),
            declared_payload_len: desc.declared_type_specific_len,
            type_specific: decode_type_specific(kind, desc),
        }
    }

    /// The constant-force magnitude, when present.
    pub fn constant_magnitude(&self) -> Option<i32> {
        self.type_specific
            .as_ref()
            .and_then(TypeSpecific::constant_magnitude)
    }
}

/// Decode the type-specific payload, or `None` for generic-only.
///
/// `None` means: unknown kind, absent payload, declared size below the
/// layout minimum, or fewer actual bytes than the layout needs.
pub fn decode_type_specific(kind: EffectKind, desc: &EffectDescriptor) -> Option<TypeSpecific> {
    let layout = kind.layout()?;
    let payload = desc.type_specific.as_deref()?;
    if (desc.declared_type_specific_len as usize) < layout.min_len() {
        return None;
    }
    match layout {
        PayloadLayout::Constant => Some(TypeSpecific::Constant(ConstantForceParams {
            magnitude: read_i32_le(payload, 0)?,
        })),
        PayloadLayout::Ramp => Some(TypeSpecific::Ramp(RampForceParams {
            start: read_i32_le(payload, 0)?,
            end: read_i32_le(payload, 4)?,
        })),
        PayloadLayout::Condition => Some(TypeSpecific::Condition(ConditionParams {
            offset: read_i32_le(payload, 0)?,
            positive_coefficient: read_i32_le(payload, 4)?,
            negative_coefficient: read_i32_le(payload, 8)?,
            positive_saturation: read_u32_le(payload, 12)?,
            negative_saturation: read_u32_le(payload, 16)?,
            dead_band: read_i32_le(payload, 20)?,
        })),
        PayloadLayout::Periodic => Some(TypeSpecific::Periodic(PeriodicParams {
            magnitude: read_u32_le(payload, 0)?,
            offset: read_i32_le(payload, 4)?,
            phase: read_u32_le(payload, 8)?,
            period_us: read_u32_le(payload, 12)?,
        })),
    }
}

fn read_u32_le(buf: &[u8], pos: usize) -> Option<u32> {
    buf.get(pos..pos.checked_add(4)?)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
}

fn read_i32_le(buf: &[u8], pos: usize) -> Option<i32> {
    buf.get(pos..pos.checked_add(4)?)
        .and_then(|b| b.try_into().ok())
        .map(i32::from_le_bytes)
}
