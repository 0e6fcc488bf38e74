//! Effect kind classification.

use serde::{Deserialize, Serialize};

use crate::guid::{effect_guids, Guid};

/// Effect kinds the host plugin interface can request, classified from the
/// 128-bit effect identity. The kind is fixed at effect creation and drives
/// which type-specific payload layout the decoder selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Constant force of a single signed magnitude.
    ConstantForce,
    /// Force ramping linearly between a start and an end value.
    RampForce,
    /// Spring condition (force proportional to displacement).
    Spring,
    /// Damper condition (force proportional to velocity).
    Damper,
    /// Friction condition.
    Friction,
    /// Inertia condition (force proportional to acceleration).
    Inertia,
    /// Sine wave periodic.
    Sine,
    /// Square wave periodic.
    Square,
    /// Triangle wave periodic.
    Triangle,
    /// Upward sawtooth periodic.
    SawtoothUp,
    /// Downward sawtooth periodic.
    SawtoothDown,
    /// Any identity this layer does not recognize (including custom forces).
    Unknown,
}

impl EffectKind {
    /// Classify an effect identity.
    pub fn from_guid(guid: &Guid) -> Self {
        match *guid {
            g if g == effect_guids::CONSTANT_FORCE => Self::ConstantForce,
            g if g == effect_guids::RAMP_FORCE => Self::RampForce,
            g if g == effect_guids::SPRING => Self::Spring,
            g if g == effect_guids::DAMPER => Self::Damper,
            g if g == effect_guids::FRICTION => Self::Friction,
            g if g == effect_guids::INERTIA => Self::Inertia,
            g if g == effect_guids::SINE => Self::Sine,
            g if g == effect_guids::SQUARE => Self::Square,
            g if g == effect_guids::TRIANGLE => Self::Triangle,
            g if g == effect_guids::SAWTOOTH_UP => Self::SawtoothUp,
            g if g == effect_guids::SAWTOOTH_DOWN => Self::SawtoothDown,
            _ => Self::Unknown,
        }
    }

    /// The identity this kind classifies from, if it has one.
    pub fn guid(self) -> Option<Guid> {
        match self {
            Self::ConstantForce => Some(effect_guids::CONSTANT_FORCE),
            Self::RampForce => Some(effect_guids::RAMP_FORCE),
            Self::Spring => Some(effect_guids::SPRING),
            Self::Damper => Some(effect_guids::DAMPER),
            Self::Friction => Some(effect_guids::FRICTION),
            Self::Inertia => Some(effect_guids::INERTIA),
            Self::Sine => Some(effect_guids::SINE),
            Self::Square => Some(effect_guids::SQUARE),
            Self::Triangle => Some(effect_guids::TRIANGLE),
            Self::SawtoothUp => Some(effect_guids::SAWTOOTH_UP),
            Self::SawtoothDown => Some(effect_guids::SAWTOOTH_DOWN),
            Self::Unknown => None,
        }
    }

    /// The type-specific payload layout for this kind, if one is known.
    /// Unknown kinds have no layout and always decode generic-only.
    pub fn layout(self) -> Option<PayloadLayout> {
        match self {
            Self::ConstantForce => Some(PayloadLayout::Constant),
            Self::RampForce => Some(PayloadLayout::Ramp),
            Self::Spring | Self::Damper | Self::Friction | Self::Inertia => {
                Some(PayloadLayout::Condition)
            }
            Self::Sine | Self::Square | Self::Triangle | Self::SawtoothUp | Self::SawtoothDown => {
                Some(PayloadLayout::Periodic)
            }
            Self::Unknown => None,
        }
    }
}

/// Fixed type-specific payload layouts, shared by the kinds that use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLayout {
    /// Single signed 32-bit magnitude.
    Constant,
    /// Signed 32-bit start and end values.
    Ramp,
    /// Offset, coefficients, saturations, and dead band.
    Condition,
    /// Magnitude, offset, phase, and period.
    Periodic,
}

impl PayloadLayout {
    /// Minimum payload size in bytes for structured decoding.
    pub fn min_len(self) -> usize {
        match self {
            Self::Constant => crate::decode::CONSTANT_FORCE_PARAMS_LEN,
            Self::Ramp => crate::decode::RAMP_FORCE_PARAMS_LEN,
            Self::Condition => crate::decode::CONDITION_PARAMS_LEN,
            Self::Periodic => crate::decode::PERIODIC_PARAMS_LEN,
        }
    }
}
