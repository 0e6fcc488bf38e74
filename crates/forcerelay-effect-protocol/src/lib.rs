//! Effect identifiers, descriptor envelope, and payload decoding.
//!
//! This crate is intentionally I/O-free. It provides the 128-bit effect
//! identifiers the host plugin interface uses, the classification of those
//! identifiers into effect kinds, and the decoding of the tagged
//! type-specific parameter payloads the host attaches to an effect
//! descriptor. Decoding never reads past a payload's declared bound; an
//! undersized or absent payload degrades to the generic envelope fields.

pub mod decode;
pub mod descriptor;
pub mod guid;
pub mod kinds;

pub use decode::{
    ConditionParams, ConstantForceParams, DecodedEffectParameters, PeriodicParams,
    RampForceParams, TypeSpecific, CONDITION_PARAMS_LEN, CONSTANT_FORCE_PARAMS_LEN,
    PERIODIC_PARAMS_LEN, RAMP_FORCE_PARAMS_LEN,
};
pub use descriptor::EffectDescriptor;
pub use guid::{effect_guids, Guid};
pub use kinds::{EffectKind, PayloadLayout};
