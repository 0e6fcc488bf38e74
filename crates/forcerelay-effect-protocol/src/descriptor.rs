//! The effect-parameter envelope as marshalled from the host.

use serde::{Deserialize, Serialize};

/// An effect descriptor as the host supplies it to `set_parameters` and
/// effect creation: generic envelope fields plus an opaque type-specific
/// payload whose byte length is declared separately by the host.
///
/// The declared length is host input and must not be trusted: it may exceed
/// the bytes actually supplied, or undercut the minimum size of the kind's
/// layout. The decoder guards against both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    /// Total effect duration in microseconds (0 = infinite).
    pub duration_us: u32,
    /// Envelope sample period in microseconds.
    pub sample_period_us: u32,
    /// Gain applied to the effect, in ten-thousandths.
    pub gain: u32,
    /// Trigger button identifier, if the effect is button-triggered.
    pub trigger_button: u32,
    /// Delay before playback starts, in microseconds.
    pub start_delay_us: u32,
    /// Per-axis direction values; the length is the axis count.
    pub directions: Vec<i32>,
    /// Raw type-specific parameter bytes, if the host supplied any.
    pub type_specific: Option<Vec<u8>>,
    /// The payload size the host declared, in bytes.
    pub declared_type_specific_len: u32,
}

impl EffectDescriptor {
    /// An empty descriptor (all zeros, no payload).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration in microseconds.
    pub fn with_duration_us(mut self, duration_us: u32) -> Self {
        self.duration_us = duration_us;
        self
    }

    /// Set the gain in ten-thousandths.
    pub fn with_gain(mut self, gain: u32) -> Self {
        self.gain = gain;
        self
    }

    /// Set the trigger button.
    pub fn with_trigger_button(mut self, trigger_button: u32) -> Self {
        self.trigger_button = trigger_button;
        self
    }

    /// Set the start delay in microseconds.
    pub fn with_start_delay_us(mut self, start_delay_us: u32) -> Self {
        self.start_delay_us = start_delay_us;
        self
    }

    /// Set the per-axis directions.
    pub fn with_directions(mut self, directions: Vec<i32>) -> Self {
        self.directions = directions;
        self
    }

    /// Attach a type-specific payload, declaring its actual length.
    pub fn with_type_specific(mut self, bytes: Vec<u8>) -> Self {
        self.declared_type_specific_len = bytes.len() as u32;
        self.type_specific = Some(bytes);
        self
    }

    /// Override the declared payload length without touching the bytes.
    /// Hosts do hand over descriptors whose declared length disagrees with
    /// the payload they actually supply.
    pub fn with_declared_len(mut self, declared: u32) -> Self {
        self.declared_type_specific_len = declared;
        self
    }

    /// Number of axes the effect addresses.
    pub fn axis_count(&self) -> u32 {
        self.directions.len() as u32
    }

    /// Direction of the first axis, if any axes are present.
    pub fn first_direction(&self) -> Option<i32> {
        self.directions.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_envelope() -> Result<(), Box<dyn std::error::Error>> {
        let desc = EffectDescriptor::new()
            .with_duration_us(500_000)
            .with_gain(10_000)
            .with_trigger_button(2)
            .with_start_delay_us(1_000)
            .with_directions(vec![9_000, 0]);
        assert_eq!(desc.duration_us, 500_000);
        assert_eq!(desc.gain, 10_000);
        assert_eq!(desc.trigger_button, 2);
        assert_eq!(desc.start_delay_us, 1_000);
        assert_eq!(desc.axis_count(), 2);
        assert_eq!(desc.first_direction(), Some(9_000));
        Ok(())
    }

    #[test]
    fn test_payload_declares_own_length() -> Result<(), Box<dyn std::error::Error>> {
        let desc = EffectDescriptor::new().with_type_specific(vec![1, 2, 3, 4]);
        assert_eq!(desc.declared_type_specific_len, 4);
        assert_eq!(desc.type_specific.as_deref(), Some(&[1, 2, 3, 4][..]));
        Ok(())
    }

    #[test]
    fn test_declared_len_can_disagree() -> Result<(), Box<dyn std::error::Error>> {
        let desc = EffectDescriptor::new()
            .with_type_specific(vec![0; 2])
            .with_declared_len(24);
        assert_eq!(desc.declared_type_specific_len, 24);
        assert_eq!(desc.type_specific.as_ref().map(Vec::len), Some(2));
        Ok(())
    }

    #[test]
    fn test_empty_descriptor() -> Result<(), Box<dyn std::error::Error>> {
        let desc = EffectDescriptor::new();
        assert_eq!(desc.axis_count(), 0);
        assert_eq!(desc.first_direction(), None);
        assert!(desc.type_specific.is_none());
        Ok(())
    }
}
