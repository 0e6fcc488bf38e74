//! The host-facing plugin interface: identities, result codes, and the
//! three handle traits.
//!
//! The external contract is a fixed vtable-shaped interface with explicit
//! reference counting and numeric result codes. Here each interface level is
//! a trait, handles are `Arc`s, and the numeric codes live behind
//! [`DiError`]; pass-through operations forward the genuine handle's result
//! verbatim, so the host only ever observes genuine error semantics (or the
//! deliberately synthesized success of the fallback path).

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use forcerelay_effect_protocol::{EffectDescriptor, Guid};

/// Result alias for every host-facing operation.
pub type DiResult<T> = Result<T, DiError>;

/// Host-facing failure codes.
///
/// `Unsupported` and `NotImplemented` are distinct variants that share one
/// external code; the effect-creation fallback treats either as "the
/// hardware has no force-feedback effects" (see
/// [`DiError::is_unsupported`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DiError {
    /// The device does not support the requested operation.
    #[error("operation not supported by the device")]
    Unsupported,
    /// The interface method is not implemented.
    #[error("interface method not implemented")]
    NotImplemented,
    /// A required pointer argument was absent.
    #[error("required pointer argument was absent")]
    NullPointer,
    /// The requested interface identity is not available on this handle.
    #[error("requested interface is not available")]
    NoInterface,
    /// An argument was invalid.
    #[error("invalid argument")]
    InvalidParam,
    /// Access to the input device has been lost and must be re-acquired.
    #[error("access to the device has been lost")]
    InputLost,
    /// The operation requires the device to be acquired first.
    #[error("device is not acquired")]
    NotAcquired,
    /// Unspecified failure.
    #[error("unspecified failure")]
    Generic,
    /// Any other failure code, preserved verbatim for pass-through.
    #[error("failure code {0:#010x}")]
    Other(u32),
}

impl DiError {
    /// The external 32-bit code for this failure.
    ///
    /// `Unsupported` and `NotImplemented` collapse onto the same value, as
    /// they do in the external interface definition.
    pub fn code(self) -> u32 {
        match self {
            Self::Unsupported | Self::NotImplemented => 0x8000_4001,
            Self::NoInterface => 0x8000_4002,
            Self::NullPointer => 0x8000_4003,
            Self::Generic => 0x8000_4005,
            Self::NotAcquired => 0x8007_000C,
            Self::InputLost => 0x8007_001E,
            Self::InvalidParam => 0x8007_0057,
            Self::Other(code) => code,
        }
    }

    /// Classify an external failure code.
    pub fn from_code(code: u32) -> Self {
        match code {
            0x8000_4001 => Self::Unsupported,
            0x8000_4002 => Self::NoInterface,
            0x8000_4003 => Self::NullPointer,
            0x8000_4005 => Self::Generic,
            0x8007_000C => Self::NotAcquired,
            0x8007_001E => Self::InputLost,
            0x8007_0057 => Self::InvalidParam,
            other => Self::Other(other),
        }
    }

    /// Whether effect creation failing with this code means "the hardware
    /// has no force-feedback effect support" and the fake should stand in.
    ///
    /// Two codes are conflated here on purpose, matching observed host
    /// behavior; whether hardware ever returns the second one for unrelated
    /// reasons is an open compatibility question.
    pub fn is_unsupported(self) -> bool {
        matches!(self, Self::Unsupported | Self::NotImplemented)
    }
}

/// Log rendering of a host-facing result.
pub fn result_label<T>(result: &DiResult<T>) -> String {
    match result {
        Ok(_) => "ok".to_string(),
        Err(err) => format!("{:#010x}", err.code()),
    }
}

/// The fixed interface identities a wrapper must answer for.
pub mod interface_ids {
    use forcerelay_effect_protocol::Guid;

    /// The base identity every handle answers.
    pub const UNKNOWN: Guid = Guid::new(0, 0, 0, [0xC0, 0, 0, 0, 0, 0, 0, 0x46]);

    /// Top-level plugin factory, narrow-character variant.
    pub const PLUGIN_A: Guid = Guid::new(
        0xBF798030,
        0x483A,
        0x4DA2,
        [0xAA, 0x99, 0x5D, 0x64, 0xED, 0x36, 0x97, 0x00],
    );
    /// Top-level plugin factory, wide-character variant.
    pub const PLUGIN_W: Guid = Guid::new(
        0xBF798031,
        0x483A,
        0x4DA2,
        [0xAA, 0x99, 0x5D, 0x64, 0xED, 0x36, 0x97, 0x00],
    );

    /// Device interface, narrow-character variant.
    pub const DEVICE8_A: Guid = Guid::new(
        0x54D41080,
        0xDC15,
        0x4833,
        [0xA4, 0x1B, 0x74, 0x8F, 0x73, 0xA3, 0x81, 0x79],
    );
    /// Device interface, wide-character variant.
    pub const DEVICE8_W: Guid = Guid::new(
        0x54D41081,
        0xDC15,
        0x4833,
        [0xA4, 0x1B, 0x74, 0x8F, 0x73, 0xA3, 0x81, 0x79],
    );

    /// Legacy device interface revision 7, narrow.
    pub const DEVICE7_A: Guid = Guid::new(
        0x57D7C6BC,
        0x2356,
        0x11D3,
        [0x8E, 0x9D, 0x00, 0xC0, 0x4F, 0x68, 0x44, 0xAE],
    );
    /// Legacy device interface revision 7, wide.
    pub const DEVICE7_W: Guid = Guid::new(
        0x57D7C6BD,
        0x2356,
        0x11D3,
        [0x8E, 0x9D, 0x00, 0xC0, 0x4F, 0x68, 0x44, 0xAE],
    );

    /// Legacy device interface revision 2, narrow.
    pub const DEVICE2_A: Guid = Guid::new(
        0x5944E682,
        0xC92E,
        0x11CF,
        [0xBF, 0xC4, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00],
    );
    /// Legacy device interface revision 2, wide.
    pub const DEVICE2_W: Guid = Guid::new(
        0x5944E683,
        0xC92E,
        0x11CF,
        [0xBF, 0xC4, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00],
    );

    /// Original device interface, narrow.
    pub const DEVICE_A: Guid = Guid::new(
        0x5944E680,
        0xC92E,
        0x11CF,
        [0xBF, 0xC4, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00],
    );
    /// Original device interface, wide.
    pub const DEVICE_W: Guid = Guid::new(
        0x5944E681,
        0xC92E,
        0x11CF,
        [0xBF, 0xC4, 0x44, 0x45, 0x53, 0x54, 0x00, 0x00],
    );

    /// Effect interface (one variant only).
    pub const EFFECT: Guid = Guid::new(
        0xE7E1F7C0,
        0x88D2,
        0x11D0,
        [0x9A, 0xD0, 0x00, 0xA0, 0xC9, 0xA0, 0x6E, 0x35],
    );

    /// Whether `iid` names the top-level plugin factory.
    pub fn is_plugin_identity(iid: &Guid) -> bool {
        *iid == PLUGIN_A || *iid == PLUGIN_W
    }

    /// Whether `iid` names any revision of the device interface.
    pub fn is_device_identity(iid: &Guid) -> bool {
        [
            DEVICE8_A, DEVICE8_W, DEVICE7_A, DEVICE7_W, DEVICE2_A, DEVICE2_W, DEVICE_A, DEVICE_W,
        ]
        .contains(iid)
    }

    /// Whether `iid` names the effect interface.
    pub fn is_effect_identity(iid: &Guid) -> bool {
        *iid == EFFECT
    }
}

/// Continue/stop signal returned by enumeration callbacks. Must reach the
/// genuine enumerator unmodified when a proxy interposes a thunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumControl {
    /// Visit the next item.
    Continue,
    /// Stop the enumeration now.
    Stop,
}

bitflags! {
    /// Device capability flags as reported to the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceCapFlags: u32 {
        /// Device is physically attached.
        const ATTACHED = 0x0000_0001;
        /// Device requires polling.
        const POLLED_DEVICE = 0x0000_0002;
        /// Device is emulated.
        const EMULATED = 0x0000_0004;
        /// Data format requires polling.
        const POLLED_DATA_FORMAT = 0x0000_0008;
        /// Device supports force feedback.
        const FORCE_FEEDBACK = 0x0000_0100;
        /// Force-feedback attack envelopes are supported.
        const FF_ATTACK = 0x0000_0200;
        /// Force-feedback fade envelopes are supported.
        const FF_FADE = 0x0000_0400;
        /// Saturation is supported on conditions.
        const SATURATION = 0x0000_0800;
        /// Two-coefficient conditions are supported.
        const POS_NEG_COEFFICIENTS = 0x0000_1000;
        /// Two-saturation conditions are supported.
        const POS_NEG_SATURATION = 0x0000_2000;
        /// Dead bands are supported on conditions.
        const DEAD_BAND = 0x0000_4000;
        /// Start delays are supported.
        const START_DELAY = 0x0000_8000;
    }
}

/// Device capabilities, as returned by the capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCaps {
    /// Capability flags.
    pub flags: DeviceCapFlags,
    /// Numeric device type and subtype.
    pub device_type: u32,
    /// Number of axes.
    pub axis_count: u32,
    /// Number of buttons.
    pub button_count: u32,
    /// Number of point-of-view controllers.
    pub pov_count: u32,
    /// Minimum force-feedback sample period, microseconds.
    pub ff_sample_period_us: u32,
    /// Minimum force-feedback time resolution, microseconds.
    pub ff_min_time_resolution_us: u32,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self {
            flags: DeviceCapFlags::empty(),
            device_type: 0,
            axis_count: 0,
            button_count: 0,
            pov_count: 0,
            ff_sample_period_us: 0,
            ff_min_time_resolution_us: 0,
        }
    }
}

/// One effect as reported by effect enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectInfo {
    /// The effect identity.
    pub guid: Guid,
    /// Numeric effect type and capability bits.
    pub effect_type: u32,
    /// Parameters supported at creation.
    pub static_params: u32,
    /// Parameters changeable while playing.
    pub dynamic_params: u32,
    /// Display name.
    pub name: String,
}

/// Identity of one device instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Identity of this specific instance.
    pub instance_guid: Guid,
    /// Identity of the product.
    pub product_guid: Guid,
    /// Numeric device type and subtype.
    pub device_type: u32,
    /// Instance display name.
    pub instance_name: String,
    /// Product display name.
    pub product_name: String,
}

/// One input object (axis, button, POV) on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object type identity.
    pub object_type: Guid,
    /// Data offset within the device state.
    pub offset: u32,
    /// Object identifier.
    pub object_id: u32,
    /// Object flags.
    pub flags: u32,
    /// Display name.
    pub name: String,
}

/// How an object-info query addresses the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectSelector {
    /// By data offset.
    ByOffset(u32),
    /// By object identifier.
    ById(u32),
    /// By usage page and usage.
    ByUsage(u32),
}

/// One buffered input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectData {
    /// Data offset of the object that changed.
    pub offset: u32,
    /// New data value.
    pub data: u32,
    /// Event timestamp, milliseconds.
    pub timestamp_ms: u32,
    /// Event sequence number.
    pub sequence: u32,
}

/// The host's chosen device data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFormat {
    /// Format flags.
    pub flags: u32,
    /// Size of one state snapshot, bytes.
    pub data_size: u32,
    /// Number of objects in the format.
    pub object_count: u32,
}

/// A vendor-specific escape request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeRequest {
    /// Vendor command number.
    pub command: u32,
    /// Opaque input bytes.
    pub input: Vec<u8>,
}

/// One entry of an action map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEntry {
    /// Genre-relative semantic.
    pub semantic: u32,
    /// Mapped object identifier.
    pub object_id: u32,
    /// Mapping flags.
    pub flags: u32,
}

/// An action map, built by the device and applied back to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMap {
    /// Application genre.
    pub genre: u32,
    /// Mapping entries.
    pub actions: Vec<ActionEntry>,
}

/// Device image metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageInfo {
    /// Required buffer size, bytes.
    pub buffer_size: u32,
    /// Bytes actually used.
    pub buffer_used: u32,
    /// Number of views.
    pub view_count: u32,
}

/// Any handle an identity query can produce.
#[derive(Clone)]
pub enum Interface {
    /// A top-level plugin factory handle.
    Plugin(Arc<dyn DirectInput8>),
    /// A device handle.
    Device(Arc<dyn InputDevice8>),
    /// An effect handle.
    Effect(Arc<dyn ForceEffect>),
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plugin(_) => f.write_str("Interface::Plugin"),
            Self::Device(_) => f.write_str("Interface::Device"),
            Self::Effect(_) => f.write_str("Interface::Effect"),
        }
    }
}

impl Interface {
    /// The device handle, if this is one.
    pub fn into_device(self) -> Option<Arc<dyn InputDevice8>> {
        match self {
            Self::Device(device) => Some(device),
            _ => None,
        }
    }

    /// The effect handle, if this is one.
    pub fn into_effect(self) -> Option<Arc<dyn ForceEffect>> {
        match self {
            Self::Effect(effect) => Some(effect),
            _ => None,
        }
    }
}

/// One force-feedback effect.
///
/// Reference-count contract: `add_ref`/`release` return the new count; the
/// creator of the handle drops its `Arc` when `release` returns zero, and no
/// call may be made through the handle afterwards. Proxy implementations
/// additionally forward every `add_ref`/`release` to the handle they wrap;
/// the wrapper's own lifetime is driven solely by its own count. That
/// asymmetry is part of the external contract and must be preserved.
pub trait ForceEffect: Send + Sync {
    /// Answer an interface identity query.
    ///
    /// # Errors
    ///
    /// `NoInterface` when the identity is not available on this handle.
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface>;
    /// Take one additional reference; returns the new count.
    fn add_ref(&self) -> u32;
    /// Drop one reference; returns the new count.
    fn release(&self) -> u32;
    /// Late initialization against a device instance.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn initialize(&self, version: u32, guid: &Guid) -> DiResult<()>;
    /// The effect identity this object was created with.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn effect_guid(&self) -> DiResult<Guid>;
    /// Retrieve the current parameters.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn parameters(&self, flags: u32) -> DiResult<EffectDescriptor>;
    /// Replace (a subset of) the effect parameters.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn set_parameters(&self, descriptor: Option<&EffectDescriptor>, flags: u32) -> DiResult<()>;
    /// Begin playback.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn start(&self, iterations: u32, flags: u32) -> DiResult<()>;
    /// Stop playback.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn stop(&self) -> DiResult<()>;
    /// Playback status bits.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn status(&self) -> DiResult<u32>;
    /// Download the effect to the device.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn download(&self) -> DiResult<()>;
    /// Remove the effect from the device.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure, if any.
    fn unload(&self) -> DiResult<()>;
    /// Vendor-specific escape hatch.
    ///
    /// # Errors
    ///
    /// Forwards the genuine handle's failure; `Unsupported` on the fake.
    fn escape(&self, request: &EscapeRequest) -> DiResult<Vec<u8>>;
}

/// One input device.
///
/// Same reference-count contract as [`ForceEffect`].
#[allow(missing_docs)] // Pass-through surface; the genuine interface documents it.
pub trait InputDevice8: Send + Sync {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface>;
    fn add_ref(&self) -> u32;
    fn release(&self) -> u32;
    fn capabilities(&self) -> DiResult<DeviceCaps>;
    fn enum_objects(
        &self,
        flags: u32,
        callback: &mut dyn FnMut(&ObjectInfo) -> EnumControl,
    ) -> DiResult<()>;
    fn get_property(&self, property: &Guid) -> DiResult<u32>;
    fn set_property(&self, property: &Guid, value: u32) -> DiResult<()>;
    fn acquire(&self) -> DiResult<()>;
    fn unacquire(&self) -> DiResult<()>;
    fn device_state(&self, buffer: &mut [u8]) -> DiResult<()>;
    fn device_data(&self, max_items: usize, flags: u32) -> DiResult<Vec<ObjectData>>;
    fn set_data_format(&self, format: &DataFormat) -> DiResult<()>;
    fn set_event_notification(&self, event: Option<u64>) -> DiResult<()>;
    fn set_cooperative_level(&self, window: Option<u64>, flags: u32) -> DiResult<()>;
    fn object_info(&self, selector: ObjectSelector) -> DiResult<ObjectInfo>;
    fn device_info(&self) -> DiResult<DeviceInfo>;
    fn run_control_panel(&self, flags: u32) -> DiResult<()>;
    fn initialize(&self, version: u32, instance: &Guid) -> DiResult<()>;
    fn create_effect(
        &self,
        guid: &Guid,
        descriptor: Option<&EffectDescriptor>,
    ) -> DiResult<Arc<dyn ForceEffect>>;
    fn enum_effects(
        &self,
        type_filter: u32,
        callback: &mut dyn FnMut(&EffectInfo) -> EnumControl,
    ) -> DiResult<()>;
    fn effect_info(&self, guid: &Guid) -> DiResult<EffectInfo>;
    fn force_feedback_state(&self) -> DiResult<u32>;
    fn send_force_feedback_command(&self, command: u32) -> DiResult<()>;
    fn enum_created_effects(
        &self,
        flags: u32,
        callback: &mut dyn FnMut(&Arc<dyn ForceEffect>) -> EnumControl,
    ) -> DiResult<()>;
    fn escape(&self, request: &EscapeRequest) -> DiResult<Vec<u8>>;
    fn poll(&self) -> DiResult<()>;
    fn send_device_data(&self, data: &[ObjectData], flags: u32) -> DiResult<usize>;
    fn enum_effects_in_file(
        &self,
        path: &str,
        flags: u32,
        callback: &mut dyn FnMut(&Guid, &EffectDescriptor) -> EnumControl,
    ) -> DiResult<()>;
    fn write_effect_to_file(
        &self,
        path: &str,
        effects: &[(Guid, EffectDescriptor)],
        flags: u32,
    ) -> DiResult<()>;
    fn build_action_map(
        &self,
        map: &mut ActionMap,
        user_name: Option<&str>,
        flags: u32,
    ) -> DiResult<()>;
    fn set_action_map(&self, map: &ActionMap, user_name: Option<&str>, flags: u32)
        -> DiResult<()>;
    fn image_info(&self) -> DiResult<ImageInfo>;
}

/// The top-level plugin factory.
///
/// Same reference-count contract as [`ForceEffect`].
#[allow(missing_docs)] // Pass-through surface; the genuine interface documents it.
pub trait DirectInput8: Send + Sync {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface>;
    fn add_ref(&self) -> u32;
    fn release(&self) -> u32;
    fn create_device(&self, instance: &Guid) -> DiResult<Arc<dyn InputDevice8>>;
    fn enum_devices(
        &self,
        device_class: u32,
        flags: u32,
        callback: &mut dyn FnMut(&DeviceInfo) -> EnumControl,
    ) -> DiResult<()>;
    fn device_status(&self, instance: &Guid) -> DiResult<()>;
    fn run_control_panel(&self, flags: u32) -> DiResult<()>;
    fn initialize(&self, version: u32) -> DiResult<()>;
    fn find_device(&self, device_class: &Guid, name: &str) -> DiResult<Guid>;
    fn enum_devices_by_semantics(
        &self,
        user_name: Option<&str>,
        map: &ActionMap,
        flags: u32,
        callback: &mut dyn FnMut(&DeviceInfo, u32) -> EnumControl,
    ) -> DiResult<()>;
    fn configure_devices(&self, flags: u32) -> DiResult<()>;
}
