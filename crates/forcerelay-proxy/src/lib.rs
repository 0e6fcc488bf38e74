//! Interception layer for the host's force-feedback plugin interface.
//!
//! The layer sits between a host application and the genuine plugin it
//! loads. It wraps the plugin factory, the devices it creates, and the
//! effects those devices create, forwarding every call while translating
//! constant-force activity into actuator commands and forcing the
//! capability bits hosts gate their force-feedback code on. When hardware
//! refuses to create an effect, a fake stands in so the host's
//! force-feedback path stays alive on effect-less devices.
//!
//! Entry is through [`bootstrap::create_plugin`] or
//! [`bootstrap::wrap_plugin`] with a [`ProxyContext`] built from the
//! environment.

pub mod bootstrap;
pub mod context;
pub mod device;
pub mod effect;
pub mod interface;
pub mod plugin;

mod refcount;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{create_plugin, wrap_plugin};
pub use context::ProxyContext;
pub use device::{DeviceProxy, FORCED_CAPS};
pub use effect::{EffectProxy, FakeEffect};
pub use interface::{
    interface_ids, ActionEntry, ActionMap, DataFormat, DeviceCapFlags, DeviceCaps, DeviceInfo,
    DiError, DiResult, DirectInput8, EffectInfo, EnumControl, EscapeRequest, ForceEffect,
    ImageInfo, InputDevice8, Interface, ObjectData, ObjectInfo, ObjectSelector,
};
pub use plugin::PluginProxy;
