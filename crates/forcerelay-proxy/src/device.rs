//! Device proxy: capability forcing, effect wrapping, and the creation
//! fallback.
//!
//! Every call reaches the genuine device; three spots change what the host
//! sees. Capabilities always report force-feedback support with attack and
//! fade envelopes. Created effects come back wrapped in [`EffectProxy`].
//! And when the hardware refuses effect creation with the unsupported code,
//! the host receives a [`FakeEffect`] and a success instead.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use forcerelay_effect_protocol::{EffectDescriptor, EffectKind, Guid};

use crate::context::ProxyContext;
use crate::effect::{EffectProxy, FakeEffect};
use crate::interface::{
    interface_ids, result_label, ActionMap, DataFormat, DeviceCapFlags, DeviceCaps, DeviceInfo,
    DiResult, EffectInfo, EnumControl, EscapeRequest, ForceEffect, ImageInfo, InputDevice8,
    Interface, ObjectData, ObjectInfo, ObjectSelector,
};

/// Capability bits forced on regardless of what the hardware reports.
pub const FORCED_CAPS: DeviceCapFlags = DeviceCapFlags::FORCE_FEEDBACK
    .union(DeviceCapFlags::FF_ATTACK)
    .union(DeviceCapFlags::FF_FADE);

/// Proxy around a genuine device handle.
pub struct DeviceProxy {
    refs: AtomicU32,
    real: Arc<dyn InputDevice8>,
    ctx: Arc<ProxyContext>,
}

impl DeviceProxy {
    /// Wrap a genuine device.
    pub fn new(real: Arc<dyn InputDevice8>, ctx: Arc<ProxyContext>) -> Arc<Self> {
        ctx.trace(format_args!("[relay] DeviceProxy created"));
        Arc::new(Self {
            refs: AtomicU32::new(1),
            real,
            ctx,
        })
    }

    /// The proxy's own reference count.
    pub fn ref_count(&self) -> u32 {
        self.refs.load(Ordering::SeqCst)
    }
}

impl InputDevice8 for DeviceProxy {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface> {
        if interface_ids::is_device_identity(iid) || *iid == interface_ids::UNKNOWN {
            self.add_ref();
            return Ok(Interface::Device(self));
        }
        self.real.clone().query_interface(iid)
    }

    fn add_ref(&self) -> u32 {
        self.real.add_ref();
        self.refs.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn release(&self) -> u32 {
        self.real.release();
        crate::refcount::release(&self.refs)
    }

    fn capabilities(&self) -> DiResult<DeviceCaps> {
        let mut caps = self.real.capabilities()?;
        let reported = caps.flags;
        caps.flags.insert(FORCED_CAPS);
        self.ctx.trace(format_args!(
            "[relay] GetCapabilities flags={:#06x} -> {:#06x}",
            reported.bits(),
            caps.flags.bits()
        ));
        Ok(caps)
    }

    fn enum_objects(
        &self,
        flags: u32,
        callback: &mut dyn FnMut(&ObjectInfo) -> EnumControl,
    ) -> DiResult<()> {
        self.real.enum_objects(flags, callback)
    }

    fn get_property(&self, property: &Guid) -> DiResult<u32> {
        self.real.get_property(property)
    }

    fn set_property(&self, property: &Guid, value: u32) -> DiResult<()> {
        self.real.set_property(property, value)
    }

    fn acquire(&self) -> DiResult<()> {
        let result = self.real.acquire();
        self.ctx.trace(format_args!(
            "[relay] Acquire result={}",
            result_label(&result)
        ));
        result
    }

    fn unacquire(&self) -> DiResult<()> {
        let result = self.real.unacquire();
        self.ctx.trace(format_args!(
            "[relay] Unacquire result={}",
            result_label(&result)
        ));
        result
    }

    fn device_state(&self, buffer: &mut [u8]) -> DiResult<()> {
        self.real.device_state(buffer)
    }

    fn device_data(&self, max_items: usize, flags: u32) -> DiResult<Vec<ObjectData>> {
        self.real.device_data(max_items, flags)
    }

    fn set_data_format(&self, format: &DataFormat) -> DiResult<()> {
        self.ctx.trace(format_args!(
            "[relay] SetDataFormat flags={:#x} data_size={} objects={}",
            format.flags, format.data_size, format.object_count
        ));
        self.real.set_data_format(format)
    }

    fn set_event_notification(&self, event: Option<u64>) -> DiResult<()> {
        self.real.set_event_notification(event)
    }

    fn set_cooperative_level(&self, window: Option<u64>, flags: u32) -> DiResult<()> {
        self.ctx.trace(format_args!(
            "[relay] SetCooperativeLevel window={} flags={flags:#x}",
            window.is_some()
        ));
        self.real.set_cooperative_level(window, flags)
    }

    fn object_info(&self, selector: ObjectSelector) -> DiResult<ObjectInfo> {
        self.real.object_info(selector)
    }

    fn device_info(&self) -> DiResult<DeviceInfo> {
        let result = self.real.device_info();
        if let Ok(info) = &result {
            self.ctx.trace(format_args!(
                "[relay] GetDeviceInfo instance={:?} product={:?}",
                info.instance_name, info.product_name
            ));
        }
        result
    }

    fn run_control_panel(&self, flags: u32) -> DiResult<()> {
        self.real.run_control_panel(flags)
    }

    fn initialize(&self, version: u32, instance: &Guid) -> DiResult<()> {
        self.real.initialize(version, instance)
    }

    fn create_effect(
        &self,
        guid: &Guid,
        descriptor: Option<&EffectDescriptor>,
    ) -> DiResult<Arc<dyn ForceEffect>> {
        let kind = EffectKind::from_guid(guid);
        // The creation descriptor is forwarded opaquely. Translation state
        // is updated only by set_parameters on the returned handle.
        self.ctx.trace(format_args!(
            "[relay] CreateEffect guid={guid} kind={kind:?} declared_len={}",
            descriptor.map_or(0, |d| d.declared_type_specific_len)
        ));
        match self.real.create_effect(guid, descriptor) {
            Ok(real) => Ok(EffectProxy::new(real, *guid, self.ctx.clone())),
            Err(err) if err.is_unsupported() => {
                self.ctx.trace(format_args!(
                    "[relay] CreateEffect unsupported ({:#010x}); standing in a fake",
                    err.code()
                ));
                Ok(FakeEffect::new(*guid, self.ctx.clone()))
            }
            Err(err) => {
                self.ctx.trace(format_args!(
                    "[relay] CreateEffect failed result={:#010x}",
                    err.code()
                ));
                Err(err)
            }
        }
    }

    fn enum_effects(
        &self,
        type_filter: u32,
        callback: &mut dyn FnMut(&EffectInfo) -> EnumControl,
    ) -> DiResult<()> {
        // Thunk: trace each reported effect, then hand the host's own
        // verdict back to the genuine enumerator unmodified.
        let ctx = &self.ctx;
        self.real.enum_effects(type_filter, &mut |info| {
            ctx.trace(format_args!(
                "[relay] EnumEffects guid={} type={:#x} name={:?}",
                info.guid, info.effect_type, info.name
            ));
            callback(info)
        })
    }

    fn effect_info(&self, guid: &Guid) -> DiResult<EffectInfo> {
        self.real.effect_info(guid)
    }

    fn force_feedback_state(&self) -> DiResult<u32> {
        self.real.force_feedback_state()
    }

    fn send_force_feedback_command(&self, command: u32) -> DiResult<()> {
        self.ctx.trace(format_args!(
            "[relay] SendForceFeedbackCommand command={command:#x}"
        ));
        self.real.send_force_feedback_command(command)
    }

    fn enum_created_effects(
        &self,
        flags: u32,
        callback: &mut dyn FnMut(&Arc<dyn ForceEffect>) -> EnumControl,
    ) -> DiResult<()> {
        self.real.enum_created_effects(flags, callback)
    }

    fn escape(&self, request: &EscapeRequest) -> DiResult<Vec<u8>> {
        self.real.escape(request)
    }

    fn poll(&self) -> DiResult<()> {
        self.real.poll()
    }

    fn send_device_data(&self, data: &[ObjectData], flags: u32) -> DiResult<usize> {
        self.real.send_device_data(data, flags)
    }

    fn enum_effects_in_file(
        &self,
        path: &str,
        flags: u32,
        callback: &mut dyn FnMut(&Guid, &EffectDescriptor) -> EnumControl,
    ) -> DiResult<()> {
        self.real.enum_effects_in_file(path, flags, callback)
    }

    fn write_effect_to_file(
        &self,
        path: &str,
        effects: &[(Guid, EffectDescriptor)],
        flags: u32,
    ) -> DiResult<()> {
        self.real.write_effect_to_file(path, effects, flags)
    }

    fn build_action_map(
        &self,
        map: &mut ActionMap,
        user_name: Option<&str>,
        flags: u32,
    ) -> DiResult<()> {
        self.real.build_action_map(map, user_name, flags)
    }

    fn set_action_map(
        &self,
        map: &ActionMap,
        user_name: Option<&str>,
        flags: u32,
    ) -> DiResult<()> {
        self.real.set_action_map(map, user_name, flags)
    }

    fn image_info(&self) -> DiResult<ImageInfo> {
        self.real.image_info()
    }
}
