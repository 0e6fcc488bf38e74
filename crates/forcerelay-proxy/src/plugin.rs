//! Top-level plugin proxy.
//!
//! The only behavioral change at this level is device wrapping: every device
//! the genuine factory creates comes back inside a [`DeviceProxy`] sharing
//! this proxy's context. Everything else forwards.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use forcerelay_effect_protocol::Guid;

use crate::context::ProxyContext;
use crate::device::DeviceProxy;
use crate::interface::{
    interface_ids, result_label, ActionMap, DeviceInfo, DiResult, DirectInput8, EnumControl,
    InputDevice8, Interface,
};

/// Proxy around the genuine plugin factory.
pub struct PluginProxy {
    refs: AtomicU32,
    real: Arc<dyn DirectInput8>,
    ctx: Arc<ProxyContext>,
}

impl PluginProxy {
    /// Wrap the genuine factory.
    pub fn new(real: Arc<dyn DirectInput8>, ctx: Arc<ProxyContext>) -> Arc<Self> {
        ctx.trace(format_args!("[relay] PluginProxy created"));
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

impl DirectInput8 for PluginProxy {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface> {
        if interface_ids::is_plugin_identity(iid) || *iid == interface_ids::UNKNOWN {
            self.add_ref();
            return Ok(Interface::Plugin(self));
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

    fn create_device(&self, instance: &Guid) -> DiResult<Arc<dyn InputDevice8>> {
        let result = self.real.create_device(instance);
        self.ctx.trace(format_args!(
            "[relay] CreateDevice instance={instance} result={}",
            result_label(&result)
        ));
        let real = result?;
        Ok(DeviceProxy::new(real, self.ctx.clone()))
    }

    fn enum_devices(
        &self,
        device_class: u32,
        flags: u32,
        callback: &mut dyn FnMut(&DeviceInfo) -> EnumControl,
    ) -> DiResult<()> {
        self.real.enum_devices(device_class, flags, callback)
    }

    fn device_status(&self, instance: &Guid) -> DiResult<()> {
        self.real.device_status(instance)
    }

    fn run_control_panel(&self, flags: u32) -> DiResult<()> {
        self.real.run_control_panel(flags)
    }

    fn initialize(&self, version: u32) -> DiResult<()> {
        let result = self.real.initialize(version);
        self.ctx.trace(format_args!(
            "[relay] Initialize version={version:#06x} result={}",
            result_label(&result)
        ));
        result
    }

    fn find_device(&self, device_class: &Guid, name: &str) -> DiResult<Guid> {
        self.real.find_device(device_class, name)
    }

    fn enum_devices_by_semantics(
        &self,
        user_name: Option<&str>,
        map: &ActionMap,
        flags: u32,
        callback: &mut dyn FnMut(&DeviceInfo, u32) -> EnumControl,
    ) -> DiResult<()> {
        self.real
            .enum_devices_by_semantics(user_name, map, flags, callback)
    }

    fn configure_devices(&self, flags: u32) -> DiResult<()> {
        self.real.configure_devices(flags)
    }
}
