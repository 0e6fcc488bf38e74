//! Recording stubs standing in for the genuine plugin stack in tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use forcerelay_channel::CommandSink;
use forcerelay_control_protocol::ControlCommand;
use forcerelay_diagnostic::TraceSink;
use forcerelay_effect_protocol::{effect_guids, EffectDescriptor, Guid};

use crate::context::ProxyContext;
use crate::interface::{
    interface_ids, ActionMap, DataFormat, DeviceCaps, DeviceInfo, DiError, DiResult,
    DirectInput8, EffectInfo, EnumControl, EscapeRequest, ForceEffect, ImageInfo, InputDevice8,
    Interface, ObjectData, ObjectInfo, ObjectSelector,
};

/// A command sink that records instead of sending.
#[derive(Default)]
pub struct RecordingSink {
    commands: Mutex<Vec<ControlCommand>>,
}

impl RecordingSink {
    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<ControlCommand> {
        self.commands.lock().map(|mut c| std::mem::take(&mut *c)).unwrap_or_default()
    }
}

impl CommandSink for RecordingSink {
    fn send(&self, command: &ControlCommand) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(*command);
        }
    }
}

/// A context with a silent trace sink and the given command sink.
pub fn test_context(channel: Arc<dyn CommandSink>) -> Arc<ProxyContext> {
    ProxyContext::new(Arc::new(TraceSink::disabled()), channel)
}

/// Genuine-effect stand-in: records calls and reference counting, optionally
/// failing every forwarded operation with a fixed error.
pub struct StubEffect {
    calls: Mutex<Vec<String>>,
    add_refs: AtomicU32,
    releases: AtomicU32,
    failure: Option<DiError>,
}

impl StubEffect {
    /// A stub whose operations all succeed.
    pub fn arc() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            add_refs: AtomicU32::new(0),
            releases: AtomicU32::new(0),
            failure: None,
        })
    }

    /// A stub whose operations all fail with `error`.
    pub fn arc_failing(error: DiError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            add_refs: AtomicU32::new(0),
            releases: AtomicU32::new(0),
            failure: Some(error),
        })
    }

    /// Operation names in call order, reference counting excluded.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of `add_ref` calls forwarded here.
    pub fn add_refs(&self) -> u32 {
        self.add_refs.load(Ordering::SeqCst)
    }

    /// Number of `release` calls forwarded here.
    pub fn releases(&self) -> u32 {
        self.releases.load(Ordering::SeqCst)
    }

    fn record(&self, name: &str) -> DiResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name.to_string());
        }
        match self.failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ForceEffect for StubEffect {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface> {
        self.record("query_interface")?;
        if interface_ids::is_effect_identity(iid) || *iid == interface_ids::UNKNOWN {
            self.add_ref();
            return Ok(Interface::Effect(self));
        }
        Err(DiError::NoInterface)
    }

    fn add_ref(&self) -> u32 {
        self.add_refs.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn release(&self) -> u32 {
        self.releases.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn initialize(&self, _version: u32, _guid: &Guid) -> DiResult<()> {
        self.record("initialize")
    }

    fn effect_guid(&self) -> DiResult<Guid> {
        self.record("effect_guid")?;
        Ok(effect_guids::CONSTANT_FORCE)
    }

    fn parameters(&self, _flags: u32) -> DiResult<EffectDescriptor> {
        self.record("parameters")?;
        Ok(EffectDescriptor::default())
    }

    fn set_parameters(&self, _descriptor: Option<&EffectDescriptor>, _flags: u32) -> DiResult<()> {
        self.record("set_parameters")
    }

    fn start(&self, _iterations: u32, _flags: u32) -> DiResult<()> {
        self.record("start")
    }

    fn stop(&self) -> DiResult<()> {
        self.record("stop")
    }

    fn status(&self) -> DiResult<u32> {
        self.record("status")?;
        Ok(0)
    }

    fn download(&self) -> DiResult<()> {
        self.record("download")
    }

    fn unload(&self) -> DiResult<()> {
        self.record("unload")
    }

    fn escape(&self, _request: &EscapeRequest) -> DiResult<Vec<u8>> {
        self.record("escape")?;
        Ok(Vec::new())
    }
}

/// What the stub device's `create_effect` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateEffectMode {
    /// Hand out a working [`StubEffect`].
    Genuine,
    /// Refuse with the unsupported code.
    Unsupported,
    /// Refuse with the not-implemented code.
    NotImplemented,
    /// Refuse with an arbitrary error.
    Fail(DiError),
}

/// Genuine-device stand-in.
pub struct StubDevice {
    calls: Mutex<Vec<String>>,
    add_refs: AtomicU32,
    releases: AtomicU32,
    create_mode: CreateEffectMode,
    caps: DeviceCaps,
    effect_infos: Vec<EffectInfo>,
    created: Mutex<Vec<Arc<StubEffect>>>,
}

impl StubDevice {
    /// A device whose hardware supports effects and reports bare caps.
    pub fn arc(create_mode: CreateEffectMode) -> Arc<Self> {
        Self::arc_with_caps(create_mode, DeviceCaps::default())
    }

    /// A device with explicit capabilities.
    pub fn arc_with_caps(create_mode: CreateEffectMode, caps: DeviceCaps) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            add_refs: AtomicU32::new(0),
            releases: AtomicU32::new(0),
            create_mode,
            caps,
            effect_infos: vec![
                EffectInfo {
                    guid: effect_guids::CONSTANT_FORCE,
                    effect_type: 1,
                    static_params: 0,
                    dynamic_params: 0,
                    name: "Constant Force".to_string(),
                },
                EffectInfo {
                    guid: effect_guids::SINE,
                    effect_type: 3,
                    static_params: 0,
                    dynamic_params: 0,
                    name: "Sine Wave".to_string(),
                },
                EffectInfo {
                    guid: effect_guids::SPRING,
                    effect_type: 4,
                    static_params: 0,
                    dynamic_params: 0,
                    name: "Spring".to_string(),
                },
            ],
            created: Mutex::new(Vec::new()),
        })
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Effects handed out so far.
    pub fn created_effects(&self) -> Vec<Arc<StubEffect>> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of `add_ref` calls forwarded here.
    pub fn add_refs(&self) -> u32 {
        self.add_refs.load(Ordering::SeqCst)
    }

    /// Number of `release` calls forwarded here.
    pub fn releases(&self) -> u32 {
        self.releases.load(Ordering::SeqCst)
    }

    fn record(&self, name: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name.to_string());
        }
    }
}

impl InputDevice8 for StubDevice {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface> {
        self.record("query_interface");
        if interface_ids::is_device_identity(iid) || *iid == interface_ids::UNKNOWN {
            self.add_ref();
            return Ok(Interface::Device(self));
        }
        Err(DiError::NoInterface)
    }

    fn add_ref(&self) -> u32 {
        self.add_refs.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn release(&self) -> u32 {
        self.releases.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn capabilities(&self) -> DiResult<DeviceCaps> {
        self.record("capabilities");
        Ok(self.caps)
    }

    fn enum_objects(
        &self,
        _flags: u32,
        _callback: &mut dyn FnMut(&ObjectInfo) -> EnumControl,
    ) -> DiResult<()> {
        self.record("enum_objects");
        Ok(())
    }

    fn get_property(&self, _property: &Guid) -> DiResult<u32> {
        self.record("get_property");
        Ok(0)
    }

    fn set_property(&self, _property: &Guid, _value: u32) -> DiResult<()> {
        self.record("set_property");
        Ok(())
    }

    fn acquire(&self) -> DiResult<()> {
        self.record("acquire");
        Ok(())
    }

    fn unacquire(&self) -> DiResult<()> {
        self.record("unacquire");
        Ok(())
    }

    fn device_state(&self, _buffer: &mut [u8]) -> DiResult<()> {
        self.record("device_state");
        Ok(())
    }

    fn device_data(&self, _max_items: usize, _flags: u32) -> DiResult<Vec<ObjectData>> {
        self.record("device_data");
        Ok(Vec::new())
    }

    fn set_data_format(&self, _format: &DataFormat) -> DiResult<()> {
        self.record("set_data_format");
        Ok(())
    }

    fn set_event_notification(&self, _event: Option<u64>) -> DiResult<()> {
        self.record("set_event_notification");
        Ok(())
    }

    fn set_cooperative_level(&self, _window: Option<u64>, _flags: u32) -> DiResult<()> {
        self.record("set_cooperative_level");
        Ok(())
    }

    fn object_info(&self, _selector: ObjectSelector) -> DiResult<ObjectInfo> {
        self.record("object_info");
        Err(DiError::InvalidParam)
    }

    fn device_info(&self) -> DiResult<DeviceInfo> {
        self.record("device_info");
        Ok(DeviceInfo {
            instance_guid: Guid::new(1, 0, 0, [0; 8]),
            product_guid: Guid::new(2, 0, 0, [0; 8]),
            device_type: 0,
            instance_name: "Stub Wheel".to_string(),
            product_name: "Stub Wheel Product".to_string(),
        })
    }

    fn run_control_panel(&self, _flags: u32) -> DiResult<()> {
        self.record("run_control_panel");
        Ok(())
    }

    fn initialize(&self, _version: u32, _instance: &Guid) -> DiResult<()> {
        self.record("initialize");
        Ok(())
    }

    fn create_effect(
        &self,
        _guid: &Guid,
        _descriptor: Option<&EffectDescriptor>,
    ) -> DiResult<Arc<dyn ForceEffect>> {
        self.record("create_effect");
        match self.create_mode {
            CreateEffectMode::Genuine => {
                let effect = StubEffect::arc();
                if let Ok(mut created) = self.created.lock() {
                    created.push(effect.clone());
                }
                Ok(effect)
            }
            CreateEffectMode::Unsupported => Err(DiError::Unsupported),
            CreateEffectMode::NotImplemented => Err(DiError::NotImplemented),
            CreateEffectMode::Fail(error) => Err(error),
        }
    }

    fn enum_effects(
        &self,
        _type_filter: u32,
        callback: &mut dyn FnMut(&EffectInfo) -> EnumControl,
    ) -> DiResult<()> {
        self.record("enum_effects");
        for info in &self.effect_infos {
            if callback(info) == EnumControl::Stop {
                break;
            }
        }
        Ok(())
    }

    fn effect_info(&self, guid: &Guid) -> DiResult<EffectInfo> {
        self.record("effect_info");
        self.effect_infos
            .iter()
            .find(|info| info.guid == *guid)
            .cloned()
            .ok_or(DiError::InvalidParam)
    }

    fn force_feedback_state(&self) -> DiResult<u32> {
        self.record("force_feedback_state");
        Ok(0)
    }

    fn send_force_feedback_command(&self, _command: u32) -> DiResult<()> {
        self.record("send_force_feedback_command");
        Ok(())
    }

    fn enum_created_effects(
        &self,
        _flags: u32,
        _callback: &mut dyn FnMut(&Arc<dyn ForceEffect>) -> EnumControl,
    ) -> DiResult<()> {
        self.record("enum_created_effects");
        Ok(())
    }

    fn escape(&self, _request: &EscapeRequest) -> DiResult<Vec<u8>> {
        self.record("escape");
        Ok(Vec::new())
    }

    fn poll(&self) -> DiResult<()> {
        self.record("poll");
        Ok(())
    }

    fn send_device_data(&self, data: &[ObjectData], _flags: u32) -> DiResult<usize> {
        self.record("send_device_data");
        Ok(data.len())
    }

    fn enum_effects_in_file(
        &self,
        _path: &str,
        _flags: u32,
        _callback: &mut dyn FnMut(&Guid, &EffectDescriptor) -> EnumControl,
    ) -> DiResult<()> {
        self.record("enum_effects_in_file");
        Ok(())
    }

    fn write_effect_to_file(
        &self,
        _path: &str,
        _effects: &[(Guid, EffectDescriptor)],
        _flags: u32,
    ) -> DiResult<()> {
        self.record("write_effect_to_file");
        Ok(())
    }

    fn build_action_map(
        &self,
        _map: &mut ActionMap,
        _user_name: Option<&str>,
        _flags: u32,
    ) -> DiResult<()> {
        self.record("build_action_map");
        Ok(())
    }

    fn set_action_map(
        &self,
        _map: &ActionMap,
        _user_name: Option<&str>,
        _flags: u32,
    ) -> DiResult<()> {
        self.record("set_action_map");
        Ok(())
    }

    fn image_info(&self) -> DiResult<ImageInfo> {
        self.record("image_info");
        Ok(ImageInfo::default())
    }
}

/// Genuine-plugin stand-in handing out [`StubDevice`]s.
pub struct StubPlugin {
    calls: Mutex<Vec<String>>,
    add_refs: AtomicU32,
    releases: AtomicU32,
    device: Arc<StubDevice>,
}

impl StubPlugin {
    /// A plugin whose devices behave per `create_mode`.
    pub fn arc(create_mode: CreateEffectMode) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            add_refs: AtomicU32::new(0),
            releases: AtomicU32::new(0),
            device: StubDevice::arc(create_mode),
        })
    }

    /// The single device this stub hands out.
    pub fn device(&self) -> Arc<StubDevice> {
        self.device.clone()
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of `add_ref` calls forwarded here.
    pub fn add_refs(&self) -> u32 {
        self.add_refs.load(Ordering::SeqCst)
    }

    /// Number of `release` calls forwarded here.
    pub fn releases(&self) -> u32 {
        self.releases.load(Ordering::SeqCst)
    }

    fn record(&self, name: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name.to_string());
        }
    }
}

impl DirectInput8 for StubPlugin {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface> {
        self.record("query_interface");
        if interface_ids::is_plugin_identity(iid) || *iid == interface_ids::UNKNOWN {
            self.add_ref();
            return Ok(Interface::Plugin(self));
        }
        Err(DiError::NoInterface)
    }

    fn add_ref(&self) -> u32 {
        self.add_refs.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn release(&self) -> u32 {
        self.releases.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn create_device(&self, _instance: &Guid) -> DiResult<Arc<dyn InputDevice8>> {
        self.record("create_device");
        Ok(self.device.clone())
    }

    fn enum_devices(
        &self,
        _device_class: u32,
        _flags: u32,
        callback: &mut dyn FnMut(&DeviceInfo) -> EnumControl,
    ) -> DiResult<()> {
        self.record("enum_devices");
        let info = DeviceInfo {
            instance_guid: Guid::new(1, 0, 0, [0; 8]),
            product_guid: Guid::new(2, 0, 0, [0; 8]),
            device_type: 0,
            instance_name: "Stub Wheel".to_string(),
            product_name: "Stub Wheel Product".to_string(),
        };
        let _ = callback(&info);
        Ok(())
    }

    fn device_status(&self, _instance: &Guid) -> DiResult<()> {
        self.record("device_status");
        Ok(())
    }

    fn run_control_panel(&self, _flags: u32) -> DiResult<()> {
        self.record("run_control_panel");
        Ok(())
    }

    fn initialize(&self, _version: u32) -> DiResult<()> {
        self.record("initialize");
        Ok(())
    }

    fn find_device(&self, _device_class: &Guid, _name: &str) -> DiResult<Guid> {
        self.record("find_device");
        Ok(Guid::new(1, 0, 0, [0; 8]))
    }

    fn enum_devices_by_semantics(
        &self,
        _user_name: Option<&str>,
        _map: &ActionMap,
        _flags: u32,
        _callback: &mut dyn FnMut(&DeviceInfo, u32) -> EnumControl,
    ) -> DiResult<()> {
        self.record("enum_devices_by_semantics");
        Ok(())
    }

    fn configure_devices(&self, _flags: u32) -> DiResult<()> {
        self.record("configure_devices");
        Ok(())
    }
}
