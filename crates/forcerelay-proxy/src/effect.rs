//! Effect handles: the wrapping proxy and the stand-in fake.
//!
//! Both translate constant-force parameter updates and start/stop calls into
//! actuator commands. [`EffectProxy`] additionally forwards every call to the
//! genuine effect and reports its results unchanged; [`FakeEffect`] answers
//! everything itself with neutral success, so a host running against
//! effect-less hardware keeps its force-feedback code path alive.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use forcerelay_control_protocol::{const_command, stop_command};
use forcerelay_effect_protocol::{
    DecodedEffectParameters, EffectDescriptor, EffectKind, Guid, TypeSpecific,
};

use crate::context::ProxyContext;
use crate::interface::{
    interface_ids, result_label, DiError, DiResult, EscapeRequest, ForceEffect, Interface,
};

/// Trace the decoded parameter envelope the way field logs expect it: one
/// envelope line, one direction line when present, one kind-specific line.
fn trace_parameters(ctx: &ProxyContext, label: &str, decoded: &DecodedEffectParameters) {
    ctx.trace(format_args!(
        "[relay] {label} kind={:?} duration_us={} gain={} trigger={} delay_us={} axes={} declared_len={}",
        decoded.kind,
        decoded.duration_us,
        decoded.gain,
        decoded.trigger_button,
        decoded.start_delay_us,
        decoded.axis_count,
        decoded.declared_payload_len,
    ));
    if let Some(direction) = decoded.first_direction {
        ctx.trace(format_args!("[relay] {label} direction[0]={direction}"));
    }
    match &decoded.type_specific {
        Some(TypeSpecific::Constant(p)) => {
            ctx.trace(format_args!("[relay] {label} constant magnitude={}", p.magnitude));
        }
        Some(TypeSpecific::Ramp(p)) => {
            ctx.trace(format_args!(
                "[relay] {label} ramp start={} end={}",
                p.start, p.end
            ));
        }
        Some(TypeSpecific::Condition(p)) => {
            ctx.trace(format_args!(
                "[relay] {label} condition offset={} pos_coeff={} neg_coeff={} pos_sat={} neg_sat={} dead_band={}",
                p.offset,
                p.positive_coefficient,
                p.negative_coefficient,
                p.positive_saturation,
                p.negative_saturation,
                p.dead_band,
            ));
        }
        Some(TypeSpecific::Periodic(p)) => {
            ctx.trace(format_args!(
                "[relay] {label} periodic magnitude={} offset={} phase={} period_us={}",
                p.magnitude, p.offset, p.phase, p.period_us
            ));
        }
        None => {}
    }
}

/// Shared translation state for one effect handle.
struct Translator {
    kind: EffectKind,
    last_force: Mutex<Option<i32>>,
    ctx: Arc<ProxyContext>,
}

impl Translator {
    fn new(kind: EffectKind, ctx: Arc<ProxyContext>) -> Self {
        Self {
            kind,
            last_force: Mutex::new(None),
            ctx,
        }
    }

    /// Decode, trace, and for constant-force effects cache the magnitude and
    /// emit the corresponding actuator command.
    fn on_set_parameters(&self, label: &str, descriptor: &EffectDescriptor) {
        let decoded = DecodedEffectParameters::decode(self.kind, descriptor);
        trace_parameters(&self.ctx, label, &decoded);
        if self.kind != EffectKind::ConstantForce {
            return;
        }
        if let Some(magnitude) = decoded.constant_magnitude() {
            if let Ok(mut last) = self.last_force.lock() {
                *last = Some(magnitude);
            }
            self.ctx.channel.send(&const_command(magnitude));
        }
    }

    /// Re-emit the cached magnitude when a constant-force effect starts.
    fn on_start(&self, label: &str, iterations: u32, flags: u32) {
        self.ctx.trace(format_args!(
            "[relay] {label} Start iterations={iterations} flags={flags:#x}"
        ));
        if self.kind != EffectKind::ConstantForce {
            return;
        }
        let cached = self.last_force.lock().ok().and_then(|last| *last);
        if let Some(magnitude) = cached {
            self.ctx.channel.send(&const_command(magnitude));
        }
    }

    /// Emit a stop command when a constant-force effect stops.
    fn on_stop(&self, label: &str) {
        self.ctx.trace(format_args!("[relay] {label} Stop"));
        if self.kind == EffectKind::ConstantForce {
            self.ctx.channel.send(&stop_command());
        }
    }
}

/// Proxy around a genuine effect handle.
///
/// Holds its own reference count and mirrors every `add_ref`/`release` onto
/// the wrapped handle; the proxy is dropped when its own count reaches zero,
/// which is when the last host reference is gone.
pub struct EffectProxy {
    refs: AtomicU32,
    real: Arc<dyn ForceEffect>,
    guid: Guid,
    translator: Translator,
}

impl EffectProxy {
    /// Wrap a genuine effect created with the given identity.
    pub fn new(
        real: Arc<dyn ForceEffect>,
        guid: Guid,
        ctx: Arc<ProxyContext>,
    ) -> Arc<Self> {
        let kind = EffectKind::from_guid(&guid);
        ctx.trace(format_args!(
            "[relay] EffectProxy created guid={guid} kind={kind:?}"
        ));
        Arc::new(Self {
            refs: AtomicU32::new(1),
            real,
            guid,
            translator: Translator::new(kind, ctx),
        })
    }

    /// The effect kind this proxy translates for.
    pub fn kind(&self) -> EffectKind {
        self.translator.kind
    }

    /// The proxy's own reference count.
    pub fn ref_count(&self) -> u32 {
        self.refs.load(Ordering::SeqCst)
    }
}

impl ForceEffect for EffectProxy {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface> {
        if interface_ids::is_effect_identity(iid) || *iid == interface_ids::UNKNOWN {
            self.add_ref();
            return Ok(Interface::Effect(self));
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

    fn initialize(&self, version: u32, guid: &Guid) -> DiResult<()> {
        self.real.initialize(version, guid)
    }

    fn effect_guid(&self) -> DiResult<Guid> {
        self.real.effect_guid()
    }

    fn parameters(&self, flags: u32) -> DiResult<EffectDescriptor> {
        self.real.parameters(flags)
    }

    fn set_parameters(&self, descriptor: Option<&EffectDescriptor>, flags: u32) -> DiResult<()> {
        if let Some(descriptor) = descriptor {
            self.translator.on_set_parameters("SetParameters", descriptor);
        } else {
            self.translator
                .ctx
                .trace(format_args!("[relay] SetParameters descriptor=null"));
        }
        let result = self.real.set_parameters(descriptor, flags);
        self.translator.ctx.trace(format_args!(
            "[relay] SetParameters forwarded result={}",
            result_label(&result)
        ));
        result
    }

    fn start(&self, iterations: u32, flags: u32) -> DiResult<()> {
        self.translator.on_start("EffectProxy", iterations, flags);
        self.real.start(iterations, flags)
    }

    fn stop(&self) -> DiResult<()> {
        self.translator.on_stop("EffectProxy");
        self.real.stop()
    }

    fn status(&self) -> DiResult<u32> {
        self.real.status()
    }

    fn download(&self) -> DiResult<()> {
        self.real.download()
    }

    fn unload(&self) -> DiResult<()> {
        self.real.unload()
    }

    fn escape(&self, request: &EscapeRequest) -> DiResult<Vec<u8>> {
        self.real.escape(request)
    }
}

/// Stand-in effect for hardware that refused to create one.
///
/// Performs the same translation side effects as [`EffectProxy`] and answers
/// every operation with neutral success, so the host cannot tell the
/// difference between genuine and absent effect support.
pub struct FakeEffect {
    refs: AtomicU32,
    guid: Guid,
    translator: Translator,
}

impl FakeEffect {
    /// Create a stand-in for the given effect identity.
    pub fn new(guid: Guid, ctx: Arc<ProxyContext>) -> Arc<Self> {
        let kind = EffectKind::from_guid(&guid);
        ctx.trace(format_args!(
            "[relay] FakeEffect created guid={guid} kind={kind:?}"
        ));
        Arc::new(Self {
            refs: AtomicU32::new(1),
            guid,
            translator: Translator::new(kind, ctx),
        })
    }

    /// The effect kind this fake translates for.
    pub fn kind(&self) -> EffectKind {
        self.translator.kind
    }

    /// The fake's reference count.
    pub fn ref_count(&self) -> u32 {
        self.refs.load(Ordering::SeqCst)
    }
}

impl ForceEffect for FakeEffect {
    fn query_interface(self: Arc<Self>, iid: &Guid) -> DiResult<Interface> {
        if interface_ids::is_effect_identity(iid) || *iid == interface_ids::UNKNOWN {
            self.add_ref();
            return Ok(Interface::Effect(self));
        }
        Err(DiError::NoInterface)
    }

    fn add_ref(&self) -> u32 {
        self.refs.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn release(&self) -> u32 {
        crate::refcount::release(&self.refs)
    }

    fn initialize(&self, _version: u32, _guid: &Guid) -> DiResult<()> {
        Ok(())
    }

    fn effect_guid(&self) -> DiResult<Guid> {
        Ok(self.guid)
    }

    fn parameters(&self, _flags: u32) -> DiResult<EffectDescriptor> {
        Ok(EffectDescriptor::default())
    }

    fn set_parameters(&self, descriptor: Option<&EffectDescriptor>, _flags: u32) -> DiResult<()> {
        if let Some(descriptor) = descriptor {
            self.translator.on_set_parameters("FakeEffect SetParameters", descriptor);
        } else {
            self.translator
                .ctx
                .trace(format_args!("[relay] FakeEffect SetParameters descriptor=null"));
        }
        Ok(())
    }

    fn start(&self, iterations: u32, flags: u32) -> DiResult<()> {
        self.translator.on_start("FakeEffect", iterations, flags);
        Ok(())
    }

    fn stop(&self) -> DiResult<()> {
        self.translator.on_stop("FakeEffect");
        Ok(())
    }

    fn status(&self) -> DiResult<u32> {
        Ok(0)
    }

    fn download(&self) -> DiResult<()> {
        Ok(())
    }

    fn unload(&self) -> DiResult<()> {
        Ok(())
    }

    fn escape(&self, _request: &EscapeRequest) -> DiResult<Vec<u8>> {
        Err(DiError::Unsupported)
    }
}
