//! Shared per-process state for the proxy layer.

use std::fmt;
use std::sync::Arc;

use forcerelay_channel::{CommandSink, UdpCommandChannel};
use forcerelay_diagnostic::TraceSink;

/// Everything the proxies share: the trace sink and the actuator channel.
/// One context is created when the plugin is wrapped and cloned by handle
/// into every proxy object.
pub struct ProxyContext {
    /// Field trace sink.
    pub sink: Arc<TraceSink>,
    /// Actuator command channel.
    pub channel: Arc<dyn CommandSink>,
}

impl ProxyContext {
    /// Build a context from explicit parts.
    pub fn new(sink: Arc<TraceSink>, channel: Arc<dyn CommandSink>) -> Arc<Self> {
        Arc::new(Self { sink, channel })
    }

    /// Build the production context from the process environment.
    pub fn from_env() -> Arc<Self> {
        Self::new(
            Arc::new(TraceSink::from_env()),
            Arc::new(UdpCommandChannel::from_env()),
        )
    }

    /// Append one formatted trace line.
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.sink.log_fmt(args);
    }
}
