//! Entry-point wrapping: where the genuine plugin handle first meets the
//! proxy layer.
//!
//! The host asks the entry point for an interface identity; only the two
//! plugin-factory identities get the interception treatment. Any other
//! identity is handed the genuine handle untouched, so exotic hosts lose
//! relay functionality but keep working.

use std::sync::Arc;

use forcerelay_effect_protocol::Guid;
use tracing::{debug, info};

use crate::context::ProxyContext;
use crate::interface::{interface_ids, DiResult, DirectInput8};
use crate::plugin::PluginProxy;

/// Wrap an already-created genuine factory, if the requested identity is one
/// the proxy layer serves.
pub fn wrap_plugin(
    real: Arc<dyn DirectInput8>,
    requested_iid: &Guid,
    ctx: Arc<ProxyContext>,
) -> Arc<dyn DirectInput8> {
    if interface_ids::is_plugin_identity(requested_iid) {
        info!(iid = %requested_iid, "wrapping plugin handle");
        ctx.trace(format_args!(
            "[relay] wrapping plugin handle iid={requested_iid}"
        ));
        PluginProxy::new(real, ctx)
    } else {
        debug!(iid = %requested_iid, "unrecognized identity, passing genuine handle through");
        ctx.trace(format_args!(
            "[relay] unrecognized iid={requested_iid}; passing genuine handle through"
        ));
        real
    }
}

/// Run the genuine entry point and wrap its result.
///
/// # Errors
///
/// The loader's failure, unchanged.
pub fn create_plugin(
    loader: impl FnOnce() -> DiResult<Arc<dyn DirectInput8>>,
    requested_iid: &Guid,
    ctx: Arc<ProxyContext>,
) -> DiResult<Arc<dyn DirectInput8>> {
    let real = loader()?;
    Ok(wrap_plugin(real, requested_iid, ctx))
}
