pub mod artifacts;
pub mod builder;

use crate::asset::rewriter::AssetRewriter;
use crate::config::EmbedMode;
use crate::error::Result;
use std::path::Path;

/// Something that compiles source stylesheets/scripts into the output
/// directory. Each call runs to completion before returning.
pub trait BuildCollaborator {
    fn compile(&mut self, mode: EmbedMode) -> Result<()>;

    /// Remove every compiled artifact.
    fn clean(&mut self) -> Result<()>;

    /// Directory the compiled bundles are written to.
    fn output_dir(&self) -> &Path;
}

/// A rendering context that can be handed the rewrite helpers.
pub trait TemplateHost {
    fn attach_asset_helpers(&mut self, rewriter: AssetRewriter);
}

/// Attach `rewriter` to `host`. Without a host the helpers stay inactive for
/// this run and a warning is logged; this is never an error.
pub fn initialize_helpers<H>(host: Option<&mut H>, rewriter: AssetRewriter) -> bool
where
    H: TemplateHost + ?Sized,
{
    match host {
        Some(host) => {
            host.attach_asset_helpers(rewriter);
            true
        }
        None => {
            log::warn!(
                "Unable to initialize embeddable asset helpers: no template host is available. \
                 Assets will not be rewritten for this run."
            );
            false
        }
    }
}
