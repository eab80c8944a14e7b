use crate::config::EmbedMode;
use crate::error::Result;

/// Legacy fragment appended to linked references only.
pub const IEFIX_FRAGMENT: &str = "#iefix";

/// Looks up how an asset is served and what its inline form is.
///
/// Failures are reported as [`crate::EmbedError::CollaboratorFailure`].
pub trait AssetResolver {
    /// Public URL of the asset, e.g. `/assets/dog.jpg`.
    fn resolved_path(&self, asset_name: &str) -> Result<String>;

    /// `data:<type>;base64,<bytes>` for the asset.
    fn data_uri(&self, asset_name: &str) -> Result<String>;
}

/// CSS `url(...)` expression for `asset_name` under `mode`.
pub fn embeddable_asset_url<R>(resolver: &R, asset_name: &str, mode: EmbedMode) -> Result<String>
where
    R: AssetResolver + ?Sized,
{
    let expression = match mode {
        EmbedMode::Embedded => format!("url({})", resolver.data_uri(asset_name)?),
        EmbedMode::Linked => format!("url({}{})", resolver.resolved_path(asset_name)?, IEFIX_FRAGMENT),
    };
    log::debug!("rewrote `{}` as {} reference", asset_name, mode);
    Ok(expression)
}

/// Alias kept for stylesheets written against the image-specific helper name.
pub fn embeddable_image_url<R>(resolver: &R, asset_name: &str, mode: EmbedMode) -> Result<String>
where
    R: AssetResolver + ?Sized,
{
    embeddable_asset_url(resolver, asset_name, mode)
}

/// The rewrite capability as a service handed to a template host.
pub struct AssetRewriter {
    resolver: Box<dyn AssetResolver>,
}

impl AssetRewriter {
    pub fn new<R: AssetResolver + 'static>(resolver: R) -> Self {
        AssetRewriter {
            resolver: Box::new(resolver),
        }
    }

    pub fn rewrite(&self, asset_name: &str, mode: EmbedMode) -> Result<String> {
        embeddable_asset_url(self.resolver.as_ref(), asset_name, mode)
    }

    /// Served path without the legacy fragment and never inlined.
    pub fn asset_path(&self, asset_name: &str) -> Result<String> {
        self.resolver.resolved_path(asset_name)
    }
}

impl std::fmt::Debug for AssetRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetRewriter").finish_non_exhaustive()
    }
}
