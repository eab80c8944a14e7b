use crate::asset::reference::AssetReference;
use crate::asset::rewriter::AssetResolver;
use crate::error::{EmbedError, Result};
use base64::Engine;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_URL_PREFIX: &str = "/assets";
const COLLABORATOR: &str = "asset resolver";

/// Resolves asset names against a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryAssetResolver {
    root: PathBuf,
    url_prefix: String,
}

impl DirectoryAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryAssetResolver {
            root: root.into(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        }
    }

    pub fn with_url_prefix(mut self, prefix: &str) -> Self {
        self.url_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, asset_name: &str) -> Result<PathBuf> {
        let relative = Path::new(asset_name);
        let escapes_root = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if asset_name.is_empty() || escapes_root {
            return Err(EmbedError::collaborator(
                COLLABORATOR,
                format!("`{}` is not a relative asset name", asset_name),
            ));
        }

        let path = self.root.join(relative);
        if !path.is_file() {
            return Err(EmbedError::collaborator(
                COLLABORATOR,
                format!("asset `{}` not found under {}", asset_name, self.root.display()),
            ));
        }
        Ok(path)
    }
}

impl AssetResolver for DirectoryAssetResolver {
    fn resolved_path(&self, asset_name: &str) -> Result<String> {
        self.locate(asset_name)?;
        Ok(format!("{}/{}", self.url_prefix, asset_name))
    }

    fn data_uri(&self, asset_name: &str) -> Result<String> {
        let path = self.locate(asset_name)?;
        let bytes = fs::read(&path).map_err(|e| {
            EmbedError::collaborator(COLLABORATOR, format!("reading {}: {}", path.display(), e))
        })?;
        let media_type = media_type_for(&AssetReference::parse(asset_name));

        let mut encoded = String::with_capacity(base64::encoded_len(bytes.len(), true).unwrap_or(0) + 30);
        encoded.push_str("data:");
        encoded.push_str(media_type);
        encoded.push_str(";base64,");
        base64::engine::general_purpose::STANDARD.encode_string(&bytes, &mut encoded);
        Ok(encoded)
    }
}

/// Media type for the asset's final extension.
pub fn media_type_for(asset: &AssetReference) -> &'static str {
    match asset.kind().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "eot" => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}
