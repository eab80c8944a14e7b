use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical asset identity, e.g. `dog` + `.jpg`.
///
/// The name is split at the first `.`, so `jquery.min.js` becomes
/// `jquery` + `.min.js`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetReference {
    pub name: String,
    /// Includes the leading dot; empty when the asset has no extension.
    pub extension: String,
}

impl AssetReference {
    pub fn parse(asset: &str) -> Self {
        match asset.find('.') {
            Some(dot) => AssetReference {
                name: asset[..dot].to_string(),
                extension: asset[dot..].to_string(),
            },
            None => AssetReference {
                name: asset.to_string(),
                extension: String::new(),
            },
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }

    /// Last extension segment without the dot, lowercased.
    pub fn kind(&self) -> String {
        self.extension
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
}

impl From<&str> for AssetReference {
    fn from(asset: &str) -> Self {
        AssetReference::parse(asset)
    }
}

impl TryFrom<String> for AssetReference {
    type Error = String;

    fn try_from(asset: String) -> Result<Self, Self::Error> {
        if asset.trim().is_empty() {
            return Err("asset name must not be empty".to_string());
        }
        Ok(AssetReference::parse(&asset))
    }
}

impl From<AssetReference> for String {
    fn from(asset: AssetReference) -> Self {
        asset.file_name()
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.extension)
    }
}
