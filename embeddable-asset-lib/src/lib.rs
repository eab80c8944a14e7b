//! Decide, per asset referenced from a compiled stylesheet, whether it is
//! inlined as a base64 data URI or linked by path, and check that decision by
//! re-reading the compiled output.

pub mod asset;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod style;
pub mod verify;

pub use asset::classifier::{classify, matches_asset};
pub use asset::reference::AssetReference;
pub use asset::rewriter::{embeddable_asset_url, embeddable_image_url, AssetResolver, AssetRewriter};
pub use config::{EmbedConfig, EmbedMode};
pub use error::{EmbedError, Result};
pub use style::{get_property_value, TerminatorRule};
