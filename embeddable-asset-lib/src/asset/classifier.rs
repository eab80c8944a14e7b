use crate::asset::reference::AssetReference;
use crate::config::EmbedMode;
use crate::error::Result;
use crate::style::extractor;

pub const EMBEDDED_DATA_URL_PREFIX: &str = "url(data:";

/// `Embedded` when the value is an inline data URI, `Linked` otherwise.
pub fn classify(value: &str) -> EmbedMode {
    if value.starts_with(EMBEDDED_DATA_URL_PREFIX) {
        EmbedMode::Embedded
    } else {
        EmbedMode::Linked
    }
}

/// True if `value` still names the asset file: its name followed, anywhere
/// later, by its extension. Fingerprinted paths such as
/// `/assets/dog-3f2a.jpg` therefore match `dog.jpg`.
pub fn matches_asset(value: &str, asset: &AssetReference) -> Result<bool> {
    let pattern = extractor::range_pattern(&asset.name, &asset.extension)?;
    Ok(pattern.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_is_embedded() {
        assert_eq!(classify("url(data:image/jpeg;base64,/9j/)"), EmbedMode::Embedded);
    }

    #[test]
    fn test_paths_are_linked() {
        assert_eq!(classify("url(duck.jpg#iefix)"), EmbedMode::Linked);
        assert_eq!(classify("url(\"data:image/png;base64,AA\")"), EmbedMode::Linked);
        assert_eq!(classify(" url(data:x)"), EmbedMode::Linked);
    }

    #[test]
    fn test_matches_fingerprinted_path() {
        let dog = AssetReference::parse("dog.jpg");
        assert!(matches_asset("url(/assets/dog-9c1e77.jpg#iefix)", &dog).unwrap());
        assert!(matches_asset("url(/ASSETS/DOG.JPG)", &dog).unwrap());
    }

    #[test]
    fn test_does_not_match_other_asset() {
        let dog = AssetReference::parse("dog.jpg");
        assert!(!matches_asset("url(/assets/duck.jpg#iefix)", &dog).unwrap());
        assert!(!matches_asset("url(/assets/dog.png)", &dog).unwrap());
    }

    #[test]
    fn test_data_uri_does_not_match_asset_name() {
        let font = AssetReference::parse("chopin_script.ttf");
        assert!(!matches_asset("url(data:font/ttf;base64,AAEAAAALAIAAAwAw)", &font).unwrap());
    }
}
