use crate::error::{EmbedError, Result};
use crate::style::extractor::{self, TerminatorRule};

const PROPERTY_SEPARATOR: char = ':';
const DECLARATION_END: char = ';';

/// Turn a raw `property: value;` slice into its value.
///
/// Splits on the first `:` only, since values such as `url(data:...)` carry
/// their own colons, then drops one trailing `;` and trims.
pub fn resolve_value(declaration: &str) -> Result<String> {
    let Some((_, value)) = declaration.split_once(PROPERTY_SEPARATOR) else {
        return Err(EmbedError::MalformedValue {
            declaration: declaration.to_string(),
        });
    };

    let value = value.strip_suffix(DECLARATION_END).unwrap_or(value).trim();
    if value.is_empty() {
        return Err(EmbedError::MalformedValue {
            declaration: declaration.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Value of `property` inside the first `selector` rule of `document`.
///
/// `Ok(None)` when the selector or the property is absent.
pub fn get_property_value(
    document: &str,
    selector: &str,
    property: &str,
) -> Result<Option<String>> {
    get_property_value_with_rule(document, selector, property, TerminatorRule::default())
}

pub fn get_property_value_with_rule(
    document: &str,
    selector: &str,
    property: &str,
    rule: TerminatorRule,
) -> Result<Option<String>> {
    extractor::find_declaration_with_rule(document, selector, property, rule)?
        .map(resolve_value)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_splits_on_first_colon_only() {
        let value = resolve_value("src: url(data:font/ttf;base64,AAAA==);").unwrap();
        assert_eq!(value, "url(data:font/ttf;base64,AAAA==)");
    }

    #[test]
    fn test_resolve_strips_single_semicolon_and_whitespace() {
        assert_eq!(resolve_value("color :  red ;").unwrap(), "red");
        assert_eq!(resolve_value("color:red;;").unwrap(), "red;");
    }

    #[test]
    fn test_resolve_without_colon_is_malformed() {
        let err = resolve_value("color red;").unwrap_err();
        assert!(matches!(err, EmbedError::MalformedValue { .. }));
    }

    #[test]
    fn test_resolve_empty_value_is_malformed() {
        let err = resolve_value("color: ;").unwrap_err();
        assert!(matches!(err, EmbedError::MalformedValue { .. }));
    }

    #[test]
    fn test_linked_value_from_document() {
        let doc = "h2{background-image:url(duck.jpg#iefix);}";
        let value = get_property_value(doc, "h2", "background-image").unwrap();
        assert_eq!(value.as_deref(), Some("url(duck.jpg#iefix)"));
    }

    #[test]
    fn test_data_uri_value_keeps_base64_segment() {
        let doc = "@font-face{src:url(data:font/ttf;base64,AAAA==);}";
        let value = get_property_value(doc, "@font-face", "src").unwrap();
        assert_eq!(value.as_deref(), Some("url(data:font/ttf;base64,AAAA==)"));
    }

    #[test]
    fn test_first_semicolon_rule_truncates_data_uri() {
        let doc = "@font-face{src:url(data:font/ttf;base64,AAAA==);}";
        let value =
            get_property_value_with_rule(doc, "@font-face", "src", TerminatorRule::FirstSemicolon)
                .unwrap();
        assert_eq!(value.as_deref(), Some("url(data:font/ttf"));
    }

    #[test]
    fn test_absent_property_is_none() {
        let doc = "h2{color:red;}";
        assert_eq!(get_property_value(doc, "h2", "margin").unwrap(), None);
        assert_eq!(get_property_value(doc, "h3", "color").unwrap(), None);
    }

    #[test]
    fn test_repeated_lookups_are_identical() {
        let doc = "h2{color:red;} p{color:blue;}";
        let first = get_property_value(doc, "p", "color").unwrap();
        let second = get_property_value(doc, "p", "color").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("blue"));
    }
}
