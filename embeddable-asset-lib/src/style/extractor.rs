//! Scoped declaration lookup over raw stylesheet text.
//!
//! This is deliberately not a CSS parser. A rule block is the shortest span
//! running from the first occurrence of a selector to the next `}` after a
//! `{`, and a declaration is the shortest span from a property name to the
//! next `;` inside that block. Every pattern is case-insensitive and lets
//! `.` cross line breaks.
//!
//! Known limitations:
//! * nested rule bodies (`@media { h2 { .. } }`) cut the block at the first `}`;
//! * the last declaration of a block is only found when it ends with `;`;
//! * the selector matches anywhere, so `h2` also hits `.h2-title`.

use crate::error::{EmbedError, Result};
use regex::{Regex, RegexBuilder};

const OPTIONAL_WHITESPACE: &str = r"\s*";
const SHORTEST_SPAN: &str = ".*?";
/// Like [`SHORTEST_SPAN`] but swallows a whole `url(...)` token at a time, so
/// a `;` inside `url(data:font/ttf;base64,..)` never ends the scan.
const SHORTEST_SPAN_SKIPPING_URLS: &str = r"(?:url\([^)]*\)|.)*?";

const RULE_OPEN: &str = "{";
const RULE_CLOSE: &str = "}";
const DECLARATION_END: &str = ";";

/// How the end of a declaration is located inside a rule block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TerminatorRule {
    /// Stop at the first `;`, even one embedded in a data URI. Kept for
    /// compatibility with tooling that relied on the raw window.
    FirstSemicolon,
    /// Stop at the first `;` that is not inside a `url(...)` token.
    #[default]
    UrlAware,
}

/// Build `head`, optional whitespace, `open`, shortest span, `close`.
///
/// All literal parts are escaped. An empty `open` yields a pattern that goes
/// straight from `head` into the span.
pub fn scoped_pattern(head: &str, open: &str, span: &str, close: &str) -> Result<Regex> {
    let raw = format!(
        "{}{}{}{}{}",
        regex::escape(head),
        OPTIONAL_WHITESPACE,
        regex::escape(open),
        span,
        regex::escape(close)
    );

    RegexBuilder::new(&raw)
        .case_insensitive(true)
        .multi_line(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| EmbedError::InvalidPattern {
            pattern: raw.clone(),
            message: e.to_string(),
        })
}

/// Shortest-span matcher from `start` to `stop`, used for both rule bodies
/// and asset names.
pub fn range_pattern(start: &str, stop: &str) -> Result<Regex> {
    scoped_pattern(start, "", SHORTEST_SPAN, stop)
}

/// Text of the first rule block opened by `selector`, braces included.
pub fn find_rule_block<'a>(document: &'a str, selector: &str) -> Result<Option<&'a str>> {
    let pattern = scoped_pattern(selector, RULE_OPEN, SHORTEST_SPAN, RULE_CLOSE)?;
    Ok(pattern.find(document).map(|m| m.as_str()))
}

/// Raw `property: value;` text for `property` inside the first `selector`
/// block, using [`TerminatorRule::UrlAware`].
pub fn find_declaration<'a>(
    document: &'a str,
    selector: &str,
    property: &str,
) -> Result<Option<&'a str>> {
    find_declaration_with_rule(document, selector, property, TerminatorRule::default())
}

pub fn find_declaration_with_rule<'a>(
    document: &'a str,
    selector: &str,
    property: &str,
    rule: TerminatorRule,
) -> Result<Option<&'a str>> {
    let Some(block) = find_rule_block(document, selector)? else {
        log::debug!("no rule block for selector `{}`", selector);
        return Ok(None);
    };

    let span = match rule {
        TerminatorRule::FirstSemicolon => SHORTEST_SPAN,
        TerminatorRule::UrlAware => SHORTEST_SPAN_SKIPPING_URLS,
    };
    let pattern = scoped_pattern(property, "", span, DECLARATION_END)?;

    let declaration = pattern.find(block).map(|m| m.as_str());
    if declaration.is_none() {
        log::debug!(
            "selector `{}` has no terminated `{}` declaration",
            selector,
            property
        );
    }
    Ok(declaration)
}
