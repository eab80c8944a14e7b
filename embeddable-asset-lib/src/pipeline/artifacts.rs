use crate::error::{EmbedError, Result};
use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};

/// Base name every compiled bundle starts with.
pub const BUNDLE_STEM: &str = "application";

fn file_name_matcher(pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| EmbedError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// First file (by name) in `dir` whose file name matches `pattern`.
pub fn find_compiled_artifact(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    Ok(list_compiled_artifacts(dir, pattern)?.into_iter().next())
}

/// Every file in `dir` whose file name matches `pattern`, sorted by name.
///
/// A missing directory is treated like an empty one.
pub fn list_compiled_artifacts(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = file_name_matcher(pattern)?;
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(EmbedError::io(dir, e)),
    };

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EmbedError::io(dir, e))?;
        let path = entry.path();
        let is_match = path
            .file_name()
            .map(|name| matcher.is_match(Path::new(name)))
            .unwrap_or(false);
        if is_match && path.is_file() {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches)
}

/// Names the builder writes: `<stem>-<16 hex digits>` with an optional extension.
fn fingerprint_matcher() -> Result<GlobSet> {
    let digest = "[0-9a-f]".repeat(16);
    let mut builder = GlobSetBuilder::new();
    for pattern in [format!("*-{}", digest), format!("*-{}.*", digest)] {
        let glob = Glob::new(&pattern).map_err(|e| EmbedError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| EmbedError::InvalidPattern {
        pattern: "fingerprinted output".to_string(),
        message: e.to_string(),
    })
}

/// Fingerprinted files directly inside `dir`, sorted by name.
///
/// Subdirectories and files without a fingerprint are never listed.
pub fn list_fingerprinted_outputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let matcher = fingerprint_matcher()?;
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(EmbedError::io(dir, e)),
    };

    let mut outputs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EmbedError::io(dir, e))?.path();
        let fingerprinted = path
            .file_name()
            .map(|name| matcher.is_match(Path::new(name)))
            .unwrap_or(false);
        if fingerprinted && path.is_file() {
            outputs.push(path);
        }
    }
    outputs.sort();
    Ok(outputs)
}

pub fn bundle_pattern(extension: &str) -> String {
    format!("{}*.{}", BUNDLE_STEM, extension)
}

/// Contents of the first `application*.<extension>` file in `dir`.
pub fn read_compiled_asset(dir: &Path, extension: &str) -> Result<Option<String>> {
    let pattern = bundle_pattern(extension);
    let Some(path) = find_compiled_artifact(dir, &pattern)? else {
        log::debug!("no {} under {}", pattern, dir.display());
        return Ok(None);
    };
    fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| EmbedError::io(path, e))
}

pub fn read_compiled_stylesheet(dir: &Path) -> Result<Option<String>> {
    read_compiled_asset(dir, "css")
}

pub fn read_compiled_script(dir: &Path) -> Result<Option<String>> {
    read_compiled_asset(dir, "js")
}
