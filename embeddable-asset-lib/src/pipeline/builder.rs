//! Minimal stylesheet build: copies every source file into the output
//! directory under a fingerprinted name, expanding helper tags in `.erb`
//! templates on the way.
//!
//! Recognised tags:
//!
//! ```text
//! <%= embeddable_asset('chopin_script.ttf') %>   url(data:..) or url(/assets/..#iefix)
//! <%= embeddable_image('dog.jpg') %>             same as embeddable_asset
//! <%= asset_path('duck.jpg') %>                  /assets/duck.jpg, never inlined
//! ```

use crate::asset::rewriter::AssetRewriter;
use crate::config::EmbedMode;
use crate::error::{EmbedError, Result};
use crate::pipeline::artifacts::list_fingerprinted_outputs;
use crate::pipeline::{BuildCollaborator, TemplateHost};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

const TEMPLATE_EXTENSION: &str = ".erb";

pub const EMBEDDABLE_ASSET_HELPER: &str = "embeddable_asset";
pub const EMBEDDABLE_IMAGE_HELPER: &str = "embeddable_image";
pub const ASSET_PATH_HELPER: &str = "asset_path";

static HELPER_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<%=\s*(\w+)\s*\(\s*['"]([^'"]+)['"]\s*\)\s*%>"#).expect("helper tag pattern")
});

#[derive(Debug)]
pub struct StylesheetBuilder {
    source_dir: PathBuf,
    output_dir: PathBuf,
    helpers: Option<AssetRewriter>,
}

impl StylesheetBuilder {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        StylesheetBuilder {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            helpers: None,
        }
    }

    pub fn has_helpers(&self) -> bool {
        self.helpers.is_some()
    }

    /// Expand every helper tag in `template` for `mode`.
    pub fn render(&self, template: &str, mode: EmbedMode) -> Result<String> {
        let Some(rewriter) = &self.helpers else {
            return Ok(template.to_string());
        };

        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;
        for caps in HELPER_TAG.captures_iter(template) {
            let Some(tag) = caps.get(0) else { continue };
            rendered.push_str(&template[last..tag.start()]);
            rendered.push_str(&expand_tag(rewriter, &caps, mode)?);
            last = tag.end();
        }
        rendered.push_str(&template[last..]);
        Ok(rendered)
    }

    fn source_files(&self) -> Result<Vec<PathBuf>> {
        let entries =
            fs::read_dir(&self.source_dir).map_err(|e| EmbedError::io(&self.source_dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| EmbedError::io(&self.source_dir, e))?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn compile_file(&self, source: &Path, mode: EmbedMode) -> Result<PathBuf> {
        let file_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                EmbedError::collaborator("build", format!("unusable file name {}", source.display()))
            })?;
        let bytes = fs::read(source).map_err(|e| EmbedError::io(source, e))?;

        // Only templates are text; images and fonts are copied byte for byte.
        let (logical_name, compiled) = match file_name.strip_suffix(TEMPLATE_EXTENSION) {
            Some(stripped) => {
                let template = String::from_utf8(bytes).map_err(|e| {
                    EmbedError::io(source, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })?;
                (stripped, self.render(&template, mode)?.into_bytes())
            }
            None => (file_name, bytes),
        };

        let target = self.output_dir.join(fingerprinted_name(logical_name, &compiled));
        fs::write(&target, &compiled).map_err(|e| EmbedError::io(&target, e))?;
        log::debug!("compiled {} -> {}", source.display(), target.display());
        Ok(target)
    }
}

fn expand_tag(rewriter: &AssetRewriter, caps: &Captures<'_>, mode: EmbedMode) -> Result<String> {
    let whole = &caps[0];
    let helper = &caps[1];
    let asset = &caps[2];
    match helper {
        EMBEDDABLE_ASSET_HELPER | EMBEDDABLE_IMAGE_HELPER => rewriter.rewrite(asset, mode),
        ASSET_PATH_HELPER => rewriter.asset_path(asset),
        _ => {
            log::warn!("unknown helper `{}`, leaving `{}` as is", helper, whole);
            Ok(whole.to_string())
        }
    }
}

/// `application.css` + content -> `application-<xxh3>.css`.
fn fingerprinted_name(logical_name: &str, contents: &[u8]) -> String {
    let digest = xxh3_64(contents);
    match logical_name.split_once('.') {
        Some((stem, extension)) => format!("{}-{:016x}.{}", stem, digest, extension),
        None => format!("{}-{:016x}", logical_name, digest),
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

impl TemplateHost for StylesheetBuilder {
    fn attach_asset_helpers(&mut self, rewriter: AssetRewriter) {
        self.helpers = Some(rewriter);
    }
}

impl BuildCollaborator for StylesheetBuilder {
    fn compile(&mut self, mode: EmbedMode) -> Result<()> {
        if same_directory(&self.source_dir, &self.output_dir) {
            return Err(EmbedError::collaborator(
                "build",
                format!("output directory {} is the source directory", self.output_dir.display()),
            ));
        }
        self.clean()?;
        fs::create_dir_all(&self.output_dir).map_err(|e| EmbedError::io(&self.output_dir, e))?;

        let sources = self.source_files()?;
        for source in &sources {
            self.compile_file(source, mode)?;
        }
        log::info!(
            "compiled {} file(s) into {} ({} assets)",
            sources.len(),
            self.output_dir.display(),
            mode
        );
        Ok(())
    }

    /// Removes the fingerprinted files a previous compile wrote and nothing else.
    fn clean(&mut self) -> Result<()> {
        let outputs = list_fingerprinted_outputs(&self.output_dir)?;
        for output in &outputs {
            fs::remove_file(output).map_err(|e| EmbedError::io(output, e))?;
        }
        if !outputs.is_empty() {
            log::debug!("removed {} output(s) from {}", outputs.len(), self.output_dir.display());
        }
        Ok(())
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
