use embeddable_asset_lib::asset::DirectoryAssetResolver;
use embeddable_asset_lib::pipeline::builder::StylesheetBuilder;
use embeddable_asset_lib::pipeline::{initialize_helpers, BuildCollaborator};
use embeddable_asset_lib::verify::{
    ArtifactCheck, AssetExpectation, ExpectationKind, VerificationHarness, VerificationPlan,
};
use embeddable_asset_lib::{AssetRewriter, EmbedError, EmbedMode, Result};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const APPLICATION_CSS: &str = r#"h2 {
  color: #333;
  background-image: url(<%= asset_path('duck.jpg') %>#iefix);
}
html {
  background-image: <%= embeddable_image('dog.jpg') %>;
}
@font-face {
  font-family: 'Chopin Script';
  src: <%= embeddable_asset('chopin_script.ttf') %>;
}
"#;

const APPLICATION_JS: &str = "function doAwesomeStuff() { return 42; }\n";

struct DummyApp {
    _root: TempDir,
    source: PathBuf,
    assets: PathBuf,
    output: PathBuf,
}

fn dummy_app() -> DummyApp {
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("app");
    let assets = root.path().join("assets");
    let output = root.path().join("public").join("assets");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&assets).unwrap();

    fs::write(source.join("application.css.erb"), APPLICATION_CSS).unwrap();
    fs::write(source.join("application.js"), APPLICATION_JS).unwrap();
    fs::write(assets.join("dog.jpg"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();
    fs::write(assets.join("duck.jpg"), [0xff, 0xd8, 0xff, 0xe1]).unwrap();
    fs::write(assets.join("chopin_script.ttf"), b"\x00\x01\x00\x00").unwrap();

    DummyApp {
        _root: root,
        source,
        assets,
        output,
    }
}

fn plan() -> VerificationPlan {
    VerificationPlan {
        expectations: vec![
            AssetExpectation::new("h2", "background-image", "duck.jpg", ExpectationKind::AlwaysLinked),
            AssetExpectation::new("@font-face", "src", "chopin_script.ttf", ExpectationKind::FollowsMode),
            AssetExpectation::new("html", "background-image", "dog.jpg", ExpectationKind::FollowsMode),
        ],
        artifact_checks: vec![
            ArtifactCheck::Contains {
                extension: "css".to_string(),
                needle: "h2".to_string(),
            },
            ArtifactCheck::Contains {
                extension: "js".to_string(),
                needle: "doAwesomeStuff".to_string(),
            },
            ArtifactCheck::ParsesAsCss,
        ],
    }
}

fn builder_for(app: &DummyApp) -> StylesheetBuilder {
    let mut builder = StylesheetBuilder::new(&app.source, &app.output);
    let rewriter = AssetRewriter::new(DirectoryAssetResolver::new(&app.assets));
    assert!(initialize_helpers(Some(&mut builder), rewriter));
    builder
}

#[test]
fn test_both_toggle_orders_pass() {
    let app = dummy_app();
    let mut harness = VerificationHarness::new(builder_for(&app), plan());

    let report = harness.run_all().unwrap();

    let failures: Vec<_> = report.failures().collect();
    assert!(failures.is_empty(), "{:#?}", failures);
    // 2 scenarios x 2 rounds x (1 bundle check + 3 artifact checks + 3 expectations)
    assert_eq!(report.outcomes.len(), 28);
    let leftovers = fs::read_dir(&app.output).map(|dir| dir.count()).unwrap_or(0);
    assert_eq!(leftovers, 0, "outputs are cleaned after each scenario");
}

#[test]
fn test_rounds_alternate_modes() {
    let app = dummy_app();
    let mut harness = VerificationHarness::new(builder_for(&app), plan());

    let report = harness.run(EmbedMode::Linked).unwrap();

    let modes: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| o.description.contains("dog.jpg"))
        .map(|o| (o.round, o.mode))
        .collect();
    assert_eq!(modes, vec![(1, EmbedMode::Linked), (2, EmbedMode::Embedded)]);
    assert!(report.is_success());
}

#[test]
fn test_without_helpers_embedding_is_not_observed() {
    let app = dummy_app();
    let builder = StylesheetBuilder::new(&app.source, &app.output);
    let mut harness = VerificationHarness::new(builder, plan());

    let report = harness.run(EmbedMode::Embedded).unwrap();

    assert!(!report.is_success());
    assert!(report
        .failures()
        .any(|o| o.description.starts_with("embeds asset 'dog.jpg'")));
}

/// Writes one bundle per mode and never removes the previous one.
struct LeakyBuilder {
    output: PathBuf,
}

impl BuildCollaborator for LeakyBuilder {
    fn compile(&mut self, mode: EmbedMode) -> Result<()> {
        fs::create_dir_all(&self.output).unwrap();
        let value = match mode {
            EmbedMode::Embedded => "url(data:image/jpeg;base64,/9j/4A==)",
            EmbedMode::Linked => "url(/assets/dog.jpg#iefix)",
        };
        let name = format!("application-{}.css", mode);
        fs::write(self.output.join(name), format!("html{{background-image:{};}}", value)).unwrap();
        Ok(())
    }

    fn clean(&mut self) -> Result<()> {
        if self.output.exists() {
            fs::remove_dir_all(&self.output).unwrap();
        }
        Ok(())
    }

    fn output_dir(&self) -> &Path {
        &self.output
    }
}

#[test]
fn test_residue_from_previous_build_is_reported() {
    let root = tempfile::tempdir().unwrap();
    let builder = LeakyBuilder {
        output: root.path().join("out"),
    };
    let plan = VerificationPlan {
        expectations: vec![AssetExpectation::new(
            "html",
            "background-image",
            "dog.jpg",
            ExpectationKind::FollowsMode,
        )],
        artifact_checks: Vec::new(),
    };
    let mut harness = VerificationHarness::new(builder, plan);

    let report = harness.run(EmbedMode::Embedded).unwrap();

    let failed: Vec<_> = report
        .failures()
        .map(|o| (o.round, o.description.as_str()))
        .collect();
    assert_eq!(
        failed,
        vec![
            (2, "compiles exactly one stylesheet"),
            (2, "does not embed asset 'dog.jpg' via selector 'html' in property background-image"),
        ]
    );
}

struct FailingBuilder {
    output: PathBuf,
    cleaned: bool,
}

impl BuildCollaborator for FailingBuilder {
    fn compile(&mut self, _mode: EmbedMode) -> Result<()> {
        Err(EmbedError::collaborator("build", "precompile exited with status 1"))
    }

    fn clean(&mut self) -> Result<()> {
        self.cleaned = true;
        Ok(())
    }

    fn output_dir(&self) -> &Path {
        &self.output
    }
}

#[test]
fn test_build_failure_is_fatal_and_still_cleans() {
    let builder = FailingBuilder {
        output: PathBuf::from("unused"),
        cleaned: false,
    };
    let mut harness = VerificationHarness::new(builder, plan());

    let err = harness.run(EmbedMode::Linked).unwrap_err();

    assert!(matches!(err, EmbedError::CollaboratorFailure { .. }));
    assert!(harness.into_builder().cleaned);
}
