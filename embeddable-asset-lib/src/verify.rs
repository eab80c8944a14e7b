//! Build-and-reparse verification.
//!
//! A scenario compiles once in a starting mode, checks every expectation
//! against the compiled stylesheet, recompiles in the opposite mode and
//! checks again. The second round must show no trace of the first build.

use crate::asset::classifier::{classify, matches_asset};
use crate::asset::reference::AssetReference;
use crate::config::EmbedMode;
use crate::error::{EmbedError, Result};
use crate::pipeline::artifacts::{self, bundle_pattern};
use crate::pipeline::BuildCollaborator;
use crate::style::resolver::get_property_value;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Which mode an asset is expected to appear in after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationKind {
    /// Referenced through the embeddable helper: embedded exactly when the
    /// build is.
    #[default]
    FollowsMode,
    /// Referenced without the helper: linked in every build.
    AlwaysLinked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetExpectation {
    pub selector: String,
    pub property: String,
    pub asset: AssetReference,
    #[serde(default)]
    pub kind: ExpectationKind,
}

impl AssetExpectation {
    pub fn new(selector: &str, property: &str, asset: &str, kind: ExpectationKind) -> Self {
        AssetExpectation {
            selector: selector.to_string(),
            property: property.to_string(),
            asset: AssetReference::parse(asset),
            kind,
        }
    }

    pub fn expected_mode(&self, build_mode: EmbedMode) -> EmbedMode {
        match self.kind {
            ExpectationKind::FollowsMode => build_mode,
            ExpectationKind::AlwaysLinked => EmbedMode::Linked,
        }
    }

    fn describe(&self, expected: EmbedMode) -> String {
        let verb = match expected {
            EmbedMode::Embedded => "embeds",
            EmbedMode::Linked => "does not embed",
        };
        format!(
            "{} asset '{}' via selector '{}' in property {}",
            verb, self.asset, self.selector, self.property
        )
    }
}

/// Whole-artifact sanity checks run after every build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum ArtifactCheck {
    /// `application*.<extension>` exists and contains `needle`.
    Contains { extension: String, needle: String },
    /// The compiled stylesheet is accepted by a real CSS parser.
    ParsesAsCss,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPlan {
    pub expectations: Vec<AssetExpectation>,
    #[serde(default)]
    pub artifact_checks: Vec<ArtifactCheck>,
}

impl VerificationPlan {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| EmbedError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| EmbedError::collaborator("verification plan", e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub round: usize,
    pub mode: EmbedMode,
    pub description: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl VerificationReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    pub fn merge(&mut self, other: VerificationReport) {
        self.outcomes.extend(other.outcomes);
    }
}

/// Drives a [`BuildCollaborator`] through mode toggles and checks the output.
pub struct VerificationHarness<B> {
    builder: B,
    plan: VerificationPlan,
}

impl<B: BuildCollaborator> VerificationHarness<B> {
    pub fn new(builder: B, plan: VerificationPlan) -> Self {
        VerificationHarness { builder, plan }
    }

    pub fn into_builder(self) -> B {
        self.builder
    }

    /// Both toggle orders: embedded first, then linked first.
    pub fn run_all(&mut self) -> Result<VerificationReport> {
        let mut report = self.run(EmbedMode::Embedded)?;
        report.merge(self.run(EmbedMode::Linked)?);
        Ok(report)
    }

    /// Build in `initial`, verify, rebuild in the other mode, verify again.
    /// Outputs are cleaned afterwards whether or not the rounds succeeded.
    pub fn run(&mut self, initial: EmbedMode) -> Result<VerificationReport> {
        log::info!("verifying {} build followed by {} rebuild", initial, initial.toggled());
        let result = self.run_rounds(initial);
        let cleaned = self.builder.clean();
        let report = result?;
        cleaned?;
        Ok(report)
    }

    fn run_rounds(&mut self, initial: EmbedMode) -> Result<VerificationReport> {
        let mut report = VerificationReport::default();
        let mut previous = HashMap::new();

        for (round, mode) in [(1, initial), (2, initial.toggled())] {
            self.builder.compile(mode)?;
            let stylesheet = self.verify_single_stylesheet(round, mode, &mut report)?;
            self.verify_artifacts(round, mode, stylesheet.as_deref(), &mut report)?;

            let Some(stylesheet) = stylesheet else {
                continue;
            };
            let mut current = HashMap::new();
            for (index, expectation) in self.plan.expectations.iter().enumerate() {
                let outcome = check_expectation(
                    &stylesheet,
                    expectation,
                    round,
                    mode,
                    previous.get(&index),
                    &mut current,
                    index,
                )?;
                report.outcomes.push(outcome);
            }
            previous = current;
        }

        let failed = report.failures().count();
        if failed > 0 {
            log::warn!("{} of {} checks failed", failed, report.outcomes.len());
        }
        Ok(report)
    }

    /// Exactly one compiled stylesheet must exist after a build; returns it.
    fn verify_single_stylesheet(
        &self,
        round: usize,
        mode: EmbedMode,
        report: &mut VerificationReport,
    ) -> Result<Option<String>> {
        let output = self.builder.output_dir();
        let pattern = bundle_pattern("css");
        let found = artifacts::list_compiled_artifacts(output, &pattern)?;

        let (passed, detail) = match found.len() {
            1 => (true, None),
            0 => (false, Some(format!("no {} under {}", pattern, output.display()))),
            n => (
                false,
                Some(format!("{} files match {}, a previous build left residue", n, pattern)),
            ),
        };
        report.outcomes.push(CheckOutcome {
            round,
            mode,
            description: "compiles exactly one stylesheet".to_string(),
            passed,
            detail,
        });
        artifacts::read_compiled_stylesheet(output)
    }

    fn verify_artifacts(
        &self,
        round: usize,
        mode: EmbedMode,
        stylesheet: Option<&str>,
        report: &mut VerificationReport,
    ) -> Result<()> {
        for check in &self.plan.artifact_checks {
            let (description, failure) = match check {
                ArtifactCheck::Contains { extension, needle } => {
                    let description = format!("compiled {} includes '{}'", extension, needle);
                    let failure = match artifacts::read_compiled_asset(
                        self.builder.output_dir(),
                        extension,
                    )? {
                        Some(text) if text.contains(needle.as_str()) => None,
                        Some(_) => Some(format!("'{}' not found", needle)),
                        None => Some(format!("no {}", bundle_pattern(extension))),
                    };
                    (description, failure)
                }
                ArtifactCheck::ParsesAsCss => {
                    let failure = match stylesheet {
                        Some(css) => parse_failure(css),
                        None => Some("no compiled stylesheet".to_string()),
                    };
                    ("compiled stylesheet parses as CSS".to_string(), failure)
                }
            };
            report.outcomes.push(CheckOutcome {
                round,
                mode,
                description,
                passed: failure.is_none(),
                detail: failure,
            });
        }
        Ok(())
    }
}

fn parse_failure(css: &str) -> Option<String> {
    match StyleSheet::parse(css, ParserOptions::default()) {
        Ok(_) => None,
        Err(e) => Some(e.to_string()),
    }
}

/// Check one expectation against `stylesheet`, recording the value found
/// under `index` in `seen` so the next round can detect stale values.
fn check_expectation(
    stylesheet: &str,
    expectation: &AssetExpectation,
    round: usize,
    mode: EmbedMode,
    previous: Option<&String>,
    seen: &mut HashMap<usize, String>,
    index: usize,
) -> Result<CheckOutcome> {
    let expected = expectation.expected_mode(mode);
    let mut outcome = CheckOutcome {
        round,
        mode,
        description: expectation.describe(expected),
        passed: false,
        detail: None,
    };

    let value = match get_property_value(stylesheet, &expectation.selector, &expectation.property) {
        Ok(Some(value)) => value,
        Ok(None) => {
            outcome.detail = Some("property not found".to_string());
            return Ok(outcome);
        }
        Err(EmbedError::MalformedValue { declaration }) => {
            outcome.detail = Some(format!("malformed declaration `{}`", declaration));
            return Ok(outcome);
        }
        Err(e) => return Err(e),
    };

    let actual = classify(&value);
    let names_asset = matches_asset(&value, &expectation.asset)?;
    let stale = expectation.kind == ExpectationKind::FollowsMode && previous == Some(&value);

    outcome.passed = actual == expected && names_asset == (expected == EmbedMode::Linked) && !stale;
    if !outcome.passed {
        outcome.detail = Some(if stale {
            format!("value unchanged from previous build: {}", abbreviate(&value))
        } else {
            format!(
                "found {} value{}: {}",
                actual,
                if names_asset { " naming the asset" } else { "" },
                abbreviate(&value)
            )
        });
    }
    seen.insert(index, value);
    Ok(outcome)
}

fn abbreviate(value: &str) -> String {
    const LIMIT: usize = 80;
    match value.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}
