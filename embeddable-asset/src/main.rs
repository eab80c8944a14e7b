use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use embeddable_asset_lib::asset::DirectoryAssetResolver;
use embeddable_asset_lib::pipeline::builder::StylesheetBuilder;
use embeddable_asset_lib::pipeline::{initialize_helpers, BuildCollaborator};
use embeddable_asset_lib::verify::{VerificationHarness, VerificationPlan, VerificationReport};
use embeddable_asset_lib::{classify, get_property_value, AssetRewriter, EmbedConfig};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "embeddable-asset")]
#[command(about = "Inline or link stylesheet assets and verify the compiled result")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value of a property inside a selector's rule block.
    Value {
        /// Compiled stylesheet to read.
        stylesheet: PathBuf,
        selector: String,
        property: String,
    },
    /// Print the `url(...)` expression for one asset.
    Rewrite {
        asset: String,
        #[command(flatten)]
        assets: AssetArgs,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Compile the source directory once.
    Build {
        #[command(flatten)]
        build: BuildArgs,
        #[command(flatten)]
        mode: ModeArgs,
    },
    /// Build in both modes, both orders, and check every expectation.
    Verify {
        #[command(flatten)]
        build: BuildArgs,
        /// JSON file with `expectations` and optional `artifact_checks`.
        #[arg(long)]
        expectations: PathBuf,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct AssetArgs {
    /// Directory holding the source assets.
    #[arg(long)]
    assets: PathBuf,
    /// Public URL prefix for linked assets.
    #[arg(long, default_value = "/assets")]
    prefix: String,
}

#[derive(Args)]
struct BuildArgs {
    /// Directory with stylesheets, scripts and `.erb` templates.
    #[arg(long)]
    source: PathBuf,
    /// Directory the compiled bundles are written to.
    #[arg(long)]
    output: PathBuf,
    #[command(flatten)]
    assets: AssetArgs,
}

#[derive(Args)]
struct ModeArgs {
    /// Inline assets as data URIs (overrides EMBED_ASSETS).
    #[arg(long, conflicts_with = "no_embed")]
    embed: bool,
    /// Keep assets linked (overrides EMBED_ASSETS).
    #[arg(long)]
    no_embed: bool,
}

impl ModeArgs {
    fn override_flag(&self) -> Option<bool> {
        match (self.embed, self.no_embed) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

impl AssetArgs {
    fn rewriter(&self) -> AssetRewriter {
        AssetRewriter::new(DirectoryAssetResolver::new(&self.assets).with_url_prefix(&self.prefix))
    }
}

impl BuildArgs {
    fn builder(&self) -> StylesheetBuilder {
        let mut builder = StylesheetBuilder::new(&self.source, &self.output);
        initialize_helpers(Some(&mut builder), self.assets.rewriter());
        builder
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    // Read once; every command below receives the mode explicitly.
    let config = EmbedConfig::from_env();

    match run(cli.command, config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: EmbedConfig) -> Result<bool> {
    match command {
        Command::Value {
            stylesheet,
            selector,
            property,
        } => {
            let document = fs::read_to_string(&stylesheet)
                .with_context(|| format!("reading {}", stylesheet.display()))?;
            match get_property_value(&document, &selector, &property)? {
                Some(value) => {
                    println!("{}", value);
                    log::info!("{} value", classify(&value));
                    Ok(true)
                }
                None => {
                    log::warn!("no `{}` declaration under `{}`", property, selector);
                    Ok(false)
                }
            }
        }
        Command::Rewrite { asset, assets, mode } => {
            let mode = config.with_override(mode.override_flag()).mode;
            let url = assets
                .rewriter()
                .rewrite(&asset, mode)
                .with_context(|| format!("rewriting {}", asset))?;
            println!("{}", url);
            Ok(true)
        }
        Command::Build { build, mode } => {
            let mode = config.with_override(mode.override_flag()).mode;
            build
                .builder()
                .compile(mode)
                .with_context(|| format!("compiling {}", build.source.display()))?;
            Ok(true)
        }
        Command::Verify {
            build,
            expectations,
            json,
        } => {
            let plan = VerificationPlan::from_json_file(&expectations)
                .with_context(|| format!("loading {}", expectations.display()))?;
            let report = VerificationHarness::new(build.builder(), plan)
                .run_all()
                .context("verification build failed")?;
            print_report(&report, json)?;
            Ok(report.is_success())
        }
    }
}

fn print_report(report: &VerificationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for outcome in &report.outcomes {
        let status = if outcome.passed { "ok" } else { "FAILED" };
        print!(
            "[round {} {}] {} ... {}",
            outcome.round, outcome.mode, outcome.description, status
        );
        match &outcome.detail {
            Some(detail) => println!(" ({})", detail),
            None => println!(),
        }
    }
    let failed = report.failures().count();
    println!("{} checks, {} failed", report.outcomes.len(), failed);
    if failed > 0 {
        log::warn!("verification failed");
    }
    Ok(())
}
