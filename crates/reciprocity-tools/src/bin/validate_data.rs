// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! `validate-data`: referential-integrity check for `licenses.yml` and
//! `rules.yml`.
//!
//! Exit codes: `0` consistent, `2` an input file is missing, `3` errors found.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use reciprocity_std::source::find_file;
use reciprocity_tools::exit;
use reciprocity_tools::validate::{check_files, Outcome};

#[derive(Debug, Parser)]
#[command(name = "validate-data", version, about = "Check catalog data for dangling references")]
struct Cli {
    /// Directory holding `licenses.yml` and `rules.yml`.
    #[arg(long, default_value = "_data")]
    data_dir: PathBuf,

    /// License catalog; overrides the one in `--data-dir`.
    #[arg(long)]
    licenses: Option<PathBuf>,

    /// Rule table; overrides the one in `--data-dir`.
    #[arg(long)]
    rules: Option<PathBuf>,
}

impl Cli {
    fn input(&self, explicit: &Option<PathBuf>, stem: &str) -> PathBuf {
        explicit
            .clone()
            .or_else(|| find_file(&self.data_dir, stem))
            .unwrap_or_else(|| self.data_dir.join(format!("{stem}.yml")))
    }
}

fn main() -> ExitCode {
    reciprocity_tools::init_logging();
    match run(&Cli::parse()) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(exit::FAILURE)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    let licenses = cli.input(&cli.licenses, "licenses");
    let rules = cli.input(&cli.rules, "rules");
    let outcome = check_files(&licenses, &rules).context("loading the catalogs")?;

    match &outcome {
        Outcome::LicensesMissing(path) => eprintln!("licenses file not found: {}", path.display()),
        Outcome::RulesMissing(path) => eprintln!("rules file not found: {}", path.display()),
        Outcome::Passed => println!("Data validation passed: licenses and rules look consistent"),
        Outcome::Failed(errors) => {
            eprintln!("Data validation failed with {} error(s):", errors.len());
            for error in errors {
                eprintln!(" - {error}");
            }
        }
    }
    Ok(outcome.exit_code())
}
