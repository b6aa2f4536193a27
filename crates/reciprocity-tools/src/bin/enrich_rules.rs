// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! `enrich-rules`: fill application URLs and notes on Japanese-home rules
//! from the publisher's overseas-operation pages.
//!
//! Exit codes: `0` done (written or not), `2` rules file missing, `3` main
//! page unreachable.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use reciprocity_tools::enrich::fetch::HttpFetcher;
use reciprocity_tools::enrich::{
    run, EnrichConfig, DEFAULT_BASE_URL, DEFAULT_CRAWL_DEPTH, DEFAULT_MAIN_PAGE, DEFAULT_TIMEOUT_SECS,
};
use reciprocity_tools::exit;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "enrich-rules", version, about = "Enrich rules.yml from the publisher's pages")]
struct Cli {
    /// Rule table to update in place.
    #[arg(long, default_value = "_data/rules.yml")]
    rules: PathBuf,

    /// Only links under this origin are followed.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: Url,

    /// Index page listing the countries.
    #[arg(long, default_value = DEFAULT_MAIN_PAGE)]
    main_page: Url,

    /// Levels of same-site links to follow past the main page's candidates.
    #[arg(long, default_value_t = DEFAULT_CRAWL_DEPTH)]
    crawl_depth: usize,

    /// Per-request timeout.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl From<Cli> for EnrichConfig {
    fn from(cli: Cli) -> Self {
        Self {
            rules: cli.rules,
            base_url: cli.base_url,
            main_page: cli.main_page,
            crawl_depth: cli.crawl_depth,
            timeout: Duration::from_secs(cli.timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    reciprocity_tools::init_logging();
    let config = EnrichConfig::from(Cli::parse());
    let fetcher = match HttpFetcher::new(config.timeout) {
        Ok(fetcher) => fetcher,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::from(exit::FAILURE);
        }
    };

    let code = match run(&config, &fetcher).await {
        Ok(summary) => {
            if summary.written {
                println!("Updated {} of {} rule(s) in {}", summary.updated, summary.examined, config.rules.display());
            } else {
                println!("No changes ({} rule(s) examined)", summary.examined);
            }
            exit::OK
        }
        Err(error) => {
            eprintln!("error: {error}");
            error.exit_code()
        }
    };
    ExitCode::from(code)
}
