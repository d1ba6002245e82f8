//! Command-line and environment configuration.

use clap::Parser;
use reqwest::Url;

use crate::errors::{AppError, AppResult};
use crate::models::Tab;

#[derive(Parser, Debug, Clone)]
#[command(name = "trustbill", about = "Review flagged vendor invoices from the TrustBill API")]
pub struct Cli {
    /// Base URL of the invoice API, e.g. https://api.example.com/prod/invoices
    #[arg(long, env = "TRUSTBILL_API_BASE_URL")]
    pub api_base_url: String,

    /// Tab shown on start: unflagged, flagged or vendors
    #[arg(long, env = "TRUSTBILL_TAB", default_value = "unflagged")]
    pub tab: String,

    /// Load once, print every tab and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: Url,
    pub initial_tab: Tab,
    pub once: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> AppResult<Self> {
        Ok(Config {
            api_base_url: parse_base_url(&cli.api_base_url)?,
            initial_tab: Tab::parse(&cli.tab)
                .ok_or_else(|| AppError::Config(format!("unknown tab `{}`", cli.tab)))?,
            once: cli.once,
        })
    }
}

/// Accepts http(s) URLs and drops a trailing slash so endpoint paths join cleanly.
pub fn parse_base_url(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::Config("API base URL is empty".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| AppError::Config(format!("invalid API base URL `{}`: {}", trimmed, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Config(format!("unsupported URL scheme `{}`", other))),
    }
}
