use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use crate::gitio;

#[derive(Parser, Debug)]
#[command(
    name = "tender",
    version,
    about = "Keep GitHub labels in sync and draft release notes from merged pull requests",
    long_about = None
)]
pub struct Cli {
  /// Verbose diagnostics on stderr
  #[arg(long, short = 'd', global = true)]
  pub debug: bool,

  /// Apply fixes: create/update labels, write the draft release
  #[arg(long, short = 'f', global = true)]
  pub fix: bool,

  /// GitHub repository name (default: parsed from remote.origin.url)
  #[arg(long, short = 'r', global = true)]
  pub repo: Option<String>,

  /// GitHub organization or user (default: parsed from remote.origin.url)
  #[arg(long, short = 'o', global = true)]
  pub org: Option<String>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
  /// Generate release notes from merged pull requests
  Draft,
  /// Audit pull requests for required labels
  Pulls,
  /// Check repository labels against .github/labels.yml
  Labels,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub org: String,
  pub repo: String,
  pub fix: bool,
  pub cmd: Cmd,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let (org, repo) = match (cli.org, cli.repo) {
    (Some(org), Some(repo)) => (org, repo),
    (org_opt, repo_opt) => {
      let Some((detected_org, detected_repo)) = gitio::parse_origin_github(".") else {
        bail!("cannot determine org/repo: pass --org and --repo, or run inside a clone with a GitHub origin");
      };
      tracing::info!("detected {}/{} from remote.origin.url", detected_org, detected_repo);
      (org_opt.unwrap_or(detected_org), repo_opt.unwrap_or(detected_repo))
    }
  };

  Ok(EffectiveConfig {
    org,
    repo,
    fix: cli.fix,
    cmd: cli.cmd.unwrap_or(Cmd::Draft),
  })
}
