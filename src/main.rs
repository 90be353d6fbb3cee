use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod draft;
mod gitio;
mod github;
mod labels;
mod logging;
mod model;
mod pulls;
mod term;
mod util;
mod version;

use crate::cli::{Cli, Cmd, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  logging::init(cli.debug);

  // Phase 1: normalize CLI (org/repo from flags or the git origin)
  let cfg = normalize(cli)?;

  // Phase 2: load project configuration (label specs + release drafter)
  let project = match config::ProjectConfig::load(&cfg.org) {
    Ok(p) => p,
    Err(err) => {
      if err.chain().any(|cause| cause.is::<serde_yaml::Error>()) {
        eprintln!("{:#}", err);
        std::process::exit(2);
      }
      return Err(err);
    }
  };

  // Phase 3: run the selected command (draft when none was given)
  let api = github::api::build_api(github::api::get_github_token());
  let problems = match cfg.cmd {
    Cmd::Draft => draft::run(&cfg, &project, api.as_ref())?,
    Cmd::Pulls => pulls::run(&cfg, &project, api.as_ref())?,
    Cmd::Labels => labels::run(&cfg, &project, api.as_ref())?,
  };

  if problems > 0 {
    std::process::exit(1);
  }
  Ok(())
}
