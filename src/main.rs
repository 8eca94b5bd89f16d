use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use impediment_report::cli::{Cli, normalize};
use impediment_report::config::EngineConfig;
use impediment_report::{commands, util};

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn main() -> Result<()> {
  init_tracing();

  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: validate engine configuration once
  let engine = EngineConfig::new(&cfg.settings)?;

  // Phase 3: resolve now and dispatch
  let now = util::effective_now(util::parse_now_override(cfg.now_override.as_deref()));
  commands::run(&cfg, &engine, now)
}
