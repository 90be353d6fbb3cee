use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the process-level subscriber on stderr.
///
/// `--debug` selects the debug level; the `TENDER_LOG` variable overrides it
/// with a full filter directive. Safe to call more than once; only the first
/// call installs anything.
pub fn init(debug: bool) {
  if INIT.get().is_some() {
    return;
  }

  let filter = EnvFilter::try_from_env("TENDER_LOG")
    .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
  let _ = INIT.set(());
}
