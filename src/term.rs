use std::io::IsTerminal;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream};

/// Render a clickable link on supporting terminals (OSC 8).
pub fn link(url: &str, text: &str) -> String {
  format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text)
}

/// Stdout stream with color disabled for pipes and redirects.
/// ColorChoice::Auto also respects the NO_COLOR environment variable.
pub fn stdout() -> StandardStream {
  let choice = if std::io::stdout().is_terminal() {
    ColorChoice::Auto
  } else {
    ColorChoice::Never
  };
  StandardStream::stdout(choice)
}

/// Error color: red + bold
pub fn error() -> ColorSpec {
  let mut spec = ColorSpec::new();
  spec.set_fg(Some(Color::Red)).set_bold(true);
  spec
}

/// Warning color: yellow + bold
pub fn warning() -> ColorSpec {
  let mut spec = ColorSpec::new();
  spec.set_fg(Some(Color::Yellow)).set_bold(true);
  spec
}

/// Success color: green
pub fn success() -> ColorSpec {
  let mut spec = ColorSpec::new();
  spec.set_fg(Some(Color::Green));
  spec
}
