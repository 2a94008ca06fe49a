//! Prefixed, colored status lines on stderr.
//!
//! Results go to stdout; everything a person watches while a command runs goes
//! through here so that piping stdout stays clean.

use colored::*;

pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Format a colored prefix for log messages
fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 7 - prefix.len() - 2)
}

fn prefixed(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

/// Display a message between two border lines
pub fn as_banner<F>(log_fn: F, message: &str, width: usize, border_char: char)
where
  F: Fn(&str),
{
  let banner = banner_line(width, border_char);
  log_fn(&banner);
  log_fn(message);
  log_fn(&banner);
}

pub fn info(message: &str) {
  prefixed(Color::Blue, "info", message);
}

pub fn warn(message: &str) {
  prefixed(Color::Yellow, "warn", message);
}

pub fn error(message: &str) {
  prefixed(Color::Red, "error", message);
}

pub fn success(message: &str) {
  prefixed(Color::Green, "sccs", message);
}

/// Start of a long-running step
pub fn announce(message: &str) {
  as_banner(|msg| log(&msg.blue().bold().to_string()), message, 50, '-');
}

/// Successful completion of a command
pub fn flourish(message: &str) {
  as_banner(|msg| log(&msg.green().bold().to_string()), message, 45, '~');
}
