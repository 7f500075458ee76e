use chrono::{Local, NaiveDateTime};
use env_logger::{Builder, Env, Target};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::time::datetime_to_string;

/// Writes every log entry to stderr and appends it to a file.
pub struct Tee {
  file: File,
}

impl Tee {
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Tee { file })
  }
}

impl Write for Tee {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    io::stderr().write_all(buf)?;
    self.file.write_all(buf)?;
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    io::stderr().flush()?;
    self.file.flush()
  }
}

/// `message, YYYY-mm-dd HH:MM:SS`
pub fn format_line(message: &str, at: NaiveDateTime) -> String {
  format!("{}, {}", message, datetime_to_string(at))
}

/// Installs the process logger. `RUST_LOG` overrides the `info` default; with a
/// `log_file` every entry is appended there as well.
pub fn init(log_file: Option<&Path>) -> Result<()> {
  let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
  builder.format(|buf, record| writeln!(buf, "{}", format_line(&record.args().to_string(), Local::now().naive_local())));

  if let Some(path) = log_file {
    builder.target(Target::Pipe(Box::new(Tee::open(path)?)));
  }

  builder.try_init().map_err(|e| Error::Logging(e.to_string()))
}
