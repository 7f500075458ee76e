use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::sources::SourceKind;

#[derive(Debug, Clone, Deserialize)]
pub struct Report {
  /// Folder the daily csv exports are dropped into.
  pub input: PathBuf,
  pub output: PathBuf,
  pub log_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Load {
  pub square_input: PathBuf,
  pub shopify_input: PathBuf,
  pub sqlite: PathBuf,
  pub log_file: PathBuf,
}

impl Load {
  pub fn input(&self, kind: SourceKind) -> &Path {
    match kind {
      SourceKind::Square => &self.square_input,
      SourceKind::Shopify => &self.shopify_input,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cleanup {
  pub log_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub report: Report,
  pub load: Load,
  pub cleanup: Cleanup,
}

impl Settings {
  pub fn new<P: AsRef<Path>>(folder: P) -> Result<Self, ConfigError> {
    let folder = folder.as_ref();
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = Config::builder()
      .set_default("report.input", "./data/input")?
      .set_default("report.output", "./data/output")?
      .set_default("report.log_file", "./data/logs/daily_report.log")?
      .set_default("load.square_input", "./data/square")?
      .set_default("load.shopify_input", "./data/shopify")?
      .set_default("load.sqlite", "./data/orders.sqlite")?
      .set_default("load.log_file", "./data/logs/load.log")?
      .set_default("cleanup.log_file", "./data/logs/clean_up.log")?
      // the "default" configuration file
      .add_source(File::from(folder.join("default")).required(false))
      // the current environment configuration file
      .add_source(File::from(folder.join(&run_mode)).required(false))
      // local configuration file
      .add_source(File::from(folder.join("local")).required(false))
      // e.g. ORDERS_REPORT__INPUT=/srv/exports
      .add_source(Environment::with_prefix("ORDERS").prefix_separator("_").separator("__"))
      .build()?;

    log::debug!("report input: {:?}", config.get::<String>("report.input"));
    log::debug!("report output: {:?}", config.get::<String>("report.output"));
    log::debug!("sqlite: {:?}", config.get::<String>("load.sqlite"));

    config.try_deserialize()
  }

  /// Everything under one folder, for tests and one-off runs.
  pub fn in_folder<P: AsRef<Path>>(folder: P) -> Settings {
    let folder = folder.as_ref();
    Settings {
      report: Report {
        input: folder.join("input"),
        output: folder.join("output"),
        log_file: folder.join("logs").join("daily_report.log"),
      },
      load: Load {
        square_input: folder.join("square"),
        shopify_input: folder.join("shopify"),
        sqlite: folder.join("orders.sqlite"),
        log_file: folder.join("logs").join("load.log"),
      },
      cleanup: Cleanup { log_file: folder.join("logs").join("clean_up.log") },
    }
  }
}
