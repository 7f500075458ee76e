use chrono::Local;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

use daily_orders::report::ReportFormat;
use daily_orders::{housekeeping, logging, pipeline, Result, Settings};

#[derive(Debug, StructOpt)]
#[structopt(name = "daily-orders", about = "Daily Square/Shopify order report and sqlite load")]
struct Opt {
  /// Folder with default.toml and the optional RUN_MODE / local overrides.
  #[structopt(long, parse(from_os_str), default_value = "config")]
  config: PathBuf,
  #[structopt(subcommand)]
  command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
  /// Build today's report from the exports in the input folder.
  Report {
    #[structopt(long, default_value = "xlsx")]
    format: ReportFormat,
  },
  /// Rebuild the sqlite tables from the per-source export folders.
  Load,
  /// Delete generated reports and processed exports.
  CleanUp,
}

fn run(opt: Opt) -> Result<()> {
  let settings = Settings::new(&opt.config)?;

  match opt.command {
    Command::Report { format } => {
      logging::init(Some(settings.report.log_file.as_path()))?;
      let path = pipeline::daily_report(&settings, format, Local::now().date_naive())?;
      log::info!("Report ready: {}", path.display());
    },
    Command::Load => {
      logging::init(Some(settings.load.log_file.as_path()))?;
      for (kind, rows) in pipeline::load(&settings)? {
        log::info!("{}: {} rows", kind, rows);
      }
    },
    Command::CleanUp => {
      logging::init(Some(settings.cleanup.log_file.as_path()))?;
      let deleted = housekeeping::clean_up(&settings)?;
      log::info!("{} files deleted", deleted.len());
    },
  }
  Ok(())
}

fn main() {
  if let Err(e) = run(Opt::from_args()) {
    log::error!("{}", e);
    eprintln!("Error: {}", e);
    process::exit(1);
  }
}
