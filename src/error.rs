use pivot::PivotError;

pub type Result<T> = std::result::Result<T, Error>;

quick_error! {
  #[derive(Debug)]
  pub enum Error {
    IOError(error: String) {
      display("IO error: {}", error)
    }
    Config(error: config::ConfigError) {
      display("configuration error: {}", error)
      from()
      source(error)
    }
    Csv(error: csv::Error) {
      display("csv error: {}", error)
      from()
      source(error)
    }
    Sqlite(error: rusqlite::Error) {
      display("sqlite error: {}", error)
      from()
      source(error)
    }
    Xlsx(error: rust_xlsxwriter::XlsxError) {
      display("xlsx error: {}", error)
      from()
      source(error)
    }
    Pivot(error: PivotError) {
      display("{}", error)
      from()
      source(error)
    }
    NoSourceFiles(folder: String) {
      display("No recognizable csv files found in {}", folder)
    }
    MixedSources(square: usize, shopify: usize) {
      display("Both square ({}) and shopify ({}) csv files found, please only input one source at a time", square, shopify)
    }
    Schema(file: String, column: String) {
      display("{}: missing column {:?}", file, column)
    }
    Parse(field: String, value: String) {
      display("{}: cannot parse {:?}", field, value)
    }
    Logging(error: String) {
      display("logging: {}", error)
    }
  }
}

impl From<std::io::Error> for Error {
  fn from(e: std::io::Error) -> Self {
    Error::IOError(e.to_string())
  }
}

impl From<walkdir::Error> for Error {
  fn from(e: walkdir::Error) -> Self {
    Error::IOError(e.to_string())
  }
}

impl Error {
  pub(crate) fn parse<F: Into<String>, V: ToString>(field: F, value: V) -> Self {
    Error::Parse(field.into(), value.to_string())
  }
}
