#[macro_use]
extern crate quick_error;
#[macro_use]
extern crate lazy_static;

pub mod cleaning;
pub mod error;
pub mod housekeeping;
pub mod ingest;
pub mod logging;
pub mod persistence;
pub mod pipeline;
pub mod report;
pub mod settings;
pub mod sources;
pub mod utils;

pub use error::{Error, Result};
pub use settings::Settings;
pub use sources::SourceKind;
