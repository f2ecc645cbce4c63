mod check;
mod run;

pub use check::Check;
pub use run::Run;

use std::path::PathBuf;

/// Data directory used when none is given on the command line.
pub fn default_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}
