//! mv-convert-rs - Convert MicroVu inspection programs for the 1Factory stack.
//!
//! A MicroVu program is line-oriented text: one instruction per line, each a
//! small pseudo-record of tagged, delimited fields. Moving a program between
//! sites means rewriting a fixed set of those fields (export/report paths,
//! dimension names, the operator prompt section, the kill-file call, the
//! edit comment, and the instruction counters) while leaving every other
//! line untouched.
//!
//! # Example
//!
//! ```no_run
//! use mv_convert_rs::{convert_program, Settings};
//! use std::path::Path;
//!
//! let settings: Settings = serde_json::from_str(&std::fs::read_to_string("settings.json").unwrap()).unwrap();
//! let output = convert_program(
//!     Path::new("NN00160A001-2_OPFAI_REVC_VMM_REV2.iwp"),
//!     "10",
//!     "A",
//!     "",
//!     settings,
//!     "JTW",
//! )
//! .unwrap();
//! println!("{}", output.display());
//! ```

pub mod classify;
pub mod config;
pub mod encoding;
pub mod error;
pub mod model;
pub mod pipeline;

// Re-exports for convenience
pub use classify::classify;
pub use config::{Settings, Site};
pub use error::{ConvertError, Result};
pub use model::{DimensionName, ProgramRecord};
pub use pipeline::{BatchOutcome, Processor};

use std::path::{Path, PathBuf};

/// Convert one program file end to end.
///
/// Loads the program, runs the full mutation pipeline against it, and
/// persists the result into the configured output tree.
///
/// # Arguments
///
/// * `input_path` - Path to the input `.iwp` program
/// * `op_number` - Operation number stamped into prompts and paths
/// * `rev_number` - Revision letter stamped into prompts and paths
/// * `smartprofile_projectname` - Project name for SmartProfile programs
/// * `settings` - Resolved site settings
/// * `user_initials` - Initials recorded in the conversion comment
///
/// # Returns
///
/// The path the converted program was written to.
pub fn convert_program(
    input_path: &Path,
    op_number: &str,
    rev_number: &str,
    smartprofile_projectname: &str,
    settings: Settings,
    user_initials: &str,
) -> Result<PathBuf> {
    let mut record = ProgramRecord::load(
        input_path,
        op_number,
        rev_number,
        smartprofile_projectname,
    )?;
    let output_filepath = record.output_filepath(&settings.output_root_directory);
    let processor = Processor::new(settings, user_initials);
    processor.process_file(&mut record)?;
    Ok(output_filepath)
}
