//! Configuration constants and resolved settings for the converter.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Export target written into SmartProfile programs.
pub const SMARTPROFILE_EXPORT_PATH: &str = "C:\\TEXT\\OUTPUT.txt";

/// Export-file stem that marks a program as a SmartProfile program.
pub const SMARTPROFILE_EXPORT_STEM: &str = "OUTPUT";

/// Machine version path segments recognized in program file paths.
pub const MACHINE_VERSIONS: &[&str] = &["311", "341", "420"];

/// Canonical kill-file command node text.
pub const KILL_FILE_COMMAND: &str = "(CmdText \"\"\"C:\\killFile.bat\"\"\")";

/// Marker substring identifying an existing kill-file call line.
pub const KILL_FILE_MARKER: &str = "killFile.bat";

/// Manufacturing site a program is being converted for.
///
/// Both sites share the full pipeline; Anoka retries the prompt insertion
/// against a secondary anchor when the primary one is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Site {
    #[default]
    CoonRapids,
    Anoka,
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Site::CoonRapids => write!(f, "CoonRapids"),
            Site::Anoka => write!(f, "Anoka"),
        }
    }
}

/// Resolved converter settings.
///
/// The library never reads configuration storage itself; the caller resolves
/// site selection and path roots and hands the finished values over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Site variant to convert for.
    #[serde(default)]
    pub site: Site,
    /// Prefix for canonical dimension names, e.g. `INSP_`.
    pub dimension_root: String,
    /// Root prepended to generated export (.csv) paths.
    pub export_path: String,
    /// Root prepended to generated report (.pdf) paths.
    pub report_root_path: String,
    /// Root the output tree is re-rooted under.
    pub output_root_directory: PathBuf,
    /// Root the archive tree is re-rooted under.
    pub archive_root_directory: PathBuf,
    /// SmartProfile executable substituted for `<?EXE>`.
    pub smart_profile_exe_filepath: String,
    /// SmartProfile script substituted for `<?SCR>`.
    pub smart_profile_script_filepath: String,
    /// Directory holding the prompt/kill/SmartProfile template files.
    pub templates_directory: PathBuf,
    /// Keep hand-edited dimension names instead of classifying.
    #[serde(default)]
    pub hand_edit_dimension_names: bool,
    /// Delete the source program (and its emptied directory) after a
    /// successful write.
    #[serde(default)]
    pub allow_delete: bool,
    /// Copy the source program into the archive tree before writing.
    #[serde(default)]
    pub archive_original: bool,
    /// Mark measured dimensions DontMeasure and turn off auto report/confirm.
    #[serde(default)]
    pub disable_on_convert: bool,
    /// Strip the "bring part to Metrology" picture block.
    #[serde(default)]
    pub remove_bring_to_metrology_pic: bool,
}

impl Settings {
    /// Extract the machine version segment ("311", "341", "420") from a
    /// program file path, if present.
    pub fn machine_version(path: &std::path::Path) -> Option<&'static str> {
        for part in path.components() {
            if let Some(s) = part.as_os_str().to_str() {
                if let Some(v) = MACHINE_VERSIONS.iter().find(|v| **v == s) {
                    return Some(v);
                }
            }
        }
        None
    }
}
