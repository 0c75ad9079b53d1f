//! Collaborator-provided template files and their placeholder tokens.
//!
//! Templates live in a configured directory and are substituted verbatim:
//! `<O>` op number, `<R>` rev letter, `<P>` part number, `<SPF>` SmartProfile
//! project, `<?SYS>`/`<?EXE>`/`<?SCR>` for the SmartProfile call line.

use crate::encoding;
use crate::error::{ConvertError, Result};
use std::path::Path;

/// Prompt block for ordinary programs.
pub const PROMPT_TEMPLATE: &str = "prompt_text.txt";
/// Prompt block for SmartProfile programs.
pub const SP_PROMPT_TEMPLATE: &str = "sp_prompt_text.txt";
/// Kill-file call block.
pub const TEXT_KILL_TEMPLATE: &str = "TextKill_text.txt";
/// SmartProfile invocation block.
pub const CALL_SMARTPROFILE_TEMPLATE: &str = "CallSmartProfile_text.txt";
/// "Bring part to Metrology" picture block.
pub const BRING_TO_METROLOGY_TEMPLATE: &str = "BringPartToMetrology_text.txt";

/// Load a template as lines. A missing, unreadable, or empty template is a
/// `MissingTemplate` for the record being processed.
pub fn load_lines(templates_directory: &Path, name: &str) -> Result<Vec<String>> {
    let path = templates_directory.join(name);
    let lines = encoding::read_template_lines(&path).map_err(|e| match e {
        ConvertError::FileNotFound { .. } => ConvertError::MissingTemplate {
            name: name.to_string(),
        },
        other => other,
    })?;
    if lines.is_empty() {
        return Err(ConvertError::MissingTemplate {
            name: name.to_string(),
        });
    }
    Ok(lines)
}

/// Load a three-line block template.
///
/// Block templates carry their own title on line 0; the program lines are
/// lines 1..=3.
pub fn load_block(templates_directory: &Path, name: &str) -> Result<[String; 3]> {
    let lines = load_lines(templates_directory, name)?;
    if lines.len() < 4 {
        return Err(ConvertError::MissingTemplate {
            name: name.to_string(),
        });
    }
    Ok([lines[1].clone(), lines[2].clone(), lines[3].clone()])
}
