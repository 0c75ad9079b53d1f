//! UTF-16LE line I/O for MicroVu program files.
//!
//! Program files are UTF-16LE text with CRLF terminators. The originating
//! software rejects anything else, so the write side is bit-exact: no BOM,
//! every line terminated with `\r\n`.

use crate::error::{ConvertError, Result};
use std::fs;
use std::path::Path;

const BOM: u16 = 0xFEFF;

/// Read a UTF-16LE program file into terminator-free lines.
///
/// A leading BOM is tolerated and dropped. Both `\r\n` and bare `\n`
/// terminators are accepted on read.
pub fn read_program_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)?;
    if bytes.len() % 2 != 0 {
        return Err(ConvertError::Encoding {
            path: path.to_path_buf(),
            message: format!("odd byte length {}, not UTF-16LE", bytes.len()),
        });
    }

    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    if units.first() == Some(&BOM) {
        units.remove(0);
    }

    let text = String::from_utf16(&units).map_err(|e| ConvertError::Encoding {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(split_lines(&text))
}

/// Write lines as UTF-16LE with CRLF terminators and no BOM.
pub fn write_program_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut bytes: Vec<u8> = Vec::with_capacity(lines.iter().map(|l| l.len() * 2 + 4).sum());
    for line in lines {
        for unit in line.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&(b'\r' as u16).to_le_bytes());
        bytes.extend_from_slice(&(b'\n' as u16).to_le_bytes());
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Read a template file, sniffing UTF-16LE vs UTF-8.
///
/// Collaborator-provided templates arrive in either encoding; a UTF-16LE BOM
/// or embedded NUL bytes mark the wide form.
pub fn read_template_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)?;

    let looks_utf16 = bytes.starts_with(&[0xFF, 0xFE]) || bytes.iter().any(|b| *b == 0);
    let text = if looks_utf16 {
        if bytes.len() % 2 != 0 {
            return Err(ConvertError::Encoding {
                path: path.to_path_buf(),
                message: format!("odd byte length {}, not UTF-16LE", bytes.len()),
            });
        }
        let mut units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        if units.first() == Some(&BOM) {
            units.remove(0);
        }
        String::from_utf16(&units).map_err(|e| ConvertError::Encoding {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        String::from_utf8(bytes).map_err(|e| ConvertError::Encoding {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    Ok(split_lines(&text))
}

/// Split text into lines, stripping `\r\n` / `\n` terminators. A trailing
/// terminator does not produce a final empty line.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}
