//! Line-addressable program record and its derived fields.
//!
//! A MicroVu program is a sequence of independent pseudo-record lines. The
//! converter only understands the handful of tagged fields it has to rewrite
//! (names, export/report paths, comment, instruction counters); every other
//! line passes through byte-for-byte.

use crate::config::{self, Settings};
use crate::encoding;
use crate::error::Result;
use crate::model::node;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A renamable inspection feature: the line it lives on and its raw label.
///
/// Recomputed on demand from the current line sequence; never cached across
/// mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionName {
    pub line_index: usize,
    pub name: String,
}

/// One loaded program file and the mutation primitives the pipeline uses.
#[derive(Debug)]
pub struct ProgramRecord {
    filepath: PathBuf,
    lines: Vec<String>,
    op_number: String,
    rev_number: String,
    smartprofile_projectname: String,
    is_smartprofile: bool,
    has_calculators: bool,
    manual_dimension_names: Vec<DimensionName>,
}

impl ProgramRecord {
    /// Load a program from disk (UTF-16LE).
    pub fn load(
        filepath: &Path,
        op_number: &str,
        rev_number: &str,
        smartprofile_projectname: &str,
    ) -> Result<Self> {
        let lines = encoding::read_program_lines(filepath)?;
        Ok(Self::from_lines(
            filepath,
            lines,
            op_number,
            rev_number,
            smartprofile_projectname,
        ))
    }

    /// Build a record from already-read lines.
    pub fn from_lines(
        filepath: &Path,
        lines: Vec<String>,
        op_number: &str,
        rev_number: &str,
        smartprofile_projectname: &str,
    ) -> Self {
        let mut record = Self {
            filepath: filepath.to_path_buf(),
            lines,
            op_number: op_number.to_string(),
            rev_number: rev_number.to_string(),
            smartprofile_projectname: smartprofile_projectname.to_string(),
            is_smartprofile: false,
            has_calculators: false,
            manual_dimension_names: Vec::new(),
        };
        // Both flags are fixed at construction; the smartprofile decision in
        // particular is made against the original export target, not the
        // rewritten one.
        record.is_smartprofile = record
            .index_containing("AutoExpFile")
            .and_then(|idx| node::get_node_text(&record.lines[idx], "AutoExpFile", "\"", "\""))
            .map(|value| {
                Path::new(&value.replace('\\', "/"))
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_uppercase()
                    == config::SMARTPROFILE_EXPORT_STEM
            })
            .unwrap_or(false);
        record.has_calculators = record.lines.iter().any(|l| l.starts_with("Calc "));
        record
    }

    // ---- identity ----

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn filename(&self) -> String {
        self.filepath
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }

    fn file_stem(&self) -> String {
        self.filepath
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }

    pub fn op_number(&self) -> &str {
        &self.op_number
    }

    pub fn rev_number(&self) -> &str {
        &self.rev_number
    }

    pub fn smartprofile_projectname(&self) -> &str {
        &self.smartprofile_projectname
    }

    pub fn is_smartprofile(&self) -> bool {
        self.is_smartprofile
    }

    pub fn has_calculators(&self) -> bool {
        self.has_calculators
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    // ---- filename-derived fields ----

    /// First stem token, split on space/underscore.
    pub fn part_number(&self) -> String {
        let stem = self.file_stem();
        stem.split([' ', '_'])
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// View-name tokens of the stem.
    ///
    /// Tokens after the part number, bounded by the LAST token starting with
    /// "REV" (a bare "REV" token also consumes its follower). A REV token in
    /// the middle of the stem is substantive and stays in the view name;
    /// only the final run is treated as the revision marker:
    /// `NN00160A001-2_OPFAI_REVC_VMM_REV2` -> `OPFAI REVC VMM`.
    pub fn view_name(&self) -> String {
        let stem = self.file_stem();
        let parts: Vec<&str> = stem.split([' ', '_']).collect();
        if parts.len() == 1 {
            return String::new();
        }

        let mut rev_begin = 0usize;
        let mut rev_end = 0usize;
        for (x, part) in parts.iter().enumerate() {
            if part.to_uppercase().starts_with("REV") {
                rev_begin = x;
                rev_end = if part.to_uppercase() == "REV" { x + 1 } else { x };
            }
        }

        let selected: &[&str] = if rev_begin == 0 {
            &parts[1..]
        } else if rev_begin == 1 && rev_end < parts.len() - 1 {
            &parts[rev_end..]
        } else {
            &parts[1..rev_end]
        };
        selected.join(" ").trim().to_string()
    }

    /// `stem-increment.ext`, used to dodge archive collisions.
    pub fn increment_filename(file_name: &str, increment: u32) -> String {
        let path = Path::new(file_name);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        format!("{stem}-{increment}{extension}")
    }

    // ---- anchors and counters ----

    /// First line whose uppercased contents contain `text` at an offset
    /// greater than 1. The offset rule excludes degenerate matches at the
    /// start of a line.
    pub fn index_containing(&self, text: &str) -> Option<usize> {
        let needle = text.to_uppercase();
        self.lines
            .iter()
            .position(|l| l.to_uppercase().find(&needle).is_some_and(|i| i > 1))
    }

    /// Count of instruction lines (those carrying a name field).
    pub fn instruction_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.find("(Name ").is_some_and(|i| i > 1))
            .count()
    }

    /// First line starting with the `Instructions` header tag.
    pub fn instructions_index(&self) -> Option<usize> {
        self.lines.iter().position(|l| l.starts_with("Instructions"))
    }

    pub fn has_text_kill(&self) -> bool {
        self.lines
            .iter()
            .any(|l| l.contains(config::KILL_FILE_MARKER))
    }

    pub fn kill_file_call_index(&self) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| l.contains(config::KILL_FILE_MARKER))
    }

    pub fn existing_smartprofile_call_index(&self) -> Option<usize> {
        self.index_containing("SmartProfile.exe")
    }

    /// SmartProfile call block goes at the very end of the program.
    pub fn smartprofile_call_insertion_index(&self) -> Option<usize> {
        self.is_smartprofile.then_some(self.lines.len())
    }

    pub fn bring_to_metrology_index(&self) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| l.contains("Bring part to Metrology.JPG"))
    }

    /// System id from the last system-reference line.
    pub fn last_system_id(&self) -> Option<String> {
        let line = self
            .lines
            .iter()
            .filter(|l| l.to_uppercase().find("(SYS ").is_some_and(|i| i > 1))
            .next_back()?;
        if line.starts_with("Sys 1") {
            node::get_node_text(line, "Sys 1", " ", " ")
        } else {
            node::get_node_text(line, "(Sys", " ", ")")
        }
    }

    /// Insertion point for the prompt block: the later of the "Created By" /
    /// "Edited By" text lines. Both must exist and be `Txt` records.
    pub fn prompt_insertion_index(&self) -> Option<usize> {
        let created_idx = self.index_containing("(Name \"Created")?;
        if !self.lines[created_idx].starts_with("Txt") {
            return None;
        }
        let edited_idx = self.index_containing("(Name \"Edited")?;
        if !self.lines[edited_idx].starts_with("Txt") {
            return None;
        }
        Some(created_idx.max(edited_idx))
    }

    // ---- tagged fields ----

    pub fn comment(&self) -> String {
        self.index_containing("(Name \"Edited")
            .and_then(|idx| node::get_node_text(&self.lines[idx], "(Txt ", "\"", "\""))
            .unwrap_or_default()
    }

    pub fn set_comment(&mut self, value: &str) {
        if let Some(idx) = self.index_containing("(Name \"Edited") {
            if let Some(updated) = node::set_node_text(&self.lines[idx], "(Txt ", value, "\"", "\"")
            {
                self.lines[idx] = updated;
            }
        }
    }

    pub fn export_filepath(&self) -> String {
        if self.is_smartprofile {
            return config::SMARTPROFILE_EXPORT_PATH.to_string();
        }
        self.index_containing("AutoExpFile")
            .and_then(|idx| node::get_node_text(&self.lines[idx], "AutoExpFile", "\"", "\""))
            .unwrap_or_default()
    }

    /// Rewrite both export nodes and flip the format flags.
    ///
    /// SmartProfile programs export through the post-processing script, so
    /// their application state goes to `None`; everything else turns the
    /// data-transfer export on. The field delimiter always moves to CrLf.
    pub fn set_export_filepath(&mut self, value: &str) {
        let Some(idx) = self.index_containing("AutoExpFile") else {
            return;
        };
        let mut line = self.lines[idx].clone();
        if let Some(updated) = node::set_node_text(&line, "(ExpFile ", value, "\"", "\"") {
            line = updated;
        }
        if let Some(updated) = node::set_node_text(&line, "(AutoExpFile ", value, "\"", "\"") {
            line = updated;
        }
        if self.is_smartprofile {
            line = line.replace("(AutoExpFSApSt DT)", "(AutoExpFSApSt None)");
        } else {
            line = line.replace("(AutoExpFSApSt None)", "(AutoExpFSApSt DT)");
        }
        line = line.replace("(FldDlm Tab)", "(FldDlm CrLf)");
        self.lines[idx] = line;
    }

    pub fn report_filepath(&self) -> String {
        if self.is_smartprofile {
            return String::new();
        }
        self.index_containing("AutoRptFileName")
            .and_then(|idx| node::get_node_text(&self.lines[idx], "AutoRptFileName", "\"", "\""))
            .unwrap_or_default()
    }

    pub fn set_report_filepath(&mut self, value: &str) {
        let Some(idx) = self.index_containing("AutoRptFileName") else {
            return;
        };
        let value = if self.is_smartprofile { "" } else { value };
        if let Some(updated) =
            node::set_node_text(&self.lines[idx], "(AutoRptFileName ", value, "\"", "\"")
        {
            self.lines[idx] = updated;
        }
    }

    // ---- dimensions ----

    /// Renamable dimensions in line order. SmartProfile programs report
    /// through the profile project instead, so they expose none. Calculator
    /// lines reference names but are not features themselves.
    pub fn dimension_names(&self) -> Vec<DimensionName> {
        if self.is_smartprofile {
            return Vec::new();
        }
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                (line.contains("(Name \"ITEM") || line.contains("(Name \"INSP"))
                    && !line.starts_with("Calc")
            })
            .filter_map(|(i, line)| {
                node::get_node_text(line, "(Name ", "\"", "\"").map(|name| DimensionName {
                    line_index: i,
                    name,
                })
            })
            .collect()
    }

    pub fn manual_dimension_names(&self) -> &[DimensionName] {
        &self.manual_dimension_names
    }

    pub fn set_manual_dimension_names(&mut self, names: Vec<DimensionName>) {
        self.manual_dimension_names = if self.is_smartprofile {
            Vec::new()
        } else {
            names
        };
    }

    fn name_exists(&self, name: &str) -> bool {
        let search = format!("(Name \"{name}\")");
        self.lines
            .iter()
            .any(|l| l.find(&search).is_some_and(|i| i > 1))
    }

    /// Rename the feature on `line_index`, unless the target name already
    /// exists somewhere in the record (collision policy: first name wins,
    /// the duplicate is silently left alone).
    pub fn update_feature_name(&mut self, line_index: usize, feature_name: &str) {
        if self.name_exists(feature_name) {
            debug!(feature_name, "rename target already exists, leaving line unchanged");
            return;
        }
        let current_line = &self.lines[line_index];
        let Some(current_name) = node::get_node_text(current_line, "(Name ", "\"", "\"") else {
            return;
        };
        let Some(new_line) =
            node::set_node_text(current_line, "(Name ", feature_name, "\"", "\"")
        else {
            return;
        };
        // Any further quoted references on the same line follow the rename.
        self.lines[line_index] =
            new_line.replace(&format!("\"{current_name}\""), &format!("\"{feature_name}\""));
    }

    // ---- line-level mutation ----

    /// Insert a line, clamping an out-of-range index to an append.
    pub fn insert_line(&mut self, line_index: usize, line: &str) {
        let line_index = line_index.min(self.lines.len());
        self.lines.insert(line_index, line.to_string());
    }

    pub fn append_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    pub fn replace_line(&mut self, line_index: usize, line: String) {
        self.lines[line_index] = line;
    }

    pub fn remove_line(&mut self, line_index: usize) {
        self.lines.remove(line_index);
    }

    /// Delete the first line containing `text`; no-op when absent.
    pub fn delete_line_containing(&mut self, text: &str) {
        if let Some(idx) = self.index_containing(text) {
            self.lines.remove(idx);
        }
    }

    /// Recompute the instruction count and write it to both stored counters:
    /// the `(InsIdx …)` node on the export line and the `Instructions`
    /// header line.
    pub fn update_instruction_count(&mut self) {
        let count = self.instruction_count().to_string();
        if let Some(idx) = self.index_containing("AutoExpFile") {
            if let Some(updated) = node::set_node_text(&self.lines[idx], "(InsIdx", &count, " ", ")")
            {
                self.lines[idx] = updated;
            }
        }
        if let Some(idx) = self.instructions_index() {
            if let Some(updated) =
                node::set_node_text(&self.lines[idx], "Instructions", &count, " ", " ")
            {
                self.lines[idx] = updated;
            }
        }
    }

    // ---- output/archive locations ----

    /// Program directories between the machine-version segment and the file,
    /// skipping the grouping level directly under the version.
    fn program_directories(&self) -> Option<PathBuf> {
        let version = Settings::machine_version(&self.filepath)?;
        let parts: Vec<_> = self.filepath.iter().collect();
        let version_idx = parts.iter().position(|p| *p == version)?;
        let program_idx = version_idx + 2;
        if program_idx + 1 >= parts.len() {
            return Some(PathBuf::new());
        }
        Some(parts[program_idx..parts.len() - 1].iter().collect())
    }

    /// Output tree: `{root}/{version}/{program dirs}`. Without a recognized
    /// version segment the program lands under its parent directory's name.
    pub fn output_directory(&self, output_root: &Path) -> PathBuf {
        match (
            Settings::machine_version(&self.filepath),
            self.program_directories(),
        ) {
            (Some(version), Some(program_dirs)) => {
                output_root.join(version).join(program_dirs)
            }
            _ => {
                let parent_name = self
                    .filepath
                    .parent()
                    .and_then(|p| p.file_name())
                    .unwrap_or_default();
                output_root.join(parent_name)
            }
        }
    }

    /// Archive tree: `{root}/{program dirs}/{version}`; the reversed order
    /// relative to the output tree is deliberate and load-bearing.
    pub fn archive_directory(&self, archive_root: &Path) -> PathBuf {
        match (
            Settings::machine_version(&self.filepath),
            self.program_directories(),
        ) {
            (Some(version), Some(program_dirs)) => {
                archive_root.join(program_dirs).join(version)
            }
            _ => {
                let parent_name = self
                    .filepath
                    .parent()
                    .and_then(|p| p.file_name())
                    .unwrap_or_default();
                archive_root.join(parent_name)
            }
        }
    }

    pub fn output_filepath(&self, output_root: &Path) -> PathBuf {
        self.output_directory(output_root).join(self.filename())
    }

    /// Archive destination, increment-suffixed until the name is free.
    pub fn archive_filepath(&self, archive_root: &Path) -> PathBuf {
        let directory = self.archive_directory(archive_root);
        let mut candidate = directory.join(self.filename());
        let mut increment = 0u32;
        while candidate.exists() {
            increment += 1;
            candidate = directory.join(Self::increment_filename(&self.filename(), increment));
        }
        candidate
    }

    pub fn can_write_to_output_file(&self, output_root: &Path) -> bool {
        !self.output_filepath(output_root).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_lines() -> Vec<String> {
        vec![
            "MVPROJ 1".to_string(),
            "Sys 1 249E630 (Len 1)".to_string(),
            "Instructions 4 (Flags 0)".to_string(),
            "Exp 8 2224D790 (InsIdx 4) (ExpFile \"C:\\SPCdata\\old.sta\") (AutoExpFile \"C:\\SPCdata\\old.sta\") (AutoExpFSApSt None) (FldDlm Tab)".to_string(),
            "Rpt 2 (AutoRptFileName \"S:\\Micro-Vu\\old.pdf\")".to_string(),
            "Txt 0 1A2B (Name \"Created By:\") (Txt \"SB\")".to_string(),
            "Txt 0 3C4D (Name \"Edited By and Comments:\") (Txt \"initial release\")".to_string(),
            "Prmt 0 5E6F (Name \"PT #\") (Txt \"PT\")".to_string(),
            "Crc 12 (Name \"ITEM 12.1A 1X\") (Sys 249E630) (DontMeasure)".to_string(),
            "Crc 13 (Name \"INSP 12\") (Tol 0.1)".to_string(),
            "Calc 14 (Name \"ITEM 99\") (Expr 1)".to_string(),
        ]
    }

    fn record() -> ProgramRecord {
        ProgramRecord::from_lines(
            Path::new("NN00160A001-2_OPFAI_REVC_VMM_REV2.iwp"),
            sample_lines(),
            "10",
            "A",
            "",
        )
    }

    #[test]
    fn part_number_is_first_stem_token() {
        assert_eq!(record().part_number(), "NN00160A001-2");
    }

    #[test]
    fn view_name_keeps_mid_stem_rev_tokens() {
        assert_eq!(record().view_name(), "OPFAI REVC VMM");
    }

    #[test]
    fn view_name_variants() {
        let make = |name: &str| {
            ProgramRecord::from_lines(Path::new(name), sample_lines(), "10", "A", "")
        };
        assert_eq!(make("110047396A0_OPFAI_REVA_SP.iwp").view_name(), "OPFAI");
        assert_eq!(make("446007 END VIEW.iwp").view_name(), "END VIEW");
        assert_eq!(make("446007.iwp").view_name(), "");
        assert_eq!(make("PART_REVA_TOP_VIEW.iwp").view_name(), "REVA TOP VIEW");
    }

    #[test]
    fn index_containing_requires_offset_above_one() {
        let rec = ProgramRecord::from_lines(
            Path::new("x.iwp"),
            vec!["Instructions 4".to_string(), "A Instructions 4".to_string()],
            "10",
            "A",
            "",
        );
        // Offset 0 on the first line is degenerate; the second line matches.
        assert_eq!(rec.index_containing("Instructions"), Some(1));
    }

    #[test]
    fn instruction_count_includes_every_name_bearing_line() {
        // Created/Edited/PT# text lines carry (Name …) too; nothing but the
        // offset rule filters them.
        assert_eq!(record().instruction_count(), 6);
    }

    #[test]
    fn dimension_names_exclude_calculators() {
        let dims = record().dimension_names();
        assert_eq!(dims.len(), 2);
        assert_eq!(dims[0].line_index, 8);
        assert_eq!(dims[0].name, "ITEM 12.1A 1X");
        assert_eq!(dims[1].name, "INSP 12");
    }

    #[test]
    fn comment_round_trip() {
        let mut rec = record();
        assert_eq!(rec.comment(), "initial release");
        rec.set_comment("bob");
        assert_eq!(rec.comment(), "bob");
    }

    #[test]
    fn export_filepath_round_trip_and_flag_flip() {
        let mut rec = record();
        assert_eq!(rec.export_filepath(), "C:\\SPCdata\\old.sta");
        rec.set_export_filepath("C:\\Export\\new_.csv");
        assert_eq!(rec.export_filepath(), "C:\\Export\\new_.csv");
        let line = &rec.lines()[3];
        assert!(line.contains("(ExpFile \"C:\\Export\\new_.csv\")"));
        assert!(line.contains("(AutoExpFile \"C:\\Export\\new_.csv\")"));
        assert!(line.contains("(AutoExpFSApSt DT)"));
        assert!(line.contains("(FldDlm CrLf)"));
    }

    #[test]
    fn smartprofile_detection_and_behavior() {
        let mut lines = sample_lines();
        lines[3] = lines[3].replace("old.sta", "OUTPUT.txt");
        let mut rec =
            ProgramRecord::from_lines(Path::new("x_SP.iwp"), lines, "10", "A", "proj");
        assert!(rec.is_smartprofile());
        assert_eq!(rec.export_filepath(), config::SMARTPROFILE_EXPORT_PATH);
        assert!(rec.dimension_names().is_empty());
        assert_eq!(rec.report_filepath(), "");
        rec.set_report_filepath("S:\\anything.pdf");
        assert!(rec.lines()[4].contains("(AutoRptFileName \"\")"));
        rec.set_export_filepath(config::SMARTPROFILE_EXPORT_PATH);
        assert!(rec.lines()[3].contains("(AutoExpFSApSt None)"));
    }

    #[test]
    fn rename_collision_leaves_line_unchanged() {
        let mut rec = record();
        let before = rec.lines()[8].clone();
        // "INSP 12" already exists on line 9.
        rec.update_feature_name(8, "INSP 12");
        assert_eq!(rec.lines()[8], before);
    }

    #[test]
    fn rename_rewrites_name_node() {
        let mut rec = record();
        rec.update_feature_name(8, "INSP_12.1A");
        assert!(rec.lines()[8].contains("(Name \"INSP_12.1A\")"));
    }

    #[test]
    fn instruction_counters_stay_consistent() {
        let mut rec = record();
        rec.insert_line(8, "Prmt 0 77 (Name \"EXTRA\") (Txt \"x\")");
        rec.update_instruction_count();
        assert!(rec.lines()[2].starts_with("Instructions 7"));
        assert!(rec.lines()[3].contains("(InsIdx 7)"));
        rec.delete_line_containing("EXTRA");
        rec.update_instruction_count();
        assert!(rec.lines()[2].starts_with("Instructions 6"));
        assert!(rec.lines()[3].contains("(InsIdx 6)"));
    }

    #[test]
    fn last_system_id_prefers_last_reference() {
        let rec = record();
        assert_eq!(rec.last_system_id().as_deref(), Some("249E630"));
    }

    #[test]
    fn prompt_insertion_index_is_later_anchor() {
        let rec = record();
        assert_eq!(rec.prompt_insertion_index(), Some(6));
    }

    #[test]
    fn prompt_insertion_index_requires_txt_lines() {
        let mut lines = sample_lines();
        lines[5] = lines[5].replace("Txt 0", "Att 0");
        let rec = ProgramRecord::from_lines(Path::new("x.iwp"), lines, "10", "A", "");
        assert_eq!(rec.prompt_insertion_index(), None);
    }

    #[test]
    fn output_and_archive_directories_reroot_around_version() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir
            .path()
            .join("341")
            .join("group")
            .join("part")
            .join("sub")
            .join("x.iwp");
        let rec = ProgramRecord::from_lines(&input, sample_lines(), "10", "A", "");
        let out_root = Path::new("out");
        let arc_root = Path::new("arc");
        assert_eq!(
            rec.output_directory(out_root),
            Path::new("out").join("341").join("part").join("sub")
        );
        assert_eq!(
            rec.archive_directory(arc_root),
            Path::new("arc").join("part").join("sub").join("341")
        );
    }

    #[test]
    fn versionless_inputs_fall_back_to_parent_name() {
        let rec = ProgramRecord::from_lines(
            &Path::new("anywhere").join("Input").join("x.iwp"),
            sample_lines(),
            "10",
            "A",
            "",
        );
        assert_eq!(
            rec.output_directory(Path::new("out")),
            Path::new("out").join("Input")
        );
    }

    #[test]
    fn increment_filename_shape() {
        assert_eq!(
            ProgramRecord::increment_filename("prog.iwp", 2),
            "prog-2.iwp"
        );
        assert_eq!(ProgramRecord::increment_filename("prog", 1), "prog-1");
    }

    #[test]
    fn archive_filepath_increments_past_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let rec = ProgramRecord::from_lines(
            &Path::new("in").join("x.iwp"),
            sample_lines(),
            "10",
            "A",
            "",
        );
        let arc_dir = rec.archive_directory(dir.path());
        std::fs::create_dir_all(&arc_dir).unwrap();
        std::fs::write(arc_dir.join("x.iwp"), b"taken").unwrap();
        assert_eq!(
            rec.archive_filepath(dir.path()),
            arc_dir.join("x-1.iwp")
        );
    }
}
