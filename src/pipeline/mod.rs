//! The fixed, ordered mutation pipeline that converts one program record.
//!
//! Steps run in a set order per record: export path, report path, dimension
//! renames (or the SmartProfile call for profile programs), prompt section,
//! kill-file call, comment, instruction count, persist. A step failure
//! abandons the record; the source file on disk is never touched until the
//! converted copy has been written.

pub mod templates;

use crate::classify;
use crate::config::{self, Settings, Site};
use crate::encoding;
use crate::error::{ConvertError, Result};
use crate::model::{node, ProgramRecord};
use chrono::Local;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Legacy prompt lines removed before the new block goes in. Each delete is a
/// no-op when the line is absent.
const OLD_PROMPT_ANCHORS: &[&str] = &[
    "Name \"PT #\"",
    "Name \"Employee #\"",
    "Name \"Machine #\"",
    "Name \"PT#\"",
    "Name \"Employee#\"",
    "Name \"Machine#\"",
    "Name \"Run-Setup\"",
    "Name \"Job #\"",
    "Name \"Job#\"",
    "Name \"PT\"",
    "Name \"REV LETTER\"",
    "Name \"OPERATION\"",
    "Name \"EMPLOYEE\"",
    "Name \"JOB\"",
    "Name \"MACHINE\"",
    "Name \"IN PROCESS\"",
    "Name \"SEQUENCE\"",
    "Name \"SPFILENAME\"",
];

/// Marker dropped from the picture line when disabling dimensions.
const METROLOGY_PICTURE_MARKER: &str = "Bring part to Metrology.JPG";

/// Outcome of a batch run. Failures carry the source path so callers can
/// report and move on.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub converted: usize,
    pub failures: Vec<(PathBuf, ConvertError)>,
}

/// Converts program records against one site's settings.
pub struct Processor {
    settings: Settings,
    user_initials: String,
}

impl Processor {
    pub fn new(settings: Settings, user_initials: &str) -> Self {
        Self {
            settings,
            user_initials: user_initials.to_string(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the full step sequence against one record and persist it.
    pub fn process_file(&self, record: &mut ProgramRecord) -> Result<()> {
        info!(file = %record.filename(), smartprofile = record.is_smartprofile(), "converting");
        self.replace_export_filepath(record);
        self.replace_report_filepath(record);
        if record.is_smartprofile() {
            self.inject_smartprofile_call(record)?;
        } else {
            self.replace_dimension_names(record);
        }
        self.replace_prompt_section(record)?;
        self.ensure_kill_file_call(record)?;
        if self.settings.disable_on_convert && record.bring_to_metrology_index().is_none() {
            self.inject_bring_to_metrology_picture(record)?;
        }
        self.update_comment(record);
        if self.settings.disable_on_convert {
            self.disable_dimensions(record);
        }
        if self.settings.remove_bring_to_metrology_pic {
            self.remove_bring_to_metrology_picture(record);
        }
        record.update_instruction_count();
        self.write_output(record)
    }

    /// Convert a batch, continuing past per-record failures.
    pub fn process_files(&self, records: Vec<ProgramRecord>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for mut record in records {
            match self.process_file(&mut record) {
                Ok(()) => outcome.converted += 1,
                Err(e) => {
                    error!(file = %record.filepath().display(), error = %e, "conversion failed");
                    outcome.failures.push((record.filepath().to_path_buf(), e));
                }
            }
        }
        outcome
    }

    // ---- step 1/2: paths ----

    fn replace_export_filepath(&self, record: &mut ProgramRecord) {
        if record.is_smartprofile() {
            record.set_export_filepath(config::SMARTPROFILE_EXPORT_PATH);
            return;
        }
        let path = self.templated_path(record, &self.settings.export_path, ".csv");
        record.set_export_filepath(&path);
    }

    fn replace_report_filepath(&self, record: &mut ProgramRecord) {
        if record.is_smartprofile() {
            record.set_report_filepath("");
            return;
        }
        let path = self.templated_path(record, &self.settings.report_root_path, ".pdf");
        record.set_report_filepath(&path);
    }

    /// `{root}{part}_OP{op}[_{view}]_REV{rev}_{ext}`
    fn templated_path(&self, record: &ProgramRecord, root: &str, extension: &str) -> String {
        let mut path = format!("{root}{}_OP{}", record.part_number(), record.op_number());
        let view_name = record.view_name();
        if !view_name.is_empty() {
            path.push('_');
            path.push_str(&view_name);
        }
        path.push_str(&format!("_REV{}_{extension}", record.rev_number()));
        path
    }

    // ---- step 3: dimension renames ----

    fn replace_dimension_names(&self, record: &mut ProgramRecord) {
        if record.is_smartprofile() {
            return;
        }
        let manual: HashMap<usize, String> = record
            .manual_dimension_names()
            .iter()
            .map(|d| (d.line_index, d.name.clone()))
            .collect();
        for dimension in record.dimension_names() {
            let new_name = match manual.get(&dimension.line_index) {
                Some(hand_edited) => hand_edited.clone(),
                None if self.settings.hand_edit_dimension_names => dimension.name.clone(),
                None => classify::classify(&dimension.name, &self.settings.dimension_root),
            };
            record.update_feature_name(dimension.line_index, &new_name);
        }
    }

    // ---- step 4: SmartProfile call ----

    fn inject_smartprofile_call(&self, record: &mut ProgramRecord) -> Result<()> {
        if let Some(idx) = record.existing_smartprofile_call_index() {
            debug!("normalizing existing SmartProfile call");
            let updated =
                record.lines()[idx].replace("UniversalSmartProfile.py", "OneFactorySP.py");
            record.replace_line(idx, updated);
            return Ok(());
        }
        if record.smartprofile_call_insertion_index().is_none() {
            return Ok(());
        }
        let system_id = record
            .last_system_id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConvertError::UnresolvedPlaceholder {
                placeholder: "<?SYS>".to_string(),
            })?;
        let block = templates::load_block(
            &self.settings.templates_directory,
            templates::CALL_SMARTPROFILE_TEMPLATE,
        )?;
        let call_line = block[0]
            .replace("<?SYS>", &system_id)
            .replace("<?EXE>", &self.settings.smart_profile_exe_filepath)
            .replace("<?SCR>", &self.settings.smart_profile_script_filepath);
        record.append_line(&call_line);
        record.append_line(&block[1]);
        record.append_line(&block[2]);
        Ok(())
    }

    // ---- step 5: prompt section ----

    fn replace_prompt_section(&self, record: &mut ProgramRecord) -> Result<()> {
        match record.prompt_insertion_index() {
            Some(anchor_idx) => self.insert_prompt_block(record, anchor_idx + 1),
            // Anoka programs predate the Created/Edited header convention;
            // their prompts sit in front of the START text instead.
            None if self.settings.site == Site::Anoka => {
                self.insert_prompts_before_start_anchor(record)
            }
            None => Err(ConvertError::MissingAnchor {
                anchor: "Created By / Edited By".to_string(),
            }),
        }
    }

    fn insert_prompt_block(&self, record: &mut ProgramRecord, insert_index: usize) -> Result<()> {
        let prompt_lines = self.load_prompt_lines(record)?;
        self.delete_old_prompts(record);
        for line in &prompt_lines {
            if let Some(substituted) = self.substitute_prompt_line(line, record) {
                record.insert_line(insert_index, &substituted);
            }
        }
        Ok(())
    }

    fn insert_prompts_before_start_anchor(&self, record: &mut ProgramRecord) -> Result<()> {
        let anchor = "(Name \"START";
        let insert_idx = record
            .index_containing(anchor)
            .ok_or_else(|| ConvertError::MissingAnchor {
                anchor: anchor.to_string(),
            })?;
        // Purge stray prompt records between the export line and the anchor.
        let start_idx = record.index_containing("AutoExpFile").unwrap_or(0);
        let mut idx = insert_idx;
        while idx > start_idx {
            if record.lines()[idx].starts_with("Prmt") {
                record.remove_line(idx);
            }
            idx -= 1;
        }
        let insert_index = record
            .index_containing(anchor)
            .ok_or_else(|| ConvertError::MissingAnchor {
                anchor: anchor.to_string(),
            })?;
        let prompt_lines = self.load_prompt_lines(record)?;
        for line in &prompt_lines {
            if let Some(substituted) = self.substitute_prompt_line(line, record) {
                record.insert_line(insert_index, &substituted);
            }
        }
        Ok(())
    }

    fn load_prompt_lines(&self, record: &ProgramRecord) -> Result<Vec<String>> {
        let name = if record.is_smartprofile() {
            templates::SP_PROMPT_TEMPLATE
        } else {
            templates::PROMPT_TEMPLATE
        };
        templates::load_lines(&self.settings.templates_directory, name)
    }

    fn delete_old_prompts(&self, record: &mut ProgramRecord) {
        for anchor in OLD_PROMPT_ANCHORS {
            record.delete_line_containing(anchor);
        }
    }

    /// Recognized prompt lines pass through with their placeholder filled in;
    /// anything else in the template is ignored.
    fn substitute_prompt_line(&self, line: &str, record: &ProgramRecord) -> Option<String> {
        const VERBATIM_PROMPTS: &[&str] = &[
            "(Name \"IN PROCESS\")",
            "(Name \"MACHINE\")",
            "(Name \"JOB\")",
            "(Name \"EMPLOYEE\")",
            "(Name \"SEQUENCE\")",
        ];
        if VERBATIM_PROMPTS.iter().any(|name| line.contains(name)) {
            return Some(line.to_string());
        }
        if line.contains("(Name \"OPERATION\")") {
            return Some(line.replace("<O>", record.op_number()));
        }
        if line.contains("(Name \"REV LETTER\")") {
            return Some(line.replace("<R>", record.rev_number()));
        }
        if line.contains("(Name \"PT\")") {
            return Some(line.replace("<P>", &record.part_number()));
        }
        if line.contains("(Name \"SPFILENAME\")") {
            return Some(line.replace("<SPF>", record.smartprofile_projectname()));
        }
        None
    }

    // ---- step 6: kill-file call ----

    fn ensure_kill_file_call(&self, record: &mut ProgramRecord) -> Result<()> {
        if let Some(idx) = record.kill_file_call_index() {
            let line = &record.lines()[idx];
            if let Some(node_text) = node::get_node(line, "CmdText") {
                let updated = line.replace(node_text, config::KILL_FILE_COMMAND);
                record.replace_line(idx, updated);
            }
            return Ok(());
        }
        let instructions_idx =
            record
                .instructions_index()
                .ok_or_else(|| ConvertError::MissingAnchor {
                    anchor: "Instructions".to_string(),
                })?;
        let block = templates::load_block(
            &self.settings.templates_directory,
            templates::TEXT_KILL_TEMPLATE,
        )?;
        let insert_at = instructions_idx + 1;
        record.insert_line(insert_at, &block[2]);
        record.insert_line(insert_at, &block[1]);
        record.insert_line(insert_at, &block[0]);
        Ok(())
    }

    // ---- metrology picture (disable-on-convert support) ----

    fn inject_bring_to_metrology_picture(&self, record: &mut ProgramRecord) -> Result<()> {
        let Some(kill_idx) = record.kill_file_call_index() else {
            return Ok(());
        };
        let block = templates::load_block(
            &self.settings.templates_directory,
            templates::BRING_TO_METROLOGY_TEMPLATE,
        )?;
        let insert_at = kill_idx + 1;
        record.insert_line(insert_at, &block[2]);
        record.insert_line(insert_at, &block[1]);
        record.insert_line(insert_at, &block[0]);
        Ok(())
    }

    fn remove_bring_to_metrology_picture(&self, record: &mut ProgramRecord) {
        let Some(idx) = record.bring_to_metrology_index() else {
            return;
        };
        for _ in 0..3 {
            if idx < record.lines().len() {
                record.remove_line(idx);
            }
        }
    }

    fn disable_dimensions(&self, record: &mut ProgramRecord) {
        for idx in 0..record.lines().len() {
            let line = record.lines()[idx].clone();
            if line.contains("AutoExpFile") {
                let updated = line
                    .replace("(AutoRpt 1)", "(AutoRpt 0)")
                    .replace("(AutoConf 1)", "(AutoConf 0)");
                record.replace_line(idx, updated);
                continue;
            }
            if !line.contains("(Name ")
                || line.contains(config::KILL_FILE_MARKER)
                || line.contains(METROLOGY_PICTURE_MARKER)
                || line.contains("(DontMeasure)")
            {
                continue;
            }
            record.replace_line(idx, format!("{line} (DontMeasure)"));
        }
    }

    // ---- step 7: comment ----

    fn update_comment(&self, record: &mut ProgramRecord) {
        let date_text = Local::now().format("%m/%d/%Y");
        // The \r\n stays literal text: the comment node uses the MicroVu
        // escape syntax, not real line breaks.
        let suffix = format!(
            "\\r\\nConverted program to work with 1Factory. {} {date_text}.",
            self.user_initials
        );
        let mut comment = record.comment();
        comment.push_str(&suffix);
        record.set_comment(&comment);
    }

    // ---- step 9: persist ----

    fn write_output(&self, record: &ProgramRecord) -> Result<()> {
        let output_directory = record.output_directory(&self.settings.output_root_directory);
        let output_filepath = output_directory.join(record.filename());
        if output_filepath.exists() {
            return Err(ConvertError::OutputCollision {
                file_name: record.filename(),
                directory: output_directory,
            });
        }
        fs::create_dir_all(&output_directory)?;

        if self.settings.archive_original {
            let archive_filepath = record.archive_filepath(&self.settings.archive_root_directory);
            if let Some(parent) = archive_filepath.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(record.filepath(), &archive_filepath)?;
            debug!(archive = %archive_filepath.display(), "archived original");
        }

        encoding::write_program_lines(&output_filepath, record.lines())?;
        info!(output = %output_filepath.display(), "wrote converted program");

        if self.settings.allow_delete {
            fs::remove_file(record.filepath())?;
            if let Some(parent) = record.filepath().parent() {
                let is_empty = fs::read_dir(parent)
                    .map(|mut entries| entries.next().is_none())
                    .unwrap_or(false);
                if is_empty {
                    let _ = fs::remove_dir(parent);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn test_settings(templates_directory: &Path) -> Settings {
        Settings {
            site: Site::CoonRapids,
            dimension_root: "INSP_".to_string(),
            export_path: "C:\\Export\\".to_string(),
            report_root_path: "S:\\Micro-Vu\\".to_string(),
            output_root_directory: PathBuf::from("out"),
            archive_root_directory: PathBuf::from("archive"),
            smart_profile_exe_filepath: "C:\\sp\\SmartProfile.exe".to_string(),
            smart_profile_script_filepath: "C:\\sp\\OneFactorySP.py".to_string(),
            templates_directory: templates_directory.to_path_buf(),
            hand_edit_dimension_names: false,
            allow_delete: false,
            archive_original: false,
            disable_on_convert: false,
            remove_bring_to_metrology_pic: false,
        }
    }

    fn sample_record() -> ProgramRecord {
        ProgramRecord::from_lines(
            Path::new("NN00160A001-2_OPFAI_REVC_VMM_REV2.iwp"),
            vec![
                "MVPROJ 1".to_string(),
                "Instructions 4 (Flags 0)".to_string(),
                "Exp 8 2224D790 (InsIdx 4) (ExpFile \"C:\\SPCdata\\old.sta\") (AutoExpFile \"C:\\SPCdata\\old.sta\") (AutoExpFSApSt None) (FldDlm Tab)".to_string(),
                "Rpt 2 (AutoRptFileName \"S:\\Micro-Vu\\old.pdf\")".to_string(),
                "Txt 0 1A2B (Name \"Created By:\") (Txt \"SB\")".to_string(),
                "Txt 0 3C4D (Name \"Edited By and Comments:\") (Txt \"initial\")".to_string(),
                "Crc 12 (Name \"ITEM 12.1A 1X\") (Sys 249E630)".to_string(),
                "Crc 13 (Name \"INSP-12_1X\") (Tol 0.1)".to_string(),
            ],
            "10",
            "A",
            "",
        )
    }

    #[test]
    fn export_path_rewrite_is_idempotent() {
        let processor = Processor::new(test_settings(Path::new("templates")), "JTW");
        let mut record = sample_record();
        processor.replace_export_filepath(&mut record);
        let first = record.export_filepath();
        processor.replace_export_filepath(&mut record);
        assert_eq!(record.export_filepath(), first);
        assert!(first.ends_with("NN00160A001-2_OP10_OPFAI REVC VMM_REVA_.csv"));
    }

    #[test]
    fn report_path_follows_the_same_template() {
        let processor = Processor::new(test_settings(Path::new("templates")), "JTW");
        let mut record = sample_record();
        processor.replace_report_filepath(&mut record);
        assert_eq!(
            record.report_filepath(),
            "S:\\Micro-Vu\\NN00160A001-2_OP10_OPFAI REVC VMM_REVA_.pdf"
        );
    }

    #[test]
    fn dimension_renames_consult_the_classifier() {
        let processor = Processor::new(test_settings(Path::new("templates")), "JTW");
        let mut record = sample_record();
        processor.replace_dimension_names(&mut record);
        assert!(record.lines()[6].contains("(Name \"INSP_12.1A\")"));
        assert!(record.lines()[7].contains("(Name \"INSP_12A\")"));
    }

    #[test]
    fn hand_edit_mode_keeps_raw_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = test_settings(dir.path());
        settings.hand_edit_dimension_names = true;
        let processor = Processor::new(settings, "JTW");
        let mut record = sample_record();
        processor.replace_dimension_names(&mut record);
        assert!(record.lines()[6].contains("(Name \"ITEM 12.1A 1X\")"));
    }

    #[test]
    fn manual_overrides_beat_the_classifier() {
        let processor = Processor::new(test_settings(Path::new("templates")), "JTW");
        let mut record = sample_record();
        record.set_manual_dimension_names(vec![crate::model::DimensionName {
            line_index: 6,
            name: "INSP_99".to_string(),
        }]);
        processor.replace_dimension_names(&mut record);
        assert!(record.lines()[6].contains("(Name \"INSP_99\")"));
        assert!(record.lines()[7].contains("(Name \"INSP_12A\")"));
    }

    #[test]
    fn prompt_lines_are_substituted_by_name() {
        let processor = Processor::new(test_settings(Path::new("templates")), "JTW");
        let record = sample_record();
        let op = processor.substitute_prompt_line(
            "Prmt 0 1 (Name \"OPERATION\") (Txt \"<O>\")",
            &record,
        );
        assert_eq!(op.as_deref(), Some("Prmt 0 1 (Name \"OPERATION\") (Txt \"10\")"));
        let pt = processor.substitute_prompt_line("Prmt 0 2 (Name \"PT\") (Txt \"<P>\")", &record);
        assert_eq!(
            pt.as_deref(),
            Some("Prmt 0 2 (Name \"PT\") (Txt \"NN00160A001-2\")")
        );
        let stray = processor.substitute_prompt_line("Prmt 0 3 (Name \"OTHER\")", &record);
        assert_eq!(stray, None);
    }

    #[test]
    fn missing_prompt_anchor_fails_for_coon_rapids() {
        let dir = tempfile::tempdir().unwrap();
        let processor = Processor::new(test_settings(dir.path()), "JTW");
        let mut record = ProgramRecord::from_lines(
            Path::new("x.iwp"),
            vec!["MVPROJ 1".to_string(), "Instructions 0".to_string()],
            "10",
            "A",
            "",
        );
        let err = processor.replace_prompt_section(&mut record).unwrap_err();
        assert!(matches!(err, ConvertError::MissingAnchor { .. }));
    }

    #[test]
    fn existing_kill_file_call_is_normalized() {
        let processor = Processor::new(test_settings(Path::new("templates")), "JTW");
        let mut record = ProgramRecord::from_lines(
            Path::new("x.iwp"),
            vec![
                "Instructions 1".to_string(),
                "Cmd 0 9F (Name \"kill\") (CmdText \"\"\"C:\\killFile.bat\"\"\" /min)".to_string(),
            ],
            "10",
            "A",
            "",
        );
        processor.ensure_kill_file_call(&mut record).unwrap();
        assert_eq!(
            record.lines()[1],
            format!("Cmd 0 9F (Name \"kill\") {}", config::KILL_FILE_COMMAND)
        );
    }

    #[test]
    fn kill_file_injection_lands_after_instructions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(templates::TEXT_KILL_TEMPLATE),
            "TextKill block\nkill one\nkill two\nkill three\n",
        )
        .unwrap();
        let processor = Processor::new(test_settings(dir.path()), "JTW");
        let mut record = sample_record();
        processor.ensure_kill_file_call(&mut record).unwrap();
        assert_eq!(record.lines()[2], "kill one");
        assert_eq!(record.lines()[3], "kill two");
        assert_eq!(record.lines()[4], "kill three");
    }

    #[test]
    fn disable_marks_dimensions_and_flips_export_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = test_settings(dir.path());
        settings.disable_on_convert = true;
        let processor = Processor::new(settings, "JTW");
        let mut record = ProgramRecord::from_lines(
            Path::new("x.iwp"),
            vec![
                "Exp 8 (AutoExpFile \"C:\\x.csv\") (AutoRpt 1) (AutoConf 1)".to_string(),
                "Crc 12 (Name \"INSP_1\") (Tol 0.1)".to_string(),
                "Crc 13 (Name \"INSP_2\") (DontMeasure)".to_string(),
                "Cmd 0 (Name \"kill\") (CmdText \"\"\"C:\\killFile.bat\"\"\")".to_string(),
            ],
            "10",
            "A",
            "",
        );
        processor.disable_dimensions(&mut record);
        assert!(record.lines()[0].contains("(AutoRpt 0)"));
        assert!(record.lines()[0].contains("(AutoConf 0)"));
        assert!(record.lines()[1].ends_with("(Tol 0.1) (DontMeasure)"));
        // Already disabled and kill-file lines stay put.
        assert_eq!(record.lines()[2], "Crc 13 (Name \"INSP_2\") (DontMeasure)");
        assert!(!record.lines()[3].contains("(DontMeasure)"));
    }

    #[test]
    fn comment_suffix_carries_initials() {
        let processor = Processor::new(test_settings(Path::new("templates")), "JTW");
        let mut record = sample_record();
        processor.update_comment(&mut record);
        let comment = record.comment();
        assert!(comment.starts_with("initial\\r\\nConverted program to work with 1Factory. JTW "));
        assert!(comment.ends_with('.'));
    }
}
