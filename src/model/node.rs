//! Tagged-node extraction and replacement inside one program line.
//!
//! A node is `tag + start-delimiter + value + end-delimiter` embedded in a
//! line, e.g. `(Name "INSP_12.1A")` or `(InsIdx 156)`. Tag lookup is
//! case-insensitive; the value runs to the first end delimiter after the tag,
//! or to end-of-line when the end delimiter never appears.

/// Byte span of a node's value within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeSpan {
    /// First byte of the value (after the start delimiter).
    value_start: usize,
    /// One past the last byte of the value (at the end delimiter or EOL).
    value_end: usize,
}

/// Locate the value span for `tag` in `line`.
fn find_span(line: &str, tag: &str, start_delim: &str, end_delim: &str) -> Option<NodeSpan> {
    let tag_index = line.to_uppercase().find(&tag.to_uppercase())?;
    let search_from = tag_index + tag.len();
    let begin_rel = line.get(search_from..)?.find(start_delim)?;
    let value_start = search_from + begin_rel + start_delim.len();
    let value_end = line
        .get(value_start..)
        .and_then(|rest| rest.find(end_delim))
        .map(|i| value_start + i)
        .unwrap_or(line.len());
    Some(NodeSpan {
        value_start,
        value_end,
    })
}

/// Extract a node value, trimmed of surrounding whitespace.
///
/// Returns `None` when the tag or its start delimiter is absent; callers are
/// expected to skip the line in that case.
pub fn get_node_text(line: &str, tag: &str, start_delim: &str, end_delim: &str) -> Option<String> {
    let span = find_span(line, tag, start_delim, end_delim)?;
    Some(line[span.value_start..span.value_end].trim().to_string())
}

/// Replace a node value, rebuilding the line around the located span.
///
/// The splice is index-based, so a line carrying two nodes with identical
/// values still only has the addressed one rewritten. Returns `None` when
/// the node is absent, leaving the caller's line untouched.
pub fn set_node_text(
    line: &str,
    tag: &str,
    new_value: &str,
    start_delim: &str,
    end_delim: &str,
) -> Option<String> {
    let span = find_span(line, tag, start_delim, end_delim)?;
    let mut rebuilt = String::with_capacity(line.len() + new_value.len());
    rebuilt.push_str(&line[..span.value_start]);
    rebuilt.push_str(new_value);
    rebuilt.push_str(&line[span.value_end..]);
    Some(rebuilt)
}

/// Extract the full text of a parenthesized node, `(tag …)`, balancing any
/// nested parentheses inside the value.
pub fn get_node<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let opener = format!("({tag}");
    let start = line.find(&opener)?;
    let mut depth = 0usize;
    for (offset, c) in line[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&line[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NAME_LINE: &str =
        "Prmt 0 1EFD3AA8 (Name \"ITEM 12.1A 1X\") (ExpProps Ans) (Txt \"length\")";

    #[test]
    fn get_quoted_node() {
        assert_eq!(
            get_node_text(NAME_LINE, "(Name ", "\"", "\"").as_deref(),
            Some("ITEM 12.1A 1X")
        );
        assert_eq!(
            get_node_text(NAME_LINE, "(Txt ", "\"", "\"").as_deref(),
            Some("length")
        );
    }

    #[test]
    fn tag_lookup_is_case_insensitive() {
        assert_eq!(
            get_node_text(NAME_LINE, "(NAME ", "\"", "\"").as_deref(),
            Some("ITEM 12.1A 1X")
        );
    }

    #[test]
    fn missing_tag_yields_none() {
        assert_eq!(get_node_text(NAME_LINE, "(Bogus ", "\"", "\""), None);
        assert_eq!(set_node_text(NAME_LINE, "(Bogus ", "x", "\"", "\""), None);
    }

    #[test]
    fn missing_end_delimiter_runs_to_end_of_line() {
        let line = "Instructions 156";
        assert_eq!(
            get_node_text(line, "Instructions", " ", " ").as_deref(),
            Some("156")
        );
    }

    #[test]
    fn set_rewrites_only_the_value() {
        let updated = set_node_text(NAME_LINE, "(Name ", "INSP_12.1A", "\"", "\"").unwrap();
        assert_eq!(
            updated,
            "Prmt 0 1EFD3AA8 (Name \"INSP_12.1A\") (ExpProps Ans) (Txt \"length\")"
        );
    }

    #[test]
    fn round_trip_identity() {
        let value = get_node_text(NAME_LINE, "(Name ", "\"", "\"").unwrap();
        let rebuilt = set_node_text(NAME_LINE, "(Name ", &value, "\"", "\"").unwrap();
        assert_eq!(rebuilt, NAME_LINE);
    }

    #[test]
    fn identical_values_address_the_tagged_node() {
        // Both nodes hold "10"; only the (InsIdx …) one moves.
        let line = "Exp 3 (InsIdx 10 ) (Count 10 )";
        let updated = set_node_text(line, "(InsIdx", "42", " ", ")").unwrap();
        assert_eq!(updated, "Exp 3 (InsIdx 42) (Count 10 )");
    }

    #[test]
    fn whole_node_extraction_balances_parens() {
        let line = "Cmd 0 9F (Name \"killFile\") (CmdText \"\"\"C:\\killFile.bat\"\"\" (min)) (Flags 1)";
        assert_eq!(
            get_node(line, "CmdText"),
            Some("(CmdText \"\"\"C:\\killFile.bat\"\"\" (min))")
        );
        assert_eq!(get_node(line, "Bogus"), None);
    }

    #[test]
    fn paren_delimited_counter_node() {
        let line = "Exp 8 2224D790 (InsIdx 156 ) (AutoExpFile \"C:\\out.csv\")";
        assert_eq!(
            get_node_text(line, "(InsIdx", " ", ")").as_deref(),
            Some("156")
        );
        let updated = set_node_text(line, "(InsIdx", "157", " ", ")").unwrap();
        assert_eq!(updated, "Exp 8 2224D790 (InsIdx 157) (AutoExpFile \"C:\\out.csv\")");
    }
}
