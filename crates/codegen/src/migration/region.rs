//! Generated region markers and rendering

use seedsync_core::{SyncError, SyncResult};

/// Line written inside a region whose statement list is empty
pub const NO_CHANGES: &str = "// (no changes)";

/// A generator-owned block inside the migration method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    SeedData,
    SqlObjects,
}

impl Region {
    /// Title used in both markers
    pub fn title(&self) -> &'static str {
        match self {
            Region::SeedData => "SEED DATA",
            Region::SqlObjects => "SQL OBJECTS",
        }
    }

    pub fn begin_marker(&self) -> String {
        format!("// BEGIN {} (generated)", self.title())
    }

    pub fn end_marker(&self) -> String {
        format!("// END {} (generated)", self.title())
    }

    /// Locate this region's markers in `content`.
    ///
    /// Returns `None` when neither marker is present, or the byte offsets of
    /// the begin and end markers. A marker without its counterpart, a
    /// repeated marker, or an end before its begin is an error.
    pub fn locate(&self, content: &str) -> SyncResult<Option<(usize, usize)>> {
        let begin_marker = self.begin_marker();
        let end_marker = self.end_marker();
        let begins: Vec<usize> = content.match_indices(&begin_marker).map(|(i, _)| i).collect();
        let ends: Vec<usize> = content.match_indices(&end_marker).map(|(i, _)| i).collect();

        match (begins.as_slice(), ends.as_slice()) {
            ([], []) => Ok(None),
            ([begin], [end]) if begin < end => Ok(Some((*begin, *end))),
            ([_], [_]) => Err(SyncError::malformed_region(
                begin_marker,
                "end marker precedes begin marker",
            )),
            ([_], []) => Err(SyncError::malformed_region(begin_marker, "missing end marker")),
            ([], [_]) => Err(SyncError::malformed_region(end_marker, "missing begin marker")),
            _ => Err(SyncError::malformed_region(
                begin_marker,
                format!(
                    "expected one begin and one end marker, found {} and {}",
                    begins.len(),
                    ends.len()
                ),
            )),
        }
    }

    /// Render the full region block, terminated by `newline`.
    ///
    /// Every statement becomes one `migrationBuilder.Sql(@"...")` call
    /// followed by a blank line. An empty list renders the no-changes line.
    /// `newline` applies to the generated lines only; statement text is kept
    /// as given.
    pub fn render(&self, statements: &[String], indent: &str, newline: &str) -> String {
        let mut out = String::new();
        out.push_str(indent);
        out.push_str(&self.begin_marker());
        out.push_str(newline);

        if statements.is_empty() {
            out.push_str(indent);
            out.push_str(NO_CHANGES);
            out.push_str(newline);
        } else {
            for statement in statements {
                out.push_str(indent);
                out.push_str(&sql_call(statement));
                out.push_str(newline);
                out.push_str(newline);
            }
        }

        out.push_str(indent);
        out.push_str(&self.end_marker());
        out.push_str(newline);
        out
    }
}

/// `migrationBuilder.Sql(@"...");` with `"` doubled for the verbatim string.
///
/// Line breaks inside the statement are emitted unchanged; they may sit in
/// string literals.
pub fn sql_call(statement: &str) -> String {
    format!("migrationBuilder.Sql(@\"{}\");", statement.replace('"', "\"\""))
}

// ============================================================================
// Tests
// ============================================================================
