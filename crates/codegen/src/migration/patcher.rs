//! Migration file patcher
//!
//! [`apply`] rewrites the generated regions of a migration file and returns
//! the new text. It never touches the file system.
//!
//! ## Placement
//!
//! | Seed markers | Object markers | Action                                                  |
//! |--------------|----------------|---------------------------------------------------------|
//! | present      | present        | replace both regions in place                           |
//! | absent       | absent         | insert both right after the `Up` method's opening brace |
//! | present      | absent         | replace seed region, insert objects region after it     |
//! | absent       | present        | replace objects region, insert seed region before it    |

use super::region::Region;
use seedsync_core::{SyncError, SyncResult};

/// Accepted spellings of the forward migration method
pub const UP_SIGNATURES: [&str; 2] = [
    "protected override void Up(MigrationBuilder migrationBuilder)",
    "public override void Up(MigrationBuilder migrationBuilder)",
];

/// Indent used when the method body gives no hint
pub const DEFAULT_INDENT: &str = "        ";

/// `\r\n` if it appears anywhere outside the generated regions, else `\n`.
///
/// Region bodies carry statement text verbatim, so line breaks inside seed
/// values never decide the file's style.
pub fn detect_newline(content: &str) -> &'static str {
    let mut spans: Vec<(usize, usize)> = [Region::SeedData, Region::SqlObjects]
        .iter()
        .filter_map(|region| region.locate(content).ok().flatten())
        .collect();
    spans.sort_unstable();

    let mut cursor = 0;
    for (begin, end) in spans {
        if begin > cursor && content[cursor..begin].contains("\r\n") {
            return "\r\n";
        }
        cursor = cursor.max(end);
    }
    if content[cursor..].contains("\r\n") { "\r\n" } else { "\n" }
}

/// Rewrite both generated regions of `content`.
pub fn apply(content: &str, seed_sql: &[String], object_sql: &[String]) -> SyncResult<String> {
    let seed = Region::SeedData.locate(content)?;
    let objects = Region::SqlObjects.locate(content)?;
    if let (Some(seed), Some(objects)) = (seed, objects) {
        check_disjoint(seed, objects)?;
    }

    let newline = detect_newline(content);
    let (brace, indent) = find_up_method(content)?;

    let seed_block = Region::SeedData.render(seed_sql, &indent, newline);
    let object_block = Region::SqlObjects.render(object_sql, &indent, newline);

    let patched = match (seed.is_some(), objects.is_some()) {
        (false, false) => {
            let combined = format!("{seed_block}{newline}{object_block}");
            insert_after_brace(content, &combined, brace, newline)
        }
        (true, true) => {
            let updated = replace_region(content, Region::SeedData, &seed_block, newline)?;
            replace_region(&updated, Region::SqlObjects, &object_block, newline)?
        }
        (true, false) => {
            let updated = replace_region(content, Region::SeedData, &seed_block, newline)?;
            insert_after_region(&updated, Region::SeedData, &object_block, newline)?
        }
        (false, true) => {
            let updated = replace_region(content, Region::SqlObjects, &object_block, newline)?;
            insert_before_region(&updated, Region::SqlObjects, &seed_block, newline)?
        }
    };

    Ok(patched)
}

/// Byte offset of the `Up` method's opening brace and the body indent.
fn find_up_method(content: &str) -> SyncResult<(usize, String)> {
    let signature = UP_SIGNATURES
        .iter()
        .find_map(|sig| content.find(sig))
        .ok_or_else(|| SyncError::MethodNotFound(UP_SIGNATURES.join(" | ")))?;

    let brace = content[signature..]
        .find('{')
        .map(|offset| signature + offset)
        .ok_or_else(|| SyncError::MethodNotFound(UP_SIGNATURES.join(" | ")))?;

    Ok((brace, body_indent(content, brace)))
}

/// Leading whitespace of the first line after the brace line, or the default
/// when that line is blank or closes the method.
fn body_indent(content: &str, brace: usize) -> String {
    let start = line_end(content, brace);
    if start == content.len() {
        return DEFAULT_INDENT.to_string();
    }
    let stop = line_end(content, start);
    let line = content[start..stop].trim_end_matches(['\r', '\n']);

    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('}') {
        return DEFAULT_INDENT.to_string();
    }
    line[..line.len() - trimmed.len()].to_string()
}

fn check_disjoint(seed: (usize, usize), objects: (usize, usize)) -> SyncResult<()> {
    let overlaps = seed.0 < objects.1 && objects.0 < seed.1;
    if overlaps {
        return Err(SyncError::malformed_region(
            Region::SeedData.begin_marker(),
            "seed and SQL object regions overlap",
        ));
    }
    Ok(())
}

// Line boundaries are found on `\n` alone; a `\r` before it belongs to the
// break. Statement text inside a region may use either style.

/// Start of the line containing byte `index`.
fn line_start(content: &str, index: usize) -> usize {
    content[..index].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// End of the line containing byte `index`, including its line break.
fn line_end(content: &str, index: usize) -> usize {
    content[index..]
        .find('\n')
        .map(|i| index + i + 1)
        .unwrap_or(content.len())
}

fn located(content: &str, region: Region) -> SyncResult<(usize, usize)> {
    region
        .locate(content)?
        .ok_or_else(|| SyncError::malformed_region(region.begin_marker(), "region not found"))
}

/// Replace the full lines from the begin marker to the end marker with `block`.
fn replace_region(content: &str, region: Region, block: &str, newline: &str) -> SyncResult<String> {
    let (begin, end) = located(content, region)?;
    let start = line_start(content, begin);
    let stop = line_end(content, end);

    let mut out = String::with_capacity(content.len() + block.len());
    out.push_str(&content[..start]);
    if stop == content.len() && !content.ends_with('\n') {
        // end marker was the file's last line without a trailing break
        out.push_str(block.strip_suffix(newline).unwrap_or(block));
    } else {
        out.push_str(block);
    }
    out.push_str(&content[stop..]);
    Ok(out)
}

fn insert_after_brace(content: &str, block: &str, brace: usize, newline: &str) -> String {
    let at = line_end(content, brace);
    if at == content.len() && !content.ends_with('\n') {
        let at = brace + 1;
        return format!("{}{newline}{block}{}", &content[..at], &content[at..]);
    }
    format!("{}{block}{newline}{}", &content[..at], &content[at..])
}

fn insert_after_region(content: &str, anchor: Region, block: &str, newline: &str) -> SyncResult<String> {
    let (_, end) = located(content, anchor)?;
    let at = line_end(content, end);
    if at == content.len() && !content.ends_with('\n') {
        return Ok(format!("{content}{newline}{block}"));
    }
    Ok(format!("{}{block}{newline}{}", &content[..at], &content[at..]))
}

fn insert_before_region(content: &str, anchor: Region, block: &str, newline: &str) -> SyncResult<String> {
    let (begin, _) = located(content, anchor)?;
    let at = line_start(content, begin);
    Ok(format!("{}{block}{newline}{}", &content[..at], &content[at..]))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MIGRATION: &str = "\
using Microsoft.EntityFrameworkCore.Migrations;

namespace LastCall.Migrations
{
    public partial class SeedDrinks : Migration
    {
        protected override void Up(MigrationBuilder migrationBuilder)
        {
            migrationBuilder.AddColumn<bool>(name: \"IsDeleted\", table: \"Drinks\");
        }

        protected override void Down(MigrationBuilder migrationBuilder)
        {
        }
    }
}
";

    fn stmts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_run_inserts_both_regions_after_brace() {
        let patched = apply(MIGRATION, &stmts(&["INSERT INTO t VALUES (1);"]), &[]).unwrap();

        let expected = MIGRATION.replace(
            "        {\n            migrationBuilder.AddColumn",
            "        {\n\
             \x20           // BEGIN SEED DATA (generated)\n\
             \x20           migrationBuilder.Sql(@\"INSERT INTO t VALUES (1);\");\n\
             \n\
             \x20           // END SEED DATA (generated)\n\
             \n\
             \x20           // BEGIN SQL OBJECTS (generated)\n\
             \x20           // (no changes)\n\
             \x20           // END SQL OBJECTS (generated)\n\
             \n\
             \x20           migrationBuilder.AddColumn",
        );
        assert_eq!(patched, expected);
    }

    #[test]
    fn test_repeat_run_is_stable() {
        let seed = stmts(&["INSERT INTO t VALUES (1);"]);
        let objects = stmts(&["CREATE OR REPLACE FUNCTION f() RETURNS int AS $$ SELECT 1 $$;"]);
        let once = apply(MIGRATION, &seed, &objects).unwrap();
        let twice = apply(&once, &seed, &objects).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_replace_shows_no_changes() {
        let once = apply(MIGRATION, &stmts(&["INSERT INTO t VALUES (1);"]), &[]).unwrap();
        let twice = apply(&once, &[], &[]).unwrap();

        assert!(!twice.contains("INSERT INTO t"));
        assert_eq!(twice.matches("// (no changes)").count(), 2);
        assert_eq!(twice.matches("// BEGIN SEED DATA (generated)").count(), 1);
        assert!(twice.contains("            migrationBuilder.AddColumn<bool>"));
    }

    #[test]
    fn test_seed_only_inserts_objects_after_seed() {
        let seed_only = MIGRATION.replace(
            "        {\n            migrationBuilder.AddColumn",
            "        {\n            // BEGIN SEED DATA (generated)\n            // (no changes)\n            // END SEED DATA (generated)\n            migrationBuilder.AddColumn",
        );
        let patched = apply(&seed_only, &[], &stmts(&["DROP FUNCTION f;"])).unwrap();

        let expected = "            // END SEED DATA (generated)\n\
                        \x20           // BEGIN SQL OBJECTS (generated)\n\
                        \x20           migrationBuilder.Sql(@\"DROP FUNCTION f;\");\n\
                        \n\
                        \x20           // END SQL OBJECTS (generated)\n\
                        \n\
                        \x20           migrationBuilder.AddColumn";
        assert!(patched.contains(expected), "{patched}");
    }

    #[test]
    fn test_objects_only_inserts_seed_before_objects() {
        let objects_only = MIGRATION.replace(
            "        {\n            migrationBuilder.AddColumn",
            "        {\n            // BEGIN SQL OBJECTS (generated)\n            // (no changes)\n            // END SQL OBJECTS (generated)\n            migrationBuilder.AddColumn",
        );
        let patched = apply(&objects_only, &stmts(&["DELETE FROM t;"]), &[]).unwrap();

        let expected = "        {\n\
                        \x20           // BEGIN SEED DATA (generated)\n\
                        \x20           migrationBuilder.Sql(@\"DELETE FROM t;\");\n\
                        \n\
                        \x20           // END SEED DATA (generated)\n\
                        \n\
                        \x20           // BEGIN SQL OBJECTS (generated)\n";
        assert!(patched.contains(expected), "{patched}");
    }

    #[test]
    fn test_crlf_framing_with_verbatim_statement() {
        let crlf = MIGRATION.replace('\n', "\r\n");
        let seed = stmts(&["INSERT INTO t VALUES ('line1\nline2');"]);
        let patched = apply(&crlf, &seed, &[]).unwrap();

        assert!(patched.contains(
            "            // BEGIN SEED DATA (generated)\r\n\
             \x20           migrationBuilder.Sql(@\"INSERT INTO t VALUES ('line1\nline2');\");\r\n\
             \r\n\
             \x20           // END SEED DATA (generated)\r\n"
        ));
        let outside = patched.replace("'line1\nline2'", "");
        assert!(!outside.replace("\r\n", "").contains('\n'));
        assert_eq!(apply(&patched, &seed, &[]).unwrap(), patched);
    }

    #[test]
    fn test_crlf_inside_statement_keeps_lf_file_stable() {
        let seed = stmts(&["INSERT INTO t VALUES ('line1\r\nline2');"]);
        let once = apply(MIGRATION, &seed, &[]).unwrap();
        assert!(once.starts_with("using Microsoft.EntityFrameworkCore.Migrations;\n\n"));
        assert_eq!(detect_newline(&once), "\n");

        let twice = apply(&once, &seed, &[]).unwrap();
        assert_eq!(twice, once);

        let cleared = apply(&twice, &[], &[]).unwrap();
        assert!(cleared.starts_with("using Microsoft.EntityFrameworkCore.Migrations;\n\n"));
        assert!(!cleared.contains('\r'));
        assert_eq!(cleared.matches("// (no changes)").count(), 2);
    }

    #[test]
    fn test_overlapping_regions_rejected() {
        let overlapping = MIGRATION.replace(
            "        {\n            migrationBuilder.AddColumn",
            "        {\n\
             \x20           // BEGIN SEED DATA (generated)\n\
             \x20           // BEGIN SQL OBJECTS (generated)\n\
             \x20           // END SEED DATA (generated)\n\
             \x20           // END SQL OBJECTS (generated)\n\
             \x20           migrationBuilder.AddColumn",
        );
        let err = apply(&overlapping, &[], &[]).unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_public_signature_accepted() {
        let public = MIGRATION.replace("protected override void Up", "public override void Up");
        assert!(apply(&public, &[], &[]).is_ok());
    }

    #[test]
    fn test_method_not_found() {
        let err = apply("class Empty {}", &[], &[]).unwrap_err();
        assert!(matches!(err, SyncError::MethodNotFound(_)));
    }

    #[test]
    fn test_begin_without_end_is_fatal() {
        let broken = MIGRATION.replace(
            "        {\n            migrationBuilder.AddColumn",
            "        {\n            // BEGIN SEED DATA (generated)\n            migrationBuilder.AddColumn",
        );
        let err = apply(&broken, &[], &[]).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRegion { .. }));
    }

    #[test]
    fn test_empty_method_uses_default_indent() {
        let empty = "protected override void Up(MigrationBuilder migrationBuilder)\n{\n}\n";
        let patched = apply(empty, &[], &[]).unwrap();
        assert!(patched.starts_with(
            "protected override void Up(MigrationBuilder migrationBuilder)\n{\n        // BEGIN SEED DATA (generated)\n"
        ));
        assert!(patched.ends_with("        // END SQL OBJECTS (generated)\n\n}\n"));
    }

    #[test]
    fn test_statement_quotes_escaped() {
        let patched = apply(MIGRATION, &stmts(&["DELETE FROM \"App\".\"Drinks\";"]), &[]).unwrap();
        assert!(patched.contains("migrationBuilder.Sql(@\"DELETE FROM \"\"App\"\".\"\"Drinks\"\";\");"));
    }

    #[test]
    fn test_detect_newline() {
        assert_eq!(detect_newline("a\nb\r\nc"), "\r\n");
        assert_eq!(detect_newline("a\nb"), "\n");
        assert_eq!(detect_newline(""), "\n");

        let region_only = "a\n// BEGIN SEED DATA (generated)\nx\r\ny\n// END SEED DATA (generated)\nb\n";
        assert_eq!(detect_newline(region_only), "\n");
        assert_eq!(detect_newline(&region_only.replace("b\n", "b\r\n")), "\r\n");
    }
}
