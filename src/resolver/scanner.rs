//! Tokenizing scans over comment text
//!
//! Each scan returns span records that are resolved independently and then
//! spliced into the comment in one pass, so resolved `module:` paths are
//! never scanned again within the same step.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

const IMPORT_OPEN: &str = "import(\"";
const FIRES_TAG: &str = "@fires ";

static CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?\s*\*\s").expect("valid continuation pattern"));
static TYPEDEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@typedef \{[^}]*\} ([^ \r?\n]*)").expect("valid typedef pattern"));

/// `import("<specifier>").<export>` inside a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference<'a> {
    /// From `import` up to, not including, the terminating character
    pub span: Range<usize>,
    pub specifier: &'a str,
    pub export: &'a str,
}

/// A bare identifier sitting in a type position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSlot<'a> {
    pub span: Range<usize>,
    pub name: &'a str,
}

/// Characters that end the export name of an import reference.
pub fn is_export_terminator(c: char) -> bool {
    matches!(
        c,
        ' ' | '.' | '|' | '}' | '>' | '<' | ',' | ')' | '=' | '\n' | '\r'
    )
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Type-of annotations resolve to the same path as instance types.
pub fn strip_typeof(text: &str) -> String {
    text.replace("typeof ", "")
}

pub fn scan_import_references(text: &str) -> Vec<ImportReference<'_>> {
    let mut refs = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find(IMPORT_OPEN) {
        let start = pos + offset;
        let specifier_start = start + IMPORT_OPEN.len();

        let Some(quote) = text[specifier_start..].find('"') else {
            break;
        };
        let specifier_end = specifier_start + quote;

        let rest = &text[specifier_end..];
        if !rest.starts_with("\").") {
            pos = start + 1;
            continue;
        }

        let export_start = specifier_end + 3;
        // unterminated at end of text: not a reference
        let Some(len) = text[export_start..].find(is_export_terminator) else {
            break;
        };
        let export_end = export_start + len;

        refs.push(ImportReference {
            span: start..export_end,
            specifier: &text[specifier_start..specifier_end],
            export: &text[export_start..export_end],
        });
        pos = export_end;
    }

    refs
}

/// Identifiers preceded by `@fires ` or by one of `{ < | ,` plus an optional
/// space. Identifiers followed by `:` are skipped.
pub fn scan_type_slots(text: &str) -> Vec<TypeSlot<'_>> {
    let mut slots = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        let candidate = if rest.starts_with(FIRES_TAG) {
            Some(pos + FIRES_TAG.len())
        } else if matches!(c, '{' | '<' | '|' | ',') {
            let next = pos + 1;
            if text[next..].starts_with(' ') {
                Some(next + 1)
            } else {
                Some(next)
            }
        } else {
            None
        };

        let Some(start) = candidate else {
            pos += c.len_utf8();
            continue;
        };

        let len = text[start..]
            .find(|ch: char| !is_identifier_char(ch))
            .unwrap_or(text.len() - start);
        let end = start + len;

        if len == 0 {
            pos = start.max(pos + c.len_utf8());
            continue;
        }

        if !text[end..].starts_with(':') {
            slots.push(TypeSlot {
                span: start..end,
                name: &text[start..end],
            });
        }
        pos = end;
    }

    slots
}

/// Name declared by the first `@typedef {...} Name` in the comment.
pub fn find_typedef(text: &str) -> Option<String> {
    let collapsed = CONTINUATION.replace_all(text, " ");
    TYPEDEF
        .captures(&collapsed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !name.is_empty())
}

/// Replaces non-overlapping spans, which must be sorted by start.
pub fn splice(text: &str, replacements: &[(Range<usize>, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (span, replacement) in replacements {
        out.push_str(&text[last..span.start]);
        out.push_str(replacement);
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Puts ` * @extends <target>` directly before the comment's closing line,
/// replacing any existing `@extends` tag line.
pub fn inject_extends(comment: &str, target: &str) -> String {
    let extends = format!(" * @extends {}", target);
    let mut lines: Vec<&str> = comment
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !is_extends_tag(line))
        .collect();

    let at = lines.len().saturating_sub(1);
    lines.insert(at, extends.as_str());
    lines.join("\n")
}

/// A comment line whose tag is `@extends`, as opposed to prose mentioning it.
fn is_extends_tag(line: &str) -> bool {
    let body = line.trim_start();
    let body = body.strip_prefix('*').unwrap_or(body).trim_start();
    match body.strip_prefix("@extends") {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_typeof() {
        assert_eq!(
            strip_typeof("{typeof import(\"./a.js\").default}"),
            "{import(\"./a.js\").default}"
        );
        assert_eq!(strip_typeof("no markers"), "no markers");
    }

    #[test]
    fn test_scan_import_reference() {
        let text = "@param {import(\"./Map.js\").default} map The map.";
        let refs = scan_import_references(text);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].specifier, "./Map.js");
        assert_eq!(refs[0].export, "default");
        assert_eq!(&text[refs[0].span.clone()], "import(\"./Map.js\").default");
    }

    #[test]
    fn test_scan_multiple_import_references() {
        let text = "{import(\"./a.js\").A|import(\"../b.js\").B<string>}\n";
        let refs = scan_import_references(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].export, "A");
        assert_eq!(refs[1].specifier, "../b.js");
        assert_eq!(refs[1].export, "B");
        assert_eq!(&text[refs[1].span.end..refs[1].span.end + 1], "<");
    }

    #[test]
    fn test_scan_import_requires_terminator() {
        assert!(scan_import_references("import(\"./a.js\").A").is_empty());
        assert!(scan_import_references("import(\"./a.js\") ").is_empty());
    }

    #[test]
    fn test_scan_import_skips_malformed_prefix() {
        let text = "import(\"x\"+y) then {import(\"./c.js\").C}";
        let refs = scan_import_references(text);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].specifier, "./c.js");
    }

    #[test]
    fn test_scan_type_slots() {
        let text = "@param {Array<Point>|Line} a, {Object<string, Map>} b";
        let names: Vec<&str> = scan_type_slots(text).iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Array", "Point", "Line", "Object", "string", "Map"]);
    }

    #[test]
    fn test_scan_type_slots_fires() {
        let names: Vec<&str> = scan_type_slots("@fires RenderEvent\n")
            .iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["RenderEvent"]);
    }

    #[test]
    fn test_scan_type_slots_whole_words() {
        let text = "{PointLike}";
        let slots = scan_type_slots(text);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].name, "PointLike");
    }

    #[test]
    fn test_scan_type_slots_skips_keys() {
        let names: Vec<&str> = scan_type_slots("{module:geom/Point.Point|{x: number}|Foo}")
            .iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Foo"]);
    }

    #[test]
    fn test_scan_type_slots_ignores_tags() {
        assert!(scan_type_slots("{@link foo}").is_empty());
        assert!(scan_type_slots("plain prose").is_empty());
    }

    #[test]
    fn test_find_typedef() {
        assert_eq!(
            find_typedef("*\n * @typedef {Object} Options\n * @property {number} x\n "),
            Some("Options".to_string())
        );
        assert_eq!(
            find_typedef("*\n * @typedef {function(number):\n *   string} Formatter\n "),
            Some("Formatter".to_string())
        );
        assert_eq!(find_typedef("* @type {number} "), None);
    }

    #[test]
    fn test_splice() {
        let text = "{A|B}";
        let out = splice(
            text,
            &[(1..2, "module:a~A".to_string()), (3..4, "module:b.B".to_string())],
        );
        assert_eq!(out, "{module:a~A|module:b.B}");
    }

    #[test]
    fn test_inject_extends() {
        let comment = "*\n * The B class.\n ";
        assert_eq!(
            inject_extends(comment, "module:a~A"),
            "*\n * The B class.\n * @extends module:a~A\n "
        );
    }

    #[test]
    fn test_inject_extends_overwrites() {
        let comment = "*\n * The B class.\n * @extends Old\n ";
        assert_eq!(
            inject_extends(comment, "Error"),
            "*\n * The B class.\n * @extends Error\n "
        );
    }

    #[test]
    fn test_inject_extends_moves_tag_to_closing_line() {
        let comment = "*\n * @extends Old\n * @param {number} x X.\n ";
        assert_eq!(
            inject_extends(comment, "module:a~A"),
            "*\n * @param {number} x X.\n * @extends module:a~A\n "
        );
    }

    #[test]
    fn test_inject_extends_keeps_prose_mentioning_tag() {
        let comment = "*\n * Subclasses should not add @extends tags by hand.\n * @param {number} x X.\n ";
        assert_eq!(
            inject_extends(comment, "module:a~A"),
            "*\n * Subclasses should not add @extends tags by hand.\n * @param {number} x X.\n * @extends module:a~A\n "
        );
    }

    #[test]
    fn test_is_extends_tag() {
        assert!(is_extends_tag(" * @extends Foo"));
        assert!(is_extends_tag("@extends"));
        assert!(!is_extends_tag(" * @extendsFoo"));
        assert!(!is_extends_tag(" * Do not use @extends here."));
    }

    #[test]
    fn test_inject_extends_crlf() {
        let comment = "*\r\n * Doc.\r\n ";
        assert_eq!(inject_extends(comment, "Error"), "*\n * Doc.\n * @extends Error\n ");
    }
}
