//! The `.vbkm` text format
//!
//! ```text
//! # comment
//! vbkm 1
//! guide.pdf | page=1 open pages=12 file=/docs/guide.pdf
//!   Introduction | page=1 bold
//!     Scope | page=2 unchecked color=#FF0000
//! ```
//!
//! Each bookmark is one line, nested by two spaces per level. Attributes
//! follow the first unescaped `|`; `file=` always comes last and takes the
//! rest of the line. In titles `\|`, `\\`, `\n`, `\r` and `\t` are escaped,
//! as is a leading space or `#`. An untitled bookmark starts its line with
//! the `|`.

use crate::{build_tree, BookmarkRecord, FileRecord, RecordBuilder, Result, StoreError, FORMAT_VERSION};
use toc_model::export::{walk_filtered, BookmarkSink, ExportFilter};
use toc_model::{TocItem, TocTree};

const HEADER_KEYWORD: &str = "vbkm";
const INDENT: usize = 2;

// =============================================================================
// Writing
// =============================================================================

fn escape_title(title: &str) -> String {
    let mut escaped = String::with_capacity(title.len());
    for (i, c) in title.chars().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '|' => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            ' ' | '#' if i == 0 => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Writes walked items as `.vbkm` lines
#[derive(Debug, Default)]
pub struct VbkmWriter {
    out: String,
}

impl VbkmWriter {
    pub fn new() -> Self {
        let mut out = String::new();
        out.push_str(&format!("{} {}\n", HEADER_KEYWORD, FORMAT_VERSION));
        Self { out }
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl BookmarkSink for VbkmWriter {
    type Error = StoreError;

    fn item(&mut self, depth: usize, item: &TocItem) -> Result<()> {
        let mut attrs = vec![format!("page={}", item.page_number())];
        if item.font().is_bold() {
            attrs.push("bold".to_string());
        }
        if item.font().is_italic() {
            attrs.push("italic".to_string());
        }
        if let Some(color) = item.color() {
            attrs.push(format!("color={}", color.to_hex()));
        }
        if !item.is_checked() {
            attrs.push("unchecked".to_string());
        }
        if item.is_expanded() {
            attrs.push("open".to_string());
        }
        if let (Some(path), Some(pages)) = (item.kind().source_path(), item.kind().page_count()) {
            attrs.push(format!("pages={}", pages));
            attrs.push(format!("file={}", path.display()));
        }

        self.out.push_str(&" ".repeat(depth * INDENT));
        let title = escape_title(item.title());
        if title.is_empty() {
            // Untitled entries start with the separator so the indent stays even
            self.out.push_str("| ");
        } else {
            self.out.push_str(&title);
            self.out.push_str(" | ");
        }
        self.out.push_str(&attrs.join(" "));
        self.out.push('\n');
        Ok(())
    }
}

/// Render a tree in the `.vbkm` text format
pub fn write_vbkm(tree: &TocTree, filter: ExportFilter) -> Result<String> {
    let mut writer = VbkmWriter::new();
    walk_filtered(tree, filter, &mut writer)?;
    Ok(writer.into_string())
}

// =============================================================================
// Reading
// =============================================================================

/// Split a line into its raw title and attribute text
fn split_line(content: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in content.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '|' {
            let title = &content[..i];
            let title = title.strip_suffix(' ').unwrap_or(title);
            return (title, &content[i + 1..]);
        }
    }
    (content, "")
}

fn unescape_title(raw: &str, line: usize) -> Result<String> {
    let mut title = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            title.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => title.push('\n'),
            Some('r') => title.push('\r'),
            Some('t') => title.push('\t'),
            Some(other) => title.push(other),
            None => return Err(StoreError::parse(line, "title ends with a lone '\\'")),
        }
    }
    Ok(title)
}

fn parse_number(value: &str, key: &str, line: usize) -> Result<u32> {
    value
        .parse::<u32>()
        .map_err(|_| StoreError::parse(line, format!("invalid {} value '{}'", key, value)))
}

fn parse_attributes(record: &mut BookmarkRecord, attrs: &str, line: usize) -> Result<()> {
    let mut pages: Option<u32> = None;
    let mut path: Option<&str> = None;
    let mut rest = attrs.trim_start();

    while !rest.is_empty() {
        if let Some(file) = rest.strip_prefix("file=") {
            path = Some(file.trim_end());
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..end];
        rest = rest[end..].trim_start();

        match token.split_once('=') {
            Some(("page", value)) => record.page = parse_number(value, "page", line)?,
            Some(("pages", value)) => pages = Some(parse_number(value, "pages", line)?),
            Some(("color", value)) => {
                if toc_model::Color::from_hex(value).is_none() {
                    return Err(StoreError::parse(line, format!("invalid color '{}'", value)));
                }
                record.color = Some(value.to_string());
            }
            None if token == "bold" => record.bold = true,
            None if token == "italic" => record.italic = true,
            None if token == "unchecked" => record.checked = false,
            None if token == "open" => record.expanded = true,
            _ => tracing::warn!(line, token, "ignoring unknown bookmark attribute"),
        }
    }

    match (path, pages) {
        (Some(path), Some(pages)) if !path.is_empty() => {
            record.file = Some(FileRecord {
                path: path.into(),
                pages,
            });
        }
        (Some(_), _) => {
            return Err(StoreError::parse(line, "file entries need a path and pages=N"));
        }
        (None, Some(_)) => {
            tracing::warn!(line, "ignoring pages= on a bookmark without file=");
        }
        (None, None) => {}
    }
    Ok(())
}

/// Parse `.vbkm` text into nested records
pub fn parse_vbkm_records(text: &str) -> Result<Vec<BookmarkRecord>> {
    let mut builder = RecordBuilder::new();
    let mut seen_header = false;
    let mut previous_depth: Option<usize> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        if raw_line.trim().is_empty() || raw_line.starts_with('#') {
            continue;
        }

        if !seen_header {
            let mut parts = raw_line.split_whitespace();
            if parts.next() != Some(HEADER_KEYWORD) {
                return Err(StoreError::InvalidFormat(format!(
                    "missing '{}' header on line {}",
                    HEADER_KEYWORD, line
                )));
            }
            let version = parts
                .next()
                .and_then(|v| v.parse::<u32>().ok())
                .ok_or_else(|| StoreError::parse(line, "header needs a format version"))?;
            if version > FORMAT_VERSION {
                return Err(StoreError::InvalidFormat(format!(
                    "unsupported format version: {}",
                    version
                )));
            }
            seen_header = true;
            continue;
        }

        let spaces = raw_line.len() - raw_line.trim_start_matches(' ').len();
        let content = &raw_line[spaces..];
        if content.starts_with('\t') {
            return Err(StoreError::parse(line, "tabs are not allowed in indentation"));
        }
        if spaces % INDENT != 0 {
            return Err(StoreError::parse(line, "indentation must be a multiple of two spaces"));
        }
        let depth = spaces / INDENT;
        let allowed = previous_depth.map_or(0, |previous| previous + 1);
        if depth > allowed {
            return Err(StoreError::parse(
                line,
                format!("indentation jumps to level {} (at most {} allowed)", depth, allowed),
            ));
        }

        let (raw_title, attrs) = split_line(content);
        let mut record = BookmarkRecord::new(unescape_title(raw_title, line)?, 0);
        parse_attributes(&mut record, attrs, line)?;

        builder.push(depth, record);
        previous_depth = Some(depth);
    }

    if !seen_header {
        return Err(StoreError::InvalidFormat(format!(
            "missing '{}' header",
            HEADER_KEYWORD
        )));
    }
    Ok(builder.into_records())
}

/// Parse `.vbkm` text into a bookmark tree
pub fn parse_vbkm(text: &str) -> Result<TocTree> {
    build_tree(&parse_vbkm_records(text)?)
}
