//! Netscape bookmark file format (the HTML browsers export).
//!
//! Reading is flat: every `<A HREF=...>` becomes a [`Bookmark`], in document
//! order, regardless of the folders it sat in. Writing renders a [`Folder`]
//! tree back into an importable file.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::bookmark::Bookmark;
use crate::error::{MarksortError, Result};
use crate::organizer::Folder;

static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("anchor pattern is valid")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern is valid")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

/// Parse all bookmarks out of an export.
///
/// Anchors without an `HREF` (or with an empty one) are skipped.
pub fn parse(html: &str) -> Vec<Bookmark> {
    let mut bookmarks = Vec::new();

    for caps in ANCHOR.captures_iter(html) {
        let attrs = &caps[1];
        let Some(href) = attribute(attrs, "href").filter(|h| !h.is_empty()) else {
            continue;
        };

        let text = TAG.replace_all(&caps[2], "");
        let title = collapse_whitespace(&decode_entities(&text));

        let mut bookmark = Bookmark::new(href, title);
        bookmark.added_at = attribute(attrs, "add_date");
        bookmark.icon = attribute(attrs, "icon");
        bookmarks.push(bookmark);
    }

    bookmarks
}

/// Read and parse an export file.
pub fn read_file(path: &Path) -> Result<Vec<Bookmark>> {
    if !path.exists() {
        return Err(MarksortError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    Ok(parse(&content))
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE
        .captures_iter(attrs)
        .find(|c| c[1].eq_ignore_ascii_case(name))
        .and_then(|c| c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4)))
        .map(|m| decode_entities(m.as_str()))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    let code = if let Some(hex) =
                        name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = name.strip_prefix('#') {
                        dec.parse::<u32>().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Escape text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Writer
// ============================================================================

const HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
";

const FOOTER: &str = "</DL><p>\n";

const INDENT: &str = "    ";

/// Renders a folder tree as a Netscape bookmark file.
///
/// The root folder is marked as the personal toolbar folder. Folders and
/// bookmarks without an `ADD_DATE` get the writer's timestamp.
#[derive(Debug, Clone)]
pub struct NetscapeWriter {
    timestamp: i64,
}

impl Default for NetscapeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl NetscapeWriter {
    /// Writer stamping folders with the current time.
    pub fn new() -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn render(&self, root: &Folder) -> String {
        let mut out = String::from(HEADER);
        self.write_folder(&mut out, root, 1, true);
        out.push_str(FOOTER);
        out
    }

    pub fn write_file(&self, root: &Folder, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render(root))?;
        Ok(())
    }

    fn write_folder(&self, out: &mut String, folder: &Folder, depth: usize, is_root: bool) {
        let spaces = INDENT.repeat(depth);
        let toolbar = if is_root {
            " PERSONAL_TOOLBAR_FOLDER=\"true\""
        } else {
            ""
        };

        let _ = writeln!(
            out,
            "{spaces}<DT><H3 ADD_DATE=\"{ts}\" LAST_MODIFIED=\"{ts}\"{toolbar}>{name}</H3>",
            ts = self.timestamp,
            name = escape(folder.name()),
        );
        let _ = writeln!(out, "{spaces}<DL><p>");

        for sub in folder.subfolders() {
            self.write_folder(out, sub, depth + 1, false);
        }
        for bookmark in folder.bookmarks() {
            self.write_bookmark(out, bookmark, depth + 1);
        }

        let _ = writeln!(out, "{spaces}</DL><p>");
    }

    fn write_bookmark(&self, out: &mut String, bookmark: &Bookmark, depth: usize) {
        let spaces = INDENT.repeat(depth);
        let added = bookmark
            .added_at
            .clone()
            .unwrap_or_else(|| self.timestamp.to_string());

        let mut attrs = format!(
            "HREF=\"{}\" ADD_DATE=\"{}\"",
            escape(bookmark.url()),
            escape(&added)
        );
        if let Some(icon) = &bookmark.icon {
            let _ = write!(attrs, " ICON=\"{}\"", escape(icon));
        }

        let _ = writeln!(
            out,
            "{spaces}<DT><A {attrs}>{label}</A>",
            label = escape(bookmark.label()),
        );
    }
}
