use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use tracing::info;

use crate::error::CatalogError;
use crate::model::catalog::Catalog;
use crate::model::entry::{Location, TranslationEntry};

/// Serializes the catalog in the layout `lupdate` produces. Contexts and
/// messages keep their order.
pub fn write(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(catalog.len() * 256);

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");
    out.push_str("<TS");
    let header = catalog.header();
    push_attr(&mut out, "version", header.version.as_deref());
    push_attr(&mut out, "language", header.language.as_deref());
    push_attr(&mut out, "sourcelanguage", header.source_language.as_deref());
    out.push_str(">\n");

    for ctx in catalog.contexts() {
        out.push_str("<context>\n");
        push_element(&mut out, 4, "name", &ctx.name);
        for e in &ctx.entries {
            write_message(&mut out, e);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}

fn write_message(out: &mut String, e: &TranslationEntry) {
    if e.numerus_forms.is_some() {
        out.push_str("    <message numerus=\"yes\">\n");
    } else {
        out.push_str("    <message>\n");
    }

    for loc in &e.locations {
        write_location(out, loc);
    }

    push_element(out, 8, "source", &e.source_text);
    if let Some(c) = &e.comment {
        push_element(out, 8, "comment", c);
    }
    if let Some(c) = &e.extra_comment {
        push_element(out, 8, "extracomment", c);
    }
    if let Some(c) = &e.translator_comment {
        push_element(out, 8, "translatorcomment", c);
    }

    out.push_str("        <translation");
    push_attr(out, "type", e.status.type_attr());

    match &e.numerus_forms {
        Some(forms) if !forms.is_empty() => {
            out.push_str(">\n");
            for form in forms {
                push_element(out, 12, "numerusform", form);
            }
            out.push_str("        </translation>\n");
        }
        Some(_) => out.push_str("/>\n"),
        None if e.translation.is_empty() => out.push_str("/>\n"),
        None => {
            out.push('>');
            push_text(out, &e.translation);
            out.push_str("</translation>\n");
        }
    }

    out.push_str("    </message>\n");
}

fn write_location(out: &mut String, loc: &Location) {
    out.push_str("        <location");
    push_attr(out, "filename", loc.filename.as_deref());
    if let Some(line) = loc.line {
        let _ = write!(out, " line=\"{line}\"");
    }
    out.push_str("/>\n");
}

fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(v) = value {
        let _ = write!(out, " {name}=\"{}\"", escape(v));
    }
}

fn push_element(out: &mut String, indent: usize, name: &str, text: &str) {
    let _ = write!(out, "{:indent$}<{name}>", "");
    push_text(out, text);
    let _ = writeln!(out, "</{name}>");
}

// Control characters are not representable in XML 1.0 text; Linguist
// spells them as <byte value="xNN"/>. A raw CR would be folded to LF by
// the reader, so it goes out as a character reference.
fn push_text(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(pos) = rest.find(needs_reference) {
        out.push_str(&escape(&rest[..pos]));
        let ch = rest[pos..].chars().next().unwrap_or_default();
        if ch == '\r' {
            out.push_str("&#13;");
        } else {
            let _ = write!(out, "<byte value=\"x{:x}\"/>", ch as u32);
        }
        rest = &rest[pos + ch.len_utf8()..];
    }
    out.push_str(&escape(rest));
}

fn needs_reference(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n')
}

pub fn save(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    let text = write(catalog);
    write_atomic(path, text.as_bytes()).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), entries = catalog.len(), "saved catalog");
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "catalog.ts".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
