//! Plain-text extraction from WordprocessingML (`.docx`) packages.
//!
//! Only `word/document.xml` is read. Each `<w:p>` becomes one line; `<w:t>`
//! runs are concatenated, `<w:tab/>` becomes a tab and `<w:br/>`/`<w:cr/>`
//! a line break. Text-box content (`<w:txbxContent>`) is skipped: it nests
//! paragraphs inside a paragraph, and only body paragraphs are read.

use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use clauseguard_shared::{ClauseGuardError, Result};

/// Main document part inside the package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Text boxes nest whole paragraphs; removed before paragraphs are matched.
static TEXT_BOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:txbxContent\b[^>]*>.*?</w:txbxContent>").expect("valid regex")
});

/// Paragraph properties; tab stops in here are not text.
static PARAGRAPH_PROPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:pPr>.*?</w:pPr>").expect("valid regex"));

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p(?:\s[^>]*[^/])?>(.*?)</w:p>").expect("valid regex"));

static RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*[^/])?>(?P<text>.*?)</w:t>|<w:(?P<ctl>tab|br|cr)\b[^>]*/>")
        .expect("valid regex")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#x(?P<hex>[0-9a-fA-F]+)|#(?P<dec>[0-9]+)|(?P<name>amp|lt|gt|quot|apos));")
        .expect("valid regex")
});

/// Read the text of the `.docx` package at `path`.
pub(crate) fn extract_docx(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).map_err(|e| ClauseGuardError::io(path, e))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ClauseGuardError::validation(format!("not a DOCX package: {e}")))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ClauseGuardError::validation(format!("missing {DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ClauseGuardError::io(path, e))?;

    Ok(text_from_document_xml(&xml))
}

/// Flatten `word/document.xml` to newline-separated paragraphs.
pub(crate) fn text_from_document_xml(xml: &str) -> String {
    let body = TEXT_BOX_RE.replace_all(xml, "");
    let body = PARAGRAPH_PROPS_RE.replace_all(&body, "");

    PARAGRAPH_RE
        .captures_iter(&body)
        .map(|paragraph| {
            let mut line = String::new();
            for run in RUN_RE.captures_iter(&paragraph[1]) {
                if let Some(text) = run.name("text") {
                    line.push_str(&decode_entities(text.as_str()));
                } else if let Some(ctl) = run.name("ctl") {
                    line.push(if ctl.as_str() == "tab" { '\t' } else { '\n' });
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let code = if let Some(hex) = caps.name("hex") {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else if let Some(dec) = caps.name("dec") {
                dec.as_str().parse().ok()
            } else {
                None
            };

            if let Some(c) = code.and_then(char::from_u32) {
                return c.to_string();
            }

            match caps.name("name").map(|m| m.as_str()) {
                Some("amp") => "&",
                Some("lt") => "<",
                Some("gt") => ">",
                Some("quot") => "\"",
                Some("apos") => "'",
                _ => "\u{FFFD}",
            }
            .to_string()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_lines() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>WEBSITE DESIGN AGREEMENT</w:t></w:r></w:p>
            <w:p w:rsidR="00A1"><w:r><w:t xml:space="preserve">1. Parties. </w:t></w:r><w:r><w:t>Acme</w:t></w:r></w:p>
        </w:body></w:document>"#;

        assert_eq!(
            text_from_document_xml(xml),
            "WEBSITE DESIGN AGREEMENT\n1. Parties. Acme"
        );
    }

    #[test]
    fn tabs_and_breaks_are_honoured() {
        let xml = "<w:p><w:r><w:t>Fee</w:t><w:tab/><w:t>$500</w:t><w:br/><w:t>net 30</w:t></w:r></w:p>";
        assert_eq!(text_from_document_xml(xml), "Fee\t$500\nnet 30");
    }

    #[test]
    fn tab_stops_in_paragraph_properties_are_ignored() {
        let xml = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Scope</w:t></w:r></w:p>"#;
        assert_eq!(text_from_document_xml(xml), "Scope");
    }

    #[test]
    fn empty_paragraphs_are_kept_as_blank_lines() {
        let xml = "<w:p><w:r><w:t>One</w:t></w:r></w:p><w:p></w:p><w:p><w:r><w:t>Two</w:t></w:r></w:p>";
        assert_eq!(text_from_document_xml(xml), "One\n\nTwo");
    }

    #[test]
    fn text_box_content_is_skipped() {
        let xml = "<w:p><w:r><w:t>Before </w:t></w:r><w:r><w:drawing><wps:txbx>\
            <w:txbxContent><w:p><w:r><w:t>Box one</w:t></w:r></w:p><w:p><w:r><w:t>Box two</w:t></w:r></w:p></w:txbxContent>\
            </wps:txbx></w:drawing></w:r><w:r><w:t>after</w:t></w:r></w:p>\
            <w:p><w:r><w:t>Next paragraph</w:t></w:r></w:p>";

        assert_eq!(text_from_document_xml(xml), "Before after\nNext paragraph");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(
            decode_entities("Smith &amp; Sons &lt;Client&gt; &quot;A&quot; &apos;B&apos; &#169; &#x2014;"),
            "Smith & Sons <Client> \"A\" 'B' \u{a9} \u{2014}"
        );
    }
}
