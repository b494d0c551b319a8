//! WordprocessingML writer.
//!
//! A `.docx` is a zip of XML parts. Only the parts Word needs to open the
//! file are emitted: content types, package and document relationships,
//! the document body, styles, and list numbering.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::result::ZipError;
use zip::write::{FileOptions, ZipWriter};

use crate::document::{Block, Document};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults>
<w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault>
<w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>
</w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="52"/><w:szCs w:val="52"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="360" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="1F3864"/><w:sz w:val="32"/><w:szCs w:val="32"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:color w:val="2F5496"/><w:sz w:val="26"/><w:szCs w:val="26"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="60"/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:spacing w:after="60"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="ListNumber"><w:name w:val="List Number"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="2"/></w:numPr><w:spacing w:after="60"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:ind w:left="864" w:right="864"/></w:pPr><w:rPr><w:i/><w:color w:val="404040"/></w:rPr></w:style>
</w:styles>"#;

const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>
<w:abstractNum w:abstractNumId="1"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>
<w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
<w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

// US Letter with one-inch margins, in twentieths of a point.
const SECTION_PROPS: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#;

const DOCUMENT_CLOSE: &str = "</w:body></w:document>";

/// Serialise `doc` into the bytes of a `.docx` file.
pub fn render(doc: &Document) -> Result<Vec<u8>, ZipError> {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let body = document_xml(doc);
    let parts: [(&str, &str); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/document.xml", &body),
        ("word/styles.xml", STYLES),
        ("word/numbering.xml", NUMBERING),
    ];
    for (name, xml) in parts {
        zip.start_file(name, options)?;
        zip.write_all(xml.as_bytes())?;
    }

    zip.finish()?;
    drop(zip);
    Ok(buffer)
}

/// The `word/document.xml` part.
pub fn document_xml(doc: &Document) -> String {
    let mut xml = String::from(DOCUMENT_OPEN);

    paragraph(&mut xml, r#"<w:pStyle w:val="Title"/><w:jc w:val="center"/>"#, &[run(&doc.title, "")]);

    if let Some(meta) = &doc.metadata {
        let runs: Vec<String> = meta
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let text = run(line, r#"<w:sz w:val="20"/>"#);
                if i == 0 { text } else { format!("<w:r><w:br/></w:r>{text}") }
            })
            .collect();
        paragraph(&mut xml, r#"<w:jc w:val="center"/>"#, &runs);
        paragraph(&mut xml, "", &[]);
    }

    paragraph(
        &mut xml,
        r#"<w:jc w:val="right"/>"#,
        &[run(&doc.timestamp_line(), r#"<w:color w:val="808080"/><w:sz w:val="18"/>"#)],
    );
    page_break(&mut xml);

    for block in doc.blocks() {
        write_block(&mut xml, block);
    }

    xml.push_str(SECTION_PROPS);
    xml.push_str(DOCUMENT_CLOSE);
    xml
}

fn write_block(xml: &mut String, block: &Block) {
    match block {
        Block::Heading { level, text } => {
            let style = format!(r#"<w:pStyle w:val="Heading{}"/>"#, (*level).clamp(1, 3));
            paragraph(xml, &style, &[run(text, "")]);
        }
        Block::Bullet(text) => {
            paragraph(xml, r#"<w:pStyle w:val="ListBullet"/>"#, &inline_runs(text));
        }
        Block::Numbered(text) => {
            paragraph(xml, r#"<w:pStyle w:val="ListNumber"/>"#, &inline_runs(text));
        }
        Block::Blank => paragraph(xml, "", &[]),
        Block::Paragraph(text) => {
            paragraph(
                xml,
                r#"<w:spacing w:line="276" w:lineRule="auto"/>"#,
                &inline_runs(text),
            );
        }
        Block::Citation {
            index,
            patent_id,
            relevance,
        } => {
            let runs = [
                run(&format!("[{index}] "), "<w:b/>"),
                run(&format!("{patent_id} "), ""),
                run(&format!("(Relevance: {relevance:.2})"), "<w:i/>"),
            ];
            paragraph(xml, "", &runs);
        }
        Block::Snippet(text) => {
            paragraph(
                xml,
                r#"<w:pStyle w:val="Quote"/>"#,
                &[run(text, r#"<w:sz w:val="18"/>"#)],
            );
        }
        Block::PageBreak => page_break(xml),
    }
}

fn paragraph(xml: &mut String, props: &str, runs: &[String]) {
    xml.push_str("<w:p>");
    if !props.is_empty() {
        xml.push_str("<w:pPr>");
        xml.push_str(props);
        xml.push_str("</w:pPr>");
    }
    for r in runs {
        xml.push_str(r);
    }
    xml.push_str("</w:p>");
}

fn page_break(xml: &mut String) {
    xml.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
}

fn run(text: &str, props: &str) -> String {
    let props = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{props}</w:rPr>")
    };
    format!(r#"<w:r>{props}<w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

/// Runs for text that may contain `**bold**` spans.
///
/// Unbalanced markers are left in the text as typed.
fn inline_runs(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("**").collect();
    if parts.len() % 2 == 0 {
        return vec![run(text, "")];
    }
    parts
        .iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| run(part, if i % 2 == 1 { "<w:b/>" } else { "" }))
        .collect()
}

/// Escape XML metacharacters and drop control characters XML 1.0 forbids.
fn escape(text: &str) -> String {
    let allowed: String = text
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || u32::from(c) >= 0x20)
        .collect();
    quick_xml::escape::escape(allowed.as_str()).into_owned()
}
