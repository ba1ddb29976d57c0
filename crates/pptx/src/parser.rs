//! PPTX package reader.
//!
//! Reads back the text, pictures and tables of each slide in presentation
//! order. Used to check what a written package actually contains.

use deck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// What a single slide of a package contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSummary {
    /// 1-based slide number.
    pub number: usize,

    /// Non-empty paragraph texts in document order.
    pub texts: Vec<String>,

    /// Number of picture shapes.
    pub pictures: usize,

    /// Number of tables.
    pub tables: usize,
}

/// Parser for PPTX (Office Open XML) files.
#[derive(Debug, Default)]
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Summarize every slide of a package.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideSummary>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;

        slide_order
            .iter()
            .enumerate()
            .map(|(idx, path)| {
                let content = read_file_from_archive(&mut archive, path)?;
                let mut summary = summarize_slide(&content)?;
                summary.number = idx + 1;
                Ok(summary)
            })
            .collect()
    }

    /// Slide part paths in presentation order.
    ///
    /// Follows the slide id list in `presentation.xml` through its relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let presentation = read_file_from_archive(archive, "ppt/presentation.xml")?;
        let rels = read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;

        let mut rel_ids = Vec::new();
        let mut reader = Reader::from_str(&presentation);
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"r:id" {
                            rel_ids.push(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing presentation: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        let mut targets = Vec::new();
        let mut reader = Reader::from_str(&rels);
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut target = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => {
                                target = attr
                                    .unescape_value()
                                    .map(|v| v.to_string())
                                    .unwrap_or_default();
                            }
                            _ => {}
                        }
                    }
                    targets.push((id, target));
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        rel_ids
            .iter()
            .map(|rel_id| {
                let target = targets
                    .iter()
                    .find(|(id, _)| id == rel_id)
                    .map(|(_, target)| target)
                    .ok_or_else(|| {
                        Error::XmlError(format!("Slide relationship '{}' not found", rel_id))
                    })?;
                Ok(match target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("ppt/{}", target),
                })
            })
            .collect()
    }
}

/// Collect paragraph texts and count pictures and tables in slide XML.
fn summarize_slide(xml_content: &str) -> Result<SlideSummary> {
    let mut summary = SlideSummary::default();
    let mut reader = Reader::from_str(xml_content);

    let mut in_paragraph = false;
    let mut in_text = false;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"p" => {
                    in_paragraph = true;
                    current_text.clear();
                }
                b"t" if in_paragraph => in_text = true,
                b"pic" => summary.pictures += 1,
                b"tbl" => summary.tables += 1,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::XmlError(format!("Bad text in slide: {}", err)))?;
                current_text.push_str(&text);
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" => {
                    in_paragraph = false;
                    if !current_text.trim().is_empty() {
                        summary.texts.push(std::mem::take(&mut current_text));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(summary)
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_summarize_slide() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:txBody><a:p><a:r><a:t>Hello </a:t></a:r><a:r><a:t>&amp; bye</a:t></a:r></a:p></p:txBody></p:sp>
            <p:pic></p:pic>
            <p:graphicFrame><a:graphic><a:graphicData><a:tbl><a:tr><a:tc><a:txBody><a:p><a:endParaRPr/></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>
        </p:spTree></p:cSld></p:sld>"#;

        let summary = summarize_slide(xml).unwrap();
        assert_eq!(summary.texts, vec!["Hello & bye"]);
        assert_eq!(summary.pictures, 1);
        assert_eq!(summary.tables, 1);
    }

    #[test]
    fn test_parse_rejects_non_zip() {
        let result = PptxParser::new().parse(std::io::Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }
}
