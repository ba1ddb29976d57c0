//! PPTX package writer.

use crate::package::{
    app_properties_xml, content_types_xml, core_properties_xml, presentation_relationships,
    presentation_xml, relationships_xml, root_relationships, slide_layout_relationships,
    slide_layout_xml, slide_master_relationships, slide_master_xml, theme_xml, xml_err,
    Relationship, NS_DRAWING, NS_PRESENTATION, NS_RELATIONSHIPS, REL_IMAGE, REL_SLIDE_LAYOUT,
    SHAPE_TREE_HEADER, XML_DECLARATION,
};
use deck_core::{
    DeckModel, Error, Placement, ResolvedImage, Result, SlideDescription, SlideElement,
    TableStyle, TextStyle,
};
use quick_xml::escape::escape;
use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name used when the caller doesn't pick one.
pub const DEFAULT_FILE_NAME: &str = "converted-item.pptx";

const EMU_PER_INCH: f64 = 914_400.0;
const EMU_PER_POINT: f64 = 12_700.0;

/// Writer for PPTX (Office Open XML) packages.
#[derive(Debug, Clone)]
pub struct PptxWriter {
    title: String,
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self {
            title: "Converted Presentation".to_string(),
        }
    }
}

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title stored in the package properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Write `deck` as a package to `writer`, returning the writer.
    pub fn write<W: Write + Seek>(&self, deck: &DeckModel, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let slide_count = deck.slides.len();

        let media = collect_media(deck);
        let extensions: BTreeSet<&str> = media.iter().map(|m| m.image.extension()).collect();

        let mut put = |name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(data)?;
            Ok(())
        };

        put("[Content_Types].xml", content_types_xml(slide_count, &extensions)?.as_bytes())?;
        put("_rels/.rels", relationships_xml(&root_relationships())?.as_bytes())?;
        put("docProps/core.xml", core_properties_xml(&self.title)?.as_bytes())?;
        put("docProps/app.xml", app_properties_xml(slide_count)?.as_bytes())?;
        put("ppt/presentation.xml", presentation_xml(slide_count)?.as_bytes())?;
        put(
            "ppt/_rels/presentation.xml.rels",
            relationships_xml(&presentation_relationships(slide_count))?.as_bytes(),
        )?;
        put("ppt/slideMasters/slideMaster1.xml", slide_master_xml().as_bytes())?;
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships_xml(&slide_master_relationships())?.as_bytes(),
        )?;
        put("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml().as_bytes())?;
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships_xml(&slide_layout_relationships())?.as_bytes(),
        )?;
        put("ppt/theme/theme1.xml", theme_xml()?.as_bytes())?;

        // Parts are named by position; the presentation part lists slides 1..=n.
        for (index, slide) in deck.slides.iter().enumerate() {
            let position = index + 1;
            let slide_media: Vec<&MediaPart> =
                media.iter().filter(|m| m.slide == position).collect();

            let mut rels = vec![Relationship::new(
                "rId1",
                REL_SLIDE_LAYOUT,
                "../slideLayouts/slideLayout1.xml",
            )];
            rels.extend(slide_media.iter().enumerate().map(|(i, m)| {
                Relationship::new(format!("rId{}", i + 2), REL_IMAGE, format!("../media/{}", m.file_name()))
            }));

            let xml = slide_xml(slide)?;
            put(&format!("ppt/slides/slide{}.xml", position), xml.as_bytes())?;
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", position),
                relationships_xml(&rels)?.as_bytes(),
            )?;
        }

        for part in &media {
            put(&format!("ppt/media/{}", part.file_name()), &part.image.data)?;
        }

        log::debug!(
            "Wrote {} slide(s) and {} image(s) to package",
            slide_count,
            media.len()
        );

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    /// Write `deck` to an in-memory package.
    pub fn to_bytes(&self, deck: &DeckModel) -> Result<Vec<u8>> {
        let cursor = self.write(deck, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write `deck` to a file at `path`.
    pub fn write_to_path(&self, deck: &DeckModel, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = self.write(deck, BufWriter::new(file))?;
        writer.flush()?;
        log::info!("Saved presentation to {}", path.display());
        Ok(())
    }
}

/// An image stored under `ppt/media`.
struct MediaPart<'a> {
    /// Deck-wide 1-based image number.
    number: usize,
    /// Position (1-based) of the slide that shows it.
    slide: usize,
    image: &'a ResolvedImage,
}

impl MediaPart<'_> {
    fn file_name(&self) -> String {
        format!("image{}.{}", self.number, self.image.extension())
    }
}

fn collect_media(deck: &DeckModel) -> Vec<MediaPart<'_>> {
    deck.slides
        .iter()
        .enumerate()
        .flat_map(|(index, slide)| slide.images().map(move |image| (index + 1, image)))
        .enumerate()
        .map(|(i, (slide, image))| MediaPart {
            number: i + 1,
            slide,
            image,
        })
        .collect()
}

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Escape text for XML content, dropping characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(&cleaned).into_owned()
}

/// Serialize one slide.
pub(crate) fn slide_xml(slide: &SlideDescription) -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
    .map_err(xml_err)?;
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(SHAPE_TREE_HEADER);

    let mut image_index = 0;
    for (index, element) in slide.elements.iter().enumerate() {
        let shape_id = index + 2;
        match element {
            SlideElement::Heading {
                text,
                placement,
                style,
            } => write_text_box(&mut xml, shape_id, "Title", text, placement, style)?,
            SlideElement::Body {
                text,
                placement,
                style,
            } => write_text_box(&mut xml, shape_id, "Text", text, placement, style)?,
            SlideElement::Image { image, placement } => {
                image_index += 1;
                let rel_id = format!("rId{}", image_index + 1);
                write_picture(&mut xml, shape_id, &rel_id, image, placement)?;
            }
            SlideElement::Table {
                rows,
                placement,
                style,
            } => write_table(&mut xml, shape_id, rows, placement, style)?,
        }
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    Ok(xml)
}

fn write_xfrm(xml: &mut String, tag: &str, placement: &Placement) -> Result<()> {
    write!(
        xml,
        r#"<{tag}><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></{tag}>"#,
        emu(placement.x),
        emu(placement.y),
        emu(placement.width),
        emu(placement.height),
    )
    .map_err(xml_err)
}

fn write_run_properties(xml: &mut String, style: &TextStyle) -> Result<()> {
    write!(
        xml,
        r#"<a:rPr lang="en-US" sz="{}""#,
        (style.font_size * 100.0).round() as i64
    )
    .map_err(xml_err)?;
    if style.bold {
        xml.push_str(r#" b="1""#);
    }
    xml.push_str(r#" dirty="0">"#);
    if let Some(color) = &style.color {
        write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            escape(color)
        )
        .map_err(xml_err)?;
    }
    xml.push_str("</a:rPr>");
    Ok(())
}

fn write_text_box(
    xml: &mut String,
    shape_id: usize,
    name: &str,
    text: &str,
    placement: &Placement,
    style: &TextStyle,
) -> Result<()> {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{} {}"/>"#,
        shape_id, name, shape_id
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);

    xml.push_str("<p:spPr>");
    write_xfrm(xml, "a:xfrm", placement)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
    xml.push_str("</p:spPr>");

    xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:spAutoFit/></a:bodyPr><a:lstStyle/>"#);
    for line in text.split('\n') {
        xml.push_str("<a:p><a:r>");
        write_run_properties(xml, style)?;
        write!(xml, "<a:t>{}</a:t>", xml_text(line.trim_end_matches('\r'))).map_err(xml_err)?;
        xml.push_str("</a:r></a:p>");
    }
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_picture(
    xml: &mut String,
    shape_id: usize,
    rel_id: &str,
    image: &ResolvedImage,
    placement: &Placement,
) -> Result<()> {
    xml.push_str("<p:pic><p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        shape_id,
        shape_id,
        xml_text(&image.source)
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);

    write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        rel_id
    )
    .map_err(xml_err)?;

    xml.push_str("<p:spPr>");
    write_xfrm(xml, "a:xfrm", placement)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr></p:pic>");
    Ok(())
}

fn write_table(
    xml: &mut String,
    shape_id: usize,
    rows: &[Vec<String>],
    placement: &Placement,
    style: &TableStyle,
) -> Result<()> {
    let widths = grid_widths(rows, style);
    let row_height = if rows.is_empty() {
        placement.height
    } else {
        placement.height / rows.len() as f64
    };

    xml.push_str("<p:graphicFrame><p:nvGraphicFramePr>");
    write!(xml, r#"<p:cNvPr id="{}" name="Table {}"/>"#, shape_id, shape_id).map_err(xml_err)?;
    xml.push_str(r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/>"#);
    xml.push_str("</p:nvGraphicFramePr>");
    write_xfrm(xml, "p:xfrm", placement)?;

    xml.push_str(r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table">"#);
    xml.push_str(r#"<a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>"#);
    for width in &widths {
        write!(xml, r#"<a:gridCol w="{}"/>"#, emu(*width)).map_err(xml_err)?;
    }
    xml.push_str("</a:tblGrid>");

    let border_width = (style.border.width_pt * EMU_PER_POINT).round() as i64;
    let border_color = escape(&style.border.color);
    for row in rows {
        write!(xml, r#"<a:tr h="{}">"#, emu(row_height)).map_err(xml_err)?;
        for column in 0..widths.len() {
            let text = row.get(column).map(String::as_str).unwrap_or_default();
            xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p>");
            if text.is_empty() {
                xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/>"#);
            } else {
                write!(
                    xml,
                    r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#,
                    xml_text(text)
                )
                .map_err(xml_err)?;
            }
            xml.push_str("</a:p></a:txBody><a:tcPr>");
            for side in ["lnL", "lnR", "lnT", "lnB"] {
                write!(
                    xml,
                    r#"<a:{side} w="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:{side}>"#,
                    border_width, border_color
                )
                .map_err(xml_err)?;
            }
            xml.push_str("</a:tcPr></a:tc>");
        }
        xml.push_str("</a:tr>");
    }

    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    Ok(())
}

/// Grid column widths for a table.
///
/// Columns are sized from the first row. A package needs every row to have
/// one cell per grid column, so rows longer than the first row add columns of
/// the same width and shorter rows are padded with empty cells.
fn grid_widths(rows: &[Vec<String>], style: &TableStyle) -> Vec<f64> {
    let mut widths = style.column_widths.clone();
    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
    if widest > widths.len() {
        let width = widths.last().copied().unwrap_or(deck_core::layout::TABLE_WIDTH);
        log::warn!(
            "Table row has {} cells but only {} columns were sized; extending the grid",
            widest,
            widths.len()
        );
        widths.resize(widest, width);
    }
    widths
}
