//! Fixed package parts and package-level XML.
//!
//! A deck always uses one slide master, one blank layout and one theme, so
//! those parts are constant. Content types, relationships and the
//! presentation part depend on the slide and image counts.

use deck_core::{Error, Result};
use quick_xml::escape::escape;
use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub const NS_PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Slide width in EMU (10 in, 16:9).
pub const SLIDE_WIDTH_EMU: i64 = 9_144_000;
/// Slide height in EMU (5.625 in, 16:9).
pub const SLIDE_HEIGHT_EMU: i64 = 5_143_500;

pub(crate) fn xml_err(e: std::fmt::Error) -> Error {
    Error::XmlError(e.to_string())
}

/// First id of the slide id list.
const FIRST_SLIDE_ID: usize = 256;

/// A single relationship entry.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub id: String,
    pub rel_type: &'static str,
    pub target: String,
}

impl Relationship {
    pub fn new(id: impl Into<String>, rel_type: &'static str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type,
            target: target.into(),
        }
    }
}

/// Serialize a relationships part.
pub fn relationships_xml(rels: &[Relationship]) -> Result<String> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<Relationships xmlns="{}">"#, NS_PACKAGE_RELATIONSHIPS)
        .map_err(xml_err)?;
    for rel in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id,
            rel.rel_type,
            escape(&rel.target)
        )
        .map_err(xml_err)?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

/// MIME type for an image part extension.
pub fn image_content_type(extension: &str) -> &'static str {
    match extension {
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        _ => "image/png",
    }
}

/// Serialize `[Content_Types].xml` for a deck.
pub fn content_types_xml(slide_count: usize, image_extensions: &BTreeSet<&str>) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide_count * 160);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for ext in image_extensions {
        write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            ext,
            image_content_type(ext)
        )
        .map_err(xml_err)?;
    }

    let overrides = [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/docProps/core.xml", CT_CORE_PROPERTIES),
        ("/docProps/app.xml", CT_EXTENDED_PROPERTIES),
    ];
    for (part, content_type) in overrides {
        write!(
            xml,
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            part, content_type
        )
        .map_err(xml_err)?;
    }
    for number in 1..=slide_count {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
            number, CT_SLIDE
        )
        .map_err(xml_err)?;
    }

    xml.push_str("</Types>");
    Ok(xml)
}

/// Package-level relationships (`_rels/.rels`).
pub fn root_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
        Relationship::new("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"),
        Relationship::new("rId3", REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
    ]
}

/// Relationships of `ppt/presentation.xml`: master, theme, then slides from `rId3`.
pub fn presentation_relationships(slide_count: usize) -> Vec<Relationship> {
    let mut rels = vec![
        Relationship::new("rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        Relationship::new("rId2", REL_THEME, "theme/theme1.xml"),
    ];
    rels.extend((1..=slide_count).map(|n| {
        Relationship::new(
            format!("rId{}", n + 2),
            REL_SLIDE,
            format!("slides/slide{}.xml", n),
        )
    }));
    rels
}

/// Serialize `ppt/presentation.xml`.
pub fn presentation_xml(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);

    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..slide_count {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + index,
                index + 3
            )
            .map_err(xml_err)?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU
    )
    .map_err(xml_err)?;
    xml.push_str("</p:presentation>");
    Ok(xml)
}

/// Serialize `docProps/core.xml`.
pub fn core_properties_xml(title: &str) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" "#,
        r#"xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    write!(xml, "<dc:title>{}</dc:title>", escape(title))
        .map_err(xml_err)?;
    xml.push_str("<dc:creator>html2pptx</dc:creator>");
    xml.push_str("<cp:revision>1</cp:revision>");
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

/// Serialize `docProps/app.xml`.
pub fn app_properties_xml(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(384);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
    );
    xml.push_str("<Application>html2pptx</Application>");
    write!(xml, "<Slides>{}</Slides>", slide_count)
        .map_err(xml_err)?;
    xml.push_str("<PresentationFormat>On-screen Show (16:9)</PresentationFormat>");
    xml.push_str("</Properties>");
    Ok(xml)
}

/// Relationships of the slide master.
pub fn slide_master_relationships() -> Vec<Relationship> {
    vec![
        Relationship::new("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
        Relationship::new("rId2", REL_THEME, "../theme/theme1.xml"),
    ]
}

/// Relationships of the slide layout.
pub fn slide_layout_relationships() -> Vec<Relationship> {
    vec![Relationship::new(
        "rId1",
        REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml",
    )]
}

/// Empty group-shape properties shared by every shape tree.
pub const SHAPE_TREE_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// Slide master with no placeholders.
pub fn slide_master_xml() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{tree}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
            r#"hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "<p:txStyles>",
            r#"<p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
            r#"<p:bodyStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#,
            r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:otherStyle>"#,
            "</p:txStyles>",
            "</p:sldMaster>"
        ),
        decl = XML_DECLARATION,
        a = NS_DRAWING,
        r = NS_RELATIONSHIPS,
        p = NS_PRESENTATION,
        tree = SHAPE_TREE_HEADER,
    )
}

/// Blank slide layout.
pub fn slide_layout_xml() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{tree}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>",
            "</p:sldLayout>"
        ),
        decl = XML_DECLARATION,
        a = NS_DRAWING,
        r = NS_RELATIONSHIPS,
        p = NS_PRESENTATION,
        tree = SHAPE_TREE_HEADER,
    )
}

/// Office-style theme with a standard palette and Calibri fonts.
pub fn theme_xml() -> Result<String> {
    const FILL_STYLE: &str = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    const LINE_STYLE: &str = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    const EFFECT_STYLE: &str = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    let mut xml = String::with_capacity(3072);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<a:theme xmlns:a="{}" name="Office Theme">"#, NS_DRAWING)
        .map_err(xml_err)?;
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Office">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    for (name, color) in [
        ("dk2", "44546A"),
        ("lt2", "E7E6E6"),
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ] {
        write!(xml, r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, name, color)
            .map_err(xml_err)?;
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Office">"#);
    for (group, face) in [("majorFont", "Calibri Light"), ("minorFont", "Calibri")] {
        write!(
            xml,
            r#"<a:{0}><a:latin typeface="{1}"/><a:ea typeface=""/><a:cs typeface=""/></a:{0}>"#,
            group, face
        )
        .map_err(xml_err)?;
    }
    xml.push_str("</a:fontScheme>");

    xml.push_str(r#"<a:fmtScheme name="Office">"#);
    write!(xml, "<a:fillStyleLst>{0}{0}{0}</a:fillStyleLst>", FILL_STYLE)
        .map_err(xml_err)?;
    write!(xml, "<a:lnStyleLst>{0}{0}{0}</a:lnStyleLst>", LINE_STYLE)
        .map_err(xml_err)?;
    write!(
        xml,
        "<a:effectStyleLst>{0}{0}{0}</a:effectStyleLst>",
        EFFECT_STYLE
    )
    .map_err(xml_err)?;
    write!(xml, "<a:bgFillStyleLst>{0}{0}{0}</a:bgFillStyleLst>", FILL_STYLE)
        .map_err(xml_err)?;
    xml.push_str("</a:fmtScheme>");

    xml.push_str("</a:themeElements>");
    xml.push_str("<a:objectDefaults/><a:extraClrSchemeLst/>");
    xml.push_str("</a:theme>");
    Ok(xml)
}
