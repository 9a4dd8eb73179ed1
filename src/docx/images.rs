//! Image embedding.
//!
//! [`ImagesManager`] owns every picture the document uses. Each distinct
//! image source is stored once under `word/media` with one relationship id;
//! every `<img>` referring to it gets its own drawing.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use base64::Engine;
use quick_xml::escape::escape;

use super::paragraph::Paragraph;
use super::styles::StyleRegistry;
use crate::dom::{ArenaDom, NodeId};
use crate::error::Result;
use crate::source::SourceDocument;
use crate::style::{ComputedStyle, Float};
use crate::util::{MediaFormat, detect_media_format, extract_image_dimensions, resolve_href};

/// English Metric Units per point.
const EMU_PER_PT: f64 = 12_700.0;
/// Relationship id of `styles.xml`; images are numbered after it.
pub const STYLES_REL_ID: &str = "rId1";
const FIRST_IMAGE_REL: usize = 2;

/// Horizontal alignment of a floating picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum FloatSide {
    Left,
    Right,
}

/// A picture placed in a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Drawing {
    pub rel_id: String,
    /// Document-wide unique drawing id.
    pub id: u32,
    pub name: String,
    pub description: String,
    /// Size in EMUs.
    pub cx: u64,
    pub cy: u64,
    /// Anchored to a side instead of flowing inline.
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub float: Option<FloatSide>,
}

impl Drawing {
    /// Write the `w:drawing` element.
    pub fn write_xml(&self, out: &mut String) {
        let name = escape(self.name.as_str());
        let descr = escape(self.description.as_str());
        let (cx, cy, id) = (self.cx, self.cy, self.id);

        out.push_str("<w:drawing>");
        match self.float {
            None => out.push_str(r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#),
            Some(side) => {
                let align = match side {
                    FloatSide::Left => "left",
                    FloatSide::Right => "right",
                };
                let _ = write!(
                    out,
                    concat!(
                        r#"<wp:anchor distT="0" distB="0" distL="114300" distR="114300" simplePos="0" relativeHeight="{id}" behindDoc="0" locked="0" layoutInCell="1" allowOverlap="1">"#,
                        r#"<wp:simplePos x="0" y="0"/>"#,
                        r#"<wp:positionH relativeFrom="margin"><wp:align>{align}</wp:align></wp:positionH>"#,
                        r#"<wp:positionV relativeFrom="line"><wp:posOffset>0</wp:posOffset></wp:positionV>"#
                    ),
                    id = id,
                    align = align
                );
            }
        }
        let _ = write!(out, r#"<wp:extent cx="{cx}" cy="{cy}"/>"#);
        if self.float.is_some() {
            out.push_str(r#"<wp:wrapSquare wrapText="bothSides"/>"#);
        }
        let _ = write!(
            out,
            concat!(
                r#"<wp:docPr id="{id}" name="{name}" descr="{descr}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
                r#"</a:graphicData></a:graphic>"#
            ),
            id = id,
            name = name,
            descr = descr,
            rel = self.rel_id,
            cx = cx,
            cy = cy
        );
        out.push_str(if self.float.is_some() {
            "</wp:anchor>"
        } else {
            "</wp:inline>"
        });
        out.push_str("</w:drawing>");
    }
}

/// Places pictures for `<img>` elements.
pub trait ImageEmbedder {
    /// Append a drawing for the image element `node` to `paragraph`.
    ///
    /// Images that cannot be embedded are skipped, not reported as errors.
    /// `registry` supplies the paragraph's fallback text style when the
    /// drawing is its first content.
    fn add_image(
        &mut self,
        dom: &ArenaDom,
        registry: &mut dyn StyleRegistry,
        node: NodeId,
        style: &ComputedStyle,
        paragraph: &mut Paragraph,
    ) -> Result<()>;
}

/// An image stored in the output package.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub rel_id: String,
    /// Path relative to `word/`, e.g. `media/image1.png`.
    pub target: String,
    pub format: MediaFormat,
    pub data: Vec<u8>,
    /// Pixel size, when the header could be read.
    pub dimensions: Option<(u32, u32)>,
}

/// The default image store.
#[derive(Debug, Default)]
pub struct ImagesManager {
    images: Vec<EmbeddedImage>,
    by_key: HashMap<String, usize>,
    next_drawing_id: u32,
    max_width: Option<f32>,
}

impl ImagesManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale pictures wider than `points` down to fit.
    pub fn with_max_width(mut self, points: Option<f32>) -> Self {
        self.max_width = points;
        self
    }

    pub fn images(&self) -> &[EmbeddedImage] {
        &self.images
    }

    /// Store image bytes under `key` (its resolved href), or return the
    /// index of the copy stored earlier. Formats a word processor cannot
    /// show as a picture are refused.
    pub fn register(&mut self, key: &str, data: Cow<'_, [u8]>) -> Option<usize> {
        if let Some(&index) = self.by_key.get(key) {
            return Some(index);
        }

        let format = detect_media_format(key, &data);
        if !format.is_embeddable() {
            log::warn!("Skipping image {key}: {} is not supported", format.mime_type());
            return None;
        }

        let index = self.images.len();
        let number = index + 1;
        self.images.push(EmbeddedImage {
            rel_id: format!("rId{}", index + FIRST_IMAGE_REL),
            target: format!("media/image{number}.{}", format.extension()),
            format,
            dimensions: extract_image_dimensions(&data),
            data: data.into_owned(),
        });
        self.by_key.insert(key.to_string(), index);
        Some(index)
    }

    /// A drawing of the stored image `index`, sized from CSS when given and
    /// from the pixel size at 96 dpi otherwise.
    pub fn drawing(&mut self, index: usize, style: &ComputedStyle, alt: &str) -> Option<Drawing> {
        let image = self.images.get(index)?;
        let (width, height) = display_size(image.dimensions, style.width, style.height)?;
        let (width, height) = match self.max_width {
            Some(max) if width > max && max > 0.0 => (max, height * max / width),
            _ => (width, height),
        };

        self.next_drawing_id += 1;
        let id = self.next_drawing_id;
        Some(Drawing {
            rel_id: image.rel_id.clone(),
            id,
            name: format!("Picture {id}"),
            description: alt.to_string(),
            cx: (f64::from(width) * EMU_PER_PT).round() as u64,
            cy: (f64::from(height) * EMU_PER_PT).round() as u64,
            float: match style.float {
                Float::Left => Some(FloatSide::Left),
                Float::Right => Some(FloatSide::Right),
                Float::None => None,
            },
        })
    }

    /// `word/_rels/document.xml.rels`.
    pub fn rels_xml(&self) -> String {
        let mut out = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        let _ = write!(
            out,
            r#"<Relationship Id="{STYLES_REL_ID}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
        );
        for image in &self.images {
            let _ = write!(
                out,
                r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="{}"/>"#,
                image.rel_id, image.target
            );
        }
        out.push_str("</Relationships>");
        out
    }

    /// Write every stored image below `word_dir`.
    pub fn write_media(&self, word_dir: &Path) -> Result<()> {
        if self.images.is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(word_dir.join("media"))?;
        for image in &self.images {
            std::fs::write(word_dir.join(&image.target), &image.data)?;
        }
        Ok(())
    }

    /// An embedder that resolves `src` attributes of the unit at `unit_href`.
    pub fn for_unit<'a>(
        &'a mut self,
        source: &'a SourceDocument,
        unit_href: &'a str,
    ) -> UnitImages<'a> {
        UnitImages {
            manager: self,
            source,
            unit_href,
        }
    }
}

/// Size in points. A single CSS dimension keeps the aspect ratio.
fn display_size(
    pixels: Option<(u32, u32)>,
    css_width: Option<f32>,
    css_height: Option<f32>,
) -> Option<(f32, f32)> {
    let natural = pixels
        .filter(|&(w, h)| w > 0 && h > 0)
        .map(|(w, h)| (w as f32 * 0.75, h as f32 * 0.75));

    match (css_width, css_height, natural) {
        (Some(w), Some(h), _) => Some((w, h)),
        (Some(w), None, Some((nw, nh))) => Some((w, nh * w / nw)),
        (None, Some(h), Some((nw, nh))) => Some((nw * h / nh, h)),
        (Some(w), None, None) => Some((w, w)),
        (None, Some(h), None) => Some((h, h)),
        (None, None, natural) => natural,
    }
}

/// [`ImageEmbedder`] for one unit: resolves image sources relative to the
/// unit and loads them from the source document.
pub struct UnitImages<'a> {
    manager: &'a mut ImagesManager,
    source: &'a SourceDocument,
    unit_href: &'a str,
}

impl<'a> UnitImages<'a> {
    fn load(&self, src: &str) -> Option<(String, Cow<'a, [u8]>)> {
        if let Some(data_uri) = src.strip_prefix("data:") {
            let (meta, payload) = data_uri.split_once(',')?;
            if !meta.ends_with(";base64") {
                log::warn!("Skipping non-base64 data URI image");
                return None;
            }
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .ok()?;
            return Some((src.to_string(), Cow::Owned(bytes)));
        }

        let Some(href) = resolve_href(self.unit_href, src) else {
            log::warn!("Skipping remote image {src}");
            return None;
        };
        let source: &'a SourceDocument = self.source;
        match source.require(&href) {
            Ok(data) => Some((href, data)),
            Err(e) => {
                log::warn!("Skipping image: {e} (referenced from {})", self.unit_href);
                None
            }
        }
    }
}

impl ImageEmbedder for UnitImages<'_> {
    fn add_image(
        &mut self,
        dom: &ArenaDom,
        registry: &mut dyn StyleRegistry,
        node: NodeId,
        style: &ComputedStyle,
        paragraph: &mut Paragraph,
    ) -> Result<()> {
        let Some(src) = dom.get_attr(node, "src").filter(|s| !s.trim().is_empty()) else {
            log::debug!("Image {node} has no src");
            return Ok(());
        };
        let Some((key, data)) = self.load(src.trim()) else {
            return Ok(());
        };
        let Some(index) = self.manager.register(&key, data) else {
            return Ok(());
        };

        let alt = dom.get_attr(node, "alt").unwrap_or_default();
        match self.manager.drawing(index, style, alt) {
            Some(drawing) => paragraph.add_drawing(registry, drawing),
            None => log::warn!("Skipping image {key}: size unknown"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::styles::StylesManager;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0, 0, 0, 13]);
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        data
    }

    fn drawings(p: &Paragraph) -> Vec<&Drawing> {
        p.runs()
            .iter()
            .flat_map(|r| r.tokens())
            .filter_map(|t| match t {
                crate::docx::run::Token::Drawing(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_register_dedupes_by_href() {
        let mut images = ImagesManager::new();
        let a = images.register("a.png", Cow::Owned(png(10, 10)));
        let b = images.register("a.png", Cow::Owned(png(10, 10)));
        let c = images.register("b.png", Cow::Owned(png(10, 10)));
        assert_eq!(a, Some(0));
        assert_eq!(b, Some(0));
        assert_eq!(c, Some(1));
        assert_eq!(images.images()[1].rel_id, "rId3");
        assert_eq!(images.images()[1].target, "media/image2.png");
    }

    #[test]
    fn test_svg_refused() {
        let mut images = ImagesManager::new();
        assert_eq!(images.register("a.svg", Cow::Borrowed(b"<svg/>")), None);
        assert!(images.images().is_empty());
    }

    #[test]
    fn test_display_size() {
        // 96 dpi: 100px is 75pt
        assert_eq!(display_size(Some((100, 50)), None, None), Some((75.0, 37.5)));
        assert_eq!(
            display_size(Some((100, 50)), Some(150.0), None),
            Some((150.0, 75.0))
        );
        assert_eq!(display_size(None, None, None), None);
    }

    #[test]
    fn test_max_width_scales_down() {
        let mut images = ImagesManager::new().with_max_width(Some(300.0));
        let index = images.register("wide.png", Cow::Owned(png(800, 400))).unwrap();
        let drawing = images
            .drawing(index, &ComputedStyle::default(), "")
            .unwrap();
        assert_eq!(drawing.cx, (300.0 * EMU_PER_PT) as u64);
        assert_eq!(drawing.cy, (150.0 * EMU_PER_PT) as u64);
    }

    #[test]
    fn test_unit_images_resolve_relative_src() {
        let mut source = SourceDocument::new();
        source
            .add_unit("text/ch1.html", "")
            .add_resource("images/pic one.png", png(4, 4));
        let dom = crate::dom::parse_html(
            r#"<p><img src="../images/pic%20one.png" alt="A &amp; B"><img src="../images/pic%20one.png"><img src="gone.png"></p>"#,
        );
        let imgs = dom.find_all_by_tag("img");

        let mut styles = StylesManager::new();
        let mut paragraph = Paragraph::new(&mut styles, NodeId(0), &ComputedStyle::default());
        let mut manager = ImagesManager::new();
        {
            let mut embedder = manager.for_unit(&source, "text/ch1.html");
            for &img in &imgs {
                embedder
                    .add_image(&dom, &mut styles, img, &ComputedStyle::default(), &mut paragraph)
                    .unwrap();
            }
        }

        let found = drawings(&paragraph);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].rel_id, found[1].rel_id);
        assert_ne!(found[0].id, found[1].id);
        assert_eq!(found[0].description, "A & B");
        assert_eq!(manager.images().len(), 1);
    }

    #[test]
    fn test_missing_image_adds_no_run() {
        let source = SourceDocument::new();
        let dom = crate::dom::parse_html(r#"<p><img src="gone.png"></p>"#);
        let img = dom.find_by_tag("img").unwrap();

        let mut styles = StylesManager::new();
        let mut paragraph = Paragraph::new(&mut styles, NodeId(0), &ComputedStyle::default());
        let mut manager = ImagesManager::new();
        manager
            .for_unit(&source, "text/ch1.html")
            .add_image(&dom, &mut styles, img, &ComputedStyle::default(), &mut paragraph)
            .unwrap();
        assert!(paragraph.runs().is_empty());
        assert_eq!(styles.text_style_count(), 0);
        assert!(manager.images().is_empty());
    }

    #[test]
    fn test_data_uri_image() {
        let data = base64::engine::general_purpose::STANDARD.encode(png(2, 2));
        let html = format!(r#"<p><img src="data:image/png;base64,{data}"></p>"#);
        let dom = crate::dom::parse_html(&html);
        let img = dom.find_by_tag("img").unwrap();

        let source = SourceDocument::new();
        let mut styles = StylesManager::new();
        let mut paragraph = Paragraph::new(&mut styles, NodeId(0), &ComputedStyle::default());
        let mut manager = ImagesManager::new();
        manager
            .for_unit(&source, "a.html")
            .add_image(&dom, &mut styles, img, &ComputedStyle::default(), &mut paragraph)
            .unwrap();
        assert_eq!(drawings(&paragraph).len(), 1);
        assert_eq!(manager.images()[0].format, MediaFormat::Png);
    }

    #[test]
    fn test_floating_drawing_xml() {
        let drawing = Drawing {
            rel_id: "rId2".to_string(),
            id: 1,
            name: "Picture 1".to_string(),
            description: "<alt>".to_string(),
            cx: 100,
            cy: 200,
            float: Some(FloatSide::Right),
        };
        let mut out = String::new();
        drawing.write_xml(&mut out);
        assert!(out.starts_with("<w:drawing><wp:anchor "));
        assert!(out.contains("<wp:align>right</wp:align>"));
        assert!(out.contains(r#"descr="&lt;alt&gt;""#));
        assert!(out.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(out.ends_with("</wp:anchor></w:drawing>"));
    }

    #[test]
    fn test_rels_xml() {
        let mut images = ImagesManager::new();
        images.register("a.png", Cow::Owned(png(1, 1)));
        let xml = images.rels_xml();
        assert!(xml.contains(r#"Id="rId1""#));
        assert!(xml.contains(r#"Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png""#));
    }
}
