//! Pascal VOC XML annotations, one file per generated image.
//!
//! The writer emits the layout the rest of the object-detection tooling
//! expects (`folder`, `filename`, `path`, `source`, `size`, `segmented`, and
//! one `object` per box). The reader only looks at the handful of fields the
//! record pipeline needs: file name, canvas size, and labelled boxes.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use super::model::BoundingBox;
use super::{BBoxXYXY, Pixel};
use crate::error::CirclegenError;

pub const VOC_XML_EXTENSION: &str = "xml";
const IMAGES_FOLDER: &str = "images";

/// The parsed contents of one VOC annotation file.
#[derive(Clone, Debug, PartialEq)]
pub struct VocAnnotation {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub boxes: Vec<BoundingBox>,
}

impl VocAnnotation {
    /// An RGB annotation for `filename` with the given boxes.
    pub fn new(filename: impl Into<String>, width: u32, height: u32, boxes: Vec<BoundingBox>) -> Self {
        Self {
            filename: filename.into(),
            width,
            height,
            depth: 3,
            boxes,
        }
    }
}

/// Write `annotation` to `path`.
pub fn write_voc_xml(path: &Path, annotation: &VocAnnotation) -> Result<(), CirclegenError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(CirclegenError::Io)?;
    }
    fs::write(path, to_voc_xml_string(annotation)).map_err(CirclegenError::Io)
}

/// Render `annotation` as a VOC XML document.
///
/// Box coordinates are written as whole pixels (truncated toward zero).
pub fn to_voc_xml_string(annotation: &VocAnnotation) -> String {
    let mut xml = String::new();
    let filename = xml_escape(&annotation.filename);

    writeln!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>").expect("write to string");
    writeln!(xml, "<annotation>").expect("write to string");
    writeln!(xml, "  <folder>{IMAGES_FOLDER}</folder>").expect("write to string");
    writeln!(xml, "  <filename>{filename}</filename>").expect("write to string");
    writeln!(xml, "  <path>{IMAGES_FOLDER}/{filename}</path>").expect("write to string");
    writeln!(xml, "  <source>").expect("write to string");
    writeln!(xml, "    <database>Unknown</database>").expect("write to string");
    writeln!(xml, "  </source>").expect("write to string");
    writeln!(xml, "  <size>").expect("write to string");
    writeln!(xml, "    <width>{}</width>", annotation.width).expect("write to string");
    writeln!(xml, "    <height>{}</height>", annotation.height).expect("write to string");
    writeln!(xml, "    <depth>{}</depth>", annotation.depth).expect("write to string");
    writeln!(xml, "  </size>").expect("write to string");
    writeln!(xml, "  <segmented>0</segmented>").expect("write to string");

    for bbox in &annotation.boxes {
        writeln!(xml, "  <object>").expect("write to string");
        writeln!(xml, "    <name>{}</name>", xml_escape(&bbox.label)).expect("write to string");
        writeln!(xml, "    <pose>Unspecified</pose>").expect("write to string");
        writeln!(xml, "    <truncated>0</truncated>").expect("write to string");
        writeln!(xml, "    <difficult>0</difficult>").expect("write to string");
        writeln!(xml, "    <bndbox>").expect("write to string");
        writeln!(xml, "      <xmin>{}</xmin>", bbox.bbox.xmin() as i32).expect("write to string");
        writeln!(xml, "      <ymin>{}</ymin>", bbox.bbox.ymin() as i32).expect("write to string");
        writeln!(xml, "      <xmax>{}</xmax>", bbox.bbox.xmax() as i32).expect("write to string");
        writeln!(xml, "      <ymax>{}</ymax>", bbox.bbox.ymax() as i32).expect("write to string");
        writeln!(xml, "    </bndbox>").expect("write to string");
        writeln!(xml, "  </object>").expect("write to string");
    }

    writeln!(xml, "</annotation>").expect("write to string");
    xml
}

/// Read a VOC annotation file, keeping only objects whose `<name>` appears
/// in `class_map`.
///
/// Objects without a `<bndbox>` are skipped rather than rejected.
pub fn read_voc_xml(
    path: &Path,
    class_map: &BTreeMap<i64, String>,
) -> Result<VocAnnotation, CirclegenError> {
    let xml = fs::read_to_string(path).map_err(CirclegenError::Io)?;
    parse_voc_xml_str(&xml, path, class_map)
}

/// Parse VOC XML from a UTF-8 string.
pub fn from_voc_xml_str(
    xml: &str,
    class_map: &BTreeMap<i64, String>,
) -> Result<VocAnnotation, CirclegenError> {
    parse_voc_xml_str(xml, Path::new("<memory>"), class_map)
}

/// Object count and per-object diameters (`(width + height) / 2`, whole pixels).
pub fn circle_stats(annotation: &VocAnnotation) -> (usize, Vec<i32>) {
    let diameters = annotation
        .boxes
        .iter()
        .map(|bbox| {
            let width = bbox.bbox.width() as i32;
            let height = bbox.bbox.height() as i32;
            (width + height) / 2
        })
        .collect();
    (annotation.boxes.len(), diameters)
}

/// The annotation path matching an image file name (`log_001.png` -> `log_001.xml`).
pub fn annotation_file_name(image_file_name: &str) -> PathBuf {
    Path::new(image_file_name).with_extension(VOC_XML_EXTENSION)
}

fn parse_voc_xml_str(
    xml: &str,
    path: &Path,
    class_map: &BTreeMap<i64, String>,
) -> Result<VocAnnotation, CirclegenError> {
    let document =
        roxmltree::Document::parse(xml).map_err(|source| CirclegenError::VocXmlParse {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;

    let annotation = document.root_element();
    if annotation.tag_name().name() != "annotation" {
        return Err(CirclegenError::VocXmlParse {
            path: path.to_path_buf(),
            message: "missing <annotation> root element".to_string(),
        });
    }

    let filename = required_child_text(annotation, "filename", path, "<annotation>")?;

    let size = required_child_element(annotation, "size", path, "<annotation>")?;
    let width = parse_required_u32(size, "width", path, "<size>")?;
    let height = parse_required_u32(size, "height", path, "<size>")?;
    let depth = match optional_child_text(size, "depth") {
        Some(raw) => raw.parse::<u32>().map_err(|_| CirclegenError::VocXmlParse {
            path: path.to_path_buf(),
            message: format!("invalid <depth> value '{raw}' in <size>; expected u32"),
        })?,
        None => 3,
    };

    let class_id_by_name: BTreeMap<&str, i64> = class_map
        .iter()
        .map(|(id, name)| (name.as_str(), *id))
        .collect();

    let mut boxes = Vec::new();
    for object in annotation
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let Some(name) = optional_child_text(object, "name") else {
            continue;
        };
        let Some(&class_id) = class_id_by_name.get(name.as_str()) else {
            continue;
        };
        let Some(bndbox) = child_element(object, "bndbox") else {
            continue;
        };

        let xmin = parse_required_f32(bndbox, "xmin", path, "<bndbox>")?;
        let ymin = parse_required_f32(bndbox, "ymin", path, "<bndbox>")?;
        let xmax = parse_required_f32(bndbox, "xmax", path, "<bndbox>")?;
        let ymax = parse_required_f32(bndbox, "ymax", path, "<bndbox>")?;

        let bbox = BBoxXYXY::<Pixel>::from_xyxy(xmin, ymin, xmax, ymax);
        if !bbox.is_finite() {
            return Err(CirclegenError::VocXmlParse {
                path: path.to_path_buf(),
                message: format!("non-finite <bndbox> for object '{name}': {bbox:?}"),
            });
        }
        boxes.push(BoundingBox::new(bbox, name, class_id));
    }

    Ok(VocAnnotation {
        filename,
        width,
        height,
        depth,
        boxes,
    })
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, CirclegenError> {
    child_element(node, tag).ok_or_else(|| CirclegenError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, CirclegenError> {
    optional_child_text(node, tag).ok_or_else(|| CirclegenError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn parse_required_u32(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<u32, CirclegenError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<u32>().map_err(|_| CirclegenError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("invalid <{tag}> value '{raw}' in {context}; expected u32"),
    })
}

fn parse_required_f32(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<f32, CirclegenError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<f32>().map_err(|_| CirclegenError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("invalid <{tag}> value '{raw}' in {context}; expected a number"),
    })
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_classes() -> BTreeMap<i64, String> {
        BTreeMap::from([(1, "circle".to_string())])
    }

    #[test]
    fn written_xml_parses_back() {
        let annotation = VocAnnotation::new(
            "log_000.png",
            128,
            128,
            vec![BoundingBox::circle(BBoxXYXY::from_xyxy(54.0, 54.0, 74.0, 74.0))],
        );
        let xml = to_voc_xml_string(&annotation);
        assert!(xml.contains("<path>images/log_000.png</path>"));

        let parsed = from_voc_xml_str(&xml, &circle_classes()).expect("parse xml");
        assert_eq!(parsed, annotation);
    }

    #[test]
    fn unknown_classes_and_boxless_objects_are_skipped() {
        let xml = r#"<annotation>
  <filename>a.png</filename>
  <size><width>64</width><height>32</height></size>
  <object><name>square</name><bndbox><xmin>1</xmin><ymin>1</ymin><xmax>5</xmax><ymax>5</ymax></bndbox></object>
  <object><name>circle</name></object>
  <object><name>circle</name><bndbox><xmin>2</xmin><ymin>3</ymin><xmax>12</xmax><ymax>13</ymax></bndbox></object>
</annotation>"#;

        let parsed = from_voc_xml_str(xml, &circle_classes()).expect("parse xml");
        assert_eq!(parsed.width, 64);
        assert_eq!(parsed.height, 32);
        assert_eq!(parsed.depth, 3);
        assert_eq!(parsed.boxes.len(), 1);
        assert_eq!(parsed.boxes[0].bbox.xmin(), 2.0);
        assert_eq!(parsed.boxes[0].class_id, 1);
    }

    #[test]
    fn non_numeric_coordinate_is_an_error() {
        let xml = r#"<annotation>
  <filename>a.png</filename>
  <size><width>64</width><height>64</height></size>
  <object><name>circle</name><bndbox><xmin>x</xmin><ymin>1</ymin><xmax>5</xmax><ymax>5</ymax></bndbox></object>
</annotation>"#;

        let err = from_voc_xml_str(xml, &circle_classes()).unwrap_err();
        assert!(matches!(err, CirclegenError::VocXmlParse { .. }));
    }

    #[test]
    fn non_finite_coordinate_is_an_error() {
        for raw in ["NaN", "inf", "-infinity"] {
            let xml = format!(
                "<annotation><filename>a.png</filename><size><width>64</width><height>64</height></size>\
                 <object><name>circle</name><bndbox><xmin>1</xmin><ymin>1</ymin><xmax>{raw}</xmax><ymax>5</ymax></bndbox></object>\
                 </annotation>"
            );
            let err = from_voc_xml_str(&xml, &circle_classes()).unwrap_err();
            assert!(err.to_string().contains("non-finite"), "{raw}: {err}");
        }
    }

    #[test]
    fn circle_stats_reports_diameters() {
        let annotation = VocAnnotation::new(
            "a.png",
            128,
            128,
            vec![
                BoundingBox::circle(BBoxXYXY::from_xyxy(0.0, 0.0, 20.0, 20.0)),
                BoundingBox::circle(BBoxXYXY::from_xyxy(30.0, 30.0, 41.0, 40.0)),
            ],
        );
        assert_eq!(circle_stats(&annotation), (2, vec![20, 10]));
    }

    #[test]
    fn annotation_file_name_swaps_extension() {
        assert_eq!(annotation_file_name("log_004.png"), PathBuf::from("log_004.xml"));
    }
}
