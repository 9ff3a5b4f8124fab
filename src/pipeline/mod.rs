//! End-to-end session driver.
//!
//! A session lives under `<output_dir>/<session_id>/`:
//!
//! ```text
//! images/log_000.png ...        rendered rings
//! annotations/log_000.xml ...   Pascal VOC boxes
//! trainval.txt training.txt validation.txt
//! label_map.pbtxt
//! training.tfrecord validation.tfrecord
//! ```
//!
//! Containers are packed from what is on disk, not from memory, so a
//! session directory edited by hand (images removed, annotations fixed up)
//! can be re-packed with [`write_container`].

mod report;

pub use report::{BuildReport, ContainerSummary};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::annotate;
use crate::error::CirclegenError;
use crate::feature::{self, FeatureMap};
use crate::geometry::{self, GeneratorConfig};
use crate::ir::io_voc_xml::{self, VocAnnotation};
use crate::ir::label_map::{write_label_map, LABEL_MAP_FILE_NAME};
use crate::ir::{BoundingBox, ImageName, CIRCLE_CLASS_ID, CIRCLE_CLASS_NAME};
use crate::record::{read_all_records, RecordWriter};
use crate::render::{render_rings, ImageCodec};
use crate::split::{self, DatasetManifest, SplitPolicy};

pub const IMAGES_DIR_NAME: &str = "images";
pub const ANNOTATIONS_DIR_NAME: &str = "annotations";
pub const TRAIN_CONTAINER_FILE_NAME: &str = "training.tfrecord";
pub const VAL_CONTAINER_FILE_NAME: &str = "validation.tfrecord";

/// Everything `build_session` needs besides the random source and codec.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Parent directory; the session gets its own subdirectory.
    pub output_dir: PathBuf,
    pub session_id: String,
    pub image_count: usize,
    pub image_width: u32,
    pub image_height: u32,
    /// Per-image circle targets are drawn uniformly from `min_circles..=max_circles`.
    pub min_circles: usize,
    pub max_circles: usize,
    pub generator: GeneratorConfig,
    pub val_ratio: f64,
    pub split_policy: SplitPolicy,
    pub class_name: String,
    pub class_id: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            session_id: uuid::Uuid::new_v4().to_string(),
            image_count: 20,
            image_width: 128,
            image_height: 128,
            min_circles: 0,
            max_circles: 10,
            generator: GeneratorConfig::default(),
            val_ratio: 0.2,
            split_policy: SplitPolicy::default(),
            class_name: CIRCLE_CLASS_NAME.to_string(),
            class_id: CIRCLE_CLASS_ID,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), CirclegenError> {
        self.generator.validate(self.image_width, self.image_height)?;
        if self.min_circles > self.max_circles {
            return Err(CirclegenError::InvalidGenerateParams {
                message: format!(
                    "min circles ({}) exceeds max circles ({})",
                    self.min_circles, self.max_circles
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.val_ratio) {
            return Err(CirclegenError::InvalidSplitRatio {
                ratio: self.val_ratio,
            });
        }
        if self.session_id.is_empty()
            || self.session_id.contains(|c: char| c == '/' || c == '\\')
            || self.session_id == "."
            || self.session_id == ".."
        {
            return Err(CirclegenError::InvalidGenerateParams {
                message: format!("session id '{}' is not a plain directory name", self.session_id),
            });
        }
        if self.class_name.trim().is_empty() {
            return Err(CirclegenError::InvalidGenerateParams {
                message: "class name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_id)
    }

    /// The single-entry class map written to the label map.
    pub fn class_map(&self) -> BTreeMap<i64, String> {
        BTreeMap::from([(self.class_id, self.class_name.clone())])
    }
}

/// Paths inside one session directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionLayout {
    pub root: PathBuf,
    pub images: PathBuf,
    pub annotations: PathBuf,
}

impl SessionLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            images: root.join(IMAGES_DIR_NAME),
            annotations: root.join(ANNOTATIONS_DIR_NAME),
            root,
        }
    }

    pub fn image_path(&self, image: &ImageName) -> PathBuf {
        self.images.join(image.as_str())
    }

    pub fn annotation_path(&self, image: &ImageName) -> PathBuf {
        self.annotations
            .join(io_voc_xml::annotation_file_name(image.as_str()))
    }

    pub fn container_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    fn create_dirs(&self) -> Result<(), CirclegenError> {
        fs::create_dir_all(&self.images).map_err(CirclegenError::Io)?;
        fs::create_dir_all(&self.annotations).map_err(CirclegenError::Io)
    }
}

/// Generate, annotate, split and pack one session.
///
/// The random source is consumed in a fixed order: per image the circle
/// target, the placement, then the ring styles; after all images, the
/// split. A seeded source therefore reproduces the whole session.
///
/// Failures confined to one image are logged and counted as skipped.
/// Directory creation, manifest, label map and container write failures
/// abort the run. When `cancel` is raised the run stops between images;
/// containers written so far always end on a record boundary.
pub fn build_session<R: Rng + ?Sized>(
    config: &SessionConfig,
    codec: &dyn ImageCodec,
    rng: &mut R,
    cancel: Option<&AtomicBool>,
) -> Result<BuildReport, CirclegenError> {
    config.validate()?;

    let layout = SessionLayout::new(config.session_dir());
    layout.create_dirs()?;
    info!(
        session = %config.session_id,
        dir = %layout.root.display(),
        images = config.image_count,
        "starting session"
    );

    let mut report = BuildReport {
        session_id: config.session_id.clone(),
        session_dir: layout.root.clone(),
        images_requested: config.image_count,
        ..Default::default()
    };

    let mut generated = Vec::with_capacity(config.image_count);
    for index in 0..config.image_count {
        if is_cancelled(cancel) {
            report.cancelled = true;
            break;
        }

        let name = ImageName::for_index(index).with_extension(codec.extension());
        match generate_image(config, &layout, &name, codec, rng) {
            Ok(outcome) => {
                report.circles_placed += outcome.placed;
                if outcome.short {
                    report.images_short += 1;
                }
                generated.push(name);
            }
            Err(err) => {
                warn!(image = %name, error = %err, "skipping image");
                report.images_skipped += 1;
            }
        }
    }
    report.images_generated = generated.len();

    let split = split::split(&generated, config.val_ratio, config.split_policy, rng)?;
    let manifest = DatasetManifest::new(generated, split);
    manifest.write(&layout.root)?;

    let class_map = config.class_map();
    write_label_map(&layout.root.join(LABEL_MAP_FILE_NAME), &class_map)?;

    let pack = |file_name: &str, ids: &[ImageName]| {
        write_container(
            &layout.container_path(file_name),
            &layout,
            ids,
            &class_map,
            codec,
            cancel,
        )
    };
    report.training = pack(TRAIN_CONTAINER_FILE_NAME, manifest.split.train.as_slice())?;
    report.validation = pack(VAL_CONTAINER_FILE_NAME, manifest.split.val.as_slice())?;
    report.cancelled |= is_cancelled(cancel);

    info!(
        session = %config.session_id,
        generated = report.images_generated,
        skipped = report.images_skipped,
        records = report.records_written(),
        cancelled = report.cancelled,
        "session finished"
    );
    Ok(report)
}

struct ImageOutcome {
    placed: usize,
    short: bool,
}

fn generate_image<R: Rng + ?Sized>(
    config: &SessionConfig,
    layout: &SessionLayout,
    name: &ImageName,
    codec: &dyn ImageCodec,
    rng: &mut R,
) -> Result<ImageOutcome, CirclegenError> {
    let (width, height) = (config.image_width, config.image_height);
    let target = rng.random_range(config.min_circles..=config.max_circles);

    let placement = geometry::generate(width, height, target, &config.generator, rng);
    if let Some(shortfall) = placement.shortfall() {
        debug!(
            image = %name,
            requested = shortfall.requested,
            placed = shortfall.placed,
            rejections = placement.rejections,
            "placement stopped early"
        );
    }

    let annotation = annotate::build(&placement.circles, width, height);
    let bitmap = render_rings(&placement.circles, width, height, rng);
    let encoded = codec.encode(&bitmap)?;
    fs::write(layout.image_path(name), encoded).map_err(CirclegenError::Io)?;

    let boxes = annotation
        .boxes
        .into_iter()
        .map(|b| BoundingBox::new(b.bbox, config.class_name.as_str(), config.class_id))
        .collect();
    let voc = VocAnnotation::new(name.as_str(), width, height, boxes);
    io_voc_xml::write_voc_xml(&layout.annotation_path(name), &voc)?;

    Ok(ImageOutcome {
        placed: placement.circles.len(),
        short: !placement.is_complete(),
    })
}

/// Pack the listed images of a session into one container at `path`.
///
/// Each image is read back from disk together with its annotation, turned
/// into an example and framed. An image whose file or annotation is missing
/// or unreadable is logged and skipped. Errors writing the container itself
/// are returned.
pub fn write_container(
    path: &Path,
    layout: &SessionLayout,
    ids: &[ImageName],
    class_map: &BTreeMap<i64, String>,
    codec: &dyn ImageCodec,
    cancel: Option<&AtomicBool>,
) -> Result<ContainerSummary, CirclegenError> {
    let mut writer = RecordWriter::create(path)?;
    let mut skipped = 0usize;

    for id in ids {
        if is_cancelled(cancel) {
            break;
        }
        let features = match load_example(layout, id, class_map, codec) {
            Ok(features) => features,
            Err(err) => {
                warn!(image = %id, container = %path.display(), error = %err, "skipping example");
                skipped += 1;
                continue;
            }
        };
        writer.write_record(&feature::encode(&features))?;
    }

    let records = writer.records_written();
    let bytes = writer.bytes_written();
    writer.flush()?;
    info!(path = %path.display(), records, skipped, "container written");

    Ok(ContainerSummary {
        path: path.to_path_buf(),
        listed: ids.len(),
        records,
        skipped,
        bytes,
    })
}

fn load_example(
    layout: &SessionLayout,
    id: &ImageName,
    class_map: &BTreeMap<i64, String>,
    codec: &dyn ImageCodec,
) -> Result<FeatureMap, CirclegenError> {
    let image_bytes = fs::read(layout.image_path(id)).map_err(CirclegenError::Io)?;
    let bitmap = codec.decode(&image_bytes)?;
    let annotation = io_voc_xml::read_voc_xml(&layout.annotation_path(id), class_map)?;

    let (count, diameters) = io_voc_xml::circle_stats(&annotation);
    debug!(image = %id, count, ?diameters, "packing example");

    Ok(annotate::build_example(
        image_bytes,
        bitmap.width(),
        bitmap.height(),
        &annotation.boxes,
    ))
}

/// Decode every record of the container at `path`.
///
/// A record that fails to decode yields `Err(MalformedFeature)` and reading
/// continues; a corrupt frame yields `Err(CorruptContainer)` as the last item.
pub fn read_examples(
    path: &Path,
) -> Result<impl Iterator<Item = Result<FeatureMap, CirclegenError>>, CirclegenError> {
    Ok(read_all_records(path)?.map(|record| record.and_then(|payload| feature::decode(&payload))))
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}
