//! Viola-Jones detector driven by OpenCV `opencv-cascade-classifier` XML files.
//!
//! Only boosted stages over upright HAAR features are supported, which
//! covers the stock frontal face, eye and smile cascades.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::integral_image::{integral_image, integral_squared_image};
use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::object_detector::{DetectParams, ObjectDetector};
use crate::shared::bounding_box::BoundingBox;

/// Relative tolerance used when clustering candidate windows.
pub const GROUP_EPS: f64 = 0.2;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("failed to read cascade {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed cascade XML: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("unsupported cascade: {0}")]
    Unsupported(String),
    #[error("invalid cascade: {0}")]
    Invalid(String),
    #[error("scale factor must be greater than 1.0, got {0}")]
    ScaleFactor(f64),
}

// XML layout of an OpenCV cascade file. Unknown elements are ignored.

#[derive(Deserialize)]
struct StorageXml {
    cascade: Option<CascadeXml>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CascadeXml {
    stage_type: String,
    feature_type: String,
    height: u32,
    width: u32,
    stages: ListXml<StageXml>,
    features: ListXml<FeatureXml>,
}

#[derive(Deserialize)]
struct ListXml<T> {
    #[serde(rename = "_", default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StageXml {
    stage_threshold: String,
    weak_classifiers: ListXml<WeakXml>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeakXml {
    internal_nodes: String,
    leaf_values: String,
}

#[derive(Deserialize)]
struct FeatureXml {
    rects: ListXml<String>,
    #[serde(default)]
    tilted: Option<String>,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    left: i32,
    right: i32,
    feature: usize,
    threshold: f64,
}

#[derive(Clone, Debug)]
struct WeakClassifier {
    nodes: Vec<Node>,
    leaves: Vec<f64>,
}

#[derive(Clone, Debug)]
struct Stage {
    threshold: f64,
    classifiers: Vec<WeakClassifier>,
}

#[derive(Clone, Copy, Debug)]
struct WeightedRect {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    weight: f64,
}

#[derive(Clone, Debug)]
struct HaarFeature {
    rects: Vec<WeightedRect>,
}

enum Verdict {
    Accept,
    Reject { stage: usize },
}

/// Summed-area tables of one pyramid level, `(width + 1) x (height + 1)`.
struct IntegralTables {
    sum: Vec<u64>,
    sqsum: Vec<u64>,
    stride: usize,
}

impl IntegralTables {
    fn new(image: &GrayImage) -> Self {
        let sum = integral_image::<_, u64>(image).into_raw();
        let sqsum = integral_squared_image::<_, u64>(image).into_raw();
        Self {
            sum,
            sqsum,
            stride: image.width() as usize + 1,
        }
    }

    fn rect(table: &[u64], stride: usize, x: usize, y: usize, w: usize, h: usize) -> u64 {
        let top = y * stride;
        let bottom = (y + h) * stride;
        (table[bottom + x + w] + table[top + x]) - (table[top + x + w] + table[bottom + x])
    }

    fn sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        Self::rect(&self.sum, self.stride, x, y, w, h)
    }

    fn sqsum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        Self::rect(&self.sqsum, self.stride, x, y, w, h)
    }
}

impl HaarFeature {
    fn value(&self, tables: &IntegralTables, x: usize, y: usize) -> f64 {
        self.rects
            .iter()
            .map(|r| r.weight * tables.sum(x + r.x, y + r.y, r.width, r.height) as f64)
            .sum()
    }
}

/// A loaded cascade classifier.
#[derive(Clone, Debug)]
pub struct HaarCascade {
    window: (u32, u32),
    stages: Vec<Stage>,
    features: Vec<HaarFeature>,
}

impl HaarCascade {
    pub fn from_file(path: &Path) -> Result<Self, CascadeError> {
        let xml = fs::read_to_string(path).map_err(|e| CascadeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cascade = Self::from_xml(&xml)?;
        log::debug!(
            "Loaded cascade {}: {} stages, {} features, {}x{} window",
            path.display(),
            cascade.stages.len(),
            cascade.features.len(),
            cascade.window.0,
            cascade.window.1
        );
        Ok(cascade)
    }

    pub fn from_xml(xml: &str) -> Result<Self, CascadeError> {
        let storage: StorageXml = quick_xml::de::from_str(xml)?;
        let cascade = storage.cascade.ok_or_else(|| {
            CascadeError::Unsupported("no <cascade> element (legacy format?)".to_string())
        })?;

        if cascade.stage_type != "BOOST" {
            return Err(CascadeError::Unsupported(format!(
                "stage type {}",
                cascade.stage_type
            )));
        }
        if cascade.feature_type != "HAAR" {
            return Err(CascadeError::Unsupported(format!(
                "feature type {}",
                cascade.feature_type
            )));
        }
        if cascade.width < 3 || cascade.height < 3 {
            return Err(CascadeError::Invalid(format!(
                "window {}x{} is too small",
                cascade.width, cascade.height
            )));
        }
        let window = (cascade.width, cascade.height);

        let features = cascade
            .features
            .items
            .iter()
            .enumerate()
            .map(|(i, f)| parse_feature(i, f, window))
            .collect::<Result<Vec<_>, _>>()?;

        let stages = cascade
            .stages
            .items
            .iter()
            .enumerate()
            .map(|(i, s)| parse_stage(i, s, features.len()))
            .collect::<Result<Vec<_>, _>>()?;
        if stages.is_empty() {
            return Err(CascadeError::Invalid("cascade has no stages".to_string()));
        }

        Ok(Self {
            window,
            stages,
            features,
        })
    }

    /// Base detection window `(width, height)`.
    pub fn window_size(&self) -> (u32, u32) {
        self.window
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Runs the cascade over every pyramid level and returns ungrouped
    /// candidate windows in `image` coordinates.
    fn candidates(&self, image: &GrayImage, params: &DetectParams) -> Vec<BoundingBox> {
        let (img_w, img_h) = image.dimensions();
        let (win_w, win_h) = self.window;
        let mut found = Vec::new();
        let mut factor = 1.0f64;
        loop {
            let scaled_w = (img_w as f64 / factor).round() as u32;
            let scaled_h = (img_h as f64 / factor).round() as u32;
            if scaled_w <= win_w || scaled_h <= win_h {
                break;
            }
            let box_w = (win_w as f64 * factor).round() as u32;
            let box_h = (win_h as f64 * factor).round() as u32;
            if box_w >= params.min_size.0 && box_h >= params.min_size.1 {
                let scaled = if (scaled_w, scaled_h) == (img_w, img_h) {
                    Cow::Borrowed(image)
                } else {
                    Cow::Owned(imageops::resize(image, scaled_w, scaled_h, FilterType::Triangle))
                };
                self.scan_level(&scaled, factor, (box_w, box_h), &mut found);
            }
            factor *= params.scale_factor;
        }
        found
    }

    fn scan_level(
        &self,
        level: &GrayImage,
        factor: f64,
        box_size: (u32, u32),
        found: &mut Vec<BoundingBox>,
    ) {
        let tables = IntegralTables::new(level);
        let step = if factor > 2.0 { 1 } else { 2 };
        let span_x = (level.width() - self.window.0) as usize;
        let span_y = (level.height() - self.window.1) as usize;
        for y in (0..span_y).step_by(step) {
            let mut x = 0;
            while x < span_x {
                match self.classify(&tables, x, y) {
                    Verdict::Accept => found.push(BoundingBox::new(
                        (x as f64 * factor).round() as u32,
                        (y as f64 * factor).round() as u32,
                        box_size.0,
                        box_size.1,
                    )),
                    // rejected by the first stage: neighbours rarely pass either
                    Verdict::Reject { stage: 0 } => x += step,
                    Verdict::Reject { .. } => {}
                }
                x += step;
            }
        }
    }

    fn classify(&self, tables: &IntegralTables, x: usize, y: usize) -> Verdict {
        let (win_w, win_h) = (self.window.0 as usize, self.window.1 as usize);
        let (norm_w, norm_h) = (win_w - 2, win_h - 2);
        let area = (norm_w * norm_h) as f64;
        let sum = tables.sum(x + 1, y + 1, norm_w, norm_h) as f64;
        let sqsum = tables.sqsum(x + 1, y + 1, norm_w, norm_h) as f64;
        let variance = area * sqsum - sum * sum;
        let norm = if variance > 0.0 { variance.sqrt() } else { 1.0 };

        for (index, stage) in self.stages.iter().enumerate() {
            let mut total = 0.0;
            for weak in &stage.classifiers {
                let mut idx = 0i32;
                loop {
                    let node = &weak.nodes[idx as usize];
                    let value = self.features[node.feature].value(tables, x, y) / norm;
                    idx = if value < node.threshold {
                        node.left
                    } else {
                        node.right
                    };
                    if idx <= 0 {
                        break;
                    }
                }
                total += weak.leaves[(-idx) as usize];
            }
            if total < stage.threshold {
                return Verdict::Reject { stage: index };
            }
        }
        Verdict::Accept
    }
}

impl ObjectDetector for HaarCascade {
    fn detect(
        &self,
        image: &GrayImage,
        params: &DetectParams,
    ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        if params.scale_factor.is_nan() || params.scale_factor <= 1.0 {
            return Err(CascadeError::ScaleFactor(params.scale_factor).into());
        }
        let candidates = self.candidates(image, params);
        let (w, h) = image.dimensions();
        Ok(group_rectangles(&candidates, params.min_neighbors, GROUP_EPS)
            .into_iter()
            .map(|b| b.clamp_to(w, h))
            .filter(|b| !b.is_empty())
            .collect())
    }
}

fn parse_numbers<T: std::str::FromStr>(text: &str, what: &str) -> Result<Vec<T>, CascadeError> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<T>()
                .map_err(|_| CascadeError::Invalid(format!("bad number '{tok}' in {what}")))
        })
        .collect()
}

fn parse_feature(
    index: usize,
    feature: &FeatureXml,
    window: (u32, u32),
) -> Result<HaarFeature, CascadeError> {
    if let Some(tilted) = &feature.tilted {
        if tilted.trim() != "0" {
            return Err(CascadeError::Unsupported(format!(
                "feature {index} is tilted"
            )));
        }
    }
    if feature.rects.items.is_empty() || feature.rects.items.len() > 3 {
        return Err(CascadeError::Invalid(format!(
            "feature {index} has {} rectangles",
            feature.rects.items.len()
        )));
    }
    let rects = feature
        .rects
        .items
        .iter()
        .map(|text| {
            let values: Vec<f64> = parse_numbers(text, "feature rectangle")?;
            let [x, y, w, h, weight] = values[..] else {
                return Err(CascadeError::Invalid(format!(
                    "feature {index}: expected 'x y w h weight', got '{}'",
                    text.trim()
                )));
            };
            if x < 0.0 || y < 0.0 || w <= 0.0 || h <= 0.0 {
                return Err(CascadeError::Invalid(format!(
                    "feature {index}: negative rectangle"
                )));
            }
            let rect = WeightedRect {
                x: x as usize,
                y: y as usize,
                width: w as usize,
                height: h as usize,
                weight,
            };
            if rect.x + rect.width > window.0 as usize || rect.y + rect.height > window.1 as usize {
                return Err(CascadeError::Invalid(format!(
                    "feature {index}: rectangle outside the {}x{} window",
                    window.0, window.1
                )));
            }
            Ok(rect)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HaarFeature { rects })
}

fn parse_stage(index: usize, stage: &StageXml, feature_count: usize) -> Result<Stage, CascadeError> {
    let threshold = stage.stage_threshold.trim().parse::<f64>().map_err(|_| {
        CascadeError::Invalid(format!(
            "stage {index}: bad threshold '{}'",
            stage.stage_threshold.trim()
        ))
    })?;
    let classifiers = stage
        .weak_classifiers
        .items
        .iter()
        .map(|weak| parse_weak(index, weak, feature_count))
        .collect::<Result<Vec<_>, _>>()?;
    if classifiers.is_empty() {
        return Err(CascadeError::Invalid(format!(
            "stage {index} has no weak classifiers"
        )));
    }
    Ok(Stage {
        threshold,
        classifiers,
    })
}

fn parse_weak(stage: usize, weak: &WeakXml, feature_count: usize) -> Result<WeakClassifier, CascadeError> {
    let raw: Vec<f64> = parse_numbers(&weak.internal_nodes, "internalNodes")?;
    let leaves: Vec<f64> = parse_numbers(&weak.leaf_values, "leafValues")?;
    if raw.is_empty() || raw.len() % 4 != 0 {
        return Err(CascadeError::Invalid(format!(
            "stage {stage}: internalNodes must hold groups of 4 values"
        )));
    }
    let nodes: Vec<Node> = raw
        .chunks_exact(4)
        .map(|n| Node {
            left: n[0] as i32,
            right: n[1] as i32,
            feature: n[2] as usize,
            threshold: n[3],
        })
        .collect();

    for (i, node) in nodes.iter().enumerate() {
        if node.feature >= feature_count {
            return Err(CascadeError::Invalid(format!(
                "stage {stage}: feature index {} out of range",
                node.feature
            )));
        }
        for child in [node.left, node.right] {
            // positive children must point forward so evaluation terminates
            let valid = if child > 0 {
                (child as usize) > i && (child as usize) < nodes.len()
            } else {
                ((-child) as usize) < leaves.len()
            };
            if !valid {
                return Err(CascadeError::Invalid(format!(
                    "stage {stage}: node {i} has invalid child {child}"
                )));
            }
        }
    }
    Ok(WeakClassifier { nodes, leaves })
}

fn similar(a: &BoundingBox, b: &BoundingBox, eps: f64) -> bool {
    let delta = eps * (a.width.min(b.width) + a.height.min(b.height)) as f64 * 0.5;
    let close = |p: u32, q: u32| (p as f64 - q as f64).abs() <= delta;
    close(a.x, b.x) && close(a.y, b.y) && close(a.right(), b.right()) && close(a.bottom(), b.bottom())
}

/// Splits `rects` into equivalence classes of similar rectangles.
///
/// Returns the class of every rectangle and the number of classes; classes
/// are numbered in order of first appearance.
fn partition(rects: &[BoundingBox], eps: f64) -> (Vec<usize>, usize) {
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut parent: Vec<usize> = (0..rects.len()).collect();
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if similar(&rects[i], &rects[j], eps) {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    parent[b] = a;
                }
            }
        }
    }

    let mut class_of_root = vec![None; rects.len()];
    let mut count = 0;
    let mut labels = Vec::with_capacity(rects.len());
    for i in 0..rects.len() {
        let root = find(&mut parent, i);
        let class = *class_of_root[root].get_or_insert_with(|| {
            count += 1;
            count - 1
        });
        labels.push(class);
    }
    (labels, count)
}

/// Clusters overlapping candidates and averages each cluster.
///
/// Clusters with `threshold` or fewer members are dropped, as are clusters
/// lying inside a stronger one. A zero threshold returns the input as is.
pub fn group_rectangles(rects: &[BoundingBox], threshold: u32, eps: f64) -> Vec<BoundingBox> {
    if threshold == 0 || rects.is_empty() {
        return rects.to_vec();
    }
    let (labels, count) = partition(rects, eps);

    let mut sums = vec![[0u64; 4]; count];
    let mut weights = vec![0u32; count];
    for (rect, &class) in rects.iter().zip(&labels) {
        let s = &mut sums[class];
        s[0] += rect.x as u64;
        s[1] += rect.y as u64;
        s[2] += rect.width as u64;
        s[3] += rect.height as u64;
        weights[class] += 1;
    }
    let averaged: Vec<BoundingBox> = sums
        .iter()
        .zip(&weights)
        .map(|(s, &n)| {
            let avg = |v: u64| (v as f64 / n as f64).round() as u32;
            BoundingBox::new(avg(s[0]), avg(s[1]), avg(s[2]), avg(s[3]))
        })
        .collect();

    let mut grouped = Vec::new();
    for (i, r1) in averaged.iter().enumerate() {
        let n1 = weights[i];
        if n1 <= threshold {
            continue;
        }
        let nested = averaged.iter().enumerate().any(|(j, r2)| {
            let n2 = weights[j];
            if j == i || n2 <= threshold {
                return false;
            }
            let dx = (r2.width as f64 * eps).round() as i64;
            let dy = (r2.height as f64 * eps).round() as i64;
            r1.x as i64 >= r2.x as i64 - dx
                && r1.y as i64 >= r2.y as i64 - dy
                && r1.right() as i64 <= r2.right() as i64 + dx
                && r1.bottom() as i64 <= r2.bottom() as i64 + dy
                && (n2 > n1.max(3) || n1 < 3)
        });
        if !nested {
            grouped.push(*r1);
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use rstest::rstest;

    /// One stage, one stump over a left-dark / right-bright edge feature.
    fn mini_cascade_xml(feature: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<opencv_storage>
<cascade type_id="opencv-cascade-classifier">
  <stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>6</height>
  <width>6</width>
  <stageParams>
    <maxWeakCount>1</maxWeakCount></stageParams>
  <featureParams>
    <maxCatCount>0</maxCatCount></featureParams>
  <stageNum>1</stageNum>
  <stages>
    <!-- stage 0 -->
    <_>
      <maxWeakCount>1</maxWeakCount>
      <stageThreshold>0.</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>
            0 -1 0 1.</internalNodes>
          <leafValues>
            -1. 1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    {feature}</features></cascade>
</opencv_storage>
"#
        )
    }

    const EDGE_FEATURE: &str = r#"<_>
      <rects>
        <_>
          0 0 6 6 -1.</_>
        <_>
          3 0 3 6 2.</_></rects></_>"#;

    fn edge_cascade() -> HaarCascade {
        HaarCascade::from_xml(&mini_cascade_xml(EDGE_FEATURE)).unwrap()
    }

    fn edge_image(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    fn params(scale_factor: f64, min_neighbors: u32) -> DetectParams {
        DetectParams {
            scale_factor,
            min_neighbors,
            min_size: (0, 0),
        }
    }

    #[test]
    fn test_parses_miniature_cascade() {
        let cascade = edge_cascade();
        assert_eq!(cascade.window_size(), (6, 6));
        assert_eq!(cascade.stage_count(), 1);
        assert_eq!(cascade.feature_count(), 1);
    }

    #[test]
    fn test_fires_on_matching_pattern() {
        let boxes = edge_cascade()
            .detect(&edge_image(12, 12), &params(3.0, 0))
            .unwrap();
        assert_eq!(
            boxes,
            vec![
                BoundingBox::new(4, 0, 6, 6),
                BoundingBox::new(4, 2, 6, 6),
                BoundingBox::new(4, 4, 6, 6),
            ]
        );
    }

    #[test]
    fn test_multi_scale_boxes_stay_inside_image() {
        let image = edge_image(48, 40);
        let boxes = edge_cascade().detect(&image, &params(1.2, 0)).unwrap();
        assert!(!boxes.is_empty());
        for b in boxes {
            assert!(b.right() <= 48 && b.bottom() <= 40);
        }
    }

    #[test]
    fn test_silent_on_flat_image() {
        let image = GrayImage::from_pixel(40, 40, Luma([128]));
        let boxes = edge_cascade().detect(&image, &params(1.1, 0)).unwrap();
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_image_smaller_than_window_yields_nothing() {
        let boxes = edge_cascade()
            .detect(&edge_image(5, 5), &params(1.1, 3))
            .unwrap();
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_min_size_skips_small_scales() {
        let boxes = edge_cascade()
            .detect(
                &edge_image(12, 12),
                &DetectParams {
                    scale_factor: 3.0,
                    min_neighbors: 0,
                    min_size: (7, 7),
                },
            )
            .unwrap();
        assert!(boxes.is_empty());
    }

    #[rstest]
    #[case(1.0)]
    #[case(0.5)]
    #[case(f64::NAN)]
    fn test_rejects_non_growing_scale_factor(#[case] scale_factor: f64) {
        let image = edge_image(12, 12);
        assert!(edge_cascade().detect(&image, &params(scale_factor, 3)).is_err());
    }

    #[test]
    fn test_rejects_tilted_feature() {
        let tilted = r#"<_>
      <rects>
        <_>
          0 0 3 3 -1.</_>
        <_>
          1 1 1 1 9.</_></rects>
      <tilted>1</tilted></_>"#;
        let err = HaarCascade::from_xml(&mini_cascade_xml(tilted)).unwrap_err();
        assert!(matches!(err, CascadeError::Unsupported(_)), "{err}");
    }

    #[test]
    fn test_rejects_legacy_format() {
        let legacy = r#"<?xml version="1.0"?>
<opencv_storage>
<haarcascade_frontalface_alt type_id="opencv-haar-classifier">
  <size>20 20</size>
</haarcascade_frontalface_alt>
</opencv_storage>"#;
        let err = HaarCascade::from_xml(legacy).unwrap_err();
        assert!(matches!(err, CascadeError::Unsupported(_)), "{err}");
    }

    #[test]
    fn test_rejects_rectangle_outside_window() {
        let wide = r#"<_>
      <rects>
        <_>
          0 0 7 6 -1.</_></rects></_>"#;
        let err = HaarCascade::from_xml(&mini_cascade_xml(wide)).unwrap_err();
        assert!(matches!(err, CascadeError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_rejects_missing_feature_reference() {
        let xml = mini_cascade_xml(EDGE_FEATURE).replace("0 -1 0 1.", "0 -1 4 1.");
        let err = HaarCascade::from_xml(&xml).unwrap_err();
        assert!(matches!(err, CascadeError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_rejects_child_outside_tree() {
        let xml = mini_cascade_xml(EDGE_FEATURE).replace("0 -1 0 1.", "1 -1 0 1.");
        let err = HaarCascade::from_xml(&xml).unwrap_err();
        assert!(matches!(err, CascadeError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_rejects_missing_leaf() {
        let xml = mini_cascade_xml(EDGE_FEATURE).replace("0 -1 0 1.", "0 -2 0 1.");
        assert!(HaarCascade::from_xml(&xml).is_err());
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = HaarCascade::from_file(Path::new("/nonexistent/cascade.xml")).unwrap_err();
        assert!(matches!(err, CascadeError::Io { .. }));
    }

    #[test]
    fn test_from_file_reads_cascade() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("edge.xml");
        fs::write(&path, mini_cascade_xml(EDGE_FEATURE)).unwrap();
        assert_eq!(HaarCascade::from_file(&path).unwrap().stage_count(), 1);
    }

    #[test]
    fn test_group_merges_near_duplicates() {
        let rects = [
            BoundingBox::new(10, 10, 20, 20),
            BoundingBox::new(11, 10, 20, 20),
            BoundingBox::new(10, 11, 20, 20),
        ];
        assert_eq!(
            group_rectangles(&rects, 2, GROUP_EPS),
            vec![BoundingBox::new(10, 10, 20, 20)]
        );
    }

    #[test]
    fn test_group_drops_clusters_at_threshold() {
        let rects = [
            BoundingBox::new(10, 10, 20, 20),
            BoundingBox::new(11, 10, 20, 20),
            BoundingBox::new(10, 11, 20, 20),
            BoundingBox::new(100, 100, 20, 20),
        ];
        assert!(group_rectangles(&rects, 3, GROUP_EPS).is_empty());
        assert_eq!(group_rectangles(&rects, 1, GROUP_EPS).len(), 1);
    }

    #[test]
    fn test_group_suppresses_nested_weak_cluster() {
        let mut rects = vec![BoundingBox::new(0, 0, 100, 100); 5];
        rects.extend([BoundingBox::new(30, 30, 20, 20); 2]);
        assert_eq!(
            group_rectangles(&rects, 1, GROUP_EPS),
            vec![BoundingBox::new(0, 0, 100, 100)]
        );
    }

    #[test]
    fn test_group_with_zero_threshold_is_identity() {
        let rects = [BoundingBox::new(1, 2, 3, 4)];
        assert_eq!(group_rectangles(&rects, 0, GROUP_EPS), rects.to_vec());
    }
}
