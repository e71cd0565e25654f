//! SVG import: turn a document into stitchable vector paths.
//!
//! Uses usvg for complete SVG resolution (CSS, transforms, basic shapes),
//! then walks the tree and flattens every subpath with lyon_geom.
//!
//! ## Curve Flattening
//!
//! SVG paths contain Bézier curves (cubic and quadratic). The stitch
//! generators only understand polylines, so curves are flattened into line
//! segments within `tolerance` user units.

use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment, point};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use usvg::tiny_skia_path::PathSegment;

use crate::error::{ImportError, ImportResult};
use crate::geometry::{Point, dedup_points};
use crate::pattern::Color;

/// How SVG user units map onto millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgImportOptions {
    /// Millimeters per SVG user unit.
    pub scale: f64,
    /// Curve flattening tolerance in user units.
    pub tolerance: f32,
}

impl Default for SvgImportOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            tolerance: 0.1,
        }
    }
}

impl SvgImportOptions {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// One flattened subpath with its resolved paint.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorPath {
    /// Points in millimeters. Closed paths do not repeat the first point.
    pub points: Vec<Point>,
    pub closed: bool,
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    /// Stroke width in millimeters (zero without a stroke).
    pub stroke_width: f64,
    pub id: Option<String>,
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    /// Canvas size in millimeters.
    pub width: f64,
    pub height: f64,
    pub paths: Vec<VectorPath>,
}

/// Parse SVG text into flattened paths.
pub fn import_svg(content: &str, options: &SvgImportOptions) -> ImportResult<SvgDocument> {
    let tree = usvg::Tree::from_str(content, &usvg::Options::default())
        .map_err(|e| ImportError::Parse(e.to_string()))?;

    let mut paths = Vec::new();
    collect_group(tree.root(), options, &mut paths);

    if paths.is_empty() {
        return Err(ImportError::NoPaths);
    }

    let size = tree.size();
    debug!(paths = paths.len(), "imported SVG");
    Ok(SvgDocument {
        width: size.width() as f64 * options.scale,
        height: size.height() as f64 * options.scale,
        paths,
    })
}

fn collect_group(group: &usvg::Group, options: &SvgImportOptions, out: &mut Vec<VectorPath>) {
    for child in group.children() {
        match child {
            usvg::Node::Group(g) => collect_group(g, options, out),
            usvg::Node::Path(path) => collect_path(path, options, out),
            usvg::Node::Image(img) => warn!(id = img.id(), "skipping image element"),
            usvg::Node::Text(text) => warn!(id = text.id(), "skipping text element"),
        }
    }
}

/// Solid paint as a thread color; other paints are skipped.
fn paint_color(paint: &usvg::Paint, id: &str) -> Option<Color> {
    match paint {
        usvg::Paint::Color(c) => Some(Color::new(c.red, c.green, c.blue)),
        _ => {
            warn!(id, "skipping non-solid paint");
            None
        }
    }
}

fn collect_path(path: &usvg::Path, options: &SvgImportOptions, out: &mut Vec<VectorPath>) {
    if !path.is_visible() {
        return;
    }

    let id = path.id();
    let stroke = path.stroke().and_then(|s| paint_color(s.paint(), id));
    let fill = path.fill().and_then(|f| paint_color(f.paint(), id));
    if stroke.is_none() && fill.is_none() {
        return;
    }

    let transform = path.abs_transform();
    let to_mm = |x: f32, y: f32| -> Point {
        let (x, y) = (x as f64, y as f64);
        let tx = transform.sx as f64 * x + transform.kx as f64 * y + transform.tx as f64;
        let ty = transform.ky as f64 * x + transform.sy as f64 * y + transform.ty as f64;
        Point::new(tx * options.scale, ty * options.scale)
    };
    // Uniform part of the transform, for the stroke width.
    let transform_scale = ((transform.sx * transform.sy - transform.kx * transform.ky).abs() as f64).sqrt();
    let stroke_width = path
        .stroke()
        .map(|s| s.width().get() as f64 * transform_scale * options.scale)
        .unwrap_or(0.0);

    let mut emit = |points: Vec<Point>, closed: bool| {
        let mut points = dedup_points(&points);
        if closed && points.len() > 1 && points[0].distance(points[points.len() - 1]) < 1e-9 {
            points.pop();
        }
        if points.len() < 2 {
            return;
        }
        out.push(VectorPath {
            points,
            closed,
            stroke,
            fill,
            stroke_width,
            id: (!id.is_empty()).then(|| id.to_string()),
        });
    };

    let mut points: Vec<Point> = Vec::new();
    let mut last: Option<(f32, f32)> = None;
    let mut start: Option<(f32, f32)> = None;

    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                // Each MoveTo starts a new subpath.
                if !points.is_empty() {
                    emit(std::mem::take(&mut points), false);
                }
                points.push(to_mm(p.x, p.y));
                last = Some((p.x, p.y));
                start = Some((p.x, p.y));
            }
            PathSegment::LineTo(p) => {
                points.push(to_mm(p.x, p.y));
                last = Some((p.x, p.y));
            }
            PathSegment::QuadTo(ctrl, p) => {
                if let Some((lx, ly)) = last {
                    let curve = QuadraticBezierSegment {
                        from: point(lx, ly),
                        ctrl: point(ctrl.x, ctrl.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(options.tolerance, &mut |seg| {
                        points.push(to_mm(seg.to.x, seg.to.y));
                    });
                } else {
                    points.push(to_mm(p.x, p.y));
                }
                last = Some((p.x, p.y));
            }
            PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                if let Some((lx, ly)) = last {
                    let curve = CubicBezierSegment {
                        from: point(lx, ly),
                        ctrl1: point(ctrl1.x, ctrl1.y),
                        ctrl2: point(ctrl2.x, ctrl2.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(options.tolerance, &mut |seg| {
                        points.push(to_mm(seg.to.x, seg.to.y));
                    });
                } else {
                    points.push(to_mm(p.x, p.y));
                }
                last = Some((p.x, p.y));
            }
            PathSegment::Close => {
                emit(std::mem::take(&mut points), true);
                last = start;
            }
        }
    }

    if !points.is_empty() {
        emit(points, false);
    }
}

// ============================================================================
// TESTS
// ============================================================================
