//! Jittered-grid Voronoi partition of the world rectangle
//!
//! One site is placed per grid cell, jittered inside the cell's inner 80%.
//! Each site's polygon is the world rectangle clipped by the perpendicular
//! bisectors of the sites in the surrounding 5x5 block of cells, which is
//! enough to contain every Voronoi neighbor at that jitter bound. Every
//! resulting edge remembers which bisector (neighbor) produced it.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{ProvinceId, Vec2};
use crate::province::province::PolygonEdge;

/// Edges shorter than this (map units) are merged away
const MIN_EDGE_LENGTH: f32 = 1e-3;

/// Neighbor search radius in grid cells
const SEARCH_RADIUS: i64 = 2;

/// Fraction of a cell the site may wander inside
const JITTER: f32 = 0.8;

/// Grid the sites are jittered on; also used for point location
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub width: f32,
    pub height: f32,
}

impl GridLayout {
    /// Choose a grid whose cells are roughly square and whose cell count is
    /// close to `polygon_count`
    pub fn for_count(polygon_count: u32, width: f32, height: f32) -> Self {
        let aspect = width / height;
        let columns = ((polygon_count as f32 * aspect).sqrt().round() as u32).max(2);
        let rows = ((polygon_count as f32 / columns as f32).round() as u32).max(2);
        Self {
            columns,
            rows,
            width,
            height,
        }
    }

    pub fn len(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_width(&self) -> f32 {
        self.width / self.columns as f32
    }

    pub fn cell_height(&self) -> f32 {
        self.height / self.rows as f32
    }

    pub fn index(&self, column: u32, row: u32) -> usize {
        (row * self.columns + column) as usize
    }

    /// Grid cell containing `point`, clamped to the grid
    pub fn cell_of(&self, point: Vec2) -> (u32, u32) {
        let column = (point.x / self.cell_width()).floor().clamp(0.0, (self.columns - 1) as f32);
        let row = (point.y / self.cell_height()).floor().clamp(0.0, (self.rows - 1) as f32);
        (column as u32, row as u32)
    }

    /// Indices of every cell within `SEARCH_RADIUS` of (column, row), excluding itself
    pub fn nearby(&self, column: u32, row: u32) -> Vec<usize> {
        let mut cells = Vec::with_capacity(24);
        for dr in -SEARCH_RADIUS..=SEARCH_RADIUS {
            for dc in -SEARCH_RADIUS..=SEARCH_RADIUS {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let c = column as i64 + dc;
                let r = row as i64 + dr;
                if c >= 0 && c < self.columns as i64 && r >= 0 && r < self.rows as i64 {
                    cells.push(self.index(c as u32, r as u32));
                }
            }
        }
        cells
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Raw output of the partition, before provinces are built
#[derive(Clone, Debug)]
pub struct PartitionCell {
    pub site: Vec2,
    pub edges: Vec<PolygonEdge>,
}

/// Polygon under construction: each vertex carries the label of the edge
/// leaving it
type LabeledPolygon = Vec<(Vec2, Option<ProvinceId>)>;

/// Partition the layout's rectangle into one convex cell per grid cell
pub fn generate_partition(layout: &GridLayout, rng: &mut ChaCha8Rng) -> Vec<PartitionCell> {
    let cw = layout.cell_width();
    let ch = layout.cell_height();
    let margin = (1.0 - JITTER) * 0.5;

    let mut sites = Vec::with_capacity(layout.len());
    for row in 0..layout.rows {
        for column in 0..layout.columns {
            let x = (column as f32 + margin + JITTER * rng.gen::<f32>()) * cw;
            let y = (row as f32 + margin + JITTER * rng.gen::<f32>()) * ch;
            sites.push(Vec2::new(x, y));
        }
    }

    let mut cells = Vec::with_capacity(sites.len());
    for row in 0..layout.rows {
        for column in 0..layout.columns {
            let index = layout.index(column, row);
            let site = sites[index];

            let mut candidates = layout.nearby(column, row);
            candidates.sort_by(|&a, &b| {
                site.distance(&sites[a])
                    .total_cmp(&site.distance(&sites[b]))
                    .then(a.cmp(&b))
            });

            let mut polygon: LabeledPolygon = vec![
                (Vec2::new(0.0, 0.0), None),
                (Vec2::new(layout.width, 0.0), None),
                (Vec2::new(layout.width, layout.height), None),
                (Vec2::new(0.0, layout.height), None),
            ];

            for other in candidates {
                polygon = clip_by_bisector(&polygon, site, sites[other], ProvinceId(other as u32));
                if polygon.is_empty() {
                    break;
                }
            }

            cells.push(PartitionCell {
                site,
                edges: to_edges(&merge_short_edges(polygon)),
            });
        }
    }

    cells
}

/// Keep the half of `polygon` closer to `site` than to `other`
fn clip_by_bisector(
    polygon: &LabeledPolygon,
    site: Vec2,
    other: Vec2,
    label: ProvinceId,
) -> LabeledPolygon {
    let midpoint = site.lerp(&other, 0.5);
    let normal = other - site;
    let side = |p: Vec2| (p - midpoint).dot(&normal);

    let mut out = Vec::with_capacity(polygon.len() + 1);
    for k in 0..polygon.len() {
        let (a, a_label) = polygon[k];
        let (b, _) = polygon[(k + 1) % polygon.len()];
        let da = side(a);
        let db = side(b);
        let a_in = da <= 0.0;
        let b_in = db <= 0.0;

        match (a_in, b_in) {
            (true, true) => out.push((a, a_label)),
            (true, false) => {
                out.push((a, a_label));
                out.push((a.lerp(&b, da / (da - db)), Some(label)));
            }
            (false, true) => {
                out.push((a.lerp(&b, da / (da - db)), a_label));
            }
            (false, false) => {}
        }
    }
    out
}

/// Drop vertices whose outgoing edge is shorter than `MIN_EDGE_LENGTH`
fn merge_short_edges(polygon: LabeledPolygon) -> LabeledPolygon {
    if polygon.len() < 3 {
        return polygon;
    }

    let mut out: LabeledPolygon = Vec::with_capacity(polygon.len());
    for k in 0..polygon.len() {
        let (a, label) = polygon[k];
        let (b, _) = polygon[(k + 1) % polygon.len()];
        if a.distance(&b) >= MIN_EDGE_LENGTH {
            out.push((a, label));
        }
    }
    out
}

fn to_edges(polygon: &LabeledPolygon) -> Vec<PolygonEdge> {
    (0..polygon.len())
        .map(|k| {
            let (start, neighbor) = polygon[k];
            let (end, _) = polygon[(k + 1) % polygon.len()];
            PolygonEdge {
                start,
                end,
                neighbor,
            }
        })
        .collect()
}
