use std::collections::HashSet;

use crate::models::entry::{Entry, EntryId};

/// Ring 0 starts at 12 o'clock; angles increase clockwise and live in
/// `[-90, 270)` degrees.
pub const START_ANGLE_DEG: f64 = -90.0;
pub const FULL_CIRCLE_DEG: f64 = 360.0;
/// Matches the ten-color wheel the renderer cycles through.
pub const PALETTE_SIZE: usize = 10;
/// Parents with an arc this thin are not subdivided further.
pub const MIN_ARC_DEG: f64 = 0.05;
pub const OPACITY_FALLOFF: f64 = 0.12;
pub const MIN_OPACITY: f64 = 0.35;

/// One node's angular wedge within a ring. Ephemeral: recomputed on every
/// layout-affecting state change, never persisted.
#[derive(Debug, Clone)]
pub struct Slice<'a> {
    pub entry: &'a Entry,
    pub ring: usize,
    pub start_deg: f64,
    /// Half-open: the slice covers `[start_deg, end_deg)`.
    pub end_deg: f64,
    pub color_index: usize,
    /// Fades with depth, floored at `MIN_OPACITY`.
    pub opacity: f64,
}

pub type Ring<'a> = Vec<Slice<'a>>;

/// Turns the focused node plus the user's expansion set into ring geometry.
///
/// Ring 0 spans the full circle across the focus's children; each deeper ring
/// subdivides the arc a parent slice already occupies among that parent's own
/// children. Rings with index below `base_depth` are built eagerly; past
/// that, a parent only expands if its id is in `expanded`. Pure and
/// deterministic: the same inputs always produce identical geometry.
pub fn build_rings<'a>(
    focus: &'a Entry,
    expanded: &HashSet<EntryId>,
    base_depth: usize,
    max_rings: usize,
) -> Vec<Ring<'a>> {
    let mut rings: Vec<Ring<'a>> = Vec::new();
    if max_rings == 0 {
        return rings;
    }

    let first = subdivide(focus, START_ANGLE_DEG, FULL_CIRCLE_DEG, 0, None);
    if first.is_empty() {
        return rings;
    }
    rings.push(first);

    while rings.len() < max_rings {
        let ring = rings.len();
        let mut next: Ring<'a> = Vec::new();
        for slice in rings.last().unwrap() {
            let span = slice.end_deg - slice.start_deg;
            if span <= MIN_ARC_DEG {
                continue;
            }
            if slice.entry.children.is_empty() {
                continue;
            }
            if ring >= base_depth && !expanded.contains(&slice.entry.id) {
                continue;
            }
            next.extend(subdivide(
                slice.entry,
                slice.start_deg,
                span,
                ring,
                Some(slice.color_index),
            ));
        }
        if next.is_empty() {
            break;
        }
        rings.push(next);
    }

    rings
}

/// Splits a parent's arc among its children proportionally to size, walking
/// them in stored (size-descending) order from the parent's start angle.
/// A zero children total produces no slices, leaving an angular gap.
fn subdivide<'a>(
    parent: &'a Entry,
    start_deg: f64,
    span_deg: f64,
    ring: usize,
    parent_color: Option<usize>,
) -> Ring<'a> {
    let total: u64 = parent.children.iter().map(|c| c.size_bytes).sum();
    if total == 0 {
        return Vec::new();
    }

    // Hue stagger: children inherit (parent color + 1), so equal sibling
    // indices under different parents don't visually merge.
    let offset = parent_color.map(|c| (c + 1) % PALETTE_SIZE).unwrap_or(0);
    let opacity = (1.0 - ring as f64 * OPACITY_FALLOFF).max(MIN_OPACITY);

    let mut slices = Vec::with_capacity(parent.children.len());
    let mut angle = start_deg;
    for (i, child) in parent.children.iter().enumerate() {
        let width = span_deg * child.size_bytes as f64 / total as f64;
        slices.push(Slice {
            entry: child,
            ring,
            start_deg: angle,
            end_deg: angle + width,
            color_index: (i + offset) % PALETTE_SIZE,
            opacity,
        });
        angle += width;
    }
    slices
}
