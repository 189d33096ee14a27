//! Adaptive rasterization of segments into a [`HeightField`].
//!
//! A segment is bisected in its planar projection until both axis deltas, measured in
//! cells, fall below one half. Each resulting piece writes its midpoint height into the
//! midpoint's cell using MIN-reduction, so overlapping routes keep the shortest travel
//! time regardless of the order in which they are rasterized.
use glam::DVec3;

use crate::chain::Chain;
use crate::error::{Error, Result};
use crate::heightfield::{HeightField, WriterId};

/// Deepest bisection level a single segment may require.
pub const MAX_SUBDIVISION_DEPTH: u32 = 24;

const LEAF_SPAN: f64 = 0.5;

#[inline]
fn cell_of(p: DVec3, scale: f64) -> (i64, i64) {
    ((p.x / scale).round() as i64, (p.y / scale).round() as i64)
}

fn check_scale(scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::DegenerateInput(format!(
            "raster scale {scale} must be finite and > 0"
        )));
    }
    Ok(())
}

/// Bisection depth needed before a span of `cells` drops below the leaf span.
fn required_depth(cells: f64) -> Result<u32> {
    let mut span = cells;
    let mut depth = 0;
    while span >= LEAF_SPAN {
        span *= 0.5;
        depth += 1;
        if depth > MAX_SUBDIVISION_DEPTH {
            return Err(Error::DegenerateInput(format!(
                "segment spanning {cells} cells exceeds subdivision depth {MAX_SUBDIVISION_DEPTH}"
            )));
        }
    }
    Ok(depth)
}

/// Rasterize the segment `p1`..`p2` with MIN-reduction. Returns the number of leaf
/// writes that changed the field.
///
/// Non-finite input, identical endpoints and segments needing more than
/// [`MAX_SUBDIVISION_DEPTH`] bisections are rejected before anything is written.
pub fn rasterize(
    field: &mut HeightField,
    p1: DVec3,
    p2: DVec3,
    scale: f64,
    writer: WriterId,
) -> Result<usize> {
    check_scale(scale)?;
    if !p1.is_finite() || !p2.is_finite() {
        return Err(Error::DegenerateInput(format!(
            "segment {p1}..{p2} is not finite"
        )));
    }
    if p1 == p2 {
        return Err(Error::DegenerateInput(format!(
            "segment {p1}..{p2} has zero length"
        )));
    }

    let delta = (p2 - p1).abs() / scale;
    required_depth(delta.x.max(delta.y))?;

    let mut changed = 0;
    let mut stack: Vec<(DVec3, DVec3)> = vec![(p1, p2)];
    while let Some((a, b)) = stack.pop() {
        let d = (b - a).abs() / scale;
        if d.x < LEAF_SPAN && d.y < LEAF_SPAN {
            let mid = (a + b) * 0.5;
            let (ix, iy) = cell_of(mid, scale);
            if field.write_min(ix, iy, mid.z, writer) {
                changed += 1;
            }
            continue;
        }
        let mid = (a + b) * 0.5;
        stack.push((mid, b));
        stack.push((a, mid));
    }

    Ok(changed)
}

/// Rasterize every segment of a chain. Repeated consecutive points are skipped; a
/// single-point chain writes its own cell.
pub fn rasterize_chain(
    field: &mut HeightField,
    chain: &Chain,
    scale: f64,
    writer: WriterId,
) -> Result<usize> {
    check_scale(scale)?;
    if chain.len() == 1 {
        let p = chain.first();
        let (ix, iy) = cell_of(p, scale);
        return Ok(usize::from(field.write_min(ix, iy, p.z, writer)));
    }

    let mut changed = 0;
    for (a, b) in chain.segments().filter(|(a, b)| a != b) {
        changed += rasterize(field, a, b, scale, writer)?;
    }
    Ok(changed)
}

/// Rasterize chains into a fresh field, using each chain's index as its writer id.
pub fn rasterize_chains(chains: &[Chain], scale: f64) -> Result<HeightField> {
    let mut field = HeightField::new();
    for (i, chain) in chains.iter().enumerate() {
        rasterize_chain(&mut field, chain, scale, WriterId(i as u32))?;
    }
    Ok(field)
}
