//! Debug-draw export of collision bounds.
//!
//! Produces line-list vertices in a `#[repr(C)]` layout that can be uploaded
//! to a GPU vertex buffer as-is with `bytemuck::cast_slice`.

use bytemuck::{Pod, Zeroable};

use crate::aabb::Aabb;

/// Line vertex with position and RGBA color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl DebugVertex {
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Vertices per box: 12 edges, 2 vertices each.
pub const AABB_WIREFRAME_VERTICES: usize = 24;

// Corner indices follow `Aabb::corners` (bit 0 = x, bit 1 = y, bit 2 = z).
const EDGES: [(usize, usize); 12] = [
    // Bottom face
    (0, 1),
    (1, 3),
    (3, 2),
    (2, 0),
    // Top face
    (4, 5),
    (5, 7),
    (7, 6),
    (6, 4),
    // Vertical edges
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Append the 12 edges of `aabb` as a line list. Empty boxes add nothing.
pub fn push_aabb_wireframe(out: &mut Vec<DebugVertex>, aabb: &Aabb, color: [f32; 4]) {
    if aabb.is_empty() {
        return;
    }
    let corners = aabb.corners();
    out.reserve(AABB_WIREFRAME_VERTICES);
    for (i, j) in EDGES {
        out.push(DebugVertex::new(corners[i].to_array(), color));
        out.push(DebugVertex::new(corners[j].to_array(), color));
    }
}

pub fn aabb_wireframe(aabb: &Aabb, color: [f32; 4]) -> Vec<DebugVertex> {
    let mut out = Vec::with_capacity(AABB_WIREFRAME_VERTICES);
    push_aabb_wireframe(&mut out, aabb, color);
    out
}
