//! The renderable projection of particle state

use bytemuck::{Pod, Zeroable};
use ember_core::{Color, Vec3};

/// One renderable point per pool slot. Inactive slots stay all-zero, so a
/// frontend may draw the whole array unconditionally; zero-alpha points
/// contribute nothing.
///
/// `#[repr(C)]`, 28 bytes, tightly packed; safe to upload as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

/// The immutable snapshot handed to a renderer once per publish call.
///
/// Borrowing rules make this self-consistent by construction: a `Frame`
/// cannot coexist with the `&mut` borrow a tick takes on the same engine.
pub struct Frame<'a> {
    pub vertex_count: usize,
    pub vertices: &'a [Vertex],
    /// Side length in pixels of the point sprite for every particle
    pub point_size: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 28);
        assert_eq!(std::mem::align_of::<Vertex>(), 4);
    }

    #[test]
    fn zeroed_vertex_is_default() {
        let z: Vertex = Zeroable::zeroed();
        assert_eq!(z, Vertex::default());
    }
}
