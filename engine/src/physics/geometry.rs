//! Collision geometry and face extraction
//!
//! Converts a polygon mesh (vertex buffer + triangle index buffer) into the
//! list of [`Face`]s a body collides with. Shapes are built once when an
//! object is registered and are immutable afterward; world-space copies are
//! produced per collision test into caller-provided scratch buffers so the
//! hot path does not allocate.

use glam::{Mat4, Vec3};
use tracing::debug;

use super::bounds::{Aabb, BoundingSphere};
use super::error::GeometryError;

/// One triangle of a collision shape.
///
/// The derived fields (midpoint, normal, plane offset) are computed once at
/// construction. The normal's sign is fixed by vertex order: counter-clockwise
/// winding viewed from outside gives an outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    /// Average of the three vertices
    pub midpoint: Vec3,
    /// Unit normal, or zero for a degenerate (collinear) triangle
    pub normal: Vec3,
    /// Plane offset: `normal · x = plane_offset` for points x on the face plane
    pub plane_offset: f32,
}

impl Face {
    /// Builds a face from three vertices, deriving midpoint, normal, and
    /// plane equation.
    ///
    /// A zero-area triangle yields a zero normal. Callers must tolerate or
    /// filter these; the SAT detector skips zero-length axes.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let midpoint = (a + b + c) / 3.0;
        let normal = (b - c).cross(a - c).normalize_or_zero();
        let plane_offset = normal.dot(a);
        Self {
            a,
            b,
            c,
            midpoint,
            normal,
            plane_offset,
        }
    }

    /// Returns a world-space copy of this face, re-deriving the normal and
    /// plane from the transformed vertices.
    ///
    /// Re-derivation (rather than rotating the stored normal) keeps normals
    /// correct under non-uniform scale in the world matrix.
    pub fn transformed(&self, world: &Mat4) -> Face {
        Face::new(
            world.transform_point3(self.a),
            world.transform_point3(self.b),
            world.transform_point3(self.c),
        )
    }

    /// True if the triangle has (near) zero area.
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::ZERO
    }
}

/// An immutable collision shape: local-space faces plus cached bounds.
///
/// Owned by exactly one body (or shared read-only); never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct Shape {
    faces: Vec<Face>,
    local_bounds: Aabb,
    local_sphere: BoundingSphere,
}

impl Shape {
    /// Builds a shape from a vertex buffer and an optional triangle index
    /// buffer.
    ///
    /// Without indices, vertices are consumed as implicit sequential triples.
    ///
    /// # Errors
    ///
    /// * [`GeometryError::EmptyGeometry`] - empty vertex buffer
    /// * [`GeometryError::IndexCountNotTriangles`] - index (or implicit
    ///   vertex) count not a multiple of 3
    /// * [`GeometryError::IndexOutOfRange`] - an index references a missing
    ///   vertex
    pub fn build(vertices: &[Vec3], indices: Option<&[u32]>) -> Result<Self, GeometryError> {
        if vertices.is_empty() {
            return Err(GeometryError::EmptyGeometry);
        }

        let mut faces = Vec::new();
        match indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(GeometryError::IndexCountNotTriangles(indices.len()));
                }
                for tri in indices.chunks_exact(3) {
                    for &index in tri {
                        if index as usize >= vertices.len() {
                            return Err(GeometryError::IndexOutOfRange {
                                index,
                                vertex_count: vertices.len(),
                            });
                        }
                    }
                    faces.push(Face::new(
                        vertices[tri[0] as usize],
                        vertices[tri[1] as usize],
                        vertices[tri[2] as usize],
                    ));
                }
            }
            None => {
                if vertices.len() % 3 != 0 {
                    return Err(GeometryError::IndexCountNotTriangles(vertices.len()));
                }
                for tri in vertices.chunks_exact(3) {
                    faces.push(Face::new(tri[0], tri[1], tri[2]));
                }
            }
        }

        let degenerate = faces.iter().filter(|f| f.is_degenerate()).count();
        if degenerate > 0 {
            debug!(
                degenerate,
                total = faces.len(),
                "shape built with zero-area triangles; they contribute no SAT axes"
            );
        }

        let local_bounds = Aabb::from_points(vertices);
        let local_sphere = BoundingSphere::from_points(vertices);

        Ok(Self {
            faces,
            local_bounds,
            local_sphere,
        })
    }

    /// Builds an axis-aligned box shape with the given half extents,
    /// triangulated with outward-facing windings.
    ///
    /// Convenience for props and test bodies; equivalent to calling
    /// [`Shape::build`] with a 12-triangle box mesh.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let v = [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        // Two triangles per box face, counter-clockwise from outside
        let indices: [u32; 36] = [
            0, 2, 1, 0, 3, 2, // -Z
            4, 5, 6, 4, 6, 7, // +Z
            0, 7, 3, 0, 4, 7, // -X
            1, 2, 6, 1, 6, 5, // +X
            0, 1, 5, 0, 5, 4, // -Y
            3, 6, 2, 3, 7, 6, // +Y
        ];
        Self::build(&v, Some(&indices)).expect("box mesh is always valid")
    }

    /// Local-space faces in construction order.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Cached local-space bounding box.
    pub fn local_bounds(&self) -> &Aabb {
        &self.local_bounds
    }

    /// Cached local-space bounding sphere.
    pub fn local_sphere(&self) -> &BoundingSphere {
        &self.local_sphere
    }

    /// Fills `out` with world-space copies of all faces.
    ///
    /// `out` is cleared first; reuse the same buffer across calls to avoid
    /// per-test allocation.
    pub fn faces_into(&self, world: &Mat4, out: &mut Vec<Face>) {
        out.clear();
        out.extend(self.faces.iter().map(|f| f.transformed(world)));
    }

    /// Fills `out` with the world-space corner vertices of all faces.
    ///
    /// Vertices shared between triangles appear once per referencing face;
    /// duplicates do not affect interval projection.
    pub fn vertices_into(&self, world: &Mat4, out: &mut Vec<Vec3>) {
        out.clear();
        for f in &self.faces {
            out.push(world.transform_point3(f.a));
            out.push(world.transform_point3(f.b));
            out.push(world.transform_point3(f.c));
        }
    }

    /// Fills `out` with world-space face normals, skipping degenerate faces.
    pub fn normals_into(&self, world: &Mat4, out: &mut Vec<Vec3>) {
        out.clear();
        self.normals_append(world, out);
    }

    /// Appends world-space face normals to `out` without clearing it,
    /// skipping degenerate faces. Used to pool candidate axes from several
    /// shapes into one buffer.
    pub fn normals_append(&self, world: &Mat4, out: &mut Vec<Vec3>) {
        for f in &self.faces {
            let n = f.transformed(world).normal;
            if n != Vec3::ZERO {
                out.push(n);
            }
        }
    }

    /// Allocating variant of [`Shape::faces_into`].
    pub fn world_faces(&self, world: &Mat4) -> Vec<Face> {
        let mut out = Vec::with_capacity(self.faces.len());
        self.faces_into(world, &mut out);
        out
    }

    /// World-space bounding box: the local box's eight corners transformed
    /// and re-boxed. Conservative under rotation.
    pub fn world_bounds(&self, world: &Mat4) -> Aabb {
        let min = self.local_bounds.min;
        let max = self.local_bounds.max;
        let corners = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ];
        let transformed: Vec<Vec3> = corners.iter().map(|c| world.transform_point3(*c)).collect();
        Aabb::from_points(&transformed)
    }
}
