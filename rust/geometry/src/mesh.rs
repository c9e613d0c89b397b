// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::Point3;

use crate::error::{Error, Result};

/// A surface vertex in project coordinates, z depth-signed per importer convention
pub type Vertex = Point3<f64>;

/// Sentinel stored in a per-vertex property when the source had no value
pub const MISSING_PROPERTY_VALUE: f32 = f32::INFINITY;

/// A named per-vertex scalar array
#[derive(Debug, Clone, PartialEq)]
pub struct VertexProperty {
    /// Property name as declared by the source file
    pub name: String,
    /// One value per mesh vertex
    pub values: Vec<f32>,
}

/// Triangle mesh produced by a surface import.
///
/// Immutable once built; consumers that need a different surface build a
/// new mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<Vertex>,
    triangle_indices: Vec<u32>,
    properties: Vec<VertexProperty>,
}

impl TriangleMesh {
    /// Create a mesh from vertices and flat triangle index triples.
    ///
    /// Fails if the index count is not a multiple of 3.
    pub fn new(vertices: Vec<Vertex>, triangle_indices: Vec<u32>) -> Result<Self> {
        if triangle_indices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "triangle index count {} is not a multiple of 3",
                triangle_indices.len()
            )));
        }
        Ok(Self {
            vertices,
            triangle_indices,
            properties: Vec::new(),
        })
    }

    /// Create an empty mesh
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach a per-vertex property.
    ///
    /// An empty value array is allowed; otherwise it must hold exactly one
    /// value per vertex. Names are unique and keep their insertion order.
    pub fn with_property(mut self, name: impl Into<String>, values: Vec<f32>) -> Result<Self> {
        let name = name.into();
        if !values.is_empty() && values.len() != self.vertices.len() {
            return Err(Error::InvalidMesh(format!(
                "property '{}' has {} values for {} vertices",
                name,
                values.len(),
                self.vertices.len()
            )));
        }
        if self.properties.iter().any(|p| p.name == name) {
            return Err(Error::InvalidMesh(format!("duplicate property '{}'", name)));
        }
        self.properties.push(VertexProperty { name, values });
        Ok(self)
    }

    /// Vertex positions; the index is the vertex id used by triangles
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Flat triangle index list (a, b, c, a, b, c, ...)
    #[inline]
    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangle_indices
    }

    /// Iterate over triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.triangle_indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
    }

    /// Property names in declaration order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Values of a named property
    pub fn property_values(&self, name: &str) -> Option<&[f32]> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.values.as_slice())
    }

    /// All properties in declaration order
    #[inline]
    pub fn properties(&self) -> &[VertexProperty] {
        &self.properties
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }

    /// Check if mesh has no vertices
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check that every triangle index references an existing vertex.
    ///
    /// Malformed input can produce out-of-range indices; renderers call this
    /// before uploading index buffers.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len();
        self.triangle_indices.iter().all(|&i| (i as usize) < count)
    }

    /// Calculate bounds (min, max), or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for v in &self.vertices[1..] {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }
        Some((min, max))
    }

    /// Split into vertices, triangle indices and properties
    pub fn into_parts(self) -> (Vec<Vertex>, Vec<u32>, Vec<VertexProperty>) {
        (self.vertices, self.triangle_indices, self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, -2.0),
                Vertex::new(0.0, 1.0, 0.5),
            ],
            vec![0, 1, 2],
        )
        .unwrap()
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = TriangleMesh::empty();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.bounds().is_none());
    }

    #[test]
    fn test_rejects_partial_triangle() {
        let result = TriangleMesh::new(vec![Vertex::origin()], vec![0, 0]);
        assert!(matches!(result, Err(Error::InvalidMesh(_))));
    }

    #[test]
    fn test_properties_keep_order_and_length() {
        let mesh = unit_triangle()
            .with_property("zeta", vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_property("alpha", Vec::new())
            .unwrap();
        let names: Vec<_> = mesh.property_names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(mesh.property_values("zeta"), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(mesh.property_values("alpha"), Some(&[][..]));
        assert_eq!(mesh.property_values("missing"), None);

        assert!(unit_triangle().with_property("short", vec![1.0]).is_err());
        assert!(mesh.with_property("zeta", Vec::new()).is_err());
    }

    #[test]
    fn test_bounds_and_triangles() {
        let mesh = unit_triangle();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, -2.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.5));
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn test_out_of_range_indices_detected() {
        let mesh = TriangleMesh::new(vec![Vertex::origin()], vec![0, 0, 5]).unwrap();
        assert!(!mesh.indices_in_bounds());
        assert_eq!(mesh.triangle_count(), 1);
    }
}
