use crate::math::Vec3;

/// A vertex with position, normal, and UV
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    /// Zero until the owning mesh recalculates normals
    pub normal: Vec3,
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            uv: [0.0, 0.0],
        }
    }

    pub fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.uv = [u, v];
        self
    }

    /// Flat layout for an interleaved buffer:
    /// position(3) + normal(3) + uv(2) = 8 floats
    pub fn to_array(&self) -> [f32; 8] {
        [
            self.position.x, self.position.y, self.position.z,
            self.normal.x, self.normal.y, self.normal.z,
            self.uv[0], self.uv[1],
        ]
    }
}

/// A mesh composed of vertices and triangle indices
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Bounding sphere, valid after `calculate_bounds`
    pub bounds_center: Vec3,
    pub bounds_radius: f32,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add vertices and return the starting index
    pub fn add_vertices(&mut self, verts: impl IntoIterator<Item = Vertex>) -> u32 {
        let start = self.vertices.len() as u32;
        self.vertices.extend(verts);
        start
    }

    /// Add a triangle (indices are relative to this mesh's vertex buffer)
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.push(a);
        self.indices.push(b);
        self.indices.push(c);
    }

    /// Merge another mesh into this one, re-indexing its triangles
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices.iter().cloned());
        for idx in &other.indices {
            self.indices.push(idx + offset);
        }
    }

    /// Calculate bounding sphere
    pub fn calculate_bounds(&mut self) {
        if self.vertices.is_empty() {
            self.bounds_center = Vec3::ZERO;
            self.bounds_radius = 0.0;
            return;
        }

        let mut center = Vec3::ZERO;
        for v in &self.vertices {
            center = center + v.position;
        }
        center = center.scale(1.0 / self.vertices.len() as f32);

        let mut max_dist = 0.0f32;
        for v in &self.vertices {
            max_dist = max_dist.max(v.position.distance(&center));
        }

        self.bounds_center = center;
        self.bounds_radius = max_dist;
    }

    /// Recompute vertex normals from triangle faces, area-weighted
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = Vec3::ZERO;
        }

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let pa = self.vertices[a].position;
            let pb = self.vertices[b].position;
            let pc = self.vertices[c].position;
            let face = (pb - pa).cross(&(pc - pa));

            self.vertices[a].normal = self.vertices[a].normal + face;
            self.vertices[b].normal = self.vertices[b].normal + face;
            self.vertices[c].normal = self.vertices[c].normal + face;
        }

        for v in &mut self.vertices {
            v.normal = v.normal.normalize();
        }
    }

    /// Interleaved vertex buffer as a flat f32 array
    pub fn vertex_data(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.to_array())
            .collect()
    }

    /// Vertex positions only, flat
    pub fn position_data(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.position.to_array())
            .collect()
    }

    /// UV coordinates only, flat
    pub fn uv_data(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.uv)
            .collect()
    }

    /// Triangle index list
    pub fn index_data(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_to_array() {
        let mut v = Vertex::new(Vec3::new(1.0, 2.0, 3.0)).with_uv(0.5, 0.25);
        v.normal = Vec3::UP;

        let arr = v.to_array();
        assert_eq!(arr.len(), 8);
        assert_eq!(arr[0], 1.0); // position.x
        assert_eq!(arr[4], 1.0); // normal.y
        assert_eq!(arr[6], 0.5); // uv.u
        assert_eq!(arr[7], 0.25); // uv.v
    }

    #[test]
    fn test_mesh_add_vertices() {
        let mut mesh = Mesh::new();
        let start = mesh.add_vertices(vec![
            Vertex::new(Vec3::ZERO),
            Vertex::new(Vec3::RIGHT),
            Vertex::new(Vec3::UP),
        ]);
        assert_eq!(start, 0);
        assert_eq!(mesh.vertex_count(), 3);

        let next = mesh.add_vertices(vec![Vertex::new(Vec3::UP)]);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_mesh_add_triangle() {
        let mut mesh = Mesh::new();
        mesh.add_vertices(vec![
            Vertex::new(Vec3::ZERO),
            Vertex::new(Vec3::RIGHT),
            Vertex::new(Vec3::UP),
        ]);
        mesh.add_triangle(0, 1, 2);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices.len(), 3);
    }

    #[test]
    fn test_mesh_merge_offsets_indices() {
        let mut mesh1 = Mesh::new();
        mesh1.add_vertices(vec![Vertex::new(Vec3::ZERO)]);
        mesh1.add_triangle(0, 0, 0);

        let mut mesh2 = Mesh::new();
        mesh2.add_vertices(vec![Vertex::new(Vec3::UP)]);
        mesh2.add_triangle(0, 0, 0);

        mesh1.merge(&mesh2);
        assert_eq!(mesh1.vertex_count(), 2);
        assert_eq!(mesh1.indices[3], 1);
    }

    #[test]
    fn test_calculate_bounds() {
        let mut mesh = Mesh::new();
        mesh.add_vertices(vec![
            Vertex::new(Vec3::new(-1.0, 0.0, 0.0)),
            Vertex::new(Vec3::new(1.0, 0.0, 0.0)),
            Vertex::new(Vec3::new(0.0, 2.0, 0.0)),
        ]);
        mesh.calculate_bounds();

        assert!(mesh.bounds_radius > 0.0);
        assert!(mesh.bounds_center.y > 0.0);
    }

    #[test]
    fn test_recalculate_normals() {
        let mut mesh = Mesh::new();
        mesh.add_vertices(vec![
            Vertex::new(Vec3::ZERO),
            Vertex::new(Vec3::RIGHT),
            Vertex::new(Vec3::new(0.0, 0.0, 1.0)),
        ]);
        mesh.add_triangle(0, 1, 2);
        mesh.recalculate_normals();

        for v in &mesh.vertices {
            assert!((v.normal.length() - 1.0).abs() < 0.0001);
            // flat triangle in the XZ plane: normals along +-Y
            assert!(v.normal.x.abs() < 0.0001);
            assert!(v.normal.z.abs() < 0.0001);
        }
    }

    #[test]
    fn test_flat_buffers() {
        let mut mesh = Mesh::new();
        mesh.add_vertices(vec![
            Vertex::new(Vec3::ZERO),
            Vertex::new(Vec3::RIGHT),
        ]);

        assert_eq!(mesh.vertex_data().len(), 16); // 2 vertices * 8 floats
        assert_eq!(mesh.position_data().len(), 6);
        assert_eq!(mesh.uv_data().len(), 4);
    }
}
