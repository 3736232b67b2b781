//! Triangulated height-field meshes generated from depth grids

use log::info;
use nalgebra::{Vector2, Vector3};

use crate::aabb::Aabb3d;
use crate::grid::ScalarGrid2d;
use crate::{ConversionError, Real};

/// A triangulated 3D surface lifted from a 2D depth grid
///
/// All arrays are owned by the mesh and freshly allocated per conversion,
/// there is no aliasing with any input buffer. For a `width × height` depth
/// grid the mesh has exactly `width * height` vertices and
/// `2 * (width - 1) * (height - 1)` triangles.
#[derive(Clone, Debug)]
pub struct HeightFieldMesh<R: Real> {
    /// Coordinates of all vertices of the mesh
    pub vertices: Vec<Vector3<R>>,
    /// The triangles of the mesh identified by their vertex indices
    pub triangles: Vec<[usize; 3]>,
    /// Texture coordinates, one pair in `[0, 1]²` per vertex
    pub uvs: Vec<Vector2<R>>,
    /// Smoothed per-vertex unit normals (or zero vectors for isolated vertices)
    pub normals: Vec<Vector3<R>>,
    /// Axis-aligned bounding box of all vertex positions
    pub aabb: Aabb3d<R>,
}

/// Lifts a depth grid into a triangulated height-field mesh
///
/// Grid cell `(x, y)` (column `x`, row `y`, flat index `y * width + x`) maps to
/// the vertex `(x / (width-1) - 0.5, y / (height-1) - 0.5, depth * extrusion_height)`
/// with texture coordinates `(x / (width-1), 1 - y / (height-1))`. Every grid
/// quad is split into the two triangles `(v1, v2, v3)` and `(v2, v4, v3)`,
/// where `v1` is the top-left and `v4` the bottom-right corner. The winding is
/// fixed, locally flat (zero area) triangles are emitted as-is.
pub fn triangulate_height_field<R: Real>(
    depth: &ScalarGrid2d<R>,
    extrusion_height: R,
) -> Result<HeightFieldMesh<R>, ConversionError> {
    let width = depth.width();
    let height = depth.height();
    if width < 2 || height < 2 {
        return Err(ConversionError::DegenerateInput { width, height });
    }

    // All sizes are known up front, no dynamic growth
    let vertex_count = width * height;
    let triangle_count = 2 * (width - 1) * (height - 1);
    let mut vertices = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);
    let mut triangles = Vec::with_capacity(triangle_count);

    let max_x = R::from_usize(width - 1).unwrap();
    let max_y = R::from_usize(height - 1).unwrap();
    let half = R::from_f64_unchecked(0.5);

    for y in 0..height {
        for x in 0..width {
            let u = R::from_usize(x).unwrap() / max_x;
            let v = R::from_usize(y).unwrap() / max_y;
            let z = depth.get(x, y) * extrusion_height;

            vertices.push(Vector3::new(u - half, v - half, z));
            // Flip V to match conventional texture-space orientation
            uvs.push(Vector2::new(u, R::one() - v));
        }
    }

    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let v1 = y * width + x;
            let v2 = y * width + x + 1;
            let v3 = (y + 1) * width + x;
            let v4 = (y + 1) * width + x + 1;

            triangles.push([v1, v2, v3]);
            triangles.push([v2, v4, v3]);
        }
    }

    let normals = vertex_normals(&vertices, &triangles);
    let aabb = Aabb3d::from_points(&vertices);

    info!(
        "Triangulated height field mesh has {} triangles and {} vertices.",
        triangles.len(),
        vertices.len()
    );

    Ok(HeightFieldMesh {
        vertices,
        triangles,
        uvs,
        normals,
        aabb,
    })
}

/// Computes smoothed per-vertex normals by area-weighted face normal accumulation
///
/// The unnormalized face normal `(v2 - v1) × (v3 - v1)` of every triangle is
/// added to the normal of each of its three vertices, afterwards each vertex
/// normal is scaled to unit length. A vertex whose accumulated normal has zero
/// length (isolated or fully degenerate) keeps the zero vector.
pub fn vertex_normals<R: Real>(
    vertices: &[Vector3<R>],
    triangles: &[[usize; 3]],
) -> Vec<Vector3<R>> {
    let mut normals = vec![Vector3::zeros(); vertices.len()];

    for &[i, j, k] in triangles {
        let edge_a = vertices[j] - vertices[i];
        let edge_b = vertices[k] - vertices[i];
        let face_normal = edge_a.cross(&edge_b);

        normals[i] += face_normal;
        normals[j] += face_normal;
        normals[k] += face_normal;
    }

    for normal in normals.iter_mut() {
        let length = normal.norm();
        if length > R::zero() {
            *normal /= length;
        }
    }

    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_grid(width: usize, height: usize, depth: f64) -> ScalarGrid2d<f64> {
        ScalarGrid2d::from_vec(width, height, vec![depth; width * height])
    }

    #[test]
    fn test_mesh_counts_match_grid_dimensions() {
        for resolution in [2usize, 3, 4, 17] {
            let mesh = triangulate_height_field(&uniform_grid(resolution, resolution, 0.5), 0.2)
                .expect("triangulation should succeed");

            assert_eq!(mesh.vertices.len(), resolution * resolution);
            assert_eq!(mesh.triangles.len(), 2 * (resolution - 1) * (resolution - 1));
            assert_eq!(mesh.uvs.len(), mesh.vertices.len());
            assert_eq!(mesh.normals.len(), mesh.vertices.len());
        }
    }

    #[test]
    fn test_mesh_rejects_degenerate_grids() {
        assert!(matches!(
            triangulate_height_field(&uniform_grid(0, 0, 0.0), 1.0),
            Err(ConversionError::DegenerateInput {
                width: 0,
                height: 0
            })
        ));
        assert!(matches!(
            triangulate_height_field(&uniform_grid(1, 5, 0.0), 1.0),
            Err(ConversionError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_vertex_positions_and_uvs() {
        let mesh =
            triangulate_height_field(&uniform_grid(3, 3, 1.0), 0.4).expect("triangulation failed");

        // Corner vertices span [-0.5, 0.5], z is depth * extrusion height
        assert_eq!(mesh.vertices[0], Vector3::new(-0.5, -0.5, 0.4));
        assert_eq!(mesh.vertices[8], Vector3::new(0.5, 0.5, 0.4));
        assert_eq!(mesh.vertices[4], Vector3::new(0.0, 0.0, 0.4));

        // UVs are V-flipped
        assert_eq!(mesh.uvs[0], Vector2::new(0.0, 1.0));
        assert_eq!(mesh.uvs[8], Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_triangle_winding_and_index_ranges() {
        let mesh =
            triangulate_height_field(&uniform_grid(3, 2, 0.0), 1.0).expect("triangulation failed");

        // First cell emits (v1, v2, v3) and (v2, v4, v3) with row-major indices
        assert_eq!(mesh.triangles[0], [0, 1, 3]);
        assert_eq!(mesh.triangles[1], [1, 4, 3]);
        assert_eq!(mesh.triangles[2], [1, 2, 4]);
        assert_eq!(mesh.triangles[3], [2, 5, 4]);

        for triangle in &mesh.triangles {
            for &index in triangle {
                assert!(index < mesh.vertices.len());
            }
        }
    }

    #[test]
    fn test_flat_mesh_normals_are_axis_aligned() {
        let mesh =
            triangulate_height_field(&uniform_grid(4, 4, 0.3), 1.0).expect("triangulation failed");

        for normal in &mesh.normals {
            assert!((normal.norm() - 1.0).abs() < 1.0e-12);
            assert!(normal.x.abs() < 1.0e-12);
            assert!(normal.y.abs() < 1.0e-12);
            assert!((normal.z.abs() - 1.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn test_normals_are_unit_or_zero() {
        let mut grid = uniform_grid(5, 5, 0.0);
        for y in 0..5 {
            for x in 0..5 {
                grid.set(x, y, ((x * 31 + y * 17) % 7) as f64 / 7.0);
            }
        }
        let mesh = triangulate_height_field(&grid, 0.7).expect("triangulation failed");

        for normal in &mesh.normals {
            let length = normal.norm();
            assert!(length == 0.0 || (length - 1.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn test_isolated_vertex_keeps_zero_normal() {
        // A triangle list not referencing the last vertex at all
        let vertices = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(5.0, 5.0, 5.0),
        ];
        let triangles = vec![[0usize, 1, 2]];
        let normals = vertex_normals(&vertices, &triangles);

        assert_eq!(normals[3], Vector3::zeros());
        assert!((normals[0] - Vector3::new(0.0, 0.0, 1.0)).norm() < 1.0e-12);
    }

    #[test]
    fn test_aabb_encloses_all_vertices() {
        let mut grid = uniform_grid(6, 6, 0.0);
        for y in 0..6 {
            for x in 0..6 {
                grid.set(x, y, ((x + y) % 5) as f64 / 4.0);
            }
        }
        let mesh = triangulate_height_field(&grid, 0.25).expect("triangulation failed");

        assert!(mesh.aabb.is_consistent());
        for vertex in &mesh.vertices {
            assert!(vertex.x >= mesh.aabb.min().x && vertex.x <= mesh.aabb.max().x);
            assert!(vertex.y >= mesh.aabb.min().y && vertex.y <= mesh.aabb.max().y);
            assert!(vertex.z >= mesh.aabb.min().z && vertex.z <= mesh.aabb.max().z);
        }
    }
}
