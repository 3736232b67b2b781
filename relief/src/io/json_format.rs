//! JSON mesh output following the wire format expected by mesh viewer clients

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use relief_lib::{HeightFieldMesh, Real};
use serde::Serialize;

/// Serializable form of a converted mesh
///
/// All scalar fields are 32-bit floats and triangle indices are unsigned
/// integers, independently of the precision used during the conversion.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDocument {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uv_coordinates: Vec<[f32; 2]>,
    pub bounding_box: BoundingBoxDocument,
}

#[derive(Clone, Debug, Serialize)]
pub struct BoundingBoxDocument {
    pub min: CornerDocument,
    pub max: CornerDocument,
}

#[derive(Clone, Debug, Serialize)]
pub struct CornerDocument {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl<R: Real> From<&HeightFieldMesh<R>> for MeshDocument {
    fn from(mesh: &HeightFieldMesh<R>) -> Self {
        let to_f32 = |value: R| -> f32 { value.try_convert().unwrap() };
        let corner = |corner: &relief_lib::nalgebra::Vector3<f32>| -> CornerDocument {
            CornerDocument {
                x: corner.x,
                y: corner.y,
                z: corner.z,
            }
        };
        let aabb = mesh
            .aabb
            .try_convert::<f32>()
            .expect("bounding box coordinates have to be representable in f32");

        Self {
            vertices: mesh
                .vertices
                .iter()
                .map(|v| [to_f32(v.x), to_f32(v.y), to_f32(v.z)])
                .collect(),
            faces: mesh
                .triangles
                .iter()
                .map(|&[i, j, k]| [i as u32, j as u32, k as u32])
                .collect(),
            normals: mesh
                .normals
                .iter()
                .map(|n| [to_f32(n.x), to_f32(n.y), to_f32(n.z)])
                .collect(),
            uv_coordinates: mesh
                .uvs
                .iter()
                .map(|uv| [to_f32(uv.x), to_f32(uv.y)])
                .collect(),
            bounding_box: BoundingBoxDocument {
                min: corner(aabb.min()),
                max: corner(aabb.max()),
            },
        }
    }
}

/// Writes a mesh as a JSON document to the given file path
pub fn write_mesh<R: Real, P: AsRef<Path>>(
    mesh: &HeightFieldMesh<R>,
    output_file: P,
) -> Result<(), anyhow::Error> {
    let document = MeshDocument::from(mesh);

    let file =
        File::create(output_file).context("Failed to open file handle for writing JSON file")?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, &document).context("Failed to serialize the mesh to JSON")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_lib::Parameters;

    #[test]
    fn test_mesh_document_field_names() {
        // Minimal all-black png, base64-free fixture built from raw pixels
        let image = image::GrayImage::from_pixel(2, 2, image::Luma([0u8]));
        let mut bytes = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();

        let parameters = Parameters::<f32> {
            resolution: 2,
            extrusion_height: 1.0,
        };
        let mesh = relief_lib::convert_image(&bytes, &parameters).unwrap();
        let json = serde_json::to_value(MeshDocument::from(&mesh)).unwrap();

        assert_eq!(json["vertices"].as_array().unwrap().len(), 4);
        assert_eq!(json["faces"].as_array().unwrap().len(), 2);
        assert_eq!(json["normals"].as_array().unwrap().len(), 4);
        assert_eq!(json["uvCoordinates"].as_array().unwrap().len(), 4);
        assert!(json["boundingBox"]["min"]["x"].is_number());
        assert!(json["boundingBox"]["max"]["z"].is_number());
    }

    #[test]
    fn test_mesh_document_from_double_precision_mesh() {
        // The document always carries f32 values, the bounding box corners
        // have to survive the narrowing from an f64 mesh
        let image = image::GrayImage::from_pixel(4, 4, image::Luma([255u8]));
        let mut bytes = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();

        let parameters = Parameters::<f64> {
            resolution: 4,
            extrusion_height: 0.5,
        };
        let mesh = relief_lib::convert_image(&bytes, &parameters).unwrap();
        let document = MeshDocument::from(&mesh);

        let aabb = mesh.aabb.try_convert::<f32>().unwrap();
        assert_eq!(document.bounding_box.min.x, aabb.min().x);
        assert_eq!(document.bounding_box.min.z, aabb.min().z);
        assert_eq!(document.bounding_box.max.x, aabb.max().x);
        assert_eq!(document.bounding_box.max.z, aabb.max().z);
        // Flat white input: z = 0.3 * extrusion height everywhere
        assert!((document.bounding_box.max.z - 0.15).abs() < 1.0e-6);
    }
}
