//! Wavefront OBJ mesh output

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use relief_lib::{HeightFieldMesh, Real};

/// Writes a mesh with texture coordinates and normals as an OBJ file
pub fn write_mesh<R: Real, P: AsRef<Path>>(
    mesh: &HeightFieldMesh<R>,
    output_file: P,
) -> Result<(), anyhow::Error> {
    let file =
        File::create(output_file).context("Failed to open file handle for writing OBJ file")?;
    let mut writer = BufWriter::with_capacity(100000, file);

    for v in &mesh.vertices {
        writeln!(&mut writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for uv in &mesh.uvs {
        writeln!(&mut writer, "vt {} {}", uv.x, uv.y)?;
    }
    for n in &mesh.normals {
        writeln!(&mut writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }

    // OBJ indices are one-based, vertex/uv/normal arrays are parallel
    for &[i, j, k] in &mesh.triangles {
        writeln!(
            &mut writer,
            "f {0}/{0}/{0} {1}/{1}/{1} {2}/{2}/{2}",
            i + 1,
            j + 1,
            k + 1
        )?;
    }

    Ok(())
}
