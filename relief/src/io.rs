//! Writers for the supported mesh output formats

use std::path::Path;

use anyhow::anyhow;
use relief_lib::{HeightFieldMesh, Real};

pub mod json_format;
pub mod obj_format;

/// Writes a mesh to the given file path, dispatching on the file extension
pub fn write_mesh<R: Real, P: AsRef<Path>>(
    mesh: &HeightFieldMesh<R>,
    output_file: P,
) -> Result<(), anyhow::Error> {
    let output_file = output_file.as_ref();
    let extension = output_file
        .extension()
        .ok_or_else(|| {
            anyhow!(
                "Unable to detect the file format of the output file \"{}\" (missing extension)",
                output_file.display()
            )
        })?
        .to_string_lossy()
        .to_ascii_lowercase();

    match extension.as_str() {
        "json" => json_format::write_mesh(mesh, output_file),
        "obj" => obj_format::write_mesh(mesh, output_file),
        _ => Err(anyhow!(
            "Unsupported output file format extension \"{}\" (supported formats: JSON, OBJ)",
            extension
        )),
    }
}
