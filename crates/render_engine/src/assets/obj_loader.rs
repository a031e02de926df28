//! OBJ file loader for 3D models
//!
//! Parses the position/normal/uv/face lists of a Wavefront OBJ file
//! into the engine's vertex layout. Recoverable irregularities (bad
//! face indices, degenerate faces) are surfaced as warnings separately
//! from fatal parse failures.

use crate::render::Vertex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Fatal OBJ loading errors
#[derive(Error, Debug)]
pub enum ObjError {
    /// File could not be opened or read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A vertex/normal/uv record could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The file parsed but yielded no usable geometry
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Parsed OBJ geometry plus any non-fatal parser warnings.
pub struct ObjData {
    /// Flattened triangle list in the engine's vertex layout
    pub vertices: Vec<Vertex>,
    /// Non-fatal irregularities encountered while parsing
    pub warnings: Vec<String>,
}

/// Load an OBJ file into a flat (non-indexed) triangle list.
///
/// Faces are fan-triangulated. Missing normals default to +Y and
/// missing texture coordinates to the origin; the vertex color channel
/// mirrors the normal, which gives untextured models visible shading.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<ObjData, ObjError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut vertices = Vec::new();
    let mut warnings = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" => {
                positions.push(parse_vec3(&parts, line_number)?);
            }
            "vn" => {
                normals.push(parse_vec3(&parts, line_number)?);
            }
            "vt" => {
                tex_coords.push(parse_vec2(&parts, line_number)?);
            }
            "f" => {
                if parts.len() < 4 {
                    warnings.push(format!(
                        "line {}: face with fewer than 3 vertices, skipped",
                        line_number + 1
                    ));
                    continue;
                }

                let mut face = Vec::with_capacity(parts.len() - 1);
                let mut face_ok = true;
                for corner in &parts[1..] {
                    match parse_corner(corner, &positions, &normals, &tex_coords) {
                        Some(vertex) => face.push(vertex),
                        None => {
                            warnings.push(format!(
                                "line {}: face references a missing vertex, skipped",
                                line_number + 1
                            ));
                            face_ok = false;
                            break;
                        }
                    }
                }
                if !face_ok {
                    continue;
                }

                // Fan triangulation
                for i in 1..(face.len() - 1) {
                    vertices.push(face[0]);
                    vertices.push(face[i]);
                    vertices.push(face[i + 1]);
                }
            }
            _ => {
                // Ignore other records (groups, materials, smoothing)
            }
        }
    }

    if vertices.is_empty() {
        return Err(ObjError::InvalidFormat(
            "no faces found in OBJ file".to_string(),
        ));
    }

    Ok(ObjData { vertices, warnings })
}

fn parse_vec3(parts: &[&str], line_number: usize) -> Result<[f32; 3], ObjError> {
    if parts.len() < 4 {
        return Err(ObjError::Parse(format!(
            "line {}: expected 3 components",
            line_number + 1
        )));
    }
    let mut out = [0.0f32; 3];
    for (slot, part) in out.iter_mut().zip(&parts[1..4]) {
        *slot = part.parse().map_err(|_| {
            ObjError::Parse(format!("line {}: invalid number '{}'", line_number + 1, part))
        })?;
    }
    Ok(out)
}

fn parse_vec2(parts: &[&str], line_number: usize) -> Result<[f32; 2], ObjError> {
    if parts.len() < 3 {
        return Err(ObjError::Parse(format!(
            "line {}: expected 2 components",
            line_number + 1
        )));
    }
    let mut out = [0.0f32; 2];
    for (slot, part) in out.iter_mut().zip(&parts[1..3]) {
        *slot = part.parse().map_err(|_| {
            ObjError::Parse(format!("line {}: invalid number '{}'", line_number + 1, part))
        })?;
    }
    Ok(out)
}

/// Resolve one `v/vt/vn` face corner against the record lists.
///
/// OBJ indices are 1-based; a reference past the end of a list makes
/// the whole face unusable and returns `None`.
fn parse_corner(
    corner: &str,
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
) -> Option<Vertex> {
    let mut refs = corner.split('/');

    let position_index = refs.next()?.parse::<usize>().ok()?.checked_sub(1)?;
    let position = *positions.get(position_index)?;

    let uv = match refs.next().filter(|part| !part.is_empty()) {
        Some(part) => {
            let index = part.parse::<usize>().ok()?.checked_sub(1)?;
            *tex_coords.get(index)?
        }
        None => [0.0, 0.0],
    };

    let normal = match refs.next().filter(|part| !part.is_empty()) {
        Some(part) => {
            let index = part.parse::<usize>().ok()?.checked_sub(1)?;
            *normals.get(index)?
        }
        None => [0.0, 1.0, 0.0],
    };

    Some(Vertex {
        position,
        normal,
        // Color mirrors the normal so untextured meshes stay legible.
        color: normal,
        uv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_obj(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_triangle() {
        let path = write_temp_obj(
            "obj_loader_triangle.obj",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1/1 2/2/1 3/3/1\n",
        );

        let data = load_obj(&path).unwrap();
        assert_eq!(data.vertices.len(), 3);
        assert!(data.warnings.is_empty());
        assert_eq!(data.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(data.vertices[1].uv, [1.0, 0.0]);
        // Color channel mirrors the normal
        assert_eq!(data.vertices[0].color, data.vertices[0].normal);
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let path = write_temp_obj(
            "obj_loader_quad.obj",
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        );

        let data = load_obj(&path).unwrap();
        assert_eq!(data.vertices.len(), 6);
        // Both triangles share the fan anchor
        assert_eq!(data.vertices[0].position, data.vertices[3].position);
    }

    #[test]
    fn test_bad_face_index_is_a_warning_not_an_error() {
        let path = write_temp_obj(
            "obj_loader_bad_face.obj",
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 2 9\n",
        );

        let data = load_obj(&path).unwrap();
        assert_eq!(data.vertices.len(), 3);
        assert_eq!(data.warnings.len(), 1);
        assert!(data.warnings[0].contains("missing vertex"));
    }

    #[test]
    fn test_unparseable_position_is_fatal() {
        let path = write_temp_obj("obj_loader_bad_vertex.obj", "v 0 zero 0\nf 1 1 1\n");
        assert!(matches!(load_obj(&path), Err(ObjError::Parse(_))));
    }

    #[test]
    fn test_empty_file_is_invalid() {
        let path = write_temp_obj("obj_loader_empty.obj", "# nothing here\n");
        assert!(matches!(load_obj(&path), Err(ObjError::InvalidFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_obj("does/not/exist.obj"),
            Err(ObjError::Io(_))
        ));
    }
}
