//! PLY mesh files.
//!
//! Meshes are stored with a `vertex` element carrying `x y z nx ny nz` as floats
//! and a `face` element carrying `vertex_indices` as a `uchar`-counted list of
//! `int`s, which is what most mesh viewers expect.
//!
//! Binary face records are encoded here rather than by `ply-rs`, whose binary
//! writer emits the element count as every list's length prefix.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::Vec3;
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use volmesh_core::{PlyEncoding, Result, TriangleMesh, VolmeshError};

use crate::unsupported;

const VERTEX: &str = "vertex";
const FACE: &str = "face";
const VERTEX_INDICES: &str = "vertex_indices";
const VERTEX_PROPERTIES: [&str; 6] = ["x", "y", "z", "nx", "ny", "nz"];

/// Writes `mesh` to `path`, creating missing parent directories.
///
/// The file is first written next to its destination with a `.partial` suffix
/// and renamed into place once complete, so `path` either holds the whole mesh
/// or is left untouched.
pub fn write_ply(mesh: &TriangleMesh, path: impl AsRef<Path>, encoding: PlyEncoding) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source| VolmeshError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let ply = build_ply(mesh, encoding)?;
    let partial = partial_path(path);
    let written = write_to(&partial, &ply, mesh).and_then(|()| fs::rename(&partial, path));
    if let Err(source) = written {
        // Best effort; the original error is what matters
        let _ = fs::remove_file(&partial);
        return Err(write_err(source));
    }

    log::info!(
        "wrote {} vertices, {} triangles to {}",
        mesh.num_vertices(),
        mesh.num_triangles(),
        path.display()
    );
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn write_to(path: &Path, ply: &Ply<DefaultElement>, mesh: &TriangleMesh) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_body(&mut out, ply, mesh)?;
    out.flush()?;
    out.get_ref().sync_all()
}

/// Writes the header and every element of a consistent `ply`.
fn write_body<W: Write>(
    out: &mut W,
    ply: &Ply<DefaultElement>,
    mesh: &TriangleMesh,
) -> std::io::Result<()> {
    let writer = Writer::<DefaultElement>::new();
    writer.write_header(out, &ply.header)?;
    for (name, element_def) in &ply.header.elements {
        match (name.as_str(), &ply.header.encoding) {
            (FACE, Encoding::BinaryLittleEndian) => {
                write_binary_faces(out, &mesh.triangles, u32::to_le_bytes)?;
            }
            (FACE, Encoding::BinaryBigEndian) => {
                write_binary_faces(out, &mesh.triangles, u32::to_be_bytes)?;
            }
            _ => {
                if let Some(elements) = ply.payload.get(name) {
                    writer.write_payload_of_element(out, elements, element_def, &ply.header)?;
                }
            }
        }
    }
    Ok(())
}

/// One `uchar` count of 3 followed by three `int` indices per triangle.
///
/// Indices were checked to fit an `int` by [`build_ply`], so their `u32` bytes
/// are the `int` encoding.
fn write_binary_faces<W: Write>(
    out: &mut W,
    triangles: &[[u32; 3]],
    to_bytes: fn(u32) -> [u8; 4],
) -> std::io::Result<()> {
    let mut record = [0_u8; 13];
    record[0] = 3;
    for tri in triangles {
        for (slot, &index) in record[1..].chunks_exact_mut(4).zip(tri) {
            slot.copy_from_slice(&to_bytes(index));
        }
        out.write_all(&record)?;
    }
    Ok(())
}

fn build_ply(mesh: &TriangleMesh, encoding: PlyEncoding) -> Result<Ply<DefaultElement>> {
    mesh.validate()?;

    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = match encoding {
        PlyEncoding::Binary => Encoding::BinaryLittleEndian,
        PlyEncoding::Ascii => Encoding::Ascii,
    };
    ply.header
        .comments
        .push(format!("generated by volmesh {}", env!("CARGO_PKG_VERSION")));

    let mut vertex = ElementDef::new(VERTEX.to_string());
    for name in VERTEX_PROPERTIES {
        vertex.properties.add(PropertyDef::new(
            name.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    ply.header.elements.add(vertex);

    let mut face = ElementDef::new(FACE.to_string());
    face.properties.add(PropertyDef::new(
        VERTEX_INDICES.to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    ply.header.elements.add(face);

    let vertices = mesh
        .vertices
        .iter()
        .zip(&mesh.normals)
        .map(|(p, n)| {
            let mut element = DefaultElement::new();
            for (name, value) in VERTEX_PROPERTIES.iter().zip([p.x, p.y, p.z, n.x, n.y, n.z]) {
                element.insert((*name).to_string(), Property::Float(value));
            }
            element
        })
        .collect();

    let faces = mesh
        .triangles
        .iter()
        .map(|tri| {
            let indices = tri
                .iter()
                .map(|&i| i32::try_from(i))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| {
                    VolmeshError::InvalidArgument(format!(
                        "vertex index in {tri:?} does not fit a PLY int"
                    ))
                })?;
            let mut element = DefaultElement::new();
            element.insert(VERTEX_INDICES.to_string(), Property::ListInt(indices));
            Ok(element)
        })
        .collect::<Result<Vec<_>>>()?;

    ply.payload.insert(VERTEX.to_string(), vertices);
    ply.payload.insert(FACE.to_string(), faces);
    ply.make_consistent()
        .map_err(|e| VolmeshError::InvalidArgument(format!("inconsistent PLY: {e:?}")))?;
    Ok(ply)
}

/// Reads a triangle mesh written by [`write_ply`].
///
/// Accepts ASCII and binary files. Missing normals read back as zero; faces with
/// more than three vertices are rejected.
pub fn read_ply(path: impl AsRef<Path>) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => VolmeshError::FileNotFound(path.to_path_buf()),
        _ => VolmeshError::Io(e),
    })?;
    let ply = Parser::<DefaultElement>::new()
        .read_ply(&mut BufReader::new(file))
        .map_err(|e| unsupported(path, e.to_string()))?;

    let mut mesh = TriangleMesh::default();
    for element in ply.payload.get(VERTEX).into_iter().flatten() {
        let mut fields = [0.0_f32; 6];
        for (slot, name) in fields.iter_mut().zip(VERTEX_PROPERTIES) {
            *slot = match element.get(name) {
                Some(Property::Float(v)) => *v,
                #[allow(clippy::cast_possible_truncation)]
                Some(Property::Double(v)) => *v as f32,
                None if name.starts_with('n') => 0.0,
                other => {
                    return Err(unsupported(
                        path,
                        format!("vertex property '{name}' has unexpected value {other:?}"),
                    ))
                }
            };
        }
        let [x, y, z, nx, ny, nz] = fields;
        mesh.vertices.push(Vec3::new(x, y, z));
        mesh.normals.push(Vec3::new(nx, ny, nz));
    }

    for element in ply.payload.get(FACE).into_iter().flatten() {
        let indices: Option<Vec<u32>> = match element.get(VERTEX_INDICES) {
            Some(Property::ListInt(v)) => v.iter().map(|&i| u32::try_from(i).ok()).collect(),
            Some(Property::ListUInt(v)) => Some(v.clone()),
            _ => None,
        };
        let indices =
            indices.ok_or_else(|| unsupported(path, "face without valid vertex_indices"))?;
        let tri: [u32; 3] = indices
            .try_into()
            .map_err(|v: Vec<u32>| unsupported(path, format!("face with {} vertices", v.len())))?;
        mesh.triangles.push(tri);
    }

    mesh.validate()?;
    log::debug!(
        "read {} vertices, {} triangles from {}",
        mesh.num_vertices(),
        mesh.num_triangles(),
        path.display()
    );
    Ok(mesh)
}
