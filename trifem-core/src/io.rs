//! Legacy ASCII VTK output for triangle meshes and nodal fields.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// VTK cell type tag for a linear triangle.
const VTK_TRIANGLE: u8 = 5;

/// One named array of point data.
#[derive(Debug, Clone, Copy)]
pub enum PointData<'a> {
    /// One value per node.
    Scalars(&'a [f64]),
    /// `components` (2 or 3) values per node, node-major. 2D vectors are
    /// written with z = 0.
    Vectors { data: &'a [f64], components: usize },
}

impl PointData<'_> {
    fn check(&self, name: &str, n_nodes: usize) -> Result<()> {
        let (len, components) = match *self {
            PointData::Scalars(data) => (data.len(), 1),
            PointData::Vectors { data, components } => {
                if !(components == 2 || components == 3) {
                    return Err(Error::Shape(format!(
                        "point data '{}' has {} components, expected 2 or 3",
                        name, components
                    )));
                }
                (data.len(), components)
            }
        };
        if len != n_nodes * components {
            return Err(Error::Shape(format!(
                "point data '{}' has {} values, expected {} for {} nodes",
                name,
                len,
                n_nodes * components,
                n_nodes
            )));
        }
        Ok(())
    }
}

/// Write `mesh` and its point data as a legacy VTK unstructured grid.
///
/// All arrays are checked before anything is written.
pub fn write_vtk<W: Write>(
    mut out: W,
    mesh: &Mesh,
    point_data: &[(&str, PointData<'_>)],
) -> Result<()> {
    let n_nodes = mesh.n_nodes();
    let n_cells = mesh.n_triangles();
    for (name, data) in point_data {
        data.check(name, n_nodes)?;
    }

    writeln!(out, "# vtk DataFile Version 2.0")?;
    writeln!(out, "trifem output")?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(out, "POINTS {} float", n_nodes)?;
    for p in mesh.nodes() {
        writeln!(out, "{} {} 0.0", p.x, p.y)?;
    }

    writeln!(out, "CELLS {} {}", n_cells, 4 * n_cells)?;
    for [a, b, c] in mesh.triangles() {
        writeln!(out, "3 {} {} {}", a, b, c)?;
    }

    writeln!(out, "CELL_TYPES {}", n_cells)?;
    for _ in 0..n_cells {
        writeln!(out, "{}", VTK_TRIANGLE)?;
    }

    if !point_data.is_empty() {
        writeln!(out, "POINT_DATA {}", n_nodes)?;
        for (name, data) in point_data {
            match *data {
                PointData::Scalars(values) => {
                    writeln!(out, "SCALARS {} float 1", name)?;
                    writeln!(out, "LOOKUP_TABLE default")?;
                    for v in values {
                        writeln!(out, "{}", v)?;
                    }
                }
                PointData::Vectors { data, components } => {
                    writeln!(out, "VECTORS {} float", name)?;
                    for v in data.chunks_exact(components) {
                        let z = if components == 3 { v[2] } else { 0.0 };
                        writeln!(out, "{} {} {}", v[0], v[1], z)?;
                    }
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

/// Write a `.vtk` file at `path`. See [`write_vtk`].
pub fn write_vtk_file(
    path: impl AsRef<Path>,
    mesh: &Mesh,
    point_data: &[(&str, PointData<'_>)],
) -> Result<()> {
    let file = File::create(path)?;
    write_vtk(BufWriter::new(file), mesh, point_data)
}
