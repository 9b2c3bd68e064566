// Mesh regridding - Project D-FLOW flow element values onto an ESRI grid

use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation};
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::*;


/// Flow element centre carrying its bed shear stress
#[derive(Debug, Clone, Copy)]
struct MeshSample {
    position: Point2<f64>,
    shear: f64,
}

impl HasPosition for MeshSample {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Interpolate mesh shear onto the grid described by `header`.
///
/// Grid nodes sit at `xllcorner + i * cellsize`, `yllcorner + j * cellsize`
/// so the result lines up with the vegetation maps CASiMiR produces. Nodes
/// outside the convex hull of the mesh get the header's NODATA value. Row 0
/// of the result is the northernmost row.
pub fn regrid(
    mesh: &ShearMesh,
    header: &GridHeader,
    method: InterpolationMethod,
) -> Result<AsciiGrid, DomainError> {
    let samples: Vec<MeshSample> = mesh
        .points()
        .map(|(x, y, shear)| MeshSample {
            position: Point2::new(x, y),
            shear,
        })
        .collect();

    if samples.len() < 3 {
        return Err(DomainError::InsufficientMesh(format!(
            "{} usable flow elements, at least 3 required",
            samples.len()
        )));
    }

    let triangulation = DelaunayTriangulation::<MeshSample>::bulk_load(samples)
        .map_err(|e| DomainError::Mesh(format!("triangulation failed: {:?}", e)))?;

    if triangulation.num_inner_faces() == 0 {
        return Err(DomainError::InsufficientMesh(
            "flow elements are collinear".to_string(),
        ));
    }

    debug!(
        vertices = triangulation.num_vertices(),
        faces = triangulation.num_inner_faces(),
        %method,
        "mesh triangulated"
    );

    let node_x: Vec<f64> = (0..header.ncols)
        .map(|i| header.xllcorner + i as f64 * header.cellsize)
        .collect();

    let mut data = Vec::with_capacity(header.cell_count()?);
    let mut outside = 0usize;

    let interpolate = |x: f64, y: f64| -> Option<f64> {
        let point = Point2::new(x, y);
        match method {
            InterpolationMethod::Linear => triangulation
                .barycentric()
                .interpolate(|v| v.data().shear, point),
            InterpolationMethod::Natural => triangulation
                .natural_neighbor()
                .interpolate(|v| v.data().shear, point),
        }
    };

    // Southernmost node row is j = 0; emit north first
    for j in (0..header.nrows).rev() {
        let y = header.yllcorner + j as f64 * header.cellsize;
        for &x in &node_x {
            match interpolate(x, y) {
                Some(value) if value.is_finite() => data.push(value),
                _ => {
                    outside += 1;
                    data.push(header.nodata_value);
                }
            }
        }
    }

    debug!(nodes = data.len(), outside, "mesh regridded");

    AsciiGrid::new(header.clone(), data)
}
