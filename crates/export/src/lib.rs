//! Export helpers for CSV and JSON envelope artifacts.

pub mod envelope {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use tau_core::sphere;
    use tau_envelope::EnvelopeMesh;

    const HEADER: &str = "lon_rad,colat_rad,dir_x,dir_y,dir_z,x_kgf,y_kgf,z_kgf,magnitude_kgf";

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Write the standard envelope CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// Write one CSV row per grid cell, longitude-major, matching the
    /// standard header ordering. Invalid cells from a partial sweep emit
    /// NaN fields; readers are expected to filter non-finite values.
    pub fn write_mesh(writer: &mut dyn Write, mesh: &EnvelopeMesh) -> io::Result<()> {
        for i in 0..mesh.lon_count {
            for j in 0..mesh.colat_count {
                let k = mesh.index(i, j);
                let direction = sphere::grid_direction(mesh.lons[i], mesh.colats[j]);
                writeln!(
                    writer,
                    "{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
                    mesh.lons[i],
                    mesh.colats[j],
                    direction.x,
                    direction.y,
                    direction.z,
                    mesh.x[k],
                    mesh.y[k],
                    mesh.z[k],
                    mesh.magnitude[k],
                )?;
            }
        }
        Ok(())
    }

    /// Sweep parameters recorded alongside the mesh in the JSON sidecar.
    #[derive(Debug, Clone)]
    pub struct Metadata {
        pub resolution: usize,
        pub max_current_amps: f64,
    }

    #[derive(Serialize)]
    struct MeshSidecar<'a> {
        resolution: usize,
        max_current_amps: f64,
        lon_count: usize,
        colat_count: usize,
        max_magnitude_kgf: f64,
        lons_rad: &'a [f64],
        colats_rad: &'a [f64],
        x_kgf: &'a [f64],
        y_kgf: &'a [f64],
        z_kgf: &'a [f64],
        magnitude_kgf: &'a [f64],
    }

    /// Write the full mesh as a pretty-printed JSON sidecar. NaN cells
    /// serialize as `null`.
    pub fn write_sidecar(path: &Path, meta: &Metadata, mesh: &EnvelopeMesh) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let sidecar = MeshSidecar {
            resolution: meta.resolution,
            max_current_amps: meta.max_current_amps,
            lon_count: mesh.lon_count,
            colat_count: mesh.colat_count,
            max_magnitude_kgf: mesh.max_magnitude,
            lons_rad: &mesh.lons,
            colats_rad: &mesh.colats,
            x_kgf: &mesh.x,
            y_kgf: &mesh.y,
            z_kgf: &mesh.z,
            magnitude_kgf: &mesh.magnitude,
        };
        to_writer_pretty(File::create(path)?, &sidecar)?;
        Ok(())
    }
}
