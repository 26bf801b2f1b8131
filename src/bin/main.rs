use airfoil_mesh_rs::airfoil::generate::{AirfoilGenerator, Naca4Digit, DEFAULT_STATIONS};
use airfoil_mesh_rs::airfoil::AirfoilContour;
use airfoil_mesh_rs::kernel::recording::GeoModel;
use airfoil_mesh_rs::mesh::build_structured_mesh;
use airfoil_mesh_rs::mesh::params::{MeshParams, TuningParameters};
use std::fs::File;
use std::io::Write;

fn main() {
    env_logger::init();

    let naca = Naca4Digit::from_digits("0012").expect("Invalid NACA designation");
    let points = naca.point_cloud(DEFAULT_STATIONS);
    let contour = AirfoilContour::new(&points, None).expect("Invalid airfoil contour");

    let mut kernel = GeoModel::new();
    let mesh = build_structured_mesh(
        &mut kernel,
        contour,
        &MeshParams::default(),
        &TuningParameters::default(),
    )
    .expect("Failed building structured mesh");

    write_script(&kernel.to_geo_script(), "mesh_airfoil_0012.geo")
        .expect("Failed writing file mesh_airfoil_0012.geo");

    log::info!(
        "wrote {} blocks, {} points, {} curves",
        mesh.blocks.len(),
        kernel.point_count(),
        kernel.curve_count()
    );
}

fn write_script(script: &str, file_name: &str) -> std::io::Result<()> {
    let mut file = File::create(file_name)?;
    file.write_all(script.as_bytes())?;

    Ok(())
}
