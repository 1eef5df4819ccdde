use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::{
    descriptor::Geometry,
    model::{MeshData, ModelVertex},
};

/**
 * Placeholder meshes for the preview. Real assets are never fetched, every node
 * is one of these primitives. All triangles wind counter-clockwise when seen
 * from the side the normal points to.
 */
pub fn mesh_for(geometry: &Geometry) -> MeshData {
    match *geometry {
        Geometry::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere(radius, width_segments, height_segments),
        Geometry::Cube { size } => cube(size),
        Geometry::Plane { width, height } => plane(width, height),
    }
}

/// UV sphere centered at the origin with the poles on the y axis.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let normal = Vector3::new(
                -(u * 2.0 * PI).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * 2.0 * PI).sin() * (v * PI).sin(),
            );
            vertices.push(ModelVertex {
                position: (normal * radius).into(),
                normal: normal.into(),
            });
        }
    }

    let row = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // the first and last rows collapse into the poles
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData::new(vertices, indices)
}

/// Axis aligned cube with edge length `size`, four vertices per face for hard normals.
pub fn cube(size: f32) -> MeshData {
    let half = size / 2.0;
    // (normal, u, v) with u x v == normal
    let faces = [
        (Vector3::unit_x(), -Vector3::unit_z(), Vector3::unit_y()),
        (-Vector3::unit_x(), Vector3::unit_z(), Vector3::unit_y()),
        (Vector3::unit_y(), Vector3::unit_x(), -Vector3::unit_z()),
        (-Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
        (Vector3::unit_z(), Vector3::unit_x(), Vector3::unit_y()),
        (-Vector3::unit_z(), -Vector3::unit_x(), Vector3::unit_y()),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        vertices.extend(quad(normal * half, u * half, v * half, normal));
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData::new(vertices, indices)
}

/// Flat rectangle in the xy plane facing +z. Callers rotate it into place.
pub fn plane(width: f32, height: f32) -> MeshData {
    let vertices = quad(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::unit_x() * (width / 2.0),
        Vector3::unit_y() * (height / 2.0),
        Vector3::unit_z(),
    )
    .to_vec();

    MeshData::new(vertices, vec![0, 1, 2, 0, 2, 3])
}

fn quad(
    center: Vector3<f32>,
    u: Vector3<f32>,
    v: Vector3<f32>,
    normal: Vector3<f32>,
) -> [ModelVertex; 4] {
    let normal: [f32; 3] = normal.normalize().into();
    [center - u - v, center + u - v, center + u + v, center - u + v].map(|corner| ModelVertex {
        position: corner.into(),
        normal,
    })
}
