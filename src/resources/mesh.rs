use crate::data_structures::model::ModelVertex;

/**
 * Calculates per-vertex tangents and bitangents from positions and texture
 * coordinates so normal maps work on meshes exported without tangents.
 *
 * Each triangle contributes one tangent frame to its three vertices; the
 * frames are averaged afterwards. Triangles with degenerate UVs are skipped.
 */
pub fn compute_tangents(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut triangles_included = vec![0u32; vertices.len()];
    let mut tangents = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); vertices.len()];
    let mut bitangents = tangents.clone();

    for c in indices.chunks_exact(3) {
        let [i0, i1, i2] = [c[0] as usize, c[1] as usize, c[2] as usize];
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }
        let (v0, v1, v2) = (vertices[i0], vertices[i1], vertices[i2]);

        let pos0: cgmath::Vector3<_> = v0.position.into();
        let pos1: cgmath::Vector3<_> = v1.position.into();
        let pos2: cgmath::Vector3<_> = v2.position.into();

        let uv0: cgmath::Vector2<_> = v0.tex_coords.into();
        let uv1: cgmath::Vector2<_> = v1.tex_coords.into();
        let uv2: cgmath::Vector2<_> = v2.tex_coords.into();

        // Calculate the edges of the triangle
        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        // Solving
        //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // We flip the bitangent to enable right-handed normal
        // maps with wgpu texture coordinate system
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for i in [i0, i1, i2] {
            tangents[i] += tangent;
            bitangents[i] += bitangent;
            triangles_included[i] += 1;
        }
    }

    // Average the tangents/bitangents
    for (i, n) in triangles_included.into_iter().enumerate() {
        if n == 0 {
            continue;
        }
        let denom = 1.0 / n as f32;
        vertices[i].tangent = (tangents[i] * denom).into();
        vertices[i].bitangent = (bitangents[i] * denom).into();
    }
}
