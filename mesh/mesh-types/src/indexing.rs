//! Conversion between indexed and expanded vertex layouts.

use std::collections::BTreeMap;

use crate::{Mesh, TexCoord, Vertex};

impl Mesh {
    /// Share identical vertices through an index buffer.
    ///
    /// Two vertices are identical when the bit patterns of their whole
    /// attribute tuples match. The unique vertices are stored in key order.
    /// Does nothing when the mesh is already indexed.
    ///
    /// ```
    /// use mesh_types::shapes::unit_cube;
    ///
    /// let mut cube = unit_cube();
    /// cube.convert_to_expanded();
    /// assert_eq!(cube.vertex_count(), 36);
    /// cube.convert_to_indexed();
    /// assert_eq!(cube.vertex_count(), 8);
    /// assert_eq!(cube.faces_count(), 12);
    /// ```
    pub fn convert_to_indexed(&mut self) {
        if self.is_indexed() || self.is_empty() {
            return;
        }
        let keys: Vec<Vec<u64>> = (0..self.vertex_count())
            .map(|i| vertex_key(&self.vertex(i)))
            .collect();

        let mut unique: BTreeMap<&[u64], u32> = BTreeMap::new();
        for (i, key) in keys.iter().enumerate() {
            unique.entry(key.as_slice()).or_insert(id(i));
        }
        let mut representatives = Vec::with_capacity(unique.len());
        for (new_id, slot) in unique.values_mut().enumerate() {
            representatives.push(*slot);
            *slot = id(new_id);
        }
        let indices: Vec<u32> = keys.iter().map(|k| unique[k.as_slice()]).collect();

        self.gather_vertices(&representatives);
        self.replace_indices(indices);
    }

    /// Give every face its own vertices and drop the index buffer.
    /// Does nothing when the mesh is already expanded.
    pub fn convert_to_expanded(&mut self) {
        if !self.is_indexed() {
            return;
        }
        let ids = self.indices().to_vec();
        self.gather_vertices(&ids);
    }
}

fn vertex_key(v: &Vertex) -> Vec<u64> {
    let a = &v.attributes;
    let mut key: Vec<u64> = v.position.iter().map(|c| c.to_bits()).collect();
    for dir in [a.normal, a.tangent, a.bitangent].into_iter().flatten() {
        key.extend(dir.iter().map(|c| c.to_bits()));
    }
    match a.uv {
        Some(TexCoord::Uv(p)) => key.extend(p.iter().map(|c| c.to_bits())),
        Some(TexCoord::Uv3(p)) => key.extend(p.iter().map(|c| c.to_bits())),
        None => {}
    }
    if let Some(bones) = a.bones {
        key.extend(bones.indices.iter().map(|&i| u64::from(i)));
        key.extend(bones.weights.iter().map(|c| c.to_bits()));
    }
    key
}

#[allow(clippy::cast_possible_truncation)]
fn id(i: usize) -> u32 {
    i as u32
}
