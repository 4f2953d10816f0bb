//! Local structures: for every minutia, a chain of edge descriptors to its
//! nearest neighbours, ordered by ascending distance.

use crate::consts::{neighbour_count, neighbour_radius};
use crate::math::euclidean;
use crate::types::{EdgeDescriptor, LocalStructure, Minutia};

pub fn build_local_structures(minutiae: &[Minutia]) -> Vec<LocalStructure> {
    let limit = neighbour_count();
    let radius = neighbour_radius();

    minutiae
        .iter()
        .map(|center| {
            let mut candidates: Vec<(f32, usize)> = minutiae
                .iter()
                .enumerate()
                .filter(|(_, other)| other.id != center.id)
                .map(|(index, other)| {
                    (
                        euclidean((center.y, center.x), (other.y, other.x)),
                        index,
                    )
                })
                .filter(|&(distance, _)| distance <= radius)
                .collect();
            candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            candidates.truncate(limit);

            let mut edges: Vec<EdgeDescriptor> = Vec::with_capacity(candidates.len());
            for &(_, index) in candidates.iter() {
                let previous = edges.last().cloned();
                edges.push(EdgeDescriptor::new(
                    center,
                    &minutiae[index],
                    previous.as_ref(),
                ));
            }

            LocalStructure {
                center: center.id,
                edges,
            }
        })
        .collect()
}
