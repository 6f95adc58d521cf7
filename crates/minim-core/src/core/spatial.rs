use crate::core::models::workspace::AtomIndex;
use nalgebra::Point3;

/// Bounded-radius, bounded-count proximity queries over workspace positions.
///
/// The pipeline treats the nearest-neighbor index as an injected capability: the
/// host scene usually brings its own accelerated structure (octree, grid), and
/// the selector only relies on this interface. Implementations must be
/// deterministic for a fixed insertion order so selection output is
/// reproducible.
pub trait NeighborIndex {
    /// Registers an atom at a workspace-absolute position.
    fn insert(&mut self, id: AtomIndex, position: Point3<f64>);

    /// Returns up to `limit` atom ids within `radius` of `position`,
    /// closest first.
    fn nearest(&self, position: &Point3<f64>, radius: f64, limit: usize) -> Vec<AtomIndex>;
}

/// Brute-force reference implementation of [`NeighborIndex`].
///
/// Linear scan over all inserted atoms. Fine for the selection sizes an
/// interactive run deals with; hosts with large scenes supply their own index.
#[derive(Debug, Default)]
pub struct LinearIndex {
    entries: Vec<(AtomIndex, Point3<f64>)>,
}

impl NeighborIndex for LinearIndex {
    fn insert(&mut self, id: AtomIndex, position: Point3<f64>) {
        self.entries.push((id, position));
    }

    fn nearest(&self, position: &Point3<f64>, radius: f64, limit: usize) -> Vec<AtomIndex> {
        let mut hits: Vec<(f64, AtomIndex)> = self
            .entries
            .iter()
            .filter_map(|(id, p)| {
                let dist = (p - position).norm();
                (dist <= radius).then_some((dist, *id))
            })
            .collect();
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        hits.into_iter().take(limit).map(|(_, id)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_respects_radius() {
        let mut index = LinearIndex::default();
        index.insert(1, Point3::new(0.0, 0.0, 0.0));
        index.insert(2, Point3::new(10.0, 0.0, 0.0));

        let hits = index.nearest(&Point3::new(1.0, 0.0, 0.0), 2.0, 10);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn nearest_respects_limit_and_orders_by_distance() {
        let mut index = LinearIndex::default();
        index.insert(1, Point3::new(3.0, 0.0, 0.0));
        index.insert(2, Point3::new(1.0, 0.0, 0.0));
        index.insert(3, Point3::new(2.0, 0.0, 0.0));

        let hits = index.nearest(&Point3::origin(), 5.0, 2);
        assert_eq!(hits, vec![2, 3]);
    }

    #[test]
    fn empty_index_returns_no_hits() {
        let index = LinearIndex::default();
        assert!(index.nearest(&Point3::origin(), 100.0, 5).is_empty());
    }

    #[test]
    fn boundary_distance_is_included() {
        let mut index = LinearIndex::default();
        index.insert(7, Point3::new(7.0, 0.0, 0.0));
        let hits = index.nearest(&Point3::origin(), 7.0, 1);
        assert_eq!(hits, vec![7]);
    }
}
