//! Centroid update rules.
//!
//! After every assignment step each non-empty cluster gets a new centroid
//! computed from its members only:
//!
//! | Rule          | New centroid                                   | Cost per cluster |
//! |---------------|------------------------------------------------|------------------|
//! | `Mean`        | arithmetic mean of the members                 | O(n·d)           |
//! | `Medoid`      | member with the smallest total distance to all | O(n²·d)          |
//! | `BatchMedoid` | medoid of a random subsample of the members    | O(b²·d)          |
//!
//! # Medoids
//!
//! The medoid of a set `C` is
//!
//! ```text
//! m = argmin_{x ∈ C} Σ_{y ∈ C} d(x, y)
//! ```
//!
//! Unlike the mean it is always one of the members, so it is robust to
//! outliers and works for any metric. The price is the quadratic distance
//! sum. Row sums are computed in blocks of [`MEDOID_BLOCK_ROWS`] rows, so the
//! transient distance matrix holds at most `MEDOID_BLOCK_ROWS × n` entries
//! instead of `n × n`.
//!
//! # Batch medoids
//!
//! For large clusters `BatchMedoid` draws `batch_size` members uniformly
//! without replacement and returns the exact medoid of that subsample. The
//! result is still a member of the cluster, but it may be slightly worse than
//! the true medoid and can wander between iterations, so fits may need more
//! iterations (or hit `max_iter`) before the movement falls under `tol`.
//! Clusters no larger than `batch_size` are handled exactly.

use crate::distance::{pairwise_distances, Metric};
use crate::error::{Error, Result};
use core::fmt;
use core::str::FromStr;
use ndarray::{s, Array1, ArrayView2, Axis};
use rand::Rng;

/// Default subsample size for [`Update::BatchMedoid`].
pub const DEFAULT_BATCH_SIZE: usize = 512;

/// Rows of the distance matrix materialized at once during medoid search.
pub const MEDOID_BLOCK_ROWS: usize = 256;

/// How a cluster's new centroid is derived from its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Update {
    /// Arithmetic mean (k-means).
    #[default]
    Mean,
    /// Exact medoid (k-medoids).
    Medoid,
    /// Medoid of a random subsample of at most `batch_size` members.
    BatchMedoid {
        /// Subsample size.
        batch_size: usize,
    },
}

impl Update {
    /// Batch medoid with [`DEFAULT_BATCH_SIZE`].
    pub fn batch_medoid() -> Self {
        Update::BatchMedoid {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Identifier accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Update::Mean => "mean",
            Update::Medoid => "medoid",
            Update::BatchMedoid { .. } => "medoid-batch",
        }
    }

    /// Whether every centroid produced by this rule is a data point.
    pub fn yields_data_points(&self) -> bool {
        !matches!(self, Update::Mean)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Update::BatchMedoid { batch_size: 0 } = self {
            return Err(Error::invalid("batch_size", "must be >= 1"));
        }
        Ok(())
    }

    /// Compute a new centroid from the members of one cluster.
    ///
    /// `points` must be non-empty; the engine keeps the previous centroid of
    /// an empty cluster and never calls this for it.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        points: ArrayView2<'_, f32>,
        metric: Metric,
        rng: &mut R,
    ) -> Result<Array1<f32>> {
        if points.nrows() == 0 {
            return Err(Error::EmptyInput);
        }
        match *self {
            Update::Mean => mean(points),
            Update::Medoid => Ok(points.row(medoid(points, metric)?).to_owned()),
            Update::BatchMedoid { batch_size } => {
                let idx = batch_medoid(points, metric, batch_size, rng)?;
                Ok(points.row(idx).to_owned())
            }
        }
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::BatchMedoid { batch_size } => write!(f, "medoid-batch({batch_size})"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Update {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" | "kmeans" => Ok(Update::Mean),
            "medoid" | "kmedoids" => Ok(Update::Medoid),
            "medoid-batch" | "batch-medoid" => Ok(Update::batch_medoid()),
            other => Err(Error::invalid(
                "update",
                format!("unknown update strategy '{other}'"),
            )),
        }
    }
}

/// Arithmetic mean of the rows of `points`.
pub fn mean(points: ArrayView2<'_, f32>) -> Result<Array1<f32>> {
    points.mean_axis(Axis(0)).ok_or(Error::EmptyInput)
}

/// Index (into `points`) of the medoid. Ties go to the lowest index.
pub fn medoid(points: ArrayView2<'_, f32>, metric: Metric) -> Result<usize> {
    let n = points.nrows();
    if n == 0 {
        return Err(Error::EmptyInput);
    }

    let mut best = 0;
    let mut best_sum = f64::INFINITY;
    let mut start = 0;
    while start < n {
        let end = (start + MEDOID_BLOCK_ROWS).min(n);
        let block = pairwise_distances(points.slice(s![start..end, ..]), points, metric)?;
        for (offset, row) in block.outer_iter().enumerate() {
            let total: f64 = row.iter().map(|&d| d as f64).sum();
            if total < best_sum {
                best_sum = total;
                best = start + offset;
            }
        }
        start = end;
    }

    Ok(best)
}

/// Index (into `points`) of the medoid of a random subsample of at most
/// `batch_size` rows.
///
/// The subsample keeps the original row order, so ties still resolve to the
/// lowest index among the sampled rows.
pub fn batch_medoid<R: Rng + ?Sized>(
    points: ArrayView2<'_, f32>,
    metric: Metric,
    batch_size: usize,
    rng: &mut R,
) -> Result<usize> {
    let n = points.nrows();
    if batch_size == 0 {
        return Err(Error::invalid("batch_size", "must be >= 1"));
    }
    if n <= batch_size {
        return medoid(points, metric);
    }

    let mut sample = rand::seq::index::sample(rng, n, batch_size).into_vec();
    sample.sort_unstable();
    let subset = points.select(Axis(0), &sample);
    let local = medoid(subset.view(), metric)?;
    Ok(sample[local])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mean_of_points() {
        let pts = array![[0.0f32, 0.0], [0.0, 1.0], [3.0, 2.0]];
        let c = mean(pts.view()).unwrap();
        assert_eq!(c, array![1.0f32, 1.0]);
    }

    #[test]
    fn test_medoid_picks_central_point() {
        // The outlier drags the mean but not the medoid.
        let pts = array![[0.0f32, 0.0], [1.0, 0.0], [2.0, 0.0], [100.0, 0.0]];
        assert_eq!(medoid(pts.view(), Metric::Euclidean).unwrap(), 1);
    }

    #[test]
    fn test_medoid_tie_breaks_to_lowest_index() {
        let pts = array![[0.0f32, 1.0], [0.0, 0.0]];
        assert_eq!(medoid(pts.view(), Metric::Euclidean).unwrap(), 0);

        let pts = array![[5.0f32, 5.0], [5.0, 5.0], [5.0, 5.0]];
        assert_eq!(medoid(pts.view(), Metric::Euclidean).unwrap(), 0);
    }

    #[test]
    fn test_medoid_single_point() {
        let pts = array![[3.0f32, 4.0]];
        assert_eq!(medoid(pts.view(), Metric::Euclidean).unwrap(), 0);
    }

    #[test]
    fn test_medoid_spans_multiple_blocks() {
        // More rows than one block; the center of a symmetric line is the medoid.
        let n = MEDOID_BLOCK_ROWS * 2 + 1;
        let pts = Array2::from_shape_fn((n, 1), |(i, _)| i as f32);
        assert_eq!(medoid(pts.view(), Metric::Euclidean).unwrap(), n / 2);
    }

    #[test]
    fn test_apply_medoid_is_bit_identical_member() {
        let pts = array![[0.1f32, 0.7], [0.3, 0.2], [0.25, 0.3], [0.9, 0.1]];
        let mut rng = StdRng::seed_from_u64(7);
        let c = Update::Medoid
            .apply(pts.view(), Metric::Euclidean, &mut rng)
            .unwrap();
        assert!(pts.outer_iter().any(|row| row == c));
    }

    #[test]
    fn test_batch_medoid_small_cluster_is_exact() {
        let pts = array![[0.0f32, 0.0], [1.0, 0.0], [2.0, 0.0], [100.0, 0.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let idx = batch_medoid(pts.view(), Metric::Euclidean, 16, &mut rng).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_batch_medoid_returns_member_of_large_cluster() {
        let pts = Array2::from_shape_fn((200, 2), |(i, j)| ((i * 7 + j * 13) % 31) as f32);
        let mut rng = StdRng::seed_from_u64(99);
        let c = Update::BatchMedoid { batch_size: 20 }
            .apply(pts.view(), Metric::Euclidean, &mut rng)
            .unwrap();
        assert!(pts.outer_iter().any(|row| row == c));
    }

    #[test]
    fn test_batch_medoid_deterministic_with_seed() {
        let pts = Array2::from_shape_fn((100, 3), |(i, j)| ((i * 31 + j * 17) % 23) as f32);
        let a = batch_medoid(pts.view(), Metric::Euclidean, 10, &mut StdRng::seed_from_u64(5));
        let b = batch_medoid(pts.view(), Metric::Euclidean, 10, &mut StdRng::seed_from_u64(5));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_apply_empty_cluster_is_error() {
        let pts = Array2::<f32>::zeros((0, 2));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Update::Mean.apply(pts.view(), Metric::Euclidean, &mut rng),
            Err(Error::EmptyInput)
        );
    }

    #[test]
    fn test_update_parse_and_validate() {
        assert_eq!("mean".parse::<Update>().unwrap(), Update::Mean);
        assert_eq!("medoid".parse::<Update>().unwrap(), Update::Medoid);
        assert_eq!(
            "medoid-batch".parse::<Update>().unwrap(),
            Update::BatchMedoid {
                batch_size: DEFAULT_BATCH_SIZE
            }
        );
        assert!("median".parse::<Update>().is_err());
        assert!(Update::BatchMedoid { batch_size: 0 }.validate().is_err());
        assert!(Update::Medoid.validate().is_ok());
    }
}
