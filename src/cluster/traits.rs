//! Clustering traits.

use super::kmeans::Fit;
use crate::error::Result;

/// Trait for hard clustering algorithms.
pub trait Clustering {
    /// Fit the model to data and return cluster assignments.
    ///
    /// Returns a vector of cluster labels, one per input point, each in
    /// `0..n_clusters()`.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}

/// Hard clustering where every cluster has a representative vector.
///
/// Row `c` of [`Fit::centroids`] represents cluster `c`, so a fit can be
/// used for palette compression or to predict labels for unseen points.
pub trait CentroidClustering: Clustering {
    /// Fit and return the centroids together with the labels.
    fn fit_centroids(&self, data: &[Vec<f32>]) -> Result<Fit>;
}
