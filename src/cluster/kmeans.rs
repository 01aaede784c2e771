//! The assign/update loop shared by k-means and k-medoids.
//!
//! Partitions data into k clusters, each represented by a centroid. The
//! loop is Lloyd's algorithm (1957) with a pluggable update rule:
//!
//! 1. **Initialize**: pick k distinct samples as starting centroids
//! 2. **Assign**: each sample → nearest centroid (ties → lowest cluster index)
//! 3. **Update**: each non-empty cluster's centroid → [`Update`] of its members
//! 4. **Check**: stop when the summed centroid movement drops below `tol`,
//!    or after `max_iter` rounds
//!
//! With [`Update::Mean`] this is k-means and minimizes
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! which never increases from one round to the next. With
//! [`Update::Medoid`] every centroid is an actual sample (a medoid), which is
//! what palette quantization wants when the output colors must come from
//! the input image.
//!
//! # Cluster identity
//!
//! Cluster `c` in round `t` and round `t + 1` is the same evolving cluster.
//! A cluster that receives no samples keeps its previous centroid, so the
//! result always has exactly k centroids.
//!
//! # Reproducibility
//!
//! Randomness only enters through initialization (and the batch medoid
//! subsample). Set a seed with [`Kmeans::with_seed`] or pass a random source
//! to [`Kmeans::fit_with_rng`]. Each fit owns its whole working set, so
//! independent fits (e.g. restarts) can run on separate threads.

use super::traits::{CentroidClustering, Clustering};
use super::update::Update;
use crate::distance::{pairwise_distances, Metric};
use crate::error::{Error, Result};
use log::{debug, log, Level};
use ndarray::{Array2, ArrayView2, Axis};
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How the starting centroids are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Init {
    /// k distinct samples drawn uniformly at random.
    #[default]
    Random,
    /// k-means++: D²-weighted sampling, still k distinct samples.
    KmeansPlusPlus,
    /// Caller-chosen sample indices (exactly k, distinct, in range).
    Indices(Vec<usize>),
}

/// Centroid clustering engine (k-means, k-medoids, batch k-medoids).
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum assign/update rounds.
    max_iter: usize,
    /// Convergence threshold on summed centroid movement.
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
    metric: Metric,
    update: Update,
    init: Init,
    /// Report progress at `info` instead of `trace`.
    verbose: bool,
}

/// Terminal state of one fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    /// `k × d` centroids, row `c` belongs to cluster `c`.
    pub centroids: Array2<f32>,
    /// Cluster index per sample, from the last assignment step.
    pub labels: Vec<usize>,
    /// Completed assign/update rounds.
    pub iterations: usize,
    /// `false` when `max_iter` was reached first.
    pub converged: bool,
    /// Metric the fit was computed under.
    pub metric: Metric,
}

impl Kmeans {
    /// Create a k-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            tol: 1e-3,
            seed: None,
            metric: Metric::Euclidean,
            update: Update::Mean,
            init: Init::Random,
            verbose: false,
        }
    }

    /// Create a k-medoids clusterer.
    pub fn kmedoids(k: usize) -> Self {
        Self::new(k).with_update(Update::Medoid)
    }

    /// Create a batch k-medoids clusterer with the default batch size.
    pub fn batch_kmedoids(k: usize) -> Self {
        Self::new(k).with_update(Update::batch_medoid())
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the centroid update rule.
    pub fn with_update(mut self, update: Update) -> Self {
        self.update = update;
        self
    }

    /// Set the initialization policy.
    pub fn with_init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    /// Log per-iteration progress at `info` level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Configured update rule.
    pub fn update(&self) -> Update {
        self.update
    }

    /// Configured metric.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::invalid("k", "must be >= 1"));
        }
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(Error::invalid("tol", "must be finite and >= 0"));
        }
        if self.max_iter == 0 {
            return Err(Error::invalid("max_iter", "must be >= 1"));
        }
        self.update.validate()
    }

    /// Fit to `data` (rows are samples) using the configured seed.
    pub fn fit(&self, data: ArrayView2<'_, f32>) -> Result<Fit> {
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        self.fit_with_rng(data, &mut *rng)
    }

    /// Fit to `data` drawing all randomness from `rng`.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &self,
        data: ArrayView2<'_, f32>,
        rng: &mut R,
    ) -> Result<Fit> {
        self.validate()?;

        let n = data.nrows();
        let d = data.ncols();
        if n == 0 || d == 0 {
            return Err(Error::EmptyInput);
        }
        if self.k > n {
            return Err(Error::InsufficientSamples {
                requested: self.k,
                n_items: n,
            });
        }

        let seeds = self.initial_indices(data, rng)?;
        let mut centroids = data.select(Axis(0), &seeds);
        let mut labels = vec![0usize; n];
        let mut iterations = 0;
        let mut converged = false;

        let level = if self.verbose {
            Level::Info
        } else {
            Level::Trace
        };
        debug!(
            "fitting k={} n={} d={} update={} metric={} tol={} max_iter={}",
            self.k, n, d, self.update, self.metric, self.tol, self.max_iter
        );

        while iterations < self.max_iter {
            labels = assign(data, centroids.view(), self.metric)?;

            let mut members: Vec<Vec<usize>> = vec![Vec::new(); self.k];
            for (i, &c) in labels.iter().enumerate() {
                members[c].push(i);
            }

            let mut new_centroids = centroids.clone();
            let mut empty = 0;
            for (c, idx) in members.iter().enumerate() {
                if idx.is_empty() {
                    empty += 1;
                    continue;
                }
                let points = data.select(Axis(0), idx);
                let centroid = self.update.apply(points.view(), self.metric, rng)?;
                new_centroids.row_mut(c).assign(&centroid);
            }

            let shift: f64 = centroids
                .outer_iter()
                .zip(new_centroids.outer_iter())
                .map(|(old, new)| self.metric.between(&old, &new) as f64)
                .sum();

            centroids = new_centroids;
            iterations += 1;

            log!(
                level,
                "iteration {iterations}/{}: shift={shift:.6} empty_clusters={empty}",
                self.max_iter
            );

            if shift < self.tol {
                converged = true;
                break;
            }
        }

        if self.verbose {
            log!(
                Level::Info,
                "finished after {iterations} iterations (converged: {converged})"
            );
        } else {
            debug!("finished after {iterations} iterations (converged: {converged})");
        }

        Ok(Fit {
            centroids,
            labels,
            iterations,
            converged,
            metric: self.metric,
        })
    }

    fn initial_indices<R: Rng + ?Sized>(
        &self,
        data: ArrayView2<'_, f32>,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let n = data.nrows();
        match &self.init {
            Init::Random => Ok(rand::seq::index::sample(rng, n, self.k).into_vec()),
            Init::KmeansPlusPlus => Ok(plus_plus(data, self.k, self.metric, rng)),
            Init::Indices(indices) => {
                if indices.len() != self.k {
                    return Err(Error::invalid(
                        "init",
                        format!("expected {} indices, got {}", self.k, indices.len()),
                    ));
                }
                let mut seen = vec![false; n];
                for &i in indices {
                    if i >= n {
                        return Err(Error::invalid(
                            "init",
                            format!("index {i} out of range for {n} samples"),
                        ));
                    }
                    if std::mem::replace(&mut seen[i], true) {
                        return Err(Error::invalid("init", format!("duplicate index {i}")));
                    }
                }
                Ok(indices.clone())
            }
        }
    }
}

/// k-means++ seeding over sample indices.
///
/// Already-chosen samples (and exact duplicates of them) carry zero weight,
/// so the result never repeats an index.
fn plus_plus<R: Rng + ?Sized>(
    data: ArrayView2<'_, f32>,
    k: usize,
    metric: Metric,
    rng: &mut R,
) -> Vec<usize> {
    let n = data.nrows();
    let mut chosen = Vec::with_capacity(k);
    chosen.push(rng.random_range(0..n));

    let weight = |i: usize, c: usize| -> f64 {
        let d = metric.between(&data.row(i), &data.row(c)) as f64;
        d * d
    };
    let mut nearest: Vec<f64> = (0..n).map(|i| weight(i, chosen[0])).collect();

    while chosen.len() < k {
        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 {
            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = None;
            for (j, &w) in nearest.iter().enumerate() {
                if w <= 0.0 {
                    continue;
                }
                cumsum += w;
                selected = Some(j);
                if cumsum >= threshold {
                    break;
                }
            }
            // total > 0 guarantees at least one positive weight
            selected.unwrap_or(0)
        } else {
            // Every remaining sample duplicates a chosen one.
            let free: Vec<usize> = (0..n).filter(|i| !chosen.contains(i)).collect();
            free[rng.random_range(0..free.len())]
        };

        chosen.push(next);
        for (i, w) in nearest.iter_mut().enumerate() {
            *w = w.min(weight(i, next));
        }
    }

    chosen
}

/// Assign each row of `data` to its nearest centroid.
///
/// Ties go to the lowest cluster index, so the result is a pure function of
/// its inputs.
pub fn assign(
    data: ArrayView2<'_, f32>,
    centroids: ArrayView2<'_, f32>,
    metric: Metric,
) -> Result<Vec<usize>> {
    if centroids.nrows() == 0 {
        return Err(Error::EmptyInput);
    }
    let dist = pairwise_distances(data, centroids, metric)?;
    let nearest = |i: usize| {
        let mut best_cluster = 0;
        let mut best_dist = f32::INFINITY;
        for (c, &d) in dist.row(i).iter().enumerate() {
            if d < best_dist {
                best_dist = d;
                best_cluster = c;
            }
        }
        best_cluster
    };

    let mut labels = vec![0usize; data.nrows()];

    #[cfg(feature = "parallel")]
    labels
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, label)| *label = nearest(i));

    #[cfg(not(feature = "parallel"))]
    for (i, label) in labels.iter_mut().enumerate() {
        *label = nearest(i);
    }

    Ok(labels)
}

/// Convert row vectors into a `n × d` matrix, checking that all rows agree
/// on `d`.
pub fn to_matrix(data: &[Vec<f32>]) -> Result<Array2<f32>> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    let n = data.len();
    let d = data[0].len();

    let mut flat: Vec<f32> = Vec::with_capacity(n * d);
    for point in data {
        if point.len() != d {
            return Err(Error::ShapeMismatch {
                expected: d,
                found: point.len(),
            });
        }
        flat.extend(point);
    }
    Array2::from_shape_vec((n, d), flat).map_err(|e| Error::Other(e.to_string()))
}

impl Fit {
    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }

    /// Assign new samples to the fitted centroids.
    pub fn predict(&self, data: ArrayView2<'_, f32>) -> Result<Vec<usize>> {
        assign(data, self.centroids.view(), self.metric)
    }

    /// Number of samples per cluster.
    pub fn cluster_sizes(&self) -> Result<Vec<usize>> {
        self.check_labels()?;
        let mut sizes = vec![0; self.k()];
        for &c in &self.labels {
            sizes[c] += 1;
        }
        Ok(sizes)
    }

    /// Sum of distances from each sample to its cluster's centroid.
    pub fn within_cluster_distance(&self, data: ArrayView2<'_, f32>) -> Result<f64> {
        self.check_data(data)?;
        Ok(data
            .outer_iter()
            .zip(&self.labels)
            .map(|(x, &c)| self.metric.between(&x, &self.centroids.row(c)) as f64)
            .sum())
    }

    /// Sum of squared distances from each sample to its cluster's centroid
    /// (the k-means objective).
    pub fn inertia(&self, data: ArrayView2<'_, f32>) -> Result<f64> {
        self.check_data(data)?;
        Ok(data
            .outer_iter()
            .zip(&self.labels)
            .map(|(x, &c)| {
                let d = self.metric.between(&x, &self.centroids.row(c)) as f64;
                d * d
            })
            .sum())
    }

    fn check_labels(&self) -> Result<()> {
        let k = self.k();
        if let Some(&bad) = self.labels.iter().find(|&&c| c >= k) {
            return Err(Error::invalid(
                "labels",
                format!("cluster {bad} out of range for {k} centroids"),
            ));
        }
        Ok(())
    }

    fn check_data(&self, data: ArrayView2<'_, f32>) -> Result<()> {
        self.check_labels()?;
        if data.ncols() != self.centroids.ncols() {
            return Err(Error::ShapeMismatch {
                expected: self.centroids.ncols(),
                found: data.ncols(),
            });
        }
        if data.nrows() != self.labels.len() {
            return Err(Error::Other(format!(
                "expected {} samples, got {}",
                self.labels.len(),
                data.nrows()
            )));
        }
        Ok(())
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit_centroids(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

impl CentroidClustering for Kmeans {
    fn fit_centroids(&self, data: &[Vec<f32>]) -> Result<Fit> {
        let data_arr = to_matrix(data)?;
        self.fit(data_arr.view())
    }
}
