//! Pairwise distances between two sets of feature vectors.
//!
//! ## Public invariants (must never change)
//!
//! - **No silent shape coercion**: a feature-dimension mismatch is an error.
//! - **Pure**: output depends only on the two inputs and the metric.
//! - Either side may hold a single row; the result is then a row or column vector.
//!
//! ## Swappable (can change)
//!
//! - The set of metrics. Only Euclidean exists today; `Metric` is the seam.

use crate::{Error, Result};
use core::fmt;
use core::str::FromStr;
use ndarray::{Array2, ArrayView1, ArrayView2};

#[cfg(feature = "parallel")]
use ndarray::Zip;

/// Distance metric used for assignment and medoid selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// L2 norm of the difference vector.
    #[default]
    Euclidean,
}

impl Metric {
    /// Identifier accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
        }
    }

    /// Distance between two vectors of equal length.
    #[inline]
    pub fn between(&self, a: &ArrayView1<'_, f32>, b: &ArrayView1<'_, f32>) -> f32 {
        match self {
            Metric::Euclidean => euclidean(a, b),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            other => Err(Error::invalid("metric", format!("unknown metric '{other}'"))),
        }
    }
}

/// Euclidean distance.
#[inline]
pub fn euclidean(a: &ArrayView1<'_, f32>, b: &ArrayView1<'_, f32>) -> f32 {
    squared_euclidean(a, b).sqrt()
}

/// Squared Euclidean distance.
#[inline]
pub fn squared_euclidean(a: &ArrayView1<'_, f32>, b: &ArrayView1<'_, f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Compute the `(a.nrows() × b.nrows())` matrix of pairwise distances.
///
/// Entry `[i, j]` is `metric(a[i], b[j])`.
pub fn pairwise_distances(
    a: ArrayView2<'_, f32>,
    b: ArrayView2<'_, f32>,
    metric: Metric,
) -> Result<Array2<f32>> {
    if a.ncols() != b.ncols() {
        return Err(Error::ShapeMismatch {
            expected: a.ncols(),
            found: b.ncols(),
        });
    }

    let mut out = Array2::<f32>::zeros((a.nrows(), b.nrows()));

    #[cfg(feature = "parallel")]
    Zip::from(out.rows_mut())
        .and(a.rows())
        .par_for_each(|mut row, x| {
            for (j, d) in row.iter_mut().enumerate() {
                *d = metric.between(&x, &b.row(j));
            }
        });

    #[cfg(not(feature = "parallel"))]
    for ((i, j), d) in out.indexed_iter_mut() {
        *d = metric.between(&a.row(i), &b.row(j));
    }

    Ok(out)
}
