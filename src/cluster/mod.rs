//! Centroid-based clustering.
//!
//! Every algorithm here runs the same loop: assign each sample to its
//! nearest centroid, recompute each centroid from its members, repeat until
//! the centroids stop moving. They differ only in how a centroid is
//! recomputed, which is selected by [`Update`] when the engine is built.
//!
//! ## K-means
//!
//! The new centroid is the mean of the members. Cheap (O(n·d) per round)
//! and minimizes the within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! Centroids are synthetic points; in a color palette they are colors that
//! may not appear in the source image.
//!
//! ## K-medoids
//!
//! The new centroid is the member with the smallest summed distance to the
//! other members. Every centroid is a real sample and outliers pull on it
//! far less, but each round costs O(n²·d) per cluster.
//!
//! ## Batch k-medoids
//!
//! Same rule, applied to a random subsample of each large cluster. Much
//! cheaper per round, slightly noisier medoids.
//!
//! | Update | Centroid | Round cost per cluster |
//! |--------|----------|------------------------|
//! | Mean | mean of members | O(n·d) |
//! | Medoid | best member | O(n²·d) |
//! | BatchMedoid | best sampled member | O(b²·d) |
//!
//! ## Usage
//!
//! ```rust
//! use centroid::cluster::{Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! let labels = Kmeans::kmedoids(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[2], labels[3]);
//! ```

mod kmeans;
mod traits;
pub mod update;

pub use kmeans::{assign, to_matrix, Fit, Init, Kmeans};
pub use traits::{CentroidClustering, Clustering};
pub use update::Update;
