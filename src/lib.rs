//! # centroid
//!
//! Centroid-based clustering over fixed-dimension `f32` feature vectors:
//! k-means, k-medoids and a subsampling batch k-medoids, sharing one
//! assign/update loop. Plus the palette-compression glue that maps a fit back
//! onto the samples.
//!
//! ```rust
//! use centroid::{compress, Kmeans};
//! use ndarray::array;
//!
//! let data = array![[0.0f32, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
//! let fit = Kmeans::kmedoids(2).with_seed(7).fit(data.view()).unwrap();
//!
//! assert_eq!(fit.centroids.nrows(), 2);
//! let compressed = compress(fit.centroids.view(), &fit.labels).unwrap();
//! assert_eq!(compressed.nrows(), 4);
//! ```
//!
//! Enable the `parallel` feature to spread distance computation over rayon's
//! thread pool. Results are identical either way.

pub mod cluster;
pub mod compress;
pub mod distance;
/// Error types used across `centroid`.
pub mod error;

pub use cluster::{assign, CentroidClustering, Clustering, Fit, Init, Kmeans, Update};
pub use compress::{compress, compress_pixels, features_to_pixels, pixels_to_features};
pub use distance::{pairwise_distances, Metric};
pub use error::{Error, Result};
