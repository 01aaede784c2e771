//! Palette compression: replace every sample by its cluster's centroid.
//!
//! The clustering core only sees flat `n × d` matrices. For RGB images the
//! helpers here do the boundary work: interleaved `u8` pixels become an
//! `n × 3` matrix scaled to `[0, 1]`, and the compressed matrix is scaled
//! back to bytes. Reading, writing and reshaping image files stays with the
//! caller.
//!
//! ```rust
//! use centroid::{compress, Init, Kmeans};
//! use ndarray::array;
//!
//! let data = array![[0.0f32, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
//! let fit = Kmeans::new(2)
//!     .with_init(Init::Indices(vec![0, 2]))
//!     .fit(data.view())
//!     .unwrap();
//!
//! let out = compress(fit.centroids.view(), &fit.labels).unwrap();
//! assert_eq!(out.row(1), fit.centroids.row(fit.labels[1]));
//! ```

use crate::cluster::{Fit, Kmeans};
use crate::error::{Error, Result};
use log::debug;
use ndarray::{Array2, ArrayView2, Axis};

/// Channels per pixel.
pub const RGB_CHANNELS: usize = 3;

/// Build the matrix whose row `i` is `centroids[labels[i]]`.
pub fn compress(centroids: ArrayView2<'_, f32>, labels: &[usize]) -> Result<Array2<f32>> {
    let k = centroids.nrows();
    if let Some(&bad) = labels.iter().find(|&&c| c >= k) {
        return Err(Error::invalid(
            "labels",
            format!("cluster {bad} out of range for {k} centroids"),
        ));
    }
    Ok(centroids.select(Axis(0), labels))
}

/// Interleaved RGB bytes to an `n × 3` matrix in `[0, 1]`.
pub fn pixels_to_features(pixels: &[u8]) -> Result<Array2<f32>> {
    if pixels.is_empty() {
        return Err(Error::EmptyInput);
    }
    if pixels.len() % RGB_CHANNELS != 0 {
        return Err(Error::invalid(
            "pixels",
            format!(
                "buffer length {} is not a multiple of {RGB_CHANNELS}",
                pixels.len()
            ),
        ));
    }
    let scaled: Vec<f32> = pixels.iter().map(|&p| p as f32 / 255.0).collect();
    Array2::from_shape_vec((pixels.len() / RGB_CHANNELS, RGB_CHANNELS), scaled)
        .map_err(|e| Error::Other(e.to_string()))
}

/// Inverse of [`pixels_to_features`]: rescale to `[0, 255]`, round and clamp.
pub fn features_to_pixels(features: ArrayView2<'_, f32>) -> Result<Vec<u8>> {
    if features.ncols() != RGB_CHANNELS {
        return Err(Error::ShapeMismatch {
            expected: RGB_CHANNELS,
            found: features.ncols(),
        });
    }
    Ok(features
        .iter()
        .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect())
}

/// Quantize an RGB pixel buffer to `engine`'s k colors.
///
/// Returns the compressed pixels (same length and order as the input) and
/// the fit that produced the palette.
pub fn compress_pixels(pixels: &[u8], engine: &Kmeans) -> Result<(Vec<u8>, Fit)> {
    let features = pixels_to_features(pixels)?;
    let fit = engine.fit(features.view())?;
    let compressed = compress(fit.centroids.view(), &fit.labels)?;
    debug!(
        "compressed {} pixels to {} colors in {} iterations",
        features.nrows(),
        fit.k(),
        fit.iterations
    );
    Ok((features_to_pixels(compressed.view())?, fit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Init;
    use ndarray::array;

    #[test]
    fn test_compress_maps_rows_to_centroids() {
        let centroids = array![[0.0f32, 0.5], [10.0, 0.5]];
        let labels = vec![1, 0, 0, 1, 1];
        let out = compress(centroids.view(), &labels).unwrap();

        assert_eq!(out.nrows(), labels.len());
        for (row, &c) in out.outer_iter().zip(&labels) {
            assert_eq!(row, centroids.row(c));
        }
    }

    #[test]
    fn test_compress_round_trip_with_fit() {
        let data = array![[0.0f32, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]];
        let fit = Kmeans::kmedoids(2)
            .with_init(Init::Indices(vec![0, 2]))
            .fit(data.view())
            .unwrap();
        let out = compress(fit.centroids.view(), &fit.labels).unwrap();
        assert_eq!(out, array![[0.0f32, 0.0], [0.0, 0.0], [10.0, 0.0], [10.0, 0.0]]);
    }

    #[test]
    fn test_compress_rejects_out_of_range_label() {
        let centroids = array![[0.0f32], [1.0]];
        assert!(matches!(
            compress(centroids.view(), &[0, 2]),
            Err(Error::InvalidParameter { name: "labels", .. })
        ));
    }

    #[test]
    fn test_pixel_scaling_round_trip() {
        let pixels = vec![0u8, 128, 255, 10, 20, 30];
        let features = pixels_to_features(&pixels).unwrap();
        assert_eq!(features.dim(), (2, 3));
        assert_eq!(features[[0, 2]], 1.0);
        assert_eq!(features_to_pixels(features.view()).unwrap(), pixels);
    }

    #[test]
    fn test_pixel_buffer_must_be_rgb() {
        assert_eq!(pixels_to_features(&[]), Err(Error::EmptyInput));
        let err = pixels_to_features(&[1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "pixels", .. }));
        assert!(err.to_string().contains("length 4"));
        assert!(features_to_pixels(array![[0.5f32, 0.5]].view()).is_err());
    }

    #[test]
    fn test_features_to_pixels_clamps() {
        let out = features_to_pixels(array![[-0.2f32, 0.5, 1.7]].view()).unwrap();
        assert_eq!(out, vec![0, 128, 255]);
    }

    #[test]
    fn test_compress_pixels_uses_k_colors() {
        // Two reds, two blues, one near-red.
        let pixels = vec![
            250, 0, 0, //
            255, 5, 0, //
            0, 0, 250, //
            0, 10, 255, //
            240, 10, 10,
        ];
        let engine = Kmeans::kmedoids(2).with_seed(7);
        let (out, fit) = compress_pixels(&pixels, &engine).unwrap();

        assert_eq!(out.len(), pixels.len());
        let colors: std::collections::HashSet<&[u8]> = out.chunks(3).collect();
        assert_eq!(colors.len(), 2);
        // Medoid palettes only contain colors from the input.
        for color in &colors {
            assert!(pixels.chunks(3).any(|p| p == *color));
        }
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[4]);
        assert_eq!(fit.labels[2], fit.labels[3]);
    }
}
