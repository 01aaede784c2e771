use centroid::{Kmeans, Update};
use ndarray::Array2;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=info shows per-iteration progress for the verbose runs.
    env_logger::init();

    // Five isotropic gaussian blobs in 3D, centers drawn in [-10, 10]^3.
    let (n_samples, n_features, n_centers, std_dev) = (5_000, 3, 5, 2.0f32);
    let mut rng = StdRng::seed_from_u64(0);
    let centers: Vec<Vec<f32>> = (0..n_centers)
        .map(|_| (0..n_features).map(|_| rng.random_range(-10.0..10.0)).collect())
        .collect();
    let noise = Normal::new(0.0f32, std_dev)?;
    let data = Array2::from_shape_fn((n_samples, n_features), |(i, j)| {
        centers[i % n_centers][j] + noise.sample(&mut rng)
    });

    for update in [Update::Mean, Update::Medoid, Update::batch_medoid()] {
        let engine = Kmeans::new(n_centers)
            .with_update(update)
            .with_seed(42)
            .with_verbose(true);

        let start = Instant::now();
        let fit = engine.fit(data.view())?;
        let elapsed = start.elapsed();

        println!(
            "{update}: {} iterations (converged: {}) in {:.2?}, sizes={:?}, wcd={:.1}",
            fit.iterations,
            fit.converged,
            elapsed,
            fit.cluster_sizes()?,
            fit.within_cluster_distance(data.view())?
        );
    }

    Ok(())
}
