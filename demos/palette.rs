use centroid::{compress_pixels, Kmeans, Update};
use std::collections::BTreeSet;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // A synthetic 96x64 RGB image: two diagonal gradients plus a bright patch.
    // Decoding real image files is left to an image crate.
    let (width, height) = (96usize, 64usize);
    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let patch = (40..56).contains(&x) && (20..36).contains(&y);
            let (r, g, b) = if patch {
                (250, 230, 40)
            } else {
                ((x * 255 / width) as u8, (y * 255 / height) as u8, 128)
            };
            pixels.extend_from_slice(&[r, g, b]);
        }
    }

    let k = 16;
    for update in [Update::Mean, Update::Medoid, Update::batch_medoid()] {
        let engine = Kmeans::new(k).with_update(update).with_seed(1);

        let start = Instant::now();
        let (compressed, fit) = compress_pixels(&pixels, &engine)?;
        let elapsed = start.elapsed();

        let palette: BTreeSet<&[u8]> = compressed.chunks(3).collect();
        let err: f64 = pixels
            .iter()
            .zip(&compressed)
            .map(|(&a, &b)| (a as f64 - b as f64).powi(2))
            .sum::<f64>()
            / pixels.len() as f64;

        println!(
            "{update}: {} colors, {} iterations, mse={err:.1}, time={elapsed:.2?}",
            palette.len(),
            fit.iterations
        );
    }

    Ok(())
}
