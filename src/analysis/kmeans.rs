use anyhow::{Result, bail};
use rand::Rng;
use rand::rngs::StdRng;

pub(crate) type Rgb = [f32; 3];

#[derive(Debug, Clone, Copy)]
pub(crate) struct KMeansParams {
    pub(crate) attempts: u32,
    pub(crate) max_iterations: u32,
    pub(crate) epsilon: f32,
}

#[derive(Debug, Clone)]
pub(crate) struct ClusterResult {
    pub(crate) centers: [Rgb; 2],
    pub(crate) labels: Vec<u8>,
    pub(crate) compactness: f32,
}

impl ClusterResult {
    pub(crate) fn counts(&self) -> [usize; 2] {
        let ones = self.labels.iter().filter(|label| **label == 1).count();
        [self.labels.len() - ones, ones]
    }
}

/// Two-cluster k-means over RGB samples.
///
/// Each attempt starts from two centers drawn uniformly inside the samples'
/// per-channel bounding box and iterates until no center moves more than
/// `epsilon` or `max_iterations` is reached. The attempt with the smallest
/// sum of squared distances wins; earlier attempts win ties.
pub(crate) fn two_means(
    samples: &[Rgb],
    params: KMeansParams,
    rng: &mut StdRng,
) -> Result<ClusterResult> {
    if samples.is_empty() {
        bail!("no samples to cluster");
    }
    if samples.iter().flatten().any(|value| !value.is_finite()) {
        bail!("non-finite sample value");
    }
    let (low, high) = channel_bounds(samples);
    let epsilon_sq = params.epsilon * params.epsilon;

    let mut best: Option<ClusterResult> = None;
    for _ in 0..params.attempts.max(1) {
        let mut centers = [random_center(&low, &high, rng), random_center(&low, &high, rng)];
        let mut labels = vec![0u8; samples.len()];
        for _ in 0..params.max_iterations.max(1) {
            assign(samples, &centers, &mut labels);
            let updated = recompute_centers(samples, &labels, &centers);
            let shift = updated
                .iter()
                .zip(centers.iter())
                .map(|(a, b)| distance_sq(a, b))
                .fold(0.0f32, f32::max);
            centers = updated;
            if shift <= epsilon_sq {
                break;
            }
        }
        let compactness = assign(samples, &centers, &mut labels);
        if !compactness.is_finite() {
            bail!("clustering diverged");
        }
        if best
            .as_ref()
            .is_none_or(|current| compactness < current.compactness)
        {
            best = Some(ClusterResult {
                centers,
                labels,
                compactness,
            });
        }
    }

    match best {
        Some(result) => Ok(result),
        None => bail!("clustering produced no result"),
    }
}

fn channel_bounds(samples: &[Rgb]) -> (Rgb, Rgb) {
    let mut low = [f32::MAX; 3];
    let mut high = [f32::MIN; 3];
    for sample in samples {
        for channel in 0..3 {
            low[channel] = low[channel].min(sample[channel]);
            high[channel] = high[channel].max(sample[channel]);
        }
    }
    (low, high)
}

fn random_center(low: &Rgb, high: &Rgb, rng: &mut StdRng) -> Rgb {
    let mut center = [0.0; 3];
    for channel in 0..3 {
        center[channel] = rng.gen_range(low[channel]..=high[channel]);
    }
    center
}

/// Labels every sample with its nearest center (ties go to cluster 0) and
/// returns the total squared distance.
fn assign(samples: &[Rgb], centers: &[Rgb; 2], labels: &mut [u8]) -> f32 {
    let mut total = 0.0f32;
    for (sample, label) in samples.iter().zip(labels.iter_mut()) {
        let d0 = distance_sq(sample, &centers[0]);
        let d1 = distance_sq(sample, &centers[1]);
        if d1 < d0 {
            *label = 1;
            total += d1;
        } else {
            *label = 0;
            total += d0;
        }
    }
    total
}

// Empty clusters keep their previous center.
fn recompute_centers(samples: &[Rgb], labels: &[u8], previous: &[Rgb; 2]) -> [Rgb; 2] {
    let mut sums = [[0.0f64; 3]; 2];
    let mut counts = [0usize; 2];
    for (sample, label) in samples.iter().zip(labels) {
        let idx = usize::from(*label);
        counts[idx] += 1;
        for channel in 0..3 {
            sums[idx][channel] += f64::from(sample[channel]);
        }
    }
    let mut centers = *previous;
    for idx in 0..2 {
        if counts[idx] == 0 {
            continue;
        }
        for channel in 0..3 {
            centers[idx][channel] = (sums[idx][channel] / counts[idx] as f64) as f32;
        }
    }
    centers
}

fn distance_sq(a: &Rgb, b: &Rgb) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}
