//! K-Means grouping over TF-IDF rows
//!
//! k-means++ seeding from a deterministic LCG, Lloyd iterations on squared
//! Euclidean distance, and `n_init` restarts drawing from one random stream.
//! The restart with the lowest inertia wins; the earliest wins ties.
//!
//! Clusters may end up empty. An empty cluster keeps its previous centroid
//! and nothing is relocated into it.

use ndarray::{Array2, ArrayView1, Axis};

use crate::config::ClusterConfig;

/// Fewest k-means++ restarts a fit will run, whatever the config asks for
pub const MIN_N_INIT: usize = 10;

/// Grouping errors
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterError {
    EmptyInput,
    InvalidClusterCount { requested: usize, available: usize },
}

impl std::fmt::Display for ClusterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterError::EmptyInput => write!(f, "Empty input"),
            ClusterError::InvalidClusterCount { requested, available } => write!(
                f,
                "Invalid cluster count: requested {}, {} rows available",
                requested, available
            ),
        }
    }
}

impl std::error::Error for ClusterError {}

// ============================================================================
// Random Stream
// ============================================================================

/// 64-bit LCG (Knuth MMIX multiplier)
#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Lcg { state: seed }
    }

    /// Uniform in [0, 1)
    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_index(&mut self, bound: usize) -> usize {
        ((self.next_f64() * bound as f64) as usize).min(bound - 1)
    }
}

// ============================================================================
// KMeans
// ============================================================================

/// Result of a k-means fit
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster id per row, each in [0, k)
    pub labels: Vec<usize>,
    pub centroids: Array2<f64>,
    /// Sum of squared distances from rows to their centroid
    pub inertia: f64,
    /// Lloyd iterations used by the winning restart
    pub iterations: usize,
}

impl KMeansFit {
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Row indices assigned to `cluster_id`, ascending
    pub fn members(&self, cluster_id: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == cluster_id)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct KMeans {
    n_clusters: usize,
    n_init: usize,
    max_iter: usize,
    tol: f64,
    seed: u64,
}

impl KMeans {
    /// K-means with the default restart/iteration settings
    pub fn new(n_clusters: usize) -> Self {
        Self::from_config(&ClusterConfig::default().with_num_clusters(n_clusters))
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        KMeans {
            n_clusters: config.num_clusters,
            n_init: config.n_init.max(MIN_N_INIT),
            max_iter: config.max_iter.max(1),
            tol: config.tol.max(0.0),
            seed: config.seed,
        }
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Restarts this instance runs; never below `MIN_N_INIT`
    pub fn n_init(&self) -> usize {
        self.n_init
    }

    /// Partition the rows of `data` into `n_clusters` groups
    pub fn fit(&self, data: &Array2<f64>) -> Result<KMeansFit, ClusterError> {
        let n = data.nrows();
        if n == 0 {
            return Err(ClusterError::EmptyInput);
        }
        if self.n_clusters == 0 || self.n_clusters > n {
            return Err(ClusterError::InvalidClusterCount {
                requested: self.n_clusters,
                available: n,
            });
        }

        let tol = self.tol * mean_feature_variance(data);
        let mut rng = Lcg::new(self.seed);
        let mut best: Option<KMeansFit> = None;

        for _ in 0..self.n_init {
            let initial = kmeans_plus_plus(data, self.n_clusters, &mut rng);
            let run = lloyd(data, initial, self.max_iter, tol);
            let better = best.as_ref().map_or(true, |b| run.inertia < b.inertia);
            if better {
                best = Some(run);
            }
        }

        best.ok_or(ClusterError::EmptyInput)
    }
}

// ============================================================================
// Internals
// ============================================================================

#[inline]
fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn mean_feature_variance(data: &Array2<f64>) -> f64 {
    data.var_axis(Axis(0), 0.0).mean().unwrap_or(0.0)
}

/// D²-weighted seeding
fn kmeans_plus_plus(data: &Array2<f64>, k: usize, rng: &mut Lcg) -> Array2<f64> {
    let n = data.nrows();
    let mut centroids = Array2::<f64>::zeros((k, data.ncols()));

    let first = rng.next_index(n);
    centroids.row_mut(0).assign(&data.row(first));

    let mut closest: Vec<f64> = data
        .rows()
        .into_iter()
        .map(|row| squared_distance(row, data.row(first)))
        .collect();

    for c in 1..k {
        let total: f64 = closest.iter().sum();
        let chosen = if total > 0.0 {
            let target = rng.next_f64() * total;
            let mut cumulative = 0.0;
            let mut pick = None;
            let mut last_positive = 0;
            for (i, &d) in closest.iter().enumerate() {
                if d <= 0.0 {
                    continue;
                }
                last_positive = i;
                cumulative += d;
                if cumulative > target {
                    pick = Some(i);
                    break;
                }
            }
            // rounding can leave the target just past the final sum
            pick.unwrap_or(last_positive)
        } else {
            // every row coincides with a chosen centroid
            rng.next_index(n)
        };

        centroids.row_mut(c).assign(&data.row(chosen));
        for (i, row) in data.rows().into_iter().enumerate() {
            let d = squared_distance(row, data.row(chosen));
            if d < closest[i] {
                closest[i] = d;
            }
        }
    }

    centroids
}

/// Nearest centroid per row (lowest id on ties) and the resulting inertia
fn assign(data: &Array2<f64>, centroids: &Array2<f64>) -> (Vec<usize>, f64) {
    let mut inertia = 0.0;
    let labels = data
        .rows()
        .into_iter()
        .map(|row| {
            let (best, dist) = centroids
                .rows()
                .into_iter()
                .enumerate()
                .map(|(c, centroid)| (c, squared_distance(row, centroid)))
                .fold((0, f64::INFINITY), |acc, cur| if cur.1 < acc.1 { cur } else { acc });
            inertia += dist;
            best
        })
        .collect();
    (labels, inertia)
}

fn lloyd(data: &Array2<f64>, mut centroids: Array2<f64>, max_iter: usize, tol: f64) -> KMeansFit {
    let k = centroids.nrows();
    let dim = data.ncols();
    let mut labels: Vec<usize> = Vec::new();
    let mut iterations = 0;

    for _ in 0..max_iter {
        iterations += 1;
        let (next_labels, _) = assign(data, &centroids);
        let stable = next_labels == labels;
        labels = next_labels;
        if stable {
            break;
        }

        let mut sums = Array2::<f64>::zeros((k, dim));
        let mut counts = vec![0usize; k];
        for (row, &c) in data.rows().into_iter().zip(labels.iter()) {
            counts[c] += 1;
            let mut sum = sums.row_mut(c);
            sum += &row;
        }

        let mut shift = 0.0;
        for c in 0..k {
            if counts[c] == 0 {
                continue;
            }
            let updated = sums.row(c).mapv(|v| v / counts[c] as f64);
            shift += squared_distance(updated.view(), centroids.row(c));
            centroids.row_mut(c).assign(&updated);
        }

        if shift <= tol {
            break;
        }
    }

    let (labels, inertia) = assign(data, &centroids);
    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}
