//!
//! Principal component analysis of the membership matrix
//!
//! The matrix has few segments (rows) and many nodes (columns), so scores
//! are recovered from the eigendecomposition of the small row Gram matrix
//! of the column-centered data: `G = Xc Xc^T = U S^2 U^T` and the PC scores
//! are `U S`. Eigenpairs come from power iteration with deflation.
//!
use crate::hist::stat;
use crate::matrix::{ModuleMatrix, RowKey};
use crate::segment::ReferenceJump;
use log::info;
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

const POWER_ITER_MAX: usize = 500;

///
/// scores and explained variance of the top components
///
#[derive(Clone, Debug)]
pub struct Pca {
    /// n_rows x n_components
    pub scores: Array2<f64>,
    /// fraction of total variance per component
    pub explained: Vec<f64>,
}

///
/// Run PCA on a rows-as-samples 0/1 matrix.
///
/// Returns None when there are fewer than two rows or no columns, where a
/// decomposition is meaningless. `n_components` is clamped to the number of
/// rows.
///
pub fn pca(x: &Array2<f64>, n_components: usize) -> Option<Pca> {
    let n = x.nrows();
    if n < 2 || x.ncols() == 0 || n_components == 0 {
        return None;
    }
    let k = n_components.min(n);

    // center each column
    let mean = x.mean_axis(Axis(0))?;
    let xc = x - &mean.insert_axis(Axis(0));
    let mut gram = xc.dot(&xc.t());
    let total: f64 = gram.diag().sum();

    let mut scores = Array2::zeros((n, k));
    let mut explained = Vec::with_capacity(k);
    for c in 0..k {
        let (eigenvalue, eigenvector) = power_iteration(&gram);
        let scale = eigenvalue.max(0.0).sqrt();
        for i in 0..n {
            scores[[i, c]] = eigenvector[i] * scale;
        }
        explained.push(if total > 0.0 && eigenvalue > 0.0 {
            eigenvalue / total
        } else {
            0.0
        });
        deflate(&mut gram, eigenvalue, &eigenvector);
    }

    Some(Pca { scores, explained })
}

///
/// dominant eigenpair of a symmetric matrix
///
fn power_iteration(g: &Array2<f64>) -> (f64, Array1<f64>) {
    let n = g.nrows();
    let mut v: Array1<f64> = (0..n).map(|i| 1.0 / (i + 1) as f64).collect();
    let norm = v.dot(&v).sqrt();
    v /= norm;

    let mut eigenvalue = 0.0;
    for _ in 0..POWER_ITER_MAX {
        let mut w = g.dot(&v);
        eigenvalue = w.dot(&v);
        let norm = w.dot(&w).sqrt();
        if norm < 1e-15 {
            break;
        }
        w /= norm;
        let diff = (&w - &v).mapv(|d| d * d).sum();
        v = w;
        if diff < 1e-12 {
            break;
        }
    }
    (eigenvalue, v)
}

fn deflate(g: &mut Array2<f64>, eigenvalue: f64, eigenvector: &Array1<f64>) {
    let n = g.nrows();
    for i in 0..n {
        for j in 0..n {
            g[[i, j]] -= eigenvalue * eigenvector[i] * eigenvector[j];
        }
    }
}

///
/// Split segments into the two module types along PC1.
///
/// One-dimensional 2-means with centers initialized at the extreme scores,
/// iterated to a fixed point. Group 0 holds the smaller center. Degenerate
/// (constant) scores put everything in group 0.
///
pub fn split_two(pc1: &[f64]) -> Vec<usize> {
    let (_, _, min, max) = stat(pc1);
    if pc1.is_empty() || min == max {
        return vec![0; pc1.len()];
    }
    let (mut c0, mut c1) = (min, max);
    let mut groups = vec![0; pc1.len()];
    for _ in 0..100 {
        let next: Vec<usize> = pc1
            .iter()
            .map(|&s| if (s - c0).abs() <= (s - c1).abs() { 0 } else { 1 })
            .collect();
        let mean_of = |g: usize, fallback: f64| {
            let xs: Vec<f64> = pc1
                .iter()
                .zip(&next)
                .filter(|(_, &gi)| gi == g)
                .map(|(&s, _)| s)
                .collect();
            if xs.is_empty() {
                fallback
            } else {
                stat(&xs).0
            }
        };
        let (n0, n1) = (mean_of(0, c0), mean_of(1, c1));
        let converged = next == groups;
        groups = next;
        c0 = n0;
        c1 = n1;
        if converged {
            break;
        }
    }
    groups
}

///
/// Pick at most `max` row indices for plotting, seeded and order-preserving.
///
pub fn subsample_rows(n: usize, max: usize, seed: u64) -> Vec<usize> {
    if n <= max {
        return (0..n).collect();
    }
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, n, max).into_vec();
    picked.sort_unstable();
    picked
}

///
/// Everything the report needs about one PCA run, JSON-serializable.
///
#[derive(Clone, Debug, Serialize)]
pub struct PcaResult {
    pub jump: ReferenceJump,
    pub rows: Vec<RowKey>,
    /// n_rows x n_components scores
    pub scores: Vec<Vec<f64>>,
    pub explained: Vec<f64>,
    /// two-group PC1 split per row
    pub groups: Vec<usize>,
}

impl PcaResult {
    ///
    /// Run PCA over the matrix and classify segments on PC1.
    ///
    pub fn from_matrix(
        matrix: &ModuleMatrix,
        jump: ReferenceJump,
        n_components: usize,
    ) -> Option<PcaResult> {
        let p = pca(&matrix.to_array(), n_components)?;
        let pc1: Vec<f64> = p.scores.column(0).to_vec();
        let (ave, sd, min, max) = stat(&pc1);
        info!("pc1 ave={} sd={} min={} max={}", ave, sd, min, max);
        let groups = split_two(&pc1);
        Some(PcaResult {
            jump,
            rows: matrix.rows.clone(),
            scores: p.scores.rows().into_iter().map(|r| r.to_vec()).collect(),
            explained: p.explained,
            groups,
        })
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap()
    }
}

//
// tests
//
