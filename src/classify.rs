//! Classification of labeled sample sets against a built index.
//!
//! This is the glue between a fully built [`KdTree`] and a labeled test set:
//! predict every sample's label with `knn_value` and count how many
//! predictions match. With the `rayon` feature enabled the fan-out runs on
//! the rayon thread pool; queries are read-only and each one allocates its
//! own candidate queue, so the only shared write is the atomic match counter.

use std::hash::Hash;

use crate::kdtree::KdTree;
use crate::point::Point;
use crate::r#type::Scalar;

/// Outcome of classifying a labeled sample set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Samples whose predicted value matched their label.
    pub correct: usize,
    /// Total number of samples classified.
    pub total: usize,
}

impl Evaluation {
    /// Fraction of samples classified correctly, in `[0, 1]`.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Classify every sample in sequence and count the matches.
pub fn evaluate<const N: usize, V, S>(
    tree: &KdTree<N, V, S>,
    samples: &[(Point<N, S>, V)],
    k: usize,
) -> Evaluation
where
    V: Clone + Eq + Hash + Default,
    S: Scalar,
{
    let correct = samples
        .iter()
        .filter(|(point, label)| tree.knn_value(point, k) == *label)
        .count();
    Evaluation {
        correct,
        total: samples.len(),
    }
}

/// Classify samples across the rayon thread pool.
///
/// The tree must not be mutated for the duration of the call; the `&KdTree`
/// borrow enforces this for safe callers.
#[cfg(feature = "rayon")]
pub fn evaluate_parallel<const N: usize, V, S>(
    tree: &KdTree<N, V, S>,
    samples: &[(Point<N, S>, V)],
    k: usize,
) -> Evaluation
where
    V: Clone + Eq + Hash + Default + Send + Sync,
    S: Scalar,
{
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rayon::prelude::*;

    let correct = AtomicUsize::new(0);
    samples.par_iter().for_each(|(point, label)| {
        if tree.knn_value(point, k) == *label {
            correct.fetch_add(1, Ordering::Relaxed);
        }
    });
    Evaluation {
        correct: correct.into_inner(),
        total: samples.len(),
    }
}
