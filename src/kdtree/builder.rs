use std::cmp;

use crate::kdtree::index::{KdTree, Node};
use crate::point::Point;
use crate::r#type::Scalar;

/// A builder that collects `(point, value)` pairs and bulk-constructs a
/// balanced [`KdTree`].
///
/// Any finite sequence of pairs can feed the builder — via [`add`][Self::add],
/// [`Extend`], or collecting an iterator straight into a tree with
/// [`FromIterator`]. Construction selects the median on the splitting axis of
/// each level in expected linear time, for an expected `O(n log n)` build
/// producing a tree of logarithmic depth. Points with identical coordinates
/// are kept as distinct nodes.
#[derive(Debug, Clone)]
pub struct KdTreeBuilder<const N: usize, V, S: Scalar = f64> {
    items: Vec<(Point<N, S>, V)>,
}

impl<const N: usize, V, S: Scalar> KdTreeBuilder<N, V, S> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty builder with room for `capacity` pairs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Add a point and its associated value to the index.
    pub fn add(&mut self, point: Point<N, S>, value: V) {
        self.items.push((point, value));
    }

    /// The number of pairs added so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no pairs have been added yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume this builder, performing the recursive median partition and
    /// returning a balanced tree ready for queries.
    pub fn finish(self) -> KdTree<N, V, S> {
        let len = self.items.len();
        KdTree {
            root: build_subtree(self.items, 0),
            len,
        }
    }
}

impl<const N: usize, V, S: Scalar> Default for KdTreeBuilder<N, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, V, S: Scalar> Extend<(Point<N, S>, V)> for KdTreeBuilder<N, V, S> {
    fn extend<I: IntoIterator<Item = (Point<N, S>, V)>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<const N: usize, V, S: Scalar> FromIterator<(Point<N, S>, V)> for KdTree<N, V, S> {
    fn from_iter<I: IntoIterator<Item = (Point<N, S>, V)>>(iter: I) -> Self {
        let mut builder = KdTreeBuilder::new();
        builder.extend(iter);
        builder.finish()
    }
}

/// Recursively build the subtree for `items` rooted at the given level.
///
/// The pivot is the median on the level's axis, then every element tied with
/// the pivot on that axis is moved to the pivot's right, so the left subtree
/// is strictly smaller on the axis and ties go right. Heavy duplication along
/// an axis therefore degrades balance, not correctness.
fn build_subtree<const N: usize, V, S: Scalar>(
    mut items: Vec<(Point<N, S>, V)>,
    level: usize,
) -> Option<Box<Node<N, V, S>>> {
    if items.is_empty() {
        return None;
    }

    let axis = level % N;
    let last = items.len() - 1;
    let mid = items.len() / 2;
    select(&mut items, mid, 0, last, axis);

    // Sweep the left partition: anything equal to the pivot on this axis is
    // swapped up against the pivot, which then moves down to the start of the
    // equal run.
    let pivot_value = items[mid].0[axis];
    let mut pivot = mid;
    let mut i = 0;
    while i < pivot {
        if items[i].0[axis] == pivot_value {
            pivot -= 1;
            items.swap(i, pivot);
        } else {
            i += 1;
        }
    }

    let right_items = items.split_off(pivot + 1);
    let (point, value) = items.pop().unwrap();

    let mut node = Box::new(Node::new(point, level, value));
    node.left = build_subtree(items, level + 1);
    node.right = build_subtree(right_items, level + 1);
    Some(node)
}

/// Floyd-Rivest selection: reorder `items` so that the element at rank `k`
/// is in its sorted position on the given axis, everything before it no
/// larger, everything after it no smaller. Expected linear time.
fn select<const N: usize, V, S: Scalar>(
    items: &mut [(Point<N, S>, V)],
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(items, k, new_left, new_right, axis);
        }

        let t = items[k].0[axis];
        let mut i = left;
        let mut j = right;

        items.swap(left, k);
        if items[right].0[axis] > t {
            items.swap(left, right);
        }

        while i < j {
            items.swap(i, j);
            i += 1;
            j -= 1;
            while items[i].0[axis] < t {
                i += 1;
            }
            while items[j].0[axis] > t {
                j -= 1;
            }
        }

        if items[left].0[axis] == t {
            items.swap(left, j);
        } else {
            j += 1;
            items.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j.saturating_sub(1);
        }
    }
}
