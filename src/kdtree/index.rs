use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{KnnIndexError, Result};
use crate::kdtree::traversal::Iter;
use crate::point::Point;
use crate::queue::BoundedPriorityQueue;
use crate::r#type::Scalar;

/// A single tree node owning its point, associated value, and both subtrees.
///
/// Dropping a node drops everything below it; cloning is a recursive deep
/// copy through the owned boxes.
#[derive(Debug, Clone)]
pub(crate) struct Node<const N: usize, V, S: Scalar> {
    pub(crate) point: Point<N, S>,
    pub(crate) value: V,
    pub(crate) level: usize,
    pub(crate) left: Option<Box<Node<N, V, S>>>,
    pub(crate) right: Option<Box<Node<N, V, S>>>,
}

impl<const N: usize, V, S: Scalar> Node<N, V, S> {
    pub(crate) fn new(point: Point<N, S>, level: usize, value: V) -> Self {
        Self {
            point,
            value,
            level,
            left: None,
            right: None,
        }
    }

    /// The axis this node splits on: axes cycle with depth.
    #[inline]
    pub(crate) fn axis(&self) -> usize {
        self.level % N
    }
}

/// A k-d tree mapping `N`-dimensional points to values.
///
/// Nodes at depth `d` split space on axis `d mod N`: points strictly smaller
/// on that axis go left, everything else (ties included) goes right. Trees
/// produced by [`KdTreeBuilder`][crate::kdtree::KdTreeBuilder] are balanced;
/// incremental [`insert`][KdTree::insert] attaches leaves without rebalancing
/// and can degrade depth on adversarial input.
///
/// A tree that is no longer being mutated can be queried from any number of
/// threads; queries share no mutable state.
#[derive(Debug, Clone)]
pub struct KdTree<const N: usize, V, S: Scalar = f64> {
    pub(crate) root: Option<Box<Node<N, V, S>>>,
    pub(crate) len: usize,
}

impl<const N: usize, V, S: Scalar> Default for KdTree<N, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, V, S: Scalar> KdTree<N, V, S> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// The dimension of the points stored in this tree.
    pub fn dimension(&self) -> usize {
        N
    }

    /// The number of points in this tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this tree contains no points.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Descend from the root following the axis comparison rule, stopping at
    /// the node holding `point` or at the node a new leaf for `point` would
    /// hang below. `None` only for an empty tree.
    fn find_node(&self, point: &Point<N, S>) -> Option<&Node<N, V, S>> {
        let mut current = self.root.as_deref()?;
        loop {
            if current.point == *point {
                return Some(current);
            }
            let axis = current.axis();
            let next = if point[axis] < current.point[axis] {
                current.left.as_deref()
            } else {
                current.right.as_deref()
            };
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Whether `point` is contained in this tree.
    pub fn contains(&self, point: &Point<N, S>) -> bool {
        self.find_node(point)
            .is_some_and(|node| node.point == *point)
    }

    /// A reference to the value associated with `point`.
    ///
    /// If the same coordinates were inserted more than once, this returns the
    /// value of whichever duplicate descent reaches first.
    pub fn get(&self, point: &Point<N, S>) -> Result<&V> {
        match self.find_node(point) {
            Some(node) if node.point == *point => Ok(&node.value),
            _ => Err(KnnIndexError::PointNotFound),
        }
    }

    /// A mutable reference to the value associated with `point`.
    pub fn get_mut(&mut self, point: &Point<N, S>) -> Result<&mut V> {
        match self.root.as_deref_mut() {
            Some(root) => Self::locate_mut(root, point),
            None => Err(KnnIndexError::PointNotFound),
        }
    }

    fn locate_mut<'a>(node: &'a mut Node<N, V, S>, point: &Point<N, S>) -> Result<&'a mut V> {
        if node.point == *point {
            return Ok(&mut node.value);
        }
        let axis = node.axis();
        let next = if point[axis] < node.point[axis] {
            node.left.as_deref_mut()
        } else {
            node.right.as_deref_mut()
        };
        match next {
            Some(child) => Self::locate_mut(child, point),
            None => Err(KnnIndexError::PointNotFound),
        }
    }

    /// Insert `point` with the given value.
    ///
    /// If the point is already present its value is overwritten in place and
    /// the length is unchanged; otherwise a new leaf is attached below the
    /// node where descent terminated. No rebalancing is performed.
    pub fn insert(&mut self, point: Point<N, S>, value: V) {
        match self.root {
            None => {
                self.root = Some(Box::new(Node::new(point, 0, value)));
                self.len = 1;
            }
            Some(ref mut root) => {
                if Self::insert_below(root, point, value) {
                    self.len += 1;
                }
            }
        }
    }

    /// Returns `true` if a new node was attached, `false` on overwrite.
    fn insert_below(node: &mut Node<N, V, S>, point: Point<N, S>, value: V) -> bool {
        if node.point == point {
            node.value = value;
            return false;
        }
        let axis = node.axis();
        let level = node.level;
        let slot = if point[axis] < node.point[axis] {
            &mut node.left
        } else {
            &mut node.right
        };
        match slot {
            Some(child) => Self::insert_below(child, point, value),
            None => {
                *slot = Some(Box::new(Node::new(point, level + 1, value)));
                true
            }
        }
    }

    /// A mutable reference to the value associated with `point`, inserting
    /// `point` with a default value first if it is absent.
    pub fn get_or_insert_default(&mut self, point: &Point<N, S>) -> &mut V
    where
        V: Default,
    {
        if !self.contains(point) {
            self.insert(*point, V::default());
        }
        match self.get_mut(point) {
            Ok(value) => value,
            Err(_) => unreachable!("point inserted above"),
        }
    }

    /// Iterate over all `(point, value)` pairs in this tree.
    ///
    /// The traversal order is unspecified.
    pub fn iter(&self) -> Iter<'_, N, V, S> {
        Iter::new(self)
    }

    /// The most frequent value among the `k` points nearest to `query`.
    ///
    /// Neighbors are ranked by squared Euclidean distance. Ties in the vote
    /// count are broken in favor of the value whose neighbors have the
    /// smaller total squared distance; any remaining tie goes to the value
    /// encountered first in ascending distance order. Returns `V::default()`
    /// if the tree is empty.
    ///
    /// Panics if `k` is zero.
    pub fn knn_value(&self, query: &Point<N, S>, k: usize) -> V
    where
        V: Clone + Eq + Hash + Default,
    {
        assert!(k > 0, "k must be at least 1");
        let root = match self.root.as_deref() {
            Some(root) => root,
            None => return V::default(),
        };

        let mut queue = BoundedPriorityQueue::new(k);
        collect_nearest(root, query, &mut queue);

        // Tally count and total distance per distinct value among the
        // retained candidates.
        let mut tally: HashMap<&V, (usize, S)> = HashMap::new();
        for (priority, value) in queue.iter() {
            let entry = tally.entry(*value).or_insert((0, S::zero()));
            entry.0 += 1;
            entry.1 = entry.1 + priority;
        }

        let mut winner: Option<(&V, usize, S)> = None;
        for (_, value) in queue.iter() {
            let (count, total) = tally[*value];
            let better = match winner {
                None => true,
                Some((_, best_count, best_total)) => {
                    count > best_count || (count == best_count && total < best_total)
                }
            };
            if better {
                winner = Some((*value, count, total));
            }
        }
        winner.map(|(value, _, _)| value.clone()).unwrap_or_default()
    }
}

/// Branch-and-bound accumulation of the nearest candidates to `query`.
///
/// Every visited node is offered to the queue; the near child (the one on the
/// query's side of the splitting plane) is searched first, and the far child
/// is searched only while the queue is not yet full or the splitting plane is
/// closer than the worst retained candidate, in which case a nearer point
/// could still hide on the far side.
pub(crate) fn collect_nearest<'a, const N: usize, V, S: Scalar>(
    node: &'a Node<N, V, S>,
    query: &Point<N, S>,
    queue: &mut BoundedPriorityQueue<&'a V, S>,
) {
    queue.enqueue(&node.value, node.point.sq_dist(query));

    let axis = node.axis();
    let gap = query[axis] - node.point[axis];
    let (near, far) = if query[axis] < node.point[axis] {
        (&node.left, &node.right)
    } else {
        (&node.right, &node.left)
    };

    if let Some(child) = near.as_deref() {
        collect_nearest(child, query, queue);
    }

    if !queue.is_full() || gap * gap < queue.worst() {
        if let Some(child) = far.as_deref() {
            collect_nearest(child, query, queue);
        }
    }
}
