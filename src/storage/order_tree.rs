//! Order-Statistic Tree
//!
//! A treap keyed by `(score, member)` where every node tracks the size of its
//! subtree, so the position of any key is found on the way down from the root.
//!
//! ## Complexity (expected)
//! - `insert` / `remove` / `rank`: O(log n)
//! - `descending(k)`: O(log n + k)
//!
//! Node priorities are random, which keeps the expected height logarithmic
//! regardless of insertion order.

use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::sync::Arc;

type Link = Option<Box<Node>>;

#[derive(Debug, Clone)]
struct Node {
    score: OrderedFloat<f64>,
    member: Arc<str>,
    priority: u64,
    size: usize,
    left: Link,
    right: Link,
}

impl Node {
    fn new(score: OrderedFloat<f64>, member: Arc<str>) -> Box<Self> {
        Box::new(Self {
            score,
            member,
            priority: rand::random(),
            size: 1,
            left: None,
            right: None,
        })
    }

    /// Orders this node's key relative to `(score, member)`.
    fn cmp_key(&self, score: OrderedFloat<f64>, member: &str) -> Ordering {
        self.score
            .cmp(&score)
            .then_with(|| (*self.member).cmp(member))
    }

    fn refresh(&mut self) {
        self.size = 1 + size(&self.left) + size(&self.right);
    }
}

fn size(link: &Link) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

/// Splits `link` into keys strictly below `(score, member)` and the rest.
fn split(link: Link, score: OrderedFloat<f64>, member: &str) -> (Link, Link) {
    match link {
        None => (None, None),
        Some(mut node) => {
            if node.cmp_key(score, member) == Ordering::Less {
                let (below, rest) = split(node.right.take(), score, member);
                node.right = below;
                node.refresh();
                (Some(node), rest)
            } else {
                let (below, rest) = split(node.left.take(), score, member);
                node.left = rest;
                node.refresh();
                (below, Some(node))
            }
        }
    }
}

/// Joins two treaps where every key of `left` sorts before every key of `right`.
fn merge(left: Link, right: Link) -> Link {
    match (left, right) {
        (None, right) => right,
        (left, None) => left,
        (Some(mut left), Some(mut right)) => {
            if left.priority > right.priority {
                left.right = merge(left.right.take(), Some(right));
                left.refresh();
                Some(left)
            } else {
                right.left = merge(Some(left), right.left.take());
                right.refresh();
                Some(right)
            }
        }
    }
}

fn insert(link: Link, mut fresh: Box<Node>) -> Link {
    match link {
        None => Some(fresh),
        Some(mut node) => {
            if fresh.priority > node.priority {
                let (below, rest) = split(Some(node), fresh.score, &fresh.member);
                fresh.left = below;
                fresh.right = rest;
                fresh.refresh();
                Some(fresh)
            } else {
                if node.cmp_key(fresh.score, &fresh.member) == Ordering::Greater {
                    node.left = insert(node.left.take(), fresh);
                } else {
                    node.right = insert(node.right.take(), fresh);
                }
                node.refresh();
                Some(node)
            }
        }
    }
}

fn remove(link: Link, score: OrderedFloat<f64>, member: &str) -> (Link, bool) {
    match link {
        None => (None, false),
        Some(mut node) => match node.cmp_key(score, member) {
            Ordering::Equal => (merge(node.left.take(), node.right.take()), true),
            Ordering::Greater => {
                let (left, removed) = remove(node.left.take(), score, member);
                node.left = left;
                node.refresh();
                (Some(node), removed)
            }
            Ordering::Less => {
                let (right, removed) = remove(node.right.take(), score, member);
                node.right = right;
                node.refresh();
                (Some(node), removed)
            }
        },
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderTree {
    root: Link,
}

impl OrderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        size(&self.root)
    }

    /// Inserts a key. The caller guarantees it is not already present.
    pub fn insert(&mut self, score: OrderedFloat<f64>, member: Arc<str>) {
        self.root = insert(self.root.take(), Node::new(score, member));
    }

    /// Removes a key. Returns `true` if it was present.
    pub fn remove(&mut self, score: OrderedFloat<f64>, member: &str) -> bool {
        let (root, removed) = remove(self.root.take(), score, member);
        self.root = root;
        removed
    }

    /// Number of keys sorting before `(score, member)`, `None` if the key is absent.
    pub fn rank(&self, score: OrderedFloat<f64>, member: &str) -> Option<usize> {
        let mut link = &self.root;
        let mut before = 0;
        while let Some(node) = link {
            match node.cmp_key(score, member) {
                Ordering::Greater => link = &node.left,
                Ordering::Less => {
                    before += size(&node.left) + 1;
                    link = &node.right;
                }
                Ordering::Equal => return Some(before + size(&node.left)),
            }
        }
        None
    }

    /// Up to `limit` keys, highest first.
    pub fn descending(&self, limit: usize) -> Vec<(OrderedFloat<f64>, &Arc<str>)> {
        let mut out = Vec::with_capacity(limit.min(self.len()));
        let mut stack: Vec<&Node> = Vec::new();
        let mut link = self.root.as_deref();

        while out.len() < limit {
            while let Some(node) = link {
                stack.push(node);
                link = node.right.as_deref();
            }
            let Some(node) = stack.pop() else {
                break;
            };
            out.push((node.score, &node.member));
            link = node.left.as_deref();
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn height(&self) -> usize {
        fn depth(link: &Link) -> usize {
            link.as_ref()
                .map_or(0, |node| 1 + depth(&node.left).max(depth(&node.right)))
        }
        depth(&self.root)
    }

    /// Checks key order, heap order and subtree sizes. Returns the keys in order.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) -> Vec<(OrderedFloat<f64>, Arc<str>)> {
        fn walk(link: &Link, out: &mut Vec<(OrderedFloat<f64>, Arc<str>)>) -> usize {
            let Some(node) = link else {
                return 0;
            };
            for child in [&node.left, &node.right].into_iter().flatten() {
                assert!(child.priority <= node.priority, "heap order violated");
            }
            let left = walk(&node.left, out);
            out.push((node.score, node.member.clone()));
            let right = walk(&node.right, out);
            assert_eq!(node.size, left + right + 1, "stale subtree size");
            node.size
        }

        let mut keys = Vec::with_capacity(self.len());
        walk(&self.root, &mut keys);
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1], "keys out of order: {:?}", pair);
        }
        keys
    }
}
