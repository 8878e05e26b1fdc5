use critmon_common::tree::{CountTree, Leaf};
use std::collections::HashSet;

/// Exceptions that already alerted in the current window.
///
/// Keyed on the exception string alone, so two categories that share an
/// exception name alert only once per window between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertedSet {
    exceptions: HashSet<String>,
}

impl AlertedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, exception: &str) -> bool {
        self.exceptions.contains(exception)
    }

    /// Returns `false` if the exception was already present.
    pub fn insert(&mut self, exception: &str) -> bool {
        self.exceptions.insert(exception.to_string())
    }

    pub fn len(&self) -> usize {
        self.exceptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty()
    }
}

/// An exception that crossed the threshold for the first time this window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub title: String,
    pub description: String,
    pub exception: String,
    pub count: u64,
}

impl Violation {
    fn from_leaf(leaf: Leaf<'_>) -> Self {
        Self {
            title: leaf.title.to_string(),
            description: leaf.description.to_string(),
            exception: leaf.exception.to_string(),
            count: leaf.count,
        }
    }

    /// The alert subtree: the violating path alone, every level carrying
    /// the exception count.
    pub fn to_tree(&self) -> CountTree {
        CountTree::single_path(&self.title, &self.description, &self.exception, self.count)
    }
}

pub struct ViolationDetector {
    threshold: u64,
}

impl ViolationDetector {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Scans the whole tree and returns every leaf above the threshold whose
    /// exception has not alerted yet, marking each one in `alerted`.
    pub fn check(&self, tree: &CountTree, alerted: &mut AlertedSet) -> Vec<Violation> {
        let mut violations = Vec::new();

        for leaf in tree.leaves() {
            if leaf.count <= self.threshold {
                continue;
            }
            if !alerted.insert(leaf.exception) {
                tracing::trace!(
                    exception = leaf.exception,
                    count = leaf.count,
                    "Violation already alerted this window"
                );
                continue;
            }
            violations.push(Violation::from_leaf(leaf));
        }

        violations
    }
}
