//! Three-level count tree: title -> description -> exception.
//!
//! Nodes are created on their first increment and never removed. A window
//! discards its tree wholesale when it rotates, so every node always has a
//! count of at least one and a parent count equal to the sum of its children.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionNode {
    count: u64,
}

impl ExceptionNode {
    pub fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionNode {
    count: u64,
    exceptions: BTreeMap<String, ExceptionNode>,
}

impl DescriptionNode {
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn exceptions(&self) -> &BTreeMap<String, ExceptionNode> {
        &self.exceptions
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleNode {
    count: u64,
    descriptions: BTreeMap<String, DescriptionNode>,
}

impl TitleNode {
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn descriptions(&self) -> &BTreeMap<String, DescriptionNode> {
        &self.descriptions
    }
}

/// A single title/description/exception path and its exception count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub exception: &'a str,
    pub count: u64,
}

/// Aggregate counts for one window.
///
/// # Examples
///
/// ```
/// use critmon_common::tree::CountTree;
///
/// let mut tree = CountTree::new();
/// tree.update("Checkout", "Payment failed", "Timeout");
/// tree.update("Checkout", "Payment failed", "NA");
/// tree.update("Checkout", "Cart empty", "NA");
///
/// let title = tree.title("Checkout").unwrap();
/// assert_eq!(title.count(), 3);
/// assert_eq!(title.descriptions()["Payment failed"].count(), 2);
/// assert_eq!(tree.exception_count("Checkout", "Cart empty", "NA"), Some(1));
/// assert!(tree.is_consistent());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountTree {
    titles: BTreeMap<String, TitleNode>,
}

impl CountTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the exception node and both of its ancestors by one,
    /// creating whichever nodes do not exist yet.
    pub fn update(&mut self, title: &str, description: &str, exception: &str) {
        self.add(title, description, exception, 1);
    }

    /// Builds a tree holding exactly one path where every level carries
    /// `count`.
    pub fn single_path(title: &str, description: &str, exception: &str, count: u64) -> Self {
        let mut tree = Self::new();
        tree.add(title, description, exception, count);
        tree
    }

    fn add(&mut self, title: &str, description: &str, exception: &str, n: u64) {
        let title_node = self.titles.entry(title.to_string()).or_default();
        title_node.count += n;

        let desc_node = title_node
            .descriptions
            .entry(description.to_string())
            .or_default();
        desc_node.count += n;

        desc_node
            .exceptions
            .entry(exception.to_string())
            .or_default()
            .count += n;
    }

    /// Returns an owned copy that later updates cannot reach.
    pub fn snapshot(&self) -> CountTree {
        self.clone()
    }

    pub fn titles(&self) -> &BTreeMap<String, TitleNode> {
        &self.titles
    }

    pub fn title(&self, title: &str) -> Option<&TitleNode> {
        self.titles.get(title)
    }

    pub fn exception_count(&self, title: &str, description: &str, exception: &str) -> Option<u64> {
        self.titles
            .get(title)?
            .descriptions
            .get(description)?
            .exceptions
            .get(exception)
            .map(ExceptionNode::count)
    }

    /// Sum of all title counts, i.e. the number of records aggregated.
    pub fn total(&self) -> u64 {
        self.titles.values().map(TitleNode::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Number of distinct title/description/exception paths.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    pub fn leaves(&self) -> impl Iterator<Item = Leaf<'_>> {
        self.titles.iter().flat_map(|(title, t)| {
            t.descriptions.iter().flat_map(move |(description, d)| {
                d.exceptions.iter().map(move |(exception, e)| Leaf {
                    title,
                    description,
                    exception,
                    count: e.count,
                })
            })
        })
    }

    /// Checks that every parent count equals the sum of its children and
    /// that no node has a zero count.
    pub fn is_consistent(&self) -> bool {
        self.titles.values().all(|t| {
            t.count > 0
                && t.count == t.descriptions.values().map(DescriptionNode::count).sum::<u64>()
                && t.descriptions.values().all(|d| {
                    d.count > 0
                        && d.count == d.exceptions.values().map(ExceptionNode::count).sum::<u64>()
                        && d.exceptions.values().all(|e| e.count > 0)
                })
        })
    }
}
