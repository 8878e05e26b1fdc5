use crate::detector::AlertedSet;
use chrono::{DateTime, Duration, Utc};
use critmon_common::tree::CountTree;

/// Everything that belongs to one window. Replaced as a whole on rotation.
#[derive(Debug, Clone, Default)]
pub struct WindowState {
    start: Option<DateTime<Utc>>,
    tree: CountTree,
    alerted: AlertedSet,
}

impl WindowState {
    /// State before the first record: no start, empty tree.
    pub fn unanchored() -> Self {
        Self::default()
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn tree(&self) -> &CountTree {
        &self.tree
    }

    pub fn alerted(&self) -> &AlertedSet {
        &self.alerted
    }

    pub fn into_tree(self) -> CountTree {
        self.tree
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut CountTree, &mut AlertedSet) {
        (&mut self.tree, &mut self.alerted)
    }
}

/// Owns the current window and decides when it has run its course.
///
/// Elapsed time is measured on record timestamps only.
pub struct WindowController {
    period: Duration,
    state: WindowState,
}

impl WindowController {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: WindowState::unanchored(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut WindowState {
        &mut self.state
    }

    /// Anchors the window on `ts` if it has no start yet and returns the
    /// window start.
    pub fn anchor(&mut self, ts: DateTime<Utc>) -> DateTime<Utc> {
        *self.state.start.get_or_insert(ts)
    }

    /// True when `ts` lies more than one period past the window start.
    pub fn is_elapsed(&self, ts: DateTime<Utc>) -> bool {
        self.state
            .start
            .is_some_and(|start| ts - start > self.period)
    }

    /// Starts a fresh window at `ts` and returns the one that just closed.
    pub fn rotate(&mut self, ts: DateTime<Utc>) -> WindowState {
        std::mem::replace(&mut self.state, WindowState::starting_at(ts))
    }
}
