//! Windowed aggregation and alerting for critical log records.
//!
//! [`engine::AggregationEngine`] folds each record into the current
//! window's [`CountTree`](critmon_common::tree::CountTree), raises a
//! violation report the first time an exception crosses the alert
//! threshold, and closes the window with a summary report once the
//! configured period has elapsed on the record clock. Every report passes
//! through the [`gate::ReportGate`] before it is handed back to the caller.

pub mod config;
pub mod detector;
pub mod engine;
pub mod gate;
pub mod normalize;
pub mod window;

#[cfg(test)]
mod tests;
