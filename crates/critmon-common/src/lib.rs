pub mod id;
pub mod record;
pub mod report;
pub mod tree;
