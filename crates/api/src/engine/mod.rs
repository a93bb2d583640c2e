//! Server-side orchestration that is more than repository plumbing.

pub mod recommend;
