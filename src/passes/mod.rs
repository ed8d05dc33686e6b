//! Strategy-specific pass chains sharing the pipeline contract (spec.md §4.8,
//! §2 "Partitioning Passes (sketch)").

pub mod bsp;
pub mod cellular;
