//! Imputation module for handling missing values.
//!
//! Missing numeric values are filled from the median of a peer group,
//! see [`GroupMedians`].

mod grouped;

pub use grouped::GroupMedians;
