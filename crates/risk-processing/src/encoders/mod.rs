//! Categorical encoding module.
//!
//! - [`OrdinalEncoder`]: fixed value → integer maps (loan grade, Y/N flags)
//! - [`OneHotEncoder`]: indicator columns with one reference level dropped

mod one_hot;
mod ordinal;

pub use one_hot::OneHotEncoder;
pub use ordinal::{OrdinalEncoder, LOAN_GRADES, YES_NO};
