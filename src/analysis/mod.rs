//! Missing-value statistics and correlation structure of the numeric columns.

pub mod correlation;
pub mod missing;
