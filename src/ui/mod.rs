pub mod dialog;
pub mod figure;
pub mod panels;
