//! Canvas components.

pub mod bubble_chart;
