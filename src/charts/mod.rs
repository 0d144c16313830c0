//! Charts module - SVG charts of the joined indicators

mod plotter;

pub use plotter::{Bin, ChartError, ChartPlotter, CHART_SIZE};
