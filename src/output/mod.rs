pub mod csv;
pub mod panel_sort;
pub mod sort;

pub use panel_sort::PanelSorter;
pub use sort::DimensionSorter;
