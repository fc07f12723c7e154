pub mod grid;
pub mod workbook;

pub use grid::Grid;
pub use workbook::{load_sheet_set, SheetSet};
