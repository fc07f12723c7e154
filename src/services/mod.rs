pub mod convert;

pub use convert::{
    batch_payload, convert_batch, convert_path, convert_sheets, convert_workbook, Conversion,
    ConversionSummary, ConvertOptions, FileOutcome,
};
