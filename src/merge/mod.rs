pub mod document;
pub mod path;
pub mod template;

pub use document::{merge_document, MergeSettings};
pub use template::{compose_template, load_template_file, parse_template};
