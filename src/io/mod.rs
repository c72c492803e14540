pub mod input;
pub mod output;

pub use input::{read_names, read_names_from_reader, NameColumn};
pub use output::{write_outputs, OutputFiles};
