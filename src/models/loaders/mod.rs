pub mod json_loader;

pub use json_loader::{
    file_stem, list_files_with_suffix, name_prefix, read_json, read_text, write_json,
};
