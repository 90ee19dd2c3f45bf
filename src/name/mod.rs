mod api;

pub use api::{parse_path, NameParser, TypeName};
