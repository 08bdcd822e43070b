pub mod upstream;
pub mod valid_json;
