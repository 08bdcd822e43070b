pub mod extract;
pub mod profile;
pub mod render;
pub mod retry;
