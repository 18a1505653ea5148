pub mod json_loader;

pub use json_loader::{load_articles, load_prompt, load_schema};
