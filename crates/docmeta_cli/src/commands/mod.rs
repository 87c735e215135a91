pub mod metadata;
pub mod project;
pub mod snippets;
