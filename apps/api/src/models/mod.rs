pub mod document;
pub mod pipeline;
