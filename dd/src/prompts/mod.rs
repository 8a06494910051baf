//! Prompt templates for reasoning steps
//!
//! Templates are Handlebars text, loaded from override directories with
//! embedded fallbacks compiled into the binary.

mod embedded;
mod loader;

pub use embedded::get_embedded;
pub use loader::PromptLoader;
