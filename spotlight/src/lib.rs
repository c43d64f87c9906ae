pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use commands::command_argument_builder;
pub use handlers::{format_error, handle_crawl, init_logging, options_from_matches, render_outcome};
