//! Output module for reporting on the index
//!
//! This module handles:
//! - Loading and printing run statistics
//! - Formatting search result pages for the terminal

mod results;
pub mod stats;

pub use results::{format_search_page, print_search_page};
pub use stats::{load_statistics, print_statistics, IndexStatistics};
