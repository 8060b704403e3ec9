pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod reveal;
pub mod sink;
pub mod subtitle;
pub mod ttml;

pub use config::Config;
pub use convert::{ttml_to_cues, ttml_to_vtt, ttml_to_vtt_with_options};
pub use error::{PodvttError, Result};
pub use pipeline::{print_summary, BatchConfig, BatchResult, BatchRunner, BatchStats};
