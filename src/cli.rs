//! CLI domain: parse, route, output, and presentation only.
//! No pipeline orchestration; the route hands off to `run_generate`.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, OutputFormat};
pub use presentation::{format_event, format_report_json, format_report_text, ConsoleObserver};
pub use route::RunContext;
