//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Graph | Edit tasks and dependencies | `task add`, `dep add`, `clear`, `generate` |
//! | Analysis | Recompute and query | `analyze`, `show`, `chain 3` |
//! | Export | Diagram output | `diagram --direction lr` |
//!
//! Edits never recompute the analysis. Run `analyze` after a batch of
//! edits; `show` and `chain` warn when the stored analysis is stale.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, or set `HASSE_LOG` to a
//! tracing filter:
//! ```bash
//! hasse --verbose analyze
//! HASSE_LOG=hasse_cli=trace hasse analyze
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod task;
mod analysis;

pub use app::{Cli, Commands, run, LOG_ENV};
pub use output::{Output, OutputFormat};
