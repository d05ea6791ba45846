//! Command-line interface for the `piccompress` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|----------------|
//! | [`constants`] | Program identity, size multipliers, `DISPLAY_LEVEL` and the `displaylevel!` macro. |
//! | [`args`]      | `Cli`, the clap-derived argument set, and its conversion into a request and batch options. |
//! | [`logging`]   | `tracing-subscriber` setup driven by the display level. |
//!
//! Typical call sequence: `Cli::parse` → `init_logging` → `batch::collect_inputs`
//! → `batch::compress_files`.

pub mod constants;
pub mod args;
pub mod logging;
