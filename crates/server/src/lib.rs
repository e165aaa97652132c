//! HTTP and WebSocket frontend for the persona chat workflow, plus the
//! `chunk` / `load` / `serve` commands behind the `persona` binary.

pub mod api;
pub mod cli;
pub mod live;
pub mod router;
pub mod startup;
pub mod state;

pub use router::build_router;
pub use state::AppState;
