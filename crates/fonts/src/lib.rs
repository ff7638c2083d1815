//! Font embedding: the font embed state machine and the sources that
//! resolve font requests.
//!
//! # Invariants
//! - `fontEmbed` always matches the current family while `loading` or `loaded`.
//! - Only the latest request can settle the state; stale completions are dropped.
//! - `loaded` and `error` are left only through a new family.

mod machine;
mod source;

pub use machine::{DEFAULT_FONT_PROVIDER, FontEmbedMachine, FontStats, Resolution};
pub use source::{
    DirectorySource, FetchCompletion, FetchError, FetchTicket, FontRequest, FontSource,
    ManualSource, weight_from_file_name,
};

pub fn crate_info() -> &'static str {
    "textura-fonts v0.1.0"
}
