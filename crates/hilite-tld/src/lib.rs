//! hilite-tld: keeping the highlighter's TLD list current.
//!
//! Fetches a TLD list, compiles it into a [`hilite_core::CompositePattern`],
//! persists the pattern source and publishes it through a [`PatternCell`]
//! that editing code snapshots at the start of each edit.

pub mod cell;
pub mod config;
pub mod error;
pub mod filestore;
pub mod parse;
pub mod refresh;
pub mod source;

pub use cell::PatternCell;
pub use config::{ConfigFile, HighlighterConfig, Loader, Saver, config_dir, data_dir};
pub use error::{ConfigError, JsonStoreError, TldError};
pub use filestore::JsonFileStore;
pub use parse::parse_tld_list;
pub use refresh::{RefreshPolicy, refresh_pattern};
pub use source::{FileTldSource, HttpTldSource, IANA_TLD_URL, TldSource};
