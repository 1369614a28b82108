//! Reblock - CLI tool for collapsing multi-line code blocks with declarative rewrite rules.
//!
//! This library provides the core functionality for reblock, including:
//! - Rule file parsing and cascade discovery
//! - Compiling rules into an ordered rule set
//! - A pure rewrite engine: `apply(text, rules) -> text`
//! - Text stores that isolate file I/O from the engine
//!
//! # Example
//!
//! ```
//! use reblock_cli::config::parse_config_str;
//! use reblock_cli::config::merge_configs;
//! use reblock_cli::config::LoadedConfig;
//! use reblock_cli::rules::{compile_rules, rewrite_text};
//! use std::path::PathBuf;
//!
//! let config = parse_config_str(
//!     r#"
//! [[rules]]
//! trigger = "BEGIN"
//! closer_count = 2
//! replacement = "done();"
//! "#,
//!     &PathBuf::from("rules.toml"),
//! )
//! .unwrap();
//! let merged = merge_configs(&[LoadedConfig { config, path: PathBuf::from("rules.toml") }]);
//! let rules = compile_rules(&merged).unwrap();
//!
//! assert_eq!(rewrite_text("a\nBEGIN {\n}\n}\nb", &rules), "a\ndone();\nb");
//! ```

pub mod config;
pub mod error;
pub mod exec;
pub mod rules;
pub mod store;

pub use error::{Result, RewriteError};
