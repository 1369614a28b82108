//! Rule configuration for reblock.
//!
//! This module handles:
//! - TOML rule file parsing and validation
//! - Directory cascade discovery
//! - Config merging
//! - The `--init` template

pub mod cascade;
pub mod parser;
pub mod template;
pub mod types;

pub use cascade::{
	CONFIG_FILE_NAME, discover_configs, load_config_file, load_merged_config, merge_configs,
	user_config_path,
};
pub use parser::{parse_config_file, parse_config_str};
pub use template::generate_init_template;
pub use types::{Config, DEFAULT_CLOSER, LoadedConfig, MergedConfig, Rule, RuleWithSource};
