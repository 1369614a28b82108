use crate::error::RewriteError;
use serde::Deserialize;
use std::path::PathBuf;

/// Closing delimiter used by block rules that don't name one.
pub const DEFAULT_CLOSER: char = '}';

/// Top-level configuration from a `.reblock.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop directory cascade and jump directly to ~/.reblock.toml.
	#[serde(default)]
	pub root: bool,

	/// If true, use only this config: no parent directories, no user config.
	#[serde(default)]
	pub no_external_lookup: bool,

	/// Environment variable name that, if truthy, skips ~/.reblock.toml lookup.
	/// Useful for CI environments.
	#[serde(default)]
	pub root_config_lookup_disable_env_var: Option<String>,

	/// Treat a rule that matches nothing as an error instead of a no-op.
	#[serde(default)]
	pub strict: bool,

	/// Rewrite rules, applied in order. Every rule sees the output of the
	/// rule before it.
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// A single rewrite: a multi-line pattern and the text that replaces every match.
///
/// The pattern is given either as a raw regex (`pattern`) or as a block shape
/// (`trigger` + `closer_count` closers + optional `terminator`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rule {
	/// Human-readable name used in reports and errors.
	pub name: Option<String>,

	/// Raw regex source (mutually exclusive with trigger).
	pub pattern: Option<String>,

	/// Whether `.` in a raw pattern also matches line terminators. Defaults to true.
	pub dot_all: Option<bool>,

	/// Literal phrase that starts a block (mutually exclusive with pattern).
	pub trigger: Option<String>,

	/// Closing delimiter counted by a block rule. Defaults to `}`.
	pub closer: Option<char>,

	/// Number of closers that end the block.
	pub closer_count: Option<usize>,

	/// Literal text that must directly follow the last closer.
	pub terminator: Option<String>,

	/// Replacement substituted verbatim for each match. `$` is not expanded.
	pub replacement: String,
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from multiple config files in the cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// All rules from all configs, in cascade order (most specific first).
	pub rules: Vec<RuleWithSource>,

	/// Whether any config in the cascade asked for strict matching.
	pub strict: bool,
}

/// A rule with its source config path for debugging/display.
#[derive(Debug, Clone)]
pub struct RuleWithSource {
	/// The rule itself.
	pub rule: Rule,

	/// The config file this rule came from.
	pub source: PathBuf,
}

impl Rule {
	/// Name shown for this rule, falling back to its 1-based position.
	pub fn display_name(&self, index: usize) -> String {
		match self.name {
			Some(ref name) => name.clone(),
			None => format!("rule {}", index + 1),
		}
	}

	/// Validate that exactly one pattern form is used and that block fields are sane.
	pub fn validate(&self, index: usize) -> Result<(), RewriteError> {
		let block_fields = [
			("closer", self.closer.is_some()),
			("closer_count", self.closer_count.is_some()),
			("terminator", self.terminator.is_some()),
		];

		match (&self.pattern, &self.trigger) {
			(Some(_), Some(_)) => {
				return Err(RewriteError::MutuallyExclusive {
					option1: "pattern".to_string(),
					option2: "trigger".to_string(),
				});
			}
			(Some(_), None) => {
				if let Some((name, _)) = block_fields.iter().find(|(_, is_set)| *is_set) {
					return Err(RewriteError::MutuallyExclusive {
						option1: "pattern".to_string(),
						option2: name.to_string(),
					});
				}
			}
			(None, Some(trigger)) => {
				if trigger.is_empty() {
					return Err(self.invalid(index, "trigger must not be empty"));
				}
				match self.closer_count {
					None => return Err(self.invalid(index, "closer_count is required with trigger")),
					Some(0) => return Err(self.invalid(index, "closer_count must be at least 1")),
					Some(_) => {}
				}
				if self.dot_all.is_some() {
					return Err(RewriteError::MutuallyExclusive {
						option1: "trigger".to_string(),
						option2: "dot_all".to_string(),
					});
				}
			}
			(None, None) => {
				return Err(self.invalid(index, "one of pattern or trigger is required"));
			}
		}

		Ok(())
	}

	fn invalid(&self, index: usize, reason: &str) -> RewriteError {
		RewriteError::InvalidRule {
			rule: self.display_name(index),
			reason: reason.to_string(),
		}
	}
}

impl Config {
	/// Validate all rules in this config.
	pub fn validate(&self) -> Result<(), RewriteError> {
		for (index, rule) in self.rules.iter().enumerate() {
			rule.validate(index)?;
		}
		Ok(())
	}
}
