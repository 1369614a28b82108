use std::path::PathBuf;

/// Library-level structured errors for reblock.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid regex pattern in rule: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Mutually exclusive options: {option1} and {option2}")]
	MutuallyExclusive { option1: String, option2: String },

	#[error("Invalid rule {rule}: {reason}")]
	InvalidRule { rule: String, reason: String },

	#[error("File not found: {path}")]
	NotFound { path: PathBuf },

	#[error("Failed to read file: {path}")]
	ReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("File is not valid UTF-8: {path}")]
	DecodeError {
		path: PathBuf,
		#[source]
		source: std::string::FromUtf8Error,
	},

	#[error("Failed to write file: {path}")]
	IoError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Rule '{rule}' matched nothing in {path}")]
	UnmatchedRule { rule: String, path: PathBuf },

	#[error("Rewrite is not idempotent: rule '{rule}' matched {matches} time(s) on the second pass")]
	NotIdempotent { rule: String, matches: usize },

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using RewriteError.
pub type Result<T> = std::result::Result<T, RewriteError>;
