//! Rewrite jobs for reblock.
//!
//! This module handles:
//! - Reading a document once from a text store
//! - Running the rule set over it (optionally twice, to check idempotence)
//! - Enforcing the strict zero-match policy
//! - Writing the result back once, only when it changed

use crate::error::{Result, RewriteError};
use crate::rules::{Rewrite, RuleOutcome, RuleSet, apply, apply_verified};
use crate::store::TextStore;
use std::path::{Path, PathBuf};

/// Policy knobs for a rewrite job.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteOptions {
	/// Fail if any rule matches nothing.
	pub strict: bool,

	/// Apply the rules a second time and fail if that changes anything.
	pub verify: bool,

	/// Compute the rewrite but don't write it back.
	pub dry_run: bool,
}

/// What a rewrite job did to one file.
#[derive(Debug, Clone)]
pub struct FileReport {
	/// The file that was rewritten.
	pub path: PathBuf,

	/// Per-rule match counts, in application order.
	pub outcomes: Vec<RuleOutcome>,

	/// Whether the rewritten text differs from the original.
	pub changed: bool,

	/// Whether the new text was written back.
	pub written: bool,
}

impl FileReport {
	/// Total number of replacements made.
	pub fn replacements(&self) -> usize {
		self.outcomes.iter().map(|o| o.matches).sum()
	}
}

/// Rewrite the document at `path` with `rules`.
///
/// A rule that matches nothing is logged and skipped unless `options.strict`
/// is set, in which case nothing is written and the rule is reported as an error.
pub fn rewrite_file<S: TextStore>(
	store: &mut S,
	path: &Path,
	rules: &RuleSet,
	options: &RewriteOptions,
) -> Result<FileReport> {
	let original = store.read(path)?;

	let Rewrite { text, outcomes } = if options.verify {
		apply_verified(&original, rules)?
	} else {
		apply(&original, rules)
	};

	for outcome in outcomes.iter().filter(|o| o.matches == 0) {
		if options.strict {
			return Err(RewriteError::UnmatchedRule {
				rule: outcome.rule.clone(),
				path: path.to_path_buf(),
			});
		}
		tracing::warn!(rule = %outcome.rule, path = %path.display(), "Rule matched nothing");
	}

	let changed = text != original;
	let written = changed && !options.dry_run;
	if written {
		store.write(path, &text)?;
	}

	tracing::info!(
		path = %path.display(),
		changed,
		written,
		"Rewrite finished"
	);

	Ok(FileReport {
		path: path.to_path_buf(),
		outcomes,
		changed,
		written,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::{MergedConfig, Rule, RuleWithSource};
	use crate::rules::compile_rules;
	use crate::store::MemoryStore;

	const TARGET: &str = "server.js";

	fn rules() -> RuleSet {
		let rule = Rule {
			name: Some("collapse".to_string()),
			trigger: Some("BEGIN".to_string()),
			closer_count: Some(2),
			terminator: Some(";".to_string()),
			replacement: "run();".to_string(),
			..Default::default()
		};
		compile_rules(&MergedConfig {
			rules: vec![RuleWithSource {
				rule,
				source: PathBuf::from("test.toml"),
			}],
			strict: false,
		})
		.unwrap()
	}

	fn store_with(contents: &str) -> MemoryStore {
		let mut store = MemoryStore::new();
		store.insert(TARGET, contents);
		store
	}

	#[test]
	fn test_rewrite_writes_changed_document() {
		let mut store = store_with("a\nBEGIN {\n  x\n}\n};\nb\n");

		let report =
			rewrite_file(&mut store, Path::new(TARGET), &rules(), &RewriteOptions::default())
				.unwrap();

		assert!(report.changed);
		assert!(report.written);
		assert_eq!(report.replacements(), 1);
		assert_eq!(store.get(Path::new(TARGET)), Some(b"a\nrun();\nb\n".as_slice()));
	}

	#[test]
	fn test_zero_matches_is_silent_noop() {
		let mut store = store_with("nothing to see\n");

		let report =
			rewrite_file(&mut store, Path::new(TARGET), &rules(), &RewriteOptions::default())
				.unwrap();

		assert!(!report.changed);
		assert!(!report.written);
		assert_eq!(store.writes(), 0);
		assert_eq!(
			store.get(Path::new(TARGET)),
			Some(b"nothing to see\n".as_slice())
		);
	}

	#[test]
	fn test_zero_matches_fails_in_strict_mode() {
		let mut store = store_with("nothing to see\n");
		let options = RewriteOptions {
			strict: true,
			..Default::default()
		};

		let result = rewrite_file(&mut store, Path::new(TARGET), &rules(), &options);

		match result.unwrap_err() {
			RewriteError::UnmatchedRule { rule, path } => {
				assert_eq!(rule, "collapse");
				assert_eq!(path, PathBuf::from(TARGET));
			}
			_ => panic!("Expected UnmatchedRule error"),
		}
		assert_eq!(store.writes(), 0);
	}

	#[test]
	fn test_dry_run_does_not_write() {
		let mut store = store_with("BEGIN { } };");
		let options = RewriteOptions {
			dry_run: true,
			..Default::default()
		};

		let report = rewrite_file(&mut store, Path::new(TARGET), &rules(), &options).unwrap();

		assert!(report.changed);
		assert!(!report.written);
		assert_eq!(store.get(Path::new(TARGET)), Some(b"BEGIN { } };".as_slice()));
	}

	#[test]
	fn test_verify_passes_for_idempotent_rules() {
		let mut store = store_with("BEGIN { } };");
		let options = RewriteOptions {
			verify: true,
			..Default::default()
		};

		let report = rewrite_file(&mut store, Path::new(TARGET), &rules(), &options).unwrap();
		assert!(report.written);
		assert_eq!(store.get(Path::new(TARGET)), Some(b"run();".as_slice()));
	}

	#[test]
	fn test_missing_file_propagates() {
		let mut store = MemoryStore::new();
		let result = rewrite_file(
			&mut store,
			Path::new(TARGET),
			&rules(),
			&RewriteOptions::default(),
		);
		assert!(matches!(result, Err(RewriteError::NotFound { .. })));
	}

	#[test]
	fn test_decode_error_propagates() {
		let mut store = MemoryStore::new();
		store.insert(TARGET, vec![0xff, 0xfe, 0xfd]);
		let result = rewrite_file(
			&mut store,
			Path::new(TARGET),
			&rules(),
			&RewriteOptions::default(),
		);
		assert!(matches!(result, Err(RewriteError::DecodeError { .. })));
	}
}
