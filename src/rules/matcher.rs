use crate::config::types::{DEFAULT_CLOSER, MergedConfig, Rule, RuleWithSource};
use crate::error::{Result, RewriteError};
use regex::{Regex, RegexBuilder};
use std::path::PathBuf;

/// A compiled rule ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledRule {
	/// Display name (explicit or positional).
	pub name: String,

	/// Compiled pattern.
	pub regex: Regex,

	/// Replacement inserted verbatim for every match.
	pub replacement: String,

	/// Source config path (for debugging).
	pub source: PathBuf,
}

impl CompiledRule {
	/// Compile a rule from a RuleWithSource. `index` is the rule's position in the set.
	pub fn from_rule_with_source(rws: &RuleWithSource, index: usize) -> Result<Self> {
		rws.rule.validate(index)?;

		let (pattern, dot_all) = pattern_source(&rws.rule, index)?;
		let regex = compile_regex(&pattern, dot_all)?;

		Ok(CompiledRule {
			name: rws.rule.display_name(index),
			regex,
			replacement: rws.rule.replacement.clone(),
			source: rws.source.clone(),
		})
	}

	/// Check if this rule matches anywhere in `text`.
	pub fn matches(&self, text: &str) -> bool {
		self.regex.is_match(text)
	}
}

/// Build the regex source for a rule, and whether `.` should cross newlines.
fn pattern_source(rule: &Rule, index: usize) -> Result<(String, bool)> {
	match (&rule.pattern, &rule.trigger) {
		(Some(pattern), _) => Ok((pattern.clone(), rule.dot_all.unwrap_or(true))),
		(None, Some(trigger)) => Ok((
			block_pattern(
				trigger,
				rule.closer.unwrap_or(DEFAULT_CLOSER),
				rule.closer_count.unwrap_or(1),
				rule.terminator.as_deref(),
			),
			true,
		)),
		(None, None) => Err(RewriteError::InvalidRule {
			rule: rule.display_name(index),
			reason: "one of pattern or trigger is required".to_string(),
		}),
	}
}

/// Regex source for a block: `trigger`, then exactly `closer_count` closers
/// with anything but a closer in between, then `terminator`.
///
/// Negated classes span newlines, so the block may cover any number of lines.
pub fn block_pattern(
	trigger: &str,
	closer: char,
	closer_count: usize,
	terminator: Option<&str>,
) -> String {
	let closer = regex::escape(&closer.to_string());
	let segment = format!("[^{closer}]*{closer}");

	let mut pattern = regex::escape(trigger);
	for _ in 0..closer_count {
		pattern.push_str(&segment);
	}
	if let Some(terminator) = terminator {
		pattern.push_str(&regex::escape(terminator));
	}
	pattern
}

/// Compile a regex pattern string.
fn compile_regex(pattern: &str, dot_all: bool) -> Result<Regex> {
	RegexBuilder::new(pattern)
		.dot_matches_new_line(dot_all)
		.build()
		.map_err(|source| RewriteError::InvalidRegex {
			pattern: pattern.to_string(),
			source,
		})
}

/// An ordered, immutable sequence of compiled rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
	rules: Vec<CompiledRule>,
}

impl RuleSet {
	pub fn new(rules: Vec<CompiledRule>) -> Self {
		RuleSet { rules }
	}

	pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
		self.rules.iter()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Rules whose replacement text is itself matched by some rule in the set.
	///
	/// A rewrite with such a rule is not guaranteed to be idempotent. Returns
	/// `(rule, matching_rule)` name pairs.
	pub fn self_matching(&self) -> Vec<(&str, &str)> {
		let mut hazards = Vec::new();
		for rule in &self.rules {
			for other in &self.rules {
				if other.matches(&rule.replacement) {
					hazards.push((rule.name.as_str(), other.name.as_str()));
				}
			}
		}
		hazards
	}
}

impl<'a> IntoIterator for &'a RuleSet {
	type Item = &'a CompiledRule;
	type IntoIter = std::slice::Iter<'a, CompiledRule>;

	fn into_iter(self) -> Self::IntoIter {
		self.rules.iter()
	}
}

/// Compile all rules in a merged config, preserving their order.
pub fn compile_rules(config: &MergedConfig) -> Result<RuleSet> {
	let rules = config
		.rules
		.iter()
		.enumerate()
		.map(|(index, rws)| CompiledRule::from_rule_with_source(rws, index))
		.collect::<Result<Vec<_>>>()?;
	Ok(RuleSet::new(rules))
}
