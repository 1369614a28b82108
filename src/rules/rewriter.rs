use crate::error::{Result, RewriteError};
use crate::rules::matcher::{CompiledRule, RuleSet};
use regex::{Captures, Regex};

/// How many times one rule matched during a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
	/// Name of the rule.
	pub rule: String,

	/// Number of non-overlapping matches that were replaced.
	pub matches: usize,
}

/// Result of applying a rule set to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
	/// The rewritten document.
	pub text: String,

	/// One outcome per rule, in application order.
	pub outcomes: Vec<RuleOutcome>,
}

impl Rewrite {
	/// Total number of replacements across all rules.
	pub fn replacements(&self) -> usize {
		self.outcomes.iter().map(|o| o.matches).sum()
	}

	/// Rules that matched nothing.
	pub fn unmatched(&self) -> impl Iterator<Item = &RuleOutcome> {
		self.outcomes.iter().filter(|o| o.matches == 0)
	}
}

/// Replace every match of `regex` in `text` with `replacement`, verbatim.
///
/// Returns the new text and the number of matches. `$` in the replacement is
/// never expanded.
fn replace_counting(regex: &Regex, text: &str, replacement: &str) -> (String, usize) {
	let mut count = 0;
	let replaced = regex.replace_all(text, |_: &Captures<'_>| {
		count += 1;
		replacement
	});
	(replaced.into_owned(), count)
}

fn apply_rule(rule: &CompiledRule, document: &str) -> (String, usize) {
	replace_counting(&rule.regex, document, &rule.replacement)
}

/// Apply every rule, in order, to `document`.
///
/// Each rule replaces all of its non-overlapping matches in the output of the
/// rule before it. A rule with no match leaves the document unchanged.
pub fn apply(document: &str, rules: &RuleSet) -> Rewrite {
	let mut text = document.to_string();
	let mut outcomes = Vec::with_capacity(rules.len());

	for rule in rules {
		let (next, matches) = apply_rule(rule, &text);
		tracing::debug!(rule = %rule.name, matches, "Applied rule");
		text = next;
		outcomes.push(RuleOutcome {
			rule: rule.name.clone(),
			matches,
		});
	}

	Rewrite { text, outcomes }
}

/// Apply `rules` to `document`, then apply them again to the result and fail
/// if the second pass changes anything.
pub fn apply_verified(document: &str, rules: &RuleSet) -> Result<Rewrite> {
	let first = apply(document, rules);

	// Replay rule by rule; the culprit is the first one whose output differs.
	let mut text = first.text.clone();
	for rule in rules {
		let (next, matches) = apply_rule(rule, &text);
		if next != text {
			return Err(RewriteError::NotIdempotent {
				rule: rule.name.clone(),
				matches,
			});
		}
		text = next;
	}

	Ok(first)
}

/// Apply `rules` to `document` and return only the rewritten text.
pub fn rewrite_text(document: &str, rules: &RuleSet) -> String {
	apply(document, rules).text
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::{MergedConfig, Rule, RuleWithSource};
	use crate::rules::matcher::compile_rules;
	use std::path::PathBuf;

	fn rule_set(rules: Vec<Rule>) -> RuleSet {
		let config = MergedConfig {
			rules: rules
				.into_iter()
				.map(|rule| RuleWithSource {
					rule,
					source: PathBuf::from("test.toml"),
				})
				.collect(),
			strict: false,
		};
		compile_rules(&config).unwrap()
	}

	fn block(trigger: &str, closer_count: usize, replacement: &str) -> Rule {
		Rule {
			trigger: Some(trigger.to_string()),
			closer_count: Some(closer_count),
			replacement: replacement.to_string(),
			..Default::default()
		}
	}

	fn raw(pattern: &str, replacement: &str) -> Rule {
		Rule {
			pattern: Some(pattern.to_string()),
			replacement: replacement.to_string(),
			..Default::default()
		}
	}

	#[test]
	fn test_no_trigger_is_identity() {
		let rules = rule_set(vec![block("BEGIN_BLOCK", 2, "collapsed();")]);
		let document = "fn main() {\n    println!(\"hi\");\n}\n";

		let rewrite = apply(document, &rules);
		assert_eq!(rewrite.text, document);
		assert_eq!(rewrite.replacements(), 0);
	}

	#[test]
	fn test_single_match_replaces_only_its_span() {
		let rules = rule_set(vec![block("BEGIN", 1, "X")]);
		let rewrite = apply("keep {\nBEGIN a\nb }tail\n}\n", &rules);

		assert_eq!(rewrite.text, "keep {\nXtail\n}\n");
		assert_eq!(rewrite.outcomes[0].matches, 1);
	}

	#[test]
	fn test_all_matches_are_replaced() {
		let rules = rule_set(vec![block("BEGIN", 1, "X")]);
		let rewrite = apply("BEGIN 1 }\nmid\nBEGIN 2 }\nend\nBEGIN\n3\n}\n", &rules);

		assert_eq!(rewrite.text, "X\nmid\nX\nend\nX\n");
		assert_eq!(rewrite.outcomes[0].matches, 3);
	}

	#[test]
	fn test_end_to_end_block_with_five_closers() {
		let rules = rule_set(vec![block("BEGIN_BLOCK", 5, "collapsed();")]);
		let document = "\
before();
BEGIN_BLOCK
a {
b {
c {
d {
e
f
}}}}}
after();
";

		let rewrite = apply(document, &rules);
		assert_eq!(rewrite.text, "before();\ncollapsed();\nafter();\n");
	}

	#[test]
	fn test_replacement_is_literal() {
		let rules = rule_set(vec![raw(r"(\w+)=(\w+)", "$2 costs $$1")]);
		let rewrite = apply("a=b", &rules);
		assert_eq!(rewrite.text, "$2 costs $$1");
	}

	#[test]
	fn test_rules_apply_in_order() {
		let rules = rule_set(vec![
			block("BEGIN", 1, "ONE"),
			raw(r"BEGIN.*?\}", "TWO"),
		]);

		let rewrite = apply("BEGIN x\n}", &rules);
		assert_eq!(rewrite.text, "ONE");
		assert_eq!(rewrite.outcomes[0].matches, 1);
		assert_eq!(rewrite.outcomes[1].matches, 0);
	}

	#[test]
	fn test_later_rule_sees_earlier_output() {
		let rules = rule_set(vec![raw("alpha", "beta"), raw("beta", "gamma")]);
		assert_eq!(rewrite_text("alpha beta", &rules), "gamma gamma");
	}

	#[test]
	fn test_empty_document() {
		let rules = rule_set(vec![block("BEGIN", 1, "X"), raw("a", "b")]);
		let rewrite = apply("", &rules);
		assert_eq!(rewrite.text, "");
		assert_eq!(rewrite.unmatched().count(), 2);
	}

	#[test]
	fn test_empty_rule_set() {
		let rules = RuleSet::default();
		let rewrite = apply("anything", &rules);
		assert_eq!(rewrite.text, "anything");
		assert!(rewrite.outcomes.is_empty());
	}

	#[test]
	fn test_large_document_without_match_is_unchanged() {
		let document: String = (0..5000)
			.map(|i| format!("let value_{i} = {{ {i} }};\n"))
			.collect();
		let rules = rule_set(vec![block("BEGIN_BLOCK", 5, "collapsed();")]);

		let rewrite = apply(&document, &rules);
		assert_eq!(rewrite.text.as_bytes(), document.as_bytes());
	}

	#[test]
	fn test_apply_is_idempotent() {
		let rules = rule_set(vec![block("BEGIN", 2, "done();")]);
		let document = "x\nBEGIN {\n}\n}\ny\nBEGIN { } }\n";

		let once = rewrite_text(document, &rules);
		let twice = rewrite_text(&once, &rules);
		assert_eq!(once, "x\ndone();\ny\ndone();\n");
		assert_eq!(once, twice);
		assert!(apply_verified(document, &rules).is_ok());
	}

	#[test]
	fn test_apply_verified_rejects_rematching_replacement() {
		let rules = rule_set(vec![raw("a", "ab")]);

		let result = apply_verified("a", &rules);
		match result.unwrap_err() {
			RewriteError::NotIdempotent { rule, matches } => {
				assert_eq!(rule, "rule 1");
				assert_eq!(matches, 1);
			}
			_ => panic!("Expected NotIdempotent error"),
		}
	}

	#[test]
	fn test_apply_verified_names_rule_that_changed_text() {
		let rules = rule_set(vec![
			Rule {
				name: Some("squash".to_string()),
				..raw("a+", "a")
			},
			Rule {
				name: Some("grow".to_string()),
				..raw("b", "bb")
			},
		]);

		match apply_verified("aa b", &rules).unwrap_err() {
			RewriteError::NotIdempotent { rule, matches } => {
				assert_eq!(rule, "grow");
				assert_eq!(matches, 2);
			}
			_ => panic!("Expected NotIdempotent error"),
		}
	}

	#[test]
	fn test_apply_verified_allows_fixed_point_replacement() {
		// Re-matches its own output but produces the same text.
		let rules = rule_set(vec![raw("a+", "a")]);
		let rewrite = apply_verified("aaa b", &rules).unwrap();
		assert_eq!(rewrite.text, "a b");
	}
}
