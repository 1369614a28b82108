//! Rule sets and the rewrite engine for reblock.
//!
//! This module handles:
//! - Compiling configured rules into an ordered rule set
//! - Applying a rule set to a document, rule by rule, replacing every match

pub mod matcher;
pub mod rewriter;

pub use matcher::{CompiledRule, RuleSet, block_pattern, compile_rules};
pub use rewriter::{Rewrite, RuleOutcome, apply, apply_verified, rewrite_text};
