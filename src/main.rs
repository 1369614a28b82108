use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use reblock_cli::config::{
	CONFIG_FILE_NAME, MergedConfig, generate_init_template, load_config_file, load_merged_config,
	user_config_path,
};
use reblock_cli::exec::{RewriteOptions, rewrite_file};
use reblock_cli::rules::compile_rules;
use reblock_cli::store::FsStore;

#[derive(Parser)]
#[command(name = "reblock")]
#[command(
	author,
	version,
	about = "CLI tool for collapsing multi-line code blocks with declarative rewrite rules"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Rule file to use instead of discovering .reblock.toml files
	#[arg(short, long, value_name = "PATH", global = true)]
	config: Option<PathBuf>,

	/// Report files that would change without writing them
	#[arg(long)]
	check: bool,

	/// Run the rules a second time and fail if that changes anything
	#[arg(long)]
	verify: bool,

	/// Fail when a rule matches nothing
	#[arg(long)]
	strict: bool,

	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	/// Create a template .reblock.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .reblock.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Files to rewrite in place
	#[arg(value_name = "FILE")]
	files: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the effective rules in application order
	Show,
	/// Check rule files for errors without rewriting anything
	Validate,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

/// Log to stderr. `REBLOCK_LOG` overrides the level picked by `-v`.
fn init_logging(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_env("REBLOCK_LOG").unwrap_or_else(|_| {
		EnvFilter::new(format!(
			"reblock={default_level},reblock_cli={default_level}"
		))
	});

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	if cli.init {
		return handle_init(cli.force);
	}

	if let Some(command) = cli.command {
		return match command {
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(cli.config.as_deref()),
				ConfigAction::Validate => handle_config_validate(cli.config.as_deref()),
			},
		};
	}

	if cli.files.is_empty() {
		anyhow::bail!("No files given. Pass one or more files to rewrite.");
	}

	let config = load_config(cli.config.as_deref())?;
	let options = RewriteOptions {
		strict: cli.strict || config.strict,
		verify: cli.verify,
		dry_run: cli.check,
	};
	handle_rewrite(&cli.files, &config, &options)
}

fn load_config(explicit: Option<&Path>) -> Result<MergedConfig> {
	match explicit {
		Some(path) => load_config_file(path)
			.with_context(|| format!("Failed to load rule file {}", path.display())),
		None => {
			let cwd = std::env::current_dir().context("Failed to get current directory")?;
			load_merged_config(&cwd).context("Failed to load configuration")
		}
	}
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show(explicit: Option<&Path>) -> Result<ExitCode> {
	let config = load_config(explicit)?;

	if config.rules.is_empty() {
		println!("No rules configured.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Rules (in application order):\n");
	println!("# strict: {}\n", config.strict);

	for (i, rws) in config.rules.iter().enumerate() {
		let rule = &rws.rule;
		println!("  {}:", rule.display_name(i));
		println!("    source: {}", rws.source.display());
		if let Some(ref pattern) = rule.pattern {
			println!("    pattern: {}", pattern);
			if let Some(dot_all) = rule.dot_all {
				println!("    dot_all: {}", dot_all);
			}
		}
		if let Some(ref trigger) = rule.trigger {
			println!("    trigger: {}", trigger);
			if let Some(closer) = rule.closer {
				println!("    closer: {}", closer);
			}
			if let Some(count) = rule.closer_count {
				println!("    closer_count: {}", count);
			}
			if let Some(ref terminator) = rule.terminator {
				println!("    terminator: {}", terminator);
			}
		}
		println!("    replacement: {}", rule.replacement);
		println!();
	}

	if explicit.is_none()
		&& let Ok(user_path) = user_config_path()
	{
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(explicit: Option<&Path>) -> Result<ExitCode> {
	let loaded = load_config(explicit)
		.and_then(|config| compile_rules(&config).context("Failed to compile rules"));
	let rules = match loaded {
		Ok(rules) => rules,
		Err(e) => {
			eprintln!("Configuration error: {e:#}");
			return Ok(ExitCode::FAILURE);
		}
	};

	if rules.is_empty() {
		println!("No rules configured.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("All {} rules are valid.", rules.len());
	for (rule, other) in rules.self_matching() {
		println!(
			"  warning: replacement of '{rule}' is matched by '{other}'; rewrites may not be idempotent"
		);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_rewrite(
	files: &[PathBuf],
	config: &MergedConfig,
	options: &RewriteOptions,
) -> Result<ExitCode> {
	let rules = compile_rules(config).context("Failed to compile rules")?;
	if rules.is_empty() {
		tracing::warn!("No rules configured; files are left unchanged");
	}

	let mut store = FsStore;
	let mut pending = 0;

	for path in files {
		let report = rewrite_file(&mut store, path, &rules, options)
			.with_context(|| format!("Failed to rewrite {}", path.display()))?;

		if !report.changed {
			println!("{}: unchanged", path.display());
		} else if options.dry_run {
			pending += 1;
			println!(
				"{}: would rewrite ({} replacements)",
				path.display(),
				report.replacements()
			);
		} else {
			println!(
				"{}: rewrote ({} replacements)",
				path.display(),
				report.replacements()
			);
		}
	}

	if options.dry_run && pending > 0 {
		println!("{pending} file(s) would be rewritten.");
		return Ok(ExitCode::FAILURE);
	}

	println!("Done.");
	Ok(ExitCode::SUCCESS)
}
