/// Starter `.reblock.toml` written by `reblock --init`.
pub fn generate_init_template() -> String {
	r#"# reblock rules. Rules run top to bottom; each rule rewrites every match
# in the output of the rule before it.
root = true

# Fail when a rule matches nothing, e.g. after the target code changed shape.
strict = false

# Block rule: the trigger phrase, then everything up to and including the
# Nth closer, then the optional terminator.
[[rules]]
name = "collapse-spawn-call"
trigger = "const child = spawn("
closer = "}"
closer_count = 4
terminator = ");"
replacement = "const response = await runCommand(prompt);"

# Raw rule: a regex where `.` also matches newlines (set dot_all = false to
# opt out). The replacement is inserted verbatim; `$1` is not expanded.
[[rules]]
name = "local-api-url"
pattern = 'http://localhost:\d+'
replacement = "https://api.example.com"
"#
	.to_string()
}
