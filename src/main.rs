//! Prompt Template CLI
//!
//! Usage:
//!   prompt-template [OPTIONS] [FILE]
//!
//! Options:
//!   -v, --vars <FILE>        Bindings file (.toml or .json), may repeat
//!   -s, --set <PATH=VALUE>   Bind a string value, may repeat
//!   -p, --prompt             Input is a prompt store record (JSON)
//!       --prompt-version <N> Render version N of the prompt record
//!       --syntax <SYNTAX>    Placeholder syntax: dollar or braces
//!       --html               Escape substituted values for HTML
//!   -c, --config <FILE>      Render configuration (TOML)
//!   -l, --list-vars          Print referenced variables and exit
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{debug, warn};

use prompt_template::{
    parse_with_syntax, render_with_config, Bindings, Escape, PromptRecord, RenderConfig, Syntax,
    Template,
};

#[derive(Clone, Copy, ValueEnum)]
enum SyntaxArg {
    Dollar,
    Braces,
}

impl From<SyntaxArg> for Syntax {
    fn from(arg: SyntaxArg) -> Self {
        match arg {
            SyntaxArg::Dollar => Syntax::Dollar,
            SyntaxArg::Braces => Syntax::Braces,
        }
    }
}

#[derive(Parser)]
#[command(name = "prompt-template")]
#[command(about = "Render prompt templates with ${variable} substitution")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Bindings file (.toml or .json); later files override earlier ones
    #[arg(short, long = "vars", value_name = "FILE")]
    vars: Vec<PathBuf>,

    /// Bind PATH to a string VALUE, applied after --vars files
    #[arg(short, long = "set", value_name = "PATH=VALUE")]
    set: Vec<String>,

    /// Treat the input as a prompt store record and render its text
    #[arg(short, long)]
    prompt: bool,

    /// Render this version of the prompt record instead of the current text
    #[arg(long, value_name = "N", requires = "prompt")]
    prompt_version: Option<i64>,

    /// Placeholder syntax (overrides the config file)
    #[arg(long, value_enum)]
    syntax: Option<SyntaxArg>,

    /// Escape substituted values for HTML output
    #[arg(long)]
    html: bool,

    /// Render configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the variables the template references and exit
    #[arg(short, long)]
    list_vars: bool,
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    // Read input
    let (filename, content) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (path.display().to_string(), content),
            Err(e) => fail(&format!("Error reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => ("<stdin>".to_string(), buffer),
                Err(e) => fail(&format!("Error reading from stdin: {}", e)),
            }
        }
    };

    match run(&cli, &filename, &content) {
        Ok(output) => print!("{}", output),
        Err(msg) => fail(&msg),
    }
}

/// Produce the CLI's stdout for already-read input
fn run(cli: &Cli, filename: &str, content: &str) -> Result<String, String> {
    let config = resolve_config(cli)?;

    let record = if cli.prompt {
        let record = PromptRecord::from_json(content)
            .map_err(|e| format!("Error reading prompt record '{}': {}", filename, e))?;
        match cli.prompt_version {
            Some(version) => Some(record.at_version(version).ok_or_else(|| {
                format!("Prompt '{}' has no version {}", record.name, version)
            })?),
            None => Some(record),
        }
    } else {
        None
    };
    let source = record.as_ref().map(|r| r.text.as_str()).unwrap_or(content);

    let template =
        parse_with_syntax(source, config.syntax).map_err(|e| e.format(source, filename))?;
    debug!("template has {} placeholders", template.placeholders().count());

    if let Some(record) = &record {
        let check = record.check_variables(&template);
        for name in &check.undeclared {
            warn!("prompt '{}' uses undeclared variable '{}'", record.name, name);
        }
        for name in &check.unused {
            warn!("prompt '{}' declares unused variable '{}'", record.name, name);
        }
    }

    if cli.list_vars {
        return Ok(variable_list(&template));
    }

    let bindings = load_bindings(cli)?;
    render_with_config(&template, &bindings, &config).map_err(|e| e.format(source, filename))
}

/// Config file first, then flag overrides
fn resolve_config(cli: &Cli) -> Result<RenderConfig, String> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::from_file(path)
            .map_err(|e| format!("Error loading config '{}': {}", path.display(), e))?,
        None => RenderConfig::default(),
    };
    if let Some(syntax) = cli.syntax {
        config.syntax = syntax.into();
    }
    if cli.html {
        config.escape = Escape::Html;
    }
    Ok(config)
}

fn load_bindings(cli: &Cli) -> Result<Bindings, String> {
    let mut bindings = Bindings::new();
    for path in &cli.vars {
        let loaded = Bindings::from_file(path)
            .map_err(|e| format!("Error loading bindings '{}': {}", path.display(), e))?;
        debug!("loaded {} bindings from {}", loaded.len(), path.display());
        bindings.merge(loaded);
    }
    for assignment in &cli.set {
        bindings
            .parse_assignment(assignment)
            .map_err(|e| format!("Error in --set: {}", e))?;
    }
    Ok(bindings)
}

/// One referenced path per line
fn variable_list(template: &Template) -> String {
    template
        .variables()
        .iter()
        .map(|path| format!("{}\n", path))
        .collect()
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use prompt_template::Value;

    fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("prompt-template").chain(args.iter().copied()))
            .expect("Should parse arguments")
    }

    #[test]
    fn test_config_defaults() {
        let config = resolve_config(&cli(&[])).unwrap();
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_config_file_is_used() {
        let config = resolve_config(&cli(&["--config", &fixture("render.toml")])).unwrap();
        assert_eq!(config.syntax, Syntax::Braces);
        assert_eq!(config.escape, Escape::None);
    }

    #[test]
    fn test_flags_override_config_file() {
        let config = resolve_config(&cli(&[
            "--config",
            &fixture("render.toml"),
            "--syntax",
            "dollar",
            "--html",
        ]))
        .unwrap();
        assert_eq!(config.syntax, Syntax::Dollar);
        assert_eq!(config.escape, Escape::Html);
    }

    #[test]
    fn test_missing_config_is_error() {
        let err = resolve_config(&cli(&["-c", &fixture("missing.toml")])).unwrap_err();
        assert!(err.starts_with("Error loading config"), "{err}");
    }

    #[test]
    fn test_bindings_merge_in_order_then_set() {
        let bindings = load_bindings(&cli(&[
            "-v",
            &fixture("bindings.toml"),
            "-v",
            &fixture("bindings.json"),
            "--set",
            "user.level=senior",
        ]))
        .unwrap();

        // Later file wins, nested maps merge, --set applies last
        assert_eq!(bindings.get("name"), Some(&Value::from("Jane")));
        let mut expected = Bindings::new();
        expected.set_path("role", "Reviewer").unwrap();
        expected.set_path("department", "Engineering").unwrap();
        expected.set_path("level", "senior").unwrap();
        assert_eq!(bindings.get("user"), Some(&Value::from(expected)));
    }

    #[test]
    fn test_set_overrides_files_regardless_of_flag_order() {
        let bindings =
            load_bindings(&cli(&["--set", "name=Zed", "-v", &fixture("bindings.json")])).unwrap();
        assert_eq!(bindings.get("name"), Some(&Value::from("Zed")));
    }

    #[test]
    fn test_bad_assignment_is_error() {
        let err = load_bindings(&cli(&["--set", "no-equals"])).unwrap_err();
        assert!(err.starts_with("Error in --set"), "{err}");
    }

    #[test]
    fn test_list_vars_output() {
        let args = cli(&["--list-vars"]);
        let out = run(&args, "t.txt", "${b} ${user.role} ${b} ${a}").unwrap();
        assert_eq!(out, "b\nuser.role\na\n");
    }

    #[test]
    fn test_run_renders_with_flags() {
        let args = cli(&["--html", "--set", "name=<Ada>"]);
        let out = run(&args, "t.txt", "Hi ${name}").unwrap();
        assert_eq!(out, "Hi &lt;Ada&gt;");
    }

    #[test]
    fn test_run_reports_unresolved_variable() {
        let err = run(&cli(&[]), "t.txt", "Hi ${name}").unwrap_err();
        assert!(err.contains("name"), "{err}");
    }

    #[test]
    fn test_run_prompt_version() {
        let record = std::fs::read_to_string(fixture("greeting.json")).unwrap();
        let args = cli(&["-p", "--prompt-version", "1", "-v", &fixture("bindings.toml")]);
        let out = run(&args, "greeting.json", &record).unwrap();
        assert_eq!(out, "Hello John!");

        let args = cli(&["-p", "--prompt-version", "9"]);
        let err = run(&args, "greeting.json", &record).unwrap_err();
        assert_eq!(err, "Prompt 'greeting-template' has no version 9");
    }

    #[test]
    fn test_prompt_version_requires_prompt() {
        assert!(Cli::try_parse_from(["prompt-template", "--prompt-version", "1"]).is_err());
    }
}
