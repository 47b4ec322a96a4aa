//! pm2md: CLI tool to convert ProseMirror-style JSON documents to Markdown

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config};
use pm2md_core::{Bullet, HardBreak, WriterOptions, convert};

#[derive(Parser, Debug)]
#[command(name = "pm2md")]
#[command(about = "Convert ProseMirror-style JSON documents to Markdown")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "Examples:
  pm2md < post.json                 # Convert stdin to stdout
  pm2md post.json                   # Convert single file to post.md
  pm2md post.json -o out.md         # Convert to specific output file
  pm2md posts/ -o docs/ -r          # Convert directory recursively
  pm2md posts/ -o docs/ -j4         # Use 4 parallel jobs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Input JSON file or directory (`-` or omitted reads stdin)
    input: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// What to write for each document
    #[arg(long, value_enum, default_value_t = Emit::Markdown)]
    emit: Emit,

    /// Bullet list marker: "*", "-" or "+"
    #[arg(long)]
    bullet: Option<Bullet>,

    /// Hard line break style: "backslash" or "spaces"
    #[arg(long)]
    hard_break: Option<HardBreak>,

    /// Configuration file (defaults to `_pm2md.toml` next to the input)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample `_pm2md.toml` configuration file
    Init {
        /// Directory to write the configuration file into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Markdown
    Markdown,
    /// The normalized JSON tree
    Normalized,
}

/// Resolved conversion settings: CLI flags over config file over defaults
#[derive(Debug, Clone)]
struct Settings {
    writer: WriterOptions,
    emit: Emit,
    output_extension: String,
    input_extension: String,
    trailing_newline: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: &Config) -> Self {
        let writer = WriterOptions {
            bullet: cli.bullet.or(config.output.bullet).unwrap_or_default(),
            hard_break: cli
                .hard_break
                .or(config.output.hard_break)
                .unwrap_or_default(),
        };
        let output_extension = match cli.emit {
            Emit::Markdown => config
                .output
                .extension
                .clone()
                .unwrap_or_else(|| "md".to_string()),
            Emit::Normalized => "normalized.json".to_string(),
        };

        Self {
            writer,
            emit: cli.emit,
            output_extension,
            input_extension: config
                .input
                .extension
                .clone()
                .unwrap_or_else(|| "json".to_string()),
            trailing_newline: config.output.trailing_newline.unwrap_or(true),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` takes precedence over the flags
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Command::Init { dir, force }) => return init_config(dir, *force, cli.quiet),
        Some(Command::Schema) => {
            println!("{}", Config::json_schema_string()?);
            return Ok(());
        }
        None => {}
    }

    let input = cli.input.as_deref().filter(|p| *p != Path::new("-"));
    let config = load_config(cli.config.as_deref(), input)?;
    let settings = Settings::resolve(cli, &config);
    tracing::debug!(?settings, "Resolved settings");

    match input {
        None => convert_stdin(cli.output.as_deref(), &settings),
        Some(path) if path.is_file() => {
            convert_file(path, cli.output.as_deref(), &settings, cli.quiet)
        }
        Some(path) if path.is_dir() => convert_directory(
            path,
            cli.output.as_deref(),
            cli.recursive,
            &settings,
            cli.quiet,
            cli.jobs,
        ),
        Some(path) => anyhow::bail!("Input path does not exist: {}", path.display()),
    }
}

/// Load the explicit config file, or `_pm2md.toml` from the input's directory
fn load_config(explicit: Option<&Path>, input: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }

    let dir = match input {
        Some(path) if path.is_dir() => path.to_path_buf(),
        Some(path) => path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        None => PathBuf::from("."),
    };
    // A bare file name has an empty parent
    let dir = if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    };

    match Config::load_from_dir(&dir)? {
        Some(config) => {
            tracing::debug!("Using {}", dir.join(CONFIG_FILE_NAME).display());
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Write a sample configuration file
fn init_config(dir: &Path, force: bool, quiet: bool) -> Result<()> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    fs::write(&path, Config::sample().to_toml_with_schema()?)
        .with_context(|| format!("Failed to write: {}", path.display()))?;

    if !quiet {
        println!("{}", path.display());
    }

    Ok(())
}

/// Convert JSON read from stdin, writing to stdout or the output file
fn convert_stdin(output: Option<&Path>, settings: &Settings) -> Result<()> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read stdin")?;

    let rendered = convert_document(&content, settings)?;

    match output {
        Some(path) => write_output(path, &rendered),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write stdout")
        }
    }
}

/// Convert a single JSON file
fn convert_file(
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
    quiet: bool,
) -> Result<()> {
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension(&settings.output_extension),
    };

    tracing::info!(
        "Converting: {} -> {}",
        input.display(),
        output_path.display()
    );

    convert_file_inner(input, &output_path, settings)?;

    if !quiet {
        println!("{}", output_path.display());
    }

    Ok(())
}

/// Convert a directory of JSON files
fn convert_directory(
    input: &Path,
    output: Option<&Path>,
    recursive: bool,
    settings: &Settings,
    quiet: bool,
    jobs: Option<usize>,
) -> Result<()> {
    let output_dir = output.unwrap_or(input);

    let files = collect_json_files(input, recursive, settings)?;

    if files.is_empty() {
        if !quiet {
            eprintln!(
                "No .{} files found in {}",
                settings.input_extension,
                input.display()
            );
        }
        return Ok(());
    }

    let total = files.len();
    tracing::info!("Found {} .{} files", total, settings.input_extension);

    // Configure thread pool if jobs specified
    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let success = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let errors: Vec<_> = files
        .par_iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(input).unwrap_or(file);
            let output_file = output_path_for(output_dir, relative, settings);

            match convert_file_inner(file, &output_file, settings) {
                Ok(()) => {
                    success.fetch_add(1, Ordering::Relaxed);
                    if !quiet {
                        println!("{}", output_file.display());
                    }
                    None
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    Some((file.clone(), e))
                }
            }
        })
        .collect();

    for (file, e) in &errors {
        eprintln!("Error converting {}: {:#}", file.display(), e);
    }

    let success_count = success.load(Ordering::Relaxed);
    let failed_count = failed.load(Ordering::Relaxed);

    if !quiet {
        eprintln!("Converted {} files, {} failed", success_count, failed_count);
    }

    if failed_count > 0 {
        anyhow::bail!("{} files failed to convert", failed_count);
    }

    Ok(())
}

/// Output path for an input file relative to the input directory
fn output_path_for(output_dir: &Path, relative: &Path, settings: &Settings) -> PathBuf {
    let stem = strip_input_extension(relative, &settings.input_extension);
    let mut name = stem.into_os_string();
    name.push(".");
    name.push(&settings.output_extension);
    output_dir.join(name)
}

/// Remove the (possibly multi-part) input extension from a path
fn strip_input_extension(path: &Path, extension: &str) -> PathBuf {
    let suffix = format!(".{}", extension.to_ascii_lowercase());
    let raw = path.to_string_lossy();
    if raw.to_ascii_lowercase().ends_with(&suffix) && raw.len() > suffix.len() {
        PathBuf::from(&raw[..raw.len() - suffix.len()])
    } else {
        path.with_extension("")
    }
}

/// Inner conversion function that doesn't print (for parallel use)
fn convert_file_inner(input: &Path, output: &Path, settings: &Settings) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;

    let rendered = convert_document(&content, settings)?;

    write_output(output, &rendered)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))
}

/// Collect all input documents in a directory, in a stable order
fn collect_json_files(dir: &Path, recursive: bool, settings: &Settings) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", settings.input_extension.to_ascii_lowercase());
    let skip = format!(".{}", settings.output_extension.to_ascii_lowercase());
    let mut files = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            // Earlier `--emit normalized` output shares the input extension
            if name.ends_with(&suffix) && !name.ends_with(&skip) {
                files.push(path);
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_json_files(&path, recursive, settings)?);
        }
    }

    files.sort();
    Ok(files)
}

/// Core conversion function
fn convert_document(content: &str, settings: &Settings) -> Result<String> {
    let mut rendered = match settings.emit {
        Emit::Markdown => convert(content, &settings.writer)?,
        Emit::Normalized => {
            let doc = pm_model::normalize(&pm_model::parse(content)?);
            serde_json::to_string_pretty(&doc).context("Failed to serialize normalized tree")?
        }
    };

    if settings.trailing_newline && !rendered.is_empty() {
        rendered.push('\n');
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        let cli = Cli::parse_from(["pm2md"]);
        Settings::resolve(&cli, &Config::default())
    }

    #[test]
    fn test_flags_override_config() {
        let config: Config = toml::from_str(
            r#"
            [output]
            bullet = "+"
            hard_break = "spaces"
            "#,
        )
        .unwrap();

        let cli = Cli::parse_from(["pm2md", "--bullet", "-"]);
        let settings = Settings::resolve(&cli, &config);
        assert_eq!(settings.writer.bullet, Bullet::Dash);
        assert_eq!(settings.writer.hard_break, HardBreak::Spaces);
    }

    #[test]
    fn test_default_settings() {
        let settings = settings();
        assert_eq!(settings.writer, WriterOptions::default());
        assert_eq!(settings.emit, Emit::Markdown);
        assert_eq!(settings.output_extension, "md");
        assert_eq!(settings.input_extension, "json");
        assert!(settings.trailing_newline);
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::parse_from(["pm2md", "schema"]);
        assert!(matches!(cli.command, Some(Command::Schema)));

        let cli = Cli::parse_from(["pm2md", "init", "site", "--force"]);
        assert!(matches!(
            cli.command,
            Some(Command::Init { ref dir, force: true }) if dir.as_path() == Path::new("site")
        ));
    }

    #[test]
    fn test_convert_document_trailing_newline() {
        let json = r#"{"type":"paragraph","content":[{"type":"text","text":"hi"}]}"#;
        let mut settings = settings();
        assert_eq!(convert_document(json, &settings).unwrap(), "hi\n");

        settings.trailing_newline = false;
        assert_eq!(convert_document(json, &settings).unwrap(), "hi");
    }

    #[test]
    fn test_empty_document_has_no_newline() {
        let json = r#"{"type":"doc","content":[]}"#;
        assert_eq!(convert_document(json, &settings()).unwrap(), "");
    }

    #[test]
    fn test_emit_normalized() {
        let cli = Cli::parse_from(["pm2md", "--emit", "normalized"]);
        let settings = Settings::resolve(&cli, &Config::default());
        let json = r#"{"type":"doc","content":[{"type":"horizontalRule"}]}"#;

        let out = convert_document(json, &settings).unwrap();
        assert!(out.contains("\"horizontal_rule\""));
        assert!(!out.contains("horizontalRule"));
    }

    #[test]
    fn test_output_path_for() {
        let settings = settings();
        assert_eq!(
            output_path_for(Path::new("out"), Path::new("a/post.json"), &settings),
            PathBuf::from("out/a/post.md")
        );
        assert_eq!(
            output_path_for(Path::new("out"), Path::new("v1.2.JSON"), &settings),
            PathBuf::from("out/v1.2.md")
        );
    }
}
