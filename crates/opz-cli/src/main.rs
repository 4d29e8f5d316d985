use std::fs::{self, File};
use std::io::{BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use opz_core::{DecodeError, Decoder, Dictionary, Report, TextLogSource};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("OPZ_BUILD_COMMIT"),
    " ",
    env!("OPZ_BUILD_DATE"),
    ")"
);

const ISSUE_HINT: &str = "unknown OP-Z values can be reported at https://github.com/nbw/opz/issues";

#[derive(Parser, Debug)]
#[command(name = "opz")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decode OP-Z MIDI messages into labeled track/action events.",
    long_about = None,
    after_help = "Examples:\n  opz decode 144 60 100\n  opz decode 0xF8\n  opz log decode session.txt -o events.json\n  opz dictionary tracks"
)]
struct Cli {
    /// Alternate dictionary JSON (defaults to the bundled tables)
    #[arg(long, global = true, env = "OPZ_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "OPZ_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single message given as bytes (decimal or 0x-prefixed hex).
    Decode {
        /// Message bytes, status byte first
        #[arg(required = true, num_args = 1..)]
        bytes: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Exit with a non-zero code if the message is untracked
        #[arg(long)]
        strict: bool,
    },
    /// Operations on text message logs (one message per line).
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// Inspect the dictionary tables.
    Dictionary {
        #[command(subcommand)]
        command: DictionaryCommands,
    },
}

#[derive(Subcommand, Debug)]
enum LogCommands {
    /// Decode a message log and generate a versioned JSON report.
    #[command(
        after_help = "Examples:\n  opz log decode session.txt -o report.json\n  opz log decode 'captures/*.txt' --stdout --pretty"
    )]
    Decode {
        /// Path to a .txt or .log message log (a glob matching one file is accepted)
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any message is untracked
        #[arg(long)]
        strict: bool,

        /// List untracked messages after decoding
        #[arg(long)]
        list_untracked: bool,
    },
}

#[derive(Subcommand, Debug)]
enum DictionaryCommands {
    /// List track names.
    Tracks,
    /// List color names.
    Colors,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = load_decoder(cli.dictionary.as_ref()).and_then(|decoder| match cli.command {
        Commands::Decode {
            bytes,
            pretty,
            strict,
        } => cmd_decode(&decoder, &bytes, pretty, strict),
        Commands::Log { command } => match command {
            LogCommands::Decode {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_untracked,
            } => cmd_log_decode(
                &decoder,
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_untracked,
            ),
        },
        Commands::Dictionary { command } => {
            cmd_dictionary(decoder.dictionary(), command);
            Ok(())
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn load_decoder(dictionary: Option<&PathBuf>) -> Result<Decoder, CliError> {
    let Some(path) = dictionary else {
        return Decoder::bundled()
            .context("bundled dictionary is invalid")
            .map_err(Into::into);
    };
    let file = File::open(path).map_err(|err| {
        CliError::new(
            format!("cannot open dictionary {}: {}", path.display(), err),
            Some("pass a JSON dictionary file or omit --dictionary".to_string()),
        )
    })?;
    let dictionary = Dictionary::from_reader(BufReader::new(file)).map_err(|err| {
        CliError::new(
            format!("invalid dictionary {}: {}", path.display(), err),
            Some("the dictionary must be a JSON object of lookup tables".to_string()),
        )
    })?;
    debug!(path = %path.display(), "loaded dictionary");
    Ok(Decoder::new(dictionary))
}

fn cmd_decode(
    decoder: &Decoder,
    bytes: &[String],
    pretty: bool,
    strict: bool,
) -> Result<(), CliError> {
    let line = bytes.join(" ");
    let message = opz_core::parse_message_line(&line)
        .map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("bytes are 0-255, decimal or 0x-prefixed hex".to_string()),
            )
        })?
        .ok_or_else(|| CliError::new("no message bytes given", None))?;

    match decoder.try_decode(&message) {
        Ok(event) => {
            let json = if pretty {
                serde_json::to_string_pretty(&event)
            } else {
                serde_json::to_string(&event)
            }
            .context("JSON serialization failed")?;
            println!("{}", json);
            Ok(())
        }
        Err(err) => {
            opz_core::report_untracked(&err);
            if strict {
                return Err(untracked_error(&err));
            }
            Ok(())
        }
    }
}

fn untracked_error(err: &DecodeError) -> CliError {
    CliError::new(err.to_string(), Some(ISSUE_HINT.to_string()))
}

fn cmd_log_decode(
    decoder: &Decoder,
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_untracked: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        // A directory that does not exist yet cannot hold the input.
        let report_dir = match report_path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Some(PathBuf::from(".")),
            Some(parent) if parent.exists() => Some(parent.to_path_buf()),
            _ => None,
        };
        if let Some(report_dir) = report_dir {
            let report_dir = fs::canonicalize(&report_dir).with_context(|| {
                format!("Failed to resolve output path: {}", report_path.display())
            })?;
            let report_target = report_dir.join(
                report_path
                    .file_name()
                    .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
            );
            if report_target == input_abs {
                return Err(CliError::new(
                    format!(
                        "report path must differ from input: {}",
                        report_path.display()
                    ),
                    Some("choose a different output path".to_string()),
                ));
            }
        }
    }

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;

    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .txt or .log message log".to_string()),
        ));
    }

    let file = File::open(&resolved_input)
        .with_context(|| format!("Failed to open input file: {}", resolved_input.display()))?;
    let source = TextLogSource::new(BufReader::new(file));
    let mut rep = opz_core::decode_source(
        &resolved_input.display().to_string(),
        meta.len(),
        source,
        decoder,
    )
    .context("message log decoding failed")?;
    rep.generated_at = now_rfc3339()?;
    let json = serialize_report(&rep, pretty, compact)?;

    if stdout {
        print!("{}", json);
        if list_untracked && !quiet {
            print_untracked(&rep);
        }
        if strict && has_untracked(&rep) {
            return Err(strict_error());
        }
        return Ok(());
    }

    let report = report.ok_or_else(|| CliError::new("missing output path", None))?;
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if list_untracked && !quiet {
        print_untracked(&rep);
    }
    if !quiet {
        eprintln!(
            "OK: {} decoded, {} malformed, {} untracked -> {}",
            rep.summary.decoded,
            rep.summary.malformed,
            rep.summary.untracked,
            report.display()
        );
    }
    if strict && has_untracked(&rep) {
        return Err(strict_error());
    }
    Ok(())
}

fn now_rfc3339() -> Result<String, CliError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("failed to format report timestamp")
        .map_err(Into::into)
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn has_untracked(rep: &Report) -> bool {
    !rep.untracked.is_empty()
}

fn strict_error() -> CliError {
    CliError::new(
        "untracked MIDI messages detected",
        Some("use --list-untracked to inspect".to_string()),
    )
}

fn print_untracked(rep: &Report) {
    eprintln!("Untracked messages:");
    for record in &rep.untracked {
        eprintln!(
            "  line {}: {:?} ({})",
            record.line, record.bytes, record.reason
        );
    }
}

fn cmd_dictionary(dictionary: &Dictionary, command: DictionaryCommands) {
    let names = match command {
        DictionaryCommands::Tracks => dictionary.tracks(),
        DictionaryCommands::Colors => dictionary.colors(),
    };
    for name in names {
        println!("{}", name);
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .txt or .log message log".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "txt" && ext != "log" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .txt or .log message log".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .txt or .log".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single message log, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches.iter().take(3).collect::<Vec<_>>();
        if !listed.is_empty() {
            message.push_str("; matches: ");
            message.push_str(
                &listed
                    .into_iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            if matches.len() > 3 {
                message.push_str(", ...");
            }
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
