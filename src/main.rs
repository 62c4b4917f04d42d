//! Main entry point for the IndicTrans bridge CLI

#![forbid(unsafe_code)]

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use dotenvy::dotenv;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use indictrans_bridge::cli::commands::{self, Commands, RunOptions};

const USAGE: &str = "Usage: indictrans-bridge [OPTIONS] <text> [source_lang] [target_lang]";

/// IndicTrans Bridge - translate text between English and Indian languages
#[derive(Parser, Debug)]
#[command(
    name = "indictrans-bridge",
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Args {
    /// Text to translate; options go before it
    #[arg(allow_hyphen_values = true)]
    text: Option<String>,

    /// Source language code (e.g. en, hi, ta or eng_Latn)
    #[arg(default_value = "en", allow_hyphen_values = true)]
    source_lang: String,

    /// Target language code
    #[arg(default_value = "hi", allow_hyphen_values = true)]
    target_lang: String,

    /// Configuration file (JSON); environment variables are used otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend override: mock, command or http
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// A lone token such as `--bogus` or `-x` is an option, not text.
/// Hyphen-leading text with spaces or digits (`-3 degrees`) is text;
/// anything else can still be passed after `--`.
fn looks_like_option(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    !arg.chars().any(char::is_whitespace)
        && rest
            .chars()
            .next()
            .is_some_and(|c| c == '-' || c.is_ascii_alphabetic())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let default_filter = format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), level);

    // stdout carries the JSON answer, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn usage_failure<W: Write>(out: &mut W, message: &str) -> i32 {
    if let Err(e) = commands::emit_usage_error(out, message) {
        eprintln!("{}", e);
    }
    1
}

/// Parse `argv`, run the command and return the process exit code.
///
/// Exit code 1 is reserved for malformed invocations; translation and
/// configuration failures are written into the JSON answer with exit code 0.
async fn run<I, T, W>(argv: I, out: &mut W) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            return match write!(out, "{}", e.render()) {
                Ok(()) => 0,
                Err(_) => 1,
            };
        }
        Err(e) => {
            let detail = e.to_string();
            let first = detail.lines().next().unwrap_or_default().trim_start_matches("error: ");
            return usage_failure(out, &format!("{} ({})", USAGE, first));
        }
    };

    init_logging(args.verbose);

    let options = RunOptions {
        config: args.config,
        backend: args.backend,
        pretty: args.pretty,
    };

    let outcome = match args.command {
        Some(Commands::Batch { file, langs }) => commands::handle_batch(file, langs, &options, out).await,
        Some(Commands::Object { file, keys, langs }) => {
            commands::handle_object(file, keys, langs, &options, out).await
        }
        Some(Commands::Languages) => commands::handle_languages(&options, out),
        None => match args.text {
            Some(text) if looks_like_option(&text) => {
                return usage_failure(out, &format!("{} (unexpected argument '{}')", USAGE, text));
            }
            Some(_) if args.source_lang.starts_with('-') || args.target_lang.starts_with('-') => {
                return usage_failure(out, &format!("{} (options must come before the text)", USAGE));
            }
            Some(text) => {
                commands::handle_translate(text, args.source_lang, args.target_lang, &options, out).await
            }
            None => return usage_failure(out, USAGE),
        },
    };

    match outcome {
        Ok(()) => 0,
        Err(e) => usage_failure(out, &e.to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let mut stdout = std::io::stdout();
    let code = run(std::env::args_os(), &mut stdout).await;
    stdout.flush()?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn run_cli(argv: &[&str]) -> (i32, Value) {
        let mut out = Vec::new();
        let code = run(argv.iter().copied(), &mut out).await;
        let json = serde_json::from_slice(&out).unwrap();
        (code, json)
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    fn mock_config(dir: &tempfile::TempDir) -> String {
        write_file(dir, "bridge.json", r#"{"backend": "mock"}"#)
    }

    #[test]
    fn test_positional_defaults() {
        let args = Args::try_parse_from(["indictrans-bridge", "Hello world"]).unwrap();
        assert_eq!(args.text.as_deref(), Some("Hello world"));
        assert_eq!(args.source_lang, "en");
        assert_eq!(args.target_lang, "hi");
        assert!(args.command.is_none());
    }

    #[test]
    fn test_explicit_languages_and_flags() {
        let args = Args::try_parse_from([
            "indictrans-bridge",
            "--backend",
            "mock",
            "--pretty",
            "Good morning",
            "en",
            "ta",
        ])
        .unwrap();
        assert_eq!(args.target_lang, "ta");
        assert_eq!(args.backend.as_deref(), Some("mock"));
        assert!(args.pretty);
    }

    #[test]
    fn test_hyphen_leading_text_parses() {
        let args = Args::try_parse_from(["indictrans-bridge", "-3 degrees tonight", "en", "hi"]).unwrap();
        assert_eq!(args.text.as_deref(), Some("-3 degrees tonight"));
        assert_eq!(args.source_lang, "en");
        assert_eq!(args.target_lang, "hi");
    }

    #[test]
    fn test_looks_like_option() {
        assert!(looks_like_option("--bogus"));
        assert!(looks_like_option("-x"));
        assert!(!looks_like_option("-3 degrees tonight"));
        assert!(!looks_like_option("-5"));
        assert!(!looks_like_option("- bullet point"));
        assert!(!looks_like_option("Hello"));
    }

    #[test]
    fn test_subcommands() {
        let args = Args::try_parse_from([
            "indictrans-bridge",
            "object",
            "--file",
            "doc.json",
            "--keys",
            "body,caption",
            "--target",
            "bn",
        ])
        .unwrap();
        match args.command {
            Some(Commands::Object { file, keys, langs }) => {
                assert_eq!(file, PathBuf::from("doc.json"));
                assert_eq!(keys, vec!["body", "caption"]);
                assert_eq!(langs.source_lang, "en");
                assert_eq!(langs.target_lang, "bn");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let args = Args::try_parse_from(["indictrans-bridge", "languages", "--pretty"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Languages)));
        assert!(args.pretty);
    }

    #[tokio::test]
    async fn test_no_arguments_exits_with_usage() {
        let (code, json) = run_cli(&["indictrans-bridge"]).await;
        assert_eq!(code, 1);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Usage:"));
    }

    #[tokio::test]
    async fn test_unknown_flag_exits_with_usage() {
        for flag in ["--bogus", "-x"] {
            let (code, json) = run_cli(&["indictrans-bridge", flag]).await;
            assert_eq!(code, 1, "{}", flag);
            assert_eq!(json["success"], false);
            assert!(json["error"].as_str().unwrap().contains(flag));
        }

        let (code, _) = run_cli(&["indictrans-bridge", "a", "en", "hi", "extra"]).await;
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn test_option_after_text_is_rejected() {
        let (code, json) = run_cli(&["indictrans-bridge", "Hello", "--pretty"]).await;
        assert_eq!(code, 1);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_translates_hyphen_leading_text() {
        let dir = tempfile::tempdir().unwrap();
        let config = mock_config(&dir);

        let (code, json) =
            run_cli(&["indictrans-bridge", "--config", &config, "-3 degrees tonight", "en", "hi"]).await;
        assert_eq!(code, 0);
        assert_eq!(json["success"], true);
        assert_eq!(json["original"], "-3 degrees tonight");
        assert_eq!(json["target_language"], "hin_Deva");
    }

    #[tokio::test]
    async fn test_single_translation() {
        let dir = tempfile::tempdir().unwrap();
        let config = mock_config(&dir);

        let (code, json) = run_cli(&["indictrans-bridge", "--config", &config, "Hello world", "en", "hi"]).await;
        assert_eq!(code, 0);
        assert_eq!(json["success"], true);
        assert_eq!(json["translated"], "नमस्ते संसार");
        assert_eq!(json["cached"], false);
    }

    #[tokio::test]
    async fn test_invalid_config_file_is_reported_in_band() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "bridge.json", r#"{"timeout_ms": 0}"#);

        let (code, json) = run_cli(&["indictrans-bridge", "--config", &config, "Hello", "en", "ta"]).await;
        assert_eq!(code, 0);
        assert_eq!(json["success"], false);
        assert_eq!(json["translated"], "Hello");
        assert_eq!(json["target_language"], "tam_Taml");
        assert!(json["error"].as_str().unwrap().contains("Configuration error"));
    }

    #[tokio::test]
    async fn test_invalid_env_config_is_reported_in_band() {
        // The only test in this binary that reads configuration from the environment
        std::env::set_var("BRIDGE_TIMEOUT_MS", "soon");
        let (code, json) = run_cli(&["indictrans-bridge", "Hello world"]).await;
        std::env::remove_var("BRIDGE_TIMEOUT_MS");

        assert_eq!(code, 0);
        assert_eq!(json["success"], false);
        assert_eq!(json["original"], "Hello world");
        assert_eq!(json["translated"], "Hello world");
    }

    #[tokio::test]
    async fn test_batch_with_unloadable_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(
            &dir,
            "bridge.json",
            r#"{"backend": "command", "command": ["/nonexistent/worker"]}"#,
        );
        let input = write_file(&dir, "texts.json", r#"["Hello", "Good night", "Thank you"]"#);

        let (code, json) = run_cli(&[
            "indictrans-bridge",
            "--config",
            &config,
            "batch",
            "--file",
            &input,
            "--target",
            "bn",
        ])
        .await;

        assert_eq!(code, 0);
        let results = json.as_array().unwrap();
        assert_eq!(results.len(), 3);
        for (result, text) in results.iter().zip(["Hello", "Good night", "Thank you"]) {
            assert_eq!(result["success"], false);
            assert_eq!(result["translated"], text);
            assert_eq!(result["target_language"], "ben_Beng");
        }
    }

    #[tokio::test]
    async fn test_batch_missing_input_file_exits_with_usage() {
        let (code, json) = run_cli(&["indictrans-bridge", "batch", "--file", "/no/such/texts.json"]).await;
        assert_eq!(code, 1);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_object_with_invalid_config_returns_document_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_file(&dir, "bridge.json", r#"{"cache_capacity": 0}"#);
        let input = write_file(&dir, "doc.json", r#"{"title": "Hello", "id": 7}"#);

        let (code, json) =
            run_cli(&["indictrans-bridge", "--config", &config, "object", "--file", &input]).await;
        assert_eq!(code, 0);
        assert_eq!(json, serde_json::json!({"title": "Hello", "id": 7}));
    }

    #[tokio::test]
    async fn test_languages() {
        let (code, json) = run_cli(&["indictrans-bridge", "languages"]).await;
        assert_eq!(code, 0);
        assert!(json
            .as_array()
            .unwrap()
            .iter()
            .any(|l| l["code"] == "hi" && l["tag"] == "hin_Deva"));
    }
}
