//! CLI entry point for the `dolpatch` binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ppc_encoding as _;
use ppc_patch::{apply_patch_sets, Manifest};
use serde as _;
use serde_json as _;
use thiserror as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: dolpatch <command> [options]

Commands:
  apply <binary> <manifest.json> [-o <output>] [--dry-run]  Apply a patch manifest

Options:
  -o, --output <file>  Output file path (default: <stem>.patched.<ext>)
  -n, --dry-run        Verify and apply in memory without writing output
  -h, --help           Show this help message

Logging is controlled with RUST_LOG (default: info).

Examples:
  dolpatch apply main.dol patches.json
  dolpatch apply main.dol patches.json -o patched.dol
  RUST_LOG=debug dolpatch apply main.dol patches.json --dry-run
";

#[derive(Debug, PartialEq, Eq)]
struct ApplyArgs {
    binary: PathBuf,
    manifest: PathBuf,
    output: Option<PathBuf>,
    dry_run: bool,
}

#[derive(Debug)]
enum ParseResult {
    Apply(ApplyArgs),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "apply" => parse_apply_args(args),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_apply_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut output: Option<PathBuf> = None;
    let mut dry_run = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--dry-run" || arg == "-n" {
            dry_run = true;
            continue;
        }

        if arg == "-o" || arg == "--output" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for -o".to_string())?;
            output = Some(PathBuf::from(value));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if positional.len() == 2 {
            return Err("too many paths provided".to_string());
        }
        positional.push(PathBuf::from(arg));
    }

    let mut positional = positional.into_iter();
    let binary = positional
        .next()
        .ok_or_else(|| "missing binary path".to_string())?;
    let manifest = positional
        .next()
        .ok_or_else(|| "missing manifest path".to_string())?;

    Ok(ParseResult::Apply(ApplyArgs {
        binary,
        manifest,
        output,
        dry_run,
    }))
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");

    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => parent.join(format!("{stem}.patched.{ext}")),
        None => parent.join(format!("{stem}.patched")),
    }
}

fn run_apply(args: ApplyArgs) -> Result<(), i32> {
    let manifest = Manifest::load(&args.manifest).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let mut binary = fs::read(&args.binary).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", args.binary.display());
        1
    })?;

    let patch_count = manifest.patch_count();
    let sets = manifest.into_patch_sets();

    let locations = apply_patch_sets(&sets, &mut binary).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    if args.dry_run {
        println!(
            "Dry run: {patch_count} patches ({locations} locations) apply cleanly to {}",
            args.binary.display()
        );
        return Ok(());
    }

    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.binary));

    if let Err(e) = fs::write(&output_path, &binary) {
        eprintln!("error: failed to write output: {e}");
        return Err(1);
    }

    println!(
        "Patched {} ({patch_count} patches, {locations} locations) -> {}",
        args.binary.display(),
        output_path.display()
    );

    Ok(())
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn main() {
    init_logging();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Apply(args)) => match run_apply(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    log::logger().flush();
    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn os(args: &[&str]) -> impl Iterator<Item = OsString> {
        args.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_apply_command() {
        let result = parse_apply_args(os(&["main.dol", "patches.json", "-o", "out.dol", "-n"]))
            .expect("valid apply args should parse");

        let args = match result {
            ParseResult::Apply(args) => args,
            other => panic!("expected apply arguments, got {other:?}"),
        };
        assert_eq!(
            args,
            ApplyArgs {
                binary: PathBuf::from("main.dol"),
                manifest: PathBuf::from("patches.json"),
                output: Some(PathBuf::from("out.dol")),
                dry_run: true,
            }
        );
    }

    #[test]
    fn apply_help_is_help_not_error() {
        let result = parse_args(os(&["apply", "main.dol", "--help"]))
            .expect("apply --help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(os(&["--help"])).expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args(os(&["unknown"])).expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn apply_requires_manifest() {
        let error = parse_apply_args(os(&["main.dol"])).expect_err("missing manifest should fail");
        assert!(error.contains("missing manifest"));
    }

    #[test]
    fn apply_rejects_extra_paths() {
        let error =
            parse_apply_args(os(&["a", "b", "c"])).expect_err("third path should be rejected");
        assert!(error.contains("too many paths"));
    }

    #[test]
    fn apply_rejects_unknown_options() {
        let error = parse_apply_args(os(&["a", "b", "--force"]))
            .expect_err("unknown option should fail");
        assert!(error.contains("unknown option"));
    }

    #[test]
    fn default_output_path_keeps_extension() {
        let output = default_output_path(&PathBuf::from("files/main.dol"));
        assert_eq!(output, PathBuf::from("files/main.patched.dol"));
    }

    #[test]
    fn default_output_path_no_extension() {
        let output = default_output_path(&PathBuf::from("boot"));
        assert_eq!(output, PathBuf::from("boot.patched"));
    }
}
