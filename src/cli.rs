// Idiomatic Rust CLI for vistext.
//
// Two subcommands mirror the classic vis(1)/unvis(1) pair, with long-form
// options next to the traditional single-letter flags.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec::flags::FlagSet;
use crate::codec::fold::{DEFAULT_FOLD_WIDTH, MIN_FOLD_WIDTH};
use crate::io::{IoError, decode_stream, encode_stream};
use crate::stream::decoder::{DecodeStats, UnvisOptions};
use crate::stream::encoder::{EncodeStats, VisOptions};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Reversible escaping of arbitrary bytes (vis/unvis).
#[derive(Parser, Debug)]
#[command(
    name = "vistext",
    version,
    about = "vis/unvis byte-stream escaping",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode input so that it prints safely (vis).
    Encode(EncodeArgs),
    /// Decode vis-encoded input back to the original bytes (unvis).
    Decode(DecodeArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Omit the backslash on `M-`/`^` escapes; backslash is not escaped.
    #[arg(short = 'b', long = "no-slash")]
    no_slash: bool,

    /// Prefer C-style escapes (`\n`, `\t`, `\s`, `\0`, ...).
    #[arg(short = 'c', long = "c-style")]
    c_style: bool,

    /// Also escape every character of this string.
    #[arg(short = 'e', long, value_name = "CHARS")]
    extra: Option<String>,

    /// Fold output lines to this width.
    #[arg(short = 'F', long = "fold-width", value_name = "WIDTH")]
    fold_width: Option<usize>,

    /// Fold output lines at the default width.
    #[arg(long)]
    fold: bool,

    /// URI percent-encoding.
    #[arg(long, conflicts_with = "mime")]
    http: bool,

    /// Mark end of line with a visible `\$`.
    #[arg(short = 'l', long = "mark-eol")]
    mark_eol: bool,

    /// Escape whitespace, glob and shell metacharacters.
    #[arg(short = 'M', long)]
    meta: bool,

    /// Quoted-printable encoding.
    #[arg(short = 'm', long)]
    mime: bool,

    /// Treat input as opaque bytes instead of UTF-8.
    #[arg(short = 'N', long = "no-locale")]
    no_locale: bool,

    /// No encoding, except that backslash is doubled.
    #[arg(short = 'n', long = "passthrough")]
    passthrough: bool,

    /// Use octal escapes for every escaped byte.
    #[arg(short = 'o', long)]
    octal: bool,

    /// Escape shell metacharacters.
    #[arg(short = 'S', long)]
    shell: bool,

    /// Pass backspace, bell and carriage return through.
    #[arg(short = 's', long)]
    safe: bool,

    /// Escape tab.
    #[arg(short = 't', long)]
    tab: bool,

    /// Escape space, tab and newline.
    #[arg(short = 'w', long)]
    white: bool,

    /// Escape glob metacharacters.
    #[arg(long)]
    glob: bool,

    /// Escape the double quote.
    #[arg(long = "double-quote")]
    double_quote: bool,

    /// Output file (stdout if omitted).
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Input files (stdin if none, or `-`).
    #[arg(value_hint = ValueHint::FilePath)]
    files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Treat backslash as an ordinary character.
    #[arg(short = 'e', long = "no-escape")]
    no_escape: bool,

    /// Decode HTML character references (`&amp;`, `&#233;`).
    #[arg(short = 'H', long)]
    html: bool,

    /// Decode URI percent-encoding.
    #[arg(long, conflicts_with = "mime")]
    http: bool,

    /// Decode quoted-printable.
    #[arg(short = 'm', long)]
    mime: bool,

    /// Write decoded Latin-1 characters as single bytes.
    #[arg(short = 'N', long = "no-locale")]
    no_locale: bool,

    /// Fail on the first malformed escape instead of skipping it.
    #[arg(long)]
    strict: bool,

    /// Output file (stdout if omitted).
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Input files (stdin if none, or `-`).
    #[arg(value_hint = ValueHint::FilePath)]
    files: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    flags: FlagSet,
    extra: String,
    fold_width: Option<usize>,
    mark_eol: bool,
    passthrough: bool,
    strict: bool,
    input_files: Vec<PathBuf>,
    output_file: Option<PathBuf>,
}

fn collect_flags(pairs: &[(bool, FlagSet)]) -> FlagSet {
    pairs
        .iter()
        .filter(|(on, _)| *on)
        .fold(FlagSet::empty(), |acc, &(_, flag)| acc | flag)
}

fn encode_flags(args: &EncodeArgs) -> FlagSet {
    collect_flags(&[
        (args.no_slash, FlagSet::NO_SLASH),
        (args.c_style, FlagSet::C_STYLE),
        (args.http, FlagSet::HTTP_STYLE),
        (args.meta, FlagSet::META),
        (args.mime, FlagSet::MIME_STYLE),
        (args.no_locale, FlagSet::NO_LOCALE),
        (args.octal, FlagSet::OCTAL),
        (args.shell, FlagSet::SHELL),
        (args.safe, FlagSet::SAFE_ONLY),
        (args.tab, FlagSet::TAB),
        (args.white, FlagSet::WHITE),
        (args.glob, FlagSet::GLOB),
        (args.double_quote, FlagSet::DOUBLE_QUOTE),
    ])
}

fn decode_flags(args: &DecodeArgs) -> FlagSet {
    collect_flags(&[
        (args.no_escape, FlagSet::NO_ESCAPE),
        (args.html, FlagSet::HTTP_1866),
        (args.http, FlagSet::HTTP_STYLE),
        (args.mime, FlagSet::MIME_STYLE),
        (args.no_locale, FlagSet::NO_LOCALE),
    ])
}

fn resolve_options(cli: Cli) -> Options {
    let quiet = cli.quiet;
    let verbose = cli.verbose.min(2);
    let force = cli.force;
    let json_output = cli.json_output;

    match cli.command {
        Cmd::Encode(args) => Options {
            command: Command::Encode,
            force,
            quiet,
            verbose,
            json_output,
            flags: encode_flags(&args),
            extra: args.extra.unwrap_or_default(),
            fold_width: args
                .fold_width
                .or(args.fold.then_some(DEFAULT_FOLD_WIDTH)),
            mark_eol: args.mark_eol,
            passthrough: args.passthrough,
            strict: false,
            input_files: args.files,
            output_file: args.output,
        },
        Cmd::Decode(args) => Options {
            command: Command::Decode,
            force,
            quiet,
            verbose,
            json_output,
            flags: decode_flags(&args),
            extra: String::new(),
            fold_width: None,
            mark_eol: false,
            passthrough: false,
            strict: args.strict,
            input_files: args.files,
            output_file: args.output,
        },
        Cmd::Config => Options {
            command: Command::Config,
            force,
            quiet,
            verbose,
            json_output,
            flags: FlagSet::empty(),
            extra: String::new(),
            fold_width: None,
            mark_eol: false,
            passthrough: false,
            strict: false,
            input_files: Vec::new(),
            output_file: None,
        },
    }
}

fn build_vis_options(opts: &Options) -> VisOptions {
    VisOptions {
        flags: opts.flags,
        extra: opts.extra.clone(),
        fold_width: opts.fold_width,
        mark_eol: opts.mark_eol,
        passthrough: opts.passthrough,
    }
}

fn build_unvis_options(opts: &Options) -> UnvisOptions {
    UnvisOptions {
        flags: opts.flags,
        strict: opts.strict,
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("vistext".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        let _ = build_vis_options(&opts);
        let _ = build_unvis_options(&opts);
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config(opts: &Options) -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    let fuzzing = cfg!(feature = "fuzzing") as u8;
    if opts.json_output {
        let flags: serde_json::Map<String, serde_json::Value> = FlagSet::all()
            .iter_names()
            .map(|(name, flag)| (name.to_string(), flag.bits().into()))
            .collect();
        let json = serde_json::json!({
            "version": version,
            "default_fold_width": DEFAULT_FOLD_WIDTH,
            "min_fold_width": MIN_FOLD_WIDTH,
            "buffer_size": BUF_SIZE,
            "fuzzing": fuzzing == 1,
            "flags": flags,
        });
        eprintln!("{json:#}");
        return 0;
    }

    eprintln!("vistext version {version} (Rust), Copyright (C) vistext contributors");
    eprintln!("Licensed under the MIT License");
    eprintln!("FUZZING={fuzzing}");
    eprintln!("DEFAULT_FOLD_WIDTH={DEFAULT_FOLD_WIDTH}");
    eprintln!("MIN_FOLD_WIDTH={MIN_FOLD_WIDTH}");
    eprintln!("BUF_SIZE={BUF_SIZE}");
    for (name, flag) in FlagSet::all().iter_names() {
        eprintln!("VIS_{name}={:#06x}", flag.bits());
    }

    0
}

// ---------------------------------------------------------------------------
// Input / output helpers
// ---------------------------------------------------------------------------

/// Inputs to process in order; `None` stands for stdin.
fn inputs(opts: &Options) -> Vec<Option<&Path>> {
    if opts.input_files.is_empty() {
        return vec![None];
    }
    opts.input_files
        .iter()
        .map(|p| (p.as_os_str() != "-").then_some(p.as_path()))
        .collect()
}

fn open_input(path: Option<&Path>) -> Option<Box<dyn Read>> {
    match path {
        Some(path) => match File::open(path) {
            Ok(f) => Some(Box::new(BufReader::with_capacity(BUF_SIZE, f))),
            Err(e) => {
                eprintln!("vistext: input file: {}: {e}", path.display());
                None
            }
        },
        None => Some(Box::new(BufReader::new(io::stdin()))),
    }
}

fn open_output(opts: &Options) -> Option<Box<dyn Write>> {
    match &opts.output_file {
        None => Some(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        Some(path) => {
            if path.exists() && !opts.force {
                eprintln!(
                    "vistext: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return None;
            }
            match File::create(path) {
                Ok(f) => Some(Box::new(BufWriter::with_capacity(BUF_SIZE, f))),
                Err(e) => {
                    eprintln!("vistext: output file: {}: {e}", path.display());
                    None
                }
            }
        }
    }
}

fn input_name(path: Option<&Path>) -> String {
    path.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    let vis_opts = build_vis_options(opts);
    let Some(mut writer) = open_output(opts) else {
        return 1;
    };

    let mut total = EncodeStats::default();
    let inputs = inputs(opts);
    for &path in &inputs {
        let Some(mut reader) = open_input(path) else {
            return 1;
        };
        // Each input is a separate stream: lookahead and folding restart.
        let stats = match encode_stream(&mut reader, &mut writer, &vis_opts) {
            Ok(stats) => stats,
            Err(e) => {
                eprintln!("vistext: {}: {e}", input_name(path));
                return 1;
            }
        };
        if opts.verbose > 1 && !opts.quiet {
            eprintln!(
                "vistext: {}: {} bytes in, {} bytes out",
                input_name(path),
                stats.bytes_in,
                stats.bytes_out
            );
        }
        total.bytes_in += stats.bytes_in;
        total.bytes_out += stats.bytes_out;
        total.folds += stats.folds;
    }

    if let Err(e) = writer.flush() {
        eprintln!("vistext: write flush error: {e}");
        return 1;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "vistext: encoder: input size: {}, output size: {}, folds: {}",
            total.bytes_in, total.bytes_out, total.folds
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "encode",
            "files": inputs.len(),
            "input_size": total.bytes_in,
            "output_size": total.bytes_out,
            "folds": total.folds,
            "flags": opts.flags.bits(),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> i32 {
    let unvis_opts = build_unvis_options(opts);
    let Some(mut writer) = open_output(opts) else {
        return 1;
    };

    let mut total = DecodeStats::default();
    let inputs = inputs(opts);
    for &path in &inputs {
        let Some(mut reader) = open_input(path) else {
            return 1;
        };
        let stats = match decode_stream(&mut reader, &mut writer, unvis_opts) {
            Ok(stats) => stats,
            Err(IoError::Decode(e)) => {
                // Keep what was decoded before the error.
                if let Err(flush_err) = writer.flush() {
                    eprintln!("vistext: write flush error: {flush_err}");
                }
                eprintln!("vistext: {}: {e}", input_name(path));
                return 1;
            }
            Err(e) => {
                eprintln!("vistext: {}: {e}", input_name(path));
                return 1;
            }
        };
        if stats.errors > 0 && !opts.quiet {
            eprintln!(
                "vistext: {}: skipped {} malformed escape sequence(s)",
                input_name(path),
                stats.errors
            );
        }
        total.bytes_in += stats.bytes_in;
        total.bytes_out += stats.bytes_out;
        total.errors += stats.errors;
    }

    if let Err(e) = writer.flush() {
        eprintln!("vistext: write flush error: {e}");
        return 1;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "vistext: decoder: input size: {}, output size: {}, errors: {}",
            total.bytes_in, total.bytes_out, total.errors
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decode",
            "files": inputs.len(),
            "input_size": total.bytes_in,
            "output_size": total.bytes_out,
            "errors": total.errors,
            "flags": opts.flags.bits(),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();

    let default_filter = match cli.verbose.min(2) {
        _ if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let opts = resolve_options(cli);

    if let Err(e) = opts.flags.validate() {
        eprintln!("vistext: {e}");
        process::exit(1);
    }
    if let Some(width) = opts.fold_width
        && width < MIN_FOLD_WIDTH
    {
        eprintln!("vistext: --fold-width: {width} is below the minimum of {MIN_FOLD_WIDTH}");
        process::exit(1);
    }

    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Config => cmd_config(&opts),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn try_parse(args: &[&str]) -> Result<Options, clap::Error> {
        let argv: Vec<String> = std::iter::once("vistext".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        Cli::try_parse_from(argv).map(resolve_options)
    }

    fn parse_opts(args: &[&str]) -> Options {
        try_parse(args).expect("cli parse failed")
    }

    #[test]
    fn encode_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "encode",
            "-c",
            "-o",
            "-e",
            "xy",
            "--output",
            "out.txt",
            "a.bin",
            "b.bin",
        ]);
        assert_eq!(opts.command, Command::Encode);
        assert_eq!(opts.flags, FlagSet::C_STYLE | FlagSet::OCTAL);
        assert_eq!(opts.extra, "xy");
        assert_eq!(opts.output_file, Some(PathBuf::from("out.txt")));
        assert_eq!(
            opts.input_files,
            vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")]
        );
        assert_eq!(opts.fold_width, None);
    }

    #[test]
    fn encode_character_class_flags() {
        let opts = parse_opts(&["encode", "-w", "--glob", "--double-quote", "-s"]);
        assert_eq!(
            opts.flags,
            FlagSet::WHITE | FlagSet::GLOB | FlagSet::DOUBLE_QUOTE | FlagSet::SAFE_ONLY
        );
        assert_eq!(parse_opts(&["encode", "-M"]).flags, FlagSet::META);
        assert_eq!(parse_opts(&["encode", "-t"]).flags, FlagSet::TAB);
        assert_eq!(
            parse_opts(&["encode", "-S", "-b", "-N"]).flags,
            FlagSet::SHELL | FlagSet::NO_SLASH | FlagSet::NO_LOCALE
        );
    }

    #[test]
    fn encode_layout_flags() {
        let opts = parse_opts(&["encode", "-F", "40", "-l", "-n"]);
        assert_eq!(opts.fold_width, Some(40));
        assert!(opts.mark_eol);
        assert!(opts.passthrough);

        let opts = parse_opts(&["encode", "--fold"]);
        assert_eq!(opts.fold_width, Some(DEFAULT_FOLD_WIDTH));

        let opts = parse_opts(&["encode", "--fold", "-F", "12"]);
        assert_eq!(opts.fold_width, Some(12));
    }

    #[test]
    fn decode_subcommand_maps_correctly() {
        let opts = parse_opts(&["--quiet", "decode", "-H", "--strict", "in.txt"]);
        assert_eq!(opts.command, Command::Decode);
        assert_eq!(opts.flags, FlagSet::HTTP_1866);
        assert!(opts.strict);
        assert!(opts.quiet);
        assert_eq!(opts.input_files, vec![PathBuf::from("in.txt")]);

        let opts = parse_opts(&["decode", "-e", "-m", "-N"]);
        assert_eq!(
            opts.flags,
            FlagSet::NO_ESCAPE | FlagSet::MIME_STYLE | FlagSet::NO_LOCALE
        );
        assert!(!opts.strict);
    }

    #[test]
    fn http_and_mime_conflict() {
        assert!(try_parse(&["encode", "--http", "-m"]).is_err());
        assert!(try_parse(&["decode", "--http", "--mime"]).is_err());
        assert_eq!(
            parse_opts(&["decode", "--http"]).flags,
            FlagSet::HTTP_STYLE
        );
    }

    #[test]
    fn global_flags() {
        let opts = parse_opts(&["--force", "--json", "encode", "in"]);
        assert!(opts.force);
        assert!(opts.json_output);
        assert!(try_parse(&["-q", "-v", "encode"]).is_err());
    }

    #[test]
    fn verbose_is_capped() {
        let verbose = parse_opts(&["--verbose", "--verbose", "--verbose", "encode", "in"]);
        assert_eq!(verbose.verbose, 2);
    }

    #[test]
    fn config_command_maps() {
        assert_eq!(parse_opts(&["config"]).command, Command::Config);
    }

    #[test]
    fn stdin_placeholders() {
        let opts = parse_opts(&["encode"]);
        assert_eq!(inputs(&opts), vec![None]);
        let opts = parse_opts(&["encode", "a", "-", "b"]);
        assert_eq!(
            inputs(&opts),
            vec![Some(Path::new("a")), None, Some(Path::new("b"))]
        );
    }

    #[test]
    fn vis_options_mapping() {
        let opts = parse_opts(&["encode", "--http", "-e", "~", "-F", "60", "-l"]);
        let v = build_vis_options(&opts);
        assert_eq!(v.flags, FlagSet::HTTP_STYLE);
        assert_eq!(v.extra, "~");
        assert_eq!(v.fold_width, Some(60));
        assert!(v.mark_eol);
        assert!(!v.passthrough);
    }

    #[test]
    fn unvis_options_mapping() {
        let opts = parse_opts(&["decode", "--http", "--strict"]);
        let u = build_unvis_options(&opts);
        assert_eq!(u.flags, FlagSet::HTTP_STYLE);
        assert!(u.strict);
    }

    #[test]
    fn fuzz_entry_tolerates_garbage() {
        fuzz_try_parse_args(&["encode".to_string(), "-F".to_string(), "x".to_string()]);
        fuzz_try_parse_args(&["--bogus".to_string()]);
    }
}
