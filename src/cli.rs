// Command-line front end for bsontree.
//
// Subcommands decode a document to JSON, list its elements with offsets,
// encode JSON back to the wire format, and print build configuration.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::bson::decoder::{
    CodeWithScope, DEFAULT_MAX_ARRAY_INDEX, DEFAULT_MAX_DEPTH, DecodeOptions, Decoder,
    RootContext,
};
use crate::bson::encoder;
use crate::buffer::DataBuffer;
use crate::io::{self as bio, IoError, ParseStats};
use crate::value::{Value, to_hex};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Decoder for BSON-like binary documents.
#[derive(Parser, Debug)]
#[command(
    name = "bsontree",
    version,
    about = "Decode BSON-like binary documents into a value tree",
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
    /// Decode a document and print it as JSON.
    Decode(DecodeArgs),
    /// List every element with its offset, type and payload size.
    Inspect(InspectArgs),
    /// Encode a JSON document into the binary format.
    Encode(EncodeArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RootArg {
    Array,
    Map,
}

#[derive(Args, Debug)]
struct DecodeTuningArgs {
    /// Key interpretation for the top-level document.
    #[arg(long, value_enum, default_value_t = RootArg::Array)]
    root: RootArg,

    /// Maximum nesting depth (root document = 1).
    #[arg(long = "max-depth", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Largest array index accepted from an element key.
    #[arg(long = "max-array-index", default_value_t = DEFAULT_MAX_ARRAY_INDEX)]
    max_array_index: usize,

    /// Skip code-with-scope elements instead of failing.
    #[arg(long = "skip-code-with-scope")]
    skip_code_with_scope: bool,

    /// Require documents to end exactly at their declared length.
    #[arg(long = "strict-length")]
    strict_length: bool,

    /// Stage at most this many bytes from the input (K/M/G suffixes).
    #[arg(long = "read-bytes", value_parser = parse_byte_size)]
    read_bytes: Option<u64>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    tuning: DecodeTuningArgs,

    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,

    /// Output file (default: stdout).
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    tuning: DecodeTuningArgs,

    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Input JSON file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Decode,
    Inspect,
    Encode,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    compact: bool,
    read_bytes: Option<u64>,
    decode: DecodeOptions,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn decode_options(tuning: &DecodeTuningArgs) -> DecodeOptions {
    DecodeOptions {
        max_depth: tuning.max_depth,
        root: match tuning.root {
            RootArg::Array => RootContext::Array,
            RootArg::Map => RootContext::Map,
        },
        code_with_scope: if tuning.skip_code_with_scope {
            CodeWithScope::Skip
        } else {
            CodeWithScope::Reject
        },
        max_array_index: tuning.max_array_index,
        verify_length: tuning.strict_length,
    }
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        compact: false,
        read_bytes: None,
        decode: DecodeOptions::default(),
        input_file: None,
        output_file: None,
    };

    match cli.command {
        Cmd::Decode(args) => {
            opts.command = Command::Decode;
            opts.decode = decode_options(&args.tuning);
            opts.read_bytes = args.tuning.read_bytes;
            opts.compact = args.compact;
            opts.input_file = args.input;
            opts.output_file = args.output;
        }
        Cmd::Inspect(args) => {
            opts.command = Command::Inspect;
            opts.decode = decode_options(&args.tuning);
            opts.read_bytes = args.tuning.read_bytes;
            opts.input_file = Some(args.input);
        }
        Cmd::Encode(args) => {
            opts.command = Command::Encode;
            opts.input_file = args.input;
            opts.output_file = args.output;
        }
        Cmd::Config => {}
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("bsontree".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Stage the configured input: the whole file, `--read-bytes` of it, or
/// stdin.
fn stage_input(opts: &Options) -> Result<DataBuffer, IoError> {
    let limit = opts
        .read_bytes
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX));
    match (&opts.input_file, limit) {
        (Some(path), None) => bio::stage_file(path),
        (Some(path), Some(n)) => bio::stage_reader(&mut File::open(path)?, n),
        (None, n) => bio::stage_reader(&mut io::stdin().lock(), n.unwrap_or(usize::MAX)),
    }
}

fn open_output(path: Option<&Path>, force: bool) -> Result<Box<dyn Write>, String> {
    match path {
        None => Ok(Box::new(BufWriter::with_capacity(
            BUF_SIZE,
            io::stdout().lock(),
        ))),
        Some(path) => {
            if path.exists() && !force {
                return Err(format!(
                    "output file exists, use -f to overwrite: {}",
                    path.display()
                ));
            }
            File::create(path)
                .map(|f| Box::new(BufWriter::with_capacity(BUF_SIZE, f)) as Box<dyn Write>)
                .map_err(|e| format!("output file: {}: {e}", path.display()))
        }
    }
}

fn report_stats(opts: &Options, command: &str, stats: &ParseStats) {
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "bsontree: {command}: input size: {}, elements: {}, documents: {}, max depth: {}",
            stats.input_size, stats.decode.elements, stats.decode.documents, stats.decode.max_depth
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": command,
            "input_size": stats.input_size,
            "bytes_consumed": stats.decode.bytes_consumed,
            "elements": stats.decode.elements,
            "documents": stats.decode.documents,
            "max_depth": stats.decode.max_depth,
            "input_sha256": stats.input_sha256.map(|h| to_hex(&h)),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(s) => eprintln!("{s}"),
            Err(e) => eprintln!("bsontree: stats serialization error: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("bsontree version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FILE_IO={file_io}");
    eprintln!("DEFAULT_BUFSIZE={}", DataBuffer::BUFSIZE);
    eprintln!("DEFAULT_MAX_DEPTH={DEFAULT_MAX_DEPTH}");
    eprintln!("DEFAULT_MAX_ARRAY_INDEX={DEFAULT_MAX_ARRAY_INDEX}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> i32 {
    let buf = match stage_input(opts) {
        Ok(buf) => buf,
        Err(e) => {
            eprintln!("bsontree: input: {e}");
            return 1;
        }
    };

    let (value, stats) = match bio::parse_buffer(&buf, &opts.decode) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("bsontree: {e}");
            return 1;
        }
    };

    let mut out = match open_output(opts.output_file.as_deref(), opts.force) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("bsontree: {e}");
            return 1;
        }
    };

    let json = value.to_json();
    let written = if opts.compact {
        serde_json::to_writer(&mut out, &json)
    } else {
        serde_json::to_writer_pretty(&mut out, &json)
    };
    if let Err(e) = written
        .map_err(io::Error::from)
        .and_then(|()| writeln!(out))
        .and_then(|()| out.flush())
    {
        eprintln!("bsontree: write error: {e}");
        return 1;
    }

    report_stats(opts, "decode", &stats);
    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> i32 {
    let buf = match stage_input(opts) {
        Ok(buf) => buf,
        Err(e) => {
            eprintln!("bsontree: input: {e}");
            return 1;
        }
    };

    let mut root = Value::Undef;
    let decoded = Decoder::new(buf.as_slice(), &opts.decode).decode_listing(&mut root);
    let (stats, mut listing) = match decoded {
        Ok(result) => result,
        Err(e) => {
            eprintln!("bsontree: decode error: {e}");
            return 1;
        }
    };
    let stats = ParseStats::for_input(buf.as_slice(), stats);

    // Summary block is informational; the listing is the command's output.
    if !opts.quiet {
        println!("input size:      {}", stats.input_size);
        println!("bytes consumed:  {}", stats.decode.bytes_consumed);
        println!("documents:       {}", stats.decode.documents);
        println!("elements:        {}", stats.decode.elements);
        println!("max depth:       {}", stats.decode.max_depth);
        println!();
        println!("  Offset  Type          Payload  Key");
    }

    // Children are listed before their parent closes; sort by offset to
    // print in wire order.
    listing.sort_by_key(|e| e.offset);
    for e in &listing {
        let indent = "  ".repeat(e.depth.saturating_sub(1));
        println!(
            "{:>8}  {:<12}  {:>7}  {indent}{:?}",
            e.offset,
            e.element_type.name(),
            e.payload_len,
            e.key
        );
    }

    report_stats(opts, "inspect", &stats);
    0
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    let reader: Box<dyn Read> = match &opts.input_file {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::with_capacity(BUF_SIZE, f)),
            Err(e) => {
                eprintln!("bsontree: input file: {}: {e}", path.display());
                return 1;
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let json: serde_json::Value = match serde_json::from_reader(reader) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("bsontree: invalid JSON: {e}");
            return 1;
        }
    };

    let bytes = match encoder::encode(&Value::from_json(&json)) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("bsontree: encode error: {e}");
            return 1;
        }
    };

    let mut out = match open_output(opts.output_file.as_deref(), opts.force) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("bsontree: {e}");
            return 1;
        }
    };
    if let Err(e) = out.write_all(&bytes).and_then(|()| out.flush()) {
        eprintln!("bsontree: write error: {e}");
        return 1;
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!("bsontree: encode: output size: {}", bytes.len());
    }
    if opts.json_output {
        let stats = serde_json::json!({
            "command": "encode",
            "output_size": bytes.len(),
        });
        eprintln!("{stats}");
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    let default_filter = match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Decode => cmd_decode(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Encode => cmd_encode(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
