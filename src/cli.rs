// Command-line front end for Streamflate.
//
// Explicit subcommands with long-form options, driving the stream helpers
// in `crate::io` over files or stdin/stdout.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use log::{LevelFilter, warn};

use crate::compress::{CompressOptions, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};
use crate::hash::config::{self, DEFAULT_LEVEL, MAX_LEVEL};
use crate::header::{self, MAX_WINDOW_BITS, MIN_WINDOW_BITS};
use crate::io::{self as sio, CompressStats, DecompressStats, Progress};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Extension appended to compressed files when no output path is given.
const SUFFIX: &str = "sf";

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024usize),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        _ => (s, 1usize),
    };
    let num: usize = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Streaming DEFLATE-style compressor/decompressor.
#[derive(Parser, Debug)]
#[command(
    name = "streamflate",
    version,
    about = "Streaming DEFLATE-style compressor/decompressor",
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
    /// Compress an input stream.
    Compress(CompressArgs),
    /// Decompress an input stream.
    Decompress(IoArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: derived from the input name, or stdout).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Compression level (0-9). Level 0 stores without matching.
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(0..=MAX_LEVEL as i64), default_value_t = DEFAULT_LEVEL)]
    level: u32,

    /// log2 of the history window (8-15).
    #[arg(long = "window-bits", short = 'w', value_parser = clap::value_parser!(u8).range(MIN_WINDOW_BITS as i64..=MAX_WINDOW_BITS as i64), default_value_t = MAX_WINDOW_BITS)]
    window_bits: u8,

    /// Input bytes per block (supports K/M suffix).
    #[arg(long = "block-size", value_parser = parse_byte_size, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    #[command(flatten)]
    io: IoArgs,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    compress: CompressOptions,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        compress: CompressOptions::default(),
        input_file: None,
        output_file: None,
    };

    let io_args = match cli.command {
        Cmd::Compress(args) => {
            opts.command = Command::Compress;
            opts.compress = CompressOptions {
                level: args.level,
                window_bits: args.window_bits,
                block_size: args.block_size,
            };
            Some(args.io)
        }
        Cmd::Decompress(args) => {
            opts.command = Command::Decompress;
            Some(args)
        }
        Cmd::Config => None,
    };

    if let Some(args) = io_args {
        opts.use_stdout = args.stdout;
        opts.input_file = args.input;
        opts.output_file = args.output;
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("streamflate".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let opts = resolve_options(cli);
        if let Some(input) = &opts.input_file {
            let _ = default_output_path(opts.command, input);
        }
    }
}

/// Output path used when only an input file was named.
fn default_output_path(command: Command, input: &Path) -> Result<PathBuf, String> {
    match command {
        Command::Compress => {
            let mut name = input.as_os_str().to_owned();
            name.push(".");
            name.push(SUFFIX);
            Ok(PathBuf::from(name))
        }
        Command::Decompress => match input.extension() {
            Some(ext) if ext == SUFFIX => Ok(input.with_extension("")),
            _ => Err(format!(
                "{}: unknown suffix, name the output file or use --stdout",
                input.display()
            )),
        },
        Command::Config => Err("config takes no files".into()),
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("streamflate version {version} (Rust)");

    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;

    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("STREAM_MAGIC=0x{:02X}", header::MAGIC);
    eprintln!("FORMAT_VERSION={}", header::FORMAT_VERSION);
    eprintln!("DEFAULT_LEVEL={DEFAULT_LEVEL}");
    eprintln!("WINDOW_BITS={MIN_WINDOW_BITS}..={MAX_WINDOW_BITS}");
    eprintln!("DEFAULT_BLOCK_SIZE={DEFAULT_BLOCK_SIZE}");
    eprintln!("MAX_BLOCK_SIZE={MAX_BLOCK_SIZE}");
    eprintln!("CHUNK_SIZE={}", sio::CHUNK_SIZE);
    for level in 0..=MAX_LEVEL {
        let c = config::config_for_level(level);
        eprintln!(
            "LEVEL_{level}={} (chain={}, nice={}, insert={})",
            c.name, c.max_chain, c.nice_length, c.max_insert
        );
    }

    0
}

// ---------------------------------------------------------------------------
// Input / output plumbing
// ---------------------------------------------------------------------------

fn open_input(opts: &Options) -> Result<(Box<dyn Read>, Option<u64>), String> {
    match &opts.input_file {
        Some(path) => {
            let f = File::open(path).map_err(|e| format!("input file: {}: {e}", path.display()))?;
            let size = f.metadata().ok().map(|m| m.len());
            Ok((Box::new(BufReader::with_capacity(BUF_SIZE, f)), size))
        }
        None => Ok((Box::new(BufReader::new(io::stdin())), None)),
    }
}

/// File the command writes to; `None` means stdout.
fn output_path(opts: &Options) -> Result<Option<PathBuf>, String> {
    match (&opts.output_file, &opts.input_file) {
        _ if opts.use_stdout => Ok(None),
        (Some(path), _) => Ok(Some(path.clone())),
        (None, Some(input)) => default_output_path(opts.command, input).map(Some),
        (None, None) => Ok(None),
    }
}

/// Whether `a` and `b` name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Open the output.  Returns the created path so a failed run can remove it.
fn open_output(opts: &Options) -> Result<(Box<dyn Write>, Option<PathBuf>), String> {
    let Some(path) = output_path(opts)? else {
        let stdout = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
        return Ok((Box::new(stdout), None));
    };
    // Creating the output would truncate the input before it is read.
    if let Some(input) = &opts.input_file
        && same_file(input, &path)
    {
        return Err(format!(
            "input and output are the same file: {}",
            path.display()
        ));
    }
    if path.exists() && !opts.force {
        return Err(format!(
            "output file exists, use -f to overwrite: {}",
            path.display()
        ));
    }
    let f = File::create(&path).map_err(|e| format!("output file: {}: {e}", path.display()))?;
    Ok((Box::new(BufWriter::with_capacity(BUF_SIZE, f)), Some(path)))
}

/// Remove a partially written output file after a failed run.
fn discard_output(path: Option<&Path>) {
    if let Some(path) = path
        && let Err(e) = fs::remove_file(path)
    {
        warn!("could not remove {}: {e}", path.display());
    }
}

/// Progress callback for verbose runs with a known input size.
fn progress_reporter(opts: &Options, total: Option<u64>) -> impl FnMut(&Progress) {
    let enabled = opts.verbose > 1 && !opts.quiet;
    let mut last = None;
    move |p: &Progress| {
        if !enabled {
            return;
        }
        if let Some(frac) = total.and_then(|t| p.fraction(t)) {
            let pct = (frac * 100.0) as u32;
            if last != Some(pct) {
                last = Some(pct);
                eprint!("\rstreamflate: {pct:3}%");
                if pct == 100 {
                    eprintln!();
                }
            }
        }
    }
}

fn sha_hex(sha: Option<[u8; 32]>) -> Option<String> {
    sha.map(|d| d.iter().map(|b| format!("{b:02x}")).collect())
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options) -> i32 {
    if let Err(e) = opts.compress.validate() {
        eprintln!("streamflate: {e}");
        return 1;
    }
    let (reader, total) = match open_input(opts) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("streamflate: {e}");
            return 1;
        }
    };
    let (writer, created) = match open_output(opts) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("streamflate: {e}");
            return 1;
        }
    };

    let stats = match sio::compress_stream(
        reader,
        writer,
        opts.compress,
        progress_reporter(opts, total),
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("streamflate: compress error: {e}");
            discard_output(created.as_deref());
            return 1;
        }
    };

    report_compress(opts, &stats);
    0
}

fn report_compress(opts: &Options, stats: &CompressStats) {
    if opts.verbose > 0 && !opts.quiet {
        let ratio = stats
            .ratio()
            .map_or_else(|| "n/a".to_string(), |r| format!("{:.3}", r));
        eprintln!(
            "streamflate: compress: input size: {}, output size: {}, blocks: {}, ratio: {ratio}",
            stats.input_size, stats.output_size, stats.blocks
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "compress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "blocks": stats.blocks,
            "ratio": stats.ratio(),
            "level": opts.compress.level,
            "window_bits": opts.compress.window_bits,
            "block_size": opts.compress.block_size,
            "input_sha256": sha_hex(stats.input_sha256),
        });
        eprintln!("{json:#}");
    }
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(opts: &Options) -> i32 {
    let (reader, total) = match open_input(opts) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("streamflate: {e}");
            return 1;
        }
    };
    let (writer, created) = match open_output(opts) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("streamflate: {e}");
            return 1;
        }
    };

    let stats = match sio::decompress_stream(reader, writer, progress_reporter(opts, total)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("streamflate: decompress error: {e}");
            discard_output(created.as_deref());
            return 1;
        }
    };

    report_decompress(opts, &stats);
    0
}

fn report_decompress(opts: &Options, stats: &DecompressStats) {
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "streamflate: decompress: input size: {}, output size: {}, blocks: {}",
            stats.input_size, stats.output_size, stats.blocks
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decompress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "blocks": stats.blocks,
            "output_sha256": sha_hex(stats.output_sha256),
        });
        eprintln!("{json:#}");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match opts.verbose {
        0 => {}
        1 => {
            logger.filter_level(LevelFilter::Info);
        }
        _ => {
            logger.filter_level(LevelFilter::Debug);
        }
    }
    logger.format_timestamp(None).format_target(false).init();

    // Warn if -c overrides output filename.
    if opts.use_stdout && !opts.quiet {
        if let Some(path) = opts.output_file.take() {
            eprintln!(
                "streamflate: warning: -c option overrides output filename: {}",
                path.display()
            );
        }
    }

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
