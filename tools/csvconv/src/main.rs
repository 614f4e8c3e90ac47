//! CLI tool for re-encoding CSV documents between dialects.
//!
//! # Usage
//!
//! ```bash
//! # Semicolon separated to comma separated
//! csvconv --input data.csv --delimiter ';' --output out.csv
//!
//! # RFC 4180 quote doubling to backslash escapes, read from stdin
//! cat data.csv | csvconv --escape '"' --output-escape '\' > out.csv
//!
//! # Drop the header line and switch to CRLF
//! csvconv -i data.csv --drop-header --crlf
//! ```

use std::{
    fs::File,
    io::{Read, Write, stdin, stdout},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use fastcsv::prelude::*;
use tracing::debug;

/// Re-encode a CSV document with another dialect.
///
/// Every row is read as a list of strings, so documents of any shape are
/// accepted. Quoting is recomputed for the output dialect.
#[derive(Parser, Debug)]
#[command(name = "csvconv")]
#[command(version, about)]
struct Args {
    /// Input file path (`.csv`). If not specified, reads from stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file path. If not specified, writes to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input column delimiter.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Input quote character.
    #[arg(long, default_value_t = '"')]
    quote: char,

    /// Input escape character. Use the quote character for `""` doubling.
    #[arg(long, default_value_t = '\\')]
    escape: char,

    /// Output column delimiter (defaults to the input one).
    #[arg(long)]
    output_delimiter: Option<char>,

    /// Output quote character (defaults to the input one).
    #[arg(long)]
    output_quote: Option<char>,

    /// Output escape character (defaults to the input one).
    #[arg(long)]
    output_escape: Option<char>,

    /// Terminate output lines with `\r\n` instead of `\n`.
    #[arg(long)]
    crlf: bool,

    /// The input has no header line.
    #[arg(long)]
    no_header: bool,

    /// Do not copy the header line to the output.
    #[arg(long)]
    drop_header: bool,

    /// Reject quoted columns that are never closed.
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn input_dialect(&self) -> Result<Dialect> {
        Ok(Dialect {
            delimiter: ascii_byte("delimiter", self.delimiter)?,
            quote: ascii_byte("quote", self.quote)?,
            escape: ascii_byte("escape", self.escape)?,
            quote_mode: if self.strict { QuoteMode::Strict } else { QuoteMode::Lenient },
            ..Dialect::default()
        })
    }

    fn output_dialect(&self) -> Result<Dialect> {
        Ok(Dialect {
            delimiter: ascii_byte("output-delimiter", self.output_delimiter.unwrap_or(self.delimiter))?,
            quote: ascii_byte("output-quote", self.output_quote.unwrap_or(self.quote))?,
            escape: ascii_byte("output-escape", self.output_escape.unwrap_or(self.escape))?,
            line_terminator: if self.crlf { LineTerminator::CrLf } else { LineTerminator::Lf },
            ..Dialect::default()
        })
    }
}

fn ascii_byte(name: &str, c: char) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("--{name} must be a single ASCII character, got '{c}'"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let text = match &args.input {
        Some(path) => fastcsv::fs::load_text(path)
            .with_context(|| format!("Failed to load input file: {}", path.display()))?,
        None => {
            let mut text = String::new();
            stdin().lock().read_to_string(&mut text).context("Failed to read stdin")?;
            text
        }
    };

    let output: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout().lock()),
    };

    let count = convert(&text, output, &args)?;

    // stderr, so the count never mixes with CSV on stdout
    eprintln!("Converted {count} row(s)");

    Ok(())
}

/// Re-encodes `text` into `output` and returns the number of data rows.
fn convert<W: Write>(text: &str, output: W, args: &Args) -> Result<usize> {
    let input_dialect = args.input_dialect()?;
    let output_dialect = args.output_dialect()?;
    debug!(?input_dialect, ?output_dialect, "converting");

    let mut reader = ReaderBuilder::new()
        .dialect(input_dialect)
        .headers(HeaderMode::NoHeader)
        .from_text(text)
        .context("Invalid input dialect")?;
    let mut writer = WriterBuilder::new()
        .dialect(output_dialect)
        .headers(HeaderMode::NoHeader)
        .from_writer(output)
        .context("Invalid output dialect")?;

    if !args.no_header {
        let header: Option<Vec<String>> = reader.read_record().context("Failed to read header line")?;
        if let Some(header) = header.filter(|_| !args.drop_header) {
            writer.write_header(&header).context("Failed to write header line")?;
        }
    }

    for (idx, row) in reader.deserialize::<Vec<String>>().enumerate() {
        let row = row.with_context(|| format!("Failed to read row #{}", idx + 1))?;
        writer.serialize(&row).with_context(|| format!("Failed to write row #{}", idx + 1))?;
    }

    writer.flush().context("Failed to flush output")?;

    Ok(writer.records_written())
}
