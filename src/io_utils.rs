//! Delimited-text I/O for leave exports.
//!
//! - **Delimiters**: `.tsv` paths default to tab, everything else to comma,
//!   unless overridden on the command line.
//! - **Encoding**: input is decoded and output transcoded via `encoding_rs`,
//!   defaulting to UTF-8.
//! - **stdin/stdout**: the `-` path routes through the standard streams.
//! - **Digest**: the raw input bytes are hashed with SHA-256 for the run
//!   report.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::warn;
use sha2::{Digest, Sha256};

use crate::request::LeaveSheet;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

fn delimiter_for_extension(path: &Path) -> Option<u8> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => Some(DEFAULT_TSV_DELIMITER),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Some(DEFAULT_CSV_DELIMITER),
        _ => None,
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided
        .or_else(|| delimiter_for_extension(path))
        .unwrap_or(DEFAULT_CSV_DELIMITER)
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    provided
        .or_else(|| path.and_then(delimiter_for_extension))
        .unwrap_or(fallback)
}

/// Raw bytes of an input file (or stdin for `-`).
pub fn read_input_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if is_dash(path) {
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("Reading leave data from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(bytes)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Lossy decode of a whole record; the flag is false when any cell held
/// malformed input.
fn decode_record_lossy(record: &csv::ByteRecord, encoding: &'static Encoding) -> (Vec<String>, bool) {
    let mut clean = true;
    let cells = record
        .iter()
        .map(|field| {
            let (text, _, had_errors) = encoding.decode(field);
            clean &= !had_errors;
            text.into_owned()
        })
        .collect();
    (cells, clean)
}

/// Parses delimited bytes into a [`LeaveSheet`]. Short rows are padded and
/// blank lines skipped, since spreadsheet exports are rarely rectangular.
/// A malformed header row is fatal; malformed data rows are flagged in
/// [`LeaveSheet::undecodable`].
pub fn parse_sheet(bytes: &[u8], delimiter: u8, encoding: &'static Encoding) -> Result<LeaveSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = decode_record(reader.byte_headers().context("Reading header row")?, encoding)?
        .into_iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    let mut undecodable = BTreeSet::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        let (mut row, clean) = decode_record_lossy(&record, encoding);
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if !clean {
            warn!(
                "Row {} is not valid {}; it will be excluded",
                idx + 2,
                encoding.name()
            );
            undecodable.insert(rows.len());
        }
        if row.len() < headers.len() {
            row.resize(headers.len(), String::new());
        }
        rows.push(row);
    }
    Ok(LeaveSheet::new(headers, rows).with_undecodable(undecodable))
}

pub fn open_csv_writer(
    path: Option<&Path>,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    };
    let writer: Box<dyn Write> = if encoding == UTF_8 {
        base
    } else {
        Box::new(TranscodingWriter::new(base, encoding))
    };
    Ok(csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer))
}

/// Writes a header row plus records and flushes.
pub fn write_table(
    path: Option<&Path>,
    delimiter: u8,
    encoding: &'static Encoding,
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<()> {
    let mut writer = open_csv_writer(path, delimiter, encoding)?;
    writer
        .write_record(headers)
        .context("Writing output headers")?;
    for row in rows {
        writer.write_record(row).context("Writing output row")?;
    }
    writer.flush().context("Flushing output")?;
    Ok(())
}

/// Collects UTF-8 output and re-encodes it to the target encoding on flush.
struct TranscodingWriter<W: Write> {
    inner: W,
    encoding: &'static Encoding,
    pending: Vec<u8>,
}

impl<W: Write> TranscodingWriter<W> {
    fn new(inner: W, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            pending: Vec::new(),
        }
    }
}

impl<W: Write> Write for TranscodingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let text = std::str::from_utf8(&self.pending)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let (encoded, _, had_errors) = self.encoding.encode(text);
            if had_errors {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Failed to encode text using {}", self.encoding.name()),
                ));
            }
            self.inner.write_all(&encoded)?;
            self.pending.clear();
        }
        self.inner.flush()
    }
}

impl<W: Write> Drop for TranscodingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
