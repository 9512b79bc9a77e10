use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use csv::{ByteRecord, Reader, ReaderBuilder, Terminator, Writer, WriterBuilder};
use log::{debug, info};

mod encoding;
mod error;

pub use encoding::Encoding;
pub use error::SplitError;

static DEFAULT_EXTENSION: &str = ".csv";
static DEFAULT_OUTDIR_NAME: &str = "split";

#[derive(Parser, Debug)]
#[command(
    name = "csvpart",
    about = "Split a CSV into parts of at most --rows data rows, repeating the header in each"
)]
pub struct Arguments {
    /// Path to the input table file
    pub input: PathBuf,
    /// Data rows per output file, excluding the header
    #[clap(long, default_value_t = 2000)]
    pub rows: i64,
    /// Output directory; defaults to <input's directory>/split
    #[clap(long)]
    pub outdir: Option<PathBuf>,
    /// Text encoding for reading and writing: utf-8 or utf-8-sig
    #[clap(long, default_value = "utf-8-sig")]
    pub encoding: String,
}

/// Success result of a run.
#[derive(Debug)]
pub struct Summary {
    pub files_created: usize,
    pub outdir: PathBuf,
}

/// Naming scheme for output files, derived once from the input path.
struct PartName {
    dir: PathBuf,
    base: String,
    ext: String,
}

impl PartName {
    fn derive(input: &Path, dir: PathBuf) -> Self {
        let base = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("part"));
        let ext = match input.extension() {
            Some(e) => format!(".{}", e.to_string_lossy()),
            None => String::from(DEFAULT_EXTENSION),
        };
        PartName { dir, base, ext }
    }

    fn build(&self, file_index: usize) -> PathBuf {
        self.dir
            .join(format!("{}_part{:02}{}", self.base, file_index, self.ext))
    }
}

/// One open output file. Dropping it flushes and closes the handle, so an
/// error propagating out of the row loop never leaks a dangling writer.
struct PartWriter {
    writer: Writer<BufWriter<File>>,
}

impl PartWriter {
    fn create(path: &Path, encoding: Encoding, header: &ByteRecord) -> Result<Self, SplitError> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        if encoding.writes_bom() {
            out.write_all(encoding::UTF8_BOM)?;
        }
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .terminator(Terminator::CRLF)
            .from_writer(out);
        writer.write_byte_record(header)?;
        Ok(PartWriter { writer })
    }

    fn write_row(&mut self, row: &ByteRecord) -> Result<(), SplitError> {
        Ok(self.writer.write_byte_record(row)?)
    }

    fn flush(&mut self) -> Result<(), SplitError> {
        Ok(self.writer.flush()?)
    }
}

/// Transient per-run counters plus the currently open output file.
struct RunState {
    file_index: usize,
    rows_in_current: usize,
    writer: PartWriter,
}

impl RunState {
    fn open_first(
        names: &PartName,
        encoding: Encoding,
        header: &ByteRecord,
    ) -> Result<Self, SplitError> {
        let writer = PartWriter::create(&names.build(1), encoding, header)?;
        Ok(RunState {
            file_index: 1,
            rows_in_current: 0,
            writer,
        })
    }

    /// Writes one data row, rotating to the next output file first if the
    /// current one is full. Assigning the new writer drops (and so closes)
    /// the previous one.
    fn write_row(
        &mut self,
        row: &ByteRecord,
        rows_per_file: usize,
        names: &PartName,
        encoding: Encoding,
        header: &ByteRecord,
    ) -> Result<(), SplitError> {
        if self.rows_in_current >= rows_per_file {
            self.writer.flush()?;
            self.file_index += 1;
            self.rows_in_current = 0;
            self.writer = PartWriter::create(&names.build(self.file_index), encoding, header)?;
            debug!("rotated to part {:02}", self.file_index);
        }
        self.writer.write_row(row)?;
        self.rows_in_current += 1;
        Ok(())
    }
}

fn open_input(path: &Path, encoding: Encoding) -> Result<Reader<BufReader<File>>, SplitError> {
    let mut reader = BufReader::new(File::open(path)?);
    if encoding.strips_bom() {
        let buf = reader.fill_buf()?;
        if buf.starts_with(encoding::UTF8_BOM) {
            reader.consume(encoding::UTF8_BOM.len());
        }
    }
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader))
}

pub fn run(args: Arguments) -> Result<Summary, SplitError> {
    if args.rows < 1 {
        return Err(SplitError::Config(format!(
            "rows must be at least 1, got {}",
            args.rows
        )));
    }
    let rows_per_file = args.rows as usize;
    let encoding: Encoding = args.encoding.parse()?;

    // Validate the input before touching the output directory.
    if !args.input.is_file() {
        return Err(SplitError::Path(args.input));
    }

    let outdir = match args.outdir {
        Some(dir) => dir,
        None => args
            .input
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_OUTDIR_NAME),
    };
    fs::create_dir_all(&outdir)?;

    let names = PartName::derive(&args.input, outdir.clone());
    let mut reader = open_input(&args.input, encoding)?;

    let header = reader.byte_headers()?.clone();
    if header.is_empty() {
        return Err(SplitError::Format(String::from(
            "input is empty; a header row is required",
        )));
    }

    // The first output file is opened eagerly so a header-only input still
    // yields one file.
    let mut state = RunState::open_first(&names, encoding, &header)?;
    let mut total_rows: usize = 0;

    let mut row = ByteRecord::new();
    while reader.read_byte_record(&mut row)? {
        state.write_row(&row, rows_per_file, &names, encoding, &header)?;
        total_rows += 1;
    }
    state.writer.flush()?;

    info!(
        "split {} data rows into {} file(s) under {}",
        total_rows,
        state.file_index,
        outdir.display()
    );

    Ok(Summary {
        files_created: state.file_index,
        outdir,
    })
}
