use super::{ResultReporter, LOG_CSV_FILE};
use crate::{
    error::{SimError, SimResult},
    event::LogEntry,
};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const HEADER: &str = "timestep,served_count,buffer_remaining";

/// Writes `logs.csv` into an output directory.
#[derive(Debug, Clone)]
pub struct CsvReporter {
    dir: PathBuf,
}

impl CsvReporter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(LOG_CSV_FILE)
    }
}

impl ResultReporter for CsvReporter {
    fn name(&self) -> &'static str { "csv" }

    fn report(&self, log: &[LogEntry]) -> SimResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        write_log_csv(self.path(), log)
    }
}

/// One header line, then one row per entry in log order.
pub fn write_log_csv(path: impl AsRef<Path>, log: &[LogEntry]) -> SimResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{HEADER}")?;
    for e in log {
        writeln!(out, "{},{},{}", e.timestep, e.served_count, e.buffer_remaining)?;
    }
    out.flush()?;
    Ok(())
}

/// Inverse of `write_log_csv`. Blank lines are ignored.
pub fn read_log_csv(path: impl AsRef<Path>) -> SimResult<Vec<LogEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => line?,
        None => String::new(),
    };
    if header.trim() != HEADER {
        return Err(SimError::MalformedCsv {
            line: 1,
            reason: format!("expected header '{HEADER}'"),
        });
    }

    let mut entries = Vec::new();
    for (idx, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(parse_row(&line, idx + 1)?);
    }
    Ok(entries)
}

fn parse_row(line: &str, line_no: usize) -> SimResult<LogEntry> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    if fields.len() != 3 {
        return Err(SimError::MalformedCsv {
            line: line_no,
            reason: format!("expected 3 fields, found {}", fields.len()),
        });
    }
    let num = |i: usize| -> SimResult<u64> {
        fields[i].trim().parse().map_err(|e| SimError::MalformedCsv {
            line: line_no,
            reason: format!("field {} '{}': {e}", i + 1, fields[i]),
        })
    };
    Ok(LogEntry {
        timestep: num(0)?,
        served_count: num(1)?,
        buffer_remaining: num(2)?,
    })
}
