//! JSON rendering of decoded results.
//!
//! The dump is a single JSON object whose keys follow the file: `filename`,
//! `summary`, `Map`, one key per block in file order, `diagnostics`, and,
//! when requested, `trace`. Rendering the same result twice gives the same
//! bytes.
//!
//! ```no_run
//! use sor_rs::dump::{self, DumpOptions};
//!
//! fn main() -> sor_rs::Result<()> {
//!     let (result, trace) = sor_rs::parse("trace.sor")?;
//!     let options = DumpOptions::default().with_trace(true);
//!     dump::write_json_file("trace-dump.json", &result, Some(&trace), &options)?;
//!     dump::write_trace_file("trace-trace.dat", &trace)?;
//!     Ok(())
//! }
//! ```

use crate::{ParseResult, Result, TraceBuffer};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// How a result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Embed the trace samples under a `trace` key.
    pub include_trace: bool,
    /// Indent the output.
    pub pretty: bool,
    /// [`dump_to_dir`] also writes `<stem>-trace.dat`.
    pub trace_file: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            include_trace: false,
            pretty: true,
            trace_file: false,
        }
    }
}

impl DumpOptions {
    pub fn with_trace(mut self, include_trace: bool) -> Self {
        self.include_trace = include_trace;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_trace_file(mut self, trace_file: bool) -> Self {
        self.trace_file = trace_file;
        self
    }
}

/// A result plus the optional trace, serialized as one object.
struct Dump<'a> {
    result: &'a ParseResult,
    trace: Option<&'a TraceBuffer>,
}

impl Serialize for Dump<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.result.serialize_entries(&mut map)?;
        if let Some(trace) = self.trace {
            map.serialize_entry("trace", trace)?;
        }
        map.end()
    }
}

/// Render a result as JSON.
///
/// The trace is included only when `options.include_trace` is set and a
/// trace is given.
pub fn to_json(
    result: &ParseResult,
    trace: Option<&TraceBuffer>,
    options: &DumpOptions,
) -> Result<String> {
    let dump = Dump {
        result,
        trace: trace.filter(|_| options.include_trace),
    };
    let json = if options.pretty {
        serde_json::to_string_pretty(&dump)?
    } else {
        serde_json::to_string(&dump)?
    };
    Ok(json)
}

/// Render a result as JSON and write it to `path`.
pub fn write_json_file<P: AsRef<Path>>(
    path: P,
    result: &ParseResult,
    trace: Option<&TraceBuffer>,
    options: &DumpOptions,
) -> Result<()> {
    let json = to_json(result, trace, options)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Write the trace as text, one `distance_km<TAB>level_db` line per sample.
pub fn write_trace_file<P: AsRef<Path>>(path: P, trace: &TraceBuffer) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for (distance_m, level_db) in trace.points() {
        writeln!(out, "{:.6}\t{:.6}", distance_m / 1000.0, level_db)?;
    }
    out.flush()?;
    Ok(())
}

/// Decode `input` and write its dump into `output_dir`.
///
/// Writes `<stem>-dump.json`, plus `<stem>-trace.dat` when
/// `options.trace_file` is set. Returns the path of the JSON dump.
pub fn dump_to_dir(input: &Path, output_dir: &Path, options: &DumpOptions) -> Result<PathBuf> {
    let (result, trace) = crate::parse(input)?;
    if result.has_diagnostics() {
        warn!(
            "{}: {} diagnostics recorded",
            input.display(),
            result.diagnostics().len()
        );
    }

    let dump_path = output_dir.join(dump_file_name(input));
    write_json_file(&dump_path, &result, Some(&trace), options)?;
    if options.trace_file {
        write_trace_file(output_dir.join(trace_file_name(input)), &trace)?;
    }
    Ok(dump_path)
}

/// `<stem>-dump.json` for an input file.
pub fn dump_file_name<P: AsRef<Path>>(input: P) -> String {
    format!("{}-dump.json", file_stem(input.as_ref()))
}

/// `<stem>-trace.dat` for an input file.
pub fn trace_file_name<P: AsRef<Path>>(input: P) -> String {
    format!("{}-trace.dat", file_stem(input.as_ref()))
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("sor"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names() {
        assert_eq!(dump_file_name("/data/run 001.sor"), "run 001-dump.json");
        assert_eq!(trace_file_name("a/b/trace.SOR"), "trace-trace.dat");
        assert_eq!(dump_file_name(""), "sor-dump.json");
    }
}
