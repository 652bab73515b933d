//! RFC 4180 table writer

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes one record terminated by CRLF
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            w.write_all(b",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

/// Writes a header record followed by every data record
pub fn write_table<W: Write>(mut w: W, header: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    write_row(&mut w, header)?;
    for row in rows {
        write_row(&mut w, row)?;
    }
    w.flush()
}

/// Writes a table to `path`, creating parent directories as needed
pub fn write_table_file(path: &Path, header: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_table(BufWriter::new(file), header, rows)
}
