use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::LapvizError;

/// Writes `value` as JSON to `output`, or to stdout when no file is given.
pub fn write_output<T: Serialize>(
    output: Option<&Path>,
    value: &T,
    pretty: bool,
) -> Result<(), LapvizError> {
    match output {
        Some(file) => {
            let output_file =
                File::create(file).map_err(|e| LapvizError::WriterError { source: e })?;
            write_json(BufWriter::new(output_file), value, pretty)
        }
        None => write_json(io::stdout().lock(), value, pretty),
    }
}

fn write_json<W: Write, T: Serialize>(
    mut writer: W,
    value: &T,
    pretty: bool,
) -> Result<(), LapvizError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)
    } else {
        serde_json::to_writer(&mut writer, value)
    }
    .map_err(|e| LapvizError::OutputSerializeError { source: e })?;
    writeln!(writer).map_err(|e| LapvizError::WriterError { source: e })?;
    writer
        .flush()
        .map_err(|e| LapvizError::WriterError { source: e })
}
