use {
    super::Record,
    crate::{
        error::{Error, Result},
        parameters::Endianness,
    },
    log::{debug, info},
    std::{
        fs::File,
        io::{BufReader, BufWriter, Read, Write},
        path::Path,
    },
};

/// Iterator over the records of a stream.
///
/// Stops after the last complete record, or after the first error.
pub struct RecordReader<R> {
    reader: R,
    order: Endianness,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R, order: Endianness) -> Self {
        RecordReader {
            reader,
            order,
            done: false,
        }
    }
}

impl RecordReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, order: Endianness) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(Error::io(path.as_ref()))?;
        Ok(Self::new(BufReader::new(file), order))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match Record::read(&mut self.reader, self.order) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Writes the header, projection and first value of `record` as text.
pub fn describe<W: Write>(record: &Record, out: &mut W) -> Result<()> {
    writeln!(out, "=======================================")?;
    writeln!(out, "VERSION = {}", record.version)?;
    writeln!(out, "FIELD = {}", record.field)?;
    writeln!(
        out,
        "UNITS = {} DESCRIPTION = {}",
        record.units, record.description
    )?;
    writeln!(
        out,
        "DATE = {}   FCST = {}",
        record.date, record.forecast_offset
    )?;
    writeln!(out, "SOURCE = {}", record.map_source)?;
    writeln!(out, "LEVEL = {:5.1}", record.level)?;
    writeln!(out, "I,J DIMS = {}, {}", record.nx(), record.ny())?;
    writeln!(out, "{}", record.projection)?;
    if let Some(first) = record.data.iter().next() {
        writeln!(out, "DATA(1,1) = {}", first)?;
    }
    Ok(())
}

/// Describes every record of a stream, or only those of field `variable`.
///
/// Returns the number of records described.
pub fn dump<R: Read, W: Write>(
    records: RecordReader<R>,
    out: &mut W,
    variable: Option<&str>,
) -> Result<usize> {
    let mut described = 0;

    for record in records {
        let record = record?;
        if variable.map_or(true, |v| v == record.field) {
            describe(&record, out)?;
            described += 1;
        }
    }

    match variable {
        Some(field) if described == 0 => Err(Error::FieldNotFound {
            field: field.to_owned(),
        }),
        _ => Ok(described),
    }
}

/// Re-encodes every record of `input` into `output`, converting the byte
/// order from `from` to `to`. Returns the number of records copied.
pub fn copy<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    from: Endianness,
    to: Endianness,
) -> Result<usize> {
    let output = output.as_ref();
    let records = RecordReader::open(&input, from)?;
    let mut writer = BufWriter::new(File::create(output).map_err(Error::io(output))?);

    let mut copied = 0;
    for record in records {
        let record = record?;
        debug!("copying {} at {}", record.field, record.level);
        record.write(&mut writer, to)?;
        copied += 1;
    }
    writer.flush().map_err(Error::io(output))?;

    info!(
        "copied {} records from {} to {}",
        copied,
        input.as_ref().display(),
        output.display()
    );

    Ok(copied)
}
