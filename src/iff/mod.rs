//! Intermediate Format File records.
//!
//! Every block of a record is framed by its length as a 4 byte integer,
//! written before and after the block. All integers and floats of a file
//! share one byte order.

pub mod projection;
pub mod reader;
pub mod record;

pub use {
    projection::{Projection, StartPoint},
    reader::RecordReader,
    record::Record,
};

use {
    crate::error::{Error, Result},
    byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt},
    std::io::{self, Read, Write},
};

/// Writes `payload` framed by `marker`.
pub(crate) fn write_block<B: ByteOrder, W: Write>(
    writer: &mut W,
    marker: i32,
    payload: &[u8],
) -> Result<()> {
    writer.write_i32::<B>(marker)?;
    writer.write_all(payload)?;
    writer.write_i32::<B>(marker)?;
    Ok(())
}

/// Reads a leading marker, `None` if the stream ends before its first byte.
pub(crate) fn read_marker<B: ByteOrder, R: Read>(
    reader: &mut R,
    block: &'static str,
) -> Result<Option<i32>> {
    let mut buf = [0; 4];
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(Error::Truncated { block }),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Some(B::read_i32(&buf)))
}

/// Reads the `len` byte payload of a block whose leading marker was
/// `leading`, and its trailing marker. Both must equal `marker`.
pub(crate) fn read_payload<B: ByteOrder, R: Read>(
    reader: &mut R,
    block: &'static str,
    marker: i32,
    leading: i32,
    len: usize,
) -> Result<Vec<u8>> {
    check_marker(block, marker, leading)?;

    let mut payload = vec![0; len];
    reader
        .read_exact(&mut payload)
        .map_err(|e| truncated(block, e))?;

    let trailing = reader
        .read_i32::<B>()
        .map_err(|e| truncated(block, e))?;
    check_marker(block, marker, trailing)?;

    Ok(payload)
}

/// Reads a whole block that must be present.
pub(crate) fn read_block<B: ByteOrder, R: Read>(
    reader: &mut R,
    block: &'static str,
    marker: i32,
    len: usize,
) -> Result<Vec<u8>> {
    match read_marker::<B, _>(reader, block)? {
        Some(leading) => read_payload::<B, _>(reader, block, marker, leading, len),
        None => Err(Error::Truncated { block }),
    }
}

fn check_marker(block: &'static str, expected: i32, found: i32) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::BlockMarker {
            block,
            expected,
            found,
        })
    }
}

fn truncated(block: &'static str, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Truncated { block }
    } else {
        Error::Stream(e)
    }
}

/// Appends `value` space padded to `width` bytes.
pub(crate) fn put_text(
    buf: &mut Vec<u8>,
    field: &'static str,
    value: &str,
    width: usize,
) -> Result<()> {
    if value.len() > width {
        return Err(Error::TextTooLong {
            field,
            value: value.to_owned(),
            width,
        });
    }

    buf.extend_from_slice(value.as_bytes());
    buf.resize(buf.len() + width - value.len(), b' ');
    Ok(())
}

/// Text of a fixed width field without its padding.
pub(crate) fn get_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(|c| c == ' ' || c == '\0')
        .to_owned()
}
