use {
    super::{get_text, put_text, read_block, read_marker, read_payload, write_block, Projection},
    crate::{
        constants::{DESC_LEN, FIELD_LEN, HDATE_LEN, HEADER_LEN, MAP_SOURCE_LEN, UNITS_LEN},
        error::{Error, Result},
        parameters::Endianness,
    },
    byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt},
    ndarray::Array2,
    std::io::{Read, Write},
};

/// One labelled horizontal slice of one field at one time and level
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub version: i32,
    /// Time stamp, at most 24 bytes
    pub date: String,
    pub forecast_offset: f32,
    /// Data source identifier, at most 32 bytes
    pub map_source: String,
    /// Field name, at most 9 bytes
    pub field: String,
    /// At most 25 bytes
    pub units: String,
    /// At most 46 bytes
    pub description: String,
    /// Pressure (Pa), or the surface level marker
    pub level: f32,
    pub projection: Projection,
    /// Whether winds are relative to the grid rather than the earth
    pub wind_grid_relative: bool,
    /// Axes `(south_north, west_east)`
    pub data: Array2<f32>,
}

impl Record {
    pub fn nx(&self) -> usize {
        self.data.ncols()
    }

    pub fn ny(&self) -> usize {
        self.data.nrows()
    }

    /// Encodes the record onto `writer`.
    pub fn write<W: Write>(&self, writer: &mut W, order: Endianness) -> Result<()> {
        match order {
            Endianness::Big => self.write_with::<BigEndian, _>(writer),
            Endianness::Little => self.write_with::<LittleEndian, _>(writer),
        }
    }

    /// Decodes the next record, `None` if the stream ends exactly before it.
    pub fn read<R: Read>(reader: &mut R, order: Endianness) -> Result<Option<Self>> {
        match order {
            Endianness::Big => Self::read_with::<BigEndian, _>(reader),
            Endianness::Little => Self::read_with::<LittleEndian, _>(reader),
        }
    }

    fn write_with<B: ByteOrder, W: Write>(&self, writer: &mut W) -> Result<()> {
        let (nx, ny) = (self.nx() as i32, self.ny() as i32);
        if nx == 0 || ny == 0 {
            return Err(Error::Dimensions {
                field: self.field.clone(),
                nx,
                ny,
            });
        }

        let mut version = [0; 4];
        B::write_i32(&mut version, self.version);
        write_block::<B, _>(writer, 4, &version)?;

        let mut header = Vec::with_capacity(HEADER_LEN);
        put_text(&mut header, "date", &self.date, HDATE_LEN)?;
        header.write_f32::<B>(self.forecast_offset)?;
        put_text(&mut header, "map source", &self.map_source, MAP_SOURCE_LEN)?;
        put_text(&mut header, "field", &self.field, FIELD_LEN)?;
        put_text(&mut header, "units", &self.units, UNITS_LEN)?;
        put_text(&mut header, "description", &self.description, DESC_LEN)?;
        header.write_f32::<B>(self.level)?;
        header.write_i32::<B>(nx)?;
        header.write_i32::<B>(ny)?;
        header.write_i32::<B>(self.projection.code())?;
        write_block::<B, _>(writer, HEADER_LEN as i32, &header)?;

        let projection = self.projection.encode::<B>()?;
        write_block::<B, _>(writer, projection.len() as i32, &projection)?;

        let mut wind = [0; 4];
        B::write_i32(&mut wind, self.wind_grid_relative as i32);
        write_block::<B, _>(writer, 4, &wind)?;

        // the data block marker counts values, not bytes
        let mut data: Vec<u8> = Vec::with_capacity(4 * self.data.len());
        for value in self.data.iter() {
            data.write_f32::<B>(*value)?;
        }
        write_block::<B, _>(writer, nx * ny, &data)
    }

    fn read_with<B: ByteOrder, R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let leading = match read_marker::<B, _>(reader, "version")? {
            Some(leading) => leading,
            None => return Ok(None),
        };
        let version = B::read_i32(&read_payload::<B, _>(reader, "version", 4, leading, 4)?);

        let header = read_block::<B, _>(reader, "header", HEADER_LEN as i32, HEADER_LEN)?;
        let mut rest = header.as_slice();
        let date = get_text(take(&mut rest, HDATE_LEN));
        let forecast_offset = B::read_f32(take(&mut rest, 4));
        let map_source = get_text(take(&mut rest, MAP_SOURCE_LEN));
        let field = get_text(take(&mut rest, FIELD_LEN));
        let units = get_text(take(&mut rest, UNITS_LEN));
        let description = get_text(take(&mut rest, DESC_LEN));
        let level = B::read_f32(take(&mut rest, 4));
        let nx = B::read_i32(take(&mut rest, 4));
        let ny = B::read_i32(take(&mut rest, 4));
        let code = B::read_i32(take(&mut rest, 4));

        let count = match nx.checked_mul(ny) {
            Some(count) if nx > 0 && ny > 0 => count,
            _ => return Err(Error::Dimensions { field, nx, ny }),
        };

        let len = Projection::block_len(code)?;
        let projection = Projection::decode::<B>(
            code,
            &read_block::<B, _>(reader, "projection", len as i32, len)?,
        )?;

        let wind = read_block::<B, _>(reader, "wind flag", 4, 4)?;

        let values = read_block::<B, _>(reader, "data", count, 4 * count as usize)?
            .chunks_exact(4)
            .map(B::read_f32)
            .collect::<Vec<_>>();
        let data = Array2::from_shape_vec((ny as usize, nx as usize), values).map_err(|_| {
            Error::Dimensions {
                field: field.clone(),
                nx,
                ny,
            }
        })?;

        Ok(Some(Record {
            version,
            date,
            forecast_offset,
            map_source,
            field,
            units,
            description,
            level,
            projection,
            wind_grid_relative: B::read_i32(&wind) != 0,
            data,
        }))
    }
}

fn take<'a>(buf: &mut &'a [u8], len: usize) -> &'a [u8] {
    let (head, tail) = buf.split_at(len);
    *buf = tail;
    head
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{constants::SURFACE_LEVEL, iff::projection::samples},
        std::io::Cursor,
    };

    fn record(projection: Projection) -> Record {
        Record {
            version: 5,
            date: "2014-04-21_06:00:00".to_owned(),
            forecast_offset: 0.0,
            map_source: "WRF SVLPP D07 V1".to_owned(),
            field: "SM000010".to_owned(),
            units: "fraction".to_owned(),
            description: "Soil Moist 0-10 cm below grn layer (Up)".to_owned(),
            level: SURFACE_LEVEL,
            projection,
            wind_grid_relative: false,
            data: Array2::from_shape_fn((3, 4), |(j, i)| j as f32 * 0.5 - i as f32 * 1.25),
        }
    }

    fn encode(record: &Record, order: Endianness) -> Vec<u8> {
        let mut buf: Vec<u8> = vec![];
        record.write(&mut buf, order).unwrap();
        buf
    }

    #[test]
    fn every_projection_decodes_to_itself() {
        for order in &[Endianness::Big, Endianness::Little] {
            for projection in samples() {
                let mut expected = record(projection);
                expected.wind_grid_relative = *order == Endianness::Little;

                let buf = encode(&expected, *order);
                let decoded = Record::read(&mut Cursor::new(&buf), *order)
                    .unwrap()
                    .unwrap();

                assert_eq!(decoded, expected);
                assert!(decoded
                    .data
                    .iter()
                    .zip(expected.data.iter())
                    .all(|(a, b)| a.to_bits() == b.to_bits()));
            }
        }
    }

    #[test]
    fn byte_layout() {
        let expected = record(samples().remove(4));
        let buf = encode(&expected, Endianness::Big);

        assert_eq!(buf.len(), 12 + (4 + 156 + 4) + (4 + 36 + 4) + 12 + (4 + 48 + 4));

        // version
        assert_eq!(&buf[..12], &[0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 4]);
        // header
        assert_eq!(BigEndian::read_i32(&buf[12..16]), 156);
        assert_eq!(&buf[16..40], b"2014-04-21_06:00:00     ");
        assert_eq!(&buf[44..76], b"WRF SVLPP D07 V1                ");
        assert_eq!(&buf[76..85], b"SM000010 ");
        assert_eq!(BigEndian::read_f32(&buf[156..160]), 200_100.0);
        assert_eq!(BigEndian::read_i32(&buf[160..164]), 4);
        assert_eq!(BigEndian::read_i32(&buf[164..168]), 3);
        assert_eq!(BigEndian::read_i32(&buf[168..172]), 5);
        assert_eq!(BigEndian::read_i32(&buf[172..176]), 156);
        // projection
        assert_eq!(BigEndian::read_i32(&buf[176..180]), 36);
        assert_eq!(&buf[180..188], b"SWCORNER");
        assert_eq!(BigEndian::read_i32(&buf[216..220]), 36);
        // wind flag
        assert_eq!(&buf[220..232], &[0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 4]);
        // data, west-east fastest
        assert_eq!(BigEndian::read_i32(&buf[232..236]), 12);
        assert_eq!(BigEndian::read_f32(&buf[236..240]), expected.data[(0, 0)]);
        assert_eq!(BigEndian::read_f32(&buf[240..244]), expected.data[(0, 1)]);
        assert_eq!(BigEndian::read_f32(&buf[252..256]), expected.data[(1, 0)]);
        assert_eq!(BigEndian::read_i32(&buf[284..288]), 12);
    }

    #[test]
    fn mercator_trailing_marker() {
        let buf = encode(&record(samples().remove(1)), Endianness::Little);

        assert_eq!(LittleEndian::read_i32(&buf[176..180]), 32);
        assert_eq!(LittleEndian::read_i32(&buf[212..216]), 32);
    }

    #[test]
    fn end_of_stream_at_record_boundary() {
        let mut buf = encode(&record(samples().remove(0)), Endianness::Big);
        buf.extend(encode(&record(samples().remove(2)), Endianness::Big));
        let mut cursor = Cursor::new(&buf);

        let mut next = || Record::read(&mut cursor, Endianness::Big).unwrap();

        assert_eq!(next().unwrap().projection.code(), 0);
        assert_eq!(next().unwrap().projection.code(), 3);
        assert!(next().is_none());
    }

    #[test]
    fn truncated_stream() {
        let buf = encode(&record(samples().remove(3)), Endianness::Big);

        let cuts = [(2, "version"), (30, "header"), (190, "projection"), (250, "data")];

        for &(cut, block) in &cuts {
            match Record::read(&mut Cursor::new(&buf[..cut]), Endianness::Big) {
                Err(Error::Truncated { block: found }) => {
                    assert_eq!(found, block, "cut at {}", cut)
                }
                other => panic!("cut at {}: unexpected {:?}", cut, other),
            }
        }
    }

    #[test]
    fn data_marker_mismatch() {
        let mut buf = encode(&record(samples().remove(4)), Endianness::Big);
        let end = buf.len();
        buf[end - 1] = 48;

        match Record::read(&mut Cursor::new(&buf), Endianness::Big) {
            Err(Error::BlockMarker {
                block,
                expected,
                found,
            }) => {
                assert_eq!(block, "data");
                assert_eq!(expected, 12);
                assert_eq!(found, 48);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_projection_tag() {
        let mut buf = encode(&record(samples().remove(4)), Endianness::Big);
        buf[171] = 2;

        assert!(matches!(
            Record::read(&mut Cursor::new(&buf), Endianness::Big),
            Err(Error::UnknownProjectionTag { tag: 2 })
        ));
    }

    #[test]
    fn empty_data_is_not_written() {
        let mut expected = record(samples().remove(2));
        expected.data = Array2::zeros((3, 0));
        let mut buf: Vec<u8> = vec![];

        assert!(matches!(
            expected.write(&mut buf, Endianness::Big),
            Err(Error::Dimensions { nx: 0, ny: 3, .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn field_name_too_long() {
        let mut expected = record(samples().remove(0));
        expected.field = "SOILMOIST0".to_owned();

        assert!(matches!(
            expected.write(&mut Vec::<u8>::new(), Endianness::Big),
            Err(Error::TextTooLong { field: "field", width: 9, .. })
        ));
    }
}
