//! Conversion of a model grid into one IFF file per time step.
//!
//! A run validates the whole source grid before it computes anything, then
//! computes every field of every time step before it writes anything. Each
//! time step is written through a [`TimestepFile`], which is created empty,
//! receives the surface records followed by the records of every standard
//! pressure level, and is flushed and closed by [`TimestepFile::finish`].
//! The first failure ends the run.

use {
    crate::{
        constants::{PRESSURE_LEVELS, SURFACE_LEVEL},
        destagger::Destaggered,
        error::{Error, Result},
        grid::{self, Dims, GridAccessor, MemoryOrder},
        iff::{Projection, Record},
        parameters::{Endianness, Output, Parameters},
        surface::{self, SurfaceFields},
        vertical::PressureFields,
    },
    log::{debug, info},
    ndarray::{s, Array4, ArrayView2},
    std::{
        fs::{self, File},
        io::{BufWriter, Write},
        path::{Path, PathBuf},
    },
};

/// Field name, units and description of an output field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub field: &'static str,
    pub units: &'static str,
    pub description: &'static str,
}

const fn label(field: &'static str, units: &'static str, description: &'static str) -> Label {
    Label {
        field,
        units,
        description,
    }
}

/// Surface records in file order
pub const SURFACE_LABELS: [Label; 20] = [
    label("TT", "K", "Temperature"),
    label("UU", "m s-1", "U"),
    label("VV", "m s-1", "V"),
    label("WW", "m s-1", "W"),
    label("RH", "%", "Relative Humidity"),
    label("PSFC", "Pa", "Surface Pressure"),
    label("SM000010", "fraction", "Soil Moist 0-10 cm below grn layer (Up)"),
    label("SM010040", "fraction", "Soil Moist 10-40 cm below grn layer"),
    label("SM040100", "fraction", "Soil Moist 40-100 cm below grn layer"),
    label("SM100200", "fraction", "Soil Moist 100-200 cm below grn layer"),
    label("ST000010", "K", "T 0-10 cm below ground layer (Upper)"),
    label("ST010040", "K", "T 10-40 cm below ground layer (Upper)"),
    label("ST040100", "K", "T 40-100 cm below ground layer (Upper)"),
    label("ST100200", "K", "T 100-200 cm below ground layer (Bottom)"),
    label("SEAICE", "proprtn", "Sea Ice Fraction (0-1)"),
    label("XICE", "0/1 Flag", "ice fraction data"),
    label("LANDSEA", "proprtn", "Land/Sea flag (1=land, 0 or 2=sea)"),
    label("SOILHGT", "m", "Terrain field of source analysis"),
    label("SKINTEMP", "K", "Skin temperature"),
    label("SST", "K", "Sea Surface Temperature"),
];

/// Records of every pressure level in file order
pub const PRESSURE_LABELS: [Label; 6] = [
    label("TT", "K", "Temperature"),
    label("UU", "m s-1", "U"),
    label("VV", "m s-1", "V"),
    label("WW", "m s-1", "W"),
    label("RH", "%", "Relative Humidity"),
    label("GHT", "m", "Height"),
];

/// Every source variable and its memory order. Static orders also accept
/// the variable with a leading time axis.
const SOURCE_VARIABLES: [(&str, MemoryOrder); 24] = [
    ("T2", MemoryOrder::Surface),
    ("U10", MemoryOrder::Surface),
    ("V10", MemoryOrder::Surface),
    ("PSFC", MemoryOrder::Surface),
    ("Q2", MemoryOrder::Surface),
    ("SEAICE", MemoryOrder::Surface),
    ("TSK", MemoryOrder::Surface),
    ("SST", MemoryOrder::Surface),
    ("XLAT", MemoryOrder::Static),
    ("XLONG", MemoryOrder::Static),
    ("HGT", MemoryOrder::Static),
    ("ISLTYP", MemoryOrder::Static),
    ("PH", MemoryOrder::BottomTopStaggered),
    ("PHB", MemoryOrder::BottomTopStaggered),
    ("W", MemoryOrder::BottomTopStaggered),
    ("U", MemoryOrder::WestEastStaggered),
    ("V", MemoryOrder::SouthNorthStaggered),
    ("P", MemoryOrder::Unstaggered),
    ("PB", MemoryOrder::Unstaggered),
    ("T", MemoryOrder::Unstaggered),
    ("QVAPOR", MemoryOrder::Unstaggered),
    ("SMOIS", MemoryOrder::Soil),
    ("TSLB", MemoryOrder::Soil),
    ("ZS", MemoryOrder::StaticSoilDepths),
];

/// Checks the memory order of every variable the conversion reads.
pub fn check_source<G: GridAccessor>(grid: &G) -> Result<()> {
    for &(variable, order) in SOURCE_VARIABLES.iter() {
        let order = match order {
            MemoryOrder::Static | MemoryOrder::StaticSoilDepths => {
                grid::static_or(grid, variable, order)?
            }
            order => order,
        };
        grid::check_memory_order(grid, variable, order)?;
    }

    Ok(())
}

/// Converts `grid` into one file per time step, returning their paths.
///
/// Nothing is written unless the whole grid converts.
pub fn convert<G: GridAccessor>(grid: &G, params: &Parameters) -> Result<Vec<PathBuf>> {
    params.validate()?;
    check_source(grid)?;
    let dims = Dims::from_grid(grid)?;
    surface::check_soil_layers(&grid::soil_depths(grid, "ZS", &dims)?)?;

    let projection = Projection::from_grid(grid, &dims, &params.projection)?;
    let timestamps = grid::timestamps(grid, "Times", &dims)?;

    let destaggered = Destaggered::from_grid(grid, &dims)?;
    let surface = SurfaceFields::from_grid(grid, &dims, &destaggered)?;
    let levels = PressureFields::from_grid(grid, &dims, &destaggered)?;

    log_summary(&projection, &dims, &timestamps, &surface);

    let directory = &params.environment.output_directory;
    fs::create_dir_all(directory).map_err(Error::io(directory))?;

    timestamps
        .iter()
        .enumerate()
        .map(|(t, timestamp)| {
            let path = directory.join(format!(
                "{}:{}",
                params.environment.file_prefix, timestamp
            ));
            let records = RecordBuilder {
                output: &params.output,
                projection: &projection,
                date: timestamp,
            };

            write_timestep(&path, t, &records, &surface, &levels, params.output.byte_order)
        })
        .collect()
}

fn log_summary(projection: &Projection, dims: &Dims, timestamps: &[String], surface: &SurfaceFields) {
    info!("{}", projection);
    info!(
        "NT = {}, NX = {}, NY = {}, NSOIL = {}",
        dims.nt, dims.nx, dims.ny, dims.n_soil
    );
    if let Some(first) = timestamps.first() {
        info!("first time step {}", first);
    }
    if dims.nt > 0 && dims.nx > 0 && dims.ny > 0 {
        info!(
            "T2 = {}, RH2 = {}, W10 = {}, PSFC = {} at (0, 0, 0)",
            surface.temperature[(0, 0, 0)],
            surface.relative_humidity[(0, 0, 0)],
            surface.w[(0, 0, 0)],
            surface.pressure[(0, 0, 0)]
        );
    }
}

/// Header values shared by every record of a time step
struct RecordBuilder<'a> {
    output: &'a Output,
    projection: &'a Projection,
    date: &'a str,
}

impl RecordBuilder<'_> {
    fn build(&self, label: &Label, level: f32, data: ArrayView2<f32>) -> Record {
        Record {
            version: self.output.version,
            date: self.date.to_owned(),
            forecast_offset: self.output.forecast_offset,
            map_source: self.output.map_source.clone(),
            field: label.field.to_owned(),
            units: label.units.to_owned(),
            description: label.description.to_owned(),
            level,
            projection: self.projection.clone(),
            wind_grid_relative: self.output.wind_grid_relative,
            data: data.to_owned(),
        }
    }
}

/// Surface slices of time step `t`, in the order of [`SURFACE_LABELS`].
fn surface_slices(surface: &SurfaceFields, t: usize) -> [ArrayView2<f32>; 20] {
    [
        surface.temperature.slice(s![t, .., ..]),
        surface.u.slice(s![t, .., ..]),
        surface.v.slice(s![t, .., ..]),
        surface.w.slice(s![t, .., ..]),
        surface.relative_humidity.slice(s![t, .., ..]),
        surface.pressure.slice(s![t, .., ..]),
        surface.soil_moisture.slice(s![t, 0, .., ..]),
        surface.soil_moisture.slice(s![t, 1, .., ..]),
        surface.soil_moisture.slice(s![t, 2, .., ..]),
        surface.soil_moisture.slice(s![t, 3, .., ..]),
        surface.soil_temperature.slice(s![t, 0, .., ..]),
        surface.soil_temperature.slice(s![t, 1, .., ..]),
        surface.soil_temperature.slice(s![t, 2, .., ..]),
        surface.soil_temperature.slice(s![t, 3, .., ..]),
        surface.sea_ice.slice(s![t, .., ..]),
        surface.sea_ice.slice(s![t, .., ..]),
        surface.land_sea.view(),
        surface.terrain.view(),
        surface.skin_temperature.slice(s![t, .., ..]),
        surface.sea_surface_temperature.slice(s![t, .., ..]),
    ]
}

/// Pressure level fields in the order of [`PRESSURE_LABELS`].
fn pressure_fields(levels: &PressureFields) -> [&Array4<f32>; 6] {
    [
        &levels.temperature,
        &levels.u,
        &levels.v,
        &levels.w,
        &levels.relative_humidity,
        &levels.height,
    ]
}

fn write_timestep(
    path: &Path,
    t: usize,
    records: &RecordBuilder,
    surface: &SurfaceFields,
    levels: &PressureFields,
    order: Endianness,
) -> Result<PathBuf> {
    info!("writing {}", path.display());
    let mut file = TimestepFile::create(path, order)?;

    for (label, data) in SURFACE_LABELS.iter().zip(surface_slices(surface, t).iter()) {
        file.write_record(&records.build(label, SURFACE_LEVEL, data.view()))?;
    }

    for (l, &level) in PRESSURE_LEVELS.iter().enumerate() {
        for (label, field) in PRESSURE_LABELS.iter().zip(pressure_fields(levels).iter()) {
            file.write_record(&records.build(label, level, field.slice(s![t, l, .., ..])))?;
        }
    }

    file.finish()
}

/// Output file of one time step, open from `create` until `finish`
pub struct TimestepFile {
    path: PathBuf,
    writer: BufWriter<File>,
    order: Endianness,
    records: usize,
}

impl TimestepFile {
    /// Creates or truncates the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P, order: Endianness) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let file = File::create(&path).map_err(Error::io(&path))?;

        Ok(TimestepFile {
            path,
            writer: BufWriter::new(file),
            order,
            records: 0,
        })
    }

    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        debug!(
            "{}: {} at {}",
            self.path.display(),
            record.field,
            record.level
        );

        record
            .write(&mut self.writer, self.order)
            .map_err(|e| match e {
                Error::Stream(source) => Error::WriteRecord {
                    path: self.path.clone(),
                    field: record.field.clone(),
                    level: record.level,
                    source,
                },
                e => e,
            })?;
        self.records += 1;
        Ok(())
    }

    /// Flushes and closes the file, returning its path.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush().map_err(Error::io(&self.path))?;
        debug!("{} records in {}", self.records, self.path.display());
        Ok(self.path)
    }
}
