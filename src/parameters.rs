use {
    crate::{
        constants::{EARTH_RADIUS, IFF_VERSION, MAP_SOURCE_LEN, STARTLOC_LEN},
        error::{Error, Result},
    },
    serde::Deserialize,
    std::path::PathBuf,
};

/// Run parameters
#[derive(Debug, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub environment: Environment,
    pub output: Output,
    pub projection: Projection,
}

impl Parameters {
    /// Checks that the text written into every record fits its field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("map source", &self.output.map_source, MAP_SOURCE_LEN),
            ("start location", &self.projection.start_location, STARTLOC_LEN),
        ];

        for &(field, value, width) in fields.iter() {
            if value.len() > width {
                return Err(Error::TextTooLong {
                    field,
                    value: value.clone(),
                    width,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Directory receiving one IFF file per time step
    pub output_directory: PathBuf,
    /// Output files are named "<file_prefix>:<timestamp>"
    pub file_prefix: String,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            output_directory: PathBuf::from("."),
            file_prefix: "WRF".to_owned(),
        }
    }
}

/// Byte order of every integer and float in an output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Big,
    Little,
}

impl std::str::FromStr for Endianness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "big" => Ok(Endianness::Big),
            "little" => Ok(Endianness::Little),
            _ => Err(format!("unknown byte order \"{}\"", s)),
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Output {
    /// Data source identifier written into every header
    pub map_source: String,
    /// IFF version number
    pub version: i32,
    /// Forecast offset written into every header
    pub forecast_offset: f32,
    pub byte_order: Endianness,
    /// Whether winds are relative to the source grid rather than the earth
    pub wind_grid_relative: bool,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            map_source: "WRF SVLPP D07 V1".to_owned(),
            version: IFF_VERSION,
            forecast_offset: 0.0,
            byte_order: Endianness::Big,
            wind_grid_relative: false,
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Earth radius written into every projection block (m)
    pub earth_radius: f32,
    /// Reference point of the start latitude/longitude
    pub start_location: String,
}

impl Default for Projection {
    fn default() -> Self {
        Projection {
            earth_radius: EARTH_RADIUS,
            start_location: "SWCORNER".to_owned(),
        }
    }
}
