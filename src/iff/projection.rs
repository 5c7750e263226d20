use {
    super::{get_text, put_text},
    crate::{
        constants::STARTLOC_LEN,
        error::{Error, Result},
        grid::{self, Dims, GridAccessor},
        parameters,
    },
    byteorder::{ByteOrder, WriteBytesExt},
    std::fmt,
};

/// Grid point the projection is anchored at
#[derive(Debug, Clone, PartialEq)]
pub struct StartPoint {
    /// Which point of the grid `lat` and `lon` refer to, e.g. "SWCORNER"
    pub location: String,
    pub lat: f32,
    pub lon: f32,
}

/// Map projection of every record of a run
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    CylindricalEquidistant {
        start: StartPoint,
        delta_lat: f32,
        delta_lon: f32,
        earth_radius: f32,
    },
    Mercator {
        start: StartPoint,
        dx: f32,
        dy: f32,
        truelat1: f32,
        earth_radius: f32,
    },
    LambertConformal {
        start: StartPoint,
        dx: f32,
        dy: f32,
        /// Standard longitude
        xlonc: f32,
        truelat1: f32,
        truelat2: f32,
        earth_radius: f32,
    },
    Gaussian {
        start: StartPoint,
        /// Number of latitudes between a pole and the equator
        nlats: f32,
        delta_lon: f32,
        earth_radius: f32,
    },
    PolarStereographic {
        start: StartPoint,
        dx: f32,
        dy: f32,
        xlonc: f32,
        truelat1: f32,
        earth_radius: f32,
    },
}

impl Projection {
    /// Projection of a model grid from its `MAP_PROJ` attribute.
    pub fn from_grid<G: GridAccessor>(
        grid: &G,
        dims: &Dims,
        params: &parameters::Projection,
    ) -> Result<Self> {
        let code = grid::attribute_i64(grid, "MAP_PROJ")?;
        if ![1, 2, 3, 6].contains(&code) {
            return Err(Error::UnsupportedProjection { code });
        }

        let xlat = grid::static_surface(grid, "XLAT", dims)?;
        let xlong = grid::static_surface(grid, "XLONG", dims)?;
        let start = StartPoint {
            location: params.start_location.clone(),
            lat: xlat[(0, 0)],
            lon: xlong[(0, 0)],
        };
        let earth_radius = params.earth_radius;

        let attribute = |name: &str| grid::attribute_f32(grid, name);

        Ok(match code {
            1 => Projection::LambertConformal {
                start,
                dx: attribute("DX")?,
                dy: attribute("DY")?,
                xlonc: attribute("STAND_LON")?,
                truelat1: attribute("TRUELAT1")?,
                truelat2: attribute("TRUELAT2")?,
                earth_radius,
            },
            2 => Projection::PolarStereographic {
                start,
                dx: attribute("DX")?,
                dy: attribute("DY")?,
                xlonc: attribute("STAND_LON")?,
                truelat1: attribute("TRUELAT1")?,
                earth_radius,
            },
            3 => Projection::Mercator {
                start,
                dx: attribute("DX")?,
                dy: attribute("DY")?,
                truelat1: attribute("TRUELAT1")?,
                earth_radius,
            },
            _ => Projection::CylindricalEquidistant {
                delta_lat: if dims.ny > 1 {
                    xlat[(1, 0)] - start.lat
                } else {
                    0.0
                },
                delta_lon: if dims.nx > 1 {
                    xlong[(0, 1)] - start.lon
                } else {
                    0.0
                },
                start,
                earth_radius,
            },
        })
    }

    /// Tag written into the record header
    pub fn code(&self) -> i32 {
        match self {
            Projection::CylindricalEquidistant { .. } => 0,
            Projection::Mercator { .. } => 1,
            Projection::LambertConformal { .. } => 3,
            Projection::Gaussian { .. } => 4,
            Projection::PolarStereographic { .. } => 5,
        }
    }

    /// Byte length of the projection block of tag `code`
    pub fn block_len(code: i32) -> Result<usize> {
        match code {
            0 | 4 => Ok(28),
            1 => Ok(32),
            3 => Ok(40),
            5 => Ok(36),
            tag => Err(Error::UnknownProjectionTag { tag }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Projection::CylindricalEquidistant { .. } => "Cylindrical equidistant",
            Projection::Mercator { .. } => "Mercator",
            Projection::LambertConformal { .. } => "Lambert conformal",
            Projection::Gaussian { .. } => "Gaussian",
            Projection::PolarStereographic { .. } => "Polar stereographic",
        }
    }

    pub fn start(&self) -> &StartPoint {
        match self {
            Projection::CylindricalEquidistant { start, .. }
            | Projection::Mercator { start, .. }
            | Projection::LambertConformal { start, .. }
            | Projection::Gaussian { start, .. }
            | Projection::PolarStereographic { start, .. } => start,
        }
    }

    pub fn earth_radius(&self) -> f32 {
        match *self {
            Projection::CylindricalEquidistant { earth_radius, .. }
            | Projection::Mercator { earth_radius, .. }
            | Projection::LambertConformal { earth_radius, .. }
            | Projection::Gaussian { earth_radius, .. }
            | Projection::PolarStereographic { earth_radius, .. } => earth_radius,
        }
    }

    fn parameters(&self) -> Vec<f32> {
        match *self {
            Projection::CylindricalEquidistant {
                delta_lat,
                delta_lon,
                earth_radius,
                ..
            } => vec![delta_lat, delta_lon, earth_radius],
            Projection::Mercator {
                dx,
                dy,
                truelat1,
                earth_radius,
                ..
            } => vec![dx, dy, truelat1, earth_radius],
            Projection::LambertConformal {
                dx,
                dy,
                xlonc,
                truelat1,
                truelat2,
                earth_radius,
                ..
            } => vec![dx, dy, xlonc, truelat1, truelat2, earth_radius],
            Projection::Gaussian {
                nlats,
                delta_lon,
                earth_radius,
                ..
            } => vec![nlats, delta_lon, earth_radius],
            Projection::PolarStereographic {
                dx,
                dy,
                xlonc,
                truelat1,
                earth_radius,
                ..
            } => vec![dx, dy, xlonc, truelat1, earth_radius],
        }
    }

    /// Payload of the projection block
    pub(crate) fn encode<B: ByteOrder>(&self) -> Result<Vec<u8>> {
        let start = self.start();
        let mut buf = Vec::with_capacity(Self::block_len(self.code())?);

        put_text(&mut buf, "start location", &start.location, STARTLOC_LEN)?;
        buf.write_f32::<B>(start.lat)?;
        buf.write_f32::<B>(start.lon)?;
        for value in self.parameters() {
            buf.write_f32::<B>(value)?;
        }

        Ok(buf)
    }

    /// Projection of tag `code` from a block payload of `block_len(code)` bytes.
    pub(crate) fn decode<B: ByteOrder>(code: i32, payload: &[u8]) -> Result<Self> {
        Self::block_len(code)?;

        let (location, values) = payload.split_at(STARTLOC_LEN.min(payload.len()));
        let values = values.chunks_exact(4).map(B::read_f32).collect::<Vec<_>>();

        let (lat, lon, rest) = match values.as_slice() {
            [lat, lon, rest @ ..] => (*lat, *lon, rest),
            _ => return Err(Error::Truncated { block: "projection" }),
        };
        let start = StartPoint {
            location: get_text(location),
            lat,
            lon,
        };

        Ok(match (code, rest) {
            (0, &[delta_lat, delta_lon, earth_radius]) => Projection::CylindricalEquidistant {
                start,
                delta_lat,
                delta_lon,
                earth_radius,
            },
            (1, &[dx, dy, truelat1, earth_radius]) => Projection::Mercator {
                start,
                dx,
                dy,
                truelat1,
                earth_radius,
            },
            (3, &[dx, dy, xlonc, truelat1, truelat2, earth_radius]) => {
                Projection::LambertConformal {
                    start,
                    dx,
                    dy,
                    xlonc,
                    truelat1,
                    truelat2,
                    earth_radius,
                }
            }
            (4, &[nlats, delta_lon, earth_radius]) => Projection::Gaussian {
                start,
                nlats,
                delta_lon,
                earth_radius,
            },
            (5, &[dx, dy, xlonc, truelat1, earth_radius]) => Projection::PolarStereographic {
                start,
                dx,
                dy,
                xlonc,
                truelat1,
                earth_radius,
            },
            _ => return Err(Error::Truncated { block: "projection" }),
        })
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start();
        writeln!(f, "IPROJ = {} ({})", self.code(), self.name())?;
        writeln!(f, "STARTLOC = {}", start.location)?;
        writeln!(f, "REF_X, REF_Y = {}, {}", start.lat, start.lon)?;

        match self {
            Projection::CylindricalEquidistant {
                delta_lat,
                delta_lon,
                ..
            } => writeln!(f, "DLAT, DLON = {}, {}", delta_lat, delta_lon)?,
            Projection::Mercator {
                dx, dy, truelat1, ..
            } => {
                writeln!(f, "DX, DY = {}, {}", dx, dy)?;
                writeln!(f, "TRUELAT1 = {}", truelat1)?;
            }
            Projection::LambertConformal {
                dx,
                dy,
                xlonc,
                truelat1,
                truelat2,
                ..
            } => {
                writeln!(f, "DX, DY = {}, {}", dx, dy)?;
                writeln!(f, "XLONC = {}", xlonc)?;
                writeln!(f, "TRUELAT1, TRUELAT2 = {}, {}", truelat1, truelat2)?;
            }
            Projection::Gaussian {
                nlats, delta_lon, ..
            } => {
                writeln!(f, "NLATS = {}", nlats)?;
                writeln!(f, "DLON = {}", delta_lon)?;
            }
            Projection::PolarStereographic {
                dx,
                dy,
                xlonc,
                truelat1,
                ..
            } => {
                writeln!(f, "DX, DY = {}, {}", dx, dy)?;
                writeln!(f, "XLONC = {}", xlonc)?;
                writeln!(f, "TRUELAT1 = {}", truelat1)?;
            }
        }

        write!(f, "EARTH_RADIUS = {}", self.earth_radius())
    }
}

#[cfg(test)]
fn sample_start() -> StartPoint {
    StartPoint {
        location: "SWCORNER".to_owned(),
        lat: 47.25,
        lon: -11.5,
    }
}

/// One projection of every kind
#[cfg(test)]
pub(crate) fn samples() -> Vec<Projection> {
    vec![
        Projection::CylindricalEquidistant {
            start: sample_start(),
            delta_lat: 0.25,
            delta_lon: 0.5,
            earth_radius: 6_371_220.0,
        },
        Projection::Mercator {
            start: sample_start(),
            dx: 12_000.0,
            dy: 12_000.0,
            truelat1: 30.0,
            earth_radius: 6_371_220.0,
        },
        Projection::LambertConformal {
            start: sample_start(),
            dx: 3000.0,
            dy: 3000.0,
            xlonc: 10.0,
            truelat1: 30.0,
            truelat2: 60.0,
            earth_radius: 6_371_220.0,
        },
        Projection::Gaussian {
            start: StartPoint {
                location: "CENTER".to_owned(),
                lat: 89.5,
                lon: 0.0,
            },
            nlats: 96.0,
            delta_lon: 1.875,
            earth_radius: 6_371_220.0,
        },
        Projection::PolarStereographic {
            start: sample_start(),
            dx: 3000.0,
            dy: 3000.0,
            xlonc: 10.0,
            truelat1: 60.0,
            earth_radius: 6_371_220.0,
        },
    ]
}
