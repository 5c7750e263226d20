/// Gravitational acceleration used to turn geopotential into height (m s-2)
pub const GRAVITY: f32 = 9.81;

/// Gas constant of dry air (J kg-1 K-1)
pub const R_D: f32 = 287.04;
/// Specific heat of dry air at constant pressure
pub const CP: f32 = 7.0 * R_D / 2.0;
/// Reference pressure for potential temperature (Pa)
pub const P1000MB: f32 = 100_000.0;
/// Offset added to the model's perturbation potential temperature (K)
pub const THETA_OFFSET: f32 = 300.0;

// Saturation vapour pressure coefficients
pub const SVP1: f64 = 0.6112;
pub const SVP2: f64 = 17.67;
pub const SVP3: f64 = 29.65;
pub const SVPT0: f64 = 273.15;
pub const EP_3: f64 = 0.622;

/// Height above ground of the derived vertical wind (m)
pub const W10_HEIGHT: f32 = 10.0;

/// Soil type codes that mark a cell as sea
pub const SEA_SOIL_TYPES: [i32; 2] = [14, 16];

/// Required soil layer depths (m)
pub const SOIL_DEPTHS: [f32; 4] = [0.05, 0.25, 0.70, 1.50];
pub const SOIL_DEPTH_TOLERANCE: f32 = 0.001;

/// Standard pressure levels (Pa), surface first
pub const PRESSURE_LEVELS: [f32; 26] = [
    100_000.0, 97_500.0, 95_000.0, 92_500.0, 90_000.0, 85_000.0, 80_000.0, 75_000.0, 70_000.0,
    65_000.0, 60_000.0, 55_000.0, 50_000.0, 45_000.0, 40_000.0, 35_000.0, 30_000.0, 25_000.0,
    20_000.0, 15_000.0, 10_000.0, 7_000.0, 5_000.0, 3_000.0, 2_000.0, 1_000.0,
];

/// Level value written for surface records
pub const SURFACE_LEVEL: f32 = 200_100.0;

pub const IFF_VERSION: i32 = 5;
pub const EARTH_RADIUS: f32 = 6_371_220.0;

// Fixed widths of the text fields of an IFF header
pub const HDATE_LEN: usize = 24;
pub const MAP_SOURCE_LEN: usize = 32;
pub const FIELD_LEN: usize = 9;
pub const UNITS_LEN: usize = 25;
pub const DESC_LEN: usize = 46;
pub const STARTLOC_LEN: usize = 8;

/// Byte length of the header block
pub const HEADER_LEN: usize =
    HDATE_LEN + 4 + MAP_SOURCE_LEN + FIELD_LEN + UNITS_LEN + DESC_LEN + 4 + 4 + 4 + 4;

/// Length of a single `Times` entry in the source grid
pub const TIMESTAMP_LEN: usize = 19;
