//! Near surface fields derived from the source grid.

use {
    crate::{
        constants::{
            EP_3, SEA_SOIL_TYPES, SOIL_DEPTHS, SOIL_DEPTH_TOLERANCE, SVP1, SVP2, SVP3, SVPT0,
            W10_HEIGHT,
        },
        destagger::Destaggered,
        error::{Error, Result},
        grid::{self, Dims, GridAccessor, MemoryOrder, LEVEL},
        vertical::{bracket, interpolate, Bracket, Direction},
    },
    ndarray::{
        s, Array, Array2, Array3, Array4, ArrayView, ArrayView2, ArrayView3, ArrayView4, Dimension,
        Zip,
    },
};

/// Relative humidity (%) from water vapour mixing ratio (kg kg-1), pressure
/// (Pa) and temperature (K), clamped to `[0, 100]`.
pub fn relative_humidity(qv: f32, p: f32, t: f32) -> f32 {
    let (qv, p, t) = (f64::from(qv), f64::from(p), f64::from(t));

    let es = 10.0 * SVP1 * (SVP2 * (t - SVPT0) / (t - SVP3)).exp();
    let qvs = EP_3 * es / (0.01 * p - (1.0 - EP_3) * es);

    // `max` and `min` both discard NaN
    (100.0 * (qv / qvs).max(0.0).min(1.0)) as f32
}

/// 0.0 for sea soil types, 1.0 for everything else.
pub fn land_sea_flag(soil_type: f32) -> f32 {
    if SEA_SOIL_TYPES.contains(&(soil_type.round() as i32)) {
        0.0
    } else {
        1.0
    }
}

/// Rejects any soil layer structure other than the four fixed depths.
pub fn check_soil_layers(depths: &[f32]) -> Result<()> {
    if depths.len() != SOIL_DEPTHS.len() {
        return Err(Error::SoilLayerCount {
            found: depths.len(),
        });
    }

    if depths
        .iter()
        .zip(&SOIL_DEPTHS)
        .any(|(found, expected)| (found - expected).abs() > SOIL_DEPTH_TOLERANCE)
    {
        return Err(Error::SoilLayerDepths {
            depths: depths.to_vec(),
        });
    }

    Ok(())
}

/// Vertical wind 10 m above the terrain, interpolated linearly in height
/// between the enclosing staggered levels. Columns that do not reach 10 m,
/// or start above it, take the nearest level's value.
pub fn vertical_wind_10m(
    w: ArrayView4<f32>,
    height: ArrayView4<f32>,
    terrain: ArrayView2<f32>,
) -> Array3<f32> {
    let (nt, _, ny, nx) = w.dim();

    Array3::from_shape_fn((nt, ny, nx), |(t, j, i)| {
        let above_ground = height.slice(s![t, .., j, i]).mapv(|h| h - terrain[(j, i)]);

        match bracket(above_ground.view(), W10_HEIGHT, Direction::Increasing) {
            Bracket::Between(k) => interpolate(
                w[(t, k, j, i)],
                w[(t, k + 1, j, i)],
                above_ground[k],
                above_ground[k + 1],
                W10_HEIGHT,
            ),
            Bracket::Clamped(k) => w[(t, k, j, i)],
        }
    })
}

/// Relative humidity of every cell of a surface or model level field.
pub fn relative_humidity_field<D: Dimension>(
    qv: ArrayView<f32, D>,
    p: ArrayView<f32, D>,
    t: ArrayView<f32, D>,
) -> Array<f32, D> {
    let mut rh = Array::zeros(qv.raw_dim());
    Zip::from(&mut rh)
        .and(&qv)
        .and(&p)
        .and(&t)
        .apply(|rh, &qv, &p, &t| *rh = relative_humidity(qv, p, t));
    rh
}

/// Surface records of every time step, axes `(time, south_north, west_east)`
/// unless noted.
#[derive(Debug, Clone)]
pub struct SurfaceFields {
    /// 2 m temperature (K)
    pub temperature: Array3<f32>,
    /// 10 m winds (m s-1)
    pub u: Array3<f32>,
    pub v: Array3<f32>,
    pub w: Array3<f32>,
    /// 2 m relative humidity (%)
    pub relative_humidity: Array3<f32>,
    /// Surface pressure (Pa)
    pub pressure: Array3<f32>,
    /// Soil moisture and temperature, axes `(time, layer, south_north, west_east)`
    pub soil_moisture: Array4<f32>,
    pub soil_temperature: Array4<f32>,
    pub sea_ice: Array3<f32>,
    /// Time invariant, `(south_north, west_east)`
    pub land_sea: Array2<f32>,
    /// Time invariant terrain height (m)
    pub terrain: Array2<f32>,
    pub skin_temperature: Array3<f32>,
    pub sea_surface_temperature: Array3<f32>,
}

impl SurfaceFields {
    pub fn from_grid<G: GridAccessor>(
        grid: &G,
        dims: &Dims,
        destaggered: &Destaggered,
    ) -> Result<Self> {
        let temperature = grid::surface(grid, "T2", dims)?;
        let pressure = grid::surface(grid, "PSFC", dims)?;
        let q2 = grid::surface(grid, "Q2", dims)?;
        let terrain = grid::static_surface(grid, "HGT", dims)?;

        let relative_humidity =
            relative_humidity_field(q2.view(), pressure.view(), temperature.view());
        let w = vertical_wind_10m(
            destaggered.w_staggered.view(),
            destaggered.height_staggered.view(),
            terrain.view(),
        );

        Ok(SurfaceFields {
            u: grid::surface(grid, "U10", dims)?,
            v: grid::surface(grid, "V10", dims)?,
            w,
            relative_humidity,
            soil_moisture: grid::field4(grid, "SMOIS", MemoryOrder::Soil, dims)?,
            soil_temperature: grid::field4(grid, "TSLB", MemoryOrder::Soil, dims)?,
            sea_ice: grid::surface(grid, "SEAICE", dims)?,
            land_sea: grid::static_surface(grid, "ISLTYP", dims)?.mapv(land_sea_flag),
            terrain,
            skin_temperature: grid::surface(grid, "TSK", dims)?,
            sea_surface_temperature: grid::surface(grid, "SST", dims)?,
            temperature,
            pressure,
        })
    }

    /// One soil layer of a soil field, copied without depth weighting.
    pub fn soil_layer(field: &Array4<f32>, layer: usize) -> ArrayView3<f32> {
        field.index_axis(LEVEL, layer)
    }
}
