//! Interpolation from model levels onto the standard pressure levels.

use {
    crate::{
        constants::{CP, P1000MB, PRESSURE_LEVELS, R_D, THETA_OFFSET},
        destagger::Destaggered,
        error::Result,
        grid::{self, Dims, GridAccessor, MemoryOrder},
        surface::relative_humidity_field,
    },
    log::warn,
    ndarray::{s, Array4, ArrayView1, Zip},
};

/// Value on the line through `(p1, v1)` and `(p2, v2)` at `target`.
///
/// Returns `v1` exactly at `p1`, `v2` exactly at `p2`, and `v1` when the
/// two points coincide.
pub fn interpolate(v1: f32, v2: f32, p1: f32, p2: f32, target: f32) -> f32 {
    if p1 == p2 {
        return v1;
    }

    let weight = (target - p1) / (p2 - p1);
    v1 * (1.0 - weight) + v2 * weight
}

/// Which way a vertical coordinate runs from the lowest level upwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Height
    Increasing,
    /// Pressure
    Decreasing,
}

/// Where a target value sits in a column of levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// Between levels `k` and `k + 1`
    Between(usize),
    /// Outside the column, nearest level `k`
    Clamped(usize),
}

/// Scans `column` from the lowest level upwards and brackets `target`
/// between the last level before it and the first level past it.
///
/// `column` must not be empty.
pub fn bracket(column: ArrayView1<f32>, target: f32, direction: Direction) -> Bracket {
    let past = |value: f32| match direction {
        Direction::Increasing => value > target,
        Direction::Decreasing => value < target,
    };

    let top = column.len() - 1;
    if past(column[0]) {
        return Bracket::Clamped(0);
    }

    match (1..=top).find(|&k| past(column[k])) {
        Some(k) => Bracket::Between(k - 1),
        None if top > 0 && column[top] == target => Bracket::Between(top - 1),
        None => Bracket::Clamped(top),
    }
}

/// Absolute temperature (K) from the model's perturbation potential
/// temperature and full pressure (Pa).
pub fn temperature(theta_perturbation: f32, pressure: f32) -> f32 {
    (theta_perturbation + THETA_OFFSET) * (pressure / P1000MB).powf(R_D / CP)
}

/// Bracket of every standard pressure level in every column, axes
/// `(time, pressure_level, south_north, west_east)`.
pub fn locate_levels(pressure: &Array4<f32>) -> Array4<Bracket> {
    let (nt, _, ny, nx) = pressure.dim();

    let brackets = Array4::from_shape_fn((nt, PRESSURE_LEVELS.len(), ny, nx), |(t, l, j, i)| {
        bracket(
            pressure.slice(s![t, .., j, i]),
            PRESSURE_LEVELS[l],
            Direction::Decreasing,
        )
    });

    for (l, level) in PRESSURE_LEVELS.iter().enumerate() {
        let clamped = brackets
            .slice(s![.., l, .., ..])
            .iter()
            .filter(|b| matches!(b, Bracket::Clamped(_)))
            .count();

        if clamped > 0 {
            warn!(
                "{} of {} cells outside model levels at {} Pa, using boundary values",
                clamped,
                nt * ny * nx,
                level
            );
        }
    }

    brackets
}

/// Interpolates a model level field onto the standard pressure levels.
pub fn on_pressure_levels(
    field: &Array4<f32>,
    pressure: &Array4<f32>,
    brackets: &Array4<Bracket>,
) -> Array4<f32> {
    Array4::from_shape_fn(brackets.dim(), |(t, l, j, i)| match brackets[(t, l, j, i)] {
        Bracket::Between(k) => interpolate(
            field[(t, k, j, i)],
            field[(t, k + 1, j, i)],
            pressure[(t, k, j, i)],
            pressure[(t, k + 1, j, i)],
            PRESSURE_LEVELS[l],
        ),
        Bracket::Clamped(k) => field[(t, k, j, i)],
    })
}

/// Fields on the standard pressure levels, axes
/// `(time, pressure_level, south_north, west_east)`.
#[derive(Debug, Clone)]
pub struct PressureFields {
    /// K
    pub temperature: Array4<f32>,
    /// m s-1
    pub u: Array4<f32>,
    pub v: Array4<f32>,
    pub w: Array4<f32>,
    /// %
    pub relative_humidity: Array4<f32>,
    /// m
    pub height: Array4<f32>,
}

impl PressureFields {
    pub fn from_grid<G: GridAccessor>(
        grid: &G,
        dims: &Dims,
        destaggered: &Destaggered,
    ) -> Result<Self> {
        let mut pressure = grid::field4(grid, "P", MemoryOrder::Unstaggered, dims)?;
        pressure += &grid::field4(grid, "PB", MemoryOrder::Unstaggered, dims)?;

        let theta = grid::field4(grid, "T", MemoryOrder::Unstaggered, dims)?;
        let qvapor = grid::field4(grid, "QVAPOR", MemoryOrder::Unstaggered, dims)?;

        Ok(Self::interpolate(&pressure, &theta, &qvapor, destaggered))
    }

    /// Interpolates every field given the full model pressure (Pa),
    /// perturbation potential temperature (K) and water vapour mixing ratio.
    pub fn interpolate(
        pressure: &Array4<f32>,
        theta: &Array4<f32>,
        qvapor: &Array4<f32>,
        destaggered: &Destaggered,
    ) -> Self {
        let mut model_temperature = Array4::zeros(pressure.raw_dim());
        Zip::from(&mut model_temperature)
            .and(theta)
            .and(pressure)
            .apply(|tk, &theta, &p| *tk = temperature(theta, p));

        let model_rh =
            relative_humidity_field(qvapor.view(), pressure.view(), model_temperature.view());

        let brackets = locate_levels(pressure);
        let on_levels = |field: &Array4<f32>| on_pressure_levels(field, pressure, &brackets);

        PressureFields {
            temperature: on_levels(&model_temperature),
            u: on_levels(&destaggered.u),
            v: on_levels(&destaggered.v),
            w: on_levels(&destaggered.w),
            relative_humidity: on_levels(&model_rh),
            height: on_levels(&destaggered.height),
        }
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{
            destagger::destagger,
            grid::{synthetic_grid, LEVEL},
        },
        approx::assert_abs_diff_eq,
        ndarray::Array1,
    };

    #[test]
    fn degenerate_bracket() {
        for &v in &[-3.5f32, 0.0, 1.0E-7, 290.0, 6.0E5] {
            for &p in &[0.0f32, 1000.0, 87_500.0] {
                assert_eq!(interpolate(v, v, p, p, p), v);
                assert_eq!(interpolate(v, v + 1.0, p, p, p + 10.0), v);
            }
        }
    }

    #[test]
    fn exact_at_endpoints() {
        let cases = [
            (300.0f32, 280.0f32, 95_000.0f32, 80_000.0f32),
            (-1.25, 7.5, 100.0, 250.0),
            (0.1, 0.3, 97_500.0, 97_499.0),
            (1.0E-3, 4.0E3, 1000.0, 3.0),
        ];

        for &(v1, v2, p1, p2) in &cases {
            assert_eq!(interpolate(v1, v2, p1, p2, p1), v1);
            assert_eq!(interpolate(v1, v2, p1, p2, p2), v2);
        }
    }

    #[test]
    fn midpoint_temperature() {
        assert_eq!(interpolate(300.0, 280.0, 95_000.0, 80_000.0, 87_500.0), 290.0);
    }

    #[test]
    fn pressure_levels_strictly_decreasing() {
        assert_eq!(PRESSURE_LEVELS.len(), 26);
        assert_eq!(PRESSURE_LEVELS[0], 100_000.0);
        assert_eq!(PRESSURE_LEVELS[25], 1000.0);
        assert!(PRESSURE_LEVELS.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn bracket_pressure_column() {
        let column = Array1::from(vec![95_000.0f32, 80_000.0, 60_000.0]);

        let at = |target| bracket(column.view(), target, Direction::Decreasing);

        assert_eq!(at(100_000.0), Bracket::Clamped(0));
        assert_eq!(at(95_000.0), Bracket::Between(0));
        assert_eq!(at(87_500.0), Bracket::Between(0));
        assert_eq!(at(80_000.0), Bracket::Between(1));
        assert_eq!(at(60_000.0), Bracket::Between(1));
        assert_eq!(at(50_000.0), Bracket::Clamped(2));
    }

    #[test]
    fn boundary_clamping() {
        let pressure = Array4::from_shape_fn((1, 3, 1, 2), |(_, k, _, i)| {
            [90_000.0f32, 70_000.0, 40_000.0][k] + 1000.0 * i as f32
        });
        let field = Array4::from_shape_fn((1, 3, 1, 2), |(_, k, _, i)| (k * 10 + i) as f32 + 0.25);

        let brackets = locate_levels(&pressure);
        let levels = on_pressure_levels(&field, &pressure, &brackets);

        assert_eq!(levels.dim(), (1, 26, 1, 2));
        for (l, &p) in PRESSURE_LEVELS.iter().enumerate() {
            for i in 0..2 {
                if p > pressure[(0, 0, 0, i)] {
                    assert_eq!(levels[(0, l, 0, i)], field[(0, 0, 0, i)]);
                }
                if p < pressure[(0, 2, 0, i)] {
                    assert_eq!(levels[(0, l, 0, i)], field[(0, 2, 0, i)]);
                }
            }
        }
    }

    #[test]
    fn two_level_scenario() {
        let staggered = Array1::from(vec![0.0f32, 100.0, 250.0]);
        let height_staggered =
            Array4::from_shape_fn((1, 3, 2, 2), |(_, k, _, _)| staggered[k]);
        let height = destagger(height_staggered.view(), LEVEL);
        let pressure = Array4::from_shape_fn((1, 2, 2, 2), |(_, k, _, _)| {
            [95_000.0f32, 80_000.0][k]
        });
        let absolute = Array4::from_shape_fn((1, 2, 2, 2), |(_, k, _, _)| [300.0f32, 280.0][k]);

        let brackets = locate_levels(&pressure);
        let on_levels = on_pressure_levels(&absolute, &pressure, &brackets);
        let height_on_levels = on_pressure_levels(&height, &pressure, &brackets);

        let l = PRESSURE_LEVELS.iter().position(|&p| p == 85_000.0).unwrap();
        for j in 0..2 {
            for i in 0..2 {
                assert_eq!(height[(0, 0, j, i)], 50.0);
                assert_eq!(height[(0, 1, j, i)], 175.0);
                assert_abs_diff_eq!(on_levels[(0, l, j, i)], 280.0 + 20.0 / 3.0, epsilon = 1.0E-3);
                assert_abs_diff_eq!(
                    height_on_levels[(0, l, j, i)],
                    50.0 + 125.0 * 2.0 / 3.0,
                    epsilon = 1.0E-3
                );
            }
        }
        assert_eq!(
            interpolate(
                absolute[(0, 0, 0, 0)],
                absolute[(0, 1, 0, 0)],
                pressure[(0, 0, 0, 0)],
                pressure[(0, 1, 0, 0)],
                87_500.0
            ),
            290.0
        );
    }

    #[test]
    fn potential_to_absolute_temperature() {
        assert_abs_diff_eq!(temperature(0.0, 100_000.0), 300.0, epsilon = 1.0E-4);
        assert_abs_diff_eq!(
            temperature(10.0, 50_000.0),
            310.0 * 0.5f32.powf(2.0 / 7.0),
            epsilon = 1.0E-3
        );
    }

    #[test]
    fn from_grid() {
        let grid = synthetic_grid(3, 2, 2, 20);
        let dims = Dims::from_grid(&grid).unwrap();
        let destaggered = Destaggered::from_grid(&grid, &dims).unwrap();

        let fields = PressureFields::from_grid(&grid, &dims, &destaggered).unwrap();

        assert_eq!(fields.temperature.dim(), (2, 26, 2, 3));
        assert!(fields
            .relative_humidity
            .iter()
            .all(|rh| (0.0..=100.0).contains(rh)));

        let column = fields.height.slice(s![1, .., 1, 2]).to_vec();
        assert!(column.windows(2).all(|w| w[0] <= w[1]));
        // top model level sits near 197 hPa
        assert_eq!(fields.height[(0, 25, 0, 0)], destaggered.height[(0, 19, 0, 0)]);
        assert_eq!(fields.u[(0, 24, 1, 1)], destaggered.u[(0, 19, 1, 1)]);
        // U grows by one per west-east cell on every model level
        assert_abs_diff_eq!(
            fields.u[(1, 5, 0, 2)] - fields.u[(1, 5, 0, 0)],
            2.0,
            epsilon = 1.0E-4
        );
    }
}
