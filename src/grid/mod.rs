//! Read side of the model output container.
//!
//! Every field leaves this module as an owned array whose axes are
//! `(time, level, south_north, west_east)` (or the leading subset of them),
//! with its dimension names and shape already checked against the grid's
//! declared dimensions. Code downstream indexes by axis and never
//! re-validates layout.

mod memory;
#[cfg(feature = "netcdf")]
pub mod ncfile;

pub use memory::MemoryGrid;
#[doc(hidden)]
pub use memory::{synthetic_grid, synthetic_height};

use {
    crate::{
        constants::TIMESTAMP_LEN,
        error::{Error, Result},
    },
    ndarray::{Array2, Array3, Array4, ArrayD, Axis, Ix1, Ix2, Ix3, Ix4},
};

pub const TIME: Axis = Axis(0);
pub const LEVEL: Axis = Axis(1);
pub const SOUTH_NORTH: Axis = Axis(2);
pub const WEST_EAST: Axis = Axis(3);

pub const DIM_TIME: &str = "Time";
pub const DIM_BOTTOM_TOP: &str = "bottom_top";
pub const DIM_BOTTOM_TOP_STAG: &str = "bottom_top_stag";
pub const DIM_SOUTH_NORTH: &str = "south_north";
pub const DIM_SOUTH_NORTH_STAG: &str = "south_north_stag";
pub const DIM_WEST_EAST: &str = "west_east";
pub const DIM_WEST_EAST_STAG: &str = "west_east_stag";
pub const DIM_SOIL_LAYERS: &str = "soil_layers_stag";

/// Global attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            AttributeValue::Int(i) => Some(*i as f32),
            AttributeValue::Float(f) => Some(*f as f32),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            AttributeValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }
}

/// By-name access to the variables, dimensions and attributes of a model
/// output container.
pub trait GridAccessor {
    /// Raw values of a variable, shaped by its declared dimensions.
    fn values(&self, name: &str) -> Result<ArrayD<f32>>;

    /// Length of a dimension.
    fn dimension(&self, name: &str) -> Result<usize>;

    /// Value of a global attribute.
    fn attribute(&self, name: &str) -> Result<AttributeValue>;

    /// Declared dimension names of a variable, outermost first.
    fn dimensions(&self, name: &str) -> Result<Vec<String>>;

    /// Character variable split into one string per outermost index.
    fn text(&self, name: &str) -> Result<Vec<String>>;
}

/// Expected axis order of a source variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOrder {
    /// Time dependent surface field
    Surface,
    /// Time invariant surface field
    Static,
    Unstaggered,
    BottomTopStaggered,
    SouthNorthStaggered,
    WestEastStaggered,
    /// Field on soil layers
    Soil,
    /// Time dependent soil layer depths
    SoilDepths,
    /// Time invariant soil layer depths
    StaticSoilDepths,
}

impl MemoryOrder {
    pub fn dimensions(self) -> &'static [&'static str] {
        match self {
            MemoryOrder::Surface => &[DIM_TIME, DIM_SOUTH_NORTH, DIM_WEST_EAST],
            MemoryOrder::Static => &[DIM_SOUTH_NORTH, DIM_WEST_EAST],
            MemoryOrder::Unstaggered => &[DIM_TIME, DIM_BOTTOM_TOP, DIM_SOUTH_NORTH, DIM_WEST_EAST],
            MemoryOrder::BottomTopStaggered => &[
                DIM_TIME,
                DIM_BOTTOM_TOP_STAG,
                DIM_SOUTH_NORTH,
                DIM_WEST_EAST,
            ],
            MemoryOrder::SouthNorthStaggered => &[
                DIM_TIME,
                DIM_BOTTOM_TOP,
                DIM_SOUTH_NORTH_STAG,
                DIM_WEST_EAST,
            ],
            MemoryOrder::WestEastStaggered => &[
                DIM_TIME,
                DIM_BOTTOM_TOP,
                DIM_SOUTH_NORTH,
                DIM_WEST_EAST_STAG,
            ],
            MemoryOrder::Soil => &[DIM_TIME, DIM_SOIL_LAYERS, DIM_SOUTH_NORTH, DIM_WEST_EAST],
            MemoryOrder::SoilDepths => &[DIM_TIME, DIM_SOIL_LAYERS],
            MemoryOrder::StaticSoilDepths => &[DIM_SOIL_LAYERS],
        }
    }

    /// Array shape a variable with this order must have
    pub fn shape(self, dims: &Dims) -> Vec<usize> {
        let Dims {
            nt,
            nx,
            ny,
            n_full,
            n_half,
            n_soil,
        } = *dims;

        match self {
            MemoryOrder::Surface => vec![nt, ny, nx],
            MemoryOrder::Static => vec![ny, nx],
            MemoryOrder::Unstaggered => vec![nt, n_full, ny, nx],
            MemoryOrder::BottomTopStaggered => vec![nt, n_half, ny, nx],
            MemoryOrder::SouthNorthStaggered => vec![nt, n_full, ny + 1, nx],
            MemoryOrder::WestEastStaggered => vec![nt, n_full, ny, nx + 1],
            MemoryOrder::Soil => vec![nt, n_soil, ny, nx],
            MemoryOrder::SoilDepths => vec![nt, n_soil],
            MemoryOrder::StaticSoilDepths => vec![n_soil],
        }
    }
}

/// Checks that the declared dimensions of `variable` match `order` exactly.
pub fn check_memory_order<G: GridAccessor>(
    grid: &G,
    variable: &str,
    order: MemoryOrder,
) -> Result<()> {
    let found = grid.dimensions(variable)?;
    let expected = order.dimensions();

    if found.len() != expected.len() || found.iter().zip(expected).any(|(f, e)| f != e) {
        return Err(Error::MemoryOrder {
            variable: variable.to_owned(),
            expected: expected.iter().map(|s| (*s).to_owned()).collect(),
            found,
        });
    }

    Ok(())
}

/// Picks between the time dependent and time invariant order of a variable
/// that model versions store either way.
pub fn static_or<G: GridAccessor>(
    grid: &G,
    variable: &str,
    order: MemoryOrder,
) -> Result<MemoryOrder> {
    let ndims = grid.dimensions(variable)?.len();

    Ok(match order {
        MemoryOrder::Surface | MemoryOrder::Static if ndims == 2 => MemoryOrder::Static,
        MemoryOrder::Surface | MemoryOrder::Static => MemoryOrder::Surface,
        MemoryOrder::SoilDepths | MemoryOrder::StaticSoilDepths if ndims == 1 => {
            MemoryOrder::StaticSoilDepths
        }
        MemoryOrder::SoilDepths | MemoryOrder::StaticSoilDepths => MemoryOrder::SoilDepths,
        other => other,
    })
}

/// Grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub nt: usize,
    pub nx: usize,
    pub ny: usize,
    /// Unstaggered vertical levels
    pub n_full: usize,
    /// Staggered vertical levels, always `n_full + 1`
    pub n_half: usize,
    pub n_soil: usize,
}

impl Dims {
    pub fn from_grid<G: GridAccessor>(grid: &G) -> Result<Self> {
        let n_full = grid.dimension(DIM_BOTTOM_TOP)?;
        let n_half = grid.dimension(DIM_BOTTOM_TOP_STAG)?;

        if n_half != n_full + 1 {
            return Err(Error::Shape {
                variable: DIM_BOTTOM_TOP_STAG.to_owned(),
                expected: vec![n_full + 1],
                found: vec![n_half],
            });
        }

        let nx = grid.dimension(DIM_WEST_EAST)?;
        let ny = grid.dimension(DIM_SOUTH_NORTH)?;

        // a time axis of length zero is a run with nothing to write
        for &(name, len) in &[
            (DIM_BOTTOM_TOP, n_full),
            (DIM_WEST_EAST, nx),
            (DIM_SOUTH_NORTH, ny),
        ] {
            if len == 0 {
                return Err(Error::EmptyDimension(name.to_owned()));
            }
        }

        Ok(Dims {
            nt: grid.dimension(DIM_TIME)?,
            nx,
            ny,
            n_full,
            n_half,
            n_soil: grid.dimension(DIM_SOIL_LAYERS)?,
        })
    }
}

fn checked<G: GridAccessor>(
    grid: &G,
    variable: &str,
    order: MemoryOrder,
    dims: &Dims,
) -> Result<ArrayD<f32>> {
    check_memory_order(grid, variable, order)?;

    let values = grid.values(variable)?;
    let expected = order.shape(dims);
    if values.shape() != expected.as_slice() {
        return Err(Error::Shape {
            variable: variable.to_owned(),
            expected,
            found: values.shape().to_vec(),
        });
    }

    Ok(values)
}

fn shape_error(variable: &str, values: &ArrayD<f32>) -> Error {
    Error::Shape {
        variable: variable.to_owned(),
        expected: vec![],
        found: values.shape().to_vec(),
    }
}

/// Reads a four dimensional field (unstaggered, staggered or soil).
pub fn field4<G: GridAccessor>(
    grid: &G,
    variable: &str,
    order: MemoryOrder,
    dims: &Dims,
) -> Result<Array4<f32>> {
    let values = checked(grid, variable, order, dims)?;
    let err = shape_error(variable, &values);
    values.into_dimensionality::<Ix4>().map_err(|_| err)
}

/// Reads a time dependent surface field.
pub fn surface<G: GridAccessor>(grid: &G, variable: &str, dims: &Dims) -> Result<Array3<f32>> {
    let values = checked(grid, variable, MemoryOrder::Surface, dims)?;
    let err = shape_error(variable, &values);
    values.into_dimensionality::<Ix3>().map_err(|_| err)
}

/// Reads a surface field that does not change with time, taking the first
/// time step if the variable is stored per time step.
pub fn static_surface<G: GridAccessor>(grid: &G, variable: &str, dims: &Dims) -> Result<Array2<f32>> {
    let order = static_or(grid, variable, MemoryOrder::Static)?;
    let values = checked(grid, variable, order, dims)?;
    let err = shape_error(variable, &values);

    match order {
        MemoryOrder::Static => values.into_dimensionality::<Ix2>().map_err(|_| err),
        _ => Ok(values
            .into_dimensionality::<Ix3>()
            .map_err(|_| err)?
            .index_axis(TIME, 0)
            .to_owned()),
    }
}

/// Reads the soil layer depths of the first time step.
pub fn soil_depths<G: GridAccessor>(grid: &G, variable: &str, dims: &Dims) -> Result<Vec<f32>> {
    let order = static_or(grid, variable, MemoryOrder::StaticSoilDepths)?;
    let values = checked(grid, variable, order, dims)?;
    let err = shape_error(variable, &values);

    match order {
        MemoryOrder::StaticSoilDepths => Ok(values
            .into_dimensionality::<Ix1>()
            .map_err(|_| err)?
            .to_vec()),
        _ => Ok(values
            .into_dimensionality::<Ix2>()
            .map_err(|_| err)?
            .index_axis(TIME, 0)
            .to_vec()),
    }
}

/// Reads one time stamp per time step.
pub fn timestamps<G: GridAccessor>(grid: &G, variable: &str, dims: &Dims) -> Result<Vec<String>> {
    let times = grid.text(variable)?;

    (0..dims.nt)
        .map(|index| match times.get(index) {
            Some(time) if time.trim_end_matches('\0').len() == TIMESTAMP_LEN => {
                Ok(time.trim_end_matches('\0').to_owned())
            }
            _ => Err(Error::Timestamp { index }),
        })
        .collect()
}

/// Numeric global attribute as `f32`
pub fn attribute_f32<G: GridAccessor>(grid: &G, name: &str) -> Result<f32> {
    grid.attribute(name)?
        .as_f32()
        .ok_or_else(|| Error::MissingAttribute(name.to_owned()))
}

/// Integer global attribute
pub fn attribute_i64<G: GridAccessor>(grid: &G, name: &str) -> Result<i64> {
    grid.attribute(name)?
        .as_i64()
        .ok_or_else(|| Error::MissingAttribute(name.to_owned()))
}

#[cfg(test)]
mod test {
    use {
        super::*,
        ndarray::{Array1, Array3},
    };

    fn grid() -> MemoryGrid {
        synthetic_grid(3, 2, 2, 4)
    }

    #[test]
    fn dims() {
        let dims = Dims::from_grid(&grid()).unwrap();

        assert_eq!(
            dims,
            Dims {
                nt: 2,
                nx: 3,
                ny: 2,
                n_full: 4,
                n_half: 5,
                n_soil: 4,
            }
        );
    }

    #[test]
    fn half_levels_must_follow_full_levels() {
        let grid = grid().with_dimension(DIM_BOTTOM_TOP_STAG, 7);

        match Dims::from_grid(&grid) {
            Err(Error::Shape { variable, .. }) => assert_eq!(variable, DIM_BOTTOM_TOP_STAG),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_dimensions_are_rejected() {
        let cases = [
            (synthetic_grid(3, 2, 1, 0), DIM_BOTTOM_TOP),
            (synthetic_grid(0, 2, 1, 4), DIM_WEST_EAST),
            (synthetic_grid(3, 0, 1, 4), DIM_SOUTH_NORTH),
        ];

        for (grid, dimension) in cases.iter() {
            match Dims::from_grid(grid) {
                Err(Error::EmptyDimension(name)) => assert_eq!(name, *dimension),
                other => panic!("unexpected {:?}", other),
            }
        }

        assert_eq!(Dims::from_grid(&synthetic_grid(3, 2, 0, 4)).unwrap().nt, 0);
    }

    #[test]
    fn memory_order_accepts_declared_order() {
        let grid = grid();

        check_memory_order(&grid, "T2", MemoryOrder::Surface).unwrap();
        check_memory_order(&grid, "PH", MemoryOrder::BottomTopStaggered).unwrap();
        check_memory_order(&grid, "U", MemoryOrder::WestEastStaggered).unwrap();
        check_memory_order(&grid, "V", MemoryOrder::SouthNorthStaggered).unwrap();
        check_memory_order(&grid, "SMOIS", MemoryOrder::Soil).unwrap();
    }

    #[test]
    fn memory_order_rejects_transposed_variable() {
        let grid = grid().with_variable(
            "T2",
            &[DIM_TIME, DIM_WEST_EAST, DIM_SOUTH_NORTH],
            Array3::<f32>::zeros((2, 3, 2)),
        );

        match check_memory_order(&grid, "T2", MemoryOrder::Surface) {
            Err(Error::MemoryOrder { variable, found, .. }) => {
                assert_eq!(variable, "T2");
                assert_eq!(found, vec!["Time", "west_east", "south_north"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let grid = grid().with_variable(
            "T2",
            &[DIM_TIME, DIM_SOUTH_NORTH, DIM_WEST_EAST],
            Array3::<f32>::zeros((2, 2, 4)),
        );
        let dims = Dims::from_grid(&grid).unwrap();

        match surface(&grid, "T2", &dims) {
            Err(Error::Shape {
                expected, found, ..
            }) => {
                assert_eq!(expected, vec![2, 2, 3]);
                assert_eq!(found, vec![2, 2, 4]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn static_surface_from_either_layout() {
        let grid = grid();
        let dims = Dims::from_grid(&grid).unwrap();

        // HGT is stored without a time axis, XLAT with one
        assert_eq!(static_surface(&grid, "HGT", &dims).unwrap().dim(), (2, 3));
        assert_eq!(static_surface(&grid, "XLAT", &dims).unwrap().dim(), (2, 3));
    }

    #[test]
    fn soil_depths_from_either_layout() {
        let grid = grid();
        let dims = Dims::from_grid(&grid).unwrap();
        assert_eq!(soil_depths(&grid, "ZS", &dims).unwrap(), vec![0.05, 0.25, 0.7, 1.5]);

        let grid = grid.with_variable(
            "ZS",
            &[DIM_SOIL_LAYERS],
            Array1::from(vec![0.05f32, 0.25, 0.7, 1.5]),
        );
        assert_eq!(soil_depths(&grid, "ZS", &dims).unwrap(), vec![0.05, 0.25, 0.7, 1.5]);
    }

    #[test]
    fn missing_timestamp() {
        let grid = grid().with_text("Times", vec!["2014-04-21_00:00:00".to_owned()]);
        let dims = Dims::from_grid(&grid).unwrap();

        match timestamps(&grid, "Times", &dims) {
            Err(Error::Timestamp { index }) => assert_eq!(index, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn attributes() {
        let grid = grid();

        assert_eq!(attribute_i64(&grid, "MAP_PROJ").unwrap(), 2);
        assert_eq!(attribute_f32(&grid, "DX").unwrap(), 3000.0);
        assert!(matches!(
            attribute_f32(&grid, "NOPE"),
            Err(Error::MissingAttribute(_))
        ));
    }
}
