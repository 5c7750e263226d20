use {
    super::*,
    crate::constants::{GRAVITY, SOIL_DEPTHS},
    ndarray::{Array, Array2, Array3, Array4, Dimension},
    std::collections::BTreeMap,
};

/// Grid held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryGrid {
    dimensions: BTreeMap<String, usize>,
    variables: BTreeMap<String, (Vec<String>, ArrayD<f32>)>,
    attributes: BTreeMap<String, AttributeValue>,
    text: BTreeMap<String, Vec<String>>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(mut self, name: &str, len: usize) -> Self {
        self.dimensions.insert(name.to_owned(), len);
        self
    }

    pub fn with_variable<D: Dimension>(
        mut self,
        name: &str,
        dimensions: &[&str],
        values: Array<f32, D>,
    ) -> Self {
        self.variables.insert(
            name.to_owned(),
            (
                dimensions.iter().map(|d| (*d).to_owned()).collect(),
                values.into_dyn(),
            ),
        );
        self
    }

    pub fn with_attribute(mut self, name: &str, value: AttributeValue) -> Self {
        self.attributes.insert(name.to_owned(), value);
        self
    }

    pub fn with_text(mut self, name: &str, values: Vec<String>) -> Self {
        self.text.insert(name.to_owned(), values);
        self
    }

    pub fn without_variable(mut self, name: &str) -> Self {
        self.variables.remove(name);
        self
    }
}

impl GridAccessor for MemoryGrid {
    fn values(&self, name: &str) -> Result<ArrayD<f32>> {
        self.variables
            .get(name)
            .map(|(_, values)| values.clone())
            .ok_or_else(|| Error::MissingVariable(name.to_owned()))
    }

    fn dimension(&self, name: &str) -> Result<usize> {
        self.dimensions
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingDimension(name.to_owned()))
    }

    fn attribute(&self, name: &str) -> Result<AttributeValue> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingAttribute(name.to_owned()))
    }

    fn dimensions(&self, name: &str) -> Result<Vec<String>> {
        self.variables
            .get(name)
            .map(|(dims, _)| dims.clone())
            .ok_or_else(|| Error::MissingVariable(name.to_owned()))
    }

    fn text(&self, name: &str) -> Result<Vec<String>> {
        self.text
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingVariable(name.to_owned()))
    }
}

/// Height (m) of staggered level `k` in [`synthetic_grid`]
#[doc(hidden)]
pub fn synthetic_height(k: usize) -> f32 {
    let k = k as f32;
    100.0 * k + 25.0 * k * k
}

/// A complete polar stereographic grid with every variable the converter
/// reads, horizontally uniform apart from the winds and soil types.
///
/// Heights follow [`synthetic_height`], pressure falls off with a 7 km scale
/// height from 1013 hPa at the ground, and the model atmosphere is
/// isentropic at 300 K.
///
/// Fixture for the unit tests and benches, not part of the converter.
#[doc(hidden)]
pub fn synthetic_grid(nx: usize, ny: usize, nt: usize, n_full: usize) -> MemoryGrid {
    let n_half = n_full + 1;

    let surface = |value: f32| Array3::from_elem((nt, ny, nx), value);

    let phb = Array4::from_shape_fn((nt, n_half, ny, nx), |(_, k, _, _)| {
        synthetic_height(k) * GRAVITY
    });
    let pb = Array4::from_shape_fn((nt, n_full, ny, nx), |(_, k, _, _)| {
        let z = 0.5 * (synthetic_height(k) + synthetic_height(k + 1));
        101_300.0 * (-z / 7000.0).exp()
    });
    let qvapor = Array4::from_shape_fn((nt, n_full, ny, nx), |(_, k, _, _)| {
        0.008 * (-(k as f32) / 3.0).exp()
    });
    let u = Array4::from_shape_fn((nt, n_full, ny, nx + 1), |(t, k, _, i)| {
        i as f32 + k as f32 + t as f32
    });
    let v = Array4::from_shape_fn((nt, n_full, ny + 1, nx), |(_, k, j, _)| {
        j as f32 - k as f32
    });
    let w = Array4::from_shape_fn((nt, n_half, ny, nx), |(_, k, _, _)| 0.1 * k as f32);
    let isltyp = Array2::from_shape_fn((ny, nx), |(j, i)| if i == 0 && j == 0 { 14.0 } else { 3.0 });
    let smois = Array4::from_shape_fn((nt, 4, ny, nx), |(_, l, _, _)| 0.1 * (l + 1) as f32);
    let tslb = Array4::from_shape_fn((nt, 4, ny, nx), |(_, l, _, _)| 280.0 + l as f32);
    let zs = Array2::from_shape_fn((nt, 4), |(_, l)| SOIL_DEPTHS[l]);
    let xlat = Array3::from_shape_fn((nt, ny, nx), |(_, j, _)| 50.0 + 0.03 * j as f32);
    let xlong = Array3::from_shape_fn((nt, ny, nx), |(_, _, i)| 10.0 + 0.04 * i as f32);

    let times = (0..nt)
        .map(|t| format!("2014-04-21_{:02}:00:00", t))
        .collect();

    let sfc = &[DIM_TIME, DIM_SOUTH_NORTH, DIM_WEST_EAST];
    let unstag = &[DIM_TIME, DIM_BOTTOM_TOP, DIM_SOUTH_NORTH, DIM_WEST_EAST];
    let bt_stag = &[DIM_TIME, DIM_BOTTOM_TOP_STAG, DIM_SOUTH_NORTH, DIM_WEST_EAST];
    let soil = &[DIM_TIME, DIM_SOIL_LAYERS, DIM_SOUTH_NORTH, DIM_WEST_EAST];

    MemoryGrid::new()
        .with_dimension(DIM_TIME, nt)
        .with_dimension(DIM_BOTTOM_TOP, n_full)
        .with_dimension(DIM_BOTTOM_TOP_STAG, n_half)
        .with_dimension(DIM_SOUTH_NORTH, ny)
        .with_dimension(DIM_SOUTH_NORTH_STAG, ny + 1)
        .with_dimension(DIM_WEST_EAST, nx)
        .with_dimension(DIM_WEST_EAST_STAG, nx + 1)
        .with_dimension(DIM_SOIL_LAYERS, 4)
        .with_attribute("MAP_PROJ", AttributeValue::Int(2))
        .with_attribute("DX", AttributeValue::Float(3000.0))
        .with_attribute("DY", AttributeValue::Float(3000.0))
        .with_attribute("STAND_LON", AttributeValue::Float(10.0))
        .with_attribute("TRUELAT1", AttributeValue::Float(60.0))
        .with_attribute("TRUELAT2", AttributeValue::Float(60.0))
        .with_text("Times", times)
        .with_variable("T2", sfc, surface(290.0))
        .with_variable("U10", sfc, surface(3.0))
        .with_variable("V10", sfc, surface(-1.5))
        .with_variable("PSFC", sfc, surface(101_300.0))
        .with_variable("Q2", sfc, surface(0.008))
        .with_variable("SEAICE", sfc, surface(0.0))
        .with_variable("TSK", sfc, surface(291.0))
        .with_variable("SST", sfc, surface(288.0))
        .with_variable("XLAT", sfc, xlat)
        .with_variable("XLONG", sfc, xlong)
        .with_variable("HGT", &[DIM_SOUTH_NORTH, DIM_WEST_EAST], Array2::zeros((ny, nx)))
        .with_variable("ISLTYP", &[DIM_SOUTH_NORTH, DIM_WEST_EAST], isltyp)
        .with_variable("PH", bt_stag, Array4::<f32>::zeros((nt, n_half, ny, nx)))
        .with_variable("PHB", bt_stag, phb)
        .with_variable("W", bt_stag, w)
        .with_variable("P", unstag, Array4::<f32>::zeros((nt, n_full, ny, nx)))
        .with_variable("PB", unstag, pb)
        .with_variable("T", unstag, Array4::<f32>::zeros((nt, n_full, ny, nx)))
        .with_variable("QVAPOR", unstag, qvapor)
        .with_variable(
            "U",
            &[DIM_TIME, DIM_BOTTOM_TOP, DIM_SOUTH_NORTH, DIM_WEST_EAST_STAG],
            u,
        )
        .with_variable(
            "V",
            &[DIM_TIME, DIM_BOTTOM_TOP, DIM_SOUTH_NORTH_STAG, DIM_WEST_EAST],
            v,
        )
        .with_variable("SMOIS", soil, smois)
        .with_variable("TSLB", soil, tslb)
        .with_variable("ZS", &[DIM_TIME, DIM_SOIL_LAYERS], zs)
}
