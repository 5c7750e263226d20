//! NetCDF backed grid, reading model output files directly.

use {
    super::{AttributeValue, GridAccessor},
    crate::error::{Error, Result},
    ndarray::{ArrayD, IxDyn},
    std::path::{Path, PathBuf},
};

pub struct NetcdfGrid {
    path: PathBuf,
    file: netcdf::File,
}

impl NetcdfGrid {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let file = netcdf::open(&path).map_err(|e| Error::Io {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;

        Ok(NetcdfGrid { path, file })
    }

    fn variable(&self, name: &str) -> Result<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| Error::MissingVariable(name.to_owned()))
    }

    fn read_error(&self, name: &str, e: netcdf::Error) -> Error {
        Error::Io {
            path: self.path.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("reading {}: {}", name, e),
            ),
        }
    }
}

impl GridAccessor for NetcdfGrid {
    fn values(&self, name: &str) -> Result<ArrayD<f32>> {
        let variable = self.variable(name)?;
        let shape = variable
            .dimensions()
            .iter()
            .map(|d| d.len())
            .collect::<Vec<_>>();

        let values = variable
            .get_values::<f32, _>(..)
            .map_err(|e| self.read_error(name, e))?;

        ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| Error::Shape {
            variable: name.to_owned(),
            expected: shape.clone(),
            found: vec![],
        })
    }

    fn dimension(&self, name: &str) -> Result<usize> {
        self.file
            .dimension(name)
            .map(|d| d.len())
            .ok_or_else(|| Error::MissingDimension(name.to_owned()))
    }

    fn attribute(&self, name: &str) -> Result<AttributeValue> {
        use netcdf::AttributeValue as Nc;

        let value = self
            .file
            .attribute(name)
            .ok_or_else(|| Error::MissingAttribute(name.to_owned()))?
            .value()
            .map_err(|e| self.read_error(name, e))?;

        Ok(match value {
            Nc::Short(v) => AttributeValue::Int(v.into()),
            Nc::Int(v) => AttributeValue::Int(v.into()),
            Nc::Longlong(v) => AttributeValue::Int(v),
            Nc::Float(v) => AttributeValue::Float(v.into()),
            Nc::Double(v) => AttributeValue::Float(v),
            Nc::Str(v) => AttributeValue::Text(v),
            _ => return Err(Error::MissingAttribute(name.to_owned())),
        })
    }

    fn dimensions(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .variable(name)?
            .dimensions()
            .iter()
            .map(|d| d.name())
            .collect())
    }

    fn text(&self, name: &str) -> Result<Vec<String>> {
        let variable = self.variable(name)?;
        let width = variable
            .dimensions()
            .last()
            .map(|d| d.len())
            .ok_or_else(|| Error::MissingVariable(name.to_owned()))?;

        let bytes = variable
            .get_raw_values(..)
            .map_err(|e| self.read_error(name, e))?;

        Ok(bytes
            .chunks(width.max(1))
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect())
    }
}
