//! Resource type discriminator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors from parsing a [`ResourceType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource type: {0:?}")]
pub struct ResourceTypeError(pub String);

/// Storage flavour of a dataset; selects the type-specific edit codenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSubtype {
    /// Feature data: style and data are both editable.
    #[default]
    Vector,
    /// Coverage data: only the style is editable.
    Raster,
    /// Served by a remote service: nothing local to edit or download.
    Remote,
}

/// The concrete type of a catalog resource.
///
/// Wire form: `dataset` (vector), `dataset:raster`, `dataset:remote`,
/// `document`, `map`, `geoapp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceType {
    /// A spatial dataset.
    Dataset(DatasetSubtype),
    /// An uploaded document.
    Document,
    /// A composed map.
    Map,
    /// A client application.
    GeoApp,
}

impl ResourceType {
    /// Vector dataset, the most common type.
    pub const VECTOR: Self = Self::Dataset(DatasetSubtype::Vector);

    /// The base type name without subtype.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dataset(_) => "dataset",
            Self::Document => "document",
            Self::Map => "map",
            Self::GeoApp => "geoapp",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dataset(DatasetSubtype::Vector) => f.write_str("dataset"),
            Self::Dataset(DatasetSubtype::Raster) => f.write_str("dataset:raster"),
            Self::Dataset(DatasetSubtype::Remote) => f.write_str("dataset:remote"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for ResourceType {
    type Err = ResourceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dataset" | "dataset:vector" => Ok(Self::Dataset(DatasetSubtype::Vector)),
            "dataset:raster" => Ok(Self::Dataset(DatasetSubtype::Raster)),
            "dataset:remote" => Ok(Self::Dataset(DatasetSubtype::Remote)),
            "document" => Ok(Self::Document),
            "map" => Ok(Self::Map),
            "geoapp" => Ok(Self::GeoApp),
            _ => Err(ResourceTypeError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for ResourceType {
    type Error = ResourceTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceType> for String {
    fn from(rt: ResourceType) -> Self {
        rt.to_string()
    }
}
