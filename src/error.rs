use std::path::PathBuf;

use thiserror::Error;

use crate::Point;

/// Why a route query produced no route.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("floor `{0}` is not registered")]
    UnknownFloor(String),

    #[error("({}, {}) on floor `{floor_id}` cannot reach any waypoint", point.lat, point.lng)]
    UnreachableEndpoint { floor_id: String, point: Point },

    #[error("no route connects floor `{from_floor}` to floor `{to_floor}`")]
    NoPathFound { from_floor: String, to_floor: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
