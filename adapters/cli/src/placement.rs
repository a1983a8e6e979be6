use std::str::FromStr;

use thiserror::Error;
use tower_defence_core::{TargetingStrategy, TileCoord, TowerKind, UnknownStrategy, UnknownTowerKind};

/// Tower requested on the command line as `KIND@X,Y[:STRATEGY]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerPlacement {
    pub(crate) kind: TowerKind,
    pub(crate) tile: TileCoord,
    pub(crate) strategy: Option<TargetingStrategy>,
}

/// Errors that can occur while parsing a tower placement argument.
#[derive(Debug, Error)]
pub(crate) enum PlacementParseError {
    #[error("expected KIND@X,Y[:STRATEGY], got `{0}`")]
    Malformed(String),
    #[error(transparent)]
    Kind(#[from] UnknownTowerKind),
    #[error(transparent)]
    Strategy(#[from] UnknownStrategy),
    #[error("invalid tile coordinate `{0}`")]
    Coordinate(String),
}

impl FromStr for TowerPlacement {
    type Err = PlacementParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || PlacementParseError::Malformed(value.to_owned());
        let (kind, rest) = value.trim().split_once('@').ok_or_else(malformed)?;
        let (coordinates, strategy) = match rest.split_once(':') {
            Some((coordinates, strategy)) => (coordinates, Some(strategy.parse()?)),
            None => (rest, None),
        };
        let (x, y) = coordinates.split_once(',').ok_or_else(malformed)?;

        Ok(Self {
            kind: kind.parse()?,
            tile: TileCoord::new(parse_axis(x)?, parse_axis(y)?),
            strategy,
        })
    }
}

fn parse_axis(value: &str) -> Result<u32, PlacementParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| PlacementParseError::Coordinate(value.to_owned()))
}
