use std::fmt;

/// Which of the two input collections a fault was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Contours,
    Points,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Contours => f.write_str("contours"),
            CollectionKind::Points => f.write_str("points"),
        }
    }
}

/// Malformed input dataset. Correlation is impossible past any of these, so
/// they are fatal at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    Parse(String),
    NotAFeatureCollection,
    MissingName {
        collection: CollectionKind,
        index: usize,
    },
    PointWithoutLongitude {
        index: usize,
        name: String,
    },
    UnmatchedContour {
        index: usize,
        name: String,
    },
    /// Points are filtered on the hovered contour's index, so the point at
    /// each contour index must carry that contour's name.
    MisalignedPoint {
        index: usize,
        contour: String,
        point: String,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Parse(reason) => write!(f, "JSON parse error: {reason}"),
            DatasetError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            DatasetError::MissingName { collection, index } => {
                write!(f, "{collection} feature at index {index} has no string `name`")
            }
            DatasetError::PointWithoutLongitude { index, name } => {
                write!(
                    f,
                    "point {name:?} at index {index} is not a Point with a numeric longitude"
                )
            }
            DatasetError::UnmatchedContour { index, name } => {
                write!(
                    f,
                    "contour {name:?} at index {index} has no point with the same name"
                )
            }
            DatasetError::MisalignedPoint {
                index,
                contour,
                point,
            } => {
                write!(
                    f,
                    "point at index {index} is {point:?} but the contour there is {contour:?}"
                )
            }
        }
    }
}

impl std::error::Error for DatasetError {}
