use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid calibration distance: {0} (expected a finite positive number of meters)")]
    InvalidCalibration(f64),

    #[error("Calibration reference points coincide")]
    CoincidentReferencePoints,

    #[error("Unknown quantity: {0}")]
    UnknownQuantity(String),

    #[error("Unknown fit kind: {0}")]
    UnknownFitKind(String),

    #[error("Unknown point id: {0}")]
    UnknownPoint(u32),
}
