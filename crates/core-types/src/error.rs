use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid report year {0}: must be 1 or later and within the supported calendar range")]
    InvalidYear(i32),
}
