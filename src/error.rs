use crate::timestamp::Timestamp;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid range: bounds resolve to the same instant ({lower} == {upper})")]
    InvalidRange { lower: Timestamp, upper: Timestamp },
    #[error("failed to spawn iterator thread: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
