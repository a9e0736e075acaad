#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("a confirmation waiter must await at least one trigger")]
    ZeroConfirmations,
}

pub type Result<T> = std::result::Result<T, Error>;
