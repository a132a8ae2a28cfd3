pub mod tag_repository;

pub use tag_repository::{GitTagRepository, TagOperations, TagRepositoryError};

#[cfg(test)]
pub use tag_repository::MockTagOperations;
