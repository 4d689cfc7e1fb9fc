pub mod object_store;

pub use object_store::{S3Config, S3Presigner};
