//! Artifact persistence
//!
//! Fitted models and preprocessors are written with [`save_object`] and read
//! back with [`load_object`].

mod serializer;

pub use serializer::{
    load_object, load_object_with_metadata, read_metadata, save_object, ModelMetadata,
};
