pub mod category;
pub mod metadata;
pub mod property;

pub use category::{Category, Chain};
pub use metadata::{HasMetadata, Metadata, MetadataContainer, MetadataFactory, Validator};
pub use property::Property;
