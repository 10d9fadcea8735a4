mod metadata;

pub use metadata::{MetadataQuery, MetadataResult};
