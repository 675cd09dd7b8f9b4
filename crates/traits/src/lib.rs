pub mod source;

pub use source::{
    FilesystemSourceProvider, InMemorySourceProvider, SharedSource, SourceError, SourceProvider,
};
