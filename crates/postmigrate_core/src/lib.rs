pub mod config;
pub mod corpus;
pub mod crossref;
pub mod descriptions;
pub mod driver;
pub mod error;
pub mod frontmatter;
pub mod log;
pub mod metadata;
pub mod rewrite;
pub mod runtime;
