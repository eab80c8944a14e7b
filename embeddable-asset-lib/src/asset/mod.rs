pub mod classifier;
pub mod directory;
pub mod reference;
pub mod rewriter;

pub use directory::DirectoryAssetResolver;
