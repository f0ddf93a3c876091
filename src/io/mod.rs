pub mod paths;

pub use paths::MatcherPaths;
