pub mod aliases;
pub mod loader;
pub mod types;

pub use aliases::{AliasEntry, AliasTable};
pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use types::{BatchSettings, MatcherProfile, MatcherSettings, ProfileName, RootConfig};
