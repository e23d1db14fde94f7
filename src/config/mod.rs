pub mod manager;
pub mod profiles;
pub mod store;

pub use manager::{AppSettings, SettingsManager};
pub use profiles::{IgnoreList, LoginRecord, SftpProfile, profile_kinds, resolve_user};
pub use store::{Profile, ProfileKind, ProfileStore};
