//! # PMOMusic Settings Module
//!
//! This module provides the runtime settings of a PMOMusic server:
//! - Typed, defaulted settings persisted in `pmomusic.properties`
//! - Cached derived views (file type lists, per-user music folders)
//! - Public URL computation for remote access
//! - Periodic detection of the local IP address
//! - Pass-through to the host's DAOs (folders, radios, users, avatars)
//!
//! ## Usage
//!
//! ```no_run
//! # fn daos() -> pmosettings::Daos { unimplemented!() }
//! use pmosettings::SettingsService;
//!
//! # #[tokio::main]
//! # async fn main() -> pmosettings::Result<()> {
//! let service = SettingsService::open(None, daos())?;
//! let _probe = service.init();
//!
//! let port = service.port();
//! let music = service.music_file_types_as_array();
//! println!("port {} serving {:?}", port, music);
//!
//! service.set_url_redirection_enabled(true);
//! service.save(true)?;
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod cell;
pub mod derived;
pub mod error;
pub mod folders;
pub mod home;
pub mod probe;
pub mod pruner;
pub mod radio;
pub mod redirect;
pub mod resources;
pub mod schema;
pub mod secret;
pub mod service;
pub mod stats;
pub mod store;
pub mod users;

pub use accessor::TypedSettings;
pub use derived::FileTypeList;
pub use error::{Result, SettingsError};
pub use folders::{MusicFolder, MusicFolderDao};
pub use home::{pmomusic_home, ENV_HOME, PROPERTY_FILE_NAME};
pub use probe::{AddressLookup, LocalAddress, LOCAL_IP_LOOKUP_PERIOD};
pub use radio::{InternetRadio, InternetRadioDao};
pub use redirect::{RedirectionConfig, UrlRedirectType};
pub use resources::{Locale, Theme};
pub use service::{Daos, SettingsService, BRAND};
pub use stats::MediaLibraryStatistics;
pub use store::{MemoryStore, PropertiesFile, PropertyStore};
pub use users::{AlbumListType, Avatar, AvatarDao, UserDao, UserSettings, Visibility};
