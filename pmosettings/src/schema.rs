//! Schéma déclaratif des paramètres
//!
//! Chaque paramètre est décrit une seule fois par un [`SettingDef`] : sa clé
//! dans le fichier de propriétés, sa valeur par défaut (qui porte aussi son
//! type) et son codec de stockage. [`SCHEMA`] les liste tous ; il est vérifié
//! au démarrage par [`validate`].
//!
//! Les clés sont sensibles à la casse et stables d'une version à l'autre :
//! quand le format d'une valeur change, on introduit une nouvelle clé
//! (`CoverArtFileTypes2`, `DownsamplingCommand4`…) et l'ancienne rejoint
//! [`crate::pruner::OBSOLETE_KEYS`].

use crate::error::{Result, SettingsError};
use crate::pruner::OBSOLETE_KEYS;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::env;

/// Variable d'environnement donnant le chemin de contexte web du serveur
pub const ENV_CONTEXT_PATH: &str = "PMOMUSIC_CONTEXT_PATH";

/// Type d'une valeur de paramètre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    Int,
    Long,
    Bool,
    Str,
}

/// Valeur par défaut d'un paramètre
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Int(i32),
    Long(i64),
    /// Entier long sans valeur par défaut (ex: date du dernier scan)
    OptionalLong,
    Bool(bool),
    /// Chaîne, `None` pour un paramètre optionnel
    Str(Option<&'static str>),
    /// Chaîne calculée à l'exécution (dépend de l'OS ou de l'environnement)
    Computed(fn() -> String),
}

/// Encodage de la valeur dans le stockage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Plain,
    /// Hexadécimal de l'UTF-8, voir [`crate::secret`]
    Hex,
}

/// Définition d'un paramètre
#[derive(Debug, Clone, Copy)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: DefaultValue,
    pub codec: Codec,
}

impl SettingDef {
    pub const fn int(key: &'static str, default: i32) -> Self {
        Self::plain(key, DefaultValue::Int(default))
    }

    pub const fn long(key: &'static str, default: i64) -> Self {
        Self::plain(key, DefaultValue::Long(default))
    }

    pub const fn optional_long(key: &'static str) -> Self {
        Self::plain(key, DefaultValue::OptionalLong)
    }

    pub const fn boolean(key: &'static str, default: bool) -> Self {
        Self::plain(key, DefaultValue::Bool(default))
    }

    pub const fn string(key: &'static str, default: &'static str) -> Self {
        Self::plain(key, DefaultValue::Str(Some(default)))
    }

    pub const fn optional_string(key: &'static str) -> Self {
        Self::plain(key, DefaultValue::Str(None))
    }

    pub const fn computed(key: &'static str, default: fn() -> String) -> Self {
        Self::plain(key, DefaultValue::Computed(default))
    }

    /// Chaîne secrète stockée en hexadécimal, sans valeur par défaut
    pub const fn secret(key: &'static str) -> Self {
        Self {
            key,
            default: DefaultValue::Str(None),
            codec: Codec::Hex,
        }
    }

    const fn plain(key: &'static str, default: DefaultValue) -> Self {
        Self {
            key,
            default,
            codec: Codec::Plain,
        }
    }

    pub fn setting_type(&self) -> SettingType {
        match self.default {
            DefaultValue::Int(_) => SettingType::Int,
            DefaultValue::Long(_) | DefaultValue::OptionalLong => SettingType::Long,
            DefaultValue::Bool(_) => SettingType::Bool,
            DefaultValue::Str(_) | DefaultValue::Computed(_) => SettingType::Str,
        }
    }

    /// Valeur par défaut sous sa forme texte, telle qu'elle serait stockée
    pub fn default_text(&self) -> Option<String> {
        match self.default {
            DefaultValue::Int(v) => Some(v.to_string()),
            DefaultValue::Long(v) => Some(v.to_string()),
            DefaultValue::OptionalLong => None,
            DefaultValue::Bool(v) => Some(v.to_string()),
            DefaultValue::Str(v) => v.map(str::to_string),
            DefaultValue::Computed(f) => Some(f()),
        }
    }
}

fn default_playlist_folder() -> String {
    if cfg!(windows) {
        "c:\\playlists".to_string()
    } else {
        "/var/playlists".to_string()
    }
}

fn default_podcast_folder() -> String {
    if cfg!(windows) {
        "c:\\Music\\Podcast".to_string()
    } else {
        "/var/music/Podcast".to_string()
    }
}

fn default_context_path() -> String {
    env::var(ENV_CONTEXT_PATH)
        .unwrap_or_default()
        .replace('/', "")
}

// Index et navigation
pub const INDEX_STRING: SettingDef = SettingDef::string(
    "IndexString",
    "A B C D E F G H I J K L M N O P Q R S T U V W X-Z(XYZ)",
);
pub const IGNORED_ARTICLES: SettingDef =
    SettingDef::string("IgnoredArticles", "The El La Los Las Le Les");
pub const SHORTCUTS: SettingDef = SettingDef::string("Shortcuts", "New Incoming Podcast");
pub const PLAYLIST_FOLDER: SettingDef =
    SettingDef::computed("PlaylistFolder", default_playlist_folder);

// Types de fichiers
pub const MUSIC_FILE_TYPES: SettingDef = SettingDef::string(
    "MusicFileTypes",
    "mp3 ogg oga aac m4a flac wav wma aif aiff ape mpc shn",
);
pub const VIDEO_FILE_TYPES: SettingDef = SettingDef::string(
    "VideoFileTypes",
    "flv avi mpg mpeg mp4 m4v mkv mov wmv ogv divx m2ts",
);
pub const COVER_ART_FILE_TYPES: SettingDef = SettingDef::string(
    "CoverArtFileTypes2",
    "cover.jpg cover.png cover.gif folder.jpg jpg jpeg gif png",
);
pub const COVER_ART_CONCURRENCY: SettingDef = SettingDef::int("CoverArtConcurrency", 4);

// Messages d'accueil
pub const WELCOME_TITLE: SettingDef = SettingDef::string("WelcomeTitle", "Welcome to PMOMusic!");
pub const WELCOME_SUBTITLE: SettingDef = SettingDef::optional_string("WelcomeSubtitle");
pub const WELCOME_MESSAGE: SettingDef = SettingDef::string(
    "WelcomeMessage2",
    "__Welcome to PMOMusic!__\n\
     \\\\ \\\\\n\
     PMOMusic is a media server, providing ubiquitous access to your music. \n\
     \\\\ \\\\\n\
     Use it to share your music with friends, or to listen to your own music while at work. \
     You can stream to multiple players simultaneously, for instance to one player in your \
     kitchen and another in your living room.\n\
     \\\\ \\\\\n\
     To change or remove this message, log in with administrator rights and go to \
     {link:Settings > General|generalSettings.view}.",
);
pub const LOGIN_MESSAGE: SettingDef = SettingDef::optional_string("LoginMessage");

// Locale et thème
pub const LOCALE_LANGUAGE: SettingDef = SettingDef::string("LocaleLanguage", "en");
pub const LOCALE_COUNTRY: SettingDef = SettingDef::string("LocaleCountry", "");
pub const LOCALE_VARIANT: SettingDef = SettingDef::string("LocaleVariant", "");
pub const THEME_ID: SettingDef = SettingDef::string("Theme", "default");

// Indexation et podcasts
pub const INDEX_CREATION_INTERVAL: SettingDef = SettingDef::int("IndexCreationInterval", 1);
pub const INDEX_CREATION_HOUR: SettingDef = SettingDef::int("IndexCreationHour", 3);
pub const FAST_CACHE_ENABLED: SettingDef = SettingDef::boolean("FastCacheEnabled", false);
pub const PODCAST_UPDATE_INTERVAL: SettingDef = SettingDef::int("PodcastUpdateInterval", 24);
pub const PODCAST_FOLDER: SettingDef =
    SettingDef::computed("PodcastFolder", default_podcast_folder);
pub const PODCAST_EPISODE_RETENTION_COUNT: SettingDef =
    SettingDef::int("PodcastEpisodeRetentionCount", 10);
pub const PODCAST_EPISODE_DOWNLOAD_COUNT: SettingDef =
    SettingDef::int("PodcastEpisodeDownloadCount", 1);

// Débits et commandes externes
pub const DOWNLOAD_BITRATE_LIMIT: SettingDef = SettingDef::long("DownloadBitrateLimit", 0);
pub const UPLOAD_BITRATE_LIMIT: SettingDef = SettingDef::long("UploadBitrateLimit", 0);
pub const DOWNSAMPLING_COMMAND: SettingDef = SettingDef::string(
    "DownsamplingCommand4",
    "ffmpeg -i %s -map 0:0 -b:a %bk -v 0 -f mp3 -",
);
pub const HLS_COMMAND: SettingDef = SettingDef::string(
    "HlsCommand3",
    "ffmpeg -ss %o -t %d -i %s -async 1 -b:v %bk -s %wx%h -ar 44100 -ac 2 -v 0 -f mpegts \
     -c:v libx264 -preset superfast -c:a libmp3lame -threads 0 -",
);
pub const JUKEBOX_COMMAND: SettingDef = SettingDef::string(
    "JukeboxCommand2",
    "ffmpeg -ss %o -i %s -map 0:0 -v 0 -ar 44100 -ac 2 -f s16be -",
);
pub const VIDEO_IMAGE_COMMAND: SettingDef = SettingDef::string(
    "VideoImageCommand",
    "ffmpeg -r 1 -ss %o -t 1 -i %s -s %wx%h -v 0 -f mjpeg -",
);
pub const REWRITE_URL: SettingDef = SettingDef::boolean("RewriteUrl", true);

// LDAP
pub const LDAP_ENABLED: SettingDef = SettingDef::boolean("LdapEnabled", false);
pub const LDAP_URL: SettingDef =
    SettingDef::string("LdapUrl", "ldap://host.domain.com:389/cn=Users,dc=domain,dc=com");
pub const LDAP_MANAGER_DN: SettingDef = SettingDef::optional_string("LdapManagerDn");
pub const LDAP_MANAGER_PASSWORD: SettingDef = SettingDef::secret("LdapManagerPassword");
pub const LDAP_SEARCH_FILTER: SettingDef =
    SettingDef::string("LdapSearchFilter", "(sAMAccountName={0})");
pub const LDAP_AUTO_SHADOWING: SettingDef = SettingDef::boolean("LdapAutoShadowing", false);

// Réseau et redirection d'URL
pub const GETTING_STARTED_ENABLED: SettingDef =
    SettingDef::boolean("GettingStartedEnabled", true);
pub const PORT_FORWARDING_ENABLED: SettingDef =
    SettingDef::boolean("PortForwardingEnabled", false);
pub const PORT: SettingDef = SettingDef::int("Port", 80);
pub const HTTPS_PORT: SettingDef = SettingDef::int("HttpsPort", 0);
pub const URL_REDIRECTION_ENABLED: SettingDef =
    SettingDef::boolean("UrlRedirectionEnabled", false);
pub const URL_REDIRECT_TYPE: SettingDef = SettingDef::string("UrlRedirectType", "NORMAL");
pub const URL_REDIRECT_FROM: SettingDef = SettingDef::string("UrlRedirectFrom", "yourname");
pub const URL_REDIRECT_CONTEXT_PATH: SettingDef =
    SettingDef::computed("UrlRedirectContextPath", default_context_path);
pub const URL_REDIRECT_CUSTOM_URL: SettingDef =
    SettingDef::string("UrlRedirectCustomUrl", "http://");

// État du serveur
pub const SERVER_ID: SettingDef = SettingDef::optional_string("ServerId");
pub const SETTINGS_CHANGED: SettingDef = SettingDef::long("SettingsChanged", 0);
pub const LAST_SCANNED: SettingDef = SettingDef::optional_long("LastScanned");
pub const ORGANIZE_BY_FOLDER_STRUCTURE: SettingDef =
    SettingDef::boolean("OrganizeByFolderStructure", true);
pub const SORT_ALBUMS_BY_YEAR: SettingDef = SettingDef::boolean("SortAlbumsByYear", true);
pub const MEDIA_LIBRARY_STATISTICS: SettingDef =
    SettingDef::string("MediaLibraryStatistics", "0 0 0 0 0");

// DLNA / Sonos
pub const DLNA_ENABLED: SettingDef = SettingDef::boolean("DlnaEnabled", false);
pub const DLNA_SERVER_NAME: SettingDef = SettingDef::string("DlnaServerName", "PMOMusic");
pub const SONOS_ENABLED: SettingDef = SettingDef::boolean("SonosEnabled", false);
pub const SONOS_SERVICE_NAME: SettingDef = SettingDef::string("SonosServiceName", "PMOMusic");
pub const SONOS_SERVICE_ID: SettingDef = SettingDef::int("SonosServiceId", 242);

// SMTP
pub const SMTP_SERVER: SettingDef = SettingDef::optional_string("SmtpServer");
pub const SMTP_ENCRYPTION: SettingDef = SettingDef::string("SmtpEncryption", "None");
pub const SMTP_PORT: SettingDef = SettingDef::string("SmtpPort", "25");
pub const SMTP_USER: SettingDef = SettingDef::optional_string("SmtpUser");
pub const SMTP_PASSWORD: SettingDef = SettingDef::secret("SmtpPassword");
pub const SMTP_FROM: SettingDef = SettingDef::string("SmtpFrom", "pmomusic@pmomusic.org");

/// Tous les paramètres connus
pub static SCHEMA: &[SettingDef] = &[
    INDEX_STRING,
    IGNORED_ARTICLES,
    SHORTCUTS,
    PLAYLIST_FOLDER,
    MUSIC_FILE_TYPES,
    VIDEO_FILE_TYPES,
    COVER_ART_FILE_TYPES,
    COVER_ART_CONCURRENCY,
    WELCOME_TITLE,
    WELCOME_SUBTITLE,
    WELCOME_MESSAGE,
    LOGIN_MESSAGE,
    LOCALE_LANGUAGE,
    LOCALE_COUNTRY,
    LOCALE_VARIANT,
    THEME_ID,
    INDEX_CREATION_INTERVAL,
    INDEX_CREATION_HOUR,
    FAST_CACHE_ENABLED,
    PODCAST_UPDATE_INTERVAL,
    PODCAST_FOLDER,
    PODCAST_EPISODE_RETENTION_COUNT,
    PODCAST_EPISODE_DOWNLOAD_COUNT,
    DOWNLOAD_BITRATE_LIMIT,
    UPLOAD_BITRATE_LIMIT,
    DOWNSAMPLING_COMMAND,
    HLS_COMMAND,
    JUKEBOX_COMMAND,
    VIDEO_IMAGE_COMMAND,
    REWRITE_URL,
    LDAP_ENABLED,
    LDAP_URL,
    LDAP_MANAGER_DN,
    LDAP_MANAGER_PASSWORD,
    LDAP_SEARCH_FILTER,
    LDAP_AUTO_SHADOWING,
    GETTING_STARTED_ENABLED,
    PORT_FORWARDING_ENABLED,
    PORT,
    HTTPS_PORT,
    URL_REDIRECTION_ENABLED,
    URL_REDIRECT_TYPE,
    URL_REDIRECT_FROM,
    URL_REDIRECT_CONTEXT_PATH,
    URL_REDIRECT_CUSTOM_URL,
    SERVER_ID,
    SETTINGS_CHANGED,
    LAST_SCANNED,
    ORGANIZE_BY_FOLDER_STRUCTURE,
    SORT_ALBUMS_BY_YEAR,
    MEDIA_LIBRARY_STATISTICS,
    DLNA_ENABLED,
    DLNA_SERVER_NAME,
    SONOS_ENABLED,
    SONOS_SERVICE_NAME,
    SONOS_SERVICE_ID,
    SMTP_SERVER,
    SMTP_ENCRYPTION,
    SMTP_PORT,
    SMTP_USER,
    SMTP_PASSWORD,
    SMTP_FROM,
];

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, &'static SettingDef> =
        SCHEMA.iter().map(|def| (def.key, def)).collect();
}

/// Vérifie la cohérence du schéma
///
/// - aucune clé en double
/// - aucune clé du schéma dans la liste des clés obsolètes
/// - seules des chaînes utilisent le codec hexadécimal
pub fn validate() -> Result<()> {
    if REGISTRY.len() != SCHEMA.len() {
        let mut seen = std::collections::HashSet::new();
        let duplicates: Vec<&str> = SCHEMA
            .iter()
            .filter(|def| !seen.insert(def.key))
            .map(|def| def.key)
            .collect();
        return Err(SettingsError::Schema(format!(
            "duplicate keys: {}",
            duplicates.join(", ")
        )));
    }

    if let Some(def) = SCHEMA.iter().find(|def| OBSOLETE_KEYS.contains(&def.key)) {
        return Err(SettingsError::Schema(format!(
            "key {} is both live and obsolete",
            def.key
        )));
    }

    if let Some(def) = SCHEMA
        .iter()
        .find(|def| def.codec == Codec::Hex && def.setting_type() != SettingType::Str)
    {
        return Err(SettingsError::Schema(format!(
            "key {} uses the hex codec but is not a string",
            def.key
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_valid() {
        validate().unwrap();
    }

    #[test]
    fn test_default_text_matches_type() {
        for def in SCHEMA {
            match (def.setting_type(), def.default_text()) {
                (SettingType::Int, Some(text)) => {
                    text.parse::<i32>().unwrap();
                }
                (SettingType::Long, Some(text)) => {
                    text.parse::<i64>().unwrap();
                }
                (SettingType::Bool, Some(text)) => {
                    assert!(text == "true" || text == "false");
                }
                (SettingType::Long, None) | (SettingType::Str, _) => {}
                (ty, None) => panic!("{} ({:?}) has no default", def.key, ty),
            }
        }
    }

    #[test]
    fn test_secrets_have_no_default() {
        for def in SCHEMA.iter().filter(|d| d.codec == Codec::Hex) {
            assert!(def.default_text().is_none(), "{}", def.key);
        }
    }
}
