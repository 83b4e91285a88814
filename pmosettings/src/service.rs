//! Service de paramètres de PMOMusic
//!
//! [`SettingsService`] regroupe l'accès typé aux propriétés, les caches
//! dérivés (types de fichiers, dossiers autorisés), l'adresse locale, la
//! redirection d'URL et le relais vers les DAOs de l'hôte.

use crate::accessor::TypedSettings;
use crate::derived::{split_list, DerivedArrayCache, FileTypeList};
use crate::error::Result;
use crate::folders::{MusicFolder, MusicFolderCache, MusicFolderDao};
use crate::home::{pmomusic_home, property_file};
use crate::probe::{AddressLookup, LocalAddress, LocalAddressProbe, SystemLookup};
use crate::pruner::{prune_obsolete_keys, OBSOLETE_KEYS};
use crate::radio::{filter_enabled, InternetRadio, InternetRadioDao};
use crate::redirect::{self, RedirectionConfig, UrlRedirectType};
use crate::resources::{split_quoted, Locale, StaticResources, Theme};
use crate::schema::{self, *};
use crate::stats::MediaLibraryStatistics;
use crate::store::{PropertiesFile, PropertyStore};
use crate::users::{Avatar, AvatarDao, UserDao, UserSettings};
use chrono::{DateTime, TimeZone, Utc};
use std::{path::Path, path::PathBuf, sync::Arc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Nom affiché du produit
pub const BRAND: &str = "PMOMusic";

/// Generate getter/setter for an int setting
macro_rules! impl_int_setting {
    ($getter:ident, $setter:ident, $def:expr) => {
        pub fn $getter(&self) -> i32 {
            self.settings.get_int(&$def)
        }

        pub fn $setter(&self, value: i32) {
            self.settings.set_int(&$def, value)
        }
    };
}

/// Generate getter/setter for a long setting
macro_rules! impl_long_setting {
    ($getter:ident, $setter:ident, $def:expr) => {
        pub fn $getter(&self) -> i64 {
            self.settings.get_long(&$def)
        }

        pub fn $setter(&self, value: i64) {
            self.settings.set_long(&$def, value)
        }
    };
}

/// Generate getter/setter for a bool setting
macro_rules! impl_bool_setting {
    ($getter:ident, $setter:ident, $def:expr) => {
        pub fn $getter(&self) -> bool {
            self.settings.get_bool(&$def)
        }

        pub fn $setter(&self, value: bool) {
            self.settings.set_bool(&$def, value)
        }
    };
}

/// Generate getter/setter for a string setting with a default value.
/// Setting `None` restores the default.
macro_rules! impl_string_setting {
    ($getter:ident, $setter:ident, $def:expr) => {
        pub fn $getter(&self) -> String {
            self.settings.get_string(&$def).unwrap_or_default()
        }

        pub fn $setter(&self, value: Option<&str>) {
            self.settings.set_string(&$def, value)
        }
    };
}

/// Generate getter/setter for an optional string setting (secrets included)
macro_rules! impl_optional_string_setting {
    ($getter:ident, $setter:ident, $def:expr) => {
        pub fn $getter(&self) -> Option<String> {
            self.settings.get_string(&$def)
        }

        pub fn $setter(&self, value: Option<&str>) {
            self.settings.set_string(&$def, value)
        }
    };
}

/// Generate getter/setter for a free text setting, blank values read as `None`
macro_rules! impl_trimmed_string_setting {
    ($getter:ident, $setter:ident, $def:expr) => {
        pub fn $getter(&self) -> Option<String> {
            self.settings.get_trimmed_string(&$def)
        }

        pub fn $setter(&self, value: Option<&str>) {
            self.settings.set_string(&$def, value)
        }
    };
}

/// DAOs fournis par l'hôte
#[derive(Clone)]
pub struct Daos {
    pub music_folders: Arc<dyn MusicFolderDao>,
    pub internet_radios: Arc<dyn InternetRadioDao>,
    pub users: Arc<dyn UserDao>,
    pub avatars: Arc<dyn AvatarDao>,
}

/// Service de paramètres
///
/// # Examples
///
/// ```no_run
/// # fn daos() -> pmosettings::Daos { unimplemented!() }
/// use pmosettings::SettingsService;
///
/// let service = SettingsService::open(None, daos())?;
/// service.set_port(4040);
/// service.save(true)?;
/// # Ok::<(), pmosettings::SettingsError>(())
/// ```
pub struct SettingsService {
    settings: TypedSettings,
    file_types: DerivedArrayCache,
    folders: MusicFolderCache,
    internet_radios: Arc<dyn InternetRadioDao>,
    users: Arc<dyn UserDao>,
    avatars: Arc<dyn AvatarDao>,
    local_address: Arc<LocalAddress>,
    address_lookup: Arc<dyn AddressLookup>,
    resources: StaticResources,
    home: Option<PathBuf>,
}

impl SettingsService {
    /// Crée le service au-dessus d'un stockage déjà chargé
    ///
    /// # Errors
    ///
    /// [`crate::SettingsError::Schema`] si le schéma des paramètres est incohérent.
    pub fn new(store: Arc<dyn PropertyStore>, daos: Daos) -> Result<Self> {
        schema::validate()?;
        let settings = TypedSettings::new(store);
        Ok(Self {
            file_types: DerivedArrayCache::new(settings.clone()),
            settings,
            folders: MusicFolderCache::new(daos.music_folders),
            internet_radios: daos.internet_radios,
            users: daos.users,
            avatars: daos.avatars,
            local_address: Arc::new(LocalAddress::new()),
            address_lookup: Arc::new(SystemLookup),
            resources: StaticResources::embedded(),
            home: None,
        })
    }

    /// Résout le répertoire home et charge `pmomusic.properties`
    ///
    /// # Errors
    ///
    /// [`crate::SettingsError::HomeDirectory`] si le home ne peut pas être
    /// créé ; le démarrage doit alors être interrompu.
    pub fn open(home: Option<&Path>, daos: Daos) -> Result<Self> {
        let home = pmomusic_home(home)?;
        let file = property_file(&home);
        info!(file = %file.display(), "Loading settings");
        let store = PropertiesFile::open(file)?;
        let mut service = Self::new(Arc::new(store), daos)?;
        service.home = Some(home);
        Ok(service)
    }

    /// Remplace les listes de thèmes et de langues par celles de `dir`
    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources = StaticResources::from_dir(dir);
        self
    }

    /// Remplace la recherche d'adresse locale
    pub fn with_address_lookup(mut self, lookup: Arc<dyn AddressLookup>) -> Self {
        self.address_lookup = lookup;
        self
    }

    /// Journalise l'environnement et lance la sonde d'adresse locale
    ///
    /// Doit être appelé une seule fois, depuis un runtime tokio.
    pub fn init(&self) -> JoinHandle<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            os = %pmoutils::get_os_string(),
            home = ?self.home,
            "Starting settings service"
        );
        LocalAddressProbe::new(
            Arc::clone(&self.local_address),
            Arc::clone(&self.address_lookup),
        )
        .spawn()
    }

    /// Rend les modifications durables
    ///
    /// Avec `update_settings_changed`, les clés obsolètes sont supprimées et
    /// l'horodatage `SettingsChanged` est mis à jour avant l'écriture.
    pub fn save(&self, update_settings_changed: bool) -> Result<()> {
        if update_settings_changed {
            prune_obsolete_keys(self.store().as_ref(), OBSOLETE_KEYS);
            self.settings
                .set_long(&SETTINGS_CHANGED, Utc::now().timestamp_millis());
        }
        self.store().save()
    }

    /// Recharge le stockage durable et vide les caches dérivés
    pub fn reload(&self) -> Result<()> {
        self.store().load()?;
        self.clear_caches();
        info!("Settings reloaded");
        Ok(())
    }

    // Les écritures passent par le service, qui invalide ses caches
    pub(crate) fn store(&self) -> &Arc<dyn PropertyStore> {
        self.settings.store()
    }

    /// Répertoire home, si le service a été ouvert avec [`Self::open`]
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    pub fn brand(&self) -> &'static str {
        BRAND
    }

    // Index et navigation
    impl_string_setting!(index_string, set_index_string, INDEX_STRING);
    impl_string_setting!(ignored_articles, set_ignored_articles, IGNORED_ARTICLES);
    impl_string_setting!(shortcuts, set_shortcuts, SHORTCUTS);
    impl_string_setting!(playlist_folder, set_playlist_folder, PLAYLIST_FOLDER);

    pub fn ignored_articles_as_array(&self) -> Vec<String> {
        split_list(&self.ignored_articles())
    }

    /// Les raccourcis peuvent contenir des espaces entre guillemets
    pub fn shortcuts_as_array(&self) -> Vec<String> {
        split_quoted(&self.shortcuts())
    }

    // Types de fichiers
    pub fn music_file_types(&self) -> String {
        self.file_types.raw(FileTypeList::Music)
    }

    pub fn set_music_file_types(&self, value: Option<&str>) {
        self.file_types.set_array(FileTypeList::Music, value)
    }

    pub fn music_file_types_as_array(&self) -> Arc<[String]> {
        self.file_types.get_array(FileTypeList::Music)
    }

    pub fn video_file_types(&self) -> String {
        self.file_types.raw(FileTypeList::Video)
    }

    pub fn set_video_file_types(&self, value: Option<&str>) {
        self.file_types.set_array(FileTypeList::Video, value)
    }

    pub fn video_file_types_as_array(&self) -> Arc<[String]> {
        self.file_types.get_array(FileTypeList::Video)
    }

    pub fn cover_art_file_types(&self) -> String {
        self.file_types.raw(FileTypeList::CoverArt)
    }

    pub fn set_cover_art_file_types(&self, value: Option<&str>) {
        self.file_types.set_array(FileTypeList::CoverArt, value)
    }

    pub fn cover_art_file_types_as_array(&self) -> Arc<[String]> {
        self.file_types.get_array(FileTypeList::CoverArt)
    }

    impl_int_setting!(cover_art_concurrency, set_cover_art_concurrency, COVER_ART_CONCURRENCY);

    // Messages
    impl_trimmed_string_setting!(welcome_title, set_welcome_title, WELCOME_TITLE);
    impl_trimmed_string_setting!(welcome_subtitle, set_welcome_subtitle, WELCOME_SUBTITLE);
    impl_trimmed_string_setting!(welcome_message, set_welcome_message, WELCOME_MESSAGE);
    impl_trimmed_string_setting!(login_message, set_login_message, LOGIN_MESSAGE);

    // Indexation et podcasts
    impl_int_setting!(index_creation_interval, set_index_creation_interval, INDEX_CREATION_INTERVAL);
    impl_int_setting!(index_creation_hour, set_index_creation_hour, INDEX_CREATION_HOUR);
    impl_bool_setting!(fast_cache_enabled, set_fast_cache_enabled, FAST_CACHE_ENABLED);
    impl_int_setting!(podcast_update_interval, set_podcast_update_interval, PODCAST_UPDATE_INTERVAL);
    impl_string_setting!(podcast_folder, set_podcast_folder, PODCAST_FOLDER);
    impl_int_setting!(
        podcast_episode_retention_count,
        set_podcast_episode_retention_count,
        PODCAST_EPISODE_RETENTION_COUNT
    );
    impl_int_setting!(
        podcast_episode_download_count,
        set_podcast_episode_download_count,
        PODCAST_EPISODE_DOWNLOAD_COUNT
    );

    // Débits et commandes externes (kbit/s, 0 = illimité)
    impl_long_setting!(download_bitrate_limit, set_download_bitrate_limit, DOWNLOAD_BITRATE_LIMIT);
    impl_long_setting!(upload_bitrate_limit, set_upload_bitrate_limit, UPLOAD_BITRATE_LIMIT);
    impl_string_setting!(downsampling_command, set_downsampling_command, DOWNSAMPLING_COMMAND);
    impl_string_setting!(hls_command, set_hls_command, HLS_COMMAND);
    impl_string_setting!(jukebox_command, set_jukebox_command, JUKEBOX_COMMAND);
    impl_string_setting!(video_image_command, set_video_image_command, VIDEO_IMAGE_COMMAND);
    impl_bool_setting!(rewrite_url_enabled, set_rewrite_url_enabled, REWRITE_URL);

    // LDAP
    impl_bool_setting!(ldap_enabled, set_ldap_enabled, LDAP_ENABLED);
    impl_string_setting!(ldap_url, set_ldap_url, LDAP_URL);
    impl_optional_string_setting!(ldap_manager_dn, set_ldap_manager_dn, LDAP_MANAGER_DN);
    impl_optional_string_setting!(
        ldap_manager_password,
        set_ldap_manager_password,
        LDAP_MANAGER_PASSWORD
    );
    impl_string_setting!(ldap_search_filter, set_ldap_search_filter, LDAP_SEARCH_FILTER);
    impl_bool_setting!(ldap_auto_shadowing, set_ldap_auto_shadowing, LDAP_AUTO_SHADOWING);

    // Réseau
    impl_bool_setting!(getting_started_enabled, set_getting_started_enabled, GETTING_STARTED_ENABLED);
    impl_bool_setting!(port_forwarding_enabled, set_port_forwarding_enabled, PORT_FORWARDING_ENABLED);
    impl_int_setting!(port, set_port, PORT);
    impl_int_setting!(https_port, set_https_port, HTTPS_PORT);

    // Redirection d'URL
    impl_bool_setting!(url_redirection_enabled, set_url_redirection_enabled, URL_REDIRECTION_ENABLED);
    impl_string_setting!(url_redirect_from, set_url_redirect_from, URL_REDIRECT_FROM);
    impl_string_setting!(url_redirect_context_path, set_url_redirect_context_path, URL_REDIRECT_CONTEXT_PATH);
    impl_trimmed_string_setting!(url_redirect_custom_url, set_url_redirect_custom_url, URL_REDIRECT_CUSTOM_URL);

    pub fn url_redirect_type(&self) -> UrlRedirectType {
        let raw = self.settings.get_string(&URL_REDIRECT_TYPE).unwrap_or_default();
        raw.parse().unwrap_or_else(|e| {
            warn!(value = %raw, error = %e, "Invalid redirect type, using NORMAL");
            UrlRedirectType::Normal
        })
    }

    pub fn set_url_redirect_type(&self, mode: UrlRedirectType) {
        self.settings.set_string(&URL_REDIRECT_TYPE, Some(mode.as_str()))
    }

    pub fn redirection_config(&self) -> RedirectionConfig {
        RedirectionConfig {
            enabled: self.url_redirection_enabled(),
            mode: self.url_redirect_type(),
            subdomain: self.url_redirect_from(),
            custom_url: self.url_redirect_custom_url(),
            context_path: self.url_redirect_context_path(),
        }
    }

    /// URL publique du serveur
    pub fn url_redirect_url(&self) -> String {
        redirect::resolve(&self.redirection_config())
    }

    /// Réécrit une URL locale pour un client distant
    pub fn rewrite_remote_url(&self, local_url: &str) -> Result<String> {
        redirect::rewrite_remote_url(local_url, &self.redirection_config())
    }

    /// Dernière adresse IP locale connue, vide avant la première recherche
    pub fn local_ip_address(&self) -> Arc<String> {
        self.local_address.get()
    }

    /// Recherche immédiate de l'adresse locale, hors de la tâche périodique
    pub fn refresh_local_ip_address(&self) -> bool {
        LocalAddressProbe::new(
            Arc::clone(&self.local_address),
            Arc::clone(&self.address_lookup),
        )
        .refresh_once()
    }

    // État du serveur
    impl_optional_string_setting!(server_id, set_server_id, SERVER_ID);

    /// Horodatage de la dernière sauvegarde, en millisecondes
    pub fn settings_changed(&self) -> i64 {
        self.settings.get_long(&SETTINGS_CHANGED)
    }

    pub fn last_scanned(&self) -> Option<DateTime<Utc>> {
        let millis = self.settings.get_optional_long(&LAST_SCANNED)?;
        Utc.timestamp_millis_opt(millis).single()
    }

    pub fn set_last_scanned(&self, date: Option<DateTime<Utc>>) {
        self.settings
            .set_optional_long(&LAST_SCANNED, date.map(|d| d.timestamp_millis()))
    }

    impl_bool_setting!(
        organize_by_folder_structure,
        set_organize_by_folder_structure,
        ORGANIZE_BY_FOLDER_STRUCTURE
    );
    impl_bool_setting!(sort_albums_by_year, set_sort_albums_by_year, SORT_ALBUMS_BY_YEAR);

    pub fn media_library_statistics(&self) -> MediaLibraryStatistics {
        let raw = self
            .settings
            .get_string(&MEDIA_LIBRARY_STATISTICS)
            .unwrap_or_default();
        MediaLibraryStatistics::parse(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "Invalid media library statistics, using zeros");
            MediaLibraryStatistics::default()
        })
    }

    pub fn set_media_library_statistics(&self, statistics: &MediaLibraryStatistics) {
        self.settings
            .set_string(&MEDIA_LIBRARY_STATISTICS, Some(&statistics.to_string()))
    }

    // Langue et thème
    pub fn locale(&self) -> Locale {
        Locale::new(
            self.settings.get_string(&LOCALE_LANGUAGE).unwrap_or_default(),
            self.settings.get_string(&LOCALE_COUNTRY).unwrap_or_default(),
            self.settings.get_string(&LOCALE_VARIANT).unwrap_or_default(),
        )
    }

    pub fn set_locale(&self, locale: &Locale) {
        self.settings
            .set_string(&LOCALE_LANGUAGE, Some(&locale.language));
        self.settings.set_string(&LOCALE_COUNTRY, Some(&locale.country));
        self.settings.set_string(&LOCALE_VARIANT, Some(&locale.variant));
    }

    impl_string_setting!(theme_id, set_theme_id, THEME_ID);

    pub fn available_themes(&self) -> &[Theme] {
        self.resources.themes()
    }

    pub fn available_locales(&self) -> &[Locale] {
        self.resources.locales()
    }

    // DLNA / Sonos
    impl_bool_setting!(dlna_enabled, set_dlna_enabled, DLNA_ENABLED);
    impl_string_setting!(dlna_server_name, set_dlna_server_name, DLNA_SERVER_NAME);
    impl_bool_setting!(sonos_enabled, set_sonos_enabled, SONOS_ENABLED);
    impl_string_setting!(sonos_service_name, set_sonos_service_name, SONOS_SERVICE_NAME);
    impl_int_setting!(sonos_service_id, set_sonos_service_id, SONOS_SERVICE_ID);

    // SMTP
    impl_optional_string_setting!(smtp_server, set_smtp_server, SMTP_SERVER);
    impl_string_setting!(smtp_encryption, set_smtp_encryption, SMTP_ENCRYPTION);
    impl_string_setting!(smtp_port, set_smtp_port, SMTP_PORT);
    impl_optional_string_setting!(smtp_user, set_smtp_user, SMTP_USER);
    impl_optional_string_setting!(smtp_password, set_smtp_password, SMTP_PASSWORD);
    impl_string_setting!(smtp_from, set_smtp_from, SMTP_FROM);

    // Dossiers musicaux
    pub fn all_music_folders(
        &self,
        include_disabled: bool,
        include_non_existing: bool,
    ) -> Result<Vec<MusicFolder>> {
        self.folders
            .all_music_folders(include_disabled, include_non_existing)
    }

    pub fn music_folders_for_user(&self, username: &str) -> Result<Arc<Vec<MusicFolder>>> {
        self.folders.music_folders_for_user(username)
    }

    pub fn music_folders_for_user_selected(
        &self,
        username: &str,
        selected: Option<i32>,
    ) -> Result<Vec<MusicFolder>> {
        self.folders.music_folders_for_user_selected(username, selected)
    }

    /// Dossier sélectionné par l'utilisateur, `None` pour « tous les dossiers »
    pub fn selected_music_folder(&self, username: &str) -> Result<Option<MusicFolder>> {
        let Some(id) = self.user_settings(username)?.selected_music_folder_id else {
            return Ok(None);
        };
        let allowed = self.folders.music_folders_for_user(username)?;
        Ok(allowed.iter().find(|f| f.id == id).cloned())
    }

    pub fn music_folder_by_id(&self, id: i32) -> Result<Option<MusicFolder>> {
        self.folders.music_folder_by_id(id)
    }

    pub fn set_music_folders_for_user(&self, username: &str, folder_ids: &[i32]) -> Result<()> {
        self.folders.set_music_folders_for_user(username, folder_ids)
    }

    pub fn create_music_folder(&self, folder: &MusicFolder) -> Result<()> {
        self.folders.create_music_folder(folder)
    }

    pub fn update_music_folder(&self, folder: &MusicFolder) -> Result<()> {
        self.folders.update_music_folder(folder)
    }

    pub fn delete_music_folder(&self, id: i32) -> Result<()> {
        self.folders.delete_music_folder(id)
    }

    pub fn clear_music_folder_cache(&self) {
        self.folders.clear()
    }

    // Radios
    pub fn all_internet_radios(&self, include_all: bool) -> Result<Vec<InternetRadio>> {
        let all = self.internet_radios.all_internet_radios()?;
        Ok(filter_enabled(all, include_all))
    }

    /// Station activée portant cet identifiant
    pub fn internet_radio_by_id(&self, id: i32) -> Result<Option<InternetRadio>> {
        Ok(self
            .all_internet_radios(false)?
            .into_iter()
            .find(|r| r.id == id))
    }

    pub fn create_internet_radio(&self, radio: &InternetRadio) -> Result<()> {
        Ok(self.internet_radios.create_internet_radio(radio)?)
    }

    pub fn update_internet_radio(&self, radio: &InternetRadio) -> Result<()> {
        Ok(self.internet_radios.update_internet_radio(radio)?)
    }

    pub fn delete_internet_radio(&self, id: i32) -> Result<()> {
        Ok(self.internet_radios.delete_internet_radio(id)?)
    }

    // Utilisateurs
    /// Préférences de l'utilisateur, ou les préférences par défaut s'il n'en a pas
    pub fn user_settings(&self, username: &str) -> Result<UserSettings> {
        Ok(self
            .users
            .user_settings(username)?
            .unwrap_or_else(|| UserSettings::with_defaults(username)))
    }

    pub fn update_user_settings(&self, settings: &UserSettings) -> Result<()> {
        Ok(self.users.update_user_settings(settings)?)
    }

    // Avatars
    pub fn all_system_avatars(&self) -> Result<Vec<Avatar>> {
        Ok(self.avatars.all_system_avatars()?)
    }

    pub fn system_avatar(&self, id: i32) -> Result<Option<Avatar>> {
        Ok(self.avatars.system_avatar(id)?)
    }

    pub fn custom_avatar(&self, username: &str) -> Result<Option<Avatar>> {
        Ok(self.avatars.custom_avatar(username)?)
    }

    pub fn set_custom_avatar(&self, avatar: Option<&Avatar>, username: &str) -> Result<()> {
        Ok(self.avatars.set_custom_avatar(avatar, username)?)
    }

    /// Vide tous les caches dérivés
    pub fn clear_caches(&self) {
        self.file_types.invalidate_all();
        self.folders.clear();
    }
}
