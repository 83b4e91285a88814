//! Préférences par utilisateur et avatars
//!
//! Ces données appartiennent aux DAOs de l'hôte ; le service ne fait que
//! les relayer, en fournissant des préférences par défaut pour un
//! utilisateur qui n'en a encore aucune.

use crate::resources::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liste d'albums affichée par défaut sur la page d'accueil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumListType {
    #[default]
    Random,
    Newest,
    Starred,
    Highest,
    Frequent,
    Recent,
    Decade,
    Genre,
    Alphabetical,
}

/// Colonnes visibles dans une liste de morceaux
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Visibility {
    pub track_number: bool,
    pub artist: bool,
    pub album: bool,
    pub genre: bool,
    pub year: bool,
    pub bit_rate: bool,
    pub duration: bool,
    pub format: bool,
    pub file_size: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub username: String,
    pub locale: Option<Locale>,
    pub theme_id: Option<String>,
    pub final_version_notification_enabled: bool,
    pub beta_version_notification_enabled: bool,
    pub song_notification_enabled: bool,
    pub show_now_playing_enabled: bool,
    pub party_mode_enabled: bool,
    pub now_playing_allowed: bool,
    pub auto_hide_play_queue: bool,
    pub keyboard_shortcuts_enabled: bool,
    pub show_side_bar: bool,
    pub show_artist_info_enabled: bool,
    pub view_as_list: bool,
    pub queue_following_songs: bool,
    pub default_album_list: AlbumListType,
    pub last_fm_enabled: bool,
    pub last_fm_username: Option<String>,
    pub last_fm_password: Option<String>,
    /// Délai de rafraîchissement des listes, en secondes
    pub list_reload_delay: i32,
    pub selected_music_folder_id: Option<i32>,
    pub main_visibility: Visibility,
    pub playlist_visibility: Visibility,
    pub changed: DateTime<Utc>,
}

impl UserSettings {
    /// Préférences d'un utilisateur qui n'a encore rien enregistré
    pub fn with_defaults(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            locale: None,
            theme_id: None,
            final_version_notification_enabled: true,
            beta_version_notification_enabled: false,
            song_notification_enabled: true,
            show_now_playing_enabled: true,
            party_mode_enabled: false,
            now_playing_allowed: true,
            auto_hide_play_queue: true,
            keyboard_shortcuts_enabled: false,
            show_side_bar: true,
            show_artist_info_enabled: true,
            view_as_list: false,
            queue_following_songs: true,
            default_album_list: AlbumListType::Random,
            last_fm_enabled: false,
            last_fm_username: None,
            last_fm_password: None,
            list_reload_delay: 60,
            selected_music_folder_id: None,
            main_visibility: Visibility {
                track_number: true,
                artist: true,
                duration: true,
                ..Visibility::default()
            },
            playlist_visibility: Visibility {
                artist: true,
                album: true,
                year: true,
                duration: true,
                bit_rate: true,
                format: true,
                file_size: true,
                ..Visibility::default()
            },
            changed: Utc::now(),
        }
    }
}

/// Accès persistant aux préférences utilisateur, fourni par l'hôte
pub trait UserDao: Send + Sync {
    fn user_settings(&self, username: &str) -> anyhow::Result<Option<UserSettings>>;

    fn update_user_settings(&self, settings: &UserSettings) -> anyhow::Result<()>;
}

/// Image d'avatar, système ou personnalisée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: i32,
    pub name: String,
    pub created: DateTime<Utc>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Accès persistant aux avatars, fourni par l'hôte
pub trait AvatarDao: Send + Sync {
    fn all_system_avatars(&self) -> anyhow::Result<Vec<Avatar>>;

    fn system_avatar(&self, id: i32) -> anyhow::Result<Option<Avatar>>;

    fn custom_avatar(&self, username: &str) -> anyhow::Result<Option<Avatar>>;

    /// `None` supprime l'avatar personnalisé
    fn set_custom_avatar(&self, avatar: Option<&Avatar>, username: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_settings() {
        let settings = UserSettings::with_defaults("admin");
        assert_eq!(settings.username, "admin");
        assert_eq!(settings.default_album_list, AlbumListType::Random);
        assert_eq!(settings.list_reload_delay, 60);
        assert!(settings.selected_music_folder_id.is_none());
        assert!(settings.main_visibility.track_number);
        assert!(!settings.main_visibility.album);
        assert!(settings.playlist_visibility.file_size);
        assert!(!settings.playlist_visibility.track_number);
    }
}
