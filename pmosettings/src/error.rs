//! Gestion des erreurs pour pmosettings

use std::path::PathBuf;
use thiserror::Error;

/// Type Result personnalisé pour pmosettings
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Erreurs possibles du service de paramètres
///
/// Les valeurs absentes ne sont jamais des erreurs : elles prennent leur
/// valeur par défaut. Les erreurs de décodage d'un secret sont récupérées
/// localement et n'apparaissent pas ici.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Le répertoire home n'existe pas et n'a pas pu être créé (fatal au démarrage)
    #[error(
        "The directory {} does not exist and could not be created. Please create it and make it \
         writable, or point PMOMUSIC_HOME to another location: {source}",
        path.display()
    )]
    HomeDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Erreur d'E/S sur le fichier de propriétés
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Erreur remontée telle quelle par un DAO
    #[error("DAO error: {0}")]
    Dao(#[from] anyhow::Error),

    /// URL locale ou personnalisée invalide
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Schéma de paramètres incohérent
    #[error("Settings schema error: {0}")]
    Schema(String),
}

impl SettingsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
