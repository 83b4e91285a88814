//! Résolution du répertoire home de PMOMusic
//!
//! Le home contient le fichier `pmomusic.properties`. Il est cherché dans
//! l'ordre suivant :
//!
//! 1. le répertoire passé explicitement
//! 2. la variable d'environnement `PMOMUSIC_HOME`
//! 3. `~/.pmomusic` s'il existe déjà
//! 4. le chemin par défaut du système (`c:/pmomusic` sous Windows,
//!    `/var/pmomusic` ailleurs)
//!
//! Le répertoire est créé s'il n'existe pas. Un échec de création est fatal.

use crate::error::{Result, SettingsError};
use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Variable d'environnement pour surcharger le home
pub const ENV_HOME: &str = "PMOMUSIC_HOME";

/// Nom du fichier de propriétés dans le home
pub const PROPERTY_FILE_NAME: &str = "pmomusic.properties";

const HOME_WINDOWS: &str = "c:/pmomusic";
const HOME_OTHER: &str = "/var/pmomusic";

fn find_home_dir(directory: Option<&Path>) -> PathBuf {
    if let Some(dir) = directory {
        return dir.to_path_buf();
    }

    if let Ok(env_path) = env::var(ENV_HOME) {
        if !env_path.trim().is_empty() {
            info!(env_var = ENV_HOME, path = %env_path, "Using home directory from env");
            return PathBuf::from(env_path);
        }
    }

    if let Some(home) = home_dir() {
        let user_home = home.join(".pmomusic");
        if user_home.is_dir() {
            return user_home;
        }
    }

    if cfg!(windows) {
        PathBuf::from(HOME_WINDOWS)
    } else {
        PathBuf::from(HOME_OTHER)
    }
}

/// Crée le répertoire s'il n'existe pas, ou échoue si le chemin n'est pas un répertoire
pub(crate) fn ensure_directory_present(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|source| SettingsError::HomeDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    info!(directory = %path.display(), "Created home directory");
    Ok(())
}

/// Détermine et prépare le répertoire home
///
/// # Errors
///
/// [`SettingsError::HomeDirectory`] si le répertoire ne peut pas être créé.
/// L'appelant doit interrompre le démarrage.
pub fn pmomusic_home(directory: Option<&Path>) -> Result<PathBuf> {
    let home = find_home_dir(directory);
    ensure_directory_present(&home)?;
    Ok(home)
}

/// Chemin du fichier de propriétés pour un home donné
pub fn property_file(home: &Path) -> PathBuf {
    home.join(PROPERTY_FILE_NAME)
}
