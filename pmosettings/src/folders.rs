//! Dossiers musicaux et autorisations par utilisateur
//!
//! La liste brute des dossiers est lue une fois auprès du DAO puis filtrée à
//! chaque appel (l'existence sur disque peut changer à tout moment). La liste
//! autorisée pour un utilisateur est mémorisée par nom d'utilisateur.
//!
//! Toute écriture sur les dossiers vide les deux caches ; une modification
//! des droits d'un utilisateur ne vide que son entrée.

use crate::cell::{CacheCell, KeyedCache};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};
use tracing::debug;

/// Dossier racine d'une bibliothèque musicale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicFolder {
    pub id: i32,
    pub path: PathBuf,
    pub name: String,
    pub enabled: bool,
    pub changed: DateTime<Utc>,
}

impl MusicFolder {
    pub fn new(id: i32, path: impl Into<PathBuf>, name: impl Into<String>, enabled: bool) -> Self {
        Self {
            id,
            path: path.into(),
            name: name.into(),
            enabled,
            changed: Utc::now(),
        }
    }

    /// Vérifié sur disque à chaque appel
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

// Deux dossiers sont le même s'ils ont le même identifiant
impl PartialEq for MusicFolder {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MusicFolder {}

/// Accès persistant aux dossiers musicaux, fourni par l'hôte
pub trait MusicFolderDao: Send + Sync {
    fn all_music_folders(&self) -> anyhow::Result<Vec<MusicFolder>>;

    /// Dossiers attribués à l'utilisateur, dans l'ordre d'attribution
    fn music_folders_for_user(&self, username: &str) -> anyhow::Result<Vec<MusicFolder>>;

    fn set_music_folders_for_user(&self, username: &str, folder_ids: &[i32])
        -> anyhow::Result<()>;

    fn create_music_folder(&self, folder: &MusicFolder) -> anyhow::Result<()>;

    fn update_music_folder(&self, folder: &MusicFolder) -> anyhow::Result<()>;

    fn delete_music_folder(&self, id: i32) -> anyhow::Result<()>;
}

/// Cache des dossiers et des autorisations par utilisateur
pub struct MusicFolderCache {
    dao: Arc<dyn MusicFolderDao>,
    all: CacheCell<Vec<MusicFolder>>,
    per_user: KeyedCache<Vec<MusicFolder>>,
}

impl MusicFolderCache {
    pub fn new(dao: Arc<dyn MusicFolderDao>) -> Self {
        Self {
            dao,
            all: CacheCell::new(),
            per_user: KeyedCache::new(),
        }
    }

    fn raw_folders(&self) -> Result<Arc<Vec<MusicFolder>>> {
        Ok(self.all.get_or_try_init(|| {
            debug!("Loading music folders");
            self.dao.all_music_folders()
        })?)
    }

    /// Dossiers connus, filtrés
    ///
    /// Sans les drapeaux, seuls les dossiers activés et présents sur disque
    /// sont renvoyés.
    pub fn all_music_folders(
        &self,
        include_disabled: bool,
        include_non_existing: bool,
    ) -> Result<Vec<MusicFolder>> {
        let raw = self.raw_folders()?;
        Ok(raw
            .iter()
            .filter(|f| include_disabled || f.enabled)
            .filter(|f| include_non_existing || f.exists())
            .cloned()
            .collect())
    }

    /// Dossiers accessibles à un utilisateur
    ///
    /// Intersection des dossiers attribués et des dossiers activés et
    /// présents, dans l'ordre d'attribution.
    pub fn music_folders_for_user(&self, username: &str) -> Result<Arc<Vec<MusicFolder>>> {
        self.per_user.get_or_try_init(username, || -> Result<Vec<MusicFolder>> {
            debug!(username = username, "Computing authorized music folders");
            let assigned = self.dao.music_folders_for_user(username)?;
            let available = self.all_music_folders(false, false)?;
            Ok(assigned
                .into_iter()
                .filter(|f| available.contains(f))
                .collect())
        })
    }

    /// Dossiers accessibles, restreints au dossier sélectionné s'il y en a un
    ///
    /// Un dossier sélectionné mais non autorisé donne une liste vide.
    pub fn music_folders_for_user_selected(
        &self,
        username: &str,
        selected: Option<i32>,
    ) -> Result<Vec<MusicFolder>> {
        let allowed = self.music_folders_for_user(username)?;
        Ok(match selected {
            None => allowed.as_ref().clone(),
            Some(id) => allowed.iter().filter(|f| f.id == id).cloned().collect(),
        })
    }

    /// Dossier activé et présent portant cet identifiant
    pub fn music_folder_by_id(&self, id: i32) -> Result<Option<MusicFolder>> {
        Ok(self
            .all_music_folders(false, false)?
            .into_iter()
            .find(|f| f.id == id))
    }

    pub fn set_music_folders_for_user(&self, username: &str, folder_ids: &[i32]) -> Result<()> {
        let result = self.dao.set_music_folders_for_user(username, folder_ids);
        self.per_user.invalidate(username);
        Ok(result?)
    }

    pub fn create_music_folder(&self, folder: &MusicFolder) -> Result<()> {
        let result = self.dao.create_music_folder(folder);
        self.clear();
        Ok(result?)
    }

    pub fn update_music_folder(&self, folder: &MusicFolder) -> Result<()> {
        let result = self.dao.update_music_folder(folder);
        self.clear();
        Ok(result?)
    }

    pub fn delete_music_folder(&self, id: i32) -> Result<()> {
        let result = self.dao.delete_music_folder(id);
        self.clear();
        Ok(result?)
    }

    /// Vide la liste brute et toutes les autorisations
    pub fn clear(&self) {
        self.all.invalidate();
        self.per_user.clear();
    }
}
