//! Listes d'extensions dérivées des paramètres texte
//!
//! Les types de fichiers musique, vidéo et pochette sont stockés sous forme
//! d'une chaîne séparée par des espaces et consultés très souvent pendant
//! un scan. Le découpage est mis en cache jusqu'à la prochaine écriture.

use crate::accessor::TypedSettings;
use crate::cell::CacheCell;
use crate::schema::{SettingDef, COVER_ART_FILE_TYPES, MUSIC_FILE_TYPES, VIDEO_FILE_TYPES};
use std::sync::Arc;

/// Liste de types de fichiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileTypeList {
    Music,
    Video,
    CoverArt,
}

impl FileTypeList {
    pub const ALL: [FileTypeList; 3] = [Self::Music, Self::Video, Self::CoverArt];

    pub fn setting(&self) -> &'static SettingDef {
        match self {
            Self::Music => &MUSIC_FILE_TYPES,
            Self::Video => &VIDEO_FILE_TYPES,
            Self::CoverArt => &COVER_ART_FILE_TYPES,
        }
    }
}

/// Découpe une liste séparée par des blancs
pub fn split_list(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Cache des listes de types de fichiers
pub struct DerivedArrayCache {
    settings: TypedSettings,
    music: CacheCell<Arc<[String]>>,
    video: CacheCell<Arc<[String]>>,
    cover_art: CacheCell<Arc<[String]>>,
}

impl DerivedArrayCache {
    pub fn new(settings: TypedSettings) -> Self {
        Self {
            settings,
            music: CacheCell::new(),
            video: CacheCell::new(),
            cover_art: CacheCell::new(),
        }
    }

    fn cell(&self, list: FileTypeList) -> &CacheCell<Arc<[String]>> {
        match list {
            FileTypeList::Music => &self.music,
            FileTypeList::Video => &self.video,
            FileTypeList::CoverArt => &self.cover_art,
        }
    }

    /// Valeur texte brute
    pub fn raw(&self, list: FileTypeList) -> String {
        self.settings
            .get_string(list.setting())
            .unwrap_or_default()
    }

    /// Liste découpée, calculée au plus une fois entre deux écritures
    pub fn get_array(&self, list: FileTypeList) -> Arc<[String]> {
        let cached = self
            .cell(list)
            .get_or_init(|| split_list(&self.raw(list)).into());
        Arc::clone(&*cached)
    }

    /// Écrit la valeur texte et invalide la liste découpée
    ///
    /// `None` rétablit la valeur par défaut.
    pub fn set_array(&self, list: FileTypeList, value: Option<&str>) {
        self.cell(list)
            .invalidate_with(|| self.settings.set_string(list.setting(), value));
    }

    pub fn invalidate_all(&self) {
        for list in FileTypeList::ALL {
            self.cell(list).invalidate();
        }
    }
}
