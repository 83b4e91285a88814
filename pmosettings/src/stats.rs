//! Statistiques de la bibliothèque, stockées sur une seule ligne
//!
//! Format : `artistes albums morceaux octets secondes`, séparés par des espaces.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaLibraryStatistics {
    pub artist_count: i32,
    pub album_count: i32,
    pub song_count: i32,
    pub total_length_bytes: i64,
    pub total_duration_seconds: i64,
}

impl MediaLibraryStatistics {
    /// `None` si la ligne n'a pas exactement cinq nombres
    pub fn parse(text: &str) -> Option<Self> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        let [artists, albums, songs, bytes, seconds] = fields.as_slice() else {
            return None;
        };
        Some(Self {
            artist_count: artists.parse().ok()?,
            album_count: albums.parse().ok()?,
            song_count: songs.parse().ok()?,
            total_length_bytes: bytes.parse().ok()?,
            total_duration_seconds: seconds.parse().ok()?,
        })
    }
}

impl fmt::Display for MediaLibraryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.artist_count,
            self.album_count,
            self.song_count,
            self.total_length_bytes,
            self.total_duration_seconds
        )
    }
}
