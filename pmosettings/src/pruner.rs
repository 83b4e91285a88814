//! Suppression des clés obsolètes au moment de la sauvegarde

use crate::store::PropertyStore;
use tracing::info;

/// Clés abandonnées par les versions précédentes
pub const OBSOLETE_KEYS: &[&str] = &[
    "PortForwardingPublicPort",
    "PortForwardingLocalPort",
    "DownsamplingCommand",
    "DownsamplingCommand2",
    "DownsamplingCommand3",
    "AutoCoverBatch",
    "MusicMask",
    "VideoMask",
    "CoverArtMask",
    "HlsCommand",
    "HlsCommand2",
    "JukeboxCommand",
    "CoverArtFileTypes",
    "UrlRedirectCustomHost",
    "CoverArtLimit",
    "StreamPort",
];

/// Supprime les clés de `denylist` présentes dans `store`
///
/// Renvoie les clés effectivement supprimées.
pub fn prune_obsolete_keys<'a>(store: &dyn PropertyStore, denylist: &[&'a str]) -> Vec<&'a str> {
    denylist
        .iter()
        .copied()
        .filter(|key| store.contains(key))
        .inspect(|key| {
            store.clear(key);
            info!(key = key, "Removing obsolete property");
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_prune_removes_only_denylisted_keys() {
        let store = MemoryStore::new();
        store.set("CoverArtMask", "x".to_string());
        store.set("HlsCommand", "y".to_string());
        store.set("Port", "4040".to_string());

        let removed = prune_obsolete_keys(&store, OBSOLETE_KEYS);

        assert_eq!(removed, vec!["CoverArtMask", "HlsCommand"]);
        assert_eq!(store.keys(), vec!["Port".to_string()]);
        assert!(prune_obsolete_keys(&store, OBSOLETE_KEYS).is_empty());
    }
}
