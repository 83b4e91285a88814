//! Utilitaires hôte pour PMOMusic.
//!
//! - [`probe_local_ip`] : recherche de l'adresse IP locale, en signalant l'échec
//! - [`get_os_string`] : description du système d'exploitation pour les logs

mod ip_utils;

pub use ip_utils::probe_local_ip;

/// Décrit le système hôte pour les logs de démarrage.
///
/// Format `"{OS}/{version}"`, suivi de l'architecture quand `os_info` la
/// connaît, par exemple `"Ubuntu/22.04 (x86_64)"`. Une version inconnue
/// s'affiche `Unknown`.
///
/// ```
/// let os = pmoutils::get_os_string();
/// assert!(os.contains('/'));
/// ```
pub fn get_os_string() -> String {
    let info = os_info::get();
    let version = match info.version() {
        os_info::Version::Unknown => "Unknown".to_string(),
        v => v.to_string(),
    };

    match info.architecture() {
        Some(arch) => format!("{:?}/{} ({})", info.os_type(), version, arch),
        None => format!("{:?}/{}", info.os_type(), version),
    }
}
