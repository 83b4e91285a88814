use get_if_addrs::get_if_addrs;
use std::io;
use std::net::{IpAddr, UdpSocket};

/// Cible utilisée pour découvrir l'interface de sortie (aucun paquet n'est envoyé).
const ROUTE_PROBE_TARGET: &str = "8.8.8.8:80";

/// Cherche l'adresse IP locale de la machine, sans valeur de repli.
///
/// Deux stratégies sont essayées dans l'ordre :
///
/// 1. Un socket UDP « connecté » vers un serveur DNS public : le système
///    d'exploitation choisit l'interface de sortie, dont on lit l'adresse.
///    UDP étant sans connexion, aucun trafic réseau n'est émis.
/// 2. Si la machine n'a pas de route par défaut, on parcourt les interfaces
///    et on retient la première adresse IPv4 qui n'est pas une loopback.
///
/// # Errors
///
/// Retourne une erreur `NotFound` si aucune adresse utilisable n'a été trouvée,
/// ou l'erreur d'E/S de l'énumération des interfaces.
pub fn probe_local_ip() -> io::Result<IpAddr> {
    if let Some(ip) = ip_from_default_route() {
        return Ok(ip);
    }

    let interfaces = list_non_loopback_ipv4()?;
    interfaces
        .into_iter()
        .map(|(_, ip)| ip)
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no non-loopback IPv4 address"))
}

fn ip_from_default_route() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(ROUTE_PROBE_TARGET).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_loopback() || ip.is_unspecified() {
        None
    } else {
        Some(ip)
    }
}

/// Liste les adresses IPv4 non-loopback, avec le nom de leur interface.
///
/// L'ordre est celui renvoyé par le système.
fn list_non_loopback_ipv4() -> io::Result<Vec<(String, IpAddr)>> {
    let interfaces = get_if_addrs()?;
    Ok(interfaces
        .into_iter()
        .filter_map(|iface| {
            let ip = iface.ip();
            (ip.is_ipv4() && !ip.is_loopback()).then_some((iface.name, ip))
        })
        .collect())
}
