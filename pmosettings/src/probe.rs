//! Sonde périodique de l'adresse IP locale
//!
//! L'adresse est relue toutes les [`LOCAL_IP_LOOKUP_PERIOD`] par une tâche
//! tokio. La recherche elle-même est bloquante (sockets, interfaces) et
//! tourne sur le pool `spawn_blocking`. Un échec garde l'adresse précédente.

use std::{io, net::IpAddr, sync::Arc, time::Duration};

use arc_swap::ArcSwap;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Délai entre deux recherches, mesuré après la fin de la précédente
pub const LOCAL_IP_LOOKUP_PERIOD: Duration = Duration::from_secs(60);

/// Dernière adresse locale connue, vide avant la première recherche réussie
#[derive(Debug, Default)]
pub struct LocalAddress {
    current: ArcSwap<String>,
}

impl LocalAddress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Arc<String> {
        self.current.load_full()
    }

    pub fn is_known(&self) -> bool {
        !self.current.load().is_empty()
    }

    fn replace(&self, address: String) {
        let previous = self.current.swap(Arc::new(address.clone()));
        if *previous != address {
            info!(previous = %previous, current = %address, "Local IP address changed");
        }
    }
}

/// Source de l'adresse locale
pub trait AddressLookup: Send + Sync + 'static {
    fn lookup(&self) -> io::Result<IpAddr>;
}

/// Recherche via la table de routage puis les interfaces réseau
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLookup;

impl AddressLookup for SystemLookup {
    fn lookup(&self) -> io::Result<IpAddr> {
        pmoutils::probe_local_ip()
    }
}

/// Tâche de rafraîchissement de [`LocalAddress`]
pub struct LocalAddressProbe {
    address: Arc<LocalAddress>,
    lookup: Arc<dyn AddressLookup>,
    period: Duration,
}

impl LocalAddressProbe {
    pub fn new(address: Arc<LocalAddress>, lookup: Arc<dyn AddressLookup>) -> Self {
        Self {
            address,
            lookup,
            period: LOCAL_IP_LOOKUP_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    fn apply(&self, result: io::Result<IpAddr>) -> bool {
        match result {
            Ok(ip) => {
                self.address.replace(ip.to_string());
                true
            }
            Err(e) => {
                debug!(error = %e, "Local IP lookup failed, keeping previous value");
                false
            }
        }
    }

    /// Recherche synchrone, renvoie `true` si l'adresse a été mise à jour
    pub fn refresh_once(&self) -> bool {
        self.apply(self.lookup.lookup())
    }

    /// Lance la boucle de rafraîchissement
    ///
    /// La première recherche a lieu immédiatement. Doit être appelé depuis
    /// un runtime tokio.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let lookup = Arc::clone(&self.lookup);
                match tokio::task::spawn_blocking(move || lookup.lookup()).await {
                    Ok(result) => {
                        self.apply(result);
                    }
                    Err(e) => warn!(error = %e, "Local IP lookup task failed"),
                }
                tokio::time::sleep(self.period).await;
            }
        })
    }
}
