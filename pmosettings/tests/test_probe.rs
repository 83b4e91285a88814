mod common;

use common::memory_service;
use pmosettings::{AddressLookup, UrlRedirectType};
use std::{
    io,
    net::{IpAddr, Ipv4Addr},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

/// Adresse fixe, qui peut être mise en panne
struct FixedLookup {
    down: AtomicBool,
}

impl AddressLookup for FixedLookup {
    fn lookup(&self) -> io::Result<IpAddr> {
        if self.down.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no route"));
        }
        Ok(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)))
    }
}

#[test]
fn test_local_address_empty_until_first_success() {
    let lookup = Arc::new(FixedLookup {
        down: AtomicBool::new(true),
    });
    let (_store, _fakes, service) = memory_service();
    let service = service.with_address_lookup(lookup.clone());

    assert!(!service.refresh_local_ip_address());
    assert_eq!(service.local_ip_address().as_str(), "");

    lookup.down.store(false, Ordering::SeqCst);
    assert!(service.refresh_local_ip_address());
    assert_eq!(service.local_ip_address().as_str(), "192.168.1.20");

    lookup.down.store(true, Ordering::SeqCst);
    assert!(!service.refresh_local_ip_address());
    assert_eq!(service.local_ip_address().as_str(), "192.168.1.20");
}

#[test]
fn test_custom_redirect_ignores_local_endpoint() {
    let lookup = Arc::new(FixedLookup {
        down: AtomicBool::new(false),
    });
    let (_store, _fakes, service) = memory_service();
    let service = service.with_address_lookup(lookup);
    service.set_url_redirect_type(UrlRedirectType::Custom);
    service.set_port(4040);
    service.set_url_redirect_custom_url(Some("   "));

    assert_eq!(service.url_redirect_url(), "http://");
    assert!(service.refresh_local_ip_address());
    assert_eq!(service.url_redirect_url(), "http://");
}

#[tokio::test]
async fn test_init_starts_background_probe() {
    let lookup = Arc::new(FixedLookup {
        down: AtomicBool::new(false),
    });
    let (_store, _fakes, service) = memory_service();
    let service = service.with_address_lookup(lookup);

    let handle = service.init();

    // La première recherche a lieu dès le démarrage
    let found = tokio::time::timeout(Duration::from_secs(5), async {
        while service.local_ip_address().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(found.is_ok(), "probe never ran");
    assert_eq!(service.local_ip_address().as_str(), "192.168.1.20");
    handle.abort();
}
