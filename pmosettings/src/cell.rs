//! Cellules de cache à invalidation explicite
//!
//! Une [`CacheCell`] mémorise le résultat d'un calcul coûteux (découpage d'une
//! chaîne, appel DAO). Le calcul et l'invalidation prennent le même verrou :
//! une invalidation ne peut pas être écrasée par un calcul commencé avant
//! elle, donc une valeur périmée ne réapparaît jamais après une écriture.
//!
//! [`KeyedCache`] associe une cellule par clé (ex: un nom d'utilisateur).

use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Valeur calculée paresseusement et partagée via `Arc`
#[derive(Debug)]
pub struct CacheCell<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Default for CacheCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CacheCell<T> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    // Un calcul qui panique laisse la cellule vide, elle reste utilisable
    fn lock(&self) -> MutexGuard<'_, Option<Arc<T>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Renvoie la valeur en cache ou la calcule avec `init`
    ///
    /// Un seul calcul a lieu à la fois ; les appelants concurrents attendent
    /// puis partagent le résultat. Une erreur n'est pas mise en cache.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        let mut slot = self.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(init()?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }

    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        match self.get_or_try_init(|| Ok::<T, std::convert::Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    pub fn invalidate(&self) {
        self.lock().take();
    }

    /// Exécute `write` sous le verrou de la cellule, puis l'invalide
    ///
    /// Les lecteurs concurrents voient soit l'ancienne valeur, soit une
    /// valeur recalculée après `write`.
    pub fn invalidate_with<R>(&self, write: impl FnOnce() -> R) -> R {
        let mut slot = self.lock();
        let result = write();
        slot.take();
        result
    }

    /// Valeur en cache, sans calcul
    pub fn peek(&self) -> Option<Arc<T>> {
        self.lock().clone()
    }

    pub fn is_cached(&self) -> bool {
        self.lock().is_some()
    }
}

/// Une [`CacheCell`] par clé texte
///
/// L'invalidation retire la cellule de la table. Un calcul en cours sur la
/// cellule retirée se termine normalement mais son résultat n'est plus
/// visible : la lecture suivante crée une cellule neuve.
#[derive(Debug)]
pub struct KeyedCache<T> {
    cells: DashMap<String, Arc<CacheCell<T>>>,
}

impl<T> Default for KeyedCache<T> {
    fn default() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }
}

impl<T> KeyedCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // Le garde du shard DashMap est relâché avant tout calcul
    fn cell(&self, key: &str) -> Arc<CacheCell<T>> {
        if let Some(cell) = self.cells.get(key) {
            return Arc::clone(cell.value());
        }
        Arc::clone(self.cells.entry(key.to_string()).or_default().value())
    }

    pub fn get_or_try_init<E>(
        &self,
        key: &str,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        self.cell(key).get_or_try_init(init)
    }

    pub fn invalidate(&self, key: &str) {
        self.cells.remove(key);
    }

    pub fn clear(&self) {
        self.cells.clear();
    }

    pub fn is_cached(&self, key: &str) -> bool {
        let cell = self.cells.get(key).map(|cell| Arc::clone(cell.value()));
        cell.is_some_and(|cell| cell.is_cached())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_computes_once() {
        let cell = CacheCell::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let v = cell.get_or_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                vec!["mp3".to_string()]
            });
            assert_eq!(v[0], "mp3");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cell: CacheCell<u32> = CacheCell::new();
        assert!(cell.get_or_try_init(|| Err("boom")).is_err());
        assert!(!cell.is_cached());
        assert_eq!(*cell.get_or_try_init(|| Ok::<_, &str>(7)).unwrap(), 7);
    }

    #[test]
    fn test_invalidate_with_forces_recompute() {
        let cell = CacheCell::new();
        let mut source = 1;
        assert_eq!(*cell.get_or_init(|| source), 1);
        cell.invalidate_with(|| source = 2);
        assert!(cell.peek().is_none());
        assert_eq!(*cell.get_or_init(|| source), 2);
    }

    #[test]
    fn test_survives_panicking_init() {
        let cell = Arc::new(CacheCell::<u32>::new());
        let c = Arc::clone(&cell);
        let result = thread::spawn(move || {
            c.get_or_init(|| panic!("init failed"));
        })
        .join();
        assert!(result.is_err());
        assert_eq!(*cell.get_or_init(|| 3), 3);
    }

    #[test]
    fn test_keyed_cache_invalidates_one_key() {
        let cache = KeyedCache::new();
        cache.get_or_try_init("admin", || Ok::<_, ()>(1)).unwrap();
        cache.get_or_try_init("guest", || Ok::<_, ()>(2)).unwrap();

        cache.invalidate("admin");
        assert!(!cache.is_cached("admin"));
        assert!(cache.is_cached("guest"));

        let v = cache.get_or_try_init("admin", || Ok::<_, ()>(10)).unwrap();
        assert_eq!(*v, 10);
    }

    #[test]
    fn test_keyed_cache_concurrent_single_init() {
        let cache = Arc::new(KeyedCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    *cache
                        .get_or_try_init("admin", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(10));
                            Ok::<_, ()>(42)
                        })
                        .unwrap()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
