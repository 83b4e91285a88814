#![allow(dead_code)]

use anyhow::{anyhow, Result};
use pmosettings::{
    Avatar, AvatarDao, Daos, InternetRadio, InternetRadioDao, MemoryStore, MusicFolder,
    MusicFolderDao, PropertyStore, SettingsService, UserDao, UserSettings,
};
use std::{
    collections::HashMap,
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

/// DAO de dossiers en mémoire, qui compte ses lectures
#[derive(Default)]
pub struct FakeFolderDao {
    pub folders: Mutex<Vec<MusicFolder>>,
    pub assignments: Mutex<HashMap<String, Vec<i32>>>,
    pub all_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    pub fail: AtomicBool,
    pub read_delay_ms: AtomicUsize,
}

impl FakeFolderDao {
    pub fn add(&self, id: i32, path: &Path, enabled: bool) {
        self.folders
            .lock()
            .unwrap()
            .push(MusicFolder::new(id, path, format!("Folder {}", id), enabled));
    }

    pub fn assign(&self, username: &str, ids: &[i32]) {
        self.assignments
            .lock()
            .unwrap()
            .insert(username.to_string(), ids.to_vec());
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("database unavailable"));
        }
        Ok(())
    }

    fn delay(&self) {
        let ms = self.read_delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}

impl MusicFolderDao for FakeFolderDao {
    fn all_music_folders(&self) -> Result<Vec<MusicFolder>> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let snapshot = self.folders.lock().unwrap().clone();
        self.delay();
        Ok(snapshot)
    }

    fn music_folders_for_user(&self, username: &str) -> Result<Vec<MusicFolder>> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let ids = self
            .assignments
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .unwrap_or_default();
        let folders = self.folders.lock().unwrap();
        let assigned = ids
            .iter()
            .filter_map(|id| folders.iter().find(|f| f.id == *id).cloned())
            .collect();
        drop(folders);
        self.delay();
        Ok(assigned)
    }

    fn set_music_folders_for_user(&self, username: &str, folder_ids: &[i32]) -> Result<()> {
        self.check()?;
        self.assign(username, folder_ids);
        Ok(())
    }

    fn create_music_folder(&self, folder: &MusicFolder) -> Result<()> {
        self.check()?;
        self.folders.lock().unwrap().push(folder.clone());
        Ok(())
    }

    fn update_music_folder(&self, folder: &MusicFolder) -> Result<()> {
        self.check()?;
        let mut folders = self.folders.lock().unwrap();
        match folders.iter_mut().find(|f| f.id == folder.id) {
            Some(existing) => {
                *existing = folder.clone();
                Ok(())
            }
            None => Err(anyhow!("no folder {}", folder.id)),
        }
    }

    fn delete_music_folder(&self, id: i32) -> Result<()> {
        self.check()?;
        self.folders.lock().unwrap().retain(|f| f.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRadioDao {
    pub radios: Mutex<Vec<InternetRadio>>,
}

impl InternetRadioDao for FakeRadioDao {
    fn all_internet_radios(&self) -> Result<Vec<InternetRadio>> {
        Ok(self.radios.lock().unwrap().clone())
    }

    fn create_internet_radio(&self, radio: &InternetRadio) -> Result<()> {
        self.radios.lock().unwrap().push(radio.clone());
        Ok(())
    }

    fn update_internet_radio(&self, radio: &InternetRadio) -> Result<()> {
        let mut radios = self.radios.lock().unwrap();
        if let Some(existing) = radios.iter_mut().find(|r| r.id == radio.id) {
            *existing = radio.clone();
        }
        Ok(())
    }

    fn delete_internet_radio(&self, id: i32) -> Result<()> {
        self.radios.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeUserDao {
    pub settings: Mutex<HashMap<String, UserSettings>>,
}

impl UserDao for FakeUserDao {
    fn user_settings(&self, username: &str) -> Result<Option<UserSettings>> {
        Ok(self.settings.lock().unwrap().get(username).cloned())
    }

    fn update_user_settings(&self, settings: &UserSettings) -> Result<()> {
        self.settings
            .lock()
            .unwrap()
            .insert(settings.username.clone(), settings.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAvatarDao {
    pub system: Vec<Avatar>,
    pub custom: Mutex<HashMap<String, Avatar>>,
}

impl AvatarDao for FakeAvatarDao {
    fn all_system_avatars(&self) -> Result<Vec<Avatar>> {
        Ok(self.system.clone())
    }

    fn system_avatar(&self, id: i32) -> Result<Option<Avatar>> {
        Ok(self.system.iter().find(|a| a.id == id).cloned())
    }

    fn custom_avatar(&self, username: &str) -> Result<Option<Avatar>> {
        Ok(self.custom.lock().unwrap().get(username).cloned())
    }

    fn set_custom_avatar(&self, avatar: Option<&Avatar>, username: &str) -> Result<()> {
        let mut custom = self.custom.lock().unwrap();
        match avatar {
            Some(a) => custom.insert(username.to_string(), a.clone()),
            None => custom.remove(username),
        };
        Ok(())
    }
}

/// Ensemble de fakes partagés avec le service
#[derive(Default, Clone)]
pub struct Fakes {
    pub folders: Arc<FakeFolderDao>,
    pub radios: Arc<FakeRadioDao>,
    pub users: Arc<FakeUserDao>,
    pub avatars: Arc<FakeAvatarDao>,
}

impl Fakes {
    pub fn daos(&self) -> Daos {
        Daos {
            music_folders: self.folders.clone(),
            internet_radios: self.radios.clone(),
            users: self.users.clone(),
            avatars: self.avatars.clone(),
        }
    }
}

/// Service en mémoire
pub fn memory_service() -> (Arc<MemoryStore>, Fakes, SettingsService) {
    let store = Arc::new(MemoryStore::new());
    let fakes = Fakes::default();
    let service = SettingsService::new(store.clone() as Arc<dyn PropertyStore>, fakes.daos())
        .unwrap();
    (store, fakes, service)
}
