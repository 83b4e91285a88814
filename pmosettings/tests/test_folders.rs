mod common;

use common::memory_service;
use pmosettings::{MusicFolder, SettingsError, UserSettings};
use std::sync::atomic::Ordering;
use tempfile::TempDir;

/// Trois dossiers : 1 et 2 existent, 3 est absent du disque ; 2 est désactivé
fn library() -> (TempDir, common::Fakes, pmosettings::SettingsService) {
    let temp = tempfile::tempdir().unwrap();
    std::fs::create_dir(temp.path().join("rock")).unwrap();
    std::fs::create_dir(temp.path().join("jazz")).unwrap();

    let (_store, fakes, service) = memory_service();
    fakes.folders.add(1, &temp.path().join("rock"), true);
    fakes.folders.add(2, &temp.path().join("jazz"), false);
    fakes.folders.add(3, &temp.path().join("missing"), true);
    (temp, fakes, service)
}

fn ids(folders: &[MusicFolder]) -> Vec<i32> {
    folders.iter().map(|f| f.id).collect()
}

#[test]
fn test_all_music_folders_filters() {
    let (_temp, fakes, service) = library();

    assert_eq!(ids(&service.all_music_folders(false, false).unwrap()), vec![1]);
    assert_eq!(ids(&service.all_music_folders(true, false).unwrap()), vec![1, 2]);
    assert_eq!(ids(&service.all_music_folders(false, true).unwrap()), vec![1, 3]);
    assert_eq!(ids(&service.all_music_folders(true, true).unwrap()), vec![1, 2, 3]);

    // La liste brute n'est lue qu'une fois
    assert_eq!(fakes.folders.all_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_existence_is_checked_on_every_call() {
    let (temp, _fakes, service) = library();
    assert_eq!(ids(&service.all_music_folders(false, false).unwrap()), vec![1]);

    std::fs::create_dir(temp.path().join("missing")).unwrap();
    assert_eq!(ids(&service.all_music_folders(false, false).unwrap()), vec![1, 3]);
}

#[test]
fn test_user_folders_keep_assignment_order_and_are_memoized() {
    let (temp, fakes, service) = library();
    std::fs::create_dir(temp.path().join("blues")).unwrap();
    fakes.folders.add(4, &temp.path().join("blues"), true);
    fakes.folders.assign("alice", &[4, 2, 3, 1]);

    let first = service.music_folders_for_user("alice").unwrap();
    assert_eq!(ids(&first), vec![4, 1]);

    let second = service.music_folders_for_user("alice").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(fakes.folders.user_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_selected_folder_restricts_or_empties() {
    let (_temp, fakes, service) = library();
    fakes.folders.assign("alice", &[1, 3]);

    assert_eq!(
        ids(&service.music_folders_for_user_selected("alice", None).unwrap()),
        vec![1]
    );
    assert_eq!(
        ids(&service.music_folders_for_user_selected("alice", Some(1)).unwrap()),
        vec![1]
    );
    assert!(service
        .music_folders_for_user_selected("alice", Some(2))
        .unwrap()
        .is_empty());
}

#[test]
fn test_set_folders_for_user_invalidates_only_that_user() {
    let (_temp, fakes, service) = library();
    fakes.folders.assign("alice", &[]);
    fakes.folders.assign("bob", &[1]);

    assert!(service.music_folders_for_user("alice").unwrap().is_empty());
    assert_eq!(ids(&service.music_folders_for_user("bob").unwrap()), vec![1]);
    assert_eq!(fakes.folders.user_calls.load(Ordering::SeqCst), 2);

    service.set_music_folders_for_user("alice", &[1]).unwrap();

    assert_eq!(ids(&service.music_folders_for_user("alice").unwrap()), vec![1]);
    assert_eq!(ids(&service.music_folders_for_user("bob").unwrap()), vec![1]);
    assert_eq!(fakes.folders.user_calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_folder_writes_clear_all_caches() {
    let (temp, fakes, service) = library();
    fakes.folders.assign("alice", &[1, 5]);
    assert_eq!(ids(&service.music_folders_for_user("alice").unwrap()), vec![1]);

    std::fs::create_dir(temp.path().join("pop")).unwrap();
    service
        .create_music_folder(&MusicFolder::new(5, temp.path().join("pop"), "Pop", true))
        .unwrap();

    assert_eq!(ids(&service.music_folders_for_user("alice").unwrap()), vec![1, 5]);
    assert_eq!(fakes.folders.all_calls.load(Ordering::SeqCst), 2);

    let mut pop = service.music_folder_by_id(5).unwrap().unwrap();
    pop.enabled = false;
    service.update_music_folder(&pop).unwrap();
    assert_eq!(ids(&service.music_folders_for_user("alice").unwrap()), vec![1]);
    assert!(service.music_folder_by_id(5).unwrap().is_none());

    service.delete_music_folder(1).unwrap();
    assert!(service.music_folders_for_user("alice").unwrap().is_empty());
}

#[test]
fn test_dao_failure_propagates_and_is_not_cached() {
    let (_temp, fakes, service) = library();
    fakes.folders.fail.store(true, Ordering::SeqCst);

    let err = service.all_music_folders(false, false).unwrap_err();
    assert!(matches!(err, SettingsError::Dao(_)));
    assert!(service.music_folders_for_user("alice").is_err());

    fakes.folders.fail.store(false, Ordering::SeqCst);
    fakes.folders.assign("alice", &[1]);
    assert_eq!(ids(&service.all_music_folders(false, false).unwrap()), vec![1]);
    assert_eq!(ids(&service.music_folders_for_user("alice").unwrap()), vec![1]);
}

#[test]
fn test_selected_music_folder_from_user_settings() {
    let (_temp, fakes, service) = library();
    fakes.folders.assign("alice", &[1]);

    assert_eq!(service.selected_music_folder("alice").unwrap(), None);

    let mut settings = UserSettings::with_defaults("alice");
    settings.selected_music_folder_id = Some(1);
    service.update_user_settings(&settings).unwrap();
    assert_eq!(
        service.selected_music_folder("alice").unwrap().map(|f| f.id),
        Some(1)
    );

    // Dossier sélectionné mais non autorisé
    settings.selected_music_folder_id = Some(2);
    service.update_user_settings(&settings).unwrap();
    assert_eq!(service.selected_music_folder("alice").unwrap(), None);
}

#[test]
fn test_explicit_clear() {
    let (_temp, fakes, service) = library();
    service.all_music_folders(false, false).unwrap();
    service.clear_music_folder_cache();
    service.all_music_folders(false, false).unwrap();
    assert_eq!(fakes.folders.all_calls.load(Ordering::SeqCst), 2);
}
