//! SQLite-backed store behaviour.

use gatekeep::{AccessLevel, AuthError, PersistentStore, StoreConfig};

#[test]
fn test_persistent_features() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gatekeep.sqlite3");
    let store = PersistentStore::open(&path, StoreConfig::default()).unwrap();

    store.add("user", "test", AccessLevel::USER).unwrap();
    assert!(store.add("@u ser", "test", AccessLevel::USER).is_err());
    assert!(store.add("user", "", AccessLevel::USER).is_err());

    let mut user = store.login("user", "test", None).unwrap();
    user.change_password("test1").unwrap();
    assert!(!user.check_access(AccessLevel::ADMIN));

    user.log_out();
    assert!(user.change_password("test2").is_err());

    let mut user = store.login("user", "test1", None).unwrap();
    user.set_var("test", "hello").unwrap();
    user.log_out_fully();
    assert!(user.change_password("test2").is_err());

    store.close().unwrap();
}

#[test]
fn test_users_survive_reopen_but_sessions_do_not() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.sqlite3");

    {
        let store = PersistentStore::open(&path, StoreConfig::default()).unwrap();
        store.add("alice", "first", AccessLevel::USER).unwrap();
        store.add("bob", "pw", AccessLevel::USER).unwrap();
        store.add("carol", "pw", AccessLevel::USER).unwrap();

        let alice = store.login("alice", "first", Some("alice-session")).unwrap();
        alice.change_password("second").unwrap();
        alice.change_access(AccessLevel::ADMIN).unwrap();
        alice.set_var("scratch", true).unwrap();

        let mut carol = store.login("carol", "pw", None).unwrap();
        carol.delete().unwrap();
        store.close().unwrap();
    }

    let store = PersistentStore::open(&path, StoreConfig::default()).unwrap();
    assert_eq!(store.usernames(), vec!["alice", "bob"]);
    assert_eq!(store.session_count(), 0);
    assert!(matches!(
        store.user_from_id("alice-session"),
        Err(AuthError::NotFound)
    ));

    assert!(matches!(
        store.login("alice", "first", None),
        Err(AuthError::VerificationFailed)
    ));
    let alice = store.login("alice", "second", None).unwrap();
    assert_eq!(alice.access(), AccessLevel::ADMIN);
    assert!(alice.check_access(AccessLevel::ADMIN));
    assert_eq!(alice.var::<bool>("scratch"), None);
}

#[test]
fn test_password_change_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::builder()
        .allow_password_change(false)
        .build()
        .unwrap();
    let store = PersistentStore::open(dir.path().join("db.sqlite3"), config).unwrap();

    store.add("test", "test", AccessLevel::PUBLIC).unwrap();
    let user = store.login("test", "test", None).unwrap();
    assert!(matches!(
        user.change_password("test2"),
        Err(AuthError::NotAllowed)
    ));
}

#[test]
fn test_closed_store_reports_database_errors() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        PersistentStore::open(dir.path().join("db.sqlite3"), StoreConfig::default()).unwrap();
    store.close().unwrap();

    assert!(matches!(
        store.add("late", "pw", AccessLevel::USER),
        Err(AuthError::Database(_))
    ));
    assert!(!store.contains("late"));
}
