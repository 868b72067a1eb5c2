//! Single-key operations, open options and store isolation.

mod common;

use std::sync::Arc;
use std::thread;

use kvsqlite::{Connection, Db, Options, StatusKind, WriteOptions, MEMORY_PATH};

#[test]
fn test_put_get_del_on_ephemeral_store() {
    common::init_tracing();
    let db = common::open::<i32, i32>("");
    let opts = WriteOptions::default();

    db.put(&opts, &1, &100).expect("put");
    assert_eq!(db.get(&1).expect("get"), 100);

    db.del(&opts, &1).expect("del");
    let err = db.get(&1).expect_err("deleted key");
    assert_eq!(err.kind(), StatusKind::NotFound);
    assert_eq!(err.native_error_code(), "101");
    assert_eq!(err.to_string(), "Not found. ");
}

#[test]
fn test_put_replaces_existing_value() {
    let (_dir, path) = common::temp_store();
    let db = common::open::<String, String>(&path);
    let opts = WriteOptions::default();

    db.put(&opts, "key1", "first").expect("put");
    db.put(&opts, "key1", "second").expect("put again");
    assert_eq!(db.get("key1").expect("get"), "second");
}

#[test]
fn test_missing_key_is_not_found() {
    let db = common::open::<String, Vec<u8>>(MEMORY_PATH);
    let err = db.get("never-written").expect_err("missing key");
    assert!(err.is_not_found());
    assert_eq!(err.database_text(), "Not found.");
}

#[test]
fn test_deleting_absent_key_succeeds() {
    let db = common::open::<i64, i64>(MEMORY_PATH);
    db.del(&WriteOptions::default(), &42).expect("del absent key");
    db.del(&WriteOptions::sync(), &42).expect("del absent key again");
}

#[test]
fn test_sync_and_async_writes_interleave() {
    let (_dir, path) = common::temp_store();
    let db = common::open::<i32, String>(&path);

    for i in 0..10 {
        let opts = if i % 2 == 0 {
            WriteOptions::sync()
        } else {
            WriteOptions::default()
        };
        db.put(&opts, &i, &format!("v{i}")).expect("put");
    }
    for i in 0..10 {
        assert_eq!(db.get(&i).expect("get"), format!("v{i}"));
    }
}

#[test]
fn test_data_survives_reopen() {
    let (_dir, path) = common::temp_store();
    {
        let db = common::open::<String, i64>(&path);
        db.put(&WriteOptions::sync(), "answer", &42).expect("put");
    }
    let db = common::open::<String, i64>(&path);
    assert_eq!(db.get("answer").expect("get after reopen"), 42);
}

#[test]
fn test_explicit_close_then_reopen() {
    let (_dir, path) = common::temp_store();
    let db = common::open::<i32, i32>(&path);
    db.put(&WriteOptions::default(), &7, &8).expect("put");
    db.close();
    assert!(db.is_closed());
    assert_eq!(
        db.get(&7).expect_err("closed").kind(),
        StatusKind::InvalidArgument
    );

    let db = common::open::<i32, i32>(&path);
    assert_eq!(db.get(&7).expect("get"), 8);
}

#[test]
fn test_error_if_exists_rejects_existing_file() {
    let (_dir, path) = common::temp_store();
    drop(common::open::<i32, i32>(&path));
    assert!(path.exists());

    let options = Options {
        error_if_exists: true,
        ..Options::default()
    };
    let err = Db::<i32, i32>::open(&options, &path).expect_err("file exists");
    assert_eq!(err.kind(), StatusKind::IoError);
    assert!(
        err.database_text().starts_with("File already exist:"),
        "{err:?}"
    );
}

#[test]
fn test_error_if_exists_accepts_new_file() {
    let (_dir, path) = common::temp_store();
    let options = Options {
        error_if_exists: true,
        ..Options::default()
    };
    let db = Db::<i32, i32>::open(&options, &path).expect("new file");
    db.put(&WriteOptions::default(), &1, &1).expect("put");
}

#[test]
fn test_no_create_fails_for_missing_file() {
    let (_dir, path) = common::temp_store();
    let options = Options {
        create_if_missing: false,
        ..Options::default()
    };
    let err = Db::<i32, i32>::open(&options, &path).expect_err("missing file");
    assert_eq!(err.kind(), StatusKind::IoError);
    assert!(err.database_text().starts_with("Fail to open:"), "{err:?}");
    assert!(!path.exists());
}

#[test]
fn test_no_create_opens_existing_file() {
    let (_dir, path) = common::temp_store();
    {
        let db = common::open::<i32, i32>(&path);
        db.put(&WriteOptions::sync(), &3, &4).expect("put");
    }
    let options = Options {
        create_if_missing: false,
        ..Options::default()
    };
    let db = Db::<i32, i32>::open(&options, &path).expect("existing file");
    assert_eq!(db.get(&3).expect("get"), 4);
}

#[test]
fn test_transient_stores_are_isolated() {
    let a = common::open::<i32, i32>(MEMORY_PATH);
    let b = common::open::<i32, i32>(MEMORY_PATH);
    let c = common::open::<i32, i32>("");
    let d = common::open::<i32, i32>("");

    a.put(&WriteOptions::default(), &1, &1).expect("put a");
    c.put(&WriteOptions::default(), &1, &3).expect("put c");

    assert!(b.get(&1).expect_err("b is empty").is_not_found());
    assert!(d.get(&1).expect_err("d is empty").is_not_found());
    assert_eq!(a.get(&1).expect("get a"), 1);
    assert_eq!(c.get(&1).expect("get c"), 3);
}

#[test]
fn test_distinct_files_are_isolated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = common::open::<String, String>(dir.path().join("first.db"));
    let second = common::open::<String, String>(dir.path().join("second.db"));

    first.put(&WriteOptions::default(), "k", "first").expect("put");
    second.put(&WriteOptions::default(), "k", "second").expect("put");

    assert_eq!(first.get("k").expect("get"), "first");
    assert_eq!(second.get("k").expect("get"), "second");
}

#[test]
fn test_key_types_do_not_collide() {
    let (_dir, path) = common::temp_store();
    let text = common::open::<String, i32>(&path);
    text.put(&WriteOptions::default(), "1", &10).expect("put text key");
    drop(text);

    // The same file read with integer keys: 1 and '1' are different keys.
    let ints = common::open::<i32, i32>(&path);
    assert!(ints.get(&1).expect_err("integer key").is_not_found());
    ints.put(&WriteOptions::default(), &1, &20).expect("put int key");
    drop(ints);

    let text = common::open::<String, i32>(&path);
    assert_eq!(text.get("1").expect("get text key"), 10);
}

#[test]
fn test_failed_put_leaves_store_usable() {
    let (_dir, path) = common::temp_store();
    let db = common::open::<i32, i32>(&path);
    Connection::open(&path, false)
        .expect("second connection")
        .execute_batch(
            "CREATE TRIGGER reject_13 BEFORE INSERT ON KVTable WHEN NEW.key = 13 \
             BEGIN SELECT RAISE(ABORT, 'key 13 rejected'); END;",
        )
        .expect("create trigger");

    let err = db
        .put(&WriteOptions::default(), &13, &1)
        .expect_err("trigger rejects key");
    assert_eq!(err.kind(), StatusKind::UnknownError);
    assert_eq!(err.database_text(), "Fail to sqlite3_step.");
    assert!(err.driver_text().contains("key 13 rejected"), "{err:?}");

    db.put(&WriteOptions::default(), &12, &1).expect("next put");
    assert_eq!(db.get(&12).expect("get"), 1);
    assert!(db.get(&13).expect_err("rejected key").is_not_found());
}

#[test]
fn test_shared_between_threads() {
    let db = Arc::new(common::open::<i64, String>(MEMORY_PATH));

    let handles: Vec<_> = (0..4_i64)
        .map(|worker| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..50_i64 {
                    let key = worker * 1000 + i;
                    let opts = if i % 10 == 0 {
                        WriteOptions::sync()
                    } else {
                        WriteOptions::default()
                    };
                    db.put(&opts, &key, &format!("{worker}:{i}")).expect("put");
                    assert_eq!(db.get(&key).expect("get"), format!("{worker}:{i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    for worker in 0..4_i64 {
        for i in 0..50_i64 {
            assert_eq!(
                db.get(&(worker * 1000 + i)).expect("get"),
                format!("{worker}:{i}")
            );
        }
    }
}
