use super::*;
use crate::core::store::MemoryStore;
use crate::types::DEFAULT_ID_LENGTH;
use serde_json::json;
use std::sync::Barrier;
use std::thread;
use tempfile::TempDir;

mod common {
    use super::*;

    pub(super) fn create_test_core() -> (PasteCore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let core = PasteCore::open(Config::new(temp_dir.path())).unwrap();
        (core, temp_dir)
    }

    pub(super) fn create_memory_core() -> PasteCore<MemoryStore> {
        PasteCore::new(MemoryStore::new(), DEFAULT_ID_LENGTH)
    }

    pub(super) fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    pub(super) fn request(value: serde_json::Value) -> PasteRequest {
        serde_json::from_value(value).unwrap()
    }
}

mod create {
    use super::common::{at, create_memory_core, create_test_core, request};
    use super::*;

    #[test]
    fn test_create_stores_fresh_record() {
        let (core, _temp) = create_test_core();

        let id = core
            .create(PasteRequest::new("hello", Some(60), Some(2)), at(1000))
            .unwrap();

        assert_eq!(id.len(), DEFAULT_ID_LENGTH);
        assert_eq!(
            core.store().get(&id).unwrap(),
            Some(PasteRecord {
                content: "hello".to_string(),
                created_at: at(1000),
                ttl_seconds: Some(60),
                max_views: Some(2),
                views: 0,
            })
        );
    }

    #[test]
    fn test_create_uses_configured_id_length() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            base_path: temp_dir.path().to_path_buf(),
            id_length: 16,
        };
        let core = PasteCore::open(config).unwrap();

        let id = core.create(PasteRequest::new("x", None, None), at(0)).unwrap();
        assert_eq!(id.len(), 16);
    }

    #[test]
    fn test_each_create_gets_a_new_id() {
        let core = create_memory_core();
        let a = core.create(PasteRequest::new("same", None, None), at(0)).unwrap();
        let b = core.create(PasteRequest::new("same", None, None), at(0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(core.store().len(), 2);
    }

    #[test]
    fn test_invalid_requests_have_no_store_effect() {
        let core = create_memory_core();

        let cases = [
            (json!({"content": "   "}), "content"),
            (json!({"content": "x", "ttlSeconds": 0}), "ttl"),
            (json!({"content": "x", "ttlSeconds": -1}), "ttl"),
            (json!({"content": "x", "ttlSeconds": 2.5}), "ttl"),
            (json!({"content": "x", "maxViews": 0}), "views"),
            (json!({"content": "x", "maxViews": -1}), "views"),
            (json!({"content": "x", "maxViews": "3"}), "views"),
        ];

        for (body, expected) in cases {
            let err = core.create(request(body.clone()), at(0)).unwrap_err();
            let matched = match expected {
                "content" => matches!(err, PasteError::InvalidContent),
                "ttl" => matches!(err, PasteError::InvalidTtl),
                _ => matches!(err, PasteError::InvalidMaxViews),
            };
            assert!(matched, "{body} gave {err:?}");
        }

        assert!(core.store().is_empty());
    }
}

mod access {
    use super::common::{at, create_memory_core, create_test_core};
    use super::*;

    #[test]
    fn test_create_then_access_returns_content() {
        let (core, _temp) = create_test_core();
        let id = core
            .create(PasteRequest::new("line one\nline two", None, None), at(0))
            .unwrap();

        let view = core.access(&id, at(1)).unwrap();
        assert_eq!(
            view,
            PasteView {
                content: "line one\nline two".to_string(),
                remaining_views: None,
                expires_at: None,
            }
        );
    }

    #[test]
    fn test_single_view_paste_is_burned_after_reading() {
        let (core, _temp) = create_test_core();
        let id = core
            .create(PasteRequest::new("hello", None, Some(1)), at(0))
            .unwrap();

        assert_eq!(
            core.access(&id, at(0)).unwrap(),
            PasteView {
                content: "hello".to_string(),
                remaining_views: Some(0),
                expires_at: None,
            }
        );
        assert!(matches!(core.access(&id, at(0)), Err(PasteError::NotFound)));
    }

    #[test]
    fn test_view_limit_counts_down_to_zero() {
        let (core, _temp) = create_test_core();
        let n = 5;
        let id = core
            .create(PasteRequest::new("x", None, Some(n)), at(0))
            .unwrap();

        for i in 1..=n {
            let view = core.access(&id, at(0)).unwrap();
            assert_eq!(view.remaining_views, Some(n - i));
        }
        assert!(matches!(core.access(&id, at(0)), Err(PasteError::NotFound)));
    }

    #[test]
    fn test_exhausted_paste_is_retained_unchanged() {
        let (core, _temp) = create_test_core();
        let id = core
            .create(PasteRequest::new("x", None, Some(2)), at(0))
            .unwrap();
        core.access(&id, at(0)).unwrap();
        core.access(&id, at(0)).unwrap();

        let before = core.store().get(&id).unwrap().unwrap();
        for _ in 0..3 {
            assert!(matches!(core.access(&id, at(0)), Err(PasteError::NotFound)));
        }
        assert_eq!(core.store().get(&id).unwrap(), Some(before));
        assert_eq!(core.store().get(&id).unwrap().unwrap().views, 2);
    }

    #[test]
    fn test_ttl_boundary_deletes_on_access() {
        let (core, _temp) = create_test_core();
        let id = core
            .create(PasteRequest::new("x", Some(60), None), at(1000))
            .unwrap();

        let view = core.access(&id, at(60_999)).unwrap();
        assert_eq!(view.expires_at.as_deref(), Some("1970-01-01T00:01:01.000Z"));
        assert_eq!(view.remaining_views, None);

        assert!(matches!(core.access(&id, at(61_000)), Err(PasteError::NotFound)));
        assert_eq!(core.store().get(&id).unwrap(), None);
    }

    #[test]
    fn test_expired_exhausted_paste_is_deleted() {
        let core = create_memory_core();
        let id = core
            .create(PasteRequest::new("x", Some(10), Some(1)), at(0))
            .unwrap();
        core.access(&id, at(0)).unwrap();
        assert!(matches!(core.access(&id, at(5_000)), Err(PasteError::NotFound)));
        assert!(core.store().get(&id).unwrap().is_some());

        assert!(matches!(core.access(&id, at(10_000)), Err(PasteError::NotFound)));
        assert!(core.store().is_empty());
    }

    #[test]
    fn test_unlimited_paste_still_counts_views() {
        let core = create_memory_core();
        let id = core.create(PasteRequest::new("x", None, None), at(0)).unwrap();
        for _ in 0..4 {
            core.access(&id, at(0)).unwrap();
        }
        assert_eq!(core.store().get(&id).unwrap().unwrap().views, 4);
    }

    #[test]
    fn test_unknown_and_malformed_ids_are_not_found() {
        let core = create_memory_core();
        for id in ["nosuchid", "", "../../etc/passwd", "a b"] {
            assert!(matches!(core.access(id, at(0)), Err(PasteError::NotFound)));
        }
        assert!(core.store().is_empty());
    }

    #[test]
    fn test_not_found_is_idempotent() {
        let (core, _temp) = create_test_core();
        let id = core
            .create(PasteRequest::new("x", Some(1), None), at(0))
            .unwrap();

        for _ in 0..3 {
            assert!(matches!(core.access(&id, at(1_000)), Err(PasteError::NotFound)));
            assert_eq!(core.store().get(&id).unwrap(), None);
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let core = create_memory_core();
        let id = core
            .create(PasteRequest::new("x", None, Some(1)), at(0))
            .unwrap();

        assert_eq!(core.peek(&id).unwrap().unwrap().views, 0);
        assert_eq!(core.peek(&id).unwrap().unwrap().views, 0);
        assert_eq!(core.peek("bad id").unwrap(), None);
        core.access(&id, at(0)).unwrap();
    }
}

mod concurrency {
    use super::common::{at, create_memory_core, create_test_core};
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    const READERS: usize = 8;
    const ROUNDS: usize = 25;

    /// Races `READERS` threads against one paste and counts successful reads.
    fn race<S: RecordStore>(core: &PasteCore<S>, id: &PasteId) -> usize {
        let barrier = Barrier::new(READERS);

        thread::scope(|scope| {
            let handles: Vec<_> = (0..READERS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        core.access(id, at(0))
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|result| match result {
                    Ok(_) => true,
                    Err(PasteError::NotFound) => false,
                    Err(e) => panic!("unexpected error: {e}"),
                })
                .count()
        })
    }

    #[test]
    fn test_last_view_is_served_exactly_once_redb() {
        let (core, _temp) = create_test_core();
        for _ in 0..ROUNDS {
            let id = core
                .create(PasteRequest::new("secret", None, Some(1)), at(0))
                .unwrap();
            assert_eq!(race(&core, &id), 1);
            assert_eq!(core.store().get(&id).unwrap().unwrap().views, 1);
        }
    }

    #[test]
    fn test_last_view_is_served_exactly_once_memory() {
        let core = create_memory_core();
        for _ in 0..ROUNDS {
            let id = core
                .create(PasteRequest::new("secret", None, Some(1)), at(0))
                .unwrap();
            assert_eq!(race(&core, &id), 1);
        }
    }

    #[test]
    fn test_view_limit_holds_under_contention() {
        let (core, _temp) = create_test_core();
        for max_views in [2u64, 3, 5] {
            let id = core
                .create(PasteRequest::new("x", None, Some(max_views)), at(0))
                .unwrap();
            assert_eq!(race(&core, &id), max_views as usize);
            assert_eq!(core.store().get(&id).unwrap().unwrap().views, max_views);
        }
    }

    #[test]
    fn test_unlimited_paste_counts_every_concurrent_view() {
        let core = create_memory_core();
        let id = core.create(PasteRequest::new("x", None, None), at(0)).unwrap();
        assert_eq!(race(&core, &id), READERS);
        assert_eq!(
            core.store().get(&id).unwrap().unwrap().views,
            READERS as u64
        );
    }

    /// Runs `access(other)` on another thread while an `update` on `held` is
    /// still inside its closure. Returns `None` if the access did not finish
    /// while the update was held open.
    fn access_during_update<S: RecordStore>(
        core: &PasteCore<S>,
        held: &PasteId,
        other: &str,
    ) -> Option<Result<PasteView, PasteError>> {
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            core.store()
                .update(held, |_| {
                    scope.spawn(move || {
                        let _ = tx.send(core.access(other, at(0)));
                    });
                    (Mutation::Keep, rx.recv_timeout(Duration::from_secs(5)).ok())
                })
                .unwrap()
        })
    }

    #[test]
    fn test_update_does_not_block_access_to_other_id_memory() {
        let core = create_memory_core();
        let held = core.create(PasteRequest::new("a", None, None), at(0)).unwrap();
        let other = core
            .create(PasteRequest::new("b", None, Some(2)), at(0))
            .unwrap();

        let view = access_during_update(&core, &held, &other)
            .expect("access to another id waited for the update")
            .unwrap();
        assert_eq!(view.content, "b");
        assert_eq!(view.remaining_views, Some(1));
        assert_eq!(core.store().get(&other).unwrap().unwrap().views, 1);
        assert_eq!(core.store().get(&held).unwrap().unwrap().views, 0);
    }

    #[test]
    fn test_update_does_not_block_missing_or_exhausted_access_redb() {
        let (core, _temp) = create_test_core();
        let held = core.create(PasteRequest::new("a", None, None), at(0)).unwrap();
        let exhausted = core
            .create(PasteRequest::new("b", None, Some(1)), at(0))
            .unwrap();
        core.access(&exhausted, at(0)).unwrap();

        for other in [exhausted.as_str(), "missing"] {
            let result = access_during_update(&core, &held, other)
                .expect("lookup that changes nothing waited for the writer");
            assert!(matches!(result, Err(PasteError::NotFound)), "{other}");
        }
        assert_eq!(core.store().get(&exhausted).unwrap().unwrap().views, 1);
    }
}

mod maintenance {
    use super::common::{at, create_memory_core, create_test_core};
    use super::*;

    #[test]
    fn test_sweep_removes_only_expired_pastes() {
        let (core, _temp) = create_test_core();
        let short = core
            .create(PasteRequest::new("short", Some(10), None), at(0))
            .unwrap();
        let long = core
            .create(PasteRequest::new("long", Some(100), None), at(0))
            .unwrap();
        let exhausted = core
            .create(PasteRequest::new("once", None, Some(1)), at(0))
            .unwrap();
        core.access(&exhausted, at(0)).unwrap();

        let outcome = core.sweep(at(10_000)).unwrap();
        assert_eq!(outcome.removed, vec![short.clone()]);

        assert_eq!(core.store().get(&short).unwrap(), None);
        assert!(core.store().get(&long).unwrap().is_some());
        assert!(core.store().get(&exhausted).unwrap().is_some());
    }

    #[test]
    fn test_unswept_expired_paste_behaves_like_swept_one() {
        let core = create_memory_core();
        let id = core
            .create(PasteRequest::new("x", Some(1), None), at(0))
            .unwrap();

        // Still stored until something looks at it.
        assert!(core.store().get(&id).unwrap().is_some());
        assert!(matches!(core.access(&id, at(1_000)), Err(PasteError::NotFound)));
        assert!(core.sweep(at(1_000)).unwrap().removed.is_empty());
    }

    #[test]
    fn test_maintenance_respects_interval() {
        let (core, _temp) = create_test_core();
        let interval = Duration::from_secs(60);

        assert!(core.should_sweep(at(0), interval).unwrap());
        assert!(core.maintenance(at(0), interval).unwrap().is_some());

        assert!(!core.should_sweep(at(59_999), interval).unwrap());
        assert!(core.maintenance(at(59_999), interval).unwrap().is_none());

        assert!(core.maintenance(at(60_000), interval).unwrap().is_some());
        assert_eq!(core.store().last_sweep_at().unwrap(), Some(at(60_000)));

        // Clock moved backwards.
        assert!(core.should_sweep(at(1_000), interval).unwrap());
    }

    #[test]
    fn test_ping_reaches_store() {
        let (core, _temp) = create_test_core();
        core.ping().unwrap();
    }
}
