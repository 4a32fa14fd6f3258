use paste_core::types::{Config, PasteRequest, Timestamp};
use paste_core::{PasteCore, PasteError, RecordStore};
use tempfile::TempDir;

fn open() -> (PasteCore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let core = PasteCore::open(Config::new(temp_dir.path())).unwrap();
    (core, temp_dir)
}

/// Verify a burn-after-reading paste serves exactly one read.
#[test]
fn test_single_view_scenario() {
    let (core, _temp) = open();
    let now = Timestamp::from_millis(1_700_000_000_000);

    let id = core
        .create(PasteRequest::new("hello", None, Some(1)), now)
        .unwrap();

    let view = core.access(&id, now).unwrap();
    assert_eq!(view.content, "hello");
    assert_eq!(view.remaining_views, Some(0));
    assert_eq!(view.expires_at, None);

    assert!(matches!(core.access(&id, now), Err(PasteError::NotFound)));
}

/// Verify a TTL paste is readable one millisecond before its deadline and deleted at it.
#[test]
fn test_ttl_scenario() {
    let (core, _temp) = open();

    let id = core
        .create(
            PasteRequest::new("x", Some(60), None),
            Timestamp::from_millis(1000),
        )
        .unwrap();

    let view = core.access(&id, Timestamp::from_millis(60_999)).unwrap();
    assert_eq!(view.expires_at.as_deref(), Some("1970-01-01T00:01:01.000Z"));

    assert!(matches!(
        core.access(&id, Timestamp::from_millis(61_000)),
        Err(PasteError::NotFound)
    ));
    assert_eq!(core.store().get(&id).unwrap(), None);
}

/// Verify pastes written by one process are readable after reopening the store.
#[test]
fn test_paste_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let now = Timestamp::from_millis(0);

    let id = {
        let core = PasteCore::open(Config::new(temp_dir.path())).unwrap();
        let id = core
            .create(PasteRequest::new("durable", None, Some(2)), now)
            .unwrap();
        core.access(&id, now).unwrap();
        id
    };

    let core = PasteCore::open(Config::new(temp_dir.path())).unwrap();
    let view = core.access(&id, now).unwrap();
    assert_eq!(view.content, "durable");
    assert_eq!(view.remaining_views, Some(0));
}

/// Verify a create request decoded from JSON goes through the same validation.
#[test]
fn test_json_request() {
    let (core, _temp) = open();
    let request: PasteRequest =
        serde_json::from_str(r#"{"content": "from json", "ttlSeconds": 30, "maxViews": null}"#)
            .unwrap();

    let id = core.create(request, Timestamp::from_millis(0)).unwrap();
    let view = serde_json::to_value(core.access(&id, Timestamp::from_millis(0)).unwrap()).unwrap();
    assert_eq!(
        view,
        serde_json::json!({
            "content": "from json",
            "remainingViews": null,
            "expiresAt": "1970-01-01T00:00:30.000Z",
        })
    );

    let bad: PasteRequest =
        serde_json::from_str(r#"{"content": "x", "ttlSeconds": "soon"}"#).unwrap();
    assert!(matches!(
        core.create(bad, Timestamp::from_millis(0)),
        Err(PasteError::InvalidTtl)
    ));
}

/// Verify a sweep deletes expired pastes that were never read again.
#[test]
fn test_sweep_reclaims_expired() {
    let (core, _temp) = open();
    let id = core
        .create(PasteRequest::new("x", Some(5), None), Timestamp::from_millis(0))
        .unwrap();

    let outcome = core.sweep(Timestamp::from_millis(5_000)).unwrap();
    assert_eq!(outcome.removed, vec![id.clone()]);
    assert_eq!(core.store().get(&id).unwrap(), None);
}
