use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use kas_core::{
    NewTransaction, Transaction, TransactionType, ValidationError, category_breakdown,
    has_any_data, monthly_totals, overall_balance, time_series,
};
use kas_store::{
    ChangeKind, Confirm, Decision, DestructiveIntent, ExportDocument, ExportFormat, FileStorage,
    ImportMode, MemoryStorage, STORAGE_KEY, TransactionStore, read_export, write_export,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn may(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn clock(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 7, 10, minute, 0).unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("kas-it-{name}-{}-{nanos}", std::process::id()))
}

fn may_store() -> TransactionStore<MemoryStorage> {
    let mut store = TransactionStore::load(MemoryStorage::new());
    store
        .add_at(
            NewTransaction::new(TransactionType::Income, "Kas", 100_000.0).with_date(may(1)),
            clock(0),
        )
        .unwrap();
    store
        .add_at(
            NewTransaction::new(TransactionType::Expense, "Makanan", 40_000.0).with_date(may(1)),
            clock(1),
        )
        .unwrap();
    store
}

/// Records a decision and remembers which intents it was asked about.
struct Recorder {
    answer: Decision,
    asked: Vec<DestructiveIntent>,
}

impl Confirm for Recorder {
    fn confirm(&mut self, intent: &DestructiveIntent) -> Decision {
        self.asked.push(*intent);
        self.answer
    }
}

#[test]
fn test_may_dashboard_scenario() {
    let store = may_store();
    let snap = store.snapshot();

    let totals = monthly_totals(snap, may(15));
    assert_eq!(totals.total_income, 100_000.0);
    assert_eq!(totals.total_expense, 40_000.0);
    assert_eq!(overall_balance(snap), 60_000.0);

    let series = time_series(snap, 7, may(7));
    assert_eq!(series.len(), 7);
    assert_eq!(series.first().unwrap().date, may(1));
    assert_eq!(series.last().unwrap().date, may(7));
    assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    assert!(has_any_data(&series));
}

#[test]
fn test_add_grows_by_one_and_goes_first() {
    let mut store = may_store();
    let before = store.len();

    let change = store
        .add_at(
            NewTransaction::new(TransactionType::Expense, "Tagihan", 250_000.0)
                .with_description("listrik"),
            clock(2),
        )
        .unwrap();

    assert_eq!(change.len, before + 1);
    assert_eq!(store.len(), before + 1);
    let ChangeKind::Added(id) = change.kind else {
        panic!("expected an add");
    };
    assert_eq!(store.snapshot()[0].id, id);
    assert_eq!(store.snapshot()[0].description, "listrik");
}

#[test]
fn test_negative_amount_rejected_snapshot_unchanged() {
    let mut store = may_store();
    let before: Vec<Transaction> = store.snapshot().to_vec();

    let err = store
        .add_at(NewTransaction::new(TransactionType::Income, "Kas", -5.0), clock(3))
        .unwrap_err();
    assert_eq!(err, ValidationError::NonPositiveAmount(-5.0));
    assert_eq!(store.snapshot(), before.as_slice());

    let err = store
        .add_at(NewTransaction::new(TransactionType::Income, "Kas", f64::NAN), clock(3))
        .unwrap_err();
    assert_eq!(err, ValidationError::NonNumericAmount);
    assert_eq!(store.snapshot(), before.as_slice());
}

#[test]
fn test_remove_present_and_absent() {
    let mut store = may_store();
    let target = store.snapshot()[1].id;

    let change = store.remove(target);
    assert_eq!(change.kind, ChangeKind::Removed { id: target, found: true });
    assert!(store.snapshot().iter().all(|t| t.id != target));

    let before: Vec<Transaction> = store.snapshot().to_vec();
    let change = store.remove(987_654);
    assert_eq!(change.kind, ChangeKind::Removed { id: 987_654, found: false });
    assert_eq!(store.snapshot(), before.as_slice());
}

#[test]
fn test_clear_always_empties() {
    let mut store = may_store();
    store.clear();
    assert!(store.snapshot().is_empty());

    // clearing an empty store is fine too
    let change = store.clear();
    assert_eq!(change.kind, ChangeKind::Cleared { removed: 0 });
    assert!(store.is_empty());
}

#[test]
fn test_confirmation_gates_destructive_ops() {
    let mut store = may_store();
    let id = store.snapshot()[0].id;

    let mut no = Recorder {
        answer: Decision::Abort,
        asked: Vec::new(),
    };
    let intent = store.request_remove(id);
    assert!(store.confirm_and_resolve(intent, &mut no).is_none());
    let intent = store.request_clear();
    assert!(store.confirm_and_resolve(intent, &mut no).is_none());
    assert_eq!(no.asked, vec![DestructiveIntent::RemoveOne(id), DestructiveIntent::ClearAll]);
    assert_eq!(store.len(), 2);

    let mut yes = Decision::Proceed;
    let intent = store.request_remove(id);
    let change = store.confirm_and_resolve(intent, &mut yes).unwrap();
    assert_eq!(change.kind, ChangeKind::Removed { id, found: true });
    assert_eq!(store.len(), 1);
}

#[test]
fn test_empty_breakdown_and_has_any_data() {
    let empty: Vec<Transaction> = Vec::new();
    assert!(category_breakdown(&empty, TransactionType::Expense).is_empty());
    assert!(!has_any_data(&HashMap::<String, f64>::new()));
}

#[test]
fn test_reload_from_file_storage() {
    let dir = scratch_dir("reload");
    {
        let mut store = TransactionStore::load(FileStorage::new(&dir));
        store
            .add_at(
                NewTransaction::new(TransactionType::Income, "Penjualan", 75_000.0).with_date(may(3)),
                clock(0),
            )
            .unwrap();
        assert!(store.storage().path_for(STORAGE_KEY).exists());
    }

    let reloaded = TransactionStore::load(FileStorage::new(&dir));
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.snapshot()[0].category, "Penjualan");
    assert_eq!(reloaded.snapshot()[0].date, may(3));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_reload_sees_remove_and_clear() {
    let dir = scratch_dir("reload-delete");
    let keep;
    {
        let mut store = TransactionStore::load(FileStorage::new(&dir));
        store
            .add_at(NewTransaction::new(TransactionType::Income, "Kas", 10.0), clock(0))
            .unwrap();
        store
            .add_at(NewTransaction::new(TransactionType::Expense, "Tagihan", 4.0), clock(1))
            .unwrap();
        keep = store.snapshot()[1].id;
        let newest = store.snapshot()[0].id;
        store.remove(newest);
    }

    let mut reloaded = TransactionStore::load(FileStorage::new(&dir));
    let ids: Vec<i64> = reloaded.snapshot().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![keep]);

    let intent = reloaded.request_clear();
    let change = reloaded.resolve(intent, Decision::Proceed).unwrap();
    assert!(change.persisted());
    drop(reloaded);

    assert!(TransactionStore::load(FileStorage::new(&dir)).is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_corrupt_file_loads_empty() {
    let dir = scratch_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{STORAGE_KEY}.json")), "[{\"id\": 1, \"type\": \"gift\"}]").unwrap();

    let store = TransactionStore::load(FileStorage::new(&dir));
    assert!(store.is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_export_import_roundtrip() {
    let source = may_store();
    let dir = scratch_dir("export");

    let path = write_export(&dir, source.snapshot(), ExportFormat::Json, clock(5), may(7)).unwrap();
    assert_eq!(path.file_name().unwrap(), "kas-virtual-export-2024-05-07.json");

    let doc = read_export(&path, clock(6)).unwrap();
    assert_eq!(doc.export_date, clock(5));

    let mut target = TransactionStore::load(MemoryStorage::new());
    let change = target.import(doc.transactions, ImportMode::Merge);
    assert_eq!(change.kind, ChangeKind::Imported { added: 2, skipped: 0 });

    let mut expected = source.snapshot().to_vec();
    let mut actual = target.snapshot().to_vec();
    expected.sort_by_key(|t| t.id);
    actual.sort_by_key(|t| t.id);
    assert_eq!(actual, expected);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_import_merge_skips_known_ids_and_invalid_records() {
    let mut store = may_store();
    let existing = store.snapshot()[0].clone();

    let mut bad = existing.clone();
    bad.id = 1;
    bad.amount = 0.0;

    let mut fresh = existing.clone();
    fresh.id = 2;

    let change = store.import(vec![existing, bad, fresh], ImportMode::Merge);
    assert_eq!(change.kind, ChangeKind::Imported { added: 1, skipped: 2 });
    assert_eq!(store.len(), 3);
    assert_eq!(store.snapshot()[0].id, 2);
}

#[test]
fn test_import_replace_then_add_gets_fresh_id() {
    let mut store = may_store();
    let doc = ExportDocument::from_json(
        r#"{"transactions":[{"id":9999999999999,"type":"expense","category":"Hiburan",
            "amount":15000,"description":"bioskop","date":"2024-05-02",
            "createdAt":"2024-05-02T12:00:00Z"}],"exportDate":"2024-05-03T00:00:00Z"}"#,
        clock(0),
    )
    .unwrap();

    let change = store.import(doc.transactions, ImportMode::Replace);
    assert_eq!(change.len, 1);

    let change = store
        .add_at(NewTransaction::new(TransactionType::Income, "Bonus", 1.0), clock(9))
        .unwrap();
    assert_eq!(change.kind, ChangeKind::Added(10_000_000_000_000));
}
