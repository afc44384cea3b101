//! Record store integration tests.

use chrono::DateTime;
use prakriti_records_core::storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
use prakriti_records_core::{PatientForm, PatientRecord, RecordStore, StoreConfig};
use proptest::prelude::*;

fn make_patient(id: &str, name: &str) -> PatientRecord {
    let mut patient = PatientRecord::new(
        id.to_string(),
        name.to_string(),
        52,
        "Female".to_string(),
        "+91 98450 12345".to_string(),
        "Vata".to_string(),
    );
    patient.email = Some(format!("{}@example.com", name.to_lowercase()));
    patient
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn millis(ts: &str) -> i64 {
    DateTime::parse_from_rfc3339(ts).unwrap().timestamp_millis()
}

#[test]
fn test_empty_store_lists_nothing() {
    let store = RecordStore::new(MemoryStorage::new());
    assert!(store.list_all().is_empty());
    assert!(store.find_by_id("PAT-0-0").is_none());
}

#[test]
fn test_fresh_save_sets_equal_timestamps() {
    let store = RecordStore::new(MemoryStorage::new());
    let patient = make_patient("PAT-100-1", "Anita");

    assert!(store.save(patient.clone()));

    let stored = store.find_by_id("PAT-100-1").unwrap();
    assert_eq!(stored.full_name, patient.full_name);
    assert_eq!(stored.age, patient.age);
    assert_eq!(stored.email, patient.email);
    assert!(stored.created_at.is_some());
    assert_eq!(stored.created_at, stored.last_updated);
}

#[test]
fn test_resave_keeps_created_at() {
    init_tracing();
    let store = RecordStore::new(MemoryStorage::new());
    store.save(make_patient("PAT-100-1", "Anita"));
    let original = store.find_by_id("PAT-100-1").unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));

    let mut edited = make_patient("PAT-100-1", "Anita");
    edited.contact_number = "080 2345 6789".to_string();
    assert!(store.save(edited));

    let updated = store.find_by_id("PAT-100-1").unwrap();
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.contact_number, "080 2345 6789");

    let created = millis(updated.created_at.as_deref().unwrap());
    let refreshed = millis(updated.last_updated.as_deref().unwrap());
    assert!(refreshed > created);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_delete_twice_is_idempotent() {
    let store = RecordStore::new(MemoryStorage::new());
    store.save(make_patient("PAT-1-1", "Anita"));
    store.save(make_patient("PAT-2-2", "Bhavna"));

    assert!(store.delete("PAT-1-1"));
    assert_eq!(store.len(), 1);
    assert!(store.delete("PAT-1-1"));
    assert_eq!(store.len(), 1);
    assert!(store.find_by_id("PAT-1-1").is_none());
    assert!(store.find_by_id("PAT-2-2").is_some());
}

#[test]
fn test_delete_removes_duplicates() {
    let storage = MemoryStorage::new();
    storage
        .write(
            "patients",
            r#"[{"patientId":"PAT-1-1","fullName":"A"},{"patientId":"PAT-1-1","fullName":"B"}]"#,
        )
        .unwrap();
    let store = RecordStore::new(storage);

    // Lookup and update hit the first occurrence
    assert_eq!(store.find_by_id("PAT-1-1").unwrap().full_name, "A");

    assert!(store.delete("PAT-1-1"));
    assert!(store.is_empty());
}

#[test]
fn test_stored_layout_is_camel_case_array() {
    let store = RecordStore::new(MemoryStorage::new());
    store.save(make_patient("PAT-1-1", "Anita"));

    let raw = store.storage().read("patients").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value.as_array().unwrap()[0];
    assert_eq!(entry["patientId"], "PAT-1-1");
    assert_eq!(entry["contactNumber"], "+91 98450 12345");
    assert!(entry["createdAt"].is_string());
    assert!(entry["lastUpdated"].is_string());
}

#[test]
fn test_merge_keeps_unknown_fields() {
    let storage = MemoryStorage::new();
    storage
        .write(
            "patients",
            r#"[{"patientId":"PAT-1-1","fullName":"Anita","age":52,"gender":"Female",
                "contactNumber":"9845012345","prakritiType":"Vata",
                "createdAt":"2024-03-01T10:00:00.000Z","lastUpdated":"2024-03-01T10:00:00.000Z",
                "dietaryNotes":"avoid cold foods"}]"#,
        )
        .unwrap();
    let store = RecordStore::new(storage);

    let mut edited = make_patient("PAT-1-1", "Anita");
    edited.weight = Some(60.0);
    assert!(store.save(edited));

    let stored = store.find_by_id("PAT-1-1").unwrap();
    assert_eq!(stored.extra["dietaryNotes"], "avoid cold foods");
    assert_eq!(stored.weight, Some(60.0));
    assert_eq!(stored.created_at.as_deref(), Some("2024-03-01T10:00:00.000Z"));
    assert!(millis(stored.last_updated.as_deref().unwrap()) > millis("2024-03-01T10:00:00.000Z"));
}

#[test]
fn test_writes_keep_undecodable_entries() {
    let storage = MemoryStorage::new();
    let legacy = r#"{"patientId":"PAT-1-1","fullName":["Asha"],"gender":null}"#;
    storage
        .write(
            "patients",
            &format!(r#"[{},{{"patientId":"PAT-2-2","fullName":"B"}}]"#, legacy),
        )
        .unwrap();
    let store = RecordStore::new(storage);
    let legacy: serde_json::Value = serde_json::from_str(legacy).unwrap();

    // Not listable, but still stored
    assert!(store.find_by_id("PAT-1-1").is_none());

    assert!(store.save(make_patient("PAT-3-3", "Chitra")));
    assert!(store.delete("PAT-2-2"));

    let raw = store.storage().read("patients").unwrap().unwrap();
    let entries: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], legacy);
    assert_eq!(entries[1]["patientId"], "PAT-3-3");
}

#[test]
fn test_null_fields_do_not_hide_records() {
    let storage = MemoryStorage::new();
    storage
        .write(
            "patients",
            r#"[{"patientId":"PAT-1-1","fullName":"Asha","gender":null},{"patientId":"PAT-2-2","fullName":"B"}]"#,
        )
        .unwrap();
    let store = RecordStore::new(storage);

    assert!(store.delete("PAT-2-2"));

    let remaining = store.list_all();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].patient_id, "PAT-1-1");
    assert!(remaining[0].gender.is_empty());
}

#[test]
fn test_legacy_record_created_at_backfilled_to_now() {
    let storage = MemoryStorage::new();
    storage
        .write("patients", r#"[{"patientId":"PAT-1-1","fullName":"Asha"}]"#)
        .unwrap();
    let store = RecordStore::new(storage);

    let mut incoming = make_patient("PAT-1-1", "Asha");
    incoming.created_at = Some("2099-01-01T00:00:00.000Z".to_string());
    assert!(store.save(incoming));

    let stored = store.find_by_id("PAT-1-1").unwrap();
    assert_eq!(stored.created_at, stored.last_updated);
    let created = millis(stored.created_at.as_deref().unwrap());
    assert!(created < millis("2099-01-01T00:00:00.000Z"));
}

#[test]
fn test_update_ignores_incoming_created_at() {
    let store = RecordStore::new(MemoryStorage::new());
    store.save(make_patient("PAT-1-1", "Asha"));
    let original = store.find_by_id("PAT-1-1").unwrap();

    let mut incoming = make_patient("PAT-1-1", "Asha");
    incoming.created_at = Some("2099-01-01T00:00:00.000Z".to_string());
    incoming.email = None;
    assert!(store.save(incoming));

    let stored = store.find_by_id("PAT-1-1").unwrap();
    assert_eq!(stored.created_at, original.created_at);
    // Unset optionals keep the stored value
    assert_eq!(stored.email, original.email);
}

#[test]
fn test_disabled_storage_fails_soft() {
    init_tracing();
    let store = RecordStore::new(MemoryStorage::disabled());

    assert!(store.list_all().is_empty());
    assert!(!store.save(make_patient("PAT-1-1", "Anita")));
    assert!(!store.delete("PAT-1-1"));
}

#[test]
fn test_quota_exceeded_leaves_previous_state() {
    let store = RecordStore::new(MemoryStorage::with_quota(600));
    assert!(store.save(make_patient("PAT-1-1", "Anita")));

    let mut bulky = make_patient("PAT-2-2", "Bhavna");
    bulky
        .extra
        .insert("notes".to_string(), serde_json::Value::String("x".repeat(1024)));

    assert!(!store.save(bulky));
    assert_eq!(store.len(), 1);
    assert!(store.find_by_id("PAT-1-1").is_some());
}

#[test]
fn test_form_to_store_flow() {
    let store = RecordStore::new(MemoryStorage::new());
    let form = PatientForm {
        full_name: "Deepak Menon".to_string(),
        age: Some(63),
        gender: "Male".to_string(),
        contact_number: "(0484) 2345678".to_string(),
        prakriti_type: "Kapha-Vata".to_string(),
        email: Some("deepak@example.in".to_string()),
        weight: Some(78.0),
        height: Some(172.0),
        ..Default::default()
    };

    let record = form.into_record(store.config().id_strategy).unwrap();
    let id = record.patient_id.clone();
    assert!(store.save(record));

    let stored = store.find_by_id(&id).unwrap();
    assert_eq!(stored.bmi().as_deref(), Some("26.4"));
}

#[test]
fn test_sqlite_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local_storage.db");

    {
        let store = RecordStore::new(SqliteStorage::open(&path).unwrap());
        assert!(store.save(make_patient("PAT-1-1", "Anita")));
        assert!(store.save(make_patient("PAT-2-2", "Bhavna")));
    }

    let store = RecordStore::new(SqliteStorage::open(&path).unwrap());
    let ids: Vec<_> = store.list_all().into_iter().map(|p| p.patient_id).collect();
    assert_eq!(ids, vec!["PAT-1-1", "PAT-2-2"]);
}

#[test]
fn test_stores_share_storage_by_reference() {
    let storage = MemoryStorage::new();
    let config = StoreConfig::default();
    let writer = RecordStore::with_config(&storage, config.clone());
    let reader = RecordStore::with_config(&storage, config);

    writer.save(make_patient("PAT-1-1", "Anita"));
    assert!(reader.find_by_id("PAT-1-1").is_some());
}

fn arb_patient() -> impl Strategy<Value = PatientRecord> {
    (
        "PAT-[0-9]{1,13}-[0-9]{1,3}",
        "[A-Za-z ]{1,24}",
        1u32..=150,
        prop_oneof!["Male", "Female", "Other"],
        "[0-9]{10,12}",
        prop_oneof!["Vata", "Pitta", "Kapha", "Vata-Pitta"],
        proptest::option::of(20.0f64..200.0),
    )
        .prop_map(|(id, name, age, gender, phone, prakriti, weight)| {
            let mut patient = PatientRecord::new(id, name, age, gender, phone, prakriti);
            patient.weight = weight;
            patient
        })
}

proptest! {
    #[test]
    fn prop_save_then_find_roundtrips(patient in arb_patient()) {
        let store = RecordStore::new(MemoryStorage::new());
        prop_assert!(store.save(patient.clone()));

        let stored = store.find_by_id(&patient.patient_id).unwrap();
        prop_assert_eq!(&stored.full_name, &patient.full_name);
        prop_assert_eq!(stored.age, patient.age);
        prop_assert_eq!(&stored.gender, &patient.gender);
        prop_assert_eq!(&stored.contact_number, &patient.contact_number);
        prop_assert_eq!(&stored.prakriti_type, &patient.prakriti_type);
        prop_assert_eq!(stored.weight, patient.weight);
        prop_assert!(stored.created_at.is_some());
        prop_assert_eq!(&stored.created_at, &stored.last_updated);
    }

    #[test]
    fn prop_ids_stay_unique(patients in proptest::collection::vec(arb_patient(), 1..12)) {
        let store = RecordStore::new(MemoryStorage::new());
        for patient in &patients {
            prop_assert!(store.save(patient.clone()));
        }

        let mut expected: Vec<&str> = Vec::new();
        for patient in &patients {
            if !expected.contains(&patient.patient_id.as_str()) {
                expected.push(&patient.patient_id);
            }
        }

        let stored: Vec<String> = store.list_all().into_iter().map(|p| p.patient_id).collect();
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn prop_delete_shrinks_by_at_most_one(
        patients in proptest::collection::vec(arb_patient(), 0..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let store = RecordStore::new(MemoryStorage::new());
        for patient in &patients {
            store.save(patient.clone());
        }
        let before = store.len();

        let target = if patients.is_empty() {
            "PAT-absent-0".to_string()
        } else {
            pick.get(&patients).patient_id.clone()
        };
        let present = store.find_by_id(&target).is_some();

        prop_assert!(store.delete(&target));
        prop_assert!(store.find_by_id(&target).is_none());
        prop_assert_eq!(store.len(), if present { before - 1 } else { before });
    }
}
