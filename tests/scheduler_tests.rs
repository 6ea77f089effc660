// Integration tests for the scheduler over both stores

mod fixtures;

use std::sync::Arc;
use std::thread;

use calendar_scheduler::models::event::{EventChanges, EventId};
use calendar_scheduler::models::occurrence::{EntryKind, OccurrenceChanges, OccurrenceId};
use calendar_scheduler::models::settings::Settings;
use calendar_scheduler::models::time_span::TimeSpan;
use calendar_scheduler::services::scheduler::{ConflictCheck, EventScheduler};
use calendar_scheduler::services::store::{EventStore, SqliteStore};
use calendar_scheduler::SchedulerError;
use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;

use fixtures::dates::{at, date};
use fixtures::{events, init_logging, memory_scheduler, ALICE, BOB};

#[test]
fn test_standup_planning_conflict_end_to_end() {
    let scheduler = memory_scheduler();

    let standup = scheduler
        .create(ALICE, events::standup(), ConflictCheck::Enforce)
        .unwrap();
    let series = scheduler.occurrences(ALICE, standup.id).unwrap();
    assert_eq!(series.len(), 5);
    for (day, occurrence) in (1..=5).zip(&series) {
        assert_eq!(occurrence.span.start(), at(2024, 1, day, 9, 0));
        assert_eq!(occurrence.span.duration_minutes(), 15);
    }

    let err = scheduler
        .create(ALICE, events::planning(), ConflictCheck::Enforce)
        .unwrap_err();
    let conflicts = err.conflicts().expect("conflict error");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].event_id, standup.id);
    assert_eq!(conflicts[0].occurrence_id, Some(OccurrenceId::new(standup.id, 2)));
    assert_eq!(conflicts[0].title, "Standup");

    // nothing was persisted for the rejected event
    let entries = scheduler
        .list_between(ALICE, date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().all(|e| e.event_id == standup.id));
}

#[test]
fn test_planning_fits_after_standup_is_cancelled() {
    let scheduler = memory_scheduler();
    let standup = scheduler
        .create(ALICE, events::standup(), ConflictCheck::Enforce)
        .unwrap();

    scheduler
        .update_occurrence(
            ALICE,
            OccurrenceId::new(standup.id, 2),
            OccurrenceChanges::cancel(),
        )
        .unwrap();

    let planning = scheduler
        .create(ALICE, events::planning(), ConflictCheck::Enforce)
        .unwrap();
    let jan_3 = scheduler
        .list_between(ALICE, date(2024, 1, 3), date(2024, 1, 3))
        .unwrap();
    assert_eq!(jan_3.len(), 1);
    assert_eq!(jan_3[0].event_id, planning.id);
    assert_eq!(jan_3[0].kind, EntryKind::Event);
}

#[test]
fn test_move_preserves_duration_and_checks_conflicts() {
    let scheduler = memory_scheduler();
    scheduler
        .create(ALICE, events::standup(), ConflictCheck::Ignore)
        .unwrap();
    let review = scheduler
        .create(
            ALICE,
            events::timed("Review", at(2024, 1, 8, 13, 0), at(2024, 1, 8, 14, 45)),
            ConflictCheck::Ignore,
        )
        .unwrap();

    let moved = scheduler
        .move_to(ALICE, review.id, at(2024, 1, 9, 10, 0), ConflictCheck::Enforce)
        .unwrap();
    assert_eq!(moved.duration_minutes(), 105);

    let rejected = scheduler.move_to(ALICE, review.id, at(2024, 1, 4, 8, 30), ConflictCheck::Enforce);
    assert!(matches!(rejected, Err(SchedulerError::ConflictDetected(_))));
    assert_eq!(scheduler.get(ALICE, review.id).unwrap(), moved);

    // an explicit override skips the check
    let forced = scheduler
        .move_to(ALICE, review.id, at(2024, 1, 4, 8, 30), ConflictCheck::Ignore)
        .unwrap();
    assert_eq!(forced.span.end(), at(2024, 1, 4, 10, 15));
}

#[test]
fn test_re_expansion_is_idempotent() {
    let scheduler = memory_scheduler();
    let sync = scheduler
        .create(ALICE, events::fortnightly_sync(), ConflictCheck::Ignore)
        .unwrap();
    let before = scheduler.occurrences(ALICE, sync.id).unwrap();

    let same_rule = EventChanges {
        recurrence: Some(sync.recurrence.clone()),
        span: Some(sync.span),
        ..Default::default()
    };
    scheduler
        .update(ALICE, sync.id, same_rule, ConflictCheck::Ignore)
        .unwrap();

    assert_eq!(scheduler.occurrences(ALICE, sync.id).unwrap(), before);
    // one year of fortnights, both ends inclusive
    assert_eq!(before.len(), 27);
}

#[test]
fn test_owners_are_isolated() {
    let scheduler = memory_scheduler();
    let mine = scheduler
        .create(ALICE, events::planning(), ConflictCheck::Ignore)
        .unwrap();

    assert!(scheduler
        .create(BOB, events::planning(), ConflictCheck::Enforce)
        .is_ok());
    assert!(matches!(
        scheduler.delete(BOB, mine.id),
        Err(SchedulerError::Unauthorized { .. })
    ));
    assert!(matches!(
        scheduler.move_to(BOB, mine.id, at(2024, 2, 1, 9, 0), ConflictCheck::Ignore),
        Err(SchedulerError::Unauthorized { .. })
    ));
    assert_eq!(scheduler.get(ALICE, mine.id).unwrap(), mine);
}

#[test]
fn test_all_day_listing_and_conflicts() {
    let scheduler = memory_scheduler();
    let conference = scheduler
        .create(ALICE, events::conference(), ConflictCheck::Ignore)
        .unwrap();

    let listed = scheduler
        .list_between(ALICE, date(2024, 1, 16), date(2024, 1, 20))
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].time_range_label(), "All day");

    // the day after ends exactly where the conference stops
    let next_day = TimeSpan::all_day(date(2024, 1, 17)).unwrap();
    assert!(scheduler.check_conflicts(ALICE, &next_day, None).unwrap().is_empty());
    let lunch = TimeSpan::new(at(2024, 1, 16, 12, 0), at(2024, 1, 16, 13, 0)).unwrap();
    let conflicts = scheduler.check_conflicts(ALICE, &lunch, None).unwrap();
    assert_eq!(conflicts[0].event_id, conference.id);
}

#[test]
fn test_concurrent_creates_get_unique_ids() {
    let scheduler = Arc::new(memory_scheduler());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                let start = at(2024, 3, 1 + i, 9, 0);
                scheduler
                    .create(
                        ALICE,
                        events::timed("Parallel", start, start + chrono::Duration::hours(1)),
                        ConflictCheck::Enforce,
                    )
                    .unwrap()
                    .id
            })
        })
        .collect();

    let mut ids: Vec<EventId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(
        scheduler
            .list_between(ALICE, date(2024, 3, 1), date(2024, 3, 31))
            .unwrap()
            .len(),
        8
    );
}

#[test]
fn test_sqlite_round_trip_with_tempfile() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.db");

    let (standup_id, cancelled) = {
        let scheduler =
            EventScheduler::new(SqliteStore::open(&path).unwrap(), Settings::default()).unwrap();
        let standup = scheduler
            .create(ALICE, events::standup(), ConflictCheck::Enforce)
            .unwrap();
        let cancelled = scheduler
            .update_occurrence(
                ALICE,
                OccurrenceId::new(standup.id, 1),
                OccurrenceChanges::cancel(),
            )
            .unwrap();
        (standup.id, cancelled)
    };

    let scheduler =
        EventScheduler::new(SqliteStore::open(&path).unwrap(), Settings::default()).unwrap();
    let series = scheduler.occurrences(ALICE, standup_id).unwrap();
    assert_eq!(series.len(), 5);
    assert_eq!(series[1], cancelled);

    let next = scheduler
        .create(ALICE, events::planning(), ConflictCheck::Ignore)
        .unwrap();
    assert!(next.id > standup_id);

    scheduler.delete(ALICE, standup_id).unwrap();
    let snapshot = scheduler.store().load_owner(ALICE).unwrap();
    assert_eq!(snapshot.events.len(), 1);
    assert!(snapshot.occurrences.is_empty());
}

fn shared_db_path() -> std::path::PathBuf {
    std::env::temp_dir().join("calendar_scheduler_shared_test.db")
}

fn fresh_shared_store() -> SqliteStore {
    let path = shared_db_path();
    if path.exists() {
        std::fs::remove_file(&path).ok();
    }
    SqliteStore::open(&path).unwrap()
}

#[test]
#[serial]
fn test_shared_path_starts_empty() {
    let store = fresh_shared_store();
    assert_eq!(store.max_event_id().unwrap(), 0);

    let scheduler = EventScheduler::new(store, Settings::default()).unwrap();
    let event = scheduler
        .create(ALICE, events::conference(), ConflictCheck::Ignore)
        .unwrap();
    assert_eq!(event.id, EventId(1));
}

#[test]
#[serial]
fn test_shared_path_rejected_create_persists_nothing() {
    let scheduler = EventScheduler::new(fresh_shared_store(), Settings::default()).unwrap();
    scheduler
        .create(ALICE, events::standup(), ConflictCheck::Enforce)
        .unwrap();
    assert!(scheduler
        .create(ALICE, events::planning(), ConflictCheck::Enforce)
        .is_err());

    let reopened = SqliteStore::open(shared_db_path()).unwrap();
    let snapshot = reopened.load_owner(ALICE).unwrap();
    assert_eq!(snapshot.events.len(), 1);
    assert_eq!(snapshot.occurrences.len(), 5);
}
