//! Integration tests for `SqliteStore` and the core operations running on it,
//! against an in-memory database.

use chrono::NaiveDate;
use rally_core::{
  Error as CoreError,
  attendee::EmailAddress,
  catalog::{create_event, get_event, get_event_attendees, list_events},
  event::{Event, EventMedium, NewEvent, NewEventInput},
  signup::{JoinRequest, join_event},
  store::{CapacityPolicy, EventStore, LinkOutcome},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_event(title: &str, total_slots: u32) -> NewEvent {
  NewEvent {
    title:        title.into(),
    description:  "An evening of talks".into(),
    date:         NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
    time:         Some("6:30 PM".into()),
    img_url:      "https://img.example.com/talks.png".into(),
    event_medium: EventMedium::Physical,
    total_slots,
  }
}

async fn seeded(s: &SqliteStore, title: &str) -> Event {
  s.create_event(new_event(title, 50)).await.unwrap()
}

fn email(raw: &str) -> EmailAddress { EmailAddress::parse(raw).unwrap() }

async fn join(
  s: &SqliteStore,
  event_id: impl ToString,
  address: &str,
) -> rally_core::Result<rally_core::signup::Signup> {
  let request = JoinRequest {
    event_id: event_id.to_string(),
    email:    address.to_owned(),
  };
  join_event(s, request, CapacityPolicy::Advisory).await
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_event() {
  let s = store().await;

  let created = seeded(&s, "Rust night").await;
  assert!(created.attendees_email.is_empty());
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get_event(created.event_id).await.unwrap().unwrap();
  assert_eq!(fetched.event_id, created.event_id);
  assert_eq!(fetched.title, "Rust night");
  assert_eq!(fetched.date, NaiveDate::from_ymd_opt(2025, 5, 20).unwrap());
  assert_eq!(fetched.time.as_deref(), Some("6:30 PM"));
  assert_eq!(fetched.event_medium, EventMedium::Physical);
  assert_eq!(fetched.total_slots, 50);
}

#[tokio::test]
async fn get_event_missing_returns_none() {
  let s = store().await;
  assert!(s.get_event(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_events_in_insertion_order() {
  let s = store().await;
  for title in ["first", "second", "third"] {
    seeded(&s, title).await;
  }

  let titles: Vec<String> = s
    .list_events()
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.title)
    .collect();
  assert_eq!(titles, ["first", "second", "third"]);
}

#[tokio::test]
async fn list_events_carries_attendee_ids_per_event() {
  let s = store().await;
  let a = seeded(&s, "a").await;
  let b = seeded(&s, "b").await;

  join(&s, a.event_id, "one@example.com").await.unwrap();
  join(&s, b.event_id, "two@example.com").await.unwrap();
  join(&s, a.event_id, "three@example.com").await.unwrap();

  let events = s.list_events().await.unwrap();
  assert_eq!(events[0].attendee_count(), 2);
  assert_eq!(events[1].attendee_count(), 1);
}

// ─── Attendees ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_attendee_is_idempotent() {
  let s = store().await;
  let addr = email("dup@example.com");

  let first = s.get_or_create_attendee(&addr).await.unwrap();
  let second = s.get_or_create_attendee(&addr).await.unwrap();
  assert_eq!(first.attendee_id, second.attendee_id);

  let found = s.find_attendee(&addr).await.unwrap().unwrap();
  assert_eq!(found.attendee_id, first.attendee_id);
}

#[tokio::test]
async fn find_attendee_missing_returns_none() {
  let s = store().await;
  assert!(s.find_attendee(&email("ghost@example.com")).await.unwrap().is_none());
}

// ─── Links ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn link_attendee_outcomes() {
  let s = store().await;
  let event = seeded(&s, "links").await;
  let attendee = s.get_or_create_attendee(&email("l@example.com")).await.unwrap();

  let first = s
    .link_attendee(event.event_id, attendee.attendee_id, CapacityPolicy::Advisory)
    .await
    .unwrap();
  assert_eq!(first, LinkOutcome::Linked);

  let second = s
    .link_attendee(event.event_id, attendee.attendee_id, CapacityPolicy::Advisory)
    .await
    .unwrap();
  assert_eq!(second, LinkOutcome::AlreadyLinked);

  let missing = s
    .link_attendee(Uuid::new_v4(), attendee.attendee_id, CapacityPolicy::Advisory)
    .await
    .unwrap();
  assert_eq!(missing, LinkOutcome::EventMissing);

  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  assert_eq!(fetched.attendees_email, vec![attendee.attendee_id]);
  assert!(fetched.updated_at >= fetched.created_at);
}

#[tokio::test]
async fn link_attendee_respects_enforced_capacity() {
  let s = store().await;
  let event = s.create_event(new_event("tiny", 1)).await.unwrap();
  let a = s.get_or_create_attendee(&email("a@example.com")).await.unwrap();
  let b = s.get_or_create_attendee(&email("b@example.com")).await.unwrap();

  let policy = CapacityPolicy::Enforced;
  assert_eq!(
    s.link_attendee(event.event_id, a.attendee_id, policy).await.unwrap(),
    LinkOutcome::Linked
  );
  assert_eq!(
    s.link_attendee(event.event_id, b.attendee_id, policy).await.unwrap(),
    LinkOutcome::Full
  );
  // An existing link is reported as such even when the event is full.
  assert_eq!(
    s.link_attendee(event.event_id, a.attendee_id, policy).await.unwrap(),
    LinkOutcome::AlreadyLinked
  );
}

// ─── Signup flow ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn join_returns_confirmation() {
  let s = store().await;
  let event = seeded(&s, "Launch party").await;

  let signup = join(&s, event.event_id, " New@Example.com ").await.unwrap();
  assert_eq!(signup.email.as_str(), "new@example.com");
  assert_eq!(signup.event_id, event.event_id);
  assert_eq!(signup.event_title, "Launch party");
}

#[tokio::test]
async fn join_twice_conflicts_and_adds_one_link() {
  let s = store().await;
  let event = seeded(&s, "twice").await;

  join(&s, event.event_id, "a@b.com").await.unwrap();
  match join(&s, event.event_id, "a@b.com").await {
    Err(CoreError::Conflict(msg)) => assert_eq!(msg, "already joined"),
    other => panic!("expected conflict, got {other:?}"),
  }

  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  assert_eq!(fetched.attendee_count(), 1);
}

#[tokio::test]
async fn join_normalizes_case_and_whitespace() {
  let s = store().await;
  let event = seeded(&s, "normalize").await;

  join(&s, event.event_id, " Foo@Bar.com ").await.unwrap();
  let second = join(&s, event.event_id, "foo@bar.com").await;
  assert!(matches!(second, Err(CoreError::Conflict(_))));
}

#[tokio::test]
async fn join_accepts_email_without_at_sign() {
  let s = store().await;
  let event = seeded(&s, "plain name").await;

  let signup = join(&s, event.event_id, "Alice").await.unwrap();
  assert_eq!(signup.email.as_str(), "alice");
  assert!(s.find_attendee(&email("alice")).await.unwrap().is_some());
}

#[tokio::test]
async fn same_email_on_two_events_reuses_identity() {
  let s = store().await;
  let first = seeded(&s, "first").await;
  let second = seeded(&s, "second").await;

  join(&s, first.event_id, "shared@example.com").await.unwrap();
  join(&s, second.event_id, "shared@example.com").await.unwrap();

  let identity = s
    .find_attendee(&email("shared@example.com"))
    .await
    .unwrap()
    .unwrap();

  let first = s.get_event(first.event_id).await.unwrap().unwrap();
  let second = s.get_event(second.event_id).await.unwrap().unwrap();
  assert_eq!(first.attendees_email, vec![identity.attendee_id]);
  assert_eq!(second.attendees_email, vec![identity.attendee_id]);
}

#[tokio::test]
async fn join_unknown_event_creates_nothing() {
  let s = store().await;

  for id in ["nonexistent-id".to_owned(), Uuid::new_v4().to_string()] {
    match join(&s, &id, "a@b.com").await {
      Err(CoreError::NotFound(msg)) => assert_eq!(msg, "event not found"),
      other => panic!("expected not found, got {other:?}"),
    }
  }

  assert!(s.find_attendee(&email("a@b.com")).await.unwrap().is_none());
}

#[tokio::test]
async fn join_with_empty_email_is_rejected() {
  let s = store().await;
  let event = seeded(&s, "empty").await;

  let result = join(&s, event.event_id, "").await;
  assert!(matches!(result, Err(CoreError::Validation(_))));
  assert!(s.get_event(event.event_id).await.unwrap().unwrap().attendees_email.is_empty());
}

#[tokio::test]
async fn joins_past_capacity_are_accepted_when_advisory() {
  let s = store().await;
  let event = s.create_event(new_event("advisory", 2)).await.unwrap();

  for i in 0..4 {
    join(&s, event.event_id, &format!("p{i}@example.com")).await.unwrap();
  }

  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  assert_eq!(fetched.attendee_count(), 4);
  assert!(fetched.is_full());
}

#[tokio::test]
async fn enforced_capacity_rejects_and_creates_no_identity() {
  let s = store().await;
  let event = s.create_event(new_event("enforced", 1)).await.unwrap();

  let request = |address: &str| JoinRequest {
    event_id: event.event_id.to_string(),
    email:    address.to_owned(),
  };

  join_event(&s, request("in@example.com"), CapacityPolicy::Enforced)
    .await
    .unwrap();

  match join_event(&s, request("late@example.com"), CapacityPolicy::Enforced).await {
    Err(CoreError::EventFull { event_id, total_slots }) => {
      assert_eq!(event_id, event.event_id);
      assert_eq!(total_slots, 1);
    }
    other => panic!("expected event full, got {other:?}"),
  }
  assert!(s.find_attendee(&email("late@example.com")).await.unwrap().is_none());

  // A duplicate is still a conflict, not a capacity failure.
  let dup = join_event(&s, request("in@example.com"), CapacityPolicy::Enforced).await;
  assert!(matches!(dup, Err(CoreError::Conflict(_))));
}

#[tokio::test]
async fn concurrent_joins_link_once() {
  let s = store().await;
  let event = seeded(&s, "race").await;

  let mut handles = Vec::new();
  for _ in 0..16 {
    let s = s.clone();
    let id = event.event_id;
    handles.push(tokio::spawn(async move {
      join(&s, id, "racer@example.com").await
    }));
  }

  let mut ok = 0;
  let mut conflicts = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => ok += 1,
      Err(CoreError::Conflict(_)) => conflicts += 1,
      Err(e) => panic!("unexpected error: {e}"),
    }
  }

  assert_eq!(ok, 1);
  assert_eq!(conflicts, 15);
  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  assert_eq!(fetched.attendee_count(), 1);
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn attendees_resolve_in_join_order() {
  let s = store().await;
  let event = seeded(&s, "resolved").await;

  for address in ["c@example.com", "a@example.com", "b@example.com"] {
    join(&s, event.event_id, address).await.unwrap();
  }

  let list = get_event_attendees(&s, &event.event_id.to_string())
    .await
    .unwrap();
  assert_eq!(list.event_id, event.event_id);
  assert_eq!(list.title, "resolved");
  assert_eq!(list.total_attendees, 3);

  let emails: Vec<&str> = list.attendees.iter().map(|a| a.email.as_str()).collect();
  assert_eq!(emails, ["c@example.com", "a@example.com", "b@example.com"]);

  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  let ids: Vec<Uuid> = list.attendees.iter().map(|a| a.id).collect();
  assert_eq!(ids, fetched.attendees_email);
}

#[tokio::test]
async fn attendees_of_unknown_event_is_not_found() {
  let s = store().await;
  let result = get_event_attendees(&s, &Uuid::new_v4().to_string()).await;
  assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn attendees_of_empty_event() {
  let s = store().await;
  let event = seeded(&s, "quiet").await;
  let list = get_event_attendees(&s, &event.event_id.to_string())
    .await
    .unwrap();
  assert!(list.attendees.is_empty());
  assert_eq!(list.total_attendees, 0);
}

#[tokio::test]
async fn catalog_create_then_list_and_get() {
  let s = store().await;
  let input = NewEventInput {
    title:        Some("Workshop".into()),
    description:  Some("Hands-on".into()),
    date:         Some("2025-09-01".into()),
    time:         None,
    img_url:      Some("https://img.example.com/w.png".into()),
    event_medium: Some("virtual".into()),
    total_slots:  Some(12),
  };

  let created = create_event(&s, input).await.unwrap();
  assert_eq!(created.total_slots, 12);

  let listed = list_events(&s).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].event_id, created.event_id);

  let fetched = get_event(&s, &created.event_id.to_string()).await.unwrap();
  assert_eq!(fetched.title, "Workshop");
  assert!(fetched.time.is_none());
}

#[tokio::test]
async fn catalog_create_rejects_missing_fields_without_writing() {
  let s = store().await;
  let input = NewEventInput {
    description:  Some("No title, no image".into()),
    date:         Some("2025-09-01".into()),
    event_medium: Some("physical".into()),
    ..NewEventInput::default()
  };

  match create_event(&s, input).await {
    Err(CoreError::Validation(msg)) => {
      assert!(msg.contains("title"));
      assert!(msg.contains("imgUrl"));
    }
    other => panic!("expected validation error, got {other:?}"),
  }
  assert!(list_events(&s).await.unwrap().is_empty());
}

#[tokio::test]
async fn catalog_get_unknown_event_is_not_found() {
  let s = store().await;
  assert!(matches!(
    get_event(&s, "not-a-uuid").await,
    Err(CoreError::NotFound(_))
  ));
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn data_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("rally-test-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("rally.db");

  let event_id = {
    let s = SqliteStore::open(&path).await.unwrap();
    let event = seeded(&s, "durable").await;
    join(&s, event.event_id, "keep@example.com").await.unwrap();
    s.close().await.unwrap();
    event.event_id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let fetched = s.get_event(event_id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "durable");
  assert_eq!(fetched.attendee_count(), 1);
  s.close().await.unwrap();

  std::fs::remove_dir_all(&dir).ok();
}
