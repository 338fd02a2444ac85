use std::sync::mpsc;
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::thread;
use std::time::Duration;

use lending_ledger::{
    EventKind, EventSink, LendingConfig, LendingEngine, LendingEvent, LibraryStore, LogSink,
    MembershipTier, MemoryWriteHook, SinkError, StoreWrite,
};

use crate::support::{date, library, library_with};

struct Failing;

impl EventSink for Failing {
    fn handle(&self, _event: &LendingEvent) -> Result<(), SinkError> {
        Err(SinkError("mailbox full".into()))
    }

    fn priority(&self) -> i32 {
        -1
    }
}

struct OnlyReturns(Mutex<Vec<LendingEvent>>);

impl EventSink for OnlyReturns {
    fn handle(&self, event: &LendingEvent) -> Result<(), SinkError> {
        self.0.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn is_interested_in(&self, kind: EventKind) -> bool {
        kind == EventKind::Returned
    }
}

/// Hands every borrowed book straight back through the same engine.
#[derive(Default)]
struct ReturnOnBorrow {
    engine: OnceLock<Weak<LendingEngine>>,
    returned: Mutex<Vec<bool>>,
}

impl EventSink for ReturnOnBorrow {
    fn handle(&self, event: &LendingEvent) -> Result<(), SinkError> {
        let (Some(member_id), Some(isbn)) = (&event.member_id, &event.isbn) else {
            return Ok(());
        };
        let engine = self
            .engine
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| SinkError("engine dropped".into()))?;
        let returned = engine
            .return_book(member_id, isbn)
            .map_err(|err| SinkError(err.to_string()))?;
        self.returned.lock().unwrap().push(returned);
        Ok(())
    }

    fn is_interested_in(&self, kind: EventKind) -> bool {
        kind == EventKind::Borrowed
    }
}

#[test]
fn borrow_and_return_publish_events() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut lib = library();
    lib.engine = lib
        .engine
        .with_sink(Arc::new(LogSink::with_buffer(buffer.clone())));

    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();
    lib.engine.return_book(member.id(), "A").unwrap();

    let lines = buffer.lock().unwrap();
    // registration, book added, borrowed, returned
    assert_eq!(lines.len(), 4);
    assert!(lines[2].contains("Borrowed"));
    assert!(lines[3].contains("Returned"));
}

#[test]
fn failing_sink_does_not_fail_the_operation() {
    let returns = Arc::new(OnlyReturns(Mutex::new(Vec::new())));
    let mut lib = library();
    lib.engine = lib
        .engine
        .with_sink(Arc::new(Failing))
        .with_sink(returns.clone());

    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    let loan = lib
        .engine
        .borrow_book(member.id(), "A", date(2024, 1, 15))
        .unwrap();
    assert!(lib.engine.return_book(member.id(), "A").unwrap());

    let seen = returns.0.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, EventKind::Returned);
    assert_eq!(seen[0].loan_id.as_deref(), Some(loan.id()));
    assert_eq!(seen[0].member_id.as_deref(), Some(member.id()));
}

#[test]
fn sink_can_call_back_into_the_engine() {
    let lib = library();
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);

    let engine = Arc::new(lib.engine);
    let sink = Arc::new(ReturnOnBorrow::default());
    let _ = sink.engine.set(Arc::downgrade(&engine));
    engine.events().subscribe(sink.clone());

    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(&engine);
    let member_id = member.id().to_string();
    thread::spawn(move || {
        let _ = tx.send(worker.borrow_book(&member_id, "A", date(2024, 1, 15)));
    });

    let loan = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("borrow did not finish while a sink re-entered the engine")
        .unwrap();

    assert_eq!(*sink.returned.lock().unwrap(), vec![true]);
    assert!(engine.loan(loan.id()).unwrap().is_returned());
    assert!(engine.find_book("A").unwrap().is_available());
    assert_eq!(
        engine.find_member(member.id()).unwrap().current_borrowed_count(),
        0
    );
}

#[test]
fn borrow_writes_book_then_loan_then_member() {
    let hook = Arc::new(MemoryWriteHook::new());
    let lib = library_with(
        LibraryStore::in_memory_with_hook(hook.clone()),
        LendingConfig::default(),
    );
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    let setup = hook.writes().len();

    lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();

    let writes: Vec<_> = hook.writes()[setup..]
        .iter()
        .map(|write| (write.collection(), write.id().to_string()))
        .collect();
    assert_eq!(
        writes,
        vec![
            ("books", "A".to_string()),
            ("loans", "LOAN-1".to_string()),
            ("members", member.id().to_string()),
        ]
    );

    match &hook.writes()[setup] {
        StoreWrite::Put { payload, .. } => {
            assert_eq!(payload["available_copies"], 0);
            assert_eq!(payload["status"], "BORROWED");
        }
        other => panic!("expected a put, got {:?}", other),
    }
}

#[test]
fn failed_borrow_writes_nothing() {
    let hook = Arc::new(MemoryWriteHook::new());
    let lib = library_with(
        LibraryStore::in_memory_with_hook(hook.clone()),
        LendingConfig::default(),
    );
    let m1 = lib.member(MembershipTier::Basic);
    let m2 = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    lib.engine.borrow_book(m1.id(), "A", date(2024, 1, 15)).unwrap();
    let before = hook.writes().len();

    assert!(lib.engine.borrow_book(m2.id(), "A", date(2024, 1, 15)).is_err());
    assert_eq!(hook.writes().len(), before);
}

#[cfg(feature = "emitter")]
#[test]
fn emitter_sink_forwards_json_payloads() {
    use lending_ledger::EmitterSink;

    let sink = Arc::new(EmitterSink::new());
    let (tx, rx) = mpsc::channel::<String>();
    let tx = Mutex::new(tx);
    sink.on(EventKind::Borrowed, move |payload: String| {
        let _ = tx.lock().unwrap().send(payload);
    })
    .unwrap();

    let mut lib = library();
    lib.engine = lib.engine.with_sink(sink);
    let member = lib.member(MembershipTier::Basic);
    lib.book("A", 1);
    lib.engine.borrow_book(member.id(), "A", date(2024, 1, 15)).unwrap();

    // EventEmitter is async, give it time
    thread::sleep(Duration::from_millis(50));
    let payload = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    let event: LendingEvent = serde_json::from_str(&payload).unwrap();
    assert_eq!(event.kind, EventKind::Borrowed);
    assert_eq!(event.isbn.as_deref(), Some("A"));
}
