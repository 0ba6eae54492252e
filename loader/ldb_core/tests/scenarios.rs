#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end loads driven through [`ldb_core::run`].
//!
//! Each scenario builds a small schema in a [`MemoryCatalog`], replays the
//! events a parser would produce for a load file and inspects the store and
//! the recorded reports.

use ldb_core::memory::{MemoryCatalog, MemoryStore};
use ldb_core::{
    init_tracing, run, ClassRef, EventKind, InterruptMode, InterruptReport, LoadStop,
    LoaderConfig, LoaderEvent, LoaderSession, RecordingReporter, Token,
};
use ldb_diagnostic::ErrorCode;
use ldb_ir::{ClassId, CollectionKind, Domain, DomainKind, LexicalType, ObjectId, TypedValue};
use pretty_assertions::assert_eq;

type Session = LoaderSession<MemoryCatalog, MemoryStore, RecordingReporter>;

/// Builds the event stream of a load file, one line per call.
#[derive(Default)]
struct Script {
    events: Vec<LoaderEvent>,
    line: u32,
}

impl Script {
    fn push(&mut self, kind: EventKind) {
        self.events.push(LoaderEvent::new(self.line, kind));
    }

    fn class_id(mut self, name: &str, id: u32) -> Self {
        self.line += 1;
        self.push(EventKind::ClassId {
            name: name.to_owned(),
            id,
        });
        self
    }

    fn class(mut self, class: ClassRef, attributes: &[&str]) -> Self {
        self.line += 1;
        self.push(EventKind::StartClass(class));
        for name in attributes {
            self.push(EventKind::AddAttribute((*name).to_owned()));
        }
        self
    }

    fn row(self, ordinal: Option<u32>, values: Vec<Token>) -> Self {
        self.raw_row(ordinal, values.into_iter().map(EventKind::Value).collect())
    }

    fn raw_row(mut self, ordinal: Option<u32>, events: Vec<EventKind>) -> Self {
        self.line += 1;
        self.push(EventKind::StartInstance(ordinal));
        for kind in events {
            self.push(kind);
        }
        self.push(EventKind::FinishInstance);
        self
    }

    fn finish(mut self) -> Vec<LoaderEvent> {
        self.line += 1;
        self.push(EventKind::Finish);
        self.events
    }
}

fn employees() -> (MemoryCatalog, ClassId) {
    let mut catalog = MemoryCatalog::new();
    let employee = catalog.add_class("employee");
    catalog.add_attribute(employee, "id", Domain::new(DomainKind::Integer));
    catalog.add_attribute(employee, "name", Domain::varchar(32));
    catalog.add_attribute(employee, "manager", Domain::object(Some(employee)));
    (catalog, employee)
}

fn session(catalog: MemoryCatalog, config: LoaderConfig) -> (Session, MemoryStore) {
    init_tracing();
    let store = MemoryStore::new();
    let session = LoaderSession::new(catalog, store.clone(), RecordingReporter::new(), config);
    (session, store)
}

fn employee(id: u32, name: &str, manager: Token) -> Vec<Token> {
    vec![Token::int(id.to_string()), Token::string(name), manager]
}

fn manager(ordinal: u32) -> Token {
    Token::object(Some(ClassRef::name("employee")), ordinal)
}

fn object_of(session: &Session, class: ClassId, ordinal: u32) -> ObjectId {
    session
        .resolver()
        .table(class)
        .and_then(|t| t.find(ordinal))
        .map(|e| e.object)
        .unwrap()
}

#[test]
fn forward_reference_is_defined_by_a_later_line() {
    let (catalog, emp) = employees();
    let (mut session, store) = session(catalog, LoaderConfig::default());

    let events = Script::default()
        .class(ClassRef::name("employee"), &["id", "name", "manager"])
        .row(Some(1), employee(1, "ann", manager(2)))
        .row(Some(2), employee(2, "bob", Token::null()))
        .finish();
    let summary = run(&mut session, events).unwrap();

    assert_eq!(summary.objects_loaded, 2);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.defaulted_instances, 0);
    assert_eq!(store.placeholder_count(), 0);

    let ann = object_of(&session, emp, 1);
    let bob = object_of(&session, emp, 2);
    assert_eq!(store.image(ann).unwrap().get(2), Some(&TypedValue::Object(bob)));
    assert_eq!(store.image(bob).unwrap().get(2), Some(&TypedValue::Null));

    let table = session.resolver().table(emp).unwrap();
    assert_eq!(table.total_inserts(), 2);
    assert_eq!(table.reserved_count(), 0);
    assert!(session.resolver().pending().is_empty());
}

#[test]
fn repeated_forward_references_share_one_placeholder() {
    let (catalog, emp) = employees();
    let (mut session, store) = session(catalog, LoaderConfig::default());

    let events = Script::default()
        .class(ClassRef::name("employee"), &["id", "name", "manager"])
        .row(Some(1), employee(1, "ann", manager(9)))
        .row(Some(2), employee(2, "bob", manager(9)))
        .finish();
    let summary = run(&mut session, events).unwrap();

    assert_eq!(store.reserved().len(), 1);
    assert_eq!(store.placeholder_count(), 1);
    assert_eq!(summary.defaulted_instances, 1);
    let boss = object_of(&session, emp, 9);
    for ordinal in [1, 2] {
        let image = store.image(object_of(&session, emp, ordinal)).unwrap();
        assert_eq!(image.get(2), Some(&TypedValue::Object(boss)));
    }
}

#[test]
fn self_reference_needs_no_placeholder() {
    let (catalog, emp) = employees();
    let (mut session, store) = session(catalog, LoaderConfig::default());

    let events = Script::default()
        .class(ClassRef::name("employee"), &["id", "name", "manager"])
        .row(Some(1), employee(1, "ceo", manager(1)))
        .finish();
    run(&mut session, events).unwrap();

    let ceo = object_of(&session, emp, 1);
    assert_eq!(store.image(ceo).unwrap().get(2), Some(&TypedValue::Object(ceo)));
    assert!(store.reserved().is_empty());
}

#[test]
fn class_ids_name_classes_in_blocks_and_references() {
    let (catalog, emp) = employees();
    let (mut session, store) = session(catalog, LoaderConfig::default());

    let events = Script::default()
        .class_id("employee", 3)
        .class(ClassRef::Id(3), &["id", "name", "manager"])
        .row(Some(1), employee(1, "ann", Token::object(Some(ClassRef::Id(3)), 2)))
        .row(Some(2), employee(2, "bob", Token::null()))
        .finish();
    let summary = run(&mut session, events).unwrap();

    assert_eq!(summary.objects_loaded, 2);
    assert_eq!(store.instances_of(emp).len(), 2);
    assert_eq!(store.placeholder_count(), 0);
}

#[test]
fn nested_collection_drops_only_its_line() {
    let mut catalog = MemoryCatalog::new();
    let doc = catalog.add_class("doc");
    let ints = Domain::collection(CollectionKind::Set, vec![Domain::new(DomainKind::Integer)]);
    catalog.add_attribute(doc, "tags", ints);
    let (mut session, store) = session(catalog, LoaderConfig::default());

    let open = || EventKind::Value(Token::new(LexicalType::Collection, "{"));
    let int = |v: &str| EventKind::Value(Token::int(v));
    let events = Script::default()
        .class(ClassRef::name("doc"), &["tags"])
        .raw_row(
            None,
            vec![
                open(),
                int("1"),
                open(),
                int("2"),
                EventKind::CloseCollection,
                EventKind::CloseCollection,
            ],
        )
        .raw_row(
            None,
            vec![open(), int("3"), int("4"), EventKind::CloseCollection],
        )
        .finish();
    let summary = run(&mut session, events).unwrap();

    let codes: Vec<_> = session.reporter().errors().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::L1009]);
    assert_eq!(summary.objects_loaded, 1);
    assert_eq!(summary.fail_count, 1);

    let rows = store.instances_of(doc);
    assert_eq!(rows.len(), 1);
    let Some(TypedValue::Collection(tags)) = rows[0].1.get(0) else {
        panic!("tags not stored: {:?}", rows[0].1);
    };
    assert_eq!(tags.elements(), &[TypedValue::Int(3), TypedValue::Int(4)]);
}

#[test]
fn periodic_commit_every_m_instances() {
    let (catalog, emp) = employees();
    let config = LoaderConfig {
        periodic_commit: 3,
        ..LoaderConfig::default()
    };
    let (mut session, store) = session(catalog, config);

    let mut script = Script::default().class(ClassRef::name("employee"), &["id", "name", "manager"]);
    for id in 1..=7 {
        script = script.row(Some(id), employee(id, "e", Token::null()));
    }
    let summary = run(&mut session, script.finish()).unwrap();

    // Lines 2..=8 hold the instances; line 9 is the end of input.
    assert_eq!(session.reporter().commits, vec![(3, 4), (6, 7), (7, 9)]);
    assert_eq!(summary.last_committed_line, 9);
    assert_eq!(store.commit_count(), 3);
    assert_eq!(store.committed_count(), 7);
    assert_eq!(store.exchange_batches(), vec![3, 3, 1]);
    assert_eq!(session.commit_controller().uncommitted(), 0);
    assert_eq!(store.instances_of(emp).len(), 7);
}

#[test]
fn interrupt_commits_what_was_loaded() {
    let (catalog, emp) = employees();
    let config = LoaderConfig {
        interrupt_mode: InterruptMode::StopAndCommit,
        ..LoaderConfig::default()
    };
    let (mut session, store) = session(catalog, config);
    let flag = session.interrupt_flag();

    let mut script = Script::default().class(ClassRef::name("employee"), &["id", "name", "manager"]);
    for id in 1..=6 {
        script = script.row(Some(id), employee(id, "e", Token::null()));
    }

    let mut finished = 0;
    let mut stop = None;
    for event in script.finish() {
        let is_finish = event.kind == EventKind::FinishInstance;
        if let Err(err) = session.apply(event) {
            stop = Some(err);
            break;
        }
        if is_finish {
            finished += 1;
            if finished == 3 {
                flag.raise();
            }
        }
    }

    let report = InterruptReport {
        mode: InterruptMode::StopAndCommit,
        committed_now: 4,
        durable_total: 4,
        lost: 0,
    };
    assert_eq!(stop, Some(LoadStop::Interrupted(report)));
    assert_eq!(store.committed_count(), 4);
    assert_eq!(store.instances_of(emp).len(), 4);
    assert!(session.is_stopped());
    assert_eq!(session.reporter().summaries.len(), 1);
}

#[test]
fn interrupt_between_periodic_commits_commits_the_remainder() {
    let (catalog, _) = employees();
    let config = LoaderConfig {
        periodic_commit: 5,
        interrupt_mode: InterruptMode::StopAndCommit,
        ..LoaderConfig::default()
    };
    let (mut session, store) = session(catalog, config);
    let flag = session.interrupt_flag();

    let mut script = Script::default().class(ClassRef::name("employee"), &["id", "name", "manager"]);
    for id in 1..=9 {
        script = script.row(Some(id), employee(id, "e", Token::null()));
    }

    // Raised while the seventh line is open: two lines since the commit at 5.
    let mut started = 0;
    let mut stop = None;
    for event in script.finish() {
        if matches!(event.kind, EventKind::StartInstance(_)) {
            started += 1;
        }
        let is_seventh = started == 7 && matches!(event.kind, EventKind::StartInstance(_));
        if let Err(err) = session.apply(event) {
            stop = Some(err);
            break;
        }
        if is_seventh {
            flag.raise();
        }
    }

    let Some(LoadStop::Interrupted(report)) = stop else {
        panic!("expected an interrupt, got {stop:?}");
    };
    assert_eq!(report.committed_now, 2);
    assert_eq!(report.durable_total, 7);
    assert_eq!(store.commit_count(), 2);
    assert_eq!(store.committed_count(), 7);
    assert_eq!(session.reporter().interrupts, vec![report]);
}

#[test]
fn validation_pass_leaves_the_store_untouched() {
    let (catalog, emp) = employees();
    let config = LoaderConfig {
        validation_only: true,
        ..LoaderConfig::default()
    };
    let (mut session, store) = session(catalog, config);

    let script = || {
        Script::default()
            .class(ClassRef::name("employee"), &["id", "name", "manager"])
            .row(Some(1), employee(1, "ann", manager(2)))
            .row(Some(2), employee(2, "bob", Token::null()))
            .row(Some(3), vec![Token::int("3")])
            .finish()
    };

    let checked = run(&mut session, script()).unwrap();
    assert_eq!(checked.objects_loaded, 2);
    assert_eq!(checked.errors, 1);
    assert_eq!(store.placeholder_count(), 0);
    assert!(session.tables().is_empty());

    session.start_insertion(0);
    let loaded = run(&mut session, script()).unwrap();

    assert_eq!(loaded.objects_loaded, 2);
    assert_eq!(loaded.errors, 1);
    assert_eq!(store.instances_of(emp).len(), 2);
    assert_eq!(store.committed_count(), 2);
}

#[test]
fn summary_serializes_for_reports() {
    let (catalog, _) = employees();
    let (mut session, _store) = session(catalog, LoaderConfig::default());

    let events = Script::default()
        .class(ClassRef::name("employee"), &["id", "name", "manager"])
        .row(Some(1), employee(1, "ann", Token::null()))
        .finish();
    let summary = run(&mut session, events).unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["objects_loaded"], 1);
    assert_eq!(json["stopped"], false);
}
