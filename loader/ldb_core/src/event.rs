//! Input events produced by the load-file parser.

use ldb_ir::{LexicalType, Ordinal};

use crate::catalog::SchemaCatalog;
use crate::report::{LoadSummary, ReportSink};
use crate::session::{LoadStop, LoaderSession};
use crate::store::ObjectStore;

/// A class named in the load file.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ClassRef {
    Name(String),
    /// An id assigned by a `%id` directive.
    Id(u32),
}

impl ClassRef {
    pub fn name(name: impl Into<String>) -> Self {
        ClassRef::Name(name.into())
    }
}

/// `@class|ordinal`, or `@ordinal` with the class taken from the domain.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObjectRef {
    pub class: Option<ClassRef>,
    pub ordinal: Ordinal,
}

/// One value token.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub lexical: LexicalType,
    pub text: String,
    /// The target of an object or class-object reference token.
    pub reference: Option<ObjectRef>,
}

impl Token {
    pub fn new(lexical: LexicalType, text: impl Into<String>) -> Self {
        Token {
            lexical,
            text: text.into(),
            reference: None,
        }
    }

    pub fn null() -> Self {
        Token::new(LexicalType::Null, "NULL")
    }

    pub fn int(text: impl Into<String>) -> Self {
        Token::new(LexicalType::Int, text)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Token::new(LexicalType::Str, text)
    }

    /// Reference to instance `ordinal`, of `class` if given.
    pub fn object(class: Option<ClassRef>, ordinal: Ordinal) -> Self {
        Token {
            reference: Some(ObjectRef { class, ordinal }),
            ..Token::new(LexicalType::Oid, "")
        }
    }

    /// Reference to the class object of `class`.
    pub fn class_object(class: ClassRef) -> Self {
        Token {
            reference: Some(ObjectRef {
                class: Some(class),
                ordinal: 0,
            }),
            ..Token::new(LexicalType::ClassOid, "")
        }
    }
}

/// Where the values of the following lines go.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum AttributeMode {
    #[default]
    Instance,
    Class,
    Shared,
    Default,
}

#[derive(Clone, PartialEq, Debug)]
pub enum EventKind {
    /// `%id name id`
    ClassId { name: String, id: u32 },
    StartClass(ClassRef),
    AttributeMode(AttributeMode),
    AddAttribute(String),
    SetConstructor(String),
    AddArgument(String),
    StartInstance(Option<Ordinal>),
    Value(Token),
    OpenCollection,
    CloseCollection,
    FinishInstance,
    Finish,
}

/// An event and the load-file line it came from.
#[derive(Clone, PartialEq, Debug)]
pub struct LoaderEvent {
    pub line: u32,
    pub kind: EventKind,
}

impl LoaderEvent {
    pub fn new(line: u32, kind: EventKind) -> Self {
        LoaderEvent { line, kind }
    }
}

/// Feed `events` to `session` until the input ends or the load stops.
///
/// Input without a final [`EventKind::Finish`] is finished at the last
/// line seen.
pub fn run<C, S, R>(
    session: &mut LoaderSession<C, S, R>,
    events: impl IntoIterator<Item = LoaderEvent>,
) -> Result<LoadSummary, LoadStop>
where
    C: SchemaCatalog,
    S: ObjectStore,
    R: ReportSink,
{
    let mut last_line = 0;
    for event in events {
        last_line = event.line;
        if event.kind == EventKind::Finish {
            return session.finish(event.line);
        }
        session.apply(event)?;
    }
    session.finish(last_line)
}
