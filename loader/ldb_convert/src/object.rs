//! Domain checks for object references.

use ldb_diagnostic::{LoadErrorKind, LoadResult};
use ldb_ir::{ClassId, DomainKind, DomainList};

/// The slice of the schema the object checks need.
pub trait ClassHierarchy {
    /// Whether `class` is `ancestor` or inherits from it.
    fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool;

    fn display_name(&self, class: ClassId) -> String;
}

/// Pick the class an instance reference resolves in.
///
/// With an explicit class, some object alternative of the domain must
/// accept it (unrestricted, or the class or one of its superclasses).
/// Without one, the domain must name exactly one class.
pub fn check_object_domain(
    domains: &DomainList,
    referenced: Option<ClassId>,
    hierarchy: &impl ClassHierarchy,
) -> LoadResult<ClassId> {
    let mut objects = domains.iter().filter(|d| d.kind == DomainKind::Object);
    match referenced {
        Some(class) => {
            let accepted = objects.any(|d| match d.class {
                None => true,
                Some(ancestor) => hierarchy.is_subclass_of(class, ancestor),
            });
            if accepted {
                Ok(class)
            } else {
                Err(LoadErrorKind::ObjectDomainMismatch {
                    class: hierarchy.display_name(class),
                    domain: domain_names(domains, hierarchy),
                }
                .into())
            }
        }
        None => match (objects.next().and_then(|d| d.class), objects.next()) {
            (Some(class), None) => Ok(class),
            _ => Err(LoadErrorKind::AmbiguousDomain.into()),
        },
    }
}

/// A class object may only go into an unrestricted object domain.
pub fn check_class_domain(domains: &DomainList) -> LoadResult<()> {
    if domains
        .iter()
        .any(|d| d.kind == DomainKind::Object && d.class.is_none())
    {
        Ok(())
    } else {
        Err(LoadErrorKind::ClassObjectReference.into())
    }
}

fn domain_names(domains: &DomainList, hierarchy: &impl ClassHierarchy) -> String {
    domains
        .iter()
        .map(|d| match d.class {
            Some(class) => hierarchy.display_name(class),
            None => d.kind.name().to_owned(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
