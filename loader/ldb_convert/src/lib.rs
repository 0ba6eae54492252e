//! Conversion of load-file tokens into typed values.
//!
//! - [`integer`], [`real`], [`text`], [`temporal`]: literal parsers and
//!   precision rules
//! - [`convert_element`]: a token to its natural value
//! - [`coerce`]: a value cast to a declared domain
//! - [`SetterTable`]/[`set_direct`]: the per-attribute fast path into an
//!   instance image
//! - [`check_object_domain`]/[`check_class_domain`]: reference domain checks

mod coerce;
mod element;
pub mod integer;
mod matrix;
mod object;
pub mod real;
pub mod temporal;
pub mod text;

pub use coerce::{coerce, coerce_collection};
pub use element::convert_element;
pub use matrix::{
    convert, select_op, set_direct, store_value, value_for, AttrTarget, SetOutcome, SetterOp,
    SetterTable,
};
pub use object::{check_class_domain, check_object_domain, ClassHierarchy};
