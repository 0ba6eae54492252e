//! Core data types shared by the loader crates.
//!
//! - [`ClassId`], [`AttrId`], [`MethodId`], [`ObjectId`]: opaque handles
//! - [`Oid`]: temporary or permanent storage identity
//! - [`LexicalType`]: how a token was written in the load file
//! - [`Domain`]/[`DomainList`]: declared attribute types
//! - [`TypedValue`]: converted values
//! - [`ObjectImage`]: attribute slots of an instance under construction

mod domain;
mod ids;
mod image;
mod lexical;
pub mod value;

pub use domain::{
    CollectionKind, Domain, DomainKind, DomainList, MAX_NUMERIC_PRECISION, MAX_VARIABLE_PRECISION,
};
pub use ids::{AttrId, ClassId, MethodId, ObjectId, Oid, Ordinal, PermanentOid};
pub use image::ObjectImage;
pub use lexical::LexicalType;
pub use value::{BitString, CollectionValue, Currency, Monetary, Numeric, NumericError, TypedValue, Zone};
