//! Compile-time checked fluent builders.
//!
//! `#[derive(StagedBuilder)]` gives a struct a `builder()` factory whose
//! return type tracks which members have been supplied. Mandatory members
//! (fields without a default) are offered first, each exactly once and in any
//! order; optional members follow; `build()` only exists on stages where every
//! mandatory member is in. Every step takes `&self`, so an intermediate
//! builder can be kept and branched from.
//!
//! ```
//! use staged_builder::StagedBuilder;
//!
//! #[derive(Debug, PartialEq, StagedBuilder)]
//! pub struct Rec {
//!     value: i32,
//!     name: String,
//!     #[builder(default = "10")]
//!     quantity: i32,
//! }
//!
//! let half = Rec::builder().add_name("a".to_string());
//! let rec = half.add_value(1).build();
//! assert_eq!(rec, Rec { value: 1, name: "a".to_string(), quantity: 10 });
//!
//! let more = half.add_value(2).add_quantity(3).build();
//! assert_eq!(more.quantity, 3);
//! ```
//!
//! `build()` is missing until every mandatory member is supplied:
//!
//! ```compile_fail,E0599
//! use staged_builder::StagedBuilder;
//!
//! #[derive(StagedBuilder)]
//! pub struct Rec {
//!     value: i32,
//!     name: String,
//! }
//!
//! let _ = Rec::builder().add_value(1).build();
//! ```
//!
//! Supplying `name` as well makes the same call compile:
//!
//! ```
//! use staged_builder::StagedBuilder;
//!
//! #[derive(StagedBuilder)]
//! pub struct Rec {
//!     value: i32,
//!     name: String,
//! }
//!
//! let _ = Rec::builder().add_value(1).add_name(String::new()).build();
//! ```
//!
//! Optional members wait until the mandatory ones are in:
//!
//! ```compile_fail,E0599
//! use staged_builder::StagedBuilder;
//!
//! #[derive(StagedBuilder)]
//! pub struct Rec {
//!     value: i32,
//!     #[builder(default = "10")]
//!     quantity: i32,
//! }
//!
//! let _ = Rec::builder().add_quantity(10);
//! ```
//!
//! After `value` it is accepted:
//!
//! ```
//! use staged_builder::StagedBuilder;
//!
//! #[derive(StagedBuilder)]
//! pub struct Rec {
//!     value: i32,
//!     #[builder(default = "10")]
//!     quantity: i32,
//! }
//!
//! let _ = Rec::builder().add_value(1).add_quantity(10);
//! ```
//!
//! A member cannot be supplied twice:
//!
//! ```compile_fail,E0599
//! use staged_builder::StagedBuilder;
//!
//! #[derive(StagedBuilder)]
//! pub struct Rec {
//!     value: i32,
//!     name: String,
//! }
//!
//! let _ = Rec::builder().add_value(1).add_value(2);
//! ```
//!
//! while each member once is fine:
//!
//! ```
//! use staged_builder::StagedBuilder;
//!
//! #[derive(StagedBuilder)]
//! pub struct Rec {
//!     value: i32,
//!     name: String,
//! }
//!
//! let _ = Rec::builder().add_value(1).add_name(String::new());
//! ```

pub use staged_builder_core as codegen;
pub use staged_builder_derive::StagedBuilder;

///
/// Prelude
///

pub mod prelude {
    pub use crate::StagedBuilder;
    pub use staged_builder_core::prelude::*;
}
