//! Stitch Core Types
//!
//! This crate provides the foundational types shared by every Stitch crate:
//! - Document values (the Value enum and the Document map)
//! - Record identity (RecordId)
//! - Filter and array-update operators
//! - The Mutation payload handed to the store

mod id;
mod operator;
mod payload;
mod value;

pub use id::*;
pub use operator::*;
pub use payload::*;
pub use value::*;
