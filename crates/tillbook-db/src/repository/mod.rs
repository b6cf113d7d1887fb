//! # Repository Layer
//!
//! One repository per aggregate. Parent records and their item rows are
//! written and read separately; composition into domain types happens
//! here, not in queries.

pub mod invoice;
pub mod product;
pub mod sale;
pub mod shop;
pub mod supply;
