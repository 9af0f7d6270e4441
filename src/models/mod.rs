//! Data models

pub mod row;
pub mod vercel;

pub use row::*;
pub use vercel::*;
