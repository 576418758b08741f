//! # Route Modules
//!
//! | Prefix            | Module            |
//! |-------------------|-------------------|
//! | `/restrictions/*` | [`restrictions`]  |
//! | `/health/*`       | [`health`]        |

pub mod health;
pub mod restrictions;
