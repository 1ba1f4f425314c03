//! API response primitives shared across features

pub mod response;
