//! Domain layer public interface.
//!
//! This module defines domain-level abstractions that are independent of
//! transport implementations and infrastructure concerns.
//!
//! All domain consumers must import symbols via this module, not by
//! referencing individual files directly.

mod transport;

// --- Transport domain re-exports ---

pub use transport::{
    //
    HttpReply,
    Transport,
    TransportPtr,
    CONTENT_SHA1_HEADER,
    CONTENT_TYPE_HEADER,
    CONTENT_TYPE_JSON,
};
