//! Delivery of sealed envelopes.
//!
//! The core never performs I/O; a transport takes a finished [`Envelope`]
//! and returns the service's parsed JSON answer.
//!
//! [`Envelope`]: crate::Envelope

mod http;
mod traits;

pub use http::HttpTransport;
pub use traits::EnvelopeTransport;
