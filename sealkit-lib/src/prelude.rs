//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use sealkit_lib::prelude::*;
//! ```
//!
//! ## What's Included
//!
//! - Sealing: `RequestBuilder`, `RequestParameters`, `Envelope`
//! - Configuration: `ProtocolConfig`, `SharedSecret`, `HttpConfig`, `ClientConfig`
//! - Error types: `SealError`, `SealErrorCode`, `Result`
//! - Delivery: `EnvelopeTransport`, `HttpTransport`, `SealedClient`

// Sealing
pub use crate::{Envelope, RequestBuilder, RequestParameters};

// Configuration
pub use crate::{ClientConfig, HttpConfig, ProtocolConfig, SharedSecret};

// Error handling
pub use crate::errors::{SealError, SealErrorCode};
pub use crate::Result;

// Delivery
pub use crate::{EnvelopeTransport, HttpTransport, SealedClient, SignInRequest};

// Clocks
pub use crate::{Clock, SystemClock};
