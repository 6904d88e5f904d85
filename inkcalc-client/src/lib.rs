//! # InkCalc Client
//!
//! Sends a canvas snapshot and the current variable bindings to the
//! recognition service and applies the answer to a shared session.
//!
//! ```text
//! RecognitionClient::run
//!   ├─ Session::begin_recognition      (lock held briefly)
//!   ├─ CanvasSnapshot::encode_data_url
//!   ├─ RecognitionTransport::recognize (await, no lock)
//!   ├─ RecognitionResponse::from_value
//!   └─ Session::complete_recognition   (lock held briefly)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod transport;

pub use client::{RecognitionClient, RunOutcome};
pub use error::ClientError;
pub use transport::{HttpTransport, RecognitionConfig, RecognitionTransport, CALCULATE_PATH};
