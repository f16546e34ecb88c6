//! PBX Core - Shared error taxonomy and configuration
//!
//! This crate provides:
//! - The error type every PBX manager crate converts into
//! - Layered configuration resolution for the SOAP admin endpoint

pub mod config;
pub mod error;

pub use config::{PbxConfig, ProxyConfig, RecordingPolicyConfig, SoapConfig, TlsConfig};
pub use error::{PbxError, Result};
