//! SOAP SDK for the PBX admin API
//!
//! Provides the XML element tree used for user configuration documents,
//! SOAP envelope construction/parsing, and an HTTP client for the two admin
//! operations the PBX manager consumes: `FindUser` and `Admin`.

mod client;
pub mod envelope;
mod error;
mod types;
pub mod xml;

pub use client::{AdminService, SoapClient};
pub use error::{Result, SoapError};
pub use types::{FindUserQuery, UserInfo};
pub use xml::XmlElement;
