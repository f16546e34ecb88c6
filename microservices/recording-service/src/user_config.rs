//! User configuration documents
//!
//! The PBX answers `<show><user cn="..."/></show>` with the user's full
//! configuration. Only the `user` element matters here: its `grp` children
//! carry group membership, `phone/rec` carries the call recording setup.

use pbx_core::{PbxError, Result};
use pbx_soap_sdk::XmlElement;
use serde::Serialize;

/// Exact payload the PBX returns for an accepted `<modify>`
pub const ACK_PAYLOAD: &str = "<ok/>";

pub const MODE_TRANSPARENT: &str = "transparent";
pub const MODE_OFF: &str = "off";

/// A user's configuration, reduced to its `user` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserConfigDocument {
    user: XmlElement,
}

/// A configuration given either parsed or as XML text
pub enum UserConfigSource<'a> {
    Document(&'a UserConfigDocument),
    Xml(&'a str),
}

impl<'a> From<&'a UserConfigDocument> for UserConfigSource<'a> {
    fn from(doc: &'a UserConfigDocument) -> Self {
        UserConfigSource::Document(doc)
    }
}

impl<'a> From<&'a str> for UserConfigSource<'a> {
    fn from(xml: &'a str) -> Self {
        UserConfigSource::Xml(xml)
    }
}

/// Attributes of `phone/rec`, as stored (missing ones are `None`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordingSettings {
    pub mode: Option<String>,
    pub recv: Option<String>,
    pub fkey: Option<String>,
    pub ac: Option<String>,
    pub e164: Option<String>,
}

impl RecordingSettings {
    fn from_rec(rec: &XmlElement) -> Self {
        let attr = |key: &str| rec.attr(key).map(str::to_string);
        Self {
            mode: attr("mode"),
            recv: attr("recv"),
            fkey: attr("fkey"),
            ac: attr("ac"),
            e164: attr("e164"),
        }
    }

    /// Recording counts as on only for transparent mode, no two-way media,
    /// function key control and auto-connect, all at once.
    pub fn is_enabled(&self) -> bool {
        self.mode.as_deref() == Some(MODE_TRANSPARENT)
            && self.recv.as_deref() == Some("0")
            && self.ac.as_deref() == Some("1")
            && self.fkey.as_deref() == Some("1")
    }
}

impl UserConfigDocument {
    /// Parse a `show` response; the `user` element may be the root or a
    /// direct child of it.
    pub fn parse(xml: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        Self::from_element(root)
    }

    pub fn from_element(root: XmlElement) -> Result<Self> {
        if root.local_name() == "user" {
            return Ok(Self { user: root });
        }
        root.child("user")
            .cloned()
            .map(|user| Self { user })
            .ok_or_else(|| {
                PbxError::Xml(format!("no <user> element in <{}> document", root.name()))
            })
    }

    pub fn user(&self) -> &XmlElement {
        &self.user
    }

    pub fn common_name(&self) -> Option<&str> {
        self.user().attr("cn")
    }

    /// `name` of every `grp` element, in document order
    pub fn groups(&self) -> Vec<String> {
        self.user()
            .children_named("grp")
            .filter_map(|grp| grp.attr("name"))
            .map(str::to_string)
            .collect()
    }

    /// Current `phone/rec` settings; empty when either element is missing
    pub fn recording(&self) -> RecordingSettings {
        self.user
            .child("phone")
            .and_then(|phone| phone.child("rec"))
            .map(RecordingSettings::from_rec)
            .unwrap_or_default()
    }

    /// Rewrite `phone/rec`, creating both elements when missing.
    ///
    /// `recv` and `fkey` are forced to `0`/`1` whatever the direction; only
    /// `mode`, `ac` and `e164` follow `enable`.
    pub fn apply_recording(&mut self, enable: bool, supervisor: Option<&str>) {
        let rec = self.user.ensure_child("phone").ensure_child("rec");

        rec.set_attr("mode", if enable { MODE_TRANSPARENT } else { MODE_OFF });
        rec.set_attr("recv", "0");
        rec.set_attr("fkey", "1");
        rec.set_attr("ac", if enable { "1" } else { "0" });

        match supervisor.filter(|_| enable) {
            Some(number) => rec.set_attr("e164", number),
            None => {
                rec.remove_attr("e164");
            }
        }
    }

    /// The user wrapped in the admin API's `<modify>` command
    pub fn to_modify_command(&self) -> Result<String> {
        let command = XmlElement::new("modify").with_child(self.user.clone());
        Ok(command.to_document()?)
    }

    pub fn to_xml(&self) -> Result<String> {
        Ok(self.user.to_xml()?)
    }
}

/// Group names of a configuration given as document or XML text
pub fn user_groups<'a>(config: impl Into<UserConfigSource<'a>>) -> Result<Vec<String>> {
    match config.into() {
        UserConfigSource::Document(doc) => Ok(doc.groups()),
        UserConfigSource::Xml(xml) => Ok(UserConfigDocument::parse(xml)?.groups()),
    }
}

/// Apply the recording settings and build the `<modify>` command to submit
pub fn set_recording_conf(
    config: &mut UserConfigDocument,
    enable: bool,
    supervisor: Option<&str>,
) -> Result<String> {
    config.apply_recording(enable, supervisor);
    config.to_modify_command()
}
