//! SOAP 1.1 envelopes for the admin operations
//!
//! Requests are RPC style: the operation element sits in the target
//! namespace, its parameters are unqualified children in wire order.

use crate::{FindUserQuery, Result, SoapError, UserInfo, XmlElement};

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub const FIND_USER: &str = "FindUser";
pub const ADMIN: &str = "Admin";

/// `<show><user cn="..."/></show>`: fetch one user's full configuration
pub fn show_user_command(cn: &str) -> Result<String> {
    XmlElement::new("show")
        .with_child(XmlElement::new("user").with_attr("cn", cn))
        .to_xml()
}

pub fn find_user_request(namespace: &str, query: &FindUserQuery) -> Result<String> {
    let op = XmlElement::new(format!("tns:{}", FIND_USER))
        .with_child(bool_param("v501", query.v501))
        .with_child(bool_param("v700", query.v700))
        .with_child(bool_param("v800", query.v800))
        .with_child(bool_param("vx1000", query.vx1000))
        .with_child(string_param("cn", query.cn.as_deref()))
        .with_child(string_param("h323", query.h323.as_deref()))
        .with_child(string_param("e164", query.e164.as_deref()))
        .with_child(XmlElement::new("count").with_text(&query.count.to_string()))
        .with_child(bool_param("nonblock", query.nonblock))
        .with_child(bool_param("exact", query.exact));
    envelope(namespace, op)
}

pub fn admin_request(namespace: &str, command: &str) -> Result<String> {
    let op = XmlElement::new(format!("tns:{}", ADMIN))
        .with_child(XmlElement::new("xml").with_text(command));
    envelope(namespace, op)
}

fn envelope(namespace: &str, operation: XmlElement) -> Result<String> {
    XmlElement::new("soap:Envelope")
        .with_attr("xmlns:soap", SOAP_ENV_NS)
        .with_attr("xmlns:xsi", XSI_NS)
        .with_attr("xmlns:tns", namespace)
        .with_child(XmlElement::new("soap:Body").with_child(operation))
        .to_document()
}

fn bool_param(name: &str, value: bool) -> XmlElement {
    XmlElement::new(name).with_text(if value { "true" } else { "false" })
}

fn string_param(name: &str, value: Option<&str>) -> XmlElement {
    match value {
        Some(v) => XmlElement::new(name).with_text(v),
        None => XmlElement::new(name).with_attr("xsi:nil", "true"),
    }
}

/// Return a `Fault` error if the document carries one
pub fn check_fault(xml: &str) -> Result<()> {
    let root = XmlElement::parse(xml)?;
    match root.find("Fault") {
        Some(fault) => Err(fault_error(fault)),
        None => Ok(()),
    }
}

fn fault_error(fault: &XmlElement) -> SoapError {
    let field = |name: &str| {
        fault
            .child(name)
            .map(|c| c.text().trim().to_string())
            .unwrap_or_default()
    };
    SoapError::Fault {
        code: field("faultcode"),
        message: field("faultstring"),
    }
}

/// Locate `<{operation}Response>` inside the SOAP body, surfacing faults
fn operation_response(xml: &str, operation: &str) -> Result<XmlElement> {
    let root = XmlElement::parse(xml)?;
    let body = root
        .find("Body")
        .ok_or_else(|| SoapError::Protocol("missing SOAP Body".to_string()))?;

    if let Some(fault) = body.find("Fault") {
        return Err(fault_error(fault));
    }

    let expected = format!("{}Response", operation);
    body.find(&expected)
        .cloned()
        .ok_or_else(|| SoapError::Protocol(format!("missing <{}> in SOAP Body", expected)))
}

pub fn parse_find_user_response(xml: &str) -> Result<Vec<UserInfo>> {
    let response = operation_response(xml, FIND_USER)?;
    let list = response.child("return").unwrap_or(&response);

    Ok(list
        .children()
        .filter_map(|item| {
            let info = UserInfo::from_item(item);
            if info.is_none() {
                tracing::warn!(element = item.name(), "Skipping FindUser entry without cn");
            }
            info
        })
        .collect())
}

/// Extract the string returned by `Admin`
///
/// The payload normally arrives as escaped character data; an inline element
/// is re-serialized so callers always get text.
pub fn parse_admin_response(xml: &str) -> Result<String> {
    let response = operation_response(xml, ADMIN)?;
    let ret = response
        .child("return")
        .or_else(|| response.children().next())
        .ok_or_else(|| SoapError::Protocol("empty AdminResponse".to_string()))?;

    if !ret.text().trim().is_empty() || ret.children().next().is_none() {
        return Ok(ret.text());
    }
    ret.children()
        .map(XmlElement::to_xml)
        .collect::<Result<Vec<_>>>()
        .map(|parts| parts.concat())
}
