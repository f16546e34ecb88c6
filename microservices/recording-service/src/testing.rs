//! In-memory admin service for unit tests

use async_trait::async_trait;
use pbx_soap_sdk::{AdminService, FindUserQuery, SoapError, UserInfo, XmlElement};
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned PBX: users searchable by E.164 number, configs keyed by cn
pub struct MockAdminService {
    by_number: HashMap<String, Vec<String>>,
    configs: HashMap<String, String>,
    modify_response: Result<String, String>,
    find_fault: Option<String>,
    submitted: Mutex<Vec<String>>,
    shown: Mutex<Vec<String>>,
}

impl MockAdminService {
    pub fn new() -> Self {
        Self {
            by_number: HashMap::new(),
            configs: HashMap::new(),
            modify_response: Ok("<ok/>".to_string()),
            find_fault: None,
            submitted: Mutex::new(Vec::new()),
            shown: Mutex::new(Vec::new()),
        }
    }

    /// Register a user reachable via `number` with the given `show` payload
    pub fn with_user(mut self, number: &str, cn: &str, config_xml: &str) -> Self {
        self.by_number
            .entry(number.to_string())
            .or_default()
            .push(cn.to_string());
        self.configs.insert(cn.to_string(), config_xml.to_string());
        self
    }

    /// Payload returned for `<modify>` commands
    pub fn with_modify_response(mut self, response: &str) -> Self {
        self.modify_response = Ok(response.to_string());
        self
    }

    /// Make `<modify>` commands fail with a SOAP fault
    pub fn with_modify_fault(mut self, message: &str) -> Self {
        self.modify_response = Err(message.to_string());
        self
    }

    /// Make every `FindUser` call fail with a SOAP fault
    pub fn with_find_fault(mut self, message: &str) -> Self {
        self.find_fault = Some(message.to_string());
        self
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

fn fault(message: &str) -> SoapError {
    SoapError::Fault {
        code: "SOAP-ENV:Server".to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl AdminService for MockAdminService {
    async fn find_user(&self, query: &FindUserQuery) -> pbx_soap_sdk::Result<Vec<UserInfo>> {
        if let Some(message) = &self.find_fault {
            return Err(fault(message));
        }

        let cns = query
            .e164
            .as_ref()
            .and_then(|number| self.by_number.get(number))
            .cloned()
            .or_else(|| query.cn.clone().filter(|cn| self.configs.contains_key(cn)).map(|cn| vec![cn]))
            .unwrap_or_default();

        Ok(cns
            .into_iter()
            .map(|cn| UserInfo {
                cn,
                e164: query.e164.clone(),
                ..UserInfo::default()
            })
            .collect())
    }

    async fn admin(&self, command: &str) -> pbx_soap_sdk::Result<String> {
        let root = XmlElement::parse(command)?;
        match root.name() {
            "show" => {
                let cn = root
                    .child("user")
                    .and_then(|u| u.attr("cn"))
                    .unwrap_or_default()
                    .to_string();
                self.shown.lock().unwrap().push(cn.clone());
                self.configs
                    .get(&cn)
                    .cloned()
                    .ok_or_else(|| fault(&format!("unknown user {}", cn)))
            }
            "modify" => {
                self.submitted.lock().unwrap().push(command.to_string());
                self.modify_response.clone().map_err(|message| fault(&message))
            }
            other => Err(fault(&format!("unsupported command {}", other))),
        }
    }
}
