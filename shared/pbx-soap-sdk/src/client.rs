//! PBX admin SOAP client

use async_trait::async_trait;
use pbx_core::PbxConfig;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use crate::envelope;
use crate::{FindUserQuery, Result, SoapError, UserInfo};

/// The two remote admin operations the PBX manager consumes
#[async_trait]
pub trait AdminService: Send + Sync {
    /// Search users by common name, H.323 alias or E.164 number
    async fn find_user(&self, query: &FindUserQuery) -> Result<Vec<UserInfo>>;

    /// Execute a generic admin command (`<show>`, `<modify>`, ...) and
    /// return the raw response payload
    async fn admin(&self, command: &str) -> Result<String>;
}

/// `AdminService` over SOAP/HTTP
pub struct SoapClient {
    http: reqwest::Client,
    endpoint: String,
    namespace: String,
    login: Option<String>,
    password: Option<String>,
}

impl SoapClient {
    /// Build a client from configuration.
    ///
    /// Returns `Ok(None)` when no endpoint is configured.
    pub fn from_config(config: &PbxConfig) -> Result<Option<Self>> {
        let Some(url) = config.soap.endpoint() else {
            tracing::warn!("No SOAP endpoint configured, PBX admin client disabled");
            return Ok(None);
        };

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.soap.connect_timeout_secs))
            .http1_only()
            .danger_accept_invalid_certs(!config.tls.verify_peer)
            .danger_accept_invalid_hostnames(!config.tls.verify_peer_name);

        if let Some(proxy_url) = config.proxy.url() {
            let mut proxy = reqwest::Proxy::all(&proxy_url)
                .map_err(|e| SoapError::Config(format!("Invalid proxy {}: {}", proxy_url, e)))?;
            if let Some(login) = &config.proxy.login {
                proxy = proxy.basic_auth(login, config.proxy.password.as_deref().unwrap_or(""));
            }
            builder = builder.proxy(proxy);
        } else {
            // only the configured proxy is used, never *_PROXY from the environment
            builder = builder.no_proxy();
        }

        let http = builder
            .build()
            .map_err(|e| SoapError::Config(e.to_string()))?;

        let endpoint = strip_wsdl_query(url).to_string();
        tracing::info!(
            endpoint = %endpoint,
            verify_peer = config.tls.verify_peer,
            verify_peer_name = config.tls.verify_peer_name,
            "PBX admin client configured"
        );

        Ok(Some(Self {
            http,
            endpoint,
            namespace: config.soap.namespace.clone(),
            login: config.soap.login.clone(),
            password: config.soap.password.clone(),
        }))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST an envelope and return the response document
    async fn call(&self, operation: &str, body: String) -> Result<String> {
        tracing::debug!(operation, endpoint = %self.endpoint, "SOAP request");

        let mut request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}{}\"", self.namespace, operation))
            .body(body);

        if let Some(login) = &self.login {
            request = request.basic_auth(login, self.password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // SOAP 1.1 servers report faults with HTTP 500
            if let Err(fault @ SoapError::Fault { .. }) = envelope::check_fault(&text) {
                return Err(fault);
            }
            return Err(SoapError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!(operation, status = status.as_u16(), "SOAP response");
        Ok(text)
    }
}

#[async_trait]
impl AdminService for SoapClient {
    async fn find_user(&self, query: &FindUserQuery) -> Result<Vec<UserInfo>> {
        let body = envelope::find_user_request(&self.namespace, query)?;
        let response = self.call(envelope::FIND_USER, body).await?;
        envelope::parse_find_user_response(&response)
    }

    async fn admin(&self, command: &str) -> Result<String> {
        let body = envelope::admin_request(&self.namespace, command)?;
        let response = self.call(envelope::ADMIN, body).await?;
        envelope::parse_admin_response(&response)
    }
}

fn strip_wsdl_query(url: &str) -> &str {
    url.strip_suffix("?wsdl")
        .or_else(|| url.strip_suffix("?WSDL"))
        .unwrap_or(url)
}
