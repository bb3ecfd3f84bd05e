//! Client configuration.
//!
//! [`EsConfig`] is built from an ordered list of option closures, the same
//! way `new_converter` receives them:
//!
//! ```rust
//! use esconvert::{EsConfig, with_host, with_ignore_above, with_pwd, with_user};
//!
//! let config = EsConfig::from_options([
//!     with_host(["http://127.0.0.1:9200"]),
//!     with_user("elastic"),
//!     with_pwd("changeme"),
//!     with_ignore_above(512),
//! ]);
//! assert_eq!(config.addresses, vec!["http://127.0.0.1:9200".to_string()]);
//! ```

use crate::error::{EsConvertError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use esconvert_log::warn;
use std::fmt;
use url::Url;

/// Node used when neither an address nor a cloud id is configured.
pub const DEFAULT_ADDRESS: &str = "http://localhost:9200";

/// A configuration option, applied in order by [`EsConfig::from_options`].
pub type ConfigOption = Box<dyn FnOnce(&mut EsConfig) + Send>;

/// Connection and mapping settings.
#[derive(Clone, Default)]
pub struct EsConfig {
    /// Cluster nodes. Only the first one is connected to.
    pub addresses: Vec<String>,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Elastic Cloud deployment id; replaces `addresses` when set.
    pub cloud_id: Option<String>,
    /// Base64-encoded `id:key`; wins over the service token and basic auth.
    pub api_key: Option<String>,
    /// Service account token; wins over basic auth.
    pub service_token: Option<String>,
    /// SHA-256 hex fingerprint of the node certificate.
    pub certificate_fingerprint: Option<String>,
    /// PEM-encoded CA certificate(s).
    pub ca_cert: Option<Vec<u8>>,
    /// `ignore_above` for keyword fields; 256 when zero or negative.
    pub ignore_above: i64,
}

/// Resolved credentials, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Auth {
    ApiKey { id: String, key: String },
    Bearer(String),
    Basic(String, String),
}

impl EsConfig {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply options in order; a later option overrides an earlier one.
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        let mut config = Self::default();
        config.apply(options);
        config
    }

    /// Apply options on top of the current values.
    pub fn apply<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        for option in options {
            option(self);
        }
    }

    /// Read configuration from the environment.
    ///
    /// `ELASTICSEARCH_URL` (comma separated), `ELASTICSEARCH_USERNAME`,
    /// `ELASTICSEARCH_PASSWORD`, `ELASTICSEARCH_CLOUD_ID`,
    /// `ELASTICSEARCH_API_KEY`, `ELASTICSEARCH_SERVICE_TOKEN`,
    /// `ELASTICSEARCH_CERT_FINGERPRINT`, `ESCONVERT_IGNORE_ABOVE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(urls) = lookup("ELASTICSEARCH_URL") {
            config.addresses = urls
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        config.username = lookup("ELASTICSEARCH_USERNAME");
        config.password = lookup("ELASTICSEARCH_PASSWORD");
        config.cloud_id = lookup("ELASTICSEARCH_CLOUD_ID");
        config.api_key = lookup("ELASTICSEARCH_API_KEY");
        config.service_token = lookup("ELASTICSEARCH_SERVICE_TOKEN");
        config.certificate_fingerprint = lookup("ELASTICSEARCH_CERT_FINGERPRINT");

        if let Some(above) = lookup("ESCONVERT_IGNORE_ABOVE")
            && let Ok(above) = above.trim().parse()
        {
            config.ignore_above = above;
        }

        config
    }

    /// Set the cluster nodes.
    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addresses = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Set basic authentication credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Connect to an Elastic Cloud deployment.
    pub fn cloud(mut self, cloud_id: impl Into<String>) -> Self {
        self.cloud_id = Some(cloud_id.into());
        self
    }

    /// Authenticate with a base64-encoded API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Authenticate with a service account token.
    pub fn service_token(mut self, token: impl Into<String>) -> Self {
        self.service_token = Some(token.into());
        self
    }

    /// Trust the given PEM CA certificate.
    pub fn ca_cert(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca_cert = Some(pem.into());
        self
    }

    /// Set the keyword `ignore_above` threshold.
    pub fn ignore_above(mut self, above: i64) -> Self {
        self.ignore_above = above;
        self
    }

    /// URL of the node to connect to when no cloud id is set.
    pub(crate) fn node_url(&self) -> std::result::Result<Url, url::ParseError> {
        let address = self
            .addresses
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_ADDRESS);

        if self.addresses.len() > 1 {
            warn!(
                "{} addresses configured, connecting to {} only",
                self.addresses.len(),
                address
            );
        }

        Url::parse(address)
    }

    /// Credentials to send, honouring API key > service token > basic auth.
    pub(crate) fn credentials(&self) -> Result<Option<Auth>> {
        if let Some(api_key) = &self.api_key {
            let decoded = STANDARD
                .decode(api_key.trim())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .ok_or_else(|| {
                    EsConvertError::Config("API key must be base64-encoded 'id:key'".to_string())
                })?;
            let (id, key) = decoded.split_once(':').ok_or_else(|| {
                EsConvertError::Config("API key must decode to 'id:key'".to_string())
            })?;
            return Ok(Some(Auth::ApiKey {
                id: id.to_string(),
                key: key.to_string(),
            }));
        }

        if let Some(token) = &self.service_token {
            return Ok(Some(Auth::Bearer(token.clone())));
        }

        if let Some(username) = &self.username {
            let password = self.password.clone().unwrap_or_default();
            return Ok(Some(Auth::Basic(username.clone(), password)));
        }

        Ok(None)
    }

    /// Reject a fingerprint the transport cannot enforce.
    ///
    /// The client libraries verify certificates against a CA, not a pinned
    /// fingerprint, so a fingerprint alone would silently weaken TLS.
    pub(crate) fn check_fingerprint(&self) -> Result<()> {
        let Some(fingerprint) = &self.certificate_fingerprint else {
            return Ok(());
        };

        let normalized: String = fingerprint.chars().filter(|c| *c != ':').collect();
        if normalized.len() != 64 || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EsConvertError::Config(format!(
                "certificate fingerprint '{}' is not a SHA-256 hex digest",
                fingerprint
            )));
        }

        if self.ca_cert.is_none() {
            return Err(EsConvertError::Config(
                "certificate fingerprint pinning is not supported; configure the CA certificate instead"
                    .to_string(),
            ));
        }

        warn!("certificate fingerprint ignored, verifying against the configured CA certificate");
        Ok(())
    }
}

impl fmt::Debug for EsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("EsConfig")
            .field("addresses", &self.addresses)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("cloud_id", &self.cloud_id)
            .field("api_key", &redacted(&self.api_key))
            .field("service_token", &redacted(&self.service_token))
            .field("certificate_fingerprint", &self.certificate_fingerprint)
            .field("ca_cert", &self.ca_cert.as_ref().map(|pem| pem.len()))
            .field("ignore_above", &self.ignore_above)
            .finish()
    }
}

/// Cluster node addresses.
pub fn with_host<I, S>(hosts: I) -> ConfigOption
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let hosts: Vec<String> = hosts.into_iter().map(Into::into).collect();
    Box::new(move |config| config.addresses = hosts)
}

/// Basic auth username.
pub fn with_user(user: impl Into<String>) -> ConfigOption {
    let user = user.into();
    Box::new(move |config| config.username = Some(user))
}

/// Basic auth password.
pub fn with_pwd(pwd: impl Into<String>) -> ConfigOption {
    let pwd = pwd.into();
    Box::new(move |config| config.password = Some(pwd))
}

/// Elastic Cloud deployment id.
pub fn with_cloud_id(cloud_id: impl Into<String>) -> ConfigOption {
    let cloud_id = cloud_id.into();
    Box::new(move |config| config.cloud_id = Some(cloud_id))
}

/// Base64-encoded API key.
pub fn with_api_key(api_key: impl Into<String>) -> ConfigOption {
    let api_key = api_key.into();
    Box::new(move |config| config.api_key = Some(api_key))
}

/// Service account token.
pub fn with_token(token: impl Into<String>) -> ConfigOption {
    let token = token.into();
    Box::new(move |config| config.service_token = Some(token))
}

/// SHA-256 certificate fingerprint.
pub fn with_finger(fingerprint: impl Into<String>) -> ConfigOption {
    let fingerprint = fingerprint.into();
    Box::new(move |config| config.certificate_fingerprint = Some(fingerprint))
}

/// PEM CA certificate.
pub fn with_ca_cert(pem: impl Into<Vec<u8>>) -> ConfigOption {
    let pem = pem.into();
    Box::new(move |config| config.ca_cert = Some(pem))
}

/// Keyword `ignore_above` threshold.
pub fn with_ignore_above(above: i64) -> ConfigOption {
    Box::new(move |config| config.ignore_above = above)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FINGERPRINT: &str = "7A:3C:9E:1F:00:11:22:33:44:55:66:77:88:99:AA:BB:CC:DD:EE:FF:01:23:45:67:89:AB:CD:EF:10:32:54:76";

    #[test]
    fn test_options_apply_in_order() {
        let config = EsConfig::from_options([
            with_host(["http://a:9200"]),
            with_ignore_above(10),
            with_host(["http://b:9200", "http://c:9200"]),
            with_ignore_above(20),
        ]);
        assert_eq!(config.addresses, vec!["http://b:9200", "http://c:9200"]);
        assert_eq!(config.ignore_above, 20);
    }

    #[test]
    fn test_every_option_sets_its_field() {
        let config = EsConfig::from_options([
            with_user("elastic"),
            with_pwd("secret"),
            with_cloud_id("deployment:abc"),
            with_api_key("a2V5"),
            with_token("token"),
            with_finger("ff"),
            with_ca_cert(b"pem".to_vec()),
        ]);
        assert_eq!(config.username.as_deref(), Some("elastic"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.cloud_id.as_deref(), Some("deployment:abc"));
        assert_eq!(config.api_key.as_deref(), Some("a2V5"));
        assert_eq!(config.service_token.as_deref(), Some("token"));
        assert_eq!(config.certificate_fingerprint.as_deref(), Some("ff"));
        assert_eq!(config.ca_cert.as_deref(), Some(&b"pem"[..]));
    }

    #[test]
    fn test_builder_matches_options() {
        let built = EsConfig::new()
            .hosts(["http://es:9200"])
            .basic_auth("u", "p")
            .ignore_above(64);
        let optioned = EsConfig::from_options([
            with_host(["http://es:9200"]),
            with_user("u"),
            with_pwd("p"),
            with_ignore_above(64),
        ]);
        assert_eq!(format!("{:?}", built), format!("{:?}", optioned));
    }

    #[test]
    fn test_node_url_defaults_and_validates() {
        assert_eq!(
            EsConfig::new().node_url().unwrap().as_str(),
            "http://localhost:9200/"
        );

        let err = EsConfig::new().hosts(["not a url"]).node_url().unwrap_err();
        assert_eq!(err, url::ParseError::RelativeUrlWithoutBase);
        assert_eq!(
            EsConfig::new().hosts(["http://b:9200", "bad"]).node_url().unwrap().as_str(),
            "http://b:9200/"
        );
    }

    #[test]
    fn test_credential_precedence() {
        let api_key = STANDARD.encode("my-id:my-key");
        let all = EsConfig::new()
            .basic_auth("u", "p")
            .service_token("tok")
            .api_key(api_key);
        assert_eq!(
            all.credentials().unwrap(),
            Some(Auth::ApiKey {
                id: "my-id".into(),
                key: "my-key".into()
            })
        );

        let token_and_basic = EsConfig::new().basic_auth("u", "p").service_token("tok");
        assert_eq!(
            token_and_basic.credentials().unwrap(),
            Some(Auth::Bearer("tok".into()))
        );

        let user_only = EsConfig::from_options([with_user("u")]);
        assert_eq!(
            user_only.credentials().unwrap(),
            Some(Auth::Basic("u".into(), String::new()))
        );

        assert_eq!(EsConfig::new().credentials().unwrap(), None);
    }

    #[test]
    fn test_malformed_api_key() {
        let not_base64 = EsConfig::new().api_key("%%%");
        assert!(matches!(
            not_base64.credentials(),
            Err(EsConvertError::Config(_))
        ));

        let no_separator = EsConfig::new().api_key(STANDARD.encode("justakey"));
        assert!(matches!(
            no_separator.credentials(),
            Err(EsConvertError::Config(_))
        ));
    }

    #[test]
    fn test_fingerprint_needs_ca() {
        assert!(EsConfig::new().check_fingerprint().is_ok());

        let alone = EsConfig::from_options([with_finger(FINGERPRINT)]);
        assert!(matches!(
            alone.check_fingerprint(),
            Err(EsConvertError::Config(ref msg)) if msg.contains("not supported")
        ));

        let with_ca = EsConfig::from_options([with_finger(FINGERPRINT), with_ca_cert(b"pem".to_vec())]);
        assert!(with_ca.check_fingerprint().is_ok());

        let garbage = EsConfig::from_options([with_finger("xyz"), with_ca_cert(b"pem".to_vec())]);
        assert!(matches!(
            garbage.check_fingerprint(),
            Err(EsConvertError::Config(ref msg)) if msg.contains("SHA-256")
        ));
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ELASTICSEARCH_URL", "http://a:9200, http://b:9200,"),
            ("ELASTICSEARCH_USERNAME", "elastic"),
            ("ESCONVERT_IGNORE_ABOVE", "1024"),
        ]);
        let config = EsConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.addresses, vec!["http://a:9200", "http://b:9200"]);
        assert_eq!(config.username.as_deref(), Some("elastic"));
        assert_eq!(config.password, None);
        assert_eq!(config.ignore_above, 1024);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = EsConfig::new()
            .basic_auth("elastic", "hunter2")
            .service_token("tok-123")
            .api_key("c2VjcmV0");
        let printed = format!("{:?}", config);
        assert!(printed.contains("elastic"));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("tok-123"));
        assert!(!printed.contains("c2VjcmV0"));
    }
}
