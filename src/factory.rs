//! Client construction from options.

use crate::client::{EsClient, MappingClient};
use crate::config::{Auth, ConfigOption, EsConfig};
use crate::error::Result;
use crate::version::EsVersion;
use esconvert_log::{debug, info};

/// Builds an `Elasticsearch` client of crate `$es` from an [`EsConfig`],
/// returning early from the enclosing function on error.
macro_rules! build_client {
    ($es:ident, $config:expr) => {{
        use $es::auth::Credentials;
        use $es::http::transport::{CloudConnectionPool, SingleNodeConnectionPool, TransportBuilder};

        let config: &EsConfig = $config;

        let mut builder = match &config.cloud_id {
            Some(cloud_id) => {
                debug!("Connecting to cloud deployment");
                TransportBuilder::new(CloudConnectionPool::new(cloud_id)?)
            }
            None => {
                let url = config.node_url().map_err($es::Error::from)?;
                TransportBuilder::new(SingleNodeConnectionPool::new(url))
            }
        };

        builder = builder.disable_proxy();

        match config.credentials()? {
            Some(Auth::ApiKey { id, key }) => builder = builder.auth(Credentials::ApiKey(id, key)),
            Some(Auth::Bearer(token)) => builder = builder.auth(Credentials::Bearer(token)),
            Some(Auth::Basic(user, pass)) => builder = builder.auth(Credentials::Basic(user, pass)),
            None => {}
        }

        if let Some(pem) = &config.ca_cert {
            #[cfg(any(feature = "rustls", feature = "native-tls"))]
            {
                use $es::cert::{Certificate, CertificateValidation};
                builder = builder.cert_validation(CertificateValidation::Full(Certificate::from_pem(pem)?));
            }
            #[cfg(not(any(feature = "rustls", feature = "native-tls")))]
            {
                let _ = pem;
                return Err(crate::error::EsConvertError::Config(
                    "a CA certificate needs the rustls or native-tls feature".to_string(),
                ));
            }
        }

        let transport = builder.build().map_err($es::Error::from)?;
        $es::Elasticsearch::new(transport)
    }};
}

/// Build a [`MappingClient`] for `version` from `options`.
///
/// Options are applied in order, so a later option overrides an earlier one.
///
/// ```rust
/// use esconvert::{EsVersion, new_converter, with_host, with_ignore_above};
///
/// let tool = new_converter(
///     EsVersion::V8,
///     [with_host(["http://localhost:9200"]), with_ignore_above(128)],
/// )
/// .unwrap();
/// assert_eq!(tool.version(), Some(EsVersion::V8));
/// assert_eq!(tool.ignore_above(), 128);
/// ```
pub fn new_converter<I>(version: EsVersion, options: I) -> Result<MappingClient>
where
    I: IntoIterator<Item = ConfigOption>,
{
    let config = EsConfig::from_options(options);
    connect(version, &config)
}

/// Build a [`MappingClient`] for `version` from a ready configuration.
pub fn connect(version: EsVersion, config: &EsConfig) -> Result<MappingClient> {
    info!("Initializing {} client", version);
    debug!("Client configuration: {:?}", config);

    config.check_fingerprint()?;

    let client: EsClient = match version {
        EsVersion::V7 => build_client!(elasticsearch7, config).into(),
        EsVersion::V8 => build_client!(elasticsearch8, config).into(),
    };

    debug!("{} client initialized", version);
    Ok(MappingClient::new(client, config.ignore_above))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        with_api_key, with_ca_cert, with_cloud_id, with_finger, with_host, with_pwd, with_token,
        with_user,
    };
    use crate::error::EsConvertError;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    const TEST_CA: &str = "-----BEGIN CERTIFICATE-----\n\
MIIBjzCCATWgAwIBAgIUWAPokpfWCGHE5mjfAhB6O+0u2LQwCgYIKoZIzj0EAwIw\n\
HDEaMBgGA1UEAwwRZXNjb252ZXJ0IHRlc3QgQ0EwIBcNMjYxMDE4MTkyNDQ1WhgP\n\
MjEyNjA5MjQxOTI0NDVaMBwxGjAYBgNVBAMMEWVzY29udmVydCB0ZXN0IENBMFkw\n\
EwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEAjyfCd9inSIx+Sqr5EnC3lGDPYjtLw55\n\
GFBuxRNxwbcIeNbh8BElY8IucyDyZ6nw+4lV22N1ezcUsrwRI14jzaNTMFEwHQYD\n\
VR0OBBYEFKdnCZRxfVjEYYkRjy/53c2XHy2yMB8GA1UdIwQYMBaAFKdnCZRxfVjE\n\
YYkRjy/53c2XHy2yMA8GA1UdEwEB/wQFMAMBAf8wCgYIKoZIzj0EAwIDSAAwRQIh\n\
AIjNGqc7XSwGafHPh/jtz/V4B2/GFcTO69mlqZ7xSFZ6AiBSh4JeYtLn8abqO5wq\n\
/0aSlsh2qOz3y4aK/L7M0IcpzQ==\n\
-----END CERTIFICATE-----\n";

    const TEST_CA_FINGERPRINT: &str = "93:DB:D9:C5:BF:FB:17:96:34:1A:E0:36:90:DF:32:05:A9:B6:0A:D4:27:5A:00:67:B4:A2:0A:D6:9D:49:60:FB";

    #[test]
    fn test_builds_both_generations() {
        for version in [EsVersion::V7, EsVersion::V8] {
            let tool = new_converter(
                version,
                [with_host(["http://127.0.0.1:9200"]), with_user("elastic"), with_pwd("changeme")],
            )
            .unwrap();
            assert_eq!(tool.version(), Some(version));
            assert_eq!(tool.ignore_above(), 256);
        }
    }

    #[test]
    fn test_default_address_and_extra_hosts() {
        let tool = new_converter(EsVersion::V7, []).unwrap();
        assert_eq!(tool.version(), Some(EsVersion::V7));

        let tool = new_converter(
            EsVersion::V8,
            [with_host(["http://a:9200", "http://b:9200"])],
        )
        .unwrap();
        assert_eq!(tool.version(), Some(EsVersion::V8));
    }

    #[test]
    fn test_api_key_and_token() {
        let key = STANDARD.encode("id:secret");
        assert!(new_converter(EsVersion::V8, [with_api_key(key), with_token("tok")]).is_ok());
        assert!(new_converter(EsVersion::V7, [with_token("tok")]).is_ok());

        let err = new_converter(EsVersion::V8, [with_api_key("not base64!")]).unwrap_err();
        assert!(matches!(err, EsConvertError::Config(_)));
    }

    #[test]
    fn test_bad_address() {
        let err = new_converter(EsVersion::V7, [with_host(["::not a url::"])]).unwrap_err();
        assert!(matches!(err, EsConvertError::V7(_)), "{:?}", err);

        let err = new_converter(EsVersion::V8, [with_host(["::not a url::"])]).unwrap_err();
        assert!(matches!(err, EsConvertError::V8(_)), "{:?}", err);
    }

    #[test]
    fn test_fingerprint_without_ca() {
        let fingerprint = "ab".repeat(32);
        let err = new_converter(EsVersion::V8, [with_finger(fingerprint)]).unwrap_err();
        assert!(matches!(err, EsConvertError::Config(_)));
    }

    #[test]
    fn test_bad_cloud_id() {
        let err = new_converter(EsVersion::V7, [with_cloud_id("no-colon-here")]).unwrap_err();
        assert!(matches!(err, EsConvertError::V7(_)));

        let err = new_converter(EsVersion::V8, [with_cloud_id("no-colon-here")]).unwrap_err();
        assert!(matches!(err, EsConvertError::V8(_)));
    }

    #[cfg(any(feature = "rustls", feature = "native-tls"))]
    #[test]
    fn test_ca_certificate() {
        for version in [EsVersion::V7, EsVersion::V8] {
            let tool = new_converter(
                version,
                [with_host(["https://127.0.0.1:9200"]), with_ca_cert(TEST_CA.as_bytes())],
            )
            .unwrap();
            assert_eq!(tool.version(), Some(version));
        }
    }

    #[cfg(any(feature = "rustls", feature = "native-tls"))]
    #[test]
    fn test_fingerprint_with_ca() {
        let tool = new_converter(
            EsVersion::V8,
            [
                with_host(["https://127.0.0.1:9200"]),
                with_finger(TEST_CA_FINGERPRINT),
                with_ca_cert(TEST_CA.as_bytes()),
            ],
        )
        .unwrap();
        assert_eq!(tool.version(), Some(EsVersion::V8));
    }

    #[cfg(any(feature = "rustls", feature = "native-tls"))]
    #[test]
    fn test_bad_ca_certificate() {
        let garbage = "-----BEGIN CERTIFICATE-----\nbm90IGEgY2VydGlmaWNhdGU=\n-----END CERTIFICATE-----\n";

        let err = new_converter(EsVersion::V7, [with_ca_cert(garbage.as_bytes())]).unwrap_err();
        assert!(matches!(err, EsConvertError::V7(_)), "{:?}", err);

        let err = new_converter(EsVersion::V8, [with_ca_cert(garbage.as_bytes())]).unwrap_err();
        assert!(matches!(err, EsConvertError::V8(_)), "{:?}", err);
    }
}
