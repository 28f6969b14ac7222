use crate::*;

use async_trait::async_trait;
use ban_engine::{
    config::IdentityConfig,
    id::AccountId,
    notice::{DisplayNameResolver, ResolutionError},
};
use reqwest::{Client, Url};
use thiserror::Error;

const ACCOUNT_QUERY_PATH: &str = "api/query/userid";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid identity API URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("Couldn't build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Resolves account display names by querying the identity service over
/// HTTP(S).
///
/// Each lookup is a single request, bounded by the configured timeout.
pub struct HttpDisplayNameResolver {
    client: Client,
    query_url: Url,
}

impl HttpDisplayNameResolver {
    pub fn new(config: &IdentityConfig) -> Result<Self, ClientError> {
        let invalid = |e: &dyn std::fmt::Display| {
            ClientError::InvalidUrl(config.api_url.clone(), e.to_string())
        };

        let mut base = Url::parse(&config.api_url).map_err(|e| invalid(&e))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let query_url = base.join(ACCOUNT_QUERY_PATH).map_err(|e| invalid(&e))?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { client, query_url })
    }

    /// The URL queried to look up the given account
    pub fn account_url(&self, account: &AccountId) -> Url {
        let mut url = self.query_url.clone();
        url.query_pairs_mut()
            .append_pair("userid", &account.to_string());
        url
    }
}

#[async_trait]
impl DisplayNameResolver for HttpDisplayNameResolver {
    #[tracing::instrument(skip(self))]
    async fn resolve_display_name(&self, account: AccountId) -> Result<String, ResolutionError> {
        let response = self
            .client
            .get(self.account_url(&account))
            .send()
            .await
            .map_err(|e| ResolutionError::Transport(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ResolutionError::Transport(Box::new(e)))?;
        let name = parse_display_name(&body)?;

        tracing::debug!(%account, %name, "Resolved display name");
        Ok(name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ban_engine::notice::{resolve_admin_name, AdminName};
    use std::{net::SocketAddr, str::FromStr, time::Duration};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    };

    const ADMIN: &str = "6f1a5b1e-7b37-4c8e-9b6c-0a2f3e4d5c6b";

    fn config_for(addr: SocketAddr) -> IdentityConfig {
        IdentityConfig {
            api_url: format!("http://{}", addr),
            timeout_ms: 2000,
        }
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    /// Accept one connection, reply with the canned response, and report the
    /// request line that was received
    async fn serve_once(response: String) -> (SocketAddr, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (send, recv) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request);
            let _ = send.send(request.lines().next().unwrap_or_default().to_string());

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (addr, recv)
    }

    #[test]
    fn account_url_includes_user_id() {
        let config = IdentityConfig {
            api_url: "https://identity.example.org/auth".to_string(),
            timeout_ms: 1000,
        };
        let resolver = HttpDisplayNameResolver::new(&config).unwrap();
        let url = resolver.account_url(&AccountId::from_str(ADMIN).unwrap());

        assert_eq!(
            url.as_str(),
            format!("https://identity.example.org/auth/api/query/userid?userid={}", ADMIN)
        );
    }

    #[test]
    fn bad_api_url_is_rejected() {
        let config = IdentityConfig {
            api_url: "not a url".to_string(),
            timeout_ms: 1000,
        };
        assert!(matches!(
            HttpDisplayNameResolver::new(&config),
            Err(ClientError::InvalidUrl(..))
        ));
    }

    #[tokio::test]
    async fn resolves_name_from_service() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let body = r#"{"userName":"Moderator"}"#;
        let (addr, request) = serve_once(http_response("200 OK", body)).await;
        let resolver = HttpDisplayNameResolver::new(&config_for(addr)).unwrap();

        let name = resolver
            .resolve_display_name(AccountId::from_str(ADMIN).unwrap())
            .await
            .unwrap();

        assert_eq!(name, "Moderator");
        assert_eq!(
            request.await.unwrap(),
            format!("GET /api/query/userid?userid={} HTTP/1.1", ADMIN)
        );
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (addr, _request) = serve_once(http_response("404 Not Found", "{}")).await;
        let resolver = HttpDisplayNameResolver::new(&config_for(addr)).unwrap();

        let err = resolver
            .resolve_display_name(AccountId::from_str(ADMIN).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ResolutionError::Status(404)));
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_unknown() {
        let (addr, _request) = serve_once(http_response("200 OK", "not json")).await;
        let resolver = HttpDisplayNameResolver::new(&config_for(addr)).unwrap();

        let name = resolve_admin_name(
            &resolver,
            Some(AccountId::from_str(ADMIN).unwrap()),
            Duration::from_secs(2),
        )
        .await;

        assert_eq!(name, AdminName::Unknown);
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_unknown() {
        // Bind and immediately release a port so nothing is listening on it
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let resolver = HttpDisplayNameResolver::new(&config_for(addr)).unwrap();

        let name = resolve_admin_name(
            &resolver,
            Some(AccountId::from_str(ADMIN).unwrap()),
            Duration::from_secs(2),
        )
        .await;

        assert_eq!(name, AdminName::Unknown);
    }
}
