//! Replica connection setup with optional TLS.

use mysql_async::{Conn, Opts, OptsBuilder, SslOpts};
use replstop_core::{Dialect, ReplicaResult, SslMode};
use tracing::debug;

use crate::error::{connection_error, describe};

/// Where and how to connect to the replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub ssl_mode: SslMode,
    /// Statement dialect; detected from the server version when `None`.
    pub dialect: Option<Dialect>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            ssl_mode: SslMode::Disabled,
            dialect: None,
        }
    }
}

impl ConnectOptions {
    /// `host:port` for log and error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn to_opts(&self) -> Opts {
        let password = if self.password.is_empty() {
            None
        } else {
            Some(self.password.clone())
        };

        OptsBuilder::default()
            .ip_or_hostname(self.host.clone())
            .tcp_port(self.port)
            .user(Some(self.user.clone()))
            .pass(password)
            .ssl_opts(ssl_opts(self.ssl_mode))
            .into()
    }
}

fn ssl_opts(mode: SslMode) -> Option<SslOpts> {
    match mode {
        SslMode::Disabled => None,
        SslMode::Required => Some(
            SslOpts::default()
                .with_danger_accept_invalid_certs(true)
                .with_danger_skip_domain_validation(true),
        ),
        SslMode::VerifyIdentity => Some(SslOpts::default()),
    }
}

/// Open a connection to the replica.
pub async fn connect_mysql(options: &ConnectOptions) -> ReplicaResult<Conn> {
    debug!(address = %options.address(), ssl_mode = ?options.ssl_mode, "Connecting to replica");
    Conn::new(options.to_opts()).await.map_err(|e| {
        debug!(error = %describe(&e), "Connection attempt failed");
        connection_error(e)
    })
}
