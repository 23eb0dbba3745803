use replstop_core::ReplicaError;

/// Render a driver error, including the server's error code and SQLSTATE if present.
pub(crate) fn describe(e: &mysql_async::Error) -> String {
    match e {
        mysql_async::Error::Server(server) => format!(
            "ERROR {} ({}): {}",
            server.code, server.state, server.message
        ),
        other => other.to_string(),
    }
}

pub(crate) fn query_error(e: mysql_async::Error) -> ReplicaError {
    ReplicaError::Query(describe(&e))
}

pub(crate) fn connection_error(e: mysql_async::Error) -> ReplicaError {
    ReplicaError::Connection(describe(&e))
}
