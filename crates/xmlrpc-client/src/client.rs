//! Remote procedure calls over a [`Transport`].

use tracing::{debug, warn};
use xmlrpc_core::{IndexMap, MethodResult, Value, build_call, decode_response};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{HttpTransport, Transport};

/// An XML-RPC client bound to one endpoint.
///
/// [`call`](Self::call) is the general entry point. [`authenticate`](Self::authenticate)
/// and [`execute_kw`](Self::execute_kw) assemble the parameter lists of the
/// ERP-style `common`/`object` services and turn faults into errors.
pub struct XmlRpcClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
}

impl XmlRpcClient<HttpTransport> {
    /// Creates a client that talks HTTP to the configured endpoint.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> XmlRpcClient<T> {
    /// Creates a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Calls `method` with positional `params`.
    ///
    /// A fault is a successful call from the client's point of view and is
    /// returned as [`MethodResult::Fault`].
    ///
    /// A request that cannot be built (an empty `method`) fails with
    /// [`ClientErrorCode::Encode`](crate::ClientErrorCode::Encode) before
    /// anything is sent.
    pub async fn call(&self, method: &str, params: &[Value]) -> ClientResult<MethodResult> {
        let body = build_call(method, params).map_err(ClientError::encode)?;
        debug!(method = %method, url = %self.config.url_str(), "Calling remote method");

        let response = self.transport.post(self.config.url_str(), body).await?;
        let result = decode_response(&response)?;

        if result.is_fault() {
            warn!(
                method = %method,
                fault_code = ?result.fault_code(),
                fault_string = ?result.fault_string(),
                "Remote method returned a fault"
            );
        }
        Ok(result)
    }

    /// Logs in with `username`/`password` against the configured database.
    ///
    /// Sends `authenticate(database, username, password, {})` and returns
    /// whatever the server answers (usually the user id, or `false`).
    pub async fn authenticate(&self, username: &str, password: &str) -> ClientResult<Value> {
        let params = [
            Value::from(self.database()?),
            Value::from(username),
            Value::from(password),
            Value::Struct(IndexMap::new()),
        ];
        into_value(self.call("authenticate", &params).await?)
    }

    /// Runs `method` on `model` as user `uid`.
    ///
    /// Sends `execute_kw(database, uid, password, model, method, args, kwargs)`.
    pub async fn execute_kw(
        &self,
        uid: i64,
        password: &str,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> ClientResult<Value> {
        let params = [
            Value::from(self.database()?),
            Value::Integer(uid),
            Value::from(password),
            Value::from(model),
            Value::from(method),
            args,
            kwargs,
        ];
        into_value(self.call("execute_kw", &params).await?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn database(&self) -> ClientResult<&str> {
        self.config
            .database
            .as_deref()
            .ok_or_else(|| ClientError::configuration("database name is not configured"))
    }
}

/// Turns a fault into a [`ClientError`], using `faultString` as the message
/// when present.
fn into_value(result: MethodResult) -> ClientResult<Value> {
    let code = result.fault_code();
    let message = result.fault_string().map(str::to_string);

    result.into_result().map_err(|fault| {
        let message = message.unwrap_or_else(|| format!("remote fault: {:?}", fault));
        ClientError::fault(code, message)
    })
}
