//! Client calls against an in-memory transport.

use std::sync::{Arc, Mutex};

use xmlrpc_client::{
    BoxFuture, ClientConfig, ClientError, ClientErrorCode, ClientResult, MethodResult, Transport,
    Value, XmlRpcClient,
};
use xmlrpc_core::{build_fault_response, build_success_response, decode_call};

/// Records every request body and answers with a canned response.
#[derive(Clone)]
struct RecordingTransport {
    requests: Arc<Mutex<Vec<(String, String)>>>,
    response: Result<String, ClientErrorCode>,
}

impl RecordingTransport {
    fn answering(body: String) -> Self {
        Self {
            requests: Arc::default(),
            response: Ok(body),
        }
    }

    fn failing(code: ClientErrorCode) -> Self {
        Self {
            requests: Arc::default(),
            response: Err(code),
        }
    }

    fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn post(&self, url: &str, body: String) -> BoxFuture<'_, ClientResult<String>> {
        self.requests.lock().unwrap().push((url.to_string(), body));
        let response = self
            .response
            .clone()
            .map_err(|code| ClientError::new(code, "canned failure"));
        Box::pin(async move { response })
    }
}

const COMMON: &str = "https://erp.example.com/xmlrpc/2/common";
const OBJECT: &str = "https://erp.example.com/xmlrpc/2/object";

fn client(url: &str, transport: RecordingTransport) -> XmlRpcClient<RecordingTransport> {
    let config = ClientConfig::new(url).unwrap().with_database("mydb");
    XmlRpcClient::with_transport(config, transport)
}

#[tokio::test]
async fn authenticate_sends_database_credentials_and_empty_struct() {
    let transport = RecordingTransport::answering(build_success_response(&Value::from(2)).unwrap());
    let client = client(COMMON, transport.clone());

    let uid = client.authenticate("admin", "secret").await.unwrap();
    assert_eq!(uid, Value::Integer(2));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, COMMON);

    let call = decode_call(&requests[0].1).unwrap();
    assert_eq!(call.method_name(), "authenticate");
    assert_eq!(
        call.params(),
        [
            Value::from("mydb"),
            Value::from("admin"),
            Value::from("secret"),
            Value::structure(Vec::<(String, Value)>::new()),
        ]
    );
}

#[tokio::test]
async fn rejected_login_is_false_not_an_error() {
    let transport =
        RecordingTransport::answering(build_success_response(&Value::Boolean(false)).unwrap());
    let client = client(COMMON, transport);

    assert_eq!(
        client.authenticate("admin", "wrong").await.unwrap(),
        Value::Boolean(false)
    );
}

#[tokio::test]
async fn execute_kw_sends_positional_parameters() {
    let records = Value::from(vec![Value::structure([
        ("id", Value::from(7)),
        ("name", Value::from("Acme")),
    ])]);
    let transport = RecordingTransport::answering(build_success_response(&records).unwrap());
    let client = client(OBJECT, transport.clone());

    let args = Value::from(vec![Value::from(vec![Value::from(vec![
        Value::from("is_company"),
        Value::from("="),
        Value::Boolean(true),
    ])])]);
    let kwargs = Value::structure([("fields", Value::from(vec!["name"])), ("limit", Value::from(5))]);

    let result = client
        .execute_kw(2, "secret", "res.partner", "search_read", args.clone(), kwargs.clone())
        .await
        .unwrap();
    assert_eq!(result, records);

    let (name, params) = decode_call(&transport.requests()[0].1).unwrap().into_parts();
    assert_eq!(name, "execute_kw");
    assert_eq!(
        params,
        vec![
            Value::from("mydb"),
            Value::Integer(2),
            Value::from("secret"),
            Value::from("res.partner"),
            Value::from("search_read"),
            args,
            kwargs,
        ]
    );
}

#[tokio::test]
async fn fault_becomes_error_for_helpers() {
    let body = build_fault_response(&Value::fault(3, "Access Denied")).unwrap();
    let client = client(OBJECT, RecordingTransport::answering(body));

    let err = client
        .execute_kw(
            2,
            "secret",
            "res.partner",
            "unlink",
            Value::from(vec![Value::from(vec![1])]),
            Value::structure(Vec::<(String, Value)>::new()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), ClientErrorCode::Fault);
    assert_eq!(err.fault_code(), Some(3));
    assert_eq!(err.message(), "Access Denied");
}

#[tokio::test]
async fn call_returns_fault_as_result() {
    let body = build_fault_response(&Value::fault(1, "Unknown method")).unwrap();
    let client = client(COMMON, RecordingTransport::answering(body));

    let result = client.call("nope", &[]).await.unwrap();
    assert!(matches!(result, MethodResult::Fault(_)));
    assert_eq!(result.fault_string(), Some("Unknown method"));
}

#[tokio::test]
async fn missing_database_fails_before_sending() {
    let transport = RecordingTransport::answering(build_success_response(&Value::Nil).unwrap());
    let config = ClientConfig::new(COMMON).unwrap();
    let client = XmlRpcClient::with_transport(config, transport.clone());

    let err = client.authenticate("admin", "secret").await.unwrap_err();
    assert_eq!(err.code(), ClientErrorCode::Configuration);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn empty_method_name_fails_before_sending() {
    let transport = RecordingTransport::answering(build_success_response(&Value::Nil).unwrap());
    let client = client(COMMON, transport.clone());

    let err = client.call("", &[]).await.unwrap_err();
    assert_eq!(err.code(), ClientErrorCode::Encode);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn malformed_response_is_decode_error() {
    let client = client(
        COMMON,
        RecordingTransport::answering("<html><body>Bad Gateway</body></html>".to_string()),
    );

    let err = client.call("version", &[]).await.unwrap_err();
    assert_eq!(err.code(), ClientErrorCode::Decode);
}

#[tokio::test]
async fn transport_errors_propagate() {
    let client = client(COMMON, RecordingTransport::failing(ClientErrorCode::Server));

    let err = client.call("version", &[]).await.unwrap_err();
    assert_eq!(err.code(), ClientErrorCode::Server);
    assert_eq!(err.message(), "canned failure");
}
