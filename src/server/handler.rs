use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::protocol::{ErrorKind, ErrorObject, SourceLocation};

/// Structured application exception a handler can raise.
///
/// Distinct from an invocation fault: this is a failure reported *by*
/// the method itself, and it travels back to the caller with its
/// message, code, origin and trace intact.
///
/// `new` captures the raise site, so responses point at the handler
/// code that failed:
///
/// ```
/// use http_rpc::Exception;
///
/// let exception = Exception::new("storage offline", 507);
/// assert!(exception.file.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Exception {
    /// Human-readable message.
    pub message: String,
    /// Numeric exception code.
    pub code: i64,
    /// File/line where the exception was raised.
    pub file: Option<SourceLocation>,
    /// Stack trace frames to forward, if any.
    pub trace: Vec<Value>,
}

impl Exception {
    /// Raise an exception, capturing the caller's file/line as origin.
    #[track_caller]
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        // ---
        let caller = std::panic::Location::caller();

        Self {
            message: message.into(),
            code,
            file: Some(SourceLocation {
                filename: caller.file().to_string(),
                line: caller.line(),
            }),
            trace: Vec::new(),
        }
    }

    /// Attach stack trace frames to forward with the exception.
    pub fn with_trace(mut self, trace: Vec<Value>) -> Self {
        self.trace = trace;
        self
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if self.code != 0 {
            write!(f, " (code {})", self.code)?;
        }
        Ok(())
    }
}

impl std::error::Error for Exception {}

impl From<Exception> for ErrorObject {
    fn from(exception: Exception) -> Self {
        // ---
        Self {
            kind: ErrorKind::Exception,
            message: exception.message,
            code: exception.code,
            file: exception.file,
            trace: exception.trace,
        }
    }
}

/// Outcome of one invocation attempt against the registered target.
///
/// An explicit sum type rather than an ambient last-error signal, so
/// success, invocation failure and application exceptions can never be
/// conflated.
#[derive(Debug)]
pub(crate) enum Invoked {
    /// The method ran and returned a value (any value, including
    /// `null`, `0`, `""` and `false`).
    Value(Value),
    /// The method could not be invoked: unknown name, argument
    /// mismatch, or a non-exception fault during the attempt.
    Fault(String),
    /// The method raised a structured exception.
    Raised(Exception),
}

/// Type-erased async handler.
///
/// Handlers take the positional params array and report their outcome
/// through [`Invoked`]. Wrapped in `Arc` for cheap cloning.
pub(crate) type BoxedHandler =
    Arc<dyn Fn(Vec<Value>) -> Pin<Box<dyn Future<Output = Invoked> + Send>> + Send + Sync>;

/// Wrap a typed handler function into a type-erased handler.
///
/// This allows the server to store handlers of different types in the
/// same registry. `Args` deserializes from the positional array: a
/// tuple gives strict arity checking, a struct takes its fields in
/// declaration order, and `Vec<Value>` accepts anything.
pub(crate) fn wrap_handler<F, Fut, Args, Resp>(method: &str, handler: F) -> BoxedHandler
where
    F: Fn(Args) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = std::result::Result<Resp, Exception>> + Send + 'static,
    Args: DeserializeOwned + Send + 'static,
    Resp: Serialize + Send + 'static,
{
    // ---
    let method = method.to_string();

    Arc::new(move |params: Vec<Value>| {
        let handler = handler.clone();
        let method = method.clone();

        let fut = Box::pin(async move {
            // ---
            let args: Args = match decode_args(params) {
                Ok(args) => args,
                Err(err) => {
                    return Invoked::Fault(format!("invalid arguments for `{method}`: {err}"))
                }
            };

            match handler(args).await {
                Ok(resp) => match serde_json::to_value(resp) {
                    Ok(value) => Invoked::Value(value),
                    Err(err) => {
                        Invoked::Fault(format!("result of `{method}` not serializable: {err}"))
                    }
                },
                Err(exception) => Invoked::Raised(exception),
            }
        });

        fut as Pin<Box<dyn Future<Output = Invoked> + Send>>
    })
}

/// Decode the positional array into the handler's argument type.
///
/// Zero-argument handlers use `Args = ()`, which serde maps from null
/// rather than an empty sequence; fall back accordingly.
fn decode_args<Args: DeserializeOwned>(params: Vec<Value>) -> serde_json::Result<Args> {
    // ---
    let empty = params.is_empty();

    match serde_json::from_value(Value::Array(params)) {
        Ok(args) => Ok(args),
        Err(err) if empty => serde_json::from_value(Value::Null).map_err(|_| err),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn tuple_args_are_positional() {
        // ---
        let handler = wrap_handler("add", |(a, b): (i64, i64)| async move { Ok(a + b) });

        let outcome = handler(vec![json!(2), json!(3)]).await;
        assert!(matches!(outcome, Invoked::Value(value) if value == json!(5)));
    }

    #[tokio::test]
    async fn struct_args_take_fields_in_order() {
        // ---
        #[derive(serde::Deserialize)]
        struct Args {
            left: String,
            right: String,
        }

        let handler = wrap_handler("concat", |args: Args| async move {
            Ok(format!("{}{}", args.left, args.right))
        });

        let outcome = handler(vec![json!("a"), json!("b")]).await;
        assert!(matches!(outcome, Invoked::Value(value) if value == json!("ab")));
    }

    #[tokio::test]
    async fn arity_mismatch_is_a_fault() {
        // ---
        let handler = wrap_handler("add", |(a, b): (i64, i64)| async move { Ok(a + b) });

        let outcome = handler(vec![json!(2)]).await;
        let Invoked::Fault(message) = outcome else {
            panic!("expected fault, got {outcome:?}");
        };
        assert!(message.contains("`add`"));
    }

    #[tokio::test]
    async fn zero_arg_handlers_accept_empty_params() {
        // ---
        let handler = wrap_handler("version", |_: ()| async move { Ok("1.0") });

        let outcome = handler(vec![]).await;
        assert!(matches!(outcome, Invoked::Value(value) if value == json!("1.0")));
    }

    #[tokio::test]
    async fn raised_exception_keeps_origin() {
        // ---
        let handler = wrap_handler("explode", |_: ()| async move {
            Err::<Value, _>(Exception::new("boom", 3))
        });

        let outcome = handler(vec![]).await;
        let Invoked::Raised(exception) = outcome else {
            panic!("expected exception, got {outcome:?}");
        };
        assert_eq!(exception.code, 3);
        assert!(exception.file.unwrap().filename.ends_with("handler.rs"));
    }
}
