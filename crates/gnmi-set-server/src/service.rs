//! Line-delimited JSON front end for [`SetHandler`].
//!
//! Each input line is one request, each output line one response:
//!
//! ```text
//! {"id":1,"method":"set","params":{"prefix":{"target":"dev1"},"update":{...}}}
//! {"id":1,"result":{"prefix":{"target":"dev1"},"response":[...],"timestamp":...}}
//! ```
//!
//! Methods are `set`, `delete` and `batch`. Failures carry the gRPC code.

use gnmi_set_core::{Code, Path, SetHandler, SetRequest, SetResponse, Status, Update};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Deserialize)]
struct SetParams {
    #[serde(default)]
    prefix: Option<Path>,
    update: Update,
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    #[serde(default)]
    prefix: Option<Path>,
    #[serde(default)]
    path: Option<Path>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SetResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Numeric gRPC code.
    pub code: i32,
    pub status: Code,
    pub message: String,
}

impl From<Status> for ErrorBody {
    fn from(s: Status) -> Self {
        Self {
            code: s.code.as_i32(),
            status: s.code,
            message: s.message,
        }
    }
}

impl ResponseEnvelope {
    fn from_result(id: Value, result: Result<SetResponse, Status>) -> Self {
        match result {
            Ok(resp) => Self {
                id,
                result: Some(resp),
                error: None,
            },
            Err(status) => Self {
                id,
                result: None,
                error: Some(status.into()),
            },
        }
    }
}

pub struct SetService {
    handler: SetHandler,
}

impl SetService {
    pub fn new(handler: SetHandler) -> Self {
        Self { handler }
    }

    /// Handle one request line.
    pub fn dispatch_line(&self, line: &str) -> ResponseEnvelope {
        let req: RequestEnvelope = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!(error = %e, "unparseable request line");
                return ResponseEnvelope::from_result(
                    Value::Null,
                    Err(Status::new(Code::InvalidArgument, format!("invalid request: {e}"))),
                );
            }
        };
        let id = req.id.clone();
        ResponseEnvelope::from_result(id, self.dispatch(req))
    }

    fn dispatch(&self, req: RequestEnvelope) -> Result<SetResponse, Status> {
        match req.method.as_str() {
            "set" => {
                let p: SetParams = params(req.params)?;
                self.handler.set(p.prefix.as_ref(), &p.update)
            }
            "delete" => {
                let p: DeleteParams = params(req.params)?;
                self.handler.delete(p.prefix.as_ref(), p.path.as_ref())
            }
            "batch" => {
                let p: SetRequest = params(req.params)?;
                self.handler.handle(&p)
            }
            other => Err(Status::new(
                Code::Unimplemented,
                format!("unknown method '{other}'"),
            )),
        }
    }

    /// Serve requests until `reader` reaches EOF. Returns the number of requests handled.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut handled = 0usize;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let resp = self.dispatch_line(&line);
            let mut out = serde_json::to_vec(&resp)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
            handled += 1;
        }
        Ok(handled)
    }
}

fn params<T: serde::de::DeserializeOwned>(raw: Value) -> Result<T, Status> {
    serde_json::from_value(raw)
        .map_err(|e| Status::new(Code::InvalidArgument, format!("invalid params: {e}")))
}
