//! Transport binding: path parameters, query string and JSON body merged into
//! one typed request.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::RequestExt;
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, Path, Query, Request};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use super::operation::Operation;

/// The inbound payload could not be read or did not fit the request type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct BindError(pub String);

type Pairs = Vec<(String, String)>;

/// Everything the transport offers for binding, captured once per request.
///
/// Extraction never rejects; faults are reported by [`Transport::bind`] so the
/// mount decides the status code per operation.
#[derive(Debug)]
pub struct Transport {
    path: Result<Pairs, BindError>,
    query: Result<Pairs, BindError>,
    body: Result<Bytes, BindError>,
}

impl Transport {
    pub fn new(path: Pairs, query: Pairs, body: impl Into<Bytes>) -> Self {
        Self {
            path: Ok(path),
            query: Ok(query),
            body: Ok(body.into()),
        }
    }

    pub fn path_params(&self) -> Result<&[(String, String)], BindError> {
        self.path.as_deref().map_err(Clone::clone)
    }

    pub fn query_pairs(&self) -> Result<&[(String, String)], BindError> {
        self.query.as_deref().map_err(Clone::clone)
    }

    /// Bind into `T`. Later sources win: body, then query, then path.
    pub fn bind<T: DeserializeOwned>(&self, op: Operation) -> Result<T, BindError> {
        let mut fields = Map::new();

        if op.reads_body() {
            let body = self.body.as_ref().map_err(Clone::clone)?;
            if !body.iter().all(u8::is_ascii_whitespace) {
                match serde_json::from_slice(body)
                    .map_err(|e| BindError(format!("invalid JSON body: {e}")))?
                {
                    Value::Object(map) => fields = map,
                    _ => return Err(BindError("request body must be a JSON object".into())),
                }
            }
        }

        if op.reads_query() {
            for (key, value) in self.query_pairs()? {
                fields.insert(key.clone(), Value::String(value.clone()));
            }
        }

        for (key, value) in self.path_params()? {
            fields.insert(key.clone(), Value::String(value.clone()));
        }

        serde_json::from_value(Value::Object(fields)).map_err(|e| BindError(e.to_string()))
    }
}

#[async_trait]
impl<S> FromRequest<S> for Transport
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = match req.extract_parts::<Path<Pairs>>().await {
            Ok(Path(params)) => Ok(params),
            Err(PathRejection::MissingPathParams(_)) => Ok(Vec::new()),
            Err(e) => Err(BindError(e.body_text())),
        };
        let query = Query::<Pairs>::try_from_uri(req.uri())
            .map(|Query(pairs)| pairs)
            .map_err(|e| BindError(e.body_text()));
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| BindError(e.body_text()));

        Ok(Self { path, query, body })
    }
}
