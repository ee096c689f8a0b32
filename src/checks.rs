//! Response checks used by the behavior tests. A fixed allow-list of fields
//! per entity, not a schema engine: every field in a response must be
//! declared, match its declared kind, and every declared field must be
//! present. Checks stop at the first failure and name what mismatched.

use anyhow::{bail, ensure, Context, Result};
use serde_json::{Map, Value};

use crate::transport::HttpResponse;

/// Expected kind of a field's value. One level deep, no recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Map,
    Seq,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::Str => value.is_string(),
            FieldKind::Int => value.is_i64() || value.is_u64(),
            FieldKind::Map => value.is_object(),
            FieldKind::Seq => value.is_array(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            FieldKind::Str => "string",
            FieldKind::Int => "integer",
            FieldKind::Map => "mapping",
            FieldKind::Seq => "sequence",
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

pub const TIME_FIELDS: &[(&str, FieldKind)] = &[
    ("rfc1123", FieldKind::Str),
    ("unixtime", FieldKind::Int),
];

pub const ASSET_PAIR_FIELDS: &[(&str, FieldKind)] = &[
    ("aclass_base", FieldKind::Str),
    ("aclass_quote", FieldKind::Str),
    ("altname", FieldKind::Str),
    ("base", FieldKind::Str),
    ("fee_volume_currency", FieldKind::Str),
    ("fees", FieldKind::Seq),
    ("fees_maker", FieldKind::Seq),
    ("leverage_buy", FieldKind::Seq),
    ("leverage_sell", FieldKind::Seq),
    ("lot", FieldKind::Str),
    ("lot_decimals", FieldKind::Int),
    ("lot_multiplier", FieldKind::Int),
    ("margin_call", FieldKind::Int),
    ("margin_stop", FieldKind::Int),
    ("ordermin", FieldKind::Str),
    ("pair_decimals", FieldKind::Int),
    ("quote", FieldKind::Str),
    ("wsname", FieldKind::Str),
];

pub const OPEN_ORDERS_FIELDS: &[(&str, FieldKind)] = &[("open", FieldKind::Map)];

pub const ORDER_FIELDS: &[(&str, FieldKind)] = &[
    ("refid", FieldKind::Str),
    ("userref", FieldKind::Str),
    ("status", FieldKind::Str),
    ("opentm", FieldKind::Int),
    ("starttm", FieldKind::Int),
    ("expiretm", FieldKind::Int),
    ("descr", FieldKind::Map),
    ("vol", FieldKind::Str),
    ("vol_exec", FieldKind::Str),
    ("cost", FieldKind::Str),
    ("fee", FieldKind::Str),
    ("price", FieldKind::Str),
    ("stopprice", FieldKind::Str),
    ("limitprice", FieldKind::Str),
    ("trigger", FieldKind::Str),
    ("misc", FieldKind::Str),
    ("oflags", FieldKind::Str),
    ("trades", FieldKind::Seq),
];

/// HTTP-level checks for a successful request.
pub fn http_checks(resp: &HttpResponse) -> Result<()> {
    // todo: some endpoints may legitimately return other 2xx codes
    ensure!(resp.status == 200, "unexpected http status: {}", resp.status);

    let content_type = resp.header("Content-Type").unwrap_or_default();
    ensure!(
        content_type == "application/json",
        "unexpected Content-Type: {content_type:?}"
    );

    for name in ["Date", "Connection", "referrer-policy"] {
        ensure!(resp.header(name).is_some(), "{name} not in headers");
    }

    // Server software identification must not leak.
    ensure!(
        resp.header("X-Powered-By").is_none(),
        "X-Powered-By present in headers"
    );

    let encoding = resp.encoding.as_deref().unwrap_or_default();
    ensure!(encoding == "utf-8", "unexpected encoding: {encoding:?}");
    Ok(())
}

/// The request must have completed within the given bound, in seconds.
pub fn check_elapsed_under(resp: &HttpResponse, secs: f64) -> Result<()> {
    let elapsed = resp.elapsed.as_secs_f64();
    ensure!(
        elapsed < secs,
        "request took {elapsed:.3}s, expected under {secs}s"
    );
    Ok(())
}

/// Envelope checks for a successful request: `error` is an empty sequence and
/// `result` is present.
pub fn basic_api_checks(resp: &HttpResponse) -> Result<()> {
    let data = resp.json()?;
    let error = data.get("error").context("error not in response body")?;
    ensure!(
        error == &Value::Array(Vec::new()),
        "api returned errors: {error}"
    );
    ensure!(data.get("result").is_some(), "result not in response body");
    Ok(())
}

/// Envelope check for a request expected to fail with exactly one error code.
pub fn check_api_error(resp: &HttpResponse, expected: &str) -> Result<()> {
    let data = resp.json()?;
    let error = data.get("error").context("error not in response body")?;
    ensure!(
        error == &serde_json::json!([expected]),
        "expected error [{expected:?}], got: {error}"
    );
    Ok(())
}

/// Check the population and kind of an object's fields against a spec.
/// Strict both ways: undeclared fields and missing declared fields fail.
pub fn check_fields(data: &Map<String, Value>, spec: &[(&str, FieldKind)]) -> Result<()> {
    let mut missing: Vec<&str> = spec.iter().map(|(name, _)| *name).collect();
    for (field, value) in data {
        let Some((_, kind)) = spec.iter().find(|(name, _)| *name == field.as_str()) else {
            bail!("unchecked field in response: {field}");
        };
        ensure!(
            kind.matches(value),
            "{field} has kind {} expected {}",
            kind_of(value),
            kind.name()
        );
        missing.retain(|name| *name != field.as_str());
    }
    ensure!(missing.is_empty(), "missing fields in response: {missing:?}");
    Ok(())
}

fn result_object(resp: &HttpResponse) -> Result<Map<String, Value>> {
    let data = resp.json()?;
    data.get("result")
        .and_then(Value::as_object)
        .cloned()
        .context("result is not a mapping")
}

pub fn check_server_time(resp: &HttpResponse) -> Result<()> {
    check_fields(&result_object(resp)?, TIME_FIELDS)
}

pub fn check_asset_pairs(resp: &HttpResponse) -> Result<()> {
    for (name, pair) in &result_object(resp)? {
        let fields = pair
            .as_object()
            .with_context(|| format!("asset pair {name} is not a mapping"))?;
        check_fields(fields, ASSET_PAIR_FIELDS).with_context(|| format!("asset pair {name}"))?;
    }
    Ok(())
}

pub fn check_open_orders(resp: &HttpResponse) -> Result<()> {
    let result = result_object(resp)?;
    check_fields(&result, OPEN_ORDERS_FIELDS)?;
    let open = result
        .get("open")
        .and_then(Value::as_object)
        .context("open is not a mapping")?;
    for (txid, order) in open {
        let fields = order
            .as_object()
            .with_context(|| format!("order {txid} is not a mapping"))?;
        check_fields(fields, ORDER_FIELDS).with_context(|| format!("order {txid}"))?;
    }
    Ok(())
}
