//! Validation of the JSON bodies accepted by the write endpoints.
//!
//! Bodies are inspected as loose `serde_json::Value`s so that the two failure
//! classes stay distinguishable: a missing or wrongly-typed field is
//! [`CoreError::Malformed`], a well-typed value that breaks a rule is
//! [`CoreError::InvalidInput`]. Checks run in a fixed order and the first
//! failure wins.

use crate::error::CoreError;
use crate::money::parse_decimal;
use crate::structs::{NewPurchase, Product};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::LazyLock;
use uuid::Uuid;

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("identifier pattern is a valid regex")
});

/// Returns true for the hyphenated 8-4-4-4-12 hex form, and nothing else.
pub fn is_uuid(candidate: &str) -> bool {
    UUID_PATTERN.is_match(candidate)
}

/// Validates a `POST /produtos` body.
pub fn parse_product(body: &Value) -> Result<Product, CoreError> {
    let fields = as_object(body)?;

    let id = required_str(fields, "id")?;
    let name = required_str(fields, "nome")?;
    let price = required_decimal(fields, "valor")?;
    let kind = match fields.get("tipo") {
        None | Some(Value::Null) => None,
        Some(Value::String(kind)) => Some(kind.clone()),
        Some(_) => return Err(CoreError::Malformed("tipo must be a string".to_string())),
    };

    let id = parse_uuid("id", id)?;
    if price < Decimal::ZERO {
        return Err(CoreError::InvalidInput(
            "valor".to_string(),
            format!("{price} is negative"),
        ));
    }

    Ok(Product {
        id,
        name: name.to_string(),
        kind,
        price,
    })
}

/// Validates a `POST /compras` body. Product existence and the price ceiling
/// are checked later, inside the purchase transaction.
pub fn parse_purchase(body: &Value) -> Result<NewPurchase, CoreError> {
    let fields = as_object(body)?;

    let id = required_str(fields, "id")?;
    let down_payment = required_decimal(fields, "valorEntrada")?;
    let installments = match present(fields, "qtdParcelas")? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| CoreError::Malformed("qtdParcelas must be an integer".to_string()))?,
        _ => return Err(CoreError::Malformed("qtdParcelas must be an integer".to_string())),
    };
    let product_id = required_str(fields, "idProduto")?;

    if !is_uuid(id) || !is_uuid(product_id) {
        return Err(CoreError::InvalidInput(
            "id".to_string(),
            "id and idProduto must be UUIDs".to_string(),
        ));
    }
    let id = parse_uuid("id", id)?;
    let product_id = parse_uuid("idProduto", product_id)?;

    if installments <= 0 || down_payment < Decimal::ZERO {
        return Err(CoreError::InvalidInput(
            "qtdParcelas".to_string(),
            "qtdParcelas must be positive and valorEntrada non-negative".to_string(),
        ));
    }
    let installments = u32::try_from(installments)
        .ok()
        .filter(|n| i32::try_from(*n).is_ok())
        .ok_or_else(|| {
            CoreError::InvalidInput("qtdParcelas".to_string(), format!("{installments} is too large"))
        })?;

    Ok(NewPurchase {
        id,
        product_id,
        down_payment,
        installments,
    })
}

pub(crate) fn as_object(body: &Value) -> Result<&serde_json::Map<String, Value>, CoreError> {
    body.as_object()
        .ok_or_else(|| CoreError::Malformed("body must be a JSON object".to_string()))
}

/// A field counts as present only when it exists and is not `null`.
pub(crate) fn present<'a>(
    fields: &'a serde_json::Map<String, Value>,
    name: &str,
) -> Result<&'a Value, CoreError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(CoreError::Malformed(format!("{name} is required"))),
        Some(value) => Ok(value),
    }
}

fn required_str<'a>(
    fields: &'a serde_json::Map<String, Value>,
    name: &str,
) -> Result<&'a str, CoreError> {
    present(fields, name)?
        .as_str()
        .ok_or_else(|| CoreError::Malformed(format!("{name} must be a string")))
}

/// Accepts JSON numbers and numeric strings.
fn required_decimal(
    fields: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<Decimal, CoreError> {
    let parsed = match present(fields, name)? {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };
    parsed.ok_or_else(|| CoreError::Malformed(format!("{name} must be numeric")))
}

fn parse_uuid(name: &str, raw: &str) -> Result<Uuid, CoreError> {
    if !is_uuid(raw) {
        return Err(CoreError::InvalidInput(
            name.to_string(),
            format!("{raw:?} is not a UUID"),
        ));
    }
    Uuid::parse_str(raw).map_err(|e| CoreError::InvalidInput(name.to_string(), e.to_string()))
}
