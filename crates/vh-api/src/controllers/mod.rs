//! Controllers: JSON in, [`ApiResponse`] out.
//!
//! A controller parses and shape-validates the body, calls its service, and
//! wraps the result in the `{message, data}` envelope with a status code.
//! Nothing here knows about the transport.

pub mod lookup;
pub mod org_hierarchy;
pub mod permission;
pub mod service_offering;
pub mod service_type;
pub mod vendor;
pub mod vendor_room;
pub mod venue;

use serde::de::DeserializeOwned;
use serde_json::Value;
use vh_core::requests::{ListRequest, Validate};
use vh_core::responses::CreatedId;

use crate::error::ApiError;
use crate::response::ApiResponse;

/// Deserialize `body` into `T` and run its shape checks.
pub(crate) fn parse_body<T>(body: Value) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let payload: T =
        serde_json::from_value(body).map_err(|e| ApiError::BadRequest(format!("Invalid body: {e}")))?;
    payload.validate()?;
    Ok(payload)
}

/// Parse a list body. A missing body means "first page, no filter"; a body
/// without `limit` gets the configured default.
pub(crate) fn parse_list<F>(body: Value, default_limit: u64) -> Result<ListRequest<F>, ApiError>
where
    F: DeserializeOwned,
{
    let mut body = match body {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(map) => Value::Object(map),
        _ => return Err(ApiError::BadRequest("List body must be an object".into())),
    };
    if let Some(map) = body.as_object_mut() {
        map.entry("limit").or_insert_with(|| Value::from(default_limit));
    }
    let request: ListRequest<F> =
        serde_json::from_value(body).map_err(|e| ApiError::BadRequest(format!("Invalid body: {e}")))?;
    request.validate()?;
    Ok(request)
}

pub(crate) fn check_id(id: i64) -> Result<i64, ApiError> {
    if id > 0 {
        Ok(id)
    } else {
        Err(ApiError::BadRequest(format!("Invalid id: {id}")))
    }
}

pub(crate) fn respond<T>(
    result: Result<T, ApiError>,
    success: impl FnOnce(T) -> ApiResponse,
) -> ApiResponse {
    result.map_or_else(ApiResponse::from, success)
}

pub(crate) fn created(entity: &str, result: Result<i64, ApiError>) -> ApiResponse {
    respond(result, |id| {
        ApiResponse::created(&format!("{entity} created successfully"), &CreatedId { id })
    })
}

pub(crate) fn done(entity: &str, verb: &str, result: Result<(), ApiError>) -> ApiResponse {
    respond(result, |()| ApiResponse::message(&format!("{entity} {verb} successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use vh_core::requests::{PermissionFilter, VendorPayload};

    #[test]
    fn missing_list_body_gets_default_limit() {
        let request: ListRequest<PermissionFilter> = parse_list(Value::Null, 25).unwrap();
        assert_eq!(request.limit, 25);
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn explicit_limit_is_kept() {
        let request: ListRequest<PermissionFilter> =
            parse_list(json!({"limit": 3, "offset": 6}), 25).unwrap();
        assert_eq!((request.offset, request.limit), (6, 3));
    }

    #[test]
    fn list_body_must_be_object() {
        let err = parse_list::<PermissionFilter>(json!([1, 2]), 10).unwrap_err();
        assert_eq!(err.status(), 400);
        let err = parse_list::<PermissionFilter>(json!({"limit": 0}), 10).unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn body_shape_errors_are_bad_requests() {
        let err = parse_body::<VendorPayload>(json!({"name": 7})).unwrap_err();
        assert!(err.to_string().starts_with("Invalid body"));
        let err = parse_body::<VendorPayload>(json!({"name": "  "})).unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn ids_must_be_positive() {
        assert_eq!(check_id(4).unwrap(), 4);
        assert!(check_id(0).is_err());
    }
}
