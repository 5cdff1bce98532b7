//! 文档库 REST 接口的字段编码
//!
//! REST 接口中每个字段都包在一个类型标签里：
//! `{"fields": {"email": {"stringValue": "..."}, "createdAt": {"timestampValue": "..."}}}`。
//! 这里只处理档案用到的三种类型。

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use sigpa_shared::UserProfile;

use crate::error::{AppError, AppResult};

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn timestamp_value(value: &DateTime<Utc>) -> Value {
    json!({ "timestampValue": value.to_rfc3339_opts(SecondsFormat::Millis, true) })
}

fn array_value(values: &[String]) -> Value {
    let values: Vec<Value> = values.iter().map(|v| string_value(v)).collect();
    json!({ "arrayValue": { "values": values } })
}

/// 编码为 PATCH 请求体
pub fn to_document(profile: &UserProfile) -> Value {
    let mut fields = Map::new();
    fields.insert("uid".into(), string_value(&profile.uid));
    fields.insert("email".into(), string_value(&profile.email));
    fields.insert("displayName".into(), string_value(&profile.display_name));
    fields.insert("photoURL".into(), string_value(&profile.photo_url));
    fields.insert("providerIds".into(), array_value(&profile.provider_ids));
    fields.insert("createdAt".into(), timestamp_value(&profile.created_at));
    fields.insert("updatedAt".into(), timestamp_value(&profile.updated_at));
    if let Some(last_login) = &profile.last_login_at {
        fields.insert("lastLoginAt".into(), timestamp_value(last_login));
    }
    json!({ "fields": fields })
}

// =========================================================
// 解码
// =========================================================

fn read_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

fn read_timestamp(fields: &Map<String, Value>, key: &str) -> AppResult<Option<DateTime<Utc>>> {
    let Some(raw) = fields
        .get(key)
        .and_then(|v| v.get("timestampValue"))
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|t| Some(t.with_timezone(&Utc)))
        .map_err(|e| AppError::parse(format!("invalid timestamp in {}: {}", key, e)))
}

fn read_string_array(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(|v| v.get("arrayValue"))
        .and_then(|v| v.get("values"))
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.get("stringValue").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// 解码 GET 返回的文档
///
/// `uid` 缺失时取文档名的最后一段；`createdAt` 缺失时视为损坏的文档。
pub fn from_document(doc: &Value) -> AppResult<UserProfile> {
    let fields = doc
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::parse("document has no fields").in_op("profile.decode"))?;

    let uid = read_string(fields, "uid")
        .or_else(|| {
            doc.get("name")
                .and_then(Value::as_str)
                .and_then(|name| name.rsplit('/').next())
                .map(str::to_string)
        })
        .ok_or_else(|| AppError::parse("document has no uid").in_op("profile.decode"))?;

    let decode = |e: AppError| e.in_op_with("profile.decode", uid.as_str());
    let created_at = read_timestamp(fields, "createdAt")
        .map_err(decode)?
        .ok_or_else(|| decode(AppError::parse("missing createdAt")))?;
    let updated_at = read_timestamp(fields, "updatedAt")
        .map_err(decode)?
        .unwrap_or(created_at);
    let last_login_at = read_timestamp(fields, "lastLoginAt").map_err(decode)?;

    Ok(UserProfile {
        email: read_string(fields, "email").unwrap_or_default(),
        display_name: read_string(fields, "displayName").unwrap_or_default(),
        photo_url: read_string(fields, "photoURL").unwrap_or_default(),
        provider_ids: read_string_array(fields, "providerIds"),
        created_at,
        updated_at,
        last_login_at,
        uid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStatus;
    use chrono::TimeZone;

    fn profile() -> UserProfile {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        UserProfile {
            uid: "u1".into(),
            email: "ana@finca.co".into(),
            display_name: "Ana".into(),
            photo_url: String::new(),
            provider_ids: vec!["password".into()],
            created_at: at,
            updated_at: at,
            last_login_at: None,
        }
    }

    #[test]
    fn encodes_typed_fields() {
        let doc = to_document(&profile());
        let fields = &doc["fields"];
        assert_eq!(fields["email"]["stringValue"], "ana@finca.co");
        assert_eq!(fields["createdAt"]["timestampValue"], "2026-03-01T08:00:00.000Z");
        assert_eq!(fields["providerIds"]["arrayValue"]["values"][0]["stringValue"], "password");
        assert!(fields.get("lastLoginAt").is_none());
    }

    #[test]
    fn decodes_what_it_encodes() {
        let original = profile();
        assert_eq!(from_document(&to_document(&original)).unwrap(), original);
    }

    #[test]
    fn decodes_server_document() {
        let doc = json!({
            "name": "projects/sigpa/databases/(default)/documents/users/u9",
            "fields": {
                "email": { "stringValue": "luis@finca.co" },
                "providerIds": { "arrayValue": {} },
                "createdAt": { "timestampValue": "2026-02-10T12:30:00.123456Z" }
            },
            "createTime": "2026-02-10T12:30:00.123456Z"
        });
        let profile = from_document(&doc).unwrap();

        assert_eq!(profile.uid, "u9");
        assert_eq!(profile.display_name, "");
        assert!(profile.provider_ids.is_empty());
        assert_eq!(profile.updated_at, profile.created_at);
    }

    #[test]
    fn rejects_broken_documents() {
        let err = from_document(&json!({ "name": "x" })).unwrap_err();
        assert_eq!(err.status, ErrorStatus::Parse);

        let bad_time = json!({
            "fields": {
                "uid": { "stringValue": "u1" },
                "createdAt": { "timestampValue": "ayer" }
            }
        });
        let err = from_document(&bad_time).unwrap_err();
        assert_eq!(err.spans()[0].detail.as_deref(), Some("u1"));
    }
}
