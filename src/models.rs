use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const NEWSLETTER_FIELD: &str = "newsletterAgreement";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdfEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub team_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub author: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub uploaded_at: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPayload {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub pdfs: Vec<PdfEntry>,
}

impl ListPayload {
    /// The advertised count, or the number of entries when the API omits it.
    pub fn count(&self) -> u64 {
        self.count.unwrap_or(self.pdfs.len() as u64)
    }
}

// A non-array `pdfs` means no entries; a non-object entry renders with every
// field absent rather than failing the whole list.
fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<PdfEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

// Scalars are shown as text; null, arrays and objects count as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Form fields as they are posted to the submit endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormSubmission {
    fields: BTreeMap<String, String>,
}

impl FormSubmission {
    /// Builds the submission from raw form fields. The newsletter checkbox is
    /// only present when ticked, so it is coerced to `"true"`/`"false"`.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: BTreeMap<String, String> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let agreed = fields
            .get(NEWSLETTER_FIELD)
            .is_some_and(|v| !v.is_empty());
        fields.insert(NEWSLETTER_FIELD.to_string(), agreed.to_string());

        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn payload_parses_camel_case_entries() {
        let payload: ListPayload = serde_json::from_value(json!({
            "count": 2,
            "pdfs": [
                {"teamName": "Alpha", "title": "Audit", "author": "Ana",
                 "uploadedAt": "2024-01-02 10:00:00", "logoUrl": "/logos/a.png"},
                {"title": "Anonymous"}
            ]
        }))
        .unwrap();

        assert_eq!(payload.count(), 2);
        assert_eq!(payload.pdfs[0].team_name.as_deref(), Some("Alpha"));
        assert_eq!(payload.pdfs[0].logo_url.as_deref(), Some("/logos/a.png"));
        assert_eq!(payload.pdfs[1].team_name, None);
    }

    #[test]
    fn non_array_pdfs_is_empty() {
        for pdfs in [json!(null), json!("oops"), json!({"a": 1}), json!(3)] {
            let payload: ListPayload =
                serde_json::from_value(json!({"count": 4, "pdfs": pdfs})).unwrap();
            assert!(payload.pdfs.is_empty());
            assert_eq!(payload.count(), 4);
        }
    }

    #[test]
    fn malformed_entry_becomes_blank() {
        let payload: ListPayload =
            serde_json::from_value(json!({"pdfs": [42, {"teamName": "B"}]})).unwrap();
        assert_eq!(payload.pdfs.len(), 2);
        assert_eq!(payload.pdfs[0], PdfEntry::default());
        assert_eq!(payload.count(), 2);
    }

    #[test]
    fn mistyped_field_keeps_the_rest_of_the_entry() {
        let payload: ListPayload = serde_json::from_value(json!({
            "count": "3",
            "pdfs": [{"teamName": 5, "title": "Audit", "author": null,
                      "uploadedAt": "2024-01-02", "logoUrl": ["x"]}]
        }))
        .unwrap();

        let entry = &payload.pdfs[0];
        assert_eq!(entry.team_name.as_deref(), Some("5"));
        assert_eq!(entry.title.as_deref(), Some("Audit"));
        assert_eq!(entry.author, None);
        assert_eq!(entry.uploaded_at.as_deref(), Some("2024-01-02"));
        assert_eq!(entry.logo_url, None);
        assert_eq!(payload.count(), 3);
    }

    #[test]
    fn unusable_count_falls_back_to_entries() {
        for (count, expected) in [
            (json!(2.5), 2),
            (json!("many"), 1),
            (json!(null), 1),
            (json!({"n": 1}), 1),
        ] {
            let payload: ListPayload =
                serde_json::from_value(json!({"count": count, "pdfs": [{}]})).unwrap();
            assert_eq!(payload.count(), expected);
        }
    }

    #[test]
    fn newsletter_unchecked_is_false() {
        let form = FormSubmission::from_fields([("email", "a@b.c")]);
        assert_eq!(form.get(NEWSLETTER_FIELD), Some("false"));
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({"email": "a@b.c", "newsletterAgreement": "false"})
        );
    }

    #[test]
    fn newsletter_checked_is_true() {
        let form = FormSubmission::from_fields([("email", "a@b.c"), (NEWSLETTER_FIELD, "on")]);
        assert_eq!(form.get(NEWSLETTER_FIELD), Some("true"));
    }
}
