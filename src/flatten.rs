//! Flattens an authoring-form concept graph into positional columns.
//!
//! ```text
//! concepts[i]                 -> Concept_{i}_ID, Concept_{i}_Primitive, Concept_{i}_Term
//! groups[i].attributes[j]     -> Group_{i}_Attr_{j}_Type_Term, Group_{i}_Attr_{j}_Type_ID,
//!                                Group_{i}_Attr_{j}_Target_Term, Group_{i}_Attr_{j}_Target_ID
//! ```
//!
//! Indices are 1-based. Concepts are emitted before groups, and that emission
//! order is the first-seen order the schema accumulator keeps.

use serde_json::Value;

use crate::error::LookupError;

/// Ordered column name to cell value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedFields {
    entries: Vec<(String, String)>,
}

impl FlattenedFields {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, key: String, value: String) {
        self.entries.push((key, value));
    }
}

impl IntoIterator for FlattenedFields {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

pub fn flatten(graph: &Value) -> Result<FlattenedFields, LookupError> {
    let mut out = FlattenedFields::default();

    for (idx, concept) in section(graph, "concepts", "concepts")?.iter().enumerate() {
        let i = idx + 1;
        let at = format!("concepts[{idx}]");
        out.push(format!("Concept_{i}_ID"), scalar(concept, "id", &at)?);
        out.push(
            format!("Concept_{i}_Primitive"),
            scalar(concept, "primitive", &at)?,
        );
        out.push(format!("Concept_{i}_Term"), scalar(concept, "term", &at)?);
    }

    for (gidx, group) in section(graph, "groups", "groups")?.iter().enumerate() {
        let i = gidx + 1;
        let group_at = format!("groups[{gidx}]");
        let attributes = section(group, "attributes", &format!("{group_at}.attributes"))?;

        for (aidx, attribute) in attributes.iter().enumerate() {
            let j = aidx + 1;
            let at = format!("{group_at}.attributes[{aidx}]");
            let type_at = format!("{at}.type");
            let target_at = format!("{at}.target");
            let kind = child(attribute, "type", &type_at)?;
            let target = child(attribute, "target", &target_at)?;

            out.push(
                format!("Group_{i}_Attr_{j}_Type_Term"),
                scalar(kind, "term", &type_at)?,
            );
            out.push(
                format!("Group_{i}_Attr_{j}_Type_ID"),
                scalar(kind, "id", &type_at)?,
            );
            out.push(
                format!("Group_{i}_Attr_{j}_Target_Term"),
                scalar(target, "term", &target_at)?,
            );
            out.push(
                format!("Group_{i}_Attr_{j}_Target_ID"),
                scalar(target, "id", &target_at)?,
            );
        }
    }

    Ok(out)
}

// Absent or null sections count as empty; any other non-array is malformed.
fn section<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a [Value], LookupError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(malformed(path)),
    }
}

fn child<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Value, LookupError> {
    value
        .get(key)
        .filter(|v| v.is_object())
        .ok_or_else(|| malformed(path))
}

fn scalar(value: &Value, key: &str, path: &str) -> Result<String, LookupError> {
    let field = value
        .get(key)
        .ok_or_else(|| malformed(&format!("{path}.{key}")))?;
    Ok(match field {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn malformed(path: &str) -> LookupError {
    LookupError::MalformedGraph {
        path: path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attribute(type_id: &str, type_term: &str, target_id: &str, target_term: &str) -> Value {
        json!({
            "type": { "id": type_id, "term": type_term },
            "target": { "id": target_id, "term": target_term },
        })
    }

    #[test]
    fn concepts_only() {
        let graph = json!({
            "concepts": [
                { "id": "71388002", "primitive": true, "term": "Procedure" },
                { "id": "387713003", "primitive": false, "term": "Surgical procedure" },
            ],
            "groups": [],
        });

        let fields = flatten(&graph).expect("flatten");
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            vec![
                "Concept_1_ID",
                "Concept_1_Primitive",
                "Concept_1_Term",
                "Concept_2_ID",
                "Concept_2_Primitive",
                "Concept_2_Term",
            ]
        );
        assert_eq!(fields.get("Concept_1_Primitive"), Some("true"));
        assert_eq!(fields.get("Concept_2_Term"), Some("Surgical procedure"));
    }

    #[test]
    fn one_group_two_attributes() {
        let graph = json!({
            "groups": [{
                "attributes": [
                    attribute("405813007", "Procedure site - Direct", "181216001", "Entire retina"),
                    attribute("260686004", "Method", "129304002", "Excision - action"),
                ],
            }],
        });

        let fields = flatten(&graph).expect("flatten");
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            vec![
                "Group_1_Attr_1_Type_Term",
                "Group_1_Attr_1_Type_ID",
                "Group_1_Attr_1_Target_Term",
                "Group_1_Attr_1_Target_ID",
                "Group_1_Attr_2_Type_Term",
                "Group_1_Attr_2_Type_ID",
                "Group_1_Attr_2_Target_Term",
                "Group_1_Attr_2_Target_ID",
            ]
        );
        assert_eq!(fields.get("Group_1_Attr_2_Target_ID"), Some("129304002"));
    }

    #[test]
    fn concepts_come_before_groups() {
        let graph = json!({
            "groups": [{ "attributes": [attribute("1", "a", "2", "b")] }],
            "concepts": [{ "id": 3, "primitive": false, "term": "c" }],
        });
        let fields = flatten(&graph).expect("flatten");
        assert_eq!(fields.keys().next(), Some("Concept_1_ID"));
        assert_eq!(fields.get("Concept_1_ID"), Some("3"));
        assert_eq!(fields.len(), 7);
    }

    #[test]
    fn empty_graph_is_not_an_error() {
        assert!(flatten(&json!({})).expect("flatten").is_empty());
        assert!(
            flatten(&json!({ "concepts": [], "groups": [{ "attributes": [] }] }))
                .expect("flatten")
                .is_empty()
        );
    }

    #[test]
    fn flattening_is_deterministic() {
        let graph = json!({
            "concepts": [{ "id": "1", "primitive": true, "term": "x" }],
            "groups": [{ "attributes": [attribute("2", "y", "3", "z")] }],
        });
        assert_eq!(flatten(&graph).expect("first"), flatten(&graph).expect("second"));
    }

    #[test]
    fn missing_fields_are_malformed() {
        let graph = json!({ "concepts": [{ "id": "1", "term": "x" }] });
        match flatten(&graph) {
            Err(LookupError::MalformedGraph { path }) => {
                assert_eq!(path, "concepts[0].primitive")
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let graph = json!({ "groups": [{ "attributes": [{ "type": { "id": "1", "term": "t" } }] }] });
        match flatten(&graph) {
            Err(LookupError::MalformedGraph { path }) => {
                assert_eq!(path, "groups[0].attributes[0].target")
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert!(matches!(
            flatten(&json!({ "concepts": "nope" })),
            Err(LookupError::MalformedGraph { .. })
        ));
    }
}
