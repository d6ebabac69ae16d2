//! Wave post and comment records, plus adapters for the two comment wire shapes.
//!
//! Posts carry their comments either as a flat array of `{id, author, text}`
//! records or as an id-keyed envelope map:
//!
//! ```json
//! { "c1": { "any-key": { "actor": { "displayName": "Ann" }, "object": { "content": "Hi" } } } }
//! ```
//!
//! Both are converted into `Vec<Comment>` here so nothing past the data
//! boundary sees provider-specific nesting.

use crate::error::WaveError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A single comment in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
}

/// A titled content item with its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: String,
    title: String,
    content: String,
    #[serde(default)]
    comments: Value,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    actor: EnvelopeActor,
    object: EnvelopeObject,
}

#[derive(Debug, Deserialize)]
struct EnvelopeActor {
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct EnvelopeObject {
    content: String,
}

/// The separately fetched comments document: `{ "comments": { <id>: <envelope> } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentsDocument {
    #[serde(default)]
    pub comments: Map<String, Value>,
}

impl CommentsDocument {
    /// Unwrap every envelope into a canonical comment, in document order.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first comment id whose envelope is malformed.
    pub fn to_comments(&self) -> Result<Vec<Comment>, String> {
        comments_from_envelopes(&self.comments)
    }
}

/// Unwrap one envelope: take the first value of the wrapper object and read
/// `actor.displayName` and `object.content` from it.
///
/// # Errors
///
/// Returns a message when the wrapper is not an object, is empty, or the
/// inner value lacks either field.
pub fn unwrap_envelope(id: &str, wrapper: &Value) -> Result<Comment, String> {
    let Some(inner) = wrapper.as_object() else {
        return Err(format!("comment '{id}': envelope must be an object"));
    };
    let Some(first) = inner.values().next() else {
        return Err(format!("comment '{id}': envelope is empty"));
    };
    let envelope: Envelope = serde_json::from_value(first.clone())
        .map_err(|err| format!("comment '{id}': {err}"))?;

    Ok(Comment {
        id: id.to_string(),
        author: envelope.actor.display_name,
        text: envelope.object.content,
    })
}

/// Convert an id-keyed envelope map into canonical comments.
///
/// # Errors
///
/// Fails on the first malformed envelope.
pub fn comments_from_envelopes(map: &Map<String, Value>) -> Result<Vec<Comment>, String> {
    map.iter()
        .map(|(id, wrapper)| unwrap_envelope(id, wrapper))
        .collect()
}

/// Convert a post's raw `comments` field, in either wire shape, into canonical comments.
///
/// # Errors
///
/// Fails when the value is neither an array of comments, an envelope map, nor null.
pub fn comments_from_value(value: &Value) -> Result<Vec<Comment>, String> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => {
            serde_json::from_value::<Vec<Comment>>(value.clone()).map_err(|err| err.to_string())
        }
        Value::Object(map) => comments_from_envelopes(map),
        other => Err(format!(
            "comments must be an array or an object, got {}",
            json_type_name(other)
        )),
    }
}

impl TryFrom<RawPost> for Post {
    type Error = String;

    fn try_from(raw: RawPost) -> Result<Self, Self::Error> {
        let comments = comments_from_value(&raw.comments)
            .map_err(|err| format!("post '{}': {err}", raw.id))?;
        Ok(Self {
            id: raw.id,
            title: raw.title,
            content: raw.content,
            comments,
        })
    }
}

/// Parse a post document (a JSON array of posts) from raw text.
///
/// # Errors
///
/// - [`WaveError::Parse`] when the body is not JSON or not the post shape.
/// - [`WaveError::Validation`] when two posts share an id.
pub fn parse_posts(source_name: &str, body: &str) -> Result<Vec<Post>, WaveError> {
    let raw: Vec<RawPost> =
        serde_json::from_str(body).map_err(|err| WaveError::parse(source_name, err))?;

    let posts = raw
        .into_iter()
        .map(Post::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| WaveError::parse(source_name, err))?;

    let mut seen = HashSet::with_capacity(posts.len());
    for post in &posts {
        if !seen.insert(post.id.as_str()) {
            return Err(WaveError::Validation(format!(
                "duplicate post id '{}' in {source_name}",
                post.id
            )));
        }
    }

    Ok(posts)
}

/// Parse a comments document from raw text.
///
/// # Errors
///
/// Returns [`WaveError::Parse`] when the body is not JSON or not the document shape.
pub fn parse_comments_document(
    source_name: &str,
    body: &str,
) -> Result<CommentsDocument, WaveError> {
    serde_json::from_str(body).map_err(|err| WaveError::parse(source_name, err))
}

/// Parse a comments document and unwrap it into canonical comments.
///
/// # Errors
///
/// Returns [`WaveError::Parse`] for malformed JSON or malformed envelopes.
pub fn parse_comments(source_name: &str, body: &str) -> Result<Vec<Comment>, WaveError> {
    parse_comments_document(source_name, body)?
        .to_comments()
        .map_err(|err| WaveError::parse(source_name, err))
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const SAMPLE: &str = r#"[
        {
            "id": "1",
            "title": "Sample Wave Post",
            "content": "This is a sample wave post content.",
            "comments": [{"id": "1", "author": "John Doe", "text": "Great post!"}]
        }
    ]"#;

    #[test]
    fn parses_flat_comment_shape() {
        let posts = parse_posts("sample", SAMPLE).expect("sample should parse");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Sample Wave Post");
        assert_eq!(
            posts[0].comments,
            vec![Comment {
                id: "1".into(),
                author: "John Doe".into(),
                text: "Great post!".into(),
            }]
        );
    }

    #[test]
    fn parses_envelope_comment_shape() {
        let body = json!([{
            "id": "p1",
            "title": "T",
            "content": "C",
            "comments": {
                "z9": {"item": {"actor": {"displayName": "Ann"}, "object": {"content": "first"}}},
                "a1": {"other": {"actor": {"displayName": "Bob"}, "object": {"content": "second"}}}
            }
        }])
        .to_string();

        let posts = parse_posts("envelopes", &body).expect("envelopes should parse");
        let comments = &posts[0].comments;
        assert_eq!(comments.len(), 2);
        // document order, not key order
        assert_eq!(comments[0].id, "z9");
        assert_eq!(comments[0].author, "Ann");
        assert_eq!(comments[1].text, "second");
    }

    #[test]
    fn missing_comments_field_is_empty() {
        let posts = parse_posts("p", r#"[{"id":"1","title":"t","content":"c"}]"#)
            .expect("post without comments should parse");
        assert!(posts[0].comments.is_empty());
    }

    #[test]
    fn envelope_takes_first_nested_value() {
        let wrapper = json!({
            "first": {"actor": {"displayName": "Ann"}, "object": {"content": "kept"}},
            "second": {"actor": {"displayName": "Bob"}, "object": {"content": "ignored"}}
        });
        let comment = unwrap_envelope("c1", &wrapper).expect("unwrap");
        assert_eq!(comment.author, "Ann");
        assert_eq!(comment.text, "kept");
    }

    #[test]
    fn empty_envelope_is_rejected() {
        let err = unwrap_envelope("c1", &json!({})).expect_err("empty wrapper");
        assert!(err.contains("c1"));
    }

    #[test]
    fn malformed_json_is_a_parse_failure() {
        let err = parse_posts("bad.json", "{not json").expect_err("should fail");
        assert!(matches!(err, WaveError::Parse { .. }));
    }

    #[test]
    fn wrong_comment_type_is_a_parse_failure() {
        let err = parse_posts("p", r#"[{"id":"1","title":"t","content":"c","comments":7}]"#)
            .expect_err("number comments");
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn duplicate_post_ids_fail_validation() {
        let body = r#"[
            {"id":"1","title":"a","content":"a","comments":[]},
            {"id":"1","title":"b","content":"b","comments":[]}
        ]"#;
        let err = parse_posts("dupes", body).expect_err("duplicate ids");
        assert!(matches!(err, WaveError::Validation(_)));
    }

    #[test]
    fn comments_document_unwraps_in_order() {
        let body = json!({
            "comments": {
                "c2": {"x": {"actor": {"displayName": "Zed"}, "object": {"content": "later"}}},
                "c1": {"y": {"actor": {"displayName": "Amy"}, "object": {"content": "sooner"}}}
            }
        })
        .to_string();
        let comments = parse_comments("comments.json", &body).expect("parse");
        let ids: Vec<_> = comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c2", "c1"]);
    }

    #[test]
    fn comments_document_missing_actor_is_parse_failure() {
        let body = r#"{"comments":{"c1":{"x":{"object":{"content":"no actor"}}}}}"#;
        let err = parse_comments("comments.json", body).expect_err("missing actor");
        assert!(matches!(err, WaveError::Parse { .. }));
    }

    fn comment_strategy() -> impl Strategy<Value = (String, String, String)> {
        ("[a-z0-9]{1,8}", "\\PC{0,16}", "\\PC{0,40}")
    }

    proptest! {
        #[test]
        fn flat_documents_pass_through_unchanged(
            posts in prop::collection::vec(
                ("\\PC{0,20}", "\\PC{0,60}", prop::collection::vec(comment_strategy(), 0..4)),
                0..6,
            )
        ) {
            let doc: Vec<Value> = posts
                .iter()
                .enumerate()
                .map(|(idx, (title, content, comments))| {
                    json!({
                        "id": format!("post-{idx}"),
                        "title": title,
                        "content": content,
                        "comments": comments
                            .iter()
                            .map(|(id, author, text)| {
                                json!({"id": id, "author": author, "text": text})
                            })
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();

            let parsed = parse_posts("prop", &Value::Array(doc).to_string()).expect("valid doc");
            prop_assert_eq!(parsed.len(), posts.len());
            for (post, (title, content, comments)) in parsed.iter().zip(&posts) {
                prop_assert_eq!(&post.title, title);
                prop_assert_eq!(&post.content, content);
                prop_assert_eq!(post.comments.len(), comments.len());
                for (comment, (id, author, text)) in post.comments.iter().zip(comments) {
                    prop_assert_eq!(&comment.id, id);
                    prop_assert_eq!(&comment.author, author);
                    prop_assert_eq!(&comment.text, text);
                }
            }
        }

        #[test]
        fn envelope_unwrap_reads_actor_and_object(
            key in "[a-zA-Z]{1,10}",
            (id, author, text) in comment_strategy(),
        ) {
            let envelope = json!({"actor": {"displayName": author}, "object": {"content": text}});
            let wrapper = json!({ key: envelope });
            let comment = unwrap_envelope(&id, &wrapper).expect("well-formed envelope");
            prop_assert_eq!(comment.id, id);
            prop_assert_eq!(comment.author, author);
            prop_assert_eq!(comment.text, text);
        }
    }
}
