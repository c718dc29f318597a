use crate::options::{non_empty, utf8};
use crate::proto::{RpbContent, RpbLink, RpbPair};
use crate::{Location, Result};
use prost_types::Timestamp;
use std::collections::BTreeMap;

/// A key/value pair of user metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair {
    #[allow(missing_docs)]
    pub key: String,
    #[allow(missing_docs)]
    pub value: String,
}

/// A tagged link from one object to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    #[allow(missing_docs)]
    pub bucket: String,
    #[allow(missing_docs)]
    pub key: String,
    #[allow(missing_docs)]
    pub tag: String,
}

/// A plain value and its metadata.
///
/// Fetched objects are decoded from the contents of a reply and are not modified afterwards. When
/// a key has concurrent values (siblings), each one is a separate object carrying the same vclock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Object {
    /// Where the object lives. Not sent per object on the wire, so it is taken from the request.
    pub location: Location,
    /// The value itself.
    pub value: Vec<u8>,
    #[allow(missing_docs)]
    pub content_type: String,
    #[allow(missing_docs)]
    pub charset: String,
    #[allow(missing_docs)]
    pub content_encoding: String,
    /// The store's tag for this particular value.
    pub vtag: String,
    #[allow(missing_docs)]
    pub links: Vec<Link>,
    /// When the value was last written.
    pub last_modified: Option<Timestamp>,
    #[allow(missing_docs)]
    pub user_meta: Vec<Pair>,
    /// Secondary indexes, by index name.
    pub indexes: BTreeMap<String, Vec<String>>,
    /// The causal version token of the fetch that returned the object.
    pub vclock: Vec<u8>,
    /// Whether the key once held a value that has since been deleted.
    pub is_tombstone: bool,
}

impl Object {
    /// An object holding `value`, with no metadata.
    #[inline]
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Set the content type.
    #[inline]
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Add a secondary index entry.
    #[inline]
    #[must_use]
    pub fn with_index(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.indexes.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Add a user metadata entry.
    #[inline]
    #[must_use]
    pub fn with_user_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_meta.push(Pair {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// The marker for a key whose value was deleted.
    pub(crate) fn tombstone(location: Location, vclock: Vec<u8>) -> Self {
        Self {
            location,
            vclock,
            is_tombstone: true,
            ..Self::default()
        }
    }

    /// Decode one entry of a reply's content list.
    pub(crate) fn from_content(
        command: &'static str,
        content: RpbContent,
        location: Location,
        vclock: Vec<u8>,
    ) -> Result<Self> {
        let text = |field, bytes: Option<Vec<u8>>| utf8(command, field, bytes.unwrap_or_default());

        let links = content
            .links
            .into_iter()
            .map(|link| {
                Ok(Link {
                    bucket: text("link bucket", link.bucket)?,
                    key: text("link key", link.key)?,
                    tag: text("link tag", link.tag)?,
                })
            })
            .collect::<Result<_>>()?;
        let user_meta = content
            .usermeta
            .into_iter()
            .map(|pair| {
                Ok(Pair {
                    key: utf8(command, "user metadata key", pair.key)?,
                    value: text("user metadata value", pair.value)?,
                })
            })
            .collect::<Result<_>>()?;
        let mut indexes = BTreeMap::<_, Vec<_>>::new();
        for pair in content.indexes {
            indexes
                .entry(utf8(command, "index name", pair.key)?)
                .or_default()
                .push(text("index value", pair.value)?);
        }
        let last_modified = content
            .last_mod
            .map(|seconds| timestamp(seconds, content.last_mod_usecs.unwrap_or(0)));

        Ok(Self {
            location,
            value: content.value,
            content_type: text("content type", content.content_type)?,
            charset: text("charset", content.charset)?,
            content_encoding: text("content encoding", content.content_encoding)?,
            vtag: text("vtag", content.vtag)?,
            links,
            last_modified,
            user_meta,
            indexes,
            vclock,
            is_tombstone: content.deleted.unwrap_or(false),
        })
    }

    /// The object as the content of a write.
    pub(crate) fn to_content(&self) -> RpbContent {
        RpbContent {
            value: self.value.clone(),
            content_type: non_empty(&self.content_type),
            charset: non_empty(&self.charset),
            content_encoding: non_empty(&self.content_encoding),
            links: self
                .links
                .iter()
                .map(|link| RpbLink {
                    bucket: non_empty(&link.bucket),
                    key: non_empty(&link.key),
                    tag: non_empty(&link.tag),
                })
                .collect(),
            usermeta: self
                .user_meta
                .iter()
                .map(|pair| RpbPair {
                    key: pair.key.clone().into_bytes(),
                    value: Some(pair.value.clone().into_bytes()),
                })
                .collect(),
            indexes: self
                .indexes
                .iter()
                .flat_map(|(name, values)| {
                    values.iter().map(move |value| RpbPair {
                        key: name.clone().into_bytes(),
                        value: Some(value.clone().into_bytes()),
                    })
                })
                .collect(),
            ..RpbContent::default()
        }
    }
}

/// Whole microseconds past the second carry into the seconds.
fn timestamp(seconds: u32, usecs: u32) -> Timestamp {
    let usecs = i64::from(usecs);
    Timestamp {
        seconds: i64::from(seconds) + usecs / 1_000_000,
        nanos: i32::try_from(usecs % 1_000_000 * 1_000).unwrap_or(0),
    }
}
