/// The bucket type used when none is given.
pub(crate) const DEFAULT_BUCKET_TYPE: &str = "default";

/// Where an object or data type lives in the store.
///
/// The key may be empty for writes that let the store generate one. Every command requires a
/// bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    /// The bucket type, which carries the bucket's properties (such as its data type).
    pub bucket_type: String,
    /// The bucket within the bucket type.
    pub bucket: String,
    /// The key within the bucket.
    pub key: String,
}

impl Location {
    /// A location in the default bucket type.
    #[inline]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket_type: DEFAULT_BUCKET_TYPE.to_owned(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// The same location within the given bucket type.
    #[inline]
    #[must_use]
    pub fn in_bucket_type(mut self, bucket_type: impl Into<String>) -> Self {
        self.bucket_type = bucket_type.into();
        self
    }

    /// Whether the store is expected to generate the key.
    #[inline]
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}

impl Default for Location {
    #[inline]
    fn default() -> Self {
        Self::new("", "")
    }
}
