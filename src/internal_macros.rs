/// A `Future` that is `Send`.
macro_rules! future_send {
    ($t:ty) => {
        impl ::core::future::Future<Output = $t> + Send
    };
}

/// Fluent setters for the bucket type, bucket, and key of a builder's `options.location`.
macro_rules! location_setters {
    ($builder:ident) => {
        impl $builder {
            /// Set the bucket type. Defaults to `"default"`.
            #[inline]
            #[must_use]
            pub fn with_bucket_type(mut self, bucket_type: impl Into<String>) -> Self {
                self.options.location.bucket_type = bucket_type.into();
                self
            }

            /// Set the bucket.
            #[inline]
            #[must_use]
            pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
                self.options.location.bucket = bucket.into();
                self
            }

            /// Set the key.
            #[inline]
            #[must_use]
            pub fn with_key(mut self, key: impl Into<String>) -> Self {
                self.options.location.key = key.into();
                self
            }

            /// Set the bucket type, bucket, and key at once.
            #[inline]
            #[must_use]
            pub fn with_location(mut self, location: $crate::Location) -> Self {
                self.options.location = location;
                self
            }
        }
    };
}

/// Fluent setters that assign a single field of a builder's `options`.
///
/// Setters only accumulate. Validation happens when the command is built.
macro_rules! option_setters {
    ($builder:ident { $($(#[$attr:meta])* fn $method:ident($field:ident: $ty:ty);)* }) => {
        impl $builder {$(
            $(#[$attr])*
            #[inline]
            #[must_use]
            pub fn $method(mut self, $field: $ty) -> Self {
                self.options.$field = $field;
                self
            }
        )*}
    };
}

pub(crate) use {future_send, location_setters, option_setters};
