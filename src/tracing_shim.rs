//! Either `tracing` or no-op stand-ins for it, depending on the `tracing` feature.
//!
//! Commands log through this module so that call sites never need a `#[cfg]`. Only the items the
//! crate uses are provided. Add more as needed.

#![allow(unused_imports, unused_macros, dead_code)]

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, debug_span, trace, warn};
#[cfg(feature = "tracing")]
pub(crate) use tracing_futures::Instrument;

#[cfg(not(feature = "tracing"))]
macro_rules! event {
    ($($x:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! event_span {
    ($($x:tt)*) => {
        ()
    };
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {event as debug, event as trace, event as warn, event_span as debug_span};

/// Attaches a span to a future. Without `tracing` there is no span, so the future is unchanged.
#[cfg(not(feature = "tracing"))]
pub(crate) trait Instrument: Sized {
    fn instrument(self, span: ()) -> Self;
}

#[cfg(not(feature = "tracing"))]
impl<T> Instrument for T {
    #[inline]
    fn instrument(self, (): ()) -> Self {
        self
    }
}
