use alloc::boxed::Box;
use alloc::string::String;
use core::error::Error;
use core::fmt;

#[cfg(doc)]
use crate::{Listener, Store};

// -------------------------------------------------------------------------------------------------

/// An error produced by a [`Listener`] while it was being notified of a change.
///
/// Such errors never stop delivery to the other listeners of the same change;
/// they are handed to the [`Reporter`] of the notifying [`Store`], and the listener
/// remains registered.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ListenerError {
    /// The listener returned an error.
    #[error("listener failed: {source}")]
    Failed {
        /// The error the listener returned.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    /// The listener panicked, and the panic was caught.
    ///
    /// Panics are only caught when the `"std"` feature is enabled.
    #[error("listener panicked: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl ListenerError {
    /// Wraps an arbitrary error (or a message string) as a [`ListenerError::Failed`].
    ///
    /// ```
    /// let error = tidings::ListenerError::new("display went away");
    /// assert_eq!(error.to_string(), "listener failed: display went away");
    /// ```
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::Failed {
            source: error.into(),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Description of one listener failing during one notification round,
/// as passed to a [`Reporter`].
pub struct ListenerFailure<'a> {
    listener: &'a dyn fmt::Debug,
    error: &'a ListenerError,
}

impl<'a> ListenerFailure<'a> {
    pub(crate) fn new(listener: &'a dyn fmt::Debug, error: &'a ListenerError) -> Self {
        Self { listener, error }
    }

    /// The listener which failed, for diagnostic printing.
    #[must_use]
    pub fn listener(&self) -> &'a dyn fmt::Debug {
        self.listener
    }

    /// What went wrong.
    #[must_use]
    pub fn error(&self) -> &'a ListenerError {
        self.error
    }
}

impl fmt::Debug for ListenerFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerFailure")
            .field("listener", &self.listener)
            .field("error", &self.error)
            .finish()
    }
}

/// Receives [`ListenerFailure`]s from a [`Store`] or [`Notifier`](crate::Notifier).
///
/// A plain function pointer, so that reporters are always `Send + Sync` and never keep
/// anything alive. Set with [`Store::with_reporter()`].
pub type Reporter = fn(&ListenerFailure<'_>);

/// The default [`Reporter`]: emits a `tracing` event at the `ERROR` level.
pub fn report_with_tracing(failure: &ListenerFailure<'_>) {
    tracing::error!(
        listener = ?failure.listener(),
        error = %failure.error(),
        "listener failed during change notification"
    );
}

// -------------------------------------------------------------------------------------------------

/// Error from parsing a [`ConnectivityEvent`](crate::ConnectivityEvent) name.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown connectivity event name {name:?}")]
pub struct ParseEventError {
    name: String,
}

impl ParseEventError {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
        }
    }
}

// -------------------------------------------------------------------------------------------------
