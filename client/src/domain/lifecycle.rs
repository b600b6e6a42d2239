//! Request lifecycle events shared by every asynchronous operation.

/// The three transitions an asynchronous operation contributes to a slice.
///
/// `Pending` is applied before any I/O starts; exactly one of `Fulfilled` or
/// `Rejected` follows once the operation settles.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<T> {
    /// The operation has been issued and is outstanding.
    Pending,
    /// The operation settled successfully with a result.
    Fulfilled(T),
    /// The operation settled with a failure, reduced to its message text.
    Rejected(String),
}

impl<T> Lifecycle<T> {
    /// Whether this event marks the settlement of an operation.
    pub const fn is_settlement(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Transform the fulfilled value, keeping the other variants.
    pub fn map<U>(self, transform: impl FnOnce(T) -> U) -> Lifecycle<U> {
        match self {
            Self::Pending => Lifecycle::Pending,
            Self::Fulfilled(value) => Lifecycle::Fulfilled(transform(value)),
            Self::Rejected(message) => Lifecycle::Rejected(message),
        }
    }

    /// Short label used in trace output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled(_) => "fulfilled",
            Self::Rejected(_) => "rejected",
        }
    }
}
