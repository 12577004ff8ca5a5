/// Asks the operator to approve a destructive action.
pub trait Confirmer {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Answer given up front, e.g. a `confirm=true` query flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preapproved(pub bool);

impl Confirmer for Preapproved {
    fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, approved = self.0, "confirmation");
        self.0
    }
}
