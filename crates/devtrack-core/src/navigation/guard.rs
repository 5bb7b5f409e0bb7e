pub const UNSAVED_CHANGES_MESSAGE: &str =
    "You have unsaved changes. Are you sure you want to leave this page?";

/// Yes/no confirmation source (prompt, modal, or a pre-collected answer).
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// An answer already collected, e.g. from a modal that has closed.
impl Confirm for bool {
    fn confirm(&self, _message: &str) -> bool {
        *self
    }
}

/// Deactivation guard for form screens.
pub struct UnsavedChangesGuard;

impl UnsavedChangesGuard {
    /// `true` when navigation away may proceed. Clean forms leave freely;
    /// dirty forms ask `confirm`.
    pub fn can_leave(dirty: bool, confirm: &impl Confirm) -> bool {
        !dirty || confirm.confirm(UNSAVED_CHANGES_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn clean_form_never_asks() {
        let asked = RefCell::new(false);
        let confirm = |_: &str| {
            *asked.borrow_mut() = true;
            false
        };
        assert!(UnsavedChangesGuard::can_leave(false, &confirm));
        assert!(!*asked.borrow());
    }

    #[test]
    fn dirty_form_follows_the_answer() {
        let seen = RefCell::new(String::new());
        let confirm = |msg: &str| {
            seen.borrow_mut().push_str(msg);
            true
        };
        assert!(UnsavedChangesGuard::can_leave(true, &confirm));
        assert_eq!(*seen.borrow(), UNSAVED_CHANGES_MESSAGE);

        assert!(!UnsavedChangesGuard::can_leave(true, &false));
    }
}
