//! Operator prompts.

use crate::context::Context;

/// Answers questions the engine cannot decide on its own.
pub trait Operator {
    /// Pick a context for a draft; `None` aborts the compose.
    ///
    /// `preselected` is the context that would be offered as default.
    fn choose_context(&mut self, contexts: &[Context], preselected: Option<usize>)
    -> Option<usize>;
}

impl<F> Operator for F
where
    F: FnMut(&[Context], Option<usize>) -> Option<usize>,
{
    fn choose_context(
        &mut self,
        contexts: &[Context],
        preselected: Option<usize>,
    ) -> Option<usize> {
        self(contexts, preselected)
    }
}

/// Operator that is never there; every prompt aborts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unattended;

impl Operator for Unattended {
    fn choose_context(&mut self, _: &[Context], _: Option<usize>) -> Option<usize> {
        None
    }
}

/// Operator that always answers with a context chosen by name.
#[derive(Debug, Clone)]
pub struct ByName(pub String);

impl Operator for ByName {
    fn choose_context(&mut self, contexts: &[Context], _: Option<usize>) -> Option<usize> {
        contexts.iter().position(|c| c.name == self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contexts() -> Vec<Context> {
        vec![
            Context::under_root("home", "me@home.example", "/mail/home"),
            Context::under_root("work", "me@work.example", "/mail/work"),
        ]
    }

    #[test]
    fn closures_are_operators() {
        let mut operator = |_: &[Context], preselected: Option<usize>| preselected.or(Some(1));
        assert_eq!(operator.choose_context(&contexts(), None), Some(1));
        assert_eq!(operator.choose_context(&contexts(), Some(0)), Some(0));
    }

    #[test]
    fn unattended_aborts() {
        assert_eq!(Unattended.choose_context(&contexts(), Some(0)), None);
    }

    #[test]
    fn by_name() {
        assert_eq!(ByName("work".to_string()).choose_context(&contexts(), None), Some(1));
        assert_eq!(ByName("play".to_string()).choose_context(&contexts(), None), None);
    }
}
