use crate::{KeyDomain, Payload};

/// Construction time settings for a [`crate::RedBlackTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig<V> {
    /// Keys accepted by insert and delete.
    pub domain: KeyDomain<V>,
    /// Pause before every fixup step until `resume` is called.
    pub explain: bool,
}

impl<V: Payload> Default for TreeConfig<V> {
    fn default() -> Self {
        TreeConfig {
            domain: KeyDomain::Unbounded,
            explain: false,
        }
    }
}

impl<V: Payload> TreeConfig<V> {
    pub fn with_domain(mut self, domain: KeyDomain<V>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }
}

impl TreeConfig<u32> {
    /// Keys strictly between 0 and 1000, the classic demo domain.
    pub fn classic() -> Self {
        TreeConfig::default().with_domain(KeyDomain::open(
            crate::constants::DEFAULT_MIN,
            crate::constants::DEFAULT_MAX,
        ))
    }
}
