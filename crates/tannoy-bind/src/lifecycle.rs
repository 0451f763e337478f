//! Host-lifecycle primitives: identity-keyed memoization and effect cells.
//!
//! These stand in for the host framework's memo/effect hooks. Dependencies
//! are compared by reference identity, never by structural equality, so a
//! freshly allocated but structurally identical value counts as a change.
//! A key retains every value it tracks: a tracked allocation cannot be freed
//! and its address handed out again while the key is held, so equal tokens
//! always mean the same live value.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

struct Dep {
    token: usize,
    _keep: Arc<dyn Any + Send + Sync>,
}

/// Identity key over a set of dependency references.
#[derive(Default)]
pub struct Deps(Vec<Dep>);

impl Deps {
    pub fn none() -> Self {
        Self::default()
    }

    /// Track a shared value by its allocation address, keeping it alive for
    /// as long as this key is held.
    pub fn track<T: Send + Sync + 'static>(mut self, shared: &Arc<T>) -> Self {
        let keep: Arc<dyn Any + Send + Sync> = shared.clone();
        self.0.push(Dep {
            token: Arc::as_ptr(shared) as usize,
            _keep: keep,
        });
        self
    }

    /// Track an opaque identity token. `keep` must own whatever allocation
    /// the token points into, so the token stays unambiguous.
    pub fn track_token(mut self, token: usize, keep: impl Any + Send + Sync) -> Self {
        self.0.push(Dep {
            token,
            _keep: Arc::new(keep),
        });
        self
    }
}

impl PartialEq for Deps {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(a, b)| a.token == b.token)
    }
}

impl Eq for Deps {}

impl fmt::Debug for Deps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|d| d.token))
            .finish()
    }
}

/// Re-derives a value only when its dependency identities change.
#[derive(Debug, Default)]
pub struct Memo<T> {
    slot: Option<(Deps, T)>,
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn get_or_compute(&mut self, deps: Deps, compute: impl FnOnce() -> T) -> T {
        if let Some((prev, value)) = &self.slot {
            if *prev == deps {
                return value.clone();
            }
        }
        let value = compute();
        self.slot = Some((deps, value.clone()));
        value
    }
}

pub type Teardown = Box<dyn FnOnce()>;

/// Runs a setup closure when its dependency identities change, invoking the
/// previous setup's teardown first, and once more on [`Effect::dispose`].
#[derive(Default)]
pub struct Effect {
    slot: Option<(Deps, Option<Teardown>)>,
}

impl Effect {
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn run(&mut self, deps: Deps, setup: impl FnOnce() -> Option<Teardown>) {
        if let Some((prev, _)) = &self.slot {
            if *prev == deps {
                return;
            }
        }
        if let Some((_, Some(teardown))) = self.slot.take() {
            teardown();
        }
        self.slot = Some((deps, setup()));
    }

    /// Final teardown. Safe to call more than once.
    pub fn dispose(&mut self) {
        if let Some((_, Some(teardown))) = self.slot.take() {
            teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn memo_reuses_value_for_same_deps() {
        let dep = Arc::new(1u8);
        let mut memo = Memo::new();
        let mut runs = 0;
        let first = memo.get_or_compute(Deps::none().track(&dep), || {
            runs += 1;
            42
        });
        let second = memo.get_or_compute(Deps::none().track(&dep), || {
            runs += 1;
            43
        });
        assert_eq!((first, second, runs), (42, 42, 1));
    }

    #[test]
    fn memo_recomputes_when_identity_changes() {
        let mut memo = Memo::new();
        let a = Arc::new(1u8);
        let b = Arc::new(1u8);
        let first = memo.get_or_compute(Deps::none().track(&a), || 1);
        let second = memo.get_or_compute(Deps::none().track(&b), || 2);
        assert_eq!((first, second), (1, 2));
    }

    #[test]
    fn fresh_allocation_cannot_collide_with_held_key() {
        // The first key keeps its tracked value alive, so the second
        // allocation can never land on the same address.
        let first = Deps::none().track(&Arc::new([0u64; 4]));
        let second = Deps::none().track(&Arc::new([1u64; 4]));
        assert_ne!(first, second);
    }

    #[test]
    fn effect_reruns_for_every_fresh_dependency() {
        // Each dependency is dropped by the caller right after the pass; the
        // slot's retained key is what prevents address reuse from making two
        // distinct generations compare equal.
        let mut effect = Effect::new();
        let mut runs = 0;
        for _ in 0..4 {
            let dep = Arc::new([0u64; 4]);
            effect.run(Deps::none().track(&dep), || {
                runs += 1;
                None
            });
        }
        assert_eq!(runs, 4);
    }

    #[test]
    fn effect_tears_down_before_next_setup() {
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let mut effect = Effect::new();
        let a = Arc::new(());
        let b = Arc::new(());

        for (name, dep) in [("a", &a), ("b", &b)] {
            let setup_log = log.clone();
            let teardown_log = log.clone();
            effect.run(Deps::none().track(dep), move || {
                setup_log.borrow_mut().push(format!("setup {name}"));
                Some(Box::new(move || {
                    teardown_log.borrow_mut().push(format!("teardown {name}"));
                }) as Teardown)
            });
        }
        effect.dispose();

        assert_eq!(
            log.borrow().as_slice(),
            ["setup a", "teardown a", "setup b", "teardown b"]
        );
    }

    #[test]
    fn effect_skips_when_deps_unchanged() {
        let mut effect = Effect::new();
        let dep = Arc::new(());
        let mut runs = 0;
        for _ in 0..3 {
            effect.run(Deps::none().track(&dep), || {
                runs += 1;
                None
            });
        }
        assert_eq!(runs, 1);
    }

    #[test]
    fn dispose_is_idempotent() {
        let count = Rc::new(RefCell::new(0));
        let mut effect = Effect::new();
        let sink = count.clone();
        effect.run(Deps::none(), move || {
            Some(Box::new(move || {
                *sink.borrow_mut() += 1;
            }) as Teardown)
        });
        effect.dispose();
        effect.dispose();
        assert_eq!(*count.borrow(), 1);
    }
}
