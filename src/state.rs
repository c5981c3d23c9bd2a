//! Observable state container shared by the view-model and the screens.
//!
//! Everything runs on the UI thread, so handles share the value through
//! `Rc<RefCell<_>>`. Observers either register a callback with
//! [`StateFlow::subscribe`] or poll a [`Watcher`]. Neither buffers: a watcher
//! that falls behind only ever sees the latest value.

use std::cell::RefCell;
use std::rc::Rc;

type Subscriber<T> = Box<dyn FnMut(&T)>;

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Subscriber<T>>,
}

pub struct StateFlow<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for StateFlow<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone> StateFlow<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: initial,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn value(&self) -> T {
        self.inner.borrow().value.clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Mutates the value in place and notifies every subscriber once.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let (snapshot, mut subscribers) = {
            let mut inner = self.inner.borrow_mut();
            f(&mut inner.value);
            inner.version += 1;
            (inner.value.clone(), std::mem::take(&mut inner.subscribers))
        };

        // Subscribers run without the borrow held so they may read the flow.
        for subscriber in &mut subscribers {
            subscriber(&snapshot);
        }

        let mut inner = self.inner.borrow_mut();
        subscribers.append(&mut inner.subscribers);
        inner.subscribers = subscribers;
    }

    /// Registers `f` and immediately calls it with the current value.
    pub fn subscribe(&self, mut f: impl FnMut(&T) + 'static) {
        let current = self.value();
        f(&current);
        self.inner.borrow_mut().subscribers.push(Box::new(f));
    }

    pub fn watch(&self) -> Watcher<T> {
        Watcher {
            flow: self.clone(),
            seen: None,
        }
    }
}

/// Polling view of a [`StateFlow`].
pub struct Watcher<T> {
    flow: StateFlow<T>,
    seen: Option<u64>,
}

impl<T: Clone> Watcher<T> {
    /// Returns the latest value if it changed since the previous call.
    /// The first call always yields the current value.
    pub fn changed(&mut self) -> Option<T> {
        let version = self.flow.version();
        if self.seen == Some(version) {
            return None;
        }
        self.seen = Some(version);
        Some(self.flow.value())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn subscribers_get_initial_and_later_values() {
        let flow = StateFlow::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        flow.subscribe(move |value| sink.borrow_mut().push(*value));

        flow.update(|v| *v = 2);
        flow.update(|value| *value += 1);

        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn watcher_sees_only_the_latest_value() {
        let flow = StateFlow::new("a".to_string());
        let mut watcher = flow.watch();

        assert_eq!(watcher.changed(), Some("a".to_string()));
        assert_eq!(watcher.changed(), None);

        flow.update(|v| *v = "b".to_string());
        flow.update(|v| *v = "c".to_string());

        assert_eq!(watcher.changed(), Some("c".to_string()));
        assert_eq!(watcher.changed(), None);
    }

    #[test]
    fn subscribers_can_read_the_flow() {
        let flow = StateFlow::new(0);
        let reader = flow.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        flow.subscribe(move |_| sink.borrow_mut().push(reader.value()));

        flow.update(|v| *v = 5);

        assert_eq!(*seen.borrow(), vec![0, 5]);
    }
}
