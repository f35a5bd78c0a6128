use std::hash;
use std::fmt;
use std::ops::Deref;
use std::ptr;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

/// A hash-consed node. Nodes built by the same [`HcFactory`] are shared, so
/// structural equality of their payloads coincides with pointer equality.
#[derive(Debug, Clone)]
pub struct Hc<T>(Rc<T>);

impl<T: Clone> Hc<T> {
    pub fn cloned(&self) -> T {
        let Hc(inner) = self;
        inner.as_ref().clone()
    }
}

impl<T> PartialEq for Hc<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl<T> Eq for Hc<T> { }

impl<T> hash::Hash for Hc<T> {
    #[inline]
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl<T> Deref for Hc<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> AsRef<T> for Hc<T> {
    fn as_ref(&self) -> &T { &self.0 }
}

impl<T: fmt::Display> fmt::Display for Hc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

#[derive(Debug)]
pub struct HcFactory<T: hash::Hash + Eq + Clone> {
    table: AHashMap<T, Weak<T>>,
}

impl<T: hash::Hash + Eq + Clone> HcFactory<T> {
    pub fn with_capacity(capacity: usize) -> HcFactory<T> {
        HcFactory {
            table: AHashMap::with_capacity(capacity)
        }
    }

    pub fn make(&mut self, element: T) -> Hc<T> {
        if let Some(rc) = self.table.get(&element).and_then(Weak::upgrade) {
            return Hc(rc);
        }
        let rc = Rc::new(element.clone());
        self.table.insert(element, Rc::downgrade(&rc));
        Hc(rc)
    }

    /// Drops table entries whose node is no longer referenced.
    pub fn purge(&mut self) {
        self.table.retain(|_, weak| weak.strong_count() > 0);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
