//! Pointer events and listener lists.
//!
//! Components own their listener lists and notify subscribers directly; there
//! is no global event bus.

/// Pointer event kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Enter,
    Leave,
    /// Double click / double tap.
    DoubleClick,
}

/// Keyboard modifier flags held during a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A pointer event in local container coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::default(),
        }
    }
}

/// Pointer callbacks a host attaches to a chart node.
///
/// Every method defaults to a no-op so implementors only handle what they need.
pub trait PointerHandler {
    fn on_pointer_down(&mut self, _e: &PointerEvent) {}
    fn on_pointer_move(&mut self, _e: &PointerEvent) {}
    fn on_pointer_up(&mut self, _e: &PointerEvent) {}
    fn on_pointer_enter(&mut self, _e: &PointerEvent) {}
    fn on_pointer_leave(&mut self, _e: &PointerEvent) {}
    fn on_double_click(&mut self, _e: &PointerEvent) {}

    /// Route an event to the matching callback.
    fn dispatch(&mut self, e: &PointerEvent) {
        match e.kind {
            PointerEventKind::Down => self.on_pointer_down(e),
            PointerEventKind::Move => self.on_pointer_move(e),
            PointerEventKind::Up => self.on_pointer_up(e),
            PointerEventKind::Enter => self.on_pointer_enter(e),
            PointerEventKind::Leave => self.on_pointer_leave(e),
            PointerEventKind::DoubleClick => self.on_double_click(e),
        }
    }
}

/// Subscription token returned by [`Listeners::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

/// An owned list of callbacks notified in subscription order.
pub struct Listeners<T> {
    handlers: Vec<(ListenerId, Callback<T>)>,
    next_id: u64,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, value: &T) {
        for (_, handler) in &mut self.handlers {
            handler(value);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn listeners_fan_out_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut l = Listeners::<u32>::new();
        let a = seen.clone();
        l.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let b = seen.clone();
        l.subscribe(move |v| b.borrow_mut().push(("b", *v)));
        l.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribe_removes_only_target() {
        let hits = Rc::new(RefCell::new(0));
        let mut l = Listeners::<()>::new();
        let h = hits.clone();
        let id = l.subscribe(move |_| *h.borrow_mut() += 1);
        let h = hits.clone();
        l.subscribe(move |_| *h.borrow_mut() += 10);
        assert!(l.unsubscribe(id));
        assert!(!l.unsubscribe(id));
        l.emit(&());
        assert_eq!(*hits.borrow(), 10);
    }

    #[derive(Default)]
    struct Counter {
        downs: usize,
        leaves: usize,
    }

    impl PointerHandler for Counter {
        fn on_pointer_down(&mut self, _e: &PointerEvent) {
            self.downs += 1;
        }
        fn on_pointer_leave(&mut self, _e: &PointerEvent) {
            self.leaves += 1;
        }
    }

    #[test]
    fn dispatch_routes_by_kind() {
        let mut c = Counter::default();
        c.dispatch(&PointerEvent::new(PointerEventKind::Down, 0.0, 0.0));
        c.dispatch(&PointerEvent::new(PointerEventKind::Move, 0.0, 0.0));
        c.dispatch(&PointerEvent::new(PointerEventKind::Leave, 0.0, 0.0));
        assert_eq!((c.downs, c.leaves), (1, 1));
    }
}
