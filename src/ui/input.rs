use smallvec::SmallVec;

use super::{ElementNode, require};

/// Pointer button identifier. Wheel notches arrive as button presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    Other(u8),
}

/// Pointer events routed to elements. Positions are display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    ButtonDown { button: MouseButton, x: i32, y: i32 },
    ButtonUp { button: MouseButton, x: i32, y: i32 },
    Motion { x: i32, y: i32 },
    /// Anything else the embedder forwards; only universal handlers see it.
    Other,
}

impl UiEvent {
    /// Pointer position, for events that carry one.
    pub fn pos(&self) -> Option<(i32, i32)> {
        match *self {
            UiEvent::ButtonDown { x, y, .. }
            | UiEvent::ButtonUp { x, y, .. }
            | UiEvent::Motion { x, y } => Some((x, y)),
            UiEvent::Other => None,
        }
    }
}

/// Opaque time value from the embedder's frame loop, passed to universal
/// handlers untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tick(pub u64);

pub type PointerHandler = Box<dyn FnMut(&mut ElementNode, &UiEvent)>;
pub type UniversalHandler = Box<dyn FnMut(&mut ElementNode, &UiEvent, Tick)>;

/// Per-element handler table: one optional callback per pointer slot plus
/// an ordered list called for every event.
#[derive(Default)]
pub struct Handlers {
    button_down: Option<PointerHandler>,
    mouse_over: Option<PointerHandler>,
    mouse_enter: Option<PointerHandler>,
    mouse_exit: Option<PointerHandler>,
    universal: SmallVec<[UniversalHandler; 2]>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    ButtonDown,
    MouseOver,
    MouseEnter,
    MouseExit,
}

impl Handlers {
    fn slot(&mut self, slot: Slot) -> &mut Option<PointerHandler> {
        match slot {
            Slot::ButtonDown => &mut self.button_down,
            Slot::MouseOver => &mut self.mouse_over,
            Slot::MouseEnter => &mut self.mouse_enter,
            Slot::MouseExit => &mut self.mouse_exit,
        }
    }

    pub fn universal_len(&self) -> usize {
        self.universal.len()
    }
}

impl ElementNode {
    pub fn bind_button_down(&mut self, handler: impl FnMut(&mut ElementNode, &UiEvent) + 'static) {
        self.handlers.button_down = Some(Box::new(handler));
    }

    pub fn bind_mouse_over(&mut self, handler: impl FnMut(&mut ElementNode, &UiEvent) + 'static) {
        self.handlers.mouse_over = Some(Box::new(handler));
    }

    pub fn bind_mouse_enter(&mut self, handler: impl FnMut(&mut ElementNode, &UiEvent) + 'static) {
        self.handlers.mouse_enter = Some(Box::new(handler));
    }

    pub fn bind_mouse_exit(&mut self, handler: impl FnMut(&mut ElementNode, &UiEvent) + 'static) {
        self.handlers.mouse_exit = Some(Box::new(handler));
    }

    pub fn unbind_button_down(&mut self) -> Option<PointerHandler> {
        self.handlers.button_down.take()
    }

    pub fn unbind_mouse_over(&mut self) -> Option<PointerHandler> {
        self.handlers.mouse_over.take()
    }

    pub fn unbind_mouse_enter(&mut self) -> Option<PointerHandler> {
        self.handlers.mouse_enter.take()
    }

    pub fn unbind_mouse_exit(&mut self) -> Option<PointerHandler> {
        self.handlers.mouse_exit.take()
    }

    /// Append a handler that sees every event, after the existing ones.
    pub fn bind_universal(
        &mut self,
        handler: impl FnMut(&mut ElementNode, &UiEvent, Tick) + 'static,
    ) {
        self.handlers.universal.push(Box::new(handler));
    }

    /// Remove the universal handler at `index`, or None if out of range.
    pub fn unbind_universal(&mut self, index: usize) -> Option<UniversalHandler> {
        (index < self.handlers.universal.len()).then(|| self.handlers.universal.remove(index))
    }

    /// Remove the most recently bound universal handler.
    pub fn pop_universal(&mut self) -> Option<UniversalHandler> {
        self.handlers.universal.pop()
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Run one slot handler. It is lifted out of the table for the call so it
    /// can borrow the node; a replacement bound during the call is kept.
    fn fire(&mut self, slot: Slot, event: &UiEvent) {
        let Some(mut handler) = self.handlers.slot(slot).take() else {
            return;
        };
        handler(self, event);
        let bound = self.handlers.slot(slot);
        if bound.is_none() {
            *bound = Some(handler);
        }
    }

    fn hit(&self, x: i32, y: i32) -> bool {
        require(self.rect, "pointer event routed to an element with no rect; call update() first")
            .contains(x, y)
    }

    /// Route one event to this element's handlers.
    ///
    /// Inactive elements ignore everything. A primary-button press inside the
    /// rect fires `button_down`. Motion tracks enter/over/exit against the
    /// rect. Universal handlers then run in bind order for every event kind.
    pub fn handle_event(&mut self, event: &UiEvent, tick: Tick) {
        if !self.active {
            return;
        }

        match *event {
            UiEvent::ButtonDown {
                button: MouseButton::Left,
                x,
                y,
            } => {
                if self.hit(x, y) {
                    self.fire(Slot::ButtonDown, event);
                }
            }
            UiEvent::Motion { x, y } => {
                let inside_now = self.hit(x, y);
                if inside_now {
                    if !self.mouse_inside {
                        self.mouse_inside = true;
                        self.fire(Slot::MouseEnter, event);
                    }
                    self.fire(Slot::MouseOver, event);
                }
                if !inside_now && self.mouse_inside {
                    self.mouse_inside = false;
                    self.fire(Slot::MouseExit, event);
                }
            }
            _ => {}
        }

        // Handlers bound while the list is running go after the existing ones.
        let mut universal = std::mem::take(&mut self.handlers.universal);
        for handler in universal.iter_mut() {
            handler(self, event, tick);
        }
        let added = std::mem::replace(&mut self.handlers.universal, universal);
        self.handlers.universal.extend(added);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::geometry::{RelativePosition, Size};
    use crate::surface::Surface;

    /// Frame whose rect is (10, 10, 20x20) without going through a Screen.
    fn node() -> ElementNode {
        let mut n = ElementNode::frame(
            RelativePosition::from_offsets(10.0, 10.0),
            Surface::new(Size::new(20, 20)),
        );
        n.rect = Some(crate::geometry::Rect::from_top_left(10, 10, Size::new(20, 20)));
        n
    }

    fn motion(x: i32, y: i32) -> UiEvent {
        UiEvent::Motion { x, y }
    }

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> impl FnMut(&mut ElementNode, &UiEvent) + 'static {
        let log = Rc::clone(log);
        move |_, _| log.borrow_mut().push(tag)
    }

    #[test]
    fn motion_fires_enter_over_exit_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut n = node();
        n.bind_mouse_enter(recorder(&log, "enter"));
        n.bind_mouse_over(recorder(&log, "over"));
        n.bind_mouse_exit(recorder(&log, "exit"));

        n.handle_event(&motion(0, 0), Tick(0));
        n.handle_event(&motion(15, 15), Tick(1));
        assert!(n.mouse_inside());
        n.handle_event(&motion(16, 16), Tick(2));
        n.handle_event(&motion(40, 40), Tick(3));
        assert!(!n.mouse_inside());
        n.handle_event(&motion(41, 41), Tick(4));

        assert_eq!(*log.borrow(), vec!["enter", "over", "over", "exit"]);
    }

    #[test]
    fn only_primary_button_inside_rect_fires_button_down() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut n = node();
        n.bind_button_down(recorder(&log, "down"));

        let press = |button, x, y| UiEvent::ButtonDown { button, x, y };
        n.handle_event(&press(MouseButton::Right, 15, 15), Tick(0));
        n.handle_event(&press(MouseButton::WheelDown, 15, 15), Tick(0));
        n.handle_event(&press(MouseButton::Left, 50, 15), Tick(0));
        n.handle_event(&UiEvent::ButtonUp { button: MouseButton::Left, x: 15, y: 15 }, Tick(0));
        n.handle_event(&press(MouseButton::Left, 29, 10), Tick(0));

        assert_eq!(*log.borrow(), vec!["down"]);
    }

    #[test]
    fn inactive_element_ignores_everything() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut n = node();
        n.bind_mouse_enter(recorder(&log, "enter"));
        let universal_log = Rc::clone(&log);
        n.bind_universal(move |_, _, _| universal_log.borrow_mut().push("universal"));
        n.active = false;

        n.handle_event(&motion(15, 15), Tick(0));
        assert!(log.borrow().is_empty());
        assert!(!n.mouse_inside());
    }

    #[test]
    fn universal_handlers_run_in_order_with_tick() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut n = node();
        for tag in [1u64, 2] {
            let seen = Rc::clone(&seen);
            n.bind_universal(move |_, _, tick| seen.borrow_mut().push((tag, tick)));
        }

        n.handle_event(&UiEvent::Other, Tick(7));
        assert_eq!(*seen.borrow(), vec![(1, Tick(7)), (2, Tick(7))]);

        assert!(n.pop_universal().is_some());
        assert!(n.unbind_universal(5).is_none());
        assert!(n.unbind_universal(0).is_some());
        assert_eq!(n.handlers().universal_len(), 0);
    }

    #[test]
    fn handler_can_rebind_its_own_slot() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut n = node();
        let second = recorder(&log, "second");
        let first_log = Rc::clone(&log);
        let mut second = Some(second);
        n.bind_button_down(move |node, _| {
            first_log.borrow_mut().push("first");
            if let Some(next) = second.take() {
                node.bind_button_down(next);
            }
        });

        let click = UiEvent::ButtonDown { button: MouseButton::Left, x: 15, y: 15 };
        n.handle_event(&click, Tick(0));
        n.handle_event(&click, Tick(1));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn handlers_can_mutate_the_node() {
        let mut n = node();
        n.bind_button_down(|node, _| node.visible = !node.visible);
        let click = UiEvent::ButtonDown { button: MouseButton::Left, x: 12, y: 12 };
        n.handle_event(&click, Tick(0));
        assert!(!n.visible);
    }

    #[test]
    #[should_panic(expected = "no rect")]
    fn pointer_event_before_update_panics() {
        let mut n = ElementNode::frame(RelativePosition::ZERO, Surface::new(Size::new(4, 4)));
        n.handle_event(&motion(1, 1), Tick(0));
    }
}
