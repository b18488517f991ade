mod input;
mod scrolling;
mod sprite;
mod text;
mod theme;
mod widget;

pub use input::{Handlers, MouseButton, PointerHandler, Tick, UiEvent, UniversalHandler};
pub use scrolling::ScrollingFrame;
pub use sprite::Sprite;
pub use text::Text;
pub use theme::Theme;
pub use widget::Widget;

use std::path::Path;

use image::ImageResult;
use slotmap::{SlotMap, new_key_type};

use crate::geometry::{Position, Rect, RelativePosition, Size};
use crate::mask;
use crate::surface::{Color, Surface};

new_key_type! {
    /// Handle into the element arena. Stable across insertions/removals.
    pub struct ElementId;

    /// Handle to a scene registered on a [`Screen`].
    pub struct SceneId;
}

/// Non-owning back-reference from an element to whatever holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Scene(SceneId),
    Element(ElementId),
}

/// Log and panic on a broken usage precondition.
#[track_caller]
pub(crate) fn violation(invariant: &str) -> ! {
    log::error!("{invariant}");
    panic!("{invariant}");
}

/// Unwrap a value a precondition guarantees, panicking with `invariant`
/// otherwise.
#[track_caller]
pub(crate) fn require<T>(value: Option<T>, invariant: &str) -> T {
    match value {
        Some(v) => v,
        None => violation(invariant),
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Root container drawing straight onto the display surface.
pub struct Scene {
    /// Inactive scenes are skipped entirely by [`Screen::render`].
    pub active: bool,
    pub priority: i32,
    children: Vec<ElementId>,
}

impl Scene {
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

// ---------------------------------------------------------------------------
// Element node (arena entry)
// ---------------------------------------------------------------------------

/// Arena entry pairing a widget with the state every element shares.
pub struct ElementNode {
    /// Lookup key for [`Screen::child_of_name`]. Empty by default.
    pub name: String,
    pub relative_position: RelativePosition,
    /// What this element draws into its parent. For a scrolling frame this is
    /// the full content surface its children compose onto.
    pub surface: Option<Surface>,
    /// Snapshot from the last update; restored before children recompose.
    cached_surface: Option<Surface>,
    /// Absolute bounding box from the last update.
    rect: Option<Rect>,
    /// Fill behind text. Other kinds carry it as a marker only.
    pub fill_color: Color,
    /// Draw order among siblings, ascending. Ties keep insertion order.
    pub priority: i32,
    pub visible: bool,
    /// Gates event handling only; inactive elements still draw.
    pub active: bool,
    parent: Option<Parent>,
    children: Vec<ElementId>,
    handlers: Handlers,
    mouse_inside: bool,
    pub widget: Widget,
}

impl ElementNode {
    fn new(relative_position: RelativePosition, surface: Option<Surface>, widget: Widget) -> Self {
        Self {
            name: String::new(),
            relative_position,
            surface,
            cached_surface: None,
            rect: None,
            fill_color: Color::BLACK,
            priority: 1,
            visible: true,
            active: true,
            parent: None,
            children: Vec::new(),
            handlers: Handlers::default(),
            mouse_inside: false,
            widget,
        }
    }

    pub fn frame(pos: RelativePosition, surface: Surface) -> Self {
        Self::new(pos, Some(surface), Widget::Frame)
    }

    pub fn image(pos: RelativePosition, surface: Surface) -> Self {
        Self::new(pos, Some(surface), Widget::Image)
    }

    pub fn image_from_path(pos: RelativePosition, path: impl AsRef<Path>) -> ImageResult<Self> {
        Ok(Self::image(pos, Surface::load(path)?))
    }

    pub fn option_item(pos: RelativePosition, surface: Surface) -> Self {
        Self::new(pos, Some(surface), Widget::OptionItem { selected: false })
    }

    /// Text element of a fixed `size`. The text is laid out immediately.
    pub fn text(pos: RelativePosition, size: Size, fill: Color, mut text: Text) -> Self {
        let mut surface = Surface::new(size);
        text.draw_text(&mut surface, fill);
        let mut node = Self::new(pos, Some(surface), Widget::Text(text));
        node.fill_color = fill;
        node
    }

    /// Scrolling frame. Its surfaces are allocated on the first update, and
    /// wheel input is wired up as a universal handler.
    pub fn scrolling_frame(pos: RelativePosition, frame: ScrollingFrame) -> Self {
        let mut node = Self::new(pos, None, Widget::ScrollingFrame(frame));
        node.bind_universal(scrolling::scroll_input);
        node
    }

    pub fn sprite(pos: RelativePosition, surface: Surface, sprite: Sprite) -> Self {
        Self::new(pos, Some(surface), Widget::Sprite(sprite))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_fill_color(mut self, fill: Color) -> Self {
        self.fill_color = fill;
        self
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn parent(&self) -> Option<Parent> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn cached_surface(&self) -> Option<&Surface> {
        self.cached_surface.as_ref()
    }

    /// Whether the last motion event landed inside the rect.
    pub fn mouse_inside(&self) -> bool {
        self.mouse_inside
    }

    /// Replace a Text element's string and re-layout its surface before
    /// returning.
    pub fn set_text(&mut self, value: impl Into<String>) {
        let ElementNode {
            widget,
            surface,
            fill_color,
            ..
        } = self;
        let Widget::Text(text) = widget else {
            violation("set_text called on a non-Text element");
        };
        let surface = require(surface.as_mut(), "Text element has no surface");
        text.set_text(value, surface, *fill_color);
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// Owns the display surface, the scenes drawn onto it, and every element.
pub struct Screen {
    display: Surface,
    scenes: SlotMap<SceneId, Scene>,
    /// Registration order; render stable-sorts a copy by priority.
    scene_order: Vec<SceneId>,
    elements: SlotMap<ElementId, ElementNode>,
    theme: Theme,
}

impl Screen {
    /// Screen with an opaque display of `size`.
    pub fn new(size: Size, theme: Theme) -> Self {
        Self::with_display(Surface::opaque(size), theme)
    }

    pub fn with_display(display: Surface, theme: Theme) -> Self {
        Self {
            display,
            scenes: SlotMap::with_key(),
            scene_order: Vec::new(),
            elements: SlotMap::with_key(),
            theme,
        }
    }

    pub fn display(&self) -> &Surface {
        &self.display
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    // ------------------------------------------------------------------
    // Scenes
    // ------------------------------------------------------------------

    pub fn add_scene(&mut self, active: bool, priority: i32) -> SceneId {
        let id = self.scenes.insert(Scene {
            active,
            priority,
            children: Vec::new(),
        });
        self.scene_order.push(id);
        log::debug!("registered scene {id:?} (priority {priority}, active {active})");
        id
    }

    /// Unregister a scene and free every element under it.
    pub fn remove_scene(&mut self, id: SceneId) {
        let Some(scene) = self.scenes.get(id) else {
            return;
        };
        for child in scene.children.clone() {
            self.remove(child);
        }
        self.scenes.remove(id);
        self.scene_order.retain(|s| *s != id);
        log::debug!("removed scene {id:?}");
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    /// Add an element without a parent.
    pub fn create(&mut self, node: ElementNode) -> ElementId {
        self.elements.insert(node)
    }

    /// Add an element as the last child of `parent`.
    pub fn insert(&mut self, parent: Parent, node: ElementNode) -> ElementId {
        let id = self.create(node);
        self.set_parent(id, parent);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        self.elements.get_mut(id)
    }

    #[track_caller]
    fn node(&self, id: ElementId) -> &ElementNode {
        require(self.elements.get(id), "element id is not in this screen")
    }

    #[track_caller]
    fn node_mut(&mut self, id: ElementId) -> &mut ElementNode {
        require(self.elements.get_mut(id), "element id is not in this screen")
    }

    /// Children of a scene or element, in insertion order. Empty for a
    /// stale id.
    pub fn children(&self, parent: Parent) -> &[ElementId] {
        match parent {
            Parent::Scene(s) => self.scenes.get(s).map(|s| s.children.as_slice()).unwrap_or(&[]),
            Parent::Element(e) => self
                .elements
                .get(e)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn children_mut(&mut self, parent: Parent) -> Option<&mut Vec<ElementId>> {
        match parent {
            Parent::Scene(s) => self.scenes.get_mut(s).map(|s| &mut s.children),
            Parent::Element(e) => self.elements.get_mut(e).map(|n| &mut n.children),
        }
    }

    /// Move `id` to the end of `parent`'s children, detaching it from any
    /// previous parent first.
    pub fn set_parent(&mut self, id: ElementId, parent: Parent) {
        self.node(id);
        if let Parent::Element(p) = parent
            && (p == id || self.descendants(Parent::Element(id)).contains(&p))
        {
            violation("cannot parent an element under its own subtree");
        }

        self.unparent(id);
        let siblings = require(self.children_mut(parent), "parent is not in this screen");
        siblings.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    /// Detach `id` from its parent. A no-op for unparented elements.
    pub fn unparent(&mut self, id: ElementId) {
        let Some(parent) = self.node_mut(id).parent.take() else {
            return;
        };
        if let Some(siblings) = self.children_mut(parent) {
            siblings.retain(|c| *c != id);
        }
    }

    /// Free `id` and its whole subtree.
    pub fn remove(&mut self, id: ElementId) {
        if !self.elements.contains_key(id) {
            return;
        }
        let doomed = self.descendants(Parent::Element(id));
        self.unparent(id);
        self.elements.remove(id);
        for d in &doomed {
            self.elements.remove(*d);
        }
        log::debug!("removed element {id:?} and {} descendants", doomed.len());
    }

    /// Every element below `parent`: its children first, then each child's
    /// descendants in turn. Parents always precede their own children.
    pub fn descendants(&self, parent: Parent) -> Vec<ElementId> {
        let children = self.children(parent);
        let mut out = children.to_vec();
        for &child in children {
            out.extend(self.descendants(Parent::Element(child)));
        }
        out
    }

    /// First direct child named `name`.
    pub fn child_of_name(&self, parent: Parent, name: &str) -> Option<ElementId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.elements.get(*c).is_some_and(|n| n.name == name))
    }

    // ------------------------------------------------------------------
    // Positioning
    // ------------------------------------------------------------------

    pub fn offset(&mut self, id: ElementId, delta: RelativePosition) {
        let node = self.node_mut(id);
        node.relative_position = node.relative_position.offset(delta);
    }

    /// Position the element so its surface center lands on `pos`.
    pub fn center_position(&mut self, id: ElementId, pos: RelativePosition) {
        let node = self.node_mut(id);
        let size = require(node.surface.as_ref(), "cannot center an element without a surface").size();
        node.relative_position = RelativePosition::new(
            pos.x_scale,
            pos.x_offset - size.width as f32 / 2.0,
            pos.y_scale,
            pos.y_offset - size.height as f32 / 2.0,
        );
    }

    /// Size of the surface children of `parent` are drawn onto.
    fn parent_size(&self, parent: Parent) -> Size {
        match parent {
            Parent::Scene(s) => {
                require(self.scenes.get(s), "parent scene is not in this screen");
                self.display.size()
            }
            Parent::Element(e) => require(
                self.elements.get(e).and_then(|n| n.surface.as_ref()),
                "ancestor element has no surface",
            )
            .size(),
        }
    }

    fn parent_surface_mut(&mut self, parent: Parent) -> &mut Surface {
        match parent {
            Parent::Scene(_) => &mut self.display,
            Parent::Element(e) => require(
                self.elements.get_mut(e).and_then(|n| n.surface.as_mut()),
                "attempted to draw onto a parent without a surface",
            ),
        }
    }

    /// Sum of every relative position from `id` up to its scene, each
    /// resolved against its own parent's surface.
    pub fn calculate_absolute_position(&self, id: ElementId) -> Position {
        let mut total = Position::default();
        let mut current = id;
        loop {
            let node = self.node(current);
            let parent = require(node.parent, "absolute position of an unparented element");
            total = total + node.relative_position.resolve(self.parent_size(parent));
            match parent {
                Parent::Scene(_) => return total,
                Parent::Element(p) => current = p,
            }
        }
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Recompute the absolute bounding rect.
    pub fn update_rect(&mut self, id: ElementId) {
        let at = self.calculate_absolute_position(id);
        let node = self.node(id);
        let surface = require(node.surface.as_ref(), "update_rect() on an element without a surface");
        let (x, y) = at.truncate();
        let rect = match &node.widget {
            Widget::ScrollingFrame(frame) => {
                let viewport = require(frame.viewport(), "ScrollingFrame has no viewport");
                Rect::from_top_left(x, y, viewport.size())
            }
            Widget::Sprite(sprite) => sprite.bounds(surface, at),
            _ => Rect::from_top_left(x, y, surface.size()),
        };
        self.node_mut(id).rect = Some(rect);
    }

    /// Refresh the element's snapshot and rect. Scrolling frames reallocate
    /// their viewport and content first; sprites rebuild their mask after.
    pub fn update(&mut self, id: ElementId) {
        if let Widget::ScrollingFrame(_) = self.node(id).widget {
            let parent = require(self.node(id).parent, "ScrollingFrame updated without a parent");
            let parent_size = self.parent_size(parent);
            let node = self.node_mut(id);
            if let Widget::ScrollingFrame(frame) = &mut node.widget {
                node.surface = Some(frame.layout(parent_size));
            }
        }

        let node = self.node_mut(id);
        let snapshot = require(node.surface.clone(), "update() on an element without a surface");
        node.cached_surface = Some(snapshot);
        self.update_rect(id);

        let node = self.node_mut(id);
        if let (Widget::Sprite(sprite), Some(surface)) = (&mut node.widget, node.surface.as_ref()) {
            sprite.refresh_mask(surface);
        }
        log::trace!("updated {} {id:?}", node.widget.kind_name());
    }

    /// Update every element below `parent`, parents before children.
    pub fn update_subtree(&mut self, parent: Parent) {
        for id in self.descendants(parent) {
            self.update(id);
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    fn by_priority(&self, mut ids: Vec<ElementId>) -> Vec<ElementId> {
        ids.sort_by_key(|id| self.elements.get(*id).map_or(0, |n| n.priority));
        ids
    }

    /// Composite the element onto its parent's surface. Hidden elements are
    /// skipped.
    pub fn draw(&mut self, id: ElementId) {
        self.draw_with(id, None);
    }

    /// Draw a sprite, optionally outlined with the theme's bounding box
    /// color.
    pub fn draw_sprite(&mut self, id: ElementId, bounding_box: bool) {
        if !matches!(self.node(id).widget, Widget::Sprite(_)) {
            violation("draw_sprite called on a non-Sprite element");
        }
        let outline = bounding_box.then_some(self.theme.bounding_box_color);
        self.draw_with(id, outline);
    }

    fn draw_with(&mut self, id: ElementId, outline: Option<Color>) {
        let node = self.node(id);
        let parent = require(node.parent, "attempted to draw on nothing: element has no parent");
        require(node.surface.as_ref(), "attempted to draw an element without a surface");
        if !node.visible {
            return;
        }
        let at = node.relative_position.resolve(self.parent_size(parent));

        let node = self.node_mut(id);
        let (layer, (x, y)) = match &mut node.widget {
            Widget::ScrollingFrame(frame) => {
                let content = require(node.surface.as_ref(), "ScrollingFrame has no content");
                frame.compose(content);
                let viewport = require(frame.viewport.take(), "ScrollingFrame drawn before update()");
                (viewport, at.truncate())
            }
            Widget::Sprite(sprite) => {
                let surface = require(node.surface.as_ref(), "Sprite has no surface");
                sprite.compose(surface, at, outline)
            }
            _ => (require(node.surface.take(), "element has no surface"), at.truncate()),
        };

        self.parent_surface_mut(parent).blit(&layer, x, y);

        let node = self.node_mut(id);
        match &mut node.widget {
            Widget::ScrollingFrame(frame) => frame.viewport = Some(layer),
            Widget::Sprite(_) => {}
            _ => node.surface = Some(layer),
        }
    }

    /// Compose the element's children onto its surface, restoring the update
    /// snapshot first when `reset` is set.
    pub fn draw_children(&mut self, id: ElementId, reset: bool) {
        let node = self.node_mut(id);
        require(node.surface.as_ref(), "attempted to draw children onto an element without a surface");
        if !node.visible {
            return;
        }
        if reset {
            let snapshot = require(node.cached_surface.clone(), "element drawn before update()");
            node.surface = Some(snapshot);
        }

        let order = self.by_priority(self.node(id).children.clone());
        for child in order {
            self.draw_sequence(child);
        }
    }

    /// Children onto the element, then the element onto its parent.
    pub fn draw_sequence(&mut self, id: ElementId) {
        self.draw_children(id, true);
        self.draw(id);
    }

    pub fn draw_scene(&mut self, id: SceneId) {
        let scene = require(self.scenes.get(id), "scene is not in this screen");
        let order = self.by_priority(scene.children.clone());
        for child in order {
            self.draw_sequence(child);
        }
    }

    /// Clear the display and draw every active scene in priority order.
    /// Nothing is updated here.
    pub fn render(&mut self, background: Color) {
        self.display.fill(background);

        let mut order = self.scene_order.clone();
        order.sort_by_key(|s| self.scenes.get(*s).map_or(0, |scene| scene.priority));
        for scene in order {
            if self.scenes.get(scene).is_some_and(|s| s.active) {
                self.draw_scene(scene);
            }
        }
        log::trace!("rendered {} scenes", self.scene_order.len());
    }

    // ------------------------------------------------------------------
    // Events, text, collision
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, id: ElementId, event: &UiEvent, tick: Tick) {
        self.node_mut(id).handle_event(event, tick);
    }

    /// Route `event` to every element below `parent`, each testing its own
    /// rect independently.
    pub fn dispatch(&mut self, parent: Parent, event: &UiEvent, tick: Tick) {
        for id in self.descendants(parent) {
            self.handle_event(id, event, tick);
        }
    }

    pub fn set_text(&mut self, id: ElementId, value: impl Into<String>) {
        self.node_mut(id).set_text(value);
    }

    /// First overlapping mask pixel between two elements, in absolute
    /// coordinates.
    pub fn pixel_collide(&self, a: ElementId, b: ElementId) -> Option<(i32, i32)> {
        mask::pixel_collide(self.node(a), self.node(b))
    }

    pub fn pixel_detected(&self, a: ElementId, b: ElementId) -> bool {
        self.pixel_collide(a, b).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{BlockFont, TextStyle, handle};
    use crate::geometry::Anchor;

    const RED: Color = Color::rgb(255, 0, 0);
    const GREEN: Color = Color::rgb(0, 255, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    fn screen() -> (Screen, SceneId) {
        let mut screen = Screen::new(Size::new(200, 200), Theme::default());
        let scene = screen.add_scene(true, 1);
        (screen, scene)
    }

    fn block(size: u32, color: Color) -> Surface {
        let mut s = Surface::new(Size::new(size, size));
        s.fill(color);
        s
    }

    fn at(x: f32, y: f32) -> RelativePosition {
        RelativePosition::from_offsets(x, y)
    }

    #[test]
    fn nested_positions_resolve_against_each_parent() {
        let (mut screen, scene) = screen();
        let root = screen.insert(Parent::Scene(scene), ElementNode::frame(at(10.0, 10.0), block(100, RED)));
        let child = screen.insert(
            Parent::Element(root),
            ElementNode::frame(RelativePosition::new(0.5, 5.0, 0.5, 5.0), block(10, BLUE)),
        );
        let p = screen.calculate_absolute_position(child);
        assert!((p.x - 65.0).abs() < 0.001);
        assert!((p.y - 65.0).abs() < 0.001);

        screen.update_subtree(Parent::Scene(scene));
        assert_eq!(screen.get(child).and_then(|n| n.rect()), Some(Rect::from_top_left(65, 65, Size::new(10, 10))));
    }

    #[test]
    fn equal_priorities_draw_in_insertion_order() {
        let (mut screen, scene) = screen();
        let top = screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(10, RED)).with_priority(5));
        for color in [GREEN, BLUE] {
            screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(10, color)));
        }
        screen.update_subtree(Parent::Scene(scene));

        for _ in 0..3 {
            screen.render(Color::BLACK);
            assert_eq!(screen.display().get_pixel(5, 5), Some(RED));
        }

        screen.get_mut(top).expect("exists").priority = 1;
        screen.render(Color::BLACK);
        assert_eq!(screen.display().get_pixel(5, 5), Some(BLUE));
        // Priority sorting never reorders the stored children.
        assert_eq!(screen.children(Parent::Scene(scene))[0], top);
    }

    #[test]
    fn descendants_cover_deep_trees_once_parents_first() {
        let (mut screen, scene) = screen();
        let mut all = Vec::new();
        let a = screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(50, RED)));
        all.push(a);
        for _ in 0..2 {
            let b = screen.insert(Parent::Element(a), ElementNode::frame(at(0.0, 0.0), block(20, RED)));
            all.push(b);
            for _ in 0..2 {
                let c = screen.insert(Parent::Element(b), ElementNode::frame(at(0.0, 0.0), block(5, RED)));
                all.push(c);
                all.push(screen.insert(Parent::Element(c), ElementNode::frame(at(0.0, 0.0), block(1, RED))));
            }
        }

        let found = screen.descendants(Parent::Scene(scene));
        assert_eq!(found.len(), all.len());
        for id in &all {
            assert_eq!(found.iter().filter(|f| *f == id).count(), 1);
        }
        for (i, id) in found.iter().enumerate() {
            if let Some(Parent::Element(p)) = screen.get(*id).and_then(|n| n.parent()) {
                assert!(found[..i].contains(&p));
            }
        }
    }

    #[test]
    fn children_are_recomposed_from_the_snapshot() {
        let (mut screen, scene) = screen();
        let parent = screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(20, RED)));
        let child = screen.insert(Parent::Element(parent), ElementNode::frame(at(0.0, 0.0), block(5, BLUE)));
        screen.update_subtree(Parent::Scene(scene));
        screen.render(Color::BLACK);
        assert_eq!(screen.display().get_pixel(2, 2), Some(BLUE));

        screen.offset(child, at(10.0, 10.0));
        screen.update(child);
        screen.render(Color::BLACK);
        assert_eq!(screen.display().get_pixel(2, 2), Some(RED));
        assert_eq!(screen.display().get_pixel(12, 12), Some(BLUE));
    }

    #[test]
    fn inactive_scenes_and_hidden_elements_are_skipped() {
        let (mut screen, scene) = screen();
        let hidden = screen.add_scene(false, 9);
        screen.insert(Parent::Scene(hidden), ElementNode::frame(at(0.0, 0.0), block(10, RED)));
        let ghost = screen.insert(Parent::Scene(scene), ElementNode::frame(at(20.0, 0.0), block(10, GREEN)));
        screen.update_subtree(Parent::Scene(hidden));
        screen.update_subtree(Parent::Scene(scene));
        screen.get_mut(ghost).expect("exists").visible = false;

        screen.render(BLUE);
        assert_eq!(screen.display().get_pixel(5, 5), Some(BLUE));
        assert_eq!(screen.display().get_pixel(25, 5), Some(BLUE));

        screen.scene_mut(hidden).expect("exists").active = true;
        screen.render(BLUE);
        assert_eq!(screen.display().get_pixel(5, 5), Some(RED));
    }

    #[test]
    #[should_panic(expected = "before update()")]
    fn drawing_before_update_panics() {
        let (mut screen, scene) = screen();
        screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(10, RED)));
        screen.render(Color::BLACK);
    }

    #[test]
    #[should_panic(expected = "no parent")]
    fn drawing_unparented_element_panics() {
        let (mut screen, _) = screen();
        let id = screen.create(ElementNode::frame(at(0.0, 0.0), block(10, RED)));
        screen.draw(id);
    }

    #[test]
    fn remove_frees_the_whole_subtree() {
        let (mut screen, scene) = screen();
        let a = screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(10, RED)));
        let b = screen.insert(Parent::Element(a), ElementNode::frame(at(0.0, 0.0), block(5, RED)));
        let c = screen.insert(Parent::Element(b), ElementNode::frame(at(0.0, 0.0), block(2, RED)));

        screen.remove(a);
        assert!(screen.get(a).is_none());
        assert!(screen.get(b).is_none());
        assert!(screen.get(c).is_none());
        assert!(screen.children(Parent::Scene(scene)).is_empty());
    }

    #[test]
    fn remove_scene_cascades() {
        let (mut screen, scene) = screen();
        let a = screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(10, RED)));
        screen.remove_scene(scene);
        assert!(screen.scene(scene).is_none());
        assert!(screen.get(a).is_none());
        screen.render(Color::BLACK);
    }

    #[test]
    fn set_parent_moves_between_parents() {
        let (mut screen, scene) = screen();
        let a = screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(10, RED)));
        let b = screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(10, RED)));
        let c = screen.insert(Parent::Element(a), ElementNode::frame(at(0.0, 0.0), block(2, RED)));

        screen.set_parent(c, Parent::Element(b));
        assert!(screen.children(Parent::Element(a)).is_empty());
        assert_eq!(screen.children(Parent::Element(b)), &[c]);
        assert_eq!(screen.get(c).and_then(|n| n.parent()), Some(Parent::Element(b)));

        screen.unparent(c);
        assert!(screen.children(Parent::Element(b)).is_empty());
        assert_eq!(screen.get(c).and_then(|n| n.parent()), None);
    }

    #[test]
    #[should_panic(expected = "own subtree")]
    fn set_parent_refuses_cycles() {
        let (mut screen, scene) = screen();
        let a = screen.insert(Parent::Scene(scene), ElementNode::frame(at(0.0, 0.0), block(10, RED)));
        let b = screen.insert(Parent::Element(a), ElementNode::frame(at(0.0, 0.0), block(5, RED)));
        screen.set_parent(a, Parent::Element(b));
    }

    #[test]
    fn lookup_by_name_and_centering() {
        let (mut screen, scene) = screen();
        let a = screen.insert(
            Parent::Scene(scene),
            ElementNode::frame(at(0.0, 0.0), block(10, RED)).with_name("ok"),
        );
        assert_eq!(screen.child_of_name(Parent::Scene(scene), "ok"), Some(a));
        assert_eq!(screen.child_of_name(Parent::Scene(scene), "cancel"), None);

        screen.center_position(a, RelativePosition::new(0.5, 0.0, 0.5, 0.0));
        screen.update(a);
        assert_eq!(screen.get(a).and_then(|n| n.rect()), Some(Rect::from_top_left(95, 95, Size::new(10, 10))));
    }

    #[test]
    fn scrolling_frame_scrolls_children_into_view() {
        let (mut screen, scene) = screen();
        let frame = ScrollingFrame::new(Size::new(100, 300), at(100.0, 100.0), screen.theme());
        let frame = screen.insert(Parent::Scene(scene), ElementNode::scrolling_frame(at(10.0, 10.0), frame));
        screen.update(frame);
        let mut row = Surface::new(Size::new(100, 20));
        row.fill(Color::WHITE);
        screen.insert(Parent::Element(frame), ElementNode::frame(at(0.0, 150.0), row));
        screen.update_subtree(Parent::Scene(scene));

        assert_eq!(
            screen.get(frame).and_then(|n| n.rect()),
            Some(Rect::from_top_left(10, 10, Size::new(100, 100)))
        );

        screen.render(Color::BLACK);
        assert_eq!(screen.display().get_pixel(15, 60), Some(Color::BLACK));

        screen.dispatch(Parent::Scene(scene), &UiEvent::Motion { x: 50, y: 50 }, Tick(0));
        let wheel = UiEvent::ButtonDown { button: MouseButton::WheelDown, x: 50, y: 50 };
        for t in 0..10 {
            screen.handle_event(frame, &wheel, Tick(t));
        }
        let offset = match &screen.get(frame).expect("exists").widget {
            Widget::ScrollingFrame(f) => f.scroll_offset(),
            _ => 0,
        };
        assert_eq!(offset, -100);

        screen.render(Color::BLACK);
        assert_eq!(screen.display().get_pixel(15, 60), Some(Color::WHITE));
        assert_eq!(screen.display().get_pixel(15, 80), Some(Color::BLACK));
    }

    #[test]
    fn wheel_outside_the_frame_is_ignored() {
        let (mut screen, scene) = screen();
        let frame = ScrollingFrame::new(Size::new(100, 300), at(100.0, 100.0), screen.theme());
        let frame = screen.insert(Parent::Scene(scene), ElementNode::scrolling_frame(at(10.0, 10.0), frame));
        screen.update(frame);

        screen.handle_event(frame, &UiEvent::Motion { x: 150, y: 150 }, Tick(0));
        let wheel = UiEvent::ButtonDown { button: MouseButton::WheelDown, x: 150, y: 150 };
        screen.handle_event(frame, &wheel, Tick(1));
        let Widget::ScrollingFrame(f) = &screen.get(frame).expect("exists").widget else {
            panic!("not a scrolling frame");
        };
        assert_eq!(f.scroll_offset(), 0);
    }

    #[test]
    fn set_text_relayouts_immediately() {
        let (mut screen, scene) = screen();
        let text = Text::new("", handle(BlockFont::new(10, 12)), TextStyle::new(Color::WHITE)).with_anchor(Anchor::TopLeft);
        let id = screen.insert(Parent::Scene(scene), ElementNode::text(at(0.0, 0.0), Size::new(40, 12), BLUE, text));
        assert_eq!(screen.get(id).and_then(|n| n.surface.as_ref()).and_then(|s| s.get_pixel(0, 0)), Some(BLUE));

        screen.set_text(id, "ab");
        let node = screen.get(id).expect("exists");
        assert_eq!(node.surface.as_ref().and_then(|s| s.get_pixel(0, 0)), Some(Color::WHITE));
        assert_eq!(node.surface.as_ref().and_then(|s| s.get_pixel(25, 0)), Some(BLUE));
        let Widget::Text(t) = &node.widget else {
            panic!("not text");
        };
        assert_eq!(t.text(), "ab");
    }

    #[test]
    fn sprites_collide_by_mask() {
        let (mut screen, scene) = screen();
        let a = screen.insert(
            Parent::Scene(scene),
            ElementNode::sprite(at(50.0, 50.0), block(10, RED), Sprite::new(Anchor::Center, true)),
        );
        let b = screen.insert(
            Parent::Scene(scene),
            ElementNode::sprite(at(55.0, 55.0), block(10, RED), Sprite::new(Anchor::Center, true)),
        );
        screen.update_subtree(Parent::Scene(scene));
        assert_eq!(screen.pixel_collide(a, b), Some((50, 50)));

        screen.offset(b, at(20.0, 20.0));
        screen.update(b);
        assert!(!screen.pixel_detected(a, b));
    }

    #[test]
    fn sprite_bounding_box_uses_theme_color() {
        let (mut screen, scene) = screen();
        let a = screen.insert(
            Parent::Scene(scene),
            ElementNode::sprite(at(50.0, 50.0), block(10, RED), Sprite::new(Anchor::Center, false)),
        );
        screen.update(a);
        screen.render(BLUE);
        assert_eq!(screen.display().get_pixel(45, 45), Some(RED));

        screen.draw_sprite(a, true);
        assert_eq!(screen.display().get_pixel(45, 45), Some(screen.theme().bounding_box_color));
        assert_eq!(screen.display().get_pixel(46, 46), Some(RED));
    }
}
