use trellis::font::{CosmicFont, FontHandle, TextStyle, handle};
use trellis::geometry::{Anchor, RelativePosition, Size};
use trellis::loading;
use trellis::surface::{Color, Surface};
use trellis::ui::{
    ElementId, ElementNode, MouseButton, Parent, Screen, ScrollingFrame, Sprite, Text, Theme,
    Tick, UiEvent, Widget,
};

const DISPLAY: Size = Size {
    width: 640,
    height: 480,
};
const FRAMES: u64 = 24;
const ROWS: u32 = 20;
const ROW_HEIGHT: u32 = 40;

/// Scripted pointer input, keyed by the frame it arrives on.
fn scripted_events(tick: u64) -> Vec<UiEvent> {
    let press = |button, x, y| UiEvent::ButtonDown { button, x, y };
    match tick {
        1 => vec![UiEvent::Motion { x: 100, y: 100 }],
        2 => vec![press(MouseButton::Left, 60, 45)],
        3..=8 => vec![press(MouseButton::WheelDown, 100, 100)],
        9 => vec![press(MouseButton::WheelUp, 100, 100)],
        12 => vec![UiEvent::Motion { x: 600, y: 400 }],
        // Ignored: the pointer has left the frame.
        13 => vec![press(MouseButton::WheelDown, 600, 400)],
        _ => Vec::new(),
    }
}

/// Plus-shaped sprite so rotation changes which pixels collide.
fn cross(color: Color) -> Surface {
    let mut surface = Surface::new(Size::new(48, 48));
    let mut bar = Surface::new(Size::new(48, 12));
    bar.fill(color);
    surface.blit(&bar, 0, 18);
    let mut post = Surface::new(Size::new(12, 48));
    post.fill(color);
    surface.blit(&post, 18, 0);
    surface
}

fn build_list(screen: &mut Screen, scene: Parent, font: &FontHandle) -> ElementId {
    let frame = ScrollingFrame::new(
        Size::new(200, ROWS * ROW_HEIGHT),
        RelativePosition::from_offsets(200.0, 300.0),
        screen.theme(),
    );
    let list = screen.insert(
        scene,
        ElementNode::scrolling_frame(RelativePosition::from_offsets(20.0, 20.0), frame)
            .with_name("list"),
    );

    for i in 0..ROWS {
        let shade = 50 + (i as i32 * 9);
        let text = Text::new(format!("Row {i}"), font.clone(), TextStyle::new(Color::WHITE));
        let mut row = ElementNode::text(
            RelativePosition::from_offsets(0.0, (i * ROW_HEIGHT) as f32),
            Size::new(200, ROW_HEIGHT - 4),
            Color::clamped(shade, shade / 2, 255 - shade),
            text,
        )
        .with_name(format!("row-{i}"));
        row.bind_button_down(|node, _| log::info!("clicked {}", node.name));
        row.bind_mouse_enter(|node, _| log::debug!("pointer entered {}", node.name));
        screen.insert(Parent::Element(list), row);
    }
    list
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let theme = match args.next() {
        Some(path) => loading::load_theme(path),
        None => Theme::default(),
    };
    let output = args.next().unwrap_or_else(|| "trellis.png".to_string());

    let font = handle(CosmicFont::new(16.0));
    let background = theme.background;
    let mut screen = Screen::new(DISPLAY, theme);
    let main_scene = Parent::Scene(screen.add_scene(true, 1));
    let overlay = Parent::Scene(screen.add_scene(true, 2));

    let list = build_list(&mut screen, main_scene, &font);

    let title = Text::new(
        "A retained scene graph drawing scrolling lists, wrapped text and rotating sprites",
        font.clone(),
        TextStyle::new(Color::WHITE),
    );
    let text_fill = screen.theme().text_fill;
    let title = screen.insert(
        overlay,
        ElementNode::text(RelativePosition::ZERO, Size::new(320, 80), text_fill, title),
    );
    screen.center_position(title, RelativePosition::new(0.6, 40.0, 0.0, 60.0));

    let left = screen.insert(
        main_scene,
        ElementNode::sprite(
            RelativePosition::new(0.6, 0.0, 0.6, 0.0),
            cross(Color::rgb(250, 189, 47)),
            Sprite::new(Anchor::Center, true),
        ),
    );
    let right = screen.insert(
        main_scene,
        ElementNode::sprite(
            RelativePosition::new(0.6, 40.0, 0.6, 10.0),
            cross(Color::rgb(131, 165, 152)),
            Sprite::new(Anchor::Center, true),
        ),
    );

    screen.update_subtree(main_scene);
    screen.update_subtree(overlay);

    for t in 0..FRAMES {
        let tick = Tick(t);
        for event in scripted_events(t) {
            screen.dispatch(main_scene, &event, tick);
        }
        if t == FRAMES / 2 {
            screen.set_text(title, "Pointer input is routed per element");
            screen.update(title);
        }

        for (id, step) in [(left, 15.0), (right, -10.0)] {
            if let Some(Widget::Sprite(sprite)) =
                screen.get_mut(id).map(|n| &mut n.widget)
            {
                sprite.rotation += step;
            }
            screen.update(id);
        }
        if let Some((x, y)) = screen.pixel_collide(left, right) {
            log::info!("frame {t}: sprites touch at ({x}, {y})");
        }

        screen.render(background);
        screen.draw_sprite(right, true);
    }

    if let Some(node) = screen.get(list) {
        log::info!("{} has {} rows", node.name, node.children().len());
    }

    match screen.display().save(&output) {
        Ok(()) => log::info!("wrote {output}"),
        Err(e) => log::error!("failed to write {output}: {e}"),
    }
}
