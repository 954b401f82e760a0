use std::sync::Arc;

use glam::Vec2;

use orbit_scene::{
    pixel_ratio_for, AnimationLoop, FrameStatus, HeadlessRenderer, InputState, OrbitControls,
    PointerButton, PointerEvent, RendererOptions, SceneContext, ViewportConfig,
};

fn headless(viewport: &ViewportConfig) -> SceneContext<HeadlessRenderer, OrbitControls> {
    let controls = OrbitControls::new(Arc::new(InputState::new()), viewport);
    let renderer = HeadlessRenderer::new(RendererOptions::for_viewport(viewport));
    SceneContext::new(renderer, viewport, controls).expect("scene context")
}

#[test]
fn renderer_pixel_ratio_follows_the_display() {
    assert_eq!(pixel_ratio_for(3.0), 2.0);
    assert_eq!(pixel_ratio_for(1.0), 1.0);

    let retina = headless(&ViewportConfig::new(640, 480, 3.0));
    assert_eq!(retina.renderer().options().pixel_ratio, 2.0);
    assert!(retina.renderer().options().shadows_enabled);
    assert_eq!(retina.renderer().options().drawing_buffer_size(), (1280, 960));
}

#[test]
fn loop_stops_when_asked() {
    let mut context = headless(&ViewportConfig::default());
    let mut animation = AnimationLoop::new();
    let handle = animation.handle();

    for _ in 0..3 {
        assert_eq!(animation.tick(|| context.draw()).unwrap(), FrameStatus::Continue);
    }
    handle.stop();
    assert_eq!(animation.tick(|| context.draw()).unwrap(), FrameStatus::Stopped);
    assert_eq!(context.renderer().frames(), 3);
}

#[test]
fn dragging_one_scene_leaves_another_alone() {
    let viewport = ViewportConfig::new(800, 600, 1.0);
    let mut dragged = headless(&viewport);
    let mut idle = headless(&viewport);
    dragged.draw().unwrap();
    idle.draw().unwrap();
    let start = idle.camera().position;

    let input = Arc::clone(dragged.controls().input());
    input.push(PointerEvent::Down {
        button: PointerButton::Primary,
        position: Vec2::new(400.0, 300.0),
    });
    input.push(PointerEvent::Move {
        position: Vec2::new(550.0, 300.0),
    });
    input.push(PointerEvent::Up {
        button: PointerButton::Primary,
    });
    dragged.draw().unwrap();
    idle.draw().unwrap();

    assert!(dragged.camera().position.distance(start) > 1.0);
    assert!(idle.camera().position.abs_diff_eq(start, 1e-5));
}
