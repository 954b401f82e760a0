//! The scene every front end shows: a firebrick box standing on a navy ground
//! plane, lit by an ambient and a shadow-casting directional light.

use std::f32::consts::FRAC_PI_2;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use log::{debug, info};

use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::config::ViewportConfig;
use crate::controls::CameraController;
use crate::geometry::Geometry;
use crate::light::{AmbientLight, DirectionalLight};
use crate::material::{LambertMaterial, Side};
use crate::mesh::Mesh;
use crate::render::SceneRenderer;
use crate::scene::{NodeId, Scene};

pub const CAMERA_FOV: f32 = 60.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(-3.0, 3.0, 7.0);
pub const SUN_POSITION: Vec3 = Vec3::new(-3.0, 5.0, 1.0);

/// Everything one running scene owns.
///
/// Built once by [`SceneContext::new`]; afterwards the host calls
/// [`draw`](Self::draw) once per displayed frame. Dropping the context tears
/// the scene down.
pub struct SceneContext<R, C> {
    renderer: R,
    controls: C,
    scene: Scene,
    camera: NodeId,
    sun: NodeId,
    box_mesh: NodeId,
    ground: NodeId,
}

impl<R: SceneRenderer, C: CameraController> SceneContext<R, C> {
    pub fn new(renderer: R, viewport: &ViewportConfig, controls: C) -> Result<Self> {
        viewport.validate().context("invalid viewport")?;

        let white = Color::from_css("white")?;
        let mut scene = Scene::new(white);

        let mut camera =
            PerspectiveCamera::new(CAMERA_FOV, viewport.aspect(), CAMERA_NEAR, CAMERA_FAR);
        camera.position = CAMERA_POSITION;
        let camera_id = scene.add(camera);

        scene.add(AmbientLight::new(white, 1.0));

        let mut sun = DirectionalLight::new(white, 3.0);
        sun.position = SUN_POSITION;
        sun.cast_shadow = true;
        let sun = scene.add(sun);

        let mut cube = Mesh::new(
            "box",
            Geometry::cuboid(2.0, 2.0, 2.0),
            LambertMaterial::new(Color::from_css("firebrick")?).with_side(Side::Double),
        );
        cube.position = Vec3::new(0.0, 1.0, 0.0);
        cube.cast_shadow = true;
        let cube_position = cube.position;
        let box_mesh = scene.add(cube);

        let mut ground = Mesh::new(
            "ground",
            Geometry::plane(10.0, 10.0),
            LambertMaterial::new(Color::from_css("#092e66")?).with_side(Side::Double),
        );
        ground.rotation.x = -FRAC_PI_2;
        ground.receive_shadow = true;
        let ground = scene.add(ground);

        scene
            .camera_mut(camera_id)
            .ok_or_else(|| anyhow!("camera node missing from scene"))?
            .look_at(cube_position);

        info!(
            "scene ready: {} children ({} lights), viewport {}x{} @ {}x",
            scene.len(),
            scene.light_count(),
            viewport.width,
            viewport.height,
            viewport.pixel_ratio()
        );

        Ok(Self {
            renderer,
            controls,
            scene,
            camera: camera_id,
            sun,
            box_mesh,
            ground,
        })
    }

    /// One redraw: render from the camera, then let the controller move it.
    pub fn draw(&mut self) -> Result<()> {
        let camera = *self.camera();
        self.renderer
            .render(&self.scene, &camera)
            .context("failed to render frame")?;
        let camera = self
            .scene
            .camera_mut(self.camera)
            .ok_or_else(|| anyhow!("camera node missing from scene"))?;
        if self.controls.update(camera) {
            debug!("camera moved to {:?}", camera.position);
        }
        Ok(())
    }
}

impl<R, C> SceneContext<R, C> {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut C {
        &mut self.controls
    }

    pub fn box_id(&self) -> NodeId {
        self.box_mesh
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        self.scene
            .camera(self.camera)
            .unwrap_or_else(|| unreachable!("scene nodes are never removed"))
    }

    pub fn sun(&self) -> &DirectionalLight {
        self.scene
            .directional_light(self.sun)
            .unwrap_or_else(|| unreachable!("scene nodes are never removed"))
    }

    pub fn box_mesh(&self) -> &Mesh {
        self.scene
            .mesh(self.box_mesh)
            .unwrap_or_else(|| unreachable!("scene nodes are never removed"))
    }

    pub fn ground(&self) -> &Mesh {
        self.scene
            .mesh(self.ground)
            .unwrap_or_else(|| unreachable!("scene nodes are never removed"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::RendererOptions;
    use crate::controls::OrbitControls;
    use crate::input::{InputState, PointerEvent};
    use crate::render::HeadlessRenderer;

    #[derive(Default)]
    struct CountingRenderer {
        renders: usize,
    }

    impl SceneRenderer for CountingRenderer {
        fn render(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) -> Result<()> {
            self.renders += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingControls {
        updates: usize,
    }

    impl CameraController for CountingControls {
        fn update(&mut self, _camera: &mut PerspectiveCamera) -> bool {
            self.updates += 1;
            false
        }
    }

    fn viewport() -> ViewportConfig {
        ViewportConfig::new(1600, 900, 1.0)
    }

    fn counting() -> SceneContext<CountingRenderer, CountingControls> {
        SceneContext::new(CountingRenderer::default(), &viewport(), CountingControls::default())
            .unwrap()
    }

    #[test]
    fn scene_holds_camera_lights_and_meshes() {
        let context = counting();
        let scene = context.scene();
        assert_eq!(scene.len(), 5);
        assert_eq!(scene.light_count(), 2);
        assert_eq!(scene.meshes().count(), 2);
        assert_eq!(scene.background, Color::from_css("white").unwrap());
    }

    #[test]
    fn camera_uses_fixed_projection() {
        let context = counting();
        let camera = context.camera();
        assert_eq!(camera.fov, 60.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert!((camera.aspect - 1600.0 / 900.0).abs() < 1e-6);
        assert_eq!(camera.position, CAMERA_POSITION);
    }

    #[test]
    fn camera_faces_the_box() {
        let context = counting();
        let camera = context.camera();
        let expected = (context.box_mesh().position - camera.position).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn meshes_are_placed_and_flagged() {
        let context = counting();
        let cube = context.box_mesh();
        assert_eq!(cube.position.y, 1.0);
        assert!(cube.cast_shadow);
        assert_eq!(cube.material.side, Side::Double);
        assert_eq!(cube.material.color, Color::from_css("firebrick").unwrap());

        let ground = context.ground();
        assert!((ground.rotation.x + FRAC_PI_2).abs() < 1e-6);
        assert!(ground.receive_shadow);
        assert_eq!(ground.geometry, Geometry::plane(10.0, 10.0));
    }

    #[test]
    fn sun_casts_shadows() {
        let context = counting();
        let sun = context.sun();
        assert!(sun.cast_shadow);
        assert_eq!(sun.intensity, 3.0);
        assert_eq!(sun.position, SUN_POSITION);
    }

    #[test]
    fn one_draw_renders_once_and_updates_once() {
        let mut context = counting();
        context.draw().unwrap();
        assert_eq!(context.renderer().renders, 1);
        assert_eq!(context.controls().updates, 1);
    }

    #[test]
    fn contexts_are_independent() {
        let mut first = counting();
        let second = counting();
        let box_id = first.box_id();
        first.scene_mut().mesh_mut(box_id).unwrap().position.y = 4.0;
        assert_eq!(first.box_mesh().position.y, 4.0);
        assert_eq!(second.box_mesh().position.y, 1.0);
        assert_eq!(first.scene().len(), 5);
        assert_eq!(second.scene().len(), 5);
    }

    #[test]
    fn empty_viewport_is_rejected() {
        let viewport = ViewportConfig::new(0, 600, 1.0);
        let result = SceneContext::new(
            CountingRenderer::default(),
            &viewport,
            CountingControls::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn orbit_controls_drive_the_camera() {
        let viewport = viewport();
        let input = Arc::new(InputState::new());
        let controls = OrbitControls::new(Arc::clone(&input), &viewport);
        let renderer = HeadlessRenderer::new(RendererOptions::for_viewport(&viewport));
        let mut context = SceneContext::new(renderer, &viewport, controls).unwrap();

        context.draw().unwrap();
        let distance = context.camera().position.length();
        input.push(PointerEvent::Wheel { delta_y: -100.0 });
        context.draw().unwrap();

        assert_eq!(context.renderer().frames(), 2);
        assert!(context.camera().position.length() < distance);
        assert_eq!(context.renderer().last_frame().draw_calls, 2);
        assert_eq!(context.renderer().last_frame().shadow_casters, 1);
        assert_eq!(context.renderer().last_frame().shadow_receivers, 1);
    }
}
