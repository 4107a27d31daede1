/// Demo scenes and their per-frame behaviour
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use wire3d_core::{
    cross_product, dot_product, Camera, Color, Material, Mesh, Object3d, ObjectId, Quaternion,
    Scene, Vector3,
};

use crate::config::{AppConfig, DemoKind};
use crate::noise::Perlin2d;

const SHOT_SPEED: f32 = 6.0;
const SHOT_COOLDOWN: f32 = 0.2;

const MISSILE_SPEED: f32 = 2.0;
/// Radians per second
const MISSILE_TURN_RATE: f32 = 0.75;
const MISSILE_FIRST_SPAWN: f32 = 2.0;
const MISSILE_MIN_SPAWN: f32 = 0.5;
const MISSILE_SPAWN_SPEEDUP: f32 = 0.025;
const HIT_DISTANCE: f32 = 0.5;
/// Missiles crossing this z have reached the player
const PLAYER_PLANE: f32 = 0.1;
const PLAYER_RADIUS: f32 = 0.25;

const GRAVITY: f32 = -9.8;
const CUBE_SPAWN_TIME: f32 = 0.025;
const CUBE_FLOOR: f32 = -8.0;

/// Continuous rotation of one object around a world axis
struct Spin {
    target: ObjectId,
    axis: Vector3,
    degrees_per_second: f32,
}

/// A projectile flying along the camera ray it was fired on
struct Shot {
    id: ObjectId,
    direction: Vector3,
}

/// Missile spawning for the shooter demo; the interval shrinks with every spawn
struct MissileWave {
    mesh: Rc<Mesh>,
    material: Rc<Material>,
    timer: f32,
    spawn_time: f32,
}

/// A cube in free fall, tumbling around its own axis
struct FallingCube {
    id: ObjectId,
    velocity: f32,
    axis: Vector3,
    spin: f32,
}

/// Full-screen color fading out over `total` seconds
#[derive(Debug, Clone, Copy)]
struct Flash {
    color: Color,
    remaining: f32,
    total: f32,
}

pub struct Demo {
    kind: DemoKind,
    pub scene: Scene,
    line_width: Option<u32>,
    spin: Option<Spin>,
    shots: Vec<Shot>,
    shot_cooldown: f32,
    shot_assets: Option<(Rc<Mesh>, Rc<Material>)>,
    missiles: Vec<ObjectId>,
    wave: Option<MissileWave>,
    cubes: Vec<FallingCube>,
    cube_mesh: Option<Rc<Mesh>>,
    cube_timer: f32,
    flash: Option<Flash>,
    rng: StdRng,
}

impl Demo {
    /// Builds the configured demo for a `res_x x res_y` pixel surface
    pub fn new(config: &AppConfig, res_x: u32, res_y: u32) -> Self {
        let mut camera = Camera::new(config.ortho, res_x, res_y);
        camera.fov = config.fov.to_radians();
        camera.near_plane = config.near;
        camera.far_plane = config.far;

        let mut demo = Self {
            kind: config.demo,
            scene: Scene::with_camera(format!("{:?}", config.demo), camera),
            line_width: config.line_width,
            spin: None,
            shots: Vec::new(),
            shot_cooldown: 0.0,
            shot_assets: None,
            missiles: Vec::new(),
            wave: None,
            cubes: Vec::new(),
            cube_mesh: None,
            cube_timer: 0.0,
            flash: None,
            rng: StdRng::seed_from_u64(config.seed),
        };

        match config.demo {
            DemoKind::Hierarchy => demo.build_hierarchy(),
            DemoKind::Sphere => demo.build_sphere(),
            DemoKind::Terrain => demo.build_terrain(config.seed),
            DemoKind::Shooter => demo.build_shooter(config.seed),
            DemoKind::Cubefall => demo.build_cubefall(),
        }
        debug!(demo = ?demo.kind, objects = demo.scene.object_count(), "demo ready");
        demo
    }

    pub fn kind(&self) -> DemoKind {
        self.kind
    }

    /// Background color to clear the surface with before each frame
    pub fn clear_color(&self) -> Color {
        match self.kind {
            DemoKind::Hierarchy => Color::rgb(0.0, 0.0, 20.0 / 255.0),
            _ => Color::BLACK,
        }
    }

    pub fn shot_count(&self) -> usize {
        self.shots.len()
    }

    pub fn missile_count(&self) -> usize {
        self.missiles.len()
    }

    pub fn cube_count(&self) -> usize {
        self.cubes.len()
    }

    /// Color to add over the rendered frame, alpha fading with the time left
    pub fn flash_color(&self) -> Option<Color> {
        self.flash.map(|flash| Color {
            a: flash.color.a * flash.remaining / flash.total,
            ..flash.color
        })
    }

    fn start_flash(&mut self, color: Color, duration: f32) {
        self.flash = Some(Flash {
            color,
            remaining: duration,
            total: duration,
        });
    }

    fn material(&self, color: Color, name: &str) -> Rc<Material> {
        let material = Material::new(color, name);
        Rc::new(match self.line_width {
            Some(width) => material.with_line_width(width),
            None => material,
        })
    }

    fn build_hierarchy(&mut self) {
        self.scene.camera.node.position = Vector3::new(0.0, 0.0, -2.0);

        let mut parent = Object3d::new("TestObject")
            .with_mesh(
                Rc::new(Mesh::cube(Vector3::ONE)),
                self.material(Color::RED, "TestMaterial1"),
            )
            .with_position(Vector3::new(0.0, 0.0, 2.0));
        parent.add_child(
            Object3d::new("ChildObject")
                .with_mesh(
                    Rc::new(Mesh::cube(Vector3::new(0.5, 0.5, 0.5))),
                    self.material(Color::GREEN, "TestMaterial2"),
                )
                .with_position(Vector3::new(0.0, 0.75, 0.0)),
        );

        let target = self.scene.add_object(parent);
        self.spin = Some(Spin {
            target,
            axis: Vector3::new(1.0, 0.7, 0.2).normalized(),
            degrees_per_second: 15.0,
        });
    }

    fn build_sphere(&mut self) {
        self.scene.camera.node.position = Vector3::new(0.0, 0.0, -2.0);

        let sphere = Object3d::new("SphereObject").with_mesh(
            Rc::new(Mesh::sphere(Vector3::ONE, 12, 12)),
            self.material(Color::RED, "SphereMaterial1"),
        );
        let target = self.scene.add_object(sphere);
        self.spin = Some(Spin {
            target,
            axis: Vector3::new(1.0, 0.7, 0.2).normalized(),
            degrees_per_second: 15.0,
        });
    }

    fn build_terrain(&mut self, seed: u64) {
        self.scene.camera.node.position = Vector3::new(0.0, 0.0, -4.0);
        self.scene.camera.node.rotation = Quaternion::from_axis_angle(&Vector3::X, 15f32.to_radians());

        let perlin = Perlin2d::new(seed);
        let layers = classify_terrain(&Mesh::grid(4.0, 4.0, 25, |x, z| perlin.octaves(x, z, 1.25)));

        let mut container = Object3d::new("TerrainObject").with_position(Vector3::new(0.0, -1.0, 0.0));
        let palette = [
            (Color::rgb(0.1, 0.6, 0.1), "GrassMaterial"),
            (Color::rgb(0.8, 0.8, 0.8), "SnowMaterial"),
            (Color::rgb(0.4, 0.4, 0.4), "CliffMaterial"),
            (Color::rgb(0.0, 0.5, 0.7), "WaterMaterial"),
        ];
        for (mesh, (color, name)) in layers.into_iter().zip(palette) {
            let layer = Object3d::new(mesh.name.clone()).with_mesh(Rc::new(mesh), self.material(color, name));
            container.add_child(layer);
        }

        let target = self.scene.add_object(container);
        self.spin = Some(Spin {
            target,
            axis: Vector3::Y,
            degrees_per_second: 15.0,
        });
    }

    fn build_shooter(&mut self, seed: u64) {
        let perlin = Perlin2d::new(seed);
        // Flat near the player, hills further out
        let mut mesh = Mesh::grid(16.0, 16.0, 20, |x, z| {
            let z = z + 8.0;
            let n = perlin.octaves(x, z, 0.4) * 5.0;
            if n < 0.0 || z < 8.0 {
                0.0
            } else {
                n
            }
        });
        mesh.offset(Vector3::new(0.0, 0.0, 8.0));
        mesh.name = "Terrain".into();

        let terrain = Object3d::new("TerrainObject")
            .with_mesh(Rc::new(mesh), self.material(Color::rgb(0.1, 0.6, 0.1), "TerrainMaterial"))
            .with_position(Vector3::new(0.0, -1.0, 1.0));
        self.scene.add_object(terrain);

        self.shot_assets = Some((
            Rc::new(Mesh::sphere(Vector3::new(0.1, 0.1, 0.1), 4, 4)),
            self.material(Color::rgb(1.0, 1.0, 0.0), "ShotMaterial"),
        ));
        self.wave = Some(MissileWave {
            mesh: Rc::new(missile_mesh()),
            material: self.material(Color::RED, "MissileMaterial"),
            timer: MISSILE_FIRST_SPAWN,
            spawn_time: MISSILE_FIRST_SPAWN,
        });
    }

    fn build_cubefall(&mut self) {
        self.scene.camera.node.position = Vector3::new(0.0, 0.0, -2.0);
        let mut mesh = Mesh::cube(Vector3::ONE);
        mesh.name = "FallingCube".into();
        self.cube_mesh = Some(Rc::new(mesh));
    }

    /// Advances the demo by `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) {
        if let Some(spin) = &self.spin {
            let q = Quaternion::from_axis_angle(&spin.axis, spin.degrees_per_second.to_radians() * delta_time);
            if let Some(object) = self.scene.object_mut(spin.target) {
                object.rotation = q * object.rotation;
            }
        }

        if let Some(flash) = &mut self.flash {
            flash.remaining -= delta_time;
            if flash.remaining <= 0.0 {
                self.flash = None;
            }
        }

        self.update_shots(delta_time);
        self.update_missiles(delta_time);
        self.update_cubes(delta_time);
    }

    fn update_shots(&mut self, delta_time: f32) {
        self.shot_cooldown -= delta_time;

        let camera_position = self.scene.camera.node.position;
        let far_plane = self.scene.camera.far_plane;

        // Move everything first, then drop the shots that left the view volume
        let mut expired = Vec::new();
        for shot in &self.shots {
            if let Some(object) = self.scene.object_mut(shot.id) {
                object.position += shot.direction * SHOT_SPEED * delta_time;
                if object.position.distance(&camera_position) > far_plane {
                    expired.push(shot.id);
                }
            }
        }

        for id in &expired {
            self.scene.remove_object(*id);
        }
        self.shots.retain(|shot| !expired.contains(&shot.id));
    }

    fn update_missiles(&mut self, delta_time: f32) {
        let Some(wave) = &mut self.wave else {
            return;
        };
        wave.timer -= delta_time;
        let spawn = wave.timer < 0.0;
        if spawn {
            wave.spawn_time = (wave.spawn_time - MISSILE_SPAWN_SPEEDUP).max(MISSILE_MIN_SPAWN);
            wave.timer = wave.spawn_time;
        }

        for id in &self.missiles {
            if let Some(missile) = self.scene.object_mut(*id) {
                steer_missile(missile, delta_time);
            }
        }

        // Shots and missiles that touch destroy each other
        let mut destroyed_shots = Vec::new();
        let mut destroyed_missiles = Vec::new();
        for shot in &self.shots {
            let Some(shot_position) = self.scene.object(shot.id).map(|o| o.position) else {
                continue;
            };
            for id in &self.missiles {
                if destroyed_missiles.contains(id) {
                    continue;
                }
                let hit = self
                    .scene
                    .object(*id)
                    .is_some_and(|m| m.position.distance(&shot_position) < HIT_DISTANCE);
                if hit {
                    destroyed_shots.push(shot.id);
                    destroyed_missiles.push(*id);
                    break;
                }
            }
        }
        if !destroyed_missiles.is_empty() {
            debug!(count = destroyed_missiles.len(), "missiles shot down");
            self.start_flash(Color::rgb(0.0, 1.0, 1.0), 0.5);
        }

        // Missiles reaching the player plane are gone, hit or not
        let mut player_hit = false;
        for id in &self.missiles {
            let Some(missile) = self.scene.object(*id) else {
                continue;
            };
            if !destroyed_missiles.contains(id) && missile.position.z < PLAYER_PLANE {
                player_hit |= missile.position.magnitude() < PLAYER_RADIUS;
                destroyed_missiles.push(*id);
            }
        }
        if player_hit {
            info!("player hit");
            self.start_flash(Color::rgb(1.0, 0.0, 1.0), 1.0);
        }

        for id in &destroyed_shots {
            self.scene.remove_object(*id);
        }
        self.shots.retain(|shot| !destroyed_shots.contains(&shot.id));
        for id in &destroyed_missiles {
            self.scene.remove_object(*id);
        }
        self.missiles.retain(|id| !destroyed_missiles.contains(id));

        if spawn {
            self.spawn_random_missile();
        }
    }

    /// Launches a missile from one of three spots behind the terrain, aimed across the view
    fn spawn_random_missile(&mut self) {
        let height = self.rng.gen_range(0.0..3.0);
        let (position, rotation) = match self.rng.gen_range(0.0..100.0) {
            r if r > 66.0 => (
                Vector3::new(7.0, height, 12.0),
                Quaternion::from_axis_angle(&Vector3::Y, -90f32.to_radians()),
            ),
            r if r > 33.0 => (
                Vector3::new(self.rng.gen_range(-4.0..4.0), -2.0, 12.0),
                Quaternion::from_axis_angle(&Vector3::X, -90f32.to_radians()),
            ),
            _ => (
                Vector3::new(-7.0, height, 12.0),
                Quaternion::from_axis_angle(&Vector3::Y, 90f32.to_radians()),
            ),
        };
        self.spawn_missile(position, rotation);
    }

    fn spawn_missile(&mut self, position: Vector3, rotation: Quaternion) -> Option<ObjectId> {
        let wave = self.wave.as_ref()?;
        let mut missile = Object3d::new("Missile")
            .with_mesh(Rc::clone(&wave.mesh), Rc::clone(&wave.material))
            .with_position(position);
        missile.rotation = rotation;

        let id = self.scene.add_object(missile);
        debug!(%id, %position, "missile launched");
        self.missiles.push(id);
        Some(id)
    }

    fn update_cubes(&mut self, delta_time: f32) {
        let Some(mesh) = self.cube_mesh.clone() else {
            return;
        };

        let mut fallen = Vec::new();
        for cube in &mut self.cubes {
            let Some(object) = self.scene.object_mut(cube.id) else {
                continue;
            };
            cube.velocity += GRAVITY * delta_time;
            object.position.y += cube.velocity * delta_time;
            object.rotation = Quaternion::from_axis_angle(&cube.axis, cube.spin * delta_time) * object.rotation;
            if object.position.y < CUBE_FLOOR {
                fallen.push(cube.id);
            }
        }

        for id in &fallen {
            self.scene.remove_object(*id);
        }
        self.cubes.retain(|cube| !fallen.contains(&cube.id));

        self.cube_timer -= delta_time;
        if self.cube_timer < 0.0 {
            self.cube_timer = CUBE_SPAWN_TIME;
            self.spawn_cube(mesh);
        }
    }

    fn spawn_cube(&mut self, mesh: Rc<Mesh>) {
        let position = Vector3::new(
            self.rng.gen_range(-6.0..6.0),
            self.rng.gen_range(6.0..10.0),
            self.rng.gen_range(3.0..10.0),
        );
        let color = Color::rgb(
            self.rng.gen_range(0.1..1.0),
            self.rng.gen_range(0.1..1.0),
            self.rng.gen_range(0.1..1.0),
        );
        let axis = Vector3::new(
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
        );
        let axis = if axis.magnitude() > 1e-3 {
            axis.normalized()
        } else {
            Vector3::Y
        };

        let cube = Object3d::new("FallingCube")
            .with_mesh(mesh, self.material(color, "FallingCubeMaterial"))
            .with_position(position);
        let id = self.scene.add_object(cube);
        self.cubes.push(FallingCube {
            id,
            velocity: 0.0,
            axis,
            spin: self.rng.gen_range(-0.5..0.5),
        });
    }

    /// Fires a shot through the screen point `ndc`; shooter demo only
    pub fn click(&mut self, ndc: (f32, f32)) {
        let Some((mesh, material)) = &self.shot_assets else {
            return;
        };
        if self.shot_cooldown > 0.0 {
            return;
        }

        let ray = match self.scene.camera.ray_from_ndc(ndc) {
            Ok(ray) => ray,
            Err(err) => {
                warn!(%err, "cannot cast ray from camera");
                return;
            }
        };

        let shot = Object3d::new("Shot")
            .with_mesh(Rc::clone(mesh), Rc::clone(material))
            .with_position(ray.origin);
        let id = self.scene.add_object(shot);
        self.shots.push(Shot {
            id,
            direction: ray.direction,
        });
        self.shot_cooldown = SHOT_COOLDOWN;
    }

    /// Turns the camera in the shooter demo, the spinning object otherwise
    pub fn rotate(&mut self, pitch: f32, yaw: f32) {
        let q_pitch = Quaternion::from_axis_angle(&Vector3::X, pitch);
        let q_yaw = Quaternion::from_axis_angle(&Vector3::Y, yaw);

        match &self.spin {
            Some(spin) if self.kind != DemoKind::Shooter => {
                if let Some(object) = self.scene.object_mut(spin.target) {
                    object.rotation = q_yaw * q_pitch * object.rotation;
                }
            }
            _ => {
                let node = &mut self.scene.camera.node;
                node.rotation = q_yaw * node.rotation * q_pitch;
            }
        }
    }

    pub fn toggle_projection(&mut self) {
        let camera = &mut self.scene.camera;
        camera.orthographic = !camera.orthographic;
        debug!(orthographic = camera.orthographic, "projection toggled");
    }

    /// Keeps the camera resolution in step with the surface
    pub fn resize(&mut self, res_x: u32, res_y: u32) {
        self.scene.camera.res_x = res_x;
        self.scene.camera.res_y = res_y;
    }
}

/// Flies a missile forward, then turns it toward the origin by at most
/// the turn rate allows for this step
fn steer_missile(missile: &mut Object3d, delta_time: f32) {
    missile.position += missile.forward() * MISSILE_SPEED * delta_time;

    let current = missile.forward().normalized();
    let desired = (-missile.position).normalized();
    let angle = dot_product(&current, &desired)
        .clamp(-1.0, 1.0)
        .acos()
        .min(MISSILE_TURN_RATE * delta_time);
    if angle <= 0.01 {
        return;
    }

    let axis = cross_product(&current, &desired);
    if axis.magnitude() > 1e-6 {
        missile.rotation = Quaternion::from_axis_angle(&axis.normalized(), angle) * missile.rotation;
    }
}

/// Thin box with a four sided cone on its +Z end
fn missile_mesh() -> Mesh {
    const RADIUS: f32 = 0.0125;
    const LENGTH: f32 = 0.075;
    const CONE: f32 = 0.05;

    let mut mesh = Mesh::cube(Vector3::new(RADIUS * 2.0, RADIUS * 2.0, LENGTH * 2.0));
    mesh.name = "Missile".into();

    let tip = Vector3::new(0.0, 0.0, LENGTH + CONE);
    let corners = [
        Vector3::new(RADIUS, RADIUS, LENGTH),
        Vector3::new(RADIUS, -RADIUS, LENGTH),
        Vector3::new(-RADIUS, -RADIUS, LENGTH),
        Vector3::new(-RADIUS, RADIUS, LENGTH),
    ];
    for i in 0..corners.len() {
        mesh.add_triangle(corners[i], corners[(i + 1) % corners.len()], tip);
    }
    mesh
}

/// Splits terrain quads into grass, snow, cliff and water meshes, in that order.
///
/// Any vertex at or below the water line sends the quad to the water mesh,
/// with the submerged vertices flattened onto the water line.
fn classify_terrain(terrain: &Mesh) -> [Mesh; 4] {
    const WATER_DEPTH: f32 = -0.1;
    const SNOW_HEIGHT: f32 = 0.15;

    let mut grass = Mesh::new("Terrain_Grass");
    let mut snow = Mesh::new("Terrain_Snow");
    let mut cliff = Mesh::new("Terrain_Cliff");
    let mut water = Mesh::new("Terrain_Water");

    for polygon in &terrain.polygons {
        let mut polygon = polygon.clone();
        let mut submerged = false;
        for p in polygon.iter_mut() {
            if p.y <= WATER_DEPTH {
                p.y = WATER_DEPTH;
                submerged = true;
            }
        }

        if submerged {
            water.add_polygon(polygon);
            continue;
        }

        let average = polygon.iter().map(|p| p.y).sum::<f32>() / polygon.len() as f32;
        if average > SNOW_HEIGHT {
            snow.add_polygon(polygon);
            continue;
        }

        let normal = cross_product(
            &(polygon[2] - polygon[0]).normalized(),
            &(polygon[1] - polygon[0]).normalized(),
        );
        if dot_product(&normal, &Vector3::Y) < 0.5 {
            cliff.add_polygon(polygon);
        } else {
            grass.add_polygon(polygon);
        }
    }

    [grass, snow, cliff, water]
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire3d_core::RecordingSurface;

    fn config(demo: DemoKind) -> AppConfig {
        AppConfig {
            demo,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_hierarchy_spins_parent() {
        let mut demo = Demo::new(&config(DemoKind::Hierarchy), 640, 480);
        let before = demo.scene.objects()[0].rotation;
        demo.update(1.0);
        let after = demo.scene.objects()[0].rotation;
        assert_ne!(before, after);
        assert_eq!(demo.scene.objects()[0].children().len(), 1);

        let mut surface = RecordingSurface::new(640, 480);
        demo.scene.render(&mut surface);
        assert_eq!(surface.polygon_count(), 12);
    }

    #[test]
    fn test_terrain_layers_cover_every_cell() {
        let demo = Demo::new(&config(DemoKind::Terrain), 640, 480);
        let container = &demo.scene.objects()[0];
        assert_eq!(container.children().len(), 4);
        let cells: usize = container
            .children()
            .iter()
            .filter_map(|c| c.mesh.as_ref())
            .map(|m| m.polygon_count())
            .sum();
        assert_eq!(cells, 25 * 25);
    }

    #[test]
    fn test_classify_terrain() {
        let flat = Mesh::grid(1.0, 1.0, 1, |_, _| 0.0);
        let sunk = Mesh::grid(1.0, 1.0, 1, |x, _| if x < 0.0 { -1.0 } else { 0.0 });
        let high = Mesh::grid(1.0, 1.0, 1, |_, _| 1.0);
        let steep = Mesh::grid(0.1, 0.1, 1, |x, _| x * 2.0 + 0.01);

        assert_eq!(classify_terrain(&flat)[0].polygon_count(), 1);
        let water = &classify_terrain(&sunk)[3];
        assert_eq!(water.polygon_count(), 1);
        assert!(water.polygons[0].iter().all(|p| p.y >= -0.1));
        assert_eq!(classify_terrain(&high)[1].polygon_count(), 1);
        assert_eq!(classify_terrain(&steep)[2].polygon_count(), 1);
    }

    #[test]
    fn test_shots_fly_and_expire() {
        let mut demo = Demo::new(&config(DemoKind::Shooter), 640, 480);
        let roots = demo.scene.object_count();

        demo.click((0.0, 0.0));
        demo.click((0.0, 0.0));
        assert_eq!(demo.shot_count(), 1, "second click is inside the cooldown");
        assert_eq!(demo.scene.object_count(), roots + 1);

        demo.update(1.0);
        assert_eq!(demo.shot_count(), 1);
        demo.update(20.0);
        assert_eq!(demo.shot_count(), 0);
        assert_eq!(demo.scene.object_count(), roots + demo.missile_count());
    }

    #[test]
    fn test_missile_turns_toward_origin() {
        let mut demo = Demo::new(&config(DemoKind::Shooter), 640, 480);
        // Flying along +X, ninety degrees off its target
        let id = demo
            .spawn_missile(
                Vector3::new(0.0, 0.0, 12.0),
                Quaternion::from_axis_angle(&Vector3::Y, 90f32.to_radians()),
            )
            .expect("shooter has missiles");
        let before = demo.scene.object(id).expect("missile").forward();
        assert!(dot_product(&before, &Vector3::new(0.0, 0.0, -1.0)).abs() < 1e-3);

        demo.update(0.1);
        let missile = demo.scene.object(id).expect("missile");
        let after = missile.forward();
        let desired = (-missile.position).normalized();
        assert!(dot_product(&after, &desired) > 0.0);
        assert!(after.y.abs() < 1e-3);
        // Never more than the turn rate allows
        let turned = dot_product(&before, &after).clamp(-1.0, 1.0).acos();
        assert!(turned <= MISSILE_TURN_RATE * 0.1 + 1e-3);
        assert!(turned > 0.0);
    }

    #[test]
    fn test_missile_spawns_speed_up() {
        let mut demo = Demo::new(&config(DemoKind::Shooter), 640, 480);
        demo.update(1.9);
        assert_eq!(demo.missile_count(), 0);
        demo.update(0.2);
        assert_eq!(demo.missile_count(), 1);
        let wave = demo.wave.as_ref().expect("wave");
        assert!((wave.spawn_time - (MISSILE_FIRST_SPAWN - MISSILE_SPAWN_SPEEDUP)).abs() < 1e-5);

        // The interval bottoms out
        if let Some(wave) = demo.wave.as_mut() {
            wave.spawn_time = MISSILE_MIN_SPAWN + 0.01;
            wave.timer = 0.0;
        }
        demo.update(0.01);
        assert_eq!(demo.missile_count(), 2);
        let wave = demo.wave.as_ref().expect("wave");
        assert_eq!(wave.spawn_time, MISSILE_MIN_SPAWN);
        assert_eq!(wave.timer, MISSILE_MIN_SPAWN);
    }

    #[test]
    fn test_shot_and_missile_destroy_each_other() {
        let mut demo = Demo::new(&config(DemoKind::Shooter), 640, 480);
        let roots = demo.scene.object_count();

        demo.click((0.0, 0.0));
        assert_eq!(demo.shot_count(), 1);
        // Head on with the shot, a little further down the same ray
        let shot_position = demo.scene.objects()[roots].position;
        demo.spawn_missile(
            shot_position + Vector3::new(0.0, 0.0, 0.3),
            Quaternion::from_axis_angle(&Vector3::Y, 180f32.to_radians()),
        );
        assert_eq!(demo.missile_count(), 1);

        demo.update(0.01);
        assert_eq!(demo.shot_count(), 0);
        assert_eq!(demo.missile_count(), 0);
        assert_eq!(demo.scene.object_count(), roots);

        let flash = demo.flash_color().expect("hit flash");
        assert_eq!((flash.r, flash.g, flash.b), (0.0, 1.0, 1.0));
    }

    #[test]
    fn test_missile_reaching_player_flashes_and_fades() {
        let mut demo = Demo::new(&config(DemoKind::Shooter), 640, 480);
        let roots = demo.scene.object_count();
        demo.spawn_missile(
            Vector3::new(0.0, 0.0, 0.15),
            Quaternion::from_axis_angle(&Vector3::Y, 180f32.to_radians()),
        );
        // Crosses the player plane wide of the player: removed, no flash
        demo.spawn_missile(
            Vector3::new(2.0, 0.0, 0.15),
            Quaternion::from_axis_angle(&Vector3::Y, 180f32.to_radians()),
        );

        demo.update(0.1);
        assert_eq!(demo.missile_count(), 0);
        assert_eq!(demo.scene.object_count(), roots);
        let flash = demo.flash_color().expect("player flash");
        assert_eq!((flash.r, flash.g, flash.b, flash.a), (1.0, 0.0, 1.0, 1.0));

        demo.update(0.5);
        let faded = demo.flash_color().expect("still flashing");
        assert!((faded.a - 0.5).abs() < 1e-5);
        demo.update(0.5);
        assert!(demo.flash_color().is_none());
    }

    #[test]
    fn test_cubes_share_one_mesh() {
        let mut demo = Demo::new(&config(DemoKind::Cubefall), 640, 480);
        for _ in 0..5 {
            demo.update(0.03);
        }
        assert_eq!(demo.cube_count(), 5);
        assert_eq!(demo.scene.object_count(), 5);

        let mesh = demo.cube_mesh.as_ref().expect("cube mesh");
        for cube in demo.scene.objects() {
            let cube_mesh = cube.mesh.as_ref().expect("mesh");
            assert!(Rc::ptr_eq(cube_mesh, mesh));
        }
        // Each cube gets its own color
        let first = demo.scene.objects()[0].material.as_ref().expect("material");
        let second = demo.scene.objects()[1].material.as_ref().expect("material");
        assert!(!Rc::ptr_eq(first, second));
    }

    #[test]
    fn test_fallen_cubes_leave_the_scene() {
        let mut demo = Demo::new(&config(DemoKind::Cubefall), 640, 480);
        demo.update(0.01);
        assert_eq!(demo.cube_count(), 1);
        let first = demo.scene.objects()[0].id();
        let start = demo.scene.objects()[0].position;
        assert!((6.0..10.0).contains(&start.y));

        demo.update(0.1);
        let falling = demo.scene.object(first).expect("still falling");
        assert!(falling.position.y < start.y);

        // Long enough to pass the floor from the highest spawn point
        demo.update(3.0);
        assert!(demo.scene.object(first).is_none());
        assert_eq!(demo.cube_count(), demo.scene.object_count());
    }

    #[test]
    fn test_clicks_are_ignored_outside_shooter() {
        let mut demo = Demo::new(&config(DemoKind::Sphere), 640, 480);
        demo.click((0.0, 0.0));
        assert_eq!(demo.shot_count(), 0);
        assert_eq!(demo.scene.object_count(), 1);
    }

    #[test]
    fn test_line_width_override() {
        let demo = Demo::new(
            &AppConfig {
                demo: DemoKind::Sphere,
                line_width: Some(0),
                ..AppConfig::default()
            },
            640,
            480,
        );
        let material = demo.scene.objects()[0].material.as_ref().expect("material");
        assert!(material.is_filled());
    }

    #[test]
    fn test_toggle_projection() {
        let mut demo = Demo::new(&config(DemoKind::Sphere), 640, 480);
        assert!(!demo.scene.camera.orthographic);
        demo.toggle_projection();
        assert!(demo.scene.camera.orthographic);
    }
}
