use glam::{Mat4, Vec2, Vec3, Vec4};

#[derive(Default, Clone, Copy, Debug)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
}

#[derive(Default, Clone, Copy, Debug)]
pub struct DragState {
    pub active: bool,
    pub object: usize,
    pub plane_y_world: f32,
    pub last_hit: Vec3,
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Intersection of a ray with the horizontal plane `y = plane_y`.
#[inline]
pub fn ray_horizontal_plane(ray_origin: Vec3, ray_dir: Vec3, plane_y: f32) -> Option<Vec3> {
    if ray_dir.y.abs() < 1e-6 {
        return None;
    }
    let t = (plane_y - ray_origin.y) / ray_dir.y;
    (t >= 0.0).then(|| ray_origin + ray_dir * t)
}

/// World-space ray through a pixel, given the combined view-projection.
///
/// Returns `(ray_origin, ray_direction)`; the origin lies on the near plane.
pub fn screen_to_world_ray(view_proj: Mat4, viewport: Vec2, px: Vec2) -> (Vec3, Vec3) {
    let w = viewport.x.max(1.0);
    let h = viewport.y.max(1.0);
    let ndc_x = (2.0 * px.x / w) - 1.0;
    let ndc_y = 1.0 - (2.0 * px.y / h);
    let inv = view_proj.inverse();
    let p_near = inv * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
    let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    let p0: Vec3 = p_near.truncate() / p_near.w;
    let p1: Vec3 = p_far.truncate() / p_far.w;
    (p0, (p1 - p0).normalize())
}

/// Index of the nearest sphere hit along the ray, if any.
pub fn pick_nearest(
    ray_origin: Vec3,
    ray_dir: Vec3,
    centers: &[Vec3],
    radius: f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, c) in centers.iter().enumerate() {
        if let Some(t) = ray_sphere(ray_origin, ray_dir, *c, radius) {
            if best.map_or(true, |(_, bt)| t < bt) {
                best = Some((i, t));
            }
        }
    }
    best.map(|(i, _)| i)
}
