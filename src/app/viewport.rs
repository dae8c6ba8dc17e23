use eframe::egui::Vec2;

use super::{SceneNode, ViewModel};

pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
pub(in crate::app) const MAX_ZOOM: f32 = 4.0;

/// Margin factor applied when fitting the graph, leaving breathing room
/// around the outermost nodes.
const FIT_MARGIN: f32 = 0.8;
const FIT_ANIMATION_SECONDS: f32 = 0.75;

/// An in-flight pan/zoom transition, eased cubically between two camera
/// transforms.
pub(in crate::app) struct ViewAnimation {
    from_pan: Vec2,
    from_zoom: f32,
    to_pan: Vec2,
    to_zoom: f32,
    start: f64,
    duration: f32,
}

impl ViewAnimation {
    /// Returns the interpolated transform and whether the animation has
    /// finished.
    pub(in crate::app) fn sample(&self, now: f64) -> (Vec2, f32, bool) {
        let elapsed = (now - self.start) as f32;
        if elapsed >= self.duration || self.duration <= 0.0 {
            return (self.to_pan, self.to_zoom, true);
        }

        let t = ease_in_out_cubic((elapsed / self.duration).clamp(0.0, 1.0));
        let pan = self.from_pan + (self.to_pan - self.from_pan) * t;
        let zoom = self.from_zoom + (self.to_zoom - self.from_zoom) * t;
        (pan, zoom, false)
    }
}

/// A fit request deferred until the layout has had time to spread out.
pub(in crate::app) struct PendingFit {
    pub(in crate::app) at: f64,
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// Computes the pan/zoom that centers all nodes in the canvas at
/// `FIT_MARGIN` of the tightest fit. Node extents are inflated by their
/// hit radius so shapes are not clipped at the border.
pub(in crate::app) fn fit_transform(nodes: &[SceneNode], canvas: Vec2) -> Option<(Vec2, f32)> {
    if nodes.is_empty() || canvas.x <= 0.0 || canvas.y <= 0.0 {
        return None;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for node in nodes {
        min_x = min_x.min(node.world_pos.x - node.hit_radius);
        min_y = min_y.min(node.world_pos.y - node.hit_radius);
        max_x = max_x.max(node.world_pos.x + node.hit_radius);
        max_y = max_y.max(node.world_pos.y + node.hit_radius);
    }
    if !min_x.is_finite() || !min_y.is_finite() || !max_x.is_finite() || !max_y.is_finite() {
        return None;
    }

    let width = (max_x - min_x).max(1.0);
    let height = (max_y - min_y).max(1.0);
    let zoom = (FIT_MARGIN * (canvas.x / width).min(canvas.y / height)).clamp(MIN_ZOOM, MAX_ZOOM);

    let center = Vec2::new((min_x + max_x) * 0.5, (min_y + max_y) * 0.5);
    Some((-center * zoom, zoom))
}

impl ViewModel {
    /// Queue a fit once the simulation has had `delay` seconds to unfold.
    pub(in crate::app) fn schedule_fit(&mut self, now: f64, delay: f32) {
        self.pending_fit = Some(PendingFit {
            at: now + delay as f64,
        });
    }

    /// Start an animated transition to the fitted transform.
    pub(in crate::app) fn fit_to_view(&mut self, now: f64) {
        let Some(scene) = &self.scene else {
            return;
        };
        let Some((pan, zoom)) = fit_transform(&scene.nodes, self.canvas_size) else {
            return;
        };

        self.view_animation = Some(ViewAnimation {
            from_pan: self.pan,
            from_zoom: self.zoom,
            to_pan: pan,
            to_zoom: zoom,
            start: now,
            duration: FIT_ANIMATION_SECONDS,
        });
    }

    /// Advance pending fits and the running camera animation. Returns true
    /// while the camera is still moving.
    pub(in crate::app) fn tick_view(&mut self, now: f64) -> bool {
        if let Some(pending) = &self.pending_fit
            && now >= pending.at
        {
            self.pending_fit = None;
            self.fit_to_view(now);
        }

        if let Some(animation) = &self.view_animation {
            let (pan, zoom, done) = animation.sample(now);
            self.pan = pan;
            self.zoom = zoom;
            if done {
                self.view_animation = None;
            }
            return !done;
        }

        self.pending_fit.is_some()
    }

    /// Any user gesture takes the camera back; a running transition would
    /// fight the pointer otherwise.
    pub(in crate::app) fn cancel_view_animation(&mut self) {
        self.view_animation = None;
        self.pending_fit = None;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use eframe::egui::vec2;

    use super::*;
    use crate::app::test_support::test_node;

    #[test]
    fn fit_of_empty_scene_is_none() {
        assert!(fit_transform(&[], vec2(800.0, 600.0)).is_none());
    }

    #[test]
    fn fit_centers_bounds_at_margin_scale() {
        let mut a = test_node("a");
        a.world_pos = vec2(-100.0, -100.0);
        a.hit_radius = 0.0;
        let mut b = test_node("b");
        b.world_pos = vec2(300.0, 100.0);
        b.hit_radius = 0.0;

        let (pan, zoom) = fit_transform(&[a, b], vec2(800.0, 600.0)).expect("fit");

        // Bounds are 400 x 200 in an 800 x 600 canvas, so the x axis is the
        // constraint: zoom = 0.8 * 800 / 400.
        assert_relative_eq!(zoom, 1.6);
        assert_relative_eq!(pan.x, -100.0 * zoom);
        assert_relative_eq!(pan.y, -0.0 * zoom);
    }

    #[test]
    fn fit_zoom_is_clamped() {
        let mut lone = test_node("lone");
        lone.world_pos = vec2(0.0, 0.0);
        lone.hit_radius = 10.0;

        let (_, zoom) = fit_transform(&[lone], vec2(4000.0, 4000.0)).expect("fit");
        assert_relative_eq!(zoom, MAX_ZOOM);

        let mut far_a = test_node("far_a");
        far_a.world_pos = vec2(-100_000.0, 0.0);
        let mut far_b = test_node("far_b");
        far_b.world_pos = vec2(100_000.0, 0.0);
        let (_, zoom) = fit_transform(&[far_a, far_b], vec2(800.0, 600.0)).expect("fit");
        assert_relative_eq!(zoom, MIN_ZOOM);
    }

    #[test]
    fn animation_eases_between_transforms() {
        let animation = ViewAnimation {
            from_pan: vec2(0.0, 0.0),
            from_zoom: 1.0,
            to_pan: vec2(100.0, 0.0),
            to_zoom: 2.0,
            start: 10.0,
            duration: 1.0,
        };

        let (pan, zoom, done) = animation.sample(10.0);
        assert_relative_eq!(pan.x, 0.0);
        assert_relative_eq!(zoom, 1.0);
        assert!(!done);

        let (pan, zoom, done) = animation.sample(10.5);
        assert_relative_eq!(pan.x, 50.0, epsilon = 1e-3);
        assert_relative_eq!(zoom, 1.5, epsilon = 1e-3);
        assert!(!done);

        let (pan, zoom, done) = animation.sample(11.5);
        assert_relative_eq!(pan.x, 100.0);
        assert_relative_eq!(zoom, 2.0);
        assert!(done);
    }
}
