use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Shape, Stroke, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::{format_attributes, truncate_label};

use super::super::render_utils::{
    blend_color, circle_visible, dashed_circle, dashed_rect, draw_arrowhead, draw_background,
    edge_style, edge_visible, fade_color, node_palette, world_to_screen,
};
use super::super::{SceneGraph, SearchMatchCache, ViewModel};

/// Seconds for the selection emphasis to fade in and out.
const HIGHLIGHT_SECONDS: f32 = 0.3;
/// Residual visibility of elements outside the highlight or hover sets.
const DIMMED_VISIBILITY: f32 = 0.3;
/// Refit delay after the canvas changes size.
const RESIZE_FIT_DELAY: f32 = 0.1;

const SELECTION_COLOR: Color32 = Color32::from_rgb(255, 152, 0);
const SEARCH_MATCH_COLOR: Color32 = Color32::from_rgb(33, 150, 243);

/// Visibility of an element whose dim animation sits at `mix`, from fully
/// opaque down to the dimmed floor.
fn dim_visibility(mix: f32) -> f32 {
    1.0 - (1.0 - DIMMED_VISIBILITY) * mix
}

fn fuzzy_match(matcher: &SkimMatcherV2, text: &str, query: &str) -> bool {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
        .is_some()
}

impl ViewModel {
    fn update_screen_space(rect: Rect, pan: Vec2, zoom: f32, scene: &mut SceneGraph) {
        scene.view_scratch.screen_positions.clear();
        scene.view_scratch.screen_radii.clear();
        for node in &scene.nodes {
            scene
                .view_scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, node.world_pos));
            scene
                .view_scratch
                .screen_radii
                .push((node.hit_radius * zoom).clamp(4.0, 280.0));
        }
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.scene_revision == self.scene_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let scene = self.scene.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = scene
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let label_hit = fuzzy_match(&matcher, &node.label, query);
                let content_hit = node
                    .content
                    .as_deref()
                    .is_some_and(|content| fuzzy_match(&matcher, content, query));
                (label_hit || content_hit).then_some(index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            scene_revision: self.scene_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        self.rebuild_scene_if_dirty();

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        if self.canvas_size != Vec2::ZERO && (self.canvas_size - rect.size()).length() > 1.0 {
            self.schedule_fit(now, RESIZE_FIT_DELAY);
        }
        self.canvas_size = rect.size();

        draw_background(&painter, rect, self.pan, self.zoom);
        self.handle_graph_zoom(ui, rect, &response);
        if self.tick_view(now) {
            ui.ctx().request_repaint();
        }

        let search_matches = self.cached_search_matches();
        let live_physics = self.live_physics;

        let mut physics_moving = false;
        let hovered = {
            let Some(scene) = self.scene.as_mut() else {
                return;
            };

            scene.expire_drag_release(now);

            // Hit-test against last frame's screen positions; the scratch
            // is empty right after a rebuild, which simply means no hover.
            let hovered = Self::hovered_index(
                ui,
                rect,
                &scene.view_scratch.screen_positions,
                &scene.view_scratch.screen_radii,
            )
            .map(|(index, _)| index);

            if live_physics && scene.physics_active() {
                scene.step_physics(rect.height());
                physics_moving = scene.physics_active();
            }

            hovered
        };

        self.handle_graph_drag(ui, rect, &response, hovered);

        let pan = self.pan;
        let zoom = self.zoom;
        if let Some(scene) = self.scene.as_mut() {
            Self::update_screen_space(rect, pan, zoom, scene);
        }

        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
        if response.clicked_by(egui::PointerButton::Primary) {
            let clicked_id = hovered.and_then(|index| {
                self.scene
                    .as_ref()
                    .and_then(|scene| scene.nodes.get(index))
                    .map(|node| node.id.clone())
            });
            self.apply_graph_selection(clicked_id);
        }

        let selected_id = self.selected.clone();
        let Some(scene) = self.scene.as_ref() else {
            return;
        };

        let highlight = selected_id
            .as_deref()
            .and_then(|id| scene.highlight_for(id));
        let mut selection_animating = false;
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let positions = &scene.view_scratch.screen_positions;
        let radii = &scene.view_scratch.screen_radii;

        for (index, edge) in scene.edges.iter().enumerate() {
            let start = positions[edge.source];
            let end = positions[edge.target];
            if !edge_visible(rect, start, end, 4.0) {
                continue;
            }

            // Dimming is animated per element; deselecting or moving the
            // selection eases back instead of snapping.
            let dimmed = highlight
                .as_ref()
                .is_some_and(|state| !state.contains_edge(index));
            let dim_mix = ui.ctx().animate_bool_with_time(
                egui::Id::new(("edge-dim", self.scene_revision, index)),
                dimmed,
                HIGHLIGHT_SECONDS,
            );
            if dim_mix > 0.0 && dim_mix < 1.0 {
                selection_animating = true;
            }
            let mut visibility = dim_visibility(dim_mix);
            if let Some(hovered) = hovered
                && !edge.touches(hovered)
            {
                visibility = visibility.min(DIMMED_VISIBILITY);
            }

            let (base_color, width) = edge_style(edge.relation_class, edge.is_proposed);
            let color = fade_color(base_color, visibility);
            let stroke = Stroke::new(width, color);

            if edge.is_proposed {
                painter.extend(Shape::dashed_line(&[start, end], stroke, 8.0, 5.0));
            } else {
                painter.line_segment([start, end], stroke);
            }
            draw_arrowhead(&painter, start, end, radii[edge.target], color);

            if zoom > 1.1 && visibility > 0.5 {
                let caption = if edge.attributes.is_empty() {
                    edge.relation.clone()
                } else {
                    format!("{} {}", edge.relation, format_attributes(&edge.attributes))
                };
                painter.text(
                    start + (end - start) * 0.5,
                    Align2::CENTER_CENTER,
                    caption,
                    FontId::proportional(10.0),
                    fade_color(Color32::from_gray(90), visibility),
                );
            }
        }

        for (index, node) in scene.nodes.iter().enumerate() {
            let position = positions[index];
            let radius = radii[index];
            if !circle_visible(rect, position, radius * 1.4) {
                continue;
            }

            let dimmed = highlight
                .as_ref()
                .is_some_and(|state| !state.contains_node(index));
            let dim_mix = ui.ctx().animate_bool_with_time(
                ui.make_persistent_id(("node-dim", node.id.as_str())),
                dimmed,
                HIGHLIGHT_SECONDS,
            );
            if dim_mix > 0.0 && dim_mix < 1.0 {
                selection_animating = true;
            }
            let mut visibility = dim_visibility(dim_mix);
            let is_search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            if search_active && !is_search_match {
                visibility = visibility.min(0.45);
            }

            let (fill, outline) = node_palette(node.kind, node.is_hub, node.is_proposed, node.is_new);
            let fill = fade_color(fill, visibility);
            let mut outline = fade_color(outline, visibility);
            if is_search_match {
                outline = SEARCH_MATCH_COLOR;
            }

            let is_selected = highlight.as_ref().is_some_and(|state| state.selected == index);
            let selection_mix = ui.ctx().animate_bool_with_time(
                ui.make_persistent_id(("node-selection", node.id.as_str())),
                is_selected,
                HIGHLIGHT_SECONDS,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }
            let outline = blend_color(outline, SELECTION_COLOR, selection_mix);
            let outline_width = 2.0 + selection_mix * 1.5;

            if node.kind.is_round() {
                let circle_radius = 30.0 * zoom;
                painter.circle_filled(position, circle_radius, fill);
                let stroke = Stroke::new(outline_width, outline);
                if node.is_proposed {
                    dashed_circle(&painter, position, circle_radius, stroke);
                } else {
                    painter.circle_stroke(position, circle_radius, stroke);
                }

                let glyph = if node.kind == crate::ontology::NodeKind::Question {
                    "?"
                } else {
                    "A"
                };
                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    glyph,
                    FontId::proportional((18.0 * zoom).clamp(9.0, 36.0)),
                    fade_color(Color32::from_gray(40), visibility),
                );
            } else {
                let size = if node.is_hub {
                    vec2(140.0, 60.0)
                } else {
                    vec2(120.0, 50.0)
                } * zoom;
                let node_rect = Rect::from_center_size(position, size);
                painter.rect_filled(node_rect, 8.0 * zoom, fill);
                let stroke = Stroke::new(outline_width, outline);
                if node.is_proposed {
                    dashed_rect(&painter, node_rect, stroke);
                } else {
                    painter.rect_stroke(node_rect, 8.0 * zoom, stroke, egui::StrokeKind::Outside);
                }

                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    truncate_label(&node.label, 18),
                    FontId::proportional((13.0 * zoom).clamp(8.0, 26.0)),
                    fade_color(Color32::from_gray(35), visibility),
                );
                if zoom > 0.8 {
                    painter.text(
                        position + vec2(0.0, size.y * 0.30),
                        Align2::CENTER_CENTER,
                        node.kind.label(),
                        FontId::proportional((9.0 * zoom).clamp(7.0, 16.0)),
                        fade_color(Color32::from_gray(120), visibility),
                    );
                }
            }

            if selection_mix > 0.0 {
                let halo_alpha = (selection_mix * 160.0) as u8;
                painter.circle_stroke(
                    position,
                    radius + 6.0,
                    Stroke::new(
                        2.0,
                        Color32::from_rgba_unmultiplied(255, 152, 0, halo_alpha),
                    ),
                );
            }
        }

        if let Some(index) = hovered
            && let Some(node) = scene.nodes.get(index)
        {
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                ui.layer_id(),
                egui::Id::new("node-hover-tooltip"),
                |ui| {
                    ui.strong(&node.label);
                    ui.label(format!(
                        "{}{}",
                        node.kind.label(),
                        if node.is_proposed { " (proposed)" } else { "" }
                    ));
                    if let Some(content) = &node.content {
                        ui.separator();
                        ui.label(content);
                    }
                },
            );
        }

        if physics_moving || selection_animating || response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
