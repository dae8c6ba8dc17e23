use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::ontology::{Dataset, Ontology};

use super::super::{ViewModel, WorkflowStep};

/// Delay before the first automatic fit, giving the fresh layout time to
/// unfold from its spawn scatter.
const INITIAL_FIT_DELAY: f32 = 0.5;

impl ViewModel {
    pub(in crate::app) fn new(dataset: Dataset) -> Self {
        let ontology = Ontology::from_seed(dataset.ontology.clone());

        Self {
            dataset,
            ontology,
            qas: Vec::new(),
            current_qa: 0,
            workflow: WorkflowStep::Upload,
            staged: Vec::new(),
            uploaded_doc: None,
            extraction_rx: None,
            selected: None,
            search: String::new(),
            search_match_cache: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            canvas_size: Vec2::ZERO,
            view_animation: None,
            pending_fit: None,
            needs_initial_fit: true,
            live_physics: true,
            show_legend: true,
            show_fps_bar: true,
            scene_dirty: true,
            scene_revision: 0,
            scene: None,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        self.update_fps_counter(ctx);

        let now = ctx.input(|input| input.time);
        if self.needs_initial_fit {
            self.needs_initial_fit = false;
            self.schedule_fit(now, INITIAL_FIT_DELAY);
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("ontograph");
                    ui.separator();
                    ui.label(format!(
                        "confirmed: {} nodes / {} links",
                        self.ontology.nodes.len(),
                        self.ontology.links.len()
                    ));
                    if self.workflow == WorkflowStep::Map {
                        ui.label(format!(
                            "unit {}/{}",
                            (self.current_qa + 1).min(self.qas.len()),
                            self.qas.len()
                        ));
                    }
                    if ui.button("Fit view").clicked() {
                        self.fit_to_view(now);
                    }
                    if ui.button("Reset demo").clicked() {
                        self.reset_demo();
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        if let Some(scene_text) = self.scene_stats_text() {
                            ui.label(scene_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("workflow")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_workflow(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}
