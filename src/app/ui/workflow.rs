use eframe::egui::{self, Color32, RichText, Ui, vec2};

use super::super::render_utils::{edge_style, node_palette};
use super::super::{ViewModel, WorkflowStep};
use crate::ontology::{NodeKind, RelationClass};

impl ViewModel {
    pub(in crate::app) fn draw_workflow(&mut self, ui: &mut Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Knowledge capture");
            ui.add_space(6.0);

            match self.workflow {
                WorkflowStep::Upload => self.draw_upload_step(ui),
                WorkflowStep::Extracting => self.draw_extracting_step(ui),
                WorkflowStep::Map => self.draw_map_step(ui),
                WorkflowStep::Complete => self.draw_complete_step(ui),
            }

            ui.add_space(10.0);
            ui.separator();

            ui.label("Search");
            ui.text_edit_singleline(&mut self.search);

            ui.add_space(6.0);
            ui.checkbox(&mut self.live_physics, "Live physics");
            ui.checkbox(&mut self.show_legend, "Show legend");
            ui.checkbox(&mut self.show_fps_bar, "Show FPS");

            if self.show_legend {
                ui.add_space(10.0);
                ui.separator();
                self.draw_legend(ui);
            }
        });
    }

    fn draw_upload_step(&mut self, ui: &mut Ui) {
        ui.label("Upload a maintenance document to extract question/answer units.");
        ui.add_space(8.0);
        if ui.button("Upload document").clicked() {
            self.begin_extraction();
        }
    }

    fn draw_extracting_step(&mut self, ui: &mut Ui) {
        if let Some(doc) = &self.uploaded_doc {
            ui.label(doc);
        }
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Extracting Q&A units...");
        });
    }

    fn draw_map_step(&mut self, ui: &mut Ui) {
        let Some(qa) = self.qas.get(self.current_qa) else {
            self.workflow = WorkflowStep::Complete;
            return;
        };

        ui.label(
            RichText::new(format!("Unit {} of {}", self.current_qa + 1, self.qas.len())).strong(),
        );
        ui.add_space(6.0);

        ui.label(RichText::new("Question").strong());
        ui.label(qa.question.clone());
        ui.add_space(4.0);
        ui.label(RichText::new("Answer").strong());
        ui.label(qa.answer.clone());
        ui.add_space(8.0);

        if self.staged.is_empty() {
            ui.label("Proposals for this unit are not staged.");
            if ui.button("Show proposals").clicked() {
                self.stage_current_qa();
            }
            return;
        }

        let node_count = self
            .staged
            .iter()
            .filter(|element| element.as_node().is_some())
            .count();
        ui.label(format!(
            "{} proposed nodes, {} proposed edges",
            node_count,
            self.staged.len() - node_count
        ));
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            if ui.button("Confirm").clicked() {
                self.confirm_staged();
            }
            if ui.button("Skip").clicked() {
                self.skip_staged();
            }
        });
    }

    fn draw_complete_step(&mut self, ui: &mut Ui) {
        ui.label("All units reviewed.");
        ui.label(format!(
            "The ontology now holds {} nodes and {} links.",
            self.ontology.nodes.len(),
            self.ontology.links.len()
        ));
        ui.add_space(8.0);
        if ui.button("Start over").clicked() {
            self.reset_demo();
        }
    }

    fn draw_legend(&self, ui: &mut Ui) {
        ui.label(RichText::new("Nodes").strong());
        for (kind, caption) in [
            (NodeKind::Class, "Class"),
            (NodeKind::Instance, "Instance"),
            (NodeKind::Question, "Question"),
            (NodeKind::Answer, "Answer"),
            (NodeKind::Person, "Person"),
        ] {
            let (fill, _) = node_palette(kind, false, false, false);
            legend_row(ui, fill, caption);
        }
        let (hub_fill, _) = node_palette(NodeKind::Class, true, false, false);
        legend_row(ui, hub_fill, "Root hub");
        let (proposed_fill, _) = node_palette(NodeKind::Class, false, true, false);
        legend_row(ui, proposed_fill, "Proposed (dashed)");
        let (new_fill, _) = node_palette(NodeKind::Class, false, false, true);
        legend_row(ui, new_fill, "Newly confirmed");

        ui.add_space(6.0);
        ui.label(RichText::new("Edges").strong());
        for (relation_class, caption) in [
            (RelationClass::Taxonomic, "is_a / instance_of"),
            (RelationClass::Informational, "is_relevant_for"),
            (RelationClass::Predicate, "domain predicate"),
        ] {
            let (color, _) = edge_style(relation_class, false);
            legend_row(ui, color, caption);
        }
        let (proposed_color, _) = edge_style(RelationClass::Predicate, true);
        legend_row(ui, proposed_color, "proposed (dashed)");
    }
}

fn legend_row(ui: &mut Ui, color: Color32, caption: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), egui::Sense::hover());
        ui.painter()
            .rect_filled(rect.shrink(1.0), 3.0, color);
        ui.painter().rect_stroke(
            rect.shrink(1.0),
            3.0,
            egui::Stroke::new(1.0, Color32::from_gray(140)),
            egui::StrokeKind::Outside,
        );
        ui.label(caption);
    });
}
