use eframe::egui::{self, RichText, Ui};

use crate::util::format_attributes;

use super::super::ViewModel;

struct NeighborRow {
    id: String,
    label: String,
    relation: String,
    outgoing: bool,
    attributes: Vec<(String, String)>,
    is_proposed: bool,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a node to inspect it.");
            return;
        };

        // Snapshot everything first; rendering below may change the
        // selection.
        let Some(snapshot) = self.selection_snapshot(&selected_id) else {
            // The selected node left the scene, e.g. its proposal was
            // skipped.
            self.selected = None;
            ui.label("Click a node to inspect it.");
            return;
        };
        let (label, kind_caption, content, neighbors) = snapshot;

        ui.label(RichText::new(label).strong().size(16.0));
        ui.label(kind_caption);
        if let Some(content) = content {
            ui.add_space(4.0);
            ui.label(content);
        }

        ui.add_space(8.0);
        if ui.button("Deselect").clicked() {
            self.selected = None;
        }

        ui.add_space(10.0);
        ui.separator();
        ui.label(RichText::new(format!("Relations ({})", neighbors.len())).strong());

        let mut pending_selection = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for row in &neighbors {
                ui.horizontal_wrapped(|ui| {
                    let arrow = if row.outgoing { "→" } else { "←" };
                    let mut relation = row.relation.clone();
                    if row.is_proposed {
                        relation.push_str(" (proposed)");
                    }
                    ui.label(format!("{arrow} {relation}"));
                    if ui.link(&row.label).clicked() {
                        pending_selection = Some(row.id.clone());
                    }
                });
                if !row.attributes.is_empty() {
                    ui.label(
                        RichText::new(format_attributes(&row.attributes))
                            .small()
                            .weak(),
                    );
                }
            }
        });

        if let Some(next) = pending_selection {
            self.selected = Some(next);
        }
    }

    #[expect(clippy::type_complexity)]
    fn selection_snapshot(
        &self,
        selected_id: &str,
    ) -> Option<(String, String, Option<String>, Vec<NeighborRow>)> {
        let scene = self.scene.as_ref()?;
        let &index = scene.index_by_id.get(selected_id)?;
        let node = &scene.nodes[index];

        let mut kind_caption = node.kind.label().to_owned();
        if node.is_hub {
            kind_caption.push_str(" · root");
        }
        if node.is_proposed {
            kind_caption.push_str(" · proposed");
        } else if node.is_new {
            kind_caption.push_str(" · newly confirmed");
        }

        let mut neighbors = Vec::new();
        for edge in &scene.edges {
            let (other, outgoing) = if edge.source == index {
                (edge.target, true)
            } else if edge.target == index {
                (edge.source, false)
            } else {
                continue;
            };

            neighbors.push(NeighborRow {
                id: scene.nodes[other].id.clone(),
                label: scene.nodes[other].label.clone(),
                relation: edge.relation.clone(),
                outgoing,
                attributes: edge.attributes.clone(),
                is_proposed: edge.is_proposed,
            });
        }

        Some((
            node.label.clone(),
            kind_caption,
            node.content.clone(),
            neighbors,
        ))
    }
}
