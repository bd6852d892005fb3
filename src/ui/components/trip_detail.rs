use eframe::egui;

use crate::common::{Destination, Trip};
use crate::ui::state::DestinationFormState;

use super::destination_form;

#[derive(Default)]
pub struct DetailActions {
    pub add_destination: Option<Destination>,
    pub remove_destination: Option<String>,
    pub focus_destination: Option<String>,
    pub delete_trip: bool,
}

pub fn render(
    ui: &mut egui::Ui,
    trip: &Trip,
    focus: Option<&str>,
    form: &mut DestinationFormState,
) -> DetailActions {
    let mut actions = DetailActions::default();

    ui.horizontal(|ui| {
        ui.label(format!("{} → {}", trip.start_date, trip.end_date));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Delete Trip").clicked() {
                actions.delete_trip = true;
            }
        });
    });

    if let Some(description) = &trip.description {
        ui.separator();
        ui.label(egui::RichText::new("Description").strong());
        ui.label(description);
    }

    ui.separator();
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Destinations").strong());
        if !form.open && ui.button("Add Destination").clicked() {
            form.open = true;
        }
    });

    if trip.destinations.is_empty() && !form.open {
        ui.label(
            egui::RichText::new(
                "No destinations added yet. Click \"Add Destination\" to start planning!",
            )
            .italics(),
        );
    }

    for destination in &trip.destinations {
        let focused = focus == Some(destination.id.as_str());
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                if focused {
                    ui.colored_label(egui::Color32::GOLD, "★");
                }
                ui.label(egui::RichText::new(&destination.name).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Remove").clicked() {
                        actions.remove_destination = Some(destination.id.clone());
                    }
                    if !focused && ui.button("Focus AI").clicked() {
                        actions.focus_destination = Some(destination.id.clone());
                    }
                });
            });
            if !destination.activities.is_empty() {
                ui.label(format!("Activities: {}", destination.activities));
            }
            if let Some(notes) = &destination.notes {
                ui.label(format!("Notes: {notes}"));
            }
        });
    }

    if form.open {
        ui.separator();
        if let Some(destination) = destination_form::render(ui, form) {
            actions.add_destination = Some(destination);
        }
    }

    actions
}
