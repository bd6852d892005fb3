use eframe::egui;

use crate::ui::state::{AppState, TripFilter};

#[derive(Default)]
pub struct TripListActions {
    pub view: Option<String>,
    pub edit: Option<String>,
    pub delete: Option<String>,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> TripListActions {
    let mut actions = TripListActions::default();

    // Thanh search + filter
    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut state.search_term)
                .hint_text("Search trips by name, description, or destination...")
                .desired_width(320.0),
        );
        ui.label("Filter:");
        egui::ComboBox::from_id_salt("trip_filter")
            .selected_text(state.filter.label())
            .show_ui(ui, |ui| {
                for filter in TripFilter::ALL {
                    ui.selectable_value(&mut state.filter, filter, filter.label());
                }
            });
    });
    ui.separator();

    let today = AppState::today();
    let trips = state.filtered_trips(today);

    if trips.is_empty() {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.heading("No trips found.");
            if state.trips.is_empty() {
                ui.label("Ready for an adventure? Add your first trip!");
            } else {
                ui.label("Try adjusting your search or filter.");
            }
        });
        return actions;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for trip in trips {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.heading(&trip.name);
                ui.label(format!("{} → {}", trip.start_date, trip.end_date));
                if let Some(description) = &trip.description {
                    ui.label(egui::RichText::new(description).weak());
                }
                ui.label(format!(
                    "{} destination{}",
                    trip.destinations.len(),
                    if trip.destinations.len() == 1 { "" } else { "s" }
                ));
                ui.horizontal(|ui| {
                    if ui.button("Details").clicked() {
                        actions.view = Some(trip.id.clone());
                    }
                    if ui.button("Edit").clicked() {
                        actions.edit = Some(trip.id.clone());
                    }
                    if ui.button("Delete").clicked() {
                        actions.delete = Some(trip.id.clone());
                    }
                });
            });
            ui.add_space(6.0);
        }
    });

    actions
}
