use eframe::egui;

use crate::ui::state::{TripDraft, TripFormState};

pub enum TripFormAction {
    None,
    Cancel,
    Submit(TripDraft),
}

pub fn render(ui: &mut egui::Ui, form: &mut TripFormState) -> TripFormAction {
    let mut action = TripFormAction::None;

    ui.label("Trip Name *");
    ui.text_edit_singleline(&mut form.name);

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label("Start Date *");
            ui.add(
                egui::TextEdit::singleline(&mut form.start_date)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(120.0),
            );
        });
        ui.vertical(|ui| {
            ui.label("End Date *");
            ui.add(
                egui::TextEdit::singleline(&mut form.end_date)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(120.0),
            );
        });
    });

    ui.label("Description (Optional)");
    ui.text_edit_multiline(&mut form.description);

    if let Some(error) = &form.error {
        ui.colored_label(egui::Color32::RED, error);
    }

    ui.horizontal(|ui| {
        if ui.button("Cancel").clicked() {
            action = TripFormAction::Cancel;
        }
        let submit_label = if form.editing.is_some() {
            "Save Changes"
        } else {
            "Create Trip"
        };
        if ui.button(submit_label).clicked() {
            // Validation tại ranh giới form: submit hỏng không đổi state nào
            match form.validate() {
                Ok(draft) => {
                    form.error = None;
                    action = TripFormAction::Submit(draft);
                }
                Err(message) => form.error = Some(message),
            }
        }
    });

    action
}
