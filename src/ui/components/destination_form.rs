use eframe::egui;

use crate::common::Destination;
use crate::ui::state::DestinationFormState;

/// Form thêm destination bên trong trip detail. Trả về destination mới
/// khi submit hợp lệ.
pub fn render(ui: &mut egui::Ui, form: &mut DestinationFormState) -> Option<Destination> {
    let mut submitted = None;

    ui.label("Destination Name *");
    ui.text_edit_singleline(&mut form.name);
    ui.label("Activities");
    ui.text_edit_multiline(&mut form.activities);
    ui.label("Notes (Optional)");
    ui.text_edit_multiline(&mut form.notes);

    if let Some(error) = &form.error {
        ui.colored_label(egui::Color32::RED, error);
    }

    ui.horizontal(|ui| {
        if ui.button("Cancel").clicked() {
            form.clear();
        }
        if ui.button("Add Destination").clicked() {
            match form.validate() {
                Ok(destination) => {
                    form.clear();
                    submitted = Some(destination);
                }
                Err(message) => form.error = Some(message),
            }
        }
    });

    submitted
}
