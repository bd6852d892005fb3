use eframe::egui;

use crate::common::AiFeature;
use crate::ui::state::SuggestionState;

pub enum AssistantAction {
    Feature(AiFeature),
    OpenChat,
}

const FEATURES: [AiFeature; 3] = [
    AiFeature::SuggestActivities,
    AiFeature::PackingList,
    AiFeature::TravelTips,
];

/// Panel AI assistant trong trip detail: ba nút gợi ý + lối vào chat.
pub fn render(
    ui: &mut egui::Ui,
    suggestion: &mut SuggestionState,
    ai_available: bool,
    has_focus_destination: bool,
) -> Option<AssistantAction> {
    let mut action = None;

    ui.separator();
    ui.label(egui::RichText::new("AI Assistant").strong());

    if !ai_available {
        ui.colored_label(
            egui::Color32::RED,
            "AI features are currently unavailable. Set GEMINI_API_KEY to enable them.",
        );
        return None;
    }

    let idle = suggestion.loading.is_none();
    ui.horizontal_wrapped(|ui| {
        for feature in FEATURES {
            // Suggest Activities cần một destination tiêu điểm
            let enabled =
                idle && (feature != AiFeature::SuggestActivities || has_focus_destination);
            if ui
                .add_enabled(enabled, egui::Button::new(feature.label()))
                .clicked()
            {
                action = Some(AssistantAction::Feature(feature));
            }
        }
        if ui
            .add_enabled(idle, egui::Button::new("Famous Spots (Chat)"))
            .clicked()
        {
            action = Some(AssistantAction::OpenChat);
        }
    });

    if let Some(feature) = suggestion.loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(format!("Asking for {}...", feature.label().to_lowercase()));
        });
    }

    if let (Some(title), Some(content)) = (&suggestion.title, &suggestion.content) {
        ui.add_space(4.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(title).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Copy").clicked() {
                        ui.ctx().copy_text(content.clone());
                    }
                });
            });
            egui::ScrollArea::vertical()
                .id_salt("suggestion_result")
                .max_height(220.0)
                .show(ui, |ui| {
                    ui.label(content);
                });
        });
    }

    action
}
