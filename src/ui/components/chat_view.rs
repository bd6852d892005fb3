use eframe::egui;

use crate::common::{MessageRole, SuggestedSpotInfo};
use crate::ui::state::ChatState;

/// Transcript + input bar của spot-finder chat. Trả về tin nhắn người
/// dùng vừa submit, nếu có.
pub fn render(ui: &mut egui::Ui, chat: &mut ChatState) -> Option<String> {
    egui::ScrollArea::vertical()
        .id_salt("chat_transcript")
        .stick_to_bottom(true)
        .max_height(360.0)
        .show(ui, |ui| {
            for message in &chat.messages {
                match message.role {
                    MessageRole::User => {
                        ui.label(
                            egui::RichText::new(format!("You: {}", message.text)).strong(),
                        );
                    }
                    MessageRole::Model => {
                        ui.label(format!("Guide: {}", message.text));
                        if chat.enriching.as_deref() == Some(message.id.as_str()) {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(egui::RichText::new("Fetching details...").italics());
                            });
                        }
                        if let Some(spots) = &message.enriched {
                            for spot in spots {
                                render_spot(ui, spot);
                            }
                        }
                    }
                    MessageRole::System => {
                        ui.colored_label(egui::Color32::RED, &message.text);
                    }
                }
                ui.label(
                    egui::RichText::new(message.timestamp.format("%H:%M").to_string())
                        .weak()
                        .small(),
                );
                ui.add_space(6.0);
            }

            if chat.waiting {
                ui.horizontal(|ui| {
                    ui.spinner();
                    let label = if chat.messages.is_empty() {
                        "AI is starting chat..."
                    } else {
                        "AI is typing..."
                    };
                    ui.label(egui::RichText::new(label).italics());
                });
            }
        });

    if let Some(error) = &chat.error {
        ui.colored_label(egui::Color32::RED, error);
    }

    ui.separator();

    if chat.unavailable {
        ui.colored_label(
            egui::Color32::RED,
            "AI Service not available. Chatbot features are disabled.",
        );
        return None;
    }

    let locked = chat.input_locked();
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            !locked,
            egui::TextEdit::singleline(&mut chat.input)
                .hint_text("Ask about famous spots...")
                .desired_width(360.0),
        );
        if ui
            .add_enabled(!locked, egui::Button::new("Send"))
            .clicked()
        {
            send = true;
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    if send && !locked && !chat.input.trim().is_empty() {
        let message = chat.input.trim().to_string();
        chat.input.clear();
        return Some(message);
    }

    None
}

fn render_spot(ui: &mut egui::Ui, spot: &SuggestedSpotInfo) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.label(egui::RichText::new(&spot.name).strong());
        if let (Some(url), Some(title)) = (&spot.image_url, &spot.image_title) {
            ui.hyperlink_to(format!("🖼 {title}"), url);
        }
        if let (Some(url), Some(title)) = (&spot.video_url, &spot.video_title) {
            ui.hyperlink_to(format!("▶ {title}"), url);
        }
        if let (Some(url), Some(title)) = (&spot.article_url, &spot.article_title) {
            ui.hyperlink_to(format!("🔗 {title}"), url);
        }
    });
}
