use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{AiCommand, AiEvent, AiFeature, ChatMessage, Trip};
use crate::storage::TripStore;

use super::components::{
    assistant_panel::{self, AssistantAction},
    chat_view, trip_detail,
    trip_form::{self, TripFormAction},
    trip_list,
};
use super::state::{ActiveModal, AppState, TripFormState};

pub struct TripPlannerApp {
    state: AppState,
    store: TripStore,
    command_sender: mpsc::Sender<AiCommand>,
    event_receiver: mpsc::Receiver<AiEvent>,
}

impl TripPlannerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        store: TripStore,
        command_sender: mpsc::Sender<AiCommand>,
        event_receiver: mpsc::Receiver<AiEvent>,
        ai_available: bool,
    ) -> Self {
        // Store chỉ đọc một lần lúc khởi động; về sau chỉ ghi khi có mutation.
        let trips = store.load_trips();
        let dark_mode = store.dark_mode();
        Self {
            state: AppState::new(trips, dark_mode, ai_available),
            store,
            command_sender,
            event_receiver,
        }
    }

    fn handle_ai_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.apply_ai_event(event);
        }
    }

    fn send_command(&self, command: AiCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to AI worker: {err}");
        }
    }

    fn persist_trips(&self) {
        if let Err(err) = self.store.save_trips(&self.state.trips) {
            log::error!("Failed to persist trips: {err}");
        }
    }

    fn request_suggestion(&mut self, feature: AiFeature, trip: Trip) {
        let destination = self.state.focused_destination(&trip).cloned();
        let location = trip.location_context(destination.as_ref()).to_string();
        let title = match feature {
            AiFeature::SuggestActivities => format!("Activity Ideas for {location}"),
            AiFeature::PackingList => format!("Packing List for {}", trip.name),
            AiFeature::TravelTips => format!("Travel Tips for {location}"),
        };
        self.state.suggestion.loading = Some(feature);
        self.state.suggestion.title = Some(title);
        self.state.suggestion.content = None;
        self.send_command(AiCommand::Suggest {
            feature,
            trip,
            destination,
        });
    }

    fn open_chat(&mut self, trip: Trip) {
        let destination = self.state.focused_destination(&trip).cloned();
        let session_id = self.state.open_chat(&trip, destination.as_ref());
        self.send_command(AiCommand::OpenChat {
            session_id,
            trip,
            destination,
        });
    }

    fn show_trip_form(&mut self, ctx: &egui::Context) {
        let editing = self.state.trip_form.editing.clone();
        let title = if editing.is_some() {
            "Edit Trip"
        } else {
            "Create New Trip"
        };

        let mut open = true;
        let action = egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| trip_form::render(ui, &mut self.state.trip_form))
            .and_then(|response| response.inner);

        match action {
            Some(TripFormAction::Submit(draft)) => {
                match editing {
                    Some(trip_id) => {
                        self.state.apply_trip_edit(&trip_id, draft);
                    }
                    None => {
                        self.state.add_trip(draft);
                    }
                }
                self.persist_trips();
                self.state.modal = ActiveModal::None;
            }
            Some(TripFormAction::Cancel) => self.state.modal = ActiveModal::None,
            Some(TripFormAction::None) | None => {}
        }
        if !open {
            self.state.modal = ActiveModal::None;
        }
    }

    fn show_trip_detail(&mut self, ctx: &egui::Context) {
        let trip = self
            .state
            .selected_trip
            .as_deref()
            .and_then(|id| self.state.trip(id))
            .cloned();
        let Some(trip) = trip else {
            self.state.modal = ActiveModal::None;
            return;
        };

        let has_focus_destination = self.state.focused_destination(&trip).is_some();
        let ai_available = self.state.ai_available;

        let mut open = true;
        let result = egui::Window::new(format!("{} - Details", trip.name))
            .collapsible(false)
            .default_width(460.0)
            .open(&mut open)
            .show(ctx, |ui| {
                let detail = trip_detail::render(
                    ui,
                    &trip,
                    self.state.focus_destination.as_deref(),
                    &mut self.state.destination_form,
                );
                let assistant = assistant_panel::render(
                    ui,
                    &mut self.state.suggestion,
                    ai_available,
                    has_focus_destination,
                );
                (detail, assistant)
            })
            .and_then(|response| response.inner);

        if let Some((detail, assistant)) = result {
            if let Some(destination) = detail.add_destination {
                let destination_id = destination.id.clone();
                if let Some(current) = self.state.trip_mut(&trip.id) {
                    current.destinations.push(destination);
                }
                if self.state.focus_destination.is_none() {
                    self.state.focus_destination = Some(destination_id);
                }
                self.persist_trips();
            }
            if let Some(destination_id) = detail.remove_destination {
                if let Some(current) = self.state.trip_mut(&trip.id) {
                    current.destinations.retain(|dest| dest.id != destination_id);
                }
                if self.state.focus_destination.as_deref() == Some(destination_id.as_str()) {
                    self.state.focus_destination = self
                        .state
                        .trip(&trip.id)
                        .and_then(|current| current.destinations.first())
                        .map(|dest| dest.id.clone());
                }
                self.persist_trips();
            }
            if let Some(destination_id) = detail.focus_destination {
                self.state.focus_destination = Some(destination_id);
            }
            if detail.delete_trip {
                self.state.pending_delete = Some(trip.id.clone());
            }

            match assistant {
                Some(AssistantAction::Feature(feature)) => {
                    if let Some(current) = self.state.trip(&trip.id).cloned() {
                        self.request_suggestion(feature, current);
                    }
                }
                Some(AssistantAction::OpenChat) => {
                    if let Some(current) = self.state.trip(&trip.id).cloned() {
                        self.open_chat(current);
                    }
                }
                None => {}
            }
        }

        if !open && self.state.modal == ActiveModal::TripDetail {
            self.state.modal = ActiveModal::None;
            self.state.selected_trip = None;
        }
    }

    fn show_chat(&mut self, ctx: &egui::Context) {
        let Some(location) = self.state.chat.as_ref().map(|chat| chat.location.clone()) else {
            self.state.modal = ActiveModal::None;
            return;
        };

        let mut open = true;
        let submitted = egui::Window::new(format!("AI Spot Finder: {location}"))
            .collapsible(false)
            .default_width(420.0)
            .open(&mut open)
            .show(ctx, |ui| {
                self.state
                    .chat
                    .as_mut()
                    .and_then(|chat| chat_view::render(ui, chat))
            })
            .and_then(|response| response.inner.flatten());

        if let Some(text) = submitted {
            let command = self.state.chat.as_mut().map(|chat| {
                chat.push_message(ChatMessage::user(text.clone()));
                chat.waiting = true;
                chat.error = None;
                AiCommand::SendChat {
                    session_id: chat.session_id,
                    text,
                }
            });
            if let Some(command) = command {
                self.send_command(command);
            }
        }

        if !open {
            if let Some(session_id) = self.state.close_chat() {
                self.send_command(AiCommand::CloseChat { session_id });
            }
        }
    }

    fn show_delete_confirm(&mut self, ctx: &egui::Context) {
        let Some(trip_id) = self.state.pending_delete.clone() else {
            return;
        };
        let Some(trip_name) = self.state.trip(&trip_id).map(|trip| trip.name.clone()) else {
            self.state.pending_delete = None;
            return;
        };

        egui::Window::new("Delete Trip")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Are you sure you want to delete this trip and all its data?");
                ui.label(egui::RichText::new(trip_name).strong());
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        self.state.pending_delete = None;
                    }
                    if ui.button("Delete").clicked() {
                        self.state.pending_delete = None;
                        let removal = self.state.delete_trip(&trip_id);
                        if removal.removed {
                            self.persist_trips();
                        }
                        if let Some(session_id) = removal.closed_chat {
                            self.send_command(AiCommand::CloseChat { session_id });
                        }
                    }
                });
            });
    }
}

impl eframe::App for TripPlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_ai_events();

        ctx.set_visuals(if self.state.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("AI Trip Planner");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mode_label = if self.state.dark_mode {
                        "☀ Light"
                    } else {
                        "🌙 Dark"
                    };
                    if ui.button(mode_label).clicked() {
                        self.state.dark_mode = !self.state.dark_mode;
                        if let Err(err) = self.store.set_dark_mode(self.state.dark_mode) {
                            log::warn!("Failed to persist dark mode flag: {err}");
                        }
                    }
                    if ui.button("New Trip").clicked() {
                        self.state.trip_form = TripFormState::create(AppState::today());
                        self.state.modal = ActiveModal::TripForm;
                    }
                });
            });
        });

        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| trip_list::render(ui, &mut self.state))
            .inner;

        if let Some(trip_id) = actions.view {
            self.state.open_detail(&trip_id);
        }
        if let Some(trip_id) = actions.edit {
            let form = self.state.trip(&trip_id).map(TripFormState::edit);
            if let Some(form) = form {
                self.state.trip_form = form;
                self.state.modal = ActiveModal::TripForm;
            }
        }
        if let Some(trip_id) = actions.delete {
            self.state.pending_delete = Some(trip_id);
        }

        match self.state.modal {
            ActiveModal::TripForm => self.show_trip_form(ctx),
            ActiveModal::TripDetail => self.show_trip_detail(ctx),
            ActiveModal::SpotChat => self.show_chat(ctx),
            ActiveModal::None => {}
        }

        self.show_delete_confirm(ctx);

        // Sự kiện từ worker có thể đến bất cứ lúc nào; giữ vòng repaint chạy
        ctx.request_repaint();
    }
}
