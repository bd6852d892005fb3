use futures::StreamExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::common::{AiCommand, AiEvent, AiFeature, ChatMessage, Destination, Trip};

use super::enricher::enrich_spots;
use super::extractor::extract_spot_names;
use super::gateway::{ChatSession, Gateway, GatewayError};
use super::suggestions::suggest;

const CHAT_UNAVAILABLE: &str = "AI Service not available. Chatbot features are disabled.";
const GREETING_FAILED: &str = "Sorry, I couldn't start our conversation. Please try again.";
const SEND_FAILED: &str =
    "Error: Could not get a response from AI. Please check your connection or try again.";

fn system_instruction(location: &str) -> String {
    format!(
        "You are a friendly and expert AI Tour Guide for {location}.\n\
         Your goal is to suggest famous spots, hidden gems, landmarks, and points of \
         interest. Please provide a short description for each.\n\
         Encourage the user to specify their interests (e.g., history, art, nature, \
         food, adventure) or mood (e.g., relaxing, lively, family-friendly) for more \
         tailored suggestions. If they don't specify, provide a mix of popular and \
         lesser-known options.\n\
         When suggesting spots, list them clearly using markdown bullet points for \
         each spot name. For example:\n\
         *   [Spot Name 1]: [Short Description]\n\
         *   [Spot Name 2]: [Short Description]\n\
         Keep your responses concise and engaging.\n\
         Start by greeting the user and asking how you can help them find interesting \
         spots in {location}, or if they'd like some initial general suggestions."
    )
}

fn greeting_prompt(location: &str) -> String {
    format!(
        "Hello! I'm your AI Tour Guide for {location}. What kind of famous spots or \
         activities are you interested in discovering today? Or would you like some \
         general suggestions to start with?"
    )
}

struct ActiveChat {
    session_id: u64,
    session: ChatSession,
}

/// AI worker: chạy trên một task tokio, nhận lệnh từ UI và đẩy sự kiện
/// ngược lại. Xử lý lệnh tuần tự — mỗi thực thể trong bộ nhớ chỉ có một
/// writer tại một thời điểm.
pub struct AiWorker {
    event_sender: mpsc::Sender<AiEvent>,
    command_receiver: mpsc::Receiver<AiCommand>,
    gateway: Option<Gateway>,
    active_chat: Option<ActiveChat>,
}

impl AiWorker {
    pub fn new(
        event_sender: mpsc::Sender<AiEvent>,
        command_receiver: mpsc::Receiver<AiCommand>,
        gateway: Option<Gateway>,
    ) -> Self {
        Self {
            event_sender,
            command_receiver,
            gateway,
            active_chat: None,
        }
    }

    pub async fn run(mut self) {
        log::info!(
            "AI worker started (gateway {})",
            if self.gateway.is_some() {
                "configured"
            } else {
                "unavailable"
            }
        );

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command).await;
        }

        log::info!("Command channel closed; AI worker stopping");
    }

    async fn handle_command(&mut self, command: AiCommand) {
        match command {
            AiCommand::Suggest {
                feature,
                trip,
                destination,
            } => {
                self.handle_suggest(feature, trip, destination).await;
            }
            AiCommand::OpenChat {
                session_id,
                trip,
                destination,
            } => {
                self.handle_open_chat(session_id, trip, destination).await;
            }
            AiCommand::SendChat { session_id, text } => {
                self.handle_send_chat(session_id, text).await;
            }
            AiCommand::CloseChat { session_id } => {
                let closed = self
                    .active_chat
                    .take_if(|active| active.session_id == session_id);
                if closed.is_some() {
                    log::info!("Chat session {session_id} closed");
                }
            }
        }
    }

    async fn emit(&self, event: AiEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to emit AI event to UI: {err}");
        }
    }

    async fn handle_suggest(
        &mut self,
        feature: AiFeature,
        trip: Trip,
        destination: Option<Destination>,
    ) {
        let text = match self.gateway.as_ref() {
            Some(gateway) => suggest(gateway, feature, &trip, destination.as_ref()).await,
            None => GatewayError::MissingApiKey.to_string(),
        };
        self.emit(AiEvent::Suggestion { feature, text }).await;
    }

    async fn handle_open_chat(
        &mut self,
        session_id: u64,
        trip: Trip,
        destination: Option<Destination>,
    ) {
        // Mở phiên mới bỏ hẳn phiên cũ; lịch sử không bao giờ được resume.
        self.active_chat = None;

        let Some(gateway) = self.gateway.as_ref() else {
            self.emit(AiEvent::ChatUnavailable {
                session_id,
                reason: CHAT_UNAVAILABLE.to_string(),
            })
            .await;
            return;
        };

        let location = trip.location_context(destination.as_ref()).to_string();
        log::info!("Opening chat session {session_id} for {location:?}");

        let mut session = gateway.start_chat(system_instruction(&location));
        let greeting = session.send(&greeting_prompt(&location)).await;
        self.active_chat = Some(ActiveChat {
            session_id,
            session,
        });

        match greeting {
            Ok(reply) => {
                let message = ChatMessage::model(reply.clone());
                let message_id = message.id.clone();
                self.emit(AiEvent::MessageAdded {
                    session_id,
                    message,
                })
                .await;
                self.enrich_message(session_id, message_id, &reply).await;
            }
            Err(err) => {
                log::error!("Failed to start chat conversation: {err}");
                // Phiên vẫn mở; người dùng gõ tin nhắn là một lần thử lại.
                self.emit(AiEvent::StreamFailed {
                    session_id,
                    message_id: None,
                    notice: GREETING_FAILED.to_string(),
                })
                .await;
            }
        }
    }

    async fn handle_send_chat(&mut self, session_id: u64, text: String) {
        let Some(active) = self.active_chat.as_ref() else {
            log::debug!("SendChat for session {session_id} with no active chat; dropped");
            return;
        };
        if active.session_id != session_id {
            log::debug!(
                "SendChat for stale session {session_id} (active {}); dropped",
                active.session_id
            );
            return;
        }

        let message_id = Uuid::new_v4().to_string();
        self.emit(AiEvent::StreamStarted {
            session_id,
            message_id: message_id.clone(),
        })
        .await;

        let stream = match active.session.send_streaming(&text).await {
            Ok(stream) => stream,
            Err(err) => {
                log::error!("Failed to send chat message: {err}");
                self.emit(AiEvent::StreamFailed {
                    session_id,
                    message_id: Some(message_id),
                    notice: SEND_FAILED.to_string(),
                })
                .await;
                return;
            }
        };

        let mut stream = stream;
        let mut accumulated = String::new();
        let mut stream_error = None;
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(delta) => {
                    accumulated.push_str(&delta);
                    self.emit(AiEvent::StreamChunk {
                        session_id,
                        message_id: message_id.clone(),
                        delta,
                    })
                    .await;
                }
                Err(err) => {
                    stream_error = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = stream_error {
            log::error!("Chat stream aborted: {err}");
            self.emit(AiEvent::StreamFailed {
                session_id,
                message_id: Some(message_id),
                notice: SEND_FAILED.to_string(),
            })
            .await;
            return;
        }

        // Turn trọn vẹn: ghi vào lịch sử phiên rồi chốt id tin nhắn.
        if let Some(active) = self.active_chat.as_mut() {
            if active.session_id == session_id {
                active.session.commit_turn(&text, &accumulated);
            }
        }

        let final_id = Uuid::new_v4().to_string();
        self.emit(AiEvent::StreamCompleted {
            session_id,
            message_id,
            final_id: final_id.clone(),
        })
        .await;

        if !accumulated.trim().is_empty() {
            self.enrich_message(session_id, final_id, &accumulated).await;
        }
    }

    /// Enrichment sau khi một tin nhắn model hoàn tất: trích tên spot,
    /// rồi tra cứu grounded từng spot một. `spots` rỗng báo cho UI biết
    /// enrichment đã xong mà không có gì để gắn.
    async fn enrich_message(&self, session_id: u64, message_id: String, text: &str) {
        let Some(gateway) = self.gateway.as_ref() else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }

        self.emit(AiEvent::Enriching {
            session_id,
            message_id: message_id.clone(),
        })
        .await;

        let names = extract_spot_names(gateway, text).await;
        let spots = if names.is_empty() {
            Vec::new()
        } else {
            enrich_spots(gateway, &names).await.unwrap_or_default()
        };

        self.emit(AiEvent::Enriched {
            session_id,
            message_id,
            spots,
        })
        .await;
    }
}
