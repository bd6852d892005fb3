use chrono::{Duration, Local, NaiveDate};

use crate::common::{AiEvent, AiFeature, ChatMessage, Destination, SuggestedSpotInfo, Trip};

const REQUIRED_FIELDS_ERROR: &str =
    "Please fill in all required fields: Name, Start Date, and End Date.";
const DATE_FORMAT_ERROR: &str = "Dates must be in YYYY-MM-DD format.";
const DATE_ORDER_ERROR: &str = "Start date cannot be after end date.";
const DESTINATION_NAME_ERROR: &str = "Please provide a destination name.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripFilter {
    All,
    Upcoming,
    Past,
}

impl TripFilter {
    pub const ALL: [TripFilter; 3] = [TripFilter::All, TripFilter::Upcoming, TripFilter::Past];

    pub fn label(&self) -> &'static str {
        match self {
            TripFilter::All => "All Trips",
            TripFilter::Upcoming => "Upcoming",
            TripFilter::Past => "Past Trips",
        }
    }
}

/// Mỗi lúc chỉ một modal được mở.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveModal {
    None,
    TripForm,
    TripDetail,
    SpotChat,
}

/// Dữ liệu đã qua validation của trip form.
#[derive(Debug, Clone, PartialEq)]
pub struct TripDraft {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: Option<String>,
}

/// Input thô của trip form. Validation xảy ra ở đây, tại ranh giới
/// nhập liệu — dữ liệu hỏng không bao giờ chạm vào state hay tầng AI.
#[derive(Debug, Clone, Default)]
pub struct TripFormState {
    /// Some(trip_id) khi đang sửa, None khi tạo mới.
    pub editing: Option<String>,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub error: Option<String>,
}

impl TripFormState {
    pub fn create(today: NaiveDate) -> Self {
        Self {
            start_date: today.to_string(),
            end_date: (today + Duration::days(7)).to_string(),
            ..Self::default()
        }
    }

    pub fn edit(trip: &Trip) -> Self {
        Self {
            editing: Some(trip.id.clone()),
            name: trip.name.clone(),
            start_date: trip.start_date.to_string(),
            end_date: trip.end_date.to_string(),
            description: trip.description.clone().unwrap_or_default(),
            error: None,
        }
    }

    pub fn validate(&self) -> Result<TripDraft, String> {
        let name = self.name.trim();
        let start_raw = self.start_date.trim();
        let end_raw = self.end_date.trim();
        if name.is_empty() || start_raw.is_empty() || end_raw.is_empty() {
            return Err(REQUIRED_FIELDS_ERROR.to_string());
        }

        let start_date = NaiveDate::parse_from_str(start_raw, "%Y-%m-%d")
            .map_err(|_| DATE_FORMAT_ERROR.to_string())?;
        let end_date = NaiveDate::parse_from_str(end_raw, "%Y-%m-%d")
            .map_err(|_| DATE_FORMAT_ERROR.to_string())?;
        if start_date > end_date {
            return Err(DATE_ORDER_ERROR.to_string());
        }

        let description = self.description.trim();
        Ok(TripDraft {
            name: name.to_string(),
            start_date,
            end_date,
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DestinationFormState {
    pub open: bool,
    pub name: String,
    pub activities: String,
    pub notes: String,
    pub error: Option<String>,
}

impl DestinationFormState {
    pub fn validate(&self) -> Result<Destination, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DESTINATION_NAME_ERROR.to_string());
        }
        let notes = self.notes.trim();
        Ok(Destination::new(
            name.to_string(),
            self.activities.trim().to_string(),
            (!notes.is_empty()).then(|| notes.to_string()),
        ))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Panel kết quả gợi ý trong trip detail.
#[derive(Debug, Clone, Default)]
pub struct SuggestionState {
    pub loading: Option<AiFeature>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Transcript của phiên spot-finder chat đang mở. Bị vứt toàn bộ khi
/// đóng — tin nhắn và spot không bao giờ được lưu.
#[derive(Debug, Clone)]
pub struct ChatState {
    pub session_id: u64,
    pub trip_id: String,
    pub location: String,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    /// Đang đợi greeting hoặc một lượt trả lời.
    pub waiting: bool,
    /// Id tin nhắn đang được enrich (hiện "Fetching details...").
    pub enriching: Option<String>,
    pub error: Option<String>,
    /// Gateway không có: trạng thái vĩnh viễn, input bị khóa.
    pub unavailable: bool,
}

impl ChatState {
    fn open(session_id: u64, trip_id: String, location: String) -> Self {
        Self {
            session_id,
            trip_id,
            location,
            messages: Vec::new(),
            input: String::new(),
            waiting: true,
            enriching: None,
            error: None,
            unavailable: false,
        }
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    fn start_stream(&mut self, message_id: String) {
        self.messages.push(ChatMessage::streaming(message_id));
    }

    /// Nối delta vào tin nhắn đang stream, theo đúng thứ tự sự kiện đến.
    fn apply_chunk(&mut self, message_id: &str, delta: &str) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            message.text.push_str(delta);
        }
    }

    fn finalize_stream(&mut self, message_id: &str, final_id: String) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            message.id = final_id;
        }
        self.waiting = false;
    }

    /// Gửi thất bại: bỏ tin nhắn dở và thay bằng một system notice.
    fn fail_stream(&mut self, message_id: Option<&str>, notice: String) {
        if let Some(id) = message_id {
            self.messages.retain(|m| m.id != id);
        }
        self.messages.push(ChatMessage::system(notice));
        self.waiting = false;
    }

    /// Gắn kết quả enrichment, chỉ khi tin nhắn vẫn còn trong transcript.
    fn attach_enrichment(&mut self, message_id: &str, spots: Vec<SuggestedSpotInfo>) {
        if self.enriching.as_deref() == Some(message_id) {
            self.enriching = None;
        }
        if spots.is_empty() {
            return;
        }
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            message.enriched = Some(spots);
        }
    }

    /// Input bị khóa khi đang đợi trả lời hoặc enrichment đang chạy.
    pub fn input_locked(&self) -> bool {
        self.waiting || self.enriching.is_some() || self.unavailable
    }
}

/// Kết quả của việc xóa một trip, cho app biết còn gì phải dọn.
#[derive(Debug, Default, PartialEq)]
pub struct TripRemoval {
    pub removed: bool,
    /// Phiên chat phải đóng vì trip nền của nó vừa bị xóa.
    pub closed_chat: Option<u64>,
}

/// Trạng thái cục bộ của UI.
pub struct AppState {
    pub trips: Vec<Trip>,
    pub dark_mode: bool,
    pub search_term: String,
    pub filter: TripFilter,
    pub modal: ActiveModal,
    pub selected_trip: Option<String>,
    /// Destination đang là tiêu điểm cho AI assistant trong detail view.
    pub focus_destination: Option<String>,
    pub trip_form: TripFormState,
    pub destination_form: DestinationFormState,
    pub suggestion: SuggestionState,
    pub chat: Option<ChatState>,
    /// Trip đang chờ xác nhận xóa.
    pub pending_delete: Option<String>,
    pub ai_available: bool,
    next_session_id: u64,
}

impl AppState {
    pub fn new(mut trips: Vec<Trip>, dark_mode: bool, ai_available: bool) -> Self {
        trips.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Self {
            trips,
            dark_mode,
            search_term: String::new(),
            filter: TripFilter::All,
            modal: ActiveModal::None,
            selected_trip: None,
            focus_destination: None,
            trip_form: TripFormState::default(),
            destination_form: DestinationFormState::default(),
            suggestion: SuggestionState::default(),
            chat: None,
            pending_delete: None,
            ai_available,
            next_session_id: 0,
        }
    }

    fn sort_trips(&mut self) {
        self.trips.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    }

    pub fn trip(&self, trip_id: &str) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.id == trip_id)
    }

    pub fn trip_mut(&mut self, trip_id: &str) -> Option<&mut Trip> {
        self.trips.iter_mut().find(|trip| trip.id == trip_id)
    }

    /// Danh sách trip sau search + filter, giữ thứ tự start_date giảm dần.
    pub fn filtered_trips(&self, today: NaiveDate) -> Vec<&Trip> {
        let needle = self.search_term.trim().to_lowercase();
        self.trips
            .iter()
            .filter(|trip| match self.filter {
                TripFilter::All => true,
                TripFilter::Upcoming => trip.end_date >= today,
                TripFilter::Past => trip.end_date < today,
            })
            .filter(|trip| {
                if needle.is_empty() {
                    return true;
                }
                trip.name.to_lowercase().contains(&needle)
                    || trip
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || trip
                        .destinations
                        .iter()
                        .any(|dest| dest.name.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn add_trip(&mut self, draft: TripDraft) -> String {
        let trip = Trip::new(draft.name, draft.start_date, draft.end_date, draft.description);
        let id = trip.id.clone();
        self.trips.insert(0, trip);
        self.sort_trips();
        id
    }

    pub fn apply_trip_edit(&mut self, trip_id: &str, draft: TripDraft) -> bool {
        let Some(trip) = self.trip_mut(trip_id) else {
            return false;
        };
        trip.name = draft.name;
        trip.start_date = draft.start_date;
        trip.end_date = draft.end_date;
        trip.description = draft.description;
        self.sort_trips();
        true
    }

    /// Xóa trip cùng mọi destination của nó. Đóng luôn detail view /
    /// phiên chat đang mở trên trip đó.
    pub fn delete_trip(&mut self, trip_id: &str) -> TripRemoval {
        let before = self.trips.len();
        self.trips.retain(|trip| trip.id != trip_id);
        if self.trips.len() == before {
            return TripRemoval::default();
        }

        if self.selected_trip.as_deref() == Some(trip_id) {
            self.selected_trip = None;
            self.focus_destination = None;
            self.suggestion = SuggestionState::default();
            if self.modal != ActiveModal::SpotChat {
                self.modal = ActiveModal::None;
            }
        }

        let closed_chat = self
            .chat
            .take_if(|chat| chat.trip_id == trip_id)
            .map(|chat| chat.session_id);
        if closed_chat.is_some() {
            self.modal = ActiveModal::None;
        }

        TripRemoval {
            removed: true,
            closed_chat,
        }
    }

    pub fn open_detail(&mut self, trip_id: &str) {
        let focus = self
            .trip(trip_id)
            .and_then(|trip| trip.destinations.first())
            .map(|dest| dest.id.clone());
        self.selected_trip = Some(trip_id.to_string());
        self.focus_destination = focus;
        self.suggestion = SuggestionState::default();
        self.destination_form.clear();
        self.modal = ActiveModal::TripDetail;
    }

    /// Destination tiêu điểm của trip đang mở, nếu còn tồn tại.
    pub fn focused_destination<'a>(&self, trip: &'a Trip) -> Option<&'a Destination> {
        let focus_id = self.focus_destination.as_deref()?;
        trip.destinations.iter().find(|dest| dest.id == focus_id)
    }

    /// Mở một phiên chat mới; mọi sự kiện của phiên trước trở nên stale.
    pub fn open_chat(&mut self, trip: &Trip, destination: Option<&Destination>) -> u64 {
        self.next_session_id += 1;
        let session_id = self.next_session_id;
        let location = trip.location_context(destination).to_string();
        self.chat = Some(ChatState::open(session_id, trip.id.clone(), location));
        self.modal = ActiveModal::SpotChat;
        session_id
    }

    /// Đóng chat. Quay lại detail view nếu trip nền còn đó; trip đã bị
    /// xóa trong lúc chat mở thì không còn ngữ cảnh nền — về danh sách.
    pub fn close_chat(&mut self) -> Option<u64> {
        let chat = self.chat.take()?;
        if self.trips.iter().any(|trip| trip.id == chat.trip_id) {
            self.selected_trip = Some(chat.trip_id);
            self.modal = ActiveModal::TripDetail;
        } else {
            self.selected_trip = None;
            self.modal = ActiveModal::None;
        }
        Some(chat.session_id)
    }

    /// Áp một sự kiện từ AI worker vào state. Sự kiện chat của phiên
    /// không còn active bị bỏ qua — đây là mô hình hủy duy nhất.
    pub fn apply_ai_event(&mut self, event: AiEvent) {
        match event {
            AiEvent::Suggestion { feature, text } => {
                if self.suggestion.loading == Some(feature) {
                    self.suggestion.loading = None;
                    self.suggestion.content = Some(text);
                }
            }
            AiEvent::MessageAdded {
                session_id,
                message,
            } => {
                if let Some(chat) = self.active_chat_mut(session_id) {
                    chat.waiting = false;
                    chat.push_message(message);
                }
            }
            AiEvent::StreamStarted {
                session_id,
                message_id,
            } => {
                if let Some(chat) = self.active_chat_mut(session_id) {
                    chat.start_stream(message_id);
                }
            }
            AiEvent::StreamChunk {
                session_id,
                message_id,
                delta,
            } => {
                if let Some(chat) = self.active_chat_mut(session_id) {
                    chat.apply_chunk(&message_id, &delta);
                }
            }
            AiEvent::StreamCompleted {
                session_id,
                message_id,
                final_id,
            } => {
                if let Some(chat) = self.active_chat_mut(session_id) {
                    chat.finalize_stream(&message_id, final_id);
                }
            }
            AiEvent::StreamFailed {
                session_id,
                message_id,
                notice,
            } => {
                if let Some(chat) = self.active_chat_mut(session_id) {
                    chat.fail_stream(message_id.as_deref(), notice);
                }
            }
            AiEvent::Enriching {
                session_id,
                message_id,
            } => {
                if let Some(chat) = self.active_chat_mut(session_id) {
                    chat.enriching = Some(message_id);
                }
            }
            AiEvent::Enriched {
                session_id,
                message_id,
                spots,
            } => {
                if let Some(chat) = self.active_chat_mut(session_id) {
                    chat.attach_enrichment(&message_id, spots);
                }
            }
            AiEvent::ChatUnavailable { session_id, reason } => {
                if let Some(chat) = self.active_chat_mut(session_id) {
                    chat.unavailable = true;
                    chat.waiting = false;
                    chat.error = Some(reason);
                }
            }
        }
    }

    fn active_chat_mut(&mut self, session_id: u64) -> Option<&mut ChatState> {
        match &self.chat {
            Some(chat) if chat.session_id == session_id => {}
            Some(chat) => {
                log::debug!(
                    "Dropped AI event for stale chat session {session_id} (active {})",
                    chat.session_id
                );
                return None;
            }
            None => {
                log::debug!("Dropped AI event for closed chat session {session_id}");
                return None;
            }
        }
        self.chat.as_mut()
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::MessageRole;

    fn draft(name: &str, start: &str, end: &str) -> TripDraft {
        TripDraft {
            name: name.to_string(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            description: None,
        }
    }

    fn state_with_trip() -> (AppState, String) {
        let mut state = AppState::new(Vec::new(), false, true);
        let trip_id = state.add_trip(draft("Japan 2025", "2025-04-01", "2025-04-10"));
        (state, trip_id)
    }

    fn open_chat(state: &mut AppState, trip_id: &str) -> u64 {
        let trip = state.trip(trip_id).unwrap().clone();
        state.open_chat(&trip, None)
    }

    #[test]
    fn form_rejects_missing_required_fields() {
        let form = TripFormState {
            name: "Japan".to_string(),
            ..TripFormState::default()
        };
        assert_eq!(form.validate(), Err(REQUIRED_FIELDS_ERROR.to_string()));
    }

    #[test]
    fn form_rejects_inverted_dates() {
        let form = TripFormState {
            name: "Japan".to_string(),
            start_date: "2025-04-10".to_string(),
            end_date: "2025-04-01".to_string(),
            ..TripFormState::default()
        };
        assert_eq!(form.validate(), Err(DATE_ORDER_ERROR.to_string()));
    }

    #[test]
    fn form_accepts_equal_dates() {
        let form = TripFormState {
            name: "Day trip".to_string(),
            start_date: "2025-04-01".to_string(),
            end_date: "2025-04-01".to_string(),
            ..TripFormState::default()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn rejected_submission_changes_no_state() {
        let (mut state, _) = state_with_trip();
        state.trip_form = TripFormState {
            name: "Bad".to_string(),
            start_date: "2025-04-10".to_string(),
            end_date: "2025-04-01".to_string(),
            ..TripFormState::default()
        };
        assert!(state.trip_form.validate().is_err());
        assert_eq!(state.trips.len(), 1);
        assert_eq!(state.trips[0].name, "Japan 2025");
    }

    #[test]
    fn trips_stay_sorted_by_start_date_descending() {
        let (mut state, _) = state_with_trip();
        state.add_trip(draft("Later", "2025-06-01", "2025-06-10"));
        state.add_trip(draft("Earlier", "2025-01-01", "2025-01-05"));
        let names: Vec<_> = state.trips.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Later", "Japan 2025", "Earlier"]);
    }

    #[test]
    fn deleting_open_trip_closes_detail_view() {
        let (mut state, trip_id) = state_with_trip();
        state.open_detail(&trip_id);
        let removal = state.delete_trip(&trip_id);
        assert!(removal.removed);
        assert_eq!(state.modal, ActiveModal::None);
        assert!(state.selected_trip.is_none());
        assert!(state.trips.is_empty());
    }

    #[test]
    fn deleting_trip_with_open_chat_closes_the_session() {
        let (mut state, trip_id) = state_with_trip();
        let session_id = open_chat(&mut state, &trip_id);
        let removal = state.delete_trip(&trip_id);
        assert_eq!(removal.closed_chat, Some(session_id));
        assert!(state.chat.is_none());
        assert_eq!(state.modal, ActiveModal::None);
    }

    #[test]
    fn search_matches_destination_names() {
        let (mut state, trip_id) = state_with_trip();
        state
            .trip_mut(&trip_id)
            .unwrap()
            .destinations
            .push(Destination::new("Kyoto".to_string(), String::new(), None));
        let today = "2025-01-01".parse().unwrap();

        state.search_term = "kyo".to_string();
        assert_eq!(state.filtered_trips(today).len(), 1);
        state.search_term = "osaka".to_string();
        assert!(state.filtered_trips(today).is_empty());
    }

    #[test]
    fn upcoming_and_past_filters_split_on_end_date() {
        let (mut state, _) = state_with_trip();
        let today: NaiveDate = "2025-04-10".parse().unwrap();
        state.filter = TripFilter::Upcoming;
        assert_eq!(state.filtered_trips(today).len(), 1);
        state.filter = TripFilter::Past;
        assert!(state.filtered_trips(today).is_empty());
    }

    #[test]
    fn stream_chunks_apply_in_order_to_one_message() {
        let (mut state, trip_id) = state_with_trip();
        let session_id = open_chat(&mut state, &trip_id);

        state.apply_ai_event(AiEvent::StreamStarted {
            session_id,
            message_id: "tmp".to_string(),
        });
        for delta in ["Visit ", "Fushimi ", "Inari"] {
            state.apply_ai_event(AiEvent::StreamChunk {
                session_id,
                message_id: "tmp".to_string(),
                delta: delta.to_string(),
            });
        }
        state.apply_ai_event(AiEvent::StreamCompleted {
            session_id,
            message_id: "tmp".to_string(),
            final_id: "final".to_string(),
        });

        let chat = state.chat.as_ref().unwrap();
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].id, "final");
        assert_eq!(chat.messages[0].text, "Visit Fushimi Inari");
        assert!(!chat.waiting);
    }

    #[test]
    fn events_for_a_closed_session_are_discarded() {
        let (mut state, trip_id) = state_with_trip();
        let stale = open_chat(&mut state, &trip_id);
        state.apply_ai_event(AiEvent::StreamStarted {
            session_id: stale,
            message_id: "tmp".to_string(),
        });
        state.close_chat();

        // chunk của phiên cũ đến muộn, rồi phiên mới được mở
        state.apply_ai_event(AiEvent::StreamChunk {
            session_id: stale,
            message_id: "tmp".to_string(),
            delta: "late".to_string(),
        });
        let fresh = open_chat(&mut state, &trip_id);
        state.apply_ai_event(AiEvent::StreamChunk {
            session_id: stale,
            message_id: "tmp".to_string(),
            delta: "later still".to_string(),
        });

        let chat = state.chat.as_ref().unwrap();
        assert_eq!(chat.session_id, fresh);
        assert!(chat.messages.is_empty(), "no partial message may survive");
    }

    #[test]
    fn failed_stream_discards_partial_and_adds_system_notice() {
        let (mut state, trip_id) = state_with_trip();
        let session_id = open_chat(&mut state, &trip_id);
        state.apply_ai_event(AiEvent::StreamStarted {
            session_id,
            message_id: "tmp".to_string(),
        });
        state.apply_ai_event(AiEvent::StreamChunk {
            session_id,
            message_id: "tmp".to_string(),
            delta: "partial".to_string(),
        });
        state.apply_ai_event(AiEvent::StreamFailed {
            session_id,
            message_id: Some("tmp".to_string()),
            notice: "Error: Could not get a response from AI.".to_string(),
        });

        let chat = state.chat.as_ref().unwrap();
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].role, MessageRole::System);
        assert!(!chat.waiting, "user may retry by submitting again");
    }

    #[test]
    fn enrichment_attaches_only_to_present_messages() {
        let (mut state, trip_id) = state_with_trip();
        let session_id = open_chat(&mut state, &trip_id);
        state.apply_ai_event(AiEvent::MessageAdded {
            session_id,
            message: ChatMessage::model("greeting".to_string()),
        });
        let message_id = state.chat.as_ref().unwrap().messages[0].id.clone();

        let spots = vec![SuggestedSpotInfo::named("Fushimi Inari Shrine")];
        state.apply_ai_event(AiEvent::Enriching {
            session_id,
            message_id: "gone".to_string(),
        });
        state.apply_ai_event(AiEvent::Enriched {
            session_id,
            message_id: "gone".to_string(),
            spots: spots.clone(),
        });
        assert!(
            state.chat.as_ref().unwrap().messages[0].enriched.is_none(),
            "missing message id must not attach anywhere"
        );

        state.apply_ai_event(AiEvent::Enriched {
            session_id,
            message_id: message_id.clone(),
            spots,
        });
        let attached = state.chat.as_ref().unwrap().messages[0].enriched.as_ref();
        assert_eq!(attached.unwrap()[0].name, "Fushimi Inari Shrine");
    }

    #[test]
    fn empty_enrichment_clears_the_spinner() {
        let (mut state, trip_id) = state_with_trip();
        let session_id = open_chat(&mut state, &trip_id);
        state.apply_ai_event(AiEvent::MessageAdded {
            session_id,
            message: ChatMessage::model("greeting".to_string()),
        });
        let message_id = state.chat.as_ref().unwrap().messages[0].id.clone();

        state.apply_ai_event(AiEvent::Enriching {
            session_id,
            message_id: message_id.clone(),
        });
        assert!(state.chat.as_ref().unwrap().input_locked());

        state.apply_ai_event(AiEvent::Enriched {
            session_id,
            message_id,
            spots: Vec::new(),
        });
        let chat = state.chat.as_ref().unwrap();
        assert!(chat.enriching.is_none());
        assert!(chat.messages[0].enriched.is_none());
    }

    #[test]
    fn closing_chat_returns_to_detail_while_trip_exists() {
        let (mut state, trip_id) = state_with_trip();
        open_chat(&mut state, &trip_id);
        state.close_chat();
        assert_eq!(state.modal, ActiveModal::TripDetail);
        assert_eq!(state.selected_trip.as_deref(), Some(trip_id.as_str()));
    }

    #[test]
    fn closing_chat_after_trip_deletion_signals_no_context() {
        let (mut state, trip_id) = state_with_trip();
        open_chat(&mut state, &trip_id);
        // xóa trip ngay dưới chân phiên chat
        state.trips.clear();
        state.close_chat();
        assert_eq!(state.modal, ActiveModal::None);
        assert!(state.selected_trip.is_none());
    }
}
