use super::types::{AiFeature, ChatMessage, SuggestedSpotInfo};

/// Sự kiện từ AI worker gửi lên UI.
/// Sự kiện chat nào cũng mang session_id; UI bỏ qua sự kiện
/// của phiên không còn active.
#[derive(Debug, Clone)]
pub enum AiEvent {
    /// Kết quả (hoặc chuỗi xin lỗi) của một yêu cầu gợi ý.
    Suggestion { feature: AiFeature, text: String },
    /// Một tin nhắn hoàn chỉnh được thêm vào transcript (greeting, system notice).
    MessageAdded {
        session_id: u64,
        message: ChatMessage,
    },
    /// Bắt đầu stream một tin nhắn model mới, rỗng.
    StreamStarted { session_id: u64, message_id: String },
    /// Một đoạn text nối vào tin nhắn đang stream, theo thứ tự đến.
    StreamChunk {
        session_id: u64,
        message_id: String,
        delta: String,
    },
    /// Stream kết thúc; tin nhắn nhận id cuối cùng.
    StreamCompleted {
        session_id: u64,
        message_id: String,
        final_id: String,
    },
    /// Gửi thất bại: bỏ tin nhắn dở (nếu có) và thêm một system notice.
    StreamFailed {
        session_id: u64,
        message_id: Option<String>,
        notice: String,
    },
    /// Enrichment cho tin nhắn này đang chạy (UI hiện "Fetching details...").
    Enriching { session_id: u64, message_id: String },
    /// Enrichment xong. `spots` rỗng nghĩa là không có gì để gắn.
    Enriched {
        session_id: u64,
        message_id: String,
        spots: Vec<SuggestedSpotInfo>,
    },
    /// Phiên chat không mở được vì gateway không khả dụng (trạng thái vĩnh viễn).
    ChatUnavailable { session_id: u64, reason: String },
}
