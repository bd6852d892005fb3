use super::types::{AiFeature, Destination, Trip};

/// Lệnh UI gửi xuống AI worker.
#[derive(Debug, Clone)]
pub enum AiCommand {
    /// Yêu cầu một gợi ý một-lần (activities / packing list / travel tips).
    Suggest {
        feature: AiFeature,
        trip: Trip,
        destination: Option<Destination>,
    },
    /// Mở phiên spot-finder chat mới cho cặp (trip, destination).
    /// Phiên cũ (nếu có) bị bỏ hoàn toàn.
    OpenChat {
        session_id: u64,
        trip: Trip,
        destination: Option<Destination>,
    },
    /// Gửi một lượt chat của người dùng trong phiên đang mở.
    SendChat { session_id: u64, text: String },
    /// Đóng phiên chat; kết quả đến muộn cho phiên này sẽ bị bỏ.
    CloseChat { session_id: u64 },
}
