use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain model đại diện một chuyến đi.
/// Invariant: start_date <= end_date (kiểm tra ở form, không kiểm tra lại ở đây).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl Trip {
    pub fn new(
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            start_date,
            end_date,
            description,
            destinations: Vec::new(),
        }
    }

    /// Địa điểm dùng làm ngữ cảnh cho AI: destination được chọn,
    /// nếu không có thì destination đầu tiên, cuối cùng là tên chuyến đi.
    pub fn location_context<'a>(&'a self, destination: Option<&'a Destination>) -> &'a str {
        destination
            .map(|dest| dest.name.as_str())
            .or_else(|| self.destinations.first().map(|dest| dest.name.as_str()))
            .unwrap_or(&self.name)
    }
}

/// Một điểm đến bên trong chuyến đi.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub activities: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Destination {
    pub fn new(name: String, activities: String, notes: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            activities,
            notes,
        }
    }
}

/// Các tính năng gợi ý một-lần (chat là surface riêng).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiFeature {
    SuggestActivities,
    PackingList,
    TravelTips,
}

impl AiFeature {
    pub fn label(&self) -> &'static str {
        match self {
            AiFeature::SuggestActivities => "Suggest Activities",
            AiFeature::PackingList => "Generate Packing List",
            AiFeature::TravelTips => "Travel Tips",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Model,
    System,
}

/// Một tin nhắn trong phiên chat. Chỉ sống trong bộ nhớ phiên,
/// không bao giờ được lưu xuống store.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub enriched: Option<Vec<SuggestedSpotInfo>>,
}

impl ChatMessage {
    fn with_role(role: MessageRole, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text,
            timestamp: Utc::now(),
            enriched: None,
        }
    }

    pub fn user(text: String) -> Self {
        Self::with_role(MessageRole::User, text)
    }

    pub fn model(text: String) -> Self {
        Self::with_role(MessageRole::Model, text)
    }

    pub fn system(text: String) -> Self {
        Self::with_role(MessageRole::System, text)
    }

    /// Placeholder cho tin nhắn model đang stream; text được nối dần,
    /// id sẽ được thay khi stream kết thúc.
    pub fn streaming(id: String) -> Self {
        Self {
            id,
            role: MessageRole::Model,
            text: String::new(),
            timestamp: Utc::now(),
            enriched: None,
        }
    }
}

/// Link ảnh / video / bài viết tìm được cho một spot.
/// Bất biến sau khi gắn vào tin nhắn.
#[derive(Debug, Clone, Default)]
pub struct SuggestedSpotInfo {
    pub name: String,
    pub image_url: Option<String>,
    pub image_title: Option<String>,
    pub video_url: Option<String>,
    pub video_title: Option<String>,
    pub article_url: Option<String>,
    pub article_title: Option<String>,
}

impl SuggestedSpotInfo {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn has_links(&self) -> bool {
        self.image_url.is_some() || self.video_url.is_some() || self.article_url.is_some()
    }
}
