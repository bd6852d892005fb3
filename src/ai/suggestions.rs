use crate::common::{AiFeature, Destination, Trip};

use super::gateway::Gateway;

/// Trả lời cố định khi gọi Suggest Activities mà chưa chọn destination.
pub const ACTIVITIES_REFUSAL: &str = "Please select a destination to suggest activities for.";
/// Chuỗi xin lỗi cố định khi gateway lỗi; không bao giờ ném lỗi ra ngoài.
pub const SUGGESTION_APOLOGY: &str = "Sorry, I couldn't generate a response. Please try again.";

/// Dựng prompt cho một tính năng gợi ý. Err là chuỗi từ chối
/// hiển thị thẳng cho người dùng, và nghĩa là không gọi gateway.
pub fn build_suggestion_prompt(
    feature: AiFeature,
    trip: &Trip,
    destination: Option<&Destination>,
) -> Result<String, String> {
    match feature {
        AiFeature::SuggestActivities => {
            let Some(destination) = destination else {
                return Err(ACTIVITIES_REFUSAL.to_string());
            };
            Ok(format!(
                "Suggest 5 unique and interesting activities for a trip to {}. \
                 Consider a variety of interests. The trip is from {} to {}. \
                 Format as a numbered list.",
                destination.name, trip.start_date, trip.end_date
            ))
        }
        AiFeature::PackingList => {
            let destinations = trip
                .destinations
                .iter()
                .map(|dest| dest.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let target = if destinations.is_empty() {
                trip.name.as_str()
            } else {
                destinations.as_str()
            };
            Ok(format!(
                "Generate a comprehensive packing list for a trip to {} from {} to {}. \
                 Include categories like Clothing, Toiletries, Documents, Electronics, \
                 and Miscellaneous. Be specific.",
                target, trip.start_date, trip.end_date
            ))
        }
        AiFeature::TravelTips => Ok(format!(
            "Provide 5 essential travel tips for visiting {}. Focus on safety, \
             local customs, and making the most of the trip. Format as a bulleted list.",
            trip.location_context(destination)
        )),
    }
}

/// Suggestion dispatcher: dựng prompt, gọi gateway một lần, trả text nguyên văn.
/// Mọi lỗi gateway được nuốt thành chuỗi xin lỗi.
pub async fn suggest(
    gateway: &Gateway,
    feature: AiFeature,
    trip: &Trip,
    destination: Option<&Destination>,
) -> String {
    let prompt = match build_suggestion_prompt(feature, trip, destination) {
        Ok(prompt) => prompt,
        Err(refusal) => return refusal,
    };

    match gateway.generate_text(&prompt).await {
        Ok(text) => text,
        Err(err) => {
            log::error!("Suggestion request ({}) failed: {err}", feature.label());
            SUGGESTION_APOLOGY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trip(destinations: &[&str]) -> Trip {
        let mut trip = Trip::new(
            "Japan 2025".to_string(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            None,
        );
        trip.destinations = destinations
            .iter()
            .map(|name| Destination::new(name.to_string(), String::new(), None))
            .collect();
        trip
    }

    #[test]
    fn activities_without_destination_is_refused() {
        let result = build_suggestion_prompt(AiFeature::SuggestActivities, &trip(&["Kyoto"]), None);
        assert_eq!(result, Err(ACTIVITIES_REFUSAL.to_string()));
    }

    #[test]
    fn activities_prompt_names_the_destination_and_dates() {
        let trip = trip(&["Kyoto"]);
        let kyoto = trip.destinations[0].clone();
        let prompt =
            build_suggestion_prompt(AiFeature::SuggestActivities, &trip, Some(&kyoto)).unwrap();
        assert!(prompt.contains("Kyoto"));
        assert!(prompt.contains("2025-04-01"));
        assert!(prompt.contains("2025-04-10"));
    }

    #[test]
    fn packing_list_for_trip_without_destinations_uses_trip_name() {
        let prompt = build_suggestion_prompt(AiFeature::PackingList, &trip(&[]), None).unwrap();
        assert!(prompt.contains("Japan 2025"));
        assert!(prompt.contains("from 2025-04-01 to 2025-04-10"));
    }

    #[test]
    fn packing_list_joins_all_destinations() {
        let prompt =
            build_suggestion_prompt(AiFeature::PackingList, &trip(&["Tokyo", "Kyoto"]), None)
                .unwrap();
        assert!(prompt.contains("Tokyo, Kyoto"));
    }

    #[test]
    fn travel_tips_follow_the_location_context() {
        let trip = trip(&["Tokyo", "Kyoto"]);
        let kyoto = trip.destinations[1].clone();
        let with_focus =
            build_suggestion_prompt(AiFeature::TravelTips, &trip, Some(&kyoto)).unwrap();
        assert!(with_focus.contains("visiting Kyoto"));

        let without_focus = build_suggestion_prompt(AiFeature::TravelTips, &trip, None).unwrap();
        assert!(without_focus.contains("visiting Tokyo"));
    }
}
