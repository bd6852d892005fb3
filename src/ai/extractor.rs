use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::gateway::Gateway;

/// Tối đa bao nhiêu spot được giữ lại cho enrichment.
pub const MAX_SPOTS: usize = 5;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").unwrap());

#[derive(Debug, Deserialize)]
struct SpotName {
    name: String,
}

fn extraction_prompt(text: &str) -> String {
    format!(
        "From the following text, identify all distinct tourist spots, landmarks, \
         or points of interest explicitly mentioned as suggestions.\n\
         Text:\n'''\n{text}\n'''\n\
         Respond ONLY with a JSON array of objects, where each object has a 'name' \
         field. Each name should be concise and suitable for a web search. If no \
         specific spots are clearly suggested as points of interest, return an \
         empty array. Example: [{{\"name\": \"Eiffel Tower\"}}, {{\"name\": \"Louvre \
         Museum\"}}, {{\"name\": \"Sacré-Cœur Basilica\"}}]"
    )
}

/// Bóc lớp ``` fence nếu model bọc JSON trong đó; không có fence thì trả nguyên văn.
pub fn strip_code_fence(raw: &str) -> &str {
    match FENCE_RE.captures(raw) {
        Some(caps) => caps.get(2).map(|m| m.as_str()).unwrap_or(raw),
        None => raw,
    }
}

/// Parse khoan dung hai bước: bóc fence rồi parse chặt bằng serde.
/// Parse hỏng kiểu gì cũng trả danh sách rỗng, không bao giờ lỗi.
/// Kết quả được lọc (tên dài hơn 2 ký tự) và cắt còn tối đa 5.
pub fn parse_spot_names(raw: &str) -> Vec<String> {
    let cleaned = strip_code_fence(raw.trim());
    match serde_json::from_str::<Vec<SpotName>>(cleaned) {
        Ok(spots) => spots
            .into_iter()
            .map(|spot| spot.name)
            .filter(|name| name.chars().count() > 2)
            .take(MAX_SPOTS)
            .collect(),
        Err(err) => {
            log::warn!("Could not parse spot names from AI response: {err}");
            Vec::new()
        }
    }
}

/// Spot-name extractor: một lời gọi structured-output duy nhất.
/// Lỗi gateway cũng chỉ nghĩa là "không có ứng viên".
pub async fn extract_spot_names(gateway: &Gateway, text: &str) -> Vec<String> {
    match gateway.generate_json(&extraction_prompt(text)).await {
        Ok(raw) => parse_spot_names(&raw),
        Err(err) => {
            log::warn!("Spot extraction failed: {err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_array_parses() {
        let names = parse_spot_names(r#"[{"name": "Fushimi Inari Shrine"}]"#);
        assert_eq!(names, vec!["Fushimi Inari Shrine"]);
    }

    #[test]
    fn fenced_payload_is_unwrapped() {
        let raw = "```json\n[{\"name\": \"Eiffel Tower\"}, {\"name\": \"Louvre Museum\"}]\n```";
        let names = parse_spot_names(raw);
        assert_eq!(names, vec!["Eiffel Tower", "Louvre Museum"]);
    }

    #[test]
    fn fence_without_language_tag_is_unwrapped() {
        assert_eq!(
            strip_code_fence("```\n[{\"name\": \"Alhambra\"}]\n```"),
            "[{\"name\": \"Alhambra\"}]"
        );
    }

    #[test]
    fn unfenced_text_is_untouched() {
        assert_eq!(strip_code_fence("[1, 2, 3]"), "[1, 2, 3]");
    }

    #[test]
    fn malformed_json_yields_no_candidates() {
        assert!(parse_spot_names("not json at all").is_empty());
        assert!(parse_spot_names(r#"{"name": "an object, not an array"}"#).is_empty());
        assert!(parse_spot_names(r#"[{"title": "missing name field"}]"#).is_empty());
    }

    #[test]
    fn short_names_are_filtered_out() {
        let names = parse_spot_names(r#"[{"name": "Fuji"}, {"name": "ab"}, {"name": ""}]"#);
        assert_eq!(names, vec!["Fuji"]);
    }

    #[test]
    fn candidates_are_capped_at_five() {
        let raw = r#"[
            {"name": "Spot One"}, {"name": "Spot Two"}, {"name": "Spot Three"},
            {"name": "Spot Four"}, {"name": "Spot Five"}, {"name": "Spot Six"},
            {"name": "Spot Seven"}
        ]"#;
        assert_eq!(parse_spot_names(raw).len(), MAX_SPOTS);
    }

    #[test]
    fn extraction_prompt_embeds_the_source_text() {
        let prompt = extraction_prompt("Visit the Fushimi Inari Shrine at dawn.");
        assert!(prompt.contains("Fushimi Inari Shrine"));
        assert!(prompt.contains("JSON array"));
    }
}
