use std::sync::LazyLock;

use regex::Regex;

use crate::common::SuggestedSpotInfo;

use super::extractor::MAX_SPOTS;
use super::gateway::{Citation, Gateway};

static IMAGE_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpeg|jpg|gif|png|webp)$").unwrap());
static VIDEO_HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)youtube\.com|youtu\.be").unwrap());
static VIDEO_WATCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)youtube\.com/watch\?v=|youtu\.be/").unwrap());

fn search_prompt(name: &str) -> String {
    format!(
        "Find a relevant public image URL, a YouTube video URL, and an informative \
         article URL for \"{name}\". Prioritize official or highly reputable travel sources."
    )
}

/// Ảnh: có đuôi file ảnh VÀ không phải URL video-hosting.
/// Bất biến: is_image_url(url) kéo theo !is_video_host(url).
pub fn is_image_url(url: &str) -> bool {
    url.starts_with("http") && IMAGE_EXT_RE.is_match(url) && !VIDEO_HOST_RE.is_match(url)
}

/// Video: khớp pattern trang xem video đã biết.
pub fn is_video_url(url: &str) -> bool {
    url.starts_with("http") && VIDEO_WATCH_RE.is_match(url)
}

/// Phân loại citation cho một spot: mỗi loại giữ tối đa một link,
/// link đầu tiên khớp sẽ thắng. Article loại trừ URL đã bị nhận là
/// ảnh/video của chính spot này. Không có link nào đạt thì trả None.
pub fn classify_citations(name: &str, citations: &[Citation]) -> Option<SuggestedSpotInfo> {
    let mut spot = SuggestedSpotInfo::named(name);

    for citation in citations {
        if spot.image_url.is_none() && is_image_url(&citation.url) {
            spot.image_url = Some(citation.url.clone());
            spot.image_title = Some(
                citation
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("{name} Image")),
            );
        }
    }

    for citation in citations {
        if spot.video_url.is_none() && is_video_url(&citation.url) {
            spot.video_url = Some(citation.url.clone());
            spot.video_title = Some(
                citation
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("{name} on YouTube")),
            );
        }
    }

    for citation in citations {
        let url = citation.url.as_str();
        let claimed = spot.image_url.as_deref() == Some(url)
            || spot.video_url.as_deref() == Some(url);
        if spot.article_url.is_none()
            && url.starts_with("http")
            && !IMAGE_EXT_RE.is_match(url)
            && !VIDEO_HOST_RE.is_match(url)
            && !claimed
        {
            spot.article_url = Some(url.to_string());
            spot.article_title = Some(
                citation
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("Read more about {name}")),
            );
        }
    }

    if spot.has_links() { Some(spot) } else { None }
}

/// Spot enricher: mỗi ứng viên một lời gọi grounded-search, tuần tự theo
/// thứ tự danh sách. Một lookup hỏng chỉ làm rơi ứng viên đó, không làm
/// hỏng các ứng viên còn lại. Tất cả đều rơi thì trả None.
pub async fn enrich_spots(gateway: &Gateway, names: &[String]) -> Option<Vec<SuggestedSpotInfo>> {
    // giới hạn 5 được giữ ở đây một lần nữa, độc lập với extractor
    let mut enriched = Vec::new();
    for name in names.iter().take(MAX_SPOTS) {
        match gateway.generate_grounded(&search_prompt(name)).await {
            Ok(response) => {
                if let Some(spot) = classify_citations(name, &response.citations) {
                    enriched.push(spot);
                } else {
                    log::debug!("No qualifying citations for spot {name:?}; dropped");
                }
            }
            Err(err) => {
                log::warn!("Grounded lookup for spot {name:?} failed: {err}");
            }
        }
    }

    if enriched.is_empty() { None } else { Some(enriched) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(url: &str, title: Option<&str>) -> Citation {
        Citation {
            url: url.to_string(),
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn image_requires_extension_and_http() {
        assert!(is_image_url("https://example.com/photo.jpg"));
        assert!(is_image_url("https://example.com/photo.WEBP"));
        assert!(!is_image_url("https://example.com/photo.jpg?size=large"));
        assert!(!is_image_url("ftp://example.com/photo.jpg"));
        assert!(!is_image_url("https://example.com/page.html"));
    }

    #[test]
    fn video_host_excludes_image_classification() {
        // đuôi ảnh nhưng nằm trên host video: không phải ảnh, và cũng
        // không phải trang xem video
        let url = "https://youtube.com/thumbnail.png";
        assert!(!is_image_url(url));
        assert!(!is_video_url(url));
    }

    #[test]
    fn video_matches_watch_patterns() {
        assert!(is_video_url("https://www.youtube.com/watch?v=abc123"));
        assert!(is_video_url("https://youtu.be/abc123"));
        assert!(!is_video_url("https://vimeo.com/12345"));
    }

    #[test]
    fn first_match_wins_per_category() {
        let citations = vec![
            citation("https://example.com/first.png", Some("First")),
            citation("https://example.com/second.png", Some("Second")),
        ];
        let spot = classify_citations("Alhambra", &citations).unwrap();
        assert_eq!(spot.image_url.as_deref(), Some("https://example.com/first.png"));
        assert_eq!(spot.image_title.as_deref(), Some("First"));
    }

    #[test]
    fn article_excludes_urls_already_claimed() {
        let citations = vec![
            citation("https://example.com/a.png", None),
            citation("https://youtu.be/tour", None),
            citation("https://travel.example.com/guide", Some("Guide")),
        ];
        let spot = classify_citations("Kinkaku-ji", &citations).unwrap();
        assert_eq!(spot.image_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(spot.video_url.as_deref(), Some("https://youtu.be/tour"));
        assert_eq!(
            spot.article_url.as_deref(),
            Some("https://travel.example.com/guide")
        );
    }

    #[test]
    fn lone_image_citation_still_enriches() {
        let citations = vec![citation("https://example.com/a.png", None)];
        let spot = classify_citations("Kinkaku-ji", &citations).unwrap();
        assert_eq!(spot.image_title.as_deref(), Some("Kinkaku-ji Image"));
        assert!(spot.video_url.is_none());
        assert!(spot.article_url.is_none());
    }

    #[test]
    fn default_titles_fall_back_to_spot_name() {
        let citations = vec![
            citation("https://youtu.be/abc", None),
            citation("https://travel.example.com/read", None),
        ];
        let spot = classify_citations("Gion", &citations).unwrap();
        assert_eq!(spot.video_title.as_deref(), Some("Gion on YouTube"));
        assert_eq!(spot.article_title.as_deref(), Some("Read more about Gion"));
    }

    #[test]
    fn no_qualifying_citations_drops_the_candidate() {
        assert!(classify_citations("Nowhere", &[]).is_none());
        let citations = vec![citation("not-a-url", Some("bad"))];
        assert!(classify_citations("Nowhere", &citations).is_none());
    }

    #[test]
    fn end_to_end_classification_shape() {
        // greeting nhắc một spot; search trả về một ảnh + một bài viết
        let citations = vec![
            citation("https://photos.example.com/torii.jpg", Some("Torii gates")),
            citation("https://guide.example.com/fushimi-inari", Some("Visiting guide")),
        ];
        let spot = classify_citations("Fushimi Inari Shrine", &citations).unwrap();
        assert!(spot.image_url.is_some());
        assert!(spot.article_url.is_some());
        assert!(spot.video_url.is_none());
        assert!(spot.has_links());
    }
}
