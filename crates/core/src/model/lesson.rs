use std::fmt;

use url::Url;

use crate::evaluator;

/// Canonical lesson address: the URL path without leading slashes.
///
/// Both the map's lesson links and the article page's own location reduce to
/// this form, so a record created on the map is found again on the article.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LessonUrl(String);

impl LessonUrl {
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(path.as_ref().trim_start_matches('/').to_owned())
    }

    /// Canonical form of the page currently displayed.
    #[must_use]
    pub fn from_page(url: &Url) -> Self {
        Self::new(url.path())
    }

    /// Canonical form of a lesson link, resolving relative hrefs against `base`.
    ///
    /// An href that cannot be parsed is treated as a bare path.
    #[must_use]
    pub fn from_link(href: &str, base: Option<&Url>) -> Self {
        let href = href.trim();
        if href.is_empty() {
            return Self::default();
        }
        let parsed = match base {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        match parsed {
            Ok(url) => Self::from_page(&url),
            Err(_) => Self::new(href),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for LessonUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LessonUrl({:?})", self.0)
    }
}

impl fmt::Display for LessonUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Article and viewport measurements reported by the host page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArticleGeometry {
    pub article_top: f64,
    pub article_height: f64,
    pub viewport_height: f64,
    pub viewport_width: f64,
}

/// Scroll offset needed to reach the end of an article, and the viewport
/// width it was measured at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollTarget {
    pub distance: f64,
    pub viewport_width: f64,
}

impl ScrollTarget {
    #[must_use]
    pub fn new(distance: f64, viewport_width: f64) -> Self {
        Self {
            distance,
            viewport_width,
        }
    }

    /// Distance from the page top until the article's bottom edge is visible.
    #[must_use]
    pub fn from_geometry(geometry: &ArticleGeometry) -> Self {
        let distance =
            geometry.article_top + geometry.article_height - geometry.viewport_height;
        Self {
            distance: distance.max(0.0),
            viewport_width: geometry.viewport_width,
        }
    }
}

/// Raw field values of a persisted lesson record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LessonRecordParts {
    pub url: LessonUrl,
    pub learned: bool,
    pub scrolled: f64,
    pub must_scroll: ScrollTarget,
    pub time_spent: u64,
    pub time_must_spend: u64,
}

/// Reading progress for one lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonRecord {
    url: LessonUrl,
    learned: bool,
    scrolled: f64,
    must_scroll: ScrollTarget,
    time_spent: u64,
    time_must_spend: u64,
}

impl LessonRecord {
    /// A record for a lesson seen for the first time.
    #[must_use]
    pub fn new(url: LessonUrl, time_must_spend: u64) -> Self {
        Self {
            url,
            learned: false,
            scrolled: 0.0,
            must_scroll: ScrollTarget::default(),
            time_spent: 0,
            time_must_spend,
        }
    }

    #[must_use]
    pub fn from_parts(parts: LessonRecordParts) -> Self {
        Self {
            url: parts.url,
            learned: parts.learned,
            scrolled: if parts.scrolled.is_finite() {
                parts.scrolled.max(0.0)
            } else {
                0.0
            },
            must_scroll: parts.must_scroll,
            time_spent: parts.time_spent,
            time_must_spend: parts.time_must_spend,
        }
    }

    #[must_use]
    pub fn to_parts(&self) -> LessonRecordParts {
        LessonRecordParts {
            url: self.url.clone(),
            learned: self.learned,
            scrolled: self.scrolled,
            must_scroll: self.must_scroll,
            time_spent: self.time_spent,
            time_must_spend: self.time_must_spend,
        }
    }

    #[must_use]
    pub fn url(&self) -> &LessonUrl {
        &self.url
    }

    #[must_use]
    pub fn learned(&self) -> bool {
        self.learned
    }

    #[must_use]
    pub fn scrolled(&self) -> f64 {
        self.scrolled
    }

    #[must_use]
    pub fn must_scroll(&self) -> ScrollTarget {
        self.must_scroll
    }

    #[must_use]
    pub fn time_spent(&self) -> u64 {
        self.time_spent
    }

    #[must_use]
    pub fn time_must_spend(&self) -> u64 {
        self.time_must_spend
    }

    /// Record a scroll offset; the stored value only ever grows.
    pub fn record_scroll(&mut self, offset: f64) {
        if offset.is_finite() && offset > self.scrolled {
            self.scrolled = offset;
        }
    }

    pub fn set_scroll_target(&mut self, target: ScrollTarget) {
        self.must_scroll = target;
    }

    pub fn accrue_time(&mut self, elapsed_ms: u64) {
        self.time_spent = self.time_spent.saturating_add(elapsed_ms);
    }

    /// Set the reading-time threshold if none has been assigned yet.
    ///
    /// Returns `true` when the threshold changed.
    pub fn backfill_threshold(&mut self, time_must_spend: u64) -> bool {
        if self.time_must_spend == 0 && time_must_spend != 0 {
            self.time_must_spend = time_must_spend;
            true
        } else {
            false
        }
    }

    /// Re-run the learned check. Once learned, a record stays learned.
    pub fn evaluate(&mut self) -> bool {
        if !self.learned && evaluator::is_learned(self) {
            self.learned = true;
        }
        self.learned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_and_page_urls_agree() {
        let page = Url::parse("https://learn.javascript.ru/closure").unwrap();
        let from_page = LessonUrl::from_page(&page);
        let absolute = LessonUrl::from_link("https://learn.javascript.ru/closure", None);
        let relative = LessonUrl::from_link("/closure", Some(&page));
        assert_eq!(from_page.as_str(), "closure");
        assert_eq!(absolute, from_page);
        assert_eq!(relative, from_page);
    }

    #[test]
    fn empty_link_gives_empty_url() {
        assert!(LessonUrl::from_link("  ", None).is_empty());
        assert_eq!(LessonUrl::new("///intro").as_str(), "intro");
    }

    #[test]
    fn scroll_target_never_negative() {
        let short = ArticleGeometry {
            article_top: 100.0,
            article_height: 300.0,
            viewport_height: 900.0,
            viewport_width: 1280.0,
        };
        assert_eq!(ScrollTarget::from_geometry(&short), ScrollTarget::new(0.0, 1280.0));

        let long = ArticleGeometry {
            article_height: 2000.0,
            ..short
        };
        assert_eq!(ScrollTarget::from_geometry(&long), ScrollTarget::new(1200.0, 1280.0));
    }

    #[test]
    fn scroll_is_monotonic() {
        let mut record = LessonRecord::new(LessonUrl::new("intro"), 0);
        record.record_scroll(300.0);
        record.record_scroll(120.0);
        record.record_scroll(f64::NAN);
        assert!((record.scrolled() - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn threshold_backfill_only_fills_zero() {
        let mut record = LessonRecord::new(LessonUrl::new("intro"), 0);
        assert!(record.backfill_threshold(60_000));
        assert!(!record.backfill_threshold(300_000));
        assert_eq!(record.time_must_spend(), 60_000);
    }

    #[test]
    fn learned_is_sticky() {
        let mut record = LessonRecord::new(LessonUrl::new("intro"), 1_000);
        record.set_scroll_target(ScrollTarget::new(100.0, 1024.0));
        record.record_scroll(100.0);
        record.accrue_time(1_000);
        assert!(record.evaluate());

        record.set_scroll_target(ScrollTarget::new(5_000.0, 320.0));
        assert!(record.evaluate());
    }
}
