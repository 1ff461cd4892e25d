//! Content negotiation.
//!
//! A [`Format`](crate::Format) knows what it can render; a [`Negotiator`]
//! picks one of those media types for a request. [`AcceptNegotiator`] is the
//! default and follows the `Accept` header semantics of RFC 9110 §12.5.1:
//! quality values, `type/*` and `*/*` wildcards, and the most specific match
//! deciding the quality of a candidate.

use mime::Mime;

/// Chooses the representation served for a request.
pub trait Negotiator: Send + Sync + 'static {
    /// Returns the best of `candidates` for the given `Accept` header value,
    /// or `None` when the client accepts none of them.
    fn preferred_media_type(&self, accept: Option<&str>, candidates: &[&str]) -> Option<String>;
}

/// `Accept`-header driven negotiation.
///
/// A missing header accepts anything, so the first candidate wins. Candidates
/// the client does not accept are never returned, which lets the caller fail
/// with `406 Not Acceptable` instead of guessing.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptNegotiator;

struct Preference {
    mime: Mime,
    q: f32,
    order: usize,
}

struct Ranked {
    q: f32,
    specificity: u8,
    order: usize,
    index: usize,
}

impl Negotiator for AcceptNegotiator {
    fn preferred_media_type(&self, accept: Option<&str>, candidates: &[&str]) -> Option<String> {
        let preferences = parse_accept(accept.unwrap_or("*/*"));

        let mut ranked: Vec<Ranked> = candidates.iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let candidate: Mime = candidate.parse().ok()?;
                rank(&candidate, &preferences, index)
            })
            .filter(|r| r.q > 0.0)
            .collect();

        ranked.sort_by(|a, b| {
            b.q.total_cmp(&a.q)
                .then(b.specificity.cmp(&a.specificity))
                .then(a.order.cmp(&b.order))
                .then(a.index.cmp(&b.index))
        });

        ranked.first().map(|r| candidates[r.index].to_owned())
    }
}

fn parse_accept(accept: &str) -> Vec<Preference> {
    accept.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .filter_map(|(order, entry)| {
            let mime: Mime = entry.parse().ok()?;
            let q = match mime.get_param("q") {
                Some(q) => q.as_str().parse::<f32>().ok()?.clamp(0.0, 1.0),
                None => 1.0,
            };
            Some(Preference { mime, q, order })
        })
        .collect()
}

/// The most specific preference matching `candidate` decides its rank.
fn rank(candidate: &Mime, preferences: &[Preference], index: usize) -> Option<Ranked> {
    preferences.iter()
        .filter_map(|pref| {
            let specificity = specificity(candidate, &pref.mime)?;
            Some(Ranked { q: pref.q, specificity, order: pref.order, index })
        })
        .max_by(|a, b| {
            a.specificity.cmp(&b.specificity)
                .then(a.q.total_cmp(&b.q))
                .then(b.order.cmp(&a.order))
        })
}

fn specificity(candidate: &Mime, pref: &Mime) -> Option<u8> {
    if pref.type_() == mime::STAR {
        return (pref.subtype() == mime::STAR).then_some(0);
    }
    if pref.type_() != candidate.type_() {
        return None;
    }
    if pref.subtype() == mime::STAR {
        return Some(1);
    }
    (pref.subtype() == candidate.subtype()).then_some(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMATS: &[&str] = &["text/html", "application/json"];

    fn pick(accept: Option<&str>) -> Option<String> {
        AcceptNegotiator.preferred_media_type(accept, FORMATS)
    }

    #[test]
    fn missing_header_takes_the_first_candidate() {
        assert_eq!(pick(None).as_deref(), Some("text/html"));
        assert_eq!(pick(Some("*/*")).as_deref(), Some("text/html"));
    }

    #[test]
    fn exact_match() {
        assert_eq!(pick(Some("application/json")).as_deref(), Some("application/json"));
    }

    #[test]
    fn quality_values_order_preferences() {
        let accept = "text/html;q=0.5, application/json";
        assert_eq!(pick(Some(accept)).as_deref(), Some("application/json"));
    }

    #[test]
    fn specific_entries_override_wildcards() {
        let accept = "*/*;q=0.9, text/html;q=0";
        assert_eq!(pick(Some(accept)).as_deref(), Some("application/json"));
    }

    #[test]
    fn subtype_wildcards() {
        assert_eq!(pick(Some("application/*")).as_deref(), Some("application/json"));
    }

    #[test]
    fn browser_accept_header_prefers_html() {
        let accept = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
        assert_eq!(pick(Some(accept)).as_deref(), Some("text/html"));
    }

    #[test]
    fn unacceptable_types_yield_nothing() {
        assert_eq!(pick(Some("text/plain")), None);
        assert_eq!(pick(Some("application/json;q=0")), None);
    }

    #[test]
    fn malformed_entries_are_ignored() {
        assert_eq!(pick(Some("garbage, application/json")).as_deref(), Some("application/json"));
    }
}
