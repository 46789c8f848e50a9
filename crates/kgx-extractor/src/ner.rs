//! Named Entity Recognition (NER) module
//!
//! Provides two recognizers behind [`EntityRecognizer`]:
//! - Service: delegates to an external NER endpoint
//! - Pattern: capitalization patterns + allow-lists, used whenever the
//!   service is not configured, unreachable, or fails on a request

use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::{Match, Regex};
use serde::{Deserialize, Serialize};

use crate::EntityRecognizer;
use kgx_core::{EntityBuckets, EntityCategory, ExtractionConfig, KgError, NerConfig, Result};

// ============================================================================
// Static tables
// ============================================================================

/// Capitalized words that are never names on their own
const STOPLIST: &[&str] = &[
    // Articles, pronouns, conjunctions
    "the", "a", "an", "and", "or", "but", "nor", "so", "yet", "if", "because", "although",
    "though", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
    "my", "your", "his", "its", "our", "their", "this", "that", "these", "those", "there",
    "here", "who", "what", "when", "where", "why", "how", "which",
    // Prepositions and adverbs that start sentences
    "in", "on", "at", "to", "for", "of", "with", "by", "from", "as", "about", "after",
    "before", "during", "while", "since", "until", "also", "however", "meanwhile", "later",
    "then", "now", "today", "yesterday", "tomorrow", "both", "each", "every", "some", "many",
    "most", "all", "no", "not", "yes",
    // Verbs that start sentences
    "is", "was", "are", "were", "be", "been", "has", "have", "had", "do", "does", "did",
    // Titles
    "mr", "mrs", "ms", "dr", "sir", "madam", "prof",
    // Calendar
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january",
    "february", "march", "april", "may", "june", "july", "august", "september", "october",
    "november", "december",
    // Roles and organization words
    "ceo", "cto", "cfo", "president", "director", "founder", "chairman", "manager", "team",
    "department", "board", "office", "headquarters",
];

/// Suffixes that mark the preceding capitalized words as an organization
const ORG_INDICATORS: &[&str] = &[
    "Inc", "Corp", "Corporation", "LLC", "Ltd", "Co", "Company", "Technologies", "Group",
    "Industries", "Systems", "Labs", "Holdings", "Enterprises", "Foundation", "Partners",
    "Solutions", "Motors", "University", "Bank",
];

/// Well-known organizations matched as whole words
const KNOWN_COMPANIES: &[&str] = &[
    "SpaceX", "Tesla", "Neuralink", "PayPal", "Zip2", "OpenAI", "Google", "Alphabet",
    "Apple", "Microsoft", "Amazon", "Facebook", "Meta", "Netflix", "IBM", "Intel", "NVIDIA",
    "Nvidia", "Twitter", "Oracle", "Samsung", "Sony", "Toyota", "Boeing", "NASA", "Uber",
    "Airbnb", "Adobe", "Salesforce", "Spotify",
];

/// Well-known places and countries matched as whole words
const KNOWN_PLACES: &[&str] = &[
    "California", "Texas", "Florida", "Nevada", "New York", "Washington", "Silicon Valley",
    "San Francisco", "Los Angeles", "Seattle", "Boston", "Chicago", "Austin", "London",
    "Paris", "Berlin", "Rome", "Madrid", "Tokyo", "Beijing", "Shanghai", "Moscow", "Pretoria",
    "United States", "USA", "United Kingdom", "UK", "Canada", "Mexico", "Brazil", "Spain",
    "Italy", "France", "Germany", "China", "Japan", "India", "Russia", "Australia",
    "South Africa", "Europe", "Asia", "Africa", "Mars",
];

/// Longest person name taken from one capitalized run
const MAX_NAME_WORDS: usize = 3;

/// Family/relationship words that admit a lone capitalized word as a person
const FAMILY_KEYWORDS: &[&str] = &[
    "brother", "sister", "sibling", "mother", "father", "parent", "son", "daughter", "child",
    "wife", "husband", "married", "spouse", "cousin", "uncle", "aunt", "nephew", "niece",
    "grandmother", "grandfather", "friend", "colleague", "partner", "boss",
];

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Skipping pattern that failed to compile");
            None
        }
    }
}

/// Whole-word alternation, longest names first so "New York" beats "York"
fn known_names_pattern(names: &[&str]) -> String {
    let mut names: Vec<&str> = names.to_vec();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    let alternation: Vec<String> = names.iter().map(|name| regex::escape(name)).collect();
    format!(r"\b(?:{})\b", alternation.join("|"))
}

fn find_matches<'t>(regex: &Option<Regex>, text: &'t str) -> Vec<Match<'t>> {
    regex
        .as_ref()
        .map(|r| r.find_iter(text).collect())
        .unwrap_or_default()
}

fn find_all<'t>(regex: &Option<Regex>, text: &'t str) -> Vec<&'t str> {
    find_matches(regex, text)
        .into_iter()
        .map(|m| m.as_str())
        .collect()
}

/// Up to `window` characters on each side of `start..end`
fn context_slice(text: &str, start: usize, end: usize, window: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

// ============================================================================
// Pattern-based NER
// ============================================================================

/// Rule-based recognizer: a three-stage cascade over raw text.
///
/// 1. Runs of capitalized words, cut into chunks of two or three, become
///    person names.
/// 2. Lone capitalized words become persons only near a family keyword.
/// 3. Organization suffixes and allow-lists give organizations and places.
pub struct PatternRecognizer {
    capitalized_run: Option<Regex>,
    single_word: Option<Regex>,
    org_suffix: Option<Regex>,
    companies: Option<Regex>,
    places: Option<Regex>,
    /// Lowercase words that never count as names
    stoplist: HashSet<String>,
    /// Lowercase organization suffixes
    indicators: HashSet<String>,
    context_window: usize,
}

impl PatternRecognizer {
    /// Create a recognizer with the built-in tables
    pub fn new(config: &ExtractionConfig) -> Self {
        let indicators: HashSet<String> =
            ORG_INDICATORS.iter().map(|w| w.to_lowercase()).collect();

        let stoplist = STOPLIST
            .iter()
            .chain(FAMILY_KEYWORDS)
            .map(|w| w.to_string())
            .chain(indicators.iter().cloned())
            .collect();

        Self {
            capitalized_run: compile(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*\b"),
            single_word: compile(r"\b[A-Z][a-z]+\b"),
            org_suffix: compile(&format!(
                r"\b(?:[A-Z][\w&'-]*[ \t]+){{1,3}}(?:{})\b",
                ORG_INDICATORS.join("|")
            )),
            companies: compile(&known_names_pattern(KNOWN_COMPANIES)),
            places: compile(&known_names_pattern(KNOWN_PLACES)),
            stoplist,
            indicators,
            context_window: config.context_window,
        }
    }

    /// Run the cascade synchronously
    pub fn scan(&self, text: &str) -> EntityBuckets {
        let mut buckets = EntityBuckets::new();
        if text.trim().is_empty() {
            return buckets;
        }

        // Organizations and places claim their spans before any name stage
        let (orgs, mut claimed) = self.organizations(text);
        let places = find_matches(&self.places, text);
        claimed.extend(places.iter().map(|m| m.range()));

        let full_names = self.full_names(text);
        let consumed: HashSet<&str> = full_names
            .iter()
            .map(String::as_str)
            .chain(claimed.iter().map(|span| &text[span.clone()]))
            .flat_map(str::split_whitespace)
            .collect();

        for name in &full_names {
            buckets.insert(EntityCategory::Person, name);
        }
        for name in self.contextual_names(text, &consumed, &claimed) {
            buckets.insert(EntityCategory::Person, name);
        }
        for org in orgs {
            buckets.insert(EntityCategory::Organization, org);
        }
        for place in places {
            buckets.insert(EntityCategory::Place, place.as_str());
        }

        buckets
    }

    fn is_stopword(&self, word: &str) -> bool {
        self.stoplist.contains(&word.to_lowercase())
    }

    /// True if `candidate` contains a known company or place
    fn mentions_known_name(&self, candidate: &str) -> bool {
        let matches =
            |regex: &Option<Regex>| regex.as_ref().is_some_and(|r| r.is_match(candidate));
        matches(&self.companies) || matches(&self.places)
    }

    /// True if `candidate` is exactly a known company or place
    fn is_known_name(&self, candidate: &str) -> bool {
        let exact = |regex: &Option<Regex>| {
            regex
                .as_ref()
                .and_then(|r| r.find(candidate))
                .is_some_and(|m| m.start() == 0 && m.end() == candidate.len())
        };
        exact(&self.companies) || exact(&self.places)
    }

    fn trim_leading_stopwords<'a>(&self, words: &'a [&'a str]) -> &'a [&'a str] {
        let skip = words.iter().take_while(|w| self.is_stopword(w)).count();
        &words[skip..]
    }

    /// Drop leading stopwords and known companies or places, which may span
    /// two words ("In New York Ada Lovelace" leaves "Ada Lovelace")
    fn trim_leading_known<'a>(&self, mut words: &'a [&'a str]) -> &'a [&'a str] {
        loop {
            words = self.trim_leading_stopwords(words);
            let known = (1..=words.len().min(2))
                .rev()
                .find(|&n| self.is_known_name(&words[..n].join(" ")));
            match known {
                Some(n) => words = &words[n..],
                None => return words,
            }
        }
    }

    /// Stage 1: capitalized two-or-three-word sequences
    fn full_names(&self, text: &str) -> Vec<String> {
        let mut names = Vec::new();

        for run in find_all(&self.capitalized_run, text) {
            let words: Vec<&str> = run.split_whitespace().collect();
            let mut rest = words.as_slice();

            while !rest.is_empty() {
                rest = self.trim_leading_known(rest);
                let (chunk, tail) = rest.split_at(rest.len().min(MAX_NAME_WORDS));
                rest = tail;
                if chunk.len() < 2 {
                    continue;
                }

                let name = chunk.join(" ");
                let has_org_word = chunk
                    .iter()
                    .any(|w| self.indicators.contains(&w.to_lowercase()));
                let has_stopword = chunk.iter().any(|w| self.is_stopword(w));
                if has_org_word || has_stopword || self.mentions_known_name(&name) {
                    continue;
                }

                names.push(name);
            }
        }

        names
    }

    /// Stage 2: lone capitalized words gated by a family keyword nearby.
    /// Words already used by a name, organization or place are skipped.
    fn contextual_names<'t>(
        &self,
        text: &'t str,
        consumed: &HashSet<&str>,
        claimed: &[Range<usize>],
    ) -> Vec<&'t str> {
        let Some(single_word) = &self.single_word else {
            return Vec::new();
        };

        let mut names = Vec::new();
        for m in single_word.find_iter(text) {
            let word = m.as_str();
            let inside_claim = claimed
                .iter()
                .any(|span| span.start <= m.start() && m.end() <= span.end);
            if inside_claim
                || consumed.contains(word)
                || self.is_stopword(word)
                || self.mentions_known_name(word)
            {
                continue;
            }

            let context = context_slice(text, m.start(), m.end(), self.context_window);
            let context = context.to_lowercase();
            if FAMILY_KEYWORDS.iter().any(|keyword| context.contains(keyword)) {
                names.push(word);
            }
        }

        names
    }

    /// Stage 3: suffix phrases and well-known companies, with the byte spans
    /// they cover
    fn organizations(&self, text: &str) -> (Vec<String>, Vec<Range<usize>>) {
        let mut orgs = Vec::new();
        let mut spans = Vec::new();

        for m in find_matches(&self.org_suffix, text) {
            spans.push(m.range());
            let words: Vec<&str> = m.as_str().split_whitespace().collect();
            let words = self.trim_leading_stopwords(&words);
            // A bare suffix ("The Company") names nothing
            if words.len() < 2 {
                continue;
            }
            orgs.push(words.join(" "));
        }

        for m in find_matches(&self.companies, text) {
            spans.push(m.range());
            orgs.push(m.as_str().to_string());
        }

        (orgs, spans)
    }
}

impl Default for PatternRecognizer {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[async_trait]
impl EntityRecognizer for PatternRecognizer {
    fn name(&self) -> &'static str {
        "pattern"
    }

    async fn recognize(&self, text: &str) -> Result<EntityBuckets> {
        Ok(self.scan(text))
    }
}

// ============================================================================
// Service-backed NER
// ============================================================================

/// Span as returned by the NER service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedSpan {
    pub text: String,
    pub label: String,
}

/// The service may answer with a bare list or wrap it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceResponse {
    Spans(Vec<RecognizedSpan>),
    Wrapped { entities: Vec<RecognizedSpan> },
}

/// Bucket service spans into the supported categories
pub fn bucket_spans(spans: impl IntoIterator<Item = RecognizedSpan>) -> EntityBuckets {
    let mut buckets = EntityBuckets::new();
    for span in spans {
        match EntityCategory::from_label(&span.label) {
            Some(category) => {
                buckets.insert(category, &span.text);
            }
            None => tracing::trace!(label = %span.label, "Ignoring unsupported entity label"),
        }
    }
    buckets
}

/// Recognizer delegating to an external NER endpoint
pub struct ServiceRecognizer {
    client: reqwest::Client,
    endpoint: String,
}

impl ServiceRecognizer {
    /// Create a client for `endpoint`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KgError::RecognizerError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check that the service answers at all
    pub async fn probe(&self) -> Result<()> {
        self.request("").await.map(|_| ())
    }

    async fn request(&self, text: &str) -> Result<Vec<RecognizedSpan>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| KgError::RecognizerError(format!("NER request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KgError::RecognizerError(format!(
                "NER service returned {status}"
            )));
        }

        let body: ServiceResponse = response
            .json()
            .await
            .map_err(|e| KgError::RecognizerError(format!("Invalid NER response: {e}")))?;

        Ok(match body {
            ServiceResponse::Spans(spans) => spans,
            ServiceResponse::Wrapped { entities } => entities,
        })
    }
}

#[async_trait]
impl EntityRecognizer for ServiceRecognizer {
    fn name(&self) -> &'static str {
        "service"
    }

    async fn recognize(&self, text: &str) -> Result<EntityBuckets> {
        let spans = self.request(text).await?;
        Ok(bucket_spans(spans))
    }
}

/// Pick the recognizer for the process lifetime.
///
/// Uses the NER service when configured and reachable, otherwise the
/// pattern cascade. Never fails.
pub async fn select_recognizer(
    ner: &NerConfig,
    extraction: &ExtractionConfig,
) -> Arc<dyn EntityRecognizer> {
    let Some(endpoint) = ner.endpoint.as_deref() else {
        tracing::warn!("No NER service configured, using pattern-based entity extraction");
        return Arc::new(PatternRecognizer::new(extraction));
    };

    let service = match ServiceRecognizer::new(endpoint, Duration::from_secs(ner.timeout_secs)) {
        Ok(service) => service,
        Err(e) => {
            tracing::warn!(
                endpoint,
                error = %e,
                "NER client setup failed, using pattern-based entity extraction"
            );
            return Arc::new(PatternRecognizer::new(extraction));
        }
    };

    match service.probe().await {
        Ok(()) => {
            tracing::info!(endpoint = service.endpoint(), "Using external NER service");
            Arc::new(service)
        }
        Err(e) => {
            tracing::warn!(
                endpoint = service.endpoint(),
                error = %e,
                "NER service unavailable, using pattern-based entity extraction"
            );
            Arc::new(PatternRecognizer::new(extraction))
        }
    }
}

// ============================================================================
// Entity Extractor
// ============================================================================

/// Entity extraction component: the selected recognizer plus the pattern
/// cascade as per-request fallback
pub struct EntityExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
    fallback: Arc<PatternRecognizer>,
}

impl EntityExtractor {
    /// Wrap an already selected recognizer
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, extraction: &ExtractionConfig) -> Self {
        Self {
            recognizer,
            fallback: Arc::new(PatternRecognizer::new(extraction)),
        }
    }

    /// Pattern cascade only
    pub fn pattern_only(extraction: &ExtractionConfig) -> Self {
        let fallback = Arc::new(PatternRecognizer::new(extraction));
        let recognizer: Arc<dyn EntityRecognizer> = fallback.clone();
        Self {
            recognizer,
            fallback,
        }
    }

    /// Select a recognizer from configuration
    pub async fn from_config(ner: &NerConfig, extraction: &ExtractionConfig) -> Self {
        Self::new(select_recognizer(ner, extraction).await, extraction)
    }

    /// Name of the selected recognizer
    pub fn recognizer_name(&self) -> &'static str {
        self.recognizer.name()
    }

    /// Extract entities; never fails
    pub async fn extract(&self, text: &str) -> EntityBuckets {
        if text.trim().is_empty() {
            return EntityBuckets::new();
        }

        match self.recognizer.recognize(text).await {
            Ok(buckets) => buckets,
            Err(e) => {
                tracing::warn!(
                    recognizer = self.recognizer.name(),
                    error = %e,
                    "Entity recognition failed, using pattern fallback"
                );
                self.fallback.scan(text)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> PatternRecognizer {
        PatternRecognizer::default()
    }

    #[test]
    fn test_founder_sentence() {
        let buckets = recognizer().scan("Elon Musk founded SpaceX in California.");

        assert_eq!(buckets.texts(EntityCategory::Person), vec!["Elon Musk"]);
        assert_eq!(buckets.texts(EntityCategory::Organization), vec!["SpaceX"]);
        assert_eq!(buckets.texts(EntityCategory::Place), vec!["California"]);
        assert!(buckets.texts(EntityCategory::Product).is_empty());
    }

    #[test]
    fn test_lowercase_text_yields_nothing() {
        let buckets = recognizer().scan("the quick brown fox jumps over the lazy dog");
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_repeated_mentions_collapse() {
        let buckets =
            recognizer().scan("Steve Jobs met Steve Jobs. Apple hired Steve Jobs at Apple.");

        assert_eq!(buckets.texts(EntityCategory::Person), vec!["Steve Jobs"]);
        assert_eq!(buckets.texts(EntityCategory::Organization), vec!["Apple"]);
    }

    #[test]
    fn test_single_name_needs_family_context() {
        let r = recognizer();

        let with_context = r.scan("Later that day her brother Bellamy arrived.");
        assert!(with_context.contains(EntityCategory::Person, "Bellamy"));

        let without_context = r.scan("Bellamy arrived at the station around noon.");
        assert!(!without_context.contains(EntityCategory::Person, "Bellamy"));
    }

    #[test]
    fn test_context_window_is_bounded() {
        let config = ExtractionConfig {
            context_window: 10,
            ..Default::default()
        };
        let r = PatternRecognizer::new(&config);
        let text = "Octavia walked far before meeting her brother.";

        assert!(!r.scan(text).contains(EntityCategory::Person, "Octavia"));
        assert!(recognizer().scan(text).contains(EntityCategory::Person, "Octavia"));
    }

    #[test]
    fn test_full_name_consumes_its_words() {
        let buckets = recognizer().scan("Kimbal Musk is the brother of Elon Musk.");
        let persons = buckets.texts(EntityCategory::Person);

        assert!(persons.contains(&"Kimbal Musk"));
        assert!(persons.contains(&"Elon Musk"));
        assert!(!persons.contains(&"Musk"));
    }

    #[test]
    fn test_leading_stopwords_trimmed() {
        let buckets = recognizer().scan("Yesterday Ada Lovelace visited The Acme Group offices.");

        assert!(buckets.contains(EntityCategory::Person, "Ada Lovelace"));
        assert!(buckets.contains(EntityCategory::Organization, "Acme Group"));
        assert!(!buckets.contains(EntityCategory::Person, "Acme Group"));
    }

    #[test]
    fn test_org_suffix_and_places() {
        let buckets = recognizer().scan("Jane Doe works at Initech Corp in New York and Paris.");

        assert!(buckets.contains(EntityCategory::Organization, "Initech Corp"));
        assert!(buckets.contains(EntityCategory::Place, "New York"));
        assert!(buckets.contains(EntityCategory::Place, "Paris"));
        assert!(!buckets.contains(EntityCategory::Person, "New York"));
    }

    #[test]
    fn test_family_context_skips_place_and_org_words() {
        let r = recognizer();

        let buckets = r.scan("My brother moved to New York last year.");
        assert!(buckets.texts(EntityCategory::Person).is_empty());
        assert_eq!(buckets.texts(EntityCategory::Place), vec!["New York"]);

        let buckets = r.scan("Her brother works at Initech Corp.");
        assert!(buckets.texts(EntityCategory::Person).is_empty());
        assert_eq!(buckets.texts(EntityCategory::Organization), vec!["Initech Corp"]);
    }

    #[test]
    fn test_leading_place_keeps_following_name() {
        let r = recognizer();

        let buckets = r.scan("In California Elon Musk founded SpaceX.");
        assert_eq!(buckets.texts(EntityCategory::Person), vec!["Elon Musk"]);
        assert_eq!(buckets.texts(EntityCategory::Place), vec!["California"]);

        let buckets = r.scan("In New York Ada Lovelace met Charles Babbage.");
        let persons = buckets.texts(EntityCategory::Person);
        assert!(persons.contains(&"Ada Lovelace"));
        assert!(persons.contains(&"Charles Babbage"));
        assert!(!persons.contains(&"York Ada"));
    }

    #[test]
    fn test_context_slice_respects_char_boundaries() {
        let text = "héllo wörld Ünïcode";
        let start = text.find("wörld").unwrap();
        let end = start + "wörld".len();
        assert_eq!(context_slice(text, start, end, 2), "o wörld Ü");
        assert_eq!(context_slice(text, start, end, 0), "wörld");
    }

    #[test]
    fn test_bucket_spans_ignores_unsupported_labels() {
        let spans = vec![
            RecognizedSpan {
                text: "Ada Lovelace".to_string(),
                label: "PERSON".to_string(),
            },
            RecognizedSpan {
                text: "1843".to_string(),
                label: "DATE".to_string(),
            },
            RecognizedSpan {
                text: "London".to_string(),
                label: "GPE".to_string(),
            },
            RecognizedSpan {
                text: "Ada Lovelace".to_string(),
                label: "PERSON".to_string(),
            },
        ];

        let buckets = bucket_spans(spans);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets.texts(EntityCategory::Person), vec!["Ada Lovelace"]);
        assert_eq!(buckets.texts(EntityCategory::Place), vec!["London"]);
    }

    #[test]
    fn test_service_response_shapes() {
        let bare: ServiceResponse =
            serde_json::from_str(r#"[{"text": "SpaceX", "label": "ORG"}]"#).unwrap();
        assert!(matches!(bare, ServiceResponse::Spans(ref s) if s.len() == 1));

        let wrapped: ServiceResponse =
            serde_json::from_str(r#"{"entities": [{"text": "SpaceX", "label": "ORG"}]}"#)
                .unwrap();
        assert!(matches!(
            wrapped,
            ServiceResponse::Wrapped { ref entities } if entities.len() == 1
        ));
    }

    #[tokio::test]
    async fn test_select_without_endpoint_uses_patterns() {
        let recognizer =
            select_recognizer(&NerConfig::default(), &ExtractionConfig::default()).await;
        assert_eq!(recognizer.name(), "pattern");
    }

    #[tokio::test]
    async fn test_select_unreachable_endpoint_uses_patterns() {
        let ner = NerConfig {
            endpoint: Some("http://127.0.0.1:9/ner".to_string()),
            timeout_secs: 1,
        };
        let recognizer = select_recognizer(&ner, &ExtractionConfig::default()).await;
        assert_eq!(recognizer.name(), "pattern");
    }

    #[tokio::test]
    async fn test_failing_service_falls_back_per_request() {
        let service = ServiceRecognizer::new("http://127.0.0.1:9/ner", Duration::from_secs(1))
            .unwrap();
        let extractor = EntityExtractor::new(Arc::new(service), &ExtractionConfig::default());
        assert_eq!(extractor.recognizer_name(), "service");

        let buckets = extractor.extract("Elon Musk founded SpaceX.").await;
        assert!(buckets.contains(EntityCategory::Person, "Elon Musk"));
        assert!(buckets.contains(EntityCategory::Organization, "SpaceX"));
    }

    #[tokio::test]
    async fn test_blank_text_is_empty() {
        let extractor = EntityExtractor::pattern_only(&ExtractionConfig::default());
        assert!(extractor.extract("   \n").await.is_empty());
    }
}
