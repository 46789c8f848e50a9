//! Relationship inference module
//!
//! Connects extracted entities using an ordered stack of heuristic layers,
//! from high-precision verb patterns down to a word-proximity fallback.
//! Each unordered entity pair is linked at most once; the first layer to
//! connect a pair wins.

use std::collections::HashSet;

use regex::Regex;

use kgx_core::{
    pair_key, Entity, EntityBuckets, EntityCategory, ExtractionConfig, KgError, RelationOrigin,
    Relationship, Result,
};

// ============================================================================
// Static tables
// ============================================================================

/// Founding verbs, label
const FOUNDING_VERBS: &[(&str, &str)] = &[
    ("co-founded", "founded"),
    ("founded", "founded"),
    ("started", "founded"),
    ("created", "founded"),
    ("established", "founded"),
];

/// Employment verbs, label
const EMPLOYMENT_VERBS: &[(&str, &str)] = &[
    ("works at", "works_at"),
    ("works for", "works_at"),
    ("employed by", "works_at"),
    ("ceo of", "ceo_of"),
    ("president of", "president_of"),
    ("director of", "director_of"),
];

const FAMILY_RELATIONS: &str = concat!(
    "brother|sister|mother|father|son|daughter|wife|husband|cousin|uncle|aunt|",
    "sibling|parent|child|nephew|niece|grandmother|grandfather",
);

/// Keyword, label; first keyword present in a sentence wins
const SENTENCE_KEYWORDS: &[(&str, &str)] = &[
    ("founded", "founded"),
    ("created", "created"),
    ("works", "works_at"),
    ("ceo", "leads"),
    ("leads", "leads"),
    ("brother", "family"),
    ("sister", "family"),
    ("mother", "family"),
    ("father", "family"),
    ("daughter", "family"),
    ("married", "married"),
    ("wife", "married"),
    ("husband", "married"),
    ("owns", "owns"),
    ("acquired", "acquired"),
    ("born", "born_in"),
    ("lives", "lives_in"),
    ("located", "located_in"),
    ("partner", "partner"),
    ("friend", "friend"),
    ("colleague", "colleague"),
];

const DEFAULT_LABEL: &str = "related";

// ============================================================================
// Inference state
// ============================================================================

/// Read-only input shared by all layers
pub struct InferenceContext<'a> {
    /// Lowercased source text
    pub lower: String,
    /// Unique entities of this extraction
    pub entities: &'a [Entity],
}

impl<'a> InferenceContext<'a> {
    pub fn new(text: &'a str, entities: &'a [Entity]) -> Self {
        Self {
            lower: text.to_lowercase(),
            entities,
        }
    }

    pub fn persons(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.of_category(EntityCategory::Person)
    }

    pub fn organizations(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.of_category(EntityCategory::Organization)
    }

    fn of_category(&self, category: EntityCategory) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(move |e| e.category == category)
    }

    /// Case-insensitive mention check
    pub fn is_mentioned(&self, entity: &Entity) -> bool {
        self.lower.contains(&entity.text.to_lowercase())
    }
}

/// Relationships found so far, keyed by unordered pair
#[derive(Debug, Default)]
pub struct LinkSet {
    linked: HashSet<(String, String)>,
    relationships: Vec<Relationship>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the unordered pair is already connected
    pub fn is_linked(&self, a: &str, b: &str) -> bool {
        self.linked.contains(&pair_key(a, b))
    }

    /// Record a relationship.
    ///
    /// Returns `false` for self-loops and pairs already connected; the
    /// existing label is never overwritten.
    pub fn link(
        &mut self,
        source: &str,
        target: &str,
        label: &str,
        origin: RelationOrigin,
    ) -> bool {
        if source == target || !self.linked.insert(pair_key(source, target)) {
            return false;
        }
        self.relationships
            .push(Relationship::new(source, target, label, origin));
        true
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn into_relationships(self) -> Vec<Relationship> {
        self.relationships
    }
}

/// One rule in the inference cascade
pub trait HeuristicLayer: Send + Sync {
    /// Layer name for logging
    fn name(&self) -> &'static str;

    /// Origin tag attached to relationships from this layer
    fn origin(&self) -> RelationOrigin;

    /// Link pairs not yet connected
    fn apply(&self, ctx: &InferenceContext<'_>, links: &mut LinkSet);
}

// ============================================================================
// Layers 1 and 2: verb patterns
// ============================================================================

/// True if `parts` occur in `haystack` in order, each after the previous
fn occurs_in_order(haystack: &str, parts: [&str; 3]) -> bool {
    let mut rest = haystack;
    for part in parts {
        match rest.find(part) {
            Some(i) => rest = &rest[i + part.len()..],
            None => return false,
        }
    }
    true
}

/// Person/organization pairs joined by a verb phrase in either order
pub struct VerbPatternLayer {
    name: &'static str,
    origin: RelationOrigin,
    verbs: &'static [(&'static str, &'static str)],
}

impl VerbPatternLayer {
    pub fn founding() -> Self {
        Self {
            name: "founding",
            origin: RelationOrigin::Founding,
            verbs: FOUNDING_VERBS,
        }
    }

    pub fn employment() -> Self {
        Self {
            name: "employment",
            origin: RelationOrigin::Employment,
            verbs: EMPLOYMENT_VERBS,
        }
    }

    fn match_label(&self, lower: &str, person: &str, org: &str) -> Option<&'static str> {
        self.verbs
            .iter()
            .find(|(verb, _)| {
                occurs_in_order(lower, [person, verb, org])
                    || occurs_in_order(lower, [org, verb, person])
            })
            .map(|(_, label)| *label)
    }
}

impl HeuristicLayer for VerbPatternLayer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn origin(&self) -> RelationOrigin {
        self.origin
    }

    fn apply(&self, ctx: &InferenceContext<'_>, links: &mut LinkSet) {
        for person in ctx.persons().filter(|p| ctx.is_mentioned(p)) {
            let person_lower = person.text.to_lowercase();
            for org in ctx.organizations().filter(|o| ctx.is_mentioned(o)) {
                if links.is_linked(&person.text, &org.text) {
                    continue;
                }
                let org_lower = org.text.to_lowercase();
                if let Some(label) = self.match_label(&ctx.lower, &person_lower, &org_lower) {
                    links.link(&person.text, &org.text, label, self.origin());
                }
            }
        }
    }
}

// ============================================================================
// Layer 3: family phrasing
// ============================================================================

/// Family templates over the lowercased text.
///
/// Capture groups are resolved loosely to persons, so one group may
/// resolve to several persons and connect all of them.
pub struct FamilyLayer {
    templates: Vec<Regex>,
}

impl FamilyLayer {
    pub fn new() -> Self {
        let name = r"(\w+(?:\s\w+)?)";
        let sources = [
            // "x is the brother of y"
            format!(r"{name}\s+is\s+(?:the\s+|a\s+)?(?:{FAMILY_RELATIONS})\s+of\s+{name}"),
            // "x and y are siblings"
            format!(
                r"{name}\s+and\s+{name}\s+are\s+(?:siblings|brothers|sisters|cousins|twins|married|spouses)"
            ),
            // "x's sister y"
            format!(r"{name}'s\s+(?:{FAMILY_RELATIONS})\s*,?\s+{name}"),
            // "x and his brother y"
            format!(r"{name}\s+and\s+(?:his|her|their)\s+(?:{FAMILY_RELATIONS})\s+{name}"),
        ];

        let templates = sources
            .iter()
            .filter_map(|source| match Regex::new(source) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!(pattern = %source, error = %e, "Skipping family template");
                    None
                }
            })
            .collect();

        Self { templates }
    }

    /// Persons the capture group plausibly refers to
    fn resolve<'e>(&self, group: &str, ctx: &'e InferenceContext<'_>) -> Vec<&'e Entity> {
        let group_words: HashSet<&str> = group.split_whitespace().collect();
        ctx.persons()
            .filter(|person| {
                let lower = person.text.to_lowercase();
                lower.contains(group)
                    || group.contains(lower.as_str())
                    || lower.split_whitespace().any(|w| group_words.contains(w))
            })
            .collect()
    }
}

impl Default for FamilyLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicLayer for FamilyLayer {
    fn name(&self) -> &'static str {
        "family"
    }

    fn origin(&self) -> RelationOrigin {
        RelationOrigin::Family
    }

    fn apply(&self, ctx: &InferenceContext<'_>, links: &mut LinkSet) {
        for template in &self.templates {
            for caps in template.captures_iter(&ctx.lower) {
                let (Some(first), Some(second)) = (caps.get(1), caps.get(2)) else {
                    tracing::debug!("Family template matched without both names");
                    continue;
                };

                let left = self.resolve(first.as_str(), ctx);
                let right = self.resolve(second.as_str(), ctx);
                for a in &left {
                    for b in &right {
                        links.link(&a.text, &b.text, "family", self.origin());
                    }
                }
            }
        }
    }
}

// ============================================================================
// Layer 4: sentence co-occurrence
// ============================================================================

/// Entities sharing a sentence, labelled by the first keyword present
pub struct SentenceLayer;

impl SentenceLayer {
    fn label_for(sentence: &str) -> &'static str {
        SENTENCE_KEYWORDS
            .iter()
            .find(|(keyword, _)| sentence.contains(keyword))
            .map(|(_, label)| *label)
            .unwrap_or(DEFAULT_LABEL)
    }
}

impl HeuristicLayer for SentenceLayer {
    fn name(&self) -> &'static str {
        "sentence"
    }

    fn origin(&self) -> RelationOrigin {
        RelationOrigin::Sentence
    }

    fn apply(&self, ctx: &InferenceContext<'_>, links: &mut LinkSet) {
        for sentence in ctx.lower.split(['.', '!', '?']) {
            let present: Vec<&Entity> = ctx
                .entities
                .iter()
                .filter(|e| sentence.contains(&e.text.to_lowercase()))
                .collect();
            if present.len() < 2 {
                continue;
            }

            let label = Self::label_for(sentence);
            for (i, a) in present.iter().enumerate() {
                for b in &present[i + 1..] {
                    links.link(&a.text, &b.text, label, self.origin());
                }
            }
        }
    }
}

// ============================================================================
// Layer 5: proximity fallback
// ============================================================================

/// Entities whose mentions lie within `window` tokens of each other
pub struct ProximityLayer {
    window: usize,
}

impl ProximityLayer {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    fn tokenize(lower: &str) -> Vec<&str> {
        lower
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Token indices mentioning `entity`
    fn positions(tokens: &[&str], entity: &Entity) -> Result<Vec<usize>> {
        let lower = entity.text.to_lowercase();
        let words = Self::tokenize(&lower);
        if words.is_empty() {
            return Err(KgError::InferenceError(format!(
                "entity '{}' has no searchable words",
                entity.text
            )));
        }

        Ok(tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.contains(lower.as_str()) || words.contains(token))
            .map(|(i, _)| i)
            .collect())
    }

    fn within_window(&self, tokens: &[&str], a: &Entity, b: &Entity) -> Result<bool> {
        let left = Self::positions(tokens, a)?;
        let right = Self::positions(tokens, b)?;
        Ok(left
            .iter()
            .any(|i| right.iter().any(|j| i.abs_diff(*j) <= self.window)))
    }
}

impl HeuristicLayer for ProximityLayer {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn origin(&self) -> RelationOrigin {
        RelationOrigin::Proximity
    }

    fn apply(&self, ctx: &InferenceContext<'_>, links: &mut LinkSet) {
        let tokens = Self::tokenize(&ctx.lower);

        for (i, a) in ctx.entities.iter().enumerate() {
            for b in &ctx.entities[i + 1..] {
                if links.is_linked(&a.text, &b.text) {
                    continue;
                }
                match self.within_window(&tokens, a, b) {
                    Ok(true) => {
                        links.link(&a.text, &b.text, DEFAULT_LABEL, self.origin());
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::debug!(
                            source = %a.text,
                            target = %b.text,
                            error = %e,
                            "Skipping pair"
                        );
                    }
                }
            }
        }
    }
}

// ============================================================================
// Inferencer
// ============================================================================

/// Runs the heuristic layers in priority order
pub struct RelationshipInferencer {
    layers: Vec<Box<dyn HeuristicLayer>>,
}

impl RelationshipInferencer {
    /// Standard cascade: founding, employment, family, sentence, proximity
    pub fn new(config: &ExtractionConfig) -> Self {
        Self::with_layers(vec![
            Box::new(VerbPatternLayer::founding()),
            Box::new(VerbPatternLayer::employment()),
            Box::new(FamilyLayer::new()),
            Box::new(SentenceLayer),
            Box::new(ProximityLayer::new(config.proximity_window)),
        ])
    }

    /// Custom cascade, applied in the given order
    pub fn with_layers(layers: Vec<Box<dyn HeuristicLayer>>) -> Self {
        Self { layers }
    }

    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    /// Infer relationships between the entities of one extraction
    pub fn infer(&self, entities: &EntityBuckets, text: &str) -> Vec<Relationship> {
        self.infer_entities(&entities.entities(), text)
    }

    pub fn infer_entities(&self, entities: &[Entity], text: &str) -> Vec<Relationship> {
        if entities.len() < 2 || text.trim().is_empty() {
            return Vec::new();
        }

        let ctx = InferenceContext::new(text, entities);
        let mut links = LinkSet::new();

        for layer in &self.layers {
            let before = links.len();
            layer.apply(&ctx, &mut links);
            tracing::trace!(layer = layer.name(), added = links.len() - before, "Applied layer");
        }

        tracing::debug!(
            entities = entities.len(),
            relationships = links.len(),
            "Inferred relationships"
        );
        links.into_relationships()
    }
}

impl Default for RelationshipInferencer {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn person(text: &str) -> Entity {
        Entity::new(text, EntityCategory::Person)
    }

    fn org(text: &str) -> Entity {
        Entity::new(text, EntityCategory::Organization)
    }

    fn place(text: &str) -> Entity {
        Entity::new(text, EntityCategory::Place)
    }

    fn find<'r>(rels: &'r [Relationship], a: &str, b: &str) -> Option<&'r Relationship> {
        rels.iter().find(|r| r.pair_key() == pair_key(a, b))
    }

    #[test]
    fn test_founding_pattern() {
        let entities = vec![person("Elon Musk"), org("SpaceX"), place("California")];
        let rels = RelationshipInferencer::default()
            .infer_entities(&entities, "Elon Musk founded SpaceX in California.");

        let founded = find(&rels, "Elon Musk", "SpaceX").unwrap();
        assert_eq!(founded.source, "Elon Musk");
        assert_eq!(founded.target, "SpaceX");
        assert_eq!(founded.label, "founded");
        assert_eq!(founded.origin, RelationOrigin::Founding);
    }

    #[test]
    fn test_founding_pattern_reverse_order() {
        let entities = vec![person("Larry Page"), org("Google")];
        let rels = RelationshipInferencer::default()
            .infer_entities(&entities, "Google was co-founded by Larry Page in 1998.");

        assert_eq!(find(&rels, "Larry Page", "Google").unwrap().label, "founded");
    }

    #[test]
    fn test_employment_labels() {
        let entities = vec![
            person("Gwynne Shotwell"),
            org("SpaceX"),
            person("Jane Doe"),
            org("Initech Corp"),
        ];
        let text = "Gwynne Shotwell is president of SpaceX. Jane Doe works at Initech Corp.";
        let rels = RelationshipInferencer::default().infer_entities(&entities, text);

        let president = find(&rels, "Gwynne Shotwell", "SpaceX").unwrap();
        assert_eq!(president.label, "president_of");
        assert_eq!(president.origin, RelationOrigin::Employment);
        assert_eq!(find(&rels, "Jane Doe", "Initech Corp").unwrap().label, "works_at");
    }

    #[test]
    fn test_founding_beats_proximity() {
        let entities = vec![person("Elon Musk"), org("SpaceX")];
        let text = "Elon Musk founded SpaceX";

        let full = RelationshipInferencer::default().infer_entities(&entities, text);
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].label, "founded");

        // The same pair is also within proximity range on its own
        let proximity_only =
            RelationshipInferencer::with_layers(vec![Box::new(ProximityLayer::new(5))])
                .infer_entities(&entities, text);
        assert_eq!(proximity_only[0].label, "related");
    }

    #[test]
    fn test_family_template() {
        let entities = vec![person("Kimbal Musk"), person("Elon Musk")];
        let rels = RelationshipInferencer::default()
            .infer_entities(&entities, "Kimbal Musk is the brother of Elon Musk.");

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].label, "family");
        assert_eq!(rels[0].origin, RelationOrigin::Family);
    }

    #[test]
    fn test_family_resolution_over_connects() {
        // "wiley" resolves to every Wiley, so Otis is linked too
        let entities = vec![person("Maeve Wiley"), person("Jean Wiley"), person("Otis Wiley")];
        let layer = FamilyLayer::new();
        let text = "maeve wiley is the sister of jean wiley";
        let ctx = InferenceContext::new(text, &entities);
        let mut links = LinkSet::new();
        layer.apply(&ctx, &mut links);

        assert!(links.is_linked("Maeve Wiley", "Jean Wiley"));
        assert!(links.is_linked("Maeve Wiley", "Otis Wiley"));
        assert!(links.is_linked("Jean Wiley", "Otis Wiley"));
        assert!(links.relationships().iter().all(|r| !r.is_self_loop()));
    }

    #[test]
    fn test_family_possessive_and_adjacency() {
        let entities = vec![person("Ruth"), person("Naomi"), person("Boaz"), person("Obed")];
        let text = "Naomi's daughter Ruth stayed. Later Boaz and his son Obed arrived.";
        let ctx = InferenceContext::new(text, &entities);
        let mut links = LinkSet::new();
        FamilyLayer::new().apply(&ctx, &mut links);

        assert!(links.is_linked("Naomi", "Ruth"));
        assert!(links.is_linked("Boaz", "Obed"));
    }

    #[test]
    fn test_sentence_keyword_label() {
        let entities = vec![person("Ada Lovelace"), place("London")];
        let rels = RelationshipInferencer::default()
            .infer_entities(&entities, "Ada Lovelace lives in London.");

        let rel = find(&rels, "Ada Lovelace", "London").unwrap();
        assert_eq!(rel.label, "lives_in");
        assert_eq!(rel.origin, RelationOrigin::Sentence);
    }

    #[test]
    fn test_sentence_default_label() {
        let entities = vec![place("Paris"), place("Berlin")];
        let rels = RelationshipInferencer::default()
            .infer_entities(&entities, "Paris is nicer than Berlin in spring!");

        assert_eq!(rels[0].label, "related");
        assert_eq!(rels[0].origin, RelationOrigin::Sentence);
    }

    #[test]
    fn test_proximity_across_sentences() {
        let entities = vec![person("Ada Lovelace"), place("London")];
        let rels = RelationshipInferencer::default()
            .infer_entities(&entities, "Ada Lovelace wrote notes. London was rainy.");

        let rel = find(&rels, "Ada Lovelace", "London").unwrap();
        assert_eq!(rel.label, "related");
        assert_eq!(rel.origin, RelationOrigin::Proximity);
    }

    #[test]
    fn test_proximity_out_of_range() {
        let entities = vec![person("Ada Lovelace"), place("London")];
        let text = "Ada Lovelace wrote one two three four five six seven notes. London was rainy.";
        let rels = RelationshipInferencer::default().infer_entities(&entities, text);
        assert!(rels.is_empty());
    }

    #[test]
    fn test_proximity_skips_unsearchable_entity() {
        let entities = vec![person("Ada Lovelace"), org("!!!"), place("London")];
        let rels = RelationshipInferencer::with_layers(vec![Box::new(ProximityLayer::new(5))])
            .infer_entities(&entities, "Ada Lovelace in London !!!");

        assert_eq!(rels.len(), 1);
        assert!(find(&rels, "Ada Lovelace", "London").is_some());
    }

    #[test]
    fn test_layer_origins_follow_priority() {
        let origins: Vec<RelationOrigin> = RelationshipInferencer::default()
            .layers
            .iter()
            .map(|layer| layer.origin())
            .collect();

        assert_eq!(
            origins,
            vec![
                RelationOrigin::Founding,
                RelationOrigin::Employment,
                RelationOrigin::Family,
                RelationOrigin::Sentence,
                RelationOrigin::Proximity,
            ]
        );
    }

    #[test]
    fn test_link_set_rejects_duplicates_and_self_loops() {
        let mut links = LinkSet::new();
        assert!(links.link("A", "B", "founded", RelationOrigin::Founding));
        assert!(!links.link("B", "A", "related", RelationOrigin::Proximity));
        assert!(!links.link("A", "A", "related", RelationOrigin::Proximity));

        assert_eq!(links.len(), 1);
        assert_eq!(links.relationships()[0].label, "founded");
    }

    #[test]
    fn test_too_few_entities() {
        let inferencer = RelationshipInferencer::default();
        assert!(inferencer.infer_entities(&[person("Solo")], "Solo founded things.").is_empty());
        assert!(inferencer.infer(&EntityBuckets::new(), "nothing here").is_empty());
        assert_eq!(
            inferencer.layer_names(),
            vec!["founding", "employment", "family", "sentence", "proximity"]
        );
    }
}
