//! Named-entity counts over the tokenized tweet.
//!
//! Tokens are tagged by three stacked layers, each only touching tokens the
//! previous layers left untagged:
//!
//! 1. gazetteers: multi-word phrases, then capitalized runs closed by an
//!    organisation/facility/event/law keyword
//! 2. patterns: money, percentages, times, dates, ordinals, quantities and
//!    cardinals, plus single-word gazetteers
//! 3. heuristics: quoted titles, honorifics and capitalized runs as persons
//!
//! A multi-token entity counts once per token, so "New York" adds 2 to GPE.

use super::FeatureExtractor;
use crate::dataset::{tokens_of, Table};
use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Person,
    Norp,
    Fac,
    Org,
    Gpe,
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
}

impl EntityType {
    pub const ALL: [EntityType; 18] = [
        EntityType::Person,
        EntityType::Norp,
        EntityType::Fac,
        EntityType::Org,
        EntityType::Gpe,
        EntityType::Loc,
        EntityType::Product,
        EntityType::Event,
        EntityType::WorkOfArt,
        EntityType::Law,
        EntityType::Language,
        EntityType::Date,
        EntityType::Time,
        EntityType::Percent,
        EntityType::Money,
        EntityType::Quantity,
        EntityType::Ordinal,
        EntityType::Cardinal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Norp => "NORP",
            EntityType::Fac => "FAC",
            EntityType::Org => "ORG",
            EntityType::Gpe => "GPE",
            EntityType::Loc => "LOC",
            EntityType::Product => "PRODUCT",
            EntityType::Event => "EVENT",
            EntityType::WorkOfArt => "WORK_OF_ART",
            EntityType::Law => "LAW",
            EntityType::Language => "LANGUAGE",
            EntityType::Date => "DATE",
            EntityType::Time => "TIME",
            EntityType::Percent => "PERCENT",
            EntityType::Money => "MONEY",
            EntityType::Quantity => "QUANTITY",
            EntityType::Ordinal => "ORDINAL",
            EntityType::Cardinal => "CARDINAL",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

const PHRASES: &[(&str, EntityType)] = &[
    ("new york", EntityType::Gpe),
    ("new york city", EntityType::Gpe),
    ("los angeles", EntityType::Gpe),
    ("san francisco", EntityType::Gpe),
    ("hong kong", EntityType::Gpe),
    ("united states", EntityType::Gpe),
    ("united kingdom", EntityType::Gpe),
    ("south africa", EntityType::Gpe),
    ("south korea", EntityType::Gpe),
    ("new zealand", EntityType::Gpe),
    ("silicon valley", EntityType::Loc),
    ("middle east", EntityType::Loc),
    ("north america", EntityType::Loc),
    ("south america", EntityType::Loc),
    ("latin america", EntityType::Loc),
    ("world cup", EntityType::Event),
    ("super bowl", EntityType::Event),
    ("world war", EntityType::Event),
    ("black friday", EntityType::Date),
    ("new year", EntityType::Date),
    ("last year", EntityType::Date),
    ("next year", EntityType::Date),
    ("this year", EntityType::Date),
    ("last week", EntityType::Date),
    ("next week", EntityType::Date),
    ("this week", EntityType::Date),
    ("this morning", EntityType::Time),
    ("this afternoon", EntityType::Time),
    ("this evening", EntityType::Time),
    ("last night", EntityType::Time),
    ("european union", EntityType::Org),
    ("united nations", EntityType::Org),
    ("white house", EntityType::Org),
    ("google brain", EntityType::Org),
];

const GPE: &[&str] = &[
    "america", "usa", "us", "uk", "canada", "mexico", "brazil", "argentina", "germany",
    "france", "spain", "italy", "portugal", "netherlands", "belgium", "switzerland", "austria",
    "poland", "sweden", "norway", "denmark", "finland", "ireland", "russia", "ukraine",
    "china", "japan", "korea", "india", "pakistan", "indonesia", "australia", "egypt",
    "nigeria", "kenya", "israel", "iran", "iraq", "turkey", "greece", "london", "paris",
    "berlin", "madrid", "rome", "tokyo", "beijing", "shanghai", "delhi", "mumbai", "moscow",
    "sydney", "toronto", "boston", "chicago", "seattle", "texas", "california", "florida",
    "washington", "osnabrück", "osnabrueck", "munich", "hamburg",
];

const NORP: &[&str] = &[
    "american", "americans", "british", "canadian", "mexican", "brazilian", "german",
    "germans", "french", "spanish", "italian", "dutch", "swedish", "russian", "ukrainian",
    "chinese", "japanese", "korean", "indian", "australian", "european", "europeans",
    "african", "asian", "christian", "christians", "muslim", "muslims", "jewish", "hindu",
    "buddhist", "catholic", "democrat", "democrats", "republican", "republicans",
    "democratic", "conservative", "liberal", "liberals", "socialist",
];

const LANGUAGES: &[&str] = &[
    "english", "french", "german", "spanish", "italian", "portuguese", "dutch", "russian",
    "chinese", "mandarin", "japanese", "korean", "arabic", "hindi", "latin",
];

const LANGUAGE_CUES: &[&str] = &["in", "speak", "speaks", "speaking", "learn", "learning", "translated"];

const LOC: &[&str] = &[
    "europe", "asia", "africa", "antarctica", "oceania", "arctic", "atlantic", "pacific",
    "mediterranean", "alps", "himalayas", "sahara", "earth", "mars",
];

const ORG: &[&str] = &[
    "google", "microsoft", "facebook", "meta", "twitter", "openai", "deepmind", "nvidia",
    "intel", "ibm", "tesla", "spacex", "netflix", "github", "youtube", "linkedin", "nasa",
    "fbi", "cia", "nato", "eu", "unicef", "amazon", "mit", "stanford", "harvard",
    "oxford", "cambridge", "bbc", "cnn", "reuters", "kaggle", "huggingface", "anthropic",
];

const PRODUCT: &[&str] = &[
    "iphone", "ipad", "android", "linux", "macos", "tensorflow", "pytorch",
    "keras", "chatgpt", "gpt-3", "gpt-4", "alexa", "siri", "xbox", "playstation", "kindle",
    "photoshop", "jupyter",
];

const EVENTS: &[&str] = &[
    "olympics", "neurips", "icml", "iclr", "cvpr", "ces", "sxsw", "wimbledon", "brexit",
    "hackathon",
];

const LAWS: &[&str] = &["gdpr", "hipaa", "ccpa"];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug",
    "sep", "sept", "oct", "nov", "dec",
];

const DATE_WORDS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "today",
    "yesterday", "tomorrow", "weekend", "christmas", "easter", "halloween", "thanksgiving",
];

const TIME_WORDS: &[&str] = &["tonight", "midnight", "noon", "am", "pm"];

const ORDINAL_WORDS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
    "tenth",
];

const CARDINAL_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "twenty", "thirty", "fifty", "hundred", "hundreds", "thousand", "thousands",
    "million", "millions", "billion", "billions", "dozen",
];

const CURRENCY_WORDS: &[&str] = &["dollar", "dollars", "usd", "euro", "euros", "eur", "pounds", "cents", "bucks"];

const PERCENT_WORDS: &[&str] = &["percent", "%", "pct"];

const UNIT_WORDS: &[&str] = &[
    "km", "kilometers", "kilometres", "miles", "mile", "meters", "metres", "kg", "kilograms",
    "pounds", "lbs", "tons", "gb", "tb", "mb", "gigabytes", "terabytes", "degrees", "feet",
    "inches", "liters", "litres",
];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "llc", "gmbh", "university", "institute", "college",
    "association", "foundation", "labs", "lab", "company", "group", "agency", "ministry",
    "department", "council", "committee",
];

const FAC_SUFFIXES: &[&str] = &[
    "airport", "bridge", "stadium", "tower", "hall", "station", "museum", "arena", "hospital",
    "library", "park",
];

const EVENT_SUFFIXES: &[&str] = &[
    "conference", "summit", "festival", "championship", "championships", "war", "games",
    "expo", "cup", "awards",
];

const LAW_SUFFIXES: &[&str] = &["act", "law", "amendment", "constitution", "treaty", "regulation"];

const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "professor", "sir", "dame", "president",
    "senator", "minister", "ceo", "pope", "king", "queen", "prince", "princess",
];

const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "it", "its", "i", "we", "you", "he",
    "she", "they", "my", "our", "your", "his", "her", "their", "in", "on", "at", "for", "of",
    "and", "but", "or", "if", "so", "what", "why", "how", "when", "where", "who", "is",
    "are", "was", "were", "be", "just", "new", "rt", "via", "with", "from", "to", "by",
    "check", "read", "join", "great", "happy",
];

struct Lexicon {
    phrases: HashMap<String, EntityType>,
    words: HashMap<&'static str, EntityType>,
    languages: HashSet<&'static str>,
    function_words: HashSet<&'static str>,
    honorifics: HashSet<&'static str>,
    suffixes: HashMap<&'static str, EntityType>,
}

fn lexicon() -> &'static Lexicon {
    static LEX: OnceLock<Lexicon> = OnceLock::new();
    LEX.get_or_init(|| {
        let mut words = HashMap::new();
        let tables: [(&[&str], EntityType); 12] = [
            (GPE, EntityType::Gpe),
            (NORP, EntityType::Norp),
            (LOC, EntityType::Loc),
            (ORG, EntityType::Org),
            (PRODUCT, EntityType::Product),
            (EVENTS, EntityType::Event),
            (LAWS, EntityType::Law),
            (MONTHS, EntityType::Date),
            (DATE_WORDS, EntityType::Date),
            (TIME_WORDS, EntityType::Time),
            (ORDINAL_WORDS, EntityType::Ordinal),
            (CARDINAL_WORDS, EntityType::Cardinal),
        ];
        for (list, kind) in tables {
            for word in list {
                words.entry(*word).or_insert(kind);
            }
        }
        let mut suffixes = HashMap::new();
        for (list, kind) in [
            (ORG_SUFFIXES, EntityType::Org),
            (FAC_SUFFIXES, EntityType::Fac),
            (EVENT_SUFFIXES, EntityType::Event),
            (LAW_SUFFIXES, EntityType::Law),
        ] {
            for word in list {
                suffixes.insert(*word, kind);
            }
        }
        Lexicon {
            phrases: PHRASES
                .iter()
                .map(|(p, kind)| (p.to_string(), *kind))
                .collect(),
            words,
            languages: LANGUAGES.iter().copied().collect(),
            function_words: FUNCTION_WORDS.iter().copied().collect(),
            honorifics: HONORIFICS.iter().copied().collect(),
            suffixes,
        }
    })
}

struct Patterns {
    money: Regex,
    percent: Regex,
    time: Regex,
    date: Regex,
    ordinal: Regex,
    quantity: Regex,
    number: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let build = |re: &str| Regex::new(re).expect("entity pattern is valid");
        Patterns {
            money: build(r"^[$€£¥]\d[\d,]*(\.\d+)?[kmb]?$|^\d[\d,]*(\.\d+)?[$€£¥]$"),
            percent: build(r"^[+-]?\d+(\.\d+)?%$"),
            time: build(r"^\d{1,2}:\d{2}(:\d{2})?(am|pm)?$|^\d{1,2}(am|pm)$"),
            date: build(r"^(19|20)\d{2}s?$|^\d{4}-\d{2}-\d{2}$|^\d{1,2}[./]\d{1,2}[./]\d{2,4}$"),
            ordinal: build(r"^\d+(st|nd|rd|th)$"),
            quantity: build(r"^\d+(\.\d+)?(km|kg|mb|gb|tb|cm|mm|lbs?|mph|kmh|ml)$"),
            number: build(r"^[+-]?\d[\d,]*(\.\d+)?[kmb]?$"),
        }
    })
}

fn normalize(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric() && !"$€£¥%-".contains(c))
        .to_lowercase()
}

fn is_capitalized(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.any(|c| c.is_lowercase()),
        _ => false,
    }
}

/// Runs of capitalized, untagged, non-function tokens as `(start, end)`.
fn capitalized_runs(
    tokens: &[String],
    lower: &[String],
    tags: &[Option<EntityType>],
) -> Vec<(usize, usize)> {
    let lex = lexicon();
    let mut runs = Vec::new();
    let mut start = None;
    for i in 0..=tokens.len() {
        let inside = i < tokens.len()
            && tags[i].is_none()
            && is_capitalized(&tokens[i])
            && !lex.function_words.contains(lower[i].as_str())
            && !lex.honorifics.contains(lower[i].as_str());
        match (inside, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    runs
}

fn tag_span(tags: &mut [Option<EntityType>], start: usize, end: usize, kind: EntityType) {
    for tag in &mut tags[start..end] {
        *tag = Some(kind);
    }
}

/// Entity type for each token, `None` for tokens outside any entity.
pub fn tag_tokens(tokens: &[String]) -> Vec<Option<EntityType>> {
    let lex = lexicon();
    let pat = patterns();
    let lower: Vec<String> = tokens.iter().map(|t| normalize(t)).collect();
    let mut tags: Vec<Option<EntityType>> = vec![None; tokens.len()];

    // phrases, longest first
    let mut i = 0;
    while i < tokens.len() {
        let mut matched = 0;
        for len in (2..=3).rev() {
            if i + len > tokens.len() {
                continue;
            }
            let phrase = lower[i..i + len].join(" ");
            if let Some(&kind) = lex.phrases.get(&phrase) {
                tag_span(&mut tags, i, i + len, kind);
                matched = len;
                break;
            }
        }
        i += matched.max(1);
    }

    // capitalized runs closed by a keyword: "Osnabrück University", "Patriot Act"
    for (start, end) in capitalized_runs(tokens, &lower, &tags) {
        if end - start < 2 {
            continue;
        }
        if let Some(&kind) = lex.suffixes.get(lower[end - 1].as_str()) {
            tag_span(&mut tags, start, end, kind);
        }
    }

    for i in 0..tokens.len() {
        if tags[i].is_some() || lower[i].is_empty() {
            continue;
        }
        let word = lower[i].as_str();
        let next = lower.get(i + 1).map(String::as_str).unwrap_or("");
        let prev = if i > 0 { lower[i - 1].as_str() } else { "" };

        let kind = if pat.money.is_match(word) {
            Some(EntityType::Money)
        } else if pat.percent.is_match(word) {
            Some(EntityType::Percent)
        } else if pat.time.is_match(word) {
            Some(EntityType::Time)
        } else if pat.date.is_match(word) {
            Some(EntityType::Date)
        } else if pat.ordinal.is_match(word) {
            Some(EntityType::Ordinal)
        } else if pat.quantity.is_match(word) {
            Some(EntityType::Quantity)
        } else if pat.number.is_match(word) || CARDINAL_WORDS.contains(&word) {
            // the unit word after a number joins the entity
            let follow = if CURRENCY_WORDS.contains(&next) {
                Some(EntityType::Money)
            } else if PERCENT_WORDS.contains(&next) {
                Some(EntityType::Percent)
            } else if UNIT_WORDS.contains(&next) {
                Some(EntityType::Quantity)
            } else {
                None
            };
            match follow {
                Some(kind) if i + 1 < tokens.len() && tags[i + 1].is_none() => {
                    tags[i + 1] = Some(kind);
                    Some(kind)
                }
                _ => Some(EntityType::Cardinal),
            }
        } else if lex.languages.contains(word) && LANGUAGE_CUES.contains(&prev) {
            Some(EntityType::Language)
        } else if word == "may" || word == "march" || word == "am" || word == "us" {
            // ambiguous with common words; only trust the capitalized form
            let is_upper = tokens[i].chars().next().is_some_and(char::is_uppercase);
            match (word, is_upper) {
                ("us", _) if tokens[i].contains("US") => Some(EntityType::Gpe),
                ("may" | "march", true) => Some(EntityType::Date),
                ("am", _) if i > 0 && pat.number.is_match(prev) => Some(EntityType::Time),
                _ => None,
            }
        } else {
            lex.words.get(word).copied()
        };
        if kind.is_some() {
            tags[i] = kind;
        }
    }

    // quoted titles: "The Social Dilemma"
    let mut i = 0;
    while i < tokens.len() {
        let opens = tokens[i].starts_with('"') || tokens[i].starts_with('“');
        if opens && is_capitalized(tokens[i].trim_start_matches(|c| c == '"' || c == '“')) {
            let close = (i..tokens.len().min(i + 8)).find(|&j| {
                let t = &tokens[j];
                (j > i || t.chars().count() > 1) && (t.ends_with('"') || t.ends_with('”'))
            });
            if let Some(end) = close {
                if tags[i..=end].iter().all(Option::is_none) {
                    tag_span(&mut tags, i, end + 1, EntityType::WorkOfArt);
                    i = end + 1;
                    continue;
                }
            }
        }
        i += 1;
    }

    // persons: after an honorific, or a run of two or more capitalized words
    for (start, end) in capitalized_runs(tokens, &lower, &tags) {
        let titled = start > 0 && lex.honorifics.contains(lower[start - 1].as_str());
        if titled || end - start >= 2 {
            tag_span(&mut tags, start, end, EntityType::Person);
        }
    }

    tags
}

/// Per-type entity token counts in [`EntityType::ALL`] order.
pub fn count_entities(tokens: &[String]) -> Vec<f64> {
    let mut counts = vec![0.0; EntityType::ALL.len()];
    for kind in tag_tokens(tokens).into_iter().flatten() {
        counts[kind.index()] += 1.0;
    }
    counts
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntities {
    pub column: String,
}

impl NamedEntities {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
        }
    }
}

impl FeatureExtractor for NamedEntities {
    fn input_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn feature_name(&self) -> String {
        format!("{}_ner", self.column)
    }

    fn feature_names(&self) -> Vec<String> {
        let prefix = self.feature_name();
        EntityType::ALL
            .iter()
            .map(|kind| format!("{prefix}_{}", kind.label()))
            .collect()
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        Ok(table
            .column(&self.column)?
            .iter()
            .map(|cell| count_entities(&tokens_of(cell)))
            .collect())
    }
}
