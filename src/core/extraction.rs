use std::collections::HashSet;
use validator::Validate;

use crate::models::{ImageDescriptor, Location, PetDescription, Province, ReportRequest, Size, Species, ValidationError};

const DEFAULT_COLOR: &str = "unknown";

const DOG_WORDS: &[&str] = &["dog", "dogs", "puppy", "pup", "perro", "perra", "perrito", "perrita", "cachorro", "cachorra", "zaguate"];
const CAT_WORDS: &[&str] = &["cat", "cats", "kitten", "kitty", "gato", "gata", "gatito", "gatita"];
const OTHER_WORDS: &[&str] = &["rabbit", "bunny", "bird", "parrot", "hamster", "turtle", "conejo", "pajaro", "pájaro", "loro", "tortuga"];

const SMALL_WORDS: &[&str] = &["small", "little", "tiny", "pequeño", "pequeña", "pequeno", "pequena", "chiquito", "chiquita"];
const MEDIUM_WORDS: &[&str] = &["medium", "mediano", "mediana", "mid-sized"];
const LARGE_WORDS: &[&str] = &["large", "big", "huge", "grande", "enorme"];

/// Color words mapped to the English name stored in descriptions
const COLORS: &[(&str, &str)] = &[
    ("white", "white"),
    ("blanco", "white"),
    ("blanca", "white"),
    ("black", "black"),
    ("negro", "black"),
    ("negra", "black"),
    ("brown", "brown"),
    ("café", "brown"),
    ("cafe", "brown"),
    ("marrón", "brown"),
    ("marron", "brown"),
    ("golden", "golden"),
    ("dorado", "golden"),
    ("dorada", "golden"),
    ("gray", "gray"),
    ("grey", "gray"),
    ("gris", "gray"),
    ("orange", "orange"),
    ("naranja", "orange"),
    ("anaranjado", "orange"),
    ("cream", "cream"),
    ("crema", "cream"),
    ("tan", "tan"),
    ("beige", "tan"),
    ("yellow", "yellow"),
    ("amarillo", "yellow"),
    ("amarilla", "yellow"),
    ("brindle", "brindle"),
    ("atigrado", "brindle"),
    ("atigrada", "brindle"),
    ("calico", "calico"),
    ("tricolor", "tricolor"),
];

/// Breed names and the species they imply
const BREEDS: &[(&str, &str, Species)] = &[
    ("golden retriever", "golden retriever", Species::Dog),
    ("labrador", "labrador", Species::Dog),
    ("german shepherd", "german shepherd", Species::Dog),
    ("pastor alemán", "german shepherd", Species::Dog),
    ("pastor aleman", "german shepherd", Species::Dog),
    ("chihuahua", "chihuahua", Species::Dog),
    ("poodle", "poodle", Species::Dog),
    ("french poodle", "poodle", Species::Dog),
    ("beagle", "beagle", Species::Dog),
    ("husky", "husky", Species::Dog),
    ("bulldog", "bulldog", Species::Dog),
    ("schnauzer", "schnauzer", Species::Dog),
    ("dachshund", "dachshund", Species::Dog),
    ("salchicha", "dachshund", Species::Dog),
    ("pitbull", "pitbull", Species::Dog),
    ("pit bull", "pitbull", Species::Dog),
    ("boxer", "boxer", Species::Dog),
    ("rottweiler", "rottweiler", Species::Dog),
    ("shih tzu", "shih tzu", Species::Dog),
    ("yorkshire", "yorkshire terrier", Species::Dog),
    ("border collie", "border collie", Species::Dog),
    ("mixed breed", "mixed breed", Species::Dog),
    ("siamese", "siamese", Species::Cat),
    ("siamés", "siamese", Species::Cat),
    ("siames", "siamese", Species::Cat),
    ("persian", "persian", Species::Cat),
    ("persa", "persian", Species::Cat),
    ("maine coon", "maine coon", Species::Cat),
    ("bengal", "bengal", Species::Cat),
    ("angora", "angora", Species::Cat),
];

/// Words that mark a clause as describing a distinctive feature
const FEATURE_WORDS: &[&str] = &[
    "collar", "spot", "spots", "scar", "scars", "ear", "ears", "eye", "eyes", "tail", "tag", "tags",
    "limp", "limps", "limping", "patch", "patches", "mark", "marks", "marking", "markings", "stripe",
    "stripes", "paw", "paws", "chip", "microchip", "harness", "bandana", "leg", "blind",
    "mancha", "manchas", "cicatriz", "oreja", "orejas", "ojo", "ojos", "cola", "placa", "cojea",
    "pata", "patas", "arnés", "arnes", "pañuelo",
];

/// Leading words dropped from feature clauses
const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "has", "have", "had", "his", "her", "its", "is", "was", "with", "wearing",
    "and", "also", "un", "una", "el", "la", "los", "las", "tiene", "con", "lleva", "y",
];

const PUPPY_WORDS: &[&str] = &["puppy", "pup", "kitten", "cachorro", "cachorra", "gatito", "gatita", "perrito", "perrita"];
const SENIOR_WORDS: &[&str] = &["senior", "old", "elderly", "viejo", "vieja", "anciano", "anciana"];
const YEAR_WORDS: &[&str] = &["year", "years", "yr", "yrs", "año", "años", "ano", "anos"];
const MONTH_WORDS: &[&str] = &["month", "months", "mes", "meses"];

/// Attributes recovered from one source (images or text)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedAttributes {
    pub species: Option<Species>,
    pub size: Option<Size>,
    pub colors: Vec<String>,
    pub distinctive_features: Vec<String>,
    pub breed: Option<String>,
    pub approximate_age: Option<String>,
}

impl ExtractedAttributes {
    /// Merge with `other`, preferring values already present in `self`
    pub fn or(self, other: ExtractedAttributes) -> ExtractedAttributes {
        ExtractedAttributes {
            species: self.species.or(other.species),
            size: self.size.or(other.size),
            colors: merge_unique(self.colors, other.colors),
            distinctive_features: merge_unique(self.distinctive_features, other.distinctive_features),
            breed: self.breed.or(other.breed),
            approximate_age: self.approximate_age.or(other.approximate_age),
        }
    }
}

/// Turns a raw report into a validated `PetDescription`
///
/// Extraction is deterministic: image descriptors come pre-analyzed and the
/// free text goes through a keyword lexicon.
#[derive(Debug, Clone, Default)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Run the full extraction stage
    pub fn extract(&self, request: &ReportRequest) -> Result<PetDescription, ValidationError> {
        request
            .validate()
            .map_err(|e| ValidationError::InvalidRequest(e.to_string()))?;

        let location = parse_location(request)?;
        let image_data = self.analyze_images(&request.images);
        let text_data = self.analyze_text(&request.description);

        tracing::debug!(
            "Extracted {} image colors and {} text colors",
            image_data.colors.len(),
            text_data.colors.len()
        );

        let merged = image_data.or(text_data);
        let colors = if merged.colors.is_empty() {
            vec![DEFAULT_COLOR.to_string()]
        } else {
            merged.colors
        };

        PetDescription {
            species: merged.species.unwrap_or(Species::Other),
            size: merged.size.unwrap_or(Size::Medium),
            colors,
            distinctive_features: merged.distinctive_features,
            breed: merged.breed,
            approximate_age: merged.approximate_age,
            last_seen_location: location,
            last_seen_date: request.last_seen_date,
        }
        .into_validated()
    }

    /// Combine image descriptors: first value wins, lists are concatenated
    pub fn analyze_images(&self, images: &[ImageDescriptor]) -> ExtractedAttributes {
        images
            .iter()
            .map(image_attributes)
            .fold(ExtractedAttributes::default(), ExtractedAttributes::or)
    }

    /// Keyword analysis of the free-text description
    pub fn analyze_text(&self, description: &str) -> ExtractedAttributes {
        let text = description.to_lowercase();
        let tokens = tokenize(&text);

        let breed = BREEDS
            .iter()
            .find(|(phrase, _, _)| contains_phrase(&tokens, phrase));

        let species = first_match(&tokens, |t| {
            if DOG_WORDS.contains(&t) {
                Some(Species::Dog)
            } else if CAT_WORDS.contains(&t) {
                Some(Species::Cat)
            } else if OTHER_WORDS.contains(&t) {
                Some(Species::Other)
            } else {
                None
            }
        })
        .or_else(|| breed.map(|(_, _, species)| *species));

        let size = first_match(&tokens, |t| {
            if SMALL_WORDS.contains(&t) {
                Some(Size::Small)
            } else if MEDIUM_WORDS.contains(&t) {
                Some(Size::Medium)
            } else if LARGE_WORDS.contains(&t) {
                Some(Size::Large)
            } else {
                None
            }
        });

        let mut colors = Vec::new();
        let mut distinctive_features = Vec::new();

        for clause in clauses(&text) {
            let words = tokenize(clause);
            let (subject, rest) = split_subject(&words);
            colors.extend(coat_colors(subject));

            if rest.iter().any(|w| FEATURE_WORDS.contains(w)) {
                if let Some(feature) = strip_filler(rest) {
                    distinctive_features.push(feature);
                }
            } else {
                colors.extend(coat_colors(rest));
            }
        }

        ExtractedAttributes {
            species,
            size,
            colors: merge_unique(colors, Vec::new()),
            distinctive_features: merge_unique(distinctive_features, Vec::new()),
            breed: breed.map(|(_, name, _)| name.to_string()),
            approximate_age: approximate_age(&tokens),
        }
    }
}

fn parse_location(request: &ReportRequest) -> Result<Location, ValidationError> {
    let input = &request.location;
    let province = input.province.parse::<Province>()?;

    Ok(Location::new(province, input.canton.as_str(), input.district.as_str())?
        .with_details(input.additional_details.clone())
        .with_coordinates(input.coordinates))
}

fn image_attributes(image: &ImageDescriptor) -> ExtractedAttributes {
    let species = image.species.as_deref().and_then(|s| match s.parse::<Species>() {
        Ok(species) => Some(species),
        Err(e) => {
            tracing::debug!("Ignoring image species: {}", e);
            None
        }
    });
    let size = image.size.as_deref().and_then(|s| match s.parse::<Size>() {
        Ok(size) => Some(size),
        Err(e) => {
            tracing::debug!("Ignoring image size: {}", e);
            None
        }
    });

    ExtractedAttributes {
        species,
        size,
        colors: image
            .colors
            .iter()
            .map(|c| {
                let color = c.trim().to_lowercase();
                color_name(&color).map(String::from).unwrap_or(color)
            })
            .collect(),
        distinctive_features: image.distinctive_features.clone(),
        breed: non_blank(image.breed.as_deref()),
        approximate_age: non_blank(image.approximate_age.as_deref()),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Concatenate two lists, dropping blanks and case-insensitive repeats
fn merge_unique(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.to_lowercase()))
        .collect()
}

fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|t| !t.is_empty())
        .collect()
}

fn first_match<T>(tokens: &[&str], classify: impl Fn(&str) -> Option<T>) -> Option<T> {
    tokens.iter().find_map(|t| classify(t))
}

fn contains_phrase(tokens: &[&str], phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    !words.is_empty() && tokens.windows(words.len()).any(|w| w == words.as_slice())
}

fn color_name(word: &str) -> Option<&'static str> {
    COLORS
        .iter()
        .find(|(alias, _)| *alias == word)
        .map(|(_, name)| *name)
}

fn coat_colors(words: &[&str]) -> Vec<String> {
    words
        .iter()
        .filter_map(|w| color_name(w))
        .map(String::from)
        .collect()
}

fn is_subject_word(word: &str) -> bool {
    DOG_WORDS.contains(&word)
        || CAT_WORDS.contains(&word)
        || OTHER_WORDS.contains(&word)
        || BREEDS
            .iter()
            .any(|(phrase, _, _)| phrase.split_whitespace().last() == Some(word))
}

/// Split a clause after its last animal word
///
/// Colors before the animal describe the coat even when the rest of the
/// clause names a feature ("brown dog missing a leg").
fn split_subject<'a, 'b>(words: &'a [&'b str]) -> (&'a [&'b str], &'a [&'b str]) {
    match words.iter().rposition(|w| is_subject_word(w)) {
        Some(i) => words.split_at(i + 1),
        None => words.split_at(0),
    }
}

/// Split text into clauses on punctuation and on joining words
fn clauses(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();

    for sentence in text.split(|c: char| matches!(c, '.' | ',' | ';' | '!' | '?' | '\n')) {
        let mut rest = sentence;
        loop {
            let next = [" and ", " with ", " y ", " con "]
                .iter()
                .filter_map(|sep| rest.find(sep).map(|i| (i, sep.len())))
                .min_by_key(|(i, _)| *i);

            match next {
                Some((i, len)) => {
                    parts.push(&rest[..i]);
                    rest = &rest[i + len..];
                }
                None => {
                    parts.push(rest);
                    break;
                }
            }
        }
    }

    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

fn strip_filler(words: &[&str]) -> Option<String> {
    let start = words.iter().position(|w| !FILLER_WORDS.contains(w))?;
    Some(words[start..].join(" "))
}

fn approximate_age(tokens: &[&str]) -> Option<String> {
    for pair in tokens.windows(2) {
        if let Ok(n) = pair[0].parse::<u32>() {
            if YEAR_WORDS.contains(&pair[1]) {
                return Some(format!("{} {}", n, if n == 1 { "year" } else { "years" }));
            }
            if MONTH_WORDS.contains(&pair[1]) {
                return Some(format!("{} {}", n, if n == 1 { "month" } else { "months" }));
            }
        }
    }

    if tokens.iter().any(|t| PUPPY_WORDS.contains(t)) {
        Some("puppy".to_string())
    } else if tokens.iter().any(|t| SENIOR_WORDS.contains(t)) {
        Some("senior".to_string())
    } else {
        None
    }
}
