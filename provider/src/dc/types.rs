//! Publication type label -> info:eu-repo/semantics type URI.

use tracing::warn;

const SEMANTICS: &str = "info:eu-repo/semantics/";

/// Used for every label missing from [`TYPE_TABLE`].
pub const OTHER_TYPE: &str = "info:eu-repo/semantics/other";

/// Export labels (lowercase) and their vocabulary term.
const TYPE_TABLE: &[(&str, &str)] = &[
    ("article in a journal", "article"),
    ("article in journal", "article"),
    ("journal article", "article"),
    ("article in proceedings", "conferenceObject"),
    ("conference paper", "conferenceObject"),
    ("poster", "conferenceObject"),
    ("abstract", "conferenceObject"),
    ("book", "book"),
    ("monograph", "book"),
    ("edited book", "book"),
    ("chapter in book", "bookPart"),
    ("book chapter", "bookPart"),
    ("technical report", "report"),
    ("report", "report"),
    ("research report", "report"),
    ("doctoral thesis", "doctoralThesis"),
    ("phd thesis", "doctoralThesis"),
    ("master thesis", "masterThesis"),
    ("master's thesis", "masterThesis"),
    ("bachelor thesis", "bachelorThesis"),
    ("lecture", "lecture"),
    ("invited talk", "lecture"),
    ("presentation", "lecture"),
    ("review", "review"),
    ("patent", "patent"),
    ("preprint", "preprint"),
    ("working paper", "workingPaper"),
    ("annotation", "annotation"),
    ("article in periodical", "contributionToPeriodical"),
];

/// Map a free-text type label to a vocabulary URI. Total: unknown labels
/// map to [`OTHER_TYPE`].
pub fn map_type(label: &str) -> String {
    let key = label.trim().to_lowercase();
    match TYPE_TABLE.iter().find(|(name, _)| *name == key) {
        Some((_, term)) => format!("{}{}", SEMANTICS, term),
        None => {
            warn!("Unmapped publication type [{}]", label);
            OTHER_TYPE.to_string()
        }
    }
}
