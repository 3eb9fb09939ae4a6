//! Name matching cascade.

use folio_core::{FileDescriptor, base_name_of};

/// Strategies tried, in order, to bind a requested name to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MatchStrategy {
    /// Names are identical
    #[display("exact")]
    Exact,
    /// Names are equal ignoring case
    #[display("case-insensitive")]
    CaseInsensitive,
    /// The file name contains the requested name
    #[display("candidate-contains")]
    CandidateContains,
    /// The requested name contains the file name
    #[display("requested-contains")]
    RequestedContains,
    /// Names are equal up to their first dot
    #[display("stem")]
    Stem,
}

impl MatchStrategy {
    /// Cascade order.
    pub const CASCADE: [MatchStrategy; 5] = [
        MatchStrategy::Exact,
        MatchStrategy::CaseInsensitive,
        MatchStrategy::CandidateContains,
        MatchStrategy::RequestedContains,
        MatchStrategy::Stem,
    ];

    /// Whether `candidate` satisfies this strategy for `requested`.
    pub fn matches(&self, requested: &str, candidate: &str) -> bool {
        match self {
            MatchStrategy::Exact => candidate == requested,
            MatchStrategy::CaseInsensitive => candidate.to_lowercase() == requested.to_lowercase(),
            MatchStrategy::CandidateContains => candidate.contains(requested),
            MatchStrategy::RequestedContains => requested.contains(candidate),
            MatchStrategy::Stem => base_name_of(candidate) == base_name_of(requested),
        }
    }
}

/// Find the file a tag refers to.
///
/// The first strategy with any match wins. When a strategy matches several
/// files, the first one in `candidates` order is taken.
pub fn find_match<'a>(
    requested: &str,
    candidates: &'a [FileDescriptor],
) -> Option<(&'a FileDescriptor, MatchStrategy)> {
    if requested.is_empty() {
        return None;
    }
    MatchStrategy::CASCADE.iter().find_map(|strategy| {
        candidates
            .iter()
            .filter(|c| !c.name.is_empty())
            .find(|c| strategy.matches(requested, &c.name))
            .map(|c| (c, *strategy))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::StorageTier;

    fn files(names: &[&str]) -> Vec<FileDescriptor> {
        names
            .iter()
            .map(|n| FileDescriptor::new(*n, "contents/images/", 1, StorageTier::EphemeralKv))
            .collect()
    }

    #[test]
    fn exact_beats_earlier_substring_match() {
        let candidates = files(&["diagram-final.png", "diagram.png"]);
        let (found, strategy) = find_match("diagram.png", &candidates).unwrap();
        assert_eq!(found.name, "diagram.png");
        assert_eq!(strategy, MatchStrategy::Exact);
    }

    #[test]
    fn ties_go_to_encounter_order() {
        let candidates = files(&["diagram-final.png", "diagram-draft.png"]);
        let (found, strategy) = find_match("diagram", &candidates).unwrap();
        assert_eq!(found.name, "diagram-final.png");
        assert_eq!(strategy, MatchStrategy::CandidateContains);
    }

    #[test]
    fn each_step_of_the_cascade() {
        let candidates = files(&["Logo.PNG"]);
        assert_eq!(
            find_match("logo.png", &candidates).unwrap().1,
            MatchStrategy::CaseInsensitive
        );

        let candidates = files(&["logo.png"]);
        assert_eq!(
            find_match("see logo.png here", &candidates).unwrap().1,
            MatchStrategy::RequestedContains
        );

        let candidates = files(&["report.pdf"]);
        assert_eq!(
            find_match("report.docx", &candidates).unwrap().1,
            MatchStrategy::Stem
        );
        assert!(find_match("summary.docx", &candidates).is_none());
    }

    #[test]
    fn stem_ignores_every_extension() {
        let candidates = files(&["photo.final.png"]);
        let (found, strategy) = find_match("photo.jpg", &candidates).unwrap();
        assert_eq!(found.name, "photo.final.png");
        assert_eq!(strategy, MatchStrategy::Stem);

        let candidates = files(&["archive.zip"]);
        assert_eq!(
            find_match("archive.tar.gz", &candidates).unwrap().1,
            MatchStrategy::Stem
        );
    }

    #[test]
    fn empty_request_matches_nothing() {
        assert!(find_match("", &files(&["a.png"])).is_none());
    }
}
