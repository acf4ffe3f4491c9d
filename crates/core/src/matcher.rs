use crate::build::BuildRecord;

/// Picks the build to compare `current` against.
///
/// Candidates are scanned in the order the build source returned them, which
/// is creation time ascending. The current build itself and builds that are
/// still running are skipped; the first remaining build equivalent to
/// `current` wins.
pub fn select_previous<'a>(
    candidates: &'a [BuildRecord],
    current: &BuildRecord,
) -> Option<&'a BuildRecord> {
    candidates
        .iter()
        .filter(|candidate| candidate.build_number != current.build_number)
        .filter(|candidate| !candidate.in_progress())
        .find(|candidate| candidate.equivalent(current))
}
