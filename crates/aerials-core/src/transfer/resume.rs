//! Decide how to continue from an existing staging file.

/// What the next attempt does with the staging file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePlan {
    /// No staging bytes: fetch from 0.
    Fresh,
    /// Append from `offset`.
    Resume { offset: u64 },
    /// Staging already holds the whole remote file; just rename it.
    Publish,
    /// Staging is longer than the remote file (it changed); truncate and fetch from 0.
    Restart { stale: u64 },
}

/// Plans the next attempt from the staging size and the remote length (0 = unknown).
pub fn plan_resume(staged: u64, expected_total: u64) -> ResumePlan {
    if staged == 0 {
        return ResumePlan::Fresh;
    }
    if expected_total == 0 {
        return ResumePlan::Resume { offset: staged };
    }
    if staged == expected_total {
        ResumePlan::Publish
    } else if staged > expected_total {
        ResumePlan::Restart { stale: staged }
    } else {
        ResumePlan::Resume { offset: staged }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_staging_is_fresh() {
        assert_eq!(plan_resume(0, 100), ResumePlan::Fresh);
        assert_eq!(plan_resume(0, 0), ResumePlan::Fresh);
    }

    #[test]
    fn short_staging_resumes_at_its_size() {
        assert_eq!(plan_resume(40, 100), ResumePlan::Resume { offset: 40 });
    }

    #[test]
    fn unknown_total_still_resumes() {
        assert_eq!(plan_resume(40, 0), ResumePlan::Resume { offset: 40 });
    }

    #[test]
    fn whole_staging_is_published() {
        assert_eq!(plan_resume(100, 100), ResumePlan::Publish);
    }

    #[test]
    fn oversized_staging_restarts() {
        assert_eq!(plan_resume(120, 100), ResumePlan::Restart { stale: 120 });
    }
}
