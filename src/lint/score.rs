// Issue set → single 0–100 quality number

use serde::{Deserialize, Serialize};

use super::{LayoutIssue, Severity};

/// Per-severity score deductions. The defaults match the historical
/// behavior of the deck tooling; they are configuration because nobody has
/// written down why these exact numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub error: u32,
    pub warning: u32,
    pub info: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            error: 25,
            warning: 10,
            info: 3,
        }
    }
}

/// Reduce an issue list to a score in [0, 100]. Pure and monotonic:
/// adding an issue never increases the result.
pub fn score(issues: &[LayoutIssue], weights: &ScoreWeights) -> u8 {
    let deduction: u32 = issues
        .iter()
        .map(|issue| match issue.severity {
            Severity::Error => weights.error,
            Severity::Warning => weights.warning,
            Severity::Info => weights.info,
        })
        .sum();
    100u32.saturating_sub(deduction) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::IssueType;

    fn issue(severity: Severity) -> LayoutIssue {
        LayoutIssue {
            issue_type: IssueType::TooLongText,
            message: "test".to_string(),
            severity,
            slide_index: 0,
            suggestion: None,
            meta: None,
        }
    }

    #[test]
    fn test_no_issues_scores_100() {
        assert_eq!(score(&[], &ScoreWeights::default()), 100);
    }

    #[test]
    fn test_single_error_scores_75() {
        assert_eq!(score(&[issue(Severity::Error)], &ScoreWeights::default()), 75);
    }

    #[test]
    fn test_mixed_severities() {
        let issues = vec![issue(Severity::Error), issue(Severity::Warning), issue(Severity::Info)];
        assert_eq!(score(&issues, &ScoreWeights::default()), 62);
    }

    #[test]
    fn test_clamped_at_zero() {
        let issues: Vec<LayoutIssue> = (0..6).map(|_| issue(Severity::Error)).collect();
        assert_eq!(score(&issues, &ScoreWeights::default()), 0);
    }

    #[test]
    fn test_adding_an_issue_never_raises_the_score() {
        let weights = ScoreWeights::default();
        let mut issues = Vec::new();
        let mut last = score(&issues, &weights);
        for severity in [Severity::Info, Severity::Warning, Severity::Error, Severity::Info] {
            issues.push(issue(severity));
            let next = score(&issues, &weights);
            assert!(next <= last);
            last = next;
        }
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoreWeights {
            error: 50,
            warning: 5,
            info: 1,
        };
        assert_eq!(score(&[issue(Severity::Error)], &weights), 50);
    }
}
