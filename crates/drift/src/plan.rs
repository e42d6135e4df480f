// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan resolution (design §4.6 step 3): collapse every detector finding
//! into at most one coherent [`RemediationPlan`]. Findings that agree
//! (same action, same version) collapse into one plan; findings that
//! disagree abort the tick with a typed conflict error rather than guessing.

use crate::finding::{Finding, RemediationAction};
use nodeagent_core::NodeAgentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationPlan {
    pub action: RemediationAction,
    pub kubernetes_version: Option<String>,
}

/// Resolves every finding's remediation request into a single plan, or
/// `None` if every finding is `Unspecified` (no action requested).
///
/// Two findings requesting different non-unspecified actions, or the same
/// action with different `kubernetes_version`s, abort with a typed
/// conflict error rather than silently picking one.
pub fn resolve_plan(findings: &[Finding]) -> Result<Option<RemediationPlan>, NodeAgentError> {
    let mut chosen: Option<RemediationPlan> = None;

    for finding in findings {
        if finding.remediation.action == RemediationAction::Unspecified {
            continue;
        }

        match &chosen {
            None => {
                chosen = Some(RemediationPlan {
                    action: finding.remediation.action,
                    kubernetes_version: finding.remediation.kubernetes_version.clone(),
                });
            }
            Some(existing) if existing.action != finding.remediation.action => {
                return Err(NodeAgentError::ConflictingAction(
                    format!("{:?}", existing.action),
                    format!("{:?}", finding.remediation.action),
                ));
            }
            Some(existing) if existing.kubernetes_version != finding.remediation.kubernetes_version => {
                return Err(NodeAgentError::ConflictingVersion {
                    action: format!("{:?}", existing.action),
                    a: existing.kubernetes_version.clone().unwrap_or_default(),
                    b: finding.remediation.kubernetes_version.clone().unwrap_or_default(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Remediation;

    fn finding(action: Remediation) -> Finding {
        Finding { id: "f".to_string(), title: "t".to_string(), details: "d".to_string(), remediation: action }
    }

    #[test]
    fn all_unspecified_yields_no_plan() {
        let findings = vec![finding(Remediation::unspecified()), finding(Remediation::unspecified())];
        assert_eq!(resolve_plan(&findings).unwrap(), None);
    }

    #[test]
    fn single_upgrade_finding_yields_a_plan() {
        let findings = vec![finding(Remediation::kubernetes_upgrade("1.30.7"))];
        let plan = resolve_plan(&findings).unwrap().unwrap();
        assert_eq!(plan.action, RemediationAction::KubernetesUpgrade);
        assert_eq!(plan.kubernetes_version.as_deref(), Some("1.30.7"));
    }

    #[test]
    fn matching_duplicate_findings_collapse_into_one_plan() {
        let findings =
            vec![finding(Remediation::kubernetes_upgrade("1.30.7")), finding(Remediation::kubernetes_upgrade("1.30.7"))];
        assert!(resolve_plan(&findings).unwrap().is_some());
    }

    #[test]
    fn conflicting_versions_abort_with_a_typed_error() {
        let findings =
            vec![finding(Remediation::kubernetes_upgrade("1.30.7")), finding(Remediation::kubernetes_upgrade("1.31.0"))];
        let err = resolve_plan(&findings).unwrap_err();
        assert!(matches!(err, NodeAgentError::ConflictingVersion { .. }));
    }
}
