//! Time-grading checks between operating relays and the normative
//! compliance summary derived from them.
//!
//! Two relays that both trip for the same fault must be separated by at
//! least [`MIN_COORDINATION_MARGIN_S`] (IEEE C37.112 convention), otherwise
//! the backup may clear the fault before the primary and the outage spreads.
//! Every unordered pair of operating relays is checked; the comparison uses
//! the absolute time difference, so pair order never matters.
//!
//! The compliance summary is a rule-based proxy over four standards, not a
//! certified check. Two of the four (IEC 61850 timing, API RP 14C
//! environment) are not modelled and always pass.

use crate::simulator::DeviceResponse;
use gat_core::DeviceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum separation between two operating relays, seconds.
pub const MIN_COORDINATION_MARGIN_S: f64 = 0.3;

/// Most relays allowed to operate for one fault before selectivity fails.
pub const MAX_SELECTIVE_OPERATIONS: usize = 3;

/// Operating times above this are reported under IEEE C37.112.
pub const MAX_OPERATING_TIME_S: f64 = 2.0;

/// Two operating relays closer in time than the required margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationIssue {
    pub device1: DeviceId,
    pub device2: DeviceId,
    /// Observed separation, seconds
    pub margin: f64,
    /// Required separation, seconds
    pub required: f64,
}

/// True when two trip times are closer than [`MIN_COORDINATION_MARGIN_S`].
#[inline]
pub fn margin_violated(time_a: f64, time_b: f64) -> bool {
    (time_a - time_b).abs() < MIN_COORDINATION_MARGIN_S
}

/// Check every unordered pair of operating relays.
pub fn find_coordination_issues(responses: &[DeviceResponse]) -> Vec<CoordinationIssue> {
    let operating: Vec<&DeviceResponse> = responses.iter().filter(|r| r.should_operate).collect();

    let mut issues = Vec::new();
    for (i, first) in operating.iter().enumerate() {
        for second in &operating[i + 1..] {
            if margin_violated(first.operating_time, second.operating_time) {
                issues.push(CoordinationIssue {
                    device1: first.device_id.clone(),
                    device2: second.device_id.clone(),
                    margin: (first.operating_time - second.operating_time).abs(),
                    required: MIN_COORDINATION_MARGIN_S,
                });
            }
        }
    }
    issues
}

/// Clear `coordination_ok` on every relay named in an issue.
pub fn mark_miscoordinated(responses: &mut [DeviceResponse], issues: &[CoordinationIssue]) {
    for response in responses.iter_mut() {
        response.coordination_ok = !issues
            .iter()
            .any(|issue| issue.device1 == response.device_id || issue.device2 == response.device_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Standard {
    /// Coordination margins
    IeeeC37_112,
    /// Substation communication timing (GOOSE)
    Iec61850,
    /// Selectivity
    Nbr5410,
    /// Offshore environment and redundancy
    ApiRp14c,
}

impl Standard {
    pub const ALL: [Standard; 4] = [
        Standard::IeeeC37_112,
        Standard::Iec61850,
        Standard::Nbr5410,
        Standard::ApiRp14c,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Standard::IeeeC37_112 => "IEEE_C37_112",
            Standard::Iec61850 => "IEC_61850",
            Standard::Nbr5410 => "NBR_5410",
            Standard::ApiRp14c => "API_RP_14C",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StandardCheck {
    pub compliant: bool,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl StandardCheck {
    fn passing() -> Self {
        Self {
            compliant: true,
            issues: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormativeCompliance {
    #[serde(rename = "IEEE_C37_112")]
    pub ieee_c37_112: StandardCheck,
    #[serde(rename = "IEC_61850")]
    pub iec_61850: StandardCheck,
    #[serde(rename = "NBR_5410")]
    pub nbr_5410: StandardCheck,
    #[serde(rename = "API_RP_14C")]
    pub api_rp_14c: StandardCheck,
}

impl NormativeCompliance {
    pub fn get(&self, standard: Standard) -> &StandardCheck {
        match standard {
            Standard::IeeeC37_112 => &self.ieee_c37_112,
            Standard::Iec61850 => &self.iec_61850,
            Standard::Nbr5410 => &self.nbr_5410,
            Standard::ApiRp14c => &self.api_rp_14c,
        }
    }

    pub fn is_compliant(&self, standard: Standard) -> bool {
        self.get(standard).compliant
    }

    pub fn iter(&self) -> impl Iterator<Item = (Standard, &StandardCheck)> {
        Standard::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    pub fn compliant_count(&self) -> usize {
        self.iter().filter(|(_, check)| check.compliant).count()
    }
}

/// Derive the four standard checks from relay responses and margin issues.
pub fn evaluate_normative_compliance(
    responses: &[DeviceResponse],
    issues: &[CoordinationIssue],
) -> NormativeCompliance {
    let mut ieee = StandardCheck {
        compliant: issues.is_empty(),
        issues: issues
            .iter()
            .map(|issue| {
                format!(
                    "insufficient margin {:.3}s < {:.1}s: {}-{}",
                    issue.margin, issue.required, issue.device1, issue.device2
                )
            })
            .collect(),
    };
    // Slow relays are noted but do not change the verdict.
    for response in responses
        .iter()
        .filter(|r| r.should_operate && r.operating_time > MAX_OPERATING_TIME_S)
    {
        ieee.issues.push(format!(
            "operating time of {} ({:.3}s) exceeds {:.1}s",
            response.device_id, response.operating_time, MAX_OPERATING_TIME_S
        ));
    }

    let operating = responses.iter().filter(|r| r.should_operate).count();
    let nbr = if operating <= MAX_SELECTIVE_OPERATIONS {
        StandardCheck::passing()
    } else {
        StandardCheck {
            compliant: false,
            issues: vec![format!(
                "{operating} devices operating simultaneously (max {MAX_SELECTIVE_OPERATIONS})"
            )],
        }
    };

    NormativeCompliance {
        ieee_c37_112: ieee,
        iec_61850: StandardCheck::passing(),
        nbr_5410: nbr,
        api_rp_14c: StandardCheck::passing(),
    }
}

/// Result of running both checks over a set of responses.
#[derive(Debug, Clone)]
pub struct CoordinationAnalysis {
    pub issues: Vec<CoordinationIssue>,
    pub compliance: NormativeCompliance,
}

impl CoordinationAnalysis {
    pub fn coordination_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Find margin issues, mark the relays involved, and score compliance.
pub fn analyze(responses: &mut [DeviceResponse]) -> CoordinationAnalysis {
    let issues = find_coordination_issues(responses);
    mark_miscoordinated(responses, &issues);
    let compliance = evaluate_normative_compliance(responses, &issues);
    CoordinationAnalysis { issues, compliance }
}
