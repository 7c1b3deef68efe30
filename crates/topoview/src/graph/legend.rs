//! Flow legend - which flows are deployed and where

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::elements::ElementSet;
use super::normalize::UNKNOWN_FLOW;

/// One row of the legend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub flow_id: String,
    /// True when any version of this flow carries the baseline flag
    pub is_baseline: bool,
    /// Ids of the nodes running a version of this flow, sorted
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct FlowLegend {
    pub flows: Vec<FlowSummary>,
}

impl FlowLegend {
    pub fn from_elements(elements: &ElementSet) -> Self {
        let mut by_flow: BTreeMap<&str, (bool, Vec<String>)> = BTreeMap::new();

        for node in &elements.nodes {
            for version in &node.data.versions {
                if version.flow_id == UNKNOWN_FLOW {
                    continue;
                }
                let entry = by_flow
                    .entry(version.flow_id.as_str())
                    .or_insert_with(|| (false, Vec::new()));
                entry.0 |= version.is_baseline;
                if !entry.1.contains(&node.data.id) {
                    entry.1.push(node.data.id.clone());
                }
            }
        }

        let mut flows: Vec<FlowSummary> = by_flow
            .into_iter()
            .map(|(flow_id, (is_baseline, mut services))| {
                services.sort();
                FlowSummary {
                    flow_id: flow_id.to_string(),
                    is_baseline,
                    services,
                }
            })
            .collect();

        // baseline first, then by id
        flows.sort_by(|a, b| {
            b.is_baseline
                .cmp(&a.is_baseline)
                .then_with(|| a.flow_id.cmp(&b.flow_id))
        });

        Self { flows }
    }

    pub fn baseline(&self) -> Option<&FlowSummary> {
        self.flows.iter().find(|f| f.is_baseline)
    }

    pub fn dev_flows(&self) -> impl Iterator<Item = &FlowSummary> {
        self.flows.iter().filter(|f| !f.is_baseline)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
