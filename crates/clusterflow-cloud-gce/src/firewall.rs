//! Firewall rules owned by a cluster

use crate::compute::{Firewall, FirewallAllowed};
use clusterflow_cloud::Cluster;

/// Prefix of the cluster annotation recording that a rule was created
pub const FIREWALL_ANNOTATION_PREFIX: &str = "gce.clusterapi.k8s.io/firewall";

pub const DEFAULT_NETWORK: &str = "global/networks/default";

/// A firewall rule every cluster owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FirewallRule {
    /// Lets cluster machines reach each other
    InternalClusterTraffic,
    /// Opens the API server port to the world
    CoreApiServerTraffic,
}

impl FirewallRule {
    /// All rules, in the order they are created and deleted
    pub const ALL: [FirewallRule; 2] = [
        FirewallRule::InternalClusterTraffic,
        FirewallRule::CoreApiServerTraffic,
    ];

    fn suffix(self) -> &'static str {
        match self {
            FirewallRule::InternalClusterTraffic => "-allow-cluster-internal",
            FirewallRule::CoreApiServerTraffic => "-allow-api-public",
        }
    }

    /// What the rule is for, as it appears in error messages
    pub fn purpose(self) -> &'static str {
        match self {
            FirewallRule::InternalClusterTraffic => "internal cluster traffic",
            FirewallRule::CoreApiServerTraffic => "core api server traffic",
        }
    }

    /// Provider-side rule name; depends only on the cluster name
    pub fn name_for(self, cluster: &Cluster) -> String {
        format!("{}{}", cluster.name, self.suffix())
    }

    pub fn annotation_key(self, cluster: &Cluster) -> String {
        format!("{}-{}", FIREWALL_ANNOTATION_PREFIX, self.name_for(cluster))
    }

    /// Whether the cluster records this rule as already created
    pub fn is_recorded(self, cluster: &Cluster) -> bool {
        cluster.annotation(&self.annotation_key(cluster)) == Some("true")
    }

    /// Desired rule definition for the cluster
    pub fn spec_for(self, cluster: &Cluster) -> Firewall {
        match self {
            FirewallRule::InternalClusterTraffic => {
                let worker_tag = format!("{}-worker", cluster.name);
                Firewall {
                    name: self.name_for(cluster),
                    network: DEFAULT_NETWORK.to_string(),
                    allowed: vec![FirewallAllowed {
                        ip_protocol: "tcp".to_string(),
                        ports: Vec::new(),
                    }],
                    target_tags: vec![worker_tag.clone()],
                    source_tags: vec![worker_tag],
                    source_ranges: Vec::new(),
                }
            }
            FirewallRule::CoreApiServerTraffic => Firewall {
                name: self.name_for(cluster),
                network: DEFAULT_NETWORK.to_string(),
                allowed: vec![FirewallAllowed {
                    ip_protocol: "tcp".to_string(),
                    ports: vec!["443".to_string()],
                }],
                target_tags: vec!["https-server".to_string()],
                source_tags: Vec::new(),
                source_ranges: vec!["0.0.0.0/0".to_string()],
            },
        }
    }
}

impl std::fmt::Display for FirewallRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.purpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_names_are_deterministic() {
        let cluster = Cluster::new("prod", "default");
        assert_eq!(
            FirewallRule::InternalClusterTraffic.name_for(&cluster),
            "prod-allow-cluster-internal"
        );
        assert_eq!(
            FirewallRule::CoreApiServerTraffic.name_for(&cluster),
            "prod-allow-api-public"
        );

        let again = Cluster::new("prod", "other-namespace");
        for rule in FirewallRule::ALL {
            assert_eq!(rule.name_for(&cluster), rule.name_for(&again));
        }
    }

    #[test]
    fn test_annotation_key() {
        let cluster = Cluster::new("prod", "default");
        assert_eq!(
            FirewallRule::InternalClusterTraffic.annotation_key(&cluster),
            "gce.clusterapi.k8s.io/firewall-prod-allow-cluster-internal"
        );
    }

    #[test]
    fn test_is_recorded() {
        let rule = FirewallRule::CoreApiServerTraffic;
        let cluster = Cluster::new("prod", "default");
        assert!(!rule.is_recorded(&cluster));

        let key = rule.annotation_key(&cluster);
        let cluster = cluster.with_annotation(key, "true");
        assert!(rule.is_recorded(&cluster));
        assert!(!FirewallRule::InternalClusterTraffic.is_recorded(&cluster));
    }

    #[test]
    fn test_internal_rule_spec() {
        let cluster = Cluster::new("prod", "default");
        let firewall = FirewallRule::InternalClusterTraffic.spec_for(&cluster);
        assert_eq!(firewall.network, DEFAULT_NETWORK);
        assert_eq!(firewall.target_tags, vec!["prod-worker".to_string()]);
        assert_eq!(firewall.source_tags, vec!["prod-worker".to_string()]);
        assert!(firewall.allowed[0].ports.is_empty());
    }

    #[test]
    fn test_api_rule_spec() {
        let cluster = Cluster::new("prod", "default");
        let firewall = FirewallRule::CoreApiServerTraffic.spec_for(&cluster);
        assert_eq!(firewall.allowed[0].ports, vec!["443".to_string()]);
        assert_eq!(firewall.source_ranges, vec!["0.0.0.0/0".to_string()]);
        assert_eq!(firewall.target_tags, vec!["https-server".to_string()]);
    }
}
