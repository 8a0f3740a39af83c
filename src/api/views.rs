//! Result trees for each kind of row

use chrono::NaiveDate;

use super::format::{render_tree, upsert, Node, RenderError};
use crate::database::models::availability::{NgiAvailability, ServiceFlavorAvailability, SiteAvailability, VoAvailability};
use crate::database::models::profile::AvailabilityProfile;
use crate::database::models::status::{MetricResult, StatusSite};
use crate::filter::Granularity;
use crate::types::Representation;

/// Rows that know how to nest themselves into a result tree
pub trait TreeRows: Sized {
    fn tree(rows: &[Self], granularity: Granularity) -> Vec<Node>;
}

pub fn render<R: TreeRows>(rows: &[R], granularity: Granularity, representation: Representation) -> Result<Vec<u8>, RenderError> {
    render_tree(&R::tree(rows, granularity), representation)
}

/// `20150601` → `2015-06-01T00:00:00Z`, `201506` → `2015-06`; anything
/// else is passed through
pub fn format_bucket(date: &str, granularity: Granularity) -> String {
    let parsed = match granularity {
        Granularity::Daily => NaiveDate::parse_from_str(date, "%Y%m%d").map(|d| d.format("%Y-%m-%dT00:00:00Z").to_string()),
        Granularity::Monthly => NaiveDate::parse_from_str(&format!("{}01", date), "%Y%m%d").map(|d| d.format("%Y-%m").to_string()),
    };
    parsed.unwrap_or_else(|_| date.to_string())
}

fn percentage(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn availability_entry(date: &str, availability: Option<f64>, reliability: Option<f64>, granularity: Granularity) -> Node {
    Node::new("Availability")
        .attr("timestamp", format_bucket(date, granularity))
        .attr("availability", percentage(availability))
        .attr("reliability", percentage(reliability))
}

fn profile_node(name: &str) -> Node {
    Node::new("Profile").attr("name", name)
}

impl TreeRows for SiteAvailability {
    fn tree(rows: &[Self], granularity: Granularity) -> Vec<Node> {
        let mut profiles = Vec::new();
        for row in rows {
            let profile = upsert(&mut profiles, &row.profile, || profile_node(&row.profile));
            let site = profile.child(&row.site, || {
                Node::new("Site")
                    .attr("site", row.site.as_str())
                    .attr("NGI", row.ngi.as_str())
                    // published attribute name
                    .attr_as("infastructure", "infrastructure", row.infrastructure.as_str())
                    .attr("scope", row.scope.as_str())
                    .attr("site_scope", row.site_scope.as_str())
                    .attr("production", row.production.as_str())
                    .attr("monitored", row.monitored.as_str())
                    .attr("certification_status", row.certification.as_str())
            });
            site.push(availability_entry(&row.date, row.availability, row.reliability, granularity));
        }
        profiles
    }
}

impl TreeRows for NgiAvailability {
    fn tree(rows: &[Self], granularity: Granularity) -> Vec<Node> {
        let mut profiles = Vec::new();
        for row in rows {
            let profile = upsert(&mut profiles, &row.profile, || profile_node(&row.profile));
            let ngi = profile.child(&row.ngi, || Node::new("Ngi").attr("name", row.ngi.as_str()));
            ngi.push(availability_entry(&row.date, row.availability, row.reliability, granularity));
        }
        profiles
    }
}

impl TreeRows for VoAvailability {
    fn tree(rows: &[Self], granularity: Granularity) -> Vec<Node> {
        let mut profiles = Vec::new();
        for row in rows {
            let profile = upsert(&mut profiles, &row.profile, || profile_node(&row.profile));
            let vo = profile.child(&row.vo, || Node::new("Vo").attr("VO", row.vo.as_str()));
            vo.push(availability_entry(&row.date, row.availability, row.reliability, granularity));
        }
        profiles
    }
}

impl TreeRows for ServiceFlavorAvailability {
    fn tree(rows: &[Self], granularity: Granularity) -> Vec<Node> {
        let mut profiles = Vec::new();
        for row in rows {
            let profile = upsert(&mut profiles, &row.profile, || profile_node(&row.profile));
            let site = profile.child(&row.site, || Node::new("Site").attr("site", row.site.as_str()));
            let flavor = site.child(&row.flavor, || Node::new("SF").attr("Sf", row.flavor.as_str()));
            flavor.push(availability_entry(&row.date, row.availability, row.reliability, granularity));
        }
        profiles
    }
}

impl TreeRows for StatusSite {
    fn tree(rows: &[Self], _granularity: Granularity) -> Vec<Node> {
        let mut profiles = Vec::new();
        for row in rows {
            let profile = upsert(&mut profiles, &row.profile, || Node::new("profile").attr("name", row.profile.as_str()));
            let ngi = profile.child(&row.ngi, || {
                Node::new("group").attr("name", row.ngi.as_str()).attr("type", "ngi")
            });
            let site = ngi.child(&row.site, || {
                Node::new("group").attr("name", row.site.as_str()).attr("type", "site")
            });
            site.push(
                Node::new("status")
                    .attr("timestamp", row.timestamp.as_str())
                    .attr("status", row.status.as_str()),
            );
        }
        profiles
    }
}

impl TreeRows for MetricResult {
    fn tree(rows: &[Self], _granularity: Granularity) -> Vec<Node> {
        let mut hosts = Vec::new();
        for row in rows {
            let host = upsert(&mut hosts, &row.host, || {
                Node::new("host").attr("name", row.host.as_str()).attr("service", row.service.as_str())
            });
            let metric = host.child(&row.metric, || Node::new("metric").attr("name", row.metric.as_str()));
            metric.push(
                Node::new("status")
                    .attr("timestamp", row.timestamp.as_str())
                    .attr("value", row.status.as_str())
                    .text("summary", row.summary.as_str())
                    .text("message", row.message.as_str()),
            );
        }
        hosts
    }
}

impl TreeRows for AvailabilityProfile {
    fn tree(rows: &[Self], _granularity: Granularity) -> Vec<Node> {
        rows.iter()
            .map(|row| {
                let poem = row.poems.first().cloned().unwrap_or_default();
                let mut and = Node::new("AND");
                for group in &row.groups {
                    let mut or = Node::new("OR");
                    for flavor in group {
                        or.push(Node::new("Group").attr("service_flavor", flavor.as_str()));
                    }
                    and.push(or);
                }
                let mut profile = Node::new("profile")
                    .attr("id", row.id.as_str())
                    .attr("name", row.name.as_str())
                    .attr("namespace", row.namespace.as_str())
                    .attr("poem", poem);
                profile.push(and);
                profile
            })
            .collect()
    }
}
